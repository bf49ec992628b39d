//! Parser for OpenQASM 2.0 / 3.0, lowering directly to the canonical circuit.

use rustc_hash::FxHashMap;

use skinfaxi_ir::{Circuit, CustomGate, StandardGate};

use crate::error::{QasmError, QasmResult};
use crate::lexer::{Token, tokenize};

/// Parse a QASM source string into a canonical circuit.
///
/// Gates outside the core vocabulary become custom operations; they parse
/// fine here and are classified later by the canonicalizer.
pub fn parse(source: &str) -> QasmResult<Circuit> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        qregs: FxHashMap::default(),
        cregs: FxHashMap::default(),
        circuit: Circuit::new("qasm_circuit"),
    };
    parser.parse_program()?;
    Ok(parser.circuit)
}

/// A resolved operand: a single wire or a whole register.
#[derive(Debug, Clone, Copy)]
enum Operand {
    Wire(u32),
    Reg { start: u32, size: u32 },
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Quantum registers: name → (first flat index, size).
    qregs: FxHashMap<String, (u32, u32)>,
    /// Classical registers: name → (first flat index, size).
    cregs: FxHashMap<String, (u32, u32)>,
    circuit: Circuit,
}

impl Parser {
    fn is_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, expected: &Token) -> QasmResult<Token> {
        let found = self
            .advance()
            .ok_or_else(|| QasmError::UnexpectedEof(expected.to_string()))?;
        if std::mem::discriminant(&found) == std::mem::discriminant(expected) {
            Ok(found)
        } else {
            Err(QasmError::UnexpectedToken {
                expected: expected.to_string(),
                found: found.to_string(),
            })
        }
    }

    fn check(&self, token: &Token) -> bool {
        self.peek()
            .is_some_and(|t| std::mem::discriminant(t) == std::mem::discriminant(token))
    }

    fn consume(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn identifier(&mut self) -> QasmResult<String> {
        match self.advance() {
            Some(Token::Identifier(name)) => Ok(name),
            Some(other) => Err(QasmError::UnexpectedToken {
                expected: "identifier".into(),
                found: other.to_string(),
            }),
            None => Err(QasmError::UnexpectedEof("identifier".into())),
        }
    }

    fn int_literal(&mut self) -> QasmResult<u64> {
        match self.advance() {
            Some(Token::IntLiteral(v)) => Ok(v),
            Some(other) => Err(QasmError::UnexpectedToken {
                expected: "integer".into(),
                found: other.to_string(),
            }),
            None => Err(QasmError::UnexpectedEof("integer".into())),
        }
    }

    // =========================================================================
    // Program structure
    // =========================================================================

    fn parse_program(&mut self) -> QasmResult<()> {
        self.expect(&Token::OpenQasm)?;
        self.parse_version()?;
        self.expect(&Token::Semicolon)?;

        while !self.is_eof() {
            self.parse_statement()?;
        }
        Ok(())
    }

    fn parse_version(&mut self) -> QasmResult<()> {
        match self.advance() {
            Some(Token::FloatLiteral(v)) if v == 2.0 || v == 3.0 => Ok(()),
            Some(Token::IntLiteral(3)) => Ok(()),
            Some(other) => Err(QasmError::InvalidVersion(other.to_string())),
            None => Err(QasmError::UnexpectedEof("version".into())),
        }
    }

    fn parse_statement(&mut self) -> QasmResult<()> {
        let token = self
            .peek()
            .cloned()
            .ok_or_else(|| QasmError::UnexpectedEof("statement".into()))?;

        match token {
            Token::Include => self.parse_include(),
            Token::Qreg => self.parse_qasm2_reg(true),
            Token::Creg => self.parse_qasm2_reg(false),
            Token::Qubit => self.parse_qasm3_decl(true),
            Token::Bit => self.parse_qasm3_decl(false),
            Token::Gate => self.skip_gate_definition(),
            Token::Measure => self.parse_measure_arrow(),
            Token::Reset => self.parse_reset(),
            Token::Barrier => self.parse_barrier(),
            Token::Identifier(name) => {
                self.pos += 1;
                self.parse_identifier_statement(name)
            }
            other => Err(QasmError::UnexpectedToken {
                expected: "statement".into(),
                found: other.to_string(),
            }),
        }
    }

    fn parse_include(&mut self) -> QasmResult<()> {
        self.expect(&Token::Include)?;
        self.expect(&Token::StringLiteral(String::new()))?;
        self.expect(&Token::Semicolon)?;
        Ok(())
    }

    /// `qreg q[5];` / `creg c[5];`
    fn parse_qasm2_reg(&mut self, quantum: bool) -> QasmResult<()> {
        self.pos += 1; // qreg / creg
        let name = self.identifier()?;
        self.expect(&Token::LBracket)?;
        let size = self.int_literal()? as u32;
        self.expect(&Token::RBracket)?;
        self.expect(&Token::Semicolon)?;
        self.declare(name, size, quantum);
        Ok(())
    }

    /// `qubit[5] q;` / `qubit q;` / `bit[5] c;` / `bit c;`
    fn parse_qasm3_decl(&mut self, quantum: bool) -> QasmResult<()> {
        self.pos += 1; // qubit / bit
        let size = if self.consume(&Token::LBracket) {
            let size = self.int_literal()? as u32;
            self.expect(&Token::RBracket)?;
            size
        } else {
            1
        };
        let name = self.identifier()?;
        self.expect(&Token::Semicolon)?;
        self.declare(name, size, quantum);
        Ok(())
    }

    fn declare(&mut self, name: String, size: u32, quantum: bool) {
        if quantum {
            let start = self.circuit.add_qreg(name.clone(), size);
            self.qregs.insert(name, (start, size));
        } else {
            let start = self.circuit.add_creg(name.clone(), size);
            self.cregs.insert(name, (start, size));
        }
    }

    /// Skip a `gate name(...) qs { ... }` definition.
    ///
    /// Definitions are not expanded; later calls to the defined name parse
    /// as custom operations and are classified by the canonicalizer.
    fn skip_gate_definition(&mut self) -> QasmResult<()> {
        self.expect(&Token::Gate)?;
        while let Some(token) = self.advance() {
            if token == Token::LBrace {
                break;
            }
        }
        loop {
            match self.advance() {
                Some(Token::RBrace) => return Ok(()),
                Some(_) => {}
                None => return Err(QasmError::UnexpectedEof("}".into())),
            }
        }
    }

    /// `measure q -> c;` / `measure q[0] -> c[0];` / `measure q;`
    fn parse_measure_arrow(&mut self) -> QasmResult<()> {
        self.expect(&Token::Measure)?;
        let qubits = self.parse_operand_list(true)?;
        let clbits = if self.consume(&Token::Arrow) {
            Some(self.parse_operand_list(false)?)
        } else {
            None
        };
        self.expect(&Token::Semicolon)?;
        self.apply_measure(&qubits, clbits.as_deref())
    }

    fn parse_reset(&mut self) -> QasmResult<()> {
        self.expect(&Token::Reset)?;
        let operands = self.parse_operand_list(true)?;
        self.expect(&Token::Semicolon)?;
        for row in expand(&operands)? {
            self.circuit.reset(row[0])?;
        }
        Ok(())
    }

    fn parse_barrier(&mut self) -> QasmResult<()> {
        self.expect(&Token::Barrier)?;
        let qubits = if self.check(&Token::Semicolon) {
            (0..self.circuit.num_qubits()).collect()
        } else {
            let operands = self.parse_operand_list(true)?;
            flatten(&operands)
        };
        self.expect(&Token::Semicolon)?;
        self.circuit.barrier(qubits)?;
        Ok(())
    }

    /// Statement starting with an identifier: a gate call, or the OpenQASM 3
    /// measure-assignment `c = measure q;` / `c[0] = measure q[0];`.
    fn parse_identifier_statement(&mut self, name: String) -> QasmResult<()> {
        let is_creg = self.cregs.contains_key(&name);
        if is_creg && (self.check(&Token::Eq) || self.check(&Token::LBracket)) {
            let target = self.finish_operand(name, false)?;
            self.expect(&Token::Eq)?;
            self.expect(&Token::Measure)?;
            let qubits = self.parse_operand_list(true)?;
            self.expect(&Token::Semicolon)?;
            return self.apply_measure(&qubits, Some(&[target]));
        }
        self.parse_gate_call(name)
    }

    fn parse_gate_call(&mut self, name: String) -> QasmResult<()> {
        let params = if self.consume(&Token::LParen) {
            let params = self.parse_param_list()?;
            self.expect(&Token::RParen)?;
            params
        } else {
            vec![]
        };

        let operands = self.parse_operand_list(true)?;
        self.expect(&Token::Semicolon)?;

        let lowered = name.to_lowercase();
        for row in expand(&operands)? {
            match StandardGate::from_name(&lowered, &params) {
                Some(gate) => self.circuit.gate(gate, row)?,
                None => {
                    let custom = CustomGate::new(lowered.clone(), row.len() as u32)
                        .with_params(params.clone());
                    self.circuit.gate(custom, row)?
                }
            };
        }
        Ok(())
    }

    fn apply_measure(&mut self, qubits: &[Operand], clbits: Option<&[Operand]>) -> QasmResult<()> {
        let qubit_rows = expand(qubits)?;
        let targets: Vec<u32> = match clbits {
            Some(clbits) => {
                let rows = expand(clbits)?;
                if rows.len() != qubit_rows.len() {
                    return Err(QasmError::BroadcastMismatch(
                        qubit_rows.len() as u32,
                        rows.len() as u32,
                    ));
                }
                rows.into_iter().map(|row| row[0]).collect()
            }
            // Bare `measure q;`: same-index classical bits.
            None => qubit_rows.iter().map(|row| row[0]).collect(),
        };

        for (row, clbit) in qubit_rows.iter().zip(targets) {
            self.circuit.measure(row[0], clbit)?;
        }
        Ok(())
    }

    // =========================================================================
    // Operands
    // =========================================================================

    fn parse_operand_list(&mut self, quantum: bool) -> QasmResult<Vec<Operand>> {
        let mut operands = vec![self.parse_operand(quantum)?];
        while self.consume(&Token::Comma) {
            operands.push(self.parse_operand(quantum)?);
        }
        Ok(operands)
    }

    fn parse_operand(&mut self, quantum: bool) -> QasmResult<Operand> {
        let name = self.identifier()?;
        self.finish_operand(name, quantum)
    }

    /// Resolve `name` or `name[index]` against the declared registers.
    fn finish_operand(&mut self, name: String, quantum: bool) -> QasmResult<Operand> {
        let &(start, size) = if quantum {
            self.qregs.get(&name)
        } else {
            self.cregs.get(&name)
        }
        .ok_or_else(|| QasmError::UnknownRegister(name.clone()))?;

        if self.consume(&Token::LBracket) {
            let index = self.int_literal()? as u32;
            self.expect(&Token::RBracket)?;
            if index >= size {
                return Err(QasmError::IndexOutOfRange {
                    register: name,
                    index,
                    size,
                });
            }
            Ok(Operand::Wire(start + index))
        } else {
            Ok(Operand::Reg { start, size })
        }
    }

    // =========================================================================
    // Parameter expressions (numeric, evaluated on the spot)
    // =========================================================================

    fn parse_param_list(&mut self) -> QasmResult<Vec<f64>> {
        if self.check(&Token::RParen) {
            return Ok(vec![]);
        }
        let mut params = vec![self.parse_expr()?];
        while self.consume(&Token::Comma) {
            params.push(self.parse_expr()?);
        }
        Ok(params)
    }

    fn parse_expr(&mut self) -> QasmResult<f64> {
        let mut value = self.parse_term()?;
        loop {
            if self.consume(&Token::Plus) {
                value += self.parse_term()?;
            } else if self.consume(&Token::Minus) {
                value -= self.parse_term()?;
            } else {
                return Ok(value);
            }
        }
    }

    fn parse_term(&mut self) -> QasmResult<f64> {
        let mut value = self.parse_factor()?;
        loop {
            if self.consume(&Token::Star) {
                value *= self.parse_factor()?;
            } else if self.consume(&Token::Slash) {
                value /= self.parse_factor()?;
            } else {
                return Ok(value);
            }
        }
    }

    fn parse_factor(&mut self) -> QasmResult<f64> {
        if self.consume(&Token::Minus) {
            return Ok(-self.parse_factor()?);
        }
        match self.advance() {
            Some(Token::IntLiteral(v)) => Ok(v as f64),
            Some(Token::FloatLiteral(v)) => Ok(v),
            Some(Token::Pi) => Ok(std::f64::consts::PI),
            Some(Token::Tau) => Ok(std::f64::consts::TAU),
            Some(Token::Euler) => Ok(std::f64::consts::E),
            Some(Token::LParen) => {
                let value = self.parse_expr()?;
                self.expect(&Token::RParen)?;
                Ok(value)
            }
            Some(other) => Err(QasmError::BadExpression(other.to_string())),
            None => Err(QasmError::UnexpectedEof("expression".into())),
        }
    }
}

/// Expand operands into per-application rows.
///
/// Whole-register operands broadcast: all of them must have the same size,
/// and single-wire operands repeat across the rows (`cx q, r[0];` applies
/// the gate once per element of `q`).
fn expand(operands: &[Operand]) -> QasmResult<Vec<Vec<u32>>> {
    let mut width = 1;
    for op in operands {
        if let Operand::Reg { size, .. } = op {
            if width != 1 && width != *size {
                return Err(QasmError::BroadcastMismatch(width, *size));
            }
            width = *size;
        }
    }

    let rows = (0..width)
        .map(|i| {
            operands
                .iter()
                .map(|op| match op {
                    Operand::Wire(w) => *w,
                    Operand::Reg { start, .. } => start + i,
                })
                .collect()
        })
        .collect();
    Ok(rows)
}

fn flatten(operands: &[Operand]) -> Vec<u32> {
    let mut wires = vec![];
    for op in operands {
        match op {
            Operand::Wire(w) => wires.push(*w),
            Operand::Reg { start, size } => wires.extend(*start..start + size),
        }
    }
    wires
}

#[cfg(test)]
mod tests {
    use super::*;
    use skinfaxi_ir::{Gate, OpKind};
    use std::f64::consts::PI;

    fn gate_names(circuit: &Circuit) -> Vec<String> {
        circuit.ops().iter().map(|op| op.name().to_string()).collect()
    }

    #[test]
    fn test_parse_qasm2_bell() {
        let circuit = parse(
            r#"
            OPENQASM 2.0;
            include "qelib1.inc";
            qreg q[2];
            creg c[2];
            h q[0];
            cx q[0], q[1];
            measure q -> c;
            "#,
        )
        .unwrap();

        assert_eq!(circuit.num_qubits(), 2);
        assert_eq!(circuit.num_clbits(), 2);
        assert_eq!(gate_names(&circuit), vec!["h", "cx", "measure", "measure"]);
    }

    #[test]
    fn test_parse_qasm3_bell() {
        let circuit = parse(
            r#"
            OPENQASM 3.0;
            qubit[2] q;
            bit[2] c;
            h q[0];
            cx q[0], q[1];
            c = measure q;
            "#,
        )
        .unwrap();

        assert_eq!(circuit.num_qubits(), 2);
        assert_eq!(gate_names(&circuit), vec!["h", "cx", "measure", "measure"]);
    }

    #[test]
    fn test_parse_parameterized_gates() {
        let circuit = parse(
            r#"
            OPENQASM 2.0;
            qreg q[1];
            rx(pi/2) q[0];
            rz(-pi/4) q[0];
            u(pi, 0, 3.14159) q[0];
            "#,
        )
        .unwrap();

        let Some(Gate::Standard(StandardGate::Rx(theta))) = circuit.ops()[0].as_gate().cloned()
        else {
            panic!("expected rx");
        };
        assert!((theta - PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_qubit_broadcast() {
        let circuit = parse("OPENQASM 2.0; qreg q[3]; h q;").unwrap();
        assert_eq!(gate_names(&circuit), vec!["h", "h", "h"]);
    }

    #[test]
    fn test_two_register_broadcast() {
        let circuit = parse("OPENQASM 2.0; qreg a[2]; qreg b[2]; cx a, b;").unwrap();
        assert_eq!(gate_names(&circuit), vec!["cx", "cx"]);
        assert_eq!(circuit.ops()[0].qubits, vec![0, 2]);
        assert_eq!(circuit.ops()[1].qubits, vec![1, 3]);
    }

    #[test]
    fn test_broadcast_mismatch() {
        let result = parse("OPENQASM 2.0; qreg a[2]; qreg b[3]; cx a, b;");
        assert!(matches!(result, Err(QasmError::BroadcastMismatch(2, 3))));
    }

    #[test]
    fn test_unknown_gate_becomes_custom() {
        let circuit = parse("OPENQASM 2.0; qreg q[2]; mygate(0.5) q[0], q[1];").unwrap();
        let gate = circuit.ops()[0].as_gate().unwrap();
        assert!(gate.is_custom());
        assert_eq!(gate.name(), "mygate");
        assert_eq!(gate.num_qubits(), 2);
    }

    #[test]
    fn test_alias_gates_are_custom_until_precompiled() {
        let circuit = parse("OPENQASM 2.0; qreg q[2]; cnot q[0], q[1];").unwrap();
        assert!(circuit.ops()[0].as_gate().unwrap().is_custom());
    }

    #[test]
    fn test_gate_definition_skipped() {
        let circuit = parse(
            r#"
            OPENQASM 2.0;
            qreg q[1];
            gate mygate a { h a; }
            mygate q[0];
            "#,
        )
        .unwrap();
        assert!(circuit.ops()[0].as_gate().unwrap().is_custom());
    }

    #[test]
    fn test_barrier_and_reset() {
        let circuit = parse(
            "OPENQASM 2.0; qreg q[2]; h q[0]; barrier q; reset q[1];",
        )
        .unwrap();
        assert!(matches!(circuit.ops()[1].kind, OpKind::Barrier));
        assert!(matches!(circuit.ops()[2].kind, OpKind::Reset));
    }

    #[test]
    fn test_unknown_register_rejected() {
        assert!(matches!(
            parse("OPENQASM 2.0; qreg q[1]; h r[0];"),
            Err(QasmError::UnknownRegister(_))
        ));
    }

    #[test]
    fn test_index_out_of_range() {
        assert!(matches!(
            parse("OPENQASM 2.0; qreg q[1]; h q[4];"),
            Err(QasmError::IndexOutOfRange { index: 4, .. })
        ));
    }

    #[test]
    fn test_missing_version() {
        assert!(parse("qreg q[1];").is_err());
    }

    #[test]
    fn test_register_names_preserved() {
        let circuit = parse("OPENQASM 2.0; qreg QReg[1]; creg Out[1]; h QReg[0];").unwrap();
        assert_eq!(circuit.qregs()[0].name, "QReg");
        assert_eq!(circuit.cregs()[0].name, "Out");
    }
}
