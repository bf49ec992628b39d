//! Line-oriented Quil parser.

use skinfaxi_ir::{Circuit, CustomGate, StandardGate};

use crate::{QuilError, QuilResult};

/// Parse Quil source into a canonical circuit.
///
/// The circuit gets a single quantum register `q` sized by the highest qubit
/// index used, plus one classical register per `DECLARE ... BIT` region.
/// Unknown gates (and modifier chains like `DAGGER X`) become custom
/// operations for the canonicalizer to classify.
pub fn parse(source: &str) -> QuilResult<Circuit> {
    let lines: Vec<(usize, &str)> = source
        .lines()
        .enumerate()
        .map(|(i, line)| {
            let text = line.split('#').next().unwrap_or("").trim();
            (i + 1, text)
        })
        .filter(|(_, text)| !text.is_empty())
        .collect();

    // First pass: memory declarations and the qubit index space.
    let mut regions: Vec<(String, u32)> = vec![];
    let mut max_qubit: Option<u32> = None;

    for &(line_no, text) in &lines {
        let mut words = text.split_whitespace();
        let head = words.next().unwrap_or("");
        if head.eq_ignore_ascii_case("DECLARE") {
            let (name, size) = parse_declare(line_no, text)?;
            regions.push((name, size));
        } else if !is_directive(head) {
            for word in instruction_words(text) {
                if let Ok(q) = word.parse::<u32>() {
                    max_qubit = Some(max_qubit.map_or(q, |m| m.max(q)));
                }
            }
        }
    }

    let mut circuit = Circuit::new("quil_circuit");
    if let Some(max) = max_qubit {
        circuit.add_qreg("q", max + 1);
    }
    let mut memory: Vec<(String, u32, u32)> = vec![];
    for (name, size) in regions {
        let start = circuit.add_creg(name.clone(), size);
        memory.push((name, start, size));
    }

    // Second pass: instructions.
    for &(line_no, text) in &lines {
        parse_instruction(&mut circuit, &memory, line_no, text)?;
    }
    Ok(circuit)
}

/// Words of an instruction line with the parameter list stripped.
fn instruction_words(text: &str) -> impl Iterator<Item = &str> {
    let after_params = match (text.find('('), text.find(')')) {
        (Some(_), Some(close)) => &text[close + 1..],
        _ => text,
    };
    after_params.split_whitespace().skip_while(|w| {
        // Skip the instruction head on un-parenthesized lines.
        w.chars().any(|c| c.is_ascii_alphabetic())
    })
}

fn is_directive(head: &str) -> bool {
    ["DECLARE", "PRAGMA", "HALT", "NOP"]
        .iter()
        .any(|d| head.eq_ignore_ascii_case(d))
}

/// `DECLARE ro BIT[2]` → `("ro", 2)`.
fn parse_declare(line_no: usize, text: &str) -> QuilResult<(String, u32)> {
    let malformed = || QuilError::Malformed {
        line: line_no,
        text: text.to_string(),
    };

    let mut words = text.split_whitespace();
    let _declare = words.next();
    let name = words.next().ok_or_else(malformed)?;
    let memory_type = words.next().ok_or_else(malformed)?;

    let (type_name, size) = match memory_type.find('[') {
        Some(open) => {
            let close = memory_type.find(']').ok_or_else(malformed)?;
            let size = memory_type[open + 1..close]
                .parse::<u32>()
                .map_err(|_| malformed())?;
            (&memory_type[..open], size)
        }
        None => (memory_type, 1),
    };

    if !type_name.eq_ignore_ascii_case("BIT") {
        return Err(QuilError::UnsupportedDeclaration {
            line: line_no,
            text: text.to_string(),
        });
    }
    Ok((name.to_string(), size))
}

fn parse_instruction(
    circuit: &mut Circuit,
    memory: &[(String, u32, u32)],
    line_no: usize,
    text: &str,
) -> QuilResult<()> {
    let malformed = || QuilError::Malformed {
        line: line_no,
        text: text.to_string(),
    };

    let head = text.split(['(', ' ']).next().unwrap_or("");
    if is_directive(head) {
        return Ok(());
    }

    if head.eq_ignore_ascii_case("MEASURE") {
        let mut words = text.split_whitespace().skip(1);
        let qubit: u32 = words.next().ok_or_else(malformed)?.parse().map_err(|_| malformed())?;
        let clbit = match words.next() {
            Some(reference) => resolve_memory(memory, reference)?,
            // Bare MEASURE discards the outcome; fold onto the same index.
            None => qubit,
        };
        circuit.measure(qubit, clbit)?;
        return Ok(());
    }

    if head.eq_ignore_ascii_case("RESET") {
        let mut words = text.split_whitespace().skip(1);
        match words.next() {
            Some(word) => {
                let qubit: u32 = word.parse().map_err(|_| malformed())?;
                circuit.reset(qubit)?;
            }
            None => {
                for q in 0..circuit.num_qubits() {
                    circuit.reset(q)?;
                }
            }
        }
        return Ok(());
    }

    // Modifier chains (DAGGER X 0, CONTROLLED Z 0 1) become hyphenated
    // custom names the precompiler knows how to rewrite.
    let modifiers = ["DAGGER", "CONTROLLED", "FORKED"];
    let mut name_parts: Vec<String> = vec![];
    let mut rest = text;
    loop {
        let word = rest.split(['(', ' ']).next().unwrap_or("");
        name_parts.push(word.to_lowercase());
        rest = rest[word.len()..].trim_start();
        if !modifiers.iter().any(|m| word.eq_ignore_ascii_case(m)) {
            break;
        }
    }
    let name = name_parts.join("-");

    // Parameters.
    let params = if rest.starts_with('(') {
        let close = rest.find(')').ok_or_else(malformed)?;
        let inner = &rest[1..close];
        rest = rest[close + 1..].trim_start();
        inner
            .split(',')
            .map(eval_param)
            .collect::<QuilResult<Vec<f64>>>()?
    } else {
        vec![]
    };

    // Qubit operands.
    let qubits = rest
        .split_whitespace()
        .map(|w| w.parse::<u32>().map_err(|_| malformed()))
        .collect::<QuilResult<Vec<u32>>>()?;
    if qubits.is_empty() {
        return Err(malformed());
    }

    match standard_gate(&name, &params) {
        Some(gate) => circuit.gate(gate, qubits)?,
        None => {
            let custom =
                CustomGate::new(name, qubits.len() as u32).with_params(params);
            circuit.gate(custom, qubits)?
        }
    };
    Ok(())
}

/// Map a Quil gate name to the core vocabulary.
fn standard_gate(name: &str, params: &[f64]) -> Option<StandardGate> {
    let gate = match (name, params) {
        ("i", []) => StandardGate::I,
        ("x", []) => StandardGate::X,
        ("y", []) => StandardGate::Y,
        ("z", []) => StandardGate::Z,
        ("h", []) => StandardGate::H,
        ("s", []) => StandardGate::S,
        ("t", []) => StandardGate::T,
        ("rx", [t]) => StandardGate::Rx(*t),
        ("ry", [t]) => StandardGate::Ry(*t),
        ("rz", [t]) => StandardGate::Rz(*t),
        ("phase", [t]) => StandardGate::P(*t),
        ("cz", []) => StandardGate::CZ,
        ("cnot", []) => StandardGate::CX,
        ("ccnot", []) => StandardGate::CCX,
        ("swap", []) => StandardGate::Swap,
        ("cswap", []) => StandardGate::CSwap,
        ("iswap", []) => StandardGate::ISwap,
        ("cphase", [t]) => StandardGate::CP(*t),
        _ => return None,
    };
    Some(gate)
}

/// `ro[3]` → flat classical index.
fn resolve_memory(memory: &[(String, u32, u32)], reference: &str) -> QuilResult<u32> {
    let (name, offset) = match reference.find('[') {
        Some(open) => {
            let close = reference
                .find(']')
                .ok_or_else(|| QuilError::UnknownMemory(reference.to_string()))?;
            let offset = reference[open + 1..close]
                .parse::<u32>()
                .map_err(|_| QuilError::UnknownMemory(reference.to_string()))?;
            (&reference[..open], offset)
        }
        None => (reference, 0),
    };

    memory
        .iter()
        .find(|(region, _, size)| region == name && offset < *size)
        .map(|(_, start, _)| start + offset)
        .ok_or_else(|| QuilError::UnknownMemory(reference.to_string()))
}

/// Evaluate a parameter expression: numbers, `pi`, `+ - * /`, parentheses.
fn eval_param(text: &str) -> QuilResult<f64> {
    let mut chars: Vec<char> = text.trim().chars().filter(|c| !c.is_whitespace()).collect();
    chars.push('\0');
    let mut pos = 0;
    let value = eval_sum(&chars, &mut pos)
        .ok_or_else(|| QuilError::BadParameter(text.trim().to_string()))?;
    if chars[pos] == '\0' {
        Ok(value)
    } else {
        Err(QuilError::BadParameter(text.trim().to_string()))
    }
}

fn eval_sum(chars: &[char], pos: &mut usize) -> Option<f64> {
    let mut value = eval_product(chars, pos)?;
    loop {
        match chars[*pos] {
            '+' => {
                *pos += 1;
                value += eval_product(chars, pos)?;
            }
            '-' => {
                *pos += 1;
                value -= eval_product(chars, pos)?;
            }
            _ => return Some(value),
        }
    }
}

fn eval_product(chars: &[char], pos: &mut usize) -> Option<f64> {
    let mut value = eval_atom(chars, pos)?;
    loop {
        match chars[*pos] {
            '*' => {
                *pos += 1;
                value *= eval_atom(chars, pos)?;
            }
            '/' => {
                *pos += 1;
                value /= eval_atom(chars, pos)?;
            }
            _ => return Some(value),
        }
    }
}

fn eval_atom(chars: &[char], pos: &mut usize) -> Option<f64> {
    match chars[*pos] {
        '-' => {
            *pos += 1;
            Some(-eval_atom(chars, pos)?)
        }
        '(' => {
            *pos += 1;
            let value = eval_sum(chars, pos)?;
            if chars[*pos] != ')' {
                return None;
            }
            *pos += 1;
            Some(value)
        }
        'p' | 'P' => {
            if chars.get(*pos + 1).is_some_and(|c| *c == 'i' || *c == 'I') {
                *pos += 2;
                Some(std::f64::consts::PI)
            } else {
                None
            }
        }
        c if c.is_ascii_digit() || c == '.' => {
            let start = *pos;
            while chars[*pos].is_ascii_digit()
                || chars[*pos] == '.'
                || chars[*pos] == 'e'
                || chars[*pos] == 'E'
                || (matches!(chars[*pos], '+' | '-')
                    && matches!(chars[*pos - 1], 'e' | 'E'))
            {
                *pos += 1;
            }
            chars[start..*pos].iter().collect::<String>().parse().ok()
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skinfaxi_ir::OpKind;
    use std::f64::consts::PI;

    #[test]
    fn test_parse_bell() {
        let circuit = parse(
            "DECLARE ro BIT[2]\nH 0\nCNOT 0 1\nMEASURE 0 ro[0]\nMEASURE 1 ro[1]\n",
        )
        .unwrap();

        assert_eq!(circuit.num_qubits(), 2);
        assert_eq!(circuit.num_clbits(), 2);
        let names: Vec<_> = circuit.ops().iter().map(|op| op.name().to_string()).collect();
        assert_eq!(names, vec!["h", "cx", "measure", "measure"]);
    }

    #[test]
    fn test_parse_parameterized() {
        let circuit = parse("RX(pi/2) 0\nPHASE(-pi/4) 0\nCPHASE(0.25) 0 1\n").unwrap();
        let Some(skinfaxi_ir::Gate::Standard(StandardGate::Rx(theta))) =
            circuit.ops()[0].as_gate().cloned()
        else {
            panic!("expected rx");
        };
        assert!((theta - PI / 2.0).abs() < 1e-12);
        assert_eq!(circuit.ops()[2].name(), "cp");
    }

    #[test]
    fn test_qubit_space_from_indices() {
        let circuit = parse("H 4\n").unwrap();
        assert_eq!(circuit.num_qubits(), 5);
    }

    #[test]
    fn test_comments_and_pragmas_skipped() {
        let circuit = parse("# bell pair\nPRAGMA INITIAL_REWIRING \"GREEDY\"\nH 0\n").unwrap();
        assert_eq!(circuit.ops().len(), 1);
    }

    #[test]
    fn test_unknown_gate_becomes_custom() {
        let circuit = parse("XY(0.5) 0 1\n").unwrap();
        let gate = circuit.ops()[0].as_gate().unwrap();
        assert!(gate.is_custom());
        assert_eq!(gate.name(), "xy");
    }

    #[test]
    fn test_modifier_chain_becomes_custom() {
        let circuit = parse("DAGGER S 0\n").unwrap();
        let gate = circuit.ops()[0].as_gate().unwrap();
        assert!(gate.is_custom());
        assert_eq!(gate.name(), "dagger-s");
    }

    #[test]
    fn test_reset_forms() {
        let circuit = parse("H 1\nRESET 0\n").unwrap();
        assert!(matches!(circuit.ops()[1].kind, OpKind::Reset));

        let circuit = parse("H 1\nRESET\n").unwrap();
        let resets = circuit.ops().iter().filter(|op| op.is_reset()).count();
        assert_eq!(resets, 2);
    }

    #[test]
    fn test_non_bit_declare_rejected() {
        assert!(matches!(
            parse("DECLARE theta REAL[1]\n"),
            Err(QuilError::UnsupportedDeclaration { .. })
        ));
    }

    #[test]
    fn test_unknown_memory_rejected() {
        assert!(matches!(
            parse("MEASURE 0 out[0]\n"),
            Err(QuilError::UnknownMemory(_))
        ));
    }
}
