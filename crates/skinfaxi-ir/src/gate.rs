//! Gate kinds.
//!
//! Angles are concrete `f64` radians; the service never needs symbolic
//! parameters because programs are fully bound by the time they reach the
//! canonical form.

use serde::{Deserialize, Serialize};

/// Standard gates with known semantics.
///
/// Names follow the OpenQASM lowercase convention (`h`, `cx`, `rz`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    /// Identity gate.
    I,
    /// Pauli-X gate.
    X,
    /// Pauli-Y gate.
    Y,
    /// Pauli-Z gate.
    Z,
    /// Hadamard gate.
    H,
    /// S gate (sqrt(Z)).
    S,
    /// S-dagger gate.
    Sdg,
    /// T gate.
    T,
    /// T-dagger gate.
    Tdg,
    /// sqrt(X) gate.
    SX,
    /// sqrt(X)-dagger gate.
    SXdg,
    /// Rotation around X.
    Rx(f64),
    /// Rotation around Y.
    Ry(f64),
    /// Rotation around Z.
    Rz(f64),
    /// Phase gate.
    P(f64),
    /// Universal single-qubit gate U(θ, φ, λ).
    U(f64, f64, f64),

    /// Controlled-X (CNOT).
    CX,
    /// Controlled-Y.
    CY,
    /// Controlled-Z.
    CZ,
    /// Controlled-Hadamard.
    CH,
    /// SWAP gate.
    Swap,
    /// iSWAP gate.
    ISwap,
    /// Controlled rotation around X.
    CRx(f64),
    /// Controlled rotation around Y.
    CRy(f64),
    /// Controlled rotation around Z.
    CRz(f64),
    /// Controlled phase gate.
    CP(f64),
    /// XX rotation.
    RXX(f64),
    /// YY rotation.
    RYY(f64),
    /// ZZ rotation.
    RZZ(f64),

    /// Toffoli gate (CCX).
    CCX,
    /// Fredkin gate (CSWAP).
    CSwap,
}

impl StandardGate {
    /// OpenQASM name of this gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::I => "id",
            StandardGate::X => "x",
            StandardGate::Y => "y",
            StandardGate::Z => "z",
            StandardGate::H => "h",
            StandardGate::S => "s",
            StandardGate::Sdg => "sdg",
            StandardGate::T => "t",
            StandardGate::Tdg => "tdg",
            StandardGate::SX => "sx",
            StandardGate::SXdg => "sxdg",
            StandardGate::Rx(_) => "rx",
            StandardGate::Ry(_) => "ry",
            StandardGate::Rz(_) => "rz",
            StandardGate::P(_) => "p",
            StandardGate::U(_, _, _) => "u",
            StandardGate::CX => "cx",
            StandardGate::CY => "cy",
            StandardGate::CZ => "cz",
            StandardGate::CH => "ch",
            StandardGate::Swap => "swap",
            StandardGate::ISwap => "iswap",
            StandardGate::CRx(_) => "crx",
            StandardGate::CRy(_) => "cry",
            StandardGate::CRz(_) => "crz",
            StandardGate::CP(_) => "cp",
            StandardGate::RXX(_) => "rxx",
            StandardGate::RYY(_) => "ryy",
            StandardGate::RZZ(_) => "rzz",
            StandardGate::CCX => "ccx",
            StandardGate::CSwap => "cswap",
        }
    }

    /// Number of qubits this gate operates on.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            StandardGate::I
            | StandardGate::X
            | StandardGate::Y
            | StandardGate::Z
            | StandardGate::H
            | StandardGate::S
            | StandardGate::Sdg
            | StandardGate::T
            | StandardGate::Tdg
            | StandardGate::SX
            | StandardGate::SXdg
            | StandardGate::Rx(_)
            | StandardGate::Ry(_)
            | StandardGate::Rz(_)
            | StandardGate::P(_)
            | StandardGate::U(_, _, _) => 1,

            StandardGate::CX
            | StandardGate::CY
            | StandardGate::CZ
            | StandardGate::CH
            | StandardGate::Swap
            | StandardGate::ISwap
            | StandardGate::CRx(_)
            | StandardGate::CRy(_)
            | StandardGate::CRz(_)
            | StandardGate::CP(_)
            | StandardGate::RXX(_)
            | StandardGate::RYY(_)
            | StandardGate::RZZ(_) => 2,

            StandardGate::CCX | StandardGate::CSwap => 3,
        }
    }

    /// Angle parameters of this gate.
    pub fn params(&self) -> Vec<f64> {
        match self {
            StandardGate::Rx(t)
            | StandardGate::Ry(t)
            | StandardGate::Rz(t)
            | StandardGate::P(t)
            | StandardGate::CRx(t)
            | StandardGate::CRy(t)
            | StandardGate::CRz(t)
            | StandardGate::CP(t)
            | StandardGate::RXX(t)
            | StandardGate::RYY(t)
            | StandardGate::RZZ(t) => vec![*t],
            StandardGate::U(t, p, l) => vec![*t, *p, *l],
            _ => vec![],
        }
    }

    /// Construct a standard gate from its OpenQASM name and parameters.
    ///
    /// Returns `None` for unknown names or a parameter count that does not
    /// match the gate. This is the *core* vocabulary — aliases such as
    /// `cnot` or `u3` are resolved by the precompiler, not here.
    pub fn from_name(name: &str, params: &[f64]) -> Option<Self> {
        let gate = match (name, params) {
            ("id", []) => StandardGate::I,
            ("x", []) => StandardGate::X,
            ("y", []) => StandardGate::Y,
            ("z", []) => StandardGate::Z,
            ("h", []) => StandardGate::H,
            ("s", []) => StandardGate::S,
            ("sdg", []) => StandardGate::Sdg,
            ("t", []) => StandardGate::T,
            ("tdg", []) => StandardGate::Tdg,
            ("sx", []) => StandardGate::SX,
            ("sxdg", []) => StandardGate::SXdg,
            ("rx", [t]) => StandardGate::Rx(*t),
            ("ry", [t]) => StandardGate::Ry(*t),
            ("rz", [t]) => StandardGate::Rz(*t),
            ("p", [t]) => StandardGate::P(*t),
            ("u", [t, p, l]) => StandardGate::U(*t, *p, *l),
            ("cx", []) => StandardGate::CX,
            ("cy", []) => StandardGate::CY,
            ("cz", []) => StandardGate::CZ,
            ("ch", []) => StandardGate::CH,
            ("swap", []) => StandardGate::Swap,
            ("iswap", []) => StandardGate::ISwap,
            ("crx", [t]) => StandardGate::CRx(*t),
            ("cry", [t]) => StandardGate::CRy(*t),
            ("crz", [t]) => StandardGate::CRz(*t),
            ("cp", [t]) => StandardGate::CP(*t),
            ("rxx", [t]) => StandardGate::RXX(*t),
            ("ryy", [t]) => StandardGate::RYY(*t),
            ("rzz", [t]) => StandardGate::RZZ(*t),
            ("ccx", []) => StandardGate::CCX,
            ("cswap", []) => StandardGate::CSwap,
            _ => return None,
        };
        Some(gate)
    }
}

/// A user-defined gate the canonicalizer does not know.
///
/// Custom gates survive inside a circuit so the adaptation pipeline can
/// report them (and give the precompiler a chance to rewrite them) instead
/// of losing the name that caused the failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomGate {
    /// Name of the gate as written in the source.
    pub name: String,
    /// Number of qubits it operates on.
    pub num_qubits: u32,
    /// Angle parameters.
    pub params: Vec<f64>,
}

impl CustomGate {
    /// Create a new custom gate.
    pub fn new(name: impl Into<String>, num_qubits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            params: vec![],
        }
    }

    /// Attach parameters.
    #[must_use]
    pub fn with_params(mut self, params: Vec<f64>) -> Self {
        self.params = params;
        self
    }
}

/// A gate, either standard or custom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Gate {
    /// A standard gate with known semantics.
    Standard(StandardGate),
    /// A custom gate outside the core vocabulary.
    Custom(CustomGate),
}

impl Gate {
    /// Name of this gate.
    #[inline]
    pub fn name(&self) -> &str {
        match self {
            Gate::Standard(g) => g.name(),
            Gate::Custom(g) => &g.name,
        }
    }

    /// Number of qubits this gate operates on.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            Gate::Standard(g) => g.num_qubits(),
            Gate::Custom(g) => g.num_qubits,
        }
    }

    /// Angle parameters of this gate.
    pub fn params(&self) -> Vec<f64> {
        match self {
            Gate::Standard(g) => g.params(),
            Gate::Custom(g) => g.params.clone(),
        }
    }

    /// Whether this gate is outside the core vocabulary.
    pub fn is_custom(&self) -> bool {
        matches!(self, Gate::Custom(_))
    }
}

impl From<StandardGate> for Gate {
    fn from(gate: StandardGate) -> Self {
        Gate::Standard(gate)
    }
}

impl From<CustomGate> for Gate {
    fn from(gate: CustomGate) -> Self {
        Gate::Custom(gate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_gate_arity() {
        assert_eq!(StandardGate::H.num_qubits(), 1);
        assert_eq!(StandardGate::CX.num_qubits(), 2);
        assert_eq!(StandardGate::CCX.num_qubits(), 3);
        assert_eq!(StandardGate::U(PI, 0.0, PI).num_qubits(), 1);
    }

    #[test]
    fn test_from_name_core_vocabulary() {
        assert_eq!(StandardGate::from_name("h", &[]), Some(StandardGate::H));
        assert_eq!(
            StandardGate::from_name("rz", &[PI / 2.0]),
            Some(StandardGate::Rz(PI / 2.0))
        );
        // Aliases are not part of the core vocabulary.
        assert_eq!(StandardGate::from_name("cnot", &[]), None);
        assert_eq!(StandardGate::from_name("u3", &[PI, 0.0, PI]), None);
        // Wrong arity is rejected.
        assert_eq!(StandardGate::from_name("rx", &[]), None);
    }

    #[test]
    fn test_custom_gate() {
        let gate: Gate = CustomGate::new("mygate", 2).with_params(vec![0.25]).into();
        assert_eq!(gate.name(), "mygate");
        assert_eq!(gate.num_qubits(), 2);
        assert!(gate.is_custom());
    }
}
