//! Gate sets and qubit connectivity.

use serde::{Deserialize, Serialize};

/// Gate set supported by a target.
///
/// Gate names follow the OpenQASM lowercase convention. The `native` list
/// identifies gates that execute without further decomposition; when it is
/// empty, every supported gate is considered native (typical for
/// simulators).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateSet {
    /// Single-qubit gates supported.
    pub single_qubit: Vec<String>,
    /// Two-qubit gates supported.
    pub two_qubit: Vec<String>,
    /// Three-qubit gates supported.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub three_qubit: Vec<String>,
    /// Native gates (executed without decomposition).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub native: Vec<String>,
}

impl GateSet {
    /// The full canonical vocabulary. Used by simulators.
    pub fn universal() -> Self {
        Self {
            single_qubit: vec![
                "id".into(),
                "x".into(),
                "y".into(),
                "z".into(),
                "h".into(),
                "s".into(),
                "sdg".into(),
                "t".into(),
                "tdg".into(),
                "sx".into(),
                "sxdg".into(),
                "rx".into(),
                "ry".into(),
                "rz".into(),
                "p".into(),
                "u".into(),
            ],
            two_qubit: vec![
                "cx".into(),
                "cy".into(),
                "cz".into(),
                "ch".into(),
                "swap".into(),
                "iswap".into(),
                "crx".into(),
                "cry".into(),
                "crz".into(),
                "cp".into(),
                "rxx".into(),
                "ryy".into(),
                "rzz".into(),
            ],
            three_qubit: vec!["ccx".into(), "cswap".into()],
            native: vec![],
        }
    }

    /// IonQ trapped-ion gate set.
    ///
    /// The cloud API accepts the standard vocabulary and compiles to the
    /// native set (rx/ry/rz + the XX entangler) on the server.
    pub fn ionq() -> Self {
        Self {
            single_qubit: vec![
                "x".into(),
                "y".into(),
                "z".into(),
                "h".into(),
                "s".into(),
                "sdg".into(),
                "t".into(),
                "tdg".into(),
                "rx".into(),
                "ry".into(),
                "rz".into(),
                "sx".into(),
                "sxdg".into(),
            ],
            two_qubit: vec!["cx".into(), "swap".into(), "rxx".into(), "ryy".into(), "rzz".into()],
            three_qubit: vec![],
            native: vec!["rx".into(), "ry".into(), "rz".into(), "rxx".into()],
        }
    }

    /// Rigetti superconducting gate set: rx/rz native with a CZ entangler.
    pub fn rigetti() -> Self {
        Self {
            single_qubit: vec!["rx".into(), "rz".into(), "x".into(), "h".into(), "sx".into()],
            two_qubit: vec!["cz".into(), "cx".into()],
            three_qubit: vec![],
            native: vec!["rx".into(), "rz".into(), "cz".into()],
        }
    }

    /// Check if a gate is supported.
    pub fn contains(&self, gate: &str) -> bool {
        self.single_qubit.iter().any(|g| g == gate)
            || self.two_qubit.iter().any(|g| g == gate)
            || self.three_qubit.iter().any(|g| g == gate)
    }

    /// Check if a gate is native (no decomposition needed).
    ///
    /// An empty `native` list means every supported gate is native.
    pub fn is_native(&self, gate: &str) -> bool {
        if self.native.is_empty() {
            self.contains(gate)
        } else {
            self.native.iter().any(|g| g == gate)
        }
    }
}

/// Qubit connectivity.
///
/// An empty edge list means any-to-any connectivity. Edges are
/// bidirectional: if `(a, b)` is listed, both directions are valid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Topology {
    /// Coupling edges between qubit indices.
    pub edges: Vec<(u32, u32)>,
}

impl Topology {
    /// Any-to-any connectivity.
    pub fn any_to_any() -> Self {
        Self::default()
    }

    /// Linear chain over `n` qubits.
    pub fn linear(n: u32) -> Self {
        Self {
            edges: (0..n.saturating_sub(1)).map(|i| (i, i + 1)).collect(),
        }
    }

    /// Custom topology from an explicit edge list.
    pub fn custom(edges: Vec<(u32, u32)>) -> Self {
        Self { edges }
    }

    /// Whether two qubits may interact directly.
    pub fn is_connected(&self, q1: u32, q2: u32) -> bool {
        self.edges.is_empty()
            || self
                .edges
                .iter()
                .any(|&(a, b)| (a == q1 && b == q2) || (a == q2 && b == q1))
    }
}
