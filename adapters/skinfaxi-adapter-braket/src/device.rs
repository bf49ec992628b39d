//! Braket device catalog.
//!
//! Resolution follows the hosted-provider conventions: device names arrive
//! with spaces (`"Aria 1"`) and are normalized to the dashed form the ARNs
//! use; IonQ devices reached through the AWS provider keep their IonQ
//! identity for ARN construction and region selection; Rigetti devices use
//! the Quil exchange format for transpile responses.

use skinfaxi_hal::GateSet;
use skinfaxi_types::ExchangeFormat;

/// A known Braket device.
#[derive(Debug, Clone)]
pub struct BraketDevice {
    /// Dashed device name as it appears in the ARN (`Aria-1`).
    pub name: String,
    /// Hardware provider segment of the ARN (`ionq`, `rigetti`, `amazon`).
    pub hardware_provider: &'static str,
    /// Qubit count.
    pub num_qubits: u32,
    /// Whether this is a managed simulator.
    pub is_simulator: bool,
}

impl BraketDevice {
    /// Region the device is hosted in.
    pub fn region(&self) -> &'static str {
        match self.hardware_provider {
            "rigetti" => "us-west-1",
            _ => "us-east-1",
        }
    }

    /// Device ARN.
    pub fn arn(&self) -> String {
        if self.is_simulator {
            format!(
                "arn:aws:braket:::device/quantum-simulator/amazon/{}",
                self.name.to_lowercase()
            )
        } else {
            format!(
                "arn:aws:braket:{}::device/qpu/{}/{}",
                self.region(),
                self.hardware_provider,
                self.name
            )
        }
    }

    /// Gate set of the underlying hardware.
    pub fn gate_set(&self) -> GateSet {
        match self.hardware_provider {
            "ionq" => GateSet::ionq(),
            "rigetti" => GateSet::rigetti(),
            _ => GateSet::universal(),
        }
    }

    /// Exchange format of transpile responses for this device.
    pub fn exchange_format(&self) -> ExchangeFormat {
        if self.hardware_provider == "rigetti" {
            ExchangeFormat::Quil
        } else {
            ExchangeFormat::Qasm
        }
    }
}

/// Look up a device by its request name.
///
/// Spaces normalize to dashes; matching is case-insensitive. IonQ device
/// families (`Aria`, `Harmony`, `Forte`) are IonQ-provided even when the
/// request names the AWS provider.
pub fn lookup(device: &str) -> Option<BraketDevice> {
    let normalized = device.replace(' ', "-");
    let lowered = normalized.to_lowercase();

    let (name, hardware_provider, num_qubits, is_simulator) = match lowered.as_str() {
        "harmony" => ("Harmony", "ionq", 11, false),
        "aria-1" | "aria" => ("Aria-1", "ionq", 25, false),
        "aria-2" => ("Aria-2", "ionq", 25, false),
        "forte-1" | "forte" => ("Forte-1", "ionq", 36, false),
        "ankaa-3" | "ankaa" => ("Ankaa-3", "rigetti", 84, false),
        "aspen-m-3" | "aspen" => ("Aspen-M-3", "rigetti", 79, false),
        "sv1" => ("SV1", "amazon", 34, true),
        "tn1" => ("TN1", "amazon", 50, true),
        "dm1" => ("DM1", "amazon", 17, true),
        _ => return None,
    };

    Some(BraketDevice {
        name: name.to_string(),
        hardware_provider,
        num_qubits,
        is_simulator,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_space_normalization_and_ionq_aliasing() {
        let device = lookup("Aria 1").unwrap();
        assert_eq!(device.name, "Aria-1");
        assert_eq!(device.hardware_provider, "ionq");
        assert_eq!(device.region(), "us-east-1");
        assert_eq!(
            device.arn(),
            "arn:aws:braket:us-east-1::device/qpu/ionq/Aria-1"
        );
    }

    #[test]
    fn test_rigetti_uses_quil_and_west_region() {
        let device = lookup("ankaa-3").unwrap();
        assert_eq!(device.region(), "us-west-1");
        assert_eq!(device.exchange_format(), ExchangeFormat::Quil);
        assert!(device.gate_set().is_native("cz"));
    }

    #[test]
    fn test_simulator_arn() {
        let device = lookup("SV1").unwrap();
        assert!(device.is_simulator);
        assert_eq!(
            device.arn(),
            "arn:aws:braket:::device/quantum-simulator/amazon/sv1"
        );
        assert_eq!(device.exchange_format(), ExchangeFormat::Qasm);
    }

    #[test]
    fn test_unknown_device() {
        assert!(lookup("borealis").is_none());
    }
}
