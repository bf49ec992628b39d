//! AWS Braket proxy provider for Skinfaxi.
//!
//! Registers under the provider name `aws` and resolves hosted devices by
//! their friendly names (`"Aria 1"`, `"Harmony"`, `"Ankaa-3"`, `"SV1"`).
//! IonQ-family devices keep their IonQ identity in the device ARN; Rigetti
//! devices report the Quil exchange format so transpile responses come back
//! as Quil.
//!
//! # Authentication
//!
//! The provider requires `aws-access-key-id` and `aws-secret-access-key`
//! input parameters, with an optional `region` (defaulting to
//! `BRAKET_DEFAULT_REGION` or `eu-west-2` for managed simulators; QPUs use
//! their fixed home regions). Task outputs land in the bucket named by
//! `BRAKET_RESULTS_BUCKET`.

mod api;
mod backend;
mod device;
mod error;

pub use api::{BraketClient, TaskResult, TaskStatus};
pub use backend::{BraketProvider, BraketTarget, PROVIDER_NAME};
pub use device::{BraketDevice, lookup};
pub use error::{BraketError, BraketResult};
