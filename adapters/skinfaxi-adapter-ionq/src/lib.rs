//! IonQ cloud provider for Skinfaxi.
//!
//! Registers under the provider name `ionq`. Devices are resolved against
//! the live backend catalog (`simulator`, `qpu.harmony`, `qpu.aria-1`, ...)
//! with lenient name matching, so `"Harmony"` and `"aria 1"` both work.
//!
//! # Authentication
//!
//! The provider requires a `token` input parameter; it becomes the
//! `Authorization: apiKey <token>` header on every request. Set
//! `IONQ_PORTAL_URL` to point the client at a proxy or test server.

mod api;
mod backend;
mod error;

pub use api::{BackendInfo, IonqClient, IonqOp, JobRequest};
pub use backend::{IonqProvider, IonqTarget, PROVIDER_NAME};
pub use error::{IonqError, IonqResult};
