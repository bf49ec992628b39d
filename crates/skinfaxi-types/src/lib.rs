//! Shared request vocabulary for Skinfaxi.
//!
//! This crate holds the small types that every layer of the service speaks:
//! typed input parameters ([`TypedParams`]), program locators
//! ([`ProgramLocator`]), and source-language tags ([`SourceLanguage`],
//! [`ExchangeFormat`]). It deliberately has no knowledge of circuits or
//! targets so that it can sit below every other crate in the workspace.

pub mod language;
pub mod locator;
pub mod params;

pub use language::{ExchangeFormat, SourceLanguage, UnknownLanguage};
pub use locator::{LocatorError, ProgramLocator};
pub use params::{TypedParams, TypedValue};
