//! Infrastructure layer for the rack-audit application.
//!
//! Contains file-system adapters (configuration, rack files) and the text
//! elevation renderer used by the CLI.
//!
//! **Dependency rule**: this layer may depend on `application` and `rack_core`,
//! but MUST NOT be imported by the `application` or domain layers.

pub mod elevation;
pub mod storage;
