//! Shared configuration types for the fgabridge workspace.
//!
//! Everything here is plain data: how to reach the OpenFGA backend and how
//! the bridge itself should listen. Resolution order is environment first,
//! CLI flags second (flags win when both are present); validation that
//! requires the backend (store-name lookup) happens lazily in
//! `fgabridge-client` when the shared client is first constructed.

pub mod config;

pub use config::{ApiScheme, ConfigError, FgaSettings, ServerSettings, Transport};
