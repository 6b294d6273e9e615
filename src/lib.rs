//! Smart-farming advisory core.
//!
//! [`advisor`] holds the plant diagnosis and assistant chat services,
//! [`gemini`] the remote model client they call, and [`config`] the TOML
//! configuration that decides whether a credential is available.

pub mod advisor;
pub mod config;
pub mod gemini;
