//! Daemon/CLI support for running a `drift_core::Engine` against an
//! on-disk store and identity, with a loopback transport for local
//! exercising (the real radio link is an external collaborator).

pub mod config;
pub mod error;
pub mod hasher;
pub mod identity_store;
pub mod transport;

pub use config::DaemonConfig;
pub use error::{Error, Result};
pub use hasher::Sha256Hasher;
pub use transport::LoopbackTransport;
