//! # drift-core
//!
//! Core of an opportunistic, delay-tolerant notification dissemination
//! engine: wire format, persistent store, and the Direct / Epidemic /
//! Binary Spray-and-Wait forwarding strategies that share them.
//!
//! The radio transport itself (connection establishment, advertisement,
//! MTU negotiation, link-layer retransmits), UI, address-book
//! provisioning, and key derivation/hashing primitives are explicit
//! external collaborators — see [`transport::Transport`] and
//! [`hasher::Hasher`] for the two seams this crate is generic over.

pub mod address;
pub mod control;
pub mod engine;
pub mod error;
pub mod hasher;
pub mod notification;
pub mod store;
pub mod strategy;
pub mod transport;
pub mod wire;

pub use address::Address;
pub use control::ControlByte;
pub use engine::{Engine, ReceiveOutcome};
pub use error::{Error, Result};
pub use hasher::Hasher;
pub use notification::Notification;
pub use store::Store;
pub use strategy::Strategy;
pub use transport::Transport;
