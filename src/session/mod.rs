//! Session lifecycle translation.
//!
//! ```text
//! CreateSession ─▶ validator ─▶ provisioning ─▶ conflict ─▶ flow ─▶ NEF create ─▶ store
//! sessionId     ─▶ store ─▶ NEF delete ─▶ store
//! ```

pub mod conflict;
pub mod engine;
pub mod flow;
pub mod provisioning;
pub mod types;
pub mod validator;

pub use engine::{EngineOptions, SessionEngine};
pub use types::{
    AsId, CreateSession, PortRange, PortsSpec, QosProfile, SessionInfo, SessionRequest, UeId,
};
