//! Quality-on-Demand session service.
//!
//! Exposes the QoD session API to application clients and maps every session
//! to an AsSessionWithQoS subscription on a 5G NEF.

pub mod api;
pub mod auth;
pub mod config;
pub mod credentials;
pub mod error;
pub mod nef;
pub mod server;
pub mod session;
pub mod store;
pub mod version;

pub use error::{ErrorCode, ErrorInfo};
