//! Consent-based teleport requests for Wayforge.
//!
//! One participant (the requester) asks another (the target) for permission
//! to teleport to them. The request stays pending until exactly one of
//! these happens: the target accepts, the target denies, the requester
//! cancels, the timeout expires, or either side leaves.
//!
//! # Key types
//!
//! - [`RequestManager`]: every entry point (send, accept, deny, cancel,
//!   expiry, disconnect)
//! - [`RequestRegistry`]: at most one pending request per target
//! - [`InteractionRequest`]: one pending request and its expiry timer
//! - [`Ledger`] / [`RequestPreferences`]: host services the manager reads
//! - [`RequestConfig`]: cost, timeout, default preference

mod config;
mod error;
mod manager;
mod registry;
mod request;
mod services;

pub use config::RequestConfig;
pub use error::RequestError;
pub use manager::{Accepted, RequestManager, RequestServices};
pub use registry::RequestRegistry;
pub use request::{InteractionRequest, RequestId};
pub use services::{Ledger, MemoryPreferences, RequestPreferences};
