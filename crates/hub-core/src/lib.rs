//! hub-core: shared types for the hub: session identifiers, protocol
//! messages, configuration and errors.
//! All other hub crates depend on this one.

pub mod config;
pub mod error;
pub mod message;
pub mod sid;

pub use config::HubConfig;
pub use error::HubError;
pub use message::Message;
pub use sid::{Sid, SID_MAX};
