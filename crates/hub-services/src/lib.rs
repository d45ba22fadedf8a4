//! hub-services: the session directory and routing core of the hub.
//!
//! Everything in here is driven by a single owner (`HubWorker`); other
//! tasks talk to it through a `HubHandle`.

pub mod allocator;
pub mod directory;
pub mod hub;
pub mod routing;
pub mod session;
pub mod sink;
pub mod stats;
pub mod traffic;
pub mod worker;

pub use allocator::SidAllocator;
pub use directory::SessionDirectory;
pub use hub::Hub;
pub use session::{Credentials, QuitReason, Session, SessionFlags, SessionState, SessionSummary};
pub use sink::{ChannelSink, OutboundSink};
pub use stats::{HubStats, Rate};
pub use traffic::{NetStats, TrafficSample, TrafficSource};
pub use worker::{HubHandle, HubRequest, HubSnapshot, HubWorker, Lookup};
