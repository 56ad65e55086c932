//! Notification fan-out

pub mod registry;

pub use registry::{ChannelRegistry, ConnectionId};
