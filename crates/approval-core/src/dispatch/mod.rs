//! Dispatch node: per-approver queues and decision relay

pub mod node;
pub mod queue;

pub use node::DispatchNode;
pub use queue::DispatchQueue;
