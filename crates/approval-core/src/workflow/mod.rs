//! Workflow management module

pub mod coordinator;
pub mod state_machine;
pub mod traits;

pub use coordinator::{validate_new_request, Coordinator, RequestIdGenerator};
pub use state_machine::{check_report, next_transition, Transition};
pub use traits::{DispatchSink, Notifier, ResultRelay};
