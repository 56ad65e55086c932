//! Clients for peer nodes and external collaborators

pub mod coordinator;
pub mod directory;
pub mod dispatch;
pub mod notifier;

pub use coordinator::GrpcCoordinatorClient;
pub use directory::{directory_from_config, EmployeeDirectory, HttpDirectory, OpenDirectory, StaticDirectory};
pub use dispatch::GrpcDispatchClient;
pub use notifier::HttpNotifier;
