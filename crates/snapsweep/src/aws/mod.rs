//! AWS service layer
//!
//! - [`context`]: Per-region SDK configuration
//! - [`error`]: SDK error classification into [`ServiceError`](crate::nuke::ServiceError)
//! - [`rds`]: RDS cluster and instance snapshot services

pub mod context;
pub mod error;
pub mod rds;

pub use context::AwsContext;
pub use error::classify_aws_error;
pub use rds::{RdsClusterSnapshots, RdsSnapshots};
