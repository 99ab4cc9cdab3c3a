//! Default configuration values shared between the library and the CLI
//!
//! Values for the confirmation budget match the RDS deletion waiter:
//! 90 attempts, 10 seconds apart.

use std::time::Duration;

/// Default AWS region
pub const DEFAULT_REGION: &str = "us-east-1";

/// Number of existence polls before a deletion is declared timed out
pub const DEFAULT_CONFIRM_ATTEMPTS: u32 = 90;

/// Delay between two existence polls
pub const DEFAULT_CONFIRM_INTERVAL: Duration = Duration::from_secs(10);

/// Page size for paginated describe calls (RDS accepts 20..=100)
pub const DEFAULT_PAGE_SIZE: i32 = 100;
