//! Netwalk Session - Transport contract and concurrent batch runner
//!
//! The concrete SSH/Telnet transport lives outside this workspace; this
//! crate defines what the discovery engine requires of it:
//! - `Credentials` for device management logins
//! - `DeviceSession`/`Transport` traits returning structured command rows
//! - `run_batch`, which fans sessions out over a target set and
//!   guarantees every target is accounted for as success or failure

pub mod batch;
pub mod credentials;
pub mod session;

pub use batch::{run_batch, BatchError, BatchLimits, BatchReport, SessionRecord};
pub use credentials::Credentials;
pub use session::{DeviceSession, Row, SessionError, Transport};
