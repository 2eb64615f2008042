//! Device session traits the discovery engine consumes
//!
//! A transport implementation logs into one device, collects its
//! version facts, and executes show commands whose output it parses
//! into rows of named fields. The engine never sees the wire protocol.

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

use netwalk_core::{Attempt, DeviceFacts, DiscoveryStatus, FailedDevice};

use crate::credentials::Credentials;

/// One parsed row of a device command's output, keyed by field name
pub type Row = HashMap<String, String>;

#[derive(Error, Debug, Clone)]
pub enum SessionError {
    #[error("device unreachable")]
    Unreachable,
    #[error("authentication rejected")]
    AuthenticationFailed,
    #[error("authorization rejected")]
    AuthorizationFailed,
    #[error("unsupported command: {0}")]
    UnsupportedCommand(String),
    #[error("transport failure: {0}")]
    Transport(String),
}

impl SessionError {
    /// Map this failure onto a per-stage failed-device record.
    ///
    /// A failure at one stage marks that stage and every later stage
    /// `Failed`; stages that completed before it stay `Success`. The
    /// discovery status is a placeholder until the crawl controller
    /// labels the pass.
    pub fn to_failed_device(&self, target: &str) -> FailedDevice {
        let (connectivity, authentication, authorization) = match self {
            Self::Unreachable => (Attempt::Failed, Attempt::Failed, Attempt::Failed),
            Self::AuthenticationFailed => (Attempt::Success, Attempt::Failed, Attempt::Failed),
            Self::AuthorizationFailed => (Attempt::Success, Attempt::Success, Attempt::Failed),
            Self::UnsupportedCommand(_) | Self::Transport(_) => {
                (Attempt::Success, Attempt::Success, Attempt::Success)
            }
        };
        FailedDevice {
            ip_address: target.to_string(),
            connection_type: None,
            device_type: None,
            connectivity,
            authentication,
            authorization,
            exception: Some(self.to_string()),
            discovery_status: DiscoveryStatus::Existing,
        }
    }
}

/// An open session to one device
#[async_trait]
pub trait DeviceSession: Send {
    /// Version facts gathered while establishing the session
    fn facts(&self) -> &DeviceFacts;

    /// Execute a show command, returning its parsed rows
    async fn run_command(&mut self, command: &str) -> Result<Vec<Row>, SessionError>;
}

/// Opens sessions to devices; implemented by the external transport
/// (and by in-memory fakes in tests)
#[async_trait]
pub trait Transport: Send + Sync {
    async fn open(
        &self,
        credentials: &Credentials,
        target: &str,
    ) -> Result<Box<dyn DeviceSession>, SessionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreachable_fails_every_stage() {
        let failed = SessionError::Unreachable.to_failed_device("10.0.0.9");
        assert_eq!(failed.ip_address, "10.0.0.9");
        assert_eq!(failed.connectivity, Attempt::Failed);
        assert_eq!(failed.authentication, Attempt::Failed);
        assert_eq!(failed.authorization, Attempt::Failed);
    }

    #[test]
    fn test_auth_failure_keeps_connectivity() {
        let failed = SessionError::AuthenticationFailed.to_failed_device("10.0.0.9");
        assert_eq!(failed.connectivity, Attempt::Success);
        assert_eq!(failed.authentication, Attempt::Failed);
        assert_eq!(failed.authorization, Attempt::Failed);
    }

    #[test]
    fn test_command_failure_keeps_login_stages() {
        let failed = SessionError::UnsupportedCommand("show cdp neighbor detail".to_string())
            .to_failed_device("10.0.0.9");
        assert_eq!(failed.connectivity, Attempt::Success);
        assert_eq!(failed.authentication, Attempt::Success);
        assert_eq!(failed.authorization, Attempt::Success);
        assert!(failed.exception.unwrap().contains("show cdp neighbor detail"));
    }
}
