//! Concurrent session batch runner
//!
//! One discovery pass hands `run_batch` a frontier of target addresses
//! and a per-device work function. Sessions fan out concurrently and
//! fan back in before the pass continues; the crawl controller depends
//! on every unique target landing in exactly one of the successful or
//! failed lists. A lost task (the known transport flakiness) breaks
//! that accounting and triggers a full replay of the batch.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use netwalk_core::{DeviceFacts, FailedDevice};

use crate::credentials::Credentials;
use crate::session::{DeviceSession, SessionError, Transport};

/// One successful session's facts plus whatever the work function
/// returned for it
#[derive(Debug, Clone)]
pub struct SessionRecord<O> {
    pub facts: DeviceFacts,
    pub output: O,
}

/// Result of one batch: every unique target appears in exactly one of
/// `successful` or `failed`
#[derive(Debug, Clone)]
pub struct BatchReport<O> {
    pub outputs: Vec<SessionRecord<O>>,
    /// Target addresses that produced a session record
    pub successful: Vec<String>,
    pub failed: Vec<FailedDevice>,
}

/// Replay policy for inconsistent batch accounting
#[derive(Debug, Clone, Copy)]
pub struct BatchLimits {
    /// Attempts before an unreconciled batch becomes a terminal error
    pub max_attempts: u32,
}

impl Default for BatchLimits {
    fn default() -> Self {
        Self { max_attempts: 5 }
    }
}

#[derive(Error, Debug)]
pub enum BatchError {
    #[error(
        "batch accounting never reconciled after {attempts} attempts \
         ({resolved} of {targets} targets resolved)"
    )]
    Inconsistent {
        attempts: u32,
        resolved: usize,
        targets: usize,
    },
}

enum TaskOutcome<O> {
    Connected {
        target: String,
        record: SessionRecord<O>,
    },
    Failed(FailedDevice),
}

/// Run the work function against every unique target concurrently.
///
/// Duplicate targets are collapsed first (first occurrence wins). If
/// the completed batch does not account for every unique target, the
/// whole batch is replayed against the same set, up to
/// `limits.max_attempts` times.
pub async fn run_batch<T, W, Fut, O>(
    transport: Arc<T>,
    credentials: &Credentials,
    targets: &[String],
    work: W,
    limits: BatchLimits,
) -> Result<BatchReport<O>, BatchError>
where
    T: Transport + ?Sized + 'static,
    W: Fn(Box<dyn DeviceSession>) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<O, SessionError>> + Send + 'static,
    O: Send + 'static,
{
    let mut seen = HashSet::new();
    let unique: Vec<String> = targets
        .iter()
        .filter(|target| seen.insert(target.as_str()))
        .cloned()
        .collect();

    let mut last_resolved = 0;
    for attempt in 1..=limits.max_attempts.max(1) {
        let report = run_batch_once(&transport, credentials, &unique, work.clone()).await;
        let resolved = report.successful.len() + report.failed.len();
        if resolved == unique.len() {
            debug!(
                attempt,
                successful = report.successful.len(),
                failed = report.failed.len(),
                "batch accounting reconciled"
            );
            return Ok(report);
        }
        last_resolved = resolved;
        warn!(
            attempt,
            resolved,
            targets = unique.len(),
            "batch accounting inconsistent, replaying"
        );
    }

    Err(BatchError::Inconsistent {
        attempts: limits.max_attempts.max(1),
        resolved: last_resolved,
        targets: unique.len(),
    })
}

async fn run_batch_once<T, W, Fut, O>(
    transport: &Arc<T>,
    credentials: &Credentials,
    targets: &[String],
    work: W,
) -> BatchReport<O>
where
    T: Transport + ?Sized + 'static,
    W: Fn(Box<dyn DeviceSession>) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<O, SessionError>> + Send + 'static,
    O: Send + 'static,
{
    let mut tasks = JoinSet::new();

    for target in targets {
        let transport = Arc::clone(transport);
        let credentials = credentials.clone();
        let work = work.clone();
        let target = target.clone();
        tasks.spawn(async move {
            match transport.open(&credentials, &target).await {
                Ok(session) => {
                    let facts = session.facts().clone();
                    match work(session).await {
                        Ok(output) => TaskOutcome::Connected {
                            target,
                            record: SessionRecord { facts, output },
                        },
                        Err(error) => {
                            debug!(target = %target, error = %error, "device work failed");
                            TaskOutcome::Failed(error.to_failed_device(&target))
                        }
                    }
                }
                Err(error) => {
                    debug!(target = %target, error = %error, "failed to open session");
                    TaskOutcome::Failed(error.to_failed_device(&target))
                }
            }
        });
    }

    let mut report = BatchReport {
        outputs: Vec::new(),
        successful: Vec::new(),
        failed: Vec::new(),
    };
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(TaskOutcome::Connected { target, record }) => {
                report.successful.push(target);
                report.outputs.push(record);
            }
            Ok(TaskOutcome::Failed(record)) => {
                report.failed.push(record);
            }
            // The lost target shows up as an accounting shortfall
            Err(error) => warn!(error = %error, "session task lost"),
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::session::Row;

    struct FakeSession {
        facts: DeviceFacts,
    }

    #[async_trait]
    impl DeviceSession for FakeSession {
        fn facts(&self) -> &DeviceFacts {
            &self.facts
        }

        async fn run_command(&mut self, _command: &str) -> Result<Vec<Row>, SessionError> {
            Ok(Vec::new())
        }
    }

    /// Transport that knows a fixed set of reachable devices
    struct FakeTransport {
        reachable: Vec<(&'static str, &'static str)>,
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn open(
            &self,
            _credentials: &Credentials,
            target: &str,
        ) -> Result<Box<dyn DeviceSession>, SessionError> {
            match self.reachable.iter().find(|(ip, _)| *ip == target) {
                Some((ip, hostname)) => Ok(Box::new(FakeSession {
                    facts: DeviceFacts {
                        hostname: hostname.to_string(),
                        ip_address: ip.to_string(),
                        ..DeviceFacts::default()
                    },
                })),
                None => Err(SessionError::Unreachable),
            }
        }
    }

    fn credentials() -> Credentials {
        Credentials::new("admin", "secret", "")
    }

    fn targets(addresses: &[&str]) -> Vec<String> {
        addresses.iter().map(|a| a.to_string()).collect()
    }

    #[tokio::test]
    async fn test_every_target_is_accounted_for() {
        let transport = Arc::new(FakeTransport {
            reachable: vec![("10.0.0.1", "SW1"), ("10.0.0.2", "SW2")],
        });
        let report = run_batch(
            transport,
            &credentials(),
            &targets(&["10.0.0.1", "10.0.0.2", "10.0.0.3"]),
            |mut session| async move { session.run_command("show version").await },
            BatchLimits::default(),
        )
        .await
        .unwrap();

        assert_eq!(report.successful.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].ip_address, "10.0.0.3");
        assert_eq!(report.outputs.len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_targets_collapse_to_one_device() {
        let transport = Arc::new(FakeTransport {
            reachable: vec![("10.0.0.1", "SW1")],
        });
        let report = run_batch(
            transport,
            &credentials(),
            &targets(&["10.0.0.1", "10.0.0.1", "10.0.0.1"]),
            |session| async move {
                let _ = &session;
                Ok(())
            },
            BatchLimits::default(),
        )
        .await
        .unwrap();

        assert_eq!(report.successful, vec!["10.0.0.1".to_string()]);
        assert!(report.failed.is_empty());
    }

    #[tokio::test]
    async fn test_lost_task_triggers_replay() {
        let transport = Arc::new(FakeTransport {
            reachable: vec![("10.0.0.1", "SW1")],
        });
        let crashes = Arc::new(AtomicUsize::new(0));
        let crashes_in_work = Arc::clone(&crashes);
        let report = run_batch(
            transport,
            &credentials(),
            &targets(&["10.0.0.1"]),
            move |session| {
                let crashes = Arc::clone(&crashes_in_work);
                async move {
                    let _ = &session;
                    if crashes.fetch_add(1, Ordering::SeqCst) == 0 {
                        panic!("transport dropped this session on the floor");
                    }
                    Ok(())
                }
            },
            BatchLimits::default(),
        )
        .await
        .unwrap();

        assert_eq!(crashes.load(Ordering::SeqCst), 2);
        assert_eq!(report.successful, vec!["10.0.0.1".to_string()]);
    }

    #[tokio::test]
    async fn test_replay_limit_is_terminal() {
        let transport = Arc::new(FakeTransport {
            reachable: vec![("10.0.0.1", "SW1")],
        });
        let result: Result<BatchReport<()>, _> = run_batch(
            transport,
            &credentials(),
            &targets(&["10.0.0.1"]),
            |session| async move {
                let _ = &session;
                panic!("never consistent");
            },
            BatchLimits { max_attempts: 2 },
        )
        .await;

        match result {
            Err(BatchError::Inconsistent {
                attempts,
                resolved,
                targets,
            }) => {
                assert_eq!(attempts, 2);
                assert_eq!(resolved, 0);
                assert_eq!(targets, 1);
            }
            _ => panic!("expected BatchError::Inconsistent"),
        }
    }
}
