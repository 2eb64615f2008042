//! Multi-pass discovery loop controller
//!
//! Drives the crawl as an iterative worklist: each pass fans a session
//! batch out over the frontier, compiles the results, folds endpoints
//! and failures into the inventory, and builds the next frontier from
//! newly observed candidates. All crawl state lives in this call stack
//! and is mutated only between batches.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::info;

use netwalk_core::{Attempt, DiscoveryStatus, Inventory, RouterSwitch};
use netwalk_session::{run_batch, BatchError, BatchLimits, Credentials, Transport};

use crate::compiler::{compile_pass, HostnameMatching, KnownHostnames};
use crate::probe::inventory_probe;

/// Crawl behavior knobs
#[derive(Debug, Clone, Copy)]
pub struct CrawlConfig {
    /// Expand the crawl onto newly discovered devices until no new
    /// candidates remain
    pub recursive: bool,
    /// Predicate for recognizing already-known hostnames in CDP output
    pub matching: HostnameMatching,
    pub batch_limits: BatchLimits,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            recursive: true,
            matching: HostnameMatching::Containment,
            batch_limits: BatchLimits::default(),
        }
    }
}

#[derive(Error, Debug)]
pub enum CrawlError {
    #[error(transparent)]
    Batch(#[from] BatchError),
}

/// Timing and pass count for one completed run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub passes: u32,
}

/// Final inventory plus the run summary
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub inventory: Inventory,
    pub summary: RunSummary,
}

/// Recursive network inventory crawler
pub struct Crawler<T: Transport + ?Sized> {
    transport: Arc<T>,
    credentials: Credentials,
    config: CrawlConfig,
}

impl<T: Transport + ?Sized + 'static> Crawler<T> {
    pub fn new(transport: Arc<T>, credentials: Credentials, config: CrawlConfig) -> Self {
        Self {
            transport,
            credentials,
            config,
        }
    }

    /// Run discovery to convergence, starting from the seed addresses.
    pub async fn run(&self, seeds: &[String]) -> Result<CrawlReport, CrawlError> {
        let started_at = Utc::now();
        let crawl_start = Instant::now();

        let mut inventory = Inventory::default();
        let mut known = KnownHostnames::default();
        // Candidates observed via CDP but not yet connected to
        let mut pending: Vec<RouterSwitch> = Vec::new();
        let mut frontier: Vec<String> = seeds.to_vec();
        let mut status = DiscoveryStatus::Existing;
        let mut passes = 0u32;

        loop {
            passes += 1;
            info!(pass = passes, targets = frontier.len(), "starting discovery pass");
            let pass_start = Instant::now();

            let report = run_batch(
                Arc::clone(&self.transport),
                &self.credentials,
                &frontier,
                |mut session| async move { inventory_probe(session.as_mut()).await },
                self.config.batch_limits,
            )
            .await?;

            for mut failed in report.failed {
                failed.discovery_status = status;
                inventory.failed_devices.push(failed);
            }

            let outcome = compile_pass(&report.outputs, &known, self.config.matching);

            // Endpoints are leaves: appended every pass, never revisited
            for record in report.outputs {
                inventory.phones.extend(record.output.phones);
                inventory.waps.extend(record.output.waps);
                inventory.others.extend(record.output.others);
            }

            for mut device in outcome.connection_parsed {
                device.discovery_status = status;
                known.insert(device.hostname.clone());
                // Reached directly now, so any stale candidate goes
                if let Some(idx) = pending
                    .iter()
                    .position(|candidate| candidate.ip_address == device.ip_address)
                {
                    pending.remove(idx);
                }
                inventory.routers_switches.push(device);
            }

            info!(
                pass = passes,
                known = known.len(),
                candidates = outcome.new.len(),
                elapsed_secs = pass_start.elapsed().as_secs_f64(),
                "discovery pass finished"
            );

            let mut next_frontier = Vec::new();
            for candidate in outcome.new {
                known.insert(candidate.hostname.clone());
                // Candidates without a management address stay pooled
                // but can never be visited
                if !candidate.ip_address.is_empty() {
                    next_frontier.push(candidate.ip_address.clone());
                }
                pending.push(candidate);
            }

            if !self.config.recursive || next_frontier.is_empty() {
                break;
            }
            frontier = next_frontier;
            status = DiscoveryStatus::New;
        }

        // Observed-but-never-reached candidates keep their
        // accumulated links and land as failed new devices
        for mut candidate in pending {
            candidate.discovery_status = DiscoveryStatus::New;
            candidate.connection_attempt = Attempt::Failed;
            inventory.routers_switches.push(candidate);
        }

        let finished_at = Utc::now();
        info!(
            passes,
            routers_switches = inventory.routers_switches.len(),
            phones = inventory.phones.len(),
            waps = inventory.waps.len(),
            others = inventory.others.len(),
            failed = inventory.failed_devices.len(),
            elapsed_secs = crawl_start.elapsed().as_secs_f64(),
            "discovery complete"
        );

        Ok(CrawlReport {
            inventory,
            summary: RunSummary {
                started_at,
                finished_at,
                passes,
            },
        })
    }
}
