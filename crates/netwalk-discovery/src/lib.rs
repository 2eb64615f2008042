//! Netwalk Discovery - Multi-pass network inventory crawl engine
//!
//! This crate turns seed addresses into a full device inventory:
//! - `cdp` normalizes heterogeneous CDP neighbor output into canonical
//!   phone/AP/other/router-switch records
//! - `probe` is the per-device work function run inside each session
//! - `compiler` separates already-known devices from new candidates and
//!   merges repeated sightings into single nodes
//! - `crawl` drives the pass loop until no new devices remain

pub mod cdp;
pub mod compiler;
pub mod crawl;
pub mod dialect;
pub mod probe;

pub use cdp::{classify_neighbors, NeighborReport, RawNeighbor};
pub use compiler::{compile_pass, HostnameMatching, KnownHostnames, PassOutcome};
pub use crawl::{CrawlConfig, CrawlError, CrawlReport, Crawler, RunSummary};
pub use dialect::Dialect;
pub use probe::inventory_probe;
