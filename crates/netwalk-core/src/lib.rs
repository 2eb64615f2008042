//! Netwalk Core - Canonical records for network inventory discovery
//!
//! This crate provides the foundational types for the netwalk system:
//! - Router/switch device records with their adjacency links
//! - Endpoint records (IP phones, wireless APs, everything else)
//! - Failed-device records with per-stage connection outcomes
//! - The aggregate inventory handed to reporting collaborators
//! - External phone-directory import and merge

pub mod device;
pub mod directory;
pub mod endpoint;
pub mod inventory;

pub use device::{
    AdjacencyLink, Attempt, DeviceFacts, DiscoveryStatus, FailedDevice, RouterSwitch,
};
pub use directory::{import_directory, merge_directory, DirectoryEntry, DirectoryError};
pub use endpoint::{NeighborRef, OtherDevice, Phone, WirelessAp};
pub use inventory::Inventory;
