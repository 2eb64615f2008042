//! Router/switch device records produced by discovery

use serde::{Deserialize, Serialize};

/// Whether a device came from the initial seed set or was found
/// during a later discovery pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscoveryStatus {
    /// Part of the seed address set
    Existing,
    /// First observed as a CDP neighbor of an already-scanned device
    New,
}

impl Default for DiscoveryStatus {
    fn default() -> Self {
        Self::Existing
    }
}

/// Outcome of a connection attempt, or of one stage of it
/// (connectivity, authentication, authorization)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Attempt {
    Success,
    Failed,
}

/// One directed adjacency observed via CDP.
///
/// `local_interface` and `remote_interface` are relative to the device
/// that owns the link list. For a candidate that has never been logged
/// into, the link is recorded from the reporting side: `local_interface`
/// is the candidate's own port and `remote_interface` is the port on
/// the reporting neighbor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjacencyLink {
    pub neighbor_hostname: String,
    pub neighbor_ip_address: String,
    pub local_interface: String,
    pub remote_interface: String,
}

/// What the transport learns about a device it successfully logs into
/// (hostname and version facts, not CDP data)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceFacts {
    pub hostname: String,
    pub ip_address: String,
    pub software_version: String,
    pub model: String,
    /// Chassis serial number, when the transport collected it
    pub serial: Option<String>,
    /// How the session was established (e.g. "SSH", "TELNET")
    pub connection_type: Option<String>,
    /// ROMMON/bootloader version, when known
    pub rommon: Option<String>,
}

/// A router or switch in the final inventory. Identity key is the
/// hostname.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterSwitch {
    pub hostname: String,
    pub ip_address: String,
    pub software_version: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rommon: Option<String>,
    pub discovery_status: DiscoveryStatus,
    pub connection_attempt: Attempt,
    /// Adjacency links in discovery order. Empty for devices reached
    /// directly; populated for candidates seen only through neighbors.
    pub neighbors: Vec<AdjacencyLink>,
}

impl RouterSwitch {
    /// Build a record for a device the transport logged into.
    ///
    /// The discovery status defaults to `Existing`; the crawl controller
    /// relabels it per pass.
    pub fn from_facts(facts: &DeviceFacts) -> Self {
        Self {
            hostname: facts.hostname.clone(),
            ip_address: facts.ip_address.clone(),
            software_version: facts.software_version.clone(),
            model: facts.model.clone(),
            serial: facts.serial.clone(),
            connection_type: facts.connection_type.clone(),
            rommon: facts.rommon.clone(),
            discovery_status: DiscoveryStatus::Existing,
            connection_attempt: Attempt::Success,
            neighbors: Vec::new(),
        }
    }
}

/// A device that could not be logged into, with the stage each part of
/// the attempt reached
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedDevice {
    pub ip_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_type: Option<String>,
    pub connectivity: Attempt,
    pub authentication: Attempt,
    pub authorization: Attempt,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception: Option<String>,
    pub discovery_status: DiscoveryStatus,
}
