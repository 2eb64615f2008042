//! Endpoint records: IP phones, wireless APs, and anything else that
//! showed up in a CDP table but is never crawled further

use serde::{Deserialize, Serialize};

use crate::directory::DirectoryEntry;

/// The reporting switch as seen from an endpoint.
///
/// `remote_interface` is the switchport the endpoint hangs off of;
/// `local_interface` (the endpoint's own port) is only reported for
/// `OtherDevice` records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighborRef {
    pub hostname: String,
    pub ip_address: String,
    pub remote_interface: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_interface: Option<String>,
}

/// An IP phone discovered as a CDP neighbor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Phone {
    pub hostname: String,
    pub ip_address: String,
    /// Canonical dotted form derived from the SEP hostname,
    /// e.g. "0011.aabb.ccdd"
    pub mac_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_vlan: Option<String>,
    pub software_version: String,
    pub model: String,
    pub neighbor: NeighborRef,
    /// Description and directory number merged from an external
    /// phone-directory export, when one was provided
    #[serde(flatten)]
    pub directory: Option<DirectoryEntry>,
}

/// A wireless access point discovered as a CDP neighbor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WirelessAp {
    pub hostname: String,
    pub ip_address: String,
    pub software_version: String,
    pub model: String,
    pub neighbor: NeighborRef,
}

/// A CDP neighbor that is neither a phone, an AP, nor a router/switch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtherDevice {
    pub hostname: String,
    pub ip_address: String,
    pub software_version: String,
    pub model: String,
    pub neighbor: NeighborRef,
}
