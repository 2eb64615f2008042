//! The aggregate inventory accumulated across discovery passes

use serde::{Deserialize, Serialize};

use crate::device::{FailedDevice, RouterSwitch};
use crate::endpoint::{OtherDevice, Phone, WirelessAp};

/// Everything a discovery run produced, in discovery order.
///
/// Only the crawl controller appends to these lists, and only after a
/// pass's session batch has fully resolved; reporting collaborators
/// consume them read-only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inventory {
    pub routers_switches: Vec<RouterSwitch>,
    pub phones: Vec<Phone>,
    pub waps: Vec<WirelessAp>,
    pub others: Vec<OtherDevice>,
    pub failed_devices: Vec<FailedDevice>,
}

impl Inventory {
    /// Total number of records across all five lists
    pub fn len(&self) -> usize {
        self.routers_switches.len()
            + self.phones.len()
            + self.waps.len()
            + self.others.len()
            + self.failed_devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
