//! Per-device inventory probe
//!
//! This is the work function each batch session runs: issue the three
//! show commands the normalizer needs and classify the output.

use netwalk_session::{DeviceSession, SessionError};

use crate::cdp::{classify_neighbors, NeighborReport};

pub const CDP_NEIGHBOR_DETAIL: &str = "show cdp neighbor detail";
pub const INTERFACE_SWITCHPORT: &str = "show interface switchport";
pub const MAC_ADDRESS_TABLE: &str = "show mac address-table";

/// Collect and normalize one device's CDP inventory.
pub async fn inventory_probe(
    session: &mut dyn DeviceSession,
) -> Result<NeighborReport, SessionError> {
    let neighbors = session.run_command(CDP_NEIGHBOR_DETAIL).await?;
    let switchports = session.run_command(INTERFACE_SWITCHPORT).await?;
    let mac_table = session.run_command(MAC_ADDRESS_TABLE).await?;
    let facts = session.facts().clone();
    Ok(classify_neighbors(&neighbors, &switchports, &mac_table, &facts))
}
