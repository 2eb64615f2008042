//! Device descriptor normalizer for CDP neighbor output
//!
//! Takes one device's neighbor rows plus its switchport and MAC-table
//! rows and emits canonical records, classified into exactly one of
//! phone / router-switch / wireless-AP / other. Missing dialect fields
//! fail closed per-record: best-effort empty strings, never an aborted
//! pass.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::trace;

use netwalk_core::{DeviceFacts, NeighborRef, OtherDevice, Phone, WirelessAp};
use netwalk_session::Row;

use crate::dialect::Dialect;

/// A router/switch neighbor as reported by CDP, before deduplication.
///
/// `local_interface` is the candidate's own port; `remote_interface`
/// is the port on the device that reported it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawNeighbor {
    pub hostname: String,
    pub ip_address: String,
    pub software_version: String,
    pub model: String,
    pub local_interface: String,
    pub remote_interface: String,
}

/// Canonical output of one device's CDP tables
#[derive(Debug, Clone, Default)]
pub struct NeighborReport {
    pub phones: Vec<Phone>,
    pub waps: Vec<WirelessAp>,
    pub others: Vec<OtherDevice>,
    pub routers_switches: Vec<RawNeighbor>,
}

enum DeviceClass {
    Phone,
    RouterSwitch,
    WirelessAp,
    Other,
}

fn field<'a>(row: &'a Row, key: &str) -> &'a str {
    row.get(key).map(String::as_str).unwrap_or("")
}

/// First match wins; no neighbor lands in two collections.
fn device_class(row: &Row) -> DeviceClass {
    let capabilities = field(row, "capabilities");
    let platform = field(row, "platform");
    if platform.contains("IP Phone") || capabilities.contains("Phone") {
        DeviceClass::Phone
    } else if capabilities.contains("Switch")
        || (capabilities.contains("Router") && capabilities.contains("Source-Route-Bridge"))
    {
        DeviceClass::RouterSwitch
    } else if capabilities.contains("Trans-Bridge") {
        DeviceClass::WirelessAp
    } else {
        DeviceClass::Other
    }
}

/// Derive the canonical hostname: prefix before the first dot, text
/// before any serial-number parenthesis, NX sysname override last.
fn normalize_hostname(row: &Row, dialect: &Dialect) -> String {
    let mut hostname = field(row, dialect.hostname)
        .split('.')
        .next()
        .unwrap_or("")
        .to_string();
    if let Some(idx) = hostname.find('(') {
        hostname.truncate(idx);
    }
    if dialect.nx_style {
        let sysname = field(row, "sysname");
        if !sysname.is_empty() {
            hostname = sysname.to_string();
        }
    }
    hostname
}

/// NX-style devices omit the management IP on some neighbor types;
/// fall back to the interface IP when the field is empty.
fn management_ip(row: &Row, dialect: &Dialect) -> String {
    let mgmt_ip = field(row, dialect.mgmt_ip);
    if mgmt_ip.is_empty() && dialect.nx_style {
        field(row, "interface_ip").to_string()
    } else {
        mgmt_ip.to_string()
    }
}

/// Collapse the formatting variants of IOS/NX-OS version strings.
///
/// "Cisco IOS Software, Version 15.2(4)E, RELEASE SOFTWARE" becomes
/// "15.2(4)E"; "RTOS Version: 8.5.151.0" becomes "8.5.151.0"; plain
/// "version 6.2" output yields the word after the token.
pub fn normalize_version(raw: &str) -> String {
    if raw.contains(',') {
        for segment in raw.split(',') {
            if segment.contains("Version") {
                let tail = segment.split("Version").nth(1).unwrap_or("");
                let tail = tail.split("REL").next().unwrap_or(tail);
                return if tail.contains(':') {
                    tail.replace(": ", "")
                } else {
                    tail.replace(' ', "")
                };
            }
        }
        raw.to_string()
    } else if raw.contains("Version") || raw.contains("version") {
        let token = if raw.contains("Version") {
            "Version"
        } else {
            "version"
        };
        let mut seen_token = false;
        for word in raw.split(' ') {
            if word.contains(token) {
                seen_token = true;
                continue;
            }
            if seen_token && !word.is_empty() {
                return word.to_string();
            }
        }
        raw.to_string()
    } else {
        raw.to_string()
    }
}

/// Strip the vendor prefix from a platform string.
pub fn normalize_model(platform: &str) -> String {
    platform
        .strip_prefix("cisco ")
        .or_else(|| platform.strip_prefix("Cisco "))
        .unwrap_or(platform)
        .to_string()
}

fn phone_model(platform: &str) -> String {
    let platform = platform.strip_prefix("Cisco IP Phone ").unwrap_or(platform);
    normalize_model(platform)
}

/// Canonical dotted MAC from a SEP-prefixed phone hostname:
/// "SEP0011AABBCCDD" -> "0011.aabb.ccdd". Malformed hostnames fall
/// through lowercased rather than panicking.
pub fn phone_mac(hostname: &str) -> String {
    let cleaned = hostname.replace("SEP", "").to_lowercase();
    if cleaned.len() >= 12 && cleaned.is_ascii() {
        format!("{}.{}.{}", &cleaned[0..4], &cleaned[4..8], &cleaned[8..12])
    } else {
        cleaned
    }
}

static DIGIT_TAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d.*").expect("static pattern"));

/// Normalize interface naming to the short form used by switchport
/// tables: "GigabitEthernet1/0/1" and "Gi1/0/1" both become "Gi1/0/1".
pub fn short_interface(interface: &str) -> String {
    let prefix = interface.get(0..2).unwrap_or(interface);
    match DIGIT_TAIL.find(interface) {
        Some(tail) => format!("{}{}", prefix, tail.as_str()),
        None => interface.to_string(),
    }
}

/// Look up a phone's voice VLAN via its switchport, keeping it only
/// when a MAC-table row corroborates the VLAN.
fn voice_vlan(local_interface: &str, switchports: &[Row], mac_table: &[Row]) -> Option<String> {
    let short = short_interface(local_interface);
    let switchport = switchports
        .iter()
        .find(|row| field(row, "interface") == short)?;
    let voice = field(switchport, "voice_vlan");
    mac_table
        .iter()
        .find(|row| field(row, "vlan") == voice)
        .map(|row| field(row, "vlan").to_string())
}

fn phone_record(
    row: &Row,
    dialect: &Dialect,
    switchports: &[Row],
    mac_table: &[Row],
    reporter: &DeviceFacts,
) -> Phone {
    let hostname = normalize_hostname(row, dialect);
    let local_port = field(row, "local_port");
    Phone {
        mac_address: phone_mac(&hostname),
        voice_vlan: voice_vlan(local_port, switchports, mac_table),
        ip_address: management_ip(row, dialect),
        software_version: field(row, dialect.version).replace(".loads", ""),
        model: phone_model(field(row, "platform")),
        neighbor: NeighborRef {
            hostname: reporter.hostname.clone(),
            ip_address: reporter.ip_address.clone(),
            remote_interface: local_port.to_string(),
            local_interface: None,
        },
        directory: None,
        hostname,
    }
}

fn router_switch_record(row: &Row, dialect: &Dialect) -> RawNeighbor {
    RawNeighbor {
        hostname: normalize_hostname(row, dialect),
        ip_address: management_ip(row, dialect),
        software_version: normalize_version(field(row, dialect.version)),
        model: normalize_model(field(row, "platform")),
        local_interface: field(row, "remote_port").to_string(),
        remote_interface: field(row, "local_port").to_string(),
    }
}

fn wap_record(row: &Row, dialect: &Dialect, reporter: &DeviceFacts) -> WirelessAp {
    WirelessAp {
        hostname: normalize_hostname(row, dialect),
        ip_address: management_ip(row, dialect),
        software_version: normalize_version(field(row, dialect.version)),
        model: normalize_model(field(row, "platform")),
        neighbor: NeighborRef {
            hostname: reporter.hostname.clone(),
            ip_address: reporter.ip_address.clone(),
            remote_interface: field(row, "local_port").to_string(),
            local_interface: None,
        },
    }
}

fn other_record(row: &Row, dialect: &Dialect, reporter: &DeviceFacts) -> OtherDevice {
    OtherDevice {
        hostname: normalize_hostname(row, dialect),
        ip_address: management_ip(row, dialect),
        software_version: normalize_version(field(row, dialect.version)),
        model: normalize_model(field(row, "platform")),
        neighbor: NeighborRef {
            hostname: reporter.hostname.clone(),
            ip_address: reporter.ip_address.clone(),
            remote_interface: field(row, "local_port").to_string(),
            local_interface: Some(field(row, "remote_port").to_string()),
        },
    }
}

/// Normalize one device's CDP tables into canonical records.
pub fn classify_neighbors(
    neighbors: &[Row],
    switchports: &[Row],
    mac_table: &[Row],
    reporter: &DeviceFacts,
) -> NeighborReport {
    let dialect = Dialect::detect(neighbors);
    let mut report = NeighborReport::default();

    for row in neighbors {
        match device_class(row) {
            DeviceClass::Phone => {
                report
                    .phones
                    .push(phone_record(row, dialect, switchports, mac_table, reporter));
            }
            DeviceClass::RouterSwitch => {
                report.routers_switches.push(router_switch_record(row, dialect));
            }
            DeviceClass::WirelessAp => report.waps.push(wap_record(row, dialect, reporter)),
            DeviceClass::Other => report.others.push(other_record(row, dialect, reporter)),
        }
    }

    trace!(
        reporter = %reporter.hostname,
        phones = report.phones.len(),
        waps = report.waps.len(),
        others = report.others.len(),
        routers_switches = report.routers_switches.len(),
        "neighbors classified"
    );
    report
}
