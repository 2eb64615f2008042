//! Field-name dialects for CDP neighbor output
//!
//! Classic IOS-style parsers label fields one way, NX-OS-style parsers
//! another. Rather than branching on field names inside every parse
//! function, the dialect is picked once per device by probing which
//! alias the first neighbor row carries.

use netwalk_session::Row;

/// Field aliases for one device-OS family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    pub hostname: &'static str,
    pub version: &'static str,
    pub mgmt_ip: &'static str,
    /// NX-style devices also report `sysname` (authoritative hostname
    /// when non-empty) and `interface_ip` (management-IP fallback)
    pub nx_style: bool,
}

pub const CLASSIC: Dialect = Dialect {
    hostname: "destination_host",
    version: "software_version",
    mgmt_ip: "management_ip",
    nx_style: false,
};

pub const NX: Dialect = Dialect {
    hostname: "dest_host",
    version: "version",
    mgmt_ip: "mgmt_ip",
    nx_style: true,
};

impl Dialect {
    /// Pick the dialect for one device's neighbor rows.
    pub fn detect(rows: &[Row]) -> &'static Dialect {
        match rows.first() {
            Some(row) if !row.contains_key(CLASSIC.hostname) => &NX,
            _ => &CLASSIC,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>()
    }

    #[test]
    fn test_detects_classic_fields() {
        let rows = vec![row(&[("destination_host", "SW1.example.com")])];
        assert_eq!(Dialect::detect(&rows), &CLASSIC);
    }

    #[test]
    fn test_detects_nx_fields() {
        let rows = vec![row(&[("dest_host", "NX1(FOC1234X0AB)")])];
        assert_eq!(Dialect::detect(&rows), &NX);
    }

    #[test]
    fn test_empty_output_defaults_to_classic() {
        assert_eq!(Dialect::detect(&[]), &CLASSIC);
    }
}
