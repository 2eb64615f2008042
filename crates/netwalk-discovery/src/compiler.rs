//! Neighbor compiler: separates one pass's session outputs into
//! connection-parsed devices and new candidates
//!
//! CDP-reported hostnames carry decorations the authoritative hostname
//! does not (domain suffixes, serial annotations), so recognizing an
//! already-scanned device uses a containment predicate rather than
//! equality. Repeated sightings of the same new candidate merge into a
//! single node that accumulates adjacency links.

use std::collections::HashSet;
use tracing::debug;

use netwalk_core::{AdjacencyLink, Attempt, DiscoveryStatus, RouterSwitch};
use netwalk_session::SessionRecord;

use crate::cdp::{NeighborReport, RawNeighbor};

/// Predicate used to decide whether a CDP-reported hostname refers to
/// an already-known device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostnameMatching {
    /// Plain substring containment. Compatible with historical
    /// behavior, but "SW1" also covers "SW10".
    Containment,
    /// Containment where the match must sit on non-alphanumeric
    /// boundaries, so "SW1" covers "SW1.lab.example.com" but not
    /// "SW10".
    WordBoundary,
}

impl HostnameMatching {
    /// Does `known` cover the CDP-reported `reported` hostname?
    pub fn covers(self, reported: &str, known: &str) -> bool {
        match self {
            Self::Containment => reported.contains(known),
            Self::WordBoundary => contains_on_boundary(reported, known),
        }
    }
}

fn contains_on_boundary(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    let mut start = 0;
    while let Some(pos) = haystack[start..].find(needle) {
        let at = start + pos;
        let end = at + needle.len();
        let before_ok = haystack[..at]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = haystack[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        if before_ok && after_ok {
            return true;
        }
        start = end;
    }
    false
}

/// Hostnames of every router/switch reached in any pass so far.
/// Grows monotonically; consulted only through the covering predicate.
#[derive(Debug, Clone, Default)]
pub struct KnownHostnames {
    names: HashSet<String>,
}

impl KnownHostnames {
    pub fn insert(&mut self, hostname: String) {
        self.names.insert(hostname);
    }

    pub fn covers(&self, reported: &str, matching: HostnameMatching) -> bool {
        self.names
            .iter()
            .any(|known| matching.covers(reported, known))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// One pass's compilation result
#[derive(Debug, Clone, Default)]
pub struct PassOutcome {
    /// Devices reached over a session this pass, marked Success
    pub connection_parsed: Vec<RouterSwitch>,
    /// Candidates observed via CDP but never yet connected to, one
    /// record per hostname with accumulated links
    pub new: Vec<RouterSwitch>,
}

fn candidate(raw: &RawNeighbor, link: AdjacencyLink) -> RouterSwitch {
    RouterSwitch {
        hostname: raw.hostname.clone(),
        ip_address: raw.ip_address.clone(),
        software_version: raw.software_version.clone(),
        model: raw.model.clone(),
        serial: None,
        connection_type: None,
        rommon: None,
        discovery_status: DiscoveryStatus::New,
        connection_attempt: Attempt::Failed,
        neighbors: vec![link],
    }
}

/// Compile one pass's session outputs against the known-hostname set.
pub fn compile_pass(
    outputs: &[SessionRecord<NeighborReport>],
    known: &KnownHostnames,
    matching: HostnameMatching,
) -> PassOutcome {
    let pass_hostnames: Vec<&str> = outputs
        .iter()
        .map(|record| record.facts.hostname.as_str())
        .collect();

    let mut outcome = PassOutcome::default();
    for record in outputs {
        outcome
            .connection_parsed
            .push(RouterSwitch::from_facts(&record.facts));

        for raw in &record.output.routers_switches {
            let covered = pass_hostnames
                .iter()
                .any(|hostname| matching.covers(&raw.hostname, hostname))
                || known.covers(&raw.hostname, matching);
            if covered {
                continue;
            }

            // Links on a candidate are recorded from the reporting side
            let link = AdjacencyLink {
                neighbor_hostname: record.facts.hostname.clone(),
                neighbor_ip_address: record.facts.ip_address.clone(),
                local_interface: raw.local_interface.clone(),
                remote_interface: raw.remote_interface.clone(),
            };
            match outcome
                .new
                .iter_mut()
                .find(|device| device.hostname == raw.hostname)
            {
                Some(existing) => existing.neighbors.push(link),
                None => outcome.new.push(candidate(raw, link)),
            }
        }
    }

    debug!(
        connection_parsed = outcome.connection_parsed.len(),
        new = outcome.new.len(),
        "pass compiled"
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    use netwalk_core::DeviceFacts;

    fn facts(hostname: &str, ip: &str) -> DeviceFacts {
        DeviceFacts {
            hostname: hostname.to_string(),
            ip_address: ip.to_string(),
            ..DeviceFacts::default()
        }
    }

    fn raw(hostname: &str, ip: &str) -> RawNeighbor {
        RawNeighbor {
            hostname: hostname.to_string(),
            ip_address: ip.to_string(),
            software_version: "15.2(4)E".to_string(),
            model: "WS-C2960X-48FPD-L".to_string(),
            local_interface: "Gi1/0/49".to_string(),
            remote_interface: "Gi1/0/48".to_string(),
        }
    }

    fn record(
        hostname: &str,
        ip: &str,
        routers_switches: Vec<RawNeighbor>,
    ) -> SessionRecord<NeighborReport> {
        SessionRecord {
            facts: facts(hostname, ip),
            output: NeighborReport {
                routers_switches,
                ..NeighborReport::default()
            },
        }
    }

    fn known(names: &[&str]) -> KnownHostnames {
        let mut set = KnownHostnames::default();
        for name in names {
            set.insert(name.to_string());
        }
        set
    }

    #[test]
    fn test_known_neighbors_are_skipped() {
        let outputs = vec![record(
            "CORE1",
            "10.0.0.1",
            vec![raw("CORE2.lab.example.com", "10.0.0.2"), raw("SW9", "10.0.0.9")],
        )];
        let outcome = compile_pass(&outputs, &known(&["CORE2"]), HostnameMatching::Containment);

        assert_eq!(outcome.connection_parsed.len(), 1);
        assert_eq!(outcome.new.len(), 1);
        assert_eq!(outcome.new[0].hostname, "SW9");
    }

    #[test]
    fn test_pass_hostnames_cover_candidates() {
        // CORE2 was reached this very pass, so its decorated CDP name
        // must not re-enter as a candidate
        let outputs = vec![
            record("CORE1", "10.0.0.1", vec![raw("CORE2.lab.example.com", "10.0.0.2")]),
            record("CORE2", "10.0.0.2", vec![]),
        ];
        let outcome = compile_pass(&outputs, &KnownHostnames::default(), HostnameMatching::Containment);
        assert!(outcome.new.is_empty());
    }

    #[test]
    fn test_two_reporters_one_candidate_two_links() {
        let outputs = vec![
            record("CORE1", "10.0.0.1", vec![raw("SW9", "10.0.0.9")]),
            record("CORE2", "10.0.0.2", vec![raw("SW9", "10.0.0.9")]),
        ];
        let outcome = compile_pass(&outputs, &KnownHostnames::default(), HostnameMatching::Containment);

        assert_eq!(outcome.new.len(), 1);
        let sw9 = &outcome.new[0];
        assert_eq!(sw9.neighbors.len(), 2);
        assert_eq!(sw9.neighbors[0].neighbor_hostname, "CORE1");
        assert_eq!(sw9.neighbors[1].neighbor_hostname, "CORE2");
        assert_eq!(sw9.connection_attempt, Attempt::Failed);
    }

    #[test]
    fn test_compilation_is_idempotent() {
        let outputs = vec![record("CORE1", "10.0.0.1", vec![raw("SW9", "10.0.0.9")])];
        let known = known(&["CORE1"]);

        let first = compile_pass(&outputs, &known, HostnameMatching::Containment);
        let second = compile_pass(&outputs, &known, HostnameMatching::Containment);

        let hostnames = |outcome: &PassOutcome| {
            outcome
                .new
                .iter()
                .map(|d| d.hostname.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(hostnames(&first), hostnames(&second));
        assert_eq!(first.new.len(), 1);
    }

    #[test]
    fn test_containment_absorbs_prefix_collision() {
        // The historical predicate treats SW10 as already covered by SW1
        let outputs = vec![record("CORE1", "10.0.0.1", vec![raw("SW10", "10.0.0.10")])];
        let outcome = compile_pass(&outputs, &known(&["SW1"]), HostnameMatching::Containment);
        assert!(outcome.new.is_empty());
    }

    #[test]
    fn test_word_boundary_keeps_prefix_collision() {
        let outputs = vec![record(
            "CORE1",
            "10.0.0.1",
            vec![raw("SW10", "10.0.0.10"), raw("SW1.lab.example.com", "10.0.0.11")],
        )];
        let outcome = compile_pass(&outputs, &known(&["SW1"]), HostnameMatching::WordBoundary);

        assert_eq!(outcome.new.len(), 1);
        assert_eq!(outcome.new[0].hostname, "SW10");
    }

    #[test]
    fn test_boundary_matching_handles_equality() {
        assert!(HostnameMatching::WordBoundary.covers("SW1", "SW1"));
        assert!(HostnameMatching::WordBoundary.covers("SW1.lab.example.com", "SW1"));
        assert!(!HostnameMatching::WordBoundary.covers("SW10", "SW1"));
        assert!(!HostnameMatching::WordBoundary.covers("MYSW1", "SW1"));
    }
}
