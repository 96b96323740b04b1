//! Text renderings of routes, peers and reports.
//!
//! Every function returns the line without a trailing newline.
mod report;

pub use report::*;

use crate::models::{Origin, Peer, PeerIndexTable, Route};
use itertools::Itertools;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// `"{prefix}/{plen} {nexthop}"`
pub fn format_brief(route: &Route) -> String {
    format!(
        "{}/{} {}",
        route.prefix.network(),
        route.prefix_len(),
        route.nexthop
    )
}

/// Prefix, next hop, origin AS and AS path, with AS_SET members in braces.
pub fn format_full(route: &Route) -> String {
    let mut line = format!(
        "{}/{} {} origin_as: {} as-path[{}]:",
        route.prefix.network(),
        route.prefix_len(),
        route.nexthop,
        route.origin_as,
        route.path_size
    );
    for asn in &route.as_path {
        line.push(' ');
        line.push_str(&asn.to_string());
    }
    if !route.as_set.is_empty() {
        line.push_str(&format!(" {{{}}}", route.as_set.iter().join(" ")));
    }
    line
}

/// Pipe-delimited line in the layout of `bgpdump -m` for RIB entries.
///
/// A missing ORIGIN is shown as INCOMPLETE.
pub fn format_compat(timestamp: u32, peer: Option<&Peer>, route: &Route) -> String {
    let (peer_addr, peer_asn) = match peer {
        Some(p) => (p.peer_address, p.peer_asn),
        None => (IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
    };
    let origin = route.origin.unwrap_or(Origin::INCOMPLETE);
    let atomic = match route.atomic_aggregate {
        true => "AG",
        false => "NAG",
    };
    format!(
        "TABLE_DUMP2|{}|B|{}|{}|{}/{}|{}|{}|{}|{}|{}|{}|{}||",
        timestamp,
        peer_addr,
        peer_asn,
        route.prefix.network(),
        route.prefix_len(),
        route.as_path.iter().join(" "),
        origin,
        route.nexthop,
        route.local_pref,
        route.med,
        route.community,
        atomic,
    )
}

/// `"{bgp_id} asn:{asn} [{ipv4}|{ipv6}]"`, the address family the peer does
/// not use shown unspecified.
pub fn format_peer(peer: &Peer) -> String {
    let (v4, v6) = match peer.peer_address {
        IpAddr::V4(v4) => (v4, Ipv6Addr::UNSPECIFIED),
        IpAddr::V6(v6) => (Ipv4Addr::UNSPECIFIED, v6),
    };
    format!(
        "{} asn:{} [{}|{}]",
        peer.peer_bgp_id, peer.peer_asn, v4, v6
    )
}

/// Header and one line per peer of a PEER_INDEX_TABLE.
pub fn format_peer_table(table: &PeerIndexTable) -> Vec<String> {
    let mut lines = Vec::with_capacity(table.peers.len() + 3);
    lines.push(format!("Collector BGP ID: {}", table.collector_bgp_id));
    lines.push(format!("View Name: {}", table.view_name));
    lines.push(format!("Peer Count: {}", table.peers.len()));
    for (index, peer) in table.peers.iter().enumerate() {
        lines.push(format!("Peer[{}]: {}", index, format_peer(peer)));
    }
    lines
}
