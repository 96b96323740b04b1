use crate::formats::format_full;
use crate::models::{DiffFlag, Route, RouteCounters};
use crate::peerstat::PeerStat;
use itertools::Itertools;
use std::net::IpAddr;
use std::time::Duration;

/// Largest prefix length shown in per-length rows and reports.
pub const PLEN_REPORT_MAX: usize = 32;

/// `#timestamp,peer1,peer2,...` for `peer_count` peers.
pub fn format_count_header(peer_count: usize) -> String {
    let mut line = "#timestamp".to_string();
    for i in 1..=peer_count {
        line.push_str(&format!(",peer{}", i));
    }
    line
}

/// `{ts},{count0},{count1},...`
pub fn format_count_row<'a>(
    timestamp: u32,
    counters: impl IntoIterator<Item = &'a RouteCounters>,
) -> String {
    let counts = counters.into_iter().map(|c| c.route_count).join(",");
    match counts.is_empty() {
        true => timestamp.to_string(),
        false => format!("{},{}", timestamp, counts),
    }
}

/// `{ts},{c0},...,{c32}`
pub fn format_plen_row(timestamp: u32, counters: &RouteCounters) -> String {
    format!(
        "{},{}",
        timestamp,
        counters.by_plen[..=PLEN_REPORT_MAX].iter().join(",")
    )
}

/// Flag character followed by the full rendering.
pub fn format_diff_line(flag: DiffFlag, route: &Route) -> String {
    format!("{}{}", flag, format_full(route))
}

pub fn format_lookup_result(addr: &IpAddr, route: Option<&Route>) -> String {
    match route {
        Some(route) => format_full(route),
        None => format!("{}: no route found.", addr),
    }
}

/// `"{prefix}/{plen}: {nexthop}"`
pub fn format_tree_entry(route: &Route) -> String {
    format!(
        "{}/{}: {}",
        route.prefix.network(),
        route.prefix_len(),
        route.nexthop
    )
}

pub fn format_benchmark(queries: usize, elapsed: Duration) -> String {
    format!("{} queries in {:?}", queries, elapsed)
}

/// Statistics report of the peer at `index`.
///
/// With `verbose`, every key of each counted set is listed in tree order
/// before its total.
pub fn format_peer_stat(index: u16, stat: &PeerStat, verbose: bool) -> Vec<String> {
    let mut lines = vec![
        format!("peer[{}]:", index),
        format!("Number of routes: {}", stat.counters.route_count),
        "Number of routes per plen:".to_string(),
    ];
    for chunk in &(0..=PLEN_REPORT_MAX).chunks(5) {
        let row: String = chunk
            .map(|plen| format!("    /{:<2}: {:>6}", plen, stat.counters.by_plen[plen]))
            .collect();
        lines.push(row);
    }

    if verbose {
        for (addr, keylen, count) in stat.nexthops() {
            lines.push(format!("nexthop: {}/{}: count: {}", addr, keylen, count));
        }
    }
    lines.push(format!("Number of nexthops: {}", stat.distinct_nexthops()));

    if verbose {
        for (asn, count) in stat.origin_asns() {
            lines.push(format!("origin_as: {}/32: count: {}", asn, count));
        }
    }
    lines.push(format!("Number of origin_as: {}", stat.distinct_origin_asns()));

    if verbose {
        for (path, count) in stat.as_paths() {
            lines.push(format!(
                "unique as path:[{}]: count: {}",
                path.iter().join(" "),
                count
            ));
        }
    }
    lines.push(format!(
        "Number of unique as paths: {}",
        stat.distinct_as_paths()
    ));

    if verbose {
        for (len, count) in stat.as_path_lens() {
            lines.push(format!("as_path_len: {}/8: count: {}", len, count));
        }
    }
    lines.push(format!("Number of as path len: {}", stat.distinct_as_path_lens()));
    lines
}
