//! Per-peer counted sets over route attributes.
//!
//! Each set is a [PrefixTree] used as a multiset: the key is the binary
//! encoding of an attribute value and the payload is its occurrence count.
use crate::models::{Route, RouteCounters};
use crate::ptree::{addr_key, PrefixTree};
use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// AS path length keys are one byte wide.
const AS_PATH_LEN_KEY_BITS: u16 = 8;

fn bump(tree: &mut PrefixTree<u64>, key: &[u8], keylen: u16) {
    match tree.get_mut(key, keylen) {
        Some(count) => *count += 1,
        None => {
            tree.insert(key, keylen, 1);
        }
    }
}

/// Statistics of one peer.
#[derive(Debug, Default)]
pub struct PeerStat {
    pub counters: RouteCounters,
    nexthops: PrefixTree<u64>,
    origin_asns: PrefixTree<u64>,
    as_paths: PrefixTree<u64>,
    as_path_lens: PrefixTree<u64>,
}

impl PeerStat {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count `route` in every set.
    pub fn fold(&mut self, route: &Route) {
        self.counters.record(route.prefix_len());

        let (key, keylen) = addr_key(&route.nexthop);
        bump(&mut self.nexthops, &key, keylen);

        bump(&mut self.origin_asns, &route.origin_as.to_be_bytes(), 32);

        let path_key: Vec<u8> = route
            .as_path
            .iter()
            .flat_map(|asn| asn.to_be_bytes())
            .collect();
        bump(&mut self.as_paths, &path_key, (path_key.len() * 8) as u16);

        let path_len = route.path_size.min(u8::MAX as usize) as u8;
        bump(&mut self.as_path_lens, &[path_len], AS_PATH_LEN_KEY_BITS);
    }

    pub fn distinct_nexthops(&self) -> usize {
        self.nexthops.len()
    }

    pub fn distinct_origin_asns(&self) -> usize {
        self.origin_asns.len()
    }

    pub fn distinct_as_paths(&self) -> usize {
        self.as_paths.len()
    }

    pub fn distinct_as_path_lens(&self) -> usize {
        self.as_path_lens.len()
    }

    /// Next hops with their key length and count, in tree order.
    pub fn nexthops(&self) -> impl Iterator<Item = (IpAddr, u16, u64)> + '_ {
        self.nexthops.values().map(|(node, count)| {
            let key = node.key();
            let addr = match node.keylen() {
                128 => {
                    let mut octets = [0u8; 16];
                    octets.copy_from_slice(&key[..16]);
                    IpAddr::V6(Ipv6Addr::from(octets))
                }
                _ => {
                    let mut octets = [0u8; 4];
                    let n = key.len().min(4);
                    octets[..n].copy_from_slice(&key[..n]);
                    IpAddr::V4(Ipv4Addr::from(octets))
                }
            };
            (addr, node.keylen(), *count)
        })
    }

    pub fn origin_asns(&self) -> impl Iterator<Item = (u32, u64)> + '_ {
        self.origin_asns
            .values()
            .map(|(node, count)| (be_u32(node.key()), *count))
    }

    pub fn as_paths(&self) -> impl Iterator<Item = (Vec<u32>, u64)> + '_ {
        self.as_paths.values().map(|(node, count)| {
            let path = node.key().chunks_exact(4).map(be_u32).collect();
            (path, *count)
        })
    }

    pub fn as_path_lens(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.as_path_lens
            .values()
            .map(|(node, count)| (node.key().first().copied().unwrap_or(0), *count))
    }

    /// Count stored for exactly this AS path.
    pub fn as_path_count(&self, path: &[u32]) -> u64 {
        let key: Vec<u8> = path.iter().flat_map(|asn| asn.to_be_bytes()).collect();
        self.as_paths
            .get(&key, (key.len() * 8) as u16)
            .copied()
            .unwrap_or(0)
    }
}

fn be_u32(bytes: &[u8]) -> u32 {
    let mut octets = [0u8; 4];
    let n = bytes.len().min(4);
    octets[..n].copy_from_slice(&bytes[..n]);
    u32::from_be_bytes(octets)
}

/// Statistics of every peer that has seen a route, by peer index.
#[derive(Debug, Default)]
pub struct PeerStatAggregator {
    peers: BTreeMap<u16, PeerStat>,
}

impl PeerStatAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fold(&mut self, peer_index: u16, route: &Route) {
        self.peers.entry(peer_index).or_default().fold(route);
    }

    pub fn get(&self, peer_index: u16) -> Option<&PeerStat> {
        self.peers.get(&peer_index)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u16, &PeerStat)> {
        self.peers.iter().map(|(index, stat)| (*index, stat))
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}
