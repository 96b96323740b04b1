//! Route decoded from one RIB entry.
use crate::models::{AsPath, AsPathSegment, AttributeValue, MpNextHop, Origin};
use crate::ptree::{net_key, KeyBytes};
use ipnet::IpNet;
use log::warn;
use smallvec::SmallVec;
use std::fmt::{Display, Formatter};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Maximum number of AS numbers kept from AS_SEQUENCE segments.
pub const ROUTE_PATH_LIMIT: usize = 64;
/// Maximum number of AS numbers kept from AS_SET segments.
pub const ROUTE_SET_LIMIT: usize = 64;

/// Classification written back into a route by the diff engine.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DiffFlag {
    /// `-`: only on the left side.
    Removed,
    /// `+`: only on the right side.
    Added,
    /// `(`: left-only, still covered by a right-side aggregate.
    AggregatedRemoval,
    /// `)`: right-only, still covered by a left-side aggregate.
    AggregatedAddition,
    /// `<`: left-only with no covering route on the right.
    GenuinelyRemoved,
    /// `>`: right-only with no covering route on the left.
    GenuinelyAdded,
}

impl DiffFlag {
    pub const fn as_char(&self) -> char {
        match self {
            DiffFlag::Removed => '-',
            DiffFlag::Added => '+',
            DiffFlag::AggregatedRemoval => '(',
            DiffFlag::AggregatedAddition => ')',
            DiffFlag::GenuinelyRemoved => '<',
            DiffFlag::GenuinelyAdded => '>',
        }
    }
}

impl Display for DiffFlag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    pub prefix: IpNet,
    pub nexthop: IpAddr,
    /// Link-local next hop when MP_REACH_NLRI carries two IPv6 addresses.
    pub nexthop2: Option<Ipv6Addr>,
    pub origin_as: u32,
    /// AS_SEQUENCE members, at most [ROUTE_PATH_LIMIT] kept.
    pub as_path: SmallVec<[u32; 16]>,
    /// Number of AS_SEQUENCE members on the wire, including any beyond the limit.
    pub path_size: usize,
    /// AS_SET members, at most [ROUTE_SET_LIMIT] kept.
    pub as_set: SmallVec<[u32; 4]>,
    pub origin: Option<Origin>,
    pub atomic_aggregate: bool,
    pub aggregator: Option<(u32, Ipv4Addr)>,
    pub local_pref: u32,
    pub med: u32,
    /// First COMMUNITY value only.
    pub community: u32,
    pub diff_flag: Option<DiffFlag>,
}

impl Route {
    pub fn new(prefix: IpNet) -> Self {
        let nexthop = match prefix {
            IpNet::V4(_) => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            IpNet::V6(_) => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
        };
        Route {
            prefix,
            nexthop,
            nexthop2: None,
            origin_as: 0,
            as_path: SmallVec::new(),
            path_size: 0,
            as_set: SmallVec::new(),
            origin: None,
            atomic_aggregate: false,
            aggregator: None,
            local_pref: 0,
            med: 0,
            community: 0,
            diff_flag: None,
        }
    }

    pub fn prefix_len(&self) -> u8 {
        self.prefix.prefix_len()
    }

    pub fn is_ipv4(&self) -> bool {
        matches!(self.prefix, IpNet::V4(_))
    }

    /// Tree key of the route's prefix.
    pub fn key(&self) -> (KeyBytes, u16) {
        net_key(&self.prefix)
    }

    /// Fold one decoded path attribute into the route.
    pub fn apply_attribute(&mut self, value: AttributeValue) {
        match value {
            AttributeValue::Origin(origin) => self.origin = Some(origin),
            AttributeValue::AsPath(path) => self.apply_as_path(path),
            AttributeValue::NextHop(addr) => self.nexthop = addr,
            AttributeValue::MultiExitDiscriminator(med) => self.med = med,
            AttributeValue::LocalPreference(pref) => self.local_pref = pref,
            AttributeValue::AtomicAggregate => self.atomic_aggregate = true,
            AttributeValue::Aggregator { asn, id } => self.aggregator = Some((asn, id)),
            AttributeValue::Communities(communities) => {
                if let Some(first) = communities.first() {
                    self.community = *first;
                }
            }
            AttributeValue::MpReachNlri(next_hop) => match next_hop {
                Some(MpNextHop::Ipv4(v4)) => self.nexthop = IpAddr::V4(v4),
                Some(MpNextHop::Ipv6(v6)) => self.nexthop = IpAddr::V6(v6),
                Some(MpNextHop::Ipv6LinkLocal(v6, link_local)) => {
                    self.nexthop = IpAddr::V6(v6);
                    self.nexthop2 = Some(link_local);
                }
                None => {}
            },
            AttributeValue::ExtendedCommunities(_) | AttributeValue::Skipped { .. } => {}
        }
    }

    fn apply_as_path(&mut self, path: AsPath) {
        let mut overflow = false;
        for segment in path.segments {
            let (asns, is_set) = match segment {
                AsPathSegment::AsSequence(asns) | AsPathSegment::ConfedSequence(asns) => {
                    (asns, false)
                }
                AsPathSegment::AsSet(asns) | AsPathSegment::ConfedSet(asns) => (asns, true),
            };
            if let Some(last) = asns.last() {
                self.origin_as = *last;
            }
            for asn in asns {
                if is_set {
                    if self.as_set.len() < ROUTE_SET_LIMIT {
                        self.as_set.push(asn);
                    } else {
                        overflow = true;
                    }
                } else {
                    self.path_size += 1;
                    if self.as_path.len() < ROUTE_PATH_LIMIT {
                        self.as_path.push(asn);
                    } else {
                        overflow = true;
                    }
                }
            }
        }
        if overflow {
            warn!(
                "path_list buffer overflow: {} path size {} set size {}",
                self.prefix,
                self.path_size,
                self.as_set.len()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_apply_as_path() {
        let mut route = Route::new(IpNet::from_str("10.0.0.0/8").unwrap());
        route.apply_attribute(AttributeValue::AsPath(AsPath {
            segments: vec![
                AsPathSegment::AsSequence(vec![64500, 64501]),
                AsPathSegment::AsSet(vec![64510, 64511]),
            ],
        }));
        assert_eq!(route.as_path.as_slice(), &[64500, 64501]);
        assert_eq!(route.as_set.as_slice(), &[64510, 64511]);
        assert_eq!(route.path_size, 2);
        assert_eq!(route.origin_as, 64511);
    }

    #[test]
    fn test_as_path_overflow_is_truncated() {
        let mut route = Route::new(IpNet::from_str("10.0.0.0/8").unwrap());
        route.apply_attribute(AttributeValue::AsPath(AsPath::from_sequence(1..=70)));
        assert_eq!(route.as_path.len(), ROUTE_PATH_LIMIT);
        assert_eq!(route.path_size, 70);
        assert_eq!(route.origin_as, 70);
    }

    #[test]
    fn test_apply_mp_next_hop() {
        let mut route = Route::new(IpNet::from_str("2001:db8::/32").unwrap());
        assert_eq!(route.nexthop, IpAddr::from_str("::").unwrap());
        route.apply_attribute(AttributeValue::MpReachNlri(Some(MpNextHop::Ipv6LinkLocal(
            Ipv6Addr::from_str("2001:db8::1").unwrap(),
            Ipv6Addr::from_str("fe80::1").unwrap(),
        ))));
        assert_eq!(route.nexthop, IpAddr::from_str("2001:db8::1").unwrap());
        assert_eq!(route.nexthop2, Some(Ipv6Addr::from_str("fe80::1").unwrap()));
    }

    #[test]
    fn test_diff_flag_chars() {
        let chars: String = [
            DiffFlag::Removed,
            DiffFlag::Added,
            DiffFlag::AggregatedRemoval,
            DiffFlag::AggregatedAddition,
            DiffFlag::GenuinelyRemoved,
            DiffFlag::GenuinelyAdded,
        ]
        .iter()
        .map(DiffFlag::as_char)
        .collect();
        assert_eq!(chars, "-+()<>");
    }
}
