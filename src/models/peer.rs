//! Peers announced by a TABLE_DUMP_V2 PEER_INDEX_TABLE record.
use bitflags::bitflags;
use std::net::{IpAddr, Ipv4Addr};

/// Number of per-prefix-length counters, one for every length 0..=128.
pub const PLEN_SLOTS: usize = 129;

bitflags! {
    /// Peer type flags of a peer entry.
    ///
    /// ```text
    ///  0 1 2 3 4 5 6 7
    /// +-+-+-+-+-+-+-+-+
    /// | | | | | | |A|I|
    /// +-+-+-+-+-+-+-+-+
    ///
    /// Bit 6: Peer AS number size:  0 = 16 bits, 1 = 32 bits
    /// Bit 7: Peer IP Address family:  0 = IPv4,  1 = IPv6
    /// ```
    #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct PeerType: u8 {
        const AS_SIZE_32BIT = 0x2;
        const ADDRESS_FAMILY_IPV6 = 0x1;
    }
}

/// Peer struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Peer {
    pub peer_type: PeerType,
    pub peer_bgp_id: Ipv4Addr,
    pub peer_address: IpAddr,
    pub peer_asn: u32,
}

impl Peer {
    pub fn new(peer_bgp_id: Ipv4Addr, peer_address: IpAddr, peer_asn: u32) -> Self {
        let mut peer_type = PeerType::empty();

        if peer_asn > u16::MAX as u32 {
            peer_type.insert(PeerType::AS_SIZE_32BIT);
        }

        if peer_address.is_ipv6() {
            peer_type.insert(PeerType::ADDRESS_FAMILY_IPV6);
        }

        Peer {
            peer_type,
            peer_bgp_id,
            peer_address,
            peer_asn,
        }
    }
}

/// Peer index table.
///
/// Peers are indexed positionally, in the order they appear in the record.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PeerIndexTable {
    pub collector_bgp_id: Ipv4Addr,
    pub view_name: String,
    pub peers: Vec<Peer>,
}

impl Default for PeerIndexTable {
    fn default() -> Self {
        PeerIndexTable {
            collector_bgp_id: Ipv4Addr::UNSPECIFIED,
            view_name: String::new(),
            peers: vec![],
        }
    }
}

impl PeerIndexTable {
    pub fn get_peer_by_id(&self, peer_id: u16) -> Option<&Peer> {
        self.peers.get(peer_id as usize)
    }
}

/// A peer index whose identity differs between two PEER_INDEX_TABLE records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerChange {
    pub index: u16,
    pub old: Peer,
    pub new: Peer,
}

/// Running route counters of one peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteCounters {
    pub route_count: u64,
    pub by_plen: [u64; PLEN_SLOTS],
}

impl Default for RouteCounters {
    fn default() -> Self {
        RouteCounters {
            route_count: 0,
            by_plen: [0; PLEN_SLOTS],
        }
    }
}

impl RouteCounters {
    pub fn record(&mut self, prefix_len: u8) {
        self.route_count += 1;
        if let Some(slot) = self.by_plen.get_mut(prefix_len as usize) {
            *slot += 1;
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
