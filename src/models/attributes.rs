//! BGP path attributes carried in TABLE_DUMP_V2 RIB entries.
use bitflags::bitflags;
use num_enum::{FromPrimitive, IntoPrimitive, TryFromPrimitive};
use std::fmt::{Display, Formatter};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

bitflags! {
    /// Attribute flags octet.
    ///
    /// The high-order bit is the Optional bit, then Transitive, Partial and
    /// Extended Length. With Extended Length set, the attribute length field
    /// is two octets instead of one.
    #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct AttrFlags: u8 {
        const OPTIONAL   = 0b10000000;
        const TRANSITIVE = 0b01000000;
        const PARTIAL    = 0b00100000;
        const EXTENDED   = 0b00010000;
    }
}

/// Attribute type codes this crate knows by name.
///
/// <https://www.iana.org/assignments/bgp-parameters/bgp-parameters.xhtml#bgp-parameters-2>
#[allow(non_camel_case_types)]
#[derive(Debug, FromPrimitive, IntoPrimitive, PartialEq, Eq, Hash, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum AttrType {
    RESERVED = 0,
    ORIGIN = 1,
    AS_PATH = 2,
    NEXT_HOP = 3,
    MULTI_EXIT_DISCRIMINATOR = 4,
    LOCAL_PREFERENCE = 5,
    ATOMIC_AGGREGATE = 6,
    AGGREGATOR = 7,
    COMMUNITIES = 8,
    ORIGINATOR_ID = 9,
    CLUSTER_LIST = 10,
    MP_REACHABLE_NLRI = 14,
    MP_UNREACHABLE_NLRI = 15,
    EXTENDED_COMMUNITIES = 16,
    AS4_PATH = 17,
    AS4_AGGREGATOR = 18,
    LARGE_COMMUNITIES = 32,
    #[num_enum(catch_all)]
    Unknown(u8),
}

#[allow(non_camel_case_types)]
#[derive(Debug, TryFromPrimitive, IntoPrimitive, PartialEq, Eq, Hash, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Origin {
    IGP = 0,
    EGP = 1,
    INCOMPLETE = 2,
}

impl Display for Origin {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Origin::IGP => write!(f, "IGP"),
            Origin::EGP => write!(f, "EGP"),
            Origin::INCOMPLETE => write!(f, "INCOMPLETE"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AsPathSegment {
    AsSequence(Vec<u32>),
    AsSet(Vec<u32>),
    ConfedSequence(Vec<u32>),
    ConfedSet(Vec<u32>),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AsPath {
    pub segments: Vec<AsPathSegment>,
}

impl AsPath {
    pub fn from_sequence<I: IntoIterator<Item = u32>>(asns: I) -> Self {
        AsPath {
            segments: vec![AsPathSegment::AsSequence(asns.into_iter().collect())],
        }
    }
}

/// Next hop(s) carried in MP_REACH_NLRI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MpNextHop {
    Ipv4(Ipv4Addr),
    Ipv6(Ipv6Addr),
    /// Global address followed by a link-local address.
    Ipv6LinkLocal(Ipv6Addr, Ipv6Addr),
}

/// Decoded value of a single path attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttributeValue {
    Origin(Origin),
    AsPath(AsPath),
    NextHop(IpAddr),
    MultiExitDiscriminator(u32),
    LocalPreference(u32),
    AtomicAggregate,
    Aggregator { asn: u32, id: Ipv4Addr },
    Communities(Vec<u32>),
    MpReachNlri(Option<MpNextHop>),
    ExtendedCommunities(Vec<[u8; 8]>),
    /// Recognized framing, value not interpreted.
    Skipped { attr_type: AttrType, length: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attr_type_catch_all() {
        assert_eq!(AttrType::from(2u8), AttrType::AS_PATH);
        assert_eq!(AttrType::from(200u8), AttrType::Unknown(200));
        assert_eq!(u8::from(AttrType::MP_REACHABLE_NLRI), 14);
    }

    #[test]
    fn test_attr_flags() {
        let flags = AttrFlags::from_bits_retain(0x90);
        assert!(flags.contains(AttrFlags::OPTIONAL));
        assert!(flags.contains(AttrFlags::EXTENDED));
        assert!(!flags.contains(AttrFlags::TRANSITIVE));
    }

    #[test]
    fn test_origin_display() {
        assert_eq!(Origin::try_from(1u8).unwrap().to_string(), "EGP");
        assert!(Origin::try_from(3u8).is_err());
    }
}
