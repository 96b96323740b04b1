//! MRT Encoder module
//!
//! `encoder` serializes peers and routes back into TABLE_DUMP_V2 records. A
//! RIB dump starts with the peer index table, so routes are collected per
//! prefix first and written out in [MrtRibEncoder::export_bytes].
use crate::models::*;
use crate::parser::bgp::attributes::encode_as_path;
use crate::parser::{RibAfiEntries, RibEntry};
use bytes::{BufMut, Bytes, BytesMut};
use ipnet::IpNet;
use std::collections::HashMap;
use std::net::IpAddr;

/// Wrap a record body in an MRT common header.
pub fn encode_record(timestamp: u32, entry_type: u16, entry_subtype: u16, body: &[u8]) -> Bytes {
    let header = CommonHeader {
        timestamp,
        entry_type,
        entry_subtype,
        length: body.len() as u32,
    };
    let mut bytes = BytesMut::with_capacity(MRT_HEADER_LEN + body.len());
    bytes.extend(header.encode());
    bytes.extend_from_slice(body);
    bytes.freeze()
}

/// Encode a single path attribute, switching to a two-byte length when needed.
pub fn encode_attribute(flags: AttrFlags, attr_type: AttrType, value: &[u8]) -> Bytes {
    let mut bytes = BytesMut::with_capacity(value.len() + 4);
    let extended = value.len() > u8::MAX as usize;
    let flags = match extended {
        true => flags | AttrFlags::EXTENDED,
        false => flags - AttrFlags::EXTENDED,
    };
    bytes.put_u8(flags.bits());
    bytes.put_u8(attr_type.into());
    match extended {
        true => bytes.put_u16(value.len() as u16),
        false => bytes.put_u8(value.len() as u8),
    }
    bytes.extend_from_slice(value);
    bytes.freeze()
}

/// Encode the path attributes that describe `route`.
///
/// IPv6 next hops are written as an abbreviated MP_REACH_NLRI, the way
/// RIB entries carry them.
pub fn encode_route_attributes(route: &Route) -> Bytes {
    let mut bytes = BytesMut::new();

    if let Some(origin) = route.origin {
        bytes.extend(encode_attribute(
            AttrFlags::TRANSITIVE,
            AttrType::ORIGIN,
            &[origin.into()],
        ));
    }

    let mut path = AsPath::from_sequence(route.as_path.iter().copied());
    if !route.as_set.is_empty() {
        path.segments
            .push(AsPathSegment::AsSet(route.as_set.to_vec()));
    }
    bytes.extend(encode_attribute(
        AttrFlags::TRANSITIVE,
        AttrType::AS_PATH,
        &encode_as_path(&path),
    ));

    match route.nexthop {
        IpAddr::V4(v4) => bytes.extend(encode_attribute(
            AttrFlags::TRANSITIVE,
            AttrType::NEXT_HOP,
            &v4.octets(),
        )),
        IpAddr::V6(v6) => {
            let mut value = BytesMut::new();
            match route.nexthop2 {
                Some(link_local) => {
                    value.put_u8(32);
                    value.put_slice(&v6.octets());
                    value.put_slice(&link_local.octets());
                }
                None => {
                    value.put_u8(16);
                    value.put_slice(&v6.octets());
                }
            }
            bytes.extend(encode_attribute(
                AttrFlags::OPTIONAL,
                AttrType::MP_REACHABLE_NLRI,
                &value,
            ));
        }
    }

    if route.med != 0 {
        bytes.extend(encode_attribute(
            AttrFlags::OPTIONAL,
            AttrType::MULTI_EXIT_DISCRIMINATOR,
            &route.med.to_be_bytes(),
        ));
    }
    if route.local_pref != 0 {
        bytes.extend(encode_attribute(
            AttrFlags::TRANSITIVE,
            AttrType::LOCAL_PREFERENCE,
            &route.local_pref.to_be_bytes(),
        ));
    }
    if route.atomic_aggregate {
        bytes.extend(encode_attribute(
            AttrFlags::TRANSITIVE,
            AttrType::ATOMIC_AGGREGATE,
            &[],
        ));
    }
    if let Some((asn, id)) = route.aggregator {
        let mut value = BytesMut::with_capacity(8);
        value.put_u32(asn);
        value.put_slice(&id.octets());
        bytes.extend(encode_attribute(
            AttrFlags::OPTIONAL | AttrFlags::TRANSITIVE,
            AttrType::AGGREGATOR,
            &value,
        ));
    }
    if route.community != 0 {
        bytes.extend(encode_attribute(
            AttrFlags::OPTIONAL | AttrFlags::TRANSITIVE,
            AttrType::COMMUNITIES,
            &route.community.to_be_bytes(),
        ));
    }

    bytes.freeze()
}

/// Builds a complete TABLE_DUMP_V2 RIB dump in memory.
#[derive(Default)]
pub struct MrtRibEncoder {
    timestamp: u32,
    index_table: PeerIndexTable,
    prefixes: Vec<IpNet>,
    per_prefix_entries_map: HashMap<IpNet, Vec<RibEntry>>,
}

impl MrtRibEncoder {
    pub fn new(timestamp: u32) -> Self {
        MrtRibEncoder {
            timestamp,
            ..Default::default()
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.timestamp);
    }

    pub fn add_peer(&mut self, peer: Peer) -> u16 {
        self.index_table.add_peer(peer)
    }

    /// Add `route` as seen by the peer at `peer_index`.
    ///
    /// Prefixes get sequence numbers in the order they are first added.
    pub fn add_route(&mut self, peer_index: u16, route: &Route) {
        self.add_raw_entry(peer_index, route.prefix, encode_route_attributes(route));
    }

    /// Add an entry whose attribute block is given verbatim.
    pub fn add_raw_entry(&mut self, peer_index: u16, prefix: IpNet, attributes: Bytes) {
        let entries = match self.per_prefix_entries_map.get_mut(&prefix) {
            Some(entries) => entries,
            None => {
                self.prefixes.push(prefix);
                self.per_prefix_entries_map.entry(prefix).or_default()
            }
        };
        entries.push(RibEntry {
            peer_index,
            originated_time: self.timestamp,
            attributes,
        });
    }

    /// Export the peer index table followed by one RIB record per prefix.
    pub fn export_bytes(&self) -> Bytes {
        let mut bytes = BytesMut::new();
        bytes.extend(encode_record(
            self.timestamp,
            EntryType::TABLE_DUMP_V2.into(),
            TableDumpV2Type::PeerIndexTable.into(),
            &self.index_table.encode(),
        ));

        for (sequence_number, prefix) in self.prefixes.iter().enumerate() {
            let rib_type = match prefix {
                IpNet::V4(_) => TableDumpV2Type::RibIpv4Unicast,
                IpNet::V6(_) => TableDumpV2Type::RibIpv6Unicast,
            };
            let rib = RibAfiEntries {
                rib_type,
                sequence_number: sequence_number as u32,
                prefix: *prefix,
                rib_entries: self
                    .per_prefix_entries_map
                    .get(prefix)
                    .cloned()
                    .unwrap_or_default(),
            };
            bytes.extend(encode_record(
                self.timestamp,
                EntryType::TABLE_DUMP_V2.into(),
                rib_type.into(),
                &rib.encode(),
            ));
        }
        bytes.freeze()
    }
}
