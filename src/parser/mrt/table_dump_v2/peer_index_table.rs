use crate::models::{Afi, AsnLength, Peer, PeerIndexTable, PeerType};
use crate::parser::ReadUtils;
use crate::ParserError;
use bytes::{BufMut, Bytes, BytesMut};
use std::net::{IpAddr, Ipv4Addr};

/// Parses a byte slice into a [PeerIndexTable].
///
/// RFC: https://www.rfc-editor.org/rfc/rfc6396#section-4.3.1
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                      Collector BGP ID                         |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |       View Name Length        |     View Name (variable)      |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |          Peer Count           |    Peer Entries (variable)
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// Peers are indexed by their position in the record.
pub fn parse_peer_index_table(data: &mut Bytes) -> Result<PeerIndexTable, ParserError> {
    let collector_bgp_id = Ipv4Addr::from(data.read_u32()?);
    let view_name_length = data.read_u16()?;
    let view_name = String::from_utf8(data.read_n_bytes(view_name_length as usize)?)
        .unwrap_or_default();

    let peer_count = data.read_u16()?;
    let mut peers = Vec::with_capacity(peer_count as usize);
    for _index in 0..peer_count {
        let peer_type = PeerType::from_bits_retain(data.read_u8()?);
        let afi = match peer_type.contains(PeerType::ADDRESS_FAMILY_IPV6) {
            true => Afi::Ipv6,
            false => Afi::Ipv4,
        };
        let asn_len = match peer_type.contains(PeerType::AS_SIZE_32BIT) {
            true => AsnLength::Bits32,
            false => AsnLength::Bits16,
        };

        let peer_bgp_id = Ipv4Addr::from(data.read_u32()?);
        let peer_address: IpAddr = data.read_address(&afi)?;
        let peer_asn = data.read_asn(asn_len)?;
        peers.push(Peer {
            peer_type,
            peer_bgp_id,
            peer_address,
            peer_asn,
        })
    }

    Ok(PeerIndexTable {
        collector_bgp_id,
        view_name,
        peers,
    })
}

impl PeerIndexTable {
    /// Append a peer and return its index.
    pub fn add_peer(&mut self, peer: Peer) -> u16 {
        self.peers.push(peer);
        (self.peers.len() - 1) as u16
    }

    /// Encode the table as a PEER_INDEX_TABLE record body.
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::new();

        buf.put_u32(self.collector_bgp_id.into());

        let view_name_bytes = self.view_name.as_bytes();
        buf.put_u16(view_name_bytes.len() as u16);
        buf.extend(view_name_bytes);

        buf.put_u16(self.peers.len() as u16);

        for peer in &self.peers {
            buf.put_u8(peer.peer_type.bits());
            buf.put_u32(peer.peer_bgp_id.into());
            match peer.peer_address {
                IpAddr::V4(ipv4) => buf.put_slice(&ipv4.octets()),
                IpAddr::V6(ipv6) => buf.put_slice(&ipv6.octets()),
            };
            match peer.peer_type.contains(PeerType::AS_SIZE_32BIT) {
                true => buf.put_u32(peer.peer_asn),
                false => buf.put_u16(peer.peer_asn as u16),
            };
        }

        buf.freeze()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_peer_index_table_three_peers() {
        let mut index_table = PeerIndexTable {
            collector_bgp_id: Ipv4Addr::from(1234),
            view_name: String::from("example"),
            peers: vec![],
        };

        index_table.add_peer(Peer::new(
            Ipv4Addr::from_str("10.0.0.1").unwrap(),
            IpAddr::from_str("192.168.1.1").unwrap(),
            64500,
        ));
        index_table.add_peer(Peer::new(
            Ipv4Addr::from_str("10.0.0.2").unwrap(),
            IpAddr::from_str("2001:db8::2").unwrap(),
            64501,
        ));
        assert_eq!(
            index_table.add_peer(Peer::new(
                Ipv4Addr::from_str("10.0.0.3").unwrap(),
                IpAddr::from_str("192.168.1.3").unwrap(),
                4200000000,
            )),
            2
        );

        let encoded = index_table.encode();
        // 4 + 2 + 7 + 2, then 1+4+4+2, 1+4+16+2, 1+4+4+4
        assert_eq!(encoded.len(), 15 + 11 + 23 + 13);
        let parsed = parse_peer_index_table(&mut encoded.clone()).unwrap();
        assert_eq!(parsed, index_table);
        assert_eq!(parsed.get_peer_by_id(2).unwrap().peer_asn, 4200000000);
        assert!(parsed.get_peer_by_id(3).is_none());
    }

    #[test]
    fn test_truncated_peer_entry() {
        let mut index_table = PeerIndexTable::default();
        index_table.add_peer(Peer::new(
            Ipv4Addr::from_str("10.0.0.2").unwrap(),
            IpAddr::from_str("2001:db8::2").unwrap(),
            64501,
        ));
        let encoded = index_table.encode();
        let mut truncated = encoded.slice(..encoded.len() - 3);
        assert!(matches!(
            parse_peer_index_table(&mut truncated),
            Err(ParserError::TruncatedMsg(_))
        ));
    }
}
