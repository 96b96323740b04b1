use crate::models::{Afi, TableDumpV2Type};
use crate::parser::ReadUtils;
use crate::ParserError;
use bytes::{BufMut, Bytes, BytesMut};
use ipnet::IpNet;

/// One RIB_IPV4_UNICAST or RIB_IPV6_UNICAST record: a prefix and the
/// entries of every peer that carries it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RibAfiEntries {
    pub rib_type: TableDumpV2Type,
    pub sequence_number: u32,
    pub prefix: IpNet,
    pub rib_entries: Vec<RibEntry>,
}

/// A RIB entry with its attribute block still encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RibEntry {
    pub peer_index: u16,
    pub originated_time: u32,
    pub attributes: Bytes,
}

fn extract_afi_from_rib_type(rib_type: &TableDumpV2Type) -> Result<Afi, ParserError> {
    match rib_type {
        TableDumpV2Type::RibIpv4Unicast => Ok(Afi::Ipv4),
        TableDumpV2Type::RibIpv6Unicast => Ok(Afi::Ipv6),
        _ => Err(ParserError::ParseError(format!(
            "wrong RIB type for parsing: {:?}",
            rib_type
        ))),
    }
}

/// RIB AFI-specific entries
///
/// https://tools.ietf.org/html/rfc6396#section-4.3.2
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                         Sequence Number                       |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | Prefix Length |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                        Prefix (variable)                      |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |         Entry Count           |  RIB Entries (variable)
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// The whole record is decoded before anything is returned, so a truncated
/// entry fails the record instead of yielding a partial entry list.
pub fn parse_rib_afi_entries(
    data: &mut Bytes,
    rib_type: TableDumpV2Type,
) -> Result<RibAfiEntries, ParserError> {
    let afi = extract_afi_from_rib_type(&rib_type)?;

    let sequence_number = data.read_u32()?;
    let prefix = data.read_prefix(&afi)?;

    let entry_count = data.read_u16()?;
    let mut rib_entries = Vec::with_capacity(entry_count as usize);
    for _i in 0..entry_count {
        rib_entries.push(parse_rib_entry(data)?);
    }

    Ok(RibAfiEntries {
        rib_type,
        sequence_number,
        prefix,
        rib_entries,
    })
}

/// RIB entry: one prefix per entry
///
/// https://datatracker.ietf.org/doc/html/rfc6396#section-4.3.4
/// ```text
///         0                   1                   2                   3
///         0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
///        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///        |         Peer Index            |
///        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///        |                         Originated Time                       |
///        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///        |      Attribute Length         |
///        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///        |                    BGP Attributes... (variable)
///        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///
///                           Figure 10: RIB Entries
/// ```
pub fn parse_rib_entry(input: &mut Bytes) -> Result<RibEntry, ParserError> {
    input.require_n_remaining(8, "RIB entry")?;

    let peer_index = input.read_u16()?;
    let originated_time = input.read_u32()?;
    let attribute_length = input.read_u16()? as usize;

    input.require_n_remaining(attribute_length, "RIB entry attributes")?;
    let attributes = input.split_to(attribute_length);

    Ok(RibEntry {
        peer_index,
        originated_time,
        attributes,
    })
}

fn encode_prefix(prefix: &IpNet, bytes: &mut BytesMut) {
    let prefix_len = prefix.prefix_len();
    let byte_len = (prefix_len as usize).div_ceil(8);
    bytes.put_u8(prefix_len);
    match prefix.network() {
        std::net::IpAddr::V4(v4) => bytes.put_slice(&v4.octets()[..byte_len]),
        std::net::IpAddr::V6(v6) => bytes.put_slice(&v6.octets()[..byte_len]),
    }
}

impl RibAfiEntries {
    pub fn encode(&self) -> Bytes {
        let mut bytes = BytesMut::new();

        bytes.put_u32(self.sequence_number);
        encode_prefix(&self.prefix, &mut bytes);

        bytes.put_u16(self.rib_entries.len() as u16);
        for entry in &self.rib_entries {
            bytes.extend(entry.encode());
        }

        bytes.freeze()
    }
}

impl RibEntry {
    pub fn encode(&self) -> Bytes {
        let mut bytes = BytesMut::new();
        bytes.put_u16(self.peer_index);
        bytes.put_u32(self.originated_time);
        bytes.put_u16(self.attributes.len() as u16);
        bytes.extend_from_slice(&self.attributes);
        bytes.freeze()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn sample() -> RibAfiEntries {
        RibAfiEntries {
            rib_type: TableDumpV2Type::RibIpv4Unicast,
            sequence_number: 5,
            prefix: IpNet::from_str("10.0.0.0/8").unwrap(),
            rib_entries: vec![
                RibEntry {
                    peer_index: 0,
                    originated_time: 1000,
                    attributes: Bytes::from_static(&[0x40, 1, 1, 0]),
                },
                RibEntry {
                    peer_index: 3,
                    originated_time: 1001,
                    attributes: Bytes::new(),
                },
            ],
        }
    }

    #[test]
    fn test_extract_afi_from_rib_type() {
        assert_eq!(
            extract_afi_from_rib_type(&TableDumpV2Type::RibIpv4Unicast).unwrap(),
            Afi::Ipv4
        );
        assert_eq!(
            extract_afi_from_rib_type(&TableDumpV2Type::RibIpv6Unicast).unwrap(),
            Afi::Ipv6
        );
        assert!(extract_afi_from_rib_type(&TableDumpV2Type::RibIpv4Multicast).is_err());
    }

    #[test]
    fn test_rib_wire_layout() {
        let encoded = sample().encode();
        assert_eq!(
            &encoded[..8],
            &[
                0, 0, 0, 5, // sequence number
                8, 10, // prefix
                0, 2, // entry count
            ]
        );
        let parsed =
            parse_rib_afi_entries(&mut encoded.clone(), TableDumpV2Type::RibIpv4Unicast).unwrap();
        assert_eq!(parsed, sample());
    }

    #[test]
    fn test_truncated_entry_fails_record() {
        let encoded = sample().encode();
        // drop the last entry's header tail
        let mut truncated = encoded.slice(..encoded.len() - 2);
        assert!(matches!(
            parse_rib_afi_entries(&mut truncated, TableDumpV2Type::RibIpv4Unicast),
            Err(ParserError::TruncatedMsg(_))
        ));

        // attribute length larger than what remains
        let mut data = Bytes::from_static(&[0, 0, 0, 0, 0, 0, 0, 9, 0x40, 1]);
        assert!(parse_rib_entry(&mut data).is_err());
    }
}
