mod peer_index_table;
mod rib_afi_entries;

use crate::error::ParserError;
use crate::models::*;
use bytes::Bytes;

pub use peer_index_table::parse_peer_index_table;
pub use rib_afi_entries::{parse_rib_afi_entries, parse_rib_entry, RibAfiEntries, RibEntry};

/// A decoded TABLE_DUMP_V2 record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableDumpV2Message {
    PeerIndexTable(PeerIndexTable),
    RibAfi(RibAfiEntries),
}

/// Parse TABLE_DUMP V2 format MRT message.
///
/// RFC: <https://www.rfc-editor.org/rfc/rfc6396#section-4.3>
///
/// Supported subtypes are
/// 1. PEER_INDEX_TABLE
/// 2. RIB_IPV4_UNICAST
/// 4. RIB_IPV6_UNICAST
///
/// Every other subtype is reported as [ParserError::UnsupportedMrtType].
pub fn parse_table_dump_v2_message(
    sub_type: u16,
    mut input: Bytes,
) -> Result<TableDumpV2Message, ParserError> {
    let unsupported = ParserError::UnsupportedMrtType {
        mrt_type: EntryType::TABLE_DUMP_V2.into(),
        subtype: sub_type,
    };
    let v2_type = match TableDumpV2Type::try_from(sub_type) {
        Ok(t) => t,
        Err(_) => return Err(unsupported),
    };

    let msg: TableDumpV2Message = match v2_type {
        TableDumpV2Type::PeerIndexTable => {
            TableDumpV2Message::PeerIndexTable(parse_peer_index_table(&mut input)?)
        }
        TableDumpV2Type::RibIpv4Unicast | TableDumpV2Type::RibIpv6Unicast => {
            TableDumpV2Message::RibAfi(parse_rib_afi_entries(&mut input, v2_type)?)
        }
        _ => return Err(unsupported),
    };

    Ok(msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_subtypes() {
        for subtype in [3u16, 5, 6, 7, 8, 99] {
            assert!(matches!(
                parse_table_dump_v2_message(subtype, Bytes::new()),
                Err(ParserError::UnsupportedMrtType {
                    mrt_type: 13,
                    subtype: s
                }) if s == subtype
            ));
        }
    }

    #[test]
    fn test_truncated_rib() {
        // sequence number cut short
        let msg = parse_table_dump_v2_message(2, Bytes::from_static(&[0, 0, 1]));
        assert!(matches!(msg, Err(ParserError::TruncatedMsg(_))));
    }
}
