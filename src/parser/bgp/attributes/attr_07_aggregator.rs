use crate::models::*;
use crate::parser::ReadUtils;
use crate::ParserError;
use bytes::{Buf, Bytes};

/// Parse AGGREGATOR attribute.
///
/// The AS number is two or four bytes wide; the width is taken from the
/// attribute length (6 or 8 bytes).
pub fn parse_aggregator(mut input: Bytes) -> Result<AttributeValue, ParserError> {
    let asn_len = match input.remaining() {
        6 => AsnLength::Bits16,
        8 => AsnLength::Bits32,
        n => {
            return Err(ParserError::ParseError(format!(
                "invalid AGGREGATOR length {}",
                n
            )))
        }
    };
    let asn = input.read_asn(asn_len)?;
    let id = input.read_ipv4_address()?;
    Ok(AttributeValue::Aggregator { asn, id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_parse_aggregator() {
        let data = Bytes::from(vec![0, 0, 0xfb, 0xf4, 10, 0, 0, 1]);
        assert_eq!(
            parse_aggregator(data).unwrap(),
            AttributeValue::Aggregator {
                asn: 64500,
                id: Ipv4Addr::new(10, 0, 0, 1)
            }
        );

        let data = Bytes::from(vec![0xfb, 0xf4, 10, 0, 0, 1]);
        assert!(matches!(
            parse_aggregator(data).unwrap(),
            AttributeValue::Aggregator { asn: 64500, .. }
        ));
    }
}
