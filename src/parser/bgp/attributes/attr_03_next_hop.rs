use crate::models::*;
use crate::parser::ReadUtils;
use crate::ParserError;
use bytes::{Buf, Bytes};
use std::net::IpAddr;

/// Parse the classic NEXT_HOP attribute.
pub fn parse_next_hop(mut input: Bytes) -> Result<AttributeValue, ParserError> {
    let addr = match input.remaining() {
        4 => IpAddr::V4(input.read_ipv4_address()?),
        16 => IpAddr::V6(input.read_ipv6_address()?),
        n => {
            return Err(ParserError::ParseError(format!(
                "invalid NEXT_HOP length {}",
                n
            )))
        }
    };
    Ok(AttributeValue::NextHop(addr))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_parse_next_hop() {
        assert_eq!(
            parse_next_hop(Bytes::from_static(&[192, 0, 2, 1])).unwrap(),
            AttributeValue::NextHop(IpAddr::from_str("192.0.2.1").unwrap())
        );
        assert!(parse_next_hop(Bytes::from_static(&[192, 0, 2])).is_err());
    }
}
