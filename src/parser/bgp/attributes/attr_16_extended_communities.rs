use crate::models::*;
use crate::parser::ReadUtils;
use crate::ParserError;
use bytes::{Buf, Bytes};

/// Parse EXTENDED_COMMUNITIES into raw 8-byte values.
pub fn parse_extended_community(mut input: Bytes) -> Result<AttributeValue, ParserError> {
    let mut communities = Vec::with_capacity(input.remaining() / 8);
    while input.remaining() > 0 {
        input.require_n_remaining(8, "extended community")?;
        let mut value = [0u8; 8];
        input.copy_to_slice(&mut value);
        communities.push(value);
    }
    Ok(AttributeValue::ExtendedCommunities(communities))
}
