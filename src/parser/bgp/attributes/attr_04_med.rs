use crate::models::*;
use crate::parser::ReadUtils;
use crate::ParserError;
use bytes::Bytes;

pub fn parse_med(mut input: Bytes) -> Result<AttributeValue, ParserError> {
    Ok(AttributeValue::MultiExitDiscriminator(input.read_u32()?))
}
