use crate::models::*;
use crate::parser::ReadUtils;
use crate::ParserError;
use bytes::{Buf, BufMut, Bytes, BytesMut};

const AS_PATH_AS_SET: u8 = 1;
const AS_PATH_AS_SEQUENCE: u8 = 2;
// https://datatracker.ietf.org/doc/html/rfc5065
const AS_PATH_CONFED_SEQUENCE: u8 = 3;
const AS_PATH_CONFED_SET: u8 = 4;

/// Parse an AS_PATH attribute.
///
/// RIB entries of TABLE_DUMP_V2 always carry 4-byte AS numbers (RFC 6396 section 4.3.4).
pub fn parse_as_path(mut input: Bytes) -> Result<AsPath, ParserError> {
    let mut output = AsPath {
        segments: Vec::with_capacity(2),
    };
    while input.remaining() > 0 {
        let segment = parse_as_path_segment(&mut input)?;
        output.segments.push(segment);
    }

    Ok(output)
}

fn parse_as_path_segment(input: &mut Bytes) -> Result<AsPathSegment, ParserError> {
    let segment_type = input.read_u8()?;
    let count = input.read_u8()? as usize;
    let path = input.read_asns(AsnLength::Bits32, count)?;
    match segment_type {
        AS_PATH_AS_SET => Ok(AsPathSegment::AsSet(path)),
        AS_PATH_AS_SEQUENCE => Ok(AsPathSegment::AsSequence(path)),
        AS_PATH_CONFED_SEQUENCE => Ok(AsPathSegment::ConfedSequence(path)),
        AS_PATH_CONFED_SET => Ok(AsPathSegment::ConfedSet(path)),
        _ => Err(ParserError::ParseError(format!(
            "Invalid AS path segment type: {segment_type}"
        ))),
    }
}

pub fn encode_as_path(path: &AsPath) -> Bytes {
    let mut output = BytesMut::with_capacity(64);
    for segment in path.segments.iter() {
        let (segment_type, asns) = match segment {
            AsPathSegment::AsSet(asns) => (AS_PATH_AS_SET, asns),
            AsPathSegment::AsSequence(asns) => (AS_PATH_AS_SEQUENCE, asns),
            AsPathSegment::ConfedSequence(asns) => (AS_PATH_CONFED_SEQUENCE, asns),
            AsPathSegment::ConfedSet(asns) => (AS_PATH_CONFED_SET, asns),
        };
        output.put_u8(segment_type);
        output.put_u8(asns.len() as u8);
        for asn in asns {
            output.put_u32(*asn);
        }
    }
    output.freeze()
}
