use crate::models::{CommonHeader, MRT_HEADER_LEN};
use crate::ParserError;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::io::Read;

/// MRT common header [RFC6396][header].
///
/// [header]: https://tools.ietf.org/html/rfc6396#section-4.1
///
/// A MRT record is constructed as the following:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                           Timestamp                           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |             Type              |            Subtype            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                             Length                            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                      Message... (variable)
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// The type is not validated here: records of any type are framed, and the
/// caller decides whether it can decode them.
pub fn parse_common_header<T: Read>(input: &mut T) -> Result<CommonHeader, ParserError> {
    let mut raw_bytes = [0u8; MRT_HEADER_LEN];
    input.read_exact(&mut raw_bytes)?;
    Ok(decode_common_header(&raw_bytes))
}

/// Decode a header from a byte array that is known to be complete.
pub fn decode_common_header(raw_bytes: &[u8; MRT_HEADER_LEN]) -> CommonHeader {
    let mut data = &raw_bytes[..];
    let timestamp = data.get_u32();
    let entry_type = data.get_u16();
    let entry_subtype = data.get_u16();
    // the length field does not include the length of the common header
    let length = data.get_u32();

    CommonHeader {
        timestamp,
        entry_type,
        entry_subtype,
        length,
    }
}

impl CommonHeader {
    pub fn encode(&self) -> Bytes {
        let mut bytes = BytesMut::with_capacity(MRT_HEADER_LEN);
        bytes.put_u32(self.timestamp);
        bytes.put_u16(self.entry_type);
        bytes.put_u16(self.entry_subtype);
        bytes.put_u32(self.length);
        bytes.freeze()
    }
}
