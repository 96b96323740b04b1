/*!
error module defines the error types used in bgpkit-ribdump.
*/
use num_enum::{TryFromPrimitive, TryFromPrimitiveError};
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParserError {
    /// This error represents a [num_enum::TryFromPrimitiveError] error for any of a number of
    /// different types.
    ///
    /// ## Occurs during:
    ///  - Parsing of an MRT message body
    #[error("unrecognized value {value} for {type_name}")]
    UnrecognizedEnumVariant { type_name: &'static str, value: u64 },
    /// A general IO error triggered by the input reader.
    #[error(transparent)]
    IoError(#[from] io::Error),
    /// Opening or decompressing an input file failed.
    #[error("cannot open {path}: {reason}")]
    OneIoError { path: String, reason: String },
    /// A record declares more payload than the read buffer can ever hold.
    ///
    /// ## Occurs during:
    ///  - Framing of MRT records
    #[error("MRT record of {length} bytes exceeds buffer capacity of {capacity} bytes")]
    MessageTooLarge { length: usize, capacity: usize },
    #[error("unable to parse unsupported MRT type {mrt_type} subtype {subtype}")]
    UnsupportedMrtType { mrt_type: u16, subtype: u16 },
    #[error("unsupported: {0}")]
    Unsupported(String),
    /// A field read would run past the end of the enclosing message.
    #[error("buffer overrun: {0}")]
    TruncatedMsg(String),
    #[error("parse error: {0}")]
    ParseError(String),
    /// Malformed human-readable size such as `16MiB`.
    #[error("malformed size: {0}")]
    InvalidSize(String),
    #[error("malformed address: {0}")]
    InvalidAddress(String),
}

impl<T> From<TryFromPrimitiveError<T>> for ParserError
where
    T: TryFromPrimitive,
    T::Primitive: Into<u64>,
{
    #[inline]
    fn from(value: TryFromPrimitiveError<T>) -> Self {
        ParserError::UnrecognizedEnumVariant {
            type_name: T::NAME,
            value: value.number.into(),
        }
    }
}
