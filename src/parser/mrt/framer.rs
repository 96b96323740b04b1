//! Splitting a byte buffer into complete MRT records.
use crate::models::{CommonHeader, EntryType, MRT_HEADER_LEN};
use crate::parser::mrt::mrt_header::decode_common_header;
use crate::ParserError;
use bytes::Bytes;
use log::{debug, warn};
use std::io::{ErrorKind, Read};

/// Receiver of complete TABLE_DUMP_V2 records.
///
/// An error returned here abandons that record only and framing continues
/// with the next one. [ParserError::IoError] is the exception: output can no
/// longer be written, so it stops framing.
pub trait MessageHandler {
    fn handle_message(&mut self, header: &CommonHeader, payload: Bytes)
        -> Result<(), ParserError>;
}

/// What one framing pass did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameOutcome {
    /// Records handed to the handler without error.
    pub handled: usize,
    /// Records of a type other than TABLE_DUMP_V2.
    pub skipped: usize,
    /// Records the handler rejected.
    pub failed: usize,
}

impl FrameOutcome {
    pub fn total(&self) -> usize {
        self.handled + self.skipped + self.failed
    }

    fn merge(&mut self, other: FrameOutcome) {
        self.handled += other.handled;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

/// Frame every complete record found in `buf[..*valid]`.
///
/// Records whose type is not TABLE_DUMP_V2 are logged and skipped one at a
/// time. Whatever trails the last complete record is moved to the start of
/// `buf` and `*valid` is set to its length.
///
/// A record that would not fit in `buf` even when empty is reported as
/// [ParserError::MessageTooLarge]; the buffer is left untouched in that case.
pub fn frame_messages<H: MessageHandler + ?Sized>(
    buf: &mut [u8],
    valid: &mut usize,
    handler: &mut H,
) -> Result<FrameOutcome, ParserError> {
    let end = (*valid).min(buf.len());
    let mut offset = 0;
    let mut outcome = FrameOutcome::default();

    while end - offset >= MRT_HEADER_LEN {
        let mut raw_header = [0u8; MRT_HEADER_LEN];
        raw_header.copy_from_slice(&buf[offset..offset + MRT_HEADER_LEN]);
        let header = decode_common_header(&raw_header);

        let record_len = match header.record_len() {
            Some(len) if len <= buf.len() => len,
            len => {
                return Err(ParserError::MessageTooLarge {
                    length: len.unwrap_or(usize::MAX),
                    capacity: buf.len(),
                })
            }
        };
        if end - offset < record_len {
            break;
        }

        debug!(
            "MRT record: time {} type {} subtype {} length {}",
            header.timestamp, header.entry_type, header.entry_subtype, header.length
        );

        if header.entry_type != u16::from(EntryType::TABLE_DUMP_V2) {
            if let Ok(known) = EntryType::try_from(header.entry_type) {
                debug!("skipping {:?} record", known);
            }
            warn!(
                "{}",
                ParserError::UnsupportedMrtType {
                    mrt_type: header.entry_type,
                    subtype: header.entry_subtype,
                }
            );
            outcome.skipped += 1;
        } else {
            let payload = Bytes::copy_from_slice(&buf[offset + MRT_HEADER_LEN..offset + record_len]);
            match handler.handle_message(&header, payload) {
                Ok(()) => outcome.handled += 1,
                Err(e @ ParserError::IoError(_)) => return Err(e),
                Err(e) => {
                    warn!("{}", e);
                    outcome.failed += 1;
                }
            }
        }
        offset += record_len;
    }

    buf.copy_within(offset..end, 0);
    *valid = end - offset;
    Ok(outcome)
}

/// Read buffer allocated once and reused across input files.
pub struct MrtFramer {
    buf: Vec<u8>,
    valid: usize,
    outcome: FrameOutcome,
}

impl MrtFramer {
    pub fn with_capacity(capacity: usize) -> Self {
        MrtFramer {
            buf: vec![0; capacity.max(MRT_HEADER_LEN)],
            valid: 0,
            outcome: FrameOutcome::default(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Bytes of an incomplete record retained for the next fill.
    pub fn pending(&self) -> &[u8] {
        &self.buf[..self.valid]
    }

    /// Totals over every pass since the last [MrtFramer::reset].
    pub fn outcome(&self) -> FrameOutcome {
        self.outcome
    }

    /// Read once from `reader` into the free space after the retained bytes.
    ///
    /// Returns the number of bytes read, 0 at end of input.
    pub fn fill_from<R: Read + ?Sized>(&mut self, reader: &mut R) -> Result<usize, ParserError> {
        if self.valid == self.buf.len() {
            return Ok(0);
        }
        loop {
            match reader.read(&mut self.buf[self.valid..]) {
                Ok(n) => {
                    self.valid += n;
                    return Ok(n);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Append bytes directly, as far as they fit. Returns how many were taken.
    pub fn extend_from_slice(&mut self, data: &[u8]) -> usize {
        let n = data.len().min(self.buf.len() - self.valid);
        self.buf[self.valid..self.valid + n].copy_from_slice(&data[..n]);
        self.valid += n;
        n
    }

    pub fn frame<H: MessageHandler + ?Sized>(
        &mut self,
        handler: &mut H,
    ) -> Result<FrameOutcome, ParserError> {
        let outcome = frame_messages(&mut self.buf, &mut self.valid, handler)?;
        self.outcome.merge(outcome);
        Ok(outcome)
    }

    /// Drop retained bytes and totals before the next file.
    pub fn reset(&mut self) {
        self.valid = 0;
        self.outcome = FrameOutcome::default();
    }
}
