//! File layer: open raw or compressed dumps and run the fill-frame loop.
use crate::parser::{FrameOutcome, MessageHandler, MrtFramer};
use crate::ParserError;
use log::{debug, warn};
use std::io::Read;

/// Open a local file for reading. `.gz` and `.bz2` inputs are decompressed
/// transparently, everything else is read raw.
pub fn open_input(path: &str) -> Result<Box<dyn Read>, ParserError> {
    let reader = oneio::get_reader(path).map_err(|e| ParserError::OneIoError {
        path: path.to_string(),
        reason: e.to_string(),
    })?;
    Ok(reader)
}

/// Read `reader` to the end through `framer`, handing every record to
/// `handler`.
///
/// Bytes of an incomplete record left at the end of input are reported and
/// dropped. [ParserError::MessageTooLarge] ends the input early.
pub fn process_input<R, H>(
    reader: &mut R,
    framer: &mut MrtFramer,
    handler: &mut H,
) -> Result<FrameOutcome, ParserError>
where
    R: Read + ?Sized,
    H: MessageHandler + ?Sized,
{
    framer.reset();
    loop {
        let n = framer.fill_from(reader)?;
        framer.frame(handler)?;
        if n == 0 {
            break;
        }
    }

    let remains = framer.pending().len();
    if remains > 0 {
        warn!("{} bytes unprocessed data remains", remains);
    }
    let outcome = framer.outcome();
    debug!(
        "input done: {} records handled, {} skipped, {} failed",
        outcome.handled, outcome.skipped, outcome.failed
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CommonHeader;
    use bytes::Bytes;

    #[derive(Default)]
    struct Count(usize);

    impl MessageHandler for Count {
        fn handle_message(&mut self, _: &CommonHeader, _: Bytes) -> Result<(), ParserError> {
            self.0 += 1;
            Ok(())
        }
    }

    /// Hands out at most `chunk` bytes per read.
    struct Trickle<'a> {
        data: &'a [u8],
        chunk: usize,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let n = self.chunk.min(buf.len()).min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    fn records(count: usize, payload: usize) -> Vec<u8> {
        let mut data = vec![];
        for _ in 0..count {
            let header = CommonHeader {
                timestamp: 1,
                entry_type: 13,
                entry_subtype: 2,
                length: payload as u32,
            };
            data.extend_from_slice(&header.encode());
            data.extend(std::iter::repeat_n(0xAB, payload));
        }
        data
    }

    #[test]
    fn test_small_reads_small_buffer() {
        let mut data = records(10, 30);
        data.extend_from_slice(&[0, 0, 0]);
        let mut reader = Trickle {
            data: &data,
            chunk: 7,
        };
        let mut framer = MrtFramer::with_capacity(50);
        let mut handler = Count::default();
        let outcome = process_input(&mut reader, &mut framer, &mut handler).unwrap();
        assert_eq!(outcome.handled, 10);
        assert_eq!(handler.0, 10);
        assert_eq!(framer.pending(), &[0, 0, 0]);
    }

    #[test]
    fn test_record_larger_than_buffer() {
        let data = records(1, 100);
        let mut reader = &data[..];
        let mut framer = MrtFramer::with_capacity(64);
        let mut handler = Count::default();
        assert!(matches!(
            process_input(&mut reader, &mut framer, &mut handler),
            Err(ParserError::MessageTooLarge { .. })
        ));
        assert_eq!(handler.0, 0);
    }

    #[test]
    fn test_open_missing_file() {
        assert!(matches!(
            open_input("/nonexistent/rib.20240101.0000.bz2"),
            Err(ParserError::OneIoError { .. })
        ));
    }
}
