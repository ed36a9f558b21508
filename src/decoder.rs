//! Streaming base8 decoder.
//!
//! The decoder pulls symbols from a reader, keeps up to 7 of them across
//! calls until a quantum is complete, and caches decoded bytes that do not
//! fit the caller's buffer. Corruption offsets count from the start of the
//! stream.

use std::io::{self, Read};

use tracing::{debug, trace};

use crate::codec::{decode_quanta, decoded_len, Decoded};
use crate::error::Sticky;
use crate::{QUANTUM_BYTES, QUANTUM_SYMBOLS};

/// Symbols read from the source per call, at most.
const INPUT_SYMBOLS: usize = 1024;

/// Bytes decoded from a full input buffer.
const OUTPUT_BYTES: usize = INPUT_SYMBOLS / QUANTUM_SYMBOLS * QUANTUM_BYTES;

/// Base8 decoder reading symbols from `R`.
///
/// Implements [`Read`]: `Ok(0)` marks the end of the message. Corrupt input
/// is reported as [`io::ErrorKind::InvalidData`] carrying
/// [`crate::Error::CorruptInput`], and a source that ends mid-quantum as
/// [`io::ErrorKind::UnexpectedEof`] carrying [`crate::Error::UnexpectedEnd`]. Bytes
/// decoded before a failure are delivered first; the failure follows on the
/// next call and is repeated on every call after that.
#[derive(Debug)]
pub struct Decoder<R: Read> {
    inner: R,
    input: [u8; INPUT_SYMBOLS],
    /// Buffered symbols at the front of `input`.
    fringe: usize,
    /// Stream offset of `input[0]`.
    consumed: u64,
    /// Bytes decoded so far, delivered or cached.
    produced: usize,
    output: [u8; OUTPUT_BYTES],
    out_start: usize,
    out_end: usize,
    /// A padded quantum has ended the message.
    end: bool,
    /// The source reported end of input.
    source_done: bool,
    sticky: Option<Sticky>,
}

impl<R: Read> Decoder<R> {
    /// Create a decoder reading from `inner`.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            input: [0; INPUT_SYMBOLS],
            fringe: 0,
            consumed: 0,
            produced: 0,
            output: [0; OUTPUT_BYTES],
            out_start: 0,
            out_end: 0,
            end: false,
            source_done: false,
            sticky: None,
        }
    }

    /// Reference to the underlying reader.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Unwrap the underlying reader. Buffered symbols and decoded bytes not
    /// yet read are lost.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Read from the source into `input[fringe..limit]` until `target`
    /// symbols are buffered or the source is exhausted.
    fn fill(&mut self, limit: usize, target: usize) -> io::Result<()> {
        while self.fringe < target && !self.source_done {
            match self.inner.read(&mut self.input[self.fringe..limit]) {
                Ok(0) => self.source_done = true,
                Ok(n) => self.fringe += n,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    /// Move cached decoded bytes into `buf`.
    fn drain(&mut self, buf: &mut [u8]) -> usize {
        let n = (self.out_end - self.out_start).min(buf.len());
        buf[..n].copy_from_slice(&self.output[self.out_start..self.out_start + n]);
        self.out_start += n;
        n
    }

    /// Record a terminal state and return what the current call reports:
    /// `delivered` bytes if any, otherwise the state itself.
    fn terminate(&mut self, sticky: Sticky, delivered: usize) -> io::Result<usize> {
        debug!(state = ?sticky, offset = self.consumed, "base8 decoder stopped");
        self.sticky = Some(sticky);
        if delivered > 0 {
            return Ok(delivered);
        }
        self.replay()
    }

    fn replay(&self) -> io::Result<usize> {
        match self.sticky.as_ref().and_then(Sticky::to_io) {
            Some(err) => Err(err),
            None => Ok(0),
        }
    }
}

impl<R: Read> Read for Decoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        // Leftovers from the last call come first; any terminal state waits
        // until they are gone.
        if self.out_start < self.out_end {
            return Ok(self.drain(buf));
        }
        if self.sticky.is_some() {
            return self.replay();
        }

        let limit =
            (buf.len() / QUANTUM_BYTES * QUANTUM_SYMBOLS).clamp(QUANTUM_SYMBOLS, INPUT_SYMBOLS);
        let target = if self.end { 1 } else { QUANTUM_SYMBOLS };
        if let Err(err) = self.fill(limit, target) {
            debug!(error = %err, "base8 decoder source failed");
            self.sticky = Some(Sticky::from_io(&err));
            return Err(err);
        }

        if self.end {
            // Anything after the padded quantum is corrupt.
            if self.fringe > 0 {
                let sticky = Sticky::Corrupt {
                    offset: self.consumed,
                    decoded: self.produced,
                };
                return self.terminate(sticky, 0);
            }
            return self.terminate(Sticky::Eof, 0);
        }

        if self.fringe < QUANTUM_SYMBOLS {
            // The source is done; a partial quantum cannot be decoded.
            if self.fringe > 0 {
                return self.terminate(Sticky::UnexpectedEnd, 0);
            }
            return self.terminate(Sticky::Eof, 0);
        }

        let whole = self.fringe / QUANTUM_SYMBOLS * QUANTUM_SYMBOLS;
        trace!(symbols = whole, pending = self.fringe - whole, "decoding quanta");

        // Decode straight into the caller's buffer when it is large enough.
        let (status, delivered) = if decoded_len(whole) > buf.len() {
            let status = decode_quanta(&self.input[..whole], &mut self.output);
            self.out_start = 0;
            self.out_end = written_by(status);
            (status, self.drain(buf))
        } else {
            let status = decode_quanta(&self.input[..whole], buf);
            (status, written_by(status))
        };
        self.produced += written_by(status);

        self.input.copy_within(whole..self.fringe, 0);
        self.fringe -= whole;
        let base = self.consumed;
        self.consumed += whole as u64;

        match status {
            Decoded::Progress(_) => Ok(delivered),
            Decoded::Terminated(_) => {
                self.end = true;
                if self.fringe > 0 {
                    let sticky = Sticky::Corrupt {
                        offset: self.consumed,
                        decoded: self.produced,
                    };
                    return self.terminate(sticky, delivered);
                }
                Ok(delivered)
            }
            Decoded::Corrupt { offset, .. } => {
                let sticky = Sticky::Corrupt {
                    offset: base + offset as u64,
                    decoded: self.produced,
                };
                self.terminate(sticky, delivered)
            }
        }
    }
}

fn written_by(status: Decoded) -> usize {
    match status {
        Decoded::Progress(n) | Decoded::Terminated(n) => n,
        Decoded::Corrupt { written, .. } => written,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::tests::{BIG_DECODED, BIG_ENCODED, PAIRS};
    use crate::Error;

    /// Reader handing out at most `limit` bytes per call, returning the
    /// scripted results first.
    struct ScriptedReader {
        data: Vec<u8>,
        limit: usize,
        script: Vec<Option<io::ErrorKind>>,
        calls: usize,
    }

    impl ScriptedReader {
        fn new(data: &[u8], limit: usize) -> Self {
            Self {
                data: data.to_vec(),
                limit,
                script: Vec::new(),
                calls: 0,
            }
        }
    }

    impl Read for ScriptedReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let call = self.calls;
            self.calls += 1;
            if let Some(Some(kind)) = self.script.get(call) {
                return Err(io::Error::new(*kind, "scripted failure"));
            }
            let n = buf.len().min(self.limit).min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = self.data.split_off(n);
            Ok(n)
        }
    }

    fn corrupt_offset(err: &io::Error) -> Option<u64> {
        Error::from_io(err).and_then(Error::corrupt_offset)
    }

    #[test]
    fn test_decoder_pairs() {
        for &(decoded, encoded) in PAIRS {
            let mut decoder = Decoder::new(encoded.as_bytes());
            let mut buf = vec![0u8; decoded_len(encoded.len()).max(1)];
            let n = decoder.read(&mut buf).unwrap();
            assert_eq!(&buf[..n], decoded.as_bytes(), "decoder({encoded:?})");
            assert_eq!(decoder.read(&mut buf).unwrap(), 0);
        }
    }

    #[test]
    fn test_read_to_end_pairs() {
        for &(decoded, encoded) in PAIRS {
            let mut out = Vec::new();
            Decoder::new(encoded.as_bytes()).read_to_end(&mut out).unwrap();
            assert_eq!(out, decoded.as_bytes());
        }
    }

    #[test]
    fn test_decoder_buffering() {
        for bs in 1..=12 {
            let mut decoder = Decoder::new(BIG_ENCODED.as_bytes());
            let mut out = Vec::new();
            let mut buf = vec![0u8; bs];
            loop {
                let n = decoder.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                out.extend_from_slice(&buf[..n]);
            }
            assert_eq!(out, BIG_DECODED.as_bytes(), "buffer size {bs}");
        }
    }

    #[test]
    fn test_small_buffers_and_short_reads() {
        for bs in 1..40 {
            for limit in [1, 3, 7, 8, 9, 64] {
                for &(decoded, encoded) in PAIRS {
                    let mut decoder = Decoder::new(ScriptedReader::new(encoded.as_bytes(), limit));
                    let mut out = Vec::new();
                    let mut buf = vec![0u8; bs];
                    loop {
                        let n = decoder.read(&mut buf).unwrap();
                        if n == 0 {
                            break;
                        }
                        out.extend_from_slice(&buf[..n]);
                    }
                    assert_eq!(out, decoded.as_bytes(), "bs {bs} limit {limit}");
                    assert_eq!(decoder.read(&mut buf).unwrap(), 0);
                }
            }
        }
    }

    #[test]
    fn test_one_byte_reads_drain_cache() {
        let mut decoder = Decoder::new("3146755730460562".as_bytes());
        let mut byte = [0u8; 1];
        let mut out = Vec::new();
        while decoder.read(&mut byte).unwrap() == 1 {
            out.push(byte[0]);
        }
        assert_eq!(out, b"foobar");
    }

    #[test]
    fn test_decoder_error() {
        let mut decoder = Decoder::new("01234568".as_bytes());
        let mut buf = [0u8; 3];
        let err = decoder.read(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert_eq!(corrupt_offset(&err), Some(7));

        // Sticky.
        let err = decoder.read(&mut buf).unwrap_err();
        assert_eq!(corrupt_offset(&err), Some(7));
    }

    #[test]
    fn test_offsets_are_absolute() {
        let input = b"3146755731467557314!7557";
        for bs in [1, 3, 100] {
            let mut decoder = Decoder::new(ScriptedReader::new(input, 8));
            let mut out = Vec::new();
            let mut buf = vec![0u8; bs];
            let err = loop {
                match decoder.read(&mut buf) {
                    Ok(0) => panic!("corruption not reported"),
                    Ok(n) => out.extend_from_slice(&buf[..n]),
                    Err(err) => break err,
                }
            };
            assert_eq!(out, b"foofoo", "buffer size {bs}");
            assert_eq!(corrupt_offset(&err), Some(19));
            assert_eq!(
                Error::from_io(&err).and_then(Error::decoded_before),
                Some(out.len())
            );
        }
    }

    #[test]
    fn test_partial_output_before_corruption() {
        let mut decoder = Decoder::new("314675573!".as_bytes());
        let mut buf = [0u8; 16];
        // "314675573!" is 10 symbols: one good quantum, then a short one.
        assert_eq!(decoder.read(&mut buf).unwrap(), 3);
        let err = decoder.read(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);

        let mut decoder = Decoder::new("31467557314!7557".as_bytes());
        assert_eq!(decoder.read(&mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], b"foo");
        assert_eq!(corrupt_offset(&decoder.read(&mut buf).unwrap_err()), Some(11));
    }

    #[test]
    fn test_reader_eof() {
        let mut decoder = Decoder::new("01234567".as_bytes());
        let mut buf = [0u8; 3];
        assert_eq!(decoder.read(&mut buf).unwrap(), 3);
        assert_eq!(decoder.read(&mut buf).unwrap(), 0);
        assert_eq!(decoder.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_unexpected_end() {
        for input in ["3146", "314675573", "3146755730460"] {
            let mut decoder = Decoder::new(ScriptedReader::new(input.as_bytes(), 64));
            let mut out = Vec::new();
            let err = decoder.read_to_end(&mut out).unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof, "{input:?}");
            assert!(matches!(Error::from_io(&err), Some(Error::UnexpectedEnd)));
            let calls = decoder.get_ref().calls;

            // Repeated without reading the source again.
            let mut buf = [0u8; 8];
            for _ in 0..2 {
                let err = decoder.read(&mut buf).unwrap_err();
                assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof, "{input:?}");
                assert!(matches!(Error::from_io(&err), Some(Error::UnexpectedEnd)));
            }
            assert_eq!(decoder.get_ref().calls, calls);
        }
    }

    #[test]
    fn test_data_after_padding() {
        // Same offset whether the trailing data arrives with the padded
        // quantum or in a later read.
        for bs in [1, 16] {
            for limit in [1, 8, 12, 64] {
                let reader = ScriptedReader::new(b"314=====31467557", limit);
                let mut decoder = Decoder::new(reader);
                let mut buf = vec![0u8; bs];
                let err = loop {
                    match decoder.read(&mut buf) {
                        Ok(0) => panic!("trailing data accepted"),
                        Ok(n) => assert_eq!(&buf[..n], b"f"),
                        Err(err) => break err,
                    }
                };
                assert_eq!(corrupt_offset(&err), Some(8), "bs {bs} limit {limit}");
                assert_eq!(Error::from_io(&err).and_then(Error::decoded_before), Some(1));
            }
        }
    }

    #[test]
    fn test_source_error_is_sticky() {
        let mut reader = ScriptedReader::new(b"31467557", 8);
        reader.script = vec![Some(io::ErrorKind::ConnectionReset)];
        let mut decoder = Decoder::new(reader);
        let mut buf = [0u8; 3];

        let err = decoder.read(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
        let err = decoder.read(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
        assert_eq!(err.to_string(), "scripted failure");
        assert_eq!(decoder.get_ref().calls, 1);
    }

    #[test]
    fn test_interrupted_is_retried() {
        let mut reader = ScriptedReader::new(b"31467557", 8);
        reader.script = vec![Some(io::ErrorKind::Interrupted), None];
        let mut decoder = Decoder::new(reader);
        let mut out = Vec::new();
        decoder.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"foo");
    }

    #[test]
    fn test_terminal_deferred_until_cache_drained() {
        let mut decoder = Decoder::new("34672562312270==".as_bytes());
        let mut buf = [0u8; 2];
        let mut out = Vec::new();
        for _ in 0..3 {
            let n = decoder.read(&mut buf).unwrap();
            out.extend_from_slice(&buf[..n]);
        }
        assert_eq!(out, b"sure.");
        assert_eq!(decoder.read(&mut buf).unwrap(), 0);
        assert!(decoder.into_inner().is_empty());
    }
}
