//! Streaming base8 encoder.
//!
//! Bytes written to an [`Encoder`] are encoded as soon as a whole 3-byte
//! quantum is available. Up to two leftover bytes (the fringe) wait for the
//! next write, or are padded out by [`Encoder::close`].

use std::io::{self, Write};

use tracing::{debug, trace};

use crate::codec::{encode_quanta, encoded_len};
use crate::error::{Error, Sticky};
use crate::{QUANTUM_BYTES, QUANTUM_SYMBOLS};

/// Symbols encoded per batch before handing them to the writer.
const SCRATCH_SYMBOLS: usize = 1024;

/// Input bytes that fill the scratch buffer.
const BATCH_BYTES: usize = SCRATCH_SYMBOLS / QUANTUM_SYMBOLS * QUANTUM_BYTES;

/// Base8 encoder writing symbols to `W`.
///
/// The encoder must be closed with [`Encoder::close`] or
/// [`Encoder::finish`] to emit a partially written final quantum; dropping it
/// discards up to two pending bytes. After a writer error or a close, every
/// call reports that state again.
///
/// A `write` that took some bytes before the writer failed returns that
/// count, as [`Write::write`] requires; the failure is reported by the next
/// call.
#[derive(Debug)]
pub struct Encoder<W: Write> {
    inner: W,
    fringe: [u8; QUANTUM_BYTES],
    fringe_len: usize,
    scratch: [u8; SCRATCH_SYMBOLS],
    sticky: Option<Sticky>,
}

impl<W: Write> Encoder<W> {
    /// Create an encoder writing to `inner`.
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            fringe: [0; QUANTUM_BYTES],
            fringe_len: 0,
            scratch: [0; SCRATCH_SYMBOLS],
            sticky: None,
        }
    }

    /// Reference to the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Write out any pending bytes as a final padded quantum and flush the
    /// writer.
    ///
    /// Closing again is a no-op. Writing after a close fails with
    /// [`Error::Closed`].
    ///
    /// # Errors
    /// Returns the writer's error, or the error that poisoned the encoder
    /// earlier.
    pub fn close(&mut self) -> io::Result<()> {
        match &self.sticky {
            Some(Sticky::Closed) => return Ok(()),
            Some(sticky) => return Err(replay(sticky)),
            None => {}
        }

        if self.fringe_len > 0 {
            let len = encoded_len(self.fringe_len);
            trace!(pending = self.fringe_len, "padding final quantum");
            encode_quanta(&self.fringe[..self.fringe_len], &mut self.scratch[..len]);
            self.fringe_len = 0;
            self.emit(len)?;
        }
        if let Err(err) = self.inner.flush() {
            return Err(self.poison(err));
        }

        self.sticky = Some(Sticky::Closed);
        Ok(())
    }

    /// Close the encoder and return the underlying writer.
    ///
    /// # Errors
    /// Same as [`Encoder::close`].
    pub fn finish(mut self) -> io::Result<W> {
        self.close()?;
        Ok(self.inner)
    }

    /// Hand the first `len` scratch symbols to the writer.
    fn emit(&mut self, len: usize) -> io::Result<()> {
        match self.inner.write_all(&self.scratch[..len]) {
            Ok(()) => Ok(()),
            Err(err) => Err(self.poison(err)),
        }
    }

    /// Encode from `buf`, adding every byte taken to `n`.
    fn encode_from(&mut self, mut buf: &[u8], n: &mut usize) -> io::Result<()> {
        // Complete the fringe left by the previous write.
        if self.fringe_len > 0 {
            let take = (QUANTUM_BYTES - self.fringe_len).min(buf.len());
            self.fringe[self.fringe_len..self.fringe_len + take].copy_from_slice(&buf[..take]);
            self.fringe_len += take;
            *n += take;
            buf = &buf[take..];
            if self.fringe_len < QUANTUM_BYTES {
                return Ok(());
            }
            encode_quanta(&self.fringe, &mut self.scratch[..QUANTUM_SYMBOLS]);
            self.fringe_len = 0;
            self.emit(QUANTUM_SYMBOLS)?;
        }

        // Whole quanta, batched through the scratch buffer.
        while buf.len() >= QUANTUM_BYTES {
            let take = BATCH_BYTES.min(buf.len() - buf.len() % QUANTUM_BYTES);
            let len = take / QUANTUM_BYTES * QUANTUM_SYMBOLS;
            encode_quanta(&buf[..take], &mut self.scratch[..len]);
            self.emit(len)?;
            *n += take;
            buf = &buf[take..];
        }

        self.fringe[..buf.len()].copy_from_slice(buf);
        self.fringe_len = buf.len();
        *n += buf.len();
        Ok(())
    }

    /// Remember a writer failure and pass it back unchanged.
    fn poison(&mut self, err: io::Error) -> io::Error {
        debug!(error = %err, "base8 encoder poisoned by writer error");
        self.sticky = Some(Sticky::from_io(&err));
        err
    }
}

fn replay(sticky: &Sticky) -> io::Error {
    sticky
        .to_io()
        .unwrap_or_else(|| Error::Closed.into())
}

impl<W: Write> Write for Encoder<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Some(sticky) = &self.sticky {
            return Err(replay(sticky));
        }

        let mut n = 0;
        match self.encode_from(buf, &mut n) {
            Ok(()) => Ok(n),
            // Already poisoned; the next call reports the error.
            Err(_) if n > 0 => Ok(n),
            Err(err) => Err(err),
        }
    }

    /// Flush the underlying writer. Pending fringe bytes are kept, since
    /// padding them would end the message.
    fn flush(&mut self) -> io::Result<()> {
        if let Some(sticky) = &self.sticky {
            return Err(replay(sticky));
        }
        match self.inner.flush() {
            Ok(()) => Ok(()),
            Err(err) => Err(self.poison(err)),
        }
    }
}
