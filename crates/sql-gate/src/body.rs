//! Capture-once, read-many request body buffering.
//!
//! Transport body streams are consumable exactly once, but the gate needs to
//! read the body for inspection *and* still deliver it to the downstream
//! handler.  [`RewindableBody`] solves this with an explicit two-phase
//! buffer: [`capture`](RewindableBody::capture) drains the source into an
//! owned snapshot a single time, after which any number of independent
//! [`BodyReader`] cursors can be issued over the shared bytes.  The original
//! transport stream is never touched again once captured.

use std::borrow::Cow;
use std::io::{self, Cursor, Read};
use std::sync::Arc;

/// A request body that can be consumed once and then replayed arbitrarily.
pub struct RewindableBody {
    /// The raw transport stream; taken (and dropped) by the first capture.
    source: Option<Box<dyn Read + Send>>,
    /// The captured bytes, shared by every issued reader.
    snapshot: Option<Arc<[u8]>>,
}

impl RewindableBody {
    /// Wrap a single-read transport stream.  Nothing is read until
    /// [`capture`](Self::capture) is called.
    pub fn new(source: impl Read + Send + 'static) -> Self {
        Self {
            source: Some(Box::new(source)),
            snapshot: None,
        }
    }

    /// Build an already-captured body from bytes the host has buffered.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            source: None,
            snapshot: Some(bytes.into().into()),
        }
    }

    /// Drain the underlying source into the snapshot.
    ///
    /// Idempotent: once a snapshot exists, further calls are no-ops and the
    /// source is never re-read.  On I/O failure the bytes read so far are
    /// retained so the fail-open path can still forward them downstream,
    /// and the error propagates to the caller.
    pub fn capture(&mut self) -> io::Result<()> {
        if self.snapshot.is_some() {
            return Ok(());
        }

        let mut buf = Vec::new();
        let result = match self.source.take() {
            Some(mut source) => source.read_to_end(&mut buf).map(|_| ()),
            None => Ok(()),
        };

        self.snapshot = Some(buf.into());
        result
    }

    /// Whether a snapshot has been taken.
    pub fn is_captured(&self) -> bool {
        self.snapshot.is_some()
    }

    /// The captured body as text (lossy for non-UTF-8 bytes); empty before
    /// capture.
    pub fn text(&self) -> Cow<'_, str> {
        match &self.snapshot {
            Some(bytes) => String::from_utf8_lossy(bytes),
            None => Cow::Borrowed(""),
        }
    }

    /// Issue a fresh reader over the snapshot, positioned at offset 0.
    ///
    /// Readers are independent: each keeps its own cursor and none of them
    /// consumes the snapshot.  Before capture this yields an empty reader.
    pub fn reader(&self) -> BodyReader {
        let bytes = self
            .snapshot
            .clone()
            .unwrap_or_else(|| Vec::new().into());
        BodyReader {
            cursor: Cursor::new(bytes),
        }
    }

    /// Convert into a readable stream for downstream delivery.
    ///
    /// Captured bodies yield a snapshot reader; uncaptured bodies (excluded
    /// paths) hand back the raw transport stream untouched.
    pub fn into_source(mut self) -> Box<dyn Read + Send> {
        if self.snapshot.is_some() {
            return Box::new(self.reader());
        }
        self.source.take().unwrap_or_else(|| Box::new(io::empty()))
    }
}

impl std::fmt::Debug for RewindableBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RewindableBody")
            .field("captured", &self.is_captured())
            .field(
                "len",
                &self.snapshot.as_ref().map(|s| s.len()).unwrap_or(0),
            )
            .finish()
    }
}

/// An independent cursor over a captured body snapshot.
pub struct BodyReader {
    cursor: Cursor<Arc<[u8]>>,
}

impl BodyReader {
    /// Reset this reader to offset 0 without touching the snapshot.
    pub fn rewind(&mut self) {
        self.cursor.set_position(0);
    }
}

impl Read for BodyReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.cursor.read(buf)
    }
}
