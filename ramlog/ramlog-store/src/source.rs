//! Pending kernel log text, in whichever shape the host exposes it.
//!
//! The host's log machinery hands text over in one of two ways: the
//! fatal-dump callback delivers raw byte segments, and the structured log
//! ring supports a rewind-then-iterate drain. Both reduce to "append every
//! byte, in order" and neither is preferred; the variant just records which
//! protocol the host spoke.

/// A line-oriented drain over the host's retained log ring.
///
/// Protocol: [`rewind`](LogLines::rewind) resets the cursor to the oldest
/// retained record, then [`next_line`](LogLines::next_line) yields lines
/// until the ring is exhausted.
pub trait LogLines {
    /// Reset the cursor to the oldest retained record.
    fn rewind(&mut self);

    /// The next retained line, or `None` once the ring is exhausted.
    fn next_line(&mut self) -> Option<&[u8]>;
}

/// Pending log text to drain into the persistent ring.
///
/// The store consumes this in a single pass and never retains it.
pub enum PendingLog<'a> {
    /// Raw text segments, in order, as delivered by the fatal-dump callback.
    Segments(&'a [&'a [u8]]),

    /// Rewind-then-iterate drain of the host's structured log ring.
    Lines(&'a mut dyn LogLines),
}

impl PendingLog<'_> {
    /// Nothing pending. Used by hosts that initialize the store before any
    /// log text exists.
    #[inline]
    #[must_use]
    pub const fn empty() -> PendingLog<'static> {
        PendingLog::Segments(&[])
    }
}
