//! Growable receive buffer.
//!
//! `RxBuffer` is a contiguous byte queue with a read cursor and a write
//! cursor. The arrival path appends at the write cursor, consumers advance
//! the read cursor; when capacity runs out the storage doubles, so an append
//! never blocks and never drops data. Once everything unread has been
//! consumed both cursors rewind to zero, reclaiming the whole allocation
//! without freeing it.

/// Default capacity for a freshly constructed buffer.
pub const DEFAULT_CAPACITY: usize = 32 * 1024;

/// Sentinel returned by [`RxBuffer::read_char`] when the buffer is empty.
pub const EMPTY_CHAR: char = '\u{ffff}';

/// Contiguous byte queue with doubling growth and rewind-on-drain.
///
/// Invariants: `read_pos <= write_pos <= storage.len()`, and whenever
/// `read_pos == write_pos` both are zero. Bytes in `[read_pos, write_pos)`
/// are valid unread data; everything outside that window is stale.
#[derive(Debug)]
pub struct RxBuffer {
    storage: Vec<u8>,
    read_pos: usize,
    write_pos: usize,
}

impl Default for RxBuffer {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl RxBuffer {
    /// Create a buffer with the default capacity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer with a specific initial capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: vec![0; capacity],
            read_pos: 0,
            write_pos: 0,
        }
    }

    /// Append bytes at the write cursor, doubling the storage as needed.
    ///
    /// A zero-length append is a no-op. Growth preserves every byte in
    /// `[0, write_pos)` exactly; nothing is truncated or reordered.
    pub fn append(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        let needed = self.write_pos + bytes.len();
        if needed > self.storage.len() {
            let mut new_len = self.storage.len().max(1) << 1;
            while new_len < needed {
                new_len <<= 1;
            }
            self.storage.resize(new_len, 0);
        }
        self.storage[self.write_pos..needed].copy_from_slice(bytes);
        self.write_pos = needed;
    }

    /// Number of unread bytes.
    pub fn available(&self) -> usize {
        self.write_pos - self.read_pos
    }

    /// Current allocated capacity of the underlying storage.
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Discard all unread data and reset both cursors to zero.
    pub fn clear(&mut self) {
        self.read_pos = 0;
        self.write_pos = 0;
    }

    /// Next unread byte as `0..=255`, or `-1` when the buffer is empty.
    ///
    /// Consuming the last unread byte rewinds both cursors so the storage
    /// does not creep forward.
    pub fn read_byte(&mut self) -> i32 {
        if self.read_pos == self.write_pos {
            return -1;
        }
        let byte = self.storage[self.read_pos];
        self.read_pos += 1;
        if self.read_pos == self.write_pos {
            self.clear(); // rewind
        }
        i32::from(byte)
    }

    /// Next unread byte cast to a char, or [`EMPTY_CHAR`] when empty.
    ///
    /// Legacy fallback kept for callers ported from character-oriented
    /// APIs; prefer [`read_byte`](Self::read_byte) or
    /// [`read_all`](Self::read_all).
    pub fn read_char(&mut self) -> char {
        match self.read_byte() {
            -1 => EMPTY_CHAR,
            byte => char::from(byte as u8),
        }
    }

    /// Drain everything unread into a fresh `Vec`, or `None` when empty.
    ///
    /// Allocates per call; [`read_into`](Self::read_into) is the faster path
    /// when the caller can reuse a destination slice.
    pub fn read_all(&mut self) -> Option<Vec<u8>> {
        if self.read_pos == self.write_pos {
            return None;
        }
        let out = self.storage[self.read_pos..self.write_pos].to_vec();
        self.clear(); // rewind
        Some(out)
    }

    /// Copy up to `dest.len()` unread bytes into `dest[0..]` and return the
    /// count (0 when empty).
    ///
    /// Bytes that do not fit stay buffered for a subsequent call. This is
    /// the preferred high-throughput read path.
    pub fn read_into(&mut self, dest: &mut [u8]) -> usize {
        if self.read_pos == self.write_pos {
            return 0;
        }
        let count = self.available().min(dest.len());
        dest[..count].copy_from_slice(&self.storage[self.read_pos..self.read_pos + count]);
        self.read_pos += count;
        if self.read_pos == self.write_pos {
            self.clear(); // rewind
        }
        count
    }

    /// Drain everything unread decoded as UTF-8 (lossy), or `None` when
    /// empty.
    pub fn read_string(&mut self) -> Option<String> {
        self.read_all()
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn append_then_available() {
        let mut buf = RxBuffer::with_capacity(64);
        buf.append(b"hello");
        buf.append(b" world");
        assert_eq!(buf.available(), 11);
    }

    #[test]
    fn zero_length_append_is_noop() {
        let mut buf = RxBuffer::with_capacity(8);
        buf.append(&[]);
        assert_eq!(buf.available(), 0);
        assert_eq!(buf.capacity(), 8);
    }

    #[test]
    fn growth_doubles_and_preserves_bytes() {
        let mut buf = RxBuffer::with_capacity(4);
        buf.append(b"abcd");
        assert_eq!(buf.capacity(), 4);
        buf.append(b"efgh");
        assert_eq!(buf.capacity(), 8);
        assert_eq!(buf.available(), 8);
        assert_eq!(buf.read_all().unwrap(), b"abcdefgh");
    }

    #[test]
    fn growth_with_oversized_batch() {
        let mut buf = RxBuffer::with_capacity(4);
        buf.append(b"ab");
        let big = vec![0x55u8; 100];
        buf.append(&big);
        assert_eq!(buf.available(), 102);
        let drained = buf.read_all().unwrap();
        assert_eq!(&drained[..2], b"ab");
        assert_eq!(&drained[2..], &big[..]);
    }

    #[test]
    fn read_byte_returns_sentinel_when_empty() {
        let mut buf = RxBuffer::with_capacity(8);
        assert_eq!(buf.read_byte(), -1);
        buf.append(&[0x00, 0xff]);
        assert_eq!(buf.read_byte(), 0);
        assert_eq!(buf.read_byte(), 255);
        assert_eq!(buf.read_byte(), -1);
    }

    #[test]
    fn read_char_legacy_sentinel() {
        let mut buf = RxBuffer::with_capacity(8);
        assert_eq!(buf.read_char(), EMPTY_CHAR);
        buf.append(b"A");
        assert_eq!(buf.read_char(), 'A');
        assert_eq!(buf.read_char(), EMPTY_CHAR);
    }

    #[test]
    fn rewind_after_drain_avoids_regrowth() {
        let mut buf = RxBuffer::with_capacity(8);
        buf.append(b"12345678");
        assert_eq!(buf.read_all().unwrap(), b"12345678");
        assert_eq!(buf.available(), 0);
        // Cursors rewound: a full-capacity append must fit without growing.
        buf.append(b"abcdefgh");
        assert_eq!(buf.capacity(), 8);
    }

    #[test]
    fn rewind_after_byte_by_byte_drain() {
        let mut buf = RxBuffer::with_capacity(4);
        buf.append(b"xy");
        assert_eq!(buf.read_byte(), i32::from(b'x'));
        assert_eq!(buf.read_byte(), i32::from(b'y'));
        buf.append(b"abcd");
        assert_eq!(buf.capacity(), 4);
    }

    #[test]
    fn read_all_none_when_empty() {
        let mut buf = RxBuffer::with_capacity(8);
        assert_eq!(buf.read_all(), None);
        assert_eq!(buf.read_string(), None);
    }

    #[test]
    fn read_all_roundtrip() {
        let mut buf = RxBuffer::with_capacity(8);
        buf.append(b"roundtrip");
        let drained = buf.read_all().unwrap();
        buf.append(&drained);
        assert_eq!(buf.available(), drained.len());
        assert_eq!(buf.read_all().unwrap(), drained);
    }

    #[test]
    fn read_into_partial_drain() {
        let mut buf = RxBuffer::with_capacity(16);
        buf.append(&[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
        let mut dest = [0u8; 4];
        let mut collected = Vec::new();

        let counts: Vec<usize> = (0..4)
            .map(|_| {
                let n = buf.read_into(&mut dest);
                collected.extend_from_slice(&dest[..n]);
                n
            })
            .collect();

        assert_eq!(counts, vec![4, 4, 2, 0]);
        assert_eq!(collected, vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn read_into_empty_dest() {
        let mut buf = RxBuffer::with_capacity(8);
        buf.append(b"data");
        let mut dest = [0u8; 0];
        assert_eq!(buf.read_into(&mut dest), 0);
        assert_eq!(buf.available(), 4);
    }

    #[test]
    fn read_string_lossy_utf8() {
        let mut buf = RxBuffer::with_capacity(8);
        buf.append(b"ok\xff");
        let text = buf.read_string().unwrap();
        assert!(text.starts_with("ok"));
        assert_eq!(buf.available(), 0);
    }

    #[test]
    fn clear_discards_unread() {
        let mut buf = RxBuffer::with_capacity(8);
        buf.append(b"discard");
        buf.clear();
        assert_eq!(buf.available(), 0);
        assert_eq!(buf.read_byte(), -1);
    }

    proptest! {
        #[test]
        fn arbitrary_appends_preserve_order(
            chunks in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..64), 0..20)
        ) {
            let mut buf = RxBuffer::with_capacity(16);
            let mut expected = Vec::new();
            for chunk in &chunks {
                buf.append(chunk);
                expected.extend_from_slice(chunk);
            }
            prop_assert_eq!(buf.available(), expected.len());
            prop_assert_eq!(buf.read_all().unwrap_or_default(), expected);
        }

        #[test]
        fn interleaved_reads_never_lose_bytes(
            chunks in prop::collection::vec(prop::collection::vec(any::<u8>(), 1..32), 1..10),
            dest_len in 1usize..16
        ) {
            let mut buf = RxBuffer::with_capacity(8);
            let mut expected = Vec::new();
            let mut collected = Vec::new();
            let mut dest = vec![0u8; dest_len];
            for chunk in &chunks {
                buf.append(chunk);
                expected.extend_from_slice(chunk);
                let n = buf.read_into(&mut dest);
                collected.extend_from_slice(&dest[..n]);
            }
            loop {
                let n = buf.read_into(&mut dest);
                if n == 0 {
                    break;
                }
                collected.extend_from_slice(&dest[..n]);
            }
            prop_assert_eq!(collected, expected);
            prop_assert_eq!(buf.available(), 0);
        }
    }
}
