use memchr::memchr;

/// Unconsumed tail of every byte delivered so far.
///
/// Every read either succeeds and advances, or returns `None` and leaves the
/// cursor untouched. Positions reported by `offset` are absolute, so discarding
/// the consumed prefix never changes what a later read means.
pub(crate) struct ByteCursor {
    buf: Vec<u8>,
    pos: usize,
    /// Absolute offset of `buf[0]`.
    base: u64,
    /// Bytes after `pos` already known to contain no 0x00.
    scanned: usize,
    compact_threshold: usize,
}

impl ByteCursor {
    pub(crate) fn new(compact_threshold: usize) -> Self {
        Self {
            buf: Vec::new(),
            pos: 0,
            base: 0,
            scanned: 0,
            compact_threshold,
        }
    }

    pub(crate) fn supply(&mut self, chunk: &[u8]) {
        if chunk.is_empty() {
            return;
        }
        if self.pos == self.buf.len() {
            self.base += self.pos as u64;
            self.buf.clear();
            self.pos = 0;
        } else if self.pos > self.compact_threshold {
            self.base += self.pos as u64;
            self.buf.drain(..self.pos);
            self.pos = 0;
        }
        self.buf.extend_from_slice(chunk);
    }

    #[inline]
    pub(crate) fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    #[inline]
    pub(crate) fn offset(&self) -> u64 {
        self.base + self.pos as u64
    }

    #[inline]
    fn advance(&mut self, n: usize) {
        self.pos += n;
        self.scanned = 0;
    }

    pub(crate) fn read_exact(&mut self, n: usize) -> Option<&[u8]> {
        if self.remaining() < n {
            return None;
        }
        let start = self.pos;
        self.advance(n);
        Some(&self.buf[start..start + n])
    }

    pub(crate) fn read_array<const N: usize>(&mut self) -> Option<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_exact(N)?);
        Some(out)
    }

    #[inline]
    pub(crate) fn read_u8(&mut self) -> Option<u8> {
        self.read_array::<1>().map(|b| b[0])
    }

    #[inline]
    pub(crate) fn read_i32(&mut self) -> Option<i32> {
        self.read_array::<4>().map(i32::from_le_bytes)
    }

    #[inline]
    pub(crate) fn read_f64(&mut self) -> Option<f64> {
        self.read_array::<8>().map(f64::from_le_bytes)
    }

    /// Reads an `i32` length followed by a subtype byte, only if all five are present.
    pub(crate) fn read_i32_and_u8(&mut self) -> Option<(i32, u8)> {
        let b = self.read_array::<5>()?;
        Some((i32::from_le_bytes([b[0], b[1], b[2], b[3]]), b[4]))
    }

    /// Takes up to `max` of the available bytes. Empty when nothing is buffered.
    pub(crate) fn take(&mut self, max: usize) -> &[u8] {
        let n = max.min(self.remaining());
        let start = self.pos;
        self.advance(n);
        &self.buf[start..start + n]
    }

    /// Reads a zero-terminated byte string, returning it without the terminator.
    pub(crate) fn read_cstring(&mut self) -> Option<&[u8]> {
        let from = self.pos + self.scanned;
        match memchr(0, &self.buf[from..]) {
            Some(i) => {
                let start = self.pos;
                let end = from + i;
                self.advance(end + 1 - start);
                Some(&self.buf[start..end])
            }
            None => {
                self.scanned = self.remaining();
                None
            }
        }
    }

    /// Hex snippet of the buffered bytes around the current position.
    pub(crate) fn context(&self, window: usize) -> String {
        let start = self.pos.saturating_sub(window);
        let end = (self.pos + window).min(self.buf.len());
        format!(
            "{}|{}",
            hex::encode(&self.buf[start..self.pos]),
            hex::encode(&self.buf[self.pos..end])
        )
    }

    /// Drops everything still buffered.
    pub(crate) fn discard(&mut self) {
        self.base += self.buf.len() as u64;
        self.buf.clear();
        self.pos = 0;
        self.scanned = 0;
    }

    #[cfg(test)]
    pub(crate) fn buffered(&self) -> usize {
        self.buf.len()
    }
}
