use crate::error::{DecodeError, DecodeResult};
use std::io::Write;

/// Sink for JSON text fragments. Fragments are only ever appended.
pub trait Emitter {
    fn emit_str(&mut self, s: &str) -> DecodeResult<()>;
    fn emit_char(&mut self, c: char) -> DecodeResult<()> {
        let mut buf = [0u8; 4];
        let s = c.encode_utf8(&mut buf);
        self.emit_str(s)
    }
}

pub struct StringEmitter<'a> {
    out: &'a mut String,
}

impl<'a> StringEmitter<'a> {
    pub fn new(out: &'a mut String) -> Self {
        Self { out }
    }
}

impl<'a> Emitter for StringEmitter<'a> {
    fn emit_str(&mut self, s: &str) -> DecodeResult<()> {
        self.out.push_str(s);
        Ok(())
    }
}

/// Buffers fragments and writes them out once `cap` bytes are pending.
/// Call `flush_all` before dropping.
pub struct WriterEmitter<'a, W: Write> {
    pub w: &'a mut W,
    buf: Vec<u8>,
    cap: usize,
}

impl<'a, W: Write> WriterEmitter<'a, W> {
    pub fn with_capacity(w: &'a mut W, cap: usize) -> Self {
        Self {
            w,
            buf: Vec::with_capacity(cap),
            cap,
        }
    }

    pub fn flush_all(&mut self) -> DecodeResult<()> {
        if !self.buf.is_empty() {
            self.w.write_all(&self.buf).map_err(DecodeError::from_io)?;
            self.buf.clear();
        }
        Ok(())
    }
}

impl<'a, W: Write> Emitter for WriterEmitter<'a, W> {
    fn emit_str(&mut self, s: &str) -> DecodeResult<()> {
        self.buf.extend_from_slice(s.as_bytes());
        if self.buf.len() >= self.cap {
            self.flush_all()?;
        }
        Ok(())
    }
}

/// Hands every fragment to a closure as soon as it is produced.
pub struct CallbackEmitter<F: FnMut(&str)> {
    f: F,
}

impl<F: FnMut(&str)> CallbackEmitter<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F: FnMut(&str)> Emitter for CallbackEmitter<F> {
    fn emit_str(&mut self, s: &str) -> DecodeResult<()> {
        (self.f)(s);
        Ok(())
    }
}
