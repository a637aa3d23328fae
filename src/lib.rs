//! Incremental BSON to JSON transcoding.
//!
//! Bytes may arrive in pieces of any size; JSON text is produced as soon as
//! the bytes for it are available. 64-bit integers are rendered exactly,
//! independent of what the consumer's number type can hold (see [`Int64Mode`]).

mod classify;
pub mod cli;
pub mod emit;
pub mod error;
mod log;
pub mod options;
mod parser;
pub mod stream;

pub use classify::{ElementType, binary_subtype_name};
pub use error::{DecodeError, DecodeErrorKind};
pub use log::DecodeLogEntry;
pub use options::{Int64Mode, Options};
pub use stream::StreamDecoder;

use std::io::{Read, Write};

/// Decode a complete BSON byte sequence into a JSON string.
/// Recoverable warnings are dropped; see [`decode_to_string_with_warnings`].
pub fn decode_to_string(input: &[u8], opts: &Options) -> Result<String, DecodeError> {
    decode_chunks_to_string([input], opts)
}

/// Decode a complete BSON byte sequence and write the JSON text into `writer`.
/// Recoverable warnings are dropped.
pub fn decode_to_writer<W: Write>(
    input: &[u8],
    opts: &Options,
    writer: &mut W,
) -> Result<(), DecodeError> {
    decode_chunks_to_writer([input], opts, writer)
}

/// Convenience: decode a sequence of byte chunks and collect the JSON text into a String.
/// Recoverable warnings are dropped.
pub fn decode_chunks_to_string<'a, I>(chunks: I, opts: &Options) -> Result<String, DecodeError>
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let mut d = StreamDecoder::new(opts.clone());
    let mut out = String::new();
    for c in chunks.into_iter() {
        let s = d.push(c)?;
        if !s.is_empty() {
            out.push_str(&s);
        }
    }
    out.push_str(&d.finish()?);
    Ok(out)
}

/// Convenience: decode a sequence of byte chunks and write the JSON text into `writer`.
/// Recoverable warnings are dropped.
pub fn decode_chunks_to_writer<'a, I, W>(
    chunks: I,
    opts: &Options,
    writer: &mut W,
) -> Result<(), DecodeError>
where
    I: IntoIterator<Item = &'a [u8]>,
    W: Write,
{
    let mut d = StreamDecoder::new(opts.clone());
    for c in chunks.into_iter() {
        d.push_to_writer(c, writer)?;
    }
    d.finish_to_writer(writer)
}

/// Read `reader` to the end in chunks of `chunk_size` bytes, decoding as it goes.
/// Returns the recoverable problems met along the way.
pub fn decode_reader_to_writer<R: Read, W: Write>(
    reader: &mut R,
    opts: &Options,
    writer: &mut W,
    chunk_size: usize,
) -> Result<Vec<DecodeError>, DecodeError> {
    let mut d = StreamDecoder::new(opts.clone());
    pump_reader(&mut d, reader, writer, chunk_size, |_| {})?;
    Ok(d.take_warnings())
}

/// Feeds `reader` through `d` until end of input, then finishes it.
/// Interrupted reads are retried; `after_chunk` runs after every decoded chunk.
pub(crate) fn pump_reader<R: Read, W: Write>(
    d: &mut StreamDecoder,
    reader: &mut R,
    writer: &mut W,
    chunk_size: usize,
    mut after_chunk: impl FnMut(&mut StreamDecoder),
) -> Result<(), DecodeError> {
    let mut buf = vec![0u8; chunk_size.max(1)];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(DecodeError::from_io(e)),
        };
        d.push_to_writer(&buf[..n], writer)?;
        after_chunk(d);
    }
    d.finish_to_writer(writer)
}

/// Decode and then parse into `serde_json::Value`. Recoverable warnings are dropped.
pub fn decode_to_value(input: &[u8], opts: &Options) -> Result<serde_json::Value, DecodeError> {
    let s = decode_to_string(input, opts)?;
    let v = serde_json::from_str(&s).map_err(|e| DecodeError::from_serde("parse", e))?;
    Ok(v)
}

/// Decode and return the JSON text together with the recoverable problems met
/// along the way.
pub fn decode_to_string_with_warnings(
    input: &[u8],
    opts: &Options,
) -> Result<(String, Vec<DecodeError>), DecodeError> {
    let mut d = StreamDecoder::new(opts.clone());
    let mut out = d.push(input)?;
    out.push_str(&d.finish()?);
    Ok((out, d.take_warnings()))
}

/// Decode and return both the JSON text and the decode log.
/// Logging is switched on regardless of `opts.logging`.
pub fn decode_to_string_with_log(
    input: &[u8],
    opts: &Options,
) -> Result<(String, Vec<DecodeLogEntry>), DecodeError> {
    let opts = Options {
        logging: true,
        ..opts.clone()
    };
    let mut d = StreamDecoder::new(opts);
    let mut out = d.push(input)?;
    out.push_str(&d.finish()?);
    Ok((out, d.take_log()))
}

#[cfg(test)]
mod tests;
