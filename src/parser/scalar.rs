use super::cursor::ByteCursor;
use super::int64;
use crate::emit::Emitter;
use crate::error::{DecodeError, DecodeErrorKind, DecodeResult};
use crate::options::Int64Mode;

/// Progress through a length-prefixed string: `int32 len, bytes, 0x00`,
/// where `len` counts the terminator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum StringRead {
    AwaitingLength,
    AwaitingBytes { len: usize },
}

#[derive(Debug)]
pub(crate) struct DecodedString {
    pub(crate) text: String,
    /// Whether the last payload byte was the mandatory 0x00.
    pub(crate) terminated: bool,
}

/// Advances a string read. `Ok(None)` means more bytes are needed; the step
/// is updated so the next call resumes where this one stopped.
pub(crate) fn read_string(
    cursor: &mut ByteCursor,
    step: &mut StringRead,
) -> DecodeResult<Option<DecodedString>> {
    if *step == StringRead::AwaitingLength {
        let at = cursor.offset();
        let Some(len) = cursor.read_i32() else {
            return Ok(None);
        };
        if len < 1 {
            return Err(DecodeError::new(DecodeErrorKind::InvalidLength(len), at));
        }
        *step = StringRead::AwaitingBytes { len: len as usize };
    }
    let StringRead::AwaitingBytes { len } = *step else {
        return Ok(None);
    };
    let Some(bytes) = cursor.read_exact(len) else {
        return Ok(None);
    };
    let (body, last) = bytes.split_at(len - 1);
    let decoded = DecodedString {
        text: String::from_utf8_lossy(body).into_owned(),
        terminated: last[0] == 0,
    };
    *step = StringRead::AwaitingLength;
    Ok(Some(decoded))
}

/// Streams up to `remaining` raw bytes as lowercase hex. Returns `true` once
/// the whole payload has been written.
pub(crate) fn stream_hex<E: Emitter>(
    cursor: &mut ByteCursor,
    remaining: &mut usize,
    out: &mut E,
) -> DecodeResult<bool> {
    if *remaining > 0 {
        let at = cursor.offset();
        let bytes = cursor.take(*remaining);
        let n = bytes.len();
        if n > 0 {
            out.emit_str(&hex::encode(bytes))?;
        }
        *remaining = remaining
            .checked_sub(n)
            .ok_or_else(|| DecodeError::new(DecodeErrorKind::BinaryOverrun, at))?;
    }
    Ok(*remaining == 0)
}

/// JSON string literal for `s`.
pub(crate) fn quote(s: &str) -> DecodeResult<String> {
    serde_json::to_string(s).map_err(|e| DecodeError::from_serde("encode", e))
}

/// JSON numeral for a double. `None` for NaN and infinities, which JSON cannot express.
/// Whole values keep a fractional part (`3.0`, not `3`); both parse to the same number.
pub(crate) fn double_token(value: f64) -> Option<String> {
    serde_json::Number::from_f64(value).map(|n| n.to_string())
}

pub(crate) fn int64_token(bytes: [u8; 8], mode: Int64Mode) -> DecodeResult<String> {
    match mode {
        Int64Mode::Truncate => Ok(int64::format_approximate(int64::approximate(bytes))),
        Int64Mode::Number => Ok(int64::to_decimal(bytes)),
        Int64Mode::String => quote(&int64::to_decimal(bytes)),
        Int64Mode::Auto => {
            let exact = int64::to_decimal(bytes);
            if int64::format_approximate(int64::approximate(bytes)) == exact {
                Ok(exact)
            } else {
                quote(&exact)
            }
        }
    }
}

/// Decodes a boolean byte. Anything but 0x00/0x01 falls back to `false`
/// and reports the offending byte.
#[inline]
pub(crate) fn decode_bool(byte: u8) -> (bool, Option<DecodeErrorKind>) {
    match byte {
        0x00 => (false, None),
        0x01 => (true, None),
        other => (false, Some(DecodeErrorKind::MalformedBoolean(other))),
    }
}
