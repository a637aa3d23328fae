use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeErrorKind {
    /// Boolean byte outside {0x00, 0x01}; decoding continued with `false`.
    #[error("unknown boolean value 0x{0:02x}")]
    MalformedBoolean(u8),
    /// String payload whose last byte is not 0x00; decoding continued with the read value.
    #[error("string must end with a null terminator")]
    MalformedString,
    #[error("unknown element type 0x{0:02x}")]
    InvalidTag(u8),
    #[error("unexpected end-of-object")]
    UnexpectedTerminator,
    #[error("more data is available after end-of-object")]
    TrailingData,
    #[error("BSON document incomplete")]
    IncompleteStream,
    #[error("no data was available")]
    EmptyStream,
    #[error("read more binary data than declared")]
    BinaryOverrun,
    #[error("invalid length {0}")]
    InvalidLength(i32),
    #[error("declared length {declared} does not match actual length {actual}")]
    LengthMismatch { declared: u64, actual: u64 },
    #[error("stream already finished")]
    StreamClosed,
    #[error("io write error: {0}")]
    Io(String),
    #[error("{0}")]
    Serde(String),
}

impl DecodeErrorKind {
    /// Recoverable errors are reported as warnings and decoding carries on.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            DecodeErrorKind::MalformedBoolean(_) | DecodeErrorKind::MalformedString
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at byte {position}")]
pub struct DecodeError {
    pub kind: DecodeErrorKind,
    pub position: u64,
}

impl DecodeError {
    pub fn new(kind: DecodeErrorKind, position: u64) -> Self {
        Self { kind, position }
    }

    pub fn is_fatal(&self) -> bool {
        self.kind.is_fatal()
    }

    pub fn from_serde(what: &str, err: serde_json::Error) -> Self {
        Self {
            kind: DecodeErrorKind::Serde(format!("serde_json {} error: {}", what, err)),
            position: 0,
        }
    }

    pub(crate) fn from_io(err: std::io::Error) -> Self {
        Self::new(DecodeErrorKind::Io(err.to_string()), 0)
    }
}

pub type DecodeResult<T> = Result<T, DecodeError>;
