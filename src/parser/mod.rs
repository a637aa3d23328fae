pub(crate) mod cursor;
pub(crate) mod int64;
pub(crate) mod scalar;

use crate::classify::ElementType;
use scalar::StringRead;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ContainerKind {
    Document,
    Array,
}

impl ContainerKind {
    #[inline]
    pub(crate) fn open_token(self) -> char {
        match self {
            ContainerKind::Document => '{',
            ContainerKind::Array => '[',
        }
    }

    #[inline]
    pub(crate) fn close_token(self) -> char {
        match self {
            ContainerKind::Document => '}',
            ContainerKind::Array => ']',
        }
    }
}

/// Where a multi-step value is between resumptions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ValueStep {
    Start,
    /// Reading the length-prefixed string of a string, symbol, code,
    /// code-with-scope or db-pointer value.
    Text(StringRead),
    /// Raw payload still to be written as hex (binary, object id, db-pointer address).
    Hex { remaining: usize },
    /// Regex pattern written, options cstring next.
    RegexOptions,
    /// Code-with-scope: code written, the scope document's length comes next.
    Scope,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FrameState {
    /// Between elements: a type tag or the terminator comes next.
    ReadingTag,
    ReadingKey(ElementType),
    ReadingValue(ElementType, ValueStep),
}

/// One open document or array.
#[derive(Debug)]
pub(crate) struct Frame {
    pub(crate) kind: ContainerKind,
    /// Elements started so far; drives comma placement.
    pub(crate) count: usize,
    pub(crate) state: FrameState,
    /// Length from the wire, when one was read for this container.
    pub(crate) declared_len: Option<u64>,
    /// Offset of the length field (or of the first byte when there is none).
    pub(crate) start_offset: u64,
    /// Closing this frame also closes a code-with-scope wrapper object.
    pub(crate) closes_scope: bool,
}

impl Frame {
    pub(crate) fn new(kind: ContainerKind, declared_len: Option<u64>, start_offset: u64) -> Self {
        Self {
            kind,
            count: 0,
            state: FrameState::ReadingTag,
            declared_len,
            start_offset,
            closes_scope: false,
        }
    }
}
