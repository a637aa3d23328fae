use crate::classify::{END_OF_OBJECT, ElementType, binary_subtype_name};
use crate::emit::{Emitter, StringEmitter, WriterEmitter};
use crate::error::{DecodeError, DecodeErrorKind, DecodeResult};
use crate::log::{DecodeLogEntry, Logger};
use crate::options::Options;
use crate::parser::cursor::ByteCursor;
use crate::parser::scalar::{self, StringRead};
use crate::parser::{ContainerKind, Frame, FrameState, ValueStep};
use std::io::Write;

const WRITER_BUFFER: usize = 8 * 1024;

enum Step {
    Continue,
    /// Not enough bytes for the read in flight.
    Suspend,
}

/// Incremental BSON to JSON decoder for one logical byte stream.
///
/// Feed chunks of any size with [`push`](Self::push) (or one of its
/// writer/emitter variants) and call [`finish`](Self::finish) once the input
/// has ended. Each call decodes as far as the buffered bytes allow and returns
/// the JSON text produced so far; concatenated, the outputs form the complete
/// JSON text regardless of where the chunks were split.
///
/// ```
/// use bsonjson::{Options, StreamDecoder};
///
/// // {"a": 1}
/// let bytes = [12, 0, 0, 0, 0x10, b'a', 0, 1, 0, 0, 0, 0];
/// let mut d = StreamDecoder::new(Options::default());
/// let mut json = d.push(&bytes[..6]).unwrap();
/// json += &d.push(&bytes[6..]).unwrap();
/// json += &d.finish().unwrap();
/// assert_eq!(json, r#"{"a":1}"#);
/// ```
///
/// Malformed booleans and unterminated strings are recovered from and
/// collected as warnings (see [`take_warnings`](Self::take_warnings)). Any other
/// error is fatal: it is returned from the call that hit it and from every
/// later call.
pub struct StreamDecoder {
    opts: Options,
    cursor: ByteCursor,
    stack: Vec<Frame>,
    documents: usize,
    warnings: Vec<DecodeError>,
    log: Logger,
    failed: Option<DecodeError>,
    finished: bool,
}

impl StreamDecoder {
    pub fn new(opts: Options) -> Self {
        let mut log = Logger::new(opts.logging, opts.log_json_path);
        if opts.array_of_bsons {
            // slot for the index of the top-level document
            log.enter();
        }
        Self {
            cursor: ByteCursor::new(opts.compact_threshold),
            opts,
            stack: Vec::new(),
            documents: 0,
            warnings: Vec::new(),
            log,
            failed: None,
            finished: false,
        }
    }

    /// Decode `chunk` and return the JSON text it completes.
    ///
    /// On a fatal error the text produced earlier in the same call is dropped;
    /// use [`push_to_writer`](Self::push_to_writer) to keep it.
    pub fn push(&mut self, chunk: &[u8]) -> Result<String, DecodeError> {
        let mut out = String::new();
        self.push_to_emitter(chunk, &mut StringEmitter::new(&mut out))?;
        Ok(out)
    }

    /// Decode `chunk` and write the JSON text it completes into `writer`.
    /// Text produced before a fatal error still reaches the writer.
    pub fn push_to_writer<W: Write>(
        &mut self,
        chunk: &[u8],
        writer: &mut W,
    ) -> Result<(), DecodeError> {
        let mut em = WriterEmitter::with_capacity(writer, WRITER_BUFFER);
        let res = self.push_to_emitter(chunk, &mut em);
        let flushed = em.flush_all();
        res?;
        flushed
    }

    pub fn push_to_emitter<E: Emitter>(&mut self, chunk: &[u8], out: &mut E) -> DecodeResult<()> {
        self.check_usable()?;
        self.cursor.supply(chunk);
        let res = self.drive(out);
        self.record(res)
    }

    /// Signal end of input. Returns the closing text (the `]` of a
    /// multi-document stream) or the error explaining why the input was
    /// incomplete.
    pub fn finish(&mut self) -> Result<String, DecodeError> {
        let mut out = String::new();
        self.finish_to_emitter(&mut StringEmitter::new(&mut out))?;
        Ok(out)
    }

    pub fn finish_to_writer<W: Write>(&mut self, writer: &mut W) -> Result<(), DecodeError> {
        let mut em = WriterEmitter::with_capacity(writer, WRITER_BUFFER);
        let res = self.finish_to_emitter(&mut em);
        let flushed = em.flush_all();
        res?;
        flushed
    }

    pub fn finish_to_emitter<E: Emitter>(&mut self, out: &mut E) -> DecodeResult<()> {
        self.check_usable()?;
        self.finished = true;
        let res = self.close_stream(out);
        self.record(res)
    }

    /// Top-level documents started so far.
    pub fn documents(&self) -> usize {
        self.documents
    }

    /// Current nesting depth; zero between top-level documents.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn warnings(&self) -> &[DecodeError] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<DecodeError> {
        std::mem::take(&mut self.warnings)
    }

    pub fn take_log(&mut self) -> Vec<DecodeLogEntry> {
        self.log.take()
    }

    fn check_usable(&self) -> DecodeResult<()> {
        if let Some(err) = &self.failed {
            return Err(err.clone());
        }
        if self.finished {
            return Err(self.error_here(DecodeErrorKind::StreamClosed));
        }
        Ok(())
    }

    fn record(&mut self, res: DecodeResult<()>) -> DecodeResult<()> {
        if let Err(err) = &res
            && err.is_fatal()
            && self.failed.is_none()
        {
            let ctx = self.context();
            self.log.log(err.position, "fatal decode error", ctx);
            self.failed = Some(err.clone());
            self.cursor.discard();
        }
        res
    }

    fn drive<E: Emitter>(&mut self, out: &mut E) -> DecodeResult<()> {
        loop {
            if let Step::Suspend = self.step(out)? {
                return Ok(());
            }
        }
    }

    fn step<E: Emitter>(&mut self, out: &mut E) -> DecodeResult<Step> {
        let Some(frame) = self.stack.last() else {
            return self.open_top_level(out);
        };
        let state = frame.state;
        match state {
            FrameState::ReadingTag => self.read_tag(out),
            FrameState::ReadingKey(ty) => self.read_key(ty, out),
            FrameState::ReadingValue(ty, step) => self.read_value(ty, step, out),
        }
    }

    fn open_top_level<E: Emitter>(&mut self, out: &mut E) -> DecodeResult<Step> {
        if self.cursor.remaining() == 0 {
            return Ok(Step::Suspend);
        }
        if !self.opts.array_of_bsons && self.documents > 0 {
            return Err(self.error_here(DecodeErrorKind::TrailingData));
        }
        let start = self.cursor.offset();
        if self.opts.array_of_bsons {
            self.log.set_index(self.documents);
        }
        let declared = if self.opts.has_header {
            let Some(len) = self.cursor.read_i32() else {
                return Ok(Step::Suspend);
            };
            let ctx = self.context();
            self.log.log(start, "skipped length header", ctx);
            self.declared_length(len, start)?
        } else {
            None
        };
        if self.opts.array_of_bsons {
            out.emit_char(if self.documents == 0 { '[' } else { ',' })?;
        }
        out.emit_char('{')?;
        self.documents += 1;
        self.stack
            .push(Frame::new(ContainerKind::Document, declared, start));
        self.log.enter();
        Ok(Step::Continue)
    }

    fn read_tag<E: Emitter>(&mut self, out: &mut E) -> DecodeResult<Step> {
        let at = self.cursor.offset();
        let Some(tag) = self.cursor.read_u8() else {
            return Ok(Step::Suspend);
        };
        if tag == END_OF_OBJECT {
            return self.close_frame(out);
        }
        let Some(ty) = ElementType::from_tag(tag) else {
            return Err(DecodeError::new(DecodeErrorKind::InvalidTag(tag), at));
        };
        let frame = self.top(at)?;
        let separate = frame.count > 0;
        frame.count += 1;
        frame.state = FrameState::ReadingKey(ty);
        if separate {
            out.emit_char(',')?;
        }
        Ok(Step::Continue)
    }

    fn read_key<E: Emitter>(&mut self, ty: ElementType, out: &mut E) -> DecodeResult<Step> {
        let at = self.cursor.offset();
        let frame = self.top(at)?;
        let (kind, index) = (frame.kind, frame.count - 1);
        let Some(raw) = self.cursor.read_cstring() else {
            return Ok(Step::Suspend);
        };
        match kind {
            ContainerKind::Document => {
                let key = String::from_utf8_lossy(raw).into_owned();
                out.emit_str(&scalar::quote(&key)?)?;
                out.emit_char(':')?;
                self.log.set_key(&key);
            }
            // array keys are the decimal indices; emission order already carries them
            ContainerKind::Array => self.log.set_index(index),
        }
        self.set_state(FrameState::ReadingValue(ty, ValueStep::Start));
        Ok(Step::Continue)
    }

    fn read_value<E: Emitter>(
        &mut self,
        ty: ElementType,
        step: ValueStep,
        out: &mut E,
    ) -> DecodeResult<Step> {
        let at = self.cursor.offset();
        match (ty, step) {
            (_, ValueStep::Hex { remaining }) => self.continue_hex(ty, remaining, out),
            (ElementType::Double, _) => {
                let Some(v) = self.cursor.read_f64() else {
                    return Ok(Step::Suspend);
                };
                match scalar::double_token(v) {
                    Some(tok) => out.emit_str(&tok)?,
                    None => {
                        let ctx = self.context();
                        self.log.log(at, "non-finite double written as null", ctx);
                        out.emit_str("null")?;
                    }
                }
                self.value_done()
            }
            (ElementType::String | ElementType::Symbol, _) => {
                let Some(s) = self.read_text(ty, step)? else {
                    return Ok(Step::Suspend);
                };
                out.emit_str(&scalar::quote(&s)?)?;
                self.value_done()
            }
            (ElementType::Document, _) => self.open_container(ContainerKind::Document, false, out),
            (ElementType::Array, _) => self.open_container(ContainerKind::Array, false, out),
            (ElementType::Binary, _) => {
                let Some((len, subtype)) = self.cursor.read_i32_and_u8() else {
                    return Ok(Step::Suspend);
                };
                if len < 0 {
                    return Err(DecodeError::new(DecodeErrorKind::InvalidLength(len), at));
                }
                out.emit_str("{\"binary_type\":")?;
                out.emit_str(&scalar::quote(&binary_subtype_name(subtype))?)?;
                out.emit_str(",\"binary_data\":\"")?;
                self.continue_hex(ty, len as usize, out)
            }
            (ElementType::ObjectId, _) => {
                out.emit_str("{\"object_id\":\"")?;
                self.continue_hex(ty, 12, out)
            }
            (ElementType::Boolean, _) => {
                let Some(byte) = self.cursor.read_u8() else {
                    return Ok(Step::Suspend);
                };
                let (value, problem) = scalar::decode_bool(byte);
                if let Some(kind) = problem {
                    self.warn(DecodeError::new(kind, at), "malformed boolean written as false");
                }
                out.emit_str(if value { "true" } else { "false" })?;
                self.value_done()
            }
            (ElementType::Int32, _) => {
                let Some(v) = self.cursor.read_i32() else {
                    return Ok(Step::Suspend);
                };
                out.emit_str(&v.to_string())?;
                self.value_done()
            }
            (ElementType::UtcDatetime | ElementType::Timestamp | ElementType::Int64, _) => {
                let Some(bytes) = self.cursor.read_array::<8>() else {
                    return Ok(Step::Suspend);
                };
                out.emit_str(&scalar::int64_token(bytes, self.opts.preserve_int64)?)?;
                self.value_done()
            }
            (
                ElementType::Undefined | ElementType::Null | ElementType::MinKey | ElementType::MaxKey,
                _,
            ) => {
                out.emit_str("null")?;
                self.value_done()
            }
            (ElementType::Regex, ValueStep::RegexOptions) => {
                let Some(raw) = self.cursor.read_cstring() else {
                    return Ok(Step::Suspend);
                };
                let options = String::from_utf8_lossy(raw).into_owned();
                out.emit_str(",\"regex_options\":")?;
                out.emit_str(&scalar::quote(&options)?)?;
                out.emit_char('}')?;
                self.value_done()
            }
            (ElementType::Regex, _) => {
                let Some(raw) = self.cursor.read_cstring() else {
                    return Ok(Step::Suspend);
                };
                let pattern = String::from_utf8_lossy(raw).into_owned();
                out.emit_str("{\"regex\":")?;
                out.emit_str(&scalar::quote(&pattern)?)?;
                self.set_state(FrameState::ReadingValue(ty, ValueStep::RegexOptions));
                Ok(Step::Continue)
            }
            (ElementType::DbPointer, _) => {
                let Some(s) = self.read_text(ty, step)? else {
                    return Ok(Step::Suspend);
                };
                out.emit_str("{\"db_pointer\":")?;
                out.emit_str(&scalar::quote(&s)?)?;
                out.emit_str(",\"db_pointer_addr\":\"")?;
                self.continue_hex(ty, 12, out)
            }
            (ElementType::JavaScript, _) => {
                let Some(code) = self.read_text(ty, step)? else {
                    return Ok(Step::Suspend);
                };
                out.emit_str("{\"js\":")?;
                out.emit_str(&scalar::quote(&code)?)?;
                out.emit_char('}')?;
                self.value_done()
            }
            (ElementType::JavaScriptWithScope, ValueStep::Start) => {
                // total length; the code string and scope document carry their own
                if self.cursor.read_i32().is_none() {
                    return Ok(Step::Suspend);
                }
                self.set_state(FrameState::ReadingValue(
                    ty,
                    ValueStep::Text(StringRead::AwaitingLength),
                ));
                Ok(Step::Continue)
            }
            (ElementType::JavaScriptWithScope, ValueStep::Scope) => {
                self.open_container(ContainerKind::Document, true, out)
            }
            (ElementType::JavaScriptWithScope, _) => {
                let Some(code) = self.read_text(ty, step)? else {
                    return Ok(Step::Suspend);
                };
                out.emit_str("{\"js\":")?;
                out.emit_str(&scalar::quote(&code)?)?;
                out.emit_str(",\"js_scope\":")?;
                self.set_state(FrameState::ReadingValue(ty, ValueStep::Scope));
                Ok(Step::Continue)
            }
        }
    }

    /// Reads the length-prefixed string of the value in flight, parking the
    /// partial progress in the frame when the bytes are not all there yet.
    fn read_text(&mut self, ty: ElementType, step: ValueStep) -> DecodeResult<Option<String>> {
        let mut read = match step {
            ValueStep::Text(read) => read,
            _ => StringRead::AwaitingLength,
        };
        match scalar::read_string(&mut self.cursor, &mut read)? {
            Some(decoded) => {
                if !decoded.terminated {
                    let at = self.cursor.offset() - 1;
                    self.warn(
                        DecodeError::new(DecodeErrorKind::MalformedString, at),
                        "string without null terminator",
                    );
                }
                Ok(Some(decoded.text))
            }
            None => {
                self.set_state(FrameState::ReadingValue(ty, ValueStep::Text(read)));
                Ok(None)
            }
        }
    }

    fn continue_hex<E: Emitter>(
        &mut self,
        ty: ElementType,
        mut remaining: usize,
        out: &mut E,
    ) -> DecodeResult<Step> {
        if scalar::stream_hex(&mut self.cursor, &mut remaining, out)? {
            out.emit_str("\"}")?;
            self.value_done()
        } else {
            self.set_state(FrameState::ReadingValue(ty, ValueStep::Hex { remaining }));
            Ok(Step::Suspend)
        }
    }

    fn open_container<E: Emitter>(
        &mut self,
        kind: ContainerKind,
        closes_scope: bool,
        out: &mut E,
    ) -> DecodeResult<Step> {
        let at = self.cursor.offset();
        let Some(len) = self.cursor.read_i32() else {
            return Ok(Step::Suspend);
        };
        let declared = self.declared_length(len, at)?;
        // from the parent's view the element is done once the child closes
        self.set_state(FrameState::ReadingTag);
        out.emit_char(kind.open_token())?;
        let mut frame = Frame::new(kind, declared, at);
        frame.closes_scope = closes_scope;
        self.stack.push(frame);
        self.log.enter();
        Ok(Step::Continue)
    }

    fn close_frame<E: Emitter>(&mut self, out: &mut E) -> DecodeResult<Step> {
        let end = self.cursor.offset();
        let Some(frame) = self.stack.pop() else {
            return Err(DecodeError::new(
                DecodeErrorKind::UnexpectedTerminator,
                end.saturating_sub(1),
            ));
        };
        self.log.leave();
        if let Some(declared) = frame.declared_len {
            let actual = end - frame.start_offset;
            if actual != declared {
                return Err(DecodeError::new(
                    DecodeErrorKind::LengthMismatch { declared, actual },
                    end - 1,
                ));
            }
        }
        out.emit_char(frame.kind.close_token())?;
        if frame.closes_scope {
            out.emit_char('}')?;
        }
        Ok(Step::Continue)
    }

    fn close_stream<E: Emitter>(&mut self, out: &mut E) -> DecodeResult<()> {
        if !self.stack.is_empty() || self.cursor.remaining() > 0 {
            return Err(self.error_here(DecodeErrorKind::IncompleteStream));
        }
        if self.opts.array_of_bsons {
            if self.documents == 0 {
                out.emit_char('[')?;
            }
            out.emit_char(']')?;
        } else if self.documents == 0 {
            return Err(self.error_here(DecodeErrorKind::EmptyStream));
        }
        Ok(())
    }

    /// Length to check on close, when validation is on.
    fn declared_length(&self, len: i32, at: u64) -> DecodeResult<Option<u64>> {
        if !self.opts.validate_lengths {
            return Ok(None);
        }
        // length field plus terminator
        if len < 5 {
            return Err(DecodeError::new(DecodeErrorKind::InvalidLength(len), at));
        }
        Ok(Some(len as u64))
    }

    fn top(&mut self, at: u64) -> DecodeResult<&mut Frame> {
        self.stack
            .last_mut()
            .ok_or_else(|| DecodeError::new(DecodeErrorKind::UnexpectedTerminator, at))
    }

    #[inline]
    fn set_state(&mut self, state: FrameState) {
        if let Some(frame) = self.stack.last_mut() {
            frame.state = state;
        }
    }

    #[inline]
    fn value_done(&mut self) -> DecodeResult<Step> {
        self.set_state(FrameState::ReadingTag);
        Ok(Step::Continue)
    }

    fn warn(&mut self, err: DecodeError, message: &'static str) {
        let ctx = self.context();
        self.log.log(err.position, message, ctx);
        self.warnings.push(err);
    }

    fn context(&self) -> String {
        if self.log.enabled() {
            self.cursor.context(self.opts.log_context_window)
        } else {
            String::new()
        }
    }

    #[inline]
    fn error_here(&self, kind: DecodeErrorKind) -> DecodeError {
        DecodeError::new(kind, self.cursor.offset())
    }
}
