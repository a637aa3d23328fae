use super::*;
use crate::emit::CallbackEmitter;

#[test]
fn writer_output_matches_string_output() {
    let bytes = kitchen_sink().bytes();
    let mut out = Vec::new();
    decode_to_writer(&bytes, &Options::default(), &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), decode(&bytes));
}

#[test]
fn writer_chunks_match_string_output() {
    let bytes = kitchen_sink().bytes();
    let mut out = Vec::new();
    decode_chunks_to_writer(bytes.chunks(3), &Options::default(), &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), decode(&bytes));
}

#[test]
fn writer_keeps_output_before_a_fatal_error() {
    let mut bytes = Doc::new().int32("a", 1).bytes();
    // replace the terminator with an unknown tag
    let last = bytes.len() - 1;
    bytes[last] = 0x20;
    let mut d = StreamDecoder::new(Options::default());
    let mut out = Vec::new();
    let err = d.push_to_writer(&bytes, &mut out).unwrap_err();
    assert_eq!(err.kind, DecodeErrorKind::InvalidTag(0x20));
    assert_eq!(out, br#"{"a":1"#);
}

#[test]
fn string_api_drops_output_of_the_failing_call() {
    let mut bytes = Doc::new().int32("a", 1).bytes();
    let last = bytes.len() - 1;
    bytes[last] = 0x20;
    let mut d = StreamDecoder::new(Options::default());
    assert!(d.push(&bytes).is_err());
}

#[test]
fn large_output_flushes_through_the_writer() {
    let mut big = Doc::new();
    for i in 0..2000 {
        big = big.string(&format!("k{}", i), "some value to repeat");
    }
    let bytes = big.bytes();
    let mut out = Vec::new();
    decode_to_writer(&bytes, &Options::default(), &mut out).unwrap();
    let v = json(std::str::from_utf8(&out).unwrap());
    assert_eq!(v.as_object().unwrap().len(), 2000);
    assert_eq!(v["k1999"], serde_json::json!("some value to repeat"));
}

#[test]
fn callback_emitter_sees_every_fragment() {
    let bytes = Doc::new().int32("a", 1).string("b", "x").bytes();
    let mut fragments: Vec<String> = Vec::new();
    let mut d = StreamDecoder::new(Options::default());
    {
        let mut em = CallbackEmitter::new(|s: &str| fragments.push(s.to_string()));
        for chunk in bytes.chunks(2) {
            d.push_to_emitter(chunk, &mut em).unwrap();
        }
        d.finish_to_emitter(&mut em).unwrap();
    }
    assert!(fragments.len() > 3);
    assert_eq!(fragments.concat(), r#"{"a":1,"b":"x"}"#);
}

struct FailingWriter;

impl std::io::Write for FailingWriter {
    fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
        Err(std::io::Error::other("disk full"))
    }
    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn io_errors_surface() {
    let bytes = Doc::new().int32("a", 1).bytes();
    let err = decode_to_writer(&bytes, &Options::default(), &mut FailingWriter).unwrap_err();
    assert!(matches!(err.kind, DecodeErrorKind::Io(_)));
}

/// Yields `Interrupted` before every real read, then a few bytes at a time.
struct InterruptingReader {
    data: std::io::Cursor<Vec<u8>>,
    interrupt: bool,
}

impl std::io::Read for InterruptingReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.interrupt = !self.interrupt;
        if self.interrupt {
            return Err(std::io::ErrorKind::Interrupted.into());
        }
        let n = buf.len().min(3);
        std::io::Read::read(&mut self.data, &mut buf[..n])
    }
}

#[test]
fn interrupted_reads_are_retried() {
    let bytes = kitchen_sink().bytes();
    let mut reader = InterruptingReader {
        data: std::io::Cursor::new(bytes.clone()),
        interrupt: false,
    };
    let mut out = Vec::new();
    let warnings = decode_reader_to_writer(&mut reader, &Options::default(), &mut out, 64).unwrap();
    assert!(warnings.is_empty());
    assert_eq!(String::from_utf8(out).unwrap(), decode(&bytes));
}

#[test]
fn pump_reports_after_every_chunk() {
    let bytes = Doc::new()
        .elem(0x08, "a", &[0x02])
        .elem(0x08, "b", &[0x03])
        .bytes();
    let mut d = StreamDecoder::new(Options::default());
    let mut seen = Vec::new();
    let mut out = Vec::new();
    crate::pump_reader(
        &mut d,
        &mut std::io::Cursor::new(bytes),
        &mut out,
        8,
        |d| seen.extend(d.take_warnings()),
    )
    .unwrap();
    assert_eq!(out, br#"{"a":false,"b":false}"#);
    let kinds: Vec<_> = seen.into_iter().map(|w| w.kind).collect();
    assert_eq!(
        kinds,
        vec![
            DecodeErrorKind::MalformedBoolean(2),
            DecodeErrorKind::MalformedBoolean(3)
        ]
    );
}
