use super::*;

// Shared test helpers
fn lcg_sizes(seed: u64, len: usize) -> Vec<usize> {
    let mut x = seed;
    let mut out = Vec::new();
    let mut total = 0usize;
    while total < len {
        // LCG: constants from Numerical Recipes
        x = x.wrapping_mul(1664525).wrapping_add(1013904223);
        // chunk size in [1..16]
        let mut n = (((x >> 24) as usize) % 16) + 1;
        if total + n > len {
            n = len - total;
        }
        out.push(n);
        total += n;
    }
    out
}

fn chunk_by_sizes<'a>(bytes: &'a [u8], sizes: &[usize]) -> Vec<&'a [u8]> {
    let mut res = Vec::new();
    let mut start = 0;
    for &n in sizes {
        if start >= bytes.len() {
            break;
        }
        let end = (start + n).min(bytes.len());
        res.push(&bytes[start..end]);
        start = end;
    }
    if start < bytes.len() {
        res.push(&bytes[start..]);
    }
    res
}

fn decode(bytes: &[u8]) -> String {
    decode_to_string(bytes, &Options::default()).unwrap()
}

fn decode_with(bytes: &[u8], opts: &Options) -> String {
    decode_to_string(bytes, opts).unwrap()
}

fn json(s: &str) -> serde_json::Value {
    serde_json::from_str(s).unwrap()
}

/// Length-prefixed BSON string payload.
fn string_payload(s: &str) -> Vec<u8> {
    let mut out = ((s.len() + 1) as i32).to_le_bytes().to_vec();
    out.extend_from_slice(s.as_bytes());
    out.push(0);
    out
}

/// Small BSON writer for fixtures.
#[derive(Default, Clone)]
struct Doc {
    body: Vec<u8>,
}

impl Doc {
    fn new() -> Self {
        Self::default()
    }

    fn elem(mut self, tag: u8, key: &str, payload: &[u8]) -> Self {
        self.body.push(tag);
        self.body.extend_from_slice(key.as_bytes());
        self.body.push(0);
        self.body.extend_from_slice(payload);
        self
    }

    fn double(self, k: &str, v: f64) -> Self {
        self.elem(0x01, k, &v.to_le_bytes())
    }
    fn string(self, k: &str, v: &str) -> Self {
        self.elem(0x02, k, &string_payload(v))
    }
    fn doc(self, k: &str, d: Doc) -> Self {
        self.elem(0x03, k, &d.bytes())
    }
    fn array(self, k: &str, d: Doc) -> Self {
        self.elem(0x04, k, &d.bytes())
    }
    fn binary(self, k: &str, subtype: u8, data: &[u8]) -> Self {
        let mut p = (data.len() as i32).to_le_bytes().to_vec();
        p.push(subtype);
        p.extend_from_slice(data);
        self.elem(0x05, k, &p)
    }
    fn undefined(self, k: &str) -> Self {
        self.elem(0x06, k, &[])
    }
    fn object_id(self, k: &str, id: [u8; 12]) -> Self {
        self.elem(0x07, k, &id)
    }
    fn boolean(self, k: &str, v: bool) -> Self {
        self.elem(0x08, k, &[v as u8])
    }
    fn datetime(self, k: &str, v: i64) -> Self {
        self.elem(0x09, k, &v.to_le_bytes())
    }
    fn null(self, k: &str) -> Self {
        self.elem(0x0A, k, &[])
    }
    fn regex(self, k: &str, pattern: &str, options: &str) -> Self {
        let mut p = pattern.as_bytes().to_vec();
        p.push(0);
        p.extend_from_slice(options.as_bytes());
        p.push(0);
        self.elem(0x0B, k, &p)
    }
    fn db_pointer(self, k: &str, ns: &str, id: [u8; 12]) -> Self {
        let mut p = string_payload(ns);
        p.extend_from_slice(&id);
        self.elem(0x0C, k, &p)
    }
    fn code(self, k: &str, code: &str) -> Self {
        self.elem(0x0D, k, &string_payload(code))
    }
    fn symbol(self, k: &str, s: &str) -> Self {
        self.elem(0x0E, k, &string_payload(s))
    }
    fn code_with_scope(self, k: &str, code: &str, scope: Doc) -> Self {
        let mut inner = string_payload(code);
        inner.extend_from_slice(&scope.bytes());
        let mut p = ((inner.len() + 4) as i32).to_le_bytes().to_vec();
        p.extend_from_slice(&inner);
        self.elem(0x0F, k, &p)
    }
    fn int32(self, k: &str, v: i32) -> Self {
        self.elem(0x10, k, &v.to_le_bytes())
    }
    fn timestamp(self, k: &str, v: i64) -> Self {
        self.elem(0x11, k, &v.to_le_bytes())
    }
    fn int64(self, k: &str, v: i64) -> Self {
        self.elem(0x12, k, &v.to_le_bytes())
    }
    fn max_key(self, k: &str) -> Self {
        self.elem(0x7F, k, &[])
    }
    fn min_key(self, k: &str) -> Self {
        self.elem(0xFF, k, &[])
    }

    /// Full document: length, elements, terminator.
    fn bytes(&self) -> Vec<u8> {
        let mut out = ((self.body.len() + 5) as i32).to_le_bytes().to_vec();
        out.extend_from_slice(&self.body);
        out.push(0);
        out
    }

    /// Elements and terminator only, for streams without a length header.
    fn headerless(&self) -> Vec<u8> {
        let mut out = self.body.clone();
        out.push(0);
        out
    }
}

/// Array document with keys "0", "1", ... built by `f`.
fn arr(f: impl FnOnce(ArrayBuilder) -> ArrayBuilder) -> Doc {
    f(ArrayBuilder::default()).doc
}

#[derive(Default)]
struct ArrayBuilder {
    doc: Doc,
    next: usize,
}

impl ArrayBuilder {
    fn push(mut self, f: impl FnOnce(Doc, &str) -> Doc) -> Self {
        let key = self.next.to_string();
        self.doc = f(self.doc, &key);
        self.next += 1;
        self
    }
}

/// One document touching every element type.
fn kitchen_sink() -> Doc {
    Doc::new()
        .double("d", 1.5)
        .string("s", "héllo \"w\"\n")
        .doc("o", Doc::new().int32("x", 1).string("y", "z"))
        .array(
            "a",
            arr(|a| {
                a.push(|d, k| d.int32(k, 1))
                    .push(|d, k| d.string(k, "two"))
                    .push(|d, k| d.doc(k, Doc::new()))
            }),
        )
        .binary("bin", 0x00, &[0xde, 0xad, 0xbe, 0xef])
        .undefined("u")
        .object_id("oid", [0x50, 0x7f, 0x1f, 0x77, 0xbc, 0xf8, 0x6c, 0xd7, 0x99, 0x43, 0x90, 0x11])
        .boolean("t", true)
        .boolean("f", false)
        .datetime("dt", 1_700_000_000_000)
        .null("n")
        .regex("re", "^a.*b$", "im")
        .db_pointer("ptr", "db.coll", [1; 12])
        .code("js", "function(){return 1}")
        .symbol("sym", "sym")
        .code_with_scope("jsw", "x + 1", Doc::new().int32("x", 41))
        .int32("i", -7)
        .timestamp("ts", (7i64 << 32) | 3)
        .int64("big", i64::MAX)
        .max_key("max")
        .min_key("min")
}

mod writer_emitters;
