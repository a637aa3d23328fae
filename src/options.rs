use std::fmt;
use std::str::FromStr;

/// How 64-bit integers (int64, UTC datetime, timestamp) are written.
#[derive(Clone, Debug, Copy, PartialEq, Eq, Default)]
pub enum Int64Mode {
    /// Rebuild the value from two 32-bit words in `f64`. Large values lose precision.
    Truncate,
    /// Always a bare decimal numeral, even beyond the 2^53 safe-integer range.
    Number,
    /// Always a quoted decimal string.
    #[default]
    String,
    /// A bare numeral when the `f64` rendering is exact, a quoted string otherwise.
    Auto,
}

impl FromStr for Int64Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "false" | "off" | "truncate" => Ok(Int64Mode::Truncate),
            "number" => Ok(Int64Mode::Number),
            "string" => Ok(Int64Mode::String),
            "auto" | "true" => Ok(Int64Mode::Auto),
            other => Err(format!("unknown int64 mode: {}", other)),
        }
    }
}

impl fmt::Display for Int64Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Int64Mode::Truncate => "false",
            Int64Mode::Number => "number",
            Int64Mode::String => "string",
            Int64Mode::Auto => "auto",
        };
        f.write_str(s)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Int64Mode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Int64Mode::Truncate => serializer.serialize_bool(false),
            other => serializer.serialize_str(&other.to_string()),
        }
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Int64Mode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Flag(bool),
            Name(String),
        }
        match Raw::deserialize(deserializer)? {
            Raw::Flag(false) => Ok(Int64Mode::Truncate),
            Raw::Flag(true) => Ok(Int64Mode::Auto),
            Raw::Name(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct Options {
    /// Each top-level document starts with its 4-byte length, which is skipped.
    pub has_header: bool,
    /// Input is a concatenation of top-level documents, written out as one JSON array.
    pub array_of_bsons: bool,
    /// Output policy for int64, UTC datetime and timestamp values.
    pub preserve_int64: Int64Mode,
    /// Check every declared document/array length against the bytes actually consumed.
    /// Framing is terminator-driven either way; this only adds an integrity check.
    pub validate_lengths: bool,
    /// Consumed bytes kept before the input buffer is compacted.
    pub compact_threshold: usize,
    /// Record a decode log. Use `decode_to_string_with_log` or `StreamDecoder::take_log`.
    pub logging: bool,
    /// Attach a JSON path to log entries.
    pub log_json_path: bool,
    /// Bytes captured on both sides of the position in log context snippets.
    pub log_context_window: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            has_header: true,
            array_of_bsons: false,
            preserve_int64: Int64Mode::String,
            validate_lengths: false,
            compact_threshold: 10 * 1024,
            logging: false,
            log_json_path: false,
            log_context_window: 8,
        }
    }
}
