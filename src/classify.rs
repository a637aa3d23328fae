use std::borrow::Cow;

pub(crate) const END_OF_OBJECT: u8 = 0x00;

/// Element types of the BSON wire format. The set is closed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementType {
    Double,
    String,
    Document,
    Array,
    Binary,
    Undefined,
    ObjectId,
    Boolean,
    UtcDatetime,
    Null,
    Regex,
    DbPointer,
    JavaScript,
    Symbol,
    JavaScriptWithScope,
    Int32,
    Timestamp,
    Int64,
    MinKey,
    MaxKey,
}

impl ElementType {
    #[inline]
    pub fn from_tag(tag: u8) -> Option<ElementType> {
        Some(match tag {
            0x01 => ElementType::Double,
            0x02 => ElementType::String,
            0x03 => ElementType::Document,
            0x04 => ElementType::Array,
            0x05 => ElementType::Binary,
            0x06 => ElementType::Undefined,
            0x07 => ElementType::ObjectId,
            0x08 => ElementType::Boolean,
            0x09 => ElementType::UtcDatetime,
            0x0A => ElementType::Null,
            0x0B => ElementType::Regex,
            0x0C => ElementType::DbPointer,
            0x0D => ElementType::JavaScript,
            0x0E => ElementType::Symbol,
            0x0F => ElementType::JavaScriptWithScope,
            0x10 => ElementType::Int32,
            0x11 => ElementType::Timestamp,
            0x12 => ElementType::Int64,
            0x7F => ElementType::MaxKey,
            0xFF => ElementType::MinKey,
            _ => return None,
        })
    }
}

/// Name written as `binary_type` for a binary subtype byte.
pub fn binary_subtype_name(subtype: u8) -> Cow<'static, str> {
    match subtype {
        0x00 => Cow::Borrowed("generic"),
        0x01 => Cow::Borrowed("function"),
        0x02 => Cow::Borrowed("old_binary"),
        0x03 => Cow::Borrowed("old_uuid"),
        0x04 => Cow::Borrowed("uuid"),
        0x05 => Cow::Borrowed("md5"),
        0x80 => Cow::Borrowed("user_defined"),
        n => Cow::Owned(format!("unknown_{}", n)),
    }
}
