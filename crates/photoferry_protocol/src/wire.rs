//! Protobuf wire primitives.
//!
//! The service speaks schema-less protobuf, so messages are built and read
//! field by field rather than through generated types.

use photoferry_error::DecodeError;

/// Largest valid protobuf field number.
pub const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;

const MAX_VARINT_LEN: usize = 10;

/// Protobuf wire types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum WireType {
    /// Variable-length integer
    #[display("varint")]
    Varint,
    /// Little-endian 64-bit value
    #[display("fixed64")]
    Fixed64,
    /// Length-prefixed bytes, strings and nested messages
    #[display("length-delimited")]
    Len,
    /// Little-endian 32-bit value
    #[display("fixed32")]
    Fixed32,
}

impl WireType {
    fn bits(self) -> u64 {
        match self {
            WireType::Varint => 0,
            WireType::Fixed64 => 1,
            WireType::Len => 2,
            WireType::Fixed32 => 5,
        }
    }
}

/// Append `value` as a base-128 varint.
pub fn put_varint(buf: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        buf.push((value as u8) | 0x80);
        value >>= 7;
    }
    buf.push(value as u8);
}

/// Builder for one protobuf message.
///
/// # Examples
///
/// ```
/// use photoferry_protocol::MessageWriter;
///
/// let mut inner = MessageWriter::new();
/// inner.varint(1, 150);
/// let mut outer = MessageWriter::new();
/// outer.message(3, inner);
/// assert_eq!(outer.finish(), vec![0x1a, 0x03, 0x08, 0x96, 0x01]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageWriter {
    buf: Vec<u8>,
}

impl MessageWriter {
    /// Empty message.
    pub fn new() -> Self {
        Self::default()
    }

    fn tag(&mut self, field: u32, wire_type: WireType) {
        put_varint(&mut self.buf, (u64::from(field) << 3) | wire_type.bits());
    }

    /// Append a varint field.
    pub fn varint(&mut self, field: u32, value: u64) -> &mut Self {
        self.tag(field, WireType::Varint);
        put_varint(&mut self.buf, value);
        self
    }

    /// Append a signed integer field in two's complement, as `int64` does.
    pub fn int64(&mut self, field: u32, value: i64) -> &mut Self {
        self.varint(field, value as u64)
    }

    /// Append a length-delimited bytes field.
    pub fn bytes(&mut self, field: u32, value: &[u8]) -> &mut Self {
        self.tag(field, WireType::Len);
        put_varint(&mut self.buf, value.len() as u64);
        self.buf.extend_from_slice(value);
        self
    }

    /// Append a string field.
    pub fn string(&mut self, field: u32, value: &str) -> &mut Self {
        self.bytes(field, value.as_bytes())
    }

    /// Append a nested message field.
    pub fn message(&mut self, field: u32, message: MessageWriter) -> &mut Self {
        self.bytes(field, &message.buf)
    }

    /// Append an empty nested message for each field number.
    pub fn empty_messages(&mut self, fields: &[u32]) -> &mut Self {
        for field in fields {
            self.bytes(*field, &[]);
        }
        self
    }

    /// Encoded length so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// True if no field was written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The encoded message.
    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

/// One decoded field value, borrowing from the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    /// Varint
    Varint(u64),
    /// 64-bit
    Fixed64(u64),
    /// Length-delimited
    Len(&'a [u8]),
    /// 32-bit
    Fixed32(u32),
}

impl FieldValue<'_> {
    /// Wire type of this value.
    pub fn wire_type(&self) -> WireType {
        match self {
            FieldValue::Varint(_) => WireType::Varint,
            FieldValue::Fixed64(_) => WireType::Fixed64,
            FieldValue::Len(_) => WireType::Len,
            FieldValue::Fixed32(_) => WireType::Fixed32,
        }
    }
}

/// Fields of one decoded message, in wire order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields<'a> {
    fields: Vec<(u32, FieldValue<'a>)>,
}

impl<'a> Fields<'a> {
    /// Last occurrence of `field`, matching protobuf's last-one-wins rule.
    pub fn last(&self, field: u32) -> Option<FieldValue<'a>> {
        self.fields
            .iter()
            .rev()
            .find(|(number, _)| *number == field)
            .map(|(_, value)| *value)
    }

    /// Every occurrence of `field`, in wire order.
    pub fn all(&self, field: u32) -> impl Iterator<Item = FieldValue<'a>> + '_ {
        self.fields
            .iter()
            .filter(move |(number, _)| *number == field)
            .map(|(_, value)| *value)
    }

    /// All fields in wire order.
    pub fn iter(&self) -> impl Iterator<Item = &(u32, FieldValue<'a>)> {
        self.fields.iter()
    }

    /// Number of decoded fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if the message had no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Strict reader over one response payload.
///
/// Every error carries the root payload, not the nested slice that failed,
/// so diagnostics always show the start of the response.
#[derive(Debug, Clone, Copy)]
pub struct Reader<'a> {
    root: &'a [u8],
}

impl<'a> Reader<'a> {
    /// Reader for `root`.
    pub fn new(root: &'a [u8]) -> Self {
        Self { root }
    }

    /// Build a decode error for this payload.
    #[track_caller]
    pub fn error(&self, reason: impl Into<String>) -> DecodeError {
        DecodeError::new(reason, self.root)
    }

    /// Parse the root payload.
    pub fn parse_root(&self) -> Result<Fields<'a>, DecodeError> {
        self.parse(self.root)
    }

    /// Parse `buf` as a message.
    ///
    /// Fails on truncated varints or length prefixes, field number zero,
    /// field numbers above [`MAX_FIELD_NUMBER`], group wire types and
    /// unknown wire types.
    pub fn parse(&self, buf: &'a [u8]) -> Result<Fields<'a>, DecodeError> {
        let mut fields = Vec::new();
        let mut offset = 0;
        while offset < buf.len() {
            let tag = self.varint_at(buf, &mut offset)?;
            let number = tag >> 3;
            if number == 0 {
                return Err(self.error("field number 0"));
            }
            if number > u64::from(MAX_FIELD_NUMBER) {
                return Err(self.error(format!("field number {} out of range", number)));
            }
            let number = number as u32;

            let value = match tag & 0x7 {
                0 => FieldValue::Varint(self.varint_at(buf, &mut offset)?),
                1 => {
                    let raw = self.take(buf, &mut offset, 8, number)?;
                    let mut bytes = [0u8; 8];
                    bytes.copy_from_slice(raw);
                    FieldValue::Fixed64(u64::from_le_bytes(bytes))
                }
                2 => {
                    let len = self.varint_at(buf, &mut offset)?;
                    let len = usize::try_from(len).map_err(|_| {
                        self.error(format!("field {} length {} overflows", number, len))
                    })?;
                    FieldValue::Len(self.take(buf, &mut offset, len, number)?)
                }
                3 | 4 => {
                    return Err(self.error(format!("field {} uses unsupported group encoding", number)));
                }
                5 => {
                    let raw = self.take(buf, &mut offset, 4, number)?;
                    let mut bytes = [0u8; 4];
                    bytes.copy_from_slice(raw);
                    FieldValue::Fixed32(u32::from_le_bytes(bytes))
                }
                other => {
                    return Err(self.error(format!("field {} has unknown wire type {}", number, other)));
                }
            };
            fields.push((number, value));
        }
        Ok(Fields { fields })
    }

    /// Nested message at `field`, or `None` when absent.
    pub fn message(&self, fields: &Fields<'a>, field: u32) -> Result<Option<Fields<'a>>, DecodeError> {
        match fields.last(field) {
            None => Ok(None),
            Some(FieldValue::Len(bytes)) => self.parse(bytes).map(Some),
            Some(other) => Err(self.wrong_type(field, WireType::Len, other.wire_type())),
        }
    }

    /// Every nested message at a repeated `field`.
    pub fn messages(&self, fields: &Fields<'a>, field: u32) -> Result<Vec<Fields<'a>>, DecodeError> {
        fields
            .all(field)
            .map(|value| match value {
                FieldValue::Len(bytes) => self.parse(bytes),
                other => Err(self.wrong_type(field, WireType::Len, other.wire_type())),
            })
            .collect()
    }

    /// Raw bytes at `field`, or `None` when absent.
    pub fn bytes(&self, fields: &Fields<'a>, field: u32) -> Result<Option<&'a [u8]>, DecodeError> {
        match fields.last(field) {
            None => Ok(None),
            Some(FieldValue::Len(bytes)) => Ok(Some(bytes)),
            Some(other) => Err(self.wrong_type(field, WireType::Len, other.wire_type())),
        }
    }

    /// UTF-8 string at `field`, or `None` when absent.
    pub fn string(&self, fields: &Fields<'a>, field: u32) -> Result<Option<&'a str>, DecodeError> {
        match self.bytes(fields, field)? {
            None => Ok(None),
            Some(bytes) => std::str::from_utf8(bytes)
                .map(Some)
                .map_err(|e| self.error(format!("field {} is not UTF-8: {}", field, e))),
        }
    }

    /// Varint at `field`, or `None` when absent.
    pub fn varint(&self, fields: &Fields<'a>, field: u32) -> Result<Option<u64>, DecodeError> {
        match fields.last(field) {
            None => Ok(None),
            Some(FieldValue::Varint(value)) => Ok(Some(value)),
            Some(other) => Err(self.wrong_type(field, WireType::Varint, other.wire_type())),
        }
    }

    fn wrong_type(&self, field: u32, expected: WireType, found: WireType) -> DecodeError {
        self.error(format!("field {} expected {}, found {}", field, expected, found))
    }

    fn varint_at(&self, buf: &[u8], offset: &mut usize) -> Result<u64, DecodeError> {
        let mut value = 0u64;
        for i in 0..MAX_VARINT_LEN {
            let byte = *buf
                .get(*offset)
                .ok_or_else(|| self.error("truncated varint"))?;
            *offset += 1;
            if i == MAX_VARINT_LEN - 1 && byte > 1 {
                return Err(self.error("varint overflows 64 bits"));
            }
            value |= u64::from(byte & 0x7f) << (7 * i);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(self.error("varint longer than 10 bytes"))
    }

    fn take(
        &self,
        buf: &'a [u8],
        offset: &mut usize,
        len: usize,
        field: u32,
    ) -> Result<&'a [u8], DecodeError> {
        let start = *offset;
        let end = start
            .checked_add(len)
            .filter(|end| *end <= buf.len())
            .ok_or_else(|| {
                self.error(format!(
                    "field {} needs {} bytes, {} remain",
                    field,
                    len,
                    buf.len() - start
                ))
            })?;
        let slice = &buf[start..end];
        *offset = end;
        Ok(slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_varint_boundaries() {
        for value in [0u64, 1, 127, 128, 300, u32::MAX as u64, u64::MAX] {
            let mut writer = MessageWriter::new();
            writer.varint(1, value);
            let bytes = writer.finish();
            let reader = Reader::new(&bytes);
            let fields = reader.parse_root().unwrap();
            assert_eq!(reader.varint(&fields, 1).unwrap(), Some(value));
        }
    }

    #[test]
    fn test_eleven_byte_varint_is_rejected() {
        let bytes = [0x08, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01];
        assert!(Reader::new(&bytes).parse_root().is_err());
    }

    #[test]
    fn test_tenth_byte_overflow_is_rejected() {
        let bytes = [0x08, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x02];
        let err = Reader::new(&bytes).parse_root().unwrap_err();
        assert!(err.reason.contains("overflows"));
    }

    #[test]
    fn test_last_occurrence_wins() {
        let mut writer = MessageWriter::new();
        writer.varint(4, 1).varint(4, 2);
        let bytes = writer.finish();
        let reader = Reader::new(&bytes);
        let fields = reader.parse_root().unwrap();
        assert_eq!(reader.varint(&fields, 4).unwrap(), Some(2));
        assert_eq!(fields.all(4).count(), 2);
    }
}
