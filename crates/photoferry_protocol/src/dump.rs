//! Diagnostic rendering of undecodable payloads.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Map, Value, json};

/// Nesting depth beyond which length-delimited fields are rendered as buffers.
pub const DUMP_MAX_DEPTH: usize = 30;

/// Best-effort JSON rendering of a protobuf payload.
///
/// Field numbers become object keys and repeated fields become arrays.
/// Length-delimited fields are shown as nested messages when they parse as
/// one, as strings when printable, and as buffers otherwise. A payload that
/// is not a message at all renders as a single buffer.
///
/// # Examples
///
/// ```
/// use photoferry_protocol::{MessageWriter, dump};
///
/// let mut msg = MessageWriter::new();
/// msg.varint(1, 7).string(2, "IMG_0001.jpg");
/// let value = dump(&msg.finish());
/// assert_eq!(value["1"], 7);
/// assert_eq!(value["2"], "IMG_0001.jpg");
/// ```
pub fn dump(bytes: &[u8]) -> Value {
    render_message(bytes, 0).unwrap_or_else(|| buffer(bytes))
}

fn render_message(bytes: &[u8], depth: usize) -> Option<Value> {
    if depth > DUMP_MAX_DEPTH {
        return None;
    }
    let mut out = Map::new();
    let mut offset = 0;
    while offset < bytes.len() {
        let tag = read_varint(bytes, &mut offset)?;
        let field = tag >> 3;
        if field == 0 {
            return None;
        }
        let value = match tag & 0x7 {
            0 => json!(read_varint(bytes, &mut offset)?),
            1 => buffer(take(bytes, &mut offset, 8)?),
            2 => {
                let len = usize::try_from(read_varint(bytes, &mut offset)?).ok()?;
                render_len(take(bytes, &mut offset, len)?, depth)
            }
            5 => buffer(take(bytes, &mut offset, 4)?),
            _ => return None,
        };
        append(&mut out, field.to_string(), value);
    }
    Some(Value::Object(out))
}

fn render_len(data: &[u8], depth: usize) -> Value {
    if !data.is_empty()
        && let Some(nested) = render_message(data, depth + 1)
        && nested.as_object().is_some_and(|m| !m.is_empty())
    {
        return nested;
    }
    if is_printable(data) {
        return Value::String(String::from_utf8_lossy(data).into_owned());
    }
    buffer(data)
}

fn append(out: &mut Map<String, Value>, key: String, value: Value) {
    match out.get_mut(&key) {
        Some(Value::Array(values)) => values.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            out.insert(key, value);
        }
    }
}

fn buffer(data: &[u8]) -> Value {
    let mut out = Map::new();
    out.insert("type".into(), json!(format!("buffer ({} bytes)", data.len())));
    out.insert("hex".into(), json!(hex::encode(data)));
    out.insert("base64".into(), json!(STANDARD.encode(data)));
    if let Ok(text) = std::str::from_utf8(data) {
        out.insert("string".into(), json!(text));
    }
    Value::Object(out)
}

fn is_printable(data: &[u8]) -> bool {
    match std::str::from_utf8(data) {
        Ok(text) => text
            .chars()
            .all(|c| !c.is_control() || c == '\n' || c == '\r' || c == '\t'),
        Err(_) => false,
    }
}

fn read_varint(bytes: &[u8], offset: &mut usize) -> Option<u64> {
    let mut value = 0u64;
    for shift in (0..64).step_by(7) {
        let byte = *bytes.get(*offset)?;
        *offset += 1;
        value |= u64::from(byte & 0x7f) << shift;
        if byte & 0x80 == 0 {
            return Some(value);
        }
    }
    None
}

fn take<'a>(bytes: &'a [u8], offset: &mut usize, len: usize) -> Option<&'a [u8]> {
    let end = offset.checked_add(len).filter(|end| *end <= bytes.len())?;
    let slice = &bytes[*offset..end];
    *offset = end;
    Some(slice)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MessageWriter;

    #[test]
    fn test_repeated_fields_become_arrays() {
        let mut msg = MessageWriter::new();
        msg.varint(11, 1).varint(11, 2);
        assert_eq!(dump(&msg.finish())["11"], json!([1, 2]));
    }

    #[test]
    fn test_garbage_renders_as_buffer() {
        let value = dump(&[0xff, 0xff]);
        assert_eq!(value["hex"], "ffff");
    }

    #[test]
    fn test_deep_nesting_is_bounded() {
        let mut msg = MessageWriter::new();
        msg.string(1, "leaf");
        for _ in 0..40 {
            let mut outer = MessageWriter::new();
            outer.message(1, msg);
            msg = outer;
        }
        // Must terminate and still produce an object at the root
        assert!(dump(&msg.finish()).is_object());
    }
}
