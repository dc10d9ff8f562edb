//! Recursive decoding of the engine's tagged-union responses.

use std::ffi::CStr;
use std::slice;

use thiserror::Error;

use crate::types::{CommandResponse, ErrorInfo, ErrorKind};
use crate::value::Value;

/// A structurally invalid response node.
///
/// These indicate an ABI mismatch with the engine, not a server-side
/// failure; server failures arrive as [`ErrorInfo`] descriptors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unknown response tag {0}")]
    UnknownTag(i32),
    #[error("{kind} payload has negative length {len}")]
    NegativeLength { kind: &'static str, len: i64 },
    #[error("{kind} payload of length {len} has a null pointer")]
    NullPayload { kind: &'static str, len: i64 },
    #[error("map entry is missing its {0} node")]
    IncompleteMapEntry(&'static str),
    #[error("error payload is not valid UTF-8")]
    MalformedError,
}

/// Decodes one response tree into an owned [`Value`].
///
/// # Safety
///
/// `resp` must point to a well-formed node produced by the engine, with
/// every child pointer either null or valid for the lengths recorded next
/// to it. The tree must stay alive for the duration of the call.
pub unsafe fn decode_response(resp: *const CommandResponse) -> Result<Value, DecodeError> {
    if resp.is_null() {
        return Ok(Value::Nil);
    }
    unsafe { decode_node(&*resp) }
}

unsafe fn decode_node(node: &CommandResponse) -> Result<Value, DecodeError> {
    use crate::types::ResponseType as Tag;
    let tag = Tag::from_raw(node.response_type)
        .ok_or(DecodeError::UnknownTag(node.response_type))?;
    match tag {
        Tag::Null => Ok(Value::Nil),
        Tag::Ok => Ok(Value::Ok),
        Tag::Int => Ok(Value::Int(node.int_value)),
        Tag::Float => Ok(Value::Double(node.float_value)),
        Tag::Bool => Ok(Value::Bool(node.bool_value)),
        Tag::String => {
            let bytes =
                unsafe { decode_bytes("string", node.string_value, node.string_value_len)? };
            Ok(Value::Bytes(bytes))
        }
        Tag::Array => {
            let children =
                unsafe { decode_children("array", node.array_value, node.array_value_len)? };
            Ok(Value::Array(children))
        }
        Tag::Sets => {
            let children =
                unsafe { decode_children("set", node.sets_value, node.sets_value_len)? };
            Ok(Value::Set(children))
        }
        Tag::Map => {
            let entries =
                unsafe { node_slice("map", node.array_value, node.array_value_len)? };
            let mut out = Vec::with_capacity(entries.len());
            for entry in entries {
                if entry.map_key.is_null() {
                    return Err(DecodeError::IncompleteMapEntry("key"));
                }
                if entry.map_value.is_null() {
                    return Err(DecodeError::IncompleteMapEntry("value"));
                }
                let key = unsafe { decode_node(&*entry.map_key)? };
                let value = unsafe { decode_node(&*entry.map_value)? };
                out.push((key, value));
            }
            Ok(Value::Map(out))
        }
        Tag::Error => {
            let bytes =
                unsafe { decode_bytes("error", node.string_value, node.string_value_len)? };
            let message = String::from_utf8(bytes).map_err(|_| DecodeError::MalformedError)?;
            Ok(Value::ServerError(message))
        }
    }
}

unsafe fn decode_bytes(
    kind: &'static str,
    ptr: *mut u8,
    len: i64,
) -> Result<Vec<u8>, DecodeError> {
    if len < 0 {
        return Err(DecodeError::NegativeLength { kind, len });
    }
    if len == 0 {
        return Ok(Vec::new());
    }
    if ptr.is_null() {
        return Err(DecodeError::NullPayload { kind, len });
    }
    Ok(unsafe { slice::from_raw_parts(ptr, len as usize) }.to_vec())
}

unsafe fn node_slice<'a>(
    kind: &'static str,
    ptr: *mut CommandResponse,
    len: i64,
) -> Result<&'a [CommandResponse], DecodeError> {
    if len < 0 {
        return Err(DecodeError::NegativeLength { kind, len });
    }
    if len == 0 {
        return Ok(&[]);
    }
    if ptr.is_null() {
        return Err(DecodeError::NullPayload { kind, len });
    }
    Ok(unsafe { slice::from_raw_parts(ptr, len as usize) })
}

unsafe fn decode_children(
    kind: &'static str,
    ptr: *mut CommandResponse,
    len: i64,
) -> Result<Vec<Value>, DecodeError> {
    let nodes = unsafe { node_slice(kind, ptr, len)? };
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        out.push(unsafe { decode_node(node)? });
    }
    Ok(out)
}

/// Decodes an error descriptor into its kind and message.
///
/// # Safety
///
/// `info.message` must be null or a valid NUL-terminated string.
pub unsafe fn decode_error(info: &ErrorInfo) -> (ErrorKind, String) {
    let kind = ErrorKind::from_raw(info.kind);
    let message = if info.message.is_null() {
        String::new()
    } else {
        unsafe { CStr::from_ptr(info.message) }
            .to_string_lossy()
            .into_owned()
    };
    (kind, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResponseType;
    use std::ptr;

    fn string_node(text: &[u8]) -> (CommandResponse, Vec<u8>) {
        let mut backing = text.to_vec();
        let mut node = CommandResponse::null();
        node.response_type = ResponseType::String as i32;
        node.string_value = backing.as_mut_ptr();
        node.string_value_len = backing.len() as i64;
        (node, backing)
    }

    #[test]
    fn decodes_scalars() {
        let mut node = CommandResponse::null();
        assert_eq!(unsafe { decode_node(&node) }, Ok(Value::Nil));

        node.response_type = ResponseType::Ok as i32;
        assert_eq!(unsafe { decode_node(&node) }, Ok(Value::Ok));

        node.response_type = ResponseType::Int as i32;
        node.int_value = -7;
        assert_eq!(unsafe { decode_node(&node) }, Ok(Value::Int(-7)));

        node.response_type = ResponseType::Float as i32;
        node.float_value = 1.5;
        assert_eq!(unsafe { decode_node(&node) }, Ok(Value::Double(1.5)));

        node.response_type = ResponseType::Bool as i32;
        node.bool_value = true;
        assert_eq!(unsafe { decode_node(&node) }, Ok(Value::Bool(true)));
    }

    #[test]
    fn decodes_strings_and_empty_strings() {
        let (node, _backing) = string_node(b"hello");
        assert_eq!(
            unsafe { decode_node(&node) },
            Ok(Value::Bytes(b"hello".to_vec()))
        );

        // Zero length with a null pointer is a legal empty string.
        let mut empty = CommandResponse::null();
        empty.response_type = ResponseType::String as i32;
        assert_eq!(unsafe { decode_node(&empty) }, Ok(Value::Bytes(Vec::new())));
    }

    #[test]
    fn rejects_null_payload_with_nonzero_length() {
        let mut node = CommandResponse::null();
        node.response_type = ResponseType::String as i32;
        node.string_value = ptr::null_mut();
        node.string_value_len = 3;
        assert_eq!(
            unsafe { decode_node(&node) },
            Err(DecodeError::NullPayload {
                kind: "string",
                len: 3
            })
        );
    }

    #[test]
    fn rejects_unknown_tags_and_negative_lengths() {
        let mut node = CommandResponse::null();
        node.response_type = 77;
        assert_eq!(unsafe { decode_node(&node) }, Err(DecodeError::UnknownTag(77)));

        let mut node = CommandResponse::null();
        node.response_type = ResponseType::Array as i32;
        node.array_value_len = -1;
        assert_eq!(
            unsafe { decode_node(&node) },
            Err(DecodeError::NegativeLength {
                kind: "array",
                len: -1
            })
        );
    }

    #[test]
    fn decodes_nested_arrays() {
        let (inner_a, _keep_a) = string_node(b"a");
        let mut int_node = CommandResponse::null();
        int_node.response_type = ResponseType::Int as i32;
        int_node.int_value = 2;

        let mut inner = vec![inner_a, int_node];
        let mut outer_child = CommandResponse::null();
        outer_child.response_type = ResponseType::Array as i32;
        outer_child.array_value = inner.as_mut_ptr();
        outer_child.array_value_len = inner.len() as i64;

        let mut outer_children = vec![outer_child];
        let mut root = CommandResponse::null();
        root.response_type = ResponseType::Array as i32;
        root.array_value = outer_children.as_mut_ptr();
        root.array_value_len = 1;

        assert_eq!(
            unsafe { decode_node(&root) },
            Ok(Value::Array(vec![Value::Array(vec![
                Value::Bytes(b"a".to_vec()),
                Value::Int(2),
            ])]))
        );
    }

    #[test]
    fn decodes_maps_and_sets() {
        let (mut key, _keep_key) = string_node(b"field");
        let mut val = CommandResponse::null();
        val.response_type = ResponseType::Int as i32;
        val.int_value = 42;

        let mut entry = CommandResponse::null();
        entry.map_key = &mut key as *mut CommandResponse;
        entry.map_value = &mut val as *mut CommandResponse;

        let mut entries = vec![entry];
        let mut map = CommandResponse::null();
        map.response_type = ResponseType::Map as i32;
        map.array_value = entries.as_mut_ptr();
        map.array_value_len = 1;

        assert_eq!(
            unsafe { decode_node(&map) },
            Ok(Value::Map(vec![(
                Value::Bytes(b"field".to_vec()),
                Value::Int(42)
            )]))
        );

        let (member, _keep_member) = string_node(b"m1");
        let mut members = vec![member];
        let mut set = CommandResponse::null();
        set.response_type = ResponseType::Sets as i32;
        set.sets_value = members.as_mut_ptr();
        set.sets_value_len = 1;

        assert_eq!(
            unsafe { decode_node(&set) },
            Ok(Value::Set(vec![Value::Bytes(b"m1".to_vec())]))
        );
    }

    #[test]
    fn map_entries_require_both_sides() {
        let mut entries = vec![CommandResponse::null()];
        let mut map = CommandResponse::null();
        map.response_type = ResponseType::Map as i32;
        map.array_value = entries.as_mut_ptr();
        map.array_value_len = 1;
        assert_eq!(
            unsafe { decode_node(&map) },
            Err(DecodeError::IncompleteMapEntry("key"))
        );
    }

    #[test]
    fn null_root_decodes_to_nil() {
        assert_eq!(unsafe { decode_response(ptr::null()) }, Ok(Value::Nil));
    }
}
