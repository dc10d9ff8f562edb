//! Shape checks applied to decoded engine replies.
//!
//! Every command method knows the value kind its reply must carry; these
//! helpers enforce that and turn anything else into
//! [`Error::UnexpectedResponse`]. A [`Value::ServerError`] reaching any of
//! them becomes [`Error::Command`] instead — it is a real server rejection,
//! not a shape mismatch.

use skate_ffi::Value;

use crate::error::{Error, Result};

fn mismatch(expected: &'static str, value: Value) -> Error {
    match value {
        Value::ServerError(message) => Error::Command(message),
        other => Error::UnexpectedResponse {
            expected,
            actual: other.kind_str(),
        },
    }
}

pub(crate) fn expect_ok(value: Value) -> Result<()> {
    match value {
        Value::Ok => Ok(()),
        other => Err(mismatch("ok", other)),
    }
}

pub(crate) fn expect_int(value: Value) -> Result<i64> {
    match value {
        Value::Int(v) => Ok(v),
        other => Err(mismatch("int", other)),
    }
}

pub(crate) fn expect_double(value: Value) -> Result<f64> {
    match value {
        Value::Double(v) => Ok(v),
        // Servers answer some float commands with integer replies.
        Value::Int(v) => Ok(v as f64),
        other => Err(mismatch("double", other)),
    }
}

pub(crate) fn expect_optional_double(value: Value) -> Result<Option<f64>> {
    match value {
        Value::Nil => Ok(None),
        other => expect_double(other).map(Some),
    }
}

pub(crate) fn expect_bool(value: Value) -> Result<bool> {
    match value {
        Value::Bool(v) => Ok(v),
        // RESP2 connections report booleans as 0/1 integers.
        Value::Int(v) => Ok(v != 0),
        other => Err(mismatch("bool", other)),
    }
}

pub(crate) fn expect_bytes(value: Value) -> Result<Vec<u8>> {
    match value {
        Value::Bytes(v) => Ok(v),
        other => Err(mismatch("bytes", other)),
    }
}

pub(crate) fn expect_optional_bytes(value: Value) -> Result<Option<Vec<u8>>> {
    match value {
        Value::Nil => Ok(None),
        other => expect_bytes(other).map(Some),
    }
}

pub(crate) fn expect_string(value: Value) -> Result<String> {
    let bytes = expect_bytes(value)?;
    String::from_utf8(bytes)
        .map_err(|err| Error::InvalidArgument(format!("reply is not valid UTF-8: {err}")))
}

pub(crate) fn expect_optional_string(value: Value) -> Result<Option<String>> {
    match value {
        Value::Nil => Ok(None),
        other => expect_string(other).map(Some),
    }
}

pub(crate) fn expect_array(value: Value) -> Result<Vec<Value>> {
    match value {
        Value::Array(items) | Value::Set(items) => Ok(items),
        other => Err(mismatch("array", other)),
    }
}

pub(crate) fn expect_pairs(value: Value) -> Result<Vec<(Value, Value)>> {
    match value {
        Value::Map(entries) => Ok(entries),
        // A flat even-length array carries the same information.
        Value::Array(items) if items.len() % 2 == 0 => {
            let mut entries = Vec::with_capacity(items.len() / 2);
            let mut iter = items.into_iter();
            while let (Some(key), Some(val)) = (iter.next(), iter.next()) {
                entries.push((key, val));
            }
            Ok(entries)
        }
        other => Err(mismatch("map", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_become_command_errors() {
        let err = expect_int(Value::ServerError("WRONGTYPE".into())).unwrap_err();
        assert!(matches!(err, Error::Command(msg) if msg == "WRONGTYPE"));
    }

    #[test]
    fn shape_mismatches_name_both_kinds() {
        let err = expect_ok(Value::Int(1)).unwrap_err();
        match err {
            Error::UnexpectedResponse { expected, actual } => {
                assert_eq!(expected, "ok");
                assert_eq!(actual, "int");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn doubles_accept_integer_replies() {
        assert_eq!(expect_double(Value::Int(5)).unwrap(), 5.0);
    }

    #[test]
    fn pairs_accept_flat_arrays() {
        let flat = Value::Array(vec![
            Value::from("field"),
            Value::from("value"),
            Value::from("other"),
            Value::Int(2),
        ]);
        let pairs = expect_pairs(flat).unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].0, Value::from("field"));
        assert_eq!(pairs[1].1, Value::Int(2));
    }

    #[test]
    fn optional_helpers_pass_nil_through() {
        assert_eq!(expect_optional_bytes(Value::Nil).unwrap(), None);
        assert_eq!(expect_optional_string(Value::Nil).unwrap(), None);
        assert_eq!(expect_optional_double(Value::Nil).unwrap(), None);
    }
}
