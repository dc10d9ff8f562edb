//! Stream commands.

use skate_ffi::{RequestType, Value};

use super::fmt_uint;
use crate::client::Client;
use crate::error::{Error, Result};
use crate::response;

/// One stream entry: its ID plus the field/value pairs it carries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamEntry {
    pub id: String,
    pub fields: Vec<(Vec<u8>, Vec<u8>)>,
}

fn parse_entry(value: Value) -> Result<StreamEntry> {
    let mut parts = response::expect_array(value)?;
    if parts.len() != 2 {
        return Err(Error::UnexpectedResponse {
            expected: "id/fields pair",
            actual: "array",
        });
    }
    let fields_value = parts.pop().unwrap_or(Value::Nil);
    let id = response::expect_string(parts.pop().unwrap_or(Value::Nil))?;
    let fields = response::expect_pairs(fields_value)?
        .into_iter()
        .map(|(field, value)| {
            Ok((
                response::expect_bytes(field)?,
                response::expect_bytes(value)?,
            ))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(StreamEntry { id, fields })
}

fn parse_entries(value: Value) -> Result<Vec<StreamEntry>> {
    response::expect_array(value)?
        .into_iter()
        .map(parse_entry)
        .collect()
}

impl Client {
    /// Appends an entry; `id` of `None` lets the server assign one (`*`).
    /// Returns the entry's ID.
    pub fn xadd(
        &self,
        key: impl Into<Vec<u8>>,
        id: Option<&str>,
        fields: impl IntoIterator<Item = (impl Into<Vec<u8>>, impl Into<Vec<u8>>)>,
    ) -> Result<String> {
        let mut args = vec![key.into(), id.unwrap_or("*").as_bytes().to_vec()];
        let mut field_count = 0usize;
        for (field, value) in fields {
            args.push(field.into());
            args.push(value.into());
            field_count += 1;
        }
        if field_count == 0 {
            return Err(Error::InvalidArgument(
                "stream entries need at least one field".into(),
            ));
        }
        let value = self.execute(RequestType::XAdd, args)?;
        response::expect_string(value)
    }

    pub fn xlen(&self, key: impl Into<Vec<u8>>) -> Result<i64> {
        let value = self.execute(RequestType::XLen, vec![key.into()])?;
        response::expect_int(value)
    }

    /// Entries with IDs between `start` and `end` inclusive; `-`/`+` are
    /// the open bounds.
    pub fn xrange(
        &self,
        key: impl Into<Vec<u8>>,
        start: impl Into<Vec<u8>>,
        end: impl Into<Vec<u8>>,
    ) -> Result<Vec<StreamEntry>> {
        let value = self.execute(
            RequestType::XRange,
            vec![key.into(), start.into(), end.into()],
        )?;
        parse_entries(value)
    }

    pub fn xrevrange(
        &self,
        key: impl Into<Vec<u8>>,
        end: impl Into<Vec<u8>>,
        start: impl Into<Vec<u8>>,
    ) -> Result<Vec<StreamEntry>> {
        let value = self.execute(
            RequestType::XRevRange,
            vec![key.into(), end.into(), start.into()],
        )?;
        parse_entries(value)
    }

    /// Reads new entries from multiple streams, each from its own cursor
    /// ID. Returns `(stream key, entries)` pairs; streams with nothing new
    /// are absent.
    pub fn xread(
        &self,
        streams: impl IntoIterator<Item = (impl Into<Vec<u8>>, impl Into<Vec<u8>>)>,
    ) -> Result<Vec<(Vec<u8>, Vec<StreamEntry>)>> {
        let mut keys: Vec<Vec<u8>> = Vec::new();
        let mut ids: Vec<Vec<u8>> = Vec::new();
        for (key, id) in streams {
            keys.push(key.into());
            ids.push(id.into());
        }
        if keys.is_empty() {
            return Err(Error::InvalidArgument(
                "XREAD needs at least one stream".into(),
            ));
        }
        let mut args = vec![b"STREAMS".to_vec()];
        args.extend(keys);
        args.extend(ids);

        match self.execute(RequestType::XRead, args)? {
            Value::Nil => Ok(Vec::new()),
            other => response::expect_pairs(other)?
                .into_iter()
                .map(|(key, entries)| {
                    Ok((response::expect_bytes(key)?, parse_entries(entries)?))
                })
                .collect(),
        }
    }

    pub fn xdel(
        &self,
        key: impl Into<Vec<u8>>,
        ids: impl IntoIterator<Item = impl Into<Vec<u8>>>,
    ) -> Result<i64> {
        let mut args = vec![key.into()];
        args.extend(ids.into_iter().map(Into::into));
        let value = self.execute(RequestType::XDel, args)?;
        response::expect_int(value)
    }

    /// Trims the stream to at most `max_len` entries; returns how many were
    /// evicted.
    pub fn xtrim(&self, key: impl Into<Vec<u8>>, max_len: u64) -> Result<i64> {
        let value = self.execute(
            RequestType::XTrim,
            vec![key.into(), b"MAXLEN".to_vec(), fmt_uint(max_len)],
        )?;
        response::expect_int(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_value(id: &str, fields: &[(&str, &str)]) -> Value {
        let mut flat = Vec::new();
        for (field, value) in fields {
            flat.push(Value::from(*field));
            flat.push(Value::from(*value));
        }
        Value::Array(vec![Value::from(id), Value::Array(flat)])
    }

    #[test]
    fn entries_parse_from_id_fields_pairs() {
        let entry = parse_entry(entry_value("1-1", &[("sensor", "a"), ("temp", "21")])).unwrap();
        assert_eq!(entry.id, "1-1");
        assert_eq!(entry.fields.len(), 2);
        assert_eq!(entry.fields[1], (b"temp".to_vec(), b"21".to_vec()));
    }

    #[test]
    fn malformed_entries_are_rejected() {
        assert!(parse_entry(Value::Array(vec![Value::from("1-1")])).is_err());
        assert!(parse_entry(Value::Int(3)).is_err());
    }
}
