//! String commands.

use skate_ffi::{RequestType, Value};

use super::{fmt_int, fmt_uint};
use crate::client::Client;
use crate::error::{Error, Result};
use crate::response;

/// Condition under which `SET` takes effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConditionalSet {
    /// `XX`: only overwrite an existing key.
    OnlyIfExists,
    /// `NX`: only create a missing key.
    OnlyIfDoesNotExist,
}

/// Expiry applied by `SET`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Expiry {
    Seconds(u64),
    Milliseconds(u64),
    UnixSeconds(u64),
    UnixMilliseconds(u64),
    /// `KEEPTTL`: keep whatever expiry the key already has.
    KeepExisting,
}

/// Optional clauses for [`Client::set_with_options`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SetOptions {
    pub conditional: Option<ConditionalSet>,
    pub expiry: Option<Expiry>,
    /// `GET`: reply with the previous value instead of `OK`.
    pub return_old_value: bool,
}

impl SetOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn conditional(mut self, conditional: ConditionalSet) -> Self {
        self.conditional = Some(conditional);
        self
    }

    pub fn expiry(mut self, expiry: Expiry) -> Self {
        self.expiry = Some(expiry);
        self
    }

    pub fn return_old_value(mut self) -> Self {
        self.return_old_value = true;
        self
    }

    pub(crate) fn append_args(&self, args: &mut Vec<Vec<u8>>) {
        match self.conditional {
            Some(ConditionalSet::OnlyIfExists) => args.push(b"XX".to_vec()),
            Some(ConditionalSet::OnlyIfDoesNotExist) => args.push(b"NX".to_vec()),
            None => {}
        }
        if self.return_old_value {
            args.push(b"GET".to_vec());
        }
        match self.expiry {
            Some(Expiry::Seconds(secs)) => {
                args.push(b"EX".to_vec());
                args.push(fmt_uint(secs));
            }
            Some(Expiry::Milliseconds(ms)) => {
                args.push(b"PX".to_vec());
                args.push(fmt_uint(ms));
            }
            Some(Expiry::UnixSeconds(ts)) => {
                args.push(b"EXAT".to_vec());
                args.push(fmt_uint(ts));
            }
            Some(Expiry::UnixMilliseconds(ts)) => {
                args.push(b"PXAT".to_vec());
                args.push(fmt_uint(ts));
            }
            Some(Expiry::KeepExisting) => args.push(b"KEEPTTL".to_vec()),
            None => {}
        }
    }
}

fn float_reply(value: Value) -> Result<f64> {
    match value {
        Value::Double(v) => Ok(v),
        Value::Int(v) => Ok(v as f64),
        // RESP2 carries float replies as strings.
        Value::Bytes(bytes) => std::str::from_utf8(&bytes)
            .ok()
            .and_then(|text| text.parse().ok())
            .ok_or(Error::UnexpectedResponse {
                expected: "double",
                actual: "bytes",
            }),
        Value::ServerError(message) => Err(Error::Command(message)),
        other => Err(Error::UnexpectedResponse {
            expected: "double",
            actual: other.kind_str(),
        }),
    }
}

impl Client {
    pub fn get(&self, key: impl Into<Vec<u8>>) -> Result<Option<Vec<u8>>> {
        let value = self.execute(RequestType::Get, vec![key.into()])?;
        response::expect_optional_bytes(value)
    }

    pub fn set(&self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Result<()> {
        let reply = self.execute(RequestType::Set, vec![key.into(), value.into()])?;
        response::expect_ok(reply)
    }

    /// `SET` with conditional, expiry, and `GET` clauses.
    ///
    /// Returns `Some(b"OK")` for a plain successful set, the previous value
    /// when `return_old_value` is requested, and `None` when a conditional
    /// set did not take effect.
    pub fn set_with_options(
        &self,
        key: impl Into<Vec<u8>>,
        value: impl Into<Vec<u8>>,
        options: &SetOptions,
    ) -> Result<Option<Vec<u8>>> {
        let mut args = vec![key.into(), value.into()];
        options.append_args(&mut args);
        match self.execute(RequestType::Set, args)? {
            Value::Ok => Ok(Some(b"OK".to_vec())),
            Value::Nil => Ok(None),
            Value::Bytes(previous) => Ok(Some(previous)),
            other => Err(Error::UnexpectedResponse {
                expected: "ok, nil, or bytes",
                actual: other.kind_str(),
            }),
        }
    }

    pub fn getdel(&self, key: impl Into<Vec<u8>>) -> Result<Option<Vec<u8>>> {
        let value = self.execute(RequestType::GetDel, vec![key.into()])?;
        response::expect_optional_bytes(value)
    }

    pub fn getrange(&self, key: impl Into<Vec<u8>>, start: i64, end: i64) -> Result<Vec<u8>> {
        let value = self.execute(
            RequestType::GetRange,
            vec![key.into(), fmt_int(start), fmt_int(end)],
        )?;
        response::expect_bytes(value)
    }

    /// Returns the resulting string length.
    pub fn setrange(
        &self,
        key: impl Into<Vec<u8>>,
        offset: u64,
        value: impl Into<Vec<u8>>,
    ) -> Result<i64> {
        let reply = self.execute(
            RequestType::SetRange,
            vec![key.into(), fmt_uint(offset), value.into()],
        )?;
        response::expect_int(reply)
    }

    /// Returns the resulting string length.
    pub fn append(&self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Result<i64> {
        let reply = self.execute(RequestType::Append, vec![key.into(), value.into()])?;
        response::expect_int(reply)
    }

    pub fn strlen(&self, key: impl Into<Vec<u8>>) -> Result<i64> {
        let value = self.execute(RequestType::Strlen, vec![key.into()])?;
        response::expect_int(value)
    }

    pub fn incr(&self, key: impl Into<Vec<u8>>) -> Result<i64> {
        let value = self.execute(RequestType::Incr, vec![key.into()])?;
        response::expect_int(value)
    }

    pub fn incr_by(&self, key: impl Into<Vec<u8>>, delta: i64) -> Result<i64> {
        let value = self.execute(RequestType::IncrBy, vec![key.into(), fmt_int(delta)])?;
        response::expect_int(value)
    }

    pub fn incr_by_float(&self, key: impl Into<Vec<u8>>, delta: f64) -> Result<f64> {
        let value = self.execute(
            RequestType::IncrByFloat,
            vec![key.into(), super::fmt_float(delta)],
        )?;
        float_reply(value)
    }

    pub fn decr(&self, key: impl Into<Vec<u8>>) -> Result<i64> {
        let value = self.execute(RequestType::Decr, vec![key.into()])?;
        response::expect_int(value)
    }

    pub fn decr_by(&self, key: impl Into<Vec<u8>>, delta: i64) -> Result<i64> {
        let value = self.execute(RequestType::DecrBy, vec![key.into(), fmt_int(delta)])?;
        response::expect_int(value)
    }

    /// One `Option` per requested key, in request order.
    pub fn mget(
        &self,
        keys: impl IntoIterator<Item = impl Into<Vec<u8>>>,
    ) -> Result<Vec<Option<Vec<u8>>>> {
        let args: Vec<Vec<u8>> = keys.into_iter().map(Into::into).collect();
        let value = self.execute(RequestType::MGet, args)?;
        response::expect_array(value)?
            .into_iter()
            .map(response::expect_optional_bytes)
            .collect()
    }

    pub fn mset(
        &self,
        pairs: impl IntoIterator<Item = (impl Into<Vec<u8>>, impl Into<Vec<u8>>)>,
    ) -> Result<()> {
        let mut args = Vec::new();
        for (key, value) in pairs {
            args.push(key.into());
            args.push(value.into());
        }
        let reply = self.execute(RequestType::MSet, args)?;
        response::expect_ok(reply)
    }

    /// True when every key was set (none existed before).
    pub fn msetnx(
        &self,
        pairs: impl IntoIterator<Item = (impl Into<Vec<u8>>, impl Into<Vec<u8>>)>,
    ) -> Result<bool> {
        let mut args = Vec::new();
        for (key, value) in pairs {
            args.push(key.into());
            args.push(value.into());
        }
        let reply = self.execute(RequestType::MSetNx, args)?;
        response::expect_bool(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(options: &SetOptions) -> Vec<String> {
        let mut args = Vec::new();
        options.append_args(&mut args);
        args.into_iter()
            .map(|arg| String::from_utf8(arg).unwrap())
            .collect()
    }

    #[test]
    fn set_options_encode_conditionals_and_expiry() {
        let options = SetOptions::new()
            .conditional(ConditionalSet::OnlyIfDoesNotExist)
            .expiry(Expiry::Seconds(30));
        assert_eq!(rendered(&options), vec!["NX", "EX", "30"]);

        let options = SetOptions::new()
            .conditional(ConditionalSet::OnlyIfExists)
            .expiry(Expiry::UnixMilliseconds(1_700_000_000_000));
        assert_eq!(rendered(&options), vec!["XX", "PXAT", "1700000000000"]);
    }

    #[test]
    fn set_options_encode_get_and_keepttl() {
        let options = SetOptions::new()
            .return_old_value()
            .expiry(Expiry::KeepExisting);
        assert_eq!(rendered(&options), vec!["GET", "KEEPTTL"]);
    }

    #[test]
    fn empty_options_add_nothing() {
        assert!(rendered(&SetOptions::new()).is_empty());
    }

    #[test]
    fn float_replies_accept_all_carriers() {
        assert_eq!(float_reply(Value::Double(1.5)).unwrap(), 1.5);
        assert_eq!(float_reply(Value::Int(2)).unwrap(), 2.0);
        assert_eq!(float_reply(Value::from("3.25")).unwrap(), 3.25);
        assert!(float_reply(Value::from("not-a-float")).is_err());
    }
}
