//! Server administration commands.

use skate_ffi::{RequestType, Value};

use super::fmt_uint;
use crate::client::Client;
use crate::error::{Error, Result};
use crate::response;

impl Client {
    /// Returns the server's `PONG` (or the echoed message, if given one via
    /// [`Client::ping_message`]).
    pub fn ping(&self) -> Result<String> {
        let value = self.execute(RequestType::Ping, Vec::new())?;
        response::expect_string(value)
    }

    pub fn ping_message(&self, message: impl Into<Vec<u8>>) -> Result<Vec<u8>> {
        let value = self.execute(RequestType::Ping, vec![message.into()])?;
        response::expect_bytes(value)
    }

    pub fn echo(&self, message: impl Into<Vec<u8>>) -> Result<Vec<u8>> {
        let value = self.execute(RequestType::Echo, vec![message.into()])?;
        response::expect_bytes(value)
    }

    /// The server's `INFO` text, optionally limited to named sections.
    pub fn info(&self, sections: impl IntoIterator<Item = impl Into<Vec<u8>>>) -> Result<String> {
        let args: Vec<Vec<u8>> = sections.into_iter().map(Into::into).collect();
        let value = self.execute(RequestType::Info, args)?;
        response::expect_string(value)
    }

    /// Standalone only; the engine rejects it on cluster connections.
    pub fn select(&self, database_id: u32) -> Result<()> {
        let value = self.execute(RequestType::Select, vec![fmt_uint(database_id.into())])?;
        response::expect_ok(value)
    }

    pub fn config_get(
        &self,
        parameters: impl IntoIterator<Item = impl Into<Vec<u8>>>,
    ) -> Result<Vec<(String, String)>> {
        let args: Vec<Vec<u8>> = parameters.into_iter().map(Into::into).collect();
        if args.is_empty() {
            return Err(Error::InvalidArgument(
                "CONFIG GET needs at least one parameter".into(),
            ));
        }
        let value = self.execute(RequestType::ConfigGet, args)?;
        response::expect_pairs(value)?
            .into_iter()
            .map(|(name, value)| {
                Ok((
                    response::expect_string(name)?,
                    response::expect_string(value)?,
                ))
            })
            .collect()
    }

    pub fn config_set(
        &self,
        parameters: impl IntoIterator<Item = (impl Into<Vec<u8>>, impl Into<Vec<u8>>)>,
    ) -> Result<()> {
        let mut args = Vec::new();
        for (name, value) in parameters {
            args.push(name.into());
            args.push(value.into());
        }
        if args.is_empty() {
            return Err(Error::InvalidArgument(
                "CONFIG SET needs at least one parameter".into(),
            ));
        }
        let value = self.execute(RequestType::ConfigSet, args)?;
        response::expect_ok(value)
    }

    pub fn dbsize(&self) -> Result<i64> {
        let value = self.execute(RequestType::DbSize, Vec::new())?;
        response::expect_int(value)
    }

    pub fn flushall(&self) -> Result<()> {
        let value = self.execute(RequestType::FlushAll, Vec::new())?;
        response::expect_ok(value)
    }

    pub fn flushdb(&self) -> Result<()> {
        let value = self.execute(RequestType::FlushDb, Vec::new())?;
        response::expect_ok(value)
    }

    /// Server clock as `(unix seconds, microseconds)`.
    pub fn time(&self) -> Result<(i64, i64)> {
        let value = self.execute(RequestType::Time, Vec::new())?;
        let mut parts = response::expect_array(value)?;
        if parts.len() != 2 {
            return Err(Error::UnexpectedResponse {
                expected: "seconds/microseconds pair",
                actual: "array",
            });
        }
        let micros = parse_clock(parts.pop().unwrap_or(Value::Nil))?;
        let seconds = parse_clock(parts.pop().unwrap_or(Value::Nil))?;
        Ok((seconds, micros))
    }
}

fn parse_clock(value: Value) -> Result<i64> {
    match value {
        Value::Int(v) => Ok(v),
        Value::Bytes(bytes) => std::str::from_utf8(&bytes)
            .ok()
            .and_then(|text| text.parse().ok())
            .ok_or(Error::UnexpectedResponse {
                expected: "int",
                actual: "bytes",
            }),
        other => Err(Error::UnexpectedResponse {
            expected: "int",
            actual: other.kind_str(),
        }),
    }
}
