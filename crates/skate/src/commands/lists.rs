//! List commands.

use skate_ffi::{RequestType, Value};

use super::{fmt_int, fmt_uint};
use crate::client::Client;
use crate::error::Result;
use crate::response;

impl Client {
    /// Returns the list length after the push.
    pub fn lpush(
        &self,
        key: impl Into<Vec<u8>>,
        elements: impl IntoIterator<Item = impl Into<Vec<u8>>>,
    ) -> Result<i64> {
        let mut args = vec![key.into()];
        args.extend(elements.into_iter().map(Into::into));
        let value = self.execute(RequestType::LPush, args)?;
        response::expect_int(value)
    }

    pub fn rpush(
        &self,
        key: impl Into<Vec<u8>>,
        elements: impl IntoIterator<Item = impl Into<Vec<u8>>>,
    ) -> Result<i64> {
        let mut args = vec![key.into()];
        args.extend(elements.into_iter().map(Into::into));
        let value = self.execute(RequestType::RPush, args)?;
        response::expect_int(value)
    }

    pub fn lpop(&self, key: impl Into<Vec<u8>>) -> Result<Option<Vec<u8>>> {
        let value = self.execute(RequestType::LPop, vec![key.into()])?;
        response::expect_optional_bytes(value)
    }

    /// Pops up to `count` elements; an empty vec when the key is missing.
    pub fn lpop_count(&self, key: impl Into<Vec<u8>>, count: u64) -> Result<Vec<Vec<u8>>> {
        let value = self.execute(RequestType::LPop, vec![key.into(), fmt_uint(count)])?;
        popped_elements(value)
    }

    pub fn rpop(&self, key: impl Into<Vec<u8>>) -> Result<Option<Vec<u8>>> {
        let value = self.execute(RequestType::RPop, vec![key.into()])?;
        response::expect_optional_bytes(value)
    }

    pub fn rpop_count(&self, key: impl Into<Vec<u8>>, count: u64) -> Result<Vec<Vec<u8>>> {
        let value = self.execute(RequestType::RPop, vec![key.into(), fmt_uint(count)])?;
        popped_elements(value)
    }

    /// Elements between `start` and `stop` inclusive; negative indexes count
    /// from the tail.
    pub fn lrange(&self, key: impl Into<Vec<u8>>, start: i64, stop: i64) -> Result<Vec<Vec<u8>>> {
        let value = self.execute(
            RequestType::LRange,
            vec![key.into(), fmt_int(start), fmt_int(stop)],
        )?;
        response::expect_array(value)?
            .into_iter()
            .map(response::expect_bytes)
            .collect()
    }

    pub fn llen(&self, key: impl Into<Vec<u8>>) -> Result<i64> {
        let value = self.execute(RequestType::LLen, vec![key.into()])?;
        response::expect_int(value)
    }

    pub fn lindex(&self, key: impl Into<Vec<u8>>, index: i64) -> Result<Option<Vec<u8>>> {
        let value = self.execute(RequestType::LIndex, vec![key.into(), fmt_int(index)])?;
        response::expect_optional_bytes(value)
    }

    pub fn lset(
        &self,
        key: impl Into<Vec<u8>>,
        index: i64,
        element: impl Into<Vec<u8>>,
    ) -> Result<()> {
        let value = self.execute(
            RequestType::LSet,
            vec![key.into(), fmt_int(index), element.into()],
        )?;
        response::expect_ok(value)
    }

    pub fn ltrim(&self, key: impl Into<Vec<u8>>, start: i64, stop: i64) -> Result<()> {
        let value = self.execute(
            RequestType::LTrim,
            vec![key.into(), fmt_int(start), fmt_int(stop)],
        )?;
        response::expect_ok(value)
    }

    /// Removes up to `count` occurrences of `element`; the sign of `count`
    /// selects the scan direction. Returns how many were removed.
    pub fn lrem(
        &self,
        key: impl Into<Vec<u8>>,
        count: i64,
        element: impl Into<Vec<u8>>,
    ) -> Result<i64> {
        let value = self.execute(
            RequestType::LRem,
            vec![key.into(), fmt_int(count), element.into()],
        )?;
        response::expect_int(value)
    }
}

fn popped_elements(value: Value) -> Result<Vec<Vec<u8>>> {
    match value {
        Value::Nil => Ok(Vec::new()),
        other => response::expect_array(other)?
            .into_iter()
            .map(response::expect_bytes)
            .collect(),
    }
}
