//! Hash commands.

use skate_ffi::RequestType;

use super::fmt_int;
use crate::client::Client;
use crate::error::Result;
use crate::response;

impl Client {
    pub fn hget(
        &self,
        key: impl Into<Vec<u8>>,
        field: impl Into<Vec<u8>>,
    ) -> Result<Option<Vec<u8>>> {
        let value = self.execute(RequestType::HGet, vec![key.into(), field.into()])?;
        response::expect_optional_bytes(value)
    }

    /// Sets the given field/value pairs; returns how many fields were newly
    /// created.
    pub fn hset(
        &self,
        key: impl Into<Vec<u8>>,
        pairs: impl IntoIterator<Item = (impl Into<Vec<u8>>, impl Into<Vec<u8>>)>,
    ) -> Result<i64> {
        let mut args = vec![key.into()];
        for (field, value) in pairs {
            args.push(field.into());
            args.push(value.into());
        }
        let value = self.execute(RequestType::HSet, args)?;
        response::expect_int(value)
    }

    /// True when the field was created; false when it already existed.
    pub fn hsetnx(
        &self,
        key: impl Into<Vec<u8>>,
        field: impl Into<Vec<u8>>,
        value: impl Into<Vec<u8>>,
    ) -> Result<bool> {
        let reply = self.execute(
            RequestType::HSetNx,
            vec![key.into(), field.into(), value.into()],
        )?;
        response::expect_bool(reply)
    }

    pub fn hdel(
        &self,
        key: impl Into<Vec<u8>>,
        fields: impl IntoIterator<Item = impl Into<Vec<u8>>>,
    ) -> Result<i64> {
        let mut args = vec![key.into()];
        args.extend(fields.into_iter().map(Into::into));
        let value = self.execute(RequestType::HDel, args)?;
        response::expect_int(value)
    }

    /// All field/value pairs, in server order.
    pub fn hgetall(&self, key: impl Into<Vec<u8>>) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        let value = self.execute(RequestType::HGetAll, vec![key.into()])?;
        response::expect_pairs(value)?
            .into_iter()
            .map(|(field, value)| {
                Ok((
                    response::expect_bytes(field)?,
                    response::expect_bytes(value)?,
                ))
            })
            .collect()
    }

    /// One `Option` per requested field, in request order.
    pub fn hmget(
        &self,
        key: impl Into<Vec<u8>>,
        fields: impl IntoIterator<Item = impl Into<Vec<u8>>>,
    ) -> Result<Vec<Option<Vec<u8>>>> {
        let mut args = vec![key.into()];
        args.extend(fields.into_iter().map(Into::into));
        let value = self.execute(RequestType::HMGet, args)?;
        response::expect_array(value)?
            .into_iter()
            .map(response::expect_optional_bytes)
            .collect()
    }

    pub fn hexists(&self, key: impl Into<Vec<u8>>, field: impl Into<Vec<u8>>) -> Result<bool> {
        let value = self.execute(RequestType::HExists, vec![key.into(), field.into()])?;
        response::expect_bool(value)
    }

    pub fn hlen(&self, key: impl Into<Vec<u8>>) -> Result<i64> {
        let value = self.execute(RequestType::HLen, vec![key.into()])?;
        response::expect_int(value)
    }

    pub fn hkeys(&self, key: impl Into<Vec<u8>>) -> Result<Vec<Vec<u8>>> {
        let value = self.execute(RequestType::HKeys, vec![key.into()])?;
        response::expect_array(value)?
            .into_iter()
            .map(response::expect_bytes)
            .collect()
    }

    pub fn hvals(&self, key: impl Into<Vec<u8>>) -> Result<Vec<Vec<u8>>> {
        let value = self.execute(RequestType::HVals, vec![key.into()])?;
        response::expect_array(value)?
            .into_iter()
            .map(response::expect_bytes)
            .collect()
    }

    pub fn hincr_by(
        &self,
        key: impl Into<Vec<u8>>,
        field: impl Into<Vec<u8>>,
        delta: i64,
    ) -> Result<i64> {
        let value = self.execute(
            RequestType::HIncrBy,
            vec![key.into(), field.into(), fmt_int(delta)],
        )?;
        response::expect_int(value)
    }
}
