//! Generic key-management commands.

use skate_ffi::RequestType;

use super::fmt_int;
use crate::client::Client;
use crate::error::Result;
use crate::response;

fn key_args(keys: impl IntoIterator<Item = impl Into<Vec<u8>>>) -> Vec<Vec<u8>> {
    keys.into_iter().map(Into::into).collect()
}

impl Client {
    /// Returns how many of the keys were removed.
    pub fn del(&self, keys: impl IntoIterator<Item = impl Into<Vec<u8>>>) -> Result<i64> {
        let value = self.execute(RequestType::Del, key_args(keys))?;
        response::expect_int(value)
    }

    /// Like [`Client::del`] but reclaims memory asynchronously server-side.
    pub fn unlink(&self, keys: impl IntoIterator<Item = impl Into<Vec<u8>>>) -> Result<i64> {
        let value = self.execute(RequestType::Unlink, key_args(keys))?;
        response::expect_int(value)
    }

    /// Counts existing keys, counting duplicates in the argument list twice.
    pub fn exists(&self, keys: impl IntoIterator<Item = impl Into<Vec<u8>>>) -> Result<i64> {
        let value = self.execute(RequestType::Exists, key_args(keys))?;
        response::expect_int(value)
    }

    /// True when the timeout was set; false when the key does not exist.
    pub fn expire(&self, key: impl Into<Vec<u8>>, seconds: i64) -> Result<bool> {
        let value = self.execute(RequestType::Expire, vec![key.into(), fmt_int(seconds)])?;
        response::expect_bool(value)
    }

    pub fn expire_at(&self, key: impl Into<Vec<u8>>, unix_seconds: i64) -> Result<bool> {
        let value = self.execute(
            RequestType::ExpireAt,
            vec![key.into(), fmt_int(unix_seconds)],
        )?;
        response::expect_bool(value)
    }

    /// Remaining time-to-live in seconds; -1 without expiry, -2 for a
    /// missing key.
    pub fn ttl(&self, key: impl Into<Vec<u8>>) -> Result<i64> {
        let value = self.execute(RequestType::Ttl, vec![key.into()])?;
        response::expect_int(value)
    }

    pub fn pttl(&self, key: impl Into<Vec<u8>>) -> Result<i64> {
        let value = self.execute(RequestType::PTtl, vec![key.into()])?;
        response::expect_int(value)
    }

    /// True when an expiry was removed.
    pub fn persist(&self, key: impl Into<Vec<u8>>) -> Result<bool> {
        let value = self.execute(RequestType::Persist, vec![key.into()])?;
        response::expect_bool(value)
    }

    /// The storage type of the key (`string`, `list`, `none`, ...).
    pub fn key_type(&self, key: impl Into<Vec<u8>>) -> Result<String> {
        let value = self.execute(RequestType::Type, vec![key.into()])?;
        response::expect_string(value)
    }

    pub fn rename(&self, key: impl Into<Vec<u8>>, new_key: impl Into<Vec<u8>>) -> Result<()> {
        let value = self.execute(RequestType::Rename, vec![key.into(), new_key.into()])?;
        response::expect_ok(value)
    }

    /// True when the rename happened; false when `new_key` already exists.
    pub fn renamenx(&self, key: impl Into<Vec<u8>>, new_key: impl Into<Vec<u8>>) -> Result<bool> {
        let value = self.execute(RequestType::RenameNx, vec![key.into(), new_key.into()])?;
        response::expect_bool(value)
    }

    /// Updates access times; returns how many of the keys exist.
    pub fn touch(&self, keys: impl IntoIterator<Item = impl Into<Vec<u8>>>) -> Result<i64> {
        let value = self.execute(RequestType::Touch, key_args(keys))?;
        response::expect_int(value)
    }
}
