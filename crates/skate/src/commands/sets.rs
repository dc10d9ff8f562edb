//! Set commands.

use skate_ffi::RequestType;

use crate::client::Client;
use crate::error::Result;
use crate::response;

impl Client {
    /// Returns how many members were newly added.
    pub fn sadd(
        &self,
        key: impl Into<Vec<u8>>,
        members: impl IntoIterator<Item = impl Into<Vec<u8>>>,
    ) -> Result<i64> {
        let mut args = vec![key.into()];
        args.extend(members.into_iter().map(Into::into));
        let value = self.execute(RequestType::SAdd, args)?;
        response::expect_int(value)
    }

    pub fn srem(
        &self,
        key: impl Into<Vec<u8>>,
        members: impl IntoIterator<Item = impl Into<Vec<u8>>>,
    ) -> Result<i64> {
        let mut args = vec![key.into()];
        args.extend(members.into_iter().map(Into::into));
        let value = self.execute(RequestType::SRem, args)?;
        response::expect_int(value)
    }

    pub fn smembers(&self, key: impl Into<Vec<u8>>) -> Result<Vec<Vec<u8>>> {
        let value = self.execute(RequestType::SMembers, vec![key.into()])?;
        response::expect_array(value)?
            .into_iter()
            .map(response::expect_bytes)
            .collect()
    }

    pub fn scard(&self, key: impl Into<Vec<u8>>) -> Result<i64> {
        let value = self.execute(RequestType::SCard, vec![key.into()])?;
        response::expect_int(value)
    }

    pub fn sismember(
        &self,
        key: impl Into<Vec<u8>>,
        member: impl Into<Vec<u8>>,
    ) -> Result<bool> {
        let value = self.execute(RequestType::SIsMember, vec![key.into(), member.into()])?;
        response::expect_bool(value)
    }

    pub fn spop(&self, key: impl Into<Vec<u8>>) -> Result<Option<Vec<u8>>> {
        let value = self.execute(RequestType::SPop, vec![key.into()])?;
        response::expect_optional_bytes(value)
    }

    /// True when the member was moved; false when it was not in `source`.
    pub fn smove(
        &self,
        source: impl Into<Vec<u8>>,
        destination: impl Into<Vec<u8>>,
        member: impl Into<Vec<u8>>,
    ) -> Result<bool> {
        let value = self.execute(
            RequestType::SMove,
            vec![source.into(), destination.into(), member.into()],
        )?;
        response::expect_bool(value)
    }
}
