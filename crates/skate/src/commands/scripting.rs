//! Script management commands.
//!
//! Storing and invoking scripts goes through dedicated engine calls (see
//! [`crate::Script`] and [`crate::Client::invoke_script`]); the commands
//! here only inspect and clear the server-side cache.

use skate_ffi::RequestType;

use crate::client::Client;
use crate::error::{Error, Result};
use crate::response;

impl Client {
    /// One flag per hash: whether the server has that script cached.
    pub fn script_exists(
        &self,
        hashes: impl IntoIterator<Item = impl Into<Vec<u8>>>,
    ) -> Result<Vec<bool>> {
        let args: Vec<Vec<u8>> = hashes.into_iter().map(Into::into).collect();
        if args.is_empty() {
            return Err(Error::InvalidArgument(
                "SCRIPT EXISTS needs at least one hash".into(),
            ));
        }
        let value = self.execute(RequestType::ScriptExists, args)?;
        response::expect_array(value)?
            .into_iter()
            .map(response::expect_bool)
            .collect()
    }

    /// Clears the server-side script cache.
    pub fn script_flush(&self) -> Result<()> {
        let value = self.execute(RequestType::ScriptFlush, Vec::new())?;
        response::expect_ok(value)
    }
}
