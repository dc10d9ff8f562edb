//! Server-side script handles.
//!
//! The engine keeps one copy of each script's source keyed by hash and
//! reference-counts stores against drops. [`Script`] mirrors that on this
//! side: clones share one inner, and the engine-side entry is dropped when
//! the last clone goes away.

use std::fmt;
use std::sync::Arc;

use crate::error::Result;

struct ScriptInner {
    hash: Vec<u8>,
}

impl Drop for ScriptInner {
    fn drop(&mut self) {
        skate_ffi::drop_script(&self.hash);
    }
}

/// A script stored with the engine, invocable by hash.
#[derive(Clone)]
pub struct Script {
    inner: Arc<ScriptInner>,
}

impl Script {
    /// Stores `code` with the engine and returns a handle to it.
    pub fn new(code: impl AsRef<[u8]>) -> Result<Self> {
        let hash = skate_ffi::store_script(code.as_ref())?;
        Ok(Self {
            inner: Arc::new(ScriptInner { hash }),
        })
    }

    /// The engine-assigned hash identifying this script.
    pub fn hash(&self) -> &[u8] {
        &self.inner.hash
    }

    /// The hash as text, for `SCRIPT EXISTS` style commands.
    pub fn hash_utf8(&self) -> Option<&str> {
        std::str::from_utf8(&self.inner.hash).ok()
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Script")
            .field("hash", &String::from_utf8_lossy(&self.inner.hash))
            .finish()
    }
}
