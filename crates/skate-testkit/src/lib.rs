//! In-process stub of the Glide core engine.
//!
//! Exports the `glide_*` symbols with the production ABI so test binaries
//! link without the prebuilt library, and the marshalling layer gets
//! exercised through real FFI calls. The stub is scriptable per session:
//! tests enqueue canned replies, then drain a log of the command
//! descriptors the binding actually sent.
//!
//! Sessions are keyed by the `client_name` field of the connection config;
//! tests that run in parallel must use distinct names.

#![deny(unsafe_op_in_unsafe_fn)]

mod abi;
mod state;

pub use skate_ffi::ErrorKind;
pub use state::{
    orphan_close_count, script_source, session, BatchRecord, ReceivedCommand, ScriptInvocation,
    StubReply, StubSession,
};

/// Installs an env-filter subscriber for test debugging. Safe to call from
/// every test; only the first call wins.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
