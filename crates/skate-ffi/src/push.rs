//! Push-callback trampoline for pub/sub delivery.
//!
//! The engine invokes a registered C function pointer from its own threads
//! whenever a push message arrives. The trampoline copies the borrowed
//! buffers into an owned [`PushEvent`] before handing it to the handler,
//! since the engine reclaims them as soon as the callback returns.

use std::os::raw::c_void;
use std::slice;

use tracing::trace;

/// An owned push notification as delivered by the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PushEvent {
    /// Raw message-kind code; interpreted by the client layer.
    pub kind: i32,
    pub message: Vec<u8>,
    pub channel: Vec<u8>,
    /// Present only for pattern subscriptions.
    pub pattern: Option<Vec<u8>>,
}

/// Handler invoked for every push event. May be called concurrently from
/// engine threads.
pub type PushHandler = Box<dyn Fn(PushEvent) + Send + Sync>;

pub(crate) struct PushContext {
    handler: PushHandler,
}

impl PushContext {
    pub(crate) fn new(handler: PushHandler) -> Self {
        Self { handler }
    }
}

unsafe fn copy_buffer(ptr: *const u8, len: i64) -> Vec<u8> {
    if ptr.is_null() || len <= 0 {
        return Vec::new();
    }
    unsafe { slice::from_raw_parts(ptr, len as usize) }.to_vec()
}

/// The function pointer registered with the engine at client creation.
pub(crate) extern "C" fn push_trampoline(
    ctx: *mut c_void,
    kind: i32,
    message: *const u8,
    message_len: i64,
    channel: *const u8,
    channel_len: i64,
    pattern: *const u8,
    pattern_len: i64,
) {
    if ctx.is_null() {
        return;
    }
    let context = unsafe { &*(ctx as *const PushContext) };
    let event = PushEvent {
        kind,
        message: unsafe { copy_buffer(message, message_len) },
        channel: unsafe { copy_buffer(channel, channel_len) },
        pattern: if pattern.is_null() {
            None
        } else {
            Some(unsafe { copy_buffer(pattern, pattern_len) })
        },
    };
    trace!(kind, channel_len, message_len, "ffi.push");
    (context.handler)(event);
}
