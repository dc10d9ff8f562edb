//! Safe wrappers over the engine's native call surface.
//!
//! The symbols declared here resolve against the prebuilt engine library in
//! production builds. Test binaries link `skate-testkit` instead, which
//! exports the same symbols with an in-process stub behind them.

use std::os::raw::c_void;
use std::ptr::{self, NonNull};

use thiserror::Error;
use tracing::trace;

use crate::decode::{decode_error, decode_response, DecodeError};
use crate::marshal::{BatchArgs, CmdArgs};
use crate::push::{push_trampoline, PushContext, PushHandler};
use crate::types::{BatchInfo, ClientCreateResult, CmdInfo, CommandResult, ErrorKind, PushCallback};
use crate::value::Value;

extern "C" {
    fn glide_create_client(
        config: *const u8,
        config_len: usize,
        push_ctx: *mut c_void,
        push_callback: Option<PushCallback>,
    ) -> *mut ClientCreateResult;

    fn glide_close_client(handle: *mut c_void);

    fn glide_command(
        handle: *mut c_void,
        cmd: *const CmdInfo,
        route: *const u8,
        route_len: usize,
    ) -> *mut CommandResult;

    fn glide_batch(
        handle: *mut c_void,
        batch: *const BatchInfo,
        raise_on_error: bool,
    ) -> *mut CommandResult;

    fn glide_store_script(script: *const u8, script_len: usize) -> *mut CommandResult;

    fn glide_drop_script(hash: *const u8, hash_len: usize);

    fn glide_invoke_script(
        handle: *mut c_void,
        hash: *const u8,
        hash_len: usize,
        keys: *const CmdInfo,
        args: *const CmdInfo,
        route: *const u8,
        route_len: usize,
    ) -> *mut CommandResult;

    fn glide_free_command_result(result: *mut CommandResult);

    fn glide_free_client_create_result(result: *mut ClientCreateResult);
}

/// Failure surfaced by the boundary layer.
#[derive(Debug, Error)]
pub enum FfiError {
    /// The engine reported a failure; `kind` classifies it.
    #[error("{message}")]
    Engine { kind: ErrorKind, message: String },
    /// The engine returned a structurally invalid response.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// The engine returned neither a response nor an error.
    #[error("engine returned an empty result")]
    EmptyResult,
    /// The engine answered a fixed-shape call with the wrong value kind.
    #[error("engine replied with {actual} where {expected} was expected")]
    UnexpectedReply {
        expected: &'static str,
        actual: &'static str,
    },
}

impl FfiError {
    pub fn engine_kind(&self) -> Option<ErrorKind> {
        match self {
            FfiError::Engine { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Consumes a result carrier, decoding whichever side is populated and
/// releasing the native allocation.
unsafe fn consume_result(result: *mut CommandResult) -> Result<Value, FfiError> {
    if result.is_null() {
        return Err(FfiError::EmptyResult);
    }
    let outcome = {
        let borrowed = unsafe { &*result };
        if !borrowed.error.is_null() {
            let (kind, message) = unsafe { decode_error(&*borrowed.error) };
            Err(FfiError::Engine { kind, message })
        } else if !borrowed.response.is_null() {
            unsafe { decode_response(borrowed.response) }.map_err(FfiError::from)
        } else {
            Err(FfiError::EmptyResult)
        }
    };
    unsafe { glide_free_command_result(result) };
    outcome
}

fn route_parts(route: Option<&[u8]>) -> (*const u8, usize) {
    match route {
        Some(payload) => (payload.as_ptr(), payload.len()),
        None => (ptr::null(), 0),
    }
}

/// Owned connection handle.
///
/// Created once, passed to every call, released exactly once: `Drop`
/// releases the handle and reclaims the push context, and the type system
/// prevents any use afterwards.
pub struct EngineHandle {
    ptr: NonNull<c_void>,
    push_ctx: *mut PushContext,
}

// The engine serializes access to the connection internally; the handle is
// just an opaque token.
unsafe impl Send for EngineHandle {}
unsafe impl Sync for EngineHandle {}

impl EngineHandle {
    /// Creates a client from a serialized configuration payload.
    ///
    /// When `push_handler` is set, a trampoline is registered with the
    /// engine and the handler context stays alive until the handle drops.
    pub fn connect(config: &[u8], push_handler: Option<PushHandler>) -> Result<Self, FfiError> {
        let push_ctx = match push_handler {
            Some(handler) => Box::into_raw(Box::new(PushContext::new(handler))),
            None => ptr::null_mut(),
        };
        let callback: Option<PushCallback> = if push_ctx.is_null() {
            None
        } else {
            Some(push_trampoline)
        };

        let result = unsafe {
            glide_create_client(
                config.as_ptr(),
                config.len(),
                push_ctx as *mut c_void,
                callback,
            )
        };
        if result.is_null() {
            unsafe { reclaim_push_ctx(push_ctx) };
            return Err(FfiError::EmptyResult);
        }

        let outcome = {
            let borrowed = unsafe { &*result };
            if !borrowed.error.is_null() {
                let (kind, message) = unsafe { decode_error(&*borrowed.error) };
                Err(FfiError::Engine { kind, message })
            } else {
                match NonNull::new(borrowed.handle) {
                    Some(ptr) => Ok(ptr),
                    None => Err(FfiError::EmptyResult),
                }
            }
        };
        unsafe { glide_free_client_create_result(result) };

        match outcome {
            Ok(ptr) => {
                trace!("engine.connect");
                Ok(Self { ptr, push_ctx })
            }
            Err(err) => {
                unsafe { reclaim_push_ctx(push_ctx) };
                Err(err)
            }
        }
    }

    /// Submits one command; `route` is an optional serialized routing hint.
    pub fn command(&self, cmd: &CmdArgs, route: Option<&[u8]>) -> Result<Value, FfiError> {
        let info = cmd.info();
        let (route_ptr, route_len) = route_parts(route);
        trace!(request = ?cmd.request_type(), args = cmd.arg_count(), "engine.command");
        let result = unsafe { glide_command(self.ptr.as_ptr(), &info, route_ptr, route_len) };
        unsafe { consume_result(result) }
    }

    /// Submits a whole batch; the reply is one array with one slot per
    /// queued command, in submission order.
    pub fn batch(&self, batch: &BatchArgs, raise_on_error: bool) -> Result<Value, FfiError> {
        let info = batch.info();
        trace!(commands = batch.len(), atomic = batch.is_atomic(), "engine.batch");
        let result = unsafe { glide_batch(self.ptr.as_ptr(), &info, raise_on_error) };
        unsafe { consume_result(result) }
    }

    /// Invokes a previously stored script by hash.
    pub fn invoke_script(
        &self,
        hash: &[u8],
        keys: &CmdArgs,
        args: &CmdArgs,
        route: Option<&[u8]>,
    ) -> Result<Value, FfiError> {
        let keys_info = keys.info();
        let args_info = args.info();
        let (route_ptr, route_len) = route_parts(route);
        trace!(keys = keys.arg_count(), args = args.arg_count(), "engine.invoke_script");
        let result = unsafe {
            glide_invoke_script(
                self.ptr.as_ptr(),
                hash.as_ptr(),
                hash.len(),
                &keys_info,
                &args_info,
                route_ptr,
                route_len,
            )
        };
        unsafe { consume_result(result) }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        unsafe {
            glide_close_client(self.ptr.as_ptr());
            reclaim_push_ctx(self.push_ctx);
        }
        trace!("engine.close");
    }
}

/// # Safety
///
/// `ctx` must be null or a pointer previously produced by `Box::into_raw`
/// for a `PushContext`, and the engine must no longer invoke the callback.
unsafe fn reclaim_push_ctx(ctx: *mut PushContext) {
    if !ctx.is_null() {
        drop(unsafe { Box::from_raw(ctx) });
    }
}

/// Stores a script with the engine, returning its hash.
pub fn store_script(code: &[u8]) -> Result<Vec<u8>, FfiError> {
    let result = unsafe { glide_store_script(code.as_ptr(), code.len()) };
    match unsafe { consume_result(result) }? {
        Value::Bytes(hash) => Ok(hash),
        other => Err(FfiError::UnexpectedReply {
            expected: "string",
            actual: other.kind_str(),
        }),
    }
}

/// Drops an engine-side script entry.
pub fn drop_script(hash: &[u8]) {
    unsafe { glide_drop_script(hash.as_ptr(), hash.len()) };
}
