//! The exported `glide_*` symbols.
//!
//! Every function here mirrors the prebuilt engine's signature exactly;
//! test binaries resolve the extern declarations in `skate-ffi` against
//! these definitions at link time.
//!
//! Ownership mirrors the production contract: response trees and error
//! descriptors are heap allocations the caller returns through
//! `glide_free_command_result` / `glide_free_client_create_result`.

use std::collections::HashSet;
use std::ffi::CString;
use std::os::raw::{c_char, c_void};
use std::ptr;
use std::slice;
use std::sync::atomic::Ordering;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use skate_ffi::{
    BatchInfo, ClientCreateResult, CmdInfo, CommandResponse, CommandResult, ErrorKind,
    PushCallback, RequestType, ResponseType, Value,
};

use crate::state::{
    orphan_closes, scripts, state_for, BatchRecord, PushTarget, ReceivedCommand, ScriptInvocation,
    StubReply, StubState,
};

struct StubHandle {
    state: Arc<StubState>,
}

fn live_handles() -> &'static Mutex<HashSet<usize>> {
    static LIVE: OnceLock<Mutex<HashSet<usize>>> = OnceLock::new();
    LIVE.get_or_init(|| Mutex::new(HashSet::new()))
}

/// Looks up the session behind a handle, refusing pointers that were never
/// issued or were already closed (so a stale handle cannot be dereferenced).
unsafe fn resolve(handle: *mut c_void) -> Option<Arc<StubState>> {
    if handle.is_null() {
        return None;
    }
    let live = live_handles().lock();
    if !live.contains(&(handle as usize)) {
        return None;
    }
    let stub = unsafe { &*(handle as *const StubHandle) };
    Some(Arc::clone(&stub.state))
}

fn leak_error(kind: ErrorKind, message: &str) -> *mut skate_ffi::ErrorInfo {
    let message = CString::new(message.replace('\0', " "))
        .unwrap_or_else(|_| CString::new("stub error").expect("static message"));
    Box::into_raw(Box::new(skate_ffi::ErrorInfo {
        message: message.into_raw(),
        kind: kind as i32,
    }))
}

fn error_result(kind: ErrorKind, message: &str) -> *mut CommandResult {
    Box::into_raw(Box::new(CommandResult {
        response: ptr::null_mut(),
        error: leak_error(kind, message),
    }))
}

fn value_result(value: &Value) -> *mut CommandResult {
    Box::into_raw(Box::new(CommandResult {
        response: Box::into_raw(Box::new(build_node(value))),
        error: ptr::null_mut(),
    }))
}

fn reply_result(reply: StubReply) -> *mut CommandResult {
    match reply {
        StubReply::Value(value) => value_result(&value),
        StubReply::Error { kind, message } => error_result(kind, &message),
    }
}

// ---------------------------------------------------------------------------
// Response materialization and reclamation.

fn leak_bytes(bytes: &[u8]) -> (*mut u8, i64) {
    if bytes.is_empty() {
        return (ptr::null_mut(), 0);
    }
    let boxed: Box<[u8]> = bytes.to_vec().into_boxed_slice();
    let len = boxed.len() as i64;
    (Box::into_raw(boxed) as *mut u8, len)
}

fn leak_nodes(values: &[Value]) -> (*mut CommandResponse, i64) {
    if values.is_empty() {
        return (ptr::null_mut(), 0);
    }
    let nodes: Vec<CommandResponse> = values.iter().map(build_node).collect();
    let len = nodes.len() as i64;
    (
        Box::into_raw(nodes.into_boxed_slice()) as *mut CommandResponse,
        len,
    )
}

fn build_node(value: &Value) -> CommandResponse {
    let mut node = CommandResponse::null();
    match value {
        Value::Nil => {}
        Value::Ok => node.response_type = ResponseType::Ok as i32,
        Value::Int(v) => {
            node.response_type = ResponseType::Int as i32;
            node.int_value = *v;
        }
        Value::Double(v) => {
            node.response_type = ResponseType::Float as i32;
            node.float_value = *v;
        }
        Value::Bool(v) => {
            node.response_type = ResponseType::Bool as i32;
            node.bool_value = *v;
        }
        Value::Bytes(bytes) => {
            node.response_type = ResponseType::String as i32;
            let (ptr, len) = leak_bytes(bytes);
            node.string_value = ptr;
            node.string_value_len = len;
        }
        Value::ServerError(message) => {
            node.response_type = ResponseType::Error as i32;
            let (ptr, len) = leak_bytes(message.as_bytes());
            node.string_value = ptr;
            node.string_value_len = len;
        }
        Value::Array(items) => {
            node.response_type = ResponseType::Array as i32;
            let (ptr, len) = leak_nodes(items);
            node.array_value = ptr;
            node.array_value_len = len;
        }
        Value::Set(items) => {
            node.response_type = ResponseType::Sets as i32;
            let (ptr, len) = leak_nodes(items);
            node.sets_value = ptr;
            node.sets_value_len = len;
        }
        Value::Map(entries) => {
            node.response_type = ResponseType::Map as i32;
            let entry_nodes: Vec<CommandResponse> = entries
                .iter()
                .map(|(key, value)| {
                    let mut entry = CommandResponse::null();
                    entry.map_key = Box::into_raw(Box::new(build_node(key)));
                    entry.map_value = Box::into_raw(Box::new(build_node(value)));
                    entry
                })
                .collect();
            node.array_value_len = entry_nodes.len() as i64;
            node.array_value = if entry_nodes.is_empty() {
                ptr::null_mut()
            } else {
                Box::into_raw(entry_nodes.into_boxed_slice()) as *mut CommandResponse
            };
        }
    }
    node
}

unsafe fn free_bytes(ptr: *mut u8, len: i64) {
    if ptr.is_null() || len <= 0 {
        return;
    }
    let slice = unsafe { slice::from_raw_parts_mut(ptr, len as usize) };
    drop(unsafe { Box::from_raw(slice as *mut [u8]) });
}

unsafe fn free_node_box(ptr: *mut CommandResponse) {
    if ptr.is_null() {
        return;
    }
    let mut node = unsafe { Box::from_raw(ptr) };
    unsafe { free_node_contents(&mut node) };
}

unsafe fn free_node_slice(ptr: *mut CommandResponse, len: i64) {
    if ptr.is_null() || len <= 0 {
        return;
    }
    let slice = unsafe { slice::from_raw_parts_mut(ptr, len as usize) };
    for child in slice.iter_mut() {
        unsafe { free_node_contents(child) };
    }
    drop(unsafe { Box::from_raw(slice as *mut [CommandResponse]) });
}

unsafe fn free_node_contents(node: &mut CommandResponse) {
    match ResponseType::from_raw(node.response_type) {
        Some(ResponseType::String) | Some(ResponseType::Error) => {
            unsafe { free_bytes(node.string_value, node.string_value_len) };
        }
        Some(ResponseType::Array) => {
            unsafe { free_node_slice(node.array_value, node.array_value_len) };
        }
        Some(ResponseType::Sets) => {
            unsafe { free_node_slice(node.sets_value, node.sets_value_len) };
        }
        Some(ResponseType::Map) => {
            if !node.array_value.is_null() && node.array_value_len > 0 {
                let entries = unsafe {
                    slice::from_raw_parts_mut(node.array_value, node.array_value_len as usize)
                };
                for entry in entries.iter_mut() {
                    unsafe { free_node_box(entry.map_key) };
                    unsafe { free_node_box(entry.map_value) };
                }
                drop(unsafe { Box::from_raw(entries as *mut [CommandResponse]) });
            }
        }
        _ => {}
    }
}

unsafe fn free_error(ptr: *mut skate_ffi::ErrorInfo) {
    if ptr.is_null() {
        return;
    }
    let info = unsafe { Box::from_raw(ptr) };
    if !info.message.is_null() {
        drop(unsafe { CString::from_raw(info.message as *mut c_char) });
    }
}

// ---------------------------------------------------------------------------
// Descriptor decoding.

unsafe fn read_cmd(cmd: *const CmdInfo) -> Option<(i32, Vec<Vec<u8>>)> {
    if cmd.is_null() {
        return None;
    }
    let info = unsafe { &*cmd };
    if info.arg_count == 0 {
        return Some((info.request_type, Vec::new()));
    }
    if info.args.is_null() || info.arg_lengths.is_null() {
        return None;
    }
    let ptrs = unsafe { slice::from_raw_parts(info.args, info.arg_count) };
    let lens = unsafe { slice::from_raw_parts(info.arg_lengths, info.arg_count) };
    let mut args = Vec::with_capacity(info.arg_count);
    for (arg_ptr, len) in ptrs.iter().zip(lens) {
        if arg_ptr.is_null() && *len > 0 {
            return None;
        }
        let bytes = if *len == 0 {
            Vec::new()
        } else {
            unsafe { slice::from_raw_parts(*arg_ptr, *len) }.to_vec()
        };
        args.push(bytes);
    }
    Some((info.request_type, args))
}

unsafe fn read_route(route: *const u8, route_len: usize) -> Result<Option<serde_json::Value>, ()> {
    if route.is_null() || route_len == 0 {
        return Ok(None);
    }
    let bytes = unsafe { slice::from_raw_parts(route, route_len) };
    serde_json::from_slice(bytes).map(Some).map_err(|_| ())
}

fn record_command(
    state: &StubState,
    raw: i32,
    args: Vec<Vec<u8>>,
    route: Option<serde_json::Value>,
    in_batch: bool,
) {
    state.commands.lock().push(ReceivedCommand {
        request_type: RequestType::from_raw(raw),
        raw_request_type: raw,
        args,
        route,
        in_batch,
    });
}

// ---------------------------------------------------------------------------
// Exported symbols.

/// # Safety
///
/// Mirrors the engine ABI: `config` must point to `config_len` readable
/// bytes.
#[no_mangle]
pub unsafe extern "C" fn glide_create_client(
    config: *const u8,
    config_len: usize,
    push_ctx: *mut c_void,
    push_callback: Option<PushCallback>,
) -> *mut ClientCreateResult {
    let error_create = |message: &str| {
        Box::into_raw(Box::new(ClientCreateResult {
            handle: ptr::null_mut(),
            error: leak_error(ErrorKind::Unspecified, message),
        }))
    };

    if config.is_null() && config_len > 0 {
        return error_create("null connection config");
    }
    let bytes = if config_len == 0 {
        &[][..]
    } else {
        unsafe { slice::from_raw_parts(config, config_len) }
    };
    let parsed: serde_json::Value = match serde_json::from_slice(bytes) {
        Ok(value) => value,
        Err(_) => return error_create("invalid connection config"),
    };
    let name = parsed
        .get("client_name")
        .and_then(|value| value.as_str())
        .unwrap_or("default")
        .to_string();

    let state = state_for(&name);
    state.connects.fetch_add(1, Ordering::Relaxed);
    *state.config.lock() = Some(parsed);
    *state.push.lock() = push_callback.map(|callback| PushTarget {
        callback,
        ctx: push_ctx,
    });

    let handle = Box::into_raw(Box::new(StubHandle { state })) as *mut c_void;
    live_handles().lock().insert(handle as usize);
    Box::into_raw(Box::new(ClientCreateResult {
        handle,
        error: ptr::null_mut(),
    }))
}

/// # Safety
///
/// `handle` may be anything; unknown or already-closed handles are counted
/// and ignored rather than dereferenced.
#[no_mangle]
pub unsafe extern "C" fn glide_close_client(handle: *mut c_void) {
    if handle.is_null() || !live_handles().lock().remove(&(handle as usize)) {
        orphan_closes().fetch_add(1, Ordering::Relaxed);
        return;
    }
    let stub = unsafe { Box::from_raw(handle as *mut StubHandle) };
    stub.state.closes.fetch_add(1, Ordering::Relaxed);
    *stub.state.push.lock() = None;
}

/// # Safety
///
/// Mirrors the engine ABI: `cmd` must be a valid descriptor and `route`
/// must cover `route_len` bytes when non-null.
#[no_mangle]
pub unsafe extern "C" fn glide_command(
    handle: *mut c_void,
    cmd: *const CmdInfo,
    route: *const u8,
    route_len: usize,
) -> *mut CommandResult {
    let state = match unsafe { resolve(handle) } {
        Some(state) => state,
        None => return error_result(ErrorKind::Disconnect, "unknown client handle"),
    };
    let (raw, args) = match unsafe { read_cmd(cmd) } {
        Some(parts) => parts,
        None => return error_result(ErrorKind::Unspecified, "malformed command descriptor"),
    };
    let route = match unsafe { read_route(route, route_len) } {
        Ok(route) => route,
        Err(()) => return error_result(ErrorKind::Unspecified, "malformed route payload"),
    };
    record_command(&state, raw, args, route, false);
    reply_result(state.next_reply())
}

/// # Safety
///
/// Mirrors the engine ABI: `batch` and every descriptor it references must
/// be valid for the duration of the call.
#[no_mangle]
pub unsafe extern "C" fn glide_batch(
    handle: *mut c_void,
    batch: *const BatchInfo,
    raise_on_error: bool,
) -> *mut CommandResult {
    let state = match unsafe { resolve(handle) } {
        Some(state) => state,
        None => return error_result(ErrorKind::Disconnect, "unknown client handle"),
    };
    if batch.is_null() {
        return error_result(ErrorKind::Unspecified, "null batch descriptor");
    }
    let info = unsafe { &*batch };
    if info.cmd_count > 0 && info.cmds.is_null() {
        return error_result(ErrorKind::Unspecified, "malformed batch descriptor");
    }

    state.batches.lock().push(BatchRecord {
        len: info.cmd_count,
        atomic: info.is_atomic,
        raise_on_error,
    });

    let descriptors = if info.cmd_count == 0 {
        &[][..]
    } else {
        unsafe { slice::from_raw_parts(info.cmds, info.cmd_count) }
    };
    let mut slots = Vec::with_capacity(descriptors.len());
    for descriptor in descriptors {
        let (raw, args) = match unsafe { read_cmd(*descriptor) } {
            Some(parts) => parts,
            None => return error_result(ErrorKind::Unspecified, "malformed command descriptor"),
        };
        record_command(&state, raw, args, None, true);
        match state.next_reply() {
            StubReply::Value(value) => slots.push(value),
            StubReply::Error { kind, message } => {
                if raise_on_error {
                    return error_result(kind, &message);
                }
                slots.push(Value::ServerError(message));
            }
        }
    }
    value_result(&Value::Array(slots))
}

/// # Safety
///
/// `script` must point to `script_len` readable bytes.
#[no_mangle]
pub unsafe extern "C" fn glide_store_script(
    script: *const u8,
    script_len: usize,
) -> *mut CommandResult {
    if script.is_null() && script_len > 0 {
        return error_result(ErrorKind::Unspecified, "null script payload");
    }
    let code = if script_len == 0 {
        Vec::new()
    } else {
        unsafe { slice::from_raw_parts(script, script_len) }.to_vec()
    };
    let hash = format!("{:08x}", crc32fast::hash(&code));
    scripts().lock().insert(hash.clone(), code);
    value_result(&Value::Bytes(hash.into_bytes()))
}

/// # Safety
///
/// `hash` must point to `hash_len` readable bytes.
#[no_mangle]
pub unsafe extern "C" fn glide_drop_script(hash: *const u8, hash_len: usize) {
    if hash.is_null() || hash_len == 0 {
        return;
    }
    let hash = String::from_utf8_lossy(unsafe { slice::from_raw_parts(hash, hash_len) });
    scripts().lock().remove(hash.as_ref());
}

/// # Safety
///
/// Mirrors the engine ABI; all pointer/length pairs must be readable and
/// `keys`/`args` must be valid descriptors when non-null.
#[no_mangle]
pub unsafe extern "C" fn glide_invoke_script(
    handle: *mut c_void,
    hash: *const u8,
    hash_len: usize,
    keys: *const CmdInfo,
    args: *const CmdInfo,
    route: *const u8,
    route_len: usize,
) -> *mut CommandResult {
    let state = match unsafe { resolve(handle) } {
        Some(state) => state,
        None => return error_result(ErrorKind::Disconnect, "unknown client handle"),
    };
    if hash.is_null() || hash_len == 0 {
        return error_result(ErrorKind::Unspecified, "missing script hash");
    }
    let hash = String::from_utf8_lossy(unsafe { slice::from_raw_parts(hash, hash_len) }).into_owned();
    if !scripts().lock().contains_key(&hash) {
        return error_result(ErrorKind::Unspecified, "NOSCRIPT no matching script found");
    }
    let keys = match unsafe { read_cmd(keys) } {
        Some((_, keys)) => keys,
        None => Vec::new(),
    };
    let args = match unsafe { read_cmd(args) } {
        Some((_, args)) => args,
        None => Vec::new(),
    };
    let route = match unsafe { read_route(route, route_len) } {
        Ok(route) => route,
        Err(()) => return error_result(ErrorKind::Unspecified, "malformed route payload"),
    };
    state.invocations.lock().push(ScriptInvocation {
        hash,
        keys,
        args,
        route,
    });
    reply_result(state.next_reply())
}

/// # Safety
///
/// `result` must be null or a carrier previously returned by this stub and
/// not yet freed.
#[no_mangle]
pub unsafe extern "C" fn glide_free_command_result(result: *mut CommandResult) {
    if result.is_null() {
        return;
    }
    let carrier = unsafe { Box::from_raw(result) };
    unsafe { free_node_box(carrier.response) };
    unsafe { free_error(carrier.error) };
}

/// # Safety
///
/// `result` must be null or a carrier previously returned by this stub and
/// not yet freed. The handle inside stays alive until closed.
#[no_mangle]
pub unsafe extern "C" fn glide_free_client_create_result(result: *mut ClientCreateResult) {
    if result.is_null() {
        return;
    }
    let carrier = unsafe { Box::from_raw(result) };
    unsafe { free_error(carrier.error) };
}
