//! `#[repr(C)]` layout types shared with the engine.
//!
//! These shapes are part of the ABI: field order, widths, and discriminant
//! values must match the engine's headers exactly.

use std::os::raw::{c_char, c_void};
use std::ptr;

/// Tag carried by every [`CommandResponse`].
///
/// Discriminants are ABI-stable and never reused.
#[repr(i32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ResponseType {
    Null = 0,
    Int = 1,
    Float = 2,
    Bool = 3,
    String = 4,
    Array = 5,
    Map = 6,
    Sets = 7,
    Ok = 8,
    Error = 9,
}

impl ResponseType {
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(Self::Null),
            1 => Some(Self::Int),
            2 => Some(Self::Float),
            3 => Some(Self::Bool),
            4 => Some(Self::String),
            5 => Some(Self::Array),
            6 => Some(Self::Map),
            7 => Some(Self::Sets),
            8 => Some(Self::Ok),
            9 => Some(Self::Error),
            _ => None,
        }
    }
}

/// Tagged-union response node. Exactly one payload group is meaningful,
/// selected by `response_type`; everything else stays zeroed.
///
/// Map replies reuse `array_value`: each element of the array is a node
/// whose `map_key`/`map_value` pointers carry one entry.
#[repr(C)]
#[derive(Debug)]
pub struct CommandResponse {
    pub response_type: i32,
    pub int_value: i64,
    pub float_value: f64,
    pub bool_value: bool,
    pub string_value: *mut u8,
    pub string_value_len: i64,
    pub array_value: *mut CommandResponse,
    pub array_value_len: i64,
    pub map_key: *mut CommandResponse,
    pub map_value: *mut CommandResponse,
    pub sets_value: *mut CommandResponse,
    pub sets_value_len: i64,
}

impl CommandResponse {
    /// A zeroed node, i.e. a `Null` response.
    pub const fn null() -> Self {
        Self {
            response_type: ResponseType::Null as i32,
            int_value: 0,
            float_value: 0.0,
            bool_value: false,
            string_value: ptr::null_mut(),
            string_value_len: 0,
            array_value: ptr::null_mut(),
            array_value_len: 0,
            map_key: ptr::null_mut(),
            map_value: ptr::null_mut(),
            sets_value: ptr::null_mut(),
            sets_value_len: 0,
        }
    }
}

impl Default for CommandResponse {
    fn default() -> Self {
        Self::null()
    }
}

/// Classification attached to every engine-side failure.
#[repr(i32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    /// Generic command error, also used for aborted transactions' cause.
    Unspecified = 0,
    /// A transaction was aborted by the server.
    ExecAbort = 1,
    /// The request timed out inside the engine.
    Timeout = 2,
    /// The connection to the server was lost.
    Disconnect = 3,
}

impl ErrorKind {
    /// Unknown kinds from a newer engine degrade to `Unspecified` instead of
    /// failing the decode.
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            1 => Self::ExecAbort,
            2 => Self::Timeout,
            3 => Self::Disconnect,
            _ => Self::Unspecified,
        }
    }
}

/// Error descriptor returned in place of a response.
#[repr(C)]
#[derive(Debug)]
pub struct ErrorInfo {
    pub message: *const c_char,
    pub kind: i32,
}

/// Result carrier for command calls: exactly one side is non-null.
#[repr(C)]
#[derive(Debug)]
pub struct CommandResult {
    pub response: *mut CommandResponse,
    pub error: *mut ErrorInfo,
}

/// Result carrier for client creation.
#[repr(C)]
#[derive(Debug)]
pub struct ClientCreateResult {
    pub handle: *mut c_void,
    pub error: *mut ErrorInfo,
}

/// One command invocation: a request-type code plus a flat argument list as
/// pointer/length pairs. The pointed-to arrays stay valid only while the
/// owning [`crate::CmdArgs`] is alive.
#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct CmdInfo {
    pub request_type: i32,
    pub args: *const *const u8,
    pub arg_lengths: *const usize,
    pub arg_count: usize,
}

/// A set of commands submitted in one call. Submission is all-at-once;
/// there is no partial batch.
#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct BatchInfo {
    pub cmd_count: usize,
    pub cmds: *const *const CmdInfo,
    pub is_atomic: bool,
}

/// Signature of the push callback the engine invokes on pub/sub traffic.
///
/// `pattern` is null for non-pattern messages. The byte buffers are only
/// valid for the duration of the call.
pub type PushCallback = extern "C" fn(
    ctx: *mut c_void,
    kind: i32,
    message: *const u8,
    message_len: i64,
    channel: *const u8,
    channel_len: i64,
    pattern: *const u8,
    pattern_len: i64,
);
