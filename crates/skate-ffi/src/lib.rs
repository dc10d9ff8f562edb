//! C ABI boundary to the Glide core engine.
//!
//! The engine is a prebuilt shared library that owns connection lifecycle,
//! cluster routing, retry, and pub/sub delivery. This crate owns the layout
//! types crossing that boundary, the argument marshalling that keeps request
//! buffers alive for the duration of a call, and the recursive decoder that
//! turns the engine's tagged-union responses into owned [`Value`]s.
//!
//! All `unsafe` in the workspace lives here; the client crate above is
//! `forbid(unsafe_code)`.

#![deny(unsafe_op_in_unsafe_fn)]

mod decode;
mod engine;
mod marshal;
mod push;
mod request_type;
mod types;
mod value;

pub use decode::DecodeError;
pub use engine::{drop_script, store_script, EngineHandle, FfiError};
pub use marshal::{BatchArgs, CmdArgs};
pub use push::{PushEvent, PushHandler};
pub use request_type::RequestType;
pub use types::{
    BatchInfo, ClientCreateResult, CmdInfo, CommandResponse, CommandResult, ErrorInfo, ErrorKind,
    PushCallback, ResponseType,
};
pub use value::Value;

/// Convenience alias used throughout the boundary layer.
pub type Result<T> = std::result::Result<T, FfiError>;
