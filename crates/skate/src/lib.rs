//! Valkey client bindings over the Glide core engine.
//!
//! The engine — a prebuilt native library — performs all network I/O,
//! connection management, retry, and cluster routing. This crate is the
//! translation layer above it: command methods assemble flat wire-argument
//! lists and a request-type code, `skate-ffi` carries them across the C
//! boundary, and the engine's tagged-union replies come back as [`Value`]s.
//!
//! No retry or connection logic lives here; the one resource this layer
//! owns is the engine handle, acquired at [`Client::connect`] and released
//! exactly once.

#![forbid(unsafe_code)]

mod batch;
mod client;
pub mod commands;
mod config;
mod error;
mod pubsub;
mod response;
mod route;
mod script;

pub use batch::Batch;
pub use client::Client;
pub use commands::sorted_sets::{ZAddComparison, ZAddConditional, ZAddOptions};
pub use commands::streams::StreamEntry;
pub use commands::strings::{ConditionalSet, Expiry, SetOptions};
pub use config::{
    ConnectionConfig, Credentials, NodeAddress, ReconnectStrategy, Subscription, SubscriptionMode,
    DEFAULT_PORT,
};
pub use error::{Error, Result};
pub use pubsub::{PushKind, PushMessage};
pub use route::Route;
pub use script::Script;
pub use skate_ffi::{RequestType, Value};
