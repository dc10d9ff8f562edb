//! Connection handle lifecycle and the single dispatch path.
//!
//! Every command method in [`crate::commands`] funnels into
//! [`Client::execute`]: assemble the flat argument list, marshal it, hand it
//! to the engine, decode the reply. The client owns exactly one engine
//! handle; [`Client::close`] (or drop) releases it once, and every call
//! afterwards fails with [`Error::ClosedClient`].

use parking_lot::RwLock;
use skate_ffi::{BatchArgs, CmdArgs, EngineHandle, RequestType, Value};
use tracing::debug;

use crate::batch::Batch;
use crate::config::ConnectionConfig;
use crate::error::{Error, Result};
use crate::pubsub::PushMessage;
use crate::route::{self, Route};
use crate::script::Script;

/// A connected client.
///
/// Cheap to share behind an `Arc`; the engine serializes connection access
/// internally, so all methods take `&self`.
pub struct Client {
    handle: RwLock<Option<EngineHandle>>,
}

impl Client {
    /// Connects with no push handler; push messages from engine-side
    /// subscriptions are dropped.
    pub fn connect(config: &ConnectionConfig) -> Result<Self> {
        Self::connect_inner(config, None)
    }

    /// Connects and registers `handler` for push notifications. The handler
    /// runs on engine threads and may be invoked concurrently.
    pub fn connect_with_push<F>(config: &ConnectionConfig, handler: F) -> Result<Self>
    where
        F: Fn(PushMessage) + Send + Sync + 'static,
    {
        Self::connect_inner(
            config,
            Some(Box::new(move |event| handler(PushMessage::from(event)))),
        )
    }

    fn connect_inner(
        config: &ConnectionConfig,
        push_handler: Option<skate_ffi::PushHandler>,
    ) -> Result<Self> {
        config.validate()?;
        let payload = config.to_payload()?;
        let handle = EngineHandle::connect(&payload, push_handler)?;
        debug!(
            addresses = config.addresses.len(),
            cluster = config.cluster_mode,
            "client.connect"
        );
        Ok(Self {
            handle: RwLock::new(Some(handle)),
        })
    }

    /// Releases the engine handle. Safe to call more than once; only the
    /// first call does anything.
    pub fn close(&self) {
        if self.handle.write().take().is_some() {
            debug!("client.close");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.handle.read().is_none()
    }

    fn with_handle<T>(&self, f: impl FnOnce(&EngineHandle) -> Result<T>) -> Result<T> {
        let guard = self.handle.read();
        match guard.as_ref() {
            Some(handle) => f(handle),
            None => Err(Error::ClosedClient),
        }
    }

    pub(crate) fn execute(
        &self,
        request_type: RequestType,
        args: Vec<Vec<u8>>,
    ) -> Result<Value> {
        self.execute_routed(request_type, args, None)
    }

    pub(crate) fn execute_routed(
        &self,
        request_type: RequestType,
        args: Vec<Vec<u8>>,
        route: Option<&Route>,
    ) -> Result<Value> {
        let route_payload = route::serialize(route)?;
        let cmd = CmdArgs::new(request_type, args);
        let value = self.with_handle(|handle| {
            handle
                .command(&cmd, route_payload.as_deref())
                .map_err(Error::from)
        })?;
        match value {
            Value::ServerError(message) => Err(Error::Command(message)),
            other => Ok(other),
        }
    }

    /// Sends a command given as its literal argument list, name first.
    /// The reply is returned undecoded beyond the [`Value`] mapping.
    pub fn custom_command(
        &self,
        args: impl IntoIterator<Item = impl Into<Vec<u8>>>,
    ) -> Result<Value> {
        self.custom_command_routed(args, None)
    }

    pub fn custom_command_routed(
        &self,
        args: impl IntoIterator<Item = impl Into<Vec<u8>>>,
        route: Option<&Route>,
    ) -> Result<Value> {
        let args: Vec<Vec<u8>> = args.into_iter().map(Into::into).collect();
        if args.is_empty() {
            return Err(Error::InvalidArgument(
                "custom commands need at least a command name".into(),
            ));
        }
        self.execute_routed(RequestType::CustomCommand, args, route)
    }

    /// Submits a batch in one engine call and returns one value per queued
    /// command, in queue order.
    ///
    /// With `raise_on_error`, the first failing command fails the whole
    /// call. Without it, failing slots come back as
    /// [`Value::ServerError`] while the rest carry their results.
    pub fn exec_batch(&self, batch: &Batch, raise_on_error: bool) -> Result<Vec<Value>> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }
        let cmds: Vec<CmdArgs> = batch
            .entries()
            .iter()
            .map(|entry| CmdArgs::new(entry.request_type, entry.args.iter().cloned()))
            .collect();
        let args = BatchArgs::new(cmds, batch.is_atomic());

        let value = self
            .with_handle(|handle| handle.batch(&args, raise_on_error).map_err(Error::from))?;
        let slots = match value {
            Value::Array(slots) => slots,
            Value::ServerError(message) => return Err(Error::Command(message)),
            other => {
                return Err(Error::UnexpectedResponse {
                    expected: "array",
                    actual: other.kind_str(),
                })
            }
        };
        if slots.len() != batch.len() {
            return Err(Error::UnexpectedResponse {
                expected: "one slot per queued command",
                actual: "mismatched batch reply length",
            });
        }

        batch
            .entries()
            .iter()
            .zip(slots)
            .map(|(entry, slot)| {
                // Per-slot failures stay in place for the caller to inspect.
                if matches!(slot, Value::ServerError(_)) {
                    return Ok(slot);
                }
                match entry.convert {
                    Some(convert) => convert(slot),
                    None => Ok(slot),
                }
            })
            .collect()
    }

    /// Invokes a stored script with explicit key and argument lists.
    pub fn invoke_script(
        &self,
        script: &Script,
        keys: impl IntoIterator<Item = impl Into<Vec<u8>>>,
        args: impl IntoIterator<Item = impl Into<Vec<u8>>>,
    ) -> Result<Value> {
        self.invoke_script_routed(script, keys, args, None)
    }

    pub fn invoke_script_routed(
        &self,
        script: &Script,
        keys: impl IntoIterator<Item = impl Into<Vec<u8>>>,
        args: impl IntoIterator<Item = impl Into<Vec<u8>>>,
        route: Option<&Route>,
    ) -> Result<Value> {
        let route_payload = route::serialize(route)?;
        // Key/arg lists ride in command descriptors; the request type on
        // these containers is never dispatched.
        let keys = CmdArgs::new(
            RequestType::InvalidRequest,
            keys.into_iter().map(Into::into),
        );
        let args = CmdArgs::new(
            RequestType::InvalidRequest,
            args.into_iter().map(Into::into),
        );
        let value = self.with_handle(|handle| {
            handle
                .invoke_script(script.hash(), &keys, &args, route_payload.as_deref())
                .map_err(Error::from)
        })?;
        match value {
            Value::ServerError(message) => Err(Error::Command(message)),
            other => Ok(other),
        }
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("closed", &self.is_closed())
            .finish()
    }
}
