//! Client-side batch accumulator.
//!
//! A [`Batch`] only queues command descriptors; nothing crosses the boundary
//! until [`Client::exec_batch`](crate::Client::exec_batch) submits the whole
//! thing in one call. Slots in the reply array line up with queue order.

use skate_ffi::{RequestType, Value};

use crate::commands::fmt_int;
use crate::error::Result;
use crate::response;

/// Per-slot shape check applied to a batch reply.
pub(crate) type SlotConverter = fn(Value) -> Result<Value>;

pub(crate) struct BatchEntry {
    pub(crate) request_type: RequestType,
    pub(crate) args: Vec<Vec<u8>>,
    pub(crate) convert: Option<SlotConverter>,
}

/// An ordered queue of commands submitted in one engine call.
///
/// Atomic batches run as a transaction; the engine aborts the whole batch on
/// failure. Non-atomic batches (pipelines) run every command and report
/// per-slot errors in place.
pub struct Batch {
    entries: Vec<BatchEntry>,
    atomic: bool,
}

fn ensure_ok(value: Value) -> Result<Value> {
    response::expect_ok(value)?;
    Ok(Value::Ok)
}

fn ensure_int(value: Value) -> Result<Value> {
    response::expect_int(value).map(Value::Int)
}

fn ensure_optional_bytes(value: Value) -> Result<Value> {
    Ok(match response::expect_optional_bytes(value)? {
        Some(bytes) => Value::Bytes(bytes),
        None => Value::Nil,
    })
}

fn ensure_bytes(value: Value) -> Result<Value> {
    response::expect_bytes(value).map(Value::Bytes)
}

impl Batch {
    /// A non-atomic batch: commands run independently, errors stay per-slot.
    pub fn pipeline() -> Self {
        Self {
            entries: Vec::new(),
            atomic: false,
        }
    }

    /// An atomic batch: all-or-nothing execution.
    pub fn transaction() -> Self {
        Self {
            entries: Vec::new(),
            atomic: true,
        }
    }

    pub fn is_atomic(&self) -> bool {
        self.atomic
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn entries(&self) -> &[BatchEntry] {
        &self.entries
    }

    fn push(
        &mut self,
        request_type: RequestType,
        args: Vec<Vec<u8>>,
        convert: Option<SlotConverter>,
    ) -> &mut Self {
        self.entries.push(BatchEntry {
            request_type,
            args,
            convert,
        });
        self
    }

    /// Queues any command by request type, with no shape check on its slot.
    pub fn cmd(
        &mut self,
        request_type: RequestType,
        args: impl IntoIterator<Item = impl Into<Vec<u8>>>,
    ) -> &mut Self {
        let args = args.into_iter().map(Into::into).collect();
        self.push(request_type, args, None)
    }

    /// Queues a command by literal argument list, name included.
    pub fn custom(&mut self, args: impl IntoIterator<Item = impl Into<Vec<u8>>>) -> &mut Self {
        self.cmd(RequestType::CustomCommand, args)
    }

    pub fn get(&mut self, key: impl Into<Vec<u8>>) -> &mut Self {
        self.push(
            RequestType::Get,
            vec![key.into()],
            Some(ensure_optional_bytes),
        )
    }

    pub fn set(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> &mut Self {
        self.push(
            RequestType::Set,
            vec![key.into(), value.into()],
            Some(ensure_ok),
        )
    }

    pub fn incr(&mut self, key: impl Into<Vec<u8>>) -> &mut Self {
        self.push(RequestType::Incr, vec![key.into()], Some(ensure_int))
    }

    pub fn incr_by(&mut self, key: impl Into<Vec<u8>>, delta: i64) -> &mut Self {
        self.push(
            RequestType::IncrBy,
            vec![key.into(), fmt_int(delta)],
            Some(ensure_int),
        )
    }

    pub fn del(&mut self, keys: impl IntoIterator<Item = impl Into<Vec<u8>>>) -> &mut Self {
        let args = keys.into_iter().map(Into::into).collect();
        self.push(RequestType::Del, args, Some(ensure_int))
    }

    pub fn hset(
        &mut self,
        key: impl Into<Vec<u8>>,
        field: impl Into<Vec<u8>>,
        value: impl Into<Vec<u8>>,
    ) -> &mut Self {
        self.push(
            RequestType::HSet,
            vec![key.into(), field.into(), value.into()],
            Some(ensure_int),
        )
    }

    pub fn lpush(
        &mut self,
        key: impl Into<Vec<u8>>,
        elements: impl IntoIterator<Item = impl Into<Vec<u8>>>,
    ) -> &mut Self {
        let mut args = vec![key.into()];
        args.extend(elements.into_iter().map(Into::into));
        self.push(RequestType::LPush, args, Some(ensure_int))
    }

    pub fn sadd(
        &mut self,
        key: impl Into<Vec<u8>>,
        members: impl IntoIterator<Item = impl Into<Vec<u8>>>,
    ) -> &mut Self {
        let mut args = vec![key.into()];
        args.extend(members.into_iter().map(Into::into));
        self.push(RequestType::SAdd, args, Some(ensure_int))
    }

    pub fn publish(
        &mut self,
        channel: impl Into<Vec<u8>>,
        message: impl Into<Vec<u8>>,
    ) -> &mut Self {
        self.push(
            RequestType::Publish,
            vec![channel.into(), message.into()],
            Some(ensure_int),
        )
    }

    pub fn ping(&mut self) -> &mut Self {
        self.push(RequestType::Ping, Vec::new(), Some(ensure_bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queueing_preserves_order() {
        let mut batch = Batch::pipeline();
        batch.set("k", "v").get("k").incr("counter");
        let types: Vec<RequestType> = batch
            .entries()
            .iter()
            .map(|entry| entry.request_type)
            .collect();
        assert_eq!(
            types,
            vec![RequestType::Set, RequestType::Get, RequestType::Incr]
        );
    }

    #[test]
    fn transactions_are_atomic() {
        assert!(Batch::transaction().is_atomic());
        assert!(!Batch::pipeline().is_atomic());
    }

    #[test]
    fn custom_commands_carry_the_literal_args() {
        let mut batch = Batch::pipeline();
        batch.custom(["OBJECT", "ENCODING", "mykey"]);
        let entry = &batch.entries()[0];
        assert_eq!(entry.request_type, RequestType::CustomCommand);
        assert_eq!(entry.args[0], b"OBJECT");
        assert!(entry.convert.is_none());
    }

    #[test]
    fn slot_converters_validate_shapes() {
        let mut batch = Batch::pipeline();
        batch.incr("n");
        let convert = batch.entries()[0].convert.unwrap();
        assert_eq!(convert(Value::Int(7)).unwrap(), Value::Int(7));
        assert!(convert(Value::from("seven")).is_err());
    }
}
