//! Routing hints for cluster deployments.
//!
//! The engine owns slot calculation and topology; a [`Route`] only narrows
//! where it may send a command. Serialized to JSON next to the command
//! descriptor; absent means engine-default routing.

use serde::Serialize;

use crate::error::{Error, Result};

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Route {
    /// Any node, chosen by the engine.
    Random,
    /// Fan out to every node; the engine aggregates the replies.
    AllNodes,
    /// Fan out to every primary.
    AllPrimaries,
    /// The node owning the slot of `key`.
    SlotKey { key: String },
    /// The node owning a literal slot number.
    SlotId { slot: u16 },
    /// One specific node.
    ByAddress { host: String, port: u16 },
}

impl Route {
    pub fn slot_key(key: impl Into<String>) -> Self {
        Route::SlotKey { key: key.into() }
    }

    pub fn by_address(host: impl Into<String>, port: u16) -> Self {
        Route::ByAddress {
            host: host.into(),
            port,
        }
    }
}

pub(crate) fn serialize(route: Option<&Route>) -> Result<Option<Vec<u8>>> {
    route
        .map(|route| {
            serde_json::to_vec(route)
                .map_err(|err| Error::InvalidArgument(format!("unserializable route: {err}")))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_serialize_with_a_kind_tag() {
        let payload = serialize(Some(&Route::slot_key("user:1"))).unwrap().unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&payload).unwrap();
        assert_eq!(parsed["kind"], "slot_key");
        assert_eq!(parsed["key"], "user:1");

        let payload = serialize(Some(&Route::AllPrimaries)).unwrap().unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&payload).unwrap();
        assert_eq!(parsed["kind"], "all_primaries");
    }

    #[test]
    fn absent_route_serializes_to_nothing() {
        assert_eq!(serialize(None).unwrap(), None);
    }
}
