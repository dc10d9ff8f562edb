//! Cluster administration commands.
//!
//! These are the commands where callers typically care which node answers,
//! so every method takes an optional [`Route`].

use skate_ffi::{RequestType, Value};

use super::fmt_uint;
use crate::client::Client;
use crate::error::Result;
use crate::response;
use crate::route::Route;

impl Client {
    pub fn cluster_info(&self, route: Option<&Route>) -> Result<String> {
        let value = self.execute_routed(RequestType::ClusterInfo, Vec::new(), route)?;
        response::expect_string(value)
    }

    pub fn cluster_nodes(&self, route: Option<&Route>) -> Result<String> {
        let value = self.execute_routed(RequestType::ClusterNodes, Vec::new(), route)?;
        response::expect_string(value)
    }

    /// Raw slot map; the reply shape varies across server versions, so it
    /// is returned undecoded.
    pub fn cluster_slots(&self, route: Option<&Route>) -> Result<Value> {
        self.execute_routed(RequestType::ClusterSlots, Vec::new(), route)
    }

    pub fn cluster_shards(&self, route: Option<&Route>) -> Result<Value> {
        self.execute_routed(RequestType::ClusterShards, Vec::new(), route)
    }

    /// The hash slot a key maps to.
    pub fn cluster_key_slot(&self, key: impl Into<Vec<u8>>) -> Result<i64> {
        let value = self.execute(RequestType::ClusterKeySlot, vec![key.into()])?;
        response::expect_int(value)
    }

    pub fn cluster_count_keys_in_slot(&self, slot: u16) -> Result<i64> {
        let value = self.execute(
            RequestType::ClusterCountKeysInSlot,
            vec![fmt_uint(slot.into())],
        )?;
        response::expect_int(value)
    }

    pub fn cluster_get_keys_in_slot(&self, slot: u16, count: u32) -> Result<Vec<Vec<u8>>> {
        let value = self.execute(
            RequestType::ClusterGetKeysInSlot,
            vec![fmt_uint(slot.into()), fmt_uint(count.into())],
        )?;
        response::expect_array(value)?
            .into_iter()
            .map(response::expect_bytes)
            .collect()
    }

    /// The node ID of whichever node the route selects.
    pub fn cluster_my_id(&self, route: Option<&Route>) -> Result<String> {
        let value = self.execute_routed(RequestType::ClusterMyId, Vec::new(), route)?;
        response::expect_string(value)
    }
}
