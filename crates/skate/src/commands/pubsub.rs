//! Pub/sub publishing and introspection.
//!
//! Subscriptions themselves are configured at connect time (see
//! [`crate::ConnectionConfig::subscribe`]); the engine owns them and
//! re-establishes them after reconnects. Delivery arrives through the push
//! callback registered with [`crate::Client::connect_with_push`].

use skate_ffi::RequestType;

use crate::client::Client;
use crate::error::Result;
use crate::response;

impl Client {
    /// Publishes to a channel; returns how many subscribers received it.
    pub fn publish(
        &self,
        channel: impl Into<Vec<u8>>,
        message: impl Into<Vec<u8>>,
    ) -> Result<i64> {
        let value = self.execute(RequestType::Publish, vec![channel.into(), message.into()])?;
        response::expect_int(value)
    }

    /// Sharded publish; the channel hashes to a slot like a key does.
    pub fn spublish(
        &self,
        channel: impl Into<Vec<u8>>,
        message: impl Into<Vec<u8>>,
    ) -> Result<i64> {
        let value = self.execute(RequestType::SPublish, vec![channel.into(), message.into()])?;
        response::expect_int(value)
    }

    /// Active channels, optionally filtered by a glob pattern.
    pub fn pubsub_channels(&self, pattern: Option<&[u8]>) -> Result<Vec<Vec<u8>>> {
        let args = match pattern {
            Some(pattern) => vec![pattern.to_vec()],
            None => Vec::new(),
        };
        let value = self.execute(RequestType::PubSubChannels, args)?;
        response::expect_array(value)?
            .into_iter()
            .map(response::expect_bytes)
            .collect()
    }

    /// Subscriber counts for the named channels, in request order.
    pub fn pubsub_numsub(
        &self,
        channels: impl IntoIterator<Item = impl Into<Vec<u8>>>,
    ) -> Result<Vec<(Vec<u8>, i64)>> {
        let args: Vec<Vec<u8>> = channels.into_iter().map(Into::into).collect();
        let value = self.execute(RequestType::PubSubNumSub, args)?;
        response::expect_pairs(value)?
            .into_iter()
            .map(|(channel, count)| {
                Ok((
                    response::expect_bytes(channel)?,
                    response::expect_int(count)?,
                ))
            })
            .collect()
    }

    /// How many pattern subscriptions exist server-wide.
    pub fn pubsub_numpat(&self) -> Result<i64> {
        let value = self.execute(RequestType::PubSubNumPat, Vec::new())?;
        response::expect_int(value)
    }
}
