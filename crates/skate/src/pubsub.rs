//! Push notifications delivered from the engine's pub/sub machinery.

use skate_ffi::PushEvent;

/// Classification of a push notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PushKind {
    /// Regular channel message.
    Message,
    /// Message matched by a pattern subscription.
    PMessage,
    /// Sharded channel message.
    SMessage,
    Subscribe,
    Unsubscribe,
    PSubscribe,
    PUnsubscribe,
    SSubscribe,
    SUnsubscribe,
    /// A kind code this client does not know; preserved verbatim.
    Other(i32),
}

impl PushKind {
    pub fn from_raw(kind: i32) -> Self {
        match kind {
            0 => PushKind::Message,
            1 => PushKind::PMessage,
            2 => PushKind::SMessage,
            3 => PushKind::Subscribe,
            4 => PushKind::Unsubscribe,
            5 => PushKind::PSubscribe,
            6 => PushKind::PUnsubscribe,
            7 => PushKind::SSubscribe,
            8 => PushKind::SUnsubscribe,
            other => PushKind::Other(other),
        }
    }

    /// True for kinds carrying an application payload, as opposed to
    /// subscription-state confirmations.
    pub fn is_message(&self) -> bool {
        matches!(
            self,
            PushKind::Message | PushKind::PMessage | PushKind::SMessage
        )
    }
}

/// An owned pub/sub notification handed to the registered callback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PushMessage {
    pub kind: PushKind,
    pub message: Vec<u8>,
    pub channel: Vec<u8>,
    /// The matching pattern, for pattern subscriptions only.
    pub pattern: Option<Vec<u8>>,
}

impl PushMessage {
    pub fn channel_utf8(&self) -> Option<&str> {
        std::str::from_utf8(&self.channel).ok()
    }

    pub fn message_utf8(&self) -> Option<&str> {
        std::str::from_utf8(&self.message).ok()
    }
}

impl From<PushEvent> for PushMessage {
    fn from(event: PushEvent) -> Self {
        Self {
            kind: PushKind::from_raw(event.kind),
            message: event.message,
            channel: event.channel,
            pattern: event.pattern,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_kinds_are_preserved() {
        assert_eq!(PushKind::from_raw(42), PushKind::Other(42));
        assert_eq!(PushKind::from_raw(1), PushKind::PMessage);
    }

    #[test]
    fn payload_kinds_are_messages() {
        assert!(PushKind::SMessage.is_message());
        assert!(!PushKind::Unsubscribe.is_message());
        assert!(!PushKind::Other(99).is_message());
    }

    #[test]
    fn events_convert_to_messages() {
        let event = PushEvent {
            kind: 1,
            message: b"payload".to_vec(),
            channel: b"news.tech".to_vec(),
            pattern: Some(b"news.*".to_vec()),
        };
        let msg = PushMessage::from(event);
        assert_eq!(msg.kind, PushKind::PMessage);
        assert_eq!(msg.channel_utf8(), Some("news.tech"));
        assert_eq!(msg.pattern.as_deref(), Some(&b"news.*"[..]));
    }
}
