//! Inbound message unit extracted from the webhook envelope.

/// One message to route. `text` is what the rules see (message body, or the
/// reply id of a tapped button/list row); `raw` is the serialized platform
/// message object, which is what the event log stores.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub sender_id: String,
    pub text: String,
    pub raw: String,
}
