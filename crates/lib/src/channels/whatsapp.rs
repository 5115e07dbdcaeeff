//! WhatsApp Cloud API channel: webhook envelope parsing and message send via
//! the Graph API.

use crate::channels::inbound::InboundMessage;
use crate::config::{self, Config};
use crate::payload::OutboundPayload;
use serde::Deserialize;
use serde_json::Value;

const GRAPH_API_BASE: &str = "https://graph.facebook.com";
const GRAPH_API_VERSION: &str = "v21.0";

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("whatsapp {0} not configured")]
    NotConfigured(&'static str),
    #[error("whatsapp send failed: {0}")]
    Request(#[from] reqwest::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum MalformedEventError {
    #[error("webhook envelope is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("webhook envelope missing field: {0}")]
    Missing(&'static str),
}

/// Outcome of one send. The gateway logs it and moves on; delivery failure is
/// not retried or surfaced to the sender.
#[derive(Debug, Clone)]
pub struct DeliveryResult {
    pub status_code: u16,
    pub reason: String,
}

/// One message object from the envelope (typed view; the raw JSON is kept
/// alongside for the event log).
#[derive(Debug, Deserialize)]
struct WhatsAppMessage {
    from: String,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    text: Option<TextBody>,
    #[serde(default)]
    interactive: Option<InteractiveReply>,
}

#[derive(Debug, Deserialize)]
struct TextBody {
    body: String,
}

#[derive(Debug, Deserialize)]
struct InteractiveReply {
    #[serde(default)]
    button_reply: Option<Reply>,
    #[serde(default)]
    list_reply: Option<Reply>,
}

#[derive(Debug, Deserialize)]
struct Reply {
    id: String,
}

/// Extract routable message units from a webhook POST body.
///
/// Walks entry → changes → value → messages and yields one [`InboundMessage`]
/// per text message or interactive reply. Message types without routable text
/// (images, stickers, …) are skipped. Missing envelope fields are a
/// [`MalformedEventError`], answered at the webhook boundary with the generic
/// acknowledgment.
pub fn parse_envelope(body: &[u8]) -> Result<Vec<InboundMessage>, MalformedEventError> {
    let envelope: Value = serde_json::from_slice(body)?;
    let entries = envelope
        .get("entry")
        .and_then(Value::as_array)
        .ok_or(MalformedEventError::Missing("entry"))?;
    let mut units = Vec::new();
    for entry in entries {
        let changes = entry
            .get("changes")
            .and_then(Value::as_array)
            .ok_or(MalformedEventError::Missing("changes"))?;
        for change in changes {
            let value = change
                .get("value")
                .ok_or(MalformedEventError::Missing("value"))?;
            let messages = value
                .get("messages")
                .and_then(Value::as_array)
                .ok_or(MalformedEventError::Missing("messages"))?;
            for raw_msg in messages {
                let msg: WhatsAppMessage = serde_json::from_value(raw_msg.clone())?;
                let text = match (&msg.text, &msg.interactive) {
                    (Some(t), _) => t.body.clone(),
                    (None, Some(i)) => match (&i.button_reply, &i.list_reply) {
                        (Some(r), _) | (None, Some(r)) => r.id.clone(),
                        (None, None) => {
                            log::debug!("webhook: interactive message without reply id, skipping");
                            continue;
                        }
                    },
                    (None, None) => {
                        log::debug!(
                            "webhook: unsupported message type {:?}, skipping",
                            msg.kind
                        );
                        continue;
                    }
                };
                units.push(InboundMessage {
                    sender_id: msg.from,
                    text,
                    raw: raw_msg.to_string(),
                });
            }
        }
    }
    Ok(units)
}

/// Outbound transport: serializes a payload and POSTs it to
/// `{base}/{version}/{phone_number_id}/messages` with the bearer token.
pub struct WhatsAppChannel {
    access_token: Option<String>,
    phone_number_id: Option<String>,
    api_base: String,
    api_version: String,
    client: reqwest::Client,
}

impl WhatsAppChannel {
    pub fn new(
        access_token: Option<String>,
        phone_number_id: Option<String>,
        api_base: Option<String>,
        api_version: Option<String>,
    ) -> Self {
        Self {
            access_token,
            phone_number_id,
            api_base: api_base
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|| GRAPH_API_BASE.to_string()),
            api_version: api_version.unwrap_or_else(|| GRAPH_API_VERSION.to_string()),
            client: reqwest::Client::new(),
        }
    }

    /// Build a channel from config; the access token comes from
    /// WHATSAPP_ACCESS_TOKEN or the config file.
    pub fn from_config(cfg: &Config) -> Self {
        Self::new(
            config::resolve_access_token(cfg),
            cfg.whatsapp.phone_number_id.clone(),
            cfg.whatsapp.api_base.clone(),
            cfg.whatsapp.api_version.clone(),
        )
    }

    /// Send one payload to a recipient. A non-2xx response is still a
    /// [`DeliveryResult`] — the caller logs it, nothing retries.
    pub async fn send(
        &self,
        payload: &OutboundPayload,
        recipient_id: &str,
    ) -> Result<DeliveryResult, TransportError> {
        let token = self
            .access_token
            .as_ref()
            .ok_or(TransportError::NotConfigured("access token"))?;
        let phone_id = self
            .phone_number_id
            .as_ref()
            .ok_or(TransportError::NotConfigured("phone number id"))?;
        let url = format!(
            "{}/{}/{}/messages",
            self.api_base, self.api_version, phone_id
        );
        let res = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&payload.wire_body(recipient_id))
            .send()
            .await?;
        let status = res.status();
        Ok(DeliveryResult {
            status_code: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("unknown").to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope_with(message: Value) -> Vec<u8> {
        serde_json::json!({
            "entry": [{
                "changes": [{
                    "value": { "messages": [message] }
                }]
            }]
        })
        .to_string()
        .into_bytes()
    }

    #[test]
    fn text_message_unit() {
        let body = envelope_with(serde_json::json!({
            "from": "5215512345678",
            "type": "text",
            "text": { "body": "hola" }
        }));
        let units = parse_envelope(&body).unwrap();
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].sender_id, "5215512345678");
        assert_eq!(units[0].text, "hola");
        assert!(units[0].raw.contains("\"type\""));
    }

    #[test]
    fn button_reply_routes_by_id() {
        let body = envelope_with(serde_json::json!({
            "from": "1",
            "type": "interactive",
            "interactive": {
                "type": "button_reply",
                "button_reply": { "id": "btnsi", "title": "Sí" }
            }
        }));
        let units = parse_envelope(&body).unwrap();
        assert_eq!(units[0].text, "btnsi");
    }

    #[test]
    fn list_reply_routes_by_id() {
        let body = envelope_with(serde_json::json!({
            "from": "1",
            "type": "interactive",
            "interactive": {
                "type": "list_reply",
                "list_reply": { "id": "btncompra", "title": "Comprar" }
            }
        }));
        let units = parse_envelope(&body).unwrap();
        assert_eq!(units[0].text, "btncompra");
    }

    #[test]
    fn unsupported_message_type_is_skipped() {
        let body = envelope_with(serde_json::json!({
            "from": "1",
            "type": "image",
            "image": { "id": "MEDIA_ID" }
        }));
        assert!(parse_envelope(&body).unwrap().is_empty());
    }

    #[test]
    fn missing_messages_is_malformed() {
        let body = serde_json::json!({
            "entry": [{ "changes": [{ "value": { "statuses": [] } }] }]
        })
        .to_string();
        let err = parse_envelope(body.as_bytes()).unwrap_err();
        assert!(matches!(err, MalformedEventError::Missing("messages")));
    }

    #[test]
    fn invalid_json_is_malformed() {
        assert!(matches!(
            parse_envelope(b"not json").unwrap_err(),
            MalformedEventError::Json(_)
        ));
    }

    #[tokio::test]
    async fn send_without_token_fails_without_network() {
        let channel = WhatsAppChannel::new(None, Some("123".to_string()), None, None);
        let err = channel
            .send(&OutboundPayload::text("hola"), "1")
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::NotConfigured("access token")));
    }
}
