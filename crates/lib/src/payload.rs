//! Outbound payload variants and their WhatsApp Cloud API wire shape.
//!
//! A payload is constructed fresh per response and serialized into the
//! `/{phone_number_id}/messages` request body; it is never persisted.

use serde_json::{json, Value};

/// One reply button (`action.buttons[].reply`). Ids are stable: a tap comes
/// back through the webhook as `interactive.button_reply.id` and is routed as
/// a command token.
#[derive(Debug, Clone)]
pub struct ReplyButton {
    pub id: String,
    pub title: String,
}

/// One list row (`action.sections[].rows[]`); ids round-trip like button ids.
#[derive(Debug, Clone)]
pub struct ListRow {
    pub id: String,
    pub title: String,
    pub description: String,
}

/// A titled group of list rows.
#[derive(Debug, Clone)]
pub struct ListSection {
    pub title: String,
    pub rows: Vec<ListRow>,
}

/// The closed set of outbound message shapes the gateway can send.
#[derive(Debug, Clone)]
pub enum OutboundPayload {
    Text {
        body: String,
        preview_url: bool,
    },
    Location {
        latitude: f64,
        longitude: f64,
        name: String,
        address: String,
    },
    Document {
        link: String,
        caption: String,
    },
    Audio {
        link: String,
    },
    InteractiveButtons {
        body: String,
        footer: String,
        buttons: Vec<ReplyButton>,
    },
    InteractiveList {
        body: String,
        footer: String,
        /// Label of the button that opens the list.
        button: String,
        sections: Vec<ListSection>,
    },
}

impl OutboundPayload {
    /// Plain text payload without link preview.
    pub fn text(body: impl Into<String>) -> Self {
        Self::Text {
            body: body.into(),
            preview_url: false,
        }
    }

    /// Variant tag for logs and tests.
    pub fn variant_name(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Location { .. } => "location",
            Self::Document { .. } => "document",
            Self::Audio { .. } => "audio",
            Self::InteractiveButtons { .. } => "interactive_buttons",
            Self::InteractiveList { .. } => "interactive_list",
        }
    }

    /// Cloud API request body for this payload addressed to `to`.
    pub fn wire_body(&self, to: &str) -> Value {
        match self {
            Self::Text { body, preview_url } => json!({
                "messaging_product": "whatsapp",
                "to": to,
                "type": "text",
                "text": { "preview_url": preview_url, "body": body }
            }),
            Self::Location {
                latitude,
                longitude,
                name,
                address,
            } => json!({
                "messaging_product": "whatsapp",
                "to": to,
                "type": "location",
                "location": {
                    "latitude": latitude,
                    "longitude": longitude,
                    "name": name,
                    "address": address
                }
            }),
            Self::Document { link, caption } => json!({
                "messaging_product": "whatsapp",
                "to": to,
                "type": "document",
                "document": { "link": link, "caption": caption }
            }),
            Self::Audio { link } => json!({
                "messaging_product": "whatsapp",
                "to": to,
                "type": "audio",
                "audio": { "link": link }
            }),
            Self::InteractiveButtons {
                body,
                footer,
                buttons,
            } => {
                let buttons: Vec<Value> = buttons
                    .iter()
                    .map(|b| {
                        json!({
                            "type": "reply",
                            "reply": { "id": b.id, "title": b.title }
                        })
                    })
                    .collect();
                json!({
                    "messaging_product": "whatsapp",
                    "to": to,
                    "type": "interactive",
                    "interactive": {
                        "type": "button",
                        "body": { "text": body },
                        "footer": { "text": footer },
                        "action": { "buttons": buttons }
                    }
                })
            }
            Self::InteractiveList {
                body,
                footer,
                button,
                sections,
            } => {
                let sections: Vec<Value> = sections
                    .iter()
                    .map(|s| {
                        let rows: Vec<Value> = s
                            .rows
                            .iter()
                            .map(|r| {
                                json!({
                                    "id": r.id,
                                    "title": r.title,
                                    "description": r.description
                                })
                            })
                            .collect();
                        json!({ "title": s.title, "rows": rows })
                    })
                    .collect();
                json!({
                    "messaging_product": "whatsapp",
                    "to": to,
                    "type": "interactive",
                    "interactive": {
                        "type": "list",
                        "body": { "text": body },
                        "footer": { "text": footer },
                        "action": { "button": button, "sections": sections }
                    }
                })
            }
        }
    }
}

/// One-line preview for the chat REPL and delivery logs.
impl std::fmt::Display for OutboundPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text { body, .. } => write!(f, "{}", body),
            Self::Location { name, address, .. } => {
                write!(f, "[location] {} — {}", name, address)
            }
            Self::Document { link, caption } => write!(f, "[document] {} ({})", caption, link),
            Self::Audio { link } => write!(f, "[audio] {}", link),
            Self::InteractiveButtons { body, buttons, .. } => {
                let titles: Vec<&str> = buttons.iter().map(|b| b.title.as_str()).collect();
                write!(f, "[buttons] {} | {}", body, titles.join(" / "))
            }
            Self::InteractiveList { body, sections, .. } => {
                let rows: usize = sections.iter().map(|s| s.rows.len()).sum();
                write!(f, "[list] {} ({} options)", body, rows)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_wire_body_shape() {
        let p = OutboundPayload::text("hola");
        let body = p.wire_body("5215512345678");
        assert_eq!(body["messaging_product"], "whatsapp");
        assert_eq!(body["to"], "5215512345678");
        assert_eq!(body["type"], "text");
        assert_eq!(body["text"]["body"], "hola");
        assert_eq!(body["text"]["preview_url"], false);
    }

    #[test]
    fn preview_text_sets_flag() {
        let p = OutboundPayload::Text {
            body: "https://example.com".to_string(),
            preview_url: true,
        };
        assert_eq!(p.wire_body("1")["text"]["preview_url"], true);
    }

    #[test]
    fn buttons_wire_body_carries_reply_ids() {
        let p = OutboundPayload::InteractiveButtons {
            body: "¿Confirmas?".to_string(),
            footer: "Equipo".to_string(),
            buttons: vec![
                ReplyButton {
                    id: "btnsi".to_string(),
                    title: "Sí".to_string(),
                },
                ReplyButton {
                    id: "btnno".to_string(),
                    title: "No".to_string(),
                },
            ],
        };
        let body = p.wire_body("1");
        assert_eq!(body["type"], "interactive");
        assert_eq!(body["interactive"]["type"], "button");
        let buttons = body["interactive"]["action"]["buttons"].as_array().unwrap();
        assert_eq!(buttons.len(), 2);
        assert_eq!(buttons[0]["reply"]["id"], "btnsi");
        assert_eq!(buttons[0]["type"], "reply");
    }

    #[test]
    fn list_wire_body_shape() {
        let p = OutboundPayload::InteractiveList {
            body: "Selecciona".to_string(),
            footer: "Equipo".to_string(),
            button: "Ver opciones".to_string(),
            sections: vec![ListSection {
                title: "Acciones".to_string(),
                rows: vec![ListRow {
                    id: "btncompra".to_string(),
                    title: "Comprar".to_string(),
                    description: "Quiero comprar".to_string(),
                }],
            }],
        };
        let body = p.wire_body("1");
        assert_eq!(body["interactive"]["type"], "list");
        assert_eq!(body["interactive"]["action"]["button"], "Ver opciones");
        assert_eq!(
            body["interactive"]["action"]["sections"][0]["rows"][0]["id"],
            "btncompra"
        );
    }

    #[test]
    fn variant_names_are_stable() {
        assert_eq!(OutboundPayload::text("x").variant_name(), "text");
        assert_eq!(
            OutboundPayload::Audio {
                link: "a".to_string()
            }
            .variant_name(),
            "audio"
        );
    }
}
