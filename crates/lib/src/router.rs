//! Intent router: maps an inbound message to exactly one outbound payload.
//!
//! Rules are evaluated in a fixed order over the lowercased text, first match
//! wins, and every test is a substring test (not whole-token). The order is
//! behavior: "ver 1" must reach the record interpreter, not the digit menu,
//! and "10" contains both "1" and "0". Do not reorder for cleanliness.

use crate::channels::InboundMessage;
use crate::config::RouterConfig;
use crate::llm::ChatResponder;
use crate::payload::OutboundPayload;
use crate::records::Records;
use crate::replies;
use crate::storage::EventLog;
use std::sync::Arc;

/// Menu entries reachable through the digit rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    MainMenu,
    Services,
    StoreLocation,
    Catalog,
    WelcomeAudio,
    Website,
    ContactRequest,
    OpeningHours,
}

/// Canned replies reachable through literal command tokens, including the
/// reply ids of previously sent interactive payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandReply {
    Buttons,
    List,
    ConfirmYes,
    ConfirmNo,
    ConfirmMaybe,
    Buy,
    Sell,
}

/// The classified purpose of one inbound message. Exists only for the
/// duration of a routing decision; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    RecordQuery,
    Greeting,
    Menu(MenuItem),
    Command(CommandReply),
    Chat,
}

/// Digit rules in evaluation order.
const MENU_RULES: [(&str, MenuItem); 8] = [
    ("0", MenuItem::MainMenu),
    ("1", MenuItem::Services),
    ("2", MenuItem::StoreLocation),
    ("3", MenuItem::Catalog),
    ("4", MenuItem::WelcomeAudio),
    ("5", MenuItem::Website),
    ("6", MenuItem::ContactRequest),
    ("7", MenuItem::OpeningHours),
];

/// Command tokens in evaluation order. Ids must match the interactive
/// payloads built in [`crate::replies`].
const COMMAND_RULES: [(&str, CommandReply); 7] = [
    ("boton", CommandReply::Buttons),
    ("lista", CommandReply::List),
    ("btnsi", CommandReply::ConfirmYes),
    ("btnno", CommandReply::ConfirmNo),
    ("btntalvez", CommandReply::ConfirmMaybe),
    ("btncompra", CommandReply::Buy),
    ("btnvender", CommandReply::Sell),
];

/// Resolve the intent for a message text. Deterministic and total: the text
/// is lowercased, the ordered rules are tested as substrings, and the first
/// match wins; anything left over is a Chat fallback.
pub fn classify(text: &str, keywords: &RouterConfig) -> Intent {
    let text = text.to_lowercase();
    if keywords
        .query_keywords
        .iter()
        .any(|k| text.contains(k.as_str()))
    {
        return Intent::RecordQuery;
    }
    if keywords
        .greeting_keywords
        .iter()
        .any(|k| text.contains(k.as_str()))
    {
        return Intent::Greeting;
    }
    for (token, item) in MENU_RULES {
        if text.contains(token) {
            return Intent::Menu(item);
        }
    }
    for (token, reply) in COMMAND_RULES {
        if text.contains(token) {
            return Intent::Command(reply);
        }
    }
    Intent::Chat
}

fn menu_reply(item: MenuItem) -> OutboundPayload {
    match item {
        MenuItem::MainMenu => replies::main_menu(),
        MenuItem::Services => replies::services(),
        MenuItem::StoreLocation => replies::store_location(),
        MenuItem::Catalog => replies::catalog(),
        MenuItem::WelcomeAudio => replies::welcome_audio(),
        MenuItem::Website => replies::website(),
        MenuItem::ContactRequest => replies::contact_request(),
        MenuItem::OpeningHours => replies::opening_hours(),
    }
}

fn command_reply(reply: CommandReply) -> OutboundPayload {
    match reply {
        CommandReply::Buttons => replies::confirm_buttons(),
        CommandReply::List => replies::options_list(),
        CommandReply::ConfirmYes => replies::confirm_yes(),
        CommandReply::ConfirmNo => replies::confirm_no(),
        CommandReply::ConfirmMaybe => replies::confirm_maybe(),
        CommandReply::Buy => replies::buy_followup(),
        CommandReply::Sell => replies::sell_followup(),
    }
}

/// Top-level decision function: one inbound message in, one payload out.
/// Stateless across turns; all conversation "state" lives in the event log.
pub struct Router {
    log: Arc<dyn EventLog>,
    records: Records,
    responder: Arc<dyn ChatResponder>,
    keywords: RouterConfig,
}

impl Router {
    pub fn new(
        log: Arc<dyn EventLog>,
        responder: Arc<dyn ChatResponder>,
        keywords: RouterConfig,
    ) -> Self {
        let records = Records::new(log.clone());
        Self {
            log,
            records,
            responder,
            keywords,
        }
    }

    /// Route one message. Never returns an error: interpreter and responder
    /// failures degrade to a text payload carrying a short diagnostic string.
    pub async fn route(&self, msg: &InboundMessage) -> OutboundPayload {
        // Append the raw inbound payload first, independent of the routing
        // outcome. A failed append must not cost the sender their reply.
        if let Err(e) = self.log.append(&msg.raw) {
            log::warn!("router: event log append failed: {}", e);
        }

        let text = msg.text.to_lowercase();
        let intent = classify(&text, &self.keywords);
        log::debug!("router: {} -> {:?}", msg.sender_id, intent);

        match intent {
            Intent::RecordQuery => OutboundPayload::text(self.records.interpret(&text)),
            Intent::Greeting => replies::welcome(),
            Intent::Menu(item) => menu_reply(item),
            Intent::Command(reply) => command_reply(reply),
            Intent::Chat => match self.responder.complete(&text).await {
                Ok(reply) => OutboundPayload::text(reply),
                Err(e) => {
                    log::warn!("router: responder failed: {}", e);
                    OutboundPayload::text(format!("Error: {}", e))
                }
            },
        }
    }
}
