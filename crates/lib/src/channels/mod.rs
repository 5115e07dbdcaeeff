//! Messaging channel: WhatsApp Cloud API webhook envelope and outbound transport.

mod inbound;
mod whatsapp;

pub use inbound::InboundMessage;
pub use whatsapp::{
    parse_envelope, DeliveryResult, MalformedEventError, TransportError, WhatsAppChannel,
};
