//! Canned replies: the welcome message, the numbered menu templates, and the
//! interactive button/list menus with their reply-id confirmations.
//!
//! Reply content is user-facing Spanish; the ids (`btnsi`, `btncompra`, …)
//! round-trip through the webhook and are matched by the router's command
//! table, so they must stay in sync with [`crate::router`].

use crate::payload::{ListRow, ListSection, OutboundPayload, ReplyButton};

/// Static welcome sent for greeting keywords; lists the commands the
/// record-query interpreter understands.
pub fn welcome() -> OutboundPayload {
    OutboundPayload::text(
        "🚀 ¡Hola! ¿Cómo estás? Bienvenido.\n\nPuedes usar comandos como:\n- Ver mensajes\n- Agregar mensaje\n- Mostrar registros",
    )
}

/// Main menu, sent for digit 0 (and linked from the welcome flow).
pub fn main_menu() -> OutboundPayload {
    OutboundPayload::text(
        "📌 Menú principal. Responde con un número para recibir información.\n\n1️⃣ Información de nuestros servicios\n2️⃣ Ubicación de la tienda 📍\n3️⃣ Catálogo en PDF 📄\n4️⃣ Audio de bienvenida 🎧\n5️⃣ Nuestra página web 🌐\n6️⃣ Hablar con una persona 🙋\n7️⃣ Horario de atención 🕜\n0️⃣ Volver a este menú",
    )
}

/// Digit 1 — services summary.
pub fn services() -> OutboundPayload {
    OutboundPayload::text(
        "Ofrecemos venta de productos, asesoría personalizada y envíos a todo el país. Escribe «hola» para volver al inicio o «0» para ver el menú.",
    )
}

/// Digit 2 — store location.
pub fn store_location() -> OutboundPayload {
    OutboundPayload::Location {
        latitude: -12.046374,
        longitude: -77.042793,
        name: "Tienda Charla".to_string(),
        address: "Av. Principal 123, Lima, Perú".to_string(),
    }
}

/// Digit 3 — PDF catalog.
pub fn catalog() -> OutboundPayload {
    OutboundPayload::Document {
        link: "https://charla.example.com/media/catalogo.pdf".to_string(),
        caption: "Catálogo Charla 📄".to_string(),
    }
}

/// Digit 4 — welcome audio.
pub fn welcome_audio() -> OutboundPayload {
    OutboundPayload::Audio {
        link: "https://charla.example.com/media/bienvenida.ogg".to_string(),
    }
}

/// Digit 5 — website link with preview enabled.
pub fn website() -> OutboundPayload {
    OutboundPayload::Text {
        body: "Visítanos en https://charla.example.com para conocer todas nuestras ofertas. 🌐".to_string(),
        preview_url: true,
    }
}

/// Digit 6 — a human will follow up.
pub fn contact_request() -> OutboundPayload {
    OutboundPayload::text(
        "En breve una persona de nuestro equipo se pondrá en contacto contigo. 🙋",
    )
}

/// Digit 7 — opening hours.
pub fn opening_hours() -> OutboundPayload {
    OutboundPayload::text(
        "🕜 Horario de atención:\nLunes a viernes: 9:00 – 18:00\nSábados: 9:00 – 13:00",
    )
}

/// "boton" — confirmation buttons. Tap ids come back as command tokens.
pub fn confirm_buttons() -> OutboundPayload {
    OutboundPayload::InteractiveButtons {
        body: "¿Confirmas tu registro?".to_string(),
        footer: "Equipo Charla".to_string(),
        buttons: vec![
            ReplyButton {
                id: "btnsi".to_string(),
                title: "Sí".to_string(),
            },
            ReplyButton {
                id: "btnno".to_string(),
                title: "No".to_string(),
            },
            ReplyButton {
                id: "btntalvez".to_string(),
                title: "Tal vez".to_string(),
            },
        ],
    }
}

/// "lista" — buy/sell option list. Row ids come back as command tokens.
pub fn options_list() -> OutboundPayload {
    OutboundPayload::InteractiveList {
        body: "Selecciona una opción de la lista".to_string(),
        footer: "Equipo Charla".to_string(),
        button: "Ver opciones".to_string(),
        sections: vec![ListSection {
            title: "¿Qué deseas hacer?".to_string(),
            rows: vec![
                ListRow {
                    id: "btncompra".to_string(),
                    title: "Comprar".to_string(),
                    description: "Quiero comprar un producto".to_string(),
                },
                ListRow {
                    id: "btnvender".to_string(),
                    title: "Vender".to_string(),
                    description: "Quiero vender un producto".to_string(),
                },
            ],
        }],
    }
}

pub fn confirm_yes() -> OutboundPayload {
    OutboundPayload::text("Excelente, registramos tu confirmación. ✅")
}

pub fn confirm_no() -> OutboundPayload {
    OutboundPayload::text("Entendido, no registramos tu asistencia.")
}

pub fn confirm_maybe() -> OutboundPayload {
    OutboundPayload::text("Avísanos cuando lo tengas claro. 🙂")
}

pub fn buy_followup() -> OutboundPayload {
    OutboundPayload::text("Perfecto, te enviaremos el catálogo de compra. 🛒")
}

pub fn sell_followup() -> OutboundPayload {
    OutboundPayload::text("Genial, un asesor de ventas te escribirá pronto. 💼")
}
