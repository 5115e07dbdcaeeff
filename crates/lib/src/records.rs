//! Natural-language record commands over the event log.
//!
//! Classifies free text into SHOW / ADD / UNRECOGNIZED by substring keyword
//! test and executes the action. Always returns a human-readable string; a
//! storage failure becomes a user-facing error line, never an Err.

use crate::storage::EventLog;
use std::sync::Arc;

/// How many records a SHOW returns.
const SHOW_LIMIT: usize = 5;

/// The data-action resolved from query-keyword text. The keyword sets here
/// are fixed and narrower than the router's configurable list, which is what
/// makes Unrecognized reachable (e.g. "buscar").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordAction {
    Show,
    Add,
    Unrecognized,
}

/// Substring classification; SHOW keywords are tested before ADD keywords.
pub fn classify_action(text: &str) -> RecordAction {
    if text.contains("mostrar") || text.contains("ver") {
        RecordAction::Show
    } else if text.contains("agregar") || text.contains("añadir") {
        RecordAction::Add
    } else {
        RecordAction::Unrecognized
    }
}

/// Record-query interpreter bound to an event log.
pub struct Records {
    log: Arc<dyn EventLog>,
}

impl Records {
    pub fn new(log: Arc<dyn EventLog>) -> Self {
        Self { log }
    }

    /// Interpret one (already lowercased) message and return the reply text.
    pub fn interpret(&self, text: &str) -> String {
        match classify_action(text) {
            RecordAction::Show => match self.log.recent(SHOW_LIMIT) {
                Ok(records) if records.is_empty() => {
                    "No hay registros todavía.".to_string()
                }
                Ok(records) => {
                    let lines: Vec<String> = records
                        .iter()
                        .map(|r| {
                            format!("{} - {}", r.timestamp.format("%Y-%m-%d %H:%M"), r.text)
                        })
                        .collect();
                    format!("Últimos registros:\n{}", lines.join("\n"))
                }
                Err(e) => {
                    log::warn!("records: show failed: {}", e);
                    format!("❌ Error al procesar la consulta: {}", e)
                }
            },
            // ADD stores the entire input string, not a parsed payload.
            RecordAction::Add => match self.log.append(text) {
                Ok(_) => "✅ Registro agregado correctamente".to_string(),
                Err(e) => {
                    log::warn!("records: add failed: {}", e);
                    format!("❌ Error al procesar la consulta: {}", e)
                }
            },
            RecordAction::Unrecognized => {
                "No entendí el comando. Prueba con «mostrar» o «agregar».".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{LogRecord, SqliteEventLog, StorageError};

    struct FailingLog;

    impl EventLog for FailingLog {
        fn append(&self, _text: &str) -> Result<LogRecord, StorageError> {
            Err(StorageError::Unavailable("disk full".to_string()))
        }

        fn recent(&self, _n: usize) -> Result<Vec<LogRecord>, StorageError> {
            Err(StorageError::Unavailable("disk full".to_string()))
        }
    }

    fn records() -> Records {
        Records::new(Arc::new(SqliteEventLog::in_memory().unwrap()))
    }

    #[test]
    fn classify_show_before_add() {
        assert_eq!(classify_action("mostrar registros"), RecordAction::Show);
        assert_eq!(classify_action("quiero ver todo"), RecordAction::Show);
        assert_eq!(classify_action("agregar nota"), RecordAction::Add);
        assert_eq!(classify_action("añadir nota"), RecordAction::Add);
        assert_eq!(classify_action("buscar algo"), RecordAction::Unrecognized);
        // SHOW keywords win when both appear.
        assert_eq!(classify_action("agregar y ver"), RecordAction::Show);
    }

    #[test]
    fn show_on_empty_log() {
        assert_eq!(records().interpret("mostrar"), "No hay registros todavía.");
    }

    #[test]
    fn add_then_show_round_trips() {
        let r = records();
        assert_eq!(
            r.interpret("agregar recordar la cita"),
            "✅ Registro agregado correctamente"
        );
        let out = r.interpret("mostrar registros");
        assert!(out.starts_with("Últimos registros:\n"));
        assert!(out.contains("agregar recordar la cita"));
    }

    #[test]
    fn show_caps_at_five_newest_first() {
        let r = records();
        for i in 0..7 {
            r.interpret(&format!("agregar nota {}", i));
        }
        let out = r.interpret("ver");
        let lines: Vec<&str> = out.lines().collect();
        // Header plus five records.
        assert_eq!(lines.len(), 6);
        assert!(lines[1].ends_with("agregar nota 6"));
        assert!(lines[5].ends_with("agregar nota 2"));
    }

    #[test]
    fn unrecognized_returns_fixed_string() {
        let out = records().interpret("dime algo");
        assert!(out.starts_with("No entendí el comando"));
    }

    #[test]
    fn storage_error_becomes_user_string() {
        let r = Records::new(Arc::new(FailingLog));
        let show = r.interpret("mostrar");
        assert!(show.starts_with("❌ Error al procesar la consulta:"));
        let add = r.interpret("agregar x");
        assert!(add.starts_with("❌ Error al procesar la consulta:"));
    }
}
