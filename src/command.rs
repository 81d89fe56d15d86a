use serde::Serialize;

pub const SELECT_DOMAIN: &str = "select";
pub const SELECT_OPTION_ACTION: &str = "select_option";

/// Service call produced by a widget selection (or the CLI).
/// Only `select.select_option` exists today, but the domain/action
/// pair stays on the struct so logs and clients see the full call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Command {
    pub domain: &'static str,
    pub action: &'static str,
    pub entity_id: String,
    pub option: String,
}

impl Command {
    pub fn select_option(entity_id: impl Into<String>, option: impl Into<String>) -> Self {
        Self {
            domain: SELECT_DOMAIN,
            action: SELECT_OPTION_ACTION,
            entity_id: entity_id.into(),
            option: option.into(),
        }
    }
}
