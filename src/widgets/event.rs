use serde::Deserialize;

use crate::command::Command;

/// Inbound WS message for a dropdown change
#[derive(Debug, Deserialize)]
pub struct SelectionChanged {
    pub widget: String,
    pub event: SelectionEvent,
}

/// Both payload shapes seen from the widgets. The panel sends
/// `target.value`, the card sends `detail.value`; neither is canonical
#[derive(Debug, Default, Deserialize)]
pub struct SelectionEvent {
    #[serde(default)]
    pub target: Option<ValuePayload>,
    #[serde(default)]
    pub detail: Option<ValuePayload>,
}

#[derive(Debug, Deserialize)]
pub struct ValuePayload {
    pub value: String,
}

impl SelectionEvent {
    pub fn value(&self) -> Option<&str> {
        self.detail
            .as_ref()
            .or(self.target.as_ref())
            .map(|p| p.value.as_str())
    }
}

/// At most one command per selection change. Re-picking the
/// shown option is a no-op
pub fn decide(entity_id: &str, current: Option<&str>, candidate: &str) -> Option<Command> {
    if current == Some(candidate) {
        return None;
    }
    Some(Command::select_option(entity_id, candidate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{SELECT_DOMAIN, SELECT_OPTION_ACTION};

    #[test]
    fn test_target_shape() {
        let msg: SelectionChanged = serde_json::from_str(
            r#"{"widget": "mi-select_living_room_tv_input", "event": {"target": {"value": "PS5"}}}"#,
        )
        .unwrap();
        assert_eq!(msg.event.value(), Some("PS5"));
    }

    #[test]
    fn test_detail_shape() {
        let msg: SelectionChanged =
            serde_json::from_str(r#"{"widget": "w0", "event": {"detail": {"value": "Apple TV"}}}"#)
                .unwrap();
        assert_eq!(msg.widget, "w0");
        assert_eq!(msg.event.value(), Some("Apple TV"));
    }

    #[test]
    fn test_both_shapes_same_command() {
        let target: SelectionChanged =
            serde_json::from_str(r#"{"widget": "w0", "event": {"target": {"value": "PS5"}}}"#)
                .unwrap();
        let detail: SelectionChanged =
            serde_json::from_str(r#"{"widget": "w0", "event": {"detail": {"value": "PS5"}}}"#)
                .unwrap();

        let a = decide("select.x", None, target.event.value().unwrap());
        let b = decide("select.x", None, detail.event.value().unwrap());
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_event() {
        let msg: SelectionChanged =
            serde_json::from_str(r#"{"widget": "w0", "event": {}}"#).unwrap();
        assert_eq!(msg.event.value(), None);
    }

    #[test]
    fn test_decide_unchanged_is_noop() {
        assert_eq!(decide("select.x", Some("PS5"), "PS5"), None);
    }

    #[test]
    fn test_decide_change_emits_one_command() {
        let cmd = decide("select.x", Some("PS5"), "Apple TV").unwrap();
        assert_eq!(cmd.domain, SELECT_DOMAIN);
        assert_eq!(cmd.action, SELECT_OPTION_ACTION);
        assert_eq!(cmd.entity_id, "select.x");
        assert_eq!(cmd.option, "Apple TV");
    }

    #[test]
    fn test_decide_no_current() {
        assert!(decide("select.x", None, "PS5").is_some());
    }
}
