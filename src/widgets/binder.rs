use serde::Serialize;

use crate::{config::CardConfig, entity::EntitySnapshot};

pub const FALLBACK_LABEL: &str = "HDMI Matrix";
pub const FALLBACK_VALUE: &str = "None";
pub const NOT_FOUND: &str = "Entity not found";

/// What a widget actually draws, independent of where the data came from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewModel {
    pub device_label: String,
    pub selected: Option<String>,
    pub options: Vec<String>,
}

impl ViewModel {
    pub fn selected_text(&self) -> &str {
        self.selected.as_deref().unwrap_or(FALLBACK_VALUE)
    }
}

/// Panel binding. None means the entity has never reported
/// and the caller renders the not-found placeholder
pub fn bind(snapshot: Option<&EntitySnapshot>) -> Option<ViewModel> {
    snapshot.map(bind_snapshot)
}

pub fn bind_snapshot(snapshot: &EntitySnapshot) -> ViewModel {
    ViewModel {
        device_label: snapshot
            .friendly_name
            .clone()
            .unwrap_or_else(|| FALLBACK_LABEL.to_string()),
        selected: snapshot.current_value.clone(),
        options: snapshot.options.clone(),
    }
}

/// Card binding. Live snapshots win; the card config's
/// options/value only cover the time before the first poll
pub fn bind_card(cfg: &CardConfig, snapshot: Option<&EntitySnapshot>) -> ViewModel {
    let device_label = cfg
        .device_name
        .clone()
        .or_else(|| snapshot.and_then(|s| s.friendly_name.clone()))
        .unwrap_or_else(|| FALLBACK_LABEL.to_string());

    match snapshot {
        Some(s) => ViewModel {
            device_label,
            selected: s.current_value.clone(),
            options: s.options.clone(),
        },
        None => ViewModel {
            device_label,
            selected: cfg.value.clone(),
            options: cfg.options.clone().unwrap_or_default(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::Timestamp;

    fn snapshot() -> EntitySnapshot {
        EntitySnapshot {
            entity_id: "select.living_room_tv_input".to_string(),
            current_value: Some("PS5".to_string()),
            options: vec!["Apple TV".to_string(), "PS5".to_string()],
            friendly_name: Some("Living Room TV Input".to_string()),
            updated_at: Timestamp::UNIX_EPOCH,
        }
    }

    fn card_cfg() -> CardConfig {
        CardConfig {
            r#type: "matrix-card".to_string(),
            entity: "select.living_room_tv_input".to_string(),
            options: Some(vec!["Fallback A".to_string()]),
            value: Some("Fallback A".to_string()),
            device_name: None,
            name: None,
        }
    }

    #[test]
    fn test_bind_missing_snapshot() {
        assert_eq!(bind(None), None);
    }

    #[test]
    fn test_bind_maps_snapshot() {
        let vm = bind(Some(&snapshot())).unwrap();
        assert_eq!(vm.device_label, "Living Room TV Input");
        assert_eq!(vm.selected.as_deref(), Some("PS5"));
        assert_eq!(vm.options.len(), 2);
    }

    #[test]
    fn test_bind_label_fallback() {
        let mut s = snapshot();
        s.friendly_name = None;
        let vm = bind(Some(&s)).unwrap();
        assert_eq!(vm.device_label, FALLBACK_LABEL);
    }

    #[test]
    fn test_selected_text_fallback() {
        let mut s = snapshot();
        s.current_value = None;
        let vm = bind(Some(&s)).unwrap();
        assert_eq!(vm.selected, None);
        assert_eq!(vm.selected_text(), FALLBACK_VALUE);
    }

    #[test]
    fn test_bind_card_prefers_snapshot() {
        let vm = bind_card(&card_cfg(), Some(&snapshot()));
        assert_eq!(vm.selected.as_deref(), Some("PS5"));
        assert_eq!(vm.options, vec!["Apple TV", "PS5"]);
    }

    #[test]
    fn test_bind_card_config_before_first_poll() {
        let vm = bind_card(&card_cfg(), None);
        assert_eq!(vm.selected.as_deref(), Some("Fallback A"));
        assert_eq!(vm.options, vec!["Fallback A"]);
        assert_eq!(vm.device_label, FALLBACK_LABEL);
    }

    #[test]
    fn test_bind_card_device_name_precedence() {
        let mut cfg = card_cfg();
        cfg.device_name = Some("OREI Matrix".to_string());
        let vm = bind_card(&cfg, Some(&snapshot()));
        assert_eq!(vm.device_label, "OREI Matrix");

        cfg.device_name = None;
        let vm = bind_card(&cfg, Some(&snapshot()));
        assert_eq!(vm.device_label, "Living Room TV Input");
    }
}
