pub mod binder;
pub mod card;
pub mod error;
pub mod event;
pub mod more_info;
pub mod state;

use std::collections::HashMap;

use axum::extract::ws::Utf8Bytes;
use binder::ViewModel;
use card::CardWidget;
use error::WidgetsInitError;
use maud::{Markup, html};
use more_info::MoreInfoWidget;
use serde::Serialize;
use state::RegionPatch;
use tokio::sync::broadcast;
use tracing::{Level, info, span, warn};

use crate::{
    config::CardConfig,
    entity::{Entities, EntitySnapshot},
};

pub type WidgetBuilder = fn(String, CardConfig) -> Result<Widget, WidgetsInitError>;

/// Card picker metadata
#[derive(Debug, Clone, Serialize)]
pub struct CardMeta {
    pub r#type: &'static str,
    pub name: &'static str,
    pub preview: bool,
    pub description: &'static str,
}

/// type name -> constructor. Widgets register themselves here,
/// the host only ever instantiates by name
#[derive(Default)]
pub struct WidgetRegistry {
    builders: HashMap<&'static str, WidgetBuilder>,
    catalog: Vec<CardMeta>,
}

impl WidgetRegistry {
    pub fn add(&mut self, type_name: &'static str, builder: WidgetBuilder, meta: Option<CardMeta>) {
        self.builders.insert(type_name, builder);
        if let Some(meta) = meta {
            self.catalog.push(meta);
        }
    }

    pub fn build(&self, wid: String, cfg: CardConfig) -> Result<Widget, WidgetsInitError> {
        let builder = self
            .builders
            .get(cfg.r#type.as_str())
            .ok_or_else(|| WidgetsInitError::UnknownType(cfg.r#type.clone()))?;
        builder(wid, cfg)
    }

    pub fn catalog(&self) -> &[CardMeta] {
        &self.catalog
    }
}

pub fn default_registry() -> WidgetRegistry {
    let mut reg = WidgetRegistry::default();
    card::register(&mut reg);
    more_info::register(&mut reg);
    reg
}

pub enum Widget {
    Card(CardWidget),
    MoreInfo(MoreInfoWidget),
}

impl Widget {
    pub fn wid(&self) -> &str {
        match self {
            Self::Card(w) => w.wid(),
            Self::MoreInfo(w) => w.wid(),
        }
    }

    pub fn entity_id(&self) -> &str {
        match self {
            Self::Card(w) => w.entity_id(),
            Self::MoreInfo(w) => w.entity_id(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Card(_) => card::CARD_TYPE,
            Self::MoreInfo(_) => more_info::MORE_INFO_TYPE,
        }
    }

    /// Full subtree, built once per page load
    pub fn render(&self, snapshot: Option<&EntitySnapshot>) -> Markup {
        match self {
            Self::Card(w) => w.render(snapshot),
            Self::MoreInfo(w) => w.render(snapshot),
        }
    }

    /// Targeted updates for an already-rendered subtree
    pub fn patches(&self, snapshot: Option<&EntitySnapshot>) -> Vec<RegionPatch> {
        match self {
            Self::Card(w) => w.patches(snapshot),
            Self::MoreInfo(w) => w.patches(snapshot),
        }
    }

    /// The option a viewer currently sees, the no-op comparison base
    pub fn selected(&self, snapshot: Option<&EntitySnapshot>) -> Option<String> {
        match self {
            Self::Card(w) => binder::bind_card(w.cfg(), snapshot).selected,
            Self::MoreInfo(_) => binder::bind(snapshot).and_then(|vm| vm.selected),
        }
    }
}

pub struct Widgets {
    pub registry: WidgetRegistry,
    /// dashboard cards, in config order
    pub cards: Vec<Widget>,
    /// entity_id -> indexes into `cards`
    observers: HashMap<String, Vec<usize>>,
    /// widget id -> entity_id, covers cards and panels
    wid_lut: HashMap<String, String>,
    /// broadcast JSON of changed widget regions
    pub on_change: broadcast::Sender<Utf8Bytes>,
}

impl Widgets {
    pub fn init(dashboard: Vec<CardConfig>, entities: &Entities) -> Result<Self, WidgetsInitError> {
        let span = span!(Level::INFO, "Widgets");
        let _enter = span.enter();
        info!("initializing");

        let registry = default_registry();
        let mut cards = Vec::with_capacity(dashboard.len());
        let mut observers: HashMap<String, Vec<usize>> = HashMap::new();
        let mut wid_lut = HashMap::new();

        for (idx, cfg) in dashboard.into_iter().enumerate() {
            let wid = format!("w{idx}");
            let widget = registry.build(wid.clone(), cfg)?;
            let entity_id = widget.entity_id().to_string();
            if entities.get(&entity_id).is_none() {
                // soft: the card renders from its own config until the entity shows up
                warn!("card {wid} references unknown entity `{entity_id}`");
            }
            observers.entry(entity_id.clone()).or_default().push(idx);
            wid_lut.insert(wid, entity_id);
            cards.push(widget);
        }

        // panels exist per entity without any config
        for entity in &entities.all {
            wid_lut.insert(more_info::wid(&entity.entity_id), entity.entity_id.clone());
        }

        Ok(Self {
            registry,
            cards,
            observers,
            wid_lut,
            on_change: broadcast::Sender::new(20), //FIXME size??
        })
    }

    pub fn entity_of(&self, wid: &str) -> Option<&str> {
        self.wid_lut.get(wid).map(String::as_str)
    }

    pub fn find_card(&self, wid: &str) -> Option<&Widget> {
        self.cards.iter().find(|w| w.wid() == wid)
    }

    pub fn observers_of(&self, entity_id: &str) -> &[usize] {
        self.observers
            .get(entity_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// What `wid` is showing right now: the card's bound view, or the
    /// raw snapshot for panels. Dispatch compares incoming picks
    /// against this, not against the store
    pub fn shown(
        &self,
        snapshots: &HashMap<String, EntitySnapshot>,
        wid: &str,
        entity_id: &str,
    ) -> Option<String> {
        let snapshot = snapshots.get(entity_id);
        match self.find_card(wid) {
            Some(widget) => widget.selected(snapshot),
            None => snapshot.and_then(|s| s.current_value.clone()),
        }
    }
}

/// Option list shared by every dropdown
pub(crate) fn render_options(vm: &ViewModel) -> Markup {
    html! {
        @for opt in &vm.options {
            option value=(opt) selected[vm.selected.as_deref() == Some(opt.as_str())] {
                (opt)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::CrossbarConfig, matrix::api::MatrixStatus};

    fn entities() -> Entities {
        let cfg = CrossbarConfig::parse(
            r#"(
                version: 0.1,
                matrix: (host: "10.0.0.2"),
                inputs: {1: (name: "Apple TV"), 2: (name: "PS5")},
                outputs: {1: (name: "Living Room TV")},
            )"#,
        )
        .unwrap();
        Entities::init(&cfg)
    }

    /// One poll's worth of snapshots, living room on Apple TV
    fn snapshots() -> HashMap<String, EntitySnapshot> {
        let status = MatrixStatus {
            power: 1,
            source_mapping: vec![1, 0, 0, 0, 0, 0, 0, 0],
            input_names: Vec::new(),
            output_names: Vec::new(),
            preset_names: Vec::new(),
        };
        entities()
            .snapshot_all(&status)
            .into_iter()
            .map(|s| (s.entity_id.clone(), s))
            .collect()
    }

    fn card_cfg(entity: &str) -> CardConfig {
        CardConfig {
            r#type: "matrix-card".to_string(),
            entity: entity.to_string(),
            options: None,
            value: None,
            device_name: None,
            name: None,
        }
    }

    #[test]
    fn test_init_builds_cards_and_lut() {
        let widgets = Widgets::init(
            vec![card_cfg("select.living_room_tv_input")],
            &entities(),
        )
        .unwrap();
        assert_eq!(widgets.cards.len(), 1);
        assert_eq!(
            widgets.entity_of("w0"),
            Some("select.living_room_tv_input")
        );
        assert_eq!(widgets.observers_of("select.living_room_tv_input"), &[0]);
        // panel pre-registered for every entity
        assert_eq!(
            widgets.entity_of("mi-select_living_room_tv_input"),
            Some("select.living_room_tv_input")
        );
    }

    #[test]
    fn test_unknown_type_rejected() {
        let mut cfg = card_cfg("select.living_room_tv_input");
        cfg.r#type = "gauge-card".to_string();
        let res = Widgets::init(vec![cfg], &entities());
        assert!(matches!(res, Err(WidgetsInitError::UnknownType(t)) if t == "gauge-card"));
    }

    #[test]
    fn test_missing_entity_rejected() {
        let res = Widgets::init(vec![card_cfg("")], &entities());
        assert!(matches!(res, Err(WidgetsInitError::MissingEntity)));
    }

    #[test]
    fn test_unknown_entity_is_soft() {
        let widgets = Widgets::init(vec![card_cfg("select.nope")], &entities()).unwrap();
        assert_eq!(widgets.cards.len(), 1);
    }

    #[test]
    fn test_catalog_lists_card_only() {
        let reg = default_registry();
        let catalog = reg.catalog();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].r#type, card::CARD_TYPE);
        assert_eq!(catalog[0].name, "OREI HDMI Matrix");
        assert!(!catalog[0].preview);
    }

    #[test]
    fn test_registry_builds_panel_by_name() {
        let reg = default_registry();
        let cfg = more_info::panel_config("select.living_room_tv_input");
        let widget = reg.build("mi-test".to_string(), cfg).unwrap();
        assert!(matches!(widget, Widget::MoreInfo(_)));
        assert_eq!(widget.entity_id(), "select.living_room_tv_input");
    }

    #[test]
    fn test_shown_card_falls_back_to_config() {
        let mut cfg = card_cfg("select.living_room_tv_input");
        cfg.options = Some(vec!["Apple TV".to_string(), "PS5".to_string()]);
        cfg.value = Some("PS5".to_string());
        let widgets = Widgets::init(vec![cfg], &entities()).unwrap();

        // before the first poll the card shows its configured value
        assert_eq!(
            widgets
                .shown(&HashMap::new(), "w0", "select.living_room_tv_input")
                .as_deref(),
            Some("PS5")
        );
        // once a snapshot lands it wins
        assert_eq!(
            widgets
                .shown(&snapshots(), "w0", "select.living_room_tv_input")
                .as_deref(),
            Some("Apple TV")
        );
    }

    #[test]
    fn test_shown_panel_reads_snapshot() {
        let widgets = Widgets::init(Vec::new(), &entities()).unwrap();
        let wid = more_info::wid("select.living_room_tv_input");
        assert_eq!(
            widgets
                .shown(&snapshots(), &wid, "select.living_room_tv_input")
                .as_deref(),
            Some("Apple TV")
        );
        // nothing to compare against before the first poll
        assert_eq!(
            widgets.shown(&HashMap::new(), &wid, "select.living_room_tv_input"),
            None
        );
    }

    #[test]
    fn test_shown_feeds_the_noop_check() {
        let mut cfg = card_cfg("select.living_room_tv_input");
        cfg.value = Some("PS5".to_string());
        let widgets = Widgets::init(vec![cfg], &entities()).unwrap();
        let current = widgets.shown(&HashMap::new(), "w0", "select.living_room_tv_input");

        // re-picking what the card already shows is dropped
        assert_eq!(
            event::decide("select.living_room_tv_input", current.as_deref(), "PS5"),
            None
        );
        // a different pick goes through
        assert!(
            event::decide("select.living_room_tv_input", current.as_deref(), "Apple TV").is_some()
        );
    }
}
