use maud::{Markup, html};

use crate::{config::CardConfig, entity::EntitySnapshot};

use super::{
    CardMeta, Widget, WidgetRegistry, binder, error::WidgetsInitError, render_options,
    state::RegionPatch,
};

pub const CARD_TYPE: &str = "matrix-card";

pub(super) fn register(reg: &mut WidgetRegistry) {
    reg.add(
        CARD_TYPE,
        build,
        Some(CardMeta {
            r#type: CARD_TYPE,
            name: "OREI HDMI Matrix",
            preview: false,
            description: "Card for OREI HDMI matrix input selection",
        }),
    );
}

fn build(wid: String, cfg: CardConfig) -> Result<Widget, WidgetsInitError> {
    if cfg.entity.is_empty() {
        return Err(WidgetsInitError::MissingEntity);
    }
    Ok(Widget::Card(CardWidget { wid, cfg }))
}

/// Dashboard card with a dropdown plus current-input and device rows
pub struct CardWidget {
    wid: String,
    cfg: CardConfig,
}

impl CardWidget {
    pub fn wid(&self) -> &str {
        &self.wid
    }

    pub fn entity_id(&self) -> &str {
        &self.cfg.entity
    }

    pub(super) fn cfg(&self) -> &CardConfig {
        &self.cfg
    }

    pub fn render(&self, snapshot: Option<&EntitySnapshot>) -> Markup {
        let vm = binder::bind_card(&self.cfg, snapshot);
        let header = self.cfg.name.as_deref().unwrap_or("HDMI Matrix Control");

        html! {
            div class="card" id=(self.wid) {
                h2 class="card-header" { (header) }
                div class="card-content" {
                    div class="input-selector" {
                        select id={ (self.wid) "-select" }
                            onchange={ "cardChanged(event, '" (self.wid) "')" } {
                            (render_options(&vm))
                        }
                    }
                    div class="status-info" {
                        div class="status-row" {
                            span class="label" { "Current Input:" }
                            span class="value" id={ (self.wid) "-current" } {
                                (vm.selected_text())
                            }
                        }
                        div class="status-row" {
                            span class="label" { "Device:" }
                            span class="value" { (vm.device_label) }
                        }
                    }
                }
            }
        }
    }

    pub fn patches(&self, snapshot: Option<&EntitySnapshot>) -> Vec<RegionPatch> {
        let vm = binder::bind_card(&self.cfg, snapshot);
        vec![
            RegionPatch {
                id: format!("{}-select", self.wid),
                text: None,
                value: vm.selected.clone(),
                options: Some(vm.options.clone()),
            },
            RegionPatch {
                id: format!("{}-current", self.wid),
                text: Some(vm.selected_text().to_string()),
                value: None,
                options: None,
            },
        ]
    }
}
