use maud::{Markup, html};

use crate::{
    config::CardConfig,
    entity::{EntitySnapshot, select::slugify},
};

use super::{
    Widget, WidgetRegistry, binder, error::WidgetsInitError, render_options, state::RegionPatch,
};

pub const MORE_INFO_TYPE: &str = "more-info-select";

pub(super) fn register(reg: &mut WidgetRegistry) {
    // not in the card picker catalog, only instantiable by name
    reg.add(MORE_INFO_TYPE, build, None);
}

fn build(wid: String, cfg: CardConfig) -> Result<Widget, WidgetsInitError> {
    if cfg.entity.is_empty() {
        return Err(WidgetsInitError::MissingEntity);
    }
    Ok(Widget::MoreInfo(MoreInfoWidget { wid, cfg }))
}

/// Widget id for the panel bound to an entity
pub fn wid(entity_id: &str) -> String {
    format!("mi-{}", slugify(entity_id))
}

/// Minimal config the panel route synthesizes per request
pub fn panel_config(entity_id: &str) -> CardConfig {
    CardConfig {
        r#type: MORE_INFO_TYPE.to_string(),
        entity: entity_id.to_string(),
        options: None,
        value: None,
        device_name: None,
        name: None,
    }
}

/// Region updates for any open panel on this entity. Panels are
/// built per request, so this works off the snapshot alone
pub fn patches_for(snapshot: &EntitySnapshot) -> Vec<RegionPatch> {
    let vm = binder::bind_snapshot(snapshot);
    let wid = wid(&snapshot.entity_id);
    vec![
        RegionPatch {
            id: format!("{wid}-select"),
            text: None,
            value: vm.selected.clone(),
            options: Some(vm.options.clone()),
        },
        RegionPatch {
            id: format!("{wid}-current"),
            text: Some(vm.selected_text().to_string()),
            value: None,
            options: None,
        },
    ]
}

/// More-info panel: dropdown plus device and current-input rows
pub struct MoreInfoWidget {
    wid: String,
    cfg: CardConfig,
}

impl MoreInfoWidget {
    pub fn wid(&self) -> &str {
        &self.wid
    }

    pub fn entity_id(&self) -> &str {
        &self.cfg.entity
    }

    pub fn render(&self, snapshot: Option<&EntitySnapshot>) -> Markup {
        let Some(vm) = binder::bind(snapshot) else {
            return html! {
                div class="container" id=(self.wid) { (binder::NOT_FOUND) }
            };
        };

        html! {
            div class="container" id=(self.wid) {
                div class="input-selector" {
                    div class="label" { "Select Input:" }
                    select class="selector" id={ (self.wid) "-select" }
                        onchange={ "panelChanged(event, '" (self.wid) "')" } {
                        (render_options(&vm))
                    }
                }
                div class="device-info" {
                    span class="info-label" { "Device:" }
                    span class="info-value" { (vm.device_label) }
                }
                div class="device-info" {
                    span class="info-label" { "Current Input:" }
                    span class="info-value" id={ (self.wid) "-current" } {
                        (vm.selected_text())
                    }
                }
            }
        }
    }

    pub fn patches(&self, snapshot: Option<&EntitySnapshot>) -> Vec<RegionPatch> {
        match snapshot {
            Some(s) => patches_for(s),
            None => Vec::new(),
        }
    }
}
