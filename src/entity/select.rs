use crate::{
    config::CrossbarConfig,
    matrix::api::{NUM_INPUTS, NUM_OUTPUTS},
};

/// One dropdown entity bound to a matrix output
#[derive(Debug, Clone, PartialEq)]
pub struct SelectEntity {
    pub entity_id: String,
    /// 1-based matrix output
    pub output: u8,
    /// "{output name} Input"
    pub friendly_name: String,
    /// output name, shown as the device row
    pub device_name: String,
    /// selectable input names, in configured order
    pub options: Vec<String>,
}

/// One entity per output unless the output is disabled.
/// Unconfigured outputs still get one, with default names.
pub fn build(cfg: &CrossbarConfig) -> Vec<SelectEntity> {
    let mut entities = Vec::new();
    for output in 1..=NUM_OUTPUTS {
        if let Some(out_cfg) = cfg.outputs.get(&output) {
            if !out_cfg.enabled {
                continue;
            }
        }

        let name = output_name(cfg, output);
        entities.push(SelectEntity {
            entity_id: format!("select.{}", slugify(&format!("{name} Input"))),
            output,
            friendly_name: format!("{name} Input"),
            device_name: name,
            options: build_options(cfg, output),
        });
    }
    entities
}

fn build_options(cfg: &CrossbarConfig, output: u8) -> Vec<String> {
    let available: Vec<u8> = cfg
        .outputs
        .get(&output)
        .and_then(|out| out.available_inputs.clone())
        .unwrap_or_else(|| (1..=NUM_INPUTS).collect());

    let mut options = Vec::new();
    for input in available {
        let enabled = cfg.inputs.get(&input).map_or(true, |i| i.enabled);
        if enabled {
            options.push(input_name(cfg, input));
        }
    }
    options
}

pub fn input_name(cfg: &CrossbarConfig, num: u8) -> String {
    match cfg.inputs.get(&num) {
        Some(input) => input.name.clone(),
        None => format!("Input {num}"),
    }
}

pub fn output_name(cfg: &CrossbarConfig, num: u8) -> String {
    match cfg.outputs.get(&num) {
        Some(output) => output.name.clone(),
        None => format!("Output {num}"),
    }
}

/// Lowercase with runs of non-alphanumerics collapsed to `_`
pub fn slugify(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_sep = true;
    for c in s.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            last_sep = false;
        } else if !last_sep {
            out.push('_');
            last_sep = true;
        }
    }
    if out.ends_with('_') {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{entity::Entities, matrix::api::MatrixStatus};

    fn sample_config() -> CrossbarConfig {
        CrossbarConfig::parse(
            r#"(
                version: 0.1,
                matrix: (host: "10.0.0.2"),
                inputs: {
                    1: (name: "Apple TV"),
                    2: (name: "PS5"),
                    3: (name: "Cable Box", enabled: false),
                },
                outputs: {
                    1: (name: "Living Room TV", available_inputs: [2, 1, 3]),
                    2: (name: "Bedroom TV"),
                    3: (name: "Patio TV", enabled: false),
                },
            )"#,
        )
        .unwrap()
    }

    fn sample_status() -> MatrixStatus {
        MatrixStatus {
            power: 1,
            source_mapping: vec![2, 0, 1, 9, 1, 1, 1, 1],
            input_names: Vec::new(),
            output_names: Vec::new(),
            preset_names: Vec::new(),
        }
    }

    #[test]
    fn test_build_skips_disabled_outputs() {
        let entities = build(&sample_config());
        assert_eq!(entities.len(), 7);
        assert!(entities.iter().all(|e| e.output != 3));
    }

    #[test]
    fn test_build_ids_and_names() {
        let entities = build(&sample_config());
        assert_eq!(entities[0].entity_id, "select.living_room_tv_input");
        assert_eq!(entities[0].friendly_name, "Living Room TV Input");
        assert_eq!(entities[0].device_name, "Living Room TV");

        // unconfigured outputs fall back to defaults
        let out4 = entities.iter().find(|e| e.output == 4).unwrap();
        assert_eq!(out4.entity_id, "select.output_4_input");
        assert_eq!(out4.friendly_name, "Output 4 Input");
    }

    #[test]
    fn test_options_follow_config_order_and_enabled() {
        let entities = build(&sample_config());
        // available [2, 1, 3], input 3 disabled
        assert_eq!(entities[0].options, vec!["PS5", "Apple TV"]);
        // no available_inputs = all eight, minus disabled
        let bedroom = entities.iter().find(|e| e.output == 2).unwrap();
        assert_eq!(
            bedroom.options,
            vec![
                "Apple TV", "PS5", "Input 4", "Input 5", "Input 6", "Input 7", "Input 8"
            ]
        );
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Living Room TV Input"), "living_room_tv_input");
        assert_eq!(slugify("  A--B  "), "a_b");
        assert_eq!(slugify("Output 4"), "output_4");
    }

    #[test]
    fn test_snapshot_current_value() {
        let cfg = sample_config();
        let entities = Entities::init(&cfg);
        let snaps = entities.snapshot_all(&sample_status());

        let by_id = |id: &str| snaps.iter().find(|s| s.entity_id == id).unwrap();
        // output 1 routed to input 2
        assert_eq!(
            by_id("select.living_room_tv_input").current_value.as_deref(),
            Some("PS5")
        );
        // 0 = nothing routed
        assert_eq!(by_id("select.bedroom_tv_input").current_value, None);
        // out of range input
        assert_eq!(by_id("select.output_4_input").current_value, None);
    }

    #[test]
    fn test_snapshot_disabled_input_still_named() {
        let cfg = sample_config();
        let entities = Entities::init(&cfg);
        let mut status = sample_status();
        status.source_mapping[0] = 3;
        let snaps = entities.snapshot_all(&status);
        assert_eq!(snaps[0].current_value.as_deref(), Some("Cable Box"));
    }

    #[test]
    fn test_resolve_option() {
        let entities = Entities::init(&sample_config());
        assert_eq!(entities.resolve_option("Apple TV"), Some(1));
        assert_eq!(entities.resolve_option("Input 5"), Some(5));
        assert_eq!(entities.resolve_option("Cable Box"), Some(3));
        assert_eq!(entities.resolve_option("Unknown"), None);
    }

    #[test]
    fn test_entities_lookup() {
        let entities = Entities::init(&sample_config());
        assert!(entities.get("select.living_room_tv_input").is_some());
        assert!(entities.get("select.patio_tv_input").is_none());
        assert_eq!(entities.input_name(2), Some("PS5"));
        assert_eq!(entities.input_name(0), None);
        assert_eq!(entities.input_name(9), None);
    }
}
