pub mod select;

use std::collections::HashMap;

use jiff::Timestamp;
use select::SelectEntity;
use tokio::sync::Mutex;
use tracing::{Level, info, span};

use crate::{
    config::CrossbarConfig,
    matrix::api::{MatrixStatus, NUM_INPUTS},
};

/// Point-in-time state of one select entity
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySnapshot {
    pub entity_id: String,
    /// None while the routed input is unknown or out of range
    pub current_value: Option<String>,
    pub options: Vec<String>,
    pub friendly_name: Option<String>,
    pub updated_at: Timestamp,
}

impl EntitySnapshot {
    /// Equality ignoring the poll timestamp
    pub fn view_eq(&self, other: &Self) -> bool {
        self.current_value == other.current_value
            && self.options == other.options
            && self.friendly_name == other.friendly_name
    }
}

/// entity_id -> last snapshot, empty until the first successful poll
pub type SnapshotsLock = Mutex<HashMap<String, EntitySnapshot>>;

pub struct Entities {
    /// enabled outputs, in output order
    pub all: Vec<SelectEntity>,
    /// entity_id -> index into `all`
    id_lut: HashMap<String, usize>,
    /// input number - 1 -> display name
    input_names: Vec<String>,
}

impl Entities {
    pub fn init(cfg: &CrossbarConfig) -> Self {
        let span = span!(Level::INFO, "Entities");
        let _enter = span.enter();
        info!("initializing");

        let all = select::build(cfg);
        let mut id_lut = HashMap::new();
        for (idx, entity) in all.iter().enumerate() {
            id_lut.insert(entity.entity_id.clone(), idx);
        }

        let input_names = (1..=NUM_INPUTS)
            .map(|num| select::input_name(cfg, num))
            .collect();

        info!("built {} select entities", all.len());
        Self {
            all,
            id_lut,
            input_names,
        }
    }

    pub fn get(&self, entity_id: &str) -> Option<&SelectEntity> {
        self.id_lut.get(entity_id).map(|idx| &self.all[*idx])
    }

    pub fn input_names(&self) -> &[String] {
        &self.input_names
    }

    /// 1-based, None when out of range
    pub fn input_name(&self, num: i64) -> Option<&str> {
        if num < 1 || num > self.input_names.len() as i64 {
            return None;
        }
        Some(&self.input_names[num as usize - 1])
    }

    /// Option name -> input number, first match wins
    pub fn resolve_option(&self, option: &str) -> Option<u8> {
        self.input_names
            .iter()
            .position(|name| name == option)
            .map(|idx| idx as u8 + 1)
    }

    /// Derive fresh snapshots for every entity from a matrix status
    pub fn snapshot_all(&self, status: &MatrixStatus) -> Vec<EntitySnapshot> {
        let now = Timestamp::now();
        self.all
            .iter()
            .map(|entity| self.snapshot(entity, status, now))
            .collect()
    }

    fn snapshot(&self, entity: &SelectEntity, status: &MatrixStatus, now: Timestamp) -> EntitySnapshot {
        let current_value = status
            .source_mapping
            .get(entity.output as usize - 1)
            .and_then(|input| self.input_name(*input))
            .map(str::to_string);

        EntitySnapshot {
            entity_id: entity.entity_id.clone(),
            current_value,
            options: entity.options.clone(),
            friendly_name: Some(entity.friendly_name.clone()),
            updated_at: now,
        }
    }
}
