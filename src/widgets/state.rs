use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::{matrix::api::MatrixStatus, state::CrossbarState};

use super::{Widgets, more_info};

/// One targeted DOM update. Absent fields leave the region alone
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionPatch {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

#[derive(Serialize)]
struct WSChangeBody<'a, T: ?Sized + Serialize> {
    pub header: &'a str,
    pub body: &'a T,
}

pub fn broadcast_changes_to_ws<T: ?Sized + Serialize>(widgets: &Widgets, header: &str, body: &T) {
    let json = serde_json::to_string(&WSChangeBody { header, body }).unwrap(); //FIXME ?
    let _ = widgets.on_change.send(json.into()); //ignore error (nobody is listening right now)
}

/// Fold a fresh poll into the snapshot store and patch every widget
/// showing an entity that changed
pub async fn on_matrix_status(istate: &Arc<CrossbarState>, status: MatrixStatus) {
    {
        let mut last = istate.matrix.status.lock().await;
        *last = Some(status.clone());
    }

    let fresh = istate.entities.snapshot_all(&status);
    let mut changed = Vec::new();
    {
        let mut snapshots = istate.snapshots.lock().await;
        for snap in fresh {
            let stale = snapshots
                .get(&snap.entity_id)
                .map_or(true, |old| !old.view_eq(&snap));
            if stale {
                snapshots.insert(snap.entity_id.clone(), snap.clone());
                changed.push(snap);
            }
        }
    }

    if changed.is_empty() {
        return;
    }
    debug!("{} entities changed", changed.len());

    let mut patches = Vec::new();
    for snap in &changed {
        for idx in istate.widgets.observers_of(&snap.entity_id) {
            patches.extend(istate.widgets.cards[*idx].patches(Some(snap)));
        }
        patches.extend(more_info::patches_for(snap));
    }

    broadcast_changes_to_ws(&istate.widgets, "states", &patches);
}

pub async fn on_connection(istate: &Arc<CrossbarState>, connected: bool) {
    let mut flag = istate.matrix.connected.lock().await;
    *flag = connected;
}
