use std::{collections::HashMap, error::Error, sync::Arc};

use tokio::sync::{Mutex, mpsc, oneshot};
use tracing::{Instrument, Level, info, span};

use crate::{
    config::CrossbarConfig,
    entity::{Entities, SnapshotsLock},
    matrix::{self, MatrixCommand, MatrixEvent, api::MatrixStatus},
    widgets::{self, Widgets},
};

pub struct Matrix {
    pub tx: mpsc::Sender<MatrixCommand>,
    /// last successful poll, kept through outages
    pub status: Mutex<Option<MatrixStatus>>,
    pub connected: Mutex<bool>,
}

pub struct CrossbarState {
    pub entities: Entities,
    pub widgets: Widgets,
    pub snapshots: SnapshotsLock,
    pub matrix: Matrix,
}

impl CrossbarState {
    pub fn init(cfg: CrossbarConfig) -> Result<Arc<Self>, Box<dyn Error>> {
        let (istate_tx, istate_rx) = oneshot::channel();

        let entities = Entities::init(&cfg);
        let widgets = Widgets::init(cfg.dashboard, &entities)?;
        let (matrix_tx, event_rx) = matrix::spawn(cfg.matrix);

        let res = Arc::new(CrossbarState {
            entities,
            widgets,
            snapshots: Mutex::new(HashMap::new()),
            matrix: Matrix {
                tx: matrix_tx,
                status: Mutex::new(None),
                connected: Mutex::new(false),
            },
        });

        let span = span!(Level::INFO, "Matrix State Update Task");
        tokio::spawn(state_task(event_rx, istate_rx).instrument(span));

        istate_tx
            .send(res.clone())
            .unwrap_or_else(|_| panic!("CrossbarState: Could not send state to state task"));

        Ok(res)
    }
}

/// Receive events from the matrix task
///  -> Save snapshots/status in CrossbarState
///  -> Notify widgets
async fn state_task(
    mut event_rx: mpsc::Receiver<MatrixEvent>,
    istate_rx: oneshot::Receiver<Arc<CrossbarState>>,
) {
    //wait until istate is ready
    let istate = istate_rx.await.unwrap();
    info!("running");

    while let Some(event) = event_rx.recv().await {
        match event {
            MatrixEvent::Status(status) => {
                widgets::state::on_matrix_status(&istate, status).await;
            }
            MatrixEvent::Connected(connected) => {
                info!("matrix {}", if connected { "reachable" } else { "unreachable" });
                widgets::state::on_connection(&istate, connected).await;
            }
        }
    }
}
