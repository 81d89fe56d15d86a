use crate::cli::dispatcher;
use crate::cli::model::Cli;
use crate::state::CrossbarState;
use crate::widgets::event::{self, SelectionChanged};
use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{Instrument, Level, debug, span, warn};
use uuid::Uuid;

pub async fn ws_handler(
    State(state): State<Arc<CrossbarState>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| {
        let span = span!(Level::INFO, "WebSocket", conn = %Uuid::now_v7());
        handle_socket(state, socket).instrument(span)
    })
}

async fn handle_socket(state: Arc<CrossbarState>, socket: WebSocket) {
    debug!("connected");

    let (ws_tx, mut ws_rx) = socket.split();
    let ws_tx = Arc::new(Mutex::new(ws_tx));
    let ws_tx_copy = ws_tx.clone();
    let mut on_change_rx = state.widgets.on_change.subscribe();

    let mut tx_task = tokio::spawn(async move {
        while let Ok(json) = on_change_rx.recv().await {
            ws_tx.lock().await.send(Message::Text(json)).await.unwrap()
        }
    });

    let mut rx_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = ws_rx.next().await {
            match msg {
                Message::Text(text) => {
                    if let Some(json) = handle_message(&state, &text).await {
                        ws_tx_copy
                            .lock()
                            .await
                            .send(Message::Text(json.into()))
                            .await
                            .unwrap()
                    }
                }
                Message::Close(_) => {
                    return;
                }
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = (&mut tx_task) => {
            rx_task.abort();
        },
        _ = (&mut rx_task) => {
            tx_task.abort();
        }
    }

    debug!("closed");
}

/// Widget events arrive as JSON objects, anything else is a CLI string
async fn handle_message(istate: &Arc<CrossbarState>, text: &str) -> Option<String> {
    if text.trim_start().starts_with('{') {
        handle_event(istate, text).await;
        return None;
    }
    parse_execute_wscmd(istate, text).await
}

/// Selection changes are fire-and-forget: log and drop on failure
async fn handle_event(istate: &Arc<CrossbarState>, text: &str) {
    let msg: SelectionChanged = match serde_json::from_str(text) {
        Ok(r) => r,
        Err(e) => {
            warn!("bad event payload: {e}");
            return;
        }
    };

    let Some(candidate) = msg.event.value() else {
        warn!("event for `{}` carried no value", msg.widget);
        return;
    };

    let Some(entity_id) = istate.widgets.entity_of(&msg.widget) else {
        warn!("event for unknown widget `{}`", msg.widget);
        return;
    };
    let entity_id = entity_id.to_string();

    // compare against what this widget is showing, not the raw store
    let current = {
        let snapshots = istate.snapshots.lock().await;
        istate.widgets.shown(&snapshots, &msg.widget, &entity_id)
    };

    let Some(cmd) = event::decide(&entity_id, current.as_deref(), candidate) else {
        debug!("`{entity_id}` unchanged, skipping");
        return;
    };

    if let Err(e) = dispatcher::execute(istate, &cmd) {
        warn!("event dispatch failed: {}", serde_json::to_string(&e).unwrap()); //FIXME
    }
}

async fn parse_execute_wscmd(istate: &Arc<CrossbarState>, cmd_str: &str) -> Option<String> {
    let cmd = match Cli::parse(cmd_str) {
        Ok(r) => r,
        Err(e) => {
            let e = serde_json::to_string(&e.render().to_string()).unwrap();
            warn!("command failed: {e}");
            return Some(e);
        }
    };

    match cmd.dispatch(istate).await {
        Ok(r) => r,
        Err(e) => {
            let e = serde_json::to_string(&e).unwrap(); //FIXME
            warn!("command failed: {e}");
            Some(e)
        }
    }
}
