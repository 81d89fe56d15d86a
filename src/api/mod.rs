use crate::cli::model::Cli;
use crate::state::CrossbarState;
use crate::widgets::{binder, more_info};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{AppendHeaders, IntoResponse},
    routing::{any, get, post},
};
use maud::{Markup, html};
use std::{error::Error, sync::Arc};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tracing::info;

use crate::api::ws::ws_handler;

pub mod page;
pub mod ws;

pub async fn init(state: Arc<CrossbarState>) -> Result<(), Box<dyn Error>> {
    let app = Router::new()
        .route("/", get(dashboard_page))
        .route("/entity/{entity_id}", get(entity_page))
        .route("/catalog", get(get_catalog))
        .route("/cmd", post(post_cmd))
        .route("/ws", any(ws_handler))
        .nest_service("/local", ServeDir::new("www"))
        .with_state(state);

    let listener = TcpListener::bind("0.0.0.0:3000").await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

async fn dashboard_page(State(state): State<Arc<CrossbarState>>) -> Markup {
    let snapshots = state.snapshots.lock().await;
    page::wrap_page(html! {
        div class="dashboard" {
            @for widget in &state.widgets.cards {
                (widget.render(snapshots.get(widget.entity_id())))
            }
        }
    })
}

/// More-info panel, instantiated by type name per request
async fn entity_page(
    State(state): State<Arc<CrossbarState>>,
    Path(entity_id): Path<String>,
) -> Markup {
    let wid = more_info::wid(&entity_id);
    let cfg = more_info::panel_config(&entity_id);
    match state.widgets.registry.build(wid, cfg) {
        Ok(widget) => {
            let snapshots = state.snapshots.lock().await;
            page::wrap_page(widget.render(snapshots.get(&entity_id)))
        }
        Err(_) => page::wrap_page(html! {
            div class="container" { (binder::NOT_FOUND) }
        }),
    }
}

async fn get_catalog(State(state): State<Arc<CrossbarState>>) -> impl IntoResponse {
    Json(state.widgets.registry.catalog().to_vec())
}

async fn post_cmd(State(state): State<Arc<CrossbarState>>, cmd_str: String) -> impl IntoResponse {
    let cmd = match Cli::parse(&cmd_str) {
        Ok(r) => r,
        Err(e) => return (StatusCode::BAD_REQUEST, Json(e.render().to_string())).into_response(),
    };

    match cmd.dispatch(&state).await {
        Ok(Some(body)) => (
            StatusCode::OK,
            AppendHeaders([(header::CONTENT_TYPE, "application/json")]),
            body,
        )
            .into_response(),
        Ok(None) => (StatusCode::OK).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Json(e)).into_response(),
    }
}
