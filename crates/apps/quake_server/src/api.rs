use axum::extract::{Path as AxumPath, Query, State};
use axum::http::{Method, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use scene::{MapEvent, MapView};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::loader::SharedHost;
use crate::page::INDEX_HTML;

#[derive(Clone)]
pub struct AppState {
    pub host: SharedHost,
}

type ApiResult<T> = Result<T, (StatusCode, Json<Value>)>;

fn api_error(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "error": message.into() })))
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS]);

    Router::new()
        .route("/", get(index))
        .route("/healthz", get(healthz))
        .route("/api/map", get(get_map))
        .route("/api/legend", get(get_legend))
        .route("/api/markers/:index/popup", get(get_popup))
        .route("/api/zoom", post(post_zoom))
        .route("/api/base/:name", post(post_base))
        .route("/api/overlays/:name", post(post_overlay))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn healthz() -> Response {
    (StatusCode::OK, "ok").into_response()
}

#[derive(Debug, Deserialize)]
pub struct MapQuery {
    pub zoom: Option<u8>,
}

async fn get_map(State(state): State<AppState>, Query(query): Query<MapQuery>) -> Json<MapView> {
    Json(state.host.read().session().snapshot(query.zoom))
}

async fn get_legend(State(state): State<AppState>) -> Json<Value> {
    let host = state.host.read();
    let legend = host.session().legend();
    let entries: Vec<Value> = legend
        .entries
        .iter()
        .map(|e| json!({ "label": e.label(), "color": e.swatch }))
        .collect();
    Json(json!({
        "title": legend.title,
        "position": legend.position,
        "entries": entries,
        "html": legend.to_html(),
    }))
}

async fn get_popup(
    State(state): State<AppState>,
    AxumPath(index): AxumPath<usize>,
) -> ApiResult<Json<Value>> {
    let host = state.host.read();
    let html = host
        .session()
        .popup(index)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "Marker not found"))?;
    Ok(Json(json!({ "html": html })))
}

#[derive(Debug, Deserialize)]
pub struct ZoomRequest {
    pub zoom: u8,
}

async fn post_zoom(State(state): State<AppState>, Json(req): Json<ZoomRequest>) -> Json<Value> {
    let mut host = state.host.write();
    host.post(MapEvent::ZoomEnd { zoom: req.zoom });
    Json(json!({ "zoom": host.session().zoom() }))
}

async fn post_base(
    State(state): State<AppState>,
    AxumPath(name): AxumPath<String>,
) -> ApiResult<Json<Value>> {
    let mut host = state.host.write();
    if !host.session().composer().has_base(&name) {
        return Err(api_error(
            StatusCode::NOT_FOUND,
            format!("Unknown base layer: {name}"),
        ));
    }
    host.post(MapEvent::BaseLayerChange { name });
    Ok(Json(
        json!({ "activeBase": host.session().composer().active_base().name }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct OverlayRequest {
    pub active: bool,
}

async fn post_overlay(
    State(state): State<AppState>,
    AxumPath(name): AxumPath<String>,
    Json(req): Json<OverlayRequest>,
) -> ApiResult<Json<Value>> {
    let mut host = state.host.write();
    if !host.session().composer().has_overlay(&name) {
        return Err(api_error(
            StatusCode::NOT_FOUND,
            format!("Unknown overlay: {name}"),
        ));
    }
    host.post(MapEvent::OverlayToggle {
        name,
        active: req.active,
    });
    Ok(Json(json!({ "overlays": host.session().composer().overlays() })))
}
