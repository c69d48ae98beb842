use std::sync::Arc;
use axum::{routing::post, Router, Json};
use tower_http::cors::{CorsLayer, Any};
use serde::{Deserialize, Serialize};
use axum::http::StatusCode;
use tracing::{info, warn};
use crate::catalog::MemoryCatalog;
use crate::engine::{Engine, EngineSettings};
use crate::error::CladariumError;
use crate::results::{display_string, SearchResult};

#[derive(Deserialize)]
pub struct SearchRequest {
    pub query: String,
}

#[derive(Serialize)]
pub struct GroupBody {
    pub name: String,
    pub count: usize,
    pub items: Vec<String>,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub status: String,
    pub elapsed_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<GroupBody>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Deserialize)]
pub struct OperationRequest {
    pub input: String,
}

#[derive(Serialize)]
pub struct OperationResponse {
    pub status: String,
    pub elapsed_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn render_groups(result: &SearchResult, catalog: &MemoryCatalog) -> Vec<GroupBody> {
    result
        .groups_in_order()
        .into_iter()
        .map(|group| GroupBody {
            name: group.name().to_string(),
            count: group.len(),
            items: group
                .ordered_items(catalog)
                .iter()
                .map(|record| display_string(record, group.display_format()))
                .collect(),
        })
        .collect()
}

fn error_status(error: &CladariumError) -> StatusCode {
    match error {
        CladariumError::MalformedQuery { .. } | CladariumError::MalformedOperation { .. } => {
            StatusCode::BAD_REQUEST
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn router(catalog: Arc<MemoryCatalog>, settings: EngineSettings) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::POST])
        .allow_headers(Any);
    let search_catalog = Arc::clone(&catalog);
    let search_settings = settings.clone();
    Router::new()
        .route("/v1/search", post(move |Json(req): Json<SearchRequest>| {
            let catalog = Arc::clone(&search_catalog);
            let settings = search_settings.clone();
            async move {
                let started = std::time::Instant::now();
                let engine = Engine::with_settings(catalog.as_ref(), settings);
                let outcome = engine.search(&req.query).await;
                let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
                match outcome {
                    Ok(result) => {
                        let groups = render_groups(&result, catalog.as_ref());
                        info!(ms = elapsed_ms, groups = groups.len(), records = result.total_len(), "search complete");
                        let body = SearchResponse { status: "ok".into(), elapsed_ms, groups: Some(groups), error: None };
                        (StatusCode::OK, Json(body))
                    }
                    Err(e) => {
                        let status = error_status(&e);
                        let msg = format!("{e}");
                        warn!(%msg, code = %status.as_u16(), "search error");
                        let body = SearchResponse { status: "error".into(), elapsed_ms, groups: None, error: Some(msg) };
                        (status, Json(body))
                    }
                }
            }
        }))
        .route("/v1/operation", post(move |Json(req): Json<OperationRequest>| {
            let catalog = Arc::clone(&catalog);
            let settings = settings.clone();
            async move {
                let started = std::time::Instant::now();
                let engine = Engine::with_settings(catalog.as_ref(), settings);
                let outcome = engine.plan_operation(&req.input).await;
                let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
                match outcome {
                    Ok((operation, result)) => {
                        info!(ms = elapsed_ms, operation = operation.operation(), matched = result.total_len(), "operation planned");
                        let body = OperationResponse {
                            status: "ok".into(),
                            elapsed_ms,
                            operation: Some(operation.operation().to_string()),
                            args: Some(operation.args().to_vec()),
                            matched: Some(result.total_len()),
                            error: None,
                        };
                        (StatusCode::OK, Json(body))
                    }
                    Err(e) => {
                        let status = error_status(&e);
                        let msg = format!("{e}");
                        warn!(%msg, code = %status.as_u16(), "operation error");
                        let body = OperationResponse { status: "error".into(), elapsed_ms, operation: None, args: None, matched: None, error: Some(msg) };
                        (status, Json(body))
                    }
                }
            }
        }))
        .layer(cors)
}
