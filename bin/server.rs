// Leave Ledger - Sheet Proxy Server
// Read-only proxy in front of the container-tracking spreadsheet

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use leave_ledger::{match_container, quote_sheet_name, tab_view, ProxyConfig, SheetsClient};

/// The container lookup always reads the first tab.
const CONTAINER_RANGE: &str = "Sheet1!A1:Z1000";

/// Shared application state
#[derive(Clone)]
struct AppState {
    sheets: Arc<SheetsClient>,
}

fn error_body(message: &str) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "error": message }))
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok", "version": leave_ledger::VERSION }))
}

#[derive(Deserialize)]
struct ContainerQuery {
    #[serde(default)]
    number: String,
    #[serde(default)]
    line: String,
}

/// GET /api/containers?number=&line= - Look up one container row
async fn get_container(
    State(state): State<AppState>,
    Query(query): Query<ContainerQuery>,
) -> impl IntoResponse {
    if query.number.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, error_body("Missing container number")).into_response();
    }

    let rows = match state.sheets.values(CONTAINER_RANGE).await {
        Ok(rows) => rows,
        Err(e) => {
            eprintln!("Error reading sheet: {e:#}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_body("Failed to read Google Sheet"),
            )
                .into_response();
        }
    };

    if rows.is_empty() {
        return (StatusCode::NOT_FOUND, error_body("No data in sheet")).into_response();
    }

    match match_container(&rows, &query.number, &query.line) {
        Some(fields) => (StatusCode::OK, Json(serde_json::Value::Object(fields))).into_response(),
        None => (StatusCode::NOT_FOUND, error_body("Container not found")).into_response(),
    }
}

#[derive(Deserialize)]
struct TabQuery {
    #[serde(default)]
    sheet: String,
}

/// GET /api/tab?sheet= - Full tab pass-through with hidden rows filtered
async fn get_tab(
    State(state): State<AppState>,
    Query(query): Query<TabQuery>,
) -> impl IntoResponse {
    let sheet_name = query.sheet.trim();
    if sheet_name.is_empty() {
        return (StatusCode::BAD_REQUEST, error_body("Missing sheet/tab name")).into_response();
    }

    let range = format!("{}!A1:Z1000", quote_sheet_name(sheet_name));

    let rows = match state.sheets.grid(&range).await {
        Ok(rows) => rows,
        Err(e) => {
            eprintln!("Error reading tab {sheet_name:?}: {e:#}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_body("Failed to read requested tab"),
            )
                .into_response();
        }
    };

    match tab_view(&rows) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => (StatusCode::NOT_FOUND, error_body(&e.to_string())).into_response(),
    }
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() {
    println!("🌐 Leave Ledger - Sheet Proxy");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let config = match ProxyConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Configuration error: {e:#}");
            eprintln!("   Set SHEET_ID to the spreadsheet id, and either");
            eprintln!("   SERVICE_ACCOUNT_JSON (inline key) or");
            eprintln!("   SERVICE_ACCOUNT_KEY_FILE (path to the key file).");
            std::process::exit(1);
        }
    };
    println!("✓ Spreadsheet: {}", config.sheet_id);
    println!("✓ Service account: {}", config.key.client_email);

    let port = config.port;
    let state = AppState {
        sheets: Arc::new(SheetsClient::new(config.sheet_id, config.key)),
    };

    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/containers", get(get_container))
        .route("/tab", get(get_tab))
        .with_state(state);

    let app = Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    println!("\n🚀 Proxy running on http://localhost:{port}");
    println!("   GET /api/containers?number=&line=");
    println!("   GET /api/tab?sheet=");
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
