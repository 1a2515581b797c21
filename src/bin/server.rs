//! Pile FEA HTTP Server

use axum::{
    extract::Json,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};

use pile_fea::prelude::*;
use pile_fea::results::PileSummary;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

#[derive(Debug, Serialize)]
struct AnalysisResponse {
    success: bool,
    exit_status: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    piles: Vec<PileResults>,
}

#[derive(Debug, Serialize)]
struct PileResults {
    pile: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<PileSummary>,
    /// (elevation, value) pairs keyed by quantity label
    series: BTreeMap<&'static str, Vec<(f64, f64)>>,
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn analyze(Json(problem): Json<PileProblem>) -> impl IntoResponse {
    let mut modeler = match PileModeler::<FrameDomain>::from_problem(&problem) {
        Ok(modeler) => modeler,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(AnalysisResponse {
                    success: false,
                    exit_status: ExitStatus::NotReady.code(),
                    error: Some(e.to_string()),
                    piles: Vec::new(),
                }),
            )
        }
    };

    match modeler.run() {
        Ok(status) => (
            StatusCode::OK,
            Json(AnalysisResponse {
                success: true,
                exit_status: status.code(),
                error: None,
                piles: collect_results(modeler.plot_data()),
            }),
        ),
        Err(e) => {
            let code = match e {
                PileError::SolverNonconvergence { .. } | PileError::SolverSingular => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                _ => StatusCode::BAD_REQUEST,
            };
            (
                code,
                Json(AnalysisResponse {
                    success: false,
                    exit_status: modeler.get_exit_status().code(),
                    error: Some(e.to_string()),
                    piles: Vec::new(),
                }),
            )
        }
    }
}

fn collect_results(data: &PlotData) -> Vec<PileResults> {
    (0..data.num_piles())
        .map(|pile| PileResults {
            pile,
            summary: data.summary(pile),
            series: PlotQuantity::ALL
                .iter()
                .filter_map(|q| data.series(pile, *q).map(|s| (q.label(), s.points.clone())))
                .collect(),
        })
        .collect()
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/analyze", post(analyze))
        .layer(cors);

    let port = std::env::var("PILE_FEA_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8087);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("Pile FEA Server listening on http://{}", addr);
    println!("  Health check: GET  /health");
    println!("  Analysis:     POST /analyze");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("Cannot bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
