// src/routes.rs

use axum::{
    Router,
    http::Method,
    routing::{get, patch, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{answer_sheets, archive, results, tests},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (tests, answer sheets, results, archive).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (Database Pool + Config).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
        "http://localhost:5173".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    let test_routes = Router::new()
        .route("/", get(tests::list_tests).post(tests::create_test))
        .route(
            "/{id}",
            get(tests::get_test)
                .put(tests::update_test)
                .delete(tests::delete_test),
        )
        .route("/code/{test_code}", get(tests::get_test_by_code));

    let sheet_routes = Router::new().route(
        "/",
        get(answer_sheets::list_sheets).post(answer_sheets::submit_sheet),
    );

    let result_routes = Router::new()
        .route("/", get(results::list_results))
        .route("/calculate/{uli}", post(results::calculate))
        .route("/calculate-all", post(results::calculate_all))
        .route("/summary/{test_code}", get(results::test_summary))
        .route("/getuser/{uli}", post(results::get_user_results))
        .route(
            "/{uli}/{test_code}",
            get(results::get_result).delete(results::delete_result),
        )
        .route("/{uli}/{test_code}/remarks", patch(results::update_remarks));

    let archive_routes = Router::new().route("/", get(archive::list_archived));

    Router::new()
        .nest("/api/tests", test_routes)
        .nest("/api/answer-sheets", sheet_routes)
        .nest("/api/results", result_routes)
        .nest("/api/archive", archive_routes)
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
