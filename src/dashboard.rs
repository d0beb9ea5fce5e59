//! Dashboard HTTP adapter.
//!
//! Thin by design: every route is a direct translation of a query-service
//! call into JSON. The frontend polls these endpoints from another origin,
//! hence the permissive CORS policy.

use crate::query::{QueryService, DEFAULT_HISTORY_LEN};
use actix_cors::Cors;
use actix_web::{get, web, App, HttpResponse, HttpServer, Responder};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
struct HistoryParams {
    n: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct DrilldownParams {
    start: i64,
    client: String,
}

#[get("/api/windows/latest")]
async fn latest(service: web::Data<QueryService>) -> impl Responder {
    HttpResponse::Ok().json(service.get_latest())
}

#[get("/api/windows/history")]
async fn history(
    service: web::Data<QueryService>,
    params: web::Query<HistoryParams>,
) -> impl Responder {
    let n = params.n.unwrap_or(DEFAULT_HISTORY_LEN);
    HttpResponse::Ok().json(service.get_history(n))
}

#[get("/api/drilldown")]
async fn drilldown(
    service: web::Data<QueryService>,
    params: web::Query<DrilldownParams>,
) -> impl Responder {
    match service.get_drilldown(params.start, &params.client) {
        Ok(detail) => HttpResponse::Ok().json(detail),
        // both not-found kinds are 404s; the detail string tells them apart
        Err(e) => HttpResponse::NotFound().json(serde_json::json!({ "detail": e.to_string() })),
    }
}

/// Bind the dashboard server. The returned `Server` future drives all
/// workers; signals are disabled so shutdown goes through its handle.
pub fn serve(service: QueryService, port: u16) -> std::io::Result<actix_web::dev::Server> {
    let data = web::Data::new(service);
    let server = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .wrap(Cors::permissive())
            .service(latest)
            .service(history)
            .service(drilldown)
    })
    .bind(("0.0.0.0", port))?
    .disable_signals()
    .run();
    info!("dashboard API listening on port {}", port);
    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::{ClassifiedPacket, Direction, ProtocolLabel};
    use crate::store::WindowStore;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use std::sync::Arc;

    fn seeded_service() -> web::Data<QueryService> {
        let store = Arc::new(WindowStore::new(5, 15));
        store.ingest_at(
            1000,
            &ClassifiedPacket {
                client: "10.0.0.5".parse().unwrap(),
                direction: Direction::In,
                protocol: ProtocolLabel::Http,
                bytes: 100,
            },
        );
        web::Data::new(QueryService::new(store))
    }

    #[actix_web::test]
    async fn test_latest_route_serves_window_summary() {
        let app = test::init_service(
            App::new().app_data(seeded_service()).service(latest),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/windows/latest")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["start"], 1000);
        assert_eq!(body["clients"]["10.0.0.5"]["in"], 100);
    }

    #[actix_web::test]
    async fn test_history_route_respects_n() {
        let app = test::init_service(
            App::new().app_data(seeded_service()).service(history),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/windows/history?n=1")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn test_drilldown_route_serves_protocols() {
        let app = test::init_service(
            App::new().app_data(seeded_service()).service(drilldown),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/drilldown?start=1000&client=10.0.0.5")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["protocols"]["HTTP"], 100);
    }

    #[actix_web::test]
    async fn test_drilldown_404_reasons_are_distinct() {
        let app = test::init_service(
            App::new().app_data(seeded_service()).service(drilldown),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/drilldown?start=2000&client=10.0.0.5")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["detail"], "Window 2000 not found");

        let req = test::TestRequest::get()
            .uri("/api/drilldown?start=1000&client=10.0.0.9")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["detail"], "Client 10.0.0.9 not found in window 1000");
    }
}
