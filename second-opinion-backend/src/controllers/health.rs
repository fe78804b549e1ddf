use actix_web::{web, HttpResponse, Responder};

use crate::AppState;

/// Version from Cargo.toml, available at compile time
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/health").route(web::get().to(health_check)));
}

async fn health_check(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "version": VERSION,
        "model": state.relay.model(),
        "inference_endpoint": state.config.llm.base_url,
        "uptime_secs": state.started_at.elapsed().as_secs()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{test_state, FakeGenerator};
    use actix_web::{test, App};

    #[actix_web::test]
    async fn test_health_reports_version_and_model() {
        let app = test::init_service(
            App::new()
                .app_data(test_state(FakeGenerator::fragments(&[])))
                .configure(config_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], VERSION);
        assert_eq!(body["model"], "fake-model");
    }
}
