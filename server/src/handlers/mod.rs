use crate::connection::ws_index;
use crate::handlers::admin::configure_admin_handlers;
use actix_cors::Cors;
use actix_web::web;

mod admin;

pub fn root(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/ws/").route(web::get().to(ws_index)));

    configure_admin_handlers(cfg);
}

/// Any origin when `allowed_origins` is empty.
pub fn cors(allowed_origins: &[String]) -> Cors {
    if allowed_origins.is_empty() {
        return Cors::permissive();
    }
    allowed_origins.iter().fold(
        Cors::default()
            .allowed_methods(vec!["GET"])
            .allow_any_header()
            .max_age(3600),
        |cors, origin| cors.allowed_origin(origin),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::server::spawn_server;
    use actix_web::http::{header, StatusCode};
    use actix_web::{test, App};
    use system::serde_json::{json, Value};

    #[actix_rt::test]
    async fn it_refuses_plain_http_on_websocket_route() {
        let srv_tx = spawn_server(&ServerConfig::default());
        let mut app = test::init_service(App::new().data(srv_tx).configure(root)).await;

        let req = test::TestRequest::get().uri("/ws/").to_request();
        let resp = test::call_service(&mut app, req).await;
        assert!(resp.status().is_client_error());
    }

    #[actix_rt::test]
    async fn it_reports_an_empty_session() {
        let srv_tx = spawn_server(&ServerConfig::default());
        let mut app = test::init_service(App::new().data(srv_tx).configure(root)).await;

        let req = test::TestRequest::get().uri("/admin/session").to_request();
        let body: Value = test::read_response_json(&mut app, req).await;
        assert_eq!(
            body,
            json!({
                "onlineUsers": [],
                "connections": 0,
                "strokes": 0,
                "texts": 0,
                "chats": 0,
            })
        );
    }

    #[actix_rt::test]
    async fn it_echoes_configured_origin() {
        let srv_tx = spawn_server(&ServerConfig::default());
        let origins = vec!["http://localhost:4200".to_string()];
        let app = App::new().wrap(cors(&origins)).data(srv_tx).configure(root);
        let mut app = test::init_service(app).await;

        let req = test::TestRequest::get()
            .uri("/admin/session")
            .header(header::ORIGIN, "http://localhost:4200")
            .to_request();
        let resp = test::call_service(&mut app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|v| v.to_str().ok()),
            Some("http://localhost:4200")
        );
    }
}
