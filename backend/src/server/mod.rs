//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;
pub use state_builders::lifecycle_http_state;

use state_builders::build_http_state;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use crate::Trace;
#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::Error;
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::pushes::{start_push, stop_push};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::streams::{close_stream, create_stream, get_stream, list_pushes};
use crate::inbound::http::webhook::media_server_webhook;

/// Undecodable JSON bodies answer with the domain error payload.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        Error::invalid_request(format!("invalid JSON body: {err}")).into()
    })
}

/// Assemble the application: API scope, webhook, health checks and, in debug
/// builds, Swagger UI at `/docs`.
pub fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let api = web::scope("/api/v1")
        .service(create_stream)
        .service(get_stream)
        .service(close_stream)
        .service(list_pushes)
        .service(start_push)
        .service(stop_push);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(json_config())
        .wrap(Trace)
        .service(api)
        .service(media_server_webhook)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Returns
/// A spawned [`Server`] that must be awaited to drive the listener.
///
/// # Errors
/// Propagates [`std::io::Error`] when the media server client cannot be built
/// or binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = web::Data::new(build_http_state(&config)?);

    let server = HttpServer::new(move || {
        build_app(server_health_state.clone(), http_state.clone())
    })
    .bind(config.bind_addr())?
    .run();

    health_state.mark_ready();
    Ok(server)
}

#[cfg(test)]
mod tests {
    //! Bootstrap coverage: readiness signalling and route wiring.

    use super::*;
    use crate::domain::IngestEndpoint;
    use crate::outbound::media_server::MediaServerApiConfig;
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::{fixture, rstest};
    use std::time::Duration;

    #[fixture]
    fn health_state() -> web::Data<HealthState> {
        web::Data::new(HealthState::new())
    }

    fn memory_config() -> ServerConfig {
        ServerConfig::new(
            "127.0.0.1:0".parse().expect("socket address"),
            IngestEndpoint::new("http://localhost:3333", "app"),
            MediaServerApiConfig::default(),
            Duration::from_secs(1),
        )
    }

    #[rstest]
    #[actix_rt::test]
    async fn create_server_marks_ready(health_state: web::Data<HealthState>) {
        let config = memory_config();
        assert!(!config.uses_database());

        let server = create_server(health_state.clone(), config).expect("server should build");

        assert!(health_state.is_ready());
        let handle = server.handle();
        let running = actix_rt::spawn(server);
        handle.stop(false).await;
        running
            .await
            .expect("server task should join")
            .expect("server should shut down cleanly");
    }

    #[rstest]
    #[actix_web::test]
    async fn wires_api_webhook_and_health_checks(health_state: web::Data<HealthState>) {
        health_state.mark_ready();
        let http_state = web::Data::new(HttpState::fixtures());
        let app = actix_test::init_service(build_app(health_state, http_state)).await;

        let live_response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/health/live").to_request(),
        )
        .await;
        assert_eq!(live_response.status(), StatusCode::OK);
        assert!(live_response.headers().contains_key("trace-id"));

        let unknown = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/streams/3fa85f64-5717-4562-b3fc-2c963f66afa6")
                .to_request(),
        )
        .await;
        assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
    }

    #[rstest]
    #[actix_web::test]
    async fn malformed_json_uses_error_payload(health_state: web::Data<HealthState>) {
        let http_state = web::Data::new(HttpState::fixtures());
        let app = actix_test::init_service(build_app(health_state, http_state)).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/streams")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = actix_test::read_body_json(response).await;
        assert_eq!(body["code"], "invalid_request");
        assert!(body["traceId"].is_string());
    }
}
