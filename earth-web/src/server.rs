//! HTTP routes and server startup.

use anyhow::{Context, Result};
use axum::{
    Extension, Form, Router,
    extract::rejection::FormRejection,
    response::Html,
    routing::get,
};
use earth_core::{Config, ImageFetchWorkflow, ImageRequest};
use serde::Deserialize;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{info, warn};

use crate::pages::{self, EarthView};

/// Shared application state.
#[derive(Debug)]
pub struct AppState {
    pub workflow: ImageFetchWorkflow,
}

/// Fields posted by the Earth form. Absent fields count as empty.
#[derive(Debug, Default, Deserialize)]
pub struct EarthForm {
    api: Option<String>,
    latitude: Option<String>,
    longitude: Option<String>,
    date: Option<String>,
    area: Option<String>,
}

impl From<EarthForm> for ImageRequest {
    fn from(form: EarthForm) -> Self {
        ImageRequest {
            api_key: form.api.unwrap_or_default(),
            latitude: form.latitude.unwrap_or_default(),
            longitude: form.longitude.unwrap_or_default(),
            date: form.date.unwrap_or_default(),
            area: form.area.unwrap_or_default(),
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let store = state.workflow.store();
    let static_files = ServeDir::new(store.dir());
    let prefix = store.public_prefix().to_string();

    Router::new()
        .route("/", get(index_handler))
        .route("/mars", get(mars_handler))
        .route("/earth", get(earth_form_handler).post(earth_submit_handler))
        .nest_service(&prefix, static_files)
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
}

pub async fn serve(config: &Config) -> Result<()> {
    let workflow = ImageFetchWorkflow::from_config(config)?;
    let state = Arc::new(AppState { workflow });

    let addr: SocketAddr = config
        .server
        .listen
        .parse()
        .with_context(|| format!("Invalid listen address: {}", config.server.listen))?;

    info!(
        address = %addr,
        static_dir = %config.storage.static_dir.display(),
        metadata_url = %config.provider.metadata_url,
        "Starting planetary explorer"
    );

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// GET /
async fn index_handler() -> Html<String> {
    Html(pages::index())
}

/// GET /mars
async fn mars_handler() -> Html<String> {
    Html(pages::mars())
}

/// GET /earth
async fn earth_form_handler() -> Html<String> {
    Html(pages::earth(&EarthView::default()))
}

/// POST /earth
///
/// Always answers with the re-rendered form; failures show up as a message
/// on the page rather than an error status. A body that is not a form
/// counts as one with no fields.
async fn earth_submit_handler(
    Extension(state): Extension<Arc<AppState>>,
    form: Result<Form<EarthForm>, FormRejection>,
) -> Html<String> {
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            info!(reason = %rejection, "earth form body unreadable, treating as empty");
            EarthForm::default()
        }
    };
    let request: ImageRequest = form.into();
    let mut view = EarthView::for_request(&request);

    match state.workflow.run(&request).await {
        Ok(stored) => view.image = Some(stored),
        Err(err) => {
            if err.is_validation() {
                info!(kind = err.kind(), "earth form rejected");
            } else {
                warn!(kind = err.kind(), error = %err, "earth imagery request failed");
            }
            view.error = Some(err.to_string());
        }
    }

    Html(pages::earth(&view))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use earth_core::{ImageStore, provider::nasa::NasaEarthProvider};
    use tower::ServiceExt;

    // Nothing listens on the discard port, so any outbound call would fail loudly.
    fn app(dir: &std::path::Path) -> Router {
        let provider = NasaEarthProvider::new("http://127.0.0.1:9/assets".to_string());
        let store = ImageStore::open(dir, "/static").unwrap();
        let workflow = ImageFetchWorkflow::new(Box::new(provider), store);
        router(Arc::new(AppState { workflow }))
    }

    async fn body_text(res: axum::response::Response) -> String {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn post_earth(body: &str) -> Request<Body> {
        Request::post("/earth")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn landing_page_links_destinations() {
        let tmp = tempfile::tempdir().unwrap();
        let res = app(tmp.path())
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        let html = body_text(res).await;
        assert!(html.contains(r#"href="/earth""#));
        assert!(html.contains(r#"href="/mars""#));
    }

    #[tokio::test]
    async fn mars_page_shows_welcome() {
        let tmp = tempfile::tempdir().unwrap();
        let res = app(tmp.path())
            .oneshot(Request::get("/mars").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert!(body_text(res).await.contains("Welcome to Mars! More data coming soon..."));
    }

    #[tokio::test]
    async fn earth_form_starts_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let res = app(tmp.path())
            .oneshot(Request::get("/earth").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let html = body_text(res).await;
        assert!(html.contains(r#"<form method="post" action="/earth">"#));
        assert!(!html.contains(r#"class="error""#));
    }

    #[tokio::test]
    async fn invalid_area_rerenders_form_with_error() {
        let tmp = tempfile::tempdir().unwrap();
        let res = app(tmp.path())
            .oneshot(post_earth(
                "api=X&latitude=37.77&longitude=-122.41&date=2023-01-15&area=3",
            ))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        let html = body_text(res).await;
        assert!(html.contains("Invalid image area selected"));
        assert!(html.contains(r#"value="37.77""#));
        assert!(html.contains(r#"value="-122.41""#));
        assert!(html.contains(r#"value="2023-01-15""#));
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn missing_fields_are_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let res = app(tmp.path())
            .oneshot(post_earth("latitude=10&longitude=20"))
            .await
            .unwrap();

        let html = body_text(res).await;
        assert!(html.contains("Please provide the API key"));
        assert!(html.contains(r#"value="10""#));
    }

    #[tokio::test]
    async fn bare_post_is_treated_as_empty_form() {
        let tmp = tempfile::tempdir().unwrap();
        let res = app(tmp.path())
            .oneshot(Request::post("/earth").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert!(body_text(res).await.contains("Please provide the API key"));
    }

    #[tokio::test]
    async fn json_post_is_treated_as_empty_form() {
        let tmp = tempfile::tempdir().unwrap();
        let req = Request::post("/earth")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"api":"X"}"#))
            .unwrap();
        let res = app(tmp.path()).oneshot(req).await.unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert!(body_text(res).await.contains("Please provide the API key"));
    }

    #[tokio::test]
    async fn non_numeric_coordinates_are_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let res = app(tmp.path())
            .oneshot(post_earth("api=X&latitude=abc&longitude=1&date=2023-01-15&area=1"))
            .await
            .unwrap();

        assert!(body_text(res).await.contains("Latitude and Longitude must be valid numbers."));
    }

    #[tokio::test]
    async fn unreachable_provider_is_a_network_error() {
        let tmp = tempfile::tempdir().unwrap();
        let res = app(tmp.path())
            .oneshot(post_earth("api=X&latitude=37.77&longitude=-122.41&date=2023-01-15&area=1"))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert!(body_text(res).await.contains("Network connection error"));
    }

    #[tokio::test]
    async fn stored_images_are_served_under_prefix() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("earth_image_test.png"), b"PNGDATA").unwrap();

        let res = app(tmp.path())
            .oneshot(Request::get("/static/earth_image_test.png").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()[header::CONTENT_TYPE], "image/png");
        assert_eq!(body_text(res).await, "PNGDATA");
    }
}
