use async_trait::async_trait;
use reqwest::{Client, StatusCode, header::CONTENT_TYPE};
use tracing::{debug, warn};

use crate::{FetchError, ValidatedRequest};

use super::{AssetMetadata, DownloadedImage, ImageryProvider};

/// NASA Earth imagery (`planetary/earth/assets`) and the image URLs it hands out.
#[derive(Debug, Clone)]
pub struct NasaEarthProvider {
    metadata_url: String,
    http: Client,
}

impl NasaEarthProvider {
    pub fn new(metadata_url: String) -> Self {
        Self {
            metadata_url,
            http: Client::new(),
        }
    }
}

#[async_trait]
impl ImageryProvider for NasaEarthProvider {
    async fn lookup(&self, request: &ValidatedRequest) -> Result<AssetMetadata, FetchError> {
        let dim = request.resolution().to_string();

        let res = self
            .http
            .get(&self.metadata_url)
            .query(&[
                ("lat", request.latitude.as_str()),
                ("lon", request.longitude.as_str()),
                ("date", request.date.as_str()),
                ("dim", dim.as_str()),
                ("api_key", request.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(rejected("metadata lookup", status, &body));
        }

        debug!(body = %truncate_body(&body), "imagery metadata received");

        serde_json::from_str(&body).map_err(|e| {
            FetchError::UnknownError(format!("Failed to parse imagery metadata JSON: {e}"))
        })
    }

    async fn download(&self, url: &str) -> Result<DownloadedImage, FetchError> {
        let res = self.http.get(url).send().await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(rejected("image download", status, &body));
        }

        let content_type = res
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let bytes = res.bytes().await?.to_vec();

        Ok(DownloadedImage {
            bytes,
            content_type,
        })
    }
}

fn rejected(stage: &str, status: StatusCode, body: &str) -> FetchError {
    warn!(
        stage,
        status = status.as_u16(),
        body = %truncate_body(body),
        "imagery provider rejected request"
    );
    FetchError::ProviderError(status.as_u16())
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AreaCode;
    use axum::{
        Json, Router,
        extract::{Query, State},
        http::{StatusCode as AxumStatus, header},
        response::IntoResponse,
        routing::get,
    };
    use serde_json::json;
    use std::{
        collections::HashMap,
        sync::{Arc, Mutex},
    };
    use tokio::net::TcpListener;

    type Seen = Arc<Mutex<Vec<HashMap<String, String>>>>;

    async fn spawn(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn request() -> ValidatedRequest {
        ValidatedRequest {
            api_key: "X".into(),
            latitude: "37.77".into(),
            longitude: "-122.41".into(),
            date: "2023-01-15".into(),
            area: AreaCode::Km1,
        }
    }

    async fn record(
        State(seen): State<Seen>,
        Query(params): Query<HashMap<String, String>>,
    ) -> impl IntoResponse {
        seen.lock().unwrap().push(params);
        Json(json!({ "url": "http://example.invalid/x.png", "date": "2023-01-14T18:55:32" }))
    }

    #[tokio::test]
    async fn lookup_sends_expected_query() {
        let seen: Seen = Arc::default();
        let app = Router::new().route("/assets", get(record)).with_state(seen.clone());
        let base = spawn(app).await;

        let provider = NasaEarthProvider::new(format!("{base}/assets"));
        let meta = provider.lookup(&request()).await.unwrap();

        assert_eq!(meta.image_url(), Some("http://example.invalid/x.png"));
        assert_eq!(meta.date.as_deref(), Some("2023-01-14T18:55:32"));

        let params = seen.lock().unwrap()[0].clone();
        assert_eq!(params["lat"], "37.77");
        assert_eq!(params["lon"], "-122.41");
        assert_eq!(params["date"], "2023-01-15");
        assert_eq!(params["dim"], "0.009");
        assert_eq!(params["api_key"], "X");
    }

    #[tokio::test]
    async fn lookup_404_is_provider_error() {
        let app = Router::new()
            .route("/assets", get(|| async { (AxumStatus::NOT_FOUND, "no imagery") }));
        let base = spawn(app).await;

        let provider = NasaEarthProvider::new(format!("{base}/assets"));
        let err = provider.lookup(&request()).await.unwrap_err();
        assert_eq!(err, FetchError::ProviderError(404));
    }

    #[tokio::test]
    async fn lookup_with_garbage_body_is_unknown_error() {
        let app = Router::new().route("/assets", get(|| async { "<html>oops</html>" }));
        let base = spawn(app).await;

        let provider = NasaEarthProvider::new(format!("{base}/assets"));
        let err = provider.lookup(&request()).await.unwrap_err();
        assert!(matches!(err, FetchError::UnknownError(ref m) if m.contains("metadata JSON")));
    }

    #[tokio::test]
    async fn refused_connection_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let provider = NasaEarthProvider::new(format!("http://{addr}/assets"));
        let err = provider.lookup(&request()).await.unwrap_err();
        assert_eq!(err, FetchError::NetworkError);
    }

    #[tokio::test]
    async fn download_keeps_bytes_and_content_type() {
        let app = Router::new().route(
            "/img",
            get(|| async {
                let png = vec![0x89u8, b'P', b'N', b'G'];
                ([(header::CONTENT_TYPE, "image/png")], png)
            }),
        );
        let base = spawn(app).await;

        let provider = NasaEarthProvider::new(format!("{base}/assets"));
        let image = provider.download(&format!("{base}/img")).await.unwrap();
        assert_eq!(image.bytes, vec![0x89, b'P', b'N', b'G']);
        assert_eq!(image.content_type.as_deref(), Some("image/png"));
    }

    #[tokio::test]
    async fn download_failure_status_is_provider_error() {
        let app = Router::new()
            .route("/img", get(|| async { AxumStatus::SERVICE_UNAVAILABLE }));
        let base = spawn(app).await;

        let provider = NasaEarthProvider::new(format!("{base}/assets"));
        let err = provider.download(&format!("{base}/img")).await.unwrap_err();
        assert_eq!(err, FetchError::ProviderError(503));
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(300);
        let cut = truncate_body(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 203);
        assert_eq!(truncate_body("short"), "short");
    }
}
