mod cors;

use std::net::SocketAddr;

use axum::{Router, routing::get};
use pixelrelay_config::Config;
use tower_http::trace::TraceLayer;

pub use cors::cors_headers;

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
}

impl Server {
    /// Build the server from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the generator cannot be initialized or a CORS
    /// header value is invalid
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let listen_address = config
            .server
            .listen_address
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

        let generator = pixelrelay_imagegen::build_generator(config)?;

        let mut app = Router::new();

        if config.server.health.enabled {
            app = app.route(&config.server.health.path, get(health));
        }

        app = app.merge(pixelrelay_imagegen::endpoint_router(&config.server.route).with_state(generator));

        // Tracing
        app = app.layer(TraceLayer::new_for_http());

        // CORS (outermost, so every response carries the headers)
        for layer in cors::cors_layers(&config.server.cors)? {
            app = app.layer(layer);
        }

        tracing::debug!(route = %config.server.route, "routes registered");

        Ok(Self {
            router: app,
            listen_address,
        })
    }

    /// Get the configured listen address
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    #[must_use]
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Blocks until the cancellation token is triggered.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        Ok(())
    }
}

async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use secrecy::SecretString;
    use tower::ServiceExt;

    use super::*;

    fn server() -> Router {
        let mut config = Config::default();
        config.upstream.api_key = Some(SecretString::from("sk-server-test"));
        Server::new(&config).unwrap().into_router()
    }

    fn assert_cors(response: &http::Response<Body>) {
        let header = |name: &str| response.headers().get(name).and_then(|v| v.to_str().ok()).map(str::to_owned);
        assert_eq!(header("access-control-allow-origin").as_deref(), Some("*"));
        assert_eq!(header("access-control-allow-methods").as_deref(), Some("POST, OPTIONS"));
        assert_eq!(header("access-control-allow-headers").as_deref(), Some("Content-Type"));
    }

    #[tokio::test]
    async fn health_returns_ok_with_cors_headers() {
        let request = Request::get("/health").body(Body::empty()).unwrap();
        let response = server().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_cors(&response);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"ok");
    }

    #[tokio::test]
    async fn preflight_carries_cors_headers() {
        let request = Request::options("/api/generate-image")
            .header("Origin", "https://site.example")
            .header("Access-Control-Request-Method", "POST")
            .body(Body::empty())
            .unwrap();
        let response = server().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_cors(&response);
    }

    #[tokio::test]
    async fn method_not_allowed_carries_cors_headers() {
        let request = Request::get("/api/generate-image").body(Body::empty()).unwrap();
        let response = server().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_cors(&response);
    }

    #[tokio::test]
    async fn validation_error_carries_cors_headers() {
        let request = Request::post("/api/generate-image")
            .header("Content-Type", "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let response = server().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_cors(&response);
    }

    #[tokio::test]
    async fn disabled_health_route_is_not_found() {
        let mut config = Config::default();
        config.upstream.api_key = Some(SecretString::from("sk-server-test"));
        config.server.health.enabled = false;
        let router = Server::new(&config).unwrap().into_router();

        let request = Request::get("/health").body(Body::empty()).unwrap();
        let response = router.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
