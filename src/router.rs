//! Statically registered routes.

use std::{collections::HashMap, sync::Arc};

use crate::{
    Handler,
    error::HandlerError,
    http::{Request, Response},
};

/// Answers a plain HTTP request.
pub type HttpHandler = Arc<dyn Fn(&Request) -> Result<Response, HandlerError> + Send + Sync>;

/// Creates the handler of a freshly upgraded connection.
pub type SocketFactory = Arc<dyn Fn(&Request) -> Box<dyn Handler + Send> + Send + Sync>;

/// What a path is registered as.
#[derive(Clone)]
pub enum Route {
    /// A plain HTTP route.
    Http(HttpHandler),
    /// A WebSocket endpoint.
    WebSocket(SocketFactory),
}

impl core::fmt::Debug for Route {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Route::Http(_) => f.write_str("Http"),
            Route::WebSocket(_) => f.write_str("WebSocket"),
        }
    }
}

/// Maps exact request paths to handlers. Built once at startup, read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct Router {
    routes: HashMap<String, Route>,
}

impl Router {
    /// Creates an empty router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an HTTP handler for `path`.
    pub fn route<F>(mut self, path: &str, handler: F) -> Self
    where
        F: Fn(&Request) -> Result<Response, HandlerError> + Send + Sync + 'static,
    {
        self.routes
            .insert(path.to_owned(), Route::Http(Arc::new(handler)));
        self
    }

    /// Registers a WebSocket endpoint for `path`, with `factory` building one handler per connection.
    pub fn websocket<F, H>(mut self, path: &str, factory: F) -> Self
    where
        F: Fn(&Request) -> H + Send + Sync + 'static,
        H: Handler + Send + 'static,
    {
        let factory: SocketFactory =
            Arc::new(move |request: &Request| -> Box<dyn Handler + Send> {
                Box::new(factory(request))
            });

        self.routes
            .insert(path.to_owned(), Route::WebSocket(factory));
        self
    }

    /// Returns the route registered for `path`.
    pub fn lookup(&self, path: &str) -> Option<&Route> {
        self.routes.get(path)
    }

    /// Answers a plain (non-upgrade) request.
    pub fn respond(&self, request: &Request) -> Response {
        match self.lookup(request.path()) {
            Some(Route::Http(handler)) => handler(request).unwrap_or_else(|err| {
                tracing::error!(path = request.path(), %err, "Handler failed");

                Response::internal_error(&err.to_string())
            }),
            Some(Route::WebSocket(_)) => Response::upgrade_required(),
            None => Response::not_found(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::Recorder;

    fn router() -> Router {
        Router::new()
            .route("/hello", |request| {
                Ok(Response::text(
                    200,
                    format!("hello {}", request.query().unwrap_or("world")),
                ))
            })
            .route("/fail", |_| Err(HandlerError::new("boom")))
            .route("/old", |_| Ok(Response::redirect("/new/")))
            .websocket("/ws", |_| Recorder::default())
    }

    #[test]
    fn http_route() {
        let response = router().respond(&Request::new("GET", "/hello?you", &[]));

        assert_eq!(response.status(), 200);
        assert_eq!(response.body(), b"hello you");
    }

    #[test]
    fn unknown_path() {
        let response = router().respond(&Request::new("GET", "/favicon.ico", &[]));

        assert_eq!(response.status(), 404);
        assert_eq!(response.body(), b"Not found");
    }

    #[test]
    fn handler_error_is_500() {
        let response = router().respond(&Request::new("GET", "/fail", &[]));

        assert_eq!(response.status(), 500);
        assert!(response.body().ends_with(b"boom"));
    }

    #[test]
    fn redirect() {
        let response = router().respond(&Request::new("GET", "/old", &[]));

        assert_eq!(response.status(), 302);
        assert_eq!(response.header("Location"), Some("/new/"));
    }

    #[test]
    fn websocket_path_without_upgrade() {
        let router = router();

        assert!(matches!(router.lookup("/ws"), Some(Route::WebSocket(_))));
        assert_eq!(
            router.respond(&Request::new("GET", "/ws", &[])).status(),
            426
        );
    }
}
