//! Request routing.
//!
//! Registered routes are looked up by the exact key `METHOD:path`, where the
//! path has any `?query` or `#fragment` suffix removed. Anything
//! else resolves against the file catalogue: the request path is prefixed
//! with the document root and looked up verbatim, a `GET` for a directory
//! path falls back to its `index.html`, and a miss is a 404.

pub mod catalogue;
pub mod handlers;

use tracing::debug;

use crate::collections::{AssocList, SetOutcome};
use crate::http::request::{Method, Request};
use crate::http::response::Response;

pub use catalogue::{Catalogue, CatalogueError, File, content_type_for};
pub use handlers::Handler;

#[derive(Debug, Clone)]
pub struct Route {
    pub path: String,
    pub method: Method,
    pub handler: Handler,
}

/// Route table key for `method` and `path`.
pub fn route_key(method: Method, path: &str) -> String {
    format!("{}:{}", method, path)
}

/// Immutable after startup; shared by reference with the event loop.
pub struct Router {
    routes: AssocList<Route>,
    catalogue: Catalogue,
}

impl Router {
    /// A router with no registered routes.
    pub fn new(catalogue: Catalogue) -> Self {
        Self {
            routes: AssocList::new(),
            catalogue,
        }
    }

    /// A router with the home page registered at `GET /`.
    pub fn with_default_routes(catalogue: Catalogue) -> Self {
        let mut router = Self::new(catalogue);
        router.register(Method::GET, "/", handlers::home);
        router
    }

    /// Registers `handler`, replacing any handler already at the same key.
    pub fn register(&mut self, method: Method, path: &str, handler: Handler) -> SetOutcome {
        let route = Route {
            path: path.to_string(),
            method,
            handler,
        };
        self.routes.set(route_key(method, path), route)
    }

    pub fn route(&self, method: Method, path: &str) -> Option<&Route> {
        self.routes.get(&route_key(method, path))
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    /// Produces the response for `req`.
    pub fn dispatch(&self, req: &Request) -> Response {
        match self.route(req.method, req.resource_path()) {
            Some(route) => {
                debug!(method = %req.method, path = %req.path, "Dispatching to registered route");
                (route.handler)(req, &self.catalogue)
            }
            None => self.resolve_static(req),
        }
    }

    /// Resolves `req` against the file catalogue.
    pub fn resolve_static(&self, req: &Request) -> Response {
        let local = self.catalogue.local_path(req.resource_path());

        if let Some(file) = self.catalogue.get(&local) {
            return handlers::serve_file(file);
        }

        if req.method == Method::GET && local.ends_with('/') {
            let index = format!("{}index.html", local);
            if let Some(file) = self.catalogue.get(&index) {
                return handlers::serve_file(file);
            }
        }

        debug!(method = %req.method, path = %req.path, local = %local, "No route or file matched");
        handlers::not_found(req, &self.catalogue)
    }
}
