//! Radix-tree request router.
//!
//! One tree per HTTP method, O(path-length) lookup. Controllers are routed
//! by convention through [`Router::mount`]; anything else by hand with
//! [`Router::on`].

use std::collections::HashMap;
use std::sync::Arc;

use matchit::Router as MatchitRouter;

use crate::controller::Actions;
use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

/// The application router.
///
/// Build it once at startup and pass it to [`Server::serve`](crate::Server::serve).
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves them.
    ///
    /// # Panics
    ///
    /// Panics if the path is malformed or conflicts with a registered route.
    pub fn on(self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.add(method, path, handler.into_boxed_handler())
    }

    /// Routes every action bound on `actions` at `GET /<controller>/<action>`.
    /// An `index` action also answers `GET /<controller>`.
    ///
    /// ```rust,no_run
    /// # use std::sync::Arc;
    /// # use tsu_mvc::{Actions, Controller, Router, Views};
    /// # async fn index(c: Controller) -> Controller { c }
    /// # async fn contact(c: Controller) -> Controller { c }
    /// # let views = Arc::new(Views::new());
    /// // GET /home, GET /home/index, GET /home/contact
    /// Router::new().mount(
    ///     Actions::new(views, "home")
    ///         .bind("index", index)
    ///         .bind("contact", contact),
    /// );
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if a route conflicts with one already registered, e.g. when the
    /// same action is bound twice or the controller is mounted twice.
    pub fn mount(mut self, actions: Actions) -> Self {
        let controller = actions.controller().to_owned();
        for (action, handler) in actions.into_routes() {
            if action == "index" {
                self = self.add(Method::Get, &format!("/{controller}"), Arc::clone(&handler));
            }
            self = self.add(Method::Get, &format!("/{controller}/{action}"), handler);
        }
        self
    }

    fn add(mut self, method: Method, path: &str, handler: BoxedHandler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler)
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    /// Routes `req` and runs its handler.
    ///
    /// Unknown paths answer `404`; paths registered only under other methods
    /// answer `405`.
    pub async fn handle(&self, mut req: Request) -> Response {
        let Some((handler, params)) = self.lookup(req.method(), req.path()) else {
            let allowed = Method::ALL.into_iter()
                .any(|m| self.lookup(m, req.path()).is_some());
            return Response::status(if allowed { Status::MethodNotAllowed } else { Status::NotFound });
        };

        req.params = params;
        handler.call(req).await
    }

    fn lookup(&self, method: Method, path: &str) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(&method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::Controller;
    use crate::view::Views;

    async fn show(req: Request) -> Response {
        Response::text(req.param("id").unwrap_or("none").to_owned())
    }

    #[tokio::test]
    async fn routes_by_method_and_path() {
        let router = Router::new().on(Method::Get, "/users/{id}", show);

        let res = router.handle(Request::new(Method::Get, "/users/42")).await;
        assert_eq!(res.body(), b"42");

        let res = router.handle(Request::new(Method::Post, "/users/42")).await;
        assert_eq!(res.status_code(), 405);

        let res = router.handle(Request::new(Method::Get, "/nope")).await;
        assert_eq!(res.status_code(), 404);
    }

    #[test]
    #[should_panic(expected = "invalid route `/home/index`")]
    fn mounting_an_action_twice_panics() {
        async fn index(c: Controller) -> Controller { c }

        let views = Arc::new(Views::new());
        let _ = Router::new()
            .mount(Actions::new(views, "home").bind("index", index).bind("index", index));
    }
}
