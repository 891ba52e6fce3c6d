//! Controllers: per-request context plus the shim that runs actions.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tsu_mvc::{Actions, Controller, Router, Views};
//!
//! # fn app(views: Arc<Views>) -> Router {
//! let home = Actions::new(views, "home")
//!     .init(|c| { c.set("title", "Home"); })
//!     .bind("index", index);
//!
//! Router::new().mount(home)
//! # }
//!
//! async fn index(mut c: Controller) -> Controller {
//!     let name = c.get_string("name", "world");
//!     c.render_action_model(&name);
//!     c
//! }
//! ```

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error};

use crate::handler::{BoxFuture, BoxedHandler, Handler};
use crate::request::Request;
use crate::response::{IntoResponse, Response};
use crate::status::Status;
use crate::view::{ViewBag, ViewContext, Views};

/// Everything one request's action works with.
///
/// Built fresh for every request and dropped with it. The render and
/// content helpers write the response; returning the controller from the
/// action sends it.
pub struct Controller {
    views: Arc<Views>,
    request: Request,
    response: Response,
    name: String,
    action: String,
    /// Values templates see as `bag`.
    pub bag: ViewBag,
    /// Cleared by an [`Actions::init`] hook to skip the action.
    pub execute: bool,
}

impl Controller {
    pub fn new(views: Arc<Views>, request: Request, name: &str, action: &str) -> Self {
        Self {
            views,
            request,
            response: Response::default(),
            name: name.to_owned(),
            action: action.to_owned(),
            bag: ViewBag::new(),
            execute: true,
        }
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn action(&self) -> &str { &self.action }
    pub fn request(&self) -> &Request { &self.request }
    pub fn response(&self) -> &Response { &self.response }

    /// Puts a serializable value in the bag.
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) {
        self.bag.insert(key.to_owned(), minijinja::Value::from_serialize(&value));
    }

    /// Marks the action as not to be run. The response written so far is sent.
    pub fn skip(&mut self) {
        self.execute = false;
    }

    pub fn set_response(&mut self, response: Response) {
        self.response = response;
    }

    /// `303 See Other` to `location`.
    pub fn redirect(&mut self, location: &str) {
        self.response = Response::builder()
            .status(Status::SeeOther)
            .header("location", location)
            .no_body();
    }

    // ── Views ─────────────────────────────────────────────────────────────────

    /// Renders `view` of this controller: the `base.html` of
    /// `root/<controller>/<view>`, falling back to `root/<controller>` and
    /// then `root`.
    pub fn render(&mut self, view: &str) {
        let ctx = self.view_context(view);
        self.response = self.views.render(&ctx);
    }

    /// [`render`](Self::render) with a model, visible to templates as `model`.
    pub fn render_model<M: Serialize + ?Sized>(&mut self, view: &str, model: &M) {
        let ctx = self.view_context(view).with_model(model);
        self.response = self.views.render(&ctx);
    }

    /// Renders the view named after the current action.
    pub fn render_action(&mut self) {
        let view = self.action.clone();
        self.render(&view);
    }

    pub fn render_action_model<M: Serialize + ?Sized>(&mut self, model: &M) {
        let view = self.action.clone();
        self.render_model(&view, model);
    }

    fn view_context(&self, view: &str) -> ViewContext {
        ViewContext::new(self.name.as_str(), view, self.bag.clone())
    }

    // ── Content ───────────────────────────────────────────────────────────────

    /// Writes `model` as JSON.
    pub fn json<M: Serialize + ?Sized>(&mut self, model: &M) {
        self.response = match serde_json::to_vec(model) {
            Ok(body) => Response::json(body),
            Err(e) => {
                error!(controller = %self.name, action = %self.action, "json encoding failed: {e}");
                Response::error(Status::InternalServerError, &e.to_string())
            }
        };
    }

    pub fn text(&mut self, text: impl Into<String>) {
        self.response = Response::text(text);
    }

    // ── Query parameters ──────────────────────────────────────────────────────

    /// Every value of the query parameter `key`.
    pub fn get_strings(&self, key: &str) -> Vec<String> {
        self.request.query_all(key).into_iter().map(str::to_owned).collect()
    }

    /// The first value of `key`, or `default` when the parameter is absent.
    pub fn get_string(&self, key: &str, default: &str) -> String {
        self.request.query(key).unwrap_or(default).to_owned()
    }

    /// The first value of `key` as a base-10 integer, or `default` when it
    /// is absent, empty or not a number.
    pub fn get_int64(&self, key: &str, default: i64) -> i64 {
        self.request.query(key)
            .and_then(|s| s.parse().ok())
            .unwrap_or(default)
    }

    /// Like [`get_int64`](Self::get_int64); values outside `i32` also give `default`.
    pub fn get_int(&self, key: &str, default: i32) -> i32 {
        i32::try_from(self.get_int64(key, i64::from(default))).unwrap_or(default)
    }
}

impl IntoResponse for Controller {
    fn into_response(self) -> Response { self.response }
}

// ── Actions ───────────────────────────────────────────────────────────────────

type Init = Arc<dyn Fn(&mut Controller) + Send + Sync + 'static>;

/// A bound action with its future boxed, so actions of one controller share a type.
type Action = Arc<dyn Fn(Controller) -> BoxFuture + Send + Sync + 'static>;

/// The actions of one controller, sharing one [`init`](Self::init) hook.
///
/// Every request to a bound action builds a fresh [`Controller`], runs the
/// hook on it and then, unless the hook called [`Controller::skip`], the
/// action.
pub struct Actions {
    views: Arc<Views>,
    controller: Arc<str>,
    init: Init,
    actions: Vec<(String, Action)>,
}

impl Actions {
    pub fn new(views: Arc<Views>, controller: &str) -> Self {
        Self { views, controller: Arc::from(controller), init: Arc::new(|_: &mut Controller| {}), actions: Vec::new() }
    }

    pub fn controller(&self) -> &str {
        &self.controller
    }

    /// Runs before every bound action of this controller, whether it was
    /// bound before or after this call. A later call replaces the hook.
    pub fn init(mut self, init: impl Fn(&mut Controller) + Send + Sync + 'static) -> Self {
        self.init = Arc::new(init);
        self
    }

    /// Binds `action` for [`Router::mount`](crate::Router::mount), which
    /// routes it at `GET /<controller>/<action>`.
    pub fn bind<A, Fut, R>(mut self, action: &str, run: A) -> Self
    where
        A: Fn(Controller) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse + Send + 'static,
    {
        self.actions.push((action.to_owned(), erase(run)));
        self
    }

    /// A handler running `action`, for routing by hand with [`Router::on`](crate::Router::on).
    ///
    /// The handler runs the [`init`](Self::init) hook set when this is called.
    pub fn handler<A, Fut, R>(&self, action: &str, run: A) -> impl Handler + use<A, Fut, R>
    where
        A: Fn(Controller) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse + Send + 'static,
    {
        self.dispatch(action, erase(run))
    }

    /// The bound actions as route handlers, each running the final init hook.
    pub(crate) fn into_routes(self) -> Vec<(String, BoxedHandler)> {
        self.actions.iter()
            .map(|(action, run)| {
                let handler = self.dispatch(action, Arc::clone(run)).into_boxed_handler();
                (action.clone(), handler)
            })
            .collect()
    }

    fn dispatch(&self, action: &str, run: Action) -> impl Handler + use<> {
        let views = Arc::clone(&self.views);
        let controller = Arc::clone(&self.controller);
        let init = Arc::clone(&self.init);
        let action: Arc<str> = Arc::from(action);

        move |req: Request| {
            let mut c = Controller::new(Arc::clone(&views), req, &controller, &action);
            init(&mut c);
            let run = Arc::clone(&run);

            async move {
                if !c.execute {
                    debug!(controller = %c.name, action = %c.action, "action skipped");
                    return c.into_response();
                }
                run(c).await
            }
        }
    }
}

fn erase<A, Fut, R>(run: A) -> Action
where
    A: Fn(Controller) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    Arc::new(move |c: Controller| -> BoxFuture {
        let fut = run(c);
        Box::pin(async move { fut.await.into_response() })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::Method;

    fn controller(uri: &str) -> Controller {
        Controller::new(Arc::new(Views::new()), Request::new(Method::Get, uri), "home", "index")
    }

    #[test]
    fn query_getters_fall_back_to_defaults() {
        let c = controller("/?s=abc&n=42&bad=4x&empty=&big=9999999999&l=a&l=b");

        assert_eq!(c.get_string("s", "d"), "abc");
        assert_eq!(c.get_string("missing", "d"), "d");
        assert_eq!(c.get_string("empty", "d"), "");
        assert_eq!(c.get_strings("l"), vec!["a", "b"]);
        assert!(c.get_strings("missing").is_empty());

        assert_eq!(c.get_int64("n", 7), 42);
        assert_eq!(c.get_int64("bad", 7), 7);
        assert_eq!(c.get_int64("empty", 7), 7);
        assert_eq!(c.get_int64("missing", 7), 7);
        assert_eq!(c.get_int("n", 7), 42);
        assert_eq!(c.get_int("big", 7), 7);
        assert_eq!(c.get_int64("big", 7), 9_999_999_999);
    }

    #[test]
    fn json_and_text_set_content_type() {
        let mut c = controller("/");
        c.json(&serde_json::json!({ "id": 1 }));
        assert_eq!(c.response().header("content-type"), Some("application/json"));
        assert_eq!(c.response().body(), br#"{"id":1}"#);

        c.text("hello");
        assert_eq!(c.response().header("content-type"), Some("text/plain; charset=utf-8"));
        assert_eq!(c.response().body(), b"hello");
    }

    #[test]
    fn untouched_controller_answers_empty_ok() {
        let res = controller("/").into_response();
        assert_eq!(res.status_code(), 200);
        assert!(res.body().is_empty());
    }

    #[test]
    fn redirect_sets_location() {
        let mut c = controller("/");
        c.redirect("/login");
        assert_eq!(c.response().status_code(), 303);
        assert_eq!(c.response().header("location"), Some("/login"));
    }
}
