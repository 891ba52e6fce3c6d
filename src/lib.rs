//! # tsu-mvc
//!
//! Controllers, actions and nested view directories on a small hyper
//! server. Name things by convention and the framework finds the template.
//!
//! ## Views
//!
//! A view is a directory. Its templates are the `*.html` files in it plus
//! those of every ancestor up to the view root, a deeper file shadowing an
//! ancestor's file of the same name. Rendering executes `base.html`.
//!
//! ```text
//! views/
//!   base.html                 Top: {% include "content.html" %}
//!   home/
//!     base.html               a {% include "content.html" %}
//!     index/content.html      plane
//!     contact/content.html    bird
//!   user/
//!     base.html               Hello {% include "content.html" %}
//!     index/content.html      {{ model }}
//! ```
//!
//! `home/index` renders `a plane`, `home/contact` renders `a bird`, and
//! `user/index` with the model `"everyone"` renders `Hello everyone`. A view
//! with no directory of its own falls back to its controller's directory and
//! then to the root.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tsu_mvc::{Actions, Controller, Router, Server, Views};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), tsu_mvc::Error> {
//!     let views = Arc::new(Views::new());
//!     views.setup("views")?;
//!
//!     let app = Router::new().mount(
//!         Actions::new(Arc::clone(&views), "user").bind("index", index),
//!     );
//!
//!     Server::bind("0.0.0.0:3000")?.serve(app).await
//! }
//!
//! async fn index(mut c: Controller) -> Controller {
//!     c.render_action_model(&"everyone");
//!     c
//! }
//! ```

mod controller;
mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;
mod view;

pub use controller::{Actions, Controller};
pub use error::{Error, RenderError};
pub use handler::Handler;
pub use method::Method;
pub use request::Request;
pub use response::{ContentType, IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
pub use status::Status;
pub use view::{ViewBag, ViewContext, ViewOptions, Views};

/// Re-exported so bag values and models can be built without a direct
/// `minijinja` dependency.
pub use minijinja::Value;
