//! Minimal tsu-mvc example: two controllers rendering from `demos/views`.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/home
//!   curl http://localhost:3000/home/contact
//!   curl 'http://localhost:3000/user?name=alice&tag=admin&tag=ops'
//!   curl http://localhost:3000/user/stats?page=2

use std::sync::Arc;

use serde::Serialize;
use tsu_mvc::{Actions, Controller, Router, Server, Views};

#[derive(Serialize)]
struct Profile {
    name: String,
    tags: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), tsu_mvc::Error> {
    tracing_subscriber::fmt::init();

    let views = Arc::new(Views::new());
    views.setup(concat!(env!("CARGO_MANIFEST_DIR"), "/demos/views"))?;

    let home = Actions::new(Arc::clone(&views), "home")
        .init(|c| {
            c.set("title", "Home");
            c.set("email", "hello@example.com");
            c.set("mailto", "mailto:hello@example.com?subject=Hi&body=tsu-mvc");
        })
        .bind("index", render)
        .bind("contact", render);

    let user = Actions::new(Arc::clone(&views), "user")
        .init(|c| c.set("title", "User"))
        .bind("index", profile)
        .bind("stats", stats);

    let app = Router::new().mount(home).mount(user);

    Server::bind("0.0.0.0:3000")?.serve(app).await
}

// GET /home, /home/index, /home/contact
async fn render(mut c: Controller) -> Controller {
    c.render_action();
    c
}

// GET /user?name=alice&tag=admin
async fn profile(mut c: Controller) -> Controller {
    let profile = Profile {
        name: c.get_string("name", "stranger"),
        tags: c.get_strings("tag"),
    };
    c.render_action_model(&profile);
    c
}

// GET /user/stats?page=2 → JSON
async fn stats(mut c: Controller) -> Controller {
    let page = c.get_int("page", 1);
    c.json(&serde_json::json!({ "page": page, "per_page": 20 }));
    c
}
