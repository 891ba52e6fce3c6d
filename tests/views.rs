use std::fs;
use std::path::Path;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use tempfile::TempDir;
use tsu_mvc::{
    Actions, Controller, Error, Method, Request, Response, Router, Status, ViewBag, ViewContext,
    Views,
};

fn template(dir: &Path, name: &str, content: &str) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join(name), content).unwrap();
}

/// root, home, user and admin controllers, each exercising a different
/// level of the override chain.
fn view_tree() -> TempDir {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();

    template(root, "base.html", r#"Top: {% include "content.html" %}"#);

    let home = root.join("home");
    template(&home, "base.html", r#"a {% include "content.html" %}"#);
    template(&home.join("index"), "content.html", "plane");
    template(&home.join("contact"), "content.html", "bird");

    let user = root.join("user");
    template(&user, "base.html", r#"Hello {% include "content.html" %}"#);
    template(&user.join("index"), "content.html", "{{ model }}");

    template(&root.join("admin/index"), "content.html", "level");
    fs::create_dir_all(root.join("empty/nested")).unwrap();

    tmp
}

fn views(tmp: &TempDir) -> Arc<Views> {
    let views = Arc::new(Views::new());
    views.setup(tmp.path()).unwrap();
    views
}

async fn render_action(mut c: Controller) -> Controller {
    c.render_action();
    c
}

async fn render_everyone(mut c: Controller) -> Controller {
    c.render_action_model(&"everyone");
    c
}

async fn get(router: &Router, uri: &str) -> Response {
    router.handle(Request::new(Method::Get, uri)).await
}

fn body(res: &Response) -> &str {
    std::str::from_utf8(res.body()).unwrap()
}

#[tokio::test]
async fn actions_render_through_the_override_chain() {
    let tmp = view_tree();
    let views = views(&tmp);

    let router = Router::new()
        .mount(
            Actions::new(Arc::clone(&views), "home")
                .bind("index", render_action)
                .bind("contact", render_action),
        )
        .mount(Actions::new(Arc::clone(&views), "user").bind("index", render_everyone))
        .mount(Actions::new(Arc::clone(&views), "admin").bind("index", render_action));

    for (uri, expected) in [
        ("/home/index", "a plane"),
        ("/home", "a plane"),
        ("/home/contact", "a bird"),
        ("/user/index", "Hello everyone"),
        ("/admin/index", "Top: level"),
    ] {
        let res = get(&router, uri).await;
        assert_eq!(res.status_code(), 200, "{uri}");
        assert_eq!(res.header("content-type"), Some("text/html; charset=utf-8"));
        assert_eq!(body(&res), expected, "{uri}");
    }
}

#[test]
fn directories_without_templates_get_no_view() {
    let tmp = view_tree();
    let views = views(&tmp);
    let root = tmp.path();

    let dirs = views.directories();
    assert!(dirs.contains(&root));
    assert!(dirs.contains(&root.join("home/index").as_path()));
    assert!(dirs.contains(&root.join("admin").as_path()));
    // `empty` inherits the root's base.html, so it is a view too.
    assert!(dirs.contains(&root.join("empty/nested").as_path()));

    let bare = tempfile::tempdir().unwrap();
    fs::create_dir_all(bare.path().join("a/b")).unwrap();
    template(&bare.path().join("a/b"), "base.html", "b");
    let views = Views::new();
    views.setup(bare.path()).unwrap();
    assert_eq!(views.directories(), vec![bare.path().join("a/b").as_path()]);
}

#[test]
fn missing_view_falls_back_to_controller_then_root() {
    let tmp = view_tree();
    let views = views(&tmp);
    let render = |controller: &str, view: &str| {
        views.render_to_string(&ViewContext::new(controller, view, ViewBag::new()))
    };

    // home/ has no content.html of its own, so include fails at execution.
    assert!(render("home", "unknown").is_err());
    // admin/ inherits only the root base.html; the root has no content.html.
    assert!(render("admin", "unknown").is_err());

    template(&tmp.path().join("other"), "base.html", "other {{ name }}");
    let fresh = Views::new();
    fresh.setup(tmp.path()).unwrap();
    let render = |controller: &str, view: &str| {
        fresh.render_to_string(&ViewContext::new(controller, view, ViewBag::new())).unwrap()
    };
    assert_eq!(render("other", "anything"), "other anything");
}

#[tokio::test]
async fn unresolvable_view_is_a_server_error_not_a_crash() {
    let tmp = tempfile::tempdir().unwrap();
    template(&tmp.path().join("home"), "base.html", "home only");
    let views = views(&tmp);

    let router = Router::new()
        .mount(Actions::new(Arc::clone(&views), "nobody").bind("index", render_action));

    let res = get(&router, "/nobody/index").await;
    assert_eq!(res.status_code(), 500);
    assert_eq!(
        body(&res),
        format!("The templates for {} were not found.\n", tmp.path().display()),
    );
}

#[tokio::test]
async fn execution_errors_are_server_errors() {
    let tmp = tempfile::tempdir().unwrap();
    template(tmp.path(), "base.html", r#"{% include "missing.html" %}"#);
    let views = views(&tmp);

    let router = Router::new()
        .mount(Actions::new(Arc::clone(&views), "home").bind("index", render_action));

    let res = get(&router, "/home/index").await;
    assert_eq!(res.status_code(), 500);
    assert!(body(&res).contains("missing.html"));
}

#[test]
fn second_setup_fails_and_keeps_first_views() {
    let tmp = view_tree();
    let views = views(&tmp);

    let other = tempfile::tempdir().unwrap();
    template(other.path(), "base.html", "other");

    assert!(matches!(views.setup(other.path()), Err(Error::AlreadyInitialized)));
    let ctx = ViewContext::new("home", "contact", ViewBag::new());
    assert_eq!(views.render_to_string(&ctx).unwrap(), "a bird");
}

#[tokio::test]
async fn init_hook_fills_bag_and_can_skip() {
    let tmp = tempfile::tempdir().unwrap();
    template(
        tmp.path(),
        "base.html",
        "{{ bag.title }}|{{ controller }}/{{ action }}|{% if is_action_for_controller('index', 'shop') %}on{% endif %}",
    );
    let views = views(&tmp);

    let shop = Actions::new(Arc::clone(&views), "shop").init(|c| {
        if c.get_string("auth", "") != "yes" {
            c.redirect("/login");
            c.skip();
            return;
        }
        c.set("title", "Shop");
    });
    let index = shop.handler("index", render_action);
    let router = Router::new()
        .on(Method::Get, "/shop", index)
        .mount(shop.bind("cart", render_action));

    let res = get(&router, "/shop?auth=yes").await;
    assert_eq!(body(&res), "Shop|shop/index|on");

    let res = get(&router, "/shop/cart?auth=yes").await;
    assert_eq!(body(&res), "Shop|shop/cart|");

    let res = get(&router, "/shop/cart").await;
    assert_eq!(res.status_code(), 303);
    assert_eq!(res.header("location"), Some("/login"));
    assert!(res.body().is_empty());
}

#[tokio::test]
async fn init_hook_runs_for_actions_bound_before_it() {
    let tmp = view_tree();
    let views = views(&tmp);

    let admin = Actions::new(Arc::clone(&views), "admin")
        .bind("index", render_action)
        .init(|c| c.skip());
    let router = Router::new().mount(admin);

    let res = get(&router, "/admin/index").await;
    assert_eq!(res.status_code(), 200);
    assert!(res.body().is_empty());

    let res = get(&router, "/admin").await;
    assert!(res.body().is_empty());
}

#[tokio::test]
async fn actions_can_answer_with_plain_responses() {
    let tmp = view_tree();
    let views = views(&tmp);

    let api = Actions::new(Arc::clone(&views), "api")
        .bind("status", |c: Controller| async move {
            let mut c = c;
            c.json(&serde_json::json!({ "page": c.get_int("page", 1) }));
            c
        })
        .bind("gone", |_c: Controller| async { Status::NotFound });
    let router = Router::new().mount(api);

    let res = get(&router, "/api/status?page=3").await;
    assert_eq!(res.header("content-type"), Some("application/json"));
    assert_eq!(body(&res), r#"{"page":3}"#);

    let res = get(&router, "/api/gone").await;
    assert_eq!(res.status_code(), 404);
}
