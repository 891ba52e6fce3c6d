//! Filters and functions every view template can call.
//!
//! ## Filters
//!
//! - `noescape` - emit a string unescaped, e.g. an HTML comment
//! - `rawurl` - emit a URL unescaped
//! - `lower` / `upper` - case transforms (minijinja built-ins)
//!
//! ## Functions
//!
//! The predicates mirror [`ViewContext`](super::ViewContext) and check the
//! controller and view of the render in progress, whatever local variables
//! named `name` or `controller` are in scope:
//!
//! ```jinja
//! <li class="{% if is_action_for_controller('index', 'home') %}active{% endif %}">
//! ```

use minijinja::{Environment, State, Value};

use super::context::IDENTITY_KEY;

/// Register the view filters and predicate functions on `env`.
pub(crate) fn register(env: &mut Environment<'static>) {
    env.add_filter("noescape", |s: String| Value::from_safe_string(s));
    env.add_filter("rawurl", |s: String| Value::from_safe_string(s));

    env.add_function("is_view", is_view);
    env.add_function("is_action", is_view);
    env.add_function("is_controller", is_controller);
    env.add_function("is_view_for_controller", is_view_for_controller);
    env.add_function("is_action_for_controller", is_view_for_controller);
}

fn is_view(state: &State, name: &str) -> bool {
    root_is(state, "name", name)
}

fn is_controller(state: &State, controller: &str) -> bool {
    root_is(state, "controller", controller)
}

fn is_view_for_controller(state: &State, view: &str, controller: &str) -> bool {
    is_view(state, view) && is_controller(state, controller)
}

fn root_is(state: &State, key: &str, expected: &str) -> bool {
    state
        .lookup(IDENTITY_KEY)
        .and_then(|identity| identity.get_attr(key).ok())
        .is_some_and(|v| v.as_str() == Some(expected))
}
