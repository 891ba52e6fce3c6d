//! The data a view template is executed with.

use std::collections::HashMap;

use minijinja::{Value, context};
use serde::Serialize;

/// Root key holding the controller and view names the template predicates
/// check. `@` cannot start an identifier, so no `set`, loop variable or macro
/// argument can shadow it.
pub(crate) const IDENTITY_KEY: &str = "@view";

/// Arbitrary per-request values visible to templates as `bag`.
pub type ViewBag = HashMap<String, Value>;

/// Per-render payload passed to a view's `base` template.
///
/// Templates see it as the root variables `controller`, `name` (also
/// available as `action`), `bag` and `model`:
///
/// ```jinja
/// <title>{{ bag.title }}</title>
/// {% if is_view_for_controller("index", "home") %}Welcome{% endif %}
/// {{ model.name }}
/// ```
#[derive(Debug, Clone)]
pub struct ViewContext {
    pub controller: String,
    pub name: String,
    pub bag: ViewBag,
    pub model: Value,
}

impl ViewContext {
    /// Builds a context with no model. `{{ model }}` renders empty.
    pub fn new(controller: impl Into<String>, name: impl Into<String>, bag: ViewBag) -> Self {
        Self {
            controller: controller.into(),
            name: name.into(),
            bag,
            model: Value::UNDEFINED,
        }
    }

    /// Attaches a model. Anything `Serialize` works: structs, maps, strings.
    pub fn with_model<M: Serialize + ?Sized>(mut self, model: &M) -> Self {
        self.model = Value::from_serialize(model);
        self
    }

    pub fn is_view(&self, name: &str) -> bool {
        self.name == name
    }

    pub fn is_controller(&self, controller: &str) -> bool {
        self.controller == controller
    }

    /// Views are named after the action that renders them, so this is
    /// [`is_view`](Self::is_view) under the action vocabulary.
    pub fn is_action(&self, action: &str) -> bool {
        self.is_view(action)
    }

    pub fn is_view_for_controller(&self, view: &str, controller: &str) -> bool {
        self.is_view(view) && self.is_controller(controller)
    }

    pub fn is_action_for_controller(&self, action: &str, controller: &str) -> bool {
        self.is_view_for_controller(action, controller)
    }

    pub(crate) fn to_value(&self) -> Value {
        let identity = Value::from_iter([
            ("controller", self.controller.as_str()),
            ("name", self.name.as_str()),
        ]);
        context! {
            controller => &self.controller,
            name => &self.name,
            action => &self.name,
            bag => &self.bag,
            model => &self.model,
            ..Value::from_iter([(IDENTITY_KEY, identity)])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ViewContext {
        ViewContext::new("home", "index", ViewBag::new())
    }

    #[test]
    fn predicates_check_own_fields() {
        let ctx = ctx();
        assert!(ctx.is_view("index"));
        assert!(!ctx.is_view("contact"));
        assert!(ctx.is_controller("home"));
        assert!(!ctx.is_controller("user"));
        assert!(ctx.is_action("index"));
        assert!(ctx.is_view_for_controller("index", "home"));
        assert!(!ctx.is_view_for_controller("index", "user"));
        assert!(!ctx.is_action_for_controller("contact", "home"));
    }

    #[test]
    fn model_defaults_to_undefined() {
        assert!(ctx().model.is_undefined());
    }

    #[test]
    fn with_model_serializes() {
        #[derive(Serialize)]
        struct User {
            name: &'static str,
        }

        let ctx = ctx().with_model(&User { name: "alice" });
        let name = ctx.model.get_attr("name").unwrap();
        assert_eq!(name.as_str(), Some("alice"));
    }
}
