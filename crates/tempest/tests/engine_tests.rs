/// Template engine behaviour through the public API
///
/// Covers substitution, flags, hooks, context passes and the
/// single-sweep guarantee (substituted text is never scanned again).

use pretty_assertions::assert_eq;
use rstest::rstest;
use tempest::{Bindable, Diagnostic, Engine, HookRegistry, Template, Value};

fn engine() -> Engine {
    Engine::default()
}

#[derive(Debug)]
struct User {
    first: String,
    last: String,
}

impl Bindable for User {
    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "first" => Some(self.first.as_str().into()),
            "last" => Some(self.last.as_str().into()),
            _ => None,
        }
    }

    fn call(&self, method: &str) -> Option<Value> {
        match method {
            "full_name" => Some(format!("{} {}", self.first, self.last).into()),
            "manager" => Some(Value::Null),
            _ => None,
        }
    }

    fn display(&self) -> Option<String> {
        Some(self.first.clone())
    }
}

fn ada() -> Value {
    Value::record(User {
        first: "Ada".to_string(),
        last: "Lovelace".to_string(),
    })
}

#[test]
fn test_hello_world() {
    let data = Value::object([("name", "World")]);
    assert_eq!(engine().render("Hello {{ name }}!", &data, None), "Hello World!");
}

#[rstest]
#[case("")]
#[case("<p>no markers here</p>")]
#[case("{ single } braces {{ }} and {{ two words }}")]
fn test_text_without_tokens_is_unchanged(#[case] text: &str) {
    let data = Value::object([("name", "World")]);
    assert_eq!(engine().render(text, &data, None), text);
}

#[test]
fn test_rendering_output_again_is_a_no_op() {
    let data = Value::object([("name", "World"), ("title", "Home")]);
    let once = engine().render("<h1>{{ title }}</h1> {{ name }}", &data, None);
    assert_eq!(engine().render(&once, &data, None), once);
}

#[test]
fn test_escape_flag() {
    let data = Value::object([("bio", "<b>x</b>")]);
    assert_eq!(engine().render("{{ !bio }}", &data, None), "&lt;b&gt;x&lt;/b&gt;");
    assert_eq!(engine().render("{{ bio }}", &data, None), "<b>x</b>");
}

#[test]
fn test_null_as_empty_flag() {
    let without = Value::object([("other", "x")]);
    assert_eq!(engine().render("{{ ?missing }}", &without, None), "{{ ?missing }}");

    let with_null = Value::object([("missing", Value::Null)]);
    assert_eq!(engine().render("{{ ?missing }}", &with_null, None), "");
    assert_eq!(engine().render("{{ missing }}", &with_null, None), "null");
}

#[test]
fn test_omit_flag_removes_unresolved_marker() {
    let data = Value::object([("name", "Ada")]);
    assert_eq!(
        engine().render("[{{ ~nickname }}] [{{ ~name }}]", &data, None),
        "[] [Ada]"
    );
}

#[test]
fn test_hook() {
    let data = Value::object([("name", "bob")]);
    assert_eq!(engine().render("{{ name:ucase }}", &data, None), "BOB");
}

#[test]
fn test_hooks_apply_in_order() {
    let data = Value::object([("name", "  bob smith ")]);
    assert_eq!(
        engine().render("{{ name:trim:ucwords }}", &data, None),
        "Bob Smith"
    );
    assert_eq!(
        engine().render("{{ name : trim length }}", &data, None),
        "9"
    );
}

#[test]
fn test_escape_runs_before_hooks() {
    let data = Value::object([("bio", "<i>hi</i>")]);
    assert_eq!(
        engine().render("{{ !bio:striptags }}", &data, None),
        "&lt;i&gt;hi&lt;/i&gt;"
    );
    assert_eq!(engine().render("{{ bio:striptags }}", &data, None), "hi");
}

#[test]
fn test_null_collapse_happens_before_hooks() {
    let data = Value::object([("missing", Value::Null)]);
    assert_eq!(engine().render("{{ ?missing:length }}", &data, None), "0");
}

#[test]
fn test_unknown_hook_leaves_value_and_reports() {
    let data = Value::object([("name", "bob")]);
    let rendered = engine().render_report("{{ name:shout:ucase }}", &data, None);

    assert_eq!(rendered.text, "BOB");
    assert_eq!(
        rendered.diagnostics,
        vec![Diagnostic::UnknownHook {
            token: "{{ name:shout:ucase }}".to_string(),
            hook: "shout".to_string(),
        }]
    );
}

#[test]
fn test_custom_hook_registry() {
    let engine = Engine::new(HookRegistry::new().with("shout", |s| format!("{}!", s)));
    let data = Value::object([("name", "bob")]);

    assert_eq!(engine.render("{{ name:shout }}", &data, None), "bob!");
    assert_eq!(engine.render("{{ name:ucase }}", &data, None), "bob");
}

#[test]
fn test_dotted_paths_and_methods() {
    let data = Value::object([
        ("user", ada()),
        ("site", Value::object([("meta", Value::object([("title", "Docs")]))])),
    ]);

    assert_eq!(
        engine().render(
            "{{ site.meta.title }}: {{ user.full_name() }} ({{ user.last }})",
            &data,
            None
        ),
        "Docs: Ada Lovelace (Lovelace)"
    );
}

#[test]
fn test_record_display_and_null_method() {
    let data = Value::object([("user", ada())]);
    assert_eq!(engine().render("{{ user }}", &data, None), "Ada");
    assert_eq!(engine().render("[{{ ?user.manager() }}]", &data, None), "[]");
}

#[test]
fn test_failing_step_only_affects_its_token() {
    let data = Value::object([("user", ada())]);
    let rendered = engine().render_report("{{ user.first }} {{ user.middle.initial }}", &data, None);

    assert_eq!(rendered.text, "Ada {{ user.middle.initial }}");
    assert_eq!(rendered.diagnostics.len(), 1);
    assert!(matches!(
        &rendered.diagnostics[0],
        Diagnostic::UnresolvedPath { path, .. } if path == "user.middle.initial"
    ));
}

#[rstest]
#[case(Value::Bool(true), "true")]
#[case(Value::Bool(false), "false")]
#[case(Value::Number(42.0), "42")]
#[case(Value::Number(0.25), "0.25")]
#[case(Value::from("text"), "text")]
fn test_scalar_display(#[case] value: Value, #[case] expected: &str) {
    let data = Value::object([("v", value)]);
    assert_eq!(engine().render("{{ v }}", &data, None), expected);
}

#[test]
fn test_collections_render_empty_with_diagnostic() {
    let data = Value::object([
        ("tags", Value::Array(vec!["a".into(), "b".into()])),
        ("meta", Value::object([("k", "v")])),
    ]);
    let rendered = engine().render_report("<{{ tags }}><{{ meta }}>", &data, None);

    assert_eq!(rendered.text, "<><>");
    assert!(rendered
        .diagnostics
        .iter()
        .all(|d| matches!(d, Diagnostic::CollectionValue { .. })));
    assert_eq!(rendered.diagnostics.len(), 2);
}

#[test]
fn test_substituted_text_is_not_rescanned() {
    let data = Value::object([("a", "{{ b }}"), ("b", "gotcha")]);
    assert_eq!(engine().render("{{ a }} {{ b }}", &data, None), "{{ b }} gotcha");
}

#[test]
fn test_identical_markers_are_all_replaced() {
    let data = Value::object([("x", "1")]);
    assert_eq!(engine().render("{{ x }}-{{ x }}-{{x}}", &data, None), "1-1-1");
}

#[test]
fn test_context_restricted_tokens_survive_other_passes() {
    let data = Value::object([("name", "Ada"), ("title", "Users")]);

    assert_eq!(
        engine().render("{{ title }} {{ @row name }}", &data, None),
        "Users {{ @row name }}"
    );
    assert_eq!(
        engine().render("{{ title }} {{ @row name }}", &data, Some("row")),
        "{{ title }} Ada"
    );
}

#[test]
fn test_bind_in_two_passes_either_order() {
    let page = Value::object([("title", "Users")]);
    let row = Value::object([("name", "Ada")]);
    let source = Template::new("{{ title }}: {{ @row name }}");

    let mut first = source.duplicate();
    engine().bind(&mut first, &page, None);
    engine().bind(&mut first, &row, Some("row"));

    let mut second = source.duplicate();
    engine().bind(&mut second, &row, Some("row"));
    engine().bind(&mut second, &page, None);

    assert_eq!(first.content(), "Users: Ada");
    assert_eq!(second.content(), "Users: Ada");
    assert_eq!(source.content(), "{{ title }}: {{ @row name }}");
    assert!(first.is_bound());
}

#[test]
fn test_bind_returns_diagnostics() {
    let mut template = Template::new("{{ missing }}");
    let diagnostics = engine().bind(&mut template, &Value::object([("x", 1)]), None);

    assert_eq!(template.content(), "{{ missing }}");
    assert_eq!(diagnostics.len(), 1);
}

#[test]
fn test_render_each() {
    let item = Template::new("<li>{{ @item name:ucfirst }}</li>");
    let items = vec![
        Value::object([("name", "ada")]),
        Value::object([("name", "grace")]),
    ];

    assert_eq!(
        engine().render_each(&item, &items, Some("item"), "<li>none</li>"),
        "<li>Ada</li><li>Grace</li>"
    );
    assert_eq!(item.content(), "<li>{{ @item name:ucfirst }}</li>");
}

#[test]
fn test_render_each_empty_returns_fallback_verbatim() {
    let item = Template::new("<li>{{ name }}</li>");
    assert_eq!(
        engine().render_each(&item, &[], None, "<li>{{ name }} none</li>"),
        "<li>{{ name }} none</li>"
    );
}

#[test]
fn test_json_data() {
    let data = Value::from(serde_json::json!({
        "order": { "id": 1001, "total": 19.5, "paid": false }
    }));
    assert_eq!(
        engine().render("#{{ order.id }} {{ order.total }} {{ order.paid }}", &data, None),
        "#1001 19.5 false"
    );
}
