//! Rendering and reconciliation against the in-memory host.

mod common;

use act_core::*;
use common::{Counter, Slot, creates, init_tracing};
use pretty_assertions::assert_eq;

fn list(items: &[&str]) -> Element {
    let children: Vec<Node> = items
        .iter()
        .map(|item| create_element("li", Props::new(), [*item]).into())
        .collect();
    create_element("ul", Props::new(), children)
}

#[test]
fn test_div_with_text_child() {
    init_tracing();
    let comp = Component::new("Comp", |_, _| {
        Ok(create_element("div", Props::new().with("className", "x"), ["Hi"]).into())
    });

    let mut root = mount(MemoryHost::new());
    root.render_component(&comp, Props::new()).unwrap();

    let host = root.host();
    let created: Vec<&str> = host
        .mutations()
        .iter()
        .filter_map(|m| match m {
            Mutation::Create { ty, .. } => Some(ty.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(created, vec!["div", TEXT_ELEMENT]);

    let div = host.find_by_type("div")[0];
    assert_eq!(host.attr(div, "className"), Some(&Value::from("x")));
    let text_appends = host
        .mutations()
        .iter()
        .filter(|m| matches!(m, Mutation::Append { parent: Some(p), .. } if *p == div))
        .count();
    assert_eq!(text_appends, 1);
    assert_eq!(host.text_content(), "Hi");
    assert_eq!(host.to_markup(), "<div className=\"x\">Hi</div>");
}

#[test]
fn test_identical_render_issues_no_mutations() {
    init_tracing();
    let app = || {
        create_element(
            "div",
            Props::new().with("id", "app"),
            [Node::from(create_element("span", Props::new(), ["a"])), Node::from("b")],
        )
    };

    let mut root = mount(MemoryHost::new());
    root.render(app()).unwrap();
    assert_eq!(root.host().to_markup(), "<div id=\"app\"><span>a</span>b</div>");
    root.host_mut().take_mutations();

    root.render(app()).unwrap();
    assert!(root.host().mutations().is_empty(), "{:?}", root.host().mutations());
}

#[test]
fn test_changed_text_is_one_update() {
    let mut root = mount(MemoryHost::new());
    root.render(create_element("p", Props::new(), ["one"])).unwrap();
    let text = root.host().find_by_type(TEXT_ELEMENT)[0];
    root.host_mut().take_mutations();

    root.render(create_element("p", Props::new(), ["two"])).unwrap();
    assert_eq!(
        root.host().mutations(),
        &[Mutation::Update {
            id: text,
            changed: vec![NODE_VALUE.to_string()],
        }]
    );
    assert_eq!(root.host().text_content(), "two");
}

#[test]
fn test_trailing_child_removed() {
    let mut root = mount(MemoryHost::new());
    root.render(list(&["a", "b", "c"])).unwrap();
    let ul = root.host().find_by_type("ul")[0];
    let last = root.host().find_by_type("li")[2];
    root.host_mut().take_mutations();

    root.render(list(&["a", "b"])).unwrap();
    assert_eq!(
        root.host().mutations(),
        &[Mutation::Remove {
            parent: Some(ul),
            child: last,
        }]
    );
    assert_eq!(root.host().text_content(), "ab");
}

#[test]
fn test_type_change_replaces_node() {
    let mut root = mount(MemoryHost::new());
    root.render(create_element("div", Props::new(), [create_element("span", Props::new(), ["x"])]))
        .unwrap();
    root.render(create_element("div", Props::new(), [create_element("p", Props::new(), ["x"])]))
        .unwrap();

    assert_eq!(root.host().to_markup(), "<div><p>x</p></div>");
    assert!(root.host().find_by_type("span").is_empty());
}

#[test]
fn test_placement_lands_before_kept_sibling() {
    let mut root = mount(MemoryHost::new());
    root.render(create_element(
        "div",
        Props::new(),
        [create_element("span", Props::new(), ["x"]), create_element("em", Props::new(), ["y"])],
    ))
    .unwrap();
    let em = root.host().find_by_type("em")[0];
    root.host_mut().take_mutations();

    root.render(create_element(
        "div",
        Props::new(),
        [create_element("p", Props::new(), ["z"]), create_element("em", Props::new(), ["y"])],
    ))
    .unwrap();

    assert_eq!(root.host().to_markup(), "<div><p>z</p><em>y</em></div>");
    assert!(
        root.host()
            .mutations()
            .iter()
            .any(|m| matches!(m, Mutation::Insert { before, .. } if *before == em))
    );
}

#[test]
fn test_components_and_fragments_have_no_instance() {
    let item = Component::new("Item", |_, props| {
        let label = props.get_str("label").unwrap_or("?").to_string();
        Ok(create_element("li", Props::new(), [label]).into())
    });
    let app = {
        let item = item.clone();
        Component::new("App", move |_, _| {
            Ok(create_element(
                "ul",
                Props::new(),
                [fragment([
                    item.element(Props::new().with("label", "one")),
                    item.element(Props::new().with("label", "two")),
                ])],
            )
            .into())
        })
    };

    let mut root = mount(MemoryHost::new());
    root.render_component(&app, Props::new()).unwrap();

    assert_eq!(root.host().to_markup(), "<ul><li>one</li><li>two</li></ul>");
    assert_eq!(creates(root.host()), 5);
}

#[test]
fn test_list_output_and_empty_children() {
    let comp = Component::new("Pair", |_, props| {
        let show = props.get("show").and_then(Value::as_bool).unwrap_or(false);
        Ok(Node::List(vec![
            Node::from("a"),
            Node::from(show.then(|| create_element("b", Props::new(), ["!"]))),
            Node::from(false),
            Node::from(2),
        ]))
    });

    let mut root = mount(MemoryHost::new());
    root.render_component(&comp, Props::new().with("show", true)).unwrap();
    assert_eq!(root.host().to_markup(), "a<b>!</b>2");

    root.render_component(&comp, Props::new().with("show", false)).unwrap();
    assert_eq!(root.host().to_markup(), "a2");
}

#[test]
fn test_unsupported_host_type_is_skipped() {
    let mut host = MemoryHost::new();
    host.set_unsupported("canvas");
    let mut root = mount(host);
    root.render(create_element("div", Props::new(), [create_element("canvas", Props::new(), ["x"])]))
        .unwrap();

    assert_eq!(root.host().to_markup(), "<div>x</div>");
}

#[test]
fn test_event_handler_updates_state() {
    let renders = Counter::default();
    let counter = {
        let renders = renders.clone();
        Component::new("Counter", move |cx, _| {
            renders.bump();
            let (count, set_count) = cx.use_state(0i64);
            let on_click = move |_: &Value| set_count.update(|n| n + 1);
            Ok(create_element("button", Props::new().on("onClick", on_click), [count]).into())
        })
    };

    let mut root = mount(MemoryHost::new());
    root.render_component(&counter, Props::new()).unwrap();
    let button = root.host().find_by_type("button")[0];

    assert!(root.host().dispatch(button, "onClick", &Value::Null));
    root.flush().unwrap();
    assert_eq!(root.host().text_content(), "1");
    assert_eq!(renders.get(), 2);
}

#[test]
fn test_unmount_clears_host_and_resets_tags() {
    let mut root = mount(MemoryHost::new());
    root.render(create_element("div", Props::new(), ["x"])).unwrap();
    root.unmount();

    assert!(root.host().root_children().is_empty());
    assert!(!root.is_mounted());
    assert_eq!(root.host().mutations().last(), Some(&Mutation::Clear));

    root.host_mut().take_mutations();
    root.render(create_element("span", Props::new(), ["y"])).unwrap();
    assert!(matches!(
        root.host().mutations().first(),
        Some(Mutation::Create { tag: Tag(1), .. })
    ));
    assert_eq!(root.host().to_markup(), "<span>y</span>");
}

#[test]
fn test_roots_are_independent() {
    let setter: Slot<Setter<&'static str>> = Slot::default();
    let label = {
        let setter = setter.clone();
        Component::new("Label", move |cx, _| {
            let (text, set_text) = cx.use_state("first");
            setter.put(set_text);
            Ok(text.into())
        })
    };

    let mut a = mount(MemoryHost::new());
    let mut b = mount(MemoryHost::new());
    a.render_component(&label, Props::new()).unwrap();
    b.render(create_element("i", Props::new(), ["other"])).unwrap();

    setter.get().set("second");
    assert!(a.scheduler().is_queued());
    assert!(!b.scheduler().is_queued());

    a.flush().unwrap();
    b.flush().unwrap();
    assert_eq!(a.host().text_content(), "second");
    assert_eq!(b.host().to_markup(), "<i>other</i>");
}
