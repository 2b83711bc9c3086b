//! Hook behavior across real render passes.

mod common;

use act_core::*;
use common::{Counter, Log, Slot, init_tracing};
use pretty_assertions::assert_eq;

fn dep_of(props: &Props) -> i64 {
    props.get("dep").and_then(Value::as_int).unwrap_or(0)
}

#[test]
fn test_ref_identity_survives_prop_changes() {
    init_tracing();
    let seen: Slot<Vec<Ref<u32>>> = Slot::default();
    seen.put(Vec::new());
    let comp = {
        let seen = seen.clone();
        Component::new("Holder", move |cx, props| {
            let r = cx.use_ref(0u32);
            let mut all = seen.get();
            all.push(r);
            seen.put(all);
            Ok(dep_of(props).into())
        })
    };

    let mut root = mount(MemoryHost::new());
    root.render_component(&comp, Props::new().with("dep", 1)).unwrap();
    root.render_component(&comp, Props::new().with("dep", 2)).unwrap();

    let refs = seen.get();
    assert_eq!(refs.len(), 2);
    assert!(refs[0].ptr_eq(&refs[1]));
}

#[test]
fn test_effect_skipped_when_deps_unchanged() {
    let log = Log::default();
    let comp = {
        let log = log.clone();
        Component::new("Watcher", move |cx, props| {
            let dep = dep_of(props);
            let log = log.clone();
            cx.use_effect(dep, move || {
                log.push(format!("run {dep}"));
                let log = log.clone();
                cleanup(move || log.push(format!("cleanup {dep}")))
            });
            Ok(Node::Empty)
        })
    };

    let mut root = mount(MemoryHost::new());
    root.render_component(&comp, Props::new().with("dep", 1)).unwrap();
    root.render_component(&comp, Props::new().with("dep", 1)).unwrap();
    assert_eq!(log.take(), vec!["run 1"]);

    root.render_component(&comp, Props::new().with("dep", 2)).unwrap();
    assert_eq!(log.take(), vec!["cleanup 1", "run 2"]);

    root.unmount();
    assert_eq!(log.take(), vec!["cleanup 2"]);
}

#[test]
fn test_layout_effects_flush_before_passive() {
    let log = Log::default();
    let child = {
        let log = log.clone();
        Component::new("Child", move |cx, _| {
            let (a, b) = (log.clone(), log.clone());
            cx.use_effect_always(move || a.push("child passive"));
            cx.use_layout_effect_always(move || b.push("child layout"));
            Ok(Node::Empty)
        })
    };
    let parent = {
        let log = log.clone();
        Component::new("Parent", move |cx, _| {
            let a = log.clone();
            cx.use_effect_always(move || a.push("parent passive"));
            Ok(child.element(Props::new()).into())
        })
    };

    let mut root = mount(MemoryHost::new());
    root.render_component(&parent, Props::new()).unwrap();
    assert_eq!(
        log.take(),
        vec!["child layout", "parent passive", "child passive"]
    );
}

#[test]
fn test_reducer_state_is_left_fold() {
    let dispatch: Slot<Dispatch<i64>> = Slot::default();
    let comp = {
        let dispatch = dispatch.clone();
        Component::new("Acc", move |cx, _| {
            let (total, send) = cx.use_reducer(|acc: &Vec<i64>, n: i64| {
                let mut next = acc.clone();
                next.push(n);
                next
            }, Vec::new());
            dispatch.put(send);
            let text: Vec<String> = total.iter().map(i64::to_string).collect();
            Ok(text.join(",").into())
        })
    };

    let mut root = mount(MemoryHost::new());
    root.render_component(&comp, Props::new()).unwrap();

    let actions = [3, 1, 4, 1, 5];
    let mut expected: Vec<i64> = Vec::new();
    for n in actions {
        root.act(|| dispatch.get().dispatch(n)).unwrap();
        expected.push(n);
        let shown: Vec<String> = expected.iter().map(i64::to_string).collect();
        assert_eq!(root.host().text_content(), shown.join(","));
    }
}

#[test]
fn test_two_sets_before_flush_commit_once() {
    let renders = Counter::default();
    let notified = Counter::default();
    let setter: Slot<Setter<i32>> = Slot::default();
    let comp = {
        let (renders, setter) = (renders.clone(), setter.clone());
        Component::new("Value", move |cx, _| {
            renders.bump();
            let (value, set_value) = cx.use_state(0);
            setter.put(set_value);
            Ok(value.into())
        })
    };

    let options = {
        let notified = notified.clone();
        RootOptions::default().on_schedule(move || notified.bump())
    };
    let mut root = mount_with(MemoryHost::new(), options);
    root.render_component(&comp, Props::new()).unwrap();
    let (renders_before, notified_before) = (renders.get(), notified.get());
    root.host_mut().take_mutations();

    root.act(|| {
        let set = setter.get();
        set.set(1);
        set.set(2);
    })
    .unwrap();

    assert_eq!(renders.get(), renders_before + 1);
    assert_eq!(notified.get(), notified_before + 1);
    assert_eq!(root.host().text_content(), "2");
    assert_eq!(root.host().mutations().len(), 1);
}

#[test]
fn test_state_set_from_effect_settles() {
    let renders = Counter::default();
    let comp = {
        let renders = renders.clone();
        Component::new("Loader", move |cx, _| {
            renders.bump();
            let (ready, set_ready) = cx.use_state(false);
            cx.use_effect((), move || set_ready.set(true));
            Ok((if ready { "ready" } else { "loading" }).into())
        })
    };

    let mut root = mount(MemoryHost::new());
    root.render_component(&comp, Props::new()).unwrap();
    assert_eq!(root.host().text_content(), "ready");
    assert_eq!(renders.get(), 2);
}

#[test]
fn test_memo_skips_equal_props_but_not_own_state() {
    let renders = Counter::default();
    let setter: Slot<Setter<i32>> = Slot::default();
    let inner = {
        let (renders, setter) = (renders.clone(), setter.clone());
        Component::new("Badge", move |cx, props| {
            renders.bump();
            let (clicks, set_clicks) = cx.use_state(0);
            setter.put(set_clicks);
            let label = props.get_str("label").unwrap_or("");
            Ok(format!("{label}:{clicks}").into())
        })
    };
    let badge = memo(&inner);

    let mut root = mount(MemoryHost::new());
    let app = |label: &str| create_element("div", Props::new(), [badge.element(Props::new().with("label", label))]);

    root.render(app("a")).unwrap();
    root.render(app("a")).unwrap();
    assert_eq!(renders.get(), 1);

    root.act(|| setter.get().set(5)).unwrap();
    assert_eq!(renders.get(), 2);
    assert_eq!(root.host().text_content(), "a:5");

    root.render(app("b")).unwrap();
    assert_eq!(renders.get(), 3);
    assert_eq!(root.host().text_content(), "b:5");
}

#[test]
fn test_callback_identity_follows_deps() {
    let seen: Slot<Vec<Callback<i32, i32>>> = Slot::default();
    seen.put(Vec::new());
    let comp = {
        let seen = seen.clone();
        Component::new("Cb", move |cx, props| {
            let step = dep_of(props);
            let cb = cx.use_callback(step, move |n: i32| n + step as i32);
            let mut all = seen.get();
            all.push(cb);
            seen.put(all);
            Ok(Node::Empty)
        })
    };

    let mut root = mount(MemoryHost::new());
    for dep in [1, 1, 2] {
        root.render_component(&comp, Props::new().with("dep", dep)).unwrap();
    }

    let cbs = seen.get();
    assert!(std::rc::Rc::ptr_eq(&cbs[0], &cbs[1]));
    assert!(!std::rc::Rc::ptr_eq(&cbs[1], &cbs[2]));
    assert_eq!(cbs[2](1), 3);
}

#[test]
fn test_imperative_handle_set_and_cleared() {
    let handle: Ref<Option<String>> = Ref::new(None);
    let comp = {
        let handle = handle.clone();
        Component::new("Input", move |cx, _| {
            cx.use_imperative_handle(&handle, (), || String::from("focus"));
            Ok(create_element("input", Props::new(), Vec::<Node>::new()).into())
        })
    };

    let mut root = mount(MemoryHost::new());
    root.render_component(&comp, Props::new()).unwrap();
    assert_eq!(handle.current(), Some(String::from("focus")));

    root.unmount();
    assert_eq!(handle.current(), None);
}

#[test]
fn test_failing_effect_does_not_stop_peers() {
    init_tracing();
    let log = Log::default();
    let comp = {
        let log = log.clone();
        Component::new("Effects", move |cx, _| {
            cx.use_effect((), || -> anyhow::Result<()> { anyhow::bail!("effect blew up") });
            let log = log.clone();
            cx.use_effect((), move || log.push("second ran"));
            Ok(Node::Empty)
        })
    };

    let mut root = mount(MemoryHost::new());
    root.render_component(&comp, Props::new()).unwrap();
    assert_eq!(log.take(), vec!["second ran"]);
}

#[test]
fn test_removed_component_runs_cleanup() {
    let log = Log::default();
    let child = {
        let log = log.clone();
        Component::new("Child", move |cx, _| {
            let log = log.clone();
            cx.use_effect((), move || cleanup(move || log.push("child gone")));
            Ok("child".into())
        })
    };

    let mut root = mount(MemoryHost::new());
    root.render(create_element("div", Props::new(), [child.element(Props::new())])).unwrap();
    root.render(create_element("div", Props::new(), ["nothing"])).unwrap();

    assert_eq!(log.take(), vec!["child gone"]);
    assert_eq!(root.host().to_markup(), "<div>nothing</div>");
}

#[test]
fn test_context_default_and_provided() {
    let theme = create_context(String::from("light"));
    let reader = {
        let theme = theme.clone();
        Component::new("Reader", move |cx, _| Ok(cx.use_context(&theme).into()))
    };

    let mut root = mount(MemoryHost::new());
    root.render(create_element("p", Props::new(), [reader.element(Props::new())])).unwrap();
    assert_eq!(root.host().text_content(), "light");

    root.render(theme.provider(String::from("dark"), [reader.element(Props::new())])).unwrap();
    assert_eq!(root.host().text_content(), "dark");
}

#[test]
fn test_memoized_reader_sees_new_context_value() {
    let theme = create_context(0i64);
    let reader = {
        let theme = theme.clone();
        memo(&Component::new("Reader", move |cx, _| Ok(cx.use_context(&theme).into())))
    };

    let mut root = mount(MemoryHost::new());
    root.render(theme.provider(1, [reader.element(Props::new())])).unwrap();
    root.render(theme.provider(2, [reader.element(Props::new())])).unwrap();
    assert_eq!(root.host().text_content(), "2");
}

/// Providers of one context share a single cell, so a reader rendered after
/// an inner provider, but outside it, sees the inner value.
#[test]
fn test_nested_providers_share_one_cell() {
    let ctx = create_context("default");
    let reader = {
        let ctx = ctx.clone();
        Component::new("Reader", move |cx, _| {
            Ok(create_element("span", Props::new(), [cx.use_context(&ctx)]).into())
        })
    };

    let tree = ctx.provider(
        "outer",
        [
            Node::from(ctx.provider("inner", [reader.element(Props::new())])),
            Node::from(reader.element(Props::new())),
        ],
    );

    let mut root = mount(MemoryHost::new());
    root.render(tree).unwrap();
    assert_eq!(root.host().to_markup(), "<span>inner</span><span>inner</span>");
}
