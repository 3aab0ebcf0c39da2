#![cfg(target_arch = "wasm32")]
#![forbid(unsafe_code)]

use js_sys::{Function, Object, Reflect};
use navguard_web::LeaveGuard;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::{Element, HtmlAnchorElement};

wasm_bindgen_test_configure!(run_in_browser);

struct Fixture {
    root: Element,
    child: Element,
    anchors: Vec<HtmlAnchorElement>,
}

impl Drop for Fixture {
    fn drop(&mut self) {
        self.root.remove();
    }
}

fn anchor(document: &web_sys::Document, parent: &Element, href: &str) -> HtmlAnchorElement {
    let element = document.create_element("a").expect("create <a>");
    element.set_attribute("href", href).expect("set href");
    parent.append_child(&element).expect("append <a>");
    element.dyn_into::<HtmlAnchorElement>().expect("anchor element")
}

fn fixture() -> Fixture {
    let document = web_sys::window()
        .and_then(|window| window.document())
        .expect("document");
    let root = document.create_element("div").expect("create root");
    document
        .body()
        .expect("body")
        .append_child(&root)
        .expect("append root");
    let child = document.create_element("section").expect("create child");
    root.append_child(&child).expect("append child");

    let anchors = vec![
        anchor(&document, &root, "https://example.invalid/next"),
        anchor(&document, &root, "https://example.invalid/other"),
    ];
    anchor(&document, &child, "https://example.invalid/inner");
    Fixture {
        root,
        child,
        anchors,
    }
}

fn options(pairs: &[(&str, JsValue)]) -> Object {
    let obj = Object::new();
    for (key, value) in pairs {
        Reflect::set(&obj, &JsValue::from_str(key), value).expect("set option");
    }
    obj
}

fn noop_modal() -> Function {
    Function::new_no_args("")
}

#[wasm_bindgen_test]
fn attaches_one_listener_per_anchor_plus_unload() {
    let fx = fixture();
    let guard = LeaveGuard::new(Some(fx.root.clone()), None, None).expect("guard");
    assert_eq!(guard.listener_count().expect("count"), 4);
    assert_eq!(guard.deactivate().expect("deactivate"), 4);
    assert_eq!(guard.listener_count().expect("count"), 0);
}

#[wasm_bindgen_test]
fn child_scope_excluded_when_configured() {
    let fx = fixture();
    let opts = options(&[
        ("ignoreChildrenLinks", JsValue::TRUE),
        ("ignoreBeforeunloadDocument", JsValue::TRUE),
    ]);
    let guard =
        LeaveGuard::new(Some(fx.root.clone()), Some(fx.child.clone()), Some(opts)).expect("guard");
    assert_eq!(guard.listener_count().expect("count"), 2);
}

#[wasm_bindgen_test]
fn click_blocks_then_cancel_discards() {
    let fx = fixture();
    let guard = LeaveGuard::new(Some(fx.root.clone()), None, None).expect("guard");
    guard.set_modal(Some(noop_modal())).expect("modal");

    fx.anchors[0].click();
    assert!(guard.is_pending().expect("pending"));
    assert_eq!(guard.last_click_outcome().as_deref(), Some("blocked"));
    assert_eq!(
        guard.blocked_href().expect("href"),
        Some(fx.anchors[0].href())
    );

    fx.anchors[1].click();
    assert_eq!(guard.last_click_outcome().as_deref(), Some("superseded"));
    assert_eq!(
        guard.blocked_href().expect("href"),
        Some(fx.anchors[1].href())
    );

    assert!(guard.cancel().expect("cancel"));
    assert!(!guard.is_pending().expect("pending"));
}

#[wasm_bindgen_test]
fn accept_hands_replay_to_hook() {
    let fx = fixture();
    let guard = LeaveGuard::new(Some(fx.root.clone()), None, None).expect("guard");
    guard.set_modal(Some(noop_modal())).expect("modal");
    // Park the replay function on window instead of navigating away.
    guard
        .set_on_leave_hook(Some(Function::new_with_args(
            "replay",
            "globalThis.__navguardReplay = replay;",
        )))
        .expect("hook");

    fx.anchors[0].click();
    assert_eq!(guard.accept().expect("accept"), "handed_to_hook");
    assert_eq!(guard.listener_count().expect("count"), 0);

    let parked = Reflect::get(&js_sys::global(), &JsValue::from_str("__navguardReplay"))
        .expect("parked replay");
    assert!(parked.is_function());
}

#[wasm_bindgen_test]
fn blocking_switch_lets_clicks_through() {
    let fx = fixture();
    let document = web_sys::window()
        .and_then(|window| window.document())
        .expect("document");
    let fragment = anchor(&document, &fx.root, "#navguard-fragment");
    let guard = LeaveGuard::new(Some(fx.root.clone()), None, None).expect("guard");
    guard.set_modal(Some(noop_modal())).expect("modal");

    guard.set_block_route(false);
    assert!(!guard.block_route());
    fragment.click();
    assert!(!guard.is_pending().expect("pending"));
    assert_eq!(
        guard.last_click_outcome().as_deref(),
        Some("blocking_disabled")
    );
}

#[wasm_bindgen_test]
fn triggers_survive_modal_swap() {
    let fx = fixture();
    let guard = LeaveGuard::new(Some(fx.root.clone()), None, None).expect("guard");
    guard
        .set_modal(Some(Function::new_with_args(
            "props",
            "globalThis.__navguardProps = props;",
        )))
        .expect("first modal");
    let props = Reflect::get(&js_sys::global(), &JsValue::from_str("__navguardProps"))
        .expect("rendered props");
    let on_cancel: Function = Reflect::get(&props, &JsValue::from_str("onCancel"))
        .expect("onCancel")
        .dyn_into()
        .expect("onCancel is a function");

    fx.anchors[0].click();
    assert!(guard.is_pending().expect("pending"));

    guard.set_modal(Some(noop_modal())).expect("second modal");
    on_cancel
        .call0(&JsValue::NULL)
        .expect("trigger from the first modal still callable");
    assert!(!guard.is_pending().expect("pending"));
}
