#![forbid(unsafe_code)]

//! `web-sys` host and `wasm-bindgen` exports.
//!
//! Only compiled on `wasm32` targets.

use std::cell::{Cell, RefCell, RefMut};
use std::rc::{Rc, Weak};

use js_sys::{Function, Object, Reflect};
use navguard_core::{
    BlockSwitch, ClickEvent, ClickOutcome, GuardConfig, LeaveHook, LeaveModal, ModalProps,
    NavigationGuard, NavigationHost, Replay, UnloadEvent,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{BeforeUnloadEvent, Document, Element, HtmlAnchorElement, MouseEvent, Node, Window};

use crate::{WebGuardError, click_outcome_label, leave_outcome_label};

type GuardCell = RefCell<NavigationGuard<DomHost>>;
type GuardLink = Rc<RefCell<Weak<GuardCell>>>;

impl From<WebGuardError> for JsValue {
    fn from(err: WebGuardError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

fn console_error(msg: &str) {
    let global = js_sys::global();
    let Ok(console) = Reflect::get(&global, &"console".into()) else {
        return;
    };
    let Ok(error) = Reflect::get(&console, &"error".into()) else {
        return;
    };
    let Ok(error_fn) = error.dyn_into::<Function>() else {
        return;
    };
    let _ = error_fn.call1(&console, &JsValue::from_str(msg));
}

fn install_panic_hook() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = if let Some(loc) = info.location() {
                format!(
                    "panic at {}:{}:{}: {info}",
                    loc.file(),
                    loc.line(),
                    loc.column()
                )
            } else {
                format!("panic: {info}")
            };
            console_error(&msg);
        }));
    });
}

fn install_logging() {
    #[cfg(feature = "console-log")]
    {
        use std::sync::Once;

        static ONCE: Once = Once::new();
        ONCE.call_once(|| {
            // Another subscriber may already be installed by the embedding app.
            let _ = tracing_wasm::try_set_as_global_default();
        });
    }
}

fn set_js(obj: &Object, key: &str, value: &JsValue) {
    let _ = Reflect::set(obj, &JsValue::from_str(key), value);
}

fn read_js(options: &Object, key: &str) -> Option<JsValue> {
    Reflect::get(options, &JsValue::from_str(key))
        .ok()
        .filter(|value| !value.is_undefined() && !value.is_null())
}

fn config_from_options(options: Option<&Object>) -> GuardConfig {
    let mut config = GuardConfig::default();
    let Some(options) = options else {
        return config;
    };
    if let Some(flag) = read_js(options, "ignoreChildrenLinks").and_then(|v| v.as_bool()) {
        config.ignore_children_links = flag;
    }
    if let Some(flag) = read_js(options, "ignoreBeforeunloadDocument").and_then(|v| v.as_bool()) {
        config.ignore_document_unload = flag;
    }
    if let Some(flag) = read_js(options, "blockRoute").and_then(|v| v.as_bool()) {
        config.block_route = flag;
    }
    let message = read_js(options, "confirmationMessage")
        .or_else(|| read_js(options, "alertMessage"))
        .and_then(|v| v.as_string());
    if let Some(message) = message {
        config.confirmation_message = message;
    }
    config
}

/// Run `f` on the guard behind `weak`, unless it is gone or already borrowed
/// further up the stack.
fn with_guard<R>(
    weak: &Weak<GuardCell>,
    f: impl FnOnce(&mut NavigationGuard<DomHost>) -> R,
) -> Option<R> {
    let guard = weak.upgrade()?;
    let Ok(mut guard) = guard.try_borrow_mut() else {
        tracing::warn!(target: "navguard", "guard busy; re-entrant event ignored");
        return None;
    };
    Some(f(&mut guard))
}

struct DomClick(MouseEvent);

impl ClickEvent for DomClick {
    fn prevent_default(&mut self) {
        self.0.prevent_default();
    }
}

struct DomUnload(BeforeUnloadEvent);

impl UnloadEvent for DomUnload {
    fn prevent_default(&mut self) {
        self.0.prevent_default();
    }

    fn set_return_value(&mut self, message: &str) {
        self.0.set_return_value(message);
    }
}

/// [`NavigationHost`] over the live DOM.
///
/// Anchors are `<a>` elements under `scope` (the whole document when `None`).
/// Each attached listener owns its `Closure`; removing the listener drops it.
pub struct DomHost {
    window: Window,
    document: Document,
    scope: Option<Element>,
    child_scope: Option<Element>,
    link: GuardLink,
    last_click: Rc<Cell<Option<ClickOutcome>>>,
    clicks: Vec<(HtmlAnchorElement, Closure<dyn FnMut(MouseEvent)>)>,
    unload: Option<Closure<dyn FnMut(BeforeUnloadEvent) -> JsValue>>,
}

impl DomHost {
    pub fn new(scope: Option<Element>, child_scope: Option<Element>) -> Result<Self, WebGuardError> {
        let window = web_sys::window().ok_or(WebGuardError::MissingWindow)?;
        let document = window.document().ok_or(WebGuardError::MissingDocument)?;
        Ok(Self {
            window,
            document,
            scope,
            child_scope,
            link: Rc::new(RefCell::new(Weak::new())),
            last_click: Rc::new(Cell::new(None)),
            clicks: Vec::new(),
            unload: None,
        })
    }

    /// Outcome of the most recent click seen by any of this host's listeners.
    #[must_use]
    pub fn last_click(&self) -> Option<ClickOutcome> {
        self.last_click.get()
    }
}

impl NavigationHost for DomHost {
    type Anchor = HtmlAnchorElement;

    fn anchors(&self) -> Vec<HtmlAnchorElement> {
        let collection = match &self.scope {
            Some(root) => root.get_elements_by_tag_name("a"),
            None => self.document.get_elements_by_tag_name("a"),
        };
        (0..collection.length())
            .filter_map(|index| collection.item(index))
            .filter_map(|element| element.dyn_into::<HtmlAnchorElement>().ok())
            .collect()
    }

    fn href_attribute(&self, anchor: &HtmlAnchorElement) -> Option<String> {
        anchor.get_attribute("href")
    }

    fn resolved_href(&self, anchor: &HtmlAnchorElement) -> String {
        anchor.href()
    }

    fn current_location(&self) -> String {
        self.window.location().href().unwrap_or_default()
    }

    fn in_child_scope(&self, anchor: &HtmlAnchorElement) -> bool {
        let node: &Node = anchor.as_ref();
        self.child_scope
            .as_ref()
            .is_some_and(|child| child.contains(Some(node)))
    }

    fn add_click_listener(&mut self, anchor: &HtmlAnchorElement) {
        let link = Rc::clone(&self.link);
        let last_click = Rc::clone(&self.last_click);
        let target = anchor.clone();
        let callback = Closure::wrap(Box::new(move |event: MouseEvent| {
            let weak = link.borrow().clone();
            let mut event = DomClick(event);
            if let Some(dispatch) = with_guard(&weak, |guard| guard.handle_click(&target, &mut event)) {
                tracing::debug!(
                    target: "navguard",
                    outcome = click_outcome_label(dispatch.outcome),
                    "dom click handled"
                );
                last_click.set(Some(dispatch.outcome));
            }
        }) as Box<dyn FnMut(MouseEvent)>);

        if let Err(err) =
            anchor.add_event_listener_with_callback("click", callback.as_ref().unchecked_ref())
        {
            tracing::warn!(target: "navguard", error = ?err, "addEventListener(click) failed");
            return;
        }
        self.clicks.push((anchor.clone(), callback));
    }

    fn remove_click_listener(&mut self, anchor: &HtmlAnchorElement) {
        let Some(index) = self.clicks.iter().position(|(element, _)| element == anchor) else {
            return;
        };
        let (element, callback) = self.clicks.swap_remove(index);
        if let Err(err) =
            element.remove_event_listener_with_callback("click", callback.as_ref().unchecked_ref())
        {
            tracing::warn!(target: "navguard", error = ?err, "removeEventListener(click) failed");
        }
    }

    fn add_unload_listener(&mut self) {
        if self.unload.is_some() {
            self.remove_unload_listener();
        }
        let link = Rc::clone(&self.link);
        let callback = Closure::wrap(Box::new(move |event: BeforeUnloadEvent| -> JsValue {
            let weak = link.borrow().clone();
            let mut event = DomUnload(event);
            with_guard(&weak, |guard| guard.handle_before_unload(&mut event))
                .flatten()
                .map_or(JsValue::UNDEFINED, |message| JsValue::from_str(&message))
        }) as Box<dyn FnMut(BeforeUnloadEvent) -> JsValue>);

        if let Err(err) = self
            .window
            .add_event_listener_with_callback("beforeunload", callback.as_ref().unchecked_ref())
        {
            tracing::warn!(target: "navguard", error = ?err, "addEventListener(beforeunload) failed");
            return;
        }
        self.unload = Some(callback);
    }

    fn remove_unload_listener(&mut self) {
        let Some(callback) = self.unload.take() else {
            return;
        };
        if let Err(err) = self
            .window
            .remove_event_listener_with_callback("beforeunload", callback.as_ref().unchecked_ref())
        {
            tracing::warn!(target: "navguard", error = ?err, "removeEventListener(beforeunload) failed");
        }
    }

    fn replayer(&self) -> Box<dyn FnOnce(&HtmlAnchorElement)> {
        Box::new(|anchor: &HtmlAnchorElement| anchor.click())
    }

    fn confirm(&mut self, message: &str) -> bool {
        self.window
            .confirm_with_message(message)
            .unwrap_or_else(|err| {
                tracing::warn!(target: "navguard", error = ?err, "window.confirm failed");
                false
            })
    }
}

impl Drop for DomHost {
    fn drop(&mut self) {
        let anchors: Vec<HtmlAnchorElement> =
            self.clicks.iter().map(|(element, _)| element.clone()).collect();
        for anchor in &anchors {
            self.remove_click_listener(anchor);
        }
        self.remove_unload_listener();
    }
}

/// `onLeave` / `onCancel` triggers handed to every modal render.
///
/// Owned by [`LeaveGuard`], so functions a UI captured from an earlier render
/// stay callable after the modal is swapped.
struct ModalTriggers {
    on_leave: Closure<dyn FnMut()>,
    on_cancel: Closure<dyn FnMut()>,
}

impl ModalTriggers {
    fn new(guard: Weak<GuardCell>) -> Self {
        let leave_guard = guard.clone();
        let on_leave = Closure::wrap(Box::new(move || {
            if let Some(outcome) = with_guard(&leave_guard, NavigationGuard::accept) {
                tracing::debug!(target: "navguard", outcome = leave_outcome_label(outcome), "modal leave");
            }
        }) as Box<dyn FnMut()>);
        let on_cancel = Closure::wrap(Box::new(move || {
            with_guard(&guard, NavigationGuard::cancel);
        }) as Box<dyn FnMut()>);
        Self {
            on_leave,
            on_cancel,
        }
    }
}

/// JS render function wrapped as a [`LeaveModal`].
///
/// Rendered with `{ isPending, message, onLeave, onCancel }`. The triggers
/// must be called from a later event (a button click), not synchronously from
/// inside the render call.
struct JsModal {
    render_fn: Function,
    on_leave: JsValue,
    on_cancel: JsValue,
}

impl JsModal {
    fn new(render_fn: Function, triggers: &ModalTriggers) -> Self {
        let on_leave: &JsValue = triggers.on_leave.as_ref();
        let on_cancel: &JsValue = triggers.on_cancel.as_ref();
        Self {
            render_fn,
            on_leave: on_leave.clone(),
            on_cancel: on_cancel.clone(),
        }
    }
}

impl LeaveModal for JsModal {
    fn render(&mut self, props: ModalProps<'_>) {
        let obj = Object::new();
        set_js(&obj, "isPending", &JsValue::from_bool(props.is_pending));
        set_js(&obj, "message", &JsValue::from_str(props.message));
        set_js(&obj, "onLeave", &self.on_leave);
        set_js(&obj, "onCancel", &self.on_cancel);
        if let Err(err) = self.render_fn.call1(&JsValue::NULL, &obj) {
            tracing::warn!(target: "navguard", error = ?err, "modal render threw");
        }
    }
}

fn js_leave_hook(hook: Function) -> LeaveHook<HtmlAnchorElement> {
    Box::new(move |replay: Option<Replay<HtmlAnchorElement>>| {
        let arg = match replay {
            Some(replay) => Closure::once_into_js(move || replay.run()),
            None => JsValue::UNDEFINED,
        };
        if let Err(err) = hook.call1(&JsValue::NULL, &arg) {
            tracing::warn!(target: "navguard", error = ?err, "onLeaveHook threw");
        }
    })
}

/// JS-facing navigation guard.
///
/// Listeners are attached on construction and released by `deactivate()` or
/// `free()`. After `free()` the modal's `onLeave` / `onCancel` functions must
/// not be called.
#[wasm_bindgen]
pub struct LeaveGuard {
    inner: Rc<GuardCell>,
    triggers: ModalTriggers,
    blocking: BlockSwitch,
    last_click: Rc<Cell<Option<ClickOutcome>>>,
}

impl LeaveGuard {
    fn guard(&self) -> Result<RefMut<'_, NavigationGuard<DomHost>>, WebGuardError> {
        self.inner.try_borrow_mut().map_err(|_| WebGuardError::Busy)
    }
}

#[wasm_bindgen]
impl LeaveGuard {
    /// Start guarding anchors under `scope` (whole document when omitted).
    ///
    /// `options`: `{ ignoreChildrenLinks, ignoreBeforeunloadDocument,
    /// blockRoute, confirmationMessage }`; `alertMessage` is accepted for
    /// `confirmationMessage`.
    #[wasm_bindgen(constructor)]
    pub fn new(
        scope: Option<Element>,
        child_scope: Option<Element>,
        options: Option<Object>,
    ) -> Result<LeaveGuard, JsValue> {
        install_panic_hook();
        install_logging();

        let config = config_from_options(options.as_ref());
        let host = DomHost::new(scope, child_scope)?;
        let link = Rc::clone(&host.link);
        let last_click = Rc::clone(&host.last_click);
        let guard = NavigationGuard::activate(host, config);
        let blocking = guard.block_switch();
        let inner = Rc::new(RefCell::new(guard));
        *link.borrow_mut() = Rc::downgrade(&inner);
        let triggers = ModalTriggers::new(Rc::downgrade(&inner));
        Ok(Self {
            inner,
            triggers,
            blocking,
            last_click,
        })
    }

    /// Re-scan anchors; call after every render of the guarded view.
    pub fn refresh(&self) -> Result<(), JsValue> {
        self.guard()?.refresh();
        Ok(())
    }

    /// Flip the live blocking switch. Safe to call from inside callbacks.
    #[wasm_bindgen(js_name = setBlockRoute)]
    pub fn set_block_route(&self, enabled: bool) {
        self.blocking.set(enabled);
    }

    #[wasm_bindgen(js_name = blockRoute)]
    pub fn block_route(&self) -> bool {
        self.blocking.get()
    }

    #[wasm_bindgen(js_name = isPending)]
    pub fn is_pending(&self) -> Result<bool, JsValue> {
        Ok(self.guard()?.pending_confirmation())
    }

    #[wasm_bindgen(js_name = blockedHref)]
    pub fn blocked_href(&self) -> Result<Option<String>, JsValue> {
        Ok(self
            .guard()?
            .blocked_target()
            .map(|target| target.href().to_owned()))
    }

    /// Accept trigger; returns `"replayed"`, `"handed_to_hook"`,
    /// `"hook_only"` or `"nothing"`.
    pub fn accept(&self) -> Result<String, JsValue> {
        let outcome = self.guard()?.accept();
        Ok(leave_outcome_label(outcome).to_owned())
    }

    /// Cancel trigger; returns whether a navigation was discarded.
    pub fn cancel(&self) -> Result<bool, JsValue> {
        Ok(self.guard()?.cancel())
    }

    /// Install a modal render function, or `undefined` for the native prompt.
    ///
    /// Every modal receives the same `onLeave` / `onCancel` functions, so a UI
    /// may keep them across modal swaps. Removing the modal while a
    /// navigation is pending raises `window.confirm` for it.
    #[wasm_bindgen(js_name = setModal)]
    pub fn set_modal(&self, render: Option<Function>) -> Result<(), JsValue> {
        let modal = render.map(|render_fn| {
            Box::new(JsModal::new(render_fn, &self.triggers)) as Box<dyn LeaveModal>
        });
        self.guard()?.set_modal(modal);
        Ok(())
    }

    /// Install the leave hook. It receives a replay function, or `undefined`
    /// when `accept()` ran without a blocked link.
    #[wasm_bindgen(js_name = setOnLeaveHook)]
    pub fn set_on_leave_hook(&self, hook: Option<Function>) -> Result<(), JsValue> {
        self.guard()?.set_leave_hook(hook.map(js_leave_hook));
        Ok(())
    }

    #[wasm_bindgen(js_name = listenerCount)]
    pub fn listener_count(&self) -> Result<u32, JsValue> {
        let count = self.guard()?.listeners().len();
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    /// Label of the last click outcome (`"blocked"`, `"same_page"`, ...).
    #[wasm_bindgen(js_name = lastClickOutcome)]
    pub fn last_click_outcome(&self) -> Option<String> {
        self.last_click
            .get()
            .map(|outcome| click_outcome_label(outcome).to_owned())
    }

    /// Release all listeners; returns how many were removed.
    pub fn deactivate(&self) -> Result<u32, JsValue> {
        let removed = self.guard()?.deactivate();
        Ok(u32::try_from(removed).unwrap_or(u32::MAX))
    }
}
