#![forbid(unsafe_code)]

//! Deterministic in-memory host for tests and headless embedding.
//!
//! [`MemoryDom`] models just enough of a document for the guard: anchors with
//! optional `href` attributes, child-scope membership, a current location,
//! listener bookkeeping, a replay log and a scripted `confirm()` queue.
//!
//! State is shared behind `Rc<RefCell<_>>`, so a clone kept by the test can
//! probe listener counts after the guard (and its copy of the host) is gone.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

use url::Url;

use crate::host::{ClickEvent, NavigationHost, UnloadEvent};

/// Stable identifier of one in-memory anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AnchorId(u32);

impl AnchorId {
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone)]
struct AnchorNode {
    id: AnchorId,
    href: Option<String>,
    in_child_scope: bool,
}

#[derive(Debug, Default)]
struct DomState {
    location: String,
    anchors: Vec<AnchorNode>,
    click_listeners: BTreeMap<AnchorId, usize>,
    unload_listeners: usize,
    replayed: Vec<AnchorId>,
    prompts: Vec<String>,
    confirm_answers: VecDeque<bool>,
    next_id: u32,
}

impl DomState {
    fn node(&self, id: AnchorId) -> Option<&AnchorNode> {
        self.anchors.iter().find(|node| node.id == id)
    }

    fn resolve(&self, id: AnchorId) -> String {
        self.node(id)
            .and_then(|node| node.href.as_deref())
            .map_or_else(String::new, |href| resolve_href(&self.location, href))
    }
}

/// In-memory document implementing [`NavigationHost`].
#[derive(Debug, Clone, Default)]
pub struct MemoryDom {
    state: Rc<RefCell<DomState>>,
}

impl MemoryDom {
    /// Empty document at `location`.
    #[must_use]
    pub fn new(location: &str) -> Self {
        let dom = Self::default();
        dom.set_location(location);
        dom
    }

    fn insert(&self, href: Option<&str>, in_child_scope: bool) -> AnchorId {
        let mut state = self.state.borrow_mut();
        let id = AnchorId(state.next_id);
        state.next_id += 1;
        state.anchors.push(AnchorNode {
            id,
            href: href.map(str::to_owned),
            in_child_scope,
        });
        id
    }

    /// Anchor in the guarded scope.
    pub fn add_anchor(&self, href: &str) -> AnchorId {
        self.insert(Some(href), false)
    }

    /// Anchor inside the designated child scope.
    pub fn add_child_anchor(&self, href: &str) -> AnchorId {
        self.insert(Some(href), true)
    }

    /// Anchor without an `href` attribute.
    pub fn add_bare_anchor(&self) -> AnchorId {
        self.insert(None, false)
    }

    /// Remove an anchor from the tree. Listeners already attached to it stay
    /// registered until removed.
    pub fn remove_anchor(&self, id: AnchorId) {
        self.state.borrow_mut().anchors.retain(|node| node.id != id);
    }

    pub fn set_location(&self, location: &str) {
        self.state.borrow_mut().location = normalize_location(location);
    }

    #[must_use]
    pub fn location(&self) -> String {
        self.state.borrow().location.clone()
    }

    /// Script the next `confirm()` answer. An empty queue answers `false`.
    pub fn queue_confirm(&self, answer: bool) {
        self.state.borrow_mut().confirm_answers.push_back(answer);
    }

    /// Resolved href of an anchor, as a browser would report `anchor.href`.
    #[must_use]
    pub fn href_of(&self, id: AnchorId) -> String {
        self.state.borrow().resolve(id)
    }

    /// Click listeners plus unload listeners currently attached.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.click_listener_count() + self.unload_listener_count()
    }

    #[must_use]
    pub fn click_listener_count(&self) -> usize {
        self.state.borrow().click_listeners.values().sum()
    }

    #[must_use]
    pub fn unload_listener_count(&self) -> usize {
        self.state.borrow().unload_listeners
    }

    #[must_use]
    pub fn has_click_listener(&self, id: AnchorId) -> bool {
        self.state.borrow().click_listeners.contains_key(&id)
    }

    /// Anchors whose clicks were replayed, in order.
    #[must_use]
    pub fn replayed(&self) -> Vec<AnchorId> {
        self.state.borrow().replayed.clone()
    }

    /// Messages shown by native prompts, in order.
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.state.borrow().prompts.clone()
    }
}

impl NavigationHost for MemoryDom {
    type Anchor = AnchorId;

    fn anchors(&self) -> Vec<AnchorId> {
        self.state.borrow().anchors.iter().map(|node| node.id).collect()
    }

    fn href_attribute(&self, anchor: &AnchorId) -> Option<String> {
        self.state
            .borrow()
            .node(*anchor)
            .and_then(|node| node.href.clone())
    }

    fn resolved_href(&self, anchor: &AnchorId) -> String {
        self.state.borrow().resolve(*anchor)
    }

    fn current_location(&self) -> String {
        self.location()
    }

    fn in_child_scope(&self, anchor: &AnchorId) -> bool {
        self.state
            .borrow()
            .node(*anchor)
            .is_some_and(|node| node.in_child_scope)
    }

    fn add_click_listener(&mut self, anchor: &AnchorId) {
        *self
            .state
            .borrow_mut()
            .click_listeners
            .entry(*anchor)
            .or_default() += 1;
    }

    fn remove_click_listener(&mut self, anchor: &AnchorId) {
        let mut state = self.state.borrow_mut();
        if let Some(count) = state.click_listeners.get_mut(anchor) {
            *count -= 1;
            if *count == 0 {
                state.click_listeners.remove(anchor);
            }
        }
    }

    fn add_unload_listener(&mut self) {
        self.state.borrow_mut().unload_listeners += 1;
    }

    fn remove_unload_listener(&mut self) {
        let mut state = self.state.borrow_mut();
        state.unload_listeners = state.unload_listeners.saturating_sub(1);
    }

    fn replayer(&self) -> Box<dyn FnOnce(&AnchorId)> {
        let state = Rc::clone(&self.state);
        Box::new(move |anchor: &AnchorId| {
            let mut state = state.borrow_mut();
            let href = state.resolve(*anchor);
            state.replayed.push(*anchor);
            if !href.is_empty() {
                state.location = href;
            }
        })
    }

    fn confirm(&mut self, message: &str) -> bool {
        let mut state = self.state.borrow_mut();
        state.prompts.push(message.to_owned());
        state.confirm_answers.pop_front().unwrap_or(false)
    }
}

/// Recorded click event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryClick {
    pub default_prevented: bool,
}

impl ClickEvent for MemoryClick {
    fn prevent_default(&mut self) {
        self.default_prevented = true;
    }
}

/// Recorded `beforeunload` event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryUnload {
    pub default_prevented: bool,
    pub return_value: Option<String>,
}

impl UnloadEvent for MemoryUnload {
    fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    fn set_return_value(&mut self, message: &str) {
        self.return_value = Some(message.to_owned());
    }
}

/// Resolve an `href` attribute against `location` the way a browser fills in
/// `anchor.href`. An unparsable location leaves the attribute as written.
#[must_use]
pub fn resolve_href(location: &str, href: &str) -> String {
    match Url::parse(location).and_then(|base| base.join(href)) {
        Ok(url) => url.into(),
        Err(_) => href.to_owned(),
    }
}

/// `location.href` form of `location`: serialized the way a browser reports it.
fn normalize_location(location: &str) -> String {
    Url::parse(location).map_or_else(|_| location.to_owned(), String::from)
}
