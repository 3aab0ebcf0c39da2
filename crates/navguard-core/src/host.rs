#![forbid(unsafe_code)]

//! Host capability surface.
//!
//! The guard never touches a browser API directly. The embedding environment
//! implements [`NavigationHost`] (the real DOM in `navguard-web`, an in-memory
//! tree in [`crate::harness`]) and forwards click/unload events through
//! [`crate::NavigationGuard::handle_click`] and
//! [`crate::NavigationGuard::handle_before_unload`].

use core::fmt::Debug;

/// Click event capability: the only thing the guard does to a click is
/// suppress its default action.
pub trait ClickEvent {
    fn prevent_default(&mut self);
}

/// `beforeunload` event capability.
pub trait UnloadEvent {
    fn prevent_default(&mut self);

    /// Set the event's user-facing message (`returnValue`).
    fn set_return_value(&mut self, message: &str);
}

/// Everything the guard needs from the document it protects.
///
/// Listener operations are infallible by contract. Hosts that can fail
/// (e.g. a JS `addEventListener` throwing) log and skip.
pub trait NavigationHost {
    /// Handle to one anchor element.
    type Anchor: Clone + PartialEq + Debug + 'static;

    /// Every anchor inside the guarded scope, in document order.
    fn anchors(&self) -> Vec<Self::Anchor>;

    /// Raw `href` attribute; `None` when the attribute is absent.
    fn href_attribute(&self, anchor: &Self::Anchor) -> Option<String>;

    /// Fully resolved navigation target of the anchor.
    fn resolved_href(&self, anchor: &Self::Anchor) -> String;

    /// Current document location, in the same form as [`Self::resolved_href`].
    fn current_location(&self) -> String;

    /// Whether the anchor lives inside the designated child scope.
    fn in_child_scope(&self, anchor: &Self::Anchor) -> bool;

    fn add_click_listener(&mut self, anchor: &Self::Anchor);

    fn remove_click_listener(&mut self, anchor: &Self::Anchor);

    fn add_unload_listener(&mut self);

    fn remove_unload_listener(&mut self);

    /// Detached dispatcher that re-issues a click on an anchor.
    ///
    /// Returned as an owned callable because a leave hook may hold the
    /// replay past the current event-loop turn.
    fn replayer(&self) -> Box<dyn FnOnce(&Self::Anchor)>;

    /// Blocking native confirmation prompt.
    fn confirm(&mut self, message: &str) -> bool;
}
