#![forbid(unsafe_code)]

//! Listener manager.
//!
//! [`ListenerRegistration::attach`] scans the host for qualifying anchors and
//! registers interceptors; the returned handle remembers exactly what it added
//! so [`ListenerRegistration::release`] removes those listeners and nothing
//! else.

use crate::config::GuardConfig;
use crate::host::NavigationHost;

/// Owned record of the listeners one `attach` added.
#[derive(Debug)]
pub struct ListenerRegistration<A> {
    clicks: Vec<A>,
    unload: bool,
}

impl<A> Default for ListenerRegistration<A> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<A> ListenerRegistration<A> {
    /// A registration holding nothing.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            clicks: Vec::new(),
            unload: false,
        }
    }

    /// Anchors currently carrying a click interceptor.
    #[must_use]
    pub fn anchors(&self) -> &[A] {
        &self.clicks
    }

    #[must_use]
    pub fn click_count(&self) -> usize {
        self.clicks.len()
    }

    #[must_use]
    pub const fn has_unload(&self) -> bool {
        self.unload
    }

    /// Total listeners held (click interceptors plus the unload interceptor).
    #[must_use]
    pub fn len(&self) -> usize {
        self.clicks.len() + usize::from(self.unload)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<A: Clone + PartialEq> ListenerRegistration<A> {
    /// Attach click interceptors to every qualifying anchor and, unless
    /// disabled, the unload interceptor.
    pub fn attach<H>(host: &mut H, config: &GuardConfig) -> Self
    where
        H: NavigationHost<Anchor = A>,
    {
        let clicks = qualifying_anchors(host, config);
        for anchor in &clicks {
            host.add_click_listener(anchor);
        }
        let unload = !config.ignore_document_unload;
        if unload {
            host.add_unload_listener();
        }
        tracing::debug!(
            target: "navguard",
            click_listeners = clicks.len(),
            unload_listener = unload,
            "listeners attached"
        );
        Self { clicks, unload }
    }

    /// Remove exactly the listeners this registration added. Idempotent.
    ///
    /// Returns how many listeners were removed.
    pub fn release<H>(&mut self, host: &mut H) -> usize
    where
        H: NavigationHost<Anchor = A>,
    {
        let removed = self.len();
        if removed == 0 {
            return 0;
        }
        for anchor in self.clicks.drain(..) {
            host.remove_click_listener(&anchor);
        }
        if core::mem::take(&mut self.unload) {
            host.remove_unload_listener();
        }
        tracing::debug!(target: "navguard", removed, "listeners released");
        removed
    }

    /// Whether `anchor` currently carries a click interceptor.
    #[must_use]
    pub fn guards(&self, anchor: &A) -> bool {
        self.clicks.contains(anchor)
    }
}

/// Anchors with a non-empty `href`, minus the child scope when configured.
#[must_use]
pub fn qualifying_anchors<H: NavigationHost>(host: &H, config: &GuardConfig) -> Vec<H::Anchor> {
    let mut anchors: Vec<H::Anchor> = Vec::new();
    for anchor in host.anchors() {
        let navigable = host
            .href_attribute(&anchor)
            .is_some_and(|href| !href.is_empty());
        if !navigable {
            continue;
        }
        if config.ignore_children_links && host.in_child_scope(&anchor) {
            continue;
        }
        if !anchors.contains(&anchor) {
            anchors.push(anchor);
        }
    }
    anchors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::MemoryDom;
    use pretty_assertions::assert_eq;

    #[test]
    fn attach_skips_anchors_without_href() {
        let mut dom = MemoryDom::new("https://app.test/edit");
        let a = dom.add_anchor("/home");
        dom.add_bare_anchor();
        dom.add_anchor("");
        let reg = ListenerRegistration::attach(&mut dom, &GuardConfig::default());
        assert_eq!(reg.anchors(), &[a]);
        assert!(reg.has_unload());
        assert_eq!(reg.len(), 2);
        assert_eq!(dom.listener_count(), 2);
    }

    #[test]
    fn attach_honors_child_scope_exclusion() {
        let mut dom = MemoryDom::new("https://app.test/edit");
        let outer = dom.add_anchor("/home");
        let inner = dom.add_child_anchor("/settings");

        let mut reg = ListenerRegistration::attach(&mut dom, &GuardConfig::default());
        assert_eq!(reg.anchors(), &[outer, inner]);

        let config = GuardConfig::default().with_ignore_children_links(true);
        let mut dom2 = dom.clone();
        let mut reg2 = ListenerRegistration::attach(&mut dom2, &config);
        assert!(reg2.guards(&outer));
        assert!(!reg2.guards(&inner));

        reg.release(&mut dom);
        reg2.release(&mut dom2);
        assert_eq!(dom.listener_count(), 0);
    }

    #[test]
    fn attach_without_unload_when_ignored() {
        let mut dom = MemoryDom::new("https://app.test/");
        dom.add_anchor("/a");
        let config = GuardConfig::default().with_ignore_document_unload(true);
        let reg = ListenerRegistration::attach(&mut dom, &config);
        assert!(!reg.has_unload());
        assert_eq!(dom.unload_listener_count(), 0);
        assert_eq!(dom.click_listener_count(), 1);
    }

    #[test]
    fn release_is_idempotent() {
        let mut dom = MemoryDom::new("https://app.test/");
        dom.add_anchor("/a");
        dom.add_anchor("/b");
        let mut reg = ListenerRegistration::attach(&mut dom, &GuardConfig::default());
        assert_eq!(reg.release(&mut dom), 3);
        assert_eq!(reg.release(&mut dom), 0);
        assert!(reg.is_empty());
        assert_eq!(dom.listener_count(), 0);

        let mut empty = ListenerRegistration::empty();
        assert_eq!(empty.release(&mut dom), 0);
    }

    #[test]
    fn release_leaves_foreign_listeners_alone() {
        let mut dom = MemoryDom::new("https://app.test/");
        let a = dom.add_anchor("/a");
        let mut reg = ListenerRegistration::attach(&mut dom, &GuardConfig::default());
        let b = dom.add_anchor("/b");
        dom.add_click_listener(&b);
        reg.release(&mut dom);
        assert!(!dom.has_click_listener(a));
        assert!(dom.has_click_listener(b));
    }

    #[test]
    fn zero_anchors_is_not_an_error() {
        let mut dom = MemoryDom::new("https://app.test/");
        let config = GuardConfig::default().with_ignore_document_unload(true);
        let reg = ListenerRegistration::attach(&mut dom, &config);
        assert!(reg.is_empty());
    }
}
