#![forbid(unsafe_code)]

//! Guard state machine.
//!
//! Two states: [`GuardState::Idle`] and [`GuardState::PendingConfirmation`].
//! The blocked target is carried inside the pending variant, so it cannot
//! outlive the pending flag or exist without it.

/// The anchor whose navigation was deferred, plus its resolved href at click
/// time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationTarget<A> {
    anchor: A,
    href: String,
}

impl<A> NavigationTarget<A> {
    #[must_use]
    pub fn new(anchor: A, href: impl Into<String>) -> Self {
        Self {
            anchor,
            href: href.into(),
        }
    }

    #[must_use]
    pub const fn anchor(&self) -> &A {
        &self.anchor
    }

    #[must_use]
    pub fn href(&self) -> &str {
        &self.href
    }

    #[must_use]
    pub fn into_anchor(self) -> A {
        self.anchor
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardState<A> {
    Idle,
    PendingConfirmation { blocked: NavigationTarget<A> },
}

impl<A> Default for GuardState<A> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<A> GuardState<A> {
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::PendingConfirmation { .. })
    }
}

/// Owner of [`GuardState`]. Holds at most one pending navigation.
#[derive(Debug, Clone)]
pub struct GuardMachine<A> {
    state: GuardState<A>,
}

impl<A> Default for GuardMachine<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> GuardMachine<A> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: GuardState::Idle,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &GuardState<A> {
        &self.state
    }

    #[must_use]
    pub const fn pending_confirmation(&self) -> bool {
        self.state.is_pending()
    }

    #[must_use]
    pub fn blocked_target(&self) -> Option<&NavigationTarget<A>> {
        match &self.state {
            GuardState::Idle => None,
            GuardState::PendingConfirmation { blocked } => Some(blocked),
        }
    }

    /// Enter (or stay in) the pending state with `target`.
    ///
    /// Last click wins: a target already pending is replaced and returned.
    pub fn block(&mut self, target: NavigationTarget<A>) -> Option<NavigationTarget<A>> {
        let previous = core::mem::replace(
            &mut self.state,
            GuardState::PendingConfirmation { blocked: target },
        );
        match previous {
            GuardState::Idle => None,
            GuardState::PendingConfirmation { blocked } => Some(blocked),
        }
    }

    /// Return to idle, handing back the blocked target if there was one.
    ///
    /// Used by both Accept (which replays the target) and Cancel (which drops
    /// it).
    pub fn take_blocked(&mut self) -> Option<NavigationTarget<A>> {
        match core::mem::take(&mut self.state) {
            GuardState::Idle => None,
            GuardState::PendingConfirmation { blocked } => Some(blocked),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn target(id: u32) -> NavigationTarget<u32> {
        NavigationTarget::new(id, format!("https://example.test/{id}"))
    }

    #[test]
    fn starts_idle_without_target() {
        let machine = GuardMachine::<u32>::new();
        assert!(!machine.pending_confirmation());
        assert_eq!(machine.blocked_target(), None);
        assert_eq!(machine.state(), &GuardState::Idle);
    }

    #[test]
    fn block_enters_pending() {
        let mut machine = GuardMachine::new();
        assert_eq!(machine.block(target(1)), None);
        assert!(machine.pending_confirmation());
        assert_eq!(machine.blocked_target(), Some(&target(1)));
    }

    #[test]
    fn second_block_supersedes_first() {
        let mut machine = GuardMachine::new();
        machine.block(target(1));
        let superseded = machine.block(target(2));
        assert_eq!(superseded, Some(target(1)));
        assert_eq!(machine.blocked_target().map(|t| *t.anchor()), Some(2));
    }

    #[test]
    fn take_blocked_resets_flag_and_target_together() {
        let mut machine = GuardMachine::new();
        machine.block(target(7));
        assert_eq!(machine.take_blocked(), Some(target(7)));
        assert!(!machine.pending_confirmation());
        assert_eq!(machine.blocked_target(), None);
        assert_eq!(machine.take_blocked(), None);
    }

    #[test]
    fn target_exposes_anchor_and_href() {
        let t = target(3);
        assert_eq!(t.href(), "https://example.test/3");
        assert_eq!(*t.anchor(), 3);
        assert_eq!(t.into_anchor(), 3);
    }
}
