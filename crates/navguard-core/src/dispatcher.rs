#![forbid(unsafe_code)]

//! Confirmation dispatcher building blocks.
//!
//! A guard confirms a blocked navigation through one of two surfaces:
//!
//! - **Modal**: a caller-supplied [`LeaveModal`] is re-rendered with
//!   [`ModalProps`] after every transition. Its buttons drive
//!   [`crate::NavigationGuard::accept`] and [`crate::NavigationGuard::cancel`].
//! - **Native prompt**: the host's blocking `confirm()`.
//!
//! Accepted navigations are re-issued through a one-shot [`Replay`].

use core::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::state::NavigationTarget;

static REPLAYS_DISPATCHED_TOTAL: AtomicU64 = AtomicU64::new(0);

/// Total navigations replayed in this process (monotonic counter).
#[must_use]
pub fn replays_dispatched_total() -> u64 {
    REPLAYS_DISPATCHED_TOTAL.load(Ordering::Relaxed)
}

/// Inputs handed to a custom modal on every render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModalProps<'a> {
    /// A navigation is waiting for the user's decision.
    pub is_pending: bool,
    pub message: &'a str,
}

/// Caller-supplied confirmation UI.
pub trait LeaveModal {
    fn render(&mut self, props: ModalProps<'_>);
}

impl<F> LeaveModal for F
where
    F: FnMut(ModalProps<'_>),
{
    fn render(&mut self, props: ModalProps<'_>) {
        self(props);
    }
}

/// Where a blocked navigation is confirmed.
pub enum ConfirmationSurface {
    Modal(Box<dyn LeaveModal>),
    NativePrompt,
}

impl ConfirmationSurface {
    #[must_use]
    pub const fn is_modal(&self) -> bool {
        matches!(self, Self::Modal(_))
    }
}

impl Default for ConfirmationSurface {
    fn default() -> Self {
        Self::NativePrompt
    }
}

impl fmt::Debug for ConfirmationSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Modal(_) => f.write_str("Modal(..)"),
            Self::NativePrompt => f.write_str("NativePrompt"),
        }
    }
}

/// One-shot re-dispatch of a deferred navigation.
///
/// [`Replay::run`] consumes the value, so a confirmed navigation is replayed
/// at most once. Dropping it without running discards the navigation.
pub struct Replay<A> {
    target: NavigationTarget<A>,
    dispatch: Box<dyn FnOnce(&A)>,
}

impl<A> Replay<A> {
    #[must_use]
    pub fn new(target: NavigationTarget<A>, dispatch: Box<dyn FnOnce(&A)>) -> Self {
        Self { target, dispatch }
    }

    #[must_use]
    pub const fn target(&self) -> &NavigationTarget<A> {
        &self.target
    }

    /// Re-issue the original click on the blocked anchor.
    pub fn run(self) {
        REPLAYS_DISPATCHED_TOTAL.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(target: "navguard", href = %self.target.href(), "replaying navigation");
        (self.dispatch)(self.target.anchor());
    }
}

impl<A: fmt::Debug> fmt::Debug for Replay<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Replay")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

/// Caller hook run on Accept.
///
/// Receives `Some(replay)` when a real link triggered the leave and decides
/// whether and when to run it; receives `None` for a hook-only leave.
pub type LeaveHook<A> = Box<dyn FnMut(Option<Replay<A>>)>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn replay_dispatches_on_its_anchor() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let replay = Replay::new(
            NavigationTarget::new(5_u32, "https://app.test/five"),
            Box::new(move |anchor: &u32| sink.borrow_mut().push(*anchor)),
        );
        assert_eq!(replay.target().href(), "https://app.test/five");
        let before = replays_dispatched_total();
        replay.run();
        assert_eq!(*seen.borrow(), vec![5]);
        assert!(replays_dispatched_total() > before);
    }

    #[test]
    fn dropped_replay_never_dispatches() {
        let seen = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&seen);
        let replay = Replay::new(
            NavigationTarget::new((), "https://app.test/"),
            Box::new(move |_: &()| *sink.borrow_mut() += 1),
        );
        drop(replay);
        assert_eq!(*seen.borrow(), 0);
    }

    #[test]
    fn closures_render_as_modals() {
        let renders = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&renders);
        let mut surface = ConfirmationSurface::Modal(Box::new(move |props: ModalProps<'_>| {
            sink.borrow_mut().push(props.is_pending);
        }));
        assert!(surface.is_modal());
        if let ConfirmationSurface::Modal(modal) = &mut surface {
            modal.render(ModalProps {
                is_pending: true,
                message: "Leave?",
            });
        }
        assert_eq!(*renders.borrow(), vec![true]);
        assert_eq!(format!("{surface:?}"), "Modal(..)");
        assert!(!ConfirmationSurface::default().is_modal());
    }
}
