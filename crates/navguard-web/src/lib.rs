#![forbid(unsafe_code)]

//! Browser binding for `navguard-core`.
//!
//! On `wasm32` this crate provides `DomHost`, a [`navguard_core::NavigationHost`]
//! backed by `web-sys`, and `LeaveGuard`, a `wasm-bindgen` export that JS
//! hosts construct once per guarded view:
//!
//! ```js
//! const guard = new LeaveGuard(formRoot, null, { confirmationMessage: "Discard edits?" });
//! guard.setModal(({ isPending, onLeave, onCancel }) => renderDialog(isPending, onLeave, onCancel));
//! // after every render of formRoot:
//! guard.refresh();
//! // on unmount:
//! guard.free();
//! ```
//!
//! The label helpers and [`WebGuardError`] are target-independent so they can
//! be unit tested natively.

use navguard_core::{ClickOutcome, LeaveOutcome, PassReason};

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::{DomHost, LeaveGuard};

/// Web binding error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebGuardError {
    /// No global `window` (e.g. running in a worker).
    MissingWindow,
    /// `window.document` is absent.
    MissingDocument,
    /// The guard is already borrowed by a callback running higher up the
    /// stack (e.g. a modal calling `accept()` synchronously from `render`).
    Busy,
    /// A JS call threw.
    Js(String),
}

impl core::fmt::Display for WebGuardError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingWindow => f.write_str("no global window"),
            Self::MissingDocument => f.write_str("window has no document"),
            Self::Busy => f.write_str("guard is busy handling another event"),
            Self::Js(msg) => write!(f, "js error: {msg}"),
        }
    }
}

impl std::error::Error for WebGuardError {}

/// Stable JS-facing label for a leave outcome.
#[must_use]
pub const fn leave_outcome_label(outcome: LeaveOutcome) -> &'static str {
    match outcome {
        LeaveOutcome::Replayed => "replayed",
        LeaveOutcome::HandedToHook => "handed_to_hook",
        LeaveOutcome::HookOnly => "hook_only",
        LeaveOutcome::Nothing => "nothing",
    }
}

/// Stable JS-facing label for a click outcome.
#[must_use]
pub const fn click_outcome_label(outcome: ClickOutcome) -> &'static str {
    match outcome {
        ClickOutcome::Blocked => "blocked",
        ClickOutcome::Superseded => "superseded",
        ClickOutcome::PassedThrough(PassReason::BlockingDisabled) => "blocking_disabled",
        ClickOutcome::PassedThrough(PassReason::SamePage) => "same_page",
        ClickOutcome::PassedThrough(PassReason::NotGuarded) => "not_guarded",
    }
}
