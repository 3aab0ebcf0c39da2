#![forbid(unsafe_code)]

//! `navguard-core` intercepts attempts to leave a view (anchor clicks and
//! document unload) and asks for confirmation before letting them proceed.
//!
//! Design goals:
//! - **Host-driven**: the embedding environment implements
//!   [`NavigationHost`] and forwards DOM events; the guard never calls a
//!   browser API itself.
//! - **Scoped listeners**: [`NavigationGuard::activate`] attaches, and every
//!   exit path (deactivate, accepted navigation, drop) detaches exactly what
//!   was attached.
//! - **Single-threaded, no blocking between events**: a blocked click waits in
//!   [`GuardState::PendingConfirmation`] until [`NavigationGuard::accept`] or
//!   [`NavigationGuard::cancel`] is called from a later event-loop turn.
//!
//! `navguard-web` binds this crate to the real DOM through `web-sys`.

pub mod config;
pub mod dispatcher;
pub mod guard;
pub mod harness;
pub mod host;
pub mod listeners;
pub mod state;

pub use config::{BlockSwitch, DEFAULT_CONFIRMATION_MESSAGE, GuardConfig};
pub use dispatcher::{
    ConfirmationSurface, LeaveHook, LeaveModal, ModalProps, Replay, replays_dispatched_total,
};
pub use guard::{ClickDispatch, ClickOutcome, LeaveOutcome, NavigationGuard, PassReason};
pub use host::{ClickEvent, NavigationHost, UnloadEvent};
pub use listeners::ListenerRegistration;
pub use state::{GuardMachine, GuardState, NavigationTarget};
