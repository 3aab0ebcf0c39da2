#![forbid(unsafe_code)]

//! The navigation guard.
//!
//! [`NavigationGuard`] is a scoped resource: [`NavigationGuard::activate`]
//! attaches listeners, and every exit path ([`NavigationGuard::deactivate`],
//! an accepted navigation, or `Drop`) releases them. The host forwards DOM
//! events into [`NavigationGuard::handle_click`] and
//! [`NavigationGuard::handle_before_unload`]; the confirmation surface drives
//! [`NavigationGuard::accept`] and [`NavigationGuard::cancel`].

use core::fmt;

use crate::config::{BlockSwitch, GuardConfig};
use crate::dispatcher::{ConfirmationSurface, LeaveHook, LeaveModal, ModalProps, Replay};
use crate::host::{ClickEvent, NavigationHost, UnloadEvent};
use crate::listeners::ListenerRegistration;
use crate::state::{GuardMachine, GuardState, NavigationTarget};

/// Why a click was allowed through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassReason {
    BlockingDisabled,
    /// The anchor resolves to the current location.
    SamePage,
    /// The anchor carries no interceptor (never attached, excluded, or torn
    /// down after an accepted navigation).
    NotGuarded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Default prevented; the guard entered the pending state.
    Blocked,
    /// Default prevented; an earlier pending target was replaced.
    Superseded,
    PassedThrough(PassReason),
}

/// What Accept did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// Listeners torn down and the blocked click re-issued.
    Replayed,
    /// Listeners torn down and the replay handed to the leave hook.
    HandedToHook,
    /// No blocked target; the hook ran without a replay.
    HookOnly,
    /// No blocked target and no hook.
    Nothing,
}

/// Record of one click interception.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickDispatch {
    pub outcome: ClickOutcome,
    /// Resolved href, when the guard got far enough to read it.
    pub href: Option<String>,
    /// Native prompt answer, when the prompt ran.
    pub prompt: Option<bool>,
    /// Accept result, when the native prompt confirmed.
    pub leave: Option<LeaveOutcome>,
}

impl ClickDispatch {
    fn passed(reason: PassReason, href: Option<String>) -> Self {
        Self {
            outcome: ClickOutcome::PassedThrough(reason),
            href,
            prompt: None,
            leave: None,
        }
    }

    /// The click's default action was suppressed.
    #[must_use]
    pub const fn default_prevented(&self) -> bool {
        matches!(self.outcome, ClickOutcome::Blocked | ClickOutcome::Superseded)
    }
}

/// Navigation guard bound to one host.
pub struct NavigationGuard<H: NavigationHost> {
    host: H,
    config: GuardConfig,
    blocking: BlockSwitch,
    machine: GuardMachine<H::Anchor>,
    listeners: ListenerRegistration<H::Anchor>,
    surface: ConfirmationSurface,
    leave_hook: Option<LeaveHook<H::Anchor>>,
}

impl<H: NavigationHost> NavigationGuard<H> {
    /// Attach listeners to `host` and start guarding.
    ///
    /// Starts with the native prompt as confirmation surface and no leave
    /// hook; see [`Self::with_modal`] and [`Self::with_leave_hook`].
    pub fn activate(mut host: H, config: GuardConfig) -> Self {
        let listeners = ListenerRegistration::attach(&mut host, &config);
        tracing::debug!(
            target: "navguard",
            listeners = listeners.len(),
            block_route = config.block_route,
            "guard activated"
        );
        Self {
            blocking: BlockSwitch::new(config.block_route),
            host,
            config,
            machine: GuardMachine::new(),
            listeners,
            surface: ConfirmationSurface::NativePrompt,
            leave_hook: None,
        }
    }

    #[must_use]
    pub fn with_modal(mut self, modal: impl LeaveModal + 'static) -> Self {
        self.set_modal(Some(Box::new(modal)));
        self
    }

    #[must_use]
    pub fn with_leave_hook(mut self, hook: impl FnMut(Option<Replay<H::Anchor>>) + 'static) -> Self {
        self.set_leave_hook(Some(Box::new(hook)));
        self
    }

    /// Install (or remove, with `None`) the custom modal. A new modal is
    /// rendered immediately with the current pending flag.
    ///
    /// Removing the modal while a navigation is pending hands it to the
    /// native prompt right away.
    pub fn set_modal(&mut self, modal: Option<Box<dyn LeaveModal>>) {
        match modal {
            Some(modal) => {
                self.surface = ConfirmationSurface::Modal(modal);
                self.render_modal();
            }
            None => {
                self.surface = ConfirmationSurface::NativePrompt;
                if self.machine.pending_confirmation() {
                    self.present();
                }
            }
        }
    }

    pub fn set_leave_hook(&mut self, hook: Option<LeaveHook<H::Anchor>>) {
        self.leave_hook = hook;
    }

    /// Re-scan the scope and rebuild listeners.
    ///
    /// Call on every mount/update cycle so anchors added after activation are
    /// covered. Also re-arms a guard whose listeners were torn down by an
    /// accepted navigation.
    pub fn refresh(&mut self) {
        let removed = self.listeners.release(&mut self.host);
        self.listeners = ListenerRegistration::attach(&mut self.host, &self.config);
        tracing::debug!(
            target: "navguard",
            removed,
            attached = self.listeners.len(),
            "listeners refreshed"
        );
    }

    /// Release every listener this guard attached. Idempotent.
    ///
    /// Pending state is left as is; [`Self::refresh`] re-arms the guard.
    pub fn deactivate(&mut self) -> usize {
        let removed = self.listeners.release(&mut self.host);
        if removed > 0 {
            tracing::debug!(target: "navguard", removed, "guard deactivated");
        }
        removed
    }

    /// Click interceptor. The host calls this from each anchor's listener.
    pub fn handle_click(
        &mut self,
        anchor: &H::Anchor,
        event: &mut impl ClickEvent,
    ) -> ClickDispatch {
        let _span = tracing::debug_span!("navguard.click").entered();

        if !self.listeners.guards(anchor) {
            return ClickDispatch::passed(PassReason::NotGuarded, None);
        }
        if !self.blocking.get() {
            return ClickDispatch::passed(PassReason::BlockingDisabled, None);
        }
        let href = self.host.resolved_href(anchor);
        if href == self.host.current_location() {
            tracing::trace!(target: "navguard", href = %href, "same-page anchor passed through");
            return ClickDispatch::passed(PassReason::SamePage, Some(href));
        }

        event.prevent_default();
        let superseded = self
            .machine
            .block(NavigationTarget::new(anchor.clone(), href.clone()));
        let outcome = match superseded {
            Some(previous) => {
                tracing::debug!(
                    target: "navguard",
                    href = %href,
                    superseded = %previous.href(),
                    "pending navigation superseded"
                );
                ClickOutcome::Superseded
            }
            None => {
                tracing::debug!(target: "navguard", href = %href, "navigation blocked");
                ClickOutcome::Blocked
            }
        };

        let (prompt, leave) = self.present();
        ClickDispatch {
            outcome,
            href: Some(href),
            prompt,
            leave,
        }
    }

    /// Unload interceptor.
    ///
    /// Returns the confirmation message when the unload was blocked, which
    /// the host also returns from its listener. The guard state is not
    /// touched: the browser's own prompt decides.
    pub fn handle_before_unload(&mut self, event: &mut impl UnloadEvent) -> Option<String> {
        if !self.listeners.has_unload() || !self.blocking.get() {
            return None;
        }
        event.prevent_default();
        event.set_return_value(&self.config.confirmation_message);
        tracing::debug!(target: "navguard", "document unload blocked");
        Some(self.config.confirmation_message.clone())
    }

    /// Accept trigger: leave the page.
    pub fn accept(&mut self) -> LeaveOutcome {
        let _span = tracing::debug_span!("navguard.accept").entered();
        let target = self.machine.take_blocked();
        self.leave(target)
    }

    /// Cancel trigger: discard the pending navigation.
    ///
    /// Returns whether a navigation was discarded. Never navigates.
    pub fn cancel(&mut self) -> bool {
        let _span = tracing::debug_span!("navguard.cancel").entered();
        let discarded = self.machine.take_blocked();
        if let Some(target) = &discarded {
            tracing::debug!(target: "navguard", href = %target.href(), "navigation discarded");
        }
        self.render_modal();
        discarded.is_some()
    }

    fn present(&mut self) -> (Option<bool>, Option<LeaveOutcome>) {
        if self.surface.is_modal() {
            self.render_modal();
            return (None, None);
        }

        // The pending flag drops before the prompt opens.
        let target = self.machine.take_blocked();
        tracing::debug!(target: "navguard", pending = false, "native prompt raised");
        let confirmed = self.host.confirm(&self.config.confirmation_message);
        tracing::debug!(target: "navguard", confirmed, "native prompt answered");
        if !confirmed {
            return (Some(false), None);
        }
        (Some(true), Some(self.leave(target)))
    }

    fn leave(&mut self, target: Option<NavigationTarget<H::Anchor>>) -> LeaveOutcome {
        let Some(target) = target else {
            return match self.leave_hook.as_mut() {
                Some(hook) => {
                    tracing::debug!(target: "navguard", "hook-only leave");
                    hook(None);
                    LeaveOutcome::HookOnly
                }
                None => LeaveOutcome::Nothing,
            };
        };

        self.listeners.release(&mut self.host);
        self.render_modal();
        let replay = Replay::new(target, self.host.replayer());
        match self.leave_hook.as_mut() {
            Some(hook) => {
                tracing::debug!(
                    target: "navguard",
                    href = %replay.target().href(),
                    "replay handed to leave hook"
                );
                hook(Some(replay));
                LeaveOutcome::HandedToHook
            }
            None => {
                replay.run();
                LeaveOutcome::Replayed
            }
        }
    }

    fn render_modal(&mut self) {
        if let ConfirmationSurface::Modal(modal) = &mut self.surface {
            modal.render(ModalProps {
                is_pending: self.machine.pending_confirmation(),
                message: &self.config.confirmation_message,
            });
        }
    }

    #[must_use]
    pub const fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    #[must_use]
    pub const fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Handle to the live blocking switch.
    #[must_use]
    pub fn block_switch(&self) -> BlockSwitch {
        self.blocking.clone()
    }

    pub fn set_blocking(&self, enabled: bool) {
        self.blocking.set(enabled);
    }

    #[must_use]
    pub fn blocking_enabled(&self) -> bool {
        self.blocking.get()
    }

    #[must_use]
    pub const fn state(&self) -> &GuardState<H::Anchor> {
        self.machine.state()
    }

    #[must_use]
    pub const fn pending_confirmation(&self) -> bool {
        self.machine.pending_confirmation()
    }

    #[must_use]
    pub fn blocked_target(&self) -> Option<&NavigationTarget<H::Anchor>> {
        self.machine.blocked_target()
    }

    #[must_use]
    pub const fn listeners(&self) -> &ListenerRegistration<H::Anchor> {
        &self.listeners
    }

    #[must_use]
    pub const fn surface(&self) -> &ConfirmationSurface {
        &self.surface
    }
}

impl<H: NavigationHost> Drop for NavigationGuard<H> {
    fn drop(&mut self) {
        self.deactivate();
    }
}

impl<H: NavigationHost + fmt::Debug> fmt::Debug for NavigationGuard<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationGuard")
            .field("host", &self.host)
            .field("config", &self.config)
            .field("blocking", &self.blocking.get())
            .field("state", self.machine.state())
            .field("listeners", &self.listeners)
            .field("surface", &self.surface)
            .field("leave_hook", &self.leave_hook.is_some())
            .finish()
    }
}
