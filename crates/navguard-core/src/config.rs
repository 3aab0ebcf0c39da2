#![forbid(unsafe_code)]

//! Guard configuration.
//!
//! [`GuardConfig`] is fixed for one activation. The only value that may change
//! while a guard is active is the blocking switch, which lives in a shared
//! [`BlockSwitch`] so it can be flipped from outside and is re-read on every
//! interception.

use std::cell::Cell;
use std::rc::Rc;

/// Message shown by the native prompt when none is configured.
pub const DEFAULT_CONFIRMATION_MESSAGE: &str =
    "Are you sure you want to leave? Changes will not be saved.";

/// Per-activation guard options.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct GuardConfig {
    /// Skip anchors that live inside the host's designated child scope.
    pub ignore_children_links: bool,
    /// Do not attach the window-level unload interceptor.
    #[cfg_attr(feature = "serde", serde(rename = "ignoreBeforeunloadDocument"))]
    pub ignore_document_unload: bool,
    /// Initial value of the live blocking switch.
    pub block_route: bool,
    /// Text for the native prompt; also handed to custom modals.
    #[cfg_attr(feature = "serde", serde(alias = "alertMessage"))]
    pub confirmation_message: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            ignore_children_links: false,
            ignore_document_unload: false,
            block_route: true,
            confirmation_message: DEFAULT_CONFIRMATION_MESSAGE.to_owned(),
        }
    }
}

impl GuardConfig {
    #[must_use]
    pub fn with_ignore_children_links(mut self, ignore: bool) -> Self {
        self.ignore_children_links = ignore;
        self
    }

    #[must_use]
    pub fn with_ignore_document_unload(mut self, ignore: bool) -> Self {
        self.ignore_document_unload = ignore;
        self
    }

    #[must_use]
    pub fn with_block_route(mut self, block: bool) -> Self {
        self.block_route = block;
        self
    }

    #[must_use]
    pub fn with_confirmation_message(mut self, message: impl Into<String>) -> Self {
        self.confirmation_message = message.into();
        self
    }
}

/// Shared, live `blockRoute` flag.
///
/// Clones observe the same value. The guard reads it at interception time,
/// never caches it.
#[derive(Debug, Clone)]
pub struct BlockSwitch(Rc<Cell<bool>>);

impl BlockSwitch {
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self(Rc::new(Cell::new(enabled)))
    }

    /// Current value.
    #[must_use]
    pub fn get(&self) -> bool {
        self.0.get()
    }

    pub fn set(&self, enabled: bool) {
        self.0.set(enabled);
    }
}

impl Default for BlockSwitch {
    fn default() -> Self {
        Self::new(true)
    }
}
