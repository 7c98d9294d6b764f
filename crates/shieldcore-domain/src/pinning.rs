//! SPKI pin validation with a rotation grace window.
//!
//! The validator has no clock: `now` is always supplied by the caller.

use shieldcore_types::ids;
use std::collections::BTreeSet;
use time::{Duration, OffsetDateTime};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PinSet {
    /// SPKI hashes trusted now.
    pub current: BTreeSet<String>,
    /// Hashes retired by the last rotation; trusted only inside the rotation window.
    pub previous: BTreeSet<String>,
    pub rotated_at: Option<OffsetDateTime>,
    /// Negative values mean no window is configured.
    pub rotation_window_days: Option<i32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PinVerdict {
    /// No pins configured at all.
    PinningDisabled,
    CurrentPin,
    PreviousPinInWindow,
    PreviousPinExpired,
    Unpinned,
}

impl PinVerdict {
    pub fn is_allowed(self) -> bool {
        matches!(
            self,
            PinVerdict::PinningDisabled | PinVerdict::CurrentPin | PinVerdict::PreviousPinInWindow
        )
    }

    pub fn code(self) -> &'static str {
        match self {
            PinVerdict::PinningDisabled => ids::REASON_PINNING_DISABLED,
            PinVerdict::CurrentPin => ids::REASON_CURRENT_PIN,
            PinVerdict::PreviousPinInWindow => ids::REASON_PREVIOUS_PIN_IN_WINDOW,
            PinVerdict::PreviousPinExpired => ids::REASON_PREVIOUS_PIN_EXPIRED,
            PinVerdict::Unpinned => ids::REASON_UNPINNED,
        }
    }
}

impl PinSet {
    pub fn new<I, J>(current: I, previous: J) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        J: IntoIterator,
        J::Item: Into<String>,
    {
        Self {
            current: current.into_iter().map(Into::into).collect(),
            previous: previous.into_iter().map(Into::into).collect(),
            rotated_at: None,
            rotation_window_days: None,
        }
    }

    pub fn with_rotation(mut self, rotated_at: OffsetDateTime, window_days: i32) -> Self {
        self.rotated_at = Some(rotated_at);
        self.rotation_window_days = Some(window_days);
        self
    }

    /// Empty `current` and `previous` means pinning is off.
    pub fn is_disabled(&self) -> bool {
        self.current.is_empty() && self.previous.is_empty()
    }

    pub fn is_allowed(&self, presented_hash: &str, now: OffsetDateTime) -> bool {
        self.check(presented_hash, now).is_allowed()
    }

    pub fn check(&self, presented_hash: &str, now: OffsetDateTime) -> PinVerdict {
        if self.is_disabled() {
            return PinVerdict::PinningDisabled;
        }
        if self.current.contains(presented_hash) {
            return PinVerdict::CurrentPin;
        }
        if self.previous.contains(presented_hash) {
            return if self.rotation_window_open(now) {
                PinVerdict::PreviousPinInWindow
            } else {
                PinVerdict::PreviousPinExpired
            };
        }
        PinVerdict::Unpinned
    }

    /// `now - rotated_at <= rotation_window_days`. Without both values there is no window.
    fn rotation_window_open(&self, now: OffsetDateTime) -> bool {
        let Some(days) = self.rotation_window_days.filter(|d| *d >= 0) else {
            return false;
        };
        let Some(rotated_at) = self.rotated_at else {
            return false;
        };
        now - rotated_at <= Duration::days(i64::from(days))
    }
}
