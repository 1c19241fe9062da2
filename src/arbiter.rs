/// Whether the suggestion list is closing because an item was picked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArbiterState {
    #[default]
    Idle,
    SelectionPending,
}

/// What to do about a list close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseDecision {
    Submit,
    Dismiss,
}

/// Tells selection closes apart from dismissals.
///
/// The widget reports "closed" both when an item was chosen and when the
/// user walked away. Only a preceding `select` distinguishes the two, so that
/// is the one bit carried between events.
#[derive(Debug, Default)]
pub struct SelectionArbiter {
    state: ArbiterState,
}

impl SelectionArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ArbiterState {
        self.state
    }

    pub fn select(&mut self) {
        self.state = ArbiterState::SelectionPending;
    }

    /// Consumes the pending selection, if any. Always leaves the arbiter idle.
    pub fn close(&mut self) -> CloseDecision {
        match std::mem::take(&mut self.state) {
            ArbiterState::SelectionPending => CloseDecision::Submit,
            ArbiterState::Idle => CloseDecision::Dismiss,
        }
    }
}
