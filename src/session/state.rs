//! Registry binding state machine.

/// Whether a session is currently bound to a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BindingState {
    /// No session is running; `run` may bind.
    #[default]
    Unbound,
    /// A session is running; `reset_all` is legal, `run` is rejected.
    Bound,
}

impl BindingState {
    /// Check if transition to target state is valid.
    ///
    /// Valid transitions:
    /// - Unbound -> Bound (session entry)
    /// - Bound -> Unbound (session exit, on every path)
    pub fn can_transition_to(&self, target: BindingState) -> bool {
        use BindingState::*;
        matches!((*self, target), (Unbound, Bound) | (Bound, Unbound))
    }

    /// The only state from which `self` can be reached.
    pub fn predecessor(&self) -> BindingState {
        match self {
            BindingState::Unbound => BindingState::Bound,
            BindingState::Bound => BindingState::Unbound,
        }
    }

    /// Check if a session is running.
    pub fn is_bound(&self) -> bool {
        matches!(self, BindingState::Bound)
    }
}

impl From<bool> for BindingState {
    fn from(bound: bool) -> Self {
        if bound {
            BindingState::Bound
        } else {
            BindingState::Unbound
        }
    }
}
