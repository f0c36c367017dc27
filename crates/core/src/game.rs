use crate::{Result, Side, StateId};

/// A lazily explored two-player zero-sum game tree.
///
/// This trait is the only surface search algorithms see. Moves are plain
/// indices in `0..branching_factor()` and every non-terminal node has
/// exactly `branching_factor()` moves. Evaluations are in [0, 1] from MAX's
/// point of view: 1 means MAX wins.
pub trait GameTree {
    /// Number of moves available at every non-terminal node.
    fn branching_factor(&self) -> usize;

    /// The root state.
    fn root(&self) -> StateId {
        StateId::ROOT
    }

    /// Side to move at `state`.
    fn side(&self, state: StateId) -> Result<Side>;

    /// Returns true if `state` has no successors.
    fn is_terminal(&self, state: StateId) -> Result<bool>;

    /// Returns the state reached by playing `mv` from `state`, creating it
    /// if needed.
    ///
    /// - `Ok(None)` if `state` is terminal
    /// - `Err(MoveOutOfRange)` if `mv >= branching_factor()`
    fn get_new_state(&mut self, state: StateId, mv: usize) -> Result<Option<StateId>>;

    /// Evaluation of `state` in [0, 1].
    ///
    /// Terminal states return their ground truth; other states return the
    /// attached heuristic's value. Computed once and memoized.
    fn get_eval(&mut self, state: StateId) -> Result<f64>;
}

/// Instrumentation for studying search pathology on fully adversarial trees.
pub trait PathologyProbe: GameTree {
    /// Returns true if the side to move at `state` holds the winning value.
    fn is_choice_state(&self, state: StateId) -> Result<bool>;

    /// Returns true if playing `mv` at the non-root choice node `state`
    /// flips the branch away from the sign committed to at the root.
    ///
    /// Only defined when both flip rates are 1; anything else is
    /// `ProbeOutOfDomain`.
    fn is_pathological_move(&mut self, state: StateId, mv: usize) -> Result<bool>;
}
