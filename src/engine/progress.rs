use serde::Serialize;

/// How far a conversation has come along its current path.
///
/// `total` counts the main flow tree (group children included) plus every
/// sub-flow that the current answers have entered; branches never taken are
/// left out. `completed` counts completed ids inside that same set, so answers
/// left behind in an abandoned branch never inflate it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    /// The resolver has nothing left to ask.
    pub finished: bool,
}

impl Progress {
    pub fn percent(&self) -> u8 {
        if self.finished || self.total == 0 {
            return 100;
        }
        let ratio = 100.0 * self.completed as f64 / self.total as f64;
        ratio.round().min(100.0) as u8
    }
}
