pub mod manager;
pub mod mode;
pub mod split;
pub mod target;

pub use mode::{GameMode, ModeKind};
pub use split::TwoPlayerSplit;

use crate::render::Canvas;
use crate::types::{Frame, JointSample};

/// A running round: either one full-screen game or a split-screen pair.
pub enum GameSession {
    Solo(GameMode),
    Split(TwoPlayerSplit),
}

impl GameSession {
    /// One display tick. Returns whether the session is still live.
    pub fn process(&mut self, frame: &mut Frame, sample: &JointSample) -> bool {
        match self {
            GameSession::Solo(mode) => {
                let person = sample.persons.first();
                let mut canvas = Canvas::new(frame);
                mode.process(&mut canvas, person)
            }
            GameSession::Split(split) => split.process(frame, sample),
        }
    }
}
