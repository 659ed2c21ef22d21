use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::*;

// Fractions of the configured thinking time, per update kind.
const ADMIT_PAUSE: f64 = 0.1;
const INFER_PAUSE: f64 = 1.0;

/// Pacing configuration for [`Agent::ponder`].
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Base delay a watching caller is suggested to hold between major
    /// reasoning steps. Purely cosmetic; correctness never depends on it.
    pub thinking_time: Duration,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            thinking_time: Duration::from_millis(1000),
        }
    }
}

/// One caller-visible refresh point: the overlay grid just changed, so
/// redraw, and optionally hold for `pause` so an observer can follow along.
#[derive(Clone, Debug, PartialEq)]
pub struct AgentUpdate {
    pub event: InferenceEvent,
    pub pause: Duration,
}

/// Observer that reasons about a board it can never mutate: it consumes
/// batches of revealed cells and publishes every conclusion through its
/// overlay grid. It only ever concludes what is provable from the
/// observations; when nothing is certain it goes quiet instead of guessing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    engine: InferenceEngine,
    config: AgentConfig,
}

impl Agent {
    pub fn new(size: Coord2) -> Self {
        Self::with_config(size, AgentConfig::default())
    }

    pub fn with_config(size: Coord2, config: AgentConfig) -> Self {
        Self {
            engine: InferenceEngine::new(size),
            config,
        }
    }

    pub fn for_board(board: &Board) -> Self {
        Self::new(board.size())
    }

    pub fn overlays(&self) -> &OverlayGrid {
        self.engine.overlays()
    }

    /// Starts one reasoning pass over the cells revealed since the previous
    /// pass. The returned iterator yields one update per major inference;
    /// its exclusive borrow guarantees at most one pass is in flight per
    /// agent. Dropping it early is fine, the undigested knowledge keeps
    /// until the next pass.
    pub fn ponder(&mut self, revealed: &[RevealedCell]) -> Pondering<'_> {
        self.engine.observe(revealed);
        Pondering { agent: self }
    }

    /// Convenience for callers that do not care about pacing: reasons
    /// through the whole batch synchronously and returns the number of
    /// knowledge-base updates that happened.
    pub fn ponder_all(&mut self, revealed: &[RevealedCell]) -> Result<usize> {
        let mut updates = 0;
        for update in self.ponder(revealed) {
            update?;
            updates += 1;
        }
        Ok(updates)
    }
}

/// Iterator over the updates of one reasoning pass.
#[derive(Debug)]
pub struct Pondering<'a> {
    agent: &'a mut Agent,
}

impl Iterator for Pondering<'_> {
    type Item = Result<AgentUpdate>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.agent.engine.step() {
            Err(err) => Some(Err(err)),
            Ok(None) => None,
            Ok(Some(event)) => {
                let factor = match event {
                    InferenceEvent::SentenceAdmitted { .. } => ADMIT_PAUSE,
                    InferenceEvent::SentenceResolved { .. }
                    | InferenceEvent::SentenceDerived { .. } => INFER_PAUSE,
                };
                let pause = self.agent.config.thinking_time.mul_f64(factor);
                Some(Ok(AgentUpdate { event, pause }))
            }
        }
    }
}
