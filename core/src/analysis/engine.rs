use alloc::collections::{BTreeSet, VecDeque};
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::*;

/// What a resolved sentence proved about its cells.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// Every cell of the sentence is a mine.
    AllMines,
    /// Every cell not already known to be a mine is safe.
    RemainderSafe,
}

/// Emitted once per major knowledge-base update. Each event is a point where
/// a caller may re-read the overlay grid and redraw.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InferenceEvent {
    /// A revealed-cell observation became a new sentence.
    SentenceAdmitted {
        source: Coord2,
        cells: usize,
        mines: u8,
    },
    /// A sentence reached certainty and left the knowledge base.
    SentenceResolved { verdict: Verdict, cells: Vec<Coord2> },
    /// Two overlapping sentences produced a tighter derived sentence.
    SentenceDerived { cells: usize, mines: u8 },
}

/// Constraint-propagation engine: turns revealed-cell observations into
/// sentences, then squeezes the knowledge base for certain conclusions until
/// it goes quiescent. It never guesses; every mark on the overlay grid is
/// provable from the observations it was fed.
///
/// Reasoning is pull-based: [`observe`](Self::observe) queues a batch and
/// [`step`](Self::step) performs one major inference per call, so a caller
/// can interleave display updates between steps. After a step returns an
/// error the knowledge base is outside its contract and further stepping is
/// unspecified.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InferenceEngine {
    size: Coord2,
    overlays: OverlayGrid,
    knowledge: Vec<Sentence>,
    pending: VecDeque<RevealedCell>,
}

impl InferenceEngine {
    pub fn new(size: Coord2) -> Self {
        Self {
            size,
            overlays: OverlayGrid::new(size),
            knowledge: Vec::new(),
            pending: VecDeque::new(),
        }
    }

    pub fn size(&self) -> Coord2 {
        self.size
    }

    pub fn overlays(&self) -> &OverlayGrid {
        &self.overlays
    }

    pub fn knowledge(&self) -> impl Iterator<Item = &Sentence> {
        self.knowledge.iter()
    }

    /// Ingests a batch of newly revealed cells. Every observed cell is known
    /// safe by virtue of having been revealed, so its overlay is
    /// fast-forwarded without display credit; the observations themselves
    /// queue up for sentence admission, lowest counts first.
    pub fn observe(&mut self, revealed: &[RevealedCell]) {
        let mut batch: Vec<RevealedCell> = revealed
            .iter()
            .filter(|cell| self.in_bounds(cell.coords))
            .copied()
            .collect();

        for cell in &batch {
            let overlay = self.overlays.get_mut(cell.coords);
            if overlay.prediction == Prediction::Unknown {
                overlay.prediction = Prediction::Safe;
                overlay.show_prediction = false;
            }
        }

        batch.sort_by_key(|cell| cell.adjacent_mines);
        self.pending.extend(batch);
    }

    /// Performs at most one major inference step.
    ///
    /// Queued observations are admitted first, then the knowledge base is
    /// scanned for a certain sentence, then for a subset-derivable pair;
    /// any progress restarts the scan on the next call. `Ok(None)` means no
    /// further certainty can be extracted until new observations arrive.
    pub fn step(&mut self) -> Result<Option<InferenceEvent>> {
        while let Some(observation) = self.pending.pop_front() {
            if let Some(event) = self.admit_observation(observation)? {
                return Ok(Some(event));
            }
        }

        if let Some(event) = self.resolve_certain()? {
            return Ok(Some(event));
        }

        self.derive_subset()
    }

    /// Pulls [`step`](Self::step) until quiescence, collecting every event.
    pub fn run_to_quiescence(&mut self) -> Result<Vec<InferenceEvent>> {
        let mut events = Vec::new();
        while let Some(event) = self.step()? {
            events.push(event);
        }
        Ok(events)
    }

    fn in_bounds(&self, coords: Coord2) -> bool {
        coords.0 < self.size.0 && coords.1 < self.size.1
    }

    fn admit_observation(&mut self, observation: RevealedCell) -> Result<Option<InferenceEvent>> {
        let candidate: BTreeSet<Coord2> = moore_neighbors(observation.coords, self.size)
            .into_iter()
            .collect();

        let admitted = self.admit_sentence(candidate, observation.adjacent_mines)?;
        Ok(admitted.map(|(cells, mines)| {
            log::debug!(
                "Observation at {:?} admitted as sentence: {} mines among {} cells",
                observation.coords,
                mines,
                cells
            );
            InferenceEvent::SentenceAdmitted {
                source: observation.coords,
                cells,
                mines,
            }
        }))
    }

    /// The admission rule shared by observations and derived sentences:
    /// strips known-safe cells, then discards empty, fully-explained, and
    /// duplicate candidates. An admitted sentence highlights its members and
    /// gets one immediate certainty check, since it may already be
    /// resolvable at birth.
    fn admit_sentence(&mut self, cells: BTreeSet<Coord2>, mines: u8) -> Result<Option<(usize, u8)>> {
        let cells: BTreeSet<Coord2> = cells
            .into_iter()
            .filter(|&coords| self.overlays.prediction(coords) != Prediction::Safe)
            .collect();

        if cells.is_empty() {
            return Ok(None);
        }

        if usize::from(mines) > cells.len() {
            return Err(GameError::ContradictoryKnowledge {
                cells: cells.len(),
                mines,
            });
        }

        if cells
            .iter()
            .all(|&coords| self.overlays.prediction(coords) == Prediction::Mine)
        {
            return Ok(None);
        }

        let sentence = Sentence::new(cells, mines);
        if self
            .knowledge
            .iter()
            .any(|known| known.covers_same_cells(&sentence))
        {
            return Ok(None);
        }

        let info = (sentence.len(), sentence.mines());
        for coords in sentence.cells() {
            self.overlays.get_mut(coords).highlight = Some(sentence.highlight_intensity());
        }

        if let Some(verdict) = self.certainty_of(&sentence) {
            self.apply_verdict(&sentence, verdict)?;
        }
        self.knowledge.push(sentence);

        Ok(Some(info))
    }

    /// Scans the knowledge base in order for the first sentence that has
    /// reached certainty, applies its verdict, and removes it.
    fn resolve_certain(&mut self) -> Result<Option<InferenceEvent>> {
        for index in 0..self.knowledge.len() {
            let Some(verdict) = self.certainty_of(&self.knowledge[index]) else {
                continue;
            };

            let sentence = self.knowledge.remove(index);
            self.apply_verdict(&sentence, verdict)?;
            for coords in sentence.cells() {
                self.overlays.get_mut(coords).highlight = None;
            }

            log::debug!("Sentence resolved with {:?}: {:?}", verdict, sentence);
            return Ok(Some(InferenceEvent::SentenceResolved {
                verdict,
                cells: sentence.cells().collect(),
            }));
        }

        Ok(None)
    }

    /// Scans sentence pairs for a subset relation and admits the difference
    /// sentence, which is a prime candidate for immediate certainty.
    fn derive_subset(&mut self) -> Result<Option<InferenceEvent>> {
        for first in 0..self.knowledge.len() {
            for second in 0..self.knowledge.len() {
                if first == second {
                    continue;
                }

                let only_in_first = self.knowledge[first].difference(&self.knowledge[second]);
                let only_in_second = self.knowledge[second].difference(&self.knowledge[first]);

                // neither is a subset of the other
                if !only_in_first.is_empty() && !only_in_second.is_empty() {
                    continue;
                }

                let difference = if only_in_first.is_empty() {
                    only_in_second
                } else {
                    only_in_first
                };
                let mines = self.knowledge[first]
                    .mines()
                    .abs_diff(self.knowledge[second].mines());

                if let Some((cells, mines)) = self.admit_sentence(difference, mines)? {
                    log::debug!("Derived sentence: {} mines among {} cells", mines, cells);
                    return Ok(Some(InferenceEvent::SentenceDerived { cells, mines }));
                }
            }
        }

        Ok(None)
    }

    fn certainty_of(&self, sentence: &Sentence) -> Option<Verdict> {
        if sentence.len() == usize::from(sentence.mines()) {
            return Some(Verdict::AllMines);
        }

        let known_mines = sentence
            .cells()
            .filter(|&coords| self.overlays.prediction(coords) == Prediction::Mine)
            .count();
        (known_mines == usize::from(sentence.mines())).then_some(Verdict::RemainderSafe)
    }

    fn apply_verdict(&mut self, sentence: &Sentence, verdict: Verdict) -> Result<()> {
        match verdict {
            Verdict::AllMines => {
                for coords in sentence.cells() {
                    self.predict(coords, Prediction::Mine)?;
                }
            }
            Verdict::RemainderSafe => {
                for coords in sentence.cells() {
                    if self.overlays.prediction(coords) != Prediction::Mine {
                        self.predict(coords, Prediction::Safe)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn predict(&mut self, coords: Coord2, prediction: Prediction) -> Result<()> {
        let overlay = self.overlays.get_mut(coords);
        if overlay.prediction.is_known() && overlay.prediction != prediction {
            return Err(GameError::ConflictingPrediction { coords });
        }
        overlay.prediction = prediction;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use proptest::prelude::*;

    use super::*;

    #[test]
    fn lone_hidden_neighbor_is_deduced_as_mine() {
        // 1x3 board [mine, 1, 0]: observing the two safe cells pins the mine
        let mut engine = InferenceEngine::new((3, 1));
        engine.observe(&[
            RevealedCell::new((1, 0), 1),
            RevealedCell::new((2, 0), 0),
        ]);

        let events = engine.run_to_quiescence().unwrap();

        assert_eq!(engine.overlays().prediction((0, 0)), Prediction::Mine);
        assert_eq!(engine.overlays().prediction((1, 0)), Prediction::Safe);
        assert_eq!(engine.overlays().prediction((2, 0)), Prediction::Safe);
        assert_eq!(engine.knowledge().count(), 0);
        assert!(matches!(
            events.as_slice(),
            [
                InferenceEvent::SentenceAdmitted { source: (1, 0), cells: 1, mines: 1 },
                InferenceEvent::SentenceResolved { verdict: Verdict::AllMines, .. },
            ]
        ));
    }

    #[test]
    fn observed_cells_are_fast_forwarded_without_display_credit() {
        let mut engine = InferenceEngine::new((3, 1));
        engine.observe(&[
            RevealedCell::new((1, 0), 1),
            RevealedCell::new((2, 0), 0),
        ]);
        engine.run_to_quiescence().unwrap();

        // revealed cells hold their prediction quietly, deduced cells show it
        assert!(!engine.overlays().get((1, 0)).show_prediction);
        assert!(!engine.overlays().get((2, 0)).show_prediction);
        assert!(engine.overlays().get((0, 0)).show_prediction);
    }

    #[test]
    fn known_mine_count_marks_the_remainder_safe() {
        // mine only at (0, 0); reveal the ring around it in two passes
        let mut engine = InferenceEngine::new((3, 3));
        engine.observe(&[RevealedCell::new((1, 1), 1)]);
        engine.run_to_quiescence().unwrap();
        assert_eq!(engine.knowledge().count(), 1);

        engine.observe(&[
            RevealedCell::new((1, 0), 1),
            RevealedCell::new((0, 1), 1),
            RevealedCell::new((2, 0), 0),
            RevealedCell::new((2, 1), 0),
            RevealedCell::new((0, 2), 0),
            RevealedCell::new((1, 2), 0),
            RevealedCell::new((2, 2), 0),
        ]);
        engine.run_to_quiescence().unwrap();

        assert_eq!(engine.overlays().prediction((0, 0)), Prediction::Mine);
        for coords in [(1, 0), (0, 1), (1, 1), (2, 0), (2, 1), (0, 2), (1, 2), (2, 2)] {
            assert_eq!(engine.overlays().prediction(coords), Prediction::Safe, "at {coords:?}");
        }
        assert_eq!(engine.knowledge().count(), 0);
    }

    #[test]
    fn subset_difference_cracks_the_one_two_one_pattern() {
        // 3x2 board, mines at (0, 1) and (2, 1), bottom row hidden
        let mut engine = InferenceEngine::new((3, 2));
        engine.observe(&[
            RevealedCell::new((0, 0), 1),
            RevealedCell::new((1, 0), 2),
            RevealedCell::new((2, 0), 1),
        ]);

        let events = engine.run_to_quiescence().unwrap();

        // the derived difference sentence pins one mine and frees the middle
        assert_eq!(engine.overlays().prediction((2, 1)), Prediction::Mine);
        assert_eq!(engine.overlays().prediction((1, 1)), Prediction::Safe);
        assert_eq!(engine.overlays().prediction((0, 1)), Prediction::Unknown);
        assert!(events
            .iter()
            .any(|event| matches!(event, InferenceEvent::SentenceDerived { .. })));

        // revealing the freed cell hands over the observation that pins the rest
        engine.observe(&[RevealedCell::new((1, 1), 2)]);
        engine.run_to_quiescence().unwrap();

        assert_eq!(engine.overlays().prediction((0, 1)), Prediction::Mine);
        assert_eq!(engine.knowledge().count(), 0);
    }

    #[test]
    fn duplicate_sentences_are_admitted_once() {
        let mut engine = InferenceEngine::new((3, 3));
        engine.observe(&[
            RevealedCell::new((1, 1), 1),
            RevealedCell::new((1, 1), 1),
        ]);
        engine.run_to_quiescence().unwrap();

        assert_eq!(engine.knowledge().count(), 1);
    }

    #[test]
    fn reobservation_changes_nothing() {
        let batch = [
            RevealedCell::new((1, 0), 1),
            RevealedCell::new((2, 0), 0),
        ];
        let mut engine = InferenceEngine::new((3, 1));
        engine.observe(&batch);
        engine.run_to_quiescence().unwrap();
        let before = engine.clone();

        engine.observe(&batch);
        let events = engine.run_to_quiescence().unwrap();

        assert!(events.is_empty());
        assert_eq!(engine, before);
    }

    #[test]
    fn impossible_observation_is_a_contradiction() {
        // a single hidden neighbor cannot hold two mines
        let mut engine = InferenceEngine::new((2, 1));
        engine.observe(&[RevealedCell::new((0, 0), 2)]);

        assert_eq!(
            engine.run_to_quiescence().unwrap_err(),
            GameError::ContradictoryKnowledge { cells: 1, mines: 2 }
        );
    }

    #[test]
    fn out_of_bounds_observations_are_ignored() {
        let mut engine = InferenceEngine::new((2, 2));
        engine.observe(&[RevealedCell::new((5, 5), 3)]);

        assert!(engine.run_to_quiescence().unwrap().is_empty());
        assert_eq!(engine.knowledge().count(), 0);
    }

    #[test]
    fn highlights_follow_the_sentence_lifecycle() {
        let mut engine = InferenceEngine::new((3, 3));
        engine.observe(&[RevealedCell::new((1, 1), 1)]);

        let event = engine.step().unwrap();
        assert!(matches!(event, Some(InferenceEvent::SentenceAdmitted { .. })));
        let highlight = engine.overlays().get((0, 0)).highlight.unwrap();
        assert!((highlight - (1.0 - 1.0 / 9.0)).abs() < 1e-6);

        // an uncertain sentence keeps its highlight until it resolves
        assert_eq!(engine.step().unwrap(), None);
        assert!(engine.overlays().get((0, 0)).highlight.is_some());
    }

    #[test]
    fn resolved_sentences_clear_their_highlights() {
        let mut engine = InferenceEngine::new((3, 1));
        engine.observe(&[
            RevealedCell::new((1, 0), 1),
            RevealedCell::new((2, 0), 0),
        ]);
        engine.run_to_quiescence().unwrap();

        assert_eq!(engine.overlays().get((0, 0)).highlight, None);
    }

    fn full_observation(board: &Board) -> Vec<RevealedCell> {
        let (x_end, y_end) = board.size();
        let mut batch = Vec::new();
        for x in 0..x_end {
            for y in 0..y_end {
                let cell = board[(x, y)];
                if !cell.mine {
                    batch.push(RevealedCell::new((x, y), cell.adjacent_mines));
                }
            }
        }
        batch
    }

    proptest! {
        #[test]
        fn full_knowledge_never_yields_a_wrong_mark(
            seed in any::<u64>(),
            density in 0.05f64..0.3,
        ) {
            let config = BoardConfig::new((8, 8), density);
            let board = RandomBoardGenerator::new(seed).generate(config);

            let mut engine = InferenceEngine::new(board.size());
            engine.observe(&full_observation(&board));
            engine.run_to_quiescence().unwrap();

            for x in 0..8 {
                for y in 0..8 {
                    match engine.overlays().prediction((x, y)) {
                        Prediction::Mine => prop_assert!(board[(x, y)].mine),
                        Prediction::Safe => prop_assert!(!board[(x, y)].mine),
                        Prediction::Unknown => {}
                    }
                }
            }
        }
    }
}
