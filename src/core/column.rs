//! A `MiniColumn` groups sensory cells that all respond to the same feature.
//!
//! Biological inspiration:
//! Cortical mini-columns share feed-forward input, and the cells within a column
//! represent that input in different contexts. Here the context is location: a cell
//! responds to its column's feature only at the locations its dendrites have learned.
//!
//! Bursting:
//! - When the column's feature is sensed but no cell recognizes the current location,
//!   all cells activate, signalling an unknown feature-at-location.
//! - One cell that has never been chosen before becomes the learner and will bind to the
//!   location. Every cell is chosen at most once, which spreads the column's capacity.
//! - A column whose cells have all been chosen is saturated: it keeps bursting but no
//!   longer selects a learner.

use super::{
    config::Config,
    dendrite::{learn_on_free_dendrite, Dendrite},
};
use crate::error::{ensure_len, Result};
use rand::{seq::IndexedRandom, Rng};

/// Dendrites per sensory cell are drawn uniformly from this range.
const DENDRITES_PER_CELL: std::ops::RangeInclusive<usize> = 6..=8;

/// A feature recognizing cell with dendrites over the location layer.
#[derive(Debug, Clone)]
pub struct SensoryCell {
    dendrites: Vec<Dendrite>,

    /// Set once the cell has been picked to learn during a burst.
    learner: bool,
}

impl SensoryCell {
    pub fn new<R: Rng>(config: &Config, rng: &mut R) -> Self {
        let dendrites = (0..rng.random_range(DENDRITES_PER_CELL))
            .map(|_| {
                Dendrite::new(
                    config.sensory_dendrite_threshold(),
                    config.location().cell_count(),
                )
            })
            .collect();

        Self {
            dendrites,
            learner: false,
        }
    }

    #[inline]
    pub(crate) fn activate_from_dendrite(&self, location: &[bool]) -> bool {
        self.dendrites.iter().any(|d| d.activate(location))
    }

    /// Stores `location` on the first untrained dendrite, if any.
    #[inline]
    pub(crate) fn link_to_location(&mut self, location: &[bool]) {
        learn_on_free_dendrite(&mut self.dendrites, location);
    }

    pub fn is_learner(&self) -> bool {
        self.learner
    }

    pub fn dendrites(&self) -> &[Dendrite] {
        &self.dendrites
    }
}

/// Sensory cells bound to a single feature label.
#[derive(Debug, Clone)]
pub struct MiniColumn {
    feature: Option<String>,
    cells: Vec<SensoryCell>,

    /// Length of the location vector the cells' dendrites read.
    location_size: usize,
}

impl MiniColumn {
    pub fn new<R: Rng>(config: &Config, rng: &mut R) -> Self {
        let cells = (0..config.sensation().cells_per_column())
            .map(|_| SensoryCell::new(config, rng))
            .collect();

        Self {
            feature: None,
            cells,
            location_size: config.location().cell_count(),
        }
    }

    /// Returns the cell activations and the cells that should learn `location`.
    ///
    /// - Another feature: nothing is active and nothing learns.
    /// - Recognized: the recognizing cells are active and reinforce themselves.
    /// - Burst: every cell is active and a fresh learner, if one is left, learns.
    pub fn predict_sensation<R: Rng>(
        &mut self,
        location: &[bool],
        feature: &str,
        rng: &mut R,
    ) -> Result<(Vec<bool>, Vec<bool>)> {
        ensure_len("location", self.location_size, location.len())?;
        if self.feature.as_deref() != Some(feature) {
            return Ok((self.silent(), self.silent()));
        }

        let recognized: Vec<bool> = self
            .cells
            .iter()
            .map(|cell| cell.activate_from_dendrite(location))
            .collect();

        if recognized.iter().any(|&active| active) {
            return Ok((recognized.clone(), recognized));
        }

        Ok((vec![true; self.cells.len()], self.select_learner(rng)))
    }

    /// Cells flagged in `learning` store `location` on a free dendrite.
    pub fn link_cells_to_location(
        &mut self,
        location: &[bool],
        learning: &[bool],
    ) -> Result<()> {
        ensure_len("location", self.location_size, location.len())?;
        ensure_len("learning cells", self.cells.len(), learning.len())?;

        for (cell, _) in self
            .cells
            .iter_mut()
            .zip(learning)
            .filter(|&(_, &learn)| learn)
        {
            cell.link_to_location(location);
        }
        Ok(())
    }

    /// Picks one never-chosen cell uniformly at random and flags it for good.
    fn select_learner<R: Rng>(&mut self, rng: &mut R) -> Vec<bool> {
        let mut learning = self.silent();
        let candidates: Vec<usize> = self
            .cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| !cell.learner)
            .map(|(index, _)| index)
            .collect();

        match candidates.choose(rng) {
            Some(&index) => {
                self.cells[index].learner = true;
                learning[index] = true;
            }
            None => log::debug!(
                "column for {:?} is saturated, bursting without a learner",
                self.feature
            ),
        }
        learning
    }

    fn silent(&self) -> Vec<bool> {
        vec![false; self.cells.len()]
    }

    pub fn feature(&self) -> Option<&str> {
        self.feature.as_deref()
    }

    /// Relabels the column. Only the sensory layer's allocation does this.
    pub(crate) fn set_feature(&mut self, feature: &str) {
        self.feature = Some(feature.to_owned());
    }

    /// Whether every cell has already been chosen as a learner.
    pub fn is_saturated(&self) -> bool {
        self.cells.iter().all(SensoryCell::is_learner)
    }

    pub fn cells(&self) -> &[SensoryCell] {
        &self.cells
    }

    pub fn location_size(&self) -> usize {
        self.location_size
    }
}
