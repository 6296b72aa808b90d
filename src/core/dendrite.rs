//! A `Dendrite` models one dendritic segment: a thresholded detector over the activity of
//! an upstream population.
//!
//! Unlike permanence-based segments, a dendrite here stores a single binary pattern and
//! is trained in one shot. It starts untrained (no synapse set), and the link operations
//! of cells only ever write to an untrained dendrite, so a stored pattern is never
//! overwritten.

/// A dendritic segment holding at most one learned activity pattern.
#[derive(Debug, Clone)]
pub struct Dendrite {
    /// One synapse per upstream cell, set where the learned pattern was active.
    synapses: Vec<bool>,

    /// Number of coinciding active synapses required to fire.
    threshold: usize,
}

impl Dendrite {
    /// Creates an untrained dendrite over an upstream population of `size` cells.
    pub fn new(threshold: usize, size: usize) -> Self {
        Self {
            synapses: vec![false; size],
            threshold,
        }
    }

    /// Fires when the overlap between the stored pattern and `input` reaches the threshold.
    #[inline]
    pub(crate) fn activate(&self, input: &[bool]) -> bool {
        debug_assert_eq!(input.len(), self.synapses.len());
        let overlap = self
            .synapses
            .iter()
            .zip(input)
            .filter(|&(&synapse, &active)| synapse && active)
            .count();
        overlap >= self.threshold
    }

    /// Overwrites the stored pattern.
    #[inline]
    pub(crate) fn set_synapses(&mut self, pattern: &[bool]) {
        debug_assert_eq!(pattern.len(), self.synapses.len());
        self.synapses.copy_from_slice(pattern);
    }

    #[inline]
    pub fn is_trained(&self) -> bool {
        self.synapses.iter().any(|&synapse| synapse)
    }

    pub fn synapses(&self) -> &[bool] {
        &self.synapses
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }
}

/// Stores `pattern` on the first untrained dendrite. Does nothing when every dendrite is
/// already trained or the pattern has no active cell.
pub(crate) fn learn_on_free_dendrite(dendrites: &mut [Dendrite], pattern: &[bool]) {
    if !pattern.iter().any(|&active| active) {
        return;
    }
    if let Some(dendrite) = dendrites.iter_mut().find(|d| !d.is_trained()) {
        dendrite.set_synapses(pattern);
    }
}
