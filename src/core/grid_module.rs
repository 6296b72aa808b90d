//! Grid cell modules track position by path integration.
//!
//! Biological inspiration:
//! Grid cells in the entorhinal cortex fire at the vertices of a hexagonal lattice that
//! tiles the environment. Cells sharing a lattice scale and orientation form a module,
//! and within a module the active cells shift together as the animal moves.
//!
//! Meaning in this model:
//! A `GridCellModule` lays its cells out on a regular grid and maps that grid through a
//! skewed 60 degree basis, so cell phases cover a unit rhombus. The module's believed
//! location is a set of "bumps" in that space. Movement shifts every bump, and the space
//! is periodic: positions wrap modulo one before being mapped back into the rhombus.
//! A cell is active when a bump falls within its receptive field.
//!
//! Each grid cell also owns dendrites over the sensory layer. When a sensation that a
//! cell has been linked to is seen again, the cell's dendrites fire and the module snaps
//! its bumps onto those cells, overriding the path integration estimate.

use super::{
    config::Config,
    dendrite::{learn_on_free_dendrite, Dendrite},
};
use crate::error::{ensure_len, Result};
use collect_slice::CollectSlice;
use rand::{seq::IndexedRandom, Rng};
use rand_distr::StandardNormal;
use std::fmt;

/// A phase coordinate in a module's rhombus frame.
pub type Phase = [f64; 2];

/// Largest `f64` strictly below one, keeps the last row of cells inside the unit cell.
const MAX_UNDER_ONE: f64 = 1.0 - f64::EPSILON / 2.0;

/// Module scales are drawn from a normal distribution truncated to `[SCALE_MIN, SCALE_MAX]`.
const SCALE_MEAN: f64 = 1.5;
const SCALE_STD: f64 = 0.7;
const SCALE_MIN: f64 = 0.01;
const SCALE_MAX: f64 = 10.0;

/// Angle between the two lattice basis vectors, in degrees.
const BASIS_ANGLE: f64 = 60.0;

/// Dendrites per grid cell are drawn uniformly from this range.
const DENDRITES_PER_CELL: std::ops::RangeInclusive<usize> = 6..=8;

/// Maps euclidean displacements into a module's skewed frame.
///
/// The matrix is the inverse of the scaled lattice basis. Points are treated as row
/// vectors multiplied on the left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RhombusTransform {
    matrix: [[f64; 2]; 2],
}

impl RhombusTransform {
    /// Builds the transform for a lattice of the given scale and orientation (degrees).
    pub fn new(scale: f64, orientation: f64) -> Self {
        let first = orientation.to_radians();
        let second = (orientation + BASIS_ANGLE).to_radians();

        let a = scale * first.cos();
        let b = scale * second.cos();
        let c = scale * first.sin();
        let d = scale * second.sin();

        // det = scale² · sin(60°), never zero for a positive scale.
        let det = a * d - b * c;

        Self {
            matrix: [[d / det, -b / det], [-c / det, a / det]],
        }
    }

    #[inline]
    pub fn apply(&self, point: Phase) -> Phase {
        let m = &self.matrix;
        [
            point[0] * m[0][0] + point[1] * m[1][0],
            point[0] * m[0][1] + point[1] * m[1][1],
        ]
    }

    /// Wraps each coordinate into `[0, 1)` and maps the result into the rhombus.
    #[inline]
    pub fn fold(&self, point: Phase) -> Phase {
        self.apply([point[0].rem_euclid(1.0), point[1].rem_euclid(1.0)])
    }
}

/// A single location coding cell with a fixed phase.
#[derive(Debug, Clone)]
pub struct GridCell {
    phase: Phase,

    /// Footprint radius, bumps closer than this count as a direct hit.
    size: f64,

    /// Standard deviation of the gaussian receptive field.
    bump_size: f64,

    /// Minimum response for the cell to be active, derived once from the readout resolution.
    threshold: f64,

    /// Segments over the sensory layer.
    dendrites: Vec<Dendrite>,
}

impl GridCell {
    pub fn new<R: Rng>(phase: Phase, size: f64, config: &Config, rng: &mut R) -> Self {
        let bump_size = config.location().bump_size();
        let readout_resolution = config.location().cell_readout_resolution();
        let threshold = gaussian(
            (readout_resolution / 2.0) * (2.0 / 3f64.sqrt()),
            bump_size,
        );
        let dendrites = (0..rng.random_range(DENDRITES_PER_CELL))
            .map(|_| {
                Dendrite::new(
                    config.location().dendrite_threshold(),
                    config.sensation().cell_count(),
                )
            })
            .collect();

        Self {
            phase,
            size,
            bump_size,
            threshold,
            dendrites,
        }
    }

    /// Whether any bump lies within the cell's receptive field.
    ///
    /// Responses to several bumps are combined with a noisy-OR, so a single nearby bump is
    /// enough to activate the cell.
    pub fn activate(&self, bumps: &[Phase]) -> bool {
        let response = match bumps {
            [] => 0.0,
            [bump] => self.response(bump),
            _ => {
                1.0 - bumps
                    .iter()
                    .map(|bump| 1.0 - self.response(bump))
                    .product::<f64>()
            }
        };
        response >= self.threshold
    }

    /// Whether any dendrite recognizes `sensation`.
    #[inline]
    pub(crate) fn activate_from_dendrite(&self, sensation: &[bool]) -> bool {
        self.dendrites.iter().any(|d| d.activate(sensation))
    }

    /// Stores `sensation` on the first untrained dendrite, if any.
    #[inline]
    pub(crate) fn link_to_sensation(&mut self, sensation: &[bool]) {
        learn_on_free_dendrite(&mut self.dendrites, sensation);
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn bump_size(&self) -> f64 {
        self.bump_size
    }

    pub fn dendrites(&self) -> &[Dendrite] {
        &self.dendrites
    }

    fn response(&self, bump: &Phase) -> f64 {
        gaussian(self.bump_distance(bump), self.bump_size)
    }

    fn bump_distance(&self, bump: &Phase) -> f64 {
        let distance = (bump[0] - self.phase[0]).hypot(bump[1] - self.phase[1]);
        (distance - self.size).max(0.0)
    }
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cell at [{:.4}, {:.4}] with threshold {:.4}",
            self.phase[0], self.phase[1], self.threshold
        )
    }
}

#[inline]
fn gaussian(distance: f64, bump_size: f64) -> f64 {
    (-(distance * distance) / (2.0 * bump_size * bump_size)).exp()
}

/// A population of grid cells sharing a lattice scale and orientation.
#[derive(Debug, Clone)]
pub struct GridCellModule {
    scale: f64,

    /// Lattice orientation in whole degrees.
    orientation: u32,

    side_length: usize,

    transform: RhombusTransform,

    cells: Vec<GridCell>,

    /// Current location hypotheses. Never empty.
    bumps: Vec<Phase>,

    /// Length of the sensation vector the cells' dendrites read.
    sensation_size: usize,
}

impl GridCellModule {
    /// Creates a module with a random scale and orientation.
    pub fn new<R: Rng>(config: &Config, rng: &mut R) -> Self {
        let scale = sample_scale(rng);
        let orientation = rng.random_range(0..360);
        Self::with_geometry(scale, orientation, config, rng)
    }

    /// Creates a module with a fixed scale and orientation. The initial bump still sits on
    /// a randomly chosen cell.
    pub fn with_geometry<R: Rng>(
        scale: f64,
        orientation: u32,
        config: &Config,
        rng: &mut R,
    ) -> Self {
        let side_length = config.location().module_side_length();
        let transform = RhombusTransform::new(scale, orientation as f64);

        let step = MAX_UNDER_ONE / side_length as f64;
        let mut cells = Vec::with_capacity(side_length * side_length);
        for row in 0..side_length {
            let y = step / 2.0 + row as f64 * step;
            for col in 0..side_length {
                let x = step / 2.0 + col as f64 * step;
                cells.push(GridCell::new(
                    transform.apply([x, y]),
                    step * scale,
                    config,
                    rng,
                ));
            }
        }

        let bumps = cells
            .choose(rng)
            .map(|cell| vec![cell.phase()])
            .unwrap_or_default();

        Self {
            scale,
            orientation,
            side_length,
            transform,
            cells,
            bumps,
            sensation_size: config.sensation().cell_count(),
        }
    }

    /// Path integrates `movement` and returns the resulting cell activations.
    pub fn move_by(&mut self, movement: [f64; 2]) -> Vec<bool> {
        self.shift_bumps(movement);
        self.activations()
    }

    /// Moves the bumps onto the cells whose dendrites recognize `sensation` and returns
    /// the resulting activations. Keeps the current bumps when no cell recognizes it.
    pub fn update_from_sensation(&mut self, sensation: &[bool]) -> Result<Vec<bool>> {
        ensure_len("sensation", self.sensation_size, sensation.len())?;
        self.settle_on_sensation(sensation);
        Ok(self.activations())
    }

    /// Links every cell active in `location` (this module's slice of the location vector)
    /// to the sensory cells set in `sensation`.
    pub fn link_cells_to_sensation(
        &mut self,
        location: &[bool],
        sensation: &[bool],
    ) -> Result<()> {
        ensure_len("location", self.cells.len(), location.len())?;
        ensure_len("sensation", self.sensation_size, sensation.len())?;

        for (cell, _) in self
            .cells
            .iter_mut()
            .zip(location)
            .filter(|&(_, &active)| active)
        {
            cell.link_to_sensation(sensation);
        }
        Ok(())
    }

    /// Activation of every cell against the current bumps.
    pub fn activations(&self) -> Vec<bool> {
        let mut activations = vec![false; self.cells.len()];
        self.write_activations(&mut activations);
        activations
    }

    /// Writes the activation of every cell into `into`, which must hold one slot per cell.
    pub(crate) fn write_activations(&self, into: &mut [bool]) {
        self.cells
            .iter()
            .map(|cell| cell.activate(&self.bumps))
            .collect_slice_checked(into);
    }

    pub(crate) fn shift_bumps(&mut self, movement: [f64; 2]) {
        let [dx, dy] = self.transform.apply(movement);
        for bump in self.bumps.iter_mut() {
            *bump = self.transform.fold([bump[0] + dx, bump[1] + dy]);
        }
    }

    /// Returns whether the bumps were replaced.
    pub(crate) fn settle_on_sensation(&mut self, sensation: &[bool]) -> bool {
        let bumps: Vec<Phase> = self
            .cells
            .iter()
            .filter(|cell| cell.activate_from_dendrite(sensation))
            .map(GridCell::phase)
            .collect();

        if bumps.is_empty() {
            return false;
        }

        log::trace!(
            "module (scale {:.3}, {}°): {} bump(s) from sensation",
            self.scale,
            self.orientation,
            bumps.len()
        );
        self.bumps = bumps;
        true
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn orientation(&self) -> u32 {
        self.orientation
    }

    pub fn side_length(&self) -> usize {
        self.side_length
    }

    pub fn transform(&self) -> &RhombusTransform {
        &self.transform
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn bumps(&self) -> &[Phase] {
        &self.bumps
    }

    /// Length of the sensation vector the cells' dendrites read.
    pub fn sensation_size(&self) -> usize {
        self.sensation_size
    }
}

impl fmt::Display for GridCellModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Module {0}x{0}; orientation {1}; scale {2:.4}; bumps at [",
            self.side_length, self.orientation, self.scale
        )?;
        for (i, bump) in self.bumps.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "[{:.4}, {:.4}]", bump[0], bump[1])?;
        }
        write!(f, "]")
    }
}

/// Draws a module scale by rejection from a normal distribution.
fn sample_scale<R: Rng>(rng: &mut R) -> f64 {
    loop {
        let z: f64 = rng.sample(StandardNormal);
        let scale = SCALE_MEAN + SCALE_STD * z;
        if (SCALE_MIN..=SCALE_MAX).contains(&scale) {
            return scale;
        }
    }
}
