//! The `SensoryLayer` recognizes features conditioned on location.
//!
//! A feature label is spread over a small random subset of mini-columns whenever it is
//! sensed and no column carries it. Those columns answer for the feature until a later
//! feature relabels all of them, at which point the next presentation allots fresh
//! columns. All other columns stay silent while it is sensed. The layer queries every column and flattens the per-column
//! activations and learning cells, in column order, into two vectors of equal length.

use super::{column::MiniColumn, config::Config};
use crate::error::{ensure_len, Result};
use rand::{rngs::StdRng, seq::index};

/// Mini-columns producing a flattened sensation.
#[derive(Debug, Clone)]
pub struct SensoryLayer {
    columns: Vec<MiniColumn>,

    cells_per_column: usize,

    /// Columns allotted to each new feature.
    columns_per_feature: usize,

    /// Length of the location vector sensory dendrites read.
    location_size: usize,

    /// Drives feature allocation and burst learner selection.
    rand: StdRng,
}

impl SensoryLayer {
    /// Creates the columns, drawing their dendrite counts from `rand`, and keeps `rand` for
    /// the choices made while sensing.
    pub fn new(config: &Config, mut rand: StdRng) -> Self {
        let columns = (0..config.sensation().columns())
            .map(|_| MiniColumn::new(config, &mut rand))
            .collect();

        Self {
            columns,
            cells_per_column: config.sensation().cells_per_column(),
            columns_per_feature: config.sensation().columns_per_feature(),
            location_size: config.location().cell_count(),
            rand,
        }
    }

    /// Senses `feature` at `location`, returning the cell activations and the cells that
    /// should learn this location.
    pub fn sense(&mut self, feature: &str, location: &[bool]) -> Result<(Vec<bool>, Vec<bool>)> {
        ensure_len("location", self.location_size, location.len())?;
        self.allocate(feature);

        let mut sensation = Vec::with_capacity(self.cell_count());
        let mut learning = Vec::with_capacity(self.cell_count());
        for column in &mut self.columns {
            let (active, learn) = column.predict_sensation(location, feature, &mut self.rand)?;
            sensation.extend(active);
            learning.extend(learn);
        }
        Ok((sensation, learning))
    }

    /// Links the cells flagged in `learning` to `location`.
    pub fn link_to_location(&mut self, location: &[bool], learning: &[bool]) -> Result<()> {
        ensure_len("location", self.location_size, location.len())?;
        ensure_len("learning cells", self.cell_count(), learning.len())?;

        for (column, slice) in self
            .columns
            .iter_mut()
            .zip(learning.chunks(self.cells_per_column))
        {
            column.link_cells_to_location(location, slice)?;
        }
        Ok(())
    }

    /// Allots `feature` to fresh random columns unless some column still carries it.
    fn allocate(&mut self, feature: &str) {
        if self.carries(feature) {
            return;
        }

        let chosen = index::sample(
            &mut self.rand,
            self.columns.len(),
            self.columns_per_feature,
        )
        .into_vec();
        for &column in &chosen {
            self.columns[column].set_feature(feature);
        }

        log::debug!("feature {feature:?} allotted to columns {chosen:?}");
    }

    fn carries(&self, feature: &str) -> bool {
        self.columns
            .iter()
            .any(|column| column.feature() == Some(feature))
    }

    /// Columns currently labelled with `feature`, in column order, or `None` when no
    /// column carries it.
    pub fn columns_for(&self, feature: &str) -> Option<Vec<usize>> {
        let columns: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, column)| column.feature() == Some(feature))
            .map(|(index, _)| index)
            .collect();
        (!columns.is_empty()).then_some(columns)
    }

    /// Length of the flattened sensation vector.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells_per_column * self.columns.len()
    }

    pub fn cells_per_column(&self) -> usize {
        self.cells_per_column
    }

    pub fn location_size(&self) -> usize {
        self.location_size
    }

    pub fn columns(&self) -> &[MiniColumn] {
        &self.columns
    }
}
