//! The `LocationLayer` is an ensemble of independent grid cell modules.
//!
//! Each module keeps its own belief about where the sense is, at its own scale and
//! orientation. The layer drives all modules with the same movement or sensation and
//! concatenates their activations in construction order into one flat location vector.
//! Downstream code slices that vector back into equal per-module chunks, so the order
//! and the uniform module size are part of the layer's contract.

use super::{config::Config, grid_module::GridCellModule};
use crate::error::{ensure_len, Error, Result};
use rand::Rng;
use std::fmt;

/// Grid cell modules producing a flattened location representation.
#[derive(Debug, Clone)]
pub struct LocationLayer {
    modules: Vec<GridCellModule>,

    /// Cells in each module, identical across modules.
    cells_per_module: usize,

    /// Length of the sensation vector grid cell dendrites read.
    sensation_size: usize,
}

impl LocationLayer {
    /// Creates `config.location().modules()` modules, each with its own random scale and
    /// orientation.
    pub fn new<R: Rng>(config: &Config, rng: &mut R) -> Self {
        let modules = (0..config.location().modules())
            .map(|_| GridCellModule::new(config, rng))
            .collect();

        Self {
            modules,
            cells_per_module: config.location().cells_per_module(),
            sensation_size: config.sensation().cell_count(),
        }
    }

    /// Assembles a layer from prebuilt modules, which must all have the same size and
    /// read the same sensation vector.
    pub fn from_modules(modules: Vec<GridCellModule>) -> Result<Self> {
        let first = modules.first().ok_or(Error::InvalidParameter {
            name: "modules",
            value: 0,
        })?;
        let cells_per_module = first.cells().len();
        let sensation_size = first.sensation_size();

        for module in &modules[1..] {
            ensure_len("module", cells_per_module, module.cells().len())?;
            ensure_len("module sensation", sensation_size, module.sensation_size())?;
        }

        Ok(Self {
            modules,
            cells_per_module,
            sensation_size,
        })
    }

    /// Path integrates `movement` in every module.
    pub fn move_by(&mut self, movement: [f64; 2]) -> Vec<bool> {
        let mut location = vec![false; self.cell_count()];
        for (module, slice) in self
            .modules
            .iter_mut()
            .zip(location.chunks_mut(self.cells_per_module))
        {
            module.shift_bumps(movement);
            module.write_activations(slice);
        }
        location
    }

    /// Lets every module re-settle its bumps on the cells recognizing `sensation`.
    pub fn update_from_sensation(&mut self, sensation: &[bool]) -> Result<Vec<bool>> {
        ensure_len("sensation", self.sensation_size, sensation.len())?;

        let mut location = vec![false; self.cell_count()];
        let mut settled = 0;
        for (module, slice) in self
            .modules
            .iter_mut()
            .zip(location.chunks_mut(self.cells_per_module))
        {
            if module.settle_on_sensation(sensation) {
                settled += 1;
            }
            module.write_activations(slice);
        }

        log::debug!(
            "{settled}/{} modules re-settled from sensation",
            self.modules.len()
        );
        Ok(location)
    }

    /// Links the grid cells active in `location` to the sensory cells set in `sensation`.
    pub fn link_to_sensation(&mut self, sensation: &[bool], location: &[bool]) -> Result<()> {
        ensure_len("sensation", self.sensation_size, sensation.len())?;
        ensure_len("location", self.cell_count(), location.len())?;

        for (module, slice) in self
            .modules
            .iter_mut()
            .zip(location.chunks(self.cells_per_module))
        {
            module.link_cells_to_sensation(slice, sensation)?;
        }
        Ok(())
    }

    /// Splits a flattened location vector into one row per module.
    pub fn unflatten(&self, location: &[bool]) -> Result<Vec<Vec<bool>>> {
        ensure_len("location", self.cell_count(), location.len())?;
        Ok(location
            .chunks(self.cells_per_module)
            .map(<[bool]>::to_vec)
            .collect())
    }

    /// Length of the flattened location vector.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells_per_module * self.modules.len()
    }

    pub fn cells_per_module(&self) -> usize {
        self.cells_per_module
    }

    pub fn sensation_size(&self) -> usize {
        self.sensation_size
    }

    pub fn modules(&self) -> &[GridCellModule] {
        &self.modules
    }
}

impl fmt::Display for LocationLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Location Layer with {} modules", self.modules.len())?;
        for module in &self.modules {
            writeln!(f, "  {module}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{LocationConfig, SensationConfig};
    use rand::{rngs::StdRng, SeedableRng};

    fn config(modules: usize, side_length: usize) -> Config {
        Config::new(
            "test",
            LocationConfig::new(modules, side_length).unwrap(),
            SensationConfig::new(10, 2).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn concatenates_modules_in_order() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut layer = LocationLayer::new(&config(3, 4), &mut rng);
        let location = layer.move_by([0.5, 0.25]);

        assert_eq!(location.len(), 48);
        for (module, row) in layer.modules().iter().zip(location.chunks(16)) {
            assert_eq!(module.activations(), row);
        }
    }

    #[test]
    fn unflatten_round_trips() {
        let mut rng = StdRng::seed_from_u64(12);
        for (modules, side_length) in [(1, 1), (1, 6), (4, 3), (12, 6), (5, 2)] {
            let mut layer = LocationLayer::new(&config(modules, side_length), &mut rng);
            let location = layer.move_by([2.0, 5.0]);
            let rows = layer.unflatten(&location).unwrap();

            assert_eq!(rows.len(), modules);
            assert!(rows.iter().all(|row| row.len() == side_length * side_length));
            assert_eq!(rows.concat(), location);
        }
    }

    #[test]
    fn rejects_mismatched_shapes() {
        let mut rng = StdRng::seed_from_u64(13);
        let mut layer = LocationLayer::new(&config(2, 3), &mut rng);

        assert_eq!(
            layer.update_from_sensation(&[false; 19]),
            Err(Error::Shape {
                what: "sensation",
                expected: 20,
                actual: 19
            })
        );
        assert!(layer.link_to_sensation(&[false; 20], &[false; 17]).is_err());
        assert!(layer.unflatten(&[false; 19]).is_err());
    }

    #[test]
    fn fallback_keeps_every_module_in_place() {
        let mut rng = StdRng::seed_from_u64(14);
        let mut layer = LocationLayer::new(&config(4, 4), &mut rng);
        let moved = layer.move_by([1.0, -3.0]);
        let bumps: Vec<_> = layer.modules().iter().map(|m| m.bumps().to_vec()).collect();

        let settled = layer.update_from_sensation(&[true; 20]).unwrap();

        assert_eq!(settled, moved);
        for (module, before) in layer.modules().iter().zip(&bumps) {
            assert_eq!(module.bumps(), before.as_slice());
        }
    }

    #[test]
    fn links_reach_the_right_module() {
        let mut rng = StdRng::seed_from_u64(15);
        let mut layer = LocationLayer::new(&config(2, 2), &mut rng);
        let mut sensation = vec![false; 20];
        sensation[..8].fill(true);

        // Only the second cell of the second module is linked.
        let mut location = vec![false; 8];
        location[5] = true;
        layer.link_to_sensation(&sensation, &location).unwrap();

        let settled = layer.update_from_sensation(&sensation).unwrap();
        let second = &layer.modules()[1];
        assert_eq!(second.bumps(), &[second.cells()[1].phase()]);
        assert!(settled[5]);
        assert!(layer.modules()[0]
            .cells()
            .iter()
            .all(|cell| cell.dendrites().iter().all(|d| !d.is_trained())));
    }

    #[test]
    fn from_modules_requires_uniform_modules() {
        let mut rng = StdRng::seed_from_u64(16);
        let small = GridCellModule::new(&config(1, 2), &mut rng);
        let large = GridCellModule::new(&config(1, 3), &mut rng);

        assert!(LocationLayer::from_modules(vec![]).is_err());
        assert!(LocationLayer::from_modules(vec![small.clone(), large]).is_err());

        let layer = LocationLayer::from_modules(vec![small.clone(), small]).unwrap();
        assert_eq!(layer.cell_count(), 8);
        assert_eq!(layer.sensation_size(), 20);
    }

    #[test]
    fn display_lists_modules() {
        let mut rng = StdRng::seed_from_u64(17);
        let layer = LocationLayer::new(&config(2, 2), &mut rng);
        let text = layer.to_string();
        assert!(text.starts_with("Location Layer with 2 modules"));
        assert_eq!(text.matches("Module 2x2").count(), 2);
    }
}
