//! A `Sense` couples a location layer with a sensory layer.
//!
//! One step:
//! 1. the location layer path integrates the movement,
//! 2. the sensory layer recognizes the feature at that predicted location,
//! 3. the location layer re-settles on the cells recognizing the resulting sensation,
//! 4. both layers link the cells active at the corrected location with this step's
//!    learning cells.
//!
//! The two layers never share cells. They only exchange activation vectors.

use super::{
    config::{is_valid_name, Config},
    location::LocationLayer,
    sensation::SensoryLayer,
};
use crate::error::{Error, Result};
use rand::{rngs::StdRng, SeedableRng};

/// One sensory modality with its own location and sensory layers.
#[derive(Debug, Clone)]
pub struct Sense {
    name: String,
    location_layer: LocationLayer,
    sensory_layer: SensoryLayer,
}

impl Sense {
    /// Builds a sense seeded from system entropy.
    pub fn new(config: &Config) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Builds a reproducible sense.
    pub fn with_seed(config: &Config, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    /// Builds the location layer from `rng` and hands the sensory layer a generator
    /// split off from it.
    pub fn with_rng(config: &Config, mut rng: StdRng) -> Self {
        let location_layer = LocationLayer::new(config, &mut rng);
        let sensory_layer = SensoryLayer::new(config, StdRng::from_rng(&mut rng));

        Self {
            name: config.name().to_owned(),
            location_layer,
            sensory_layer,
        }
    }

    /// Assembles a sense from prebuilt layers whose vector sizes must match each other.
    pub fn from_layers(
        name: impl Into<String>,
        location_layer: LocationLayer,
        sensory_layer: SensoryLayer,
    ) -> Result<Self> {
        let name = name.into();
        if !is_valid_name(&name) {
            return Err(Error::InvalidName(name));
        }
        if location_layer.sensation_size() != sensory_layer.cell_count() {
            return Err(Error::Shape {
                what: "sensation",
                expected: location_layer.sensation_size(),
                actual: sensory_layer.cell_count(),
            });
        }
        if sensory_layer.location_size() != location_layer.cell_count() {
            return Err(Error::Shape {
                what: "location",
                expected: sensory_layer.location_size(),
                actual: location_layer.cell_count(),
            });
        }

        Ok(Self {
            name,
            location_layer,
            sensory_layer,
        })
    }

    /// Runs one move, recognize, correct and link step. Returns the corrected location
    /// and the sensation.
    pub fn sense(&mut self, movement: [f64; 2], feature: &str) -> Result<(Vec<bool>, Vec<bool>)> {
        let predicted = self.location_layer.move_by(movement);
        let (sensation, learning) = self.sensory_layer.sense(feature, &predicted)?;
        let location = self.location_layer.update_from_sensation(&sensation)?;

        self.location_layer.link_to_sensation(&learning, &location)?;
        self.sensory_layer.link_to_location(&location, &learning)?;

        log::trace!(
            "{}: {:?} at {:?}: {} location cells, {} sensory cells active",
            self.name,
            feature,
            movement,
            location.iter().filter(|&&a| a).count(),
            sensation.iter().filter(|&&a| a).count()
        );
        Ok((location, sensation))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location_layer(&self) -> &LocationLayer {
        &self.location_layer
    }

    pub fn sensory_layer(&self) -> &SensoryLayer {
        &self.sensory_layer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        config::{LocationConfig, SensationConfig},
        grid_module::GridCellModule,
    };

    fn config(name: &str) -> Config {
        Config::new(
            name,
            LocationConfig::new(3, 4).unwrap(),
            SensationConfig::new(20, 5).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn vectors_have_configured_lengths() {
        let mut sense = Sense::with_seed(&config("touch"), 41);
        let (location, sensation) = sense.sense([0.4, -1.0], "ridge").unwrap();
        assert_eq!(location.len(), 48);
        assert_eq!(sensation.len(), 100);
        assert_eq!(sense.name(), "touch");
    }

    #[test]
    fn same_seed_same_trajectory() {
        let mut first = Sense::with_seed(&config("touch"), 42);
        let mut second = Sense::with_seed(&config("touch"), 42);

        for step in 0..10 {
            let movement = [step as f64 * 0.3, 1.0];
            let feature = if step % 2 == 0 { "ridge" } else { "hole" };
            assert_eq!(
                first.sense(movement, feature).unwrap(),
                second.sense(movement, feature).unwrap()
            );
        }
    }

    #[test]
    fn from_layers_checks_names_and_sizes() {
        let touch = config("touch");
        let mut rng = StdRng::seed_from_u64(43);
        let module = GridCellModule::new(&touch, &mut rng);
        let location = LocationLayer::from_modules(vec![module.clone(), module.clone(), module])
            .unwrap();
        let sensory = SensoryLayer::new(&touch, StdRng::seed_from_u64(44));

        assert!(Sense::from_layers("touch", location.clone(), sensory.clone()).is_ok());
        assert_eq!(
            Sense::from_layers("Touch", location.clone(), sensory.clone()).unwrap_err(),
            Error::InvalidName("Touch".to_owned())
        );

        let other = Config::new(
            "touch",
            LocationConfig::new(3, 4).unwrap(),
            SensationConfig::new(21, 5).unwrap(),
        )
        .unwrap();
        let mismatched = SensoryLayer::new(&other, StdRng::seed_from_u64(45));
        assert!(matches!(
            Sense::from_layers("touch", location, mismatched),
            Err(Error::Shape { .. })
        ));
    }
}
