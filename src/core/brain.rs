//! The `Brain` owns every sense by name.

use super::{config::Config, sense::Sense};
use crate::error::{Error, Result};
use fxhash::FxHashMap;

/// Name of the sense registered by `Brain::new`.
pub const VIEW: &str = "view";

/// A registry of senses keyed by their names.
#[derive(Debug, Default)]
pub struct Brain {
    senses: FxHashMap<String, Sense>,
}

impl Brain {
    /// A brain with the default `view` sense.
    pub fn new() -> Self {
        let mut brain = Self::default();
        brain
            .senses
            .insert(VIEW.to_owned(), Sense::new(&Config::view()));
        brain
    }

    /// Adds `sense` under its own name.
    pub fn register(&mut self, sense: Sense) -> Result<()> {
        if self.senses.contains_key(sense.name()) {
            return Err(Error::DuplicateSense(sense.name().to_owned()));
        }
        self.senses.insert(sense.name().to_owned(), sense);
        Ok(())
    }

    pub fn get_sense(&self, name: &str) -> Result<&Sense> {
        self.senses
            .get(name)
            .ok_or_else(|| Error::UnknownSense(name.to_owned()))
    }

    pub fn get_sense_mut(&mut self, name: &str) -> Result<&mut Sense> {
        self.senses
            .get_mut(name)
            .ok_or_else(|| Error::UnknownSense(name.to_owned()))
    }

    /// Runs one step of the sense called `name`.
    pub fn sense(
        &mut self,
        name: &str,
        movement: [f64; 2],
        feature: &str,
    ) -> Result<(Vec<bool>, Vec<bool>)> {
        self.get_sense_mut(name)?.sense(movement, feature)
    }

    /// Runs one step of the `view` sense.
    pub fn view(&mut self, movement: [f64; 2], feature: &str) -> Result<(Vec<bool>, Vec<bool>)> {
        self.sense(VIEW, movement, feature)
    }

    /// Names of all registered senses, in no particular order.
    pub fn sense_names(&self) -> impl Iterator<Item = &str> {
        self.senses.keys().map(String::as_str)
    }
}
