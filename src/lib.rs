//! Grid cell modules coupled to sensory mini-columns.
//!
//! A [`Sense`] pairs a [`LocationLayer`] of grid cell modules, which track position by
//! path integration, with a [`SensoryLayer`] of mini-columns, which recognize features
//! conditioned on that position. Each step predicts the location from movement,
//! recognizes the feature there, corrects the location from what was recognized and
//! binds the two representations with one-shot dendritic links.

pub mod core;
pub mod error;

pub use crate::core::{
    brain::Brain,
    column::{MiniColumn, SensoryCell},
    config::{Config, LocationConfig, SensationConfig},
    dendrite::Dendrite,
    grid_module::{GridCell, GridCellModule, Phase, RhombusTransform},
    location::LocationLayer,
    sensation::SensoryLayer,
    sense::Sense,
};
pub use error::{Error, Result};
