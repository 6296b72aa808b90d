pub mod brain;
pub mod column;
pub mod config;
pub mod dendrite;
pub mod grid_module;
pub mod location;
pub mod sensation;
pub mod sense;
