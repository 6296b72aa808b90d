//! Configuration for a sense: how many grid cell modules and how large they are on the
//! location side, how many mini-columns and cells on the sensory side.
//!
//! The stored parameters never change after construction. Every derived quantity
//! (cell counts, dendrite thresholds, receptive field widths) is a pure function of them,
//! so the same config always yields layers with identical shapes.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Dendrite threshold of grid cells, counted in active sensory cells.
const GRID_CELL_DENDRITE_THRESHOLD: usize = 8;

/// Bump size of a 6x6 module. Other side lengths scale it inversely.
const REFERENCE_BUMP_SIZE: f64 = 0.18172;

/// Fraction of modules that must agree before a sensory dendrite recognizes a location.
const SENSORY_DENDRITE_MODULE_FRACTION: f64 = 0.8;

/// Rust keywords, strict and reserved. A sense name has to be usable as an identifier.
const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue",
    "crate", "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen",
    "if", "impl", "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override",
    "priv", "pub", "ref", "return", "self", "static", "struct", "super", "trait", "true",
    "try", "type", "typeof", "unsafe", "unsized", "use", "virtual", "where", "while",
    "yield",
];

/// Shape of the location layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLocationConfig")]
pub struct LocationConfig {
    /// Number of independent grid cell modules.
    modules: usize,
    /// Cells per row (and per column) of a module.
    module_side_length: usize,
}

/// Unchecked mirror of the serialized fields. Deserialization goes through `TryFrom`.
#[derive(Deserialize)]
struct RawLocationConfig {
    modules: usize,
    module_side_length: usize,
}

impl TryFrom<RawLocationConfig> for LocationConfig {
    type Error = Error;

    fn try_from(raw: RawLocationConfig) -> Result<Self> {
        Self::new(raw.modules, raw.module_side_length)
    }
}

impl LocationConfig {
    /// Validates that both sizes are positive.
    pub fn new(modules: usize, module_side_length: usize) -> Result<Self> {
        positive("modules", modules)?;
        positive("module_side_length", module_side_length)?;
        Ok(Self {
            modules,
            module_side_length,
        })
    }

    #[inline]
    pub fn modules(&self) -> usize {
        self.modules
    }

    #[inline]
    pub fn module_side_length(&self) -> usize {
        self.module_side_length
    }

    /// Cells in a single module.
    #[inline]
    pub fn cells_per_module(&self) -> usize {
        self.module_side_length * self.module_side_length
    }

    /// Length of the flattened location vector.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells_per_module() * self.modules
    }

    #[inline]
    pub fn cell_readout_resolution(&self) -> f64 {
        2.0 / self.module_side_length as f64
    }

    #[inline]
    pub fn bump_size(&self) -> f64 {
        REFERENCE_BUMP_SIZE / (self.module_side_length as f64 / 6.0)
    }

    #[inline]
    pub fn dendrite_threshold(&self) -> usize {
        GRID_CELL_DENDRITE_THRESHOLD
    }
}

/// Shape of the sensory layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSensationConfig")]
pub struct SensationConfig {
    columns: usize,
    cells_per_column: usize,
}

#[derive(Deserialize)]
struct RawSensationConfig {
    columns: usize,
    cells_per_column: usize,
}

impl TryFrom<RawSensationConfig> for SensationConfig {
    type Error = Error;

    fn try_from(raw: RawSensationConfig) -> Result<Self> {
        Self::new(raw.columns, raw.cells_per_column)
    }
}

impl SensationConfig {
    /// Validates that both sizes are positive.
    pub fn new(columns: usize, cells_per_column: usize) -> Result<Self> {
        positive("columns", columns)?;
        positive("cells_per_column", cells_per_column)?;
        Ok(Self {
            columns,
            cells_per_column,
        })
    }

    #[inline]
    pub fn columns(&self) -> usize {
        self.columns
    }

    #[inline]
    pub fn cells_per_column(&self) -> usize {
        self.cells_per_column
    }

    /// Length of the flattened sensation vector.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells_per_column * self.columns
    }

    /// Number of columns a newly seen feature is spread over.
    #[inline]
    pub fn columns_per_feature(&self) -> usize {
        (3 * self.columns).div_ceil(50)
    }
}

/// Complete, validated configuration of one sense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawConfig")]
pub struct Config {
    name: String,
    location: LocationConfig,
    sensation: SensationConfig,
}

#[derive(Deserialize)]
struct RawConfig {
    name: String,
    location: LocationConfig,
    sensation: SensationConfig,
}

impl TryFrom<RawConfig> for Config {
    type Error = Error;

    fn try_from(raw: RawConfig) -> Result<Self> {
        Self::new(raw.name, raw.location, raw.sensation)
    }
}

impl Config {
    /// Builds a config after checking that `name` is a lowercase, non-keyword identifier
    /// and that every size is positive.
    pub fn new(
        name: impl Into<String>,
        location: LocationConfig,
        sensation: SensationConfig,
    ) -> Result<Self> {
        let name = name.into();
        if !is_valid_name(&name) {
            return Err(Error::InvalidName(name));
        }
        positive("modules", location.modules)?;
        positive("module_side_length", location.module_side_length)?;
        positive("columns", sensation.columns)?;
        positive("cells_per_column", sensation.cells_per_column)?;
        Ok(Self {
            name,
            location,
            sensation,
        })
    }

    /// The visual sense: 12 modules of 6x6 grid cells, 16 columns of 7 cells.
    pub fn view() -> Self {
        Self {
            name: "view".to_owned(),
            location: LocationConfig {
                modules: 12,
                module_side_length: 6,
            },
            sensation: SensationConfig {
                columns: 16,
                cells_per_column: 7,
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn location(&self) -> &LocationConfig {
        &self.location
    }

    #[inline]
    pub fn sensation(&self) -> &SensationConfig {
        &self.sensation
    }

    /// Threshold of the dendrites sensory cells grow onto the location vector.
    #[inline]
    pub fn sensory_dendrite_threshold(&self) -> usize {
        (self.location.modules as f64 * SENSORY_DENDRITE_MODULE_FRACTION).ceil() as usize
    }
}

fn positive(name: &'static str, value: usize) -> Result<()> {
    if value == 0 {
        Err(Error::InvalidParameter { name, value })
    } else {
        Ok(())
    }
}

/// An ASCII identifier, lowercase with at least one letter, that is not a keyword.
pub(crate) fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_well = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');
    starts_well
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && name.chars().any(|c| c.is_ascii_lowercase())
        && !name.chars().any(|c| c.is_ascii_uppercase())
        && !KEYWORDS.contains(&name)
}
