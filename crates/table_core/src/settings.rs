//! Typed settings sections stored in a single RON file.
//!
//! Every section is one struct implementing [`Settings`]. Defaults live in the
//! `Default` impls; the file only needs to name the sections (and fields) that
//! deviate from them:
//!
//! ```ron
//! {
//!     "table": (table_count: 5),
//!     "selection": (theme: "ice"),
//! }
//! ```

use crate::camera::CameraPreset;
use crate::grid::{CARD_HEIGHT, CARD_WIDTH, CELL_MARGIN, GRID_COLS, GRID_ROWS, GridLayout};
use crate::theme::SelectionTheme;
use bevy::prelude::*;
use ron::Value as RonValue;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ron error: {0}")]
    Ron(#[from] ron::Error),

    #[error("parse error in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },

    #[error("section `{section}` is invalid: {source}")]
    Section {
        section: &'static str,
        #[source]
        source: ron::Error,
    },
}

/// A strongly typed settings section.
pub trait Settings: Default + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Key of the section inside the settings file.
    const SECTION: &'static str;
}

#[derive(Resource, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSettings {
    pub table_count: usize,
    pub grid_cols: u32,
    pub grid_rows: u32,
    pub card_width: f32,
    pub card_height: f32,
    pub cell_margin: f32,
    /// Distance of each table from the room centre.
    pub table_radius: f32,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            table_count: 5,
            grid_cols: GRID_COLS,
            grid_rows: GRID_ROWS,
            card_width: CARD_WIDTH,
            card_height: CARD_HEIGHT,
            cell_margin: CELL_MARGIN,
            table_radius: 10.0,
        }
    }
}

impl Settings for TableSettings {
    const SECTION: &'static str = "table";
}

impl TableSettings {
    pub fn grid(&self) -> GridLayout {
        GridLayout::from_card(
            self.grid_cols,
            self.grid_rows,
            self.card_width,
            self.card_height,
            self.cell_margin,
        )
    }
}

#[derive(Resource, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Fraction of the remaining distance closed per frame.
    pub smoothing: f32,
    pub camera_radius: f32,
    pub camera_height: f32,
    pub arrival_epsilon: f32,
    /// Height above a card when zooming to it.
    pub zoom_height: f32,
    pub zoom_fov: f32,
    #[serde(with = "by_name")]
    pub initial_preset: CameraPreset,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            smoothing: 0.08,
            camera_radius: 13.0,
            camera_height: 8.0,
            arrival_epsilon: 1e-3,
            zoom_height: 3.0,
            zoom_fov: 40.0,
            initial_preset: CameraPreset::LookAtTable,
        }
    }
}

impl Settings for CameraSettings {
    const SECTION: &'static str = "camera";
}

#[derive(Resource, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionSettings {
    #[serde(with = "by_name")]
    pub theme: SelectionTheme,
}

impl Settings for SelectionSettings {
    const SECTION: &'static str = "selection";
}

/// Serializes enums through their `Display` / `FromStr` names.
mod by_name {
    use serde::{Deserialize, Deserializer, Serializer, de};
    use std::fmt::Display;
    use std::str::FromStr;

    pub fn serialize<T: Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(de::Error::custom)
    }
}

/// The settings file: section name to raw section value.
#[derive(Debug, Clone, Default)]
pub struct SettingsFile {
    path: PathBuf,
    sections: BTreeMap<String, RonValue>,
}

impl SettingsFile {
    /// Reads `path`. A missing or empty file yields an empty set of sections.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
        let path = path.into();
        let sections = if path.exists() {
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                ron::from_str(&content).map_err(|source| SettingsError::Parse {
                    path: path.clone(),
                    source,
                })?
            }
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, sections })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains<T: Settings>(&self) -> bool {
        self.sections.contains_key(T::SECTION)
    }

    /// The section's value, or its defaults when the file does not name it.
    pub fn section<T: Settings>(&self) -> Result<T, SettingsError> {
        match self.sections.get(T::SECTION) {
            Some(value) => value
                .clone()
                .into_rust()
                .map_err(|source| SettingsError::Section {
                    section: T::SECTION,
                    source,
                }),
            None => Ok(T::default()),
        }
    }

    pub fn insert<T: Settings>(&mut self, section: &T) -> Result<(), SettingsError> {
        let text = ron::to_string(section)?;
        let value: RonValue = ron::from_str(&text).map_err(|source| SettingsError::Section {
            section: T::SECTION,
            source: source.code,
        })?;
        self.sections.insert(T::SECTION.to_string(), value);
        Ok(())
    }

    /// Writes all sections back, creating the parent directory if needed.
    pub fn save(&self) -> Result<(), SettingsError> {
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir)?;
        }
        let text = ron::ser::to_string_pretty(&self.sections, ron::ser::PrettyConfig::default())?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}
