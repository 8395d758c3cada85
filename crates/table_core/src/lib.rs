//! Card table state shared by the client.
//!
//! This crate owns everything that can be reasoned about without a renderer:
//! - [`TableStore`]: per-table card placement and selection, mutated only via commands
//! - [`GridLayout`]: the single cell <-> table-local position mapping
//! - [`CameraRig`]: exponentially smoothed camera pose with presets
//! - [`TableLayout`]: where the tables and seat cameras sit in the room
//! - selection themes, context menu state and the settings sections
//!
//! All state types are Bevy resources, but nothing here schedules systems.

pub mod camera;
pub mod card;
pub mod context_menu;
pub mod error;
pub mod grid;
pub mod hover;
pub mod layout;
pub mod settings;
pub mod store;
pub mod table;
pub mod theme;

pub use camera::{CameraPose, CameraPreset, CameraRig};
pub use card::{Card, CardId, NewCard};
pub use context_menu::{ContextAction, ContextMenu, MenuItem, MenuItemKind, MenuTarget};
pub use error::TableError;
pub use grid::{Cell, GridLayout, GridLine};
pub use hover::HoveredCells;
pub use layout::{Seat, TableLayout};
pub use settings::{
    CameraSettings, SelectionSettings, Settings, SettingsError, SettingsFile, TableSettings,
};
pub use store::{TableCommand, TableEvent, TableStore};
pub use table::Table;
pub use theme::{SelectionPalette, SelectionTheme};

pub const LOG_TABLE: &str = "table";
pub const LOG_CAMERA: &str = "table/camera";
pub const LOG_INPUT: &str = "table/input";
