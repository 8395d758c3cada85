mod camera;
mod context_menu;
mod input;
mod scene;
mod table;

use crate::camera::CameraRigPlugin;
use crate::context_menu::ContextMenuPlugin;
use crate::input::InputPlugin;
use crate::scene::ScenePlugin;
use crate::table::TablePlugin;

use app::{AppBuilder, Application, BoxError};
use bevy::{log::LogPlugin, prelude::*};
use std::path::Path;
use table_core::{
    CameraSettings, SelectionSettings, Settings, SettingsError, SettingsFile, TableLayout,
    TableSettings,
};

pub const LOG_MAIN: &str = "main";

struct CardTable;

impl Application for CardTable {
    const APP_ID: &'static str = "card_table";
}

/// All settings sections the client reads.
#[derive(Debug, Clone, Default, PartialEq)]
struct LoadedSettings {
    table: TableSettings,
    camera: CameraSettings,
    selection: SelectionSettings,
}

/// Reads the settings file; writes one with all defaults if none exists yet.
fn load_settings(path: &Path) -> Result<LoadedSettings, SettingsError> {
    let mut file = SettingsFile::load(path)?;
    let settings = LoadedSettings {
        table: file.section()?,
        camera: file.section()?,
        selection: file.section()?,
    };
    if !path.exists() {
        file.insert(&settings.table)?;
        file.insert(&settings.camera)?;
        file.insert(&settings.selection)?;
        file.save()?;
        info!(target: LOG_MAIN, path = %path.display(), "wrote default settings");
    }
    Ok(settings)
}

/// Client plugins plus the settings resources they start from.
struct CardTablePlugin {
    settings: LoadedSettings,
}

impl CardTablePlugin {
    /// Settings must be in place before the plugins that read them at build time.
    fn insert_settings(&self, app: &mut App) {
        let LoadedSettings {
            table,
            camera,
            selection,
        } = self.settings.clone();
        app.insert_resource(TableLayout::from_settings(&table, &camera))
            .insert_resource(table)
            .insert_resource(camera)
            .insert_resource(selection);
    }
}

impl Plugin for CardTablePlugin {
    fn build(&self, app: &mut App) {
        self.insert_settings(app);
        app.add_plugins((
            TablePlugin,
            CameraRigPlugin,
            ContextMenuPlugin,
            InputPlugin,
            ScenePlugin,
        ));
    }
}

fn main() -> Result<(), BoxError> {
    let mut app = AppBuilder::<CardTable>::new(env!("CARGO_PKG_VERSION"))?.build_with_bevy(
        |mut app, ctx| {
            let path = ctx.settings_file();
            let settings = load_settings(&path).unwrap_or_else(|err| {
                warn!(target: LOG_MAIN, path = %path.display(), "using default settings: {err}");
                LoadedSettings::default()
            });
            info!(
                target: LOG_MAIN,
                version = ctx.version(),
                log_file = %ctx.log_file().display(),
                tables = settings.table.table_count,
                theme = %settings.selection.theme,
                "starting card table"
            );

            app.add_plugins(
                DefaultPlugins
                    .build()
                    .disable::<LogPlugin>()
                    .set(WindowPlugin {
                        primary_window: Some(Window {
                            title: "Card Table".to_string(),
                            ..default()
                        }),
                        ..default()
                    }),
            )
            .insert_resource(ClearColor(Color::srgb_u8(0x22, 0x22, 0x22)))
            .add_plugins(CardTablePlugin { settings });
            app
        },
    );

    exit_result(app.run())
}

/// Maps Bevy's exit status onto the process result.
fn exit_result(exit: AppExit) -> Result<(), BoxError> {
    match exit {
        AppExit::Success => Ok(()),
        AppExit::Error(code) => Err(format!("card table exited with code {code}").into()),
    }
}
