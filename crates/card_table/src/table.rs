use bevy::prelude::*;
use table_core::{HoveredCells, LOG_TABLE, TableCommand, TableEvent, TableSettings, TableStore};

/// Frame ordering of everything that touches table state.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum TableSystems {
    /// Pointer and keyboard handling; writes commands.
    Input,
    /// The only place the store is mutated.
    Apply,
    /// Scene entities follow the store.
    Sync,
}

/// Owns [`TableStore`] and [`HoveredCells`] and applies [`TableCommand`]s.
pub struct TablePlugin;

impl Plugin for TablePlugin {
    fn build(&self, app: &mut App) {
        let settings = app
            .world()
            .get_resource::<TableSettings>()
            .cloned()
            .unwrap_or_default();

        app.insert_resource(TableStore::from_settings(&settings))
            .insert_resource(HoveredCells::new(settings.table_count))
            .insert_resource(settings)
            .add_message::<TableCommand>()
            .add_message::<TableEvent>()
            .configure_sets(
                Update,
                (TableSystems::Input, TableSystems::Apply, TableSystems::Sync).chain(),
            )
            .add_systems(
                Update,
                (apply_table_commands, clear_hover_on_events)
                    .chain()
                    .in_set(TableSystems::Apply),
            );
    }
}

pub(crate) fn apply_table_commands(
    mut commands: MessageReader<TableCommand>,
    mut store: ResMut<TableStore>,
    mut events: MessageWriter<TableEvent>,
) {
    for command in commands.read() {
        // Abgelehnte Befehle ändern nichts, also auch keine Change-Detection auslösen.
        match store.bypass_change_detection().apply(command.clone()) {
            Ok(Some(event)) => {
                store.set_changed();
                events.write(event);
            }
            Ok(None) => {}
            Err(err) => warn!(target: LOG_TABLE, ?command, "table command rejected: {err}"),
        }
    }
}

fn clear_hover_on_events(mut events: MessageReader<TableEvent>, mut hover: ResMut<HoveredCells>) {
    for event in events.read() {
        if hover.bypass_change_detection().apply(event) {
            hover.set_changed();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use table_core::{CardId, Cell, NewCard};

    fn app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, TablePlugin));
        app
    }

    fn seed(table: usize) -> CardId {
        CardId::generated(table, 1)
    }

    #[test]
    fn test_table_plugin_builds() {
        let mut app = app();
        app.update();
        let store = app.world().resource::<TableStore>();
        assert_eq!(store.table_count(), 5);
        assert_eq!(app.world().resource::<HoveredCells>().iter().count(), 0);
    }

    #[test]
    fn test_settings_resource_sizes_the_store() {
        let mut app = App::new();
        app.insert_resource(TableSettings {
            table_count: 2,
            ..default()
        });
        app.add_plugins((MinimalPlugins, TablePlugin));
        app.update();
        assert_eq!(app.world().resource::<TableStore>().table_count(), 2);
    }

    #[test]
    fn test_commands_move_card_and_clear_hover() {
        let mut app = app();
        app.world_mut()
            .resource_mut::<HoveredCells>()
            .set(0, Some(Cell::new(1, 1)));

        app.world_mut().write_message(TableCommand::ClickCard {
            table: 0,
            card: seed(0),
        });
        app.world_mut().write_message(TableCommand::ClickCell {
            table: 0,
            cell: Cell::new(1, 1),
        });
        app.update();

        let store = app.world().resource::<TableStore>();
        assert_eq!(
            store.card_at(0, Cell::new(1, 1)).map(|card| card.id().clone()),
            Some(seed(0))
        );
        assert!(store.selected_card(0).is_none());
        assert_eq!(app.world().resource::<HoveredCells>().get(0), None);
    }

    #[test]
    fn test_rejected_command_keeps_state() {
        let mut app = app();
        app.update();
        app.world_mut().write_message(TableCommand::AddCard {
            table: 1,
            card: NewCard::new("a.jpg", 0, 0),
        });
        app.world_mut().write_message(TableCommand::SelectCard {
            table: 9,
            card: seed(0),
        });
        app.update();

        let store = app.world().resource::<TableStore>();
        assert_eq!(store.table(1).map(|table| table.len()), Some(1));
        assert!(store.tables().iter().all(|table| table.selected().is_none()));
    }
}
