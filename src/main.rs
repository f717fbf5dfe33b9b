use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;

use verdant_log::calendar::DayClock;
use verdant_log::catalog::{ItemCatalog, PlantCatalog};
use verdant_log::cultivation::{Garden, RecipeBook};
use verdant_log::data::GameConfig;
use verdant_log::encyclopedia::Encyclopedia;
use verdant_log::inventory::Inventory;
use verdant_log::progression::{PlayerProgress, ProgressionCurve};
use verdant_log::shared::*;
use verdant_log::world::{CurrentZone, ZoneRegistry, ZoneUnlocks};
use verdant_log::{
    calendar, cultivation, data, encyclopedia, inventory, notify, progression, save, world,
};

fn main() {
    let mut app = App::new();
    app.add_plugins(
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
            1.0 / 60.0,
        ))),
    )
    .add_plugins(LogPlugin::default())
    .add_plugins(StatesPlugin)
    // Game state
    .init_state::<GameState>();
    configure_core_sets(&mut app);

    app
        // Shared resources
        .init_resource::<GameConfig>()
        .init_resource::<ItemCatalog>()
        .init_resource::<PlantCatalog>()
        .init_resource::<RecipeBook>()
        .init_resource::<ZoneRegistry>()
        .init_resource::<Inventory>()
        .init_resource::<ProgressionCurve>()
        .init_resource::<PlayerProgress>()
        .init_resource::<DayClock>()
        .init_resource::<Garden>()
        .init_resource::<ZoneUnlocks>()
        .init_resource::<CurrentZone>()
        .init_resource::<Encyclopedia>()
        // Notification bus
        .add_event::<InventoryChangedEvent>()
        .add_event::<LevelUpEvent>()
        .add_event::<ExpChangedEvent>()
        .add_event::<ZoneUnlockedEvent>()
        .add_event::<ZoneEnteredEvent>()
        .add_event::<EntryUnlockedEvent>()
        .add_event::<EncyclopediaChangedEvent>()
        .add_event::<CultivationSuccessEvent>()
        .add_event::<CultivationFailedEvent>()
        .add_event::<PlantHarvestedEvent>()
        .add_event::<TimeOfDayChangedEvent>()
        .add_event::<NotificationEvent>()
        .add_event::<ProgressNotificationEvent>()
        // Intents
        .add_event::<AddItemEvent>()
        .add_event::<RemoveItemEvent>()
        .add_event::<ClearInventoryEvent>()
        .add_event::<AwardExpEvent>()
        .add_event::<SetLevelEvent>()
        .add_event::<EnterZoneEvent>()
        // Domain plugins
        .add_plugins(calendar::CalendarPlugin)
        .add_plugins(inventory::InventoryPlugin)
        .add_plugins(progression::ProgressionPlugin)
        .add_plugins(cultivation::CultivationPlugin)
        .add_plugins(world::WorldPlugin)
        .add_plugins(encyclopedia::EncyclopediaPlugin)
        .add_plugins(notify::NotifyPlugin)
        .add_plugins(save::SavePlugin)
        // Data loading
        .add_plugins(data::DataPlugin)
        .run();
}
