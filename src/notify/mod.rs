//! Notify domain: turns domain events into player-facing text.
//!
//! Runs last in the frame so it sees everything the earlier phases sent.

use bevy::prelude::*;
use std::collections::VecDeque;

use crate::catalog::PlantCatalog;
use crate::world::ZoneRegistry;
use crate::shared::*;

/// The most recent notifications, oldest first.
#[derive(Resource, Debug, Clone)]
pub struct NotificationLog {
    messages: VecDeque<String>,
    capacity: usize,
}

impl Default for NotificationLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_NOTIFICATION_HISTORY)
    }
}

impl NotificationLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            messages: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.trim();
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.messages.push_back(message.into());
        self.trim();
    }

    fn trim(&mut self) {
        while self.messages.len() > self.capacity {
            self.messages.pop_front();
        }
    }

    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.messages.iter().map(String::as_str)
    }

    pub fn latest(&self) -> Option<&str> {
        self.messages.back().map(String::as_str)
    }

    pub fn contains(&self, message: &str) -> bool {
        self.messages.iter().any(|m| m == message)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

pub struct NotifyPlugin;

impl Plugin for NotifyPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<NotificationLog>().add_systems(
            Update,
            (announce_milestones, announce_exp_progress, record_notifications)
                .chain()
                .in_set(CoreSet::Notify)
                .run_if(in_state(GameState::Playing)),
        );
    }
}

pub fn announce_milestones(
    mut successes: EventReader<CultivationSuccessEvent>,
    mut level_ups: EventReader<LevelUpEvent>,
    mut discoveries: EventReader<EntryUnlockedEvent>,
    mut zones_unlocked: EventReader<ZoneUnlockedEvent>,
    plants: Res<PlantCatalog>,
    zones: Res<ZoneRegistry>,
    mut notifications: EventWriter<NotificationEvent>,
) {
    for ev in successes.read() {
        notifications.send(NotificationEvent {
            message: format!("Cultivation successful! +{} EXP", ev.exp),
        });
    }
    for ev in level_ups.read() {
        notifications.send(NotificationEvent {
            message: format!("Level Up! You are now level {}", ev.level),
        });
    }
    for ev in discoveries.read() {
        if let Some(plant) = plants.get(&ev.plant_id) {
            notifications.send(NotificationEvent {
                message: format!("New plant discovered: {}!", plant.name),
            });
        }
    }
    for ev in zones_unlocked.read() {
        if let Some(zone) = zones.get(&ev.zone_id) {
            notifications.send(NotificationEvent {
                message: format!("New area unlocked: {}!", zone.name),
            });
        }
    }
}

pub fn announce_exp_progress(
    mut exp_changes: EventReader<ExpChangedEvent>,
    mut progress: EventWriter<ProgressNotificationEvent>,
) {
    for ev in exp_changes.read() {
        let fraction = if ev.required == 0 {
            1.0
        } else {
            (ev.exp as f32 / ev.required as f32).min(1.0)
        };
        progress.send(ProgressNotificationEvent {
            message: format!("EXP {}/{}", ev.exp, ev.required),
            progress: fraction,
        });
    }
}

pub fn record_notifications(
    mut notifications: EventReader<NotificationEvent>,
    mut progress: EventReader<ProgressNotificationEvent>,
    mut log: ResMut<NotificationLog>,
) {
    for ev in notifications.read() {
        info!("[Notify] {}", ev.message);
        log.push(ev.message.clone());
    }
    for ev in progress.read() {
        debug!("[Notify] {} ({:.0}%)", ev.message, ev.progress * 100.0);
    }
}
