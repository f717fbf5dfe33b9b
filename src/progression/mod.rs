//! Progression domain: EXP curve, player level, level-up cascade.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::shared::*;

// ═══════════════════════════════════════════════════════════════════════
// CURVE
// ═══════════════════════════════════════════════════════════════════════

/// EXP needed to advance from each level, index = level - 1. Levels past
/// the end of the table keep requiring the last value (endgame plateau).
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionCurve {
    pub exp_to_next_level: Vec<u32>,
    pub starting_level: u32,
    pub starting_exp: u32,
}

impl Default for ProgressionCurve {
    fn default() -> Self {
        Self {
            exp_to_next_level: DEFAULT_EXP_CURVE.to_vec(),
            starting_level: STARTING_LEVEL,
            starting_exp: STARTING_EXP,
        }
    }
}

impl ProgressionCurve {
    pub fn new(exp_to_next_level: Vec<u32>) -> Self {
        Self {
            exp_to_next_level,
            ..Default::default()
        }
    }

    pub fn exp_required_for_level(&self, level: u32) -> u32 {
        if level == 0 {
            return 0;
        }
        let index = (level - 1) as usize;
        match self.exp_to_next_level.get(index) {
            Some(&exp) => exp,
            None => self.exp_to_next_level.last().copied().unwrap_or(0),
        }
    }

    /// Cumulative EXP from level 1 to reach `target_level`.
    pub fn total_exp_for_level(&self, target_level: u32) -> u64 {
        (1..target_level.max(1))
            .map(|level| self.exp_required_for_level(level) as u64)
            .sum()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// PLAYER PROGRESS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Resource, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProgress {
    pub level: u32,
    pub exp: u32,
}

impl Default for PlayerProgress {
    fn default() -> Self {
        Self {
            level: STARTING_LEVEL,
            exp: STARTING_EXP,
        }
    }
}

/// What one `award_exp` call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpAward {
    /// Every level reached, ascending.
    pub levels: Vec<u32>,
    pub exp: u32,
    pub required: u32,
}

impl PlayerProgress {
    pub fn from_curve(curve: &ProgressionCurve) -> Self {
        Self {
            level: curve.starting_level.max(1),
            exp: curve.starting_exp,
        }
    }

    pub fn required_for_next(&self, curve: &ProgressionCurve) -> u32 {
        curve.exp_required_for_level(self.level)
    }

    /// Adds EXP and applies as many level-ups as it pays for.
    /// Zero is a no-op and returns `None`.
    pub fn award_exp(&mut self, curve: &ProgressionCurve, amount: u32) -> Option<ExpAward> {
        if amount == 0 {
            return None;
        }
        self.exp = self.exp.saturating_add(amount);

        let mut levels = Vec::new();
        let mut required = self.required_for_next(curve);
        while required > 0 && self.exp >= required {
            self.exp -= required;
            self.level += 1;
            levels.push(self.level);
            required = self.required_for_next(curve);
        }

        Some(ExpAward {
            levels,
            exp: self.exp,
            required,
        })
    }

    /// Fraction toward the next level, 1.0 when the curve requires nothing.
    pub fn exp_progress(&self, curve: &ProgressionCurve) -> f32 {
        let required = self.required_for_next(curve);
        if required == 0 {
            return 1.0;
        }
        self.exp as f32 / required as f32
    }

    /// Direct overwrite, bypassing the earning path. Levels below 1 are
    /// ignored. Returns true when the level went up.
    pub fn set_level(&mut self, level: u32, exp: u32) -> bool {
        if level < 1 {
            return false;
        }
        let rose = level > self.level;
        self.level = level;
        self.exp = exp;
        rose
    }

    pub fn reset(&mut self, curve: &ProgressionCurve) {
        *self = Self::from_curve(curve);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN
// ═══════════════════════════════════════════════════════════════════════

pub struct ProgressionPlugin;

impl Plugin for ProgressionPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (apply_set_level, apply_exp_awards)
                .chain()
                .in_set(CoreSet::Rewards)
                .run_if(in_state(GameState::Playing)),
        );
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

/// Applies explicit `AwardExpEvent`s and the EXP carried by every
/// `CultivationSuccessEvent`, in that order.
pub fn apply_exp_awards(
    mut awards: EventReader<AwardExpEvent>,
    mut successes: EventReader<CultivationSuccessEvent>,
    curve: Res<ProgressionCurve>,
    mut progress: ResMut<PlayerProgress>,
    mut level_ups: EventWriter<LevelUpEvent>,
    mut exp_changed: EventWriter<ExpChangedEvent>,
) {
    let amounts: Vec<u32> = awards
        .read()
        .map(|ev| ev.amount)
        .chain(successes.read().map(|ev| ev.exp))
        .collect();

    for amount in amounts {
        let Some(award) = progress.award_exp(&curve, amount) else {
            continue;
        };
        info!("[Progression] Gained {} EXP. Total: {}", amount, award.exp);
        for level in &award.levels {
            info!("[Progression] Level Up! Now level {}", level);
            level_ups.send(LevelUpEvent { level: *level });
        }
        exp_changed.send(ExpChangedEvent {
            exp: award.exp,
            required: award.required,
        });
    }
}

/// Debug/new-game overwrite of level and EXP.
pub fn apply_set_level(
    mut events: EventReader<SetLevelEvent>,
    curve: Res<ProgressionCurve>,
    mut progress: ResMut<PlayerProgress>,
    mut level_ups: EventWriter<LevelUpEvent>,
    mut exp_changed: EventWriter<ExpChangedEvent>,
) {
    for ev in events.read() {
        if ev.level < 1 {
            warn!("[Progression] Ignoring set_level({})", ev.level);
            continue;
        }
        if progress.set_level(ev.level, ev.exp) {
            level_ups.send(LevelUpEvent { level: progress.level });
        }
        exp_changed.send(ExpChangedEvent {
            exp: progress.exp,
            required: progress.required_for_next(&curve),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_exp_clamps_and_plateaus() {
        let curve = ProgressionCurve::new(vec![100, 150, 200]);
        assert_eq!(curve.exp_required_for_level(0), 0);
        assert_eq!(curve.exp_required_for_level(1), 100);
        assert_eq!(curve.exp_required_for_level(3), 200);
        assert_eq!(curve.exp_required_for_level(4), 200);
        assert_eq!(curve.exp_required_for_level(50), 200);
    }

    #[test]
    fn test_empty_curve_never_levels() {
        let curve = ProgressionCurve::new(Vec::new());
        let mut progress = PlayerProgress::default();
        let award = progress.award_exp(&curve, 500).unwrap();
        assert!(award.levels.is_empty());
        assert_eq!(progress.level, 1);
        assert_eq!(progress.exp, 500);
        assert_eq!(progress.exp_progress(&curve), 1.0);
    }

    #[test]
    fn test_award_250_reaches_level_3_exactly() {
        let curve = ProgressionCurve::default();
        let mut progress = PlayerProgress::from_curve(&curve);
        let award = progress.award_exp(&curve, 250).unwrap();
        assert_eq!(award.levels, vec![2, 3]);
        assert_eq!(progress.level, 3);
        assert_eq!(progress.exp, 0);
        assert_eq!(award.required, 200);
    }

    #[test]
    fn test_zero_award_is_noop() {
        let curve = ProgressionCurve::default();
        let mut progress = PlayerProgress::default();
        assert!(progress.award_exp(&curve, 0).is_none());
        assert_eq!(progress, PlayerProgress::default());
    }

    #[test]
    fn test_cascade_leaves_exp_below_requirement() {
        let curve = ProgressionCurve::default();
        let mut progress = PlayerProgress::default();
        let award = progress.award_exp(&curve, 1_234).unwrap();
        // 100 + 150 + 200 + 300 = 750, next needs 500
        assert_eq!(award.levels, vec![2, 3, 4, 5]);
        assert_eq!(progress.exp, 484);
        assert!(progress.exp < progress.required_for_next(&curve));
    }

    #[test]
    fn test_total_exp_for_level() {
        let curve = ProgressionCurve::default();
        assert_eq!(curve.total_exp_for_level(1), 0);
        assert_eq!(curve.total_exp_for_level(3), 250);
        // 10 defined levels + 2 plateau levels at 3000
        assert_eq!(curve.total_exp_for_level(13), 9_500 + 6_000);
    }

    #[test]
    fn test_set_level_and_reset() {
        let curve = ProgressionCurve::default();
        let mut progress = PlayerProgress::default();
        assert!(!progress.set_level(0, 5));
        assert_eq!(progress.level, 1);
        assert!(progress.set_level(4, 10));
        assert_eq!((progress.level, progress.exp), (4, 10));
        assert!(!progress.set_level(2, 0));
        assert_eq!(progress.level, 2);
        progress.reset(&curve);
        assert_eq!(progress, PlayerProgress::from_curve(&curve));
    }
}
