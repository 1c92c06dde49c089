//! Player-related components.

use bevy::prelude::*;

use crate::core::{NeedConfig, NeedsConfig};
use crate::items::{ConsumableEffect, NeedKind};

/// Marker component for the player entity.
#[derive(Component)]
pub struct Player;

/// One survival meter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Meter {
    pub current: f32,
    pub max: f32,
}

impl Meter {
    pub fn new(current: f32, max: f32) -> Self {
        Self {
            current: current.clamp(0.0, max),
            max,
        }
    }

    /// Fraction of the maximum, for bars.
    pub fn fraction(&self) -> f32 {
        if self.max <= 0.0 {
            0.0
        } else {
            self.current / self.max
        }
    }

    pub fn is_empty(&self) -> bool {
        self.current <= 0.0
    }

    pub fn change(&mut self, amount: f32) {
        self.current = (self.current + amount).clamp(0.0, self.max);
    }
}

impl From<&NeedConfig> for Meter {
    fn from(config: &NeedConfig) -> Self {
        Self::new(config.start, config.max)
    }
}

/// Health, hunger and thirst.
#[derive(Component, Clone, Debug)]
pub struct Needs {
    pub health: Meter,
    pub hunger: Meter,
    pub thirst: Meter,
}

impl Needs {
    pub fn from_config(config: &NeedsConfig) -> Self {
        Self {
            health: Meter::from(&config.health),
            hunger: Meter::from(&config.hunger),
            thirst: Meter::from(&config.thirst),
        }
    }

    pub fn meter_mut(&mut self, need: NeedKind) -> &mut Meter {
        match need {
            NeedKind::Health => &mut self.health,
            NeedKind::Hunger => &mut self.hunger,
            NeedKind::Thirst => &mut self.thirst,
        }
    }

    pub fn apply(&mut self, effects: &[ConsumableEffect]) {
        for effect in effects {
            self.meter_mut(effect.need).change(effect.amount);
        }
    }

    /// Advance decay by `dt` seconds. An empty hunger or thirst meter drains health.
    pub fn decay(&mut self, config: &NeedsConfig, dt: f32) {
        self.hunger.change(-config.hunger.decay_rate * dt);
        self.thirst.change(-config.thirst.decay_rate * dt);

        let mut damage = config.health.decay_rate;
        if self.hunger.is_empty() {
            damage += config.starving_health_decay;
        }
        if self.thirst.is_empty() {
            damage += config.dehydrated_health_decay;
        }
        self.health.change(-damage * dt);
    }

    pub fn is_dead(&self) -> bool {
        self.health.is_empty()
    }

    /// Take a direct hit. Returns true when this hit emptied health.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        let was_alive = !self.is_dead();
        self.health.change(-amount);
        was_alive && self.is_dead()
    }
}

/// Time until the held tool can swing again.
#[derive(Component, Default)]
pub struct ToolSwing {
    pub cooldown: f32,
}

impl ToolSwing {
    pub fn can_swing(&self) -> bool {
        self.cooldown <= 0.0
    }

    pub fn tick(&mut self, dt: f32) {
        self.cooldown = (self.cooldown - dt).max(0.0);
    }

    /// Start a swing if ready, blocking the next one for `cooldown` seconds.
    pub fn try_swing(&mut self, cooldown: f32) -> bool {
        if !self.can_swing() {
            return false;
        }
        self.cooldown = cooldown;
        true
    }
}

/// Tracks player movement state for physics.
#[derive(Component)]
pub struct MovementState {
    pub is_grounded: bool,
    pub vertical_velocity: f32,
}

impl Default for MovementState {
    fn default() -> Self {
        Self {
            is_grounded: true,
            vertical_velocity: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consumables_are_clamped_to_max() {
        let mut needs = Needs::from_config(&NeedsConfig::default());
        needs.hunger.current = 95.0;

        needs.apply(&[ConsumableEffect {
            need: NeedKind::Hunger,
            amount: 10.0,
        }]);
        assert_eq!(needs.hunger.current, 100.0);
    }

    #[test]
    fn empty_hunger_drains_health() {
        let config = NeedsConfig::default();
        let mut needs = Needs::from_config(&config);
        needs.hunger.current = 0.0;

        needs.decay(&config, 2.0);
        assert_eq!(needs.health.current, 100.0 - config.starving_health_decay * 2.0);
        assert_eq!(needs.thirst.current, 100.0 - config.thirst.decay_rate * 2.0);
    }

    #[test]
    fn full_needs_keep_health() {
        let config = NeedsConfig::default();
        let mut needs = Needs::from_config(&config);
        needs.decay(&config, 1.0);
        assert_eq!(needs.health.current, 100.0);
        assert!(!needs.is_dead());
    }

    #[test]
    fn only_the_killing_blow_reports_death() {
        let mut needs = Needs::from_config(&NeedsConfig::default());
        assert!(!needs.take_damage(60.0));
        assert!(needs.take_damage(60.0));
        assert_eq!(needs.health.current, 0.0);
        assert!(!needs.take_damage(10.0));
    }

    #[test]
    fn swings_wait_for_the_cooldown() {
        let mut swing = ToolSwing::default();
        assert!(swing.try_swing(0.6));
        assert!(!swing.try_swing(0.6));
        swing.tick(0.4);
        assert!(!swing.can_swing());
        swing.tick(0.3);
        assert!(swing.try_swing(0.6));
    }
}
