use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Timed modifier kinds that can be attached to a snake or to the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EffectKind {
    SpeedBoost,
    Slow,
    Immunity,
    Growth,
    Shrink,
}

impl EffectKind {
    pub const ALL: [EffectKind; 5] = [
        EffectKind::SpeedBoost,
        EffectKind::Slow,
        EffectKind::Immunity,
        EffectKind::Growth,
        EffectKind::Shrink,
    ];

    /// Whether the magnitude multiplies movement speed.
    #[must_use]
    pub fn affects_speed(self) -> bool {
        matches!(self, EffectKind::SpeedBoost | EffectKind::Slow)
    }

    #[must_use]
    pub fn flag(self) -> EffectFlags {
        match self {
            EffectKind::SpeedBoost => EffectFlags::SPEED_BOOST,
            EffectKind::Slow => EffectFlags::SLOW,
            EffectKind::Immunity => EffectFlags::IMMUNITY,
            EffectKind::Growth => EffectFlags::GROWTH,
            EffectKind::Shrink => EffectFlags::SHRINK,
        }
    }
}

bitflags! {
    /// Compact set of currently active timed and environmental effects.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct EffectFlags: u16 {
        const SPEED_BOOST = 1;
        const SLOW = 1 << 1;
        const IMMUNITY = 1 << 2;
        const GROWTH = 1 << 3;
        const SHRINK = 1 << 4;
        const FAST_ZONE = 1 << 5;
        const SLOW_ZONE = 1 << 6;
        const HAZARD_PULL = 1 << 7;
    }
}

/// Duration and magnitude carried by special food.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectDescriptor {
    /// Seconds.
    pub duration: f64,
    pub magnitude: f64,
}

impl EffectDescriptor {
    #[must_use]
    pub const fn new(duration: f64, magnitude: f64) -> Self {
        Self {
            duration,
            magnitude,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffect {
    pub kind: EffectKind,
    pub magnitude: f64,
    /// Seconds left before expiry.
    pub remaining: f64,
}

impl ActiveEffect {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.remaining > 0.0
    }
}

/// At most one effect per kind. Re-applying a kind refreshes its duration and
/// replaces its magnitude; magnitudes never stack.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectSet {
    effects: BTreeMap<EffectKind, ActiveEffect>,
}

impl EffectSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when an effect of the same kind was refreshed.
    pub fn apply(&mut self, kind: EffectKind, descriptor: EffectDescriptor) -> bool {
        let effect = ActiveEffect {
            kind,
            magnitude: descriptor.magnitude,
            remaining: descriptor.duration,
        };
        self.effects.insert(kind, effect).is_some()
    }

    #[must_use]
    pub fn get(&self, kind: EffectKind) -> Option<&ActiveEffect> {
        self.effects.get(&kind)
    }

    #[must_use]
    pub fn is_active(&self, kind: EffectKind) -> bool {
        self.effects.get(&kind).is_some_and(ActiveEffect::is_active)
    }

    pub fn remove(&mut self, kind: EffectKind) -> Option<ActiveEffect> {
        self.effects.remove(&kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActiveEffect> {
        self.effects.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn clear(&mut self) {
        self.effects.clear();
    }

    /// Counts every effect down by `dt` and drops those that ran out.
    /// Returns the kinds that expired, in kind order.
    pub fn advance(&mut self, dt: f64) -> Vec<EffectKind> {
        let mut expired = Vec::new();
        for effect in self.effects.values_mut() {
            effect.remaining -= dt;
            if effect.remaining <= 0.0 {
                expired.push(effect.kind);
            }
        }
        for kind in &expired {
            self.effects.remove(kind);
        }
        expired
    }

    /// Product of the magnitudes of all active speed-affecting effects.
    #[must_use]
    pub fn speed_multiplier(&self) -> f64 {
        self.effects
            .values()
            .filter(|e| e.kind.affects_speed() && e.is_active())
            .map(|e| e.magnitude)
            .product()
    }

    #[must_use]
    pub fn flags(&self) -> EffectFlags {
        self.effects
            .values()
            .filter(|e| e.is_active())
            .fold(EffectFlags::empty(), |acc, e| acc | e.kind.flag())
    }
}
