use super::effect::{EffectDescriptor, EffectKind};
use super::geometry::Vec2;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type FoodId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FoodKind {
    #[default]
    Plain,
    SpeedBoost,
    Slow,
    Immunity,
    Growth,
    Shrink,
}

impl FoodKind {
    pub const SPECIAL: [FoodKind; 5] = [
        FoodKind::SpeedBoost,
        FoodKind::Slow,
        FoodKind::Immunity,
        FoodKind::Growth,
        FoodKind::Shrink,
    ];

    #[must_use]
    pub fn effect_kind(self) -> Option<EffectKind> {
        match self {
            FoodKind::Plain => None,
            FoodKind::SpeedBoost => Some(EffectKind::SpeedBoost),
            FoodKind::Slow => Some(EffectKind::Slow),
            FoodKind::Immunity => Some(EffectKind::Immunity),
            FoodKind::Growth => Some(EffectKind::Growth),
            FoodKind::Shrink => Some(EffectKind::Shrink),
        }
    }

    #[must_use]
    pub fn is_special(self) -> bool {
        self != FoodKind::Plain
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Food {
    pub id: FoodId,
    pub position: Vec2,
    pub kind: FoodKind,
    /// Present exactly when `kind` is special.
    pub effect: Option<EffectDescriptor>,
}

impl Food {
    #[must_use]
    pub fn plain(id: FoodId, position: Vec2) -> Self {
        Self {
            id,
            position,
            kind: FoodKind::Plain,
            effect: None,
        }
    }

    #[must_use]
    pub fn special(id: FoodId, position: Vec2, kind: FoodKind, effect: EffectDescriptor) -> Self {
        if kind.is_special() {
            Self {
                id,
                position,
                kind,
                effect: Some(effect),
            }
        } else {
            Self::plain(id, position)
        }
    }
}
