use super::geometry::Vec2;
use serde::{Deserialize, Serialize};

/// Discrete steering action, the label space of a learned policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Up, Action::Down, Action::Left, Action::Right];

    /// Unit vector in screen coordinates (`y` down).
    #[must_use]
    pub fn direction(self) -> Vec2 {
        match self {
            Action::Up => Vec2::new(0.0, -1.0),
            Action::Down => Vec2::new(0.0, 1.0),
            Action::Left => Vec2::new(-1.0, 0.0),
            Action::Right => Vec2::new(1.0, 0.0),
        }
    }

    /// Dominant-axis label for a continuous direction. Diagonals with equal
    /// components and zero vectors have no label.
    #[must_use]
    pub fn from_direction(dir: Vec2) -> Option<Action> {
        if !dir.is_finite() {
            return None;
        }
        let (ax, ay) = (dir.x.abs(), dir.y.abs());
        if ax > ay {
            Some(if dir.x > 0.0 { Action::Right } else { Action::Left })
        } else if ay > ax {
            Some(if dir.y > 0.0 { Action::Down } else { Action::Up })
        } else {
            None
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Action::Up => "UP",
            Action::Down => "DOWN",
            Action::Left => "LEFT",
            Action::Right => "RIGHT",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dominant_axis_labels() {
        assert_eq!(Action::from_direction(Vec2::new(3.0, -1.0)), Some(Action::Right));
        assert_eq!(Action::from_direction(Vec2::new(-0.2, -0.9)), Some(Action::Up));
        assert_eq!(Action::from_direction(Vec2::new(1.0, 1.0)), None);
        assert_eq!(Action::from_direction(Vec2::ZERO), None);
    }

    #[test]
    fn test_label_serialization_matches_csv_labels() {
        let json = serde_json::to_string(&Action::Left).unwrap();
        assert_eq!(json, "\"LEFT\"");
        assert_eq!(Action::Left.label(), "LEFT");
    }
}
