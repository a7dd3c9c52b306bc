//! Scroll direction and destination computation.
//!
//! | Direction | to_x | to_y |
//! |-----------|------|------|
//! | left | x - m | y |
//! | right | x + m | y |
//! | up | x | y - m |
//! | down | x | y + m |
//! | fallback | x | max(y - m, 0) |
//!
//! An explicit `up` may produce a negative target; only the fallback for an
//! unrecognized token clamps at zero.

use serde::{Deserialize, Serialize};

/// Scroll direction after locale resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Towards smaller x
    Left,
    /// Towards larger x
    Right,
    /// Towards smaller y
    Up,
    /// Towards larger y
    Down,
    /// Unrecognized token: up, clamped at zero
    Fallback,
}

impl Direction {
    /// Map a global direction key; anything unknown becomes `Fallback`
    #[must_use]
    pub fn from_key(key: &str) -> Self {
        match key.trim() {
            "left" => Self::Left,
            "right" => Self::Right,
            "up" => Self::Up,
            "down" => Self::Down,
            _ => Self::Fallback,
        }
    }

    /// Destination for a scroll of `magnitude` starting at `from`
    #[must_use]
    pub fn target(self, from: ScrollPosition, magnitude: Magnitude) -> ScrollPosition {
        let ScrollPosition { x, y } = from;
        let m = magnitude.get();
        match self {
            Self::Left => ScrollPosition::new(x - m, y),
            Self::Right => ScrollPosition::new(x + m, y),
            Self::Up => ScrollPosition::new(x, y - m),
            Self::Down => ScrollPosition::new(x, y + m),
            Self::Fallback => ScrollPosition::new(x, if y - m > 0.0 { y - m } else { 0.0 }),
        }
    }
}

/// A scroll coordinate pair
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrollPosition {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate
    pub y: f64,
}

impl ScrollPosition {
    /// Create a new position
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Viewport origin
    pub const ORIGIN: Self = Self::new(0.0, 0.0);
}

/// Scroll distance, never negative
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Magnitude(f64);

impl Magnitude {
    /// Coerce a raw distance; negative and NaN become zero
    #[must_use]
    pub fn new(raw: f64) -> Self {
        if raw.is_nan() || raw < 0.0 {
            Self(0.0)
        } else {
            Self(raw)
        }
    }

    /// Distance in pixels
    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }
}

/// Which driver calls supply and consume the scroll position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrollMode {
    /// Web view inside a native app: element scroll offsets, relative scroll
    Embedded,
    /// Standalone browser: bounding-box center, absolute viewport scroll
    Desktop,
}

impl ScrollMode {
    /// Select the mode from the page's user agent
    #[must_use]
    pub fn from_user_agent(user_agent: &str) -> Self {
        if user_agent.contains("Mobile") || user_agent.contains("Android") {
            Self::Embedded
        } else {
            Self::Desktop
        }
    }

    /// Whether this is the embedded (H5) mode
    #[must_use]
    pub const fn is_embedded(self) -> bool {
        matches!(self, Self::Embedded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn target(key: &str, x: f64, y: f64, m: f64) -> (f64, f64) {
        let to = Direction::from_key(key).target(ScrollPosition::new(x, y), Magnitude::new(m));
        (to.x, to.y)
    }

    mod direction_tests {
        use super::*;

        #[test]
        fn test_cardinal_directions() {
            assert_eq!(target("left", 100.0, 50.0, 30.0), (70.0, 50.0));
            assert_eq!(target("right", 100.0, 50.0, 30.0), (130.0, 50.0));
            assert_eq!(target("up", 100.0, 50.0, 30.0), (100.0, 20.0));
            assert_eq!(target("down", 100.0, 50.0, 30.0), (100.0, 80.0));
        }

        #[test]
        fn test_fallback_clamps_but_up_does_not() {
            assert_eq!(target("sideways", 10.0, 5.0, 20.0), (10.0, 0.0));
            assert_eq!(target("up", 10.0, 5.0, 20.0), (10.0, -15.0));
        }

        #[test]
        fn test_fallback_without_clamp() {
            assert_eq!(target("", 10.0, 50.0, 20.0), (10.0, 30.0));
        }

        #[test]
        fn test_from_key() {
            assert_eq!(Direction::from_key(" down "), Direction::Down);
            assert_eq!(Direction::from_key("Down"), Direction::Fallback);
        }

        #[test]
        fn test_viewport_scroll_from_origin() {
            let to = Direction::Down.target(ScrollPosition::ORIGIN, Magnitude::new(300.0));
            assert_eq!(to, ScrollPosition::new(0.0, 300.0));
            let to = Direction::Fallback.target(ScrollPosition::ORIGIN, Magnitude::new(300.0));
            assert_eq!(to, ScrollPosition::ORIGIN);
        }
    }

    mod magnitude_tests {
        use super::*;

        #[test]
        fn test_negative_coerced_to_zero() {
            assert_eq!(Magnitude::new(-5.0).get(), 0.0);
            assert_eq!(Magnitude::new(f64::NAN).get(), 0.0);
            assert_eq!(Magnitude::new(12.5).get(), 12.5);
        }
    }

    mod mode_tests {
        use super::*;

        #[test]
        fn test_mode_from_user_agent() {
            assert_eq!(
                ScrollMode::from_user_agent("Mozilla/5.0 (Linux; Android 13)"),
                ScrollMode::Embedded
            );
            assert_eq!(
                ScrollMode::from_user_agent("Mozilla/5.0 (iPhone) Mobile/15E148"),
                ScrollMode::Embedded
            );
            assert_eq!(
                ScrollMode::from_user_agent("Mozilla/5.0 (X11; Linux x86_64)"),
                ScrollMode::Desktop
            );
            assert!(!ScrollMode::Desktop.is_embedded());
        }
    }

    proptest! {
        #[test]
        fn prop_cardinal_moves_one_axis(
            x in -1e6f64..1e6,
            y in -1e6f64..1e6,
            m in 0f64..1e6,
        ) {
            let from = ScrollPosition::new(x, y);
            let mag = Magnitude::new(m);
            prop_assert_eq!(Direction::Left.target(from, mag), ScrollPosition::new(x - m, y));
            prop_assert_eq!(Direction::Right.target(from, mag), ScrollPosition::new(x + m, y));
            prop_assert_eq!(Direction::Up.target(from, mag), ScrollPosition::new(x, y - m));
            prop_assert_eq!(Direction::Down.target(from, mag), ScrollPosition::new(x, y + m));
        }

        #[test]
        fn prop_fallback_never_negative(
            x in -1e6f64..1e6,
            y in -1e6f64..1e6,
            m in -1e6f64..1e6,
        ) {
            let to = Direction::Fallback.target(ScrollPosition::new(x, y), Magnitude::new(m));
            prop_assert!(to.y >= 0.0);
            prop_assert_eq!(to.x, x);
        }
    }
}
