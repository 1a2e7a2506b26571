//! Viewport pixel coordinates.
//!
//! All geometry in packvote is expressed in viewport pixels, the same space a
//! browser reports from `getBoundingClientRect` and `innerWidth`/`innerHeight`.
//!
//! # Coordinate System
//!
//! - Origin (0, 0) at the top-left corner of the viewport
//! - X-axis increases to the right
//! - Y-axis increases downward
//! - Negative coordinates are allowed for elements scrolled out of view
//!
//! # Example
//!
//! ```
//! use packvote_ui::px::{Px, PxPosition, PxRect, PxSize};
//!
//! let trigger = PxRect::new(Px(40), Px(100), Px(200), Px(36));
//! assert_eq!(trigger.bottom(), Px(136));
//!
//! let size = PxSize::new(Px(320), Px(320));
//! let below = PxPosition::new(trigger.left(), trigger.bottom() + Px(12));
//! assert_eq!(PxRect::from_position_size(below, size).top(), Px(148));
//! ```

use std::ops::{AddAssign, Neg, SubAssign};

/// A single viewport pixel value.
///
/// Supports negative values so elements above or left of the viewport can be
/// described without clamping.
#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd, Eq, Ord, Hash)]
pub struct Px(pub i32);

impl Px {
    /// Zero pixels.
    pub const ZERO: Self = Self(0);

    /// Creates a new `Px` from an i32 value.
    pub const fn new(value: i32) -> Self {
        Px(value)
    }
}

/// A 2D position in viewport space.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PxPosition {
    /// Horizontal coordinate.
    pub x: Px,
    /// Vertical coordinate.
    pub y: Px,
}

impl PxPosition {
    /// The origin.
    pub const ZERO: Self = Self { x: Px(0), y: Px(0) };

    /// Creates a new position.
    pub const fn new(x: Px, y: Px) -> Self {
        Self { x, y }
    }
}

/// A 2D size in viewport space.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PxSize {
    /// Width.
    pub width: Px,
    /// Height.
    pub height: Px,
}

impl PxSize {
    /// A zero size.
    pub const ZERO: Self = Self {
        width: Px(0),
        height: Px(0),
    };

    /// Creates a new size.
    pub const fn new(width: Px, height: Px) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle in viewport space.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PxRect {
    /// Left edge.
    pub x: Px,
    /// Top edge.
    pub y: Px,
    /// Width.
    pub width: Px,
    /// Height.
    pub height: Px,
}

impl PxRect {
    /// An empty rectangle at the origin.
    pub const ZERO: Self = Self {
        x: Px(0),
        y: Px(0),
        width: Px(0),
        height: Px(0),
    };

    /// Creates a rectangle from its left/top edges and dimensions.
    pub const fn new(x: Px, y: Px, width: Px, height: Px) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle from a top-left position and a size.
    pub fn from_position_size(position: PxPosition, size: PxSize) -> Self {
        Self::new(position.x, position.y, size.width, size.height)
    }

    /// Left edge.
    pub fn left(&self) -> Px {
        self.x
    }

    /// Top edge.
    pub fn top(&self) -> Px {
        self.y
    }

    /// Right edge (exclusive).
    pub fn right(&self) -> Px {
        self.x + self.width
    }

    /// Bottom edge (exclusive).
    pub fn bottom(&self) -> Px {
        self.y + self.height
    }

    /// Dimensions of the rectangle.
    pub fn size(&self) -> PxSize {
        PxSize::new(self.width, self.height)
    }

    /// Whether a point lies inside the rectangle.
    pub fn contains(&self, point: PxPosition) -> bool {
        point.x >= self.left()
            && point.x < self.right()
            && point.y >= self.top()
            && point.y < self.bottom()
    }
}

impl std::ops::Add for Px {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Px(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Px {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Px(self.0 - rhs.0)
    }
}

impl Neg for Px {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Px(-self.0)
    }
}

impl std::ops::Mul<i32> for Px {
    type Output = Self;

    fn mul(self, rhs: i32) -> Self::Output {
        Px(self.0 * rhs)
    }
}

impl AddAssign for Px {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Px {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl From<i32> for Px {
    fn from(value: i32) -> Self {
        Px(value)
    }
}
