//! Continuous world-space geometry shared by every system.

use serde::{Deserialize, Serialize};

/// Point in continuous world space measured in world units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    x: f32,
    y: f32,
}

impl WorldPoint {
    /// Creates a new point from its horizontal and vertical components.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal component of the point.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical component of the point, growing downwards.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Returns the point translated by the provided deltas.
    #[must_use]
    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Euclidean distance between two points.
    #[must_use]
    pub fn distance(self, other: WorldPoint) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Squared Euclidean distance, used where only ordering matters.
    #[must_use]
    pub fn distance_squared(self, other: WorldPoint) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }

    /// Moves toward `target` by at most `max_step` world units.
    ///
    /// Steering is a direct vector: the delta is normalised and scaled by the
    /// step. A step that would overshoot lands exactly on the target, and a
    /// non-positive step leaves the point unchanged.
    #[must_use]
    pub fn step_toward(self, target: WorldPoint, max_step: f32) -> Self {
        if max_step <= 0.0 {
            return self;
        }

        let distance = self.distance(target);
        if distance <= max_step {
            return target;
        }

        let scale = max_step / distance;
        Self::new(
            self.x + (target.x - self.x) * scale,
            self.y + (target.y - self.y) * scale,
        )
    }
}

/// Axis-aligned rectangle in world space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldRect {
    origin: WorldPoint,
    width: f32,
    height: f32,
}

impl WorldRect {
    /// Creates a rectangle anchored at its upper-left corner.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: WorldPoint::new(x, y),
            width,
            height,
        }
    }

    /// Upper-left corner of the rectangle.
    #[must_use]
    pub const fn origin(&self) -> WorldPoint {
        self.origin
    }

    /// Horizontal extent of the rectangle.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Vertical extent of the rectangle.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Reports whether the point lies inside the rectangle, edges included.
    #[must_use]
    pub fn contains(&self, point: WorldPoint) -> bool {
        point.x() >= self.origin.x()
            && point.x() <= self.origin.x() + self.width
            && point.y() >= self.origin.y()
            && point.y() <= self.origin.y() + self.height
    }

    /// Maps unit-interval coordinates onto a point inside the rectangle.
    #[must_use]
    pub fn lerp(&self, u: f32, v: f32) -> WorldPoint {
        self.origin
            .offset(self.width * u.clamp(0.0, 1.0), self.height * v.clamp(0.0, 1.0))
    }
}

/// Wall of a room that carries its door.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoorSide {
    /// Door on the upper wall.
    Top,
    /// Door on the lower wall.
    Bottom,
    /// Door on the left wall.
    Left,
    /// Door on the right wall.
    Right,
}

impl DoorSide {
    /// Unit vector pointing out of the room through the door.
    #[must_use]
    pub const fn facing(self) -> (f32, f32) {
        match self {
            Self::Top => (0.0, -1.0),
            Self::Bottom => (0.0, 1.0),
            Self::Left => (-1.0, 0.0),
            Self::Right => (1.0, 0.0),
        }
    }

    /// Midpoint of this side of the provided rectangle.
    #[must_use]
    pub fn midpoint_of(self, bounds: &WorldRect) -> WorldPoint {
        let origin = bounds.origin();
        match self {
            Self::Top => origin.offset(bounds.width() / 2.0, 0.0),
            Self::Bottom => origin.offset(bounds.width() / 2.0, bounds.height()),
            Self::Left => origin.offset(0.0, bounds.height() / 2.0),
            Self::Right => origin.offset(bounds.width(), bounds.height() / 2.0),
        }
    }

    /// Point `distance` units outside the door, along its facing axis.
    #[must_use]
    pub fn stand_off(self, door: WorldPoint, distance: f32) -> WorldPoint {
        let (dx, dy) = self.facing();
        door.offset(dx * distance, dy * distance)
    }
}
