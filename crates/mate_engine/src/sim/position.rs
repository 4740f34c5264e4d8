use serde::{Deserialize, Serialize};

use crate::flags::flag_set;

pub const DEFAULT_VIEWPORT_WIDTH: f64 = 1280.0;
pub const DEFAULT_VIEWPORT_HEIGHT: f64 = 720.0;
pub const DEFAULT_TILE_SIZE: f64 = 40.0;
pub const MIN_TILE_SIZE: f64 = 1.0;
/// Distance above the floor line that still counts as standing on it.
pub const FLOOR_TOLERANCE: f64 = 0.5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn scaled(self, factor: f64) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub tile_size: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: DEFAULT_VIEWPORT_WIDTH,
            height: DEFAULT_VIEWPORT_HEIGHT,
            tile_size: DEFAULT_TILE_SIZE,
        }
    }
}

impl Viewport {
    /// Builds a viewport from host measurements, replacing unusable values.
    pub fn new(width: f64, height: f64, tile_size: f64) -> Self {
        let tile_size = if tile_size.is_finite() {
            tile_size.max(MIN_TILE_SIZE)
        } else {
            DEFAULT_TILE_SIZE
        };
        Self {
            width: coerce_extent(width, DEFAULT_VIEWPORT_WIDTH),
            height: coerce_extent(height, DEFAULT_VIEWPORT_HEIGHT),
            tile_size,
        }
    }

    pub fn max_x(&self) -> f64 {
        (self.width - self.tile_size).max(0.0)
    }

    pub fn max_y(&self) -> f64 {
        (self.height - self.tile_size).max(0.0)
    }

    pub fn floor_y(&self) -> f64 {
        self.max_y()
    }

    pub fn clamp_x(&self, x: f64) -> f64 {
        x.clamp(0.0, self.max_x())
    }
}

fn coerce_extent(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        fallback
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Direction {
    #[default]
    None,
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    fn horizontal(delta: f64) -> Self {
        if delta < 0.0 {
            Self::Left
        } else if delta > 0.0 {
            Self::Right
        } else {
            Self::None
        }
    }

    fn vertical(delta: f64) -> Self {
        if delta < 0.0 {
            Self::Up
        } else if delta > 0.0 {
            Self::Down
        } else {
            Self::None
        }
    }
}

flag_set! {
    /// Edge and visibility state of a position, derived on demand.
    pub struct PositionFlags: u8 {
        const TOP_EDGE = 0, "TopEdge";
        const RIGHT_EDGE = 1, "RightEdge";
        const BOTTOM_EDGE = 2, "BottomEdge";
        const LEFT_EDGE = 3, "LeftEdge";
        const ON_FLOOR = 4, "OnFloor";
        const VISIBLE = 5, "Visible";
        const PARTIALLY_VISIBLE = 6, "PartiallyVisible";
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position {
    x: f64,
    y: f64,
    x_dir: Direction,
    y_dir: Direction,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            x_dir: Direction::None,
            y_dir: Direction::None,
        }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn x_dir(&self) -> Direction {
        self.x_dir
    }

    pub fn y_dir(&self) -> Direction {
        self.y_dir
    }

    pub fn coords(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn flags(&self, viewport: &Viewport) -> PositionFlags {
        let max_x = viewport.max_x();
        let max_y = viewport.max_y();
        let mut flags = PositionFlags::empty();

        flags.set(PositionFlags::LEFT_EDGE, self.x <= 0.0);
        flags.set(PositionFlags::RIGHT_EDGE, self.x >= max_x);
        flags.set(PositionFlags::TOP_EDGE, self.y <= 0.0);
        flags.set(PositionFlags::BOTTOM_EDGE, self.y >= max_y);
        flags.set(PositionFlags::ON_FLOOR, self.y >= max_y - FLOOR_TOLERANCE);

        let fully_inside = (0.0..=max_x).contains(&self.x) && (0.0..=max_y).contains(&self.y);
        if fully_inside {
            flags.insert(PositionFlags::VISIBLE);
        } else {
            let tile = viewport.tile_size;
            let overlaps = self.x > -tile
                && self.x < viewport.width
                && self.y > -tile
                && self.y < viewport.height;
            flags.set(PositionFlags::PARTIALLY_VISIBLE, overlaps);
        }
        flags
    }

    /// Absolute moves replace the coordinates and forget the direction;
    /// relative moves record the direction of `delta` on each axis.
    pub fn move_by(&mut self, delta: Vec2, absolute: bool) {
        if !delta.is_finite() {
            return;
        }
        if absolute {
            self.x = delta.x;
            self.y = delta.y;
            self.x_dir = Direction::None;
            self.y_dir = Direction::None;
        } else {
            self.x += delta.x;
            self.y += delta.y;
            self.x_dir = Direction::horizontal(delta.x);
            self.y_dir = Direction::vertical(delta.y);
        }
    }

    pub fn is_visible(&self, viewport: &Viewport, partial: bool) -> bool {
        let flags = self.flags(viewport);
        flags.contains(PositionFlags::VISIBLE)
            || (partial && flags.contains(PositionFlags::PARTIALLY_VISIBLE))
    }

    pub fn is_on_floor(&self, viewport: &Viewport) -> bool {
        self.flags(viewport).contains(PositionFlags::ON_FLOOR)
    }

    pub(crate) fn snap_x(&mut self, x: f64) {
        self.x = x;
        self.x_dir = Direction::None;
    }

    pub(crate) fn snap_y(&mut self, y: f64) {
        self.y = y;
        self.y_dir = Direction::None;
    }
}
