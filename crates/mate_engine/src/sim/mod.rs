mod choice;
mod easing;
mod frames;
mod host;
mod mate;
mod position;
mod timeline;
mod universe;


pub use choice::{ChoiceList, ChoiceListError, CHOICE_TOTAL_SEED};
pub use easing::{distribute, ease_in, ease_out, linear, Easing, MIN_STEP_DISTANCE};
pub use frames::{FrameIter, FrameList, FrameListError};
pub use host::{forward_to_tracing, Host, LogLevel, ScriptedHost, SystemHost};
pub use mate::{Mate, MateEffect, MateFlags, MateId, MAY_EXIT_ONE_IN};
pub use position::{
    Direction, Position, PositionFlags, Vec2, Viewport, DEFAULT_TILE_SIZE,
    DEFAULT_VIEWPORT_HEIGHT, DEFAULT_VIEWPORT_WIDTH, FLOOR_TOLERANCE, MIN_TILE_SIZE,
};
pub use timeline::{SceneTimeline, Step, TimelineSteps};
pub use universe::{
    MateSnapshot, Universe, UniverseConfig, MAX_SPEED_MULTIPLIER, MIN_SPEED_MULTIPLIER,
};
