pub mod catalog;
mod flags;
pub mod sim;

pub use catalog::{
    load_catalog, parse_catalog, Animation, AnimationFlags, AnimationId, Catalog, CatalogError,
};
pub use sim::{
    Host, LogLevel, MateSnapshot, ScriptedHost, SystemHost, Universe, UniverseConfig, Vec2,
    Viewport,
};
