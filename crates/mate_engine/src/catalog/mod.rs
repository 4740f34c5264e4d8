mod database;
mod loader;
mod types;
mod validate;

pub use database::{Catalog, CatalogError};
pub use loader::{load_catalog, parse_catalog};
pub use types::{
    Animation, AnimationFlags, AnimationId, ChildPlacement, ChildSpawn, SceneData, SceneFlags,
    SceneFn, SceneSource, SoundCue, SoundId, Transition, Wall,
};
