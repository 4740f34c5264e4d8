use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use super::database::{Catalog, CatalogError};
use super::types::{
    Animation, AnimationFlags, AnimationId, ChildPlacement, SceneData, SceneFlags, SceneSource,
    SoundId, Transition, Wall,
};
use crate::sim::{ChoiceList, FrameList, Vec2, Viewport};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    fallback: AnimationId,
    animations: Vec<AnimationFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AnimationFile {
    id: AnimationId,
    name: String,
    #[serde(default)]
    flags: AnimationFlags,
    #[serde(default = "default_weight")]
    weight: u32,
    #[serde(default)]
    child: Option<ChildFile>,
    #[serde(default)]
    edge: Option<TransitionFile>,
    #[serde(default)]
    next: Option<TransitionFile>,
    #[serde(default)]
    wall: Option<Wall>,
    scenes: Vec<SceneFile>,
}

fn default_weight() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ChildFile {
    animation: AnimationId,
    #[serde(default)]
    placement: PlacementFile,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum PlacementFile {
    #[default]
    Centered,
    Offset {
        dx_tiles: f64,
        #[serde(default)]
        dy_tiles: f64,
    },
    Floor {
        #[serde(default)]
        dx_tiles: f64,
    },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TransitionFile {
    Fixed(AnimationId),
    Weighted(Vec<WeightedFile>),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WeightedFile {
    id: AnimationId,
    weight: u32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SceneFile {
    #[serde(default)]
    start: Option<PointFile>,
    #[serde(default, rename = "move")]
    movement: Option<Vec2>,
    duration_ms: u32,
    frames: FramesFile,
    #[serde(default)]
    sound: Option<SoundFile>,
    #[serde(default)]
    flags: SceneFlags,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FramesFile {
    Plain(Vec<u32>),
    Repeating(RepeatingFramesFile),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RepeatingFramesFile {
    frames: Vec<u32>,
    #[serde(default)]
    repeat: u32,
    #[serde(default)]
    repeat_from: usize,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SoundFile {
    id: SoundId,
    #[serde(default)]
    at_step: usize,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
struct PointFile {
    x: CoordFile,
    y: CoordFile,
}

/// A plain number is an absolute pixel coordinate; an anchor is measured in
/// tiles from an edge or the centre of the viewport.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
enum CoordFile {
    Absolute(f64),
    Anchored(Anchor),
}

/// `left`/`top` anchor at the axis origin, `right`/`bottom` at the last
/// position where a full tile still fits.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Anchor {
    Left(f64),
    Right(f64),
    Top(f64),
    Bottom(f64),
    Center(f64),
}

#[derive(Debug, Clone, Copy)]
enum Axis {
    X,
    Y,
}

impl CoordFile {
    fn is_anchored(self) -> bool {
        matches!(self, Self::Anchored(_))
    }

    fn resolve(self, axis: Axis, viewport: &Viewport) -> f64 {
        let anchor = match self {
            Self::Absolute(value) => return value,
            Self::Anchored(anchor) => anchor,
        };
        let max = match axis {
            Axis::X => viewport.max_x(),
            Axis::Y => viewport.max_y(),
        };
        let tile = viewport.tile_size;
        match anchor {
            Anchor::Left(tiles) | Anchor::Top(tiles) => tiles * tile,
            Anchor::Right(tiles) | Anchor::Bottom(tiles) => max + tiles * tile,
            Anchor::Center(tiles) => max / 2.0 + tiles * tile,
        }
    }
}

impl PointFile {
    fn is_anchored(self) -> bool {
        self.x.is_anchored() || self.y.is_anchored()
    }

    fn resolve(self, viewport: &Viewport) -> Vec2 {
        Vec2::new(
            self.x.resolve(Axis::X, viewport),
            self.y.resolve(Axis::Y, viewport),
        )
    }
}

pub fn parse_catalog(raw: &str) -> Result<Catalog, CatalogError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let file = match serde_path_to_error::deserialize::<_, CatalogFile>(&mut deserializer) {
        Ok(file) => file,
        Err(error) => {
            let path = error.path().to_string();
            let message = error.into_inner().to_string();
            return Err(if path.is_empty() || path == "." {
                CatalogError::Parse { message }
            } else {
                CatalogError::ParseAt { path, message }
            });
        }
    };
    compile_catalog(file)
}

pub fn load_catalog(path: &Path) -> Result<Catalog, CatalogError> {
    let raw = fs::read_to_string(path).map_err(|source| CatalogError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let catalog = parse_catalog(&raw)?;
    info!(
        path = %path.display(),
        animation_count = catalog.len(),
        "catalog_loaded"
    );
    Ok(catalog)
}

fn compile_catalog(file: CatalogFile) -> Result<Catalog, CatalogError> {
    let animations = file
        .animations
        .into_iter()
        .map(compile_animation)
        .collect::<Result<Vec<_>, _>>()?;
    Catalog::new(animations, file.fallback)
}

fn compile_animation(file: AnimationFile) -> Result<Animation, CatalogError> {
    let id = file.id;
    let scenes = file
        .scenes
        .into_iter()
        .enumerate()
        .map(|(index, scene)| compile_scene(id, index, scene))
        .collect::<Result<Vec<_>, _>>()?;

    let mut animation = Animation::new(id, file.name, scenes)
        .with_flags(file.flags)
        .with_weight(file.weight);
    if let Some(child) = file.child {
        animation = animation.with_child(child.animation, compile_placement(child.placement));
    }
    if let Some(edge) = file.edge {
        animation = animation.with_edge(compile_transition(id, edge)?);
    }
    if let Some(next) = file.next {
        animation = animation.with_next(compile_transition(id, next)?);
    }
    if let Some(wall) = file.wall {
        animation = animation.with_wall(wall);
    }
    Ok(animation)
}

fn compile_placement(file: PlacementFile) -> ChildPlacement {
    match file {
        PlacementFile::Centered => ChildPlacement::Centered,
        PlacementFile::Offset { dx_tiles, dy_tiles } => ChildPlacement::Offset { dx_tiles, dy_tiles },
        PlacementFile::Floor { dx_tiles } => ChildPlacement::Floor { dx_tiles },
    }
}

fn compile_transition(
    animation: AnimationId,
    file: TransitionFile,
) -> Result<Transition, CatalogError> {
    match file {
        TransitionFile::Fixed(id) => Ok(Transition::Fixed(id)),
        TransitionFile::Weighted(entries) => {
            let entries = entries
                .into_iter()
                .map(|entry| (entry.id, entry.weight))
                .collect();
            ChoiceList::new(entries)
                .map(Transition::Weighted)
                .map_err(|source| CatalogError::Transition { animation, source })
        }
    }
}

fn compile_scene(
    animation: AnimationId,
    index: usize,
    file: SceneFile,
) -> Result<SceneSource, CatalogError> {
    let frames = match file.frames {
        FramesFile::Plain(frames) => FrameList::new(frames, 0, 0),
        FramesFile::Repeating(RepeatingFramesFile {
            frames,
            repeat,
            repeat_from,
        }) => FrameList::new(frames, repeat, repeat_from),
    }
    .map_err(|source| CatalogError::Frames {
        animation,
        scene: index,
        source,
    })?;

    let mut data = SceneData::new(frames, file.duration_ms).with_flags(file.flags);
    if let Some(movement) = file.movement {
        data = data.with_movement(movement);
    }
    if let Some(sound) = file.sound {
        data = data.with_sound(sound.id, sound.at_step);
    }

    match file.start {
        Some(start) if start.is_anchored() => Ok(SceneSource::computed(move |viewport| {
            data.clone().with_start(start.resolve(viewport))
        })),
        Some(start) => {
            let absolute = start.resolve(&Viewport::default());
            Ok(SceneSource::Static(data.with_start(absolute)))
        }
        None => Ok(SceneSource::Static(data)),
    }
}
