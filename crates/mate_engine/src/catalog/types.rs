use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::flags::flag_set;
use crate::sim::{ChoiceList, FrameList, Host, Vec2, Viewport};

/// Catalog identifier of an animation; equals its 1-based catalog position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnimationId(pub u16);

impl AnimationId {
    pub(crate) fn index(self) -> Option<usize> {
        (self.0 as usize).checked_sub(1)
    }
}

impl fmt::Display for AnimationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SoundId(pub String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundCue {
    pub sound: SoundId,
    pub at_step: usize,
}

flag_set! {
    pub struct SceneFlags: u8 {
        const GRAVITY = 0, "Gravity";
        const IGNORE_EDGES = 1, "IgnoreEdges";
        const EASE_IN = 2, "EaseIn";
        const EASE_OUT = 3, "EaseOut";
        const FLIP_X_AFTER = 4, "FlipXAfter";
        const FLIP_Y_AFTER = 5, "FlipYAfter";
    }
}

flag_set! {
    pub struct AnimationFlags: u16 {
        const ALLOW_EXIT = 0, "AllowExit";
        const BACKGROUND = 1, "Background";
        const DEFAULT_CHOICE = 2, "DefaultChoice";
        const DIRECT_PLAY = 3, "DirectPlay";
        const DRAGGING = 4, "Dragging";
        const ENTRANCE_CHOICE = 5, "EntranceChoice";
        const FALLING = 6, "Falling";
        const FIRST_CHOICE = 7, "FirstChoice";
        const PRIMARY_CAPABLE = 8, "PrimaryCapable";
        const SECONDARY_CAPABLE = 9, "SecondaryCapable";
        const VARIABLE_DURATION = 10, "VariableDuration";
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneData {
    pub start: Option<Vec2>,
    pub movement: Option<Vec2>,
    pub duration_ms: u32,
    pub frames: FrameList,
    pub sound: Option<SoundCue>,
    pub flags: SceneFlags,
}

impl SceneData {
    pub fn new(frames: FrameList, duration_ms: u32) -> Self {
        Self {
            start: None,
            movement: None,
            duration_ms,
            frames,
            sound: None,
            flags: SceneFlags::empty(),
        }
    }

    pub fn with_start(mut self, start: Vec2) -> Self {
        self.start = Some(start);
        self
    }

    pub fn with_movement(mut self, movement: Vec2) -> Self {
        self.movement = Some(movement);
        self
    }

    pub fn with_sound(mut self, sound: SoundId, at_step: usize) -> Self {
        self.sound = Some(SoundCue { sound, at_step });
        self
    }

    pub fn with_flags(mut self, flags: SceneFlags) -> Self {
        self.flags = flags;
        self
    }
}

pub type SceneFn = dyn Fn(&Viewport) -> SceneData + Send + Sync;

/// A scene is either fixed data or computed from the viewport when an
/// animation reaches it.
#[derive(Clone)]
pub enum SceneSource {
    Static(SceneData),
    Computed(Arc<SceneFn>),
}

impl SceneSource {
    pub fn computed(build: impl Fn(&Viewport) -> SceneData + Send + Sync + 'static) -> Self {
        Self::Computed(Arc::new(build))
    }

    pub fn resolve(&self, viewport: &Viewport) -> SceneData {
        match self {
            Self::Static(data) => data.clone(),
            Self::Computed(build) => build(viewport),
        }
    }
}

impl fmt::Debug for SceneSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(data) => f.debug_tuple("Static").field(data).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Fixed(AnimationId),
    Weighted(ChoiceList),
}

impl Transition {
    pub fn resolve(&self, host: &mut dyn Host) -> Option<AnimationId> {
        match self {
            Self::Fixed(id) => Some(*id),
            Self::Weighted(choices) => choices.choose(host),
        }
    }

    pub fn targets(&self) -> Vec<AnimationId> {
        match self {
            Self::Fixed(id) => vec![*id],
            Self::Weighted(choices) => choices.iter().collect(),
        }
    }
}

/// Where a spawned child starts relative to its parent. Horizontal offsets
/// are authored for an unflipped parent and mirrored otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChildPlacement {
    Centered,
    Offset { dx_tiles: f64, dy_tiles: f64 },
    Floor { dx_tiles: f64 },
}

impl ChildPlacement {
    pub fn place(&self, parent: Vec2, parent_flipped_x: bool, viewport: &Viewport) -> Vec2 {
        let mirror = if parent_flipped_x { -1.0 } else { 1.0 };
        let tile = viewport.tile_size;
        match *self {
            Self::Centered => parent,
            Self::Offset { dx_tiles, dy_tiles } => Vec2::new(
                parent.x + dx_tiles * tile * mirror,
                parent.y + dy_tiles * tile,
            ),
            Self::Floor { dx_tiles } => {
                Vec2::new(parent.x + dx_tiles * tile * mirror, viewport.floor_y())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChildSpawn {
    pub animation: AnimationId,
    pub placement: ChildPlacement,
}

/// Viewport side an animation clings to, as authored for an unflipped mate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Wall {
    Left,
    Right,
}

impl Wall {
    pub fn mirrored(self, flipped_x: bool) -> Self {
        match (self, flipped_x) {
            (side, false) => side,
            (Self::Left, true) => Self::Right,
            (Self::Right, true) => Self::Left,
        }
    }

    pub fn x(self, viewport: &Viewport) -> f64 {
        match self {
            Self::Left => 0.0,
            Self::Right => viewport.max_x(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Animation {
    pub id: AnimationId,
    pub name: String,
    pub scenes: Arc<[SceneSource]>,
    pub flags: AnimationFlags,
    /// Weight inside the first/entrance/default choice lists.
    pub weight: u32,
    pub child: Option<ChildSpawn>,
    pub edge: Option<Transition>,
    pub next: Option<Transition>,
    pub wall: Option<Wall>,
}

impl Animation {
    pub fn new(id: AnimationId, name: impl Into<String>, scenes: Vec<SceneSource>) -> Self {
        Self {
            id,
            name: name.into(),
            scenes: scenes.into(),
            flags: AnimationFlags::empty(),
            weight: 1,
            child: None,
            edge: None,
            next: None,
            wall: None,
        }
    }

    pub fn with_flags(mut self, flags: AnimationFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_child(mut self, animation: AnimationId, placement: ChildPlacement) -> Self {
        self.child = Some(ChildSpawn {
            animation,
            placement,
        });
        self
    }

    pub fn with_edge(mut self, edge: Transition) -> Self {
        self.edge = Some(edge);
        self
    }

    pub fn with_next(mut self, next: Transition) -> Self {
        self.next = Some(next);
        self
    }

    pub fn with_wall(mut self, wall: Wall) -> Self {
        self.wall = Some(wall);
        self
    }

    pub fn is_capable(&self, primary: bool) -> bool {
        if primary {
            self.flags.contains(AnimationFlags::PRIMARY_CAPABLE)
        } else {
            self.flags.contains(AnimationFlags::SECONDARY_CAPABLE)
        }
    }

    /// Every animation this one can hand over to directly.
    pub fn successors(&self) -> Vec<AnimationId> {
        let mut out = Vec::new();
        if let Some(child) = &self.child {
            out.push(child.animation);
        }
        for transition in [&self.edge, &self.next].into_iter().flatten() {
            out.extend(transition.targets());
        }
        out
    }
}
