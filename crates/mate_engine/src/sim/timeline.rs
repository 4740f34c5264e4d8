use std::sync::Arc;

use super::easing::{distribute, Easing};
use super::host::Host;
use super::position::{Vec2, Viewport};
use crate::catalog::{SceneData, SceneFlags, SceneSource, SoundId};

/// One tick's worth of animation data.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub scene_index: usize,
    /// Counter across every scene of the animation.
    pub step: usize,
    /// Only present on the first step of a scene that declares one.
    pub start: Option<Vec2>,
    pub frame: u32,
    pub movement: Option<Vec2>,
    pub sound: Option<SoundId>,
    pub flip_x: bool,
    pub flip_y: bool,
    pub flags: SceneFlags,
    pub duration_ms: f64,
    pub done: bool,
}

#[derive(Debug)]
struct ActiveScene {
    data: SceneData,
    size: usize,
    moves_x: Vec<f64>,
    moves_y: Vec<f64>,
    step_duration_ms: f64,
}

impl ActiveScene {
    fn new(data: SceneData) -> Self {
        let size = data.frames.size();
        let easing = if data.flags.contains(SceneFlags::EASE_OUT) {
            Easing::EaseOut
        } else if data.flags.contains(SceneFlags::EASE_IN) {
            Easing::EaseIn
        } else {
            Easing::Linear
        };
        let (moves_x, moves_y) = match data.movement {
            Some(movement) => (
                distribute(movement.x, size, easing),
                distribute(movement.y, size, easing),
            ),
            None => (Vec::new(), Vec::new()),
        };
        let step_duration_ms = f64::from(data.duration_ms) / size as f64;
        Self {
            data,
            size,
            moves_x,
            moves_y,
            step_duration_ms,
        }
    }

    fn movement(&self, index: usize) -> Option<Vec2> {
        self.data.movement?;
        Some(Vec2::new(
            self.moves_x.get(index).copied().unwrap_or_default(),
            self.moves_y.get(index).copied().unwrap_or_default(),
        ))
    }
}

/// Pull cursor over an animation's scenes.
///
/// Scenes are resolved one at a time as the cursor reaches them, so computed
/// scenes see the viewport of the moment they start. A finished timeline
/// stays finished; replaying needs a new one.
#[derive(Debug)]
pub struct SceneTimeline {
    scenes: Arc<[SceneSource]>,
    variable_duration: bool,
    scene_index: usize,
    step_in_scene: usize,
    step: usize,
    active: Option<ActiveScene>,
    finished: bool,
}

impl SceneTimeline {
    pub fn new(scenes: Arc<[SceneSource]>, variable_duration: bool) -> Self {
        Self {
            scenes,
            variable_duration,
            scene_index: 0,
            step_in_scene: 0,
            step: 0,
            active: None,
            finished: false,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn next_step(&mut self, viewport: &Viewport, host: &mut dyn Host) -> Option<Step> {
        if self.finished {
            return None;
        }
        if self.active.is_none() {
            let Some(source) = self.scenes.get(self.scene_index) else {
                self.finished = true;
                return None;
            };
            let mut data = source.resolve(viewport);
            if self.variable_duration {
                data = vary_duration(data, host);
            }
            self.active = Some(ActiveScene::new(data));
        }
        let active = self.active.as_ref()?;

        let index = self.step_in_scene;
        let last_in_scene = index + 1 >= active.size;
        let last_scene = self.scene_index + 1 >= self.scenes.len();
        let done = last_in_scene && last_scene;
        let flags = active.data.flags;

        let step = Step {
            scene_index: self.scene_index,
            step: self.step,
            start: if index == 0 { active.data.start } else { None },
            frame: active.data.frames.frame(index),
            movement: active.movement(index),
            sound: active
                .data
                .sound
                .as_ref()
                .filter(|cue| cue.at_step == index)
                .map(|cue| cue.sound.clone()),
            flip_x: last_in_scene && flags.contains(SceneFlags::FLIP_X_AFTER),
            flip_y: last_in_scene && flags.contains(SceneFlags::FLIP_Y_AFTER),
            flags,
            duration_ms: active.step_duration_ms,
            done,
        };

        self.step += 1;
        if last_in_scene {
            self.active = None;
            self.scene_index += 1;
            self.step_in_scene = 0;
        } else {
            self.step_in_scene += 1;
        }
        self.finished = done;
        Some(step)
    }

    /// Borrowing iterator over the remaining steps, for callers that hold
    /// the viewport and host for the whole walk.
    pub fn steps<'a>(&'a mut self, viewport: Viewport, host: &'a mut dyn Host) -> TimelineSteps<'a> {
        TimelineSteps {
            timeline: self,
            viewport,
            host,
        }
    }
}

pub struct TimelineSteps<'a> {
    timeline: &'a mut SceneTimeline,
    viewport: Viewport,
    host: &'a mut dyn Host,
}

impl Iterator for TimelineSteps<'_> {
    type Item = Step;

    fn next(&mut self) -> Option<Self::Item> {
        self.timeline.next_step(&self.viewport, &mut *self.host)
    }
}

/// Redraws the repeat count of a repeating scene in `[1, repeat]` and scales
/// its duration and movement by the change in size.
fn vary_duration(data: SceneData, host: &mut dyn Host) -> SceneData {
    let repeat = data.frames.repeat();
    if repeat == 0 {
        return data;
    }
    let old_size = data.frames.size() as f64;
    let frames = data
        .frames
        .with_repeat(host.random_int(repeat).min(repeat - 1) + 1);
    let factor = frames.size() as f64 / old_size;
    SceneData {
        duration_ms: (f64::from(data.duration_ms) * factor).round() as u32,
        movement: data.movement.map(|movement| movement.scaled(factor)),
        frames,
        ..data
    }
}
