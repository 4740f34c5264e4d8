use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use super::host::{Host, LogLevel, SystemHost};
use super::mate::{Mate, MateContext, MateEffect, MateFlags, MateId};
use super::position::{Vec2, Viewport, DEFAULT_TILE_SIZE};
use crate::catalog::{AnimationFlags, AnimationId, Catalog, SoundId};

pub const MIN_SPEED_MULTIPLIER: f64 = 0.1;
pub const MAX_SPEED_MULTIPLIER: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniverseConfig {
    pub tile_size: f64,
    pub speed_multiplier: f64,
}

impl Default for UniverseConfig {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            speed_multiplier: 1.0,
        }
    }
}

/// Read-only projection of one enabled mate for painting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MateSnapshot {
    pub id: MateId,
    pub frame: u32,
    pub sound: Option<SoundId>,
    pub x: f64,
    pub y: f64,
    pub flags: MateFlags,
}

#[derive(Debug, Default)]
struct MateIdAllocator {
    next: u64,
}

impl MateIdAllocator {
    fn allocate(&mut self) -> MateId {
        let id = MateId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

/// One independent simulation: the viewport, the roster of mates and the
/// host capabilities they draw on. Slot 0 is the primary mate once started;
/// later slots are secondaries recycled through their disabled state.
pub struct Universe<H = SystemHost> {
    catalog: Arc<Catalog>,
    host: H,
    tile_size: f64,
    viewport: Viewport,
    speed_multiplier: f64,
    mates: Vec<Mate>,
    ids: MateIdAllocator,
}

impl<H: Host> Universe<H> {
    pub fn new(catalog: Arc<Catalog>, host: H, config: UniverseConfig) -> Self {
        let mut universe = Self {
            catalog,
            host,
            tile_size: config.tile_size,
            viewport: Viewport::default(),
            speed_multiplier: 1.0,
            mates: Vec::new(),
            ids: MateIdAllocator::default(),
        };
        universe.set_speed_multiplier(config.speed_multiplier);
        universe.measure();
        universe
    }

    pub fn width(&self) -> f64 {
        self.viewport.width
    }

    pub fn height(&self) -> f64 {
        self.viewport.height
    }

    pub fn tile_size(&self) -> f64 {
        self.viewport.tile_size
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn speed_multiplier(&self) -> f64 {
        self.speed_multiplier
    }

    pub fn set_speed_multiplier(&mut self, speed: f64) {
        self.speed_multiplier = if speed.is_finite() {
            speed.clamp(MIN_SPEED_MULTIPLIER, MAX_SPEED_MULTIPLIER)
        } else {
            1.0
        };
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn mates(&self) -> &[Mate] {
        &self.mates
    }

    pub fn current_animation(&self) -> Option<AnimationId> {
        self.mates.first().and_then(Mate::animation)
    }

    /// Switches the primary mate to `id`. Only animations marked for direct
    /// play are accepted; the switch also stops every secondary.
    pub fn set_current_animation(&mut self, id: AnimationId) {
        let direct = self
            .catalog
            .get(id)
            .is_some_and(|animation| animation.flags.contains(AnimationFlags::DIRECT_PLAY));
        if !direct {
            self.host.log(
                LogLevel::Warn,
                &format!("animation {id} cannot be played directly"),
            );
            return;
        }
        if self.mates.is_empty() {
            self.start();
        }
        let now = self.host.now();
        self.stop_secondaries();
        self.with_mate(0, now, |mate, ctx| mate.set_animation(ctx, Some(id), None));
    }

    pub fn start(&mut self) {
        self.stop();
        self.measure();
        let id = self.ids.allocate();
        self.mates.push(Mate::primary(id));
        let now = self.host.now();
        self.with_mate(0, now, |mate, ctx| mate.start(ctx));
        info!(
            width = self.viewport.width,
            height = self.viewport.height,
            tile_size = self.viewport.tile_size,
            animation = self.current_animation().map(|id| id.0),
            "universe_started"
        );
    }

    pub fn stop(&mut self) {
        for mate in &mut self.mates {
            mate.disable();
        }
        if !self.mates.is_empty() {
            debug!(mates = self.mates.len(), "universe_stopped");
        }
        self.mates.clear();
    }

    /// Ticks every mate once in roster order. Mates spawned during the pass
    /// are ticked by their spawn and skipped by the pass, whether they were
    /// appended or dropped into a recycled slot further along.
    pub fn advance(&mut self, now: f64, force: bool) {
        let count = self.mates.len();
        let mut spawned = HashSet::new();
        for index in 0..count {
            if spawned.contains(&index) {
                continue;
            }
            spawned.extend(self.with_mate(index, now, |mate, ctx| mate.tick(ctx, force)));
        }
    }

    pub fn advance_now(&mut self, force: bool) {
        let now = self.host.now();
        self.advance(now, force);
    }

    /// Re-measures the viewport and lets every mate adjust to it.
    pub fn resize(&mut self) {
        self.measure();
        let now = self.host.now();
        for index in 0..self.mates.len() {
            self.with_mate(index, now, |mate, ctx| mate.resize(ctx));
        }
    }

    pub fn drag_start(&mut self) {
        let now = self.host.now();
        self.with_mate(0, now, |mate, ctx| mate.drag_start(ctx));
    }

    pub fn drag(&mut self, position: Vec2) {
        if let Some(primary) = self.mates.first_mut() {
            primary.drag(position);
        }
    }

    pub fn drag_end(&mut self) {
        let now = self.host.now();
        self.with_mate(0, now, |mate, ctx| mate.drag_end(ctx));
    }

    pub fn is_dragging(&self) -> bool {
        self.mates.first().is_some_and(Mate::is_dragging)
    }

    pub fn snapshot(&self) -> Vec<MateSnapshot> {
        self.mates
            .iter()
            .filter(|mate| !mate.is_disabled())
            .map(|mate| MateSnapshot {
                id: mate.id(),
                frame: mate.frame(),
                sound: mate.sound().cloned(),
                x: mate.position().x(),
                y: mate.position().y(),
                flags: mate.flags(),
            })
            .collect()
    }

    fn measure(&mut self) {
        let measured = self.host.measure_viewport();
        self.viewport = Viewport::new(measured.width, measured.height, self.tile_size);
    }

    /// Runs `operation` on the mate at `index`, then applies the effects it
    /// raised, and any raised while applying them, in order. Returns the
    /// slots that received a spawned child.
    fn with_mate(
        &mut self,
        index: usize,
        now: f64,
        operation: impl FnOnce(&mut Mate, &mut MateContext<'_>),
    ) -> Vec<usize> {
        let mut effects = VecDeque::new();
        let mut spawned = Vec::new();
        {
            let Some(mate) = self.mates.get_mut(index) else {
                return spawned;
            };
            let mut ctx = MateContext {
                catalog: &self.catalog,
                viewport: self.viewport,
                speed_multiplier: self.speed_multiplier,
                host: &mut self.host,
                now,
                effects: &mut effects,
            };
            operation(mate, &mut ctx);
        }

        while let Some(effect) = effects.pop_front() {
            match effect {
                MateEffect::StopSecondaries => self.stop_secondaries(),
                MateEffect::SpawnChild {
                    animation,
                    position,
                    flipped_x,
                } => {
                    let slot = self.spawn_child(animation, position, flipped_x, now, &mut effects);
                    spawned.push(slot);
                }
            }
        }
        spawned
    }

    fn stop_secondaries(&mut self) {
        for mate in self.mates.iter_mut().skip(1) {
            mate.disable();
        }
    }

    fn spawn_child(
        &mut self,
        animation: AnimationId,
        position: Vec2,
        flipped_x: bool,
        now: f64,
        effects: &mut VecDeque<MateEffect>,
    ) -> usize {
        let id = self.ids.allocate();
        let recycled = self
            .mates
            .iter()
            .skip(1)
            .position(Mate::is_disabled)
            .map(|offset| offset + 1);
        let index = match recycled {
            Some(index) => {
                self.mates[index].reassign(id);
                index
            }
            None => {
                self.mates.push(Mate::secondary(id));
                self.mates.len() - 1
            }
        };

        let mate = &mut self.mates[index];
        mate.set_flipped_x(flipped_x);
        let mut ctx = MateContext {
            catalog: &self.catalog,
            viewport: self.viewport,
            speed_multiplier: self.speed_multiplier,
            host: &mut self.host,
            now,
            effects,
        };
        mate.set_animation(&mut ctx, Some(animation), Some(position));
        mate.tick(&mut ctx, true);
        debug!(
            mate = id.0,
            slot = index,
            animation = animation.0,
            recycled = recycled.is_some(),
            "mate_spawned"
        );
        index
    }
}
