use std::collections::VecDeque;
use std::fmt;

use serde::Serialize;
use tracing::debug;

use super::host::{Host, LogLevel};
use super::position::{Direction, Position, PositionFlags, Vec2, Viewport};
use super::timeline::{SceneTimeline, Step};
use crate::catalog::{AnimationFlags, AnimationId, Catalog, SceneFlags, SoundId};
use crate::flags::flag_set;

/// An `AllowExit` animation lets the mate walk off-screen once in this many
/// starts.
pub const MAY_EXIT_ONE_IN: u32 = 10;

flag_set! {
    pub struct MateFlags: u8 {
        const DISABLED = 0, "Disabled";
        const BACKGROUND = 1, "Background";
        const DRAGGING = 2, "Dragging";
        const FLIPPED_X = 3, "FlippedX";
        const FLIPPED_Y = 4, "FlippedY";
        const MAY_EXIT = 5, "MayExit";
        const PRIMARY = 6, "Primary";
        const SECONDARY = 7, "Secondary";
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct MateId(pub u64);

impl fmt::Display for MateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mate-{}", self.0)
    }
}

/// Cross-mate work a mate asks its universe to carry out.
#[derive(Debug, Clone, PartialEq)]
pub enum MateEffect {
    SpawnChild {
        animation: AnimationId,
        position: Vec2,
        flipped_x: bool,
    },
    StopSecondaries,
}

/// Everything a mate borrows from its universe for one operation.
pub(crate) struct MateContext<'a> {
    pub catalog: &'a Catalog,
    pub viewport: Viewport,
    pub speed_multiplier: f64,
    pub host: &'a mut dyn Host,
    pub now: f64,
    pub effects: &'a mut VecDeque<MateEffect>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Pending {
    due: f64,
    next: bool,
    flip_x: bool,
    flip_y: bool,
}

#[derive(Debug)]
pub struct Mate {
    id: MateId,
    animation: Option<AnimationId>,
    flags: MateFlags,
    frame: u32,
    sound: Option<SoundId>,
    position: Position,
    pending: Pending,
    timeline: Option<SceneTimeline>,
    last_step_flags: SceneFlags,
}

impl Mate {
    pub(crate) fn primary(id: MateId) -> Self {
        Self::with_role(id, MateFlags::PRIMARY)
    }

    pub(crate) fn secondary(id: MateId) -> Self {
        Self::with_role(id, MateFlags::SECONDARY)
    }

    fn with_role(id: MateId, role: MateFlags) -> Self {
        Self {
            id,
            animation: None,
            flags: role | MateFlags::DISABLED,
            frame: 0,
            sound: None,
            position: Position::default(),
            pending: Pending::default(),
            timeline: None,
            last_step_flags: SceneFlags::empty(),
        }
    }

    pub fn id(&self) -> MateId {
        self.id
    }

    pub fn animation(&self) -> Option<AnimationId> {
        self.animation
    }

    pub fn flags(&self) -> MateFlags {
        self.flags
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn sound(&self) -> Option<&SoundId> {
        self.sound.as_ref()
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn is_primary(&self) -> bool {
        self.flags.contains(MateFlags::PRIMARY)
    }

    pub fn is_disabled(&self) -> bool {
        self.flags.contains(MateFlags::DISABLED)
    }

    pub fn is_dragging(&self) -> bool {
        self.flags.contains(MateFlags::DRAGGING)
    }

    /// Clock value at which the next step is due.
    pub fn due(&self) -> f64 {
        self.pending.due
    }

    /// Reuses a disabled secondary slot for a new occupant.
    pub(crate) fn reassign(&mut self, id: MateId) {
        *self = Self::secondary(id);
    }

    pub(crate) fn disable(&mut self) {
        if !self.is_disabled() {
            debug!(mate = self.id.0, "mate_disabled");
        }
        self.flags.insert(MateFlags::DISABLED);
        self.animation = None;
        self.timeline = None;
        self.sound = None;
        self.pending = Pending::default();
    }

    pub(crate) fn start(&mut self, ctx: &mut MateContext<'_>) {
        if !self.is_primary() {
            return;
        }
        self.flags.remove(
            MateFlags::FLIPPED_X | MateFlags::FLIPPED_Y | MateFlags::DRAGGING | MateFlags::MAY_EXIT,
        );
        let catalog = ctx.catalog;
        let choice = catalog.first_choice().choose(ctx.host);
        if choice == Some(catalog.falling()) {
            let x = ctx.host.random_int(ctx.viewport.max_x() as u32);
            self.position.move_by(Vec2::new(f64::from(x), 0.0), true);
        }
        self.set_animation(ctx, choice, None);
    }

    pub(crate) fn set_animation(
        &mut self,
        ctx: &mut MateContext<'_>,
        id: Option<AnimationId>,
        position: Option<Vec2>,
    ) {
        let catalog = ctx.catalog;
        let primary = self.is_primary();
        let animation = match id.and_then(|id| catalog.get(id)) {
            Some(animation) => animation,
            None if primary => {
                let requested = id.map_or_else(|| "none".to_string(), |id| id.to_string());
                ctx.host.log(
                    LogLevel::Error,
                    &format!(
                        "{} has no animation {requested}; using fallback {}",
                        self.id,
                        catalog.fallback()
                    ),
                );
                match catalog.get(catalog.fallback()) {
                    Some(animation) => animation,
                    None => {
                        self.disable();
                        return;
                    }
                }
            }
            None => {
                self.disable();
                return;
            }
        };

        if !animation.is_capable(primary) {
            let role = if primary { "primary" } else { "secondary" };
            ctx.host.log(
                LogLevel::Error,
                &format!(
                    "animation {} ({}) cannot play on {role} {}",
                    animation.id, animation.name, self.id
                ),
            );
            self.disable();
            return;
        }

        if let Some(position) = position {
            self.position.move_by(position, true);
        }
        if animation.flags.contains(AnimationFlags::FALLING) {
            ctx.effects.push_back(MateEffect::StopSecondaries);
            let clamped = ctx.viewport.clamp_x(self.position.x());
            if clamped != self.position.x() {
                self.position.snap_x(clamped);
            }
        }
        if animation.flags.contains(AnimationFlags::ALLOW_EXIT)
            && !self.flags.contains(MateFlags::MAY_EXIT)
            && ctx.host.random_int(MAY_EXIT_ONE_IN) == 0
        {
            self.flags.insert(MateFlags::MAY_EXIT);
        }
        self.flags.set(
            MateFlags::BACKGROUND,
            animation.flags.contains(AnimationFlags::BACKGROUND),
        );
        self.flags.remove(MateFlags::DISABLED);
        self.animation = Some(animation.id);
        self.timeline = Some(SceneTimeline::new(
            animation.scenes.clone(),
            animation.flags.contains(AnimationFlags::VARIABLE_DURATION),
        ));
        self.pending = Pending {
            due: ctx.now,
            ..Pending::default()
        };
        debug!(
            mate = self.id.0,
            animation = animation.id.0,
            name = %animation.name,
            x = self.position.x(),
            y = self.position.y(),
            "mate_transition"
        );

        if let Some(child) = animation.child {
            let flipped_x = self.flags.contains(MateFlags::FLIPPED_X);
            ctx.effects.push_back(MateEffect::SpawnChild {
                animation: child.animation,
                position: child
                    .placement
                    .place(self.position.coords(), flipped_x, &ctx.viewport),
                flipped_x,
            });
        }
    }

    pub(crate) fn set_flipped_x(&mut self, flipped: bool) {
        self.flags.set(MateFlags::FLIPPED_X, flipped);
    }

    pub(crate) fn tick(&mut self, ctx: &mut MateContext<'_>, force: bool) {
        if self.is_disabled() || (!force && ctx.now < self.pending.due) {
            return;
        }

        if self.pending.next {
            if self.pending.flip_x {
                self.flags.toggle(MateFlags::FLIPPED_X);
            }
            if self.pending.flip_y {
                self.flags.toggle(MateFlags::FLIPPED_Y);
            }
            let next = self.next_animation(ctx, false);
            self.set_animation(ctx, next, None);
            if self.is_disabled() {
                return;
            }
        }

        let step = match self.timeline.as_mut() {
            Some(timeline) => timeline.next_step(&ctx.viewport, &mut *ctx.host),
            None => None,
        };
        let Some(step) = step else {
            self.pending.next = true;
            return;
        };
        self.apply_step(ctx, step);
    }

    fn apply_step(&mut self, ctx: &mut MateContext<'_>, step: Step) {
        self.frame = step.frame;
        self.sound = step.sound.clone();
        self.last_step_flags = step.flags;

        if let Some(start) = step.start.filter(|_| step.step == 0) {
            self.position.move_by(start, true);
            self.flags.remove(MateFlags::FLIPPED_X | MateFlags::FLIPPED_Y);
        }
        if let Some(movement) = step.movement {
            let movement = if self.flags.contains(MateFlags::FLIPPED_X) {
                Vec2::new(-movement.x, movement.y)
            } else {
                movement
            };
            self.position.move_by(movement, false);
        }

        if !self.is_dragging() && !step.flags.contains(SceneFlags::IGNORE_EDGES) {
            let viewport = ctx.viewport;
            if step.flags.contains(SceneFlags::GRAVITY) && !self.position.is_on_floor(&viewport) {
                if self.is_primary() {
                    let falling = ctx.catalog.falling();
                    self.set_animation(ctx, Some(falling), None);
                } else {
                    self.disable();
                }
                return;
            }
            if self.correct_edges(&viewport, step.flags) {
                let next = self.next_animation(ctx, true);
                self.set_animation(ctx, next, None);
                return;
            }
        }

        if step.flip_x || step.flip_y {
            if step.done {
                self.pending.flip_x = step.flip_x;
                self.pending.flip_y = step.flip_y;
            } else {
                if step.flip_x {
                    self.flags.toggle(MateFlags::FLIPPED_X);
                }
                if step.flip_y {
                    self.flags.toggle(MateFlags::FLIPPED_Y);
                }
            }
        }
        if step.done {
            self.pending.next = true;
        }

        let step_ms = step.duration_ms / ctx.speed_multiplier;
        let base = if ctx.now - self.pending.due > step_ms {
            ctx.now
        } else {
            self.pending.due
        };
        self.pending.due = base + step_ms;
    }

    /// Snaps the position back inside the viewport on every edge the last
    /// move pushed into. Returns whether an edge transition is owed.
    fn correct_edges(&mut self, viewport: &Viewport, scene_flags: SceneFlags) -> bool {
        let flags = self.position.flags(viewport);
        let mut hit = false;

        if !self.flags.contains(MateFlags::MAY_EXIT) {
            if flags.contains(PositionFlags::LEFT_EDGE) && self.position.x_dir() == Direction::Left {
                self.position.snap_x(0.0);
                hit = true;
            } else if flags.contains(PositionFlags::RIGHT_EDGE)
                && self.position.x_dir() == Direction::Right
            {
                self.position.snap_x(viewport.max_x());
                hit = true;
            }
        }

        if flags.contains(PositionFlags::TOP_EDGE) && self.position.y_dir() == Direction::Up {
            self.position.snap_y(0.0);
            hit = true;
        } else if flags.contains(PositionFlags::BOTTOM_EDGE)
            && self.position.y_dir() == Direction::Down
        {
            self.position.snap_y(viewport.floor_y());
            if !scene_flags.contains(SceneFlags::GRAVITY) {
                hit = true;
            }
        }
        hit
    }

    pub(crate) fn next_animation(
        &mut self,
        ctx: &mut MateContext<'_>,
        want_edge: bool,
    ) -> Option<AnimationId> {
        let catalog = ctx.catalog;
        let primary = self.is_primary();
        let Some(animation) = self.animation.and_then(|id| catalog.get(id)) else {
            return primary
                .then(|| catalog.default_choice().choose(ctx.host))
                .flatten();
        };

        if want_edge {
            return match &animation.edge {
                Some(edge) => edge.resolve(ctx.host),
                None if primary => catalog.default_choice().choose(ctx.host),
                None => None,
            };
        }

        if !self.position.is_visible(&ctx.viewport, true) {
            if !primary {
                return None;
            }
            self.flags.remove(MateFlags::MAY_EXIT);
            return catalog.entrance_choice().choose(ctx.host);
        }

        let x = self.position.x();
        if self.flags.contains(MateFlags::MAY_EXIT) && (x < 0.0 || x > ctx.viewport.max_x()) {
            return Some(animation.id);
        }

        match &animation.next {
            Some(next) => next.resolve(ctx.host),
            None if primary => catalog.default_choice().choose(ctx.host),
            None => None,
        }
    }

    pub(crate) fn resize(&mut self, ctx: &mut MateContext<'_>) {
        if self.is_disabled() {
            return;
        }
        let viewport = ctx.viewport;
        if !self.position.is_visible(&viewport, true) {
            if self.is_primary() {
                ctx.effects.push_back(MateEffect::StopSecondaries);
                self.start(ctx);
            } else {
                self.disable();
            }
            return;
        }
        if self.is_dragging() {
            return;
        }

        let floor = viewport.floor_y();
        let y = self.position.y();
        let gravity = self.last_step_flags.contains(SceneFlags::GRAVITY);
        if y > floor || (gravity && y < floor) {
            self.position.snap_y(floor);
        }

        let wall = self
            .animation
            .and_then(|id| ctx.catalog.get(id))
            .and_then(|animation| animation.wall);
        if let Some(wall) = wall {
            let flipped = self.flags.contains(MateFlags::FLIPPED_X);
            self.position.snap_x(wall.mirrored(flipped).x(&viewport));
        }
    }

    pub(crate) fn drag_start(&mut self, ctx: &mut MateContext<'_>) {
        if !self.is_primary() || self.is_dragging() {
            return;
        }
        self.flags.insert(MateFlags::DRAGGING);
        let dragging = ctx.catalog.dragging();
        self.set_animation(ctx, Some(dragging), None);
    }

    pub(crate) fn drag(&mut self, position: Vec2) {
        if self.is_dragging() {
            self.position.move_by(position, true);
        }
    }

    pub(crate) fn drag_end(&mut self, ctx: &mut MateContext<'_>) {
        if !self.is_dragging() {
            return;
        }
        self.flags.remove(MateFlags::DRAGGING);
        let falling = ctx.catalog.falling();
        self.set_animation(ctx, Some(falling), None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Animation, SceneData, SceneSource, Transition, Wall};
    use crate::sim::frames::FrameList;
    use crate::sim::host::ScriptedHost;

    fn viewport() -> Viewport {
        Viewport::new(200.0, 100.0, 10.0)
    }

    fn scene(frames: Vec<u32>, repeat: u32, flags: SceneFlags) -> SceneSource {
        SceneSource::Static(
            SceneData::new(FrameList::new(frames, repeat, 0).expect("frames"), 100)
                .with_flags(flags),
        )
    }

    fn catalog() -> Catalog {
        let primary = AnimationFlags::PRIMARY_CAPABLE;
        let stand = Animation::new(
            AnimationId(1),
            "stand",
            vec![scene(vec![1], 1, SceneFlags::GRAVITY)],
        )
        .with_flags(
            primary
                | AnimationFlags::DEFAULT_CHOICE
                | AnimationFlags::FIRST_CHOICE
                | AnimationFlags::ENTRANCE_CHOICE,
        );
        let fall = Animation::new(AnimationId(2), "fall", vec![scene(vec![2], 0, SceneFlags::empty())])
            .with_flags(primary | AnimationFlags::FALLING)
            .with_next(Transition::Fixed(AnimationId(2)));
        let drag = Animation::new(
            AnimationId(3),
            "drag",
            vec![scene(vec![3], 0, SceneFlags::IGNORE_EDGES)],
        )
        .with_flags(primary | AnimationFlags::DRAGGING);
        let turn = Animation::new(
            AnimationId(4),
            "turn",
            vec![scene(vec![4], 1, SceneFlags::GRAVITY | SceneFlags::FLIP_X_AFTER)],
        )
        .with_flags(primary)
        .with_next(Transition::Fixed(AnimationId(1)));
        let climb = Animation::new(AnimationId(5), "climb", vec![scene(vec![5], 0, SceneFlags::empty())])
            .with_flags(primary | AnimationFlags::BACKGROUND)
            .with_wall(Wall::Left);
        let spark = Animation::new(AnimationId(6), "spark", vec![scene(vec![6], 0, SceneFlags::empty())])
            .with_flags(AnimationFlags::SECONDARY_CAPABLE);
        let wander = Animation::new(AnimationId(7), "wander", vec![scene(vec![7], 0, SceneFlags::empty())])
            .with_flags(primary | AnimationFlags::ALLOW_EXIT);
        Catalog::new(vec![stand, fall, drag, turn, climb, spark, wander], AnimationId(1))
            .expect("catalog")
    }

    struct Fixture {
        catalog: Catalog,
        host: ScriptedHost,
        effects: VecDeque<MateEffect>,
        now: f64,
    }

    impl Fixture {
        fn new(script: Vec<u32>) -> Self {
            Self {
                catalog: catalog(),
                host: ScriptedHost::new(script, viewport()),
                effects: VecDeque::new(),
                now: 0.0,
            }
        }

        fn ctx(&mut self) -> MateContext<'_> {
            MateContext {
                catalog: &self.catalog,
                viewport: viewport(),
                speed_multiplier: 1.0,
                host: &mut self.host,
                now: self.now,
                effects: &mut self.effects,
            }
        }
    }

    fn floor_mate(fixture: &mut Fixture, animation: u16) -> Mate {
        let mut mate = Mate::primary(MateId(0));
        let floor = viewport().floor_y();
        mate.set_animation(
            &mut fixture.ctx(),
            Some(AnimationId(animation)),
            Some(Vec2::new(50.0, floor)),
        );
        mate
    }

    #[test]
    fn new_mates_start_disabled() {
        let mate = Mate::secondary(MateId(4));
        assert!(mate.is_disabled());
        assert!(!mate.is_primary());
        assert!(mate.animation().is_none());
    }

    #[test]
    fn unknown_animation_falls_back_for_primary_and_disables_secondary() {
        let mut fixture = Fixture::new(vec![0]);
        let mut primary = Mate::primary(MateId(0));
        primary.set_animation(&mut fixture.ctx(), Some(AnimationId(99)), None);
        assert_eq!(primary.animation(), Some(AnimationId(1)));
        assert_eq!(
            fixture.host.logged().map(|(level, _)| level).collect::<Vec<_>>(),
            vec![LogLevel::Error]
        );

        let mut secondary = Mate::secondary(MateId(1));
        secondary.set_animation(&mut fixture.ctx(), Some(AnimationId(6)), None);
        assert_eq!(secondary.animation(), Some(AnimationId(6)));
        secondary.set_animation(&mut fixture.ctx(), Some(AnimationId(99)), None);
        assert!(secondary.is_disabled());
        assert_eq!(fixture.host.logged().count(), 1);
    }

    #[test]
    fn role_mismatch_disables_with_error() {
        let mut fixture = Fixture::new(vec![0]);
        let mut secondary = Mate::secondary(MateId(1));
        secondary.set_animation(&mut fixture.ctx(), Some(AnimationId(1)), None);
        assert!(secondary.is_disabled());
        assert!(fixture
            .host
            .logged()
            .any(|(level, message)| level == LogLevel::Error && message.contains("cannot play")));
    }

    #[test]
    fn gravity_step_off_floor_switches_primary_to_falling() {
        let mut fixture = Fixture::new(vec![0]);
        let mut mate = Mate::primary(MateId(0));
        mate.set_animation(
            &mut fixture.ctx(),
            Some(AnimationId(1)),
            Some(Vec2::new(50.0, 10.0)),
        );
        mate.tick(&mut fixture.ctx(), false);
        assert_eq!(mate.animation(), Some(AnimationId(2)));
        assert_eq!(fixture.effects.pop_front(), Some(MateEffect::StopSecondaries));
    }

    #[test]
    fn gravity_step_off_floor_stops_secondary() {
        let mut fixture = Fixture::new(vec![0]);
        let mut mate = Mate::secondary(MateId(1));
        let gravity_spark = scene(vec![6], 0, SceneFlags::GRAVITY);
        let mut animations = fixture.catalog.animations().to_vec();
        animations[5].scenes = vec![gravity_spark].into();
        fixture.catalog = Catalog::new(animations, AnimationId(1)).expect("catalog");
        mate.set_animation(
            &mut fixture.ctx(),
            Some(AnimationId(6)),
            Some(Vec2::new(50.0, 10.0)),
        );
        mate.tick(&mut fixture.ctx(), false);
        assert!(mate.is_disabled());
    }

    #[test]
    fn ticks_wait_for_due_time_unless_forced() {
        let mut fixture = Fixture::new(vec![0]);
        let mut mate = floor_mate(&mut fixture, 1);
        mate.tick(&mut fixture.ctx(), false);
        assert_eq!(mate.due(), 50.0);

        fixture.now = 20.0;
        mate.tick(&mut fixture.ctx(), false);
        assert_eq!(mate.due(), 50.0);
        mate.tick(&mut fixture.ctx(), true);
        assert_eq!(mate.due(), 100.0);
    }

    #[test]
    fn deferred_flip_applies_with_next_animation() {
        let mut fixture = Fixture::new(vec![0]);
        let mut mate = floor_mate(&mut fixture, 4);
        mate.tick(&mut fixture.ctx(), true);
        assert!(!mate.flags().contains(MateFlags::FLIPPED_X));
        mate.tick(&mut fixture.ctx(), true);
        assert!(!mate.flags().contains(MateFlags::FLIPPED_X));
        assert_eq!(mate.animation(), Some(AnimationId(4)));

        mate.tick(&mut fixture.ctx(), true);
        assert!(mate.flags().contains(MateFlags::FLIPPED_X));
        assert_eq!(mate.animation(), Some(AnimationId(1)));
    }

    #[test]
    fn edge_without_edge_entry_uses_default_choice_for_primary() {
        let mut fixture = Fixture::new(vec![0]);
        let mut mate = floor_mate(&mut fixture, 4);
        assert_eq!(
            mate.next_animation(&mut fixture.ctx(), true),
            Some(AnimationId(1))
        );
    }

    #[test]
    fn invisible_primary_draws_entrance_and_clears_may_exit() {
        let mut fixture = Fixture::new(vec![0]);
        let mut mate = floor_mate(&mut fixture, 1);
        mate.flags.insert(MateFlags::MAY_EXIT);
        mate.position.move_by(Vec2::new(-100.0, 90.0), true);
        assert_eq!(
            mate.next_animation(&mut fixture.ctx(), false),
            Some(AnimationId(1))
        );
        assert!(!mate.flags().contains(MateFlags::MAY_EXIT));
    }

    #[test]
    fn exiting_mate_keeps_its_animation_past_the_bound() {
        let mut fixture = Fixture::new(vec![0]);
        let mut mate = floor_mate(&mut fixture, 4);
        mate.flags.insert(MateFlags::MAY_EXIT);
        mate.position.move_by(Vec2::new(-5.0, 90.0), true);
        assert_eq!(
            mate.next_animation(&mut fixture.ctx(), false),
            Some(AnimationId(4))
        );
    }

    #[test]
    fn resize_reglues_wall_animation_and_snaps_floor() {
        let mut fixture = Fixture::new(vec![0]);
        let mut mate = floor_mate(&mut fixture, 5);
        mate.set_flipped_x(true);
        // partially visible, below the floor
        mate.position.move_by(Vec2::new(40.0, 95.0), true);
        mate.resize(&mut fixture.ctx());
        assert_eq!(mate.position().coords(), Vec2::new(190.0, 90.0));
    }

    #[test]
    fn resize_restart_stops_secondaries_first() {
        let mut fixture = Fixture::new(vec![0]);
        let mut mate = floor_mate(&mut fixture, 4);
        mate.position.move_by(Vec2::new(-100.0, 90.0), true);
        mate.resize(&mut fixture.ctx());
        assert_eq!(mate.animation(), Some(AnimationId(1)));
        assert_eq!(fixture.effects.pop_front(), Some(MateEffect::StopSecondaries));
    }

    #[test]
    fn falling_clamps_primary_back_inside_horizontally() {
        let mut fixture = Fixture::new(vec![0]);
        let mut mate = floor_mate(&mut fixture, 1);
        mate.drag_start(&mut fixture.ctx());
        mate.drag(Vec2::new(-50.0, 20.0));
        mate.drag_end(&mut fixture.ctx());
        assert_eq!(mate.animation(), Some(AnimationId(2)));
        assert_eq!(mate.position().coords(), Vec2::new(0.0, 20.0));
        assert_eq!(fixture.effects.pop_front(), Some(MateEffect::StopSecondaries));

        mate.drag_start(&mut fixture.ctx());
        mate.drag(Vec2::new(500.0, 20.0));
        mate.drag_end(&mut fixture.ctx());
        assert_eq!(mate.position().x(), viewport().max_x());
    }

    #[test]
    fn background_flag_follows_the_animation() {
        let mut fixture = Fixture::new(vec![0]);
        let mut mate = floor_mate(&mut fixture, 5);
        assert!(mate.flags().contains(MateFlags::BACKGROUND));

        mate.set_animation(&mut fixture.ctx(), Some(AnimationId(1)), None);
        assert!(!mate.flags().contains(MateFlags::BACKGROUND));
    }

    #[test]
    fn may_exit_is_rolled_only_while_unset() {
        let mut fixture = Fixture::new(vec![0]);
        let mut mate = floor_mate(&mut fixture, 7);
        assert!(mate.flags().contains(MateFlags::MAY_EXIT));
        let taken = fixture.host.draws_taken();
        assert_eq!(taken, 1);

        mate.set_animation(&mut fixture.ctx(), Some(AnimationId(7)), None);
        assert_eq!(fixture.host.draws_taken(), taken);
        assert!(mate.flags().contains(MateFlags::MAY_EXIT));

        mate.set_animation(&mut fixture.ctx(), Some(AnimationId(1)), None);
        assert!(mate.flags().contains(MateFlags::MAY_EXIT));
    }

    #[test]
    fn drag_cycle_switches_roles() {
        let mut fixture = Fixture::new(vec![0]);
        let mut mate = floor_mate(&mut fixture, 1);
        mate.drag_start(&mut fixture.ctx());
        assert!(mate.is_dragging());
        assert_eq!(mate.animation(), Some(AnimationId(3)));

        mate.drag(Vec2::new(30.0, 20.0));
        mate.drag(Vec2::new(f64::NAN, 1.0));
        assert_eq!(mate.position().coords(), Vec2::new(30.0, 20.0));

        mate.drag_end(&mut fixture.ctx());
        assert!(!mate.is_dragging());
        assert_eq!(mate.animation(), Some(AnimationId(2)));
    }
}
