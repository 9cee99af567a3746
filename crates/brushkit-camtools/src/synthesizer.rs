//! Motion synthesis with paint replenishment
//!
//! Turns an ordered list of strokes into machine instructions. The brush
//! holds a limited amount of paint, modeled as a painted-distance budget
//! drawn uniformly from `[min_distance, max_distance]`. Before a move would
//! overrun the budget the brush is lifted, sent to the replenishment station
//! for a dip, agitated in a spiral, wiped and brought to the point it was
//! about to paint. The segment that triggered the cycle is charged to the
//! fresh budget.
//!
//! ## Replenishment cycle
//!
//! 1. Raise to the low clearance height, switch to travel speed
//! 2. Rapid to a jittered point near the station at the high clearance height
//! 3. Plunge to the dip height and spiral outward
//! 4. Rise to the wipe exit height and cross to the wipe point, which lies
//!    `wipe_radius` from the station toward the next target
//! 5. Rise to the high clearance height, rapid to the target at low clearance
//! 6. Reset the painted distance and draw a new budget
//!
//! Strokes are entered from whichever end is closer to the brush. The first
//! stroke of a layer is entered at its own first point, where the initial
//! cycle leaves the brush.

use crate::infill::ShellStats;
use brushkit_core::{
    GeometryDegenerate, Instruction, InstructionStream, Move, Path, Point, REPLENISHMENT_MARKER,
};
use brushkit_settings::{DipSettings, LayerConfig};
use rand::Rng;
use std::f64::consts::FRAC_PI_2;

/// What the brush is currently doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SynthesisPhase {
    #[default]
    Traveling,
    Replenishing,
    Painting,
}

/// Mutable machine state threaded through one layer's synthesis
#[derive(Debug, Clone)]
pub struct MachineState<R: Rng> {
    /// Last commanded XY position
    pub position: Point,
    /// Painted distance since the last replenishment (mm)
    pub distance_since_replenish: f64,
    /// Current paint budget (mm)
    pub threshold: f64,
    pub phase: SynthesisPhase,
    rng: R,
}

impl<R: Rng> MachineState<R> {
    /// Fresh state at `start`; draws the first budget from `rng`
    pub fn new(start: Point, dip: &DipSettings, mut rng: R) -> Self {
        let threshold = draw_threshold(&mut rng, dip);
        Self {
            position: start,
            distance_since_replenish: 0.0,
            threshold,
            phase: SynthesisPhase::Traveling,
            rng,
        }
    }

    /// Keep position and paint budget but continue with another random source
    pub fn with_rng<R2: Rng>(self, rng: R2) -> MachineState<R2> {
        MachineState {
            position: self.position,
            distance_since_replenish: self.distance_since_replenish,
            threshold: self.threshold,
            phase: SynthesisPhase::Traveling,
            rng,
        }
    }
}

fn draw_threshold<R: Rng>(rng: &mut R, dip: &DipSettings) -> f64 {
    if dip.max_distance > dip.min_distance {
        rng.gen_range(dip.min_distance..=dip.max_distance)
    } else {
        dip.min_distance
    }
}

fn jitter<R: Rng>(rng: &mut R, radius: f64) -> f64 {
    if radius > 0.0 {
        rng.gen_range(-radius..=radius)
    } else {
        0.0
    }
}

fn xy(p: Point) -> Move {
    Move::xy(p.x, p.y)
}

/// One replenishment cycle as seen by the budget check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplenishmentRecord {
    /// Painted distance when the cycle was triggered
    pub accumulated: f64,
    /// Length of the move that would have overrun the budget
    pub increment: f64,
    /// Budget in force when the cycle was triggered
    pub threshold: f64,
    /// Where the brush returned to
    pub target: Point,
    /// The cycle that loads the brush before a layer's first stroke
    pub initial: bool,
}

/// Per-layer synthesis report
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayerSummary {
    pub label: String,
    pub path_count: usize,
    /// Distance charged against the paint budget (mm)
    pub paint_distance: f64,
    /// Length of all brush-up XY moves, station visits included (mm)
    pub travel_distance: f64,
    /// Share of the working mask that carried ink, 0-100
    pub coverage_percent: f64,
    /// Concentric extraction counters
    pub shells: Option<ShellStats>,
    pub replenishments: Vec<ReplenishmentRecord>,
    pub degenerate: Vec<GeometryDegenerate>,
}

impl LayerSummary {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    /// Record a degenerate condition once
    pub fn note(&mut self, condition: GeometryDegenerate) {
        if !self.degenerate.contains(&condition) {
            self.degenerate.push(condition);
        }
    }

    pub fn replenishment_count(&self) -> usize {
        self.replenishments.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MotionMode {
    Travel,
    Paint,
}

/// Emits instructions for one layer
#[derive(Debug, Clone, Copy)]
pub struct MotionSynthesizer<'a> {
    config: &'a LayerConfig,
}

impl<'a> MotionSynthesizer<'a> {
    pub fn new(config: &'a LayerConfig) -> Self {
        Self { config }
    }

    /// Orient a stroke so that it starts at the end closer to `from`
    pub fn orient(path: Path, from: Point) -> Path {
        if from.distance_to(&path.last()) < from.distance_to(&path.first()) {
            path.reversed()
        } else {
            path
        }
    }

    /// Paint `paths` in order, appending to `out`
    pub fn synthesize<R: Rng>(
        &self,
        paths: Vec<Path>,
        state: &mut MachineState<R>,
        out: &mut InstructionStream,
    ) -> LayerSummary {
        let mut summary = LayerSummary::new(self.config.label());
        summary.path_count = paths.len();

        if paths.is_empty() {
            summary.note(GeometryDegenerate::NoPaths);
            return summary;
        }

        // the brush starts every layer dry
        self.replenish(state, paths[0].first(), out, &mut summary, None);

        for path in paths {
            let path = Self::orient(path, state.position);
            self.paint_path(&path, state, out, &mut summary);
        }

        tracing::debug!(
            "{}: {} strokes, {:.1} mm painted, {:.1} mm travel, {} replenishments",
            summary.label,
            summary.path_count,
            summary.paint_distance,
            summary.travel_distance,
            summary.replenishment_count()
        );
        summary
    }

    fn paint_path<R: Rng>(
        &self,
        path: &Path,
        state: &mut MachineState<R>,
        out: &mut InstructionStream,
        summary: &mut LayerSummary,
    ) {
        let cfg = self.config;
        let entry = path.first();

        // reload before the approach rather than after the plunge
        let first_step = entry.distance_to(&path.points()[1]);
        if self.budget_exceeded(state, first_step) {
            let record = self.trigger_record(state, first_step, entry);
            self.replenish(state, entry, out, summary, Some(record));
        }

        state.phase = SynthesisPhase::Traveling;
        self.set_motion_mode(MotionMode::Travel, out);
        out.push(Instruction::Rapid(xy(entry).with_z(cfg.z.low)));
        self.travel_to(state, entry, summary);

        self.set_motion_mode(MotionMode::Paint, out);
        out.push(Instruction::Linear(Move::z(cfg.z.paint).with_feed(cfg.feeds.plunge)));
        state.phase = SynthesisPhase::Painting;

        for &point in &path.points()[1..] {
            let step = state.position.distance_to(&point);

            if self.budget_exceeded(state, step) {
                let record = self.trigger_record(state, step, point);
                self.replenish(state, point, out, summary, Some(record));

                self.set_motion_mode(MotionMode::Paint, out);
                out.push(Instruction::Linear(Move::z(cfg.z.paint).with_feed(cfg.feeds.plunge)));
                state.phase = SynthesisPhase::Painting;
            }

            out.push(Instruction::Linear(xy(point)));
            state.distance_since_replenish += step;
            summary.paint_distance += step;
            state.position = point;
        }

        out.push(Instruction::Rapid(Move::z(cfg.z.low).with_feed(cfg.feeds.z)));
        state.phase = SynthesisPhase::Traveling;
    }

    /// A loaded brush never reloads before painting anything
    fn budget_exceeded<R: Rng>(&self, state: &MachineState<R>, step: f64) -> bool {
        state.distance_since_replenish > 0.0
            && state.distance_since_replenish + step > state.threshold
    }

    fn trigger_record<R: Rng>(
        &self,
        state: &MachineState<R>,
        step: f64,
        target: Point,
    ) -> ReplenishmentRecord {
        ReplenishmentRecord {
            accumulated: state.distance_since_replenish,
            increment: step,
            threshold: state.threshold,
            target,
            initial: false,
        }
    }

    /// Dip, agitate and wipe, then return to `target` at low clearance.
    ///
    /// `record` is `None` for the cycle that precedes a layer's first stroke.
    fn replenish<R: Rng>(
        &self,
        state: &mut MachineState<R>,
        target: Point,
        out: &mut InstructionStream,
        summary: &mut LayerSummary,
        record: Option<ReplenishmentRecord>,
    ) {
        let cfg = self.config;
        state.phase = SynthesisPhase::Replenishing;

        out.blank();
        out.comment(REPLENISHMENT_MARKER);
        out.push(Instruction::Rapid(Move::z(cfg.z.low).with_feed(cfg.feeds.z)));
        self.set_motion_mode(MotionMode::Travel, out);

        let dip_at = Point::new(
            cfg.station.x + jitter(&mut state.rng, cfg.dip.jitter_radius),
            cfg.station.y + jitter(&mut state.rng, cfg.dip.jitter_radius),
        );
        out.push(Instruction::Rapid(xy(dip_at).with_z(cfg.z.high)));
        self.travel_to(state, dip_at, summary);
        out.push(Instruction::Linear(Move::z(cfg.z.dip).with_feed(cfg.feeds.z)));

        // quarter turn per step, radius growing linearly to the full value
        let steps = (cfg.dip.spiral_loops * 4.0).floor().max(0.0) as usize;
        if steps > 0 {
            for i in 0..=steps {
                let r = i as f64 / steps as f64 * cfg.dip.spiral_radius;
                let (sin, cos) = (i as f64 * FRAC_PI_2).sin_cos();
                let p = Point::new(dip_at.x + r * cos, dip_at.y + r * sin);
                out.push(Instruction::Linear(xy(p).with_feed(cfg.feeds.spiral)));
                self.travel_to(state, p, summary);
            }
        }

        let wipe = self.wipe_point(target).unwrap_or_else(|| {
            summary.note(GeometryDegenerate::CoincidentWipeTarget);
            Point::new(cfg.station.x + cfg.dip.wipe_radius, cfg.station.y)
        });
        out.push(Instruction::Rapid(Move::z(cfg.z.wipe_exit).with_feed(cfg.feeds.z)));
        out.push(Instruction::Rapid(xy(wipe)));
        self.travel_to(state, wipe, summary);
        out.push(Instruction::Rapid(Move::z(cfg.z.high).with_feed(cfg.feeds.z)));
        out.push(Instruction::Rapid(xy(target).with_z(cfg.z.low)));
        self.travel_to(state, target, summary);

        summary.replenishments.push(record.unwrap_or(ReplenishmentRecord {
            accumulated: state.distance_since_replenish,
            increment: 0.0,
            threshold: state.threshold,
            target,
            initial: true,
        }));

        state.distance_since_replenish = 0.0;
        state.threshold = draw_threshold(&mut state.rng, &cfg.dip);
        state.phase = SynthesisPhase::Traveling;
    }

    /// Point `wipe_radius` from the station toward `target`; `None` when the
    /// two coincide
    pub fn wipe_point(&self, target: Point) -> Option<Point> {
        let station = self.config.station;
        let dx = target.x - station.x;
        let dy = target.y - station.y;
        let dist = dx.hypot(dy);
        if dist <= f64::EPSILON {
            return None;
        }
        let r = self.config.dip.wipe_radius;
        Some(Point::new(station.x + dx / dist * r, station.y + dy / dist * r))
    }

    fn travel_to<R: Rng>(
        &self,
        state: &mut MachineState<R>,
        to: Point,
        summary: &mut LayerSummary,
    ) {
        summary.travel_distance += state.position.distance_to(&to);
        state.position = to;
    }

    fn set_motion_mode(&self, mode: MotionMode, out: &mut InstructionStream) {
        let (accel, feed) = match mode {
            MotionMode::Travel => (self.config.accelerations.travel, self.config.feeds.travel),
            MotionMode::Paint => (self.config.accelerations.paint, self.config.feeds.paint),
        };
        out.push(Instruction::FinishMoves);
        out.push(Instruction::SetAcceleration(accel));
        out.push(Instruction::Linear(Move::feed(feed)));
    }
}
