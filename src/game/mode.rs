use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::manager::{CircleManager, CurvedPathManager, PursuitManager, ResolveOutcome};
use super::target::CARDINALS;
use crate::config::GameplayConfig;
use crate::pose::Limb;
use crate::render::{
    Canvas, FOOT_COLOR, HAND_COLOR, SCORE_COLOR, TARGET_CONTACT_COLOR, TARGET_IDLE_COLOR, text,
};
use crate::types::Person;

const TARGET_THICKNESS: i32 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeKind {
    /// One target at a time; lose after too many targets die.
    Classic,
    /// Targets keep coming; lose when the screen floods.
    IntensiveAim,
}

/// One player's round: the three object managers plus the mode's spawn,
/// expiry and termination rules. Scoring is monotonic; the round signals its
/// end by returning `false` from [`GameMode::process`].
pub struct GameMode {
    kind: ModeKind,
    width: u32,
    height: u32,
    radius: u32,
    /// Classic: wall-clock life of a target. Unused by IntensiveAim.
    life_time: Duration,
    /// IntensiveAim: pause between spawn attempts. Unused by Classic.
    interval: Duration,
    max_items: u32,
    last_spawn: Instant,
    death_count: u32,
    score: u32,
    circles: CircleManager,
    pursuit: PursuitManager,
    curved: CurvedPathManager,
    rng: StdRng,
}

impl GameMode {
    pub fn new(
        kind: ModeKind,
        config: &GameplayConfig,
        width: u32,
        height: u32,
        threshold: f32,
    ) -> Self {
        let max_items = match kind {
            ModeKind::Classic => config.classic_max_items,
            ModeKind::IntensiveAim => config.intensive_max_items,
        };
        GameMode {
            kind,
            width,
            height,
            radius: config.circle_radius,
            life_time: Duration::from_secs_f32(config.classic_life_time_secs),
            interval: Duration::from_secs_f32(config.intensive_interval_secs),
            max_items,
            last_spawn: Instant::now(),
            death_count: 0,
            score: 0,
            circles: CircleManager::new(width, height, threshold, config.foot_circles_enabled),
            pursuit: PursuitManager::new(
                width,
                height,
                threshold,
                config.pursuer_speed,
                config.pursuer_max_progress,
            ),
            curved: CurvedPathManager::new(width, height, threshold, config.walker_speed),
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic variant for tests.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn death_count(&self) -> u32 {
        self.death_count
    }

    pub fn live_total(&self) -> usize {
        self.circles.live_count() + self.pursuit.live_count() + self.curved.live_count()
    }

    /// Advance the round by one display tick: resolve contacts, apply the
    /// mode's spawn/expiry rules, draw everything, and report whether the
    /// round is still live.
    pub fn process(&mut self, canvas: &mut Canvas, person: Option<&Person>) -> bool {
        let now = Instant::now();
        let live = match self.kind {
            ModeKind::Classic => self.tick_classic(now, person),
            ModeKind::IntensiveAim => self.tick_intensive(now, person),
        };
        if !live {
            log::info!("round over, final score {}", self.score);
            return false;
        }
        self.draw(canvas);
        true
    }

    fn resolve_all(&mut self, person: Option<&Person>) -> ResolveOutcome {
        let mut outcome = self.circles.resolve(person, self.radius);
        let pursuit = self.pursuit.resolve(person, self.radius, &mut self.rng);
        let curved = self.curved.resolve(person, self.radius);
        outcome.score += pursuit.score + curved.score;
        outcome.removed += pursuit.removed + curved.removed;
        outcome
    }

    fn tick_classic(&mut self, now: Instant, person: Option<&Person>) -> bool {
        let outcome = self.resolve_all(person);
        self.score += outcome.score;
        let mut removals = outcome.removed;

        // Forced wall-clock expiry, deferred for a target that is mid-run.
        if now.duration_since(self.last_spawn) >= self.life_time {
            removals += self.circles.clear();
            if !self.pursuit.has_mid_progress() {
                removals += self.pursuit.clear();
            }
            if !self.curved.has_mid_progress() {
                removals += self.curved.clear();
            }
        }
        self.death_count += removals;

        if self.live_total() == 0 {
            self.spawn_weighted(now);
        }

        if self.death_count >= self.max_items {
            log::info!("too many targets lost ({})", self.death_count);
            return false;
        }
        true
    }

    fn tick_intensive(&mut self, now: Instant, person: Option<&Person>) -> bool {
        let outcome = self.resolve_all(person);
        self.score += outcome.score;

        if now.duration_since(self.last_spawn) > self.interval {
            self.spawn_weighted(now);
        }

        if self.live_total() >= self.max_items as usize {
            log::info!("max items on the screen, round lost");
            return false;
        }
        true
    }

    /// 80% circle, 10% pursuer, 10% walker.
    fn spawn_weighted(&mut self, now: Instant) {
        let roll = self.rng.gen_range(1..=10);
        if roll > 2 {
            self.circles.spawn(&mut self.rng, self.radius);
        } else if roll == 1 {
            self.pursuit.spawn(&mut self.rng, self.radius);
        } else {
            self.curved.spawn(&mut self.rng, self.radius);
        }
        self.last_spawn = now;
    }

    fn draw(&self, canvas: &mut Canvas) {
        let radius = self.radius as i32;

        for circle in &self.circles.circles {
            let color = match circle.limb {
                Limb::Hand => HAND_COLOR,
                Limb::Foot => FOOT_COLOR,
            };
            let center = (circle.center.0 as i32, circle.center.1 as i32);
            canvas.draw_circle_outline(center, radius, color, TARGET_THICKNESS);

            let label = circle.side.label();
            let x = center.0 - text::text_width(label, 2) as i32 / 2;
            let y = center.1 - text::GLYPH_HEIGHT as i32;
            text::draw_text(canvas, x, y, label, 2, color);
        }

        for pursuer in &self.pursuit.pursuers {
            let color = if pursuer.contacted {
                TARGET_CONTACT_COLOR
            } else {
                TARGET_IDLE_COLOR
            };
            let center = (pursuer.center.0 as i32, pursuer.center.1 as i32);
            canvas.draw_circle_outline(center, radius, color, TARGET_THICKNESS);

            // Heading indicator out to the rim.
            let (dx, dy) = CARDINALS[pursuer.last_vector];
            canvas.draw_line(
                center,
                (center.0 + radius * dx, center.1 + radius * dy),
                color,
                2,
            );
        }

        for walker in &self.curved.walkers {
            let color = if walker.contacted {
                TARGET_CONTACT_COLOR
            } else {
                TARGET_IDLE_COLOR
            };
            canvas.draw_circle_outline(
                (walker.center.0 as i32, walker.center.1 as i32),
                radius,
                color,
                TARGET_THICKNESS,
            );
        }

        text::draw_text(
            canvas,
            10,
            10,
            &format!("SCORE {}", self.score),
            3,
            SCORE_COLOR,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::{Landmark, NUM_LANDMARKS, Side};
    use crate::types::{Frame, Joint};
    use std::time::Instant as StdInstant;

    const W: u32 = 640;
    const H: u32 = 480;

    fn frame() -> Frame {
        Frame {
            rgba: vec![0u8; (W * H * 4) as usize],
            width: W,
            height: H,
            timestamp: StdInstant::now(),
        }
    }

    fn config() -> GameplayConfig {
        GameplayConfig {
            circle_radius: 20,
            ..GameplayConfig::default()
        }
    }

    fn absent_person() -> Person {
        vec![Joint::new(-1.0, -1.0, 0.0); NUM_LANDMARKS]
    }

    #[test]
    fn classic_spawns_exactly_one_target() {
        let mut cfg = config();
        cfg.classic_life_time_secs = 3600.0;
        let mut mode = GameMode::new(ModeKind::Classic, &cfg, W, H, 0.2).with_seed(3);

        let mut f = frame();
        let mut canvas = Canvas::new(&mut f);
        for _ in 0..10 {
            assert!(mode.process(&mut canvas, None));
            assert_eq!(mode.live_total(), 1);
        }
        assert_eq!(mode.death_count(), 0);
    }

    #[test]
    fn classic_counts_each_forced_expiry_once_and_loses() {
        let mut cfg = config();
        cfg.classic_life_time_secs = 0.0;
        cfg.classic_max_items = 5;
        let mut mode = GameMode::new(ModeKind::Classic, &cfg, W, H, 0.2).with_seed(11);

        let mut f = frame();
        let mut canvas = Canvas::new(&mut f);
        let mut ticks = 0;
        let person = absent_person();
        while mode.process(&mut canvas, Some(&person)) {
            ticks += 1;
            assert!(ticks < 1000, "round never ended");
        }
        assert_eq!(mode.death_count(), 5);
        assert_eq!(mode.score(), 0);
    }

    #[test]
    fn classic_scores_on_matching_circle_hit() {
        let mut cfg = config();
        cfg.classic_life_time_secs = 3600.0;
        cfg.foot_circles_enabled = false;
        let mut mode = GameMode::new(ModeKind::Classic, &cfg, W, H, 0.2).with_seed(5);
        mode.circles.circles.push(crate::game::target::StaticCircle {
            center: (200.0, 200.0),
            side: Side::Left,
            limb: crate::pose::Limb::Hand,
        });

        let mut person = absent_person();
        person[Landmark::LeftWrist as usize] =
            Joint::new(205.0 / W as f32, 198.0 / H as f32, 1.0);

        let mut f = frame();
        let mut canvas = Canvas::new(&mut f);
        assert!(mode.process(&mut canvas, Some(&person)));
        assert_eq!(mode.score(), 1);
    }

    /// Person whose every tracked limb sits at the given pixel position.
    fn person_at(px: f32, py: f32) -> Person {
        let mut person = absent_person();
        for lm in [
            Landmark::LeftWrist,
            Landmark::RightWrist,
            Landmark::LeftAnkle,
            Landmark::RightAnkle,
        ] {
            person[lm as usize] = Joint::new(px / W as f32, py / H as f32, 1.0);
        }
        person
    }

    #[test]
    fn classic_defers_expiry_for_a_mid_progress_pursuer() {
        use crate::game::target::Pursuer;

        let mut cfg = config();
        // Forced expiry fires on every tick.
        cfg.classic_life_time_secs = 0.0;
        cfg.classic_max_items = 50;
        let mut mode = GameMode::new(ModeKind::Classic, &cfg, W, H, 0.2).with_seed(13);
        mode.pursuit.pursuers.push(Pursuer::new((320.0, 240.0), 0));

        let mut f = frame();

        // One touch starts the run.
        let center = mode.pursuit.pursuers[0].center;
        let toucher = person_at(center.0, center.1);
        {
            let mut canvas = Canvas::new(&mut f);
            assert!(mode.process(&mut canvas, Some(&toucher)));
        }
        assert_eq!(mode.pursuit.pursuers.len(), 1);
        let earned = mode.pursuit.pursuers[0].earned_progress;
        assert!(earned > 0);

        // The player walks away; the runner must outlive every forced expiry
        // with its earned progress intact, then resolve on its own.
        let absent = absent_person();
        let mut ticks = 0;
        loop {
            let mut canvas = Canvas::new(&mut f);
            assert!(mode.process(&mut canvas, Some(&absent)));
            if mode.death_count() > 0 {
                break;
            }
            assert_eq!(mode.pursuit.pursuers.len(), 1);
            assert_eq!(mode.pursuit.pursuers[0].earned_progress, earned);
            ticks += 1;
            assert!(ticks < 1000, "pursuer never resolved");
        }
        assert_eq!(mode.death_count(), 1);
    }

    #[test]
    fn classic_score_is_monotonic() {
        let mut cfg = config();
        cfg.classic_life_time_secs = 0.0;
        cfg.classic_max_items = 50;
        let mut mode = GameMode::new(ModeKind::Classic, &cfg, W, H, 0.2).with_seed(2);

        let mut f = frame();
        let mut last_score = 0;
        let person = absent_person();
        loop {
            let mut canvas = Canvas::new(&mut f);
            let live = mode.process(&mut canvas, Some(&person));
            assert!(mode.score() >= last_score);
            last_score = mode.score();
            if !live {
                break;
            }
        }
    }

    #[test]
    fn intensive_floods_to_exactly_max_items() {
        let mut cfg = config();
        cfg.intensive_interval_secs = 0.0;
        cfg.intensive_max_items = 4;
        let mut mode = GameMode::new(ModeKind::IntensiveAim, &cfg, W, H, 0.2).with_seed(9);

        let mut f = frame();
        let mut ticks = 0;
        loop {
            let mut canvas = Canvas::new(&mut f);
            let live = mode.process(&mut canvas, None);
            ticks += 1;
            if !live {
                break;
            }
            // The round must not outlive the flood condition.
            assert!(mode.live_total() < 4);
            assert!(ticks < 1000, "round never flooded");
        }
        assert_eq!(mode.live_total(), 4);
    }

    #[test]
    fn intensive_waits_for_the_spawn_interval() {
        let mut cfg = config();
        cfg.intensive_interval_secs = 3600.0;
        let mut mode = GameMode::new(ModeKind::IntensiveAim, &cfg, W, H, 0.2).with_seed(1);

        let mut f = frame();
        let mut canvas = Canvas::new(&mut f);
        for _ in 0..10 {
            assert!(mode.process(&mut canvas, None));
        }
        assert_eq!(mode.live_total(), 0);
    }
}
