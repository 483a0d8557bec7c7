use rand::Rng;
use rand::seq::SliceRandom;

use super::target::{CARDINALS, CurvedWalker, Pursuer, StaticCircle};
use crate::pose::{BODY_PARTS, BodyPart, Limb, Side};
use crate::types::Person;

/// What one resolve pass did: score awarded and targets retired.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResolveOutcome {
    pub score: u32,
    pub removed: u32,
}

impl ResolveOutcome {
    fn add(&mut self, other: ResolveOutcome) {
        self.score += other.score;
        self.removed += other.removed;
    }
}

/// True when any of the body part's joints lands inside the circular hit
/// region. Absent or low-confidence joints never make contact.
fn part_touches(
    person: &Person,
    part: &BodyPart,
    center: (f32, f32),
    radius: f32,
    width: u32,
    height: u32,
    threshold: f32,
) -> bool {
    part.indexes.iter().any(|&idx| {
        person
            .get(idx)
            .and_then(|joint| joint.to_pixel(width, height, threshold))
            .is_some_and(|(jx, jy)| {
                let dx = jx - center.0;
                let dy = jy - center.1;
                dx * dx + dy * dy <= radius * radius
            })
    })
}

fn any_part_touches(
    person: &Person,
    center: (f32, f32),
    radius: f32,
    width: u32,
    height: u32,
    threshold: f32,
) -> bool {
    BODY_PARTS
        .iter()
        .any(|part| part_touches(person, part, center, radius, width, height, threshold))
}

/// Owns every live [`StaticCircle`]. Hits must match both the circle's side
/// and its limb class.
pub struct CircleManager {
    width: u32,
    height: u32,
    threshold: f32,
    foot_circles: bool,
    pub circles: Vec<StaticCircle>,
}

impl CircleManager {
    pub fn new(width: u32, height: u32, threshold: f32, foot_circles: bool) -> Self {
        CircleManager {
            width,
            height,
            threshold,
            foot_circles,
            circles: Vec::new(),
        }
    }

    pub fn live_count(&self) -> usize {
        self.circles.len()
    }

    pub fn clear(&mut self) -> u32 {
        let removed = self.circles.len() as u32;
        self.circles.clear();
        removed
    }

    pub fn spawn<R: Rng>(&mut self, rng: &mut R, radius: u32) {
        let center = (
            rng.gen_range(radius..=self.width - radius) as f32,
            rng.gen_range(radius..=self.height - radius) as f32,
        );
        let side = if rng.gen_bool(0.5) {
            Side::Left
        } else {
            Side::Right
        };
        let limb = if self.foot_circles && rng.gen_bool(0.5) {
            Limb::Foot
        } else {
            Limb::Hand
        };
        self.circles.push(StaticCircle { center, side, limb });
    }

    pub fn resolve(&mut self, person: Option<&Person>, radius: u32) -> ResolveOutcome {
        let Some(person) = person else {
            return ResolveOutcome::default();
        };

        let mut outcome = ResolveOutcome::default();
        let (width, height, threshold) = (self.width, self.height, self.threshold);
        self.circles.retain(|circle| {
            let hit = BODY_PARTS.iter().any(|part| {
                part.side == circle.side
                    && part.limb == circle.limb
                    && part_touches(
                        person,
                        part,
                        circle.center,
                        radius as f32,
                        width,
                        height,
                        threshold,
                    )
            });
            if hit {
                outcome.add(ResolveOutcome {
                    score: 1,
                    removed: 1,
                });
            }
            !hit
        });
        outcome
    }
}

/// Owns the single live [`Pursuer`], if any. Any tracked limb counts as
/// contact.
pub struct PursuitManager {
    width: u32,
    height: u32,
    threshold: f32,
    speed: u32,
    max_progress: u32,
    pub pursuers: Vec<Pursuer>,
}

impl PursuitManager {
    pub fn new(width: u32, height: u32, threshold: f32, speed: u32, max_progress: u32) -> Self {
        PursuitManager {
            width,
            height,
            threshold,
            speed,
            max_progress,
            pursuers: Vec::new(),
        }
    }

    pub fn live_count(&self) -> usize {
        self.pursuers.len()
    }

    pub fn has_mid_progress(&self) -> bool {
        self.pursuers
            .iter()
            .any(|p| p.is_mid_progress(self.max_progress))
    }

    pub fn clear(&mut self) -> u32 {
        let removed = self.pursuers.len() as u32;
        self.pursuers.clear();
        removed
    }

    fn in_area(&self, center: (f32, f32), radius: u32) -> bool {
        let r = radius as f32;
        center.0 > r
            && center.0 < self.width as f32 - r
            && center.1 > r
            && center.1 < self.height as f32 - r
    }

    /// At most one pursuer may be live; a second spawn is a no-op.
    pub fn spawn<R: Rng>(&mut self, rng: &mut R, radius: u32) {
        if !self.pursuers.is_empty() {
            return;
        }

        let center = (
            rng.gen_range(radius..=self.width - radius) as f32,
            rng.gen_range(radius..=self.height - radius) as f32,
        );

        let mut shuffled = CARDINALS;
        shuffled.shuffle(rng);
        let facing = shuffled.iter().find(|&&(dx, dy)| {
            let next = (
                center.0 + (dx * self.speed as i32) as f32,
                center.1 + (dy * self.speed as i32) as f32,
            );
            self.in_area(next, radius)
        });

        let Some(facing) = facing else {
            // Boxed in on all four sides; give up on this spawn.
            return;
        };
        let last_vector = CARDINALS.iter().position(|v| v == facing).unwrap_or(0);
        self.pursuers.push(Pursuer::new(center, last_vector));
    }

    pub fn resolve<R: Rng>(
        &mut self,
        person: Option<&Person>,
        radius: u32,
        rng: &mut R,
    ) -> ResolveOutcome {
        let mut outcome = ResolveOutcome::default();
        let (width, height, threshold) = (self.width, self.height, self.threshold);
        let (speed, max_progress) = (self.speed, self.max_progress);

        let mut resolved = Vec::new();
        for (idx, pursuer) in self.pursuers.iter_mut().enumerate() {
            let contacted = person.is_some_and(|p| {
                any_part_touches(p, pursuer.center, radius as f32, width, height, threshold)
            });
            pursuer.register_contact(contacted, speed);

            if pursuer.is_mid_progress(max_progress) {
                step_pursuer(pursuer, rng, speed, radius, width, height);
            }

            if pursuer.is_resolved(max_progress) {
                if pursuer.accuracy() >= 0.8 {
                    outcome.score += 3;
                }
                resolved.push(idx);
            }
        }

        // Retire after the pass; never mutate the list mid-iteration.
        for idx in resolved.into_iter().rev() {
            let _ = self.pursuers.remove(idx);
            outcome.removed += 1;
        }
        outcome
    }
}

/// One movement step: mostly keep heading, sometimes turn, never leave the
/// play area. If every candidate direction is blocked the pursuer stays put.
fn step_pursuer<R: Rng>(
    pursuer: &mut Pursuer,
    rng: &mut R,
    speed: u32,
    radius: u32,
    width: u32,
    height: u32,
) {
    let current = pursuer.last_vector;
    let left = (current + CARDINALS.len() - 1) % CARDINALS.len();
    let right = (current + 1) % CARDINALS.len();

    let keep_heading = rng.gen_range(1..=10) <= 9;
    let candidates: &[usize] = if keep_heading {
        &[current, left, right]
    } else {
        &[left, right]
    };

    let r = radius as f32;
    for &dir in candidates {
        let (dx, dy) = CARDINALS[dir];
        let next = (
            pursuer.center.0 + (dx * speed as i32) as f32,
            pursuer.center.1 + (dy * speed as i32) as f32,
        );
        let in_area = next.0 > r
            && next.0 < width as f32 - r
            && next.1 > r
            && next.1 < height as f32 - r;
        if in_area {
            pursuer.center = next;
            pursuer.last_vector = dir;
            return;
        }
    }
}

/// Owns the single live [`CurvedWalker`], if any.
pub struct CurvedPathManager {
    width: u32,
    height: u32,
    threshold: f32,
    speed: f32,
    pub walkers: Vec<CurvedWalker>,
}

impl CurvedPathManager {
    pub fn new(width: u32, height: u32, threshold: f32, speed: u32) -> Self {
        CurvedPathManager {
            width,
            height,
            threshold,
            speed: speed as f32,
            walkers: Vec::new(),
        }
    }

    pub fn live_count(&self) -> usize {
        self.walkers.len()
    }

    pub fn has_mid_progress(&self) -> bool {
        self.walkers.iter().any(|w| w.is_mid_progress())
    }

    pub fn clear(&mut self) -> u32 {
        let removed = self.walkers.len() as u32;
        self.walkers.clear();
        removed
    }

    /// At most one walker may be live; a second spawn is a no-op.
    pub fn spawn<R: Rng>(&mut self, rng: &mut R, radius: u32) {
        if !self.walkers.is_empty() {
            return;
        }

        let a_max = self.width / 8;
        let b_max = self.height / 8;
        let a = rng.gen_range(a_max / 2..=a_max);
        let b = rng.gen_range(b_max / 2..=b_max);
        // The walker sweeps 2a horizontally, so keep the whole path on-screen.
        let center = (
            rng.gen_range(radius + 2 * a..=self.width - 2 * a - radius) as f32,
            rng.gen_range(radius + 2 * b..=self.height - 2 * b - radius) as f32,
        );
        let direction = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        self.walkers
            .push(CurvedWalker::new(a as f32, b as f32, center, direction));
    }

    pub fn resolve(&mut self, person: Option<&Person>, radius: u32) -> ResolveOutcome {
        let mut outcome = ResolveOutcome::default();
        let (width, height, threshold) = (self.width, self.height, self.threshold);
        let speed = self.speed;

        let mut resolved = Vec::new();
        for (idx, walker) in self.walkers.iter_mut().enumerate() {
            let contacted = person.is_some_and(|p| {
                any_part_touches(p, walker.center, radius as f32, width, height, threshold)
            });
            walker.step(contacted, speed);

            if walker.is_resolved() {
                if walker.accuracy() >= 0.7 {
                    outcome.score += 3;
                }
                resolved.push(idx);
            }
        }

        for idx in resolved.into_iter().rev() {
            let _ = self.walkers.remove(idx);
            outcome.removed += 1;
        }
        outcome
    }
}
