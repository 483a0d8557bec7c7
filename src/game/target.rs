use crate::pose::{Limb, Side};

/// The four cardinal unit directions a pursuer can face.
pub const CARDINALS: [(i32, i32); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];

/// Stationary circle the player pops with a specific limb. Awards +1 and
/// disappears on the first qualifying hit.
#[derive(Clone, Debug)]
pub struct StaticCircle {
    pub center: (f32, f32),
    pub side: Side,
    pub limb: Limb,
}

/// Target that wanders the screen in cardinal steps. Contact starts its
/// clock; once started, progress advances every tick whether or not contact
/// holds, and the reward depends on how much of the run stayed in contact.
#[derive(Clone, Debug)]
pub struct Pursuer {
    pub center: (f32, f32),
    pub last_vector: usize,
    pub progress: u32,
    pub earned_progress: u32,
    pub contacted: bool,
}

impl Pursuer {
    pub fn new(center: (f32, f32), last_vector: usize) -> Self {
        Pursuer {
            center,
            last_vector,
            progress: 0,
            earned_progress: 0,
            contacted: false,
        }
    }

    /// Account one tick of (non-)contact. Progress only ever advances once
    /// contact has begun.
    pub fn register_contact(&mut self, contacted: bool, speed: u32) {
        self.contacted = contacted;
        if contacted {
            self.earned_progress += speed;
        }
        if contacted || self.progress != 0 {
            self.progress += speed;
        }
    }

    pub fn is_mid_progress(&self, max_progress: u32) -> bool {
        self.progress > 0 && self.progress < max_progress
    }

    pub fn is_resolved(&self, max_progress: u32) -> bool {
        self.progress >= max_progress
    }

    pub fn accuracy(&self) -> f32 {
        if self.progress == 0 {
            return 0.0;
        }
        self.earned_progress as f32 / self.progress as f32
    }
}

/// Target gliding along a half-ellipse, out and back. Contact starts the
/// walk; `earned_progress` accrues only while contact holds.
#[derive(Clone, Debug)]
pub struct CurvedWalker {
    pub a: f32,
    pub b: f32,
    pub center: (f32, f32),
    pub progress: f32,
    pub earned_progress: f32,
    /// +1 walks rightward first, -1 leftward.
    pub direction: f32,
    pub contacted: bool,
}

impl CurvedWalker {
    pub fn new(a: f32, b: f32, center: (f32, f32), direction: f32) -> Self {
        CurvedWalker {
            a,
            b,
            center,
            progress: 0.0,
            earned_progress: 0.0,
            direction,
            contacted: false,
        }
    }

    /// Height of the ellipse arc at parameter `t ∈ [0, 2a]`.
    /// `y_offset(0) == y_offset(2a) == 0`.
    pub fn y_offset(&self, t: f32) -> f32 {
        let normalized = (t - self.a) / self.a;
        self.b * (1.0 - normalized * normalized).max(0.0).sqrt()
    }

    /// Account one tick of (non-)contact and advance along the path. The
    /// vertical step is the arc height difference across this tick; past the
    /// midpoint (`progress >= 2a`) the displacement mirrors so the walker
    /// retraces its path.
    pub fn step(&mut self, contacted: bool, speed: f32) {
        self.contacted = contacted;
        let span = 2.0 * self.a;
        let dy = self.y_offset((self.progress + speed) % span) - self.y_offset(self.progress % span);

        if contacted {
            self.earned_progress += speed;
        }
        if contacted || self.progress != 0.0 {
            self.progress += speed;
        }

        if self.progress != 0.0 {
            let sign = if self.progress >= span { -1.0 } else { 1.0 };
            self.center.0 += self.direction * speed * sign;
            self.center.1 += self.direction * dy * sign;
        }
    }

    pub fn is_mid_progress(&self) -> bool {
        self.progress > 0.0 && self.progress < 4.0 * self.a
    }

    pub fn is_resolved(&self) -> bool {
        self.progress >= 4.0 * self.a
    }

    pub fn accuracy(&self) -> f32 {
        if self.progress == 0.0 {
            return 0.0;
        }
        self.earned_progress / self.progress
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pursuer_never_advances_without_first_contact() {
        let mut pursuer = Pursuer::new((100.0, 100.0), 0);
        for _ in 0..50 {
            pursuer.register_contact(false, 5);
        }
        assert_eq!(pursuer.progress, 0);
        assert_eq!(pursuer.earned_progress, 0);
        assert!(!pursuer.is_resolved(300));
    }

    #[test]
    fn pursuer_progress_continues_after_contact_lost() {
        let mut pursuer = Pursuer::new((100.0, 100.0), 0);
        pursuer.register_contact(true, 5);
        pursuer.register_contact(false, 5);
        assert_eq!(pursuer.progress, 10);
        assert_eq!(pursuer.earned_progress, 5);
    }

    #[test]
    fn pursuer_earned_never_exceeds_progress() {
        let mut pursuer = Pursuer::new((100.0, 100.0), 0);
        for i in 0..100 {
            pursuer.register_contact(i % 3 != 0, 5);
            assert!(pursuer.earned_progress <= pursuer.progress);
        }
    }

    #[test]
    fn walker_arc_touches_baseline_at_both_ends() {
        let walker = CurvedWalker::new(40.0, 20.0, (200.0, 200.0), 1.0);
        assert!(walker.y_offset(0.0).abs() < 1e-4);
        assert!(walker.y_offset(80.0).abs() < 1e-4);
        assert!((walker.y_offset(40.0) - 20.0).abs() < 1e-4);
    }

    #[test]
    fn walker_resolves_at_four_semi_axes() {
        let mut walker = CurvedWalker::new(20.0, 10.0, (200.0, 200.0), 1.0);
        walker.step(true, 4.0);
        let mut ticks = 1;
        while !walker.is_resolved() {
            walker.step(true, 4.0);
            ticks += 1;
        }
        assert_eq!(ticks, 20); // 4a / speed
        assert!((walker.accuracy() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn walker_returns_near_spawn_after_full_path() {
        let start = (200.0, 200.0);
        let mut walker = CurvedWalker::new(20.0, 10.0, start, 1.0);
        walker.step(true, 4.0);
        while !walker.is_resolved() {
            walker.step(true, 4.0);
        }
        // Out 2a and back 2a: the x displacement cancels.
        assert!((walker.center.0 - start.0).abs() <= 2.0 * 4.0);
    }

    #[test]
    fn walker_accuracy_reflects_missed_ticks() {
        let mut walker = CurvedWalker::new(20.0, 10.0, (200.0, 200.0), -1.0);
        walker.step(true, 4.0);
        for i in 1..20 {
            walker.step(i % 2 == 0, 4.0);
        }
        assert!(walker.is_resolved());
        assert!(walker.accuracy() < 0.7);
    }
}
