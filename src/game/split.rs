use super::mode::GameMode;
use crate::pose::Side;
use crate::render::Canvas;
use crate::types::{Frame, Joint, JointSample, Person};

/// Marker for a joint dropped during remapping; fails every validity check.
const ABSENT: Joint = Joint {
    x: -1.0,
    y: -1.0,
    score: -1.0,
};

/// Two independent rounds over the left and right half of the screen. Each
/// tick every detected person is assigned to a half and re-normalized into
/// it; the combined round is live while either half still is.
pub struct TwoPlayerSplit {
    left: GameMode,
    right: GameMode,
    left_live: bool,
    right_live: bool,
    threshold: f32,
}

impl TwoPlayerSplit {
    pub fn new(left: GameMode, right: GameMode, threshold: f32) -> Self {
        TwoPlayerSplit {
            left,
            right,
            left_live: true,
            right_live: true,
            threshold,
        }
    }

    pub fn process(&mut self, frame: &mut Frame, sample: &JointSample) -> bool {
        let half = frame.width / 2;
        let (left_person, right_person) = partition_sample(sample, self.threshold);

        if self.left_live {
            let mut canvas = Canvas::viewport(frame, 0, half);
            self.left_live = self.left.process(&mut canvas, left_person.as_ref());
        }
        if self.right_live {
            let mut canvas = Canvas::viewport(frame, half, half);
            self.right_live = self.right.process(&mut canvas, right_person.as_ref());
        }
        self.left_live || self.right_live
    }
}

/// Which half of the screen a person is standing in: decided by the majority
/// of their valid joints' x-coordinates relative to the midline.
pub fn assign_side(person: &Person, threshold: f32) -> Option<Side> {
    let mut left = 0usize;
    let mut right = 0usize;
    for joint in person {
        if !joint.is_valid(threshold) {
            continue;
        }
        if joint.x < 0.5 {
            left += 1;
        } else {
            right += 1;
        }
    }
    if left + right == 0 {
        return None;
    }
    Some(if left >= right { Side::Left } else { Side::Right })
}

/// Re-normalize a person's joints into one half of the screen. Joints on the
/// wrong side of the midline become absent for that half.
pub fn remap_to_half(person: &Person, side: Side) -> Person {
    person
        .iter()
        .map(|joint| match side {
            Side::Left if joint.x < 0.5 => Joint::new(joint.x * 2.0, joint.y, joint.score),
            Side::Right if joint.x >= 0.5 => {
                Joint::new((joint.x - 0.5) * 2.0, joint.y, joint.score)
            }
            _ => ABSENT,
        })
        .collect()
}

/// First person assigned to each half, remapped into half coordinates.
fn partition_sample(sample: &JointSample, threshold: f32) -> (Option<Person>, Option<Person>) {
    let mut left = None;
    let mut right = None;
    for person in &sample.persons {
        match assign_side(person, threshold) {
            Some(Side::Left) if left.is_none() => {
                left = Some(remap_to_half(person, Side::Left));
            }
            Some(Side::Right) if right.is_none() => {
                right = Some(remap_to_half(person, Side::Right));
            }
            _ => {}
        }
    }
    (left, right)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::NUM_LANDMARKS;

    fn person_with_x(x: f32) -> Person {
        vec![Joint::new(x, 0.5, 1.0); NUM_LANDMARKS]
    }

    #[test]
    fn left_remap_doubles_x() {
        let person = person_with_x(0.3);
        let remapped = remap_to_half(&person, Side::Left);
        assert!((remapped[0].x - 0.6).abs() < 1e-6);
        assert_eq!(remapped[0].y, 0.5);
    }

    #[test]
    fn right_remap_shifts_then_doubles() {
        let person = person_with_x(0.8);
        let remapped = remap_to_half(&person, Side::Right);
        assert!((remapped[0].x - 0.6).abs() < 1e-6);
    }

    #[test]
    fn wrong_side_joints_become_absent() {
        let mut person = person_with_x(0.3);
        person[0] = Joint::new(0.7, 0.5, 1.0);
        let remapped = remap_to_half(&person, Side::Left);
        assert!(!remapped[0].is_valid(0.0));
        assert!(remapped[1].is_valid(0.2));
    }

    #[test]
    fn side_assignment_follows_joint_majority() {
        let mut person = person_with_x(0.3);
        // A few joints stray across the midline; majority still wins.
        person[0] = Joint::new(0.9, 0.5, 1.0);
        person[1] = Joint::new(0.8, 0.5, 1.0);
        assert_eq!(assign_side(&person, 0.2), Some(Side::Left));

        assert_eq!(assign_side(&person_with_x(0.7), 0.2), Some(Side::Right));
        assert_eq!(assign_side(&vec![ABSENT; NUM_LANDMARKS], 0.2), None);
    }

    #[test]
    fn split_round_lives_while_either_half_lives() {
        use crate::config::GameplayConfig;
        use crate::game::mode::ModeKind;
        use std::time::Instant;

        let mut cfg = GameplayConfig::default();
        cfg.circle_radius = 20;
        cfg.classic_life_time_secs = 0.0;
        cfg.classic_max_items = 3;

        let left = GameMode::new(ModeKind::Classic, &cfg, 320, 480, 0.2).with_seed(1);
        // The right round survives far longer.
        let mut right_cfg = cfg.clone();
        right_cfg.classic_max_items = 1000;
        let right = GameMode::new(ModeKind::Classic, &right_cfg, 320, 480, 0.2).with_seed(2);
        let mut split = TwoPlayerSplit::new(left, right, 0.2);

        let mut frame = Frame {
            rgba: vec![0u8; 640 * 480 * 4],
            width: 640,
            height: 480,
            timestamp: Instant::now(),
        };
        let sample = JointSample::default();

        let mut ticks = 0;
        while split.process(&mut frame, &sample) {
            ticks += 1;
            assert!(ticks < 100, "left loss should not end the combined round");
            if ticks == 50 {
                break;
            }
        }
        assert!(!split.left_live);
        assert!(split.right_live);
    }
}
