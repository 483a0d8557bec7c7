pub mod movenet;

pub use movenet::MoveNetEstimator;

use crate::types::{Frame, Joint, JointSample, Person};

/// Black-box pose estimation backend. Implementations run on the inference
/// stage's thread and must not block on anything but their own model.
pub trait PoseEstimator: Send + 'static {
    fn estimate(&mut self, frame: &Frame) -> anyhow::Result<JointSample>;
}

/// 17-landmark COCO scheme shared by the supported pose models.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(usize)]
pub enum Landmark {
    Nose = 0,
    LeftEye = 1,
    RightEye = 2,
    LeftEar = 3,
    RightEar = 4,
    LeftShoulder = 5,
    RightShoulder = 6,
    LeftElbow = 7,
    RightElbow = 8,
    LeftWrist = 9,
    RightWrist = 10,
    LeftHip = 11,
    RightHip = 12,
    LeftKnee = 13,
    RightKnee = 14,
    LeftAnkle = 15,
    RightAnkle = 16,
}

pub const NUM_LANDMARKS: usize = 17;

/// Which side of the body (or of the screen) something belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn label(&self) -> &'static str {
        match self {
            Side::Left => "L",
            Side::Right => "R",
        }
    }
}

/// Limb class a target can demand.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Limb {
    Hand,
    Foot,
}

/// One hit-testable body part: a side, a limb class, and the landmark
/// indices that count as touching with it.
#[derive(Clone, Copy, Debug)]
pub struct BodyPart {
    pub side: Side,
    pub limb: Limb,
    pub indexes: &'static [usize],
}

/// Landmark indices per body part. The "hand" entries point at the wrists;
/// [`extend_hands`] pushes them past the wrist so they track the palm.
pub const BODY_PARTS: &[BodyPart] = &[
    BodyPart {
        side: Side::Left,
        limb: Limb::Hand,
        indexes: &[Landmark::LeftWrist as usize],
    },
    BodyPart {
        side: Side::Right,
        limb: Limb::Hand,
        indexes: &[Landmark::RightWrist as usize],
    },
    BodyPart {
        side: Side::Left,
        limb: Limb::Foot,
        indexes: &[Landmark::LeftAnkle as usize],
    },
    BodyPart {
        side: Side::Right,
        limb: Limb::Foot,
        indexes: &[Landmark::RightAnkle as usize],
    },
];

/// Skeleton edges for the overlay renderer.
pub const SKELETON: &[(Landmark, Landmark)] = &[
    (Landmark::LeftAnkle, Landmark::LeftKnee),
    (Landmark::RightAnkle, Landmark::RightKnee),
    (Landmark::LeftKnee, Landmark::LeftHip),
    (Landmark::RightKnee, Landmark::RightHip),
    (Landmark::LeftHip, Landmark::RightHip),
    (Landmark::LeftShoulder, Landmark::LeftHip),
    (Landmark::RightShoulder, Landmark::RightHip),
    (Landmark::LeftShoulder, Landmark::LeftElbow),
    (Landmark::RightShoulder, Landmark::RightElbow),
    (Landmark::LeftElbow, Landmark::LeftWrist),
    (Landmark::RightElbow, Landmark::RightWrist),
    (Landmark::Nose, Landmark::LeftEye),
    (Landmark::Nose, Landmark::RightEye),
    (Landmark::LeftEye, Landmark::LeftEar),
    (Landmark::RightEye, Landmark::RightEar),
    (Landmark::LeftShoulder, Landmark::RightShoulder),
];

/// Replace each wrist joint with a point projected past the wrist along the
/// elbow→wrist direction, approximating the palm. Falls back to the wrist
/// when the projection would leave the unit square.
pub fn extend_hands(person: &mut Person) {
    if person.len() < NUM_LANDMARKS {
        return;
    }
    person[Landmark::LeftWrist as usize] = project_beyond(
        &person[Landmark::LeftElbow as usize],
        &person[Landmark::LeftWrist as usize],
    );
    person[Landmark::RightWrist as usize] = project_beyond(
        &person[Landmark::RightElbow as usize],
        &person[Landmark::RightWrist as usize],
    );
}

fn project_beyond(elbow: &Joint, wrist: &Joint) -> Joint {
    let dx = wrist.x - elbow.x;
    let dy = wrist.y - elbow.y;
    let length = (dx * dx + dy * dy).sqrt();
    if length == 0.0 {
        return *wrist;
    }
    // Push half an elbow-to-wrist length further out.
    let x = wrist.x + dx / 2.0;
    let y = wrist.y + dy / 2.0;
    if !(0.0..=1.0).contains(&x) || !(0.0..=1.0).contains(&y) {
        return *wrist;
    }
    Joint::new(x, y, wrist.score)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neutral_person() -> Person {
        vec![Joint::new(0.5, 0.5, 1.0); NUM_LANDMARKS]
    }

    #[test]
    fn body_parts_cover_both_sides_and_limbs() {
        assert_eq!(BODY_PARTS.len(), 4);
        assert!(BODY_PARTS
            .iter()
            .any(|p| p.side == Side::Left && p.limb == Limb::Foot));
    }

    #[test]
    fn hand_extension_projects_past_the_wrist() {
        let mut person = neutral_person();
        person[Landmark::LeftElbow as usize] = Joint::new(0.4, 0.5, 1.0);
        person[Landmark::LeftWrist as usize] = Joint::new(0.5, 0.5, 1.0);
        extend_hands(&mut person);
        let hand = person[Landmark::LeftWrist as usize];
        assert!((hand.x - 0.55).abs() < 1e-6);
        assert!((hand.y - 0.5).abs() < 1e-6);
    }

    #[test]
    fn hand_extension_clamps_at_the_border() {
        let mut person = neutral_person();
        person[Landmark::RightElbow as usize] = Joint::new(0.5, 0.5, 1.0);
        person[Landmark::RightWrist as usize] = Joint::new(0.98, 0.5, 1.0);
        extend_hands(&mut person);
        // Projection would leave the frame, so the wrist is kept.
        assert_eq!(person[Landmark::RightWrist as usize].x, 0.98);
    }

    #[test]
    fn hand_extension_ignores_short_persons() {
        let mut person = vec![Joint::new(0.5, 0.5, 1.0); 3];
        extend_hands(&mut person);
        assert_eq!(person.len(), 3);
    }
}
