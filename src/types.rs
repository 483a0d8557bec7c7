use std::time::Instant;

/// One decoded camera frame, RGBA8, tightly packed.
#[derive(Clone, Debug)]
pub struct Frame {
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub timestamp: Instant,
}

impl Frame {
    /// Mirror the frame around its vertical axis (selfie view).
    pub fn flip_horizontal(&mut self) {
        let w = self.width as usize;
        if w == 0 {
            return;
        }
        for row in self.rgba.chunks_exact_mut(w * 4) {
            let mut left = 0usize;
            let mut right = w - 1;
            while left < right {
                for c in 0..4 {
                    row.swap(left * 4 + c, right * 4 + c);
                }
                left += 1;
                right -= 1;
            }
        }
    }
}

/// One tracked body landmark: normalized position plus model confidence.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Joint {
    pub x: f32,
    pub y: f32,
    pub score: f32,
}

impl Joint {
    pub fn new(x: f32, y: f32, score: f32) -> Self {
        Joint { x, y, score }
    }

    /// A joint is usable only when its confidence clears `threshold` and its
    /// coordinates are inside the unit square. Anything else counts as absent.
    pub fn is_valid(&self, threshold: f32) -> bool {
        self.score >= threshold
            && (0.0..=1.0).contains(&self.x)
            && (0.0..=1.0).contains(&self.y)
    }

    /// Denormalize to pixel coordinates, or `None` for an absent joint.
    pub fn to_pixel(&self, width: u32, height: u32, threshold: f32) -> Option<(f32, f32)> {
        if !self.is_valid(threshold) {
            return None;
        }
        Some((self.x * width as f32, self.y * height as f32))
    }

    /// Mirror the x coordinate, matching a horizontally flipped frame.
    pub fn flipped(&self) -> Joint {
        Joint {
            x: 1.0 - self.x,
            ..*self
        }
    }
}

/// The joints of one detected person, indexed by [`crate::pose::Landmark`].
pub type Person = Vec<Joint>;

/// One inference cycle's output: one entry per detected person.
#[derive(Clone, Debug, Default)]
pub struct JointSample {
    pub persons: Vec<Person>,
}

impl JointSample {
    pub fn new(persons: Vec<Person>) -> Self {
        JointSample { persons }
    }

    pub fn is_empty(&self) -> bool {
        self.persons.is_empty()
    }

    /// Sample with every joint mirrored around the vertical axis.
    pub fn flipped(&self) -> JointSample {
        JointSample {
            persons: self
                .persons
                .iter()
                .map(|person| person.iter().map(Joint::flipped).collect())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joint_validity_gates_score_and_range() {
        assert!(Joint::new(0.5, 0.5, 0.9).is_valid(0.2));
        assert!(!Joint::new(0.5, 0.5, 0.1).is_valid(0.2));
        assert!(!Joint::new(1.5, 0.5, 0.9).is_valid(0.2));
        assert!(!Joint::new(0.5, -0.1, 0.9).is_valid(0.2));
    }

    #[test]
    fn to_pixel_denormalizes() {
        let joint = Joint::new(0.25, 0.5, 1.0);
        assert_eq!(joint.to_pixel(640, 480, 0.2), Some((160.0, 240.0)));
        assert_eq!(Joint::new(0.25, 0.5, 0.0).to_pixel(640, 480, 0.2), None);
    }

    #[test]
    fn flip_mirrors_x_only() {
        let flipped = Joint::new(0.3, 0.7, 0.9).flipped();
        assert!((flipped.x - 0.7).abs() < 1e-6);
        assert_eq!(flipped.y, 0.7);
    }

    #[test]
    fn frame_flip_reverses_rows() {
        let mut frame = Frame {
            rgba: vec![
                1, 1, 1, 255, 2, 2, 2, 255, //
                3, 3, 3, 255, 4, 4, 4, 255,
            ],
            width: 2,
            height: 2,
            timestamp: Instant::now(),
        };
        frame.flip_horizontal();
        assert_eq!(&frame.rgba[0..4], &[2, 2, 2, 255]);
        assert_eq!(&frame.rgba[8..12], &[4, 4, 4, 255]);
    }
}
