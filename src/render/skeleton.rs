use super::{BONE_COLOR, Canvas, FOOT_COLOR, HAND_COLOR, JOINT_COLOR};
use crate::pose::{BODY_PARTS, Limb, SKELETON};
use crate::types::Person;

const BONE_THICKNESS: i32 = 2;
const JOINT_RADIUS: i32 = 3;

/// Draw skeleton edges and joint dots for every person in view.
pub fn draw_persons(canvas: &mut Canvas, persons: &[Person], threshold: f32) {
    let (w, h) = (canvas.width(), canvas.height());
    for person in persons {
        for &(a, b) in SKELETON {
            let pa = person
                .get(a as usize)
                .and_then(|j| j.to_pixel(w, h, threshold));
            let pb = person
                .get(b as usize)
                .and_then(|j| j.to_pixel(w, h, threshold));
            if let (Some((ax, ay)), Some((bx, by))) = (pa, pb) {
                canvas.draw_line(
                    (ax as i32, ay as i32),
                    (bx as i32, by as i32),
                    BONE_COLOR,
                    BONE_THICKNESS,
                );
            }
        }

        for joint in person {
            if let Some((x, y)) = joint.to_pixel(w, h, threshold) {
                canvas.draw_circle_filled((x as i32, y as i32), JOINT_RADIUS, JOINT_COLOR);
            }
        }
    }
}

/// Ring each tracked hand and foot, so the player can see what the game
/// hit-tests with. Hand and foot rings use the matching circle colors.
pub fn draw_limb_circles(canvas: &mut Canvas, person: &Person, radius: i32, threshold: f32) {
    let (w, h) = (canvas.width(), canvas.height());
    for part in BODY_PARTS {
        let color = match part.limb {
            Limb::Hand => HAND_COLOR,
            Limb::Foot => FOOT_COLOR,
        };
        for &idx in part.indexes {
            if let Some((x, y)) = person
                .get(idx)
                .and_then(|j| j.to_pixel(w, h, threshold))
            {
                canvas.draw_circle_outline((x as i32, y as i32), radius, color, 2);
            }
        }
    }
}
