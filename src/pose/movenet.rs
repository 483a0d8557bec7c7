use std::path::Path;

use anyhow::{Context, Result, anyhow};
use image::{RgbaImage, imageops::FilterType};
use ndarray::Array4;
use ort::session::{Session, builder::GraphOptimizationLevel};
use ort::value::Tensor;

use super::{NUM_LANDMARKS, PoseEstimator, extend_hands};
use crate::types::{Frame, Joint, JointSample, Person};

pub const INPUT_SIZE: u32 = 256;
/// MoveNet multipose emits up to 6 candidate persons per frame.
const MAX_CANDIDATES: usize = 6;
/// Values per candidate row: 17 * (y, x, score) + bbox (4) + person score.
const VALUES_PER_PERSON: usize = NUM_LANDMARKS * 3 + 5;
/// The game only ever addresses two players.
const MAX_PERSONS: usize = 2;

/// MoveNet-multipose pose estimator backed by ONNX Runtime.
pub struct MoveNetEstimator {
    session: Session,
    person_threshold: f32,
}

impl MoveNetEstimator {
    pub fn load(model_path: &Path) -> Result<Self> {
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(2)?
            .commit_from_file(model_path)
            .with_context(|| {
                format!("failed to load pose model from {}", model_path.display())
            })?;

        Ok(MoveNetEstimator {
            session,
            person_threshold: 0.2,
        })
    }

    fn prepare_input(&self, frame: &Frame) -> Result<Array4<i32>> {
        let Some(img) = RgbaImage::from_raw(frame.width, frame.height, frame.rgba.clone())
        else {
            return Err(anyhow!("frame buffer does not match its dimensions"));
        };

        // Plain stretch to the model square: keypoints come back normalized to
        // the input, so they stay valid for the original frame.
        let resized =
            image::imageops::resize(&img, INPUT_SIZE, INPUT_SIZE, FilterType::Triangle);

        let mut input =
            Array4::<i32>::zeros((1, INPUT_SIZE as usize, INPUT_SIZE as usize, 3));
        for (x, y, pixel) in resized.enumerate_pixels() {
            input[[0, y as usize, x as usize, 0]] = pixel.0[0] as i32;
            input[[0, y as usize, x as usize, 1]] = pixel.0[1] as i32;
            input[[0, y as usize, x as usize, 2]] = pixel.0[2] as i32;
        }
        Ok(input)
    }
}

impl PoseEstimator for MoveNetEstimator {
    fn estimate(&mut self, frame: &Frame) -> Result<JointSample> {
        let input = self.prepare_input(frame)?;
        let tensor = Tensor::from_array(input)?;
        let outputs = self
            .session
            .run(ort::inputs![tensor])
            .context("failed to run pose session")?;

        if outputs.len() < 1 {
            return Err(anyhow!("pose model returned no outputs"));
        }

        let raw = outputs[0].try_extract_array::<f32>()?;
        let flattened: Vec<f32> = raw.iter().copied().collect();
        decode_sample(&flattened, self.person_threshold)
    }
}

/// Decode the flat `[1, 6, 56]` MoveNet output into a joint sample.
pub fn decode_sample(flat: &[f32], person_threshold: f32) -> Result<JointSample> {
    if flat.len() < MAX_CANDIDATES * VALUES_PER_PERSON {
        return Err(anyhow!(
            "unexpected pose output length: got {}, need {}",
            flat.len(),
            MAX_CANDIDATES * VALUES_PER_PERSON
        ));
    }

    let mut persons = Vec::new();
    for row in flat.chunks_exact(VALUES_PER_PERSON).take(MAX_CANDIDATES) {
        let person_score = row[VALUES_PER_PERSON - 1];
        if person_score < person_threshold {
            continue;
        }

        let mut person: Person = Vec::with_capacity(NUM_LANDMARKS);
        for joint in row.chunks_exact(3).take(NUM_LANDMARKS) {
            // MoveNet orders coordinates (y, x).
            person.push(Joint::new(joint[1], joint[0], joint[2]));
        }
        extend_hands(&mut person);
        persons.push(person);

        if persons.len() == MAX_PERSONS {
            break;
        }
    }

    Ok(JointSample::new(persons))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synthetic_row(score: f32) -> Vec<f32> {
        let mut row = Vec::with_capacity(VALUES_PER_PERSON);
        for i in 0..NUM_LANDMARKS {
            row.push(0.1 * (i % 5) as f32); // y
            row.push(0.5); // x
            row.push(0.9); // joint score
        }
        row.extend_from_slice(&[0.0, 0.0, 1.0, 1.0, score]);
        row
    }

    #[test]
    fn decode_keeps_confident_persons_only() {
        let mut flat = Vec::new();
        flat.extend(synthetic_row(0.8));
        flat.extend(synthetic_row(0.05));
        for _ in 2..MAX_CANDIDATES {
            flat.extend(synthetic_row(0.0));
        }

        let sample = decode_sample(&flat, 0.2).unwrap();
        assert_eq!(sample.persons.len(), 1);
        assert_eq!(sample.persons[0].len(), NUM_LANDMARKS);
    }

    #[test]
    fn decode_swaps_y_x_order() {
        let mut flat = Vec::new();
        let mut row = synthetic_row(0.9);
        row[0] = 0.25; // nose y
        row[1] = 0.75; // nose x
        flat.extend(row);
        for _ in 1..MAX_CANDIDATES {
            flat.extend(synthetic_row(0.0));
        }

        let sample = decode_sample(&flat, 0.2).unwrap();
        let nose = sample.persons[0][0];
        assert_eq!(nose.x, 0.75);
        assert_eq!(nose.y, 0.25);
    }

    #[test]
    fn decode_caps_at_two_persons() {
        let mut flat = Vec::new();
        for _ in 0..MAX_CANDIDATES {
            flat.extend(synthetic_row(0.9));
        }
        let sample = decode_sample(&flat, 0.2).unwrap();
        assert_eq!(sample.persons.len(), MAX_PERSONS);
    }

    #[test]
    fn decode_rejects_short_output() {
        assert!(decode_sample(&[0.0; 10], 0.2).is_err());
    }
}
