use std::thread;

use crossbeam_channel::{Receiver, Sender};

use crate::pose::PoseEstimator;
use crate::types::{Frame, JointSample};

/// Block for the next frame, then drain to the newest one so inference
/// always works on the most recent capture. `None` when the producer is gone.
fn recv_latest(frame_rx: &Receiver<Frame>) -> Option<Frame> {
    let mut frame = frame_rx.recv().ok()?;
    while let Ok(newer) = frame_rx.try_recv() {
        frame = newer;
    }
    Some(frame)
}

fn run_inference_loop(
    mut estimator: Box<dyn PoseEstimator>,
    frame_rx: Receiver<Frame>,
    sample_tx: Sender<JointSample>,
) {
    while let Some(frame) = recv_latest(&frame_rx) {
        match estimator.estimate(&frame) {
            Ok(sample) => {
                let _ = sample_tx.try_send(sample);
            }
            Err(err) => {
                log::warn!("pose inference failed: {err:?}");
            }
        }
    }
    log::debug!("frame buffer closed, inference stage exiting");
}

/// Inference thread: consumes the newest frame, runs pose estimation, and
/// publishes joint samples. Shuts down when the capture stage closes the
/// frame buffer.
pub struct InferenceStage {
    handle: Option<thread::JoinHandle<()>>,
}

impl InferenceStage {
    pub fn start(
        estimator: Box<dyn PoseEstimator>,
        frame_rx: Receiver<Frame>,
        sample_tx: Sender<JointSample>,
    ) -> InferenceStage {
        let handle = thread::spawn(move || run_inference_loop(estimator, frame_rx, sample_tx));
        InferenceStage {
            handle: Some(handle),
        }
    }

    pub fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
