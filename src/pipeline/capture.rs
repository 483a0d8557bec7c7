use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::Instant,
};

use anyhow::{Result, anyhow};
use crossbeam_channel::Sender;
use nokhwa::{
    Camera,
    pixel_format::RgbFormat,
    utils::{CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType},
};

use super::rgba_converter;
use crate::types::Frame;

// Pixel formats most drivers actually deliver; tried best-first.
const PREFERRED_PIXEL_FORMATS: &[FrameFormat] = &[
    FrameFormat::RAWRGB,
    FrameFormat::RAWBGR,
    FrameFormat::GRAY,
    FrameFormat::YUYV,
    FrameFormat::NV12,
    FrameFormat::MJPEG,
];

fn requested_formats() -> [RequestedFormat<'static>; 3] {
    [
        RequestedFormat::with_formats(
            RequestedFormatType::AbsoluteHighestFrameRate,
            PREFERRED_PIXEL_FORMATS,
        ),
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate),
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::None),
    ]
}

/// An open camera delivering decoded RGBA frames. Opening fails fast, so a
/// missing or busy device is a startup error rather than a silent idle loop.
pub struct CameraSource {
    camera: Camera,
}

impl CameraSource {
    pub fn open(index: u32) -> Result<Self> {
        let index = CameraIndex::Index(index);
        let mut last_err = None;

        for requested in requested_formats() {
            match Camera::new(index.clone(), requested) {
                Ok(mut camera) => match camera.open_stream() {
                    Ok(()) => return Ok(CameraSource { camera }),
                    Err(err) => last_err = Some(err.into()),
                },
                Err(err) => last_err = Some(err.into()),
            }
        }
        Err(last_err.unwrap_or_else(|| anyhow!("no supported camera format")))
    }

    pub fn resolution(&self) -> (u32, u32) {
        let res = self.camera.resolution();
        (res.width_x, res.height_y)
    }

    pub fn read_frame(&mut self) -> Result<Frame> {
        let buffer = self.camera.frame()?;
        let rgba = rgba_converter::decode_to_rgba(&buffer)?;
        let resolution = buffer.resolution();
        Ok(Frame {
            rgba,
            width: resolution.width_x,
            height: resolution.height_y,
            timestamp: Instant::now(),
        })
    }

    /// Measure the camera's effective frame rate by timing `frame_count`
    /// reads. The result paces the render loop.
    pub fn benchmark_fps(&mut self, frame_count: u32) -> Result<u32> {
        log::info!("benchmarking camera input rate over {frame_count} frames");
        let start = Instant::now();
        for _ in 0..frame_count {
            let _ = self.camera.frame()?;
        }
        let elapsed = start.elapsed();
        let fps = (frame_count as f64 / elapsed.as_secs_f64()).round() as u32;
        log::info!(
            "read {frame_count} frames in {:.3}s [{fps} fps]",
            elapsed.as_secs_f64()
        );
        Ok(fps.max(1))
    }
}

/// Capture thread: reads frames as fast as the camera delivers them and fans
/// each one out to the render and inference buffers. A failed read skips the
/// tick; the buffers keep their previous content.
pub struct CaptureStage {
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl CaptureStage {
    /// The camera is probed before the thread spawns so open errors surface
    /// here; the thread then reopens it for its own use.
    pub fn start(
        camera_index: u32,
        render_tx: Sender<Frame>,
        inference_tx: Sender<Frame>,
    ) -> Result<CaptureStage> {
        drop(CameraSource::open(camera_index)?);

        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = stop.clone();

        let handle = thread::spawn(move || {
            let mut source = match CameraSource::open(camera_index) {
                Ok(source) => source,
                Err(err) => {
                    log::error!("failed to reopen camera: {err:?}");
                    return;
                }
            };

            while !stop_flag.load(Ordering::Relaxed) {
                let frame = match source.read_frame() {
                    Ok(frame) => frame,
                    Err(err) => {
                        log::warn!("camera frame read failed: {err:?}");
                        continue;
                    }
                };

                // Drop on overflow; consumers drain to the newest element.
                let _ = inference_tx.try_send(frame.clone());
                let _ = render_tx.try_send(frame);
            }
            // Senders drop here, closing both buffers and letting the
            // inference stage wind down on its own.
        });

        Ok(CaptureStage {
            stop,
            handle: Some(handle),
        })
    }

    /// Cooperative shutdown: the thread notices the flag on its next
    /// iteration and releases the camera.
    pub fn stop(mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for CaptureStage {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
