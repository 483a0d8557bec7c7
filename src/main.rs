use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, bounded};
use log::{info, warn};

use pose_arcade::config::Config;
use pose_arcade::game::{GameMode, GameSession, ModeKind, TwoPlayerSplit};
use pose_arcade::menu::{Menu, MenuEvent, PlayerCount};
use pose_arcade::pipeline::{BUFFER_CAPACITY, CameraSource, CaptureStage, InferenceStage};
use pose_arcade::pose::MoveNetEstimator;
use pose_arcade::render::{Canvas, GameWindow, skeleton};
use pose_arcade::types::{Frame, JointSample};

const CONFIG_PATH: &str = "pose-arcade.toml";

fn load_config() -> Result<Config> {
    if Path::new(CONFIG_PATH).exists() {
        let config = Config::load(CONFIG_PATH)
            .with_context(|| format!("failed to load {CONFIG_PATH}"))?;
        info!("loaded configuration from {CONFIG_PATH}");
        Ok(config)
    } else {
        info!("no {CONFIG_PATH} found, using defaults");
        Ok(Config::default())
    }
}

/// Probe the camera once on the main thread: resolution for the window and
/// game geometry, plus an optional frame-rate benchmark. The capture thread
/// opens its own handle afterwards.
fn probe_camera(config: &Config) -> Result<(u32, u32, u32)> {
    let mut source = CameraSource::open(config.app.camera_index)?;
    let (width, height) = source.resolution();
    info!("camera {} delivers {width}x{height}", config.app.camera_index);

    let fps = if config.benchmark.enabled {
        match source.benchmark_fps(config.benchmark.frame_count) {
            Ok(fps) => {
                info!("measured camera rate: {fps} fps");
                fps
            }
            Err(err) => {
                warn!(
                    "camera benchmark failed ({err:?}), pacing at {} fps",
                    config.benchmark.default_fps
                );
                config.benchmark.default_fps
            }
        }
    } else {
        config.benchmark.default_fps
    };
    Ok((width, height, fps))
}

/// Drain a buffer without blocking, keeping only the newest element.
fn drain_latest<T>(rx: &Receiver<T>) -> Option<T> {
    let mut latest = None;
    while let Ok(value) = rx.try_recv() {
        latest = Some(value);
    }
    latest
}

fn build_session(
    players: PlayerCount,
    mode: ModeKind,
    config: &Config,
    width: u32,
    height: u32,
) -> GameSession {
    let threshold = config.app.detection_threshold;
    match players {
        PlayerCount::One => {
            GameSession::Solo(GameMode::new(mode, &config.gameplay, width, height, threshold))
        }
        PlayerCount::Two => {
            let half = width / 2;
            let left = GameMode::new(mode, &config.gameplay, half, height, threshold);
            let right = GameMode::new(mode, &config.gameplay, half, height, threshold);
            GameSession::Split(TwoPlayerSplit::new(left, right, threshold))
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let config = load_config()?;
    let (width, height, fps) = probe_camera(&config)?;
    config.validate_for_area(width, height)?;
    config.validate_for_area(width / 2, height)?;

    let estimator = MoveNetEstimator::load(&config.app.model_path)
        .with_context(|| format!("failed to load model {:?}", config.app.model_path))?;

    let (render_tx, render_rx) = bounded::<Frame>(BUFFER_CAPACITY);
    let (frame_tx, frame_rx) = bounded::<Frame>(BUFFER_CAPACITY);
    let (sample_tx, sample_rx) = bounded::<JointSample>(BUFFER_CAPACITY);

    let capture = CaptureStage::start(config.app.camera_index, render_tx, frame_tx)?;
    let inference = InferenceStage::start(Box::new(estimator), frame_rx, sample_tx);

    let mut window = GameWindow::new(&config.app.window_title, width, height)?;
    let tick = Duration::from_secs_f64(1.0 / fps as f64);
    let threshold = config.app.detection_threshold;

    let mut menu = Menu::new(width, height, threshold);
    let mut session: Option<GameSession> = None;
    let mut last_frame: Option<Frame> = None;
    let mut last_sample = JointSample::default();

    while window.is_open() {
        let tick_start = Instant::now();

        if let Some(frame) = drain_latest(&render_rx) {
            last_frame = Some(frame);
        }
        if let Some(sample) = drain_latest(&sample_rx) {
            last_sample = sample;
        }
        let Some(frame) = last_frame.as_ref() else {
            warn!("no camera frame yet, skipping tick");
            std::thread::sleep(tick);
            continue;
        };

        let mut frame = frame.clone();
        let mut sample = last_sample.clone();
        if config.app.flip_image {
            frame.flip_horizontal();
            sample = sample.flipped();
        }

        {
            let mut canvas = Canvas::new(&mut frame);
            skeleton::draw_persons(&mut canvas, &sample.persons, threshold);
            for person in &sample.persons {
                skeleton::draw_limb_circles(
                    &mut canvas,
                    person,
                    config.gameplay.circle_radius as i32,
                    threshold,
                );
            }
        }

        match session.as_mut() {
            Some(active) => {
                if !active.process(&mut frame, &sample) {
                    info!("round over");
                    session = None;
                    menu.reset();
                }
            }
            None => {
                let mut canvas = Canvas::new(&mut frame);
                match menu.process(&mut canvas, &sample.persons) {
                    MenuEvent::Idle => {}
                    MenuEvent::Quit => break,
                    MenuEvent::Launch(setup) => {
                        info!("starting {:?} round for {:?}", setup.mode, setup.players);
                        session = Some(build_session(
                            setup.players,
                            setup.mode,
                            &config,
                            width,
                            height,
                        ));
                    }
                }
            }
        }

        window.present(&frame)?;

        let elapsed = tick_start.elapsed();
        if elapsed < tick {
            std::thread::sleep(tick - elapsed);
        }
    }

    capture.stop();
    inference.join();
    Ok(())
}
