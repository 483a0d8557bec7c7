//! Webcam motion arcade: a capture / pose-inference / render pipeline feeding
//! a full-body target game. Players pop targets with their hands and feet,
//! tracked by a MoveNet multipose model.

pub mod config;
pub mod game;
pub mod menu;
pub mod pipeline;
pub mod pose;
pub mod render;
pub mod types;
