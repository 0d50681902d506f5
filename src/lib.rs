pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod grid;
pub mod level;
pub mod mode_controller;
pub mod rng;
pub mod targeting;
pub mod types;
