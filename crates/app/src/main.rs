//! Entry point for Nightguard.
//! Logging, config file + CLI overrides, then hand the scene to the platform loop.

mod config;

use anyhow::{Context, Result};
use platform::RunOptions;
use renderer::GuardScene;

use crate::config::{AppConfig, config_path_from_args};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut config = match config_path_from_args(&args) {
        Some(path) => AppConfig::load(&path).context("Loading configuration")?,
        None => AppConfig::default(),
    };
    config.apply_args(&args);

    log::info!(
        "Starting Nightguard. Backend: {:?}, mode={}, fog={}, show_fps={}, window_size={}x{}",
        config.render.gpu_backend,
        config.mode().label(),
        config.render.fog,
        config.render.show_fps,
        config.window.width,
        config.window.height
    );

    let scene = GuardScene::new(config.scene_state(), config.scene_assets());
    platform::run(
        RunOptions {
            title: config.window.title.clone(),
            width: config.window.width,
            height: config.window.height,
            backends: config.render.gpu_backend.backends(),
        },
        scene,
    )?;

    log::info!("Graceful shutdown. Bye!");
    Ok(())
}
