use std::path::PathBuf;
use std::process::ExitCode;

use winit::event_loop::{ControlFlow, EventLoop};

mod app;
mod assets;
mod config;
mod gpu;
mod simulation;

use app::App;
use config::FieldConfig;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut config = FieldConfig::desktop();
    let mut image_paths: Vec<PathBuf> = Vec::new();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--compact" => config = FieldConfig::compact(),
            "--help" | "-h" => {
                eprintln!("Usage: warpfield [--compact] [IMAGE...]");
                eprintln!("  --compact   small-screen field profile (24x48 grid)");
                eprintln!("  IMAGE       photos to display; cycle with Tab/arrows");
                return ExitCode::SUCCESS;
            }
            _ => image_paths.push(PathBuf::from(arg)),
        }
    }

    let mut app = match App::new(config, image_paths) {
        Ok(app) => app,
        Err(err) => {
            log::error!("Invalid configuration: {err}");
            return ExitCode::FAILURE;
        }
    };

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(err) => {
            log::error!("Failed to create event loop: {err}");
            return ExitCode::FAILURE;
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    if let Err(err) = event_loop.run_app(&mut app) {
        log::error!("Event loop error: {err}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
