//! tinyarcade: plays a RON level in a desktop window
//!
//! The window stands in for the workshop board: keyboard and gamepad for
//! the buttons and IMU, an integer-scaled view for the TFT.
//!
//! Keys: arrows/WASD move, Space/Z jump, X/Shift run, Enter start,
//! P pause, Escape quit, F2 cycle the FPS limit.

use std::path::{Path, PathBuf};

use clap::Parser;
use macroquad::prelude::*;

use tinyarcade::game::{FpsLimit, FrameControl, FramePacer, GameLoop};
use tinyarcade::host::{HostInput, Settings, SpriteManifest, WindowSurface};
use tinyarcade::world::load_level;
use tinyarcade::{Error, VERSION};

const DEFAULT_LEVEL: &str = "assets/levels/super_mario.ron";

#[derive(Parser, Debug)]
#[command(name = "tinyarcade", version, about = "Play a tinyarcade level")]
struct Args {
    /// Level file (plain or brotli-packed RON)
    level: Option<PathBuf>,
    /// Sprite manifest
    #[arg(long)]
    sprites: Option<PathBuf>,
    /// FPS limit: 30, 60 or unlocked
    #[arg(long, value_parser = parse_fps)]
    fps: Option<FpsLimit>,
    /// Window pixels per game pixel (0 fits the window)
    #[arg(long)]
    scale: Option<u32>,
}

fn parse_fps(s: &str) -> Result<FpsLimit, String> {
    FpsLimit::from_arg(s).ok_or_else(|| format!("expected 30, 60 or unlocked, got '{}'", s))
}

fn window_conf() -> Conf {
    Conf {
        window_title: format!("tinyarcade v{}", VERSION),
        window_width: 960,
        window_height: 540,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    // Initialize crash logging FIRST (before any other code)
    #[cfg(not(target_arch = "wasm32"))]
    crashlog::setup!(crashlog::cargo_metadata!().capitalized(), false);

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut settings = Settings::load();
    if let Some(fps) = args.fps {
        settings.fps = fps;
    }
    if let Some(scale) = args.scale {
        settings.scale = scale;
    }
    if let Some(sprites) = args.sprites {
        settings.sprites = sprites;
    }
    let level_path = args
        .level
        .or_else(|| settings.last_level.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LEVEL));

    match play(&mut settings, &level_path).await {
        Ok(()) => settings.last_level = Some(level_path),
        Err(e) => log::error!("{}: {}", level_path.display(), e),
    }
    settings.save();
}

/// Load the sprites and the level, then run frames until Quit
async fn play(settings: &mut Settings, level_path: &Path) -> Result<(), Error> {
    log::info!("Sprites: {}", settings.sprites.display());
    let manifest = SpriteManifest::load(&settings.sprites)?;
    let sheet_dir = settings.sprites.parent().unwrap_or(Path::new(".")).to_path_buf();
    let sheets = manifest.load_sheets(&sheet_dir);

    let level = load_level(level_path)?;
    let mut game = GameLoop::new(manifest.sprite_table());
    game.initialize(&level)?;

    let mut surface = WindowSurface::new(&sheets, level.viewport_size(), settings.scale);
    let mut input = HostInput::new();
    #[cfg(not(target_arch = "wasm32"))]
    let mut pacer = FramePacer::new(settings.fps);

    println!("=== tinyarcade v{} ===", VERSION);

    loop {
        if is_key_pressed(KeyCode::F2) {
            settings.fps = settings.fps.next();
            #[cfg(not(target_arch = "wasm32"))]
            pacer.set_limit(settings.fps);
            log::info!("FPS limit: {}", settings.fps.label());
        }

        // Native: the pacer sleeps out each frame. WASM: the browser paces frames.
        #[cfg(not(target_arch = "wasm32"))]
        let dt = pacer.begin_frame();
        #[cfg(target_arch = "wasm32")]
        let dt = get_frame_time();

        if game.run_frame(&mut input, &mut surface, dt)? == FrameControl::Quit {
            break;
        }

        #[cfg(not(target_arch = "wasm32"))]
        pacer.end_frame();

        next_frame().await;
    }

    log::info!("Finished at frame {} with score {}", game.frame(), game.score());
    Ok(())
}
