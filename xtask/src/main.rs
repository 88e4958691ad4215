//! Level tooling for tinyarcade
//!
//! Usage:
//!   cargo xtask check-levels              # Validate every level in assets/levels
//!   cargo xtask pack-level <in> <out>     # Brotli-pack a level for the board
//!   cargo xtask unpack-level <in> <out>   # Pretty-print a packed level as RON

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use tinyarcade::game::GameLoop;
use tinyarcade::host::SpriteManifest;
use tinyarcade::world::{load_level, save_level, serialize_level};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Level tooling for tinyarcade")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load every level under a directory and initialize it against the sprite manifest
    CheckLevels {
        /// Directory of level files (default: assets/levels)
        #[arg(long)]
        dir: Option<PathBuf>,
        /// Sprite manifest (default: assets/sprites.ron)
        #[arg(long)]
        sprites: Option<PathBuf>,
    },
    /// Compress a level with brotli
    PackLevel { input: PathBuf, output: PathBuf },
    /// Write a (possibly packed) level back out as plain RON
    UnpackLevel { input: PathBuf, output: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::CheckLevels { dir, sprites } => {
            let root = project_root();
            check_levels(
                &dir.unwrap_or_else(|| root.join("assets/levels")),
                &sprites.unwrap_or_else(|| root.join("assets/sprites.ron")),
            )
        }
        Commands::PackLevel { input, output } => pack_level(&input, &output),
        Commands::UnpackLevel { input, output } => unpack_level(&input, &output),
    }
}

/// Get the project root directory
fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Validate all `.ron` levels in `dir`
fn check_levels(dir: &Path, sprites: &Path) -> Result<()> {
    let manifest = SpriteManifest::load(sprites)
        .with_context(|| format!("Failed to load sprite manifest {}", sprites.display()))?;

    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "ron"))
        .collect();
    paths.sort();

    let mut failures = 0;
    for path in &paths {
        let result = load_level(path).and_then(|level| {
            let mut game = GameLoop::new(manifest.sprite_table());
            game.initialize(&level).map(|()| level)
        });
        match result {
            Ok(level) => println!("ok    {} ({}, {} entities)", path.display(), level.name, level.entities.len()),
            Err(e) => {
                println!("FAIL  {}: {}", path.display(), e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} levels failed", failures, paths.len());
    }
    println!("{} levels ok", paths.len());
    Ok(())
}

fn pack_level(input: &Path, output: &Path) -> Result<()> {
    let level = load_level(input).with_context(|| format!("Failed to load {}", input.display()))?;
    save_level(&level, output).with_context(|| format!("Failed to write {}", output.display()))?;

    let before = std::fs::metadata(input)?.len();
    let after = std::fs::metadata(output)?.len();
    println!("Packed {} -> {} ({} -> {} bytes)", input.display(), output.display(), before, after);
    Ok(())
}

fn unpack_level(input: &Path, output: &Path) -> Result<()> {
    let level = load_level(input).with_context(|| format!("Failed to load {}", input.display()))?;
    std::fs::write(output, serialize_level(&level)?)?;
    println!("Unpacked {} -> {}", input.display(), output.display());
    Ok(())
}
