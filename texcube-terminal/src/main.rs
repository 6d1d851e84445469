/// texcube terminal demo - textured rotating cube
///
/// Renders the cube component with true-colour half blocks.
/// Controls:
///   - Q/ESC/Ctrl-C: Quit
use clap::Parser;
use std::path::PathBuf;
use texcube_terminal::{load_config, AppOptions, TerminalApp};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "texcube-terminal", about = "Textured rotating cube in the terminal")]
struct Cli {
    /// TOML file with component inputs (rotationSpeedX, cameraZ, ...)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Texture path, overrides the config file
    #[arg(short, long)]
    texture: Option<String>,

    /// Directory texture paths are resolved against
    #[arg(long, default_value = ".")]
    asset_root: PathBuf,

    /// Target frames per second
    #[arg(long, default_value = "60")]
    fps: u32,

    /// Exit after this many frames
    #[arg(long)]
    frames: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so they stay out of the alternate screen
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(texture) = cli.texture {
        config.texture = texture;
    }

    let options = AppOptions {
        fps: cli.fps,
        max_frames: cli.frames,
        asset_root: cli.asset_root,
    };

    tracing::info!(?config, "texcube-terminal starting");
    let mut app = TerminalApp::new(config, options)?;
    app.run()?;

    Ok(())
}
