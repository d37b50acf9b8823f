use std::path::PathBuf;

use clap::Parser;
use pause_blur::{BlurScreen, Screen, ScreenConfig, ScreenConstructor};

/// Walk around a low-poly house; Escape pauses and blurs the scene.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// JSON settings file; every field is optional.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the model, GUI image and blur shaders.
    #[arg(short, long)]
    assets: Option<PathBuf>,

    /// Number of horizontal + vertical blur iterations.
    #[arg(short, long)]
    passes: Option<u32>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ScreenConfig::load(path)?,
        None => ScreenConfig::default(),
    };
    if let Some(dir) = args.assets {
        config.asset_dir = Some(dir);
    }
    if let Some(passes) = args.passes {
        config.ping_pong_count = passes;
    }

    let screen_config = config.clone();
    let constructor: ScreenConstructor = Box::new(move |ctx| {
        Box::pin(async move {
            let screen = BlurScreen::new(ctx, screen_config).await?;
            Ok(Box::new(screen) as Box<dyn Screen>)
        })
    });

    pause_blur::run(&config, constructor)
}
