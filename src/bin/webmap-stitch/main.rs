mod args;
mod validators;

use anyhow::{bail, Context, Result};
use args::Args;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::EnvFilter;
use webmap_stitch::{ImageCanvas, MapManager};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse()?;
    let bbox = &args.bounding_box;

    if args.dry_run {
        bbox.validate()?;
        let tile_count = if args.provider.single_request() {
            1
        } else {
            bbox.tile_grid(args.zoom)?.tile_count()
        };

        eprintln!(
            "would download {} tiles (approx {}, assuming 10 kb per tile)",
            tile_count,
            pretty_bytes::converter::convert((tile_count as f64) * 10_000f64)
        );

        return Ok(());
    }

    if !args.overwrite && args.output.exists() {
        bail!(
            "{} already exists, not overwriting it",
            args.output.display()
        );
    }

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:60.cyan/blue} {pos:>7}/{len:7} ETA: {eta} {msg}")?
            .progress_chars("##-"),
    );

    let mut manager = MapManager::new(args.manager_config())?.with_progress(pb);
    let map = manager
        .create_map::<ImageCanvas>(bbox, args.zoom, &args.map_options())
        .await?;

    map.image
        .save(&args.output)
        .with_context(|| format!("failed saving map to {}", args.output.display()))?;

    info!(output = %args.output.display(), "map written");
    println!(
        "north={} south={} east={} west={}",
        map.bounds.max_lat, map.bounds.min_lat, map.bounds.max_lon, map.bounds.min_lon
    );

    Ok(())
}
