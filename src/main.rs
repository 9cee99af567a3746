use anyhow::Context;
use brushkit::{generate, init_logging, write_program, PainterConfig, BUILD_DATE, VERSION};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "brushkit", version, about = "Raster artwork to brush-painting G-code")]
struct Cli {
    /// Painter configuration (JSON or TOML)
    #[arg(short, long, required_unless_present = "print_default_config")]
    config: Option<PathBuf>,

    /// Output G-code path (stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Seed for station jitter and paint budgets; overrides the config
    #[arg(long)]
    seed: Option<u64>,

    /// Print the default configuration as TOML and exit
    #[arg(long)]
    print_default_config: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.print_default_config {
        print!("{}", PainterConfig::default().to_toml_string()?);
        return Ok(());
    }

    init_logging()?;
    tracing::info!("brushkit {} (built {})", VERSION, BUILD_DATE);

    let config_path = cli.config.context("--config is required")?;
    let mut config = PainterConfig::load_from_file(&config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;
    if let Some(seed) = cli.seed {
        config.global.seed = Some(seed);
    }

    let output = generate(&config)?;
    write_program(&output.stream, cli.output.as_deref())?;

    let stats = output.stream.stats();
    tracing::info!(
        "Wrote {} lines: {} paint/spiral moves, {} rapids, {} replenishment cycles (seed {})",
        stats.lines,
        stats.linear_xy_moves,
        stats.rapid_xy_moves,
        stats.replenishment_cycles,
        output.seed
    );
    for layer in &output.layers {
        for condition in &layer.degenerate {
            tracing::warn!("{}: {}", layer.label, condition);
        }
    }

    Ok(())
}
