use anyhow::{bail, Context, Result};
use bevy::log::{Level, LogPlugin};
use bevy::prelude::*;
use clap::Parser;
use std::path::{Path, PathBuf};
use wfc_core::wfc::{load_catalog_xml, CollapseRecording, RunConfig, TileCatalog, WfcRun};
use wfc_core::{StdRandom, WfcPlugin, WfcRunResource, WfcStatus};
use wfc_scripting::load_catalog_lua;

/// Fill a square grid with tiles using wave function collapse.
#[derive(Parser, Debug)]
#[command(name = "tile_studio", version, about)]
struct Args {
    /// Grid side length
    #[arg(long, default_value_t = wfc_core::wfc::DEFAULT_DIMENSION)]
    size: usize,

    /// RNG seed; a random one is chosen and logged when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Tile catalog (.xml or .lua); the built-in knot set when omitted
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Stop at the first contradiction instead of absorbing it
    #[arg(long)]
    strict: bool,

    /// Upper bound on ticks; defaults to one per cell plus one
    #[arg(long)]
    max_ticks: Option<u64>,

    /// Write the run recording as JSON
    #[arg(long)]
    record: Option<PathBuf>,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Args {
    fn log_level(&self) -> Level {
        if self.quiet {
            return Level::WARN;
        }
        match self.verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}

fn load_catalog(path: Option<&Path>) -> Result<TileCatalog> {
    let Some(path) = path else {
        return Ok(TileCatalog::knots());
    };
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("xml") => load_catalog_xml(path).context("loading XML tileset"),
        Some("lua") => load_catalog_lua(path).context("loading Lua catalog"),
        _ => bail!("unsupported catalog file {}: expected .xml or .lua", path.display()),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut app = App::new();
    app.add_plugins(LogPlugin {
        level: args.log_level(),
        ..default()
    });

    let catalog = load_catalog(args.catalog.as_deref())?;
    let rng = match args.seed {
        Some(seed) => StdRandom::from_u64_seed(seed),
        None => StdRandom::from_entropy(),
    };
    let seed = rng.seed();
    info!("Using seed {}", seed);

    let config = RunConfig::square(args.size).with_strict(args.strict);
    let run = WfcRun::with_config(catalog, config, rng).context("starting run")?;
    let max_ticks = args
        .max_ticks
        .unwrap_or(run.grid().len() as u64 + 1);

    app.add_plugins(WfcPlugin)
        .insert_resource(WfcRunResource::new(run));

    loop {
        let ticks = app.world().resource::<WfcRunResource>().run.tick_count();
        if app.world().resource::<WfcStatus>().finished || ticks >= max_ticks {
            break;
        }
        app.update();
    }

    let world = app.world();
    let run = &world.resource::<WfcRunResource>().run;
    let status = world.resource::<WfcStatus>();

    println!("{}", run.snapshot().to_text(run.catalog()));
    info!(
        "{} of {} cells collapsed in {} ticks",
        run.collapsed_count(),
        run.grid().len(),
        run.tick_count()
    );

    if let Some(path) = &args.record {
        CollapseRecording::from_run(run, Some(seed))
            .save(path)
            .with_context(|| format!("writing recording to {}", path.display()))?;
        info!("Recording saved to {}", path.display());
    }

    if let Some(err) = status.error {
        bail!("run aborted: {}", err);
    }
    if !status.finished {
        warn!("Stopped after {} ticks without finishing", max_ticks);
    }
    Ok(())
}
