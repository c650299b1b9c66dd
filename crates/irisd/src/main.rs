mod cli;
mod paths;
mod run;

use std::path::Path;

use anyhow::{Context, Result};
use cli::{Command, ConfigAction, ExportArgs, FallbackArgs, GeometryArgs, RunArgs};
use iris::{build_rings, RingParams, RingSpec};
use irisconfig::IrisConfig;
use paths::AppPaths;
use renderer::{render_fallback_image, render_iris_image, write_png};
use serde::Serialize;

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    match cli.command {
        Some(Command::Export(args)) => run_export(&cli.run, args),
        Some(Command::Fallback(args)) => run_fallback(&cli.run, args),
        Some(Command::Geometry(args)) => run_geometry(args),
        Some(Command::Config(config_cmd)) => handle_config_command(&cli.run, config_cmd.action),
        None => run::run(cli.run),
    }
}

fn load_config(args: &RunArgs) -> Result<IrisConfig> {
    let paths = AppPaths::discover()?;
    run::load_config_for(&paths, args.config.as_deref())
}

fn run_export(run_args: &RunArgs, args: ExportArgs) -> Result<()> {
    let config = load_config(run_args)?;
    let image = render_iris_image(args.size, args.time, &run::palette_from(&config));
    write_png(&image, &args.out)?;
    println!(
        "Wrote {}x{} iris frame at t={}s to {}",
        args.size,
        args.size,
        args.time,
        args.out.display()
    );
    Ok(())
}

fn run_fallback(run_args: &RunArgs, args: FallbackArgs) -> Result<()> {
    let config = load_config(run_args)?;
    let image = render_fallback_image(args.size, &run::palette_from(&config));
    write_png(&image, &args.out)?;
    println!(
        "Wrote {}x{} fallback disc to {}",
        args.size,
        args.size,
        args.out.display()
    );
    Ok(())
}

#[derive(Serialize)]
struct GeometryReport<'a> {
    params: &'a RingParams,
    rings: &'a [RingSpec],
}

fn run_geometry(args: GeometryArgs) -> Result<()> {
    let params = RingParams::default();
    let rings = build_rings(&params);
    let report = GeometryReport {
        params: &params,
        rings: &rings,
    };
    let json = if args.pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    }
    .context("failed to serialize ring geometry")?;
    println!("{json}");
    Ok(())
}

fn handle_config_command(run_args: &RunArgs, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Where => run_config_where(run_args),
        ConfigAction::Check => run_config_check(run_args),
        ConfigAction::Default => run_config_default(),
    }
}

fn run_config_where(run_args: &RunArgs) -> Result<()> {
    let paths = AppPaths::discover()?;
    let config_file = run_args
        .config
        .clone()
        .unwrap_or_else(|| paths.config_file());
    println!("Config directory: {}", paths.config_dir().display());
    println!(
        "Config file:      {}{}",
        config_file.display(),
        missing_marker(&config_file)
    );
    println!("Cache directory:  {}", paths.cache_dir().display());
    println!("Fallback image:   {}", paths.fallback_image().display());
    Ok(())
}

fn run_config_check(run_args: &RunArgs) -> Result<()> {
    let paths = AppPaths::discover()?;
    let path = run_args
        .config
        .clone()
        .unwrap_or_else(|| paths.config_file());
    let config = run::load_config_for(&paths, run_args.config.as_deref())?;
    if path.exists() {
        println!("{}: configuration OK", path.display());
    } else {
        println!("{}: not found; built-in defaults apply", path.display());
    }
    println!(
        "  motion: reduced={:?} pointer_follow={:?} max_frame_delta={:?}",
        config.motion.reduced, config.motion.pointer_follow, config.motion.max_frame_delta
    );
    println!(
        "  palette: primary={} secondary={} glint={}",
        config.palette.primary, config.palette.secondary, config.palette.glint
    );
    Ok(())
}

fn run_config_default() -> Result<()> {
    let toml = IrisConfig::default().to_toml_string()?;
    print!("{toml}");
    Ok(())
}

fn missing_marker(path: &Path) -> &'static str {
    if path.exists() {
        ""
    } else {
        " (missing)"
    }
}
