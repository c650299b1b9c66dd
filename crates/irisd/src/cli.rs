use std::path::PathBuf;

use clap::{Parser, Subcommand};
use irisconfig::{AntialiasSetting, PointerFollowSetting, ReducedMotionSetting};

/// Largest edge accepted for CPU-rendered stills.
const MAX_IMAGE_SIZE: u32 = 8192;

#[derive(Parser, Debug)]
#[command(
    name = "irisd",
    author,
    version,
    about = "Animated iris backdrop",
    arg_required_else_help = false
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Parser, Debug, Default)]
pub struct RunArgs {
    /// Configuration file to load instead of `<config dir>/config.toml`.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override the window size in logical pixels (e.g. `1280x800`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_surface_size)]
    pub size: Option<SurfaceSize>,

    /// Optional FPS cap while animating (0=uncapped).
    #[arg(long, value_name = "FPS")]
    pub fps: Option<f32>,

    /// Anti-aliasing policy: `auto`, `off`, or an explicit MSAA sample count (e.g. `4`).
    #[arg(long, value_name = "MODE", value_parser = irisconfig::parse_antialias)]
    pub antialias: Option<AntialiasSetting>,

    /// Reduced-motion preference: `auto`, `reduce`, or `no-preference`.
    #[arg(long, value_name = "MODE", value_parser = parse_reduced_motion)]
    pub reduced_motion: Option<ReducedMotionSetting>,

    /// Whether the lens follows the pointer when motion is reduced: `always` or `with-motion`.
    #[arg(long, value_name = "MODE", value_parser = parse_pointer_follow)]
    pub pointer_follow: Option<PointerFollowSetting>,

    /// Cover the whole output with a borderless fullscreen window.
    #[arg(long)]
    pub fullscreen: bool,

    /// Clear to black instead of requesting a transparent surface.
    #[arg(long)]
    pub opaque: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render one iris frame on the CPU and write it as PNG.
    Export(ExportArgs),
    /// Write the static fallback disc as PNG.
    Fallback(FallbackArgs),
    /// Print the procedural ring geometry as JSON.
    Geometry(GeometryArgs),
    /// Inspect the configuration file.
    Config(ConfigCommand),
}

#[derive(Parser, Debug)]
pub struct ExportArgs {
    /// Destination PNG path.
    #[arg(long, value_name = "PATH")]
    pub out: PathBuf,

    /// Edge length of the square image in pixels.
    #[arg(long, value_name = "PIXELS", default_value_t = 512, value_parser = parse_image_size)]
    pub size: u32,

    /// Shader time in seconds to evaluate.
    #[arg(long, value_name = "SECONDS", default_value_t = 0.0, value_parser = parse_time)]
    pub time: f32,
}

#[derive(Parser, Debug)]
pub struct FallbackArgs {
    /// Destination PNG path.
    #[arg(long, value_name = "PATH")]
    pub out: PathBuf,

    /// Edge length of the square image in pixels.
    #[arg(long, value_name = "PIXELS", default_value_t = 512, value_parser = parse_image_size)]
    pub size: u32,
}

#[derive(Parser, Debug)]
pub struct GeometryArgs {
    /// Pretty-print the JSON output.
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Parser, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print resolved config and cache locations.
    Where,
    /// Load and validate the configuration file.
    Check,
    /// Print the default configuration as TOML.
    Default,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_surface_size(value: &str) -> Result<SurfaceSize, String> {
    let trimmed = value.trim();
    let (width, height) = trimmed
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("invalid size '{trimmed}'; expected WIDTHxHEIGHT"))?;
    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| format!("invalid width in '{trimmed}'"))?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| format!("invalid height in '{trimmed}'"))?;
    if width == 0 || height == 0 {
        return Err("size dimensions must be greater than zero".to_string());
    }
    Ok(SurfaceSize { width, height })
}

pub fn parse_image_size(value: &str) -> Result<u32, String> {
    let trimmed = value.trim();
    let size: u32 = trimmed
        .parse()
        .map_err(|_| format!("invalid image size '{trimmed}'"))?;
    if size == 0 || size > MAX_IMAGE_SIZE {
        return Err(format!(
            "image size must be between 1 and {MAX_IMAGE_SIZE} pixels"
        ));
    }
    Ok(size)
}

pub fn parse_time(value: &str) -> Result<f32, String> {
    let trimmed = value.trim();
    let seconds: f32 = trimmed
        .parse()
        .map_err(|_| format!("invalid time '{trimmed}'; expected seconds"))?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err("time must be a finite, non-negative number of seconds".to_string());
    }
    Ok(seconds)
}

pub fn parse_reduced_motion(value: &str) -> Result<ReducedMotionSetting, String> {
    value.parse()
}

pub fn parse_pointer_follow(value: &str) -> Result<PointerFollowSetting, String> {
    value.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_size_accepts_either_separator_case() {
        assert_eq!(
            parse_surface_size("1920x1080").unwrap(),
            SurfaceSize {
                width: 1920,
                height: 1080
            }
        );
        assert_eq!(
            parse_surface_size(" 800X600 ").unwrap(),
            SurfaceSize {
                width: 800,
                height: 600
            }
        );
    }

    #[test]
    fn surface_size_rejects_malformed_values() {
        assert!(parse_surface_size("1920").is_err());
        assert!(parse_surface_size("0x600").is_err());
        assert!(parse_surface_size("widexhigh").is_err());
    }

    #[test]
    fn image_size_is_bounded() {
        assert_eq!(parse_image_size("256").unwrap(), 256);
        assert!(parse_image_size("0").is_err());
        assert!(parse_image_size("9000").is_err());
        assert!(parse_image_size("-4").is_err());
    }

    #[test]
    fn time_must_be_non_negative() {
        assert_eq!(parse_time("1.5").unwrap(), 1.5);
        assert!(parse_time("-1").is_err());
        assert!(parse_time("inf").is_err());
        assert!(parse_time("soon").is_err());
    }

    #[test]
    fn motion_flags_parse() {
        assert_eq!(
            parse_reduced_motion("reduce").unwrap(),
            ReducedMotionSetting::Reduce
        );
        assert_eq!(
            parse_reduced_motion("no-preference").unwrap(),
            ReducedMotionSetting::NoPreference
        );
        assert_eq!(
            parse_pointer_follow("always").unwrap(),
            PointerFollowSetting::Always
        );
        assert!(parse_pointer_follow("sometimes").is_err());
    }

    #[test]
    fn subcommands_parse() {
        let cli = Cli::try_parse_from(["irisd", "export", "--out", "iris.png", "--time", "2"])
            .unwrap();
        match cli.command {
            Some(Command::Export(args)) => {
                assert_eq!(args.out, PathBuf::from("iris.png"));
                assert_eq!(args.size, 512);
                assert_eq!(args.time, 2.0);
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::try_parse_from(["irisd", "config", "check"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Config(ConfigCommand {
                action: ConfigAction::Check
            }))
        ));
    }

    #[test]
    fn run_flags_parse_without_subcommand() {
        let cli = Cli::try_parse_from([
            "irisd",
            "--size",
            "640x480",
            "--reduced-motion",
            "reduce",
            "--antialias",
            "4",
            "--opaque",
        ])
        .unwrap();
        assert!(cli.command.is_none());
        assert_eq!(
            cli.run.size,
            Some(SurfaceSize {
                width: 640,
                height: 480
            })
        );
        assert_eq!(cli.run.reduced_motion, Some(ReducedMotionSetting::Reduce));
        assert_eq!(cli.run.antialias, Some(AntialiasSetting::Samples4));
        assert!(cli.run.opaque);
        assert!(!cli.run.fullscreen);
    }
}
