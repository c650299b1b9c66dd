use std::fs;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use iris::{
    query_motion_preference, IrisOptions, MotionPreference, MotionQuery, Palette, PointerFollow,
    RingParams, SystemMotionQuery,
};
use irisconfig::{AntialiasSetting, IrisConfig, PointerFollowSetting, ReducedMotionSetting};
use renderer::{
    render_fallback_image, write_png, Antialiasing, PixelRatio, Renderer, RendererConfig,
    RendererError, SurfaceAlpha,
};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::RunArgs;
use crate::paths::AppPaths;

/// Largest fallback disc written after a GPU failure.
const FALLBACK_MAX_SIZE: u32 = 1024;

pub fn run(args: RunArgs) -> Result<()> {
    let paths = AppPaths::discover()?;
    debug!(
        config = %paths.config_dir().display(),
        cache = %paths.cache_dir().display(),
        "resolved irisd paths"
    );

    let mut config = load_config_for(&paths, args.config.as_deref())?;
    apply_overrides(&mut config, &args);
    config
        .validate()
        .context("invalid configuration after applying command-line overrides")?;

    let motion = resolve_motion(config.motion.reduced, &SystemMotionQuery::default());
    let mut renderer = Renderer::new(renderer_config(&config, motion));
    match renderer.run() {
        Ok(()) => Ok(()),
        Err(RendererError::SurfaceUnavailable(err)) => {
            warn!("GPU surface unavailable ({err:#}); writing static fallback disc");
            let path = paths.fallback_image();
            paths.ensure_cache_dir()?;
            let size = config
                .surface
                .width
                .min(config.surface.height)
                .min(FALLBACK_MAX_SIZE);
            write_png(&render_fallback_image(size, &palette_from(&config)), &path)?;
            warn!(path = %path.display(), "fallback disc written");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Loads the explicit `--config` file, or the default location when none was given.
///
/// A missing default file yields the built-in configuration; a missing explicit
/// file is an error.
pub fn load_config_for(paths: &AppPaths, explicit: Option<&Path>) -> Result<IrisConfig> {
    match explicit {
        Some(path) => load_config(path, true),
        None => load_config(&paths.config_file(), false),
    }
}

pub fn load_config(path: &Path, required: bool) -> Result<IrisConfig> {
    match fs::read_to_string(path) {
        Ok(contents) => {
            let config = IrisConfig::from_toml_str(&contents)
                .with_context(|| format!("failed to load configuration {}", path.display()))?;
            debug!(path = %path.display(), "loaded configuration");
            Ok(config)
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound && !required => {
            debug!(path = %path.display(), "no configuration file; using defaults");
            Ok(IrisConfig::default())
        }
        Err(err) => {
            Err(err).with_context(|| format!("failed to read configuration {}", path.display()))
        }
    }
}

pub fn apply_overrides(config: &mut IrisConfig, args: &RunArgs) {
    if let Some(size) = args.size {
        config.surface.width = size.width;
        config.surface.height = size.height;
    }
    if let Some(fps) = args.fps {
        config.surface.fps = Some(fps);
    }
    if let Some(antialias) = args.antialias {
        config.surface.antialias = Some(antialias);
    }
    if let Some(reduced) = args.reduced_motion {
        config.motion.reduced = reduced;
    }
    if let Some(follow) = args.pointer_follow {
        config.motion.pointer_follow = follow;
    }
    if args.fullscreen {
        config.surface.fullscreen = true;
    }
    if args.opaque {
        config.surface.transparent = false;
    }
}

/// Turns the configured setting into a concrete preference, asking `query`
/// only when the setting is `auto`.
pub fn resolve_motion(setting: ReducedMotionSetting, query: &dyn MotionQuery) -> MotionPreference {
    let (preference, source) = match setting {
        ReducedMotionSetting::Auto => (query_motion_preference(query), query.name()),
        ReducedMotionSetting::Reduce => (MotionPreference::Reduce, "config"),
        ReducedMotionSetting::NoPreference => (MotionPreference::NoPreference, "config"),
    };
    info!(
        reduced = preference.is_reduced(),
        source,
        "resolved reduced-motion preference"
    );
    preference
}

pub fn palette_from(config: &IrisConfig) -> Palette {
    let palette = &config.palette;
    Palette::from_rgb(
        palette.primary.to_unit(),
        palette.secondary.to_unit(),
        palette.glint.to_unit(),
    )
}

pub fn renderer_config(config: &IrisConfig, motion: MotionPreference) -> RendererConfig {
    let surface = &config.surface;
    let [min_ratio, max_ratio] = surface.pixel_ratio;
    RendererConfig {
        surface_size: (surface.width, surface.height),
        fullscreen: surface.fullscreen,
        decorations: surface.decorations,
        surface_alpha: if surface.transparent {
            SurfaceAlpha::Transparent
        } else {
            SurfaceAlpha::Opaque
        },
        pixel_ratio: PixelRatio::new(min_ratio, max_ratio),
        target_fps: config.target_fps(),
        antialiasing: antialiasing_from(surface.antialias),
        max_frame_delta: config.motion.max_frame_delta,
        iris: IrisOptions {
            motion,
            follow: match config.motion.pointer_follow {
                PointerFollowSetting::Always => PointerFollow::Always,
                PointerFollowSetting::WithMotion => PointerFollow::WithMotion,
            },
            palette: palette_from(config),
            rings: RingParams::default(),
        },
    }
}

fn antialiasing_from(setting: Option<AntialiasSetting>) -> Antialiasing {
    match setting.and_then(AntialiasSetting::sample_count) {
        None => Antialiasing::Auto,
        Some(1) => Antialiasing::Off,
        Some(samples) => Antialiasing::Samples(samples),
    }
}
