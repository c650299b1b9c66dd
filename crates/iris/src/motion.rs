use std::env;
use std::process::Command;

use tracing::debug;

pub const ENV_REDUCED_MOTION: &str = "IRIS_REDUCED_MOTION";

/// The user's reduced-motion accessibility preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotionPreference {
    #[default]
    NoPreference,
    Reduce,
}

impl MotionPreference {
    pub fn from_reduced(reduced: bool) -> Self {
        if reduced {
            Self::Reduce
        } else {
            Self::NoPreference
        }
    }

    pub fn is_reduced(self) -> bool {
        matches!(self, Self::Reduce)
    }
}

/// A source that may know whether motion should be reduced.
///
/// `None` means the source cannot answer (unset variable, missing desktop
/// service, non-interactive session).
pub trait MotionQuery {
    fn name(&self) -> &'static str;
    fn prefers_reduced_motion(&self) -> Option<bool>;
}

/// Reads [`ENV_REDUCED_MOTION`] (`1`/`true`/`reduce` or `0`/`false`/`no-preference`).
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvMotionQuery;

impl MotionQuery for EnvMotionQuery {
    fn name(&self) -> &'static str {
        "environment"
    }

    fn prefers_reduced_motion(&self) -> Option<bool> {
        env::var(ENV_REDUCED_MOTION)
            .ok()
            .and_then(|raw| parse_reduced_flag(&raw))
    }
}

/// Asks GNOME whether animations are enabled; disabled animations count as a
/// reduced-motion request.
#[derive(Debug, Clone, Copy, Default)]
pub struct GnomeAnimationsQuery;

impl MotionQuery for GnomeAnimationsQuery {
    fn name(&self) -> &'static str {
        "gsettings"
    }

    fn prefers_reduced_motion(&self) -> Option<bool> {
        let output = Command::new("gsettings")
            .args(["get", "org.gnome.desktop.interface", "enable-animations"])
            .output()
            .ok()?;
        if !output.status.success() {
            return None;
        }
        let enabled = parse_gsettings_bool(&String::from_utf8_lossy(&output.stdout))?;
        Some(!enabled)
    }
}

/// Asks each query in order and keeps the first answer.
pub struct SystemMotionQuery {
    queries: Vec<Box<dyn MotionQuery>>,
}

impl SystemMotionQuery {
    pub fn new(queries: Vec<Box<dyn MotionQuery>>) -> Self {
        Self { queries }
    }
}

impl Default for SystemMotionQuery {
    fn default() -> Self {
        Self::new(vec![
            Box::new(EnvMotionQuery),
            Box::new(GnomeAnimationsQuery),
        ])
    }
}

impl MotionQuery for SystemMotionQuery {
    fn name(&self) -> &'static str {
        "system"
    }

    fn prefers_reduced_motion(&self) -> Option<bool> {
        self.queries.iter().find_map(|query| {
            let answer = query.prefers_reduced_motion();
            if let Some(reduced) = answer {
                debug!(source = query.name(), reduced, "reduced-motion preference answered");
            }
            answer
        })
    }
}

/// Resolves the preference, treating an unanswerable query as "no preference".
pub fn query_motion_preference(query: &dyn MotionQuery) -> MotionPreference {
    match query.prefers_reduced_motion() {
        Some(reduced) => MotionPreference::from_reduced(reduced),
        None => {
            debug!(
                source = query.name(),
                "reduced-motion preference unavailable; assuming no preference"
            );
            MotionPreference::NoPreference
        }
    }
}

fn parse_reduced_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "reduce" | "reduced" => Some(true),
        "0" | "false" | "no" | "no-preference" => Some(false),
        _ => None,
    }
}

fn parse_gsettings_bool(raw: &str) -> Option<bool> {
    match raw.trim() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}
