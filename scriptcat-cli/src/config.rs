//! CLI configuration
//!
//! Log levels and the parsers clap uses for flag values.

use scriptcat_api::TemplateValue;
use scriptcat_config::Phase;
use std::collections::HashMap;
use tracing::level_filters::LevelFilter;

/// CLI log configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub global: LevelFilter,
    pub phases: HashMap<Phase, LevelFilter>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            global: LevelFilter::WARN,
            phases: HashMap::new(),
        }
    }
}

impl LogConfig {
    /// Get log level for a specific phase
    pub fn level_for(&self, phase: Phase) -> LevelFilter {
        self.phases.get(&phase).copied().unwrap_or(self.global)
    }
}

/// `off`, `error`, `warn`, `info`, `debug` or `trace`; `silent` is `off`
pub fn parse_level(s: &str) -> Result<LevelFilter, String> {
    match s.to_lowercase().as_str() {
        "silent" | "off" => Ok(LevelFilter::OFF),
        "error" => Ok(LevelFilter::ERROR),
        "warn" => Ok(LevelFilter::WARN),
        "info" => Ok(LevelFilter::INFO),
        "debug" => Ok(LevelFilter::DEBUG),
        "trace" => Ok(LevelFilter::TRACE),
        other => Err(format!("unknown log level '{}'", other)),
    }
}

/// `PHASE=LEVEL`, e.g. `resolve=debug`
pub fn parse_phase_level(s: &str) -> Result<(Phase, LevelFilter), String> {
    let (phase, level) = s
        .split_once('=')
        .ok_or_else(|| format!("expected PHASE=LEVEL, got '{}'", s))?;
    let phase = Phase::ALL
        .into_iter()
        .find(|p| p.as_str() == phase)
        .ok_or_else(|| format!("unknown phase '{}'", phase))?;
    Ok((phase, parse_level(level)?))
}

/// `KEY=VALUE` template define; `KEY` alone means `KEY=true`.
///
/// `true`/`false` become booleans and integers become numbers; anything else
/// is a string.
pub fn parse_define(s: &str) -> Result<(String, TemplateValue), String> {
    let (key, value) = s.split_once('=').unwrap_or((s, "true"));
    if key.is_empty() {
        return Err(format!("empty key in define '{}'", s));
    }
    let value = match value {
        "true" => TemplateValue::Bool(true),
        "false" => TemplateValue::Bool(false),
        other => other
            .parse::<i64>()
            .map(TemplateValue::Int)
            .unwrap_or_else(|_| TemplateValue::Str(other.to_string())),
    };
    Ok((key.to_string(), value))
}
