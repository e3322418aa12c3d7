use patungan_domain::{AllocationContext, RoundingMode};
use std::{env, path::PathBuf};
use tracing_subscriber::EnvFilter;

const ROUNDING_VAR: &str = "PATUNGAN_ROUNDING";
const OUTPUT_DIR_VAR: &str = "PATUNGAN_OUTPUT_DIR";
const PARSER_COMMAND_VAR: &str = "PATUNGAN_PARSER_COMMAND";

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("PATUNGAN_ROUNDING must be `half-up` or `half-even`, got `{0}`")]
    InvalidRounding(String),
}

/// Settings read from the environment and an optional `.env` file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CliConfig {
    pub context: AllocationContext,
    pub output_dir: PathBuf,
    pub parser_command: Option<String>,
}

impl CliConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_values(
            env::var(ROUNDING_VAR).ok().as_deref(),
            env::var(OUTPUT_DIR_VAR).ok().as_deref(),
            env::var(PARSER_COMMAND_VAR).ok().as_deref(),
        )
    }

    fn from_values(
        rounding: Option<&str>,
        output_dir: Option<&str>,
        parser_command: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let rounding_mode = parse_rounding(rounding)?;
        Ok(Self {
            context: AllocationContext {
                rounding_mode,
                ..AllocationContext::whole_units()
            },
            output_dir: output_dir
                .filter(|dir| !dir.trim().is_empty())
                .map_or_else(|| PathBuf::from("."), PathBuf::from),
            parser_command: parser_command
                .map(str::trim)
                .filter(|command| !command.is_empty())
                .map(str::to_owned),
        })
    }
}

fn parse_rounding(value: Option<&str>) -> Result<RoundingMode, ConfigError> {
    let Some(value) = value.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(RoundingMode::default());
    };
    match value.to_ascii_lowercase().replace('_', "-").as_str() {
        "half-up" => Ok(RoundingMode::HalfUp),
        "half-even" => Ok(RoundingMode::HalfEven),
        _ => Err(ConfigError::InvalidRounding(value.to_owned())),
    }
}

/// Logs go to stderr so stdout stays machine-readable. `RUST_LOG` overrides the default level.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
