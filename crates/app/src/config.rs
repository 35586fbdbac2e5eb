//! Session configuration

use std::{path::PathBuf, time::Duration};

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Log output format.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Seed data settings.
#[derive(Debug, Args)]
pub struct SeedConfig {
    /// Seed set to load
    #[arg(long, env = "SHAREDCART_SEED", default_value = "family")]
    pub seed: String,

    /// Directory holding seed sets
    #[arg(long, env = "SHAREDCART_FIXTURES_DIR", default_value = "./fixtures")]
    pub fixtures_dir: PathBuf,

    /// Fixture key of the member acting in this session
    #[arg(long, env = "SHAREDCART_MEMBER", default_value = "john")]
    pub member: String,
}

/// Suggestion engine settings.
#[derive(Debug, Args)]
pub struct SuggestionsConfig {
    /// Artificial delay before suggestions resolve, in milliseconds
    #[arg(long, env = "SHAREDCART_SUGGESTION_DELAY_MS", default_value_t = 2_000_u64)]
    pub suggestion_delay_ms: u64,
}

impl SuggestionsConfig {
    /// The configured delay.
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.suggestion_delay_ms)
    }
}

/// Split policies selectable from the command line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum SplitArg {
    /// Everyone pays the same
    Even,

    /// Each item is shared by the members who added it
    #[default]
    Items,

    /// Amounts given with `--amount KEY=VALUE`
    Custom,
}

/// Commands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the cart's items, total and budget
    Cart,

    /// Show how the total divides between members
    Split {
        /// Split policy
        #[arg(long, value_enum, default_value_t = SplitArg::Items)]
        policy: SplitArg,

        /// Custom amount for a member, as `KEY=VALUE`
        #[arg(long = "amount", value_name = "KEY=VALUE")]
        amounts: Vec<String>,
    },

    /// Ask for item suggestions
    Suggest {
        /// What the shopping is for
        #[arg(long)]
        goal: String,
    },

    /// Show the chat history, optionally posting a message first
    Chat {
        /// Message to send as the acting member
        #[arg(long)]
        send: Option<String>,
    },
}

/// Shared cart session CLI
#[derive(Debug, Parser)]
#[command(name = "sharedcart", about = "Shared cart session", long_about = None)]
pub struct AppConfig {
    /// Seed data settings.
    #[command(flatten)]
    pub seed: SeedConfig,

    /// Suggestion engine settings.
    #[command(flatten)]
    pub suggestions: SuggestionsConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

impl AppConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn defaults_apply() -> TestResult {
        let config = AppConfig::try_parse_from(["sharedcart", "cart"])?;

        assert_eq!(config.seed.member, "john");
        assert_eq!(config.suggestions.delay(), Duration::from_millis(2000));
        assert!(matches!(config.command, Command::Cart));

        Ok(())
    }

    #[test]
    fn split_arguments_parse() -> TestResult {
        let config = AppConfig::try_parse_from([
            "sharedcart",
            "--suggestion-delay-ms",
            "0",
            "split",
            "--policy",
            "custom",
            "--amount",
            "john=10",
            "--amount",
            "jane=5.26",
        ])?;

        assert_eq!(config.suggestions.delay(), Duration::ZERO);

        let Command::Split { policy, amounts } = config.command else {
            return Err("expected split command".into());
        };

        assert_eq!(policy, SplitArg::Custom);
        assert_eq!(amounts, ["john=10", "jane=5.26"]);

        Ok(())
    }
}
