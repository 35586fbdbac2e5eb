//! Shared Cart CLI

use std::{
    io::{self, Write},
    process::ExitCode,
    sync::Arc,
};

use rustc_hash::FxHashMap;
use sharedcart::{
    fixtures::{FixtureError, Seed},
    input::{InputError, parse_custom_amount},
    report::{ReportError, write_cart, write_chat, write_split},
    splits::{SplitError, SplitPolicy},
    suggestions::SuggestionError,
};
use sharedcart_app::{
    clock::{Clock, SystemClock},
    config::{AppConfig, Command, SplitArg},
    context::{AppContext, AppInitError},
    logging::init_subscriber,
    suggestions::TokioDelay,
};
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Fixture(#[from] FixtureError),

    #[error(transparent)]
    Init(#[from] AppInitError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error(transparent)]
    Split(#[from] SplitError),

    #[error(transparent)]
    Suggestion(#[from] SuggestionError),

    #[error("invalid amount for {0}: {1}")]
    Amount(String, InputError),

    #[error("expected KEY=VALUE, got {0:?}")]
    AmountFormat(String),

    #[error("member not found in seed: {0}")]
    UnknownMember(String),

    #[error("failed to write output")]
    Io(#[from] io::Error),
}

#[tokio::main]
pub async fn main() -> ExitCode {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(error) => error.exit(),
    };

    if let Err(error) = init_subscriber(&config.logging) {
        eprintln!("failed to initialise logging: {error}");

        return ExitCode::FAILURE;
    }

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!(%error, "command failed");
            eprintln!("{error}");

            ExitCode::FAILURE
        }
    }
}

async fn run(config: AppConfig) -> Result<(), CliError> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let seed = Seed::from_set_in(&config.seed.fixtures_dir, &config.seed.seed, clock.now())?;

    info!(seed = %config.seed.seed, member = %config.seed.member, "loaded seed");

    let ctx = AppContext::with_engine(
        seed.clone(),
        &config.seed.member,
        clock,
        TokioDelay,
        config.suggestions.delay(),
    )?;

    let mut out = io::stdout().lock();

    match config.command {
        Command::Cart => write_cart(&mut out, &ctx.carts.snapshot())?,
        Command::Split { policy, amounts } => {
            let policy = split_policy(&seed, policy, &amounts)?;
            let outcome = ctx.carts.split(&policy)?;

            write_split(&mut out, &ctx.carts.snapshot(), &outcome)?;
        }
        Command::Suggest { goal } => suggest(&mut out, &ctx, &goal).await?,
        Command::Chat { send } => {
            if let Some(text) = send {
                ctx.chat.send_message(&ctx.member, &text);
            }

            write_chat(&mut out, &ctx.chat.snapshot())?;
        }
    }

    Ok(())
}

fn split_policy(seed: &Seed, arg: SplitArg, amounts: &[String]) -> Result<SplitPolicy, CliError> {
    match arg {
        SplitArg::Even => Ok(SplitPolicy::Even),
        SplitArg::Items => Ok(SplitPolicy::ItemBased),
        SplitArg::Custom => custom_policy(seed, amounts),
    }
}

fn custom_policy(seed: &Seed, amounts: &[String]) -> Result<SplitPolicy, CliError> {
    let mut parsed = FxHashMap::default();

    for entry in amounts {
        let Some((key, value)) = entry.split_once('=') else {
            return Err(CliError::AmountFormat(entry.clone()));
        };

        let member = seed
            .member(key.trim())
            .ok_or_else(|| CliError::UnknownMember(key.trim().to_string()))?;

        let amount =
            parse_custom_amount(value).map_err(|error| CliError::Amount(key.to_string(), error))?;

        parsed.insert(member.uuid(), amount);
    }

    Ok(SplitPolicy::Custom(parsed))
}

async fn suggest(out: &mut impl Write, ctx: &AppContext, goal: &str) -> Result<(), CliError> {
    writeln!(out, "Thinking about \"{goal}\"...")?;
    out.flush()?;

    ctx.suggest(goal).await?;

    let state = ctx.suggestions.state();

    if state.suggestions.is_empty() {
        writeln!(out, "Nothing to suggest; the cart already covers it.")?;
    }

    for suggestion in &state.suggestions {
        writeln!(
            out,
            "{} ({}) {}\n    {}",
            suggestion.name, suggestion.category, suggestion.price, suggestion.reason
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use super::*;

    const SEED: &str = r#"
currency: USD
cart:
  name: Weekend
  owner: john
members:
  - key: john
    name: John Doe
    email: john@example.com
  - key: jane
    name: Jane Smith
    email: jane@example.com
"#;

    fn amounts(entries: &[&str]) -> Vec<String> {
        entries.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn custom_amounts_resolve_member_keys() -> TestResult {
        let seed = Seed::parse(SEED, Timestamp::UNIX_EPOCH)?;
        let john = seed.member("john").ok_or("john missing")?.uuid();
        let jane = seed.member("jane").ok_or("jane missing")?.uuid();

        let policy = split_policy(&seed, SplitArg::Custom, &amounts(&["john=10", " jane = "]))?;

        let SplitPolicy::Custom(parsed) = policy else {
            return Err("expected custom policy".into());
        };

        assert_eq!(parsed.get(&john), Some(&Decimal::new(10, 0)));
        assert_eq!(parsed.get(&jane), Some(&Decimal::ZERO));

        Ok(())
    }

    #[test]
    fn named_policies_ignore_amounts() -> TestResult {
        let seed = Seed::parse(SEED, Timestamp::UNIX_EPOCH)?;

        assert!(matches!(
            split_policy(&seed, SplitArg::Even, &amounts(&["nobody=1"]))?,
            SplitPolicy::Even
        ));
        assert!(matches!(
            split_policy(&seed, SplitArg::Items, &[])?,
            SplitPolicy::ItemBased
        ));

        Ok(())
    }

    #[test]
    fn malformed_custom_amounts_are_rejected() -> TestResult {
        let seed = Seed::parse(SEED, Timestamp::UNIX_EPOCH)?;

        let result = split_policy(&seed, SplitArg::Custom, &amounts(&["john"]));
        assert!(matches!(result, Err(CliError::AmountFormat(entry)) if entry == "john"));

        let result = split_policy(&seed, SplitArg::Custom, &amounts(&["sam=4"]));
        assert!(matches!(result, Err(CliError::UnknownMember(key)) if key == "sam"));

        let result = split_policy(&seed, SplitArg::Custom, &amounts(&["jane=-1"]));
        assert!(matches!(result, Err(CliError::Amount(key, _)) if key == "jane"));

        Ok(())
    }
}
