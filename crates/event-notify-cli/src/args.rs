use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "event-notify",
    version,
    about = "Verify marketplace event notifications and answer endpoint challenges"
)]
pub struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true, env = "EVENT_NOTIFY_LOG_JSON")]
    pub log_json: bool,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Verify a notification and dispatch it to its topic handler
    Verify(VerifyArgs),
    /// Compute the response to an endpoint readiness challenge
    Challenge(ChallengeArgs),
}

#[derive(clap::Args, Debug)]
pub struct VerifyArgs {
    /// Path to config.json with SANDBOX / PRODUCTION credentials
    #[arg(long, env = "EVENT_NOTIFY_CONFIG")]
    pub config: PathBuf,

    /// Path to the notification message (JSON request body)
    #[arg(long)]
    pub message: PathBuf,

    /// Value of the X-EBAY-SIGNATURE header
    #[arg(long)]
    pub signature: String,

    /// Environment to verify against (SANDBOX or PRODUCTION)
    #[arg(long, default_value = "PRODUCTION")]
    pub environment: String,

    /// Request timeout in seconds (overrides EVENT_NOTIFY_TIMEOUT)
    #[arg(long)]
    pub timeout: Option<u64>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(clap::Args, Debug)]
pub struct ChallengeArgs {
    /// Path to config.json with endpoint and verificationToken
    #[arg(long, env = "EVENT_NOTIFY_CONFIG")]
    pub config: PathBuf,

    /// challenge_code query parameter sent by the platform
    #[arg(long)]
    pub code: String,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn verify_defaults_to_production() {
        let cli = Cli::try_parse_from([
            "event-notify",
            "verify",
            "--config",
            "config.json",
            "--message",
            "message.json",
            "--signature",
            "c2ln",
        ])
        .unwrap();

        match cli.cmd {
            Command::Verify(args) => {
                assert_eq!(args.environment, "PRODUCTION");
                assert_eq!(args.format, OutputFormat::Text);
                assert_eq!(args.signature, "c2ln");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn challenge_requires_code() {
        let result = Cli::try_parse_from(["event-notify", "challenge", "--config", "c.json"]);
        assert!(result.is_err());
    }
}
