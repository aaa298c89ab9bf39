use anyhow::Context;
use serde_json::json;
use tracing::{debug, info, warn};

use event_notify::{validate_endpoint, ClientConfig, Config, Message, ValidationPipeline};

use crate::args::{ChallengeArgs, Command, OutputFormat, VerifyArgs};
use crate::exit_codes;

pub async fn dispatch(cmd: Command) -> anyhow::Result<i32> {
    match cmd {
        Command::Verify(args) => cmd_verify(args).await,
        Command::Challenge(args) => cmd_challenge(args),
    }
}

async fn cmd_verify(args: VerifyArgs) -> anyhow::Result<i32> {
    let config = Config::from_file(&args.config)?;

    let raw = std::fs::read_to_string(&args.message)
        .with_context(|| format!("failed to read message {}", args.message.display()))?;
    let message: Message = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse message {}", args.message.display()))?;

    let mut client_config = ClientConfig::from_env();
    if let Some(timeout) = args.timeout {
        client_config = client_config.with_timeout_secs(timeout);
    }
    let pipeline = ValidationPipeline::from_client_config(&client_config)
        .context("failed to build verification pipeline")?;

    let outcome = match pipeline
        .validate_and_process(
            Some(&message),
            &args.signature,
            Some(&config),
            &args.environment,
        )
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!(error = %e, environment = %args.environment, "notification failed validation");
            match args.format {
                OutputFormat::Text => eprintln!("error: {}", e),
                OutputFormat::Json => println!("{}", json!({ "status": null, "error": e.to_string() })),
            }
            return Ok(exit_codes::VALIDATION_FAILED);
        }
    };

    let error = outcome.error().map(ToString::to_string);
    match &error {
        None => info!(
            status = outcome.status_code(),
            notification_id = %message.notification.notification_id,
            "notification verified"
        ),
        Some(error) => warn!(
            status = outcome.status_code(),
            notification_id = %message.notification.notification_id,
            error = %error,
            "notification rejected"
        ),
    }

    match args.format {
        OutputFormat::Text => {
            println!("status: {}", outcome.status_code());
            if let Some(error) = &error {
                println!("error: {}", error);
            }
        }
        OutputFormat::Json => {
            println!(
                "{}",
                json!({ "status": outcome.status_code(), "error": error })
            );
        }
    }

    Ok(exit_codes::for_outcome(&outcome))
}

fn cmd_challenge(args: ChallengeArgs) -> anyhow::Result<i32> {
    let config = Config::from_file(&args.config)?;
    debug!(config = %args.config.display(), "loaded config");

    match validate_endpoint(&args.code, Some(&config)) {
        Ok(response) => {
            println!("{}", serde_json::to_string(&response)?);
            Ok(exit_codes::SUCCESS)
        }
        Err(e) => {
            warn!(error = %e, "challenge not answered");
            eprintln!("error: {}", e);
            Ok(exit_codes::VALIDATION_FAILED)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::ChallengeArgs;

    #[tokio::test]
    async fn challenge_with_valid_config_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("config.json");
        std::fs::write(
            &config,
            r#"{"endpoint": "https://example.com/webhook", "verificationToken": "tok"}"#,
        )
        .unwrap();

        let code = dispatch(Command::Challenge(ChallengeArgs {
            config,
            code: "abc".to_string(),
        }))
        .await
        .unwrap();
        assert_eq!(code, exit_codes::SUCCESS);
    }

    #[tokio::test]
    async fn challenge_without_token_is_validation_failure() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("config.json");
        std::fs::write(&config, r#"{"endpoint": "https://example.com/webhook"}"#).unwrap();

        let code = dispatch(Command::Challenge(ChallengeArgs {
            config,
            code: "abc".to_string(),
        }))
        .await
        .unwrap();
        assert_eq!(code, exit_codes::VALIDATION_FAILED);
    }

    #[tokio::test]
    async fn verify_with_missing_config_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = dispatch(Command::Verify(VerifyArgs {
            config: dir.path().join("missing.json"),
            message: dir.path().join("message.json"),
            signature: "c2ln".to_string(),
            environment: "PRODUCTION".to_string(),
            timeout: None,
            format: OutputFormat::Text,
        }))
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn verify_with_bad_environment_is_validation_failure() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("config.json");
        std::fs::write(
            &config,
            r#"{"SANDBOX": {"clientId": "a", "clientSecret": "b"},
                "PRODUCTION": {"clientId": "c", "clientSecret": "d"}}"#,
        )
        .unwrap();
        let message = dir.path().join("message.json");
        std::fs::write(
            &message,
            r#"{"metadata": {"topic": "MARKETPLACE_ACCOUNT_DELETION"}, "notification": {}}"#,
        )
        .unwrap();

        let code = dispatch(Command::Verify(VerifyArgs {
            config,
            message,
            signature: "c2ln".to_string(),
            environment: "staging".to_string(),
            timeout: None,
            format: OutputFormat::Json,
        }))
        .await
        .unwrap();
        assert_eq!(code, exit_codes::VALIDATION_FAILED);
    }

    #[tokio::test]
    async fn verify_with_undecodable_signature_reports_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("config.json");
        std::fs::write(
            &config,
            r#"{"SANDBOX": {"clientId": "a", "clientSecret": "b"},
                "PRODUCTION": {"clientId": "c", "clientSecret": "d"}}"#,
        )
        .unwrap();
        let message = dir.path().join("message.json");
        std::fs::write(
            &message,
            r#"{"metadata": {"topic": "MARKETPLACE_ACCOUNT_DELETION"}, "notification": {}}"#,
        )
        .unwrap();

        // Header decoding fails before any network call.
        let code = dispatch(Command::Verify(VerifyArgs {
            config,
            message,
            signature: "not-base64!".to_string(),
            environment: "PRODUCTION".to_string(),
            timeout: Some(1),
            format: OutputFormat::Text,
        }))
        .await
        .unwrap();
        assert_eq!(code, 4);
    }
}
