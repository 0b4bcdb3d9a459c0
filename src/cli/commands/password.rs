use clap::Subcommand;
use serde_json::json;

use crate::auth::PasswordHasher;
use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;
use crate::config::AppConfig;

#[derive(Subcommand)]
pub enum PasswordCommands {
    #[command(about = "Hash a password with the configured Argon2id parameters")]
    Hash {
        #[arg(help = "Plaintext password")]
        plaintext: String,
    },

    #[command(about = "Check a password against a stored digest")]
    Verify {
        #[arg(help = "Plaintext password")]
        plaintext: String,
        #[arg(help = "PHC-format digest")]
        digest: String,
    },
}

pub async fn handle(cmd: PasswordCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    let hasher = PasswordHasher::from_config(&config.security)?;

    match cmd {
        PasswordCommands::Hash { plaintext } => {
            let digest = tokio::task::spawn_blocking(move || hasher.hash(&plaintext)).await??;
            match output_format {
                OutputFormat::Json => output_success(&output_format, "Password hashed", Some(json!({ "digest": digest }))),
                OutputFormat::Text => {
                    println!("{}", digest);
                    Ok(())
                }
            }
        }
        PasswordCommands::Verify { plaintext, digest } => {
            let matched = tokio::task::spawn_blocking(move || hasher.verify(&plaintext, &digest)).await?;
            if matched {
                output_success(&output_format, "Password matches", Some(json!({ "valid": true })))
            } else {
                output_error(&output_format, "Password does not match", Some("PASSWORD_MISMATCH"))?;
                anyhow::bail!("password does not match")
            }
        }
    }
}
