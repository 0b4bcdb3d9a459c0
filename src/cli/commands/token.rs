use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use crate::auth::TokenCodec;
use crate::cli::utils::{output_error, output_field, output_success};
use crate::cli::OutputFormat;
use crate::config::AppConfig;

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Issue a token for a user id")]
    Issue {
        #[arg(help = "User id (UUID)")]
        user_id: Uuid,
    },

    #[command(about = "Verify a token and print the user id it carries")]
    Verify {
        #[arg(help = "Compact token")]
        token: String,
    },
}

pub async fn handle(cmd: TokenCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    let codec = TokenCodec::from_config(&config.security)?;

    match cmd {
        TokenCommands::Issue { user_id } => {
            let token = codec.issue(user_id)?;
            match output_format {
                OutputFormat::Json => output_success(
                    &output_format,
                    "Token issued",
                    Some(json!({ "token": token, "userId": user_id, "expiresInSecs": codec.ttl().num_seconds() })),
                ),
                OutputFormat::Text => {
                    println!("{}", token);
                    Ok(())
                }
            }
        }
        TokenCommands::Verify { token } => match codec.verify(&token) {
            Ok(identity) => {
                output_success(&output_format, "Token is valid", Some(json!({ "userId": identity.user_id })))?;
                if let OutputFormat::Text = output_format {
                    output_field("userId", identity.user_id);
                }
                Ok(())
            }
            Err(e) => {
                output_error(&output_format, &e.to_string(), Some("INVALID_TOKEN"))?;
                anyhow::bail!("token rejected")
            }
        },
    }
}
