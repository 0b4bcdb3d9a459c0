use std::sync::Arc;
use std::time::Duration;

use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{output_error, output_field, output_success};
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::client::{FileTokenStorage, LogNavigator, SessionConfig, SessionStore};
use crate::database::UserProfile;

#[derive(Subcommand)]
pub enum SessionCommands {
    #[command(about = "Register a new user and store the session")]
    Register {
        #[arg(help = "Display name")]
        name: String,
        #[arg(help = "Email")]
        email: String,
        #[arg(long, help = "Password")]
        password: String,
    },

    #[command(about = "Log in and store the session")]
    Login {
        #[arg(help = "Email")]
        email: String,
        #[arg(long, help = "Password")]
        password: String,
    },

    #[command(about = "Show the user for the stored session")]
    Whoami,

    #[command(about = "Forget the stored session")]
    Logout,
}

pub async fn handle(url: &str, cmd: SessionCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let storage = Arc::new(FileTokenStorage::from_env()?);
    let app_config = AppConfig::from_env();

    let mut config = SessionConfig::new(url)?;
    config.cookie_name = app_config.security.cookie_name.clone();
    config.cookie_max_age = Duration::from_secs(app_config.cookie_max_age_secs()?);
    config.login_path = app_config.gate.login_path.clone();

    let store = SessionStore::new(config, storage, Arc::new(LogNavigator))?;

    match cmd {
        SessionCommands::Register { name, email, password } => {
            let user = store.register(&name, &email, &password).await;
            report_login(&output_format, "Registered", user)
        }
        SessionCommands::Login { email, password } => {
            let user = store.sign_in(&email, &password).await;
            report_login(&output_format, "Logged in", user)
        }
        SessionCommands::Whoami => {
            let session = store.initialize().await?;
            match session.user {
                Some(user) => print_user(&output_format, "Current session", &user),
                None => {
                    output_error(&output_format, "Not logged in", Some("UNAUTHENTICATED"))?;
                    anyhow::bail!("not logged in")
                }
            }
        }
        SessionCommands::Logout => {
            store.logout().await?;
            output_success(&output_format, "Logged out", None)
        }
    }
}

fn report_login(
    output_format: &OutputFormat,
    action: &str,
    result: Result<Option<UserProfile>, crate::client::SessionError>,
) -> anyhow::Result<()> {
    match result {
        Ok(Some(user)) => print_user(output_format, action, &user),
        Ok(None) => {
            output_error(output_format, "Token was issued but could not be resolved", Some("SESSION_UNRESOLVED"))?;
            anyhow::bail!("session could not be established")
        }
        Err(e) => {
            output_error(output_format, &e.to_string(), None)?;
            Err(e.into())
        }
    }
}

fn print_user(output_format: &OutputFormat, message: &str, user: &UserProfile) -> anyhow::Result<()> {
    output_success(output_format, message, Some(json!({ "user": user })))?;
    if let OutputFormat::Text = output_format {
        output_field("id", user.id);
        output_field("email", &user.email);
        output_field("name", user.name.as_deref().unwrap_or("-"));
    }
    Ok(())
}
