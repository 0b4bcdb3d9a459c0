pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "bellbot")]
#[command(about = "BellBot CLI - authentication tooling and session client for the BellBot API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the API server")]
    Serve(commands::serve::ServeArgs),

    #[command(about = "Hash and verify passwords")]
    Password {
        #[command(subcommand)]
        cmd: commands::password::PasswordCommands,
    },

    #[command(about = "Issue and verify bearer tokens (uses JWT_SECRET)")]
    Token {
        #[command(subcommand)]
        cmd: commands::token::TokenCommands,
    },

    #[command(about = "Log in to a running server and manage the stored session")]
    Session {
        #[arg(long, global = true, default_value = "http://127.0.0.1:3000", help = "API base URL")]
        url: String,

        #[command(subcommand)]
        cmd: commands::session::SessionCommands,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Serve(args) => commands::serve::handle(args).await,
        Commands::Password { cmd } => commands::password::handle(cmd, output_format).await,
        Commands::Token { cmd } => commands::token::handle(cmd, output_format).await,
        Commands::Session { url, cmd } => commands::session::handle(&url, cmd, output_format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_tree_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_session_login_with_url() {
        let cli = Cli::try_parse_from([
            "bellbot", "--json", "session", "--url", "http://localhost:4000", "login", "a@x.com", "--password", "secret1",
        ])
        .unwrap();

        assert!(matches!(OutputFormat::from_cli(&cli), OutputFormat::Json));
        match cli.command {
            Commands::Session { url, cmd } => {
                assert_eq!(url, "http://localhost:4000");
                assert!(matches!(cmd, commands::session::SessionCommands::Login { .. }));
            }
            _ => panic!("expected session command"),
        }
    }

    #[test]
    fn default_output_is_text_and_text_flag_is_unknown() {
        let cli = Cli::try_parse_from(["bellbot", "token", "verify", "a.b.c"]).unwrap();
        assert!(matches!(OutputFormat::from_cli(&cli), OutputFormat::Text));

        assert!(Cli::try_parse_from(["bellbot", "--text", "token", "verify", "a.b.c"]).is_err());
    }
}
