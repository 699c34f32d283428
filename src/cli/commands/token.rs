use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use crate::auth::JwtKeys;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::config;
use crate::types::Role;

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Sign a token with the server's secret (development helper)")]
    Issue {
        #[arg(long, help = "User id; a new one is generated when omitted")]
        user: Option<Uuid>,
        #[arg(long, default_value = "owner", help = "owner or customer")]
        role: Role,
    },
}

pub fn handle(cmd: TokenCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        TokenCommands::Issue { user, role } => {
            let keys = JwtKeys::from_config(&config().security)?;
            let user = user.unwrap_or_else(Uuid::new_v4);
            let token = keys.issue(user, role)?;

            match output_format {
                OutputFormat::Json => output_success(
                    &output_format,
                    "Token issued",
                    Some(json!({ "token": token, "user": user, "access": role })),
                ),
                OutputFormat::Text => {
                    println!("{}", token);
                    Ok(())
                }
            }
        }
    }
}
