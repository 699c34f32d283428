pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::auth::peek_claims;
use crate::client::HttpRestaurantClient;
use crate::middleware::AuthUser;

#[derive(Parser)]
#[command(name = "restaurant")]
#[command(about = "Restaurant CLI - manage listings on a restaurant API server")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(
        long,
        global = true,
        env = "RESTAURANT_API_URL",
        default_value = "http://127.0.0.1:3000",
        help = "Server base URL"
    )]
    pub server: String,

    #[arg(
        long,
        global = true,
        env = "RESTAURANT_API_TOKEN",
        hide_env_values = true,
        help = "Bearer token for owner commands"
    )]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Who the token says we are. Missing, malformed and expired tokens mean nobody.
    pub fn caller(&self) -> Option<AuthUser> {
        let token = self.token.as_deref()?;
        match peek_claims(token) {
            Ok(claims) => Some(AuthUser::from(claims)),
            Err(e) => {
                tracing::debug!("Ignoring unusable token: {}", e);
                None
            }
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Token management")]
    Token {
        #[command(subcommand)]
        cmd: commands::token::TokenCommands,
    },

    #[command(about = "List every restaurant")]
    List,

    #[command(about = "Show one restaurant")]
    Show {
        #[arg(help = "Restaurant id")]
        id: String,
    },

    #[command(about = "Show the restaurant owned by the token holder")]
    Mine,

    #[command(about = "Create a restaurant from a JSON file and/or field=value pairs")]
    Create {
        #[arg(long, help = "JSON file with the listing")]
        file: Option<PathBuf>,
        #[arg(long = "set", value_name = "FIELD=VALUE", help = "Field override, repeatable")]
        set: Vec<String>,
    },

    #[command(about = "Edit your restaurant, previewing the changes first")]
    Edit {
        #[arg(
            long = "set",
            value_name = "FIELD=VALUE",
            required = true,
            help = "Field change, repeatable"
        )]
        set: Vec<String>,
        #[arg(long, short = 'y', help = "Submit without asking for confirmation")]
        yes: bool,
    },

    #[command(about = "Delete a restaurant you own")]
    Delete {
        #[arg(help = "Restaurant id")]
        id: String,
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
    let caller = cli.caller();
    let client = || HttpRestaurantClient::new(&cli.server, cli.token.clone());

    match cli.command {
        Commands::Token { cmd } => commands::token::handle(cmd, output_format),
        Commands::List => commands::restaurant::list(&client()?, output_format).await,
        Commands::Show { ref id } => commands::restaurant::show(&client()?, id, output_format).await,
        Commands::Mine => commands::restaurant::mine(&client()?, output_format).await,
        Commands::Create { ref file, ref set } => {
            commands::restaurant::create(caller, client()?, file.as_deref(), set, output_format).await
        }
        Commands::Edit { ref set, yes } => {
            commands::restaurant::edit(caller, client()?, set, yes, output_format).await
        }
        Commands::Delete { ref id } => {
            commands::restaurant::delete(&client()?, id, output_format).await
        }
    }
}
