use std::sync::Arc;

use clap::Subcommand;
use serde_json::json;

use crate::cli::config::session_store;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::session::{SessionContext, SessionToken, TokenStore, SESSION_TTL_HOURS};

#[derive(Subcommand)]
pub enum SessionCommands {
    #[command(about = "Store a session token issued by the remote API")]
    Login {
        #[arg(help = "Bearer token")]
        token: String,
    },

    #[command(about = "Discard the stored session token")]
    Logout,

    #[command(about = "Show whether a live session token is stored")]
    Status,
}

pub async fn handle(cmd: SessionCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        SessionCommands::Login { token } => {
            let token = SessionToken::new(token)?;
            let store: Arc<dyn TokenStore> = Arc::new(session_store()?);
            SessionContext::login(store, token)?;

            output_success(
                &output_format,
                &format!("Session stored (expires in {}h)", SESSION_TTL_HOURS),
                Some(json!({ "expires_in_hours": SESSION_TTL_HOURS })),
            )
        }
        SessionCommands::Logout => {
            let store: Arc<dyn TokenStore> = Arc::new(session_store()?);
            match SessionContext::resume(store.clone()) {
                Some(session) => session.logout()?,
                // Expired or missing; still remove whatever is on disk
                None => store.revoke()?,
            }

            output_success(&output_format, "Session cleared", None)
        }
        SessionCommands::Status => {
            let store = session_store()?;
            let stored = store.load().filter(|stored| stored.is_live(chrono::Utc::now()));

            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&json!({
                        "active": stored.is_some(),
                        "issued_at": stored.as_ref().map(|s| s.issued_at),
                        "expires_at": stored.as_ref().map(|s| s.expires_at),
                        "path": store.path().display().to_string()
                    }))?);
                }
                OutputFormat::Text => match stored {
                    Some(stored) => {
                        println!("Session: active");
                        println!("Issued:  {}", stored.issued_at.format("%Y-%m-%d %H:%M"));
                        println!("Expires: {}", stored.expires_at.format("%Y-%m-%d %H:%M"));
                    }
                    None => println!("Session: none"),
                },
            }

            Ok(())
        }
    }
}
