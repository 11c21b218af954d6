use clap::Subcommand;
use serde_json::json;

use crate::cli::config::session_store;
use crate::cli::OutputFormat;
use crate::guard::{GuardDecision, RouteGuard};
use crate::session::{SessionToken, TokenStore};

#[derive(Subcommand)]
pub enum GuardCommands {
    #[command(about = "Show the guard decision for a request path")]
    Check {
        #[arg(help = "Request path, e.g. /admin/companies")]
        path: String,
        #[arg(long, help = "Token to test with (defaults to the stored session)")]
        token: Option<String>,
        #[arg(long, help = "Test as if no session were present", conflicts_with = "token")]
        anonymous: bool,
    },
}

pub async fn handle(cmd: GuardCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        GuardCommands::Check { path, token, anonymous } => {
            let guard = RouteGuard::from_config(&crate::config::config().guard);

            let token = match (token, anonymous) {
                (_, true) => None,
                (Some(raw), false) => Some(SessionToken::new(raw)?),
                (None, false) => session_store()?.read(),
            };

            let decision = guard.authorize(&path, token.as_ref());

            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&json!({
                        "path": path,
                        "protected": guard.is_protected(&path),
                        "token_present": token.is_some(),
                        "result": decision
                    }))?);
                }
                OutputFormat::Text => match decision {
                    GuardDecision::Allow => println!("ALLOW    {}", path),
                    GuardDecision::RedirectToLogin { location } => {
                        println!("REDIRECT {} -> {}", path, location)
                    }
                },
            }

            Ok(())
        }
    }
}
