use clap::Subcommand;
use serde_json::json;

use crate::cli::config::{load_remote_settings, remote_config, save_remote_settings};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::RemoteConfig;
use crate::remote::RemoteClient;

#[derive(Subcommand)]
pub enum RemoteCommands {
    #[command(about = "Select the remote API base URL")]
    Set {
        #[arg(help = "Base URL, e.g. https://api.example.com/api")]
        url: String,
        #[arg(long, help = "Request timeout in seconds")]
        timeout: Option<u64>,
    },

    #[command(about = "Show the remote API currently in use")]
    Show,
}

pub async fn handle(cmd: RemoteCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        RemoteCommands::Set { url, timeout } => {
            let mut settings = load_remote_settings()?;
            let timeout_secs = timeout.or(settings.timeout_secs).unwrap_or(crate::config::config().remote.timeout_secs);

            // Reject unusable URLs before persisting them
            RemoteClient::new(&RemoteConfig {
                base_url: url.clone(),
                timeout_secs,
            })?;

            settings.base_url = Some(url.trim().to_string());
            if timeout.is_some() {
                settings.timeout_secs = timeout;
            }
            settings.updated_at = Some(chrono::Utc::now());
            save_remote_settings(&settings)?;

            output_success(
                &output_format,
                &format!("Remote API set to {}", url.trim()),
                Some(json!({ "base_url": url.trim() })),
            )
        }
        RemoteCommands::Show => {
            let settings = load_remote_settings()?;
            let effective = remote_config()?;

            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&json!({
                        "base_url": effective.base_url,
                        "timeout_secs": effective.timeout_secs,
                        "source": if settings.base_url.is_some() { "cli" } else { "environment" },
                        "updated_at": settings.updated_at
                    }))?);
                }
                OutputFormat::Text => {
                    println!("URL:     {}", effective.base_url);
                    println!("Timeout: {}s", effective.timeout_secs);
                    if let Some(updated_at) = settings.updated_at {
                        println!("Set:     {}", updated_at.format("%Y-%m-%d %H:%M"));
                    }
                }
            }

            Ok(())
        }
    }
}
