use std::sync::Arc;

use clap::Subcommand;
use serde_json::{json, Value};

use crate::cli::config::{remote_config, session_store};
use crate::cli::utils::{output_field_errors, output_success, parse_assignment};
use crate::cli::OutputFormat;
use crate::entity::{resolve_reference, Draft, EntityKind, FieldValue};
use crate::remote::{RemoteClient, RemoteError};
use crate::session::{SessionContext, TokenStore};
use crate::workflow::{EditDialog, InputOutcome, SubmitError};

#[derive(Subcommand)]
pub enum EntityCommands {
    #[command(about = "List the editable fields of an entity kind")]
    Fields {
        #[arg(help = "Entity kind: company, location, gateway or product")]
        kind: EntityKind,
    },

    #[command(about = "Create an entity")]
    Add {
        #[arg(help = "Entity kind: company, location, gateway or product")]
        kind: EntityKind,
        #[arg(long = "set", value_name = "FIELD=VALUE", help = "Field assignment (repeatable)")]
        assignments: Vec<String>,
    },

    #[command(about = "Edit an existing entity")]
    Edit {
        #[arg(help = "Entity kind: company, location, gateway or product")]
        kind: EntityKind,
        #[arg(help = "Entity identifier")]
        id: String,
        #[arg(long = "set", value_name = "FIELD=VALUE", help = "Field assignment (repeatable)")]
        assignments: Vec<String>,
    },
}

pub async fn handle(cmd: EntityCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        EntityCommands::Fields { kind } => {
            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&json!({
                        "kind": kind,
                        "id_field": kind.id_field(),
                        "fields": kind.fields()
                    }))?);
                }
                OutputFormat::Text => {
                    println!("{:<20} {:<12} {}", "FIELD", "CLASS", "REFERENCE");
                    println!("{}", "-".repeat(45));
                    for spec in kind.fields() {
                        let reference = spec.reference.map(|r| r.path()).unwrap_or("");
                        println!("{:<20} {:<12} {}", spec.name, format!("{:?}", spec.class), reference);
                    }
                }
            }
            Ok(())
        }
        EntityCommands::Add { kind, assignments } => {
            let assignments = parse_assignments(&assignments)?;
            let session = require_session()?;
            let client = RemoteClient::new(&remote_config()?)?;

            let mut dialog = EditDialog::new(kind, session);
            if let Some(ticket) = dialog.open_add() {
                dialog.fetch_reference(ticket, &client).await;
            }

            apply_assignments(&mut dialog, &assignments)?;
            submit(dialog, &client, &output_format).await
        }
        EntityCommands::Edit { kind, id, assignments } => {
            let assignments = parse_assignments(&assignments)?;
            let session = require_session()?;
            let client = RemoteClient::new(&remote_config()?)?;

            let token = session.token().ok_or_else(not_logged_in)?;
            let mut entity = client.fetch_entity(kind, &id, &token).await.map_err(explain_remote)?;
            // Some endpoints omit the identifier from the body
            if let Value::Object(map) = &mut entity {
                map.entry(kind.id_field().to_string()).or_insert_with(|| json!(id));
            }
            let draft = Draft::from_json(kind, &entity)?;

            let mut dialog = EditDialog::new(kind, session);
            if let Some(ticket) = dialog.open_edit(draft)? {
                dialog.fetch_reference(ticket, &client).await;
            }

            apply_assignments(&mut dialog, &assignments)?;
            submit(dialog, &client, &output_format).await
        }
    }
}

fn parse_assignments(raw: &[String]) -> anyhow::Result<Vec<(String, String)>> {
    raw.iter().map(|a| parse_assignment(a)).collect()
}

fn require_session() -> anyhow::Result<SessionContext> {
    let store: Arc<dyn TokenStore> = Arc::new(session_store()?);
    SessionContext::resume(store).ok_or_else(not_logged_in)
}

fn not_logged_in() -> anyhow::Error {
    anyhow::anyhow!("Not logged in. Use 'console session login <token>' first")
}

fn explain_remote(err: RemoteError) -> anyhow::Error {
    match err {
        RemoteError::Unauthorized => {
            anyhow::anyhow!("Session expired or not authorized. Log in again with 'console session login <token>'")
        }
        other => other.into(),
    }
}

/// Feed assignments through the dialog one field at a time, as keystrokes
/// would arrive. The reference field picks from the fetched list when the
/// value names an entry.
fn apply_assignments(dialog: &mut EditDialog, assignments: &[(String, String)]) -> anyhow::Result<()> {
    let kind = dialog.kind();
    let reference_field = kind.reference_field().map(|spec| spec.name);

    for (field, value) in assignments {
        let picked = if reference_field == Some(field.as_str()) {
            resolve_reference(&FieldValue::Text(value.clone()), dialog.reference_options())
        } else {
            None
        };

        let outcome = match picked {
            Some(item) => dialog.select_reference(item),
            None => dialog.input(field, value),
        };

        match outcome {
            InputOutcome::Accepted => {}
            InputOutcome::Rejected => {
                let class = kind
                    .field(field)
                    .map(|spec| format!("{:?}", spec.class).to_lowercase())
                    .unwrap_or_default();
                return Err(anyhow::anyhow!("Value '{}' is not allowed in {} field {}", value, class, field));
            }
            InputOutcome::ReadOnly => {
                return Err(anyhow::anyhow!("Field '{}' identifies the {} and cannot be changed", field, kind));
            }
            InputOutcome::UnknownField => {
                let known: Vec<_> = kind.fields().iter().map(|spec| spec.name).collect();
                return Err(anyhow::anyhow!("Unknown {} field '{}'. Fields: {}", kind, field, known.join(", ")));
            }
            InputOutcome::NotOpen | InputOutcome::Busy => {
                return Err(anyhow::anyhow!("{} dialog is not accepting input", kind));
            }
        }
    }

    Ok(())
}

async fn submit(mut dialog: EditDialog, client: &RemoteClient, output_format: &OutputFormat) -> anyhow::Result<()> {
    let kind = dialog.kind();

    match dialog.submit(client).await {
        Ok(saved) => {
            let message = saved.message.unwrap_or_else(|| format!("{} saved", kind));
            output_success(output_format, &message, Some(json!({ "kind": kind })))
        }
        Err(SubmitError::Invalid(errors)) => {
            output_field_errors(output_format, &errors)?;
            Err(anyhow::anyhow!("{} was not submitted", kind))
        }
        Err(SubmitError::NoSession) => Err(not_logged_in()),
        Err(SubmitError::Remote(err)) => Err(explain_remote(err)),
        Err(other) => Err(other.into()),
    }
}
