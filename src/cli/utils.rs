use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::entity::ErrorMap;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(Value::Object(extra)), Some(target)) = (data, response.as_object_mut()) {
                target.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output per-field validation failures in the appropriate format
pub fn output_field_errors(output_format: &OutputFormat, errors: &ErrorMap) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({
                "success": false,
                "error": "Validation failed",
                "field_errors": errors.field_errors()
            }))?);
        }
        OutputFormat::Text => {
            eprintln!("Validation failed:");
            for (field, message) in errors.failures() {
                eprintln!("  {:<20} {}", field, message);
            }
        }
    }
    Ok(())
}

/// Split a `field=value` argument. The value may be empty or contain `=`.
pub fn parse_assignment(raw: &str) -> anyhow::Result<(String, String)> {
    match raw.split_once('=') {
        Some((field, value)) if !field.trim().is_empty() => Ok((field.trim().to_string(), value.to_string())),
        _ => Err(anyhow::anyhow!("Expected field=value, got '{}'", raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_assignment_keeps_value_verbatim() {
        assert_eq!(
            parse_assignment("companyName=Acme = Co").unwrap(),
            ("companyName".to_string(), "Acme = Co".to_string())
        );
        assert_eq!(parse_assignment("companyZip=").unwrap().1, "");
        assert!(parse_assignment("=x").is_err());
        assert!(parse_assignment("companyName").is_err());
    }
}
