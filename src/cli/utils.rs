use serde::Serialize;
use serde_json::{json, Value};
use std::io::{self, BufRead, Write};

use crate::cli::OutputFormat;
use crate::clock::format_time;
use crate::form::{Diff, Notifier, NO_DIFF_MESSAGE};
use crate::models::{Restaurant, ValidationErrors};

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

            if let Some(Value::Object(fields)) = data {
                if let Some(object) = response.as_object_mut() {
                    object.extend(fields);
                }
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(
    output_format: &OutputFormat,
    message: &str,
    error_code: Option<&str>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": message
            });

            if let Some(code) = error_code {
                response["error_code"] = json!(code);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// Print per-field validation failures
pub fn output_validation(
    output_format: &OutputFormat,
    errors: &ValidationErrors,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "success": false,
                    "error": "Form is invalid",
                    "field_errors": errors
                }))?
            );
        }
        OutputFormat::Text => {
            eprintln!("The form has errors:");
            for (field, message) in errors.iter() {
                eprintln!("  {}: {}", field, message);
            }
        }
    }
    Ok(())
}

pub fn output_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Show what an edit would change
pub fn output_diff(output_format: &OutputFormat, diff: &Diff) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => output_json(&diff_json(diff)),
        OutputFormat::Text => {
            println!("{}", diff.render());
            Ok(())
        }
    }
}

fn diff_json(diff: &Diff) -> Value {
    match diff {
        Diff::Unchanged => json!({
            "success": true,
            "message": NO_DIFF_MESSAGE
        }),
        Diff::Changed(entries) => {
            let changes: Vec<Value> = entries
                .iter()
                .map(|entry| {
                    json!({
                        "field": entry.field.key(),
                        "label": entry.field.label(),
                        "before": entry.before,
                        "after": entry.after
                    })
                })
                .collect();
            json!({ "success": true, "changes": changes })
        }
    }
}

/// Output one restaurant
pub fn output_restaurant(output_format: &OutputFormat, r: &Restaurant) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => output_json(r),
        OutputFormat::Text => {
            println!("{} ({})", r.name, r.id);
            println!("  {} in {}", r.category, r.location);
            println!("  Address: {}", r.address);
            if !r.phone.is_empty() {
                println!("  Phone: {}", r.phone);
            }
            if let Some(url) = &r.website_url {
                println!("  Website: {}", url);
            }
            println!(
                "  Open: {} - {}",
                format_time(r.time_open),
                format_time(r.time_close)
            );
            if !r.days_close.is_empty() {
                let days: Vec<&str> = r.days_close.iter().map(|d| d.as_str()).collect();
                println!("  Closed: {}", days.join(", "));
            }
            println!("  Maximum Pax: {}", r.max_pax);
            if !r.description.is_empty() {
                println!("  {}", r.description);
            }
            Ok(())
        }
    }
}

/// Output a list of restaurants, one line each in text mode
pub fn output_restaurants(
    output_format: &OutputFormat,
    restaurants: &[Restaurant],
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => output_json(&restaurants),
        OutputFormat::Text => {
            if restaurants.is_empty() {
                println!("No restaurants listed");
            }
            for r in restaurants {
                println!(
                    "{}  {:<24} {:<10} {}",
                    r.id, r.name, r.category, r.location
                );
            }
            Ok(())
        }
    }
}

/// Ask a yes/no question on stderr; anything but y/yes is a no.
pub fn confirm(prompt: &str) -> anyhow::Result<bool> {
    eprint!("{} [y/N] ", prompt);
    io::stderr().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

/// Shows form notifications on the terminal
pub struct TerminalNotifier {
    pub output_format: OutputFormat,
}

impl Notifier for TerminalNotifier {
    fn success(&self, title: &str, message: &str) {
        if let OutputFormat::Text = self.output_format {
            println!("✓ {}", title);
            println!("  {}", message);
        }
    }

    fn error(&self, title: &str, message: &str) {
        if let OutputFormat::Text = self.output_format {
            eprintln!("✗ {}", title);
            eprintln!("  {}", message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{DiffEntry, Field};

    #[test]
    fn unchanged_diff_reports_the_sentinel() {
        let value = diff_json(&Diff::Unchanged);
        assert_eq!(value["success"], true);
        assert_eq!(value["message"], NO_DIFF_MESSAGE);
        assert!(value.get("changes").is_none());
    }

    #[test]
    fn changed_diff_lists_each_field() {
        let diff = Diff::Changed(vec![DiffEntry {
            field: Field::MaxPax,
            before: "10".into(),
            after: "40".into(),
        }]);
        let value = diff_json(&diff);
        assert_eq!(
            value["changes"],
            json!([{
                "field": "maxPax",
                "label": "Maximum Pax",
                "before": "10",
                "after": "40"
            }])
        );
    }
}
