use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Print a value as pretty JSON
pub fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Output a one-line result, or `{key: value}` in JSON mode
pub fn output_value(output_format: OutputFormat, key: &str, value: Value, text: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => print_json(&json!({ key: value })),
        OutputFormat::Text => {
            println!("{}", text);
            Ok(())
        }
    }
}
