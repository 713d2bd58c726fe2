//! Message template rendering
//!
//! Placeholders:
//! - `$property`: field name (or array index)
//! - `$value`: the rejected value
//! - `$constraint1`, `$constraint2`, ...: positional constraint parameters

use serde_json::Value;

/// Renders a message template for one failed constraint.
pub fn render(template: &str, property: &str, value: &Value, params: &Value) -> String {
    let mut message = template.to_string();

    if let Some(args) = params.as_array() {
        // Highest index first so `$constraint1` never eats `$constraint10`.
        for (i, arg) in args.iter().enumerate().rev() {
            let placeholder = format!("$constraint{}", i + 1);
            message = message.replace(&placeholder, &display_value(arg));
        }
    } else if !params.is_null() {
        message = message.replace("$constraint1", &display_value(params));
    }

    message
        .replace("$property", property)
        .replace("$value", &display_value(value))
}

/// Formats a value for messages: strings unquoted, everything else as JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
