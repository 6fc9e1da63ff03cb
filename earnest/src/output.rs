//! Output formatting for CLI commands.
//!
//! Provides abstraction layer for outputting results in text or JSON format.

use anyhow::Result;
use earnest_core::Value;
use serde::Serialize;
use std::io::{self, Write};

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Writer for command output with format abstraction.
pub struct OutputWriter {
    format: OutputFormat,
    stdout: io::Stdout,
}

impl OutputWriter {
    /// Create a new OutputWriter.
    pub fn new(json: bool) -> Self {
        Self {
            format: if json {
                OutputFormat::Json
            } else {
                OutputFormat::Text
            },
            stdout: io::stdout(),
        }
    }

    /// Write output using the configured format.
    ///
    /// The `text_fn` closure is called only in text mode to generate the
    /// human-readable output.
    pub fn write<T: Serialize>(&self, data: &T, text_fn: impl FnOnce() -> String) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(data)?;
                writeln!(&self.stdout, "{}", json)?;
            }
            OutputFormat::Text => {
                let text = text_fn();
                if !text.is_empty() {
                    write!(&self.stdout, "{}", text)?;
                }
            }
        }
        Ok(())
    }

    /// Write an error message to stderr.
    ///
    /// In JSON mode, writes a JSON error object with success=false.
    /// In text mode, writes the error message directly.
    pub fn write_error(&self, error: &anyhow::Error, result_code: u8) {
        match self.format {
            OutputFormat::Json => {
                let error_output = ErrorOutput {
                    success: false,
                    result_code,
                    error: format!("{:#}", error),
                };
                if let Ok(json) = serde_json::to_string_pretty(&error_output) {
                    let _ = writeln!(io::stderr(), "{}", json);
                }
            }
            OutputFormat::Text => {
                let _ = writeln!(io::stderr(), "Error: {:#}", error);
            }
        }
    }
}

/// Render a node for text output: strings bare, everything else as JSON.
pub fn render_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ============================================================================
// Data Transfer Objects (DTOs) for JSON output
// ============================================================================

/// Error output structure.
#[derive(Debug, Serialize)]
pub struct ErrorOutput {
    pub success: bool,
    pub result_code: u8,
    pub error: String,
}

/// One node visited by `walk`.
#[derive(Debug, Clone, Serialize)]
pub struct WalkEntry {
    pub path: String,
    pub value: serde_json::Value,
}

/// Output for `walk` command.
#[derive(Debug, Serialize)]
pub struct WalkOutput {
    pub success: bool,
    pub result_code: u8,
    pub order: String,
    pub entries: Vec<WalkEntry>,
}

/// Output for `get` command.
#[derive(Debug, Serialize)]
pub struct GetOutput {
    pub success: bool,
    pub result_code: u8,
    pub path: String,
    pub value: serde_json::Value,
    pub defaulted: bool,
}

/// Data variants for `lookup` command.
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum LookupData {
    Value { value: Value },
    View { tag: String, keys: Vec<String> },
}

/// Output for `lookup` command.
#[derive(Debug, Serialize)]
pub struct LookupOutput {
    pub success: bool,
    pub result_code: u8,
    pub key: String,
    #[serde(flatten)]
    pub data: LookupData,
}

/// Output for `keys` command.
#[derive(Debug, Serialize)]
pub struct KeysOutput {
    pub success: bool,
    pub result_code: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    pub keys: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_text() {
        assert_eq!(render_text(&json!("bare")), "bare");
        assert_eq!(render_text(&json!(1)), "1");
        assert_eq!(render_text(&json!({"a": [true]})), r#"{"a":[true]}"#);
    }

    #[test]
    fn test_lookup_output_shape() {
        let output = LookupOutput {
            success: true,
            result_code: 0,
            key: "\"a\"".to_string(),
            data: LookupData::View {
                tag: "int".to_string(),
                keys: vec!["a".to_string()],
            },
        };
        assert_eq!(
            serde_json::to_value(&output).unwrap(),
            json!({
                "success": true,
                "result_code": 0,
                "key": "\"a\"",
                "type": "View",
                "tag": "int",
                "keys": ["a"],
            })
        );
    }

    #[test]
    fn test_keys_output_skips_missing_tag() {
        let output = KeysOutput {
            success: true,
            result_code: 0,
            tag: None,
            keys: vec![],
        };
        let value = serde_json::to_value(&output).unwrap();
        assert!(value.get("tag").is_none());
    }
}
