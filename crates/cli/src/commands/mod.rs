pub mod catalog;
pub mod config;
pub mod doctor;
pub mod total;

use dropcart_core::config::{AppConfig, LoadOptions};
use dropcart_core::ApplicationError;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        Self::success_with_data(command, message, None)
    }

    pub fn success_with_data(
        command: &str,
        message: impl Into<String>,
        data: Option<Value>,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn plain(output: String) -> Self {
        Self { exit_code: 0, output }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Maps an application failure through the interface error layer, using the
/// command name as correlation id.
pub(crate) fn interface_failure(
    command: &str,
    error_class: &str,
    error: impl Into<ApplicationError>,
    exit_code: u8,
) -> CommandResult {
    let interface = error.into().into_interface(command);
    CommandResult::failure(
        command,
        error_class,
        format!("{interface} ({})", interface.user_message()),
        exit_code,
    )
}

/// Loads configuration or returns the shared config failure outcome.
pub(crate) fn load_config(command: &str) -> Result<AppConfig, CommandResult> {
    AppConfig::load(LoadOptions::default())
        .map_err(|error| interface_failure(command, "config_validation", error, 2))
}

/// Renders an amount with the trailing currency symbol used on the cart screen.
pub(crate) fn format_amount(amount: Decimal, currency_symbol: &str) -> String {
    format!("{}{currency_symbol}", amount.normalize())
}
