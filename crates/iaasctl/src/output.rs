use iaasctl_core::config::SecretStore;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::Result;

pub fn print_output<T: Serialize>(data: T, format: OutputFormat) -> Result<()> {
    println!("{}", render(&data, format)?);
    Ok(())
}

fn render<T: Serialize>(data: &T, format: OutputFormat) -> Result<String> {
    let json_value = serde_json::to_value(data)?;
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(&json_value)?,
        OutputFormat::Yaml => serde_yaml::to_string(&json_value)?,
    })
}

/// Mask a secret for display, leaving keyring references readable
pub fn mask_secret(value: &str) -> String {
    if value.is_empty() || SecretStore::is_reference(value) || value.starts_with("${") {
        value.to_string()
    } else {
        "********".to_string()
    }
}
