//! Command handlers

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use iaasctl_core::config::SecretStore;
use iaasctl_core::{Client, Config, HttpMethod, ParameterList, ProgressEvent, wait_job};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::cli::{ConfigCommands, OutputFormat};
use crate::error::{CliError, Result};
use crate::output::{mask_secret, print_output};

/// Parse `-P key=value` arguments in order; `@path` values are read from a file
pub fn parse_params(args: &[String]) -> Result<ParameterList> {
    let mut params = ParameterList::new();
    for arg in args {
        let (key, value) = arg
            .split_once('=')
            .filter(|(key, _)| !key.is_empty())
            .ok_or_else(|| CliError::InvalidParameter { arg: arg.clone() })?;

        let value = match value.strip_prefix('@') {
            Some(path) => std::fs::read_to_string(path).map_err(|e| CliError::FileError {
                path: path.to_string(),
                message: e.to_string(),
            })?,
            None => value.to_string(),
        };
        params.push(key, value);
    }
    Ok(params)
}

fn method_for(post: bool) -> HttpMethod {
    if post { HttpMethod::Post } else { HttpMethod::Get }
}

pub async fn handle_call(
    client: &Client,
    zone: Option<String>,
    action: &str,
    params: &[String],
    post: bool,
    format: OutputFormat,
) -> Result<()> {
    let params = parse_params(params)?;
    let op = client.operation(action, method_for(post), client.properties_for(zone));
    debug!("Calling {} with {} parameters", action, params.len());

    let body = client.send_raw(&op, params).await?;
    print_output(body, format)
}

pub fn handle_sign(
    client: &Client,
    zone: Option<String>,
    action: &str,
    params: &[String],
    post: bool,
    timestamp: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let timestamp = match timestamp {
        Some(value) => DateTime::parse_from_rfc3339(value)
            .map_err(|e| CliError::InvalidTimestamp {
                value: value.to_string(),
                message: e.to_string(),
            })?
            .with_timezone(&Utc),
        None => Utc::now(),
    };

    let op = client.operation(action, method_for(post), client.properties_for(zone));
    let mut all = op.base_params();
    all.extend(parse_params(params)?);
    let signed = client.sign(&op, &all, timestamp)?;

    let endpoint = client.config().endpoint()?;
    let url = match signed.method {
        HttpMethod::Get => format!("{}?{}", endpoint, signed.encoded()),
        HttpMethod::Post => endpoint.to_string(),
    };
    print_output(
        json!({
            "method": signed.method.as_str(),
            "url": url,
            "path": signed.path,
            "string_to_sign": signed.string_to_sign,
            "signature": signed.signature,
            "body": match signed.method {
                HttpMethod::Get => None,
                HttpMethod::Post => Some(signed.encoded()),
            },
        }),
        format,
    )
}

pub async fn handle_wait_job(
    client: &Client,
    zone: Option<String>,
    job_id: &str,
    timeout: u64,
    interval: u64,
    format: OutputFormat,
) -> Result<()> {
    let job = wait_job(
        client,
        zone,
        job_id,
        Duration::from_secs(timeout),
        Duration::from_secs(interval.max(1)),
        Some(Box::new(|event: ProgressEvent| match event {
            ProgressEvent::Polling {
                job_id,
                status,
                elapsed,
            } => eprintln!("{} {} ({}s)", job_id, status, elapsed.as_secs()),
            ProgressEvent::Completed { job_id } => info!("Job {} completed", job_id),
            _ => {}
        })),
    )
    .await?;

    print_output(job, format)
}

pub fn handle_config(
    command: &ConfigCommands,
    config: &Config,
    config_path: Option<&Path>,
    zone: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let path = match config_path {
        Some(path) => path.to_path_buf(),
        None => Config::config_path()?,
    };

    match command {
        ConfigCommands::Path => {
            println!("{}", path.display());
            Ok(())
        }
        ConfigCommands::Show => {
            let mut shown = config.clone();
            shown.secret_access_key = mask_secret(&shown.secret_access_key);
            let mut value = serde_json::to_value(shown)?;
            value["credential_storage"] = SecretStore::new().backend().name().into();
            print_output(value, format)
        }
        ConfigCommands::SetCredentials {
            access_key_id,
            secret_access_key,
        } => {
            // Start from the file, not the environment-overridden view
            let mut stored = Config::load_from_path(&path)?;
            let store = SecretStore::new();
            stored.access_key_id = access_key_id.clone();
            stored.secret_access_key = match store.save(access_key_id, secret_access_key) {
                Ok(value) => value,
                Err(e) => {
                    warn!("Keyring unavailable ({}), storing secret as plaintext", e);
                    secret_access_key.clone()
                }
            };
            if let Some(zone) = zone {
                stored.zone = Some(zone.to_string());
            }
            stored.save_to_path(&path)?;

            info!(
                "Saved credentials to {} ({} storage)",
                path.display(),
                store.backend().name()
            );
            println!("Credentials saved to {}", path.display());
            Ok(())
        }
    }
}
