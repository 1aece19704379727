//! CLI structure and command definitions

use clap::{Parser, Subcommand};

/// Signed IaaS API calls from the command line
#[derive(Parser, Debug)]
#[command(name = "iaasctl")]
#[command(version, about = "Command-line client for signed IaaS API calls")]
#[command(long_about = "
Command-line client for signed IaaS API calls

Credentials and endpoint come from the config file, overridable with the
IAAS_ACCESS_KEY_ID, IAAS_SECRET_ACCESS_KEY, IAAS_HOST and IAAS_ZONE
environment variables.

EXAMPLES:
    # List caches in a zone
    iaasctl call DescribeCaches --zone pek3 -P limit=10 -P status.1=active

    # Inspect the signed request without sending it
    iaasctl sign DescribeCaches --zone pek3 --timestamp 2024-01-01T00:00:00Z

    # Wait for an asynchronous job
    iaasctl wait-job j-1234abcd --timeout 600

For more help on a specific command, run:
    iaasctl <command> --help
")]
pub struct Cli {
    /// Path to alternate configuration file
    #[arg(long, global = true, env = "IAASCTL_CONFIG_FILE")]
    pub config_file: Option<String>,

    /// Zone to operate in (overrides the configured default)
    #[arg(long, short, global = true)]
    pub zone: Option<String>,

    /// Output format
    #[arg(long, short = 'o', global = true, value_enum, default_value = "json")]
    pub output: OutputFormat,

    /// Enable verbose logging
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// YAML output
    Yaml,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send an action with raw parameters
    #[command(after_help = "EXAMPLES:
    iaasctl call DescribeZones
    iaasctl call DescribeCaches -P caches.1=c-1234abcd -P verbose=1
    iaasctl call CreateServerCertificate --post -P certificate_content=@cert.pem
")]
    Call {
        /// Action name, e.g. DescribeCaches
        action: String,

        /// Request parameter as key=value (repeatable); @file reads the value from a file
        #[arg(short = 'P', long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,

        /// Send as a form-encoded POST instead of GET
        #[arg(long)]
        post: bool,
    },

    /// Print the signed request for an action without sending it
    Sign {
        /// Action name, e.g. DescribeCaches
        action: String,

        /// Request parameter as key=value (repeatable); @file reads the value from a file
        #[arg(short = 'P', long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,

        /// Sign for a POST instead of GET
        #[arg(long)]
        post: bool,

        /// Signing time as RFC 3339 (defaults to now)
        #[arg(long)]
        timestamp: Option<String>,
    },

    /// Poll a job until it finishes
    WaitJob {
        /// Job id returned by a mutating action
        job_id: String,

        /// Give up after this many seconds
        #[arg(long, default_value = "600")]
        timeout: u64,

        /// Seconds between polls
        #[arg(long, default_value = "5")]
        interval: u64,
    },

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the config file location
    Path,
    /// Show the effective configuration with secrets masked
    Show,
    /// Save an access key pair to the config file
    #[command(after_help = "EXAMPLES:
    iaasctl config set-credentials --access-key-id QYACCESSKEYIDEXAMPLE --secret-access-key SECRET
    iaasctl config set-credentials --access-key-id QYACCESSKEYIDEXAMPLE --secret-access-key SECRET --zone pek3
")]
    SetCredentials {
        #[arg(long)]
        access_key_id: String,

        /// Stored in the OS keyring when available
        #[arg(long, env = "IAAS_SECRET_ACCESS_KEY", hide_env_values = true)]
        secret_access_key: String,
    },
}
