use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, Validate};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "yc-aws")]
#[command(about = "Object storage, data streams and mail on AWS-compatible clouds, configured from the environment")]
pub struct CliConfig {
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Write logs as JSON lines")]
    pub json_logs: bool,

    /// Transport settings (timeouts, retries, path-style addressing) as TOML
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ServiceKind {
    S3,
    Kinesis,
    Sesv2,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print the parameters a service client would be built with
    Params {
        #[arg(value_enum)]
        service: ServiceKind,

        /// Environment namespace, defaults to the service name
        #[arg(long)]
        name: Option<String>,
    },

    /// Download an object
    S3Get {
        #[arg(long, default_value = "s3")]
        name: String,
        #[arg(long)]
        bucket: String,
        #[arg(long)]
        key: String,
        #[arg(long)]
        version: Option<String>,
        /// Write the body here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Upload a file as an object
    S3Put {
        #[arg(long, default_value = "s3")]
        name: String,
        #[arg(long)]
        bucket: String,
        #[arg(long)]
        key: String,
        #[arg(long)]
        file: PathBuf,
        /// Canned ACL, e.g. public-read
        #[arg(long)]
        acl: Option<String>,
        /// RFC 3339 timestamp, e.g. 2030-01-01T00:00:00Z
        #[arg(long)]
        expires: Option<DateTime<Utc>>,
    },

    /// Write one record to a data stream
    StreamPut {
        #[arg(long, default_value = "kinesis")]
        name: String,
        #[arg(long, default_value = "1")]
        key: String,
        #[arg(long)]
        message: String,
    },

    /// Send a plain-text email from a configured mailbox
    MailSend {
        #[arg(long, default_value = "sesv2")]
        name: String,
        #[arg(long)]
        mailbox: String,
        #[arg(long, value_delimiter = ',', required = true)]
        to: Vec<String>,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        body: String,
        #[arg(long, default_value = "UTF-8")]
        charset: String,
        /// Provider error codes to ignore
        #[arg(long, value_delimiter = ',')]
        suppress: Vec<String>,
    },
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        match &self.command {
            Command::Params { name, .. } => {
                if let Some(name) = name {
                    validate_non_empty_string("name", name)?;
                }
            }
            Command::S3Get {
                name, bucket, key, ..
            }
            | Command::S3Put {
                name, bucket, key, ..
            } => {
                validate_non_empty_string("name", name)?;
                validate_non_empty_string("bucket", bucket)?;
                validate_non_empty_string("key", key)?;
            }
            Command::StreamPut { name, key, .. } => {
                validate_non_empty_string("name", name)?;
                validate_non_empty_string("key", key)?;
            }
            Command::MailSend {
                name,
                mailbox,
                to,
                charset,
                ..
            } => {
                validate_non_empty_string("name", name)?;
                validate_non_empty_string("mailbox", mailbox)?;
                validate_non_empty_string("charset", charset)?;
                for address in to {
                    validate_non_empty_string("to", address)?;
                }
            }
        }
        Ok(())
    }
}
