pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};

pub use adapters::{
    kinesis::Kinesis,
    s3::S3,
    sesv2::{Mailbox, Recipients, Sesv2},
};
pub use config::{RetryMode, TransportConfig};
pub use core::{
    dynamic::{DynamicClient, DynamicService},
    service::{ClientParams, CredentialPair, Service},
};
pub use domain::{
    base::Base,
    env::{Environment, ProcessEnv},
    ports::ServiceClient,
};
pub use utils::error::{Result, WrapperError};

// SDK crates, so callers can name request and response types without extra dependencies
pub use aws_config;
pub use aws_sdk_kinesis;
pub use aws_sdk_s3;
pub use aws_sdk_sesv2;
