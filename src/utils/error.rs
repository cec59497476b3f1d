use aws_sdk_kinesis::operation::put_record::PutRecordError;
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::operation::put_object::PutObjectError;
use aws_sdk_sesv2::operation::send_email::SendEmailError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WrapperError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Partial credentials found: {present} is set but {missing} is not")]
    PartialCredentials {
        present: &'static str,
        missing: &'static str,
    },

    #[error("S3 GetObject failed: {0}")]
    S3GetObject(#[from] aws_sdk_s3::error::SdkError<GetObjectError>),

    #[error("S3 PutObject failed: {0}")]
    S3PutObject(#[from] aws_sdk_s3::error::SdkError<PutObjectError>),

    #[error("Kinesis PutRecord failed: {0}")]
    KinesisPutRecord(#[from] aws_sdk_kinesis::error::SdkError<PutRecordError>),

    #[error("SESv2 SendEmail failed: {0}")]
    SesSendEmail(#[from] aws_sdk_sesv2::error::SdkError<SendEmailError>),

    #[error("Failed to build email content: {0}")]
    SesBuild(#[from] aws_sdk_sesv2::error::BuildError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Serialization,
    Io,
    Service,
}

impl WrapperError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            WrapperError::IoError(_) => ErrorCategory::Io,
            WrapperError::SerializationError(_) | WrapperError::SesBuild(_) => {
                ErrorCategory::Serialization
            }
            WrapperError::TomlError(_)
            | WrapperError::ConfigError { .. }
            | WrapperError::MissingConfigError { .. }
            | WrapperError::InvalidConfigValueError { .. }
            | WrapperError::PartialCredentials { .. } => ErrorCategory::Configuration,
            WrapperError::S3GetObject(_)
            | WrapperError::S3PutObject(_)
            | WrapperError::KinesisPutRecord(_)
            | WrapperError::SesSendEmail(_) => ErrorCategory::Service,
        }
    }

    /// Provider error code reported by the remote service, when there is one.
    pub fn service_code(&self) -> Option<&str> {
        // one trait shared by every SDK crate
        use aws_sdk_s3::error::ProvideErrorMetadata;

        match self {
            WrapperError::S3GetObject(e) => e.code(),
            WrapperError::S3PutObject(e) => e.code(),
            WrapperError::KinesisPutRecord(e) => e.code(),
            WrapperError::SesSendEmail(e) => e.code(),
            _ => None,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check the <NAME>_* and AWS_* environment variables and the transport config file"
            }
            ErrorCategory::Serialization => "Check that the payload can be represented as JSON",
            ErrorCategory::Io => "Check file paths and permissions",
            ErrorCategory::Service => {
                "Check the endpoint URL, credentials and the remote resource names"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, WrapperError>;
