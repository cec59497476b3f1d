use anyhow::Context;
use clap::Parser;
use std::io::Write;
use yc_aws_wrapper::aws_sdk_s3::types::ObjectCannedAcl;
use yc_aws_wrapper::config::cli::ServiceKind;
use yc_aws_wrapper::utils::error::ErrorCategory;
use yc_aws_wrapper::utils::{logger, validation::Validate};
use yc_aws_wrapper::{
    CliConfig, Command, Kinesis, Service, ServiceClient, Sesv2, TransportConfig, WrapperError, S3,
};

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    let format = logger::LogFormat::from_json_flag(config.json_logs);
    if let Err(e) = logger::init(format, config.verbose) {
        eprintln!("⚠️ {}", e);
    }
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    if let Err(e) = run(config).await {
        let wrapped = e.downcast_ref::<WrapperError>();
        tracing::error!(
            "❌ Command failed: {:#} (category: {:?}, code: {:?})",
            e,
            wrapped.map(WrapperError::category),
            wrapped.and_then(WrapperError::service_code)
        );
        eprintln!("❌ {:#}", e);
        if let Some(wrapped) = wrapped {
            eprintln!("💡 {}", wrapped.recovery_suggestion());
        }

        // 2 when the remote service rejected the call, 1 for everything local
        let exit_code = match wrapped.map(WrapperError::category) {
            Some(ErrorCategory::Service) => 2,
            _ => 1,
        };
        std::process::exit(exit_code);
    }
}

async fn run(config: CliConfig) -> anyhow::Result<()> {
    let transport = match &config.config {
        Some(path) => Some(
            TransportConfig::from_file(path)
                .with_context(|| format!("failed to load transport config '{}'", path.display()))?,
        ),
        None => None,
    };
    let transport = transport.as_ref();

    match config.command {
        Command::Params { service: kind, name } => {
            let params = match kind {
                ServiceKind::S3 => {
                    let name = name.as_deref().unwrap_or(S3::DEFAULT_NAME);
                    service::<yc_aws_wrapper::aws_sdk_s3::Client>(name, transport).params()
                }
                ServiceKind::Kinesis => {
                    let name = name.as_deref().unwrap_or(Kinesis::DEFAULT_NAME);
                    service::<yc_aws_wrapper::aws_sdk_kinesis::Client>(name, transport)
                        .with_auth(false)
                        .params()
                }
                ServiceKind::Sesv2 => {
                    let name = name.as_deref().unwrap_or(Sesv2::DEFAULT_NAME);
                    service::<yc_aws_wrapper::aws_sdk_sesv2::Client>(name, transport).params()
                }
            };
            println!("{}", serde_json::to_string_pretty(&params)?);
        }

        Command::S3Get {
            name,
            bucket,
            key,
            version,
            output,
        } => {
            let s3 = S3::from_service(service(&name, transport));
            let object = s3.get(&key, &bucket, version.as_deref()).await?;
            let body = object
                .body
                .collect()
                .await
                .context("failed to read object body")?
                .into_bytes();

            match output {
                Some(path) => {
                    tokio::fs::write(&path, &body)
                        .await
                        .with_context(|| format!("failed to write '{}'", path.display()))?;
                    tracing::info!("📁 Saved s3://{}/{} to {}", bucket, key, path.display());
                }
                None => std::io::stdout().write_all(&body)?,
            }
        }

        Command::S3Put {
            name,
            bucket,
            key,
            file,
            acl,
            expires,
        } => {
            let body = tokio::fs::read(&file)
                .await
                .with_context(|| format!("failed to read '{}'", file.display()))?;
            let s3 = S3::from_service(service(&name, transport));
            let acl = acl.as_deref().map(ObjectCannedAcl::from);
            let output = s3.put(&key, &bucket, body, acl, expires).await?;
            tracing::info!(
                "✅ Stored s3://{}/{} (etag: {})",
                bucket,
                key,
                output.e_tag().unwrap_or("-")
            );
        }

        Command::StreamPut { name, key, message } => {
            let kinesis = Kinesis::from_service(service(&name, transport).with_auth(false));
            let output = kinesis.put(message, Some(&key)).await?;
            tracing::info!(
                "✅ Record written to {} (shard: {:?}, sequence: {:?})",
                kinesis.stream(),
                output.shard_id(),
                output.sequence_number()
            );
        }

        Command::MailSend {
            name,
            mailbox,
            to,
            subject,
            body,
            charset,
            suppress,
        } => {
            let sesv2 = Sesv2::from_service(service(&name, transport)).with_suppressed_codes(suppress);
            let mailbox = sesv2.mailbox(&mailbox).await?;
            match mailbox
                .send_with_charset(to, &subject, &body, &charset)
                .await?
            {
                Some(output) => tracing::info!(
                    "✅ Sent from {} (message id: {})",
                    mailbox.address(),
                    output.message_id().unwrap_or("-")
                ),
                None => tracing::warn!("⚠️ Send from {} was suppressed", mailbox.address()),
            }
        }
    }

    Ok(())
}

fn service<C: ServiceClient>(name: &str, transport: Option<&TransportConfig>) -> Service<C> {
    let service = Service::new(name);
    match transport {
        Some(transport) => service.with_config(transport.clone()),
        None => service,
    }
}
