/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time;

use aws_sdk_s3::error::DisplayErrorContext;
use s3_multipart_upload::error::AbortStatus;
use s3_multipart_upload::io::InputStream;
use s3_multipart_upload::types::PartSize;
use s3_multipart_upload::Client;
use tracing::{debug_span, Instrument};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const ONE_MEBIBYTE: u64 = 1024 * 1024;

#[derive(Debug, Clone, clap::Parser)]
#[command(name = "upload")]
#[command(about = "Uploads a local file to an S3 compatible service using multipart upload.")]
pub struct Args {
    /// Local file to upload
    #[arg(required = true)]
    file: PathBuf,

    /// Access key ID
    #[arg(long, env = "AWS_ACCESS_KEY_ID", hide_env_values = true)]
    access_key: String,

    /// Secret access key
    #[arg(long, env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
    secret_key: String,

    /// Bucket to upload to
    #[arg(long, env = "AWS_BUCKET_NAME")]
    bucket: String,

    /// Endpoint URL of the storage service
    #[arg(long, env = "API_URL")]
    api_url: Option<String>,

    /// Region of the storage service
    #[arg(long, env = "REGION")]
    region: Option<String>,

    /// Object key, defaults to `multipartupload/<file name>`
    #[arg(long)]
    key: Option<String>,

    /// MIME type of the object
    #[arg(long, default_value = "application/octet-stream")]
    content_type: String,

    /// Part size in bytes (minimum 5 MiB)
    #[arg(long, default_value_t = 5 * ONE_MEBIBYTE)]
    part_size: u64,

    /// Maximum number of attempts per part
    #[arg(long, default_value_t = 10)]
    max_attempts: usize,

    /// Load the whole file into memory before uploading instead of reading each part from disk
    #[arg(long, default_value_t = false, action = clap::ArgAction::SetTrue)]
    in_memory: bool,
}

fn default_key(path: &Path) -> Result<String, BoxError> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| format!("{} has no usable file name", path.display()))?;
    Ok(format!("multipartupload/{file_name}"))
}

async fn do_upload(args: Args) -> Result<(), BoxError> {
    let mut loader = s3_multipart_upload::from_env()
        .credentials(&args.access_key, &args.secret_key)
        .part_size(PartSize::Target(args.part_size))
        .max_attempts(args.max_attempts);
    if let Some(api_url) = &args.api_url {
        loader = loader.endpoint_url(api_url);
    }
    if let Some(region) = &args.region {
        loader = loader.region(region);
    }
    let config = loader.load().await?;
    let tm = Client::new(config);

    let key = match args.key {
        Some(key) => key,
        None => default_key(&args.file)?,
    };

    let stream = if args.in_memory {
        InputStream::read_from_path(&args.file).await?
    } else {
        InputStream::from_path(&args.file)?
    };
    let content_length = stream.content_length();

    let start = time::Instant::now();
    let handle = tm
        .upload()
        .bucket(&args.bucket)
        .key(&key)
        .content_type(&args.content_type)
        .body(stream)
        .send()
        .instrument(debug_span!("send-upload"))
        .await?;

    match handle.join().instrument(debug_span!("join-upload")).await {
        Ok(output) => {
            let elapsed = start.elapsed();
            let megabytes = content_length as f64 / ONE_MEBIBYTE as f64;
            println!(
                "uploaded {} to s3://{}/{} in {} part(s)",
                args.file.display(),
                output.bucket(),
                output.key(),
                output.parts().len()
            );
            println!(
                "{megabytes:.3} MiB in {:.3}s ({:.3} MiB/s), ETag: {}",
                elapsed.as_secs_f64(),
                megabytes / elapsed.as_secs_f64(),
                output.e_tag().unwrap_or("-")
            );
            Ok(())
        }
        Err(err) => {
            match err.abort_status() {
                Some(AbortStatus::Aborted(aborted)) => {
                    eprintln!("multipart upload {} aborted", aborted.upload_id())
                }
                Some(AbortStatus::Failed(abort_err)) => eprintln!(
                    "multipart upload could not be aborted: {}",
                    DisplayErrorContext(abort_err.as_ref())
                ),
                Some(AbortStatus::Retained { upload_id }) => {
                    eprintln!("multipart upload {upload_id} retained")
                }
                _ => {}
            }
            Err(err.into())
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    use clap::Parser;
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_thread_ids(true)
        .init();

    match do_upload(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("upload failed: {}", DisplayErrorContext(err.as_ref()));
            eprintln!("upload failed: {}", DisplayErrorContext(err.as_ref()));
            ExitCode::FAILURE
        }
    }
}
