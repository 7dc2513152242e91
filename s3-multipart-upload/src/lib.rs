/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

/* Automatically managed default lints */
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
/* End of automatically managed default lints */
#![warn(
    missing_debug_implementations,
    missing_docs,
    rustdoc::missing_crate_level_docs,
    unreachable_pub,
    rust_2018_idioms
)]

//! Upload a single local file to Amazon S3 (or any S3 compatible object store) using the
//! [multipart upload] protocol.
//!
//! The source is split into fixed size parts which are uploaded one at a time, in order, each
//! with a bounded number of attempts. Once every part is stored the upload is completed with the
//! ordered list of parts. If any part cannot be uploaded the multipart upload is aborted.
//!
//! [multipart upload]: https://docs.aws.amazon.com/AmazonS3/latest/userguide/mpuoverview.html
//!
//! # Examples
//!
//! ```no_run
//! # async fn example() -> Result<(), s3_multipart_upload::error::Error> {
//! use s3_multipart_upload::io::InputStream;
//!
//! let config = s3_multipart_upload::from_env()
//!     .credentials("access-key-id", "secret-access-key")
//!     .endpoint_url("https://s3.example.com")
//!     .region("us-east-1")
//!     .load()
//!     .await?;
//! let client = s3_multipart_upload::Client::new(config);
//!
//! let handle = client
//!     .upload()
//!     .bucket("my-bucket")
//!     .key("multipartupload/data.bin")
//!     .body(InputStream::from_path("data.bin")?)
//!     .send()
//!     .await?;
//!
//! let output = handle.join().await?;
//! println!("uploaded {:?}", output.e_tag());
//! # Ok(())
//! # }
//! ```

pub(crate) const MEBIBYTE: u64 = 1024 * 1024;

/// Error types emitted by `s3-multipart-upload`
pub mod error;

/// Common types used by `s3-multipart-upload`
pub mod types;

/// Types and helpers for I/O
pub mod io;

/// The object storage service boundary
pub mod storage;

/// Upload client
pub mod client;

/// Upload operations
pub mod operation;

/// Client configuration
pub mod config;

/// Tower related middleware and components
pub(crate) mod middleware;

pub use self::client::Client;
use self::config::loader::ConfigLoader;
pub use self::config::Config;

/// Create a config loader
pub fn from_env() -> ConfigLoader {
    ConfigLoader::default()
}
