/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::num::NonZeroU64;
use std::sync::Arc;

use crate::storage::StorageClient;
use crate::types::PartSize;
use crate::{Config, MEBIBYTE};

/// Multipart upload client.
#[derive(Debug, Clone)]
pub struct Client {
    pub(crate) handle: Arc<Handle>,
}

/// Whatever is needed to carry out operations, e.g. config, storage client, etc
#[derive(Debug)]
pub(crate) struct Handle {
    pub(crate) config: crate::Config,
}

impl Handle {
    /// Get the concrete part size to use for uploads
    pub(crate) fn upload_part_size_bytes(&self) -> Option<NonZeroU64> {
        match self.config.part_size() {
            PartSize::Auto => NonZeroU64::new(5 * MEBIBYTE),
            PartSize::Target(explicit) => NonZeroU64::new(*explicit),
        }
    }

    /// Maximum number of attempts for a single part
    pub(crate) fn max_attempts(&self) -> usize {
        self.config.max_attempts()
    }

    /// The storage client to use for service operations
    pub(crate) fn storage(&self) -> &dyn StorageClient {
        self.config.storage().as_ref()
    }
}

impl Client {
    /// Creates a new client from a config.
    pub fn new(config: Config) -> Client {
        let handle = Arc::new(Handle { config });
        Client { handle }
    }

    /// Returns the client's configuration
    pub fn config(&self) -> &Config {
        &self.handle.config
    }

    /// Upload a single file or buffer as a multipart upload.
    ///
    /// Constructs a fluent builder for the
    /// [`Upload`](crate::operation::upload::builders::UploadFluentBuilder) operation.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::error::Error;
    /// use std::path::Path;
    /// use s3_multipart_upload::io::InputStream;
    ///
    /// async fn upload_file(
    ///     client: &s3_multipart_upload::Client,
    ///     path: impl AsRef<Path>
    /// ) -> Result<(), Box<dyn Error>> {
    ///     let stream = InputStream::from_path(path)?;
    ///     let handle = client.upload()
    ///         .bucket("my-bucket")
    ///         .key("my-key")
    ///         .content_type("application/octet-stream")
    ///         .body(stream)
    ///         .send()
    ///         .await?;
    ///
    ///     // wait for the upload to complete
    ///     let _output = handle.join().await?;
    ///
    ///     Ok(())
    /// }
    /// ```
    pub fn upload(&self) -> crate::operation::upload::builders::UploadFluentBuilder {
        crate::operation::upload::builders::UploadFluentBuilder::new(self.handle.clone())
    }
}
