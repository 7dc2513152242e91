/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::cmp;
use std::sync::Arc;

use crate::error;
use crate::storage::StorageClient;
use crate::types::{EmptyObjectPolicy, FailedMultipartUploadPolicy, PartSize, RetryBackoff};
use crate::MEBIBYTE;

/// Load configuration from credentials, endpoint and region
pub mod loader;

/// Minimum upload part size in bytes
const MIN_MULTIPART_PART_SIZE_BYTES: u64 = 5 * MEBIBYTE;

/// Default number of attempts for a single part
pub(crate) const DEFAULT_MAX_ATTEMPTS: usize = 10;

/// Configuration for a [`Client`](crate::client::Client)
#[derive(Debug, Clone)]
pub struct Config {
    target_part_size: PartSize,
    max_attempts: usize,
    retry_backoff: RetryBackoff,
    empty_object_policy: EmptyObjectPolicy,
    failed_multipart_upload_policy: FailedMultipartUploadPolicy,
    storage: Arc<dyn StorageClient>,
}

impl Config {
    /// Create a new `Config` builder
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Returns a reference to the target part size to use for uploads
    pub fn part_size(&self) -> &PartSize {
        &self.target_part_size
    }

    /// Maximum number of attempts to upload a single part
    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Delay between attempts to upload the same part
    pub fn retry_backoff(&self) -> &RetryBackoff {
        &self.retry_backoff
    }

    /// How inputs with no content are handled
    pub fn empty_object_policy(&self) -> &EmptyObjectPolicy {
        &self.empty_object_policy
    }

    /// What to do with the multipart upload when a part fails
    pub fn failed_multipart_upload_policy(&self) -> &FailedMultipartUploadPolicy {
        &self.failed_multipart_upload_policy
    }

    /// The storage client that will be used to send requests.
    pub fn storage(&self) -> &Arc<dyn StorageClient> {
        &self.storage
    }
}

/// Fluent style builder for [Config]
#[derive(Debug, Clone)]
pub struct Builder {
    target_part_size: PartSize,
    max_attempts: usize,
    retry_backoff: RetryBackoff,
    empty_object_policy: EmptyObjectPolicy,
    failed_multipart_upload_policy: FailedMultipartUploadPolicy,
    storage: Option<Arc<dyn StorageClient>>,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            target_part_size: PartSize::default(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_backoff: RetryBackoff::default(),
            empty_object_policy: EmptyObjectPolicy::default(),
            failed_multipart_upload_policy: FailedMultipartUploadPolicy::default(),
            storage: None,
        }
    }
}

impl Builder {
    /// The target size of each part.
    ///
    /// The minimum part size is 5 MiB, any part size less than that will be rounded up.
    /// Default is [PartSize::Auto] (5 MiB).
    pub fn part_size(self, part_size: PartSize) -> Self {
        let part_size = match part_size {
            PartSize::Target(part_size) => {
                PartSize::Target(cmp::max(part_size, MIN_MULTIPART_PART_SIZE_BYTES))
            }
            tps => tps,
        };

        self.set_target_part_size(part_size)
    }

    /// Target part size for a multipart upload.
    ///
    /// NOTE: This does not validate the setting and is meant for internal use only.
    pub(crate) fn set_target_part_size(mut self, part_size: PartSize) -> Self {
        self.target_part_size = part_size;
        self
    }

    /// Maximum number of attempts to upload a single part, including the first one.
    ///
    /// Must be at least 1. Default is 10.
    pub fn max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Delay between attempts to upload the same part.
    ///
    /// Default is [RetryBackoff::None], parts are retried immediately.
    pub fn retry_backoff(mut self, retry_backoff: RetryBackoff) -> Self {
        self.retry_backoff = retry_backoff;
        self
    }

    /// How inputs with no content are handled.
    ///
    /// Default is [EmptyObjectPolicy::Reject].
    pub fn empty_object_policy(mut self, policy: EmptyObjectPolicy) -> Self {
        self.empty_object_policy = policy;
        self
    }

    /// What to do with the multipart upload when a part fails.
    ///
    /// Default is [FailedMultipartUploadPolicy::AbortUpload].
    pub fn failed_multipart_upload_policy(mut self, policy: FailedMultipartUploadPolicy) -> Self {
        self.failed_multipart_upload_policy = policy;
        self
    }

    /// Set an explicit S3 client to use.
    pub fn client(self, client: aws_sdk_s3::Client) -> Self {
        self.storage_client(client)
    }

    /// Set the storage client used to send requests.
    pub fn storage_client(mut self, storage: impl StorageClient + 'static) -> Self {
        self.storage = Some(Arc::new(storage));
        self
    }

    /// Consumes the builder and constructs a [`Config`](crate::config::Config)
    pub fn build(self) -> Result<Config, error::Error> {
        if self.max_attempts == 0 {
            return Err(error::invalid_input("max_attempts must be at least 1"));
        }
        if let PartSize::Target(0) = self.target_part_size {
            return Err(error::invalid_input("part size must be greater than 0"));
        }
        let storage = self
            .storage
            .ok_or_else(|| error::invalid_input("a storage client is required"))?;

        Ok(Config {
            target_part_size: self.target_part_size,
            max_attempts: self.max_attempts,
            retry_backoff: self.retry_backoff,
            empty_object_policy: self.empty_object_policy,
            failed_multipart_upload_policy: self.failed_multipart_upload_policy,
            storage,
        })
    }
}
