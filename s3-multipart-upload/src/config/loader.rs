/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::fmt;

use aws_sdk_s3::config::{Credentials, Region};

use crate::config::Builder;
use crate::error;
use crate::types::{EmptyObjectPolicy, FailedMultipartUploadPolicy, PartSize, RetryBackoff};
use crate::Config;

/// Static access credentials for the storage service.
#[derive(Clone)]
struct StaticCredentials {
    access_key_id: String,
    secret_access_key: String,
    session_token: Option<String>,
}

impl fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"** redacted **")
            .field("session_token", &self.session_token.as_ref().map(|_| "** redacted **"))
            .finish()
    }
}

impl StaticCredentials {
    /// Check the credentials before they are used for any request
    fn validate(self) -> Result<Credentials, error::Error> {
        if self.access_key_id.trim().is_empty() {
            return Err(error::invalid_credentials("access key ID is empty"));
        }
        if self.secret_access_key.trim().is_empty() {
            return Err(error::invalid_credentials("secret access key is empty"));
        }
        if matches!(&self.session_token, Some(token) if token.trim().is_empty()) {
            return Err(error::invalid_credentials("session token is empty"));
        }

        Ok(Credentials::new(
            self.access_key_id,
            self.secret_access_key,
            self.session_token,
            None,
            "s3-multipart-upload",
        ))
    }
}

/// Load [`Config`] for an S3 compatible endpoint.
///
/// Static credentials are required and are validated before any request is made. Settings not
/// given explicitly (e.g. region) fall back to the standard AWS environment configuration.
#[derive(Default, Debug)]
pub struct ConfigLoader {
    builder: Builder,
    credentials: Option<StaticCredentials>,
    endpoint_url: Option<String>,
    region: Option<String>,
}

impl ConfigLoader {
    /// Static access key ID and secret access key used to sign requests
    pub fn credentials(
        mut self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        self.credentials = Some(StaticCredentials {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
        });
        self
    }

    /// Session token for temporary credentials.
    ///
    /// Has no effect unless [`credentials`](Self::credentials) is also set.
    pub fn session_token(mut self, session_token: impl Into<String>) -> Self {
        if let Some(credentials) = self.credentials.as_mut() {
            credentials.session_token = Some(session_token.into());
        }
        self
    }

    /// Endpoint URL of the storage service (e.g. `https://s3.example.com`)
    pub fn endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }

    /// Region of the storage service
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// The target size of each part.
    ///
    /// The minimum part size is 5 MiB, any part size less than that will be rounded up.
    /// Default is [PartSize::Auto] (5 MiB).
    pub fn part_size(mut self, part_size: PartSize) -> Self {
        self.builder = self.builder.part_size(part_size);
        self
    }

    /// Maximum number of attempts to upload a single part. Default is 10.
    pub fn max_attempts(mut self, max_attempts: usize) -> Self {
        self.builder = self.builder.max_attempts(max_attempts);
        self
    }

    /// Delay between attempts to upload the same part. Default is [RetryBackoff::None].
    pub fn retry_backoff(mut self, retry_backoff: RetryBackoff) -> Self {
        self.builder = self.builder.retry_backoff(retry_backoff);
        self
    }

    /// How inputs with no content are handled. Default is [EmptyObjectPolicy::Reject].
    pub fn empty_object_policy(mut self, policy: EmptyObjectPolicy) -> Self {
        self.builder = self.builder.empty_object_policy(policy);
        self
    }

    /// What to do with the multipart upload when a part fails.
    /// Default is [FailedMultipartUploadPolicy::AbortUpload].
    pub fn failed_multipart_upload_policy(mut self, policy: FailedMultipartUploadPolicy) -> Self {
        self.builder = self.builder.failed_multipart_upload_policy(policy);
        self
    }

    /// Load the configuration
    ///
    /// Fails with [`CredentialsInvalid`](crate::error::ErrorKind::CredentialsInvalid) if no
    /// credentials were given or they are malformed; no request is sent in that case.
    pub async fn load(self) -> Result<Config, error::Error> {
        let credentials = self
            .credentials
            .ok_or_else(|| error::invalid_credentials("credentials are required"))?
            .validate()?;

        let mut loader = aws_config::from_env().credentials_provider(credentials);
        if let Some(region) = self.region {
            loader = loader.region(Region::new(region));
        }
        if let Some(endpoint_url) = self.endpoint_url {
            loader = loader.endpoint_url(endpoint_url);
        }
        let shared_config = loader.load().await;

        // S3 compatible endpoints generally don't support virtual hosted style addressing
        let s3_config = aws_sdk_s3::config::Builder::from(&shared_config)
            .force_path_style(true)
            .build();
        tracing::debug!(
            region = ?s3_config.region(),
            "loaded storage client configuration"
        );

        self.builder
            .client(aws_sdk_s3::Client::from_conf(s3_config))
            .build()
    }
}

#[cfg(test)]
mod test {
    use crate::error::ErrorKind;

    #[tokio::test]
    async fn test_missing_credentials() {
        let err = crate::from_env()
            .region("us-east-1")
            .load()
            .await
            .unwrap_err();
        assert_eq!(&ErrorKind::CredentialsInvalid, err.kind());
    }

    #[tokio::test]
    async fn test_blank_secret_key() {
        let err = crate::from_env()
            .credentials("AKIDEXAMPLE", "  ")
            .region("us-east-1")
            .load()
            .await
            .unwrap_err();
        assert_eq!(&ErrorKind::CredentialsInvalid, err.kind());
    }

    #[tokio::test]
    async fn test_load_with_static_credentials() {
        let config = crate::from_env()
            .credentials("AKIDEXAMPLE", "wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY")
            .endpoint_url("http://localhost:9000")
            .region("us-east-1")
            .max_attempts(3)
            .load()
            .await
            .unwrap();
        assert_eq!(3, config.max_attempts());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let loader = crate::from_env()
            .credentials("AKIDEXAMPLE", "super-secret")
            .session_token("session-secret");
        let debug = format!("{loader:?}");
        assert!(debug.contains("AKIDEXAMPLE"));
        assert!(!debug.contains("super-secret"));
        assert!(!debug.contains("session-secret"));
    }
}
