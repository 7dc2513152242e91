/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::fmt;

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::CompletedMultipartUpload;
use bytes::Bytes;

use crate::error::{self, ErrorKind};
use crate::types::CompletedPart;

/// Identifies one in-progress multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSession {
    bucket: String,
    key: String,
    upload_id: String,
}

impl UploadSession {
    /// Create a new session for the given upload ID
    pub fn new(
        bucket: impl Into<String>,
        key: impl Into<String>,
        upload_id: impl Into<String>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            upload_id: upload_id.into(),
        }
    }

    /// The bucket the object is being uploaded to
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// The key of the object being uploaded
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The opaque upload ID issued by the storage service
    pub fn upload_id(&self) -> &str {
        &self.upload_id
    }
}

/// Response from completing a multipart upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct CompletedUpload {
    /// Entity tag of the final object
    pub e_tag: Option<String>,
    /// URI that identifies the final object
    pub location: Option<String>,
    /// Version ID of the final object, if versioning is enabled on the bucket
    pub version_id: Option<String>,
}

impl CompletedUpload {
    /// Create a new `CompletedUpload` from the descriptor fields returned by the service
    pub fn new(
        e_tag: Option<String>,
        location: Option<String>,
        version_id: Option<String>,
    ) -> Self {
        Self {
            e_tag,
            location,
            version_id,
        }
    }
}

/// The object storage service operations required to carry out a multipart upload.
///
/// An implementation is provided for [`aws_sdk_s3::Client`]. Implementations report failures
/// as-is; retrying individual parts and aborting failed uploads is handled by the caller.
#[async_trait]
pub trait StorageClient: fmt::Debug + Send + Sync {
    /// Start a new multipart upload for `bucket`/`key`
    async fn initiate_upload(
        &self,
        bucket: &str,
        key: &str,
        content_type: Option<&str>,
    ) -> Result<UploadSession, error::Error>;

    /// Upload a single part, returning the integrity tag (ETag) if the service returned one
    async fn upload_part(
        &self,
        session: &UploadSession,
        part_number: u64,
        body: Bytes,
    ) -> Result<Option<String>, error::Error>;

    /// Complete the upload from the ordered list of parts
    async fn complete_upload(
        &self,
        session: &UploadSession,
        parts: &[CompletedPart],
    ) -> Result<CompletedUpload, error::Error>;

    /// Abort the upload and discard any stored parts
    async fn abort_upload(&self, session: &UploadSession) -> Result<(), error::Error>;
}

fn sdk_part_number(part_number: u64) -> Result<i32, error::Error> {
    i32::try_from(part_number).map_err(error::invalid_input)
}

#[async_trait]
impl StorageClient for aws_sdk_s3::Client {
    async fn initiate_upload(
        &self,
        bucket: &str,
        key: &str,
        content_type: Option<&str>,
    ) -> Result<UploadSession, error::Error> {
        let resp = self
            .create_multipart_upload()
            .bucket(bucket)
            .key(key)
            .set_content_type(content_type.map(str::to_owned))
            .send()
            .await?;

        let upload_id = resp.upload_id().ok_or_else(|| {
            error::Error::new(
                ErrorKind::ServiceError,
                "CreateMultipartUpload response did not include an upload ID",
            )
        })?;

        Ok(UploadSession::new(
            resp.bucket().unwrap_or(bucket),
            resp.key().unwrap_or(key),
            upload_id,
        ))
    }

    async fn upload_part(
        &self,
        session: &UploadSession,
        part_number: u64,
        body: Bytes,
    ) -> Result<Option<String>, error::Error> {
        let content_length = i64::try_from(body.len()).map_err(error::invalid_input)?;
        let resp = self
            .upload_part()
            .bucket(session.bucket())
            .key(session.key())
            .upload_id(session.upload_id())
            .part_number(sdk_part_number(part_number)?)
            .content_length(content_length)
            .body(ByteStream::from(body))
            .send()
            .await?;

        Ok(resp.e_tag)
    }

    async fn complete_upload(
        &self,
        session: &UploadSession,
        parts: &[CompletedPart],
    ) -> Result<CompletedUpload, error::Error> {
        let parts = parts
            .iter()
            .map(|part| -> Result<_, error::Error> {
                Ok(aws_sdk_s3::types::CompletedPart::builder()
                    .part_number(sdk_part_number(part.part_number())?)
                    .set_e_tag(part.e_tag().as_str().map(str::to_owned))
                    .build())
            })
            .collect::<Result<Vec<_>, error::Error>>()?;

        let resp = self
            .complete_multipart_upload()
            .bucket(session.bucket())
            .key(session.key())
            .upload_id(session.upload_id())
            .multipart_upload(
                CompletedMultipartUpload::builder()
                    .set_parts(Some(parts))
                    .build(),
            )
            .send()
            .await?;

        Ok(CompletedUpload::new(
            resp.e_tag,
            resp.location,
            resp.version_id,
        ))
    }

    async fn abort_upload(&self, session: &UploadSession) -> Result<(), error::Error> {
        self.abort_multipart_upload()
            .bucket(session.bucket())
            .key(session.key())
            .upload_id(session.upload_id())
            .send()
            .await?;
        Ok(())
    }
}
