/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use aws_smithy_types::error::operation::BuildError;

use crate::io::InputStream;

/// Input type for uploading a single object
#[non_exhaustive]
#[derive(Debug)]
pub struct UploadInput {
    /// Body to upload
    pub body: InputStream,

    /// The bucket name to which the upload is initiated
    pub bucket: String,

    /// Object key for which the multipart upload is to be initiated
    pub key: String,

    /// A standard MIME type describing the format of the object data
    pub content_type: Option<String>,
}

impl UploadInput {
    /// Creates a new builder-style object to manufacture [`UploadInput`].
    pub fn builder() -> UploadInputBuilder {
        UploadInputBuilder::default()
    }

    /// Take the body, leaving an empty stream in its place
    pub(crate) fn take_body(&mut self) -> InputStream {
        std::mem::take(&mut self.body)
    }

    /// The bucket name to which the upload is initiated
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Object key for which the multipart upload is to be initiated
    pub fn key(&self) -> &str {
        &self.key
    }

    /// A standard MIME type describing the format of the object data
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }
}

/// A builder for [`UploadInput`].
#[non_exhaustive]
#[derive(Debug, Default)]
pub struct UploadInputBuilder {
    pub(crate) body: Option<InputStream>,
    pub(crate) bucket: Option<String>,
    pub(crate) key: Option<String>,
    pub(crate) content_type: Option<String>,
}

impl UploadInputBuilder {
    /// Body to upload
    pub fn body(mut self, input: InputStream) -> Self {
        self.body = Some(input);
        self
    }

    /// The bucket name to which the upload is initiated
    ///
    /// This field is required.
    pub fn bucket(mut self, input: impl Into<String>) -> Self {
        self.bucket = Some(input.into());
        self
    }

    /// Object key for which the multipart upload is to be initiated
    ///
    /// This field is required.
    pub fn key(mut self, input: impl Into<String>) -> Self {
        self.key = Some(input.into());
        self
    }

    /// A standard MIME type describing the format of the object data
    pub fn content_type(mut self, input: impl Into<String>) -> Self {
        self.content_type = Some(input.into());
        self
    }

    /// A standard MIME type describing the format of the object data
    pub fn set_content_type(mut self, input: Option<String>) -> Self {
        self.content_type = input;
        self
    }

    /// Consumes the builder and constructs a [`UploadInput`]
    pub fn build(self) -> Result<UploadInput, BuildError> {
        let bucket = self
            .bucket
            .filter(|bucket| !bucket.is_empty())
            .ok_or_else(|| BuildError::missing_field("bucket", "a bucket is required"))?;
        let key = self
            .key
            .filter(|key| !key.is_empty())
            .ok_or_else(|| BuildError::missing_field("key", "an object key is required"))?;

        Ok(UploadInput {
            body: self.body.unwrap_or_default(),
            bucket,
            key,
            content_type: self.content_type,
        })
    }
}
