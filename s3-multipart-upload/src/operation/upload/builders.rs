/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::sync::Arc;

use crate::error;
use crate::io::InputStream;

use super::{UploadHandle, UploadInputBuilder};

/// Fluent builder for constructing a single object upload transfer
#[derive(Debug)]
pub struct UploadFluentBuilder {
    handle: Arc<crate::client::Handle>,
    inner: UploadInputBuilder,
}

impl UploadFluentBuilder {
    pub(crate) fn new(handle: Arc<crate::client::Handle>) -> Self {
        Self {
            handle,
            inner: ::std::default::Default::default(),
        }
    }

    /// Initiate an upload transfer for a single object.
    ///
    /// The input is validated before anything is sent. The returned handle drives the upload
    /// to completion, see [`UploadHandle::join`].
    pub async fn send(self) -> Result<UploadHandle, error::Error> {
        let input = self.inner.build()?;
        crate::operation::upload::Upload::orchestrate(self.handle, input).await
    }

    /// Body to upload
    pub fn body(mut self, input: InputStream) -> Self {
        self.inner = self.inner.body(input);
        self
    }

    /// The bucket name to which the upload is initiated
    ///
    /// This field is required.
    pub fn bucket(mut self, input: impl Into<String>) -> Self {
        self.inner = self.inner.bucket(input);
        self
    }

    /// Object key for which the multipart upload is to be initiated
    ///
    /// This field is required.
    pub fn key(mut self, input: impl Into<String>) -> Self {
        self.inner = self.inner.key(input);
        self
    }

    /// A standard MIME type describing the format of the object data
    pub fn content_type(mut self, input: impl Into<String>) -> Self {
        self.inner = self.inner.content_type(input);
        self
    }

    /// A standard MIME type describing the format of the object data
    pub fn set_content_type(mut self, input: Option<String>) -> Self {
        self.inner = self.inner.set_content_type(input);
        self
    }
}

impl crate::operation::upload::input::UploadInputBuilder {
    /// Initiate an upload transfer for a single object with this input using the given client.
    pub async fn send_with(self, client: &crate::Client) -> Result<UploadHandle, error::Error> {
        let mut fluent_builder = client.upload();
        fluent_builder.inner = self;
        fluent_builder.send().await
    }
}
