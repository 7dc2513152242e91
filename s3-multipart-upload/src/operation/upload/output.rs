/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::storage::{CompletedUpload, UploadSession};
use crate::types::CompletedPart;

/// Common response fields for a completed multipart upload
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub struct UploadOutput {
    /// The bucket the object was uploaded to
    pub bucket: String,

    /// The key of the uploaded object
    pub key: String,

    /// ID of the multipart upload that created the object
    pub upload_id: String,

    /// Entity tag of the final object
    pub e_tag: Option<String>,

    /// URI that identifies the final object
    pub location: Option<String>,

    /// Version ID of the object, if versioning is enabled on the bucket
    pub version_id: Option<String>,

    /// Parts the object was assembled from, in ascending part number order
    pub parts: Vec<CompletedPart>,
}

impl UploadOutput {
    pub(crate) fn new(
        session: &UploadSession,
        completed: CompletedUpload,
        parts: Vec<CompletedPart>,
    ) -> Self {
        Self {
            bucket: session.bucket().to_owned(),
            key: session.key().to_owned(),
            upload_id: session.upload_id().to_owned(),
            e_tag: completed.e_tag,
            location: completed.location,
            version_id: completed.version_id,
            parts,
        }
    }

    /// The bucket the object was uploaded to
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// The key of the uploaded object
    pub fn key(&self) -> &str {
        &self.key
    }

    /// ID of the multipart upload that created the object
    pub fn upload_id(&self) -> &str {
        &self.upload_id
    }

    /// Entity tag of the final object
    pub fn e_tag(&self) -> Option<&str> {
        self.e_tag.as_deref()
    }

    /// URI that identifies the final object
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Version ID of the object
    pub fn version_id(&self) -> Option<&str> {
        self.version_id.as_deref()
    }

    /// Parts the object was assembled from
    pub fn parts(&self) -> &[CompletedPart] {
        &self.parts
    }
}
