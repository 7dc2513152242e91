/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use tokio::task::JoinHandle;

use crate::operation::upload::UploadOutput;

/// Response type for a single upload object request.
///
/// The upload runs in the background as soon as it is started. Call [`Self::join`] to wait for
/// it to finish and get the outcome.
///
/// # Cancellation
///
/// Cancellation is not supported. Dropping the handle detaches the upload, which still runs to
/// completion (or failure) in the background. If the process exits mid-upload the multipart
/// upload and any parts already stored are left behind and must be cleaned up out of band
/// (e.g. with a bucket lifecycle rule for incomplete multipart uploads).
#[derive(Debug)]
#[non_exhaustive]
pub struct UploadHandle {
    task: JoinHandle<Result<UploadOutput, crate::error::Error>>,
}

impl UploadHandle {
    pub(crate) fn new(task: JoinHandle<Result<UploadOutput, crate::error::Error>>) -> Self {
        Self { task }
    }

    /// Consume the handle and wait for upload to complete
    #[tracing::instrument(skip_all, level = "debug", name = "join-upload")]
    pub async fn join(self) -> Result<UploadOutput, crate::error::Error> {
        self.task.await?
    }
}
