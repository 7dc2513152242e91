/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

/// Operation builders
pub mod builders;
mod input;
mod output;

mod context;
mod handle;
pub(crate) mod service;

use crate::error::{self, AbortStatus, ErrorKind};
use crate::io::part_reader::PartReader;
use crate::io::PartPlanner;
use crate::storage::UploadSession;
use crate::types::{AbortedUpload, CompletedPart, EmptyObjectPolicy, FailedMultipartUploadPolicy};
use aws_smithy_types::error::display::DisplayErrorContext;
use context::UploadContext;
pub use handle::UploadHandle;
/// Request type for uploads
pub use input::{UploadInput, UploadInputBuilder};
/// Response type for uploads
pub use output::UploadOutput;
use service::{upload_part, upload_part_service, UploadPartRequest};
use tracing::Instrument;

use std::sync::Arc;

/// Maximum number of parts that a single S3 multipart upload supports
const MAX_PARTS: u64 = 10_000;

/// Operation struct for single object upload
#[derive(Clone, Default, Debug)]
pub(crate) struct Upload;

impl Upload {
    /// Validate the request, plan the parts and start driving the multipart upload.
    ///
    /// Nothing is sent to the storage service if validation fails.
    pub(crate) async fn orchestrate(
        handle: Arc<crate::client::Handle>,
        mut input: UploadInput,
    ) -> Result<UploadHandle, error::Error> {
        let part_size = handle
            .upload_part_size_bytes()
            .ok_or_else(|| error::invalid_input("part size must be greater than 0"))?;

        let reader = PartReader::new(input.take_body());
        let planner = PartPlanner::new(reader.content_length(), part_size);

        if planner.num_parts() > MAX_PARTS {
            return Err(error::invalid_input(format!(
                "content length {} with part size {} requires {} parts which exceeds the maximum of {MAX_PARTS}",
                planner.content_length(),
                planner.part_size(),
                planner.num_parts(),
            )));
        }

        if planner.content_length() == 0 {
            match handle.config.empty_object_policy() {
                EmptyObjectPolicy::Reject => {
                    return Err(error::invalid_input(
                        "upload body is empty; set EmptyObjectPolicy::CompleteWithNoParts to allow empty uploads",
                    ));
                }
                EmptyObjectPolicy::CompleteWithNoParts => {
                    tracing::debug!("upload body is empty, multipart upload will be completed with no parts");
                }
            }
        }

        let ctx = new_context(handle, input);
        let span = tracing::debug_span!(
            "multipart-upload",
            bucket = ctx.request().bucket(),
            key = ctx.request().key(),
        );
        let task = tokio::spawn(run_multipart_upload(ctx, reader, planner).instrument(span));
        Ok(UploadHandle::new(task))
    }
}

fn new_context(handle: Arc<crate::client::Handle>, req: UploadInput) -> UploadContext {
    UploadContext {
        handle,
        request: Arc::new(req),
    }
}

/// Drive a multipart upload from start to a terminal state.
///
/// create -> upload parts -> complete, or create -> upload parts (failure) -> abort
async fn run_multipart_upload(
    ctx: UploadContext,
    reader: PartReader,
    planner: PartPlanner,
) -> Result<UploadOutput, error::Error> {
    tracing::trace!(
        "uploading {} bytes as {} part(s) of up to {} bytes",
        planner.content_length(),
        planner.num_parts(),
        planner.part_size()
    );

    let session = Arc::new(start_mpu(&ctx).await?);
    tracing::info!(
        upload_id = session.upload_id(),
        "created multipart upload request"
    );

    let parts = match upload_parts(&ctx, &session, &reader, &planner).await {
        Ok(parts) => parts,
        Err(err) => return Err(handle_failed_upload(&ctx, &session, err).await),
    };

    complete_upload(&ctx, &session, parts).await
}

/// start a new multipart upload by invoking `CreateMultipartUpload`
async fn start_mpu(ctx: &UploadContext) -> Result<UploadSession, error::Error> {
    let req = ctx.request();
    ctx.storage()
        .initiate_upload(req.bucket(), req.key(), req.content_type())
        .instrument(tracing::debug_span!("initiate-multipart-upload"))
        .await
        .map_err(|err| {
            tracing::error!("failed to create multipart upload: {}", DisplayErrorContext(&err));
            error::Error::new(ErrorKind::SessionInitFailed, err)
        })
}

/// Upload every planned part, one at a time and in order.
///
/// Returns the completed parts in ascending part number order or the first part failure.
async fn upload_parts(
    ctx: &UploadContext,
    session: &Arc<UploadSession>,
    reader: &PartReader,
    planner: &PartPlanner,
) -> Result<Vec<CompletedPart>, error::Error> {
    let svc = upload_part_service(ctx);
    let mut remaining = planner.content_length();
    let mut completed_parts = Vec::with_capacity(planner.num_parts() as usize);

    for part in planner.ranges() {
        let data = reader.read_part(&part).await?;
        let req = UploadPartRequest {
            ctx: ctx.clone(),
            session: session.clone(),
            part,
            data,
        };
        let completed_part = upload_part(&svc, req)
            .instrument(tracing::debug_span!("upload-part", part_number = part.part_number()))
            .await?;

        remaining -= part.length();
        tracing::trace!(
            "part #{} stored, {remaining} bytes remaining",
            part.part_number()
        );
        completed_parts.push(completed_part);
    }

    Ok(completed_parts)
}

/// Apply the failed upload policy after a part could not be uploaded.
///
/// The returned error is `err` annotated with the outcome of the abort.
async fn handle_failed_upload(
    ctx: &UploadContext,
    session: &UploadSession,
    err: error::Error,
) -> error::Error {
    match ctx.handle.config.failed_multipart_upload_policy() {
        FailedMultipartUploadPolicy::AbortUpload => {
            tracing::error!(
                "multipart upload failed, aborting: {}",
                DisplayErrorContext(&err)
            );
            match abort_upload(ctx, session).await {
                Ok(aborted) => err.with_abort_status(AbortStatus::Aborted(aborted)),
                Err(abort_err) => {
                    tracing::error!(
                        "failed to abort upload: {}",
                        DisplayErrorContext(&abort_err)
                    );
                    err.with_abort_status(AbortStatus::Failed(Box::new(abort_err)))
                }
            }
        }
        FailedMultipartUploadPolicy::Retain => {
            tracing::error!(
                upload_id = session.upload_id(),
                "multipart upload failed, retaining uploaded parts: {}",
                DisplayErrorContext(&err)
            );
            err.with_abort_status(AbortStatus::Retained {
                upload_id: session.upload_id().to_owned(),
            })
        }
    }
}

async fn abort_upload(
    ctx: &UploadContext,
    session: &UploadSession,
) -> Result<AbortedUpload, error::Error> {
    tracing::info!("aborting multipart upload for upload ID {}", session.upload_id());
    ctx.storage()
        .abort_upload(session)
        .instrument(tracing::debug_span!("abort-multipart-upload"))
        .await
        .map_err(error::from_kind(ErrorKind::AbortFailed))?;

    Ok(AbortedUpload {
        upload_id: session.upload_id().to_owned(),
    })
}

/// Complete the upload with the ordered parts.
///
/// A failure here is reported as-is; the multipart upload is not aborted.
async fn complete_upload(
    ctx: &UploadContext,
    session: &UploadSession,
    parts: Vec<CompletedPart>,
) -> Result<UploadOutput, error::Error> {
    tracing::trace!("completing multipart upload");

    let completed = ctx
        .storage()
        .complete_upload(session, &parts)
        .instrument(tracing::debug_span!("complete-multipart-upload"))
        .await
        .map_err(|err| {
            tracing::error!(
                upload_id = session.upload_id(),
                "failed to complete multipart upload: {}",
                DisplayErrorContext(&err)
            );
            error::Error::new(ErrorKind::CompletionFailed, err)
        })?;

    tracing::trace!("upload completed successfully");
    Ok(UploadOutput::new(session, completed, parts))
}
