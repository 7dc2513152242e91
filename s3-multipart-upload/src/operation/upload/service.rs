/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::sync::Arc;

use bytes::Bytes;
use tower::{service_fn, Service, ServiceBuilder, ServiceExt};
use tracing::Instrument;

use crate::error;
use crate::io::PartRange;
use crate::middleware::retry::PartRetryPolicy;
use crate::operation::upload::context::UploadContext;
use crate::storage::UploadSession;
use crate::types::{CompletedPart, ETag};

/// Request/input type for our "upload_part" service.
#[derive(Debug, Clone)]
pub(crate) struct UploadPartRequest {
    pub(crate) ctx: UploadContext,
    pub(crate) session: Arc<UploadSession>,
    pub(crate) part: PartRange,
    pub(crate) data: Bytes,
}

/// handler (service fn) for a single attempt at uploading a part
async fn upload_part_handler(request: UploadPartRequest) -> Result<CompletedPart, error::Error> {
    let part_number = request.part.part_number();

    let e_tag = request
        .ctx
        .storage()
        .upload_part(&request.session, part_number, request.data)
        .instrument(tracing::debug_span!("send-upload-part", part_number))
        .await?;

    let e_tag = ETag::from(e_tag);
    if e_tag.is_missing() {
        tracing::warn!(part_number, "storage service returned no ETag for part #{part_number}");
    }
    tracing::info!("uploaded part #{part_number}, ETag: {e_tag}");

    Ok(CompletedPart::new(part_number, e_tag))
}

/// Create a new tower::Service for uploading individual parts, retrying each part up to the
/// configured number of attempts
pub(super) fn upload_part_service(
    ctx: &UploadContext,
) -> impl Service<UploadPartRequest, Response = CompletedPart, Error = error::Error, Future: Send>
       + Clone
       + Send {
    let policy = PartRetryPolicy::new(
        ctx.handle.max_attempts(),
        ctx.handle.config.retry_backoff().clone(),
    );
    let svc = service_fn(upload_part_handler);
    ServiceBuilder::new().retry(policy).service(svc)
}

/// Upload a single part, blocking until it is stored or every attempt has failed.
pub(super) async fn upload_part<S>(
    svc: &S,
    request: UploadPartRequest,
) -> Result<CompletedPart, error::Error>
where
    S: Service<UploadPartRequest, Response = CompletedPart, Error = error::Error> + Clone,
{
    let part_number = request.part.part_number();
    let max_attempts = request.ctx.handle.max_attempts();
    svc.clone()
        .oneshot(request)
        .await
        .map_err(|err| error::part_failed(part_number, max_attempts, err))
}
