/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use aws_smithy_types::error::display::DisplayErrorContext;
use futures_util::future::{self, Either};

use crate::error;
use crate::operation::upload::service::UploadPartRequest;
use crate::types::{CompletedPart, RetryBackoff};

/// A `tower::retry::Policy` that retries a single part upload until it succeeds or the
/// attempts are exhausted.
///
/// Every error is retried. Each `Retry` future works on its own clone of the policy so the
/// attempt count is tracked per part.
#[derive(Debug, Clone)]
pub(crate) struct PartRetryPolicy {
    max_attempts: usize,
    // 1-based attempt currently in flight
    attempt: usize,
    backoff: RetryBackoff,
}

impl PartRetryPolicy {
    pub(crate) fn new(max_attempts: usize, backoff: RetryBackoff) -> Self {
        Self {
            max_attempts,
            attempt: 1,
            backoff,
        }
    }
}

impl tower::retry::Policy<UploadPartRequest, CompletedPart, error::Error> for PartRetryPolicy {
    type Future = Either<future::Ready<()>, tokio::time::Sleep>;

    fn retry(
        &mut self,
        req: &mut UploadPartRequest,
        result: &mut Result<CompletedPart, error::Error>,
    ) -> Option<Self::Future> {
        let err = match result {
            Ok(_) => return None,
            Err(err) => err,
        };

        let part_number = req.part.part_number();
        if self.attempt >= self.max_attempts {
            tracing::error!(
                part_number,
                attempt = self.attempt,
                "upload of part #{part_number} failed, no attempts remaining: {}",
                DisplayErrorContext(&*err)
            );
            return None;
        }

        tracing::warn!(
            part_number,
            attempt = self.attempt,
            "retrying upload of part #{part_number}: {}",
            DisplayErrorContext(&*err)
        );
        let delay = self.backoff.delay(self.attempt);
        self.attempt += 1;
        match delay {
            Some(delay) => Some(Either::Right(tokio::time::sleep(delay))),
            None => Some(Either::Left(future::ready(()))),
        }
    }

    fn clone_request(&mut self, req: &UploadPartRequest) -> Option<UploadPartRequest> {
        Some(req.clone())
    }
}
