/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::fmt;
use std::time::Duration;

/// The target part size for an upload request.
#[derive(Debug, Clone, Default)]
pub enum PartSize {
    /// Use the default part size of 5 MiB.
    #[default]
    Auto,

    /// Part size explicitly given.
    ///
    /// Every part except possibly the last one will be exactly this size.
    Target(u64),
}

/// Delay applied between attempts to upload the same part.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RetryBackoff {
    /// Retry immediately.
    #[default]
    None,

    /// Exponential backoff with full jitter.
    ///
    /// The delay before attempt `n + 1` is a random duration between zero and
    /// `min(max, base * 2^(n - 1))`.
    Exponential {
        /// Upper bound of the delay after the first failed attempt
        base: Duration,
        /// Upper bound of any single delay
        max: Duration,
    },
}

impl RetryBackoff {
    /// Delay to wait after `attempt` (1-based) failed, or `None` to retry immediately.
    pub(crate) fn delay(&self, attempt: usize) -> Option<Duration> {
        match self {
            RetryBackoff::None => None,
            RetryBackoff::Exponential { base, max } => {
                let exp = u32::try_from(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
                let ceiling = base
                    .checked_mul(2u32.saturating_pow(exp))
                    .map_or(*max, |d| d.min(*max));
                let jittered = ceiling.mul_f64(fastrand::f64());
                Some(jittered)
            }
        }
    }
}

/// How to handle an input that contains no bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EmptyObjectPolicy {
    /// Fail the upload with an [`InputInvalid`](crate::error::ErrorKind::InputInvalid) error
    /// before a multipart upload is created.
    #[default]
    Reject,

    /// Create the multipart upload and complete it with an empty list of parts.
    CompleteWithNoParts,
}

/// Policy for how to handle a failed multipart upload
///
/// Default is to abort the upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FailedMultipartUploadPolicy {
    /// Abort the upload on any individual part failure
    #[default]
    AbortUpload,
    /// Retain any uploaded parts. The upload ID will be available in the error.
    Retain,
}

/// Describes the result of aborting an in-progress upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbortedUpload {
    pub(crate) upload_id: String,
}

impl AbortedUpload {
    /// Get the multipart upload ID that was aborted
    pub fn upload_id(&self) -> &str {
        &self.upload_id
    }
}

/// Opaque integrity tag the storage service returns for each stored part.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ETag {
    /// Tag returned by the service
    Value(String),
    /// The service did not return a tag for the part
    Missing,
}

impl ETag {
    /// The tag value, if the service returned one
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ETag::Value(tag) => Some(tag),
            ETag::Missing => None,
        }
    }

    /// Returns true if the service did not return a tag
    pub fn is_missing(&self) -> bool {
        matches!(self, ETag::Missing)
    }
}

impl From<Option<String>> for ETag {
    fn from(value: Option<String>) -> Self {
        value.map_or(ETag::Missing, ETag::Value)
    }
}

impl fmt::Display for ETag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ETag::Value(tag) => f.write_str(tag),
            ETag::Missing => f.write_str("<missing>"),
        }
    }
}

/// Evidence that a single part was durably stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedPart {
    part_number: u64,
    e_tag: ETag,
}

impl CompletedPart {
    pub(crate) fn new(part_number: u64, e_tag: ETag) -> Self {
        Self { part_number, e_tag }
    }

    /// The 1-based part number
    pub fn part_number(&self) -> u64 {
        self.part_number
    }

    /// The integrity tag returned for the part
    pub fn e_tag(&self) -> &ETag {
        &self.e_tag
    }
}
