/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::fmt;

use aws_sdk_s3::error::ProvideErrorMetadata;

use crate::types::AbortedUpload;

/// A boxed error that is `Send` and `Sync`.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors returned by this library
///
/// NOTE: Use [`aws_smithy_types::error::display::DisplayErrorContext`] or similar to display
/// the entire error cause/source chain.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    source: BoxError,
    abort_status: Option<AbortStatus>,
}

/// General categories of upload errors.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Operation input validation issues
    InputInvalid,

    /// Credentials were missing or rejected before any request was sent
    CredentialsInvalid,

    /// I/O errors
    IOError,

    /// Some kind of internal runtime issue (e.g. task failure, poisoned mutex, etc)
    RuntimeError,

    /// Resource not found (e.g. bucket, key, multipart upload ID not found)
    NotFound,

    /// The storage service rejected or failed a request
    ServiceError,

    /// The multipart upload could not be started
    SessionInitFailed,

    /// A single part exhausted its attempts
    PartFailed(PartFailed),

    /// Aborting the multipart upload failed
    AbortFailed,

    /// Every part was stored but completing the multipart upload failed
    CompletionFailed,
}

/// Stores information about a failed part
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PartFailed {
    part_number: u64,
    attempts: usize,
}

impl PartFailed {
    /// The 1-based part number that failed
    pub fn part_number(&self) -> u64 {
        self.part_number
    }

    /// Number of upload attempts made for the part before giving up
    pub fn attempts(&self) -> usize {
        self.attempts
    }
}

/// What happened to the remote multipart upload after a part failed.
#[derive(Debug)]
#[non_exhaustive]
pub enum AbortStatus {
    /// The multipart upload was aborted and any stored parts discarded
    Aborted(AbortedUpload),

    /// The abort request itself failed. The remote upload is left in an unknown state.
    Failed(Box<Error>),

    /// No abort was attempted because the upload is configured to retain parts
    /// (see [`FailedMultipartUploadPolicy::Retain`](crate::types::FailedMultipartUploadPolicy::Retain)).
    Retained {
        /// The upload ID of the retained multipart upload
        upload_id: String,
    },
}

impl AbortStatus {
    /// Returns true if an abort request was sent, whether or not it succeeded
    pub fn was_attempted(&self) -> bool {
        !matches!(self, AbortStatus::Retained { .. })
    }

    /// Returns true if the multipart upload was successfully aborted
    pub fn succeeded(&self) -> bool {
        matches!(self, AbortStatus::Aborted(_))
    }
}

impl Error {
    /// Creates a new [`Error`] from a known kind of error as well as an arbitrary error
    /// source.
    pub fn new<E>(kind: ErrorKind, err: E) -> Error
    where
        E: Into<BoxError>,
    {
        Error {
            kind,
            source: err.into(),
            abort_status: None,
        }
    }

    /// Returns the corresponding [`ErrorKind`] for this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Outcome of the compensating abort for a failed multipart upload.
    ///
    /// `None` when no multipart upload existed yet or the failure happened while completing it.
    pub fn abort_status(&self) -> Option<&AbortStatus> {
        self.abort_status.as_ref()
    }

    pub(crate) fn with_abort_status(mut self, status: AbortStatus) -> Self {
        self.abort_status = Some(status);
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::InputInvalid => write!(f, "invalid input"),
            ErrorKind::CredentialsInvalid => write!(f, "invalid credentials"),
            ErrorKind::IOError => write!(f, "I/O error"),
            ErrorKind::RuntimeError => write!(f, "runtime error"),
            ErrorKind::NotFound => write!(f, "resource not found"),
            ErrorKind::ServiceError => write!(f, "storage service error"),
            ErrorKind::SessionInitFailed => write!(f, "failed to create multipart upload"),
            ErrorKind::PartFailed(part) => write!(
                f,
                "failed to upload part #{} after {} attempt(s)",
                part.part_number, part.attempts
            ),
            ErrorKind::AbortFailed => write!(f, "failed to abort multipart upload"),
            ErrorKind::CompletionFailed => write!(f, "failed to complete multipart upload"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::new(ErrorKind::IOError, value)
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(value: tokio::task::JoinError) -> Self {
        Self::new(ErrorKind::RuntimeError, value)
    }
}

impl From<aws_smithy_types::error::operation::BuildError> for Error {
    fn from(value: aws_smithy_types::error::operation::BuildError) -> Self {
        Self::new(ErrorKind::InputInvalid, value)
    }
}

impl<E, R> From<aws_sdk_s3::error::SdkError<E, R>> for Error
where
    E: std::error::Error + ProvideErrorMetadata + Send + Sync + 'static,
    R: Send + Sync + fmt::Debug + 'static,
{
    fn from(value: aws_sdk_s3::error::SdkError<E, R>) -> Self {
        let kind = match value.code() {
            Some("NotFound" | "NoSuchKey" | "NoSuchUpload" | "NoSuchBucket") => ErrorKind::NotFound,
            _ => ErrorKind::ServiceError,
        };

        Error::new(kind, value)
    }
}

pub(crate) fn invalid_input<E>(err: E) -> Error
where
    E: Into<BoxError>,
{
    Error::new(ErrorKind::InputInvalid, err)
}

pub(crate) fn invalid_credentials<E>(err: E) -> Error
where
    E: Into<BoxError>,
{
    Error::new(ErrorKind::CredentialsInvalid, err)
}

pub(crate) fn part_failed<E>(part_number: u64, attempts: usize, err: E) -> Error
where
    E: Into<BoxError>,
{
    Error::new(
        ErrorKind::PartFailed(PartFailed {
            part_number,
            attempts,
        }),
        err,
    )
}

pub(crate) fn from_kind<E>(kind: ErrorKind) -> impl FnOnce(E) -> Error
where
    E: Into<BoxError>,
{
    |err| Error::new(kind, err)
}
