/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use s3_multipart_upload::error::{Error, ErrorKind};
use s3_multipart_upload::storage::{CompletedUpload, StorageClient, UploadSession};
use s3_multipart_upload::types::CompletedPart;
use tempfile::NamedTempFile;

/// Upload ID issued by [`ScriptedStorage`] for every multipart upload
pub const UPLOAD_ID: &str = "test-upload-id";

/// A storage service call recorded by [`ScriptedStorage`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Initiate {
        bucket: String,
        key: String,
        content_type: Option<String>,
    },
    UploadPart {
        upload_id: String,
        part_number: u64,
        content_length: usize,
    },
    Complete {
        upload_id: String,
        parts: Vec<CompletedPart>,
    },
    Abort {
        upload_id: String,
    },
}

#[derive(Debug, Default)]
struct State {
    calls: Vec<Call>,
    bodies: HashMap<u64, Bytes>,
    // part number -> number of leading attempts that fail
    part_failures: HashMap<u64, usize>,
    attempts: HashMap<u64, usize>,
    fail_initiate: bool,
    fail_complete: bool,
    fail_abort: bool,
    omit_e_tags: bool,
}

/// In-memory [`StorageClient`] with scripted failures that records every call it receives.
///
/// Clones share state, keep one clone to inspect the calls made through the other.
#[derive(Debug, Clone, Default)]
pub struct ScriptedStorage {
    state: Arc<Mutex<State>>,
}

fn injected(what: &str) -> Error {
    Error::new(ErrorKind::ServiceError, format!("injected {what} failure"))
}

impl ScriptedStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the first `times` attempts to upload `part_number`
    pub fn fail_part(self, part_number: u64, times: usize) -> Self {
        self.state
            .lock()
            .unwrap()
            .part_failures
            .insert(part_number, times);
        self
    }

    /// Fail every attempt to upload `part_number`
    pub fn fail_part_always(self, part_number: u64) -> Self {
        self.fail_part(part_number, usize::MAX)
    }

    pub fn fail_initiate(self) -> Self {
        self.state.lock().unwrap().fail_initiate = true;
        self
    }

    pub fn fail_complete(self) -> Self {
        self.state.lock().unwrap().fail_complete = true;
        self
    }

    pub fn fail_abort(self) -> Self {
        self.state.lock().unwrap().fail_abort = true;
        self
    }

    /// Respond to part uploads without an ETag
    pub fn omit_e_tags(self) -> Self {
        self.state.lock().unwrap().omit_e_tags = true;
        self
    }

    /// All calls received so far, in order
    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Number of upload attempts made for `part_number`
    pub fn attempts(&self, part_number: u64) -> usize {
        self.state
            .lock()
            .unwrap()
            .attempts
            .get(&part_number)
            .copied()
            .unwrap_or_default()
    }

    /// Number of upload attempts made across all parts
    pub fn total_attempts(&self) -> usize {
        self.state.lock().unwrap().attempts.values().sum()
    }

    pub fn initiate_calls(&self) -> usize {
        self.count(|call| matches!(call, Call::Initiate { .. }))
    }

    pub fn abort_calls(&self) -> Vec<Call> {
        self.filter(|call| matches!(call, Call::Abort { .. }))
    }

    pub fn complete_calls(&self) -> Vec<Call> {
        self.filter(|call| matches!(call, Call::Complete { .. }))
    }

    /// The bytes stored for each part, concatenated in part number order
    pub fn stored_object(&self) -> Bytes {
        let state = self.state.lock().unwrap();
        let mut part_numbers = state.bodies.keys().copied().collect::<Vec<_>>();
        part_numbers.sort_unstable();
        let mut object = Vec::new();
        for part_number in part_numbers {
            object.extend_from_slice(&state.bodies[&part_number]);
        }
        object.into()
    }

    fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|call| predicate(call))
            .count()
    }

    fn filter(&self, predicate: impl Fn(&Call) -> bool) -> Vec<Call> {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|call| predicate(call))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl StorageClient for ScriptedStorage {
    async fn initiate_upload(
        &self,
        bucket: &str,
        key: &str,
        content_type: Option<&str>,
    ) -> Result<UploadSession, Error> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Initiate {
            bucket: bucket.to_owned(),
            key: key.to_owned(),
            content_type: content_type.map(str::to_owned),
        });
        if state.fail_initiate {
            return Err(injected("initiate"));
        }
        Ok(UploadSession::new(bucket, key, UPLOAD_ID))
    }

    async fn upload_part(
        &self,
        session: &UploadSession,
        part_number: u64,
        body: Bytes,
    ) -> Result<Option<String>, Error> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::UploadPart {
            upload_id: session.upload_id().to_owned(),
            part_number,
            content_length: body.len(),
        });

        let attempt = {
            let attempts = state.attempts.entry(part_number).or_default();
            *attempts += 1;
            *attempts
        };
        let failures = state
            .part_failures
            .get(&part_number)
            .copied()
            .unwrap_or_default();
        if attempt <= failures {
            return Err(injected(&format!("part #{part_number} attempt {attempt}")));
        }

        state.bodies.insert(part_number, body);
        if state.omit_e_tags {
            Ok(None)
        } else {
            Ok(Some(format!("etag-{part_number}")))
        }
    }

    async fn complete_upload(
        &self,
        session: &UploadSession,
        parts: &[CompletedPart],
    ) -> Result<CompletedUpload, Error> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Complete {
            upload_id: session.upload_id().to_owned(),
            parts: parts.to_vec(),
        });
        if state.fail_complete {
            return Err(injected("complete"));
        }
        Ok(CompletedUpload::new(
            Some(format!("final-etag-{}", parts.len())),
            Some(format!("/{}/{}", session.bucket(), session.key())),
            None,
        ))
    }

    async fn abort_upload(&self, session: &UploadSession) -> Result<(), Error> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Abort {
            upload_id: session.upload_id().to_owned(),
        });
        if state.fail_abort {
            return Err(injected("abort"));
        }
        state.bodies.clear();
        Ok(())
    }
}

/// Create a temporary file with `size` bytes of patterned content
pub fn create_test_file(size: usize) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&patterned_bytes(size)).unwrap();
    file.flush().unwrap();
    file
}

/// `size` bytes where every byte is a function of its offset
pub fn patterned_bytes(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 251) as u8).collect()
}
