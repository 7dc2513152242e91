/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::time::Duration;

use aws_smithy_runtime::test_util::capture_test_logs::capture_test_logs;
use bytes::Bytes;
use s3_multipart_upload::error::{AbortStatus, Error, ErrorKind};
use s3_multipart_upload::io::InputStream;
use s3_multipart_upload::operation::upload::UploadOutput;
use s3_multipart_upload::types::{
    EmptyObjectPolicy, ETag, FailedMultipartUploadPolicy, RetryBackoff,
};
use s3_multipart_upload::{Client, Config};
use test_common::{create_test_file, patterned_bytes, Call, ScriptedStorage, UPLOAD_ID};

const MIB: usize = 1024 * 1024;

fn client(storage: &ScriptedStorage) -> Client {
    client_with(storage, |builder| builder)
}

fn client_with(
    storage: &ScriptedStorage,
    f: impl FnOnce(s3_multipart_upload::config::Builder) -> s3_multipart_upload::config::Builder,
) -> Client {
    let config = f(Config::builder().storage_client(storage.clone()))
        .build()
        .unwrap();
    Client::new(config)
}

async fn upload(client: &Client, body: InputStream) -> Result<UploadOutput, Error> {
    client
        .upload()
        .bucket("test-bucket")
        .key("multipartupload/test-key")
        .body(body)
        .send()
        .await?
        .join()
        .await
}

fn upload_part_calls(storage: &ScriptedStorage) -> Vec<(u64, usize)> {
    storage
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            Call::UploadPart {
                part_number,
                content_length,
                ..
            } => Some((part_number, content_length)),
            _ => None,
        })
        .collect()
}

fn completed_part_numbers(call: &Call) -> Vec<u64> {
    match call {
        Call::Complete { parts, .. } => parts.iter().map(|p| p.part_number()).collect(),
        call => panic!("expected complete call, got {call:?}"),
    }
}

fn expect_part_failed(err: &Error) -> (u64, usize) {
    match err.kind() {
        ErrorKind::PartFailed(part) => (part.part_number(), part.attempts()),
        kind => panic!("expected part failure, got {kind:?}"),
    }
}

#[tokio::test]
async fn test_all_parts_succeed_first_attempt() {
    let storage = ScriptedStorage::new();
    let tm = client(&storage);
    let data = patterned_bytes(12 * MIB);

    let output = upload(&tm, InputStream::from(data.clone())).await.unwrap();

    assert_eq!(
        vec![(1, 5 * MIB), (2, 5 * MIB), (3, 2 * MIB)],
        upload_part_calls(&storage)
    );
    let complete_calls = storage.complete_calls();
    assert_eq!(1, complete_calls.len());
    assert_eq!(vec![1, 2, 3], completed_part_numbers(&complete_calls[0]));
    assert!(storage.abort_calls().is_empty());

    assert_eq!(UPLOAD_ID, output.upload_id());
    assert_eq!("test-bucket", output.bucket());
    assert_eq!("multipartupload/test-key", output.key());
    assert_eq!(Some("final-etag-3"), output.e_tag());
    let e_tags = output
        .parts()
        .iter()
        .map(|p| p.e_tag().clone())
        .collect::<Vec<_>>();
    assert_eq!(
        vec![
            ETag::Value("etag-1".to_owned()),
            ETag::Value("etag-2".to_owned()),
            ETag::Value("etag-3".to_owned()),
        ],
        e_tags
    );
    assert_eq!(Bytes::from(data), storage.stored_object());
}

#[tokio::test]
async fn test_part_succeeds_on_last_attempt() {
    let storage = ScriptedStorage::new().fail_part(1, 9);
    let tm = client(&storage);

    let output = upload(&tm, InputStream::from(patterned_bytes(1024)))
        .await
        .unwrap();

    assert_eq!(10, storage.attempts(1));
    assert_eq!(vec![(1, 1024); 10], upload_part_calls(&storage));
    assert_eq!(1, output.parts().len());
    assert_eq!(1, storage.complete_calls().len());
    assert!(storage.abort_calls().is_empty());
}

#[tokio::test]
async fn test_attempts_stop_at_first_success() {
    let storage = ScriptedStorage::new().fail_part(2, 2);
    let tm = client_with(&storage, |b| b.max_attempts(5));

    upload(&tm, InputStream::from(patterned_bytes(11 * MIB)))
        .await
        .unwrap();

    assert_eq!(1, storage.attempts(1));
    assert_eq!(3, storage.attempts(2));
    assert_eq!(1, storage.attempts(3));
}

#[tokio::test]
async fn test_attempts_never_exceed_max_attempts() {
    let storage = ScriptedStorage::new().fail_part_always(1);
    let tm = client_with(&storage, |b| b.max_attempts(4));

    let err = upload(&tm, InputStream::from_static(b"hello world"))
        .await
        .unwrap_err();

    assert_eq!(4, storage.attempts(1));
    assert_eq!((1, 4), expect_part_failed(&err));
}

#[tokio::test]
async fn test_single_attempt_is_not_retried() {
    let storage = ScriptedStorage::new().fail_part(1, 1);
    let tm = client_with(&storage, |b| b.max_attempts(1));

    let err = upload(&tm, InputStream::from_static(b"hello world"))
        .await
        .unwrap_err();

    assert_eq!(1, storage.attempts(1));
    assert_eq!((1, 1), expect_part_failed(&err));
}

#[tokio::test]
async fn test_part_failure_aborts_upload() {
    let storage = ScriptedStorage::new().fail_part_always(2);
    let tm = client(&storage);

    let err = upload(&tm, InputStream::from(patterned_bytes(12 * MIB)))
        .await
        .unwrap_err();

    assert_eq!((2, 10), expect_part_failed(&err));
    assert_eq!(1, storage.attempts(1));
    assert_eq!(10, storage.attempts(2));
    assert_eq!(0, storage.attempts(3), "no parts are uploaded after a failure");
    assert_eq!(
        vec![Call::Abort {
            upload_id: UPLOAD_ID.to_owned()
        }],
        storage.abort_calls()
    );
    assert!(storage.complete_calls().is_empty());

    match err.abort_status() {
        Some(AbortStatus::Aborted(aborted)) => assert_eq!(UPLOAD_ID, aborted.upload_id()),
        status => panic!("expected aborted upload, got {status:?}"),
    }
    assert_eq!(Some(&Call::Abort { upload_id: UPLOAD_ID.to_owned() }), storage.calls().last());
}

#[tokio::test]
async fn test_abort_failure_is_reported_with_part_failure() {
    let storage = ScriptedStorage::new().fail_part_always(1).fail_abort();
    let tm = client_with(&storage, |b| b.max_attempts(2));

    let err = upload(&tm, InputStream::from_static(b"hello world"))
        .await
        .unwrap_err();

    assert_eq!((1, 2), expect_part_failed(&err));
    assert_eq!(1, storage.abort_calls().len(), "abort is not retried");
    assert!(storage.complete_calls().is_empty());

    let status = err.abort_status().expect("abort status set");
    assert!(status.was_attempted());
    assert!(!status.succeeded());
    match status {
        AbortStatus::Failed(abort_err) => assert_eq!(&ErrorKind::AbortFailed, abort_err.kind()),
        status => panic!("expected failed abort, got {status:?}"),
    }
}

#[tokio::test]
async fn test_retain_policy_skips_abort() {
    let storage = ScriptedStorage::new().fail_part_always(1);
    let tm = client_with(&storage, |b| {
        b.max_attempts(3)
            .failed_multipart_upload_policy(FailedMultipartUploadPolicy::Retain)
    });

    let err = upload(&tm, InputStream::from_static(b"hello world"))
        .await
        .unwrap_err();

    assert_eq!((1, 3), expect_part_failed(&err));
    assert!(storage.abort_calls().is_empty());
    assert!(storage.complete_calls().is_empty());
    match err.abort_status() {
        Some(AbortStatus::Retained { upload_id }) => assert_eq!(UPLOAD_ID, upload_id),
        status => panic!("expected retained upload, got {status:?}"),
    }
}

#[tokio::test]
async fn test_initiate_failure_does_not_abort() {
    let storage = ScriptedStorage::new().fail_initiate();
    let tm = client(&storage);

    let err = upload(&tm, InputStream::from_static(b"hello world"))
        .await
        .unwrap_err();

    assert_eq!(&ErrorKind::SessionInitFailed, err.kind());
    assert!(err.abort_status().is_none());
    assert_eq!(1, storage.initiate_calls());
    assert_eq!(1, storage.calls().len(), "nothing is sent after a failed initiate");
}

#[tokio::test]
async fn test_completion_failure_does_not_abort() {
    let storage = ScriptedStorage::new().fail_complete();
    let tm = client(&storage);

    let err = upload(&tm, InputStream::from(patterned_bytes(6 * MIB)))
        .await
        .unwrap_err();

    assert_eq!(&ErrorKind::CompletionFailed, err.kind());
    assert!(err.abort_status().is_none());
    assert_eq!(1, storage.complete_calls().len(), "completion is not retried");
    assert!(storage.abort_calls().is_empty());
}

#[tokio::test]
async fn test_complete_receives_parts_in_ascending_order() {
    let storage = ScriptedStorage::new().fail_part(2, 3).fail_part(4, 1);
    let tm = client(&storage);

    let output = upload(&tm, InputStream::from(patterned_bytes(16 * MIB)))
        .await
        .unwrap();

    let complete_calls = storage.complete_calls();
    assert_eq!(vec![1, 2, 3, 4], completed_part_numbers(&complete_calls[0]));
    assert_eq!(
        vec![1, 2, 3, 4],
        output
            .parts()
            .iter()
            .map(|p| p.part_number())
            .collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn test_empty_body_rejected_by_default() {
    let storage = ScriptedStorage::new();
    let tm = client(&storage);

    let err = upload(&tm, InputStream::from_static(b"")).await.unwrap_err();

    assert_eq!(&ErrorKind::InputInvalid, err.kind());
    assert!(storage.calls().is_empty());
}

#[tokio::test]
async fn test_empty_body_completed_with_no_parts() {
    let storage = ScriptedStorage::new();
    let tm = client_with(&storage, |b| {
        b.empty_object_policy(EmptyObjectPolicy::CompleteWithNoParts)
    });

    let output = upload(&tm, InputStream::from_static(b"")).await.unwrap();

    assert!(output.parts().is_empty());
    assert!(upload_part_calls(&storage).is_empty());
    let complete_calls = storage.complete_calls();
    assert_eq!(1, complete_calls.len());
    assert!(completed_part_numbers(&complete_calls[0]).is_empty());
}

#[tokio::test]
async fn test_missing_e_tag_uses_sentinel() {
    let (_guard, rx) = capture_test_logs();
    let storage = ScriptedStorage::new().omit_e_tags();
    let tm = client(&storage);

    let output = upload(&tm, InputStream::from_static(b"hello world"))
        .await
        .unwrap();

    assert_eq!(&ETag::Missing, output.parts()[0].e_tag());
    match &storage.complete_calls()[0] {
        Call::Complete { parts, .. } => assert!(parts[0].e_tag().is_missing()),
        call => panic!("expected complete call, got {call:?}"),
    }
    let logs = rx.contents();
    assert!(logs.contains("returned no ETag for part #1"), "{logs}");
    assert!(logs.contains("<missing>"), "{logs}");
}

#[tokio::test]
async fn test_content_type_forwarded_to_initiate() {
    let storage = ScriptedStorage::new();
    let tm = client(&storage);

    tm.upload()
        .bucket("test-bucket")
        .key("test-key")
        .content_type("text/plain")
        .body(InputStream::from_static(b"hello world"))
        .send()
        .await
        .unwrap()
        .join()
        .await
        .unwrap();

    assert_eq!(
        Call::Initiate {
            bucket: "test-bucket".to_owned(),
            key: "test-key".to_owned(),
            content_type: Some("text/plain".to_owned()),
        },
        storage.calls()[0]
    );
}

#[tokio::test]
async fn test_retry_with_backoff() {
    let storage = ScriptedStorage::new().fail_part(1, 3);
    let tm = client_with(&storage, |b| {
        b.retry_backoff(RetryBackoff::Exponential {
            base: Duration::from_millis(1),
            max: Duration::from_millis(5),
        })
    });

    upload(&tm, InputStream::from_static(b"hello world"))
        .await
        .unwrap();

    assert_eq!(4, storage.attempts(1));
}

#[tokio::test]
async fn test_upload_from_path_reads_parts_at_offsets() {
    let file = create_test_file(11 * MIB + 7);
    let storage = ScriptedStorage::new();
    let tm = client(&storage);

    let output = upload(&tm, InputStream::from_path(file.path()).unwrap())
        .await
        .unwrap();

    assert_eq!(3, output.parts().len());
    assert_eq!(
        vec![(1, 5 * MIB), (2, 5 * MIB), (3, MIB + 7)],
        upload_part_calls(&storage)
    );
    assert_eq!(
        Bytes::from(patterned_bytes(11 * MIB + 7)),
        storage.stored_object()
    );
}

#[tokio::test]
async fn test_upload_from_path_loaded_in_memory() {
    let file = create_test_file(6 * MIB);
    let storage = ScriptedStorage::new();
    let tm = client(&storage);

    let stream = InputStream::read_from_path(file.path()).await.unwrap();
    upload(&tm, stream).await.unwrap();

    assert_eq!(
        Bytes::from(patterned_bytes(6 * MIB)),
        storage.stored_object()
    );
}

#[tokio::test]
async fn test_read_failure_aborts_upload() {
    let file = create_test_file(6 * MIB);
    let storage = ScriptedStorage::new();
    let tm = client(&storage);

    let stream = InputStream::from_path(file.path()).unwrap();
    file.as_file().set_len(MIB as u64).unwrap();

    let err = upload(&tm, stream).await.unwrap_err();

    assert_eq!(&ErrorKind::IOError, err.kind());
    assert!(upload_part_calls(&storage).is_empty());
    assert_eq!(1, storage.abort_calls().len());
    assert!(matches!(err.abort_status(), Some(AbortStatus::Aborted(_))));
}
