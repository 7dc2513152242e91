/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::path::{Path, PathBuf};

use bytes::Bytes;

use crate::error;

/// Source of binary data.
///
/// The content length of an `InputStream` is always known up front, which is what allows the
/// upload to be planned as a fixed sequence of parts before any part is sent.
#[derive(Debug)]
pub struct InputStream {
    pub(super) inner: RawInputStream,
}

impl InputStream {
    /// Create a new `InputStream` from a static byte slice
    pub fn from_static(bytes: &'static [u8]) -> Self {
        let inner = RawInputStream::Buf(bytes.into());
        Self { inner }
    }

    /// Create a new `InputStream` that reads each part directly from the file at `path`.
    ///
    /// Only a single part is held in memory at a time.
    ///
    /// ## Warning
    /// The contents of the file MUST not change. The length of the file is captured when the
    /// stream is created and every part is read at its offset when it is uploaded.
    ///
    /// # Examples
    /// ```no_run
    /// use s3_multipart_upload::io::InputStream;
    ///
    /// fn make_stream() -> InputStream {
    ///     InputStream::from_path("docs/rows.csv").expect("file should be readable")
    /// }
    /// ```
    pub fn from_path(path: impl AsRef<Path>) -> Result<InputStream, error::Error> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(error::invalid_input(format!(
                "{} is not a regular file",
                path.display()
            )));
        }

        let inner = RawInputStream::Fs(PathBody {
            path: path.to_path_buf(),
            length: metadata.len(),
        });
        Ok(Self { inner })
    }

    /// Create a new `InputStream` by reading the entire file at `path` into memory.
    pub async fn read_from_path(path: impl AsRef<Path>) -> Result<InputStream, error::Error> {
        let data = tokio::fs::read(path).await?;
        Ok(Self::from(data))
    }

    /// Total number of bytes in the stream
    pub fn content_length(&self) -> u64 {
        match &self.inner {
            RawInputStream::Buf(buf) => buf.len() as u64,
            RawInputStream::Fs(path_body) => path_body.length,
        }
    }
}

#[derive(Debug)]
pub(super) enum RawInputStream {
    /// In-memory buffer to read from
    Buf(Bytes),
    /// File based input
    Fs(PathBody),
}

/// A file on disk along with the length captured when the stream was created
#[derive(Debug)]
pub(super) struct PathBody {
    pub(super) path: PathBuf,
    pub(super) length: u64,
}

impl Default for InputStream {
    fn default() -> Self {
        Self {
            inner: RawInputStream::Buf(Bytes::new()),
        }
    }
}

impl From<Bytes> for InputStream {
    fn from(value: Bytes) -> Self {
        Self {
            inner: RawInputStream::Buf(value),
        }
    }
}

impl From<Vec<u8>> for InputStream {
    fn from(value: Vec<u8>) -> Self {
        Self::from(Bytes::from(value))
    }
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use bytes::Bytes;
    use tempfile::NamedTempFile;

    use super::InputStream;
    use crate::error::ErrorKind;

    #[test]
    fn test_content_length_from_bytes() {
        assert_eq!(0, InputStream::default().content_length());
        assert_eq!(5, InputStream::from_static(b"hello").content_length());
        assert_eq!(3, InputStream::from(Bytes::from_static(b"abc")).content_length());
        assert_eq!(4, InputStream::from(vec![0u8; 4]).content_length());
    }

    #[tokio::test]
    async fn test_content_length_from_path() {
        let mut tmp = NamedTempFile::new().unwrap();
        tmp.write_all(b"a lep is a ball").unwrap();

        let stream = InputStream::from_path(tmp.path()).unwrap();
        assert_eq!(15, stream.content_length());

        let stream = InputStream::read_from_path(tmp.path()).await.unwrap();
        assert_eq!(15, stream.content_length());
    }

    #[test]
    fn test_from_path_rejects_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = InputStream::from_path(dir.path()).unwrap_err();
        assert_eq!(&ErrorKind::InputInvalid, err.kind());
    }

    #[test]
    fn test_from_path_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = InputStream::from_path(dir.path().join("does-not-exist")).unwrap_err();
        assert_eq!(&ErrorKind::IOError, err.kind());
    }
}
