/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */
use std::path::PathBuf;

use bytes::{Bytes, BytesMut};

use crate::error;
use crate::io::part_planner::PartRange;
use crate::io::stream::RawInputStream;
use crate::io::InputStream;

/// Produces the bytes of a single [`PartRange`] from an [`InputStream`].
#[derive(Debug)]
pub(crate) struct PartReader {
    inner: Inner,
    content_length: u64,
}

#[derive(Debug)]
enum Inner {
    Bytes(Bytes),
    Fs(PathBuf),
}

impl PartReader {
    pub(crate) fn new(stream: InputStream) -> Self {
        let content_length = stream.content_length();
        let inner = match stream.inner {
            RawInputStream::Buf(buf) => Inner::Bytes(buf),
            RawInputStream::Fs(path_body) => Inner::Fs(path_body.path),
        };
        Self {
            inner,
            content_length,
        }
    }

    /// Total number of bytes available to read
    pub(crate) fn content_length(&self) -> u64 {
        self.content_length
    }

    /// Read the bytes covered by `range`
    pub(crate) async fn read_part(&self, range: &PartRange) -> Result<Bytes, error::Error> {
        if range.byte_range().end > self.content_length {
            return Err(error::invalid_input(format!(
                "part #{} ({:?}) is out of bounds for content length {}",
                range.part_number(),
                range.byte_range(),
                self.content_length
            )));
        }

        match &self.inner {
            Inner::Bytes(buf) => {
                let start = to_usize(range.offset())?;
                let end = to_usize(range.byte_range().end)?;
                Ok(buf.slice(start..end))
            }
            Inner::Fs(path) => {
                let path = path.clone();
                let offset = range.offset();
                let length = to_usize(range.length())?;
                let handle = tokio::task::spawn_blocking(move || {
                    let mut dst = BytesMut::zeroed(length);
                    file_util::read_file_chunk_sync(&mut dst, path, offset)?;
                    Ok::<Bytes, error::Error>(dst.freeze())
                });
                handle.await?
            }
        }
    }
}

fn to_usize(value: u64) -> Result<usize, error::Error> {
    usize::try_from(value).map_err(error::invalid_input)
}

mod file_util {
    use std::fs::File;
    use std::io;
    use std::path::Path;

    #[cfg(unix)]
    pub(super) fn read_file_chunk_sync(
        dst: &mut [u8],
        path: impl AsRef<Path>,
        offset: u64,
    ) -> Result<(), io::Error> {
        use std::os::unix::fs::FileExt;

        let file = File::open(path)?;
        file.read_exact_at(dst, offset)
    }

    #[cfg(not(unix))]
    pub(super) fn read_file_chunk_sync(
        dst: &mut [u8],
        path: impl AsRef<Path>,
        offset: u64,
    ) -> Result<(), io::Error> {
        use std::io::{Read, Seek, SeekFrom};

        let mut file = File::open(path)?;
        file.seek(SeekFrom::Start(offset))?;
        file.read_exact(dst)
    }
}
