/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::cmp;
use std::iter::FusedIterator;
use std::num::NonZeroU64;
use std::ops::Range;

/// A contiguous byte span of the source that is uploaded as a single part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartRange {
    // 1-indexed
    part_number: u64,
    offset: u64,
    length: u64,
}

impl PartRange {
    /// The 1-based part number
    pub fn part_number(&self) -> u64 {
        self.part_number
    }

    /// Offset of the first byte of this part within the source
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Number of bytes in this part
    pub fn length(&self) -> u64 {
        self.length
    }

    /// The byte range `[offset, offset + length)` covered by this part
    pub fn byte_range(&self) -> Range<u64> {
        self.offset..self.offset + self.length
    }
}

/// Divides a source of known size into parts no larger than a maximum part size.
///
/// Planning is purely computational: the same `(content_length, part_size)` always produces
/// the same sequence of [`PartRange`]s. Every range is non-empty, ranges are contiguous and
/// only the last one may be shorter than `part_size`. A zero length source produces no ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartPlanner {
    content_length: u64,
    part_size: NonZeroU64,
}

impl PartPlanner {
    /// Create a planner for `content_length` bytes split into parts of at most `part_size` bytes
    pub fn new(content_length: u64, part_size: NonZeroU64) -> Self {
        Self {
            content_length,
            part_size,
        }
    }

    /// Total number of bytes covered by the plan
    pub fn content_length(&self) -> u64 {
        self.content_length
    }

    /// Maximum size of a single part
    pub fn part_size(&self) -> u64 {
        self.part_size.get()
    }

    /// Number of parts the source will be split into
    pub fn num_parts(&self) -> u64 {
        self.content_length.div_ceil(self.part_size.get())
    }

    /// Lazily iterate the planned ranges in ascending part number order
    pub fn ranges(&self) -> PartRanges {
        PartRanges {
            part_size: self.part_size.get(),
            offset: 0,
            part_number: 1,
            remaining: self.content_length,
        }
    }
}

/// Iterator over the [`PartRange`]s of a [`PartPlanner`]
#[derive(Debug, Clone)]
pub struct PartRanges {
    part_size: u64,
    // current start offset
    offset: u64,
    // next part number
    part_number: u64,
    // total number of bytes not yet covered
    remaining: u64,
}

impl Iterator for PartRanges {
    type Item = PartRange;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let length = cmp::min(self.part_size, self.remaining);
        let range = PartRange {
            part_number: self.part_number,
            offset: self.offset,
            length,
        };
        self.part_number += 1;
        self.offset += length;
        self.remaining -= length;
        Some(range)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let parts = self.remaining.div_ceil(self.part_size);
        match usize::try_from(parts) {
            Ok(parts) => (parts, Some(parts)),
            Err(_) => (usize::MAX, None),
        }
    }
}

impl FusedIterator for PartRanges {}
