/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

mod part_planner;
pub(crate) mod part_reader;
mod stream;

// re-exports
pub use self::part_planner::PartPlanner;
pub use self::part_planner::PartRange;
pub use self::part_planner::PartRanges;
pub use self::stream::InputStream;
