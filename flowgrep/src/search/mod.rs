//! The concurrent search pipeline: work partitioning, line production,
//! pattern matching, and global line-number resolution.
//!
//! Data flows work queue -> producer pool -> line queue -> consumer
//! pool -> result sink. In ranged mode the chunk planner feeds the work
//! queue; in whole-file mode plain file enumeration does.

pub mod engine;
pub mod pipeline;
pub mod planner;
pub mod source;

pub use engine::{search, SearchReport};
pub use pipeline::{ChunkLineCounts, LineRecord, PipelineOptions};
pub use planner::{plan_chunks, WorkUnit};
pub use source::LineSource;
