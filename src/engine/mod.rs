pub mod batch;
pub mod candidates;
pub mod merge;
pub mod policy;
pub mod scoring;
pub mod stats;
