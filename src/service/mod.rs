pub mod catalog;
pub mod dedup;
