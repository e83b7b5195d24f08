pub mod export;
pub mod info;
pub mod merge;
