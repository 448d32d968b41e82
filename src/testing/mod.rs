//! Test helpers: an in-memory data source and a page driver.

pub mod pilot;
pub mod source;

pub use pilot::Pilot;
pub use source::StaticSource;
