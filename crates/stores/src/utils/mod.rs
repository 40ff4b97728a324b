//! Helpers used by the stores.

pub mod locator;
pub mod provisional;

pub use locator::video_id_from_url;
pub use provisional::ProvisionalIds;
