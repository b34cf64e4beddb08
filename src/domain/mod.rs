pub mod media;
pub mod post;

pub use media::{MediaItem, MediaType, PersistResult, ScrapeResult};
pub use post::{PostKind, PostRef};
