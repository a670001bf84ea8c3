pub mod aggregate;
pub mod paged;
pub mod reader;

pub use aggregate::{FetchOutcome, fetch_all};
pub use paged::{PageFetch, PagePlan, PagedFetcher};
pub use reader::PageReader;

#[cfg(test)]
pub(crate) mod testing;
