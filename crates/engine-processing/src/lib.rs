pub mod columns;
pub mod filter;
pub mod paginate;
pub mod pipeline;
pub mod sort;
