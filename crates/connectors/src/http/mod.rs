pub mod source;

pub use source::HttpListSource;
