pub mod cursor;
pub mod fetch;
