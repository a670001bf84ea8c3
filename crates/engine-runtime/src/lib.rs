pub mod error;
pub mod execution;
pub mod view;

#[cfg(test)]
mod tests;
