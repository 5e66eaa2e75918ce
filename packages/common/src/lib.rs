pub mod search;

pub use search::{descendants, find_all};
