pub mod transform;

pub use transform::{transform, TransformArgs};
