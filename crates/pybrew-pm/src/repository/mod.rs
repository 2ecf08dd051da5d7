mod traits;
mod graph;
mod metadata;
mod installed;
mod pip;
mod array;

pub use traits::*;
pub use graph::*;
pub use metadata::{parse_metadata, parse_requires_txt};
pub use installed::*;
pub use pip::*;
pub use array::*;
