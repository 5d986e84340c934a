pub mod analysis;
pub mod common;
pub mod condition;
pub mod dataset;
pub mod filter;
pub mod image;
pub mod point;
pub mod record;
pub mod registry;
pub mod study;

pub use analysis::*;
pub use common::*;
pub use condition::*;
pub use dataset::*;
pub use filter::*;
pub use image::*;
pub use point::*;
pub use record::*;
pub use registry::*;
pub use study::*;
