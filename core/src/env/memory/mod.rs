mod element;
mod heap;

pub use element::{ElementType, RegionDescriptor};
pub use heap::Heap;
