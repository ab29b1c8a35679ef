pub mod ids;
pub mod triple;
pub mod value;

pub use ids::IdAllocator;
pub use triple::Triple;
pub use value::{Node, Reference, Value, node};
