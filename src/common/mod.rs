//! Miscellaneous common structs used throughout the library.

mod closest_nodes;
mod id;
mod item;
mod node;
mod routing_table;

pub use closest_nodes::*;
pub use id::*;
pub use item::*;
pub use node::*;
pub use routing_table::*;
