pub mod memory;
pub mod sqlite;
pub mod store;

pub use memory::*;
pub use sqlite::*;
pub use store::*;
