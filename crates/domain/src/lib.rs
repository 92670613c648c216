pub mod errors;
pub mod filter;
pub mod request;
pub mod timestamp;
pub mod todo;

pub use errors::*;
pub use filter::*;
pub use request::*;
pub use timestamp::*;
pub use todo::*;
