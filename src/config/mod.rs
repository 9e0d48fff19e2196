pub mod builder;
pub mod resolved;
pub mod types;

pub use builder::*;
pub use resolved::*;
pub use types::*;
