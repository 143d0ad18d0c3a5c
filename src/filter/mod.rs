pub mod types;
pub mod filter;

pub use types::*;
pub use filter::ResourceFilter;
