pub mod application;
pub mod entities;
pub mod errors;
pub mod infrastructure;

pub use application::*;
pub use entities::*;
pub use errors::*;
pub use infrastructure::*;
