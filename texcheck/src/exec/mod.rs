pub mod batch;
pub mod executor;

pub use batch::*;
pub use executor::*;
