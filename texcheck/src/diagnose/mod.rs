pub mod layout;
pub mod locate;

pub use layout::*;
pub use locate::*;
