pub mod call;
pub mod model;
pub mod points;

pub use call::*;
pub use model::*;
pub use points::*;
