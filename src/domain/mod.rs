pub mod change;
pub mod product;

pub use change::*;
pub use product::*;
