mod analysis;
mod date;
mod models;

pub use analysis::*;
pub use date::*;
pub use models::*;
