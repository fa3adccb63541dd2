pub mod dto;
mod flyers;
pub mod response;
mod router;
mod stores;
pub mod validation;

pub use router::{AppState, create_router};
