mod server;

pub use server::{ConfigFile, DEFAULT_MAX_UPLOAD_BYTES, ServerConfig};
