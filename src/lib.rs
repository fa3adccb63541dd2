//! # Chirashi
//!
//! Stores analyzed retail flyers in a normalized SQLite schema and reads them
//! back by store. Usable both as a standalone server and as a library.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! chirashi = { version = "0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use chirashi::repository::{Repository, SqliteRepository};
//! use chirashi::types::FlyerAnalysis;
//!
//! let repo = SqliteRepository::new("./data/chirashi.db").unwrap();
//! repo.initialize().unwrap();
//!
//! let analysis: FlyerAnalysis = serde_json::from_str(json).unwrap();
//! let saved = repo.save_flyer(&image_bytes, &analysis).unwrap();
//! let flyer = repo.get_flyer_by_store_id(&saved.store_id).unwrap();
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Builds the `chirashi` binary. Disable with `default-features = false`.

pub mod config;
pub mod error;
pub mod repository;
pub mod server;
pub mod types;
