mod fold;
mod schema;
mod sqlite;

pub use fold::{FlyerRow, fold_rows};
pub use sqlite::SqliteRepository;

use crate::error::Result;
use crate::types::*;

/// Repository defines the database interface for flyers and the entities
/// they reference.
pub trait Repository: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // Flyer operations

    /// Writes the flyer and its whole campaign graph in one transaction.
    /// Stores and products are reused by exact name.
    fn save_flyer(&self, image_data: &[u8], analysis: &FlyerAnalysis) -> Result<SavedFlyer>;

    /// Rebuilds the most recent flyer for a store. `Ok(None)` when the store
    /// has no flyer (or does not exist).
    fn get_flyer_by_store_id(&self, store_id: &str) -> Result<Option<StoredFlyer>>;

    // Store operations (stores are never updated once created)

    /// Adds a store. `Error::AlreadyExists` when the name is taken.
    fn create_store(&self, info: &StoreInfo) -> Result<Store>;
    fn get_store(&self, id: &str) -> Result<Option<Store>>;
    fn get_store_by_name(&self, name: &str) -> Result<Option<Store>>;
    fn list_stores(&self) -> Result<Vec<Store>>;

    // Product operations
    fn get_product_by_name(&self, name: &str) -> Result<Option<Product>>;
}
