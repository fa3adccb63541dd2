use crate::server::response::ApiError;
use crate::types::{FlyerAnalysis, StoreInfo};

const MAX_NAME_LEN: usize = 255;

fn validate_name(name: &str, entity: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err(format!("{entity} name cannot be empty"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(format!("{entity} name cannot exceed {MAX_NAME_LEN} characters"));
    }
    Ok(())
}

pub fn validate_store(store: &StoreInfo) -> Result<(), ApiError> {
    validate_name(&store.name, "Store").map_err(ApiError::bad_request)
}

/// Checks the fields used as deduplication keys. Everything else is stored
/// as received.
pub fn validate_analysis(analysis: &FlyerAnalysis) -> Result<(), ApiError> {
    validate_store(&analysis.store)?;

    for (i, item) in analysis.items.iter().enumerate() {
        validate_name(&item.product.name, "Product")
            .map_err(|e| ApiError::bad_request(format!("flyer_items[{i}]: {e}")))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FlyerItemInfo, ProductInfo};

    fn analysis(store: &str, products: &[&str]) -> FlyerAnalysis {
        FlyerAnalysis {
            store: StoreInfo {
                name: store.to_string(),
                ..Default::default()
            },
            items: products
                .iter()
                .map(|p| FlyerItemInfo {
                    product: ProductInfo {
                        name: p.to_string(),
                        category: String::new(),
                    },
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_analysis() {
        assert!(validate_analysis(&analysis("Fresh Mart", &["Eggs", "Milk"])).is_ok());
        assert!(validate_analysis(&analysis("Fresh Mart", &[])).is_ok());
    }

    #[test]
    fn test_empty_store_name() {
        let err = validate_analysis(&analysis("  ", &["Eggs"])).unwrap_err();
        assert_eq!(err.message, "Store name cannot be empty");
    }

    #[test]
    fn test_empty_product_name_reports_index() {
        let err = validate_analysis(&analysis("Fresh Mart", &["Eggs", ""])).unwrap_err();
        assert_eq!(err.message, "flyer_items[1]: Product name cannot be empty");
    }

    #[test]
    fn test_validate_store() {
        let store = StoreInfo {
            name: "Fresh Mart".to_string(),
            ..Default::default()
        };
        assert!(validate_store(&store).is_ok());

        let err = validate_store(&StoreInfo::default()).unwrap_err();
        assert_eq!(err.message, "Store name cannot be empty");
    }

    #[test]
    fn test_name_too_long() {
        let long = "x".repeat(MAX_NAME_LEN + 1);
        assert!(validate_analysis(&analysis(&long, &[])).is_err());
    }
}
