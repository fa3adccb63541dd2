//! Folding flat join rows back into one nested flyer.

use chrono::{DateTime, Utc};

use crate::types::{CampaignInfo, Flyer, FlyerAnalysis, FlyerItemInfo, StoreInfo, StoredFlyer};

/// One row of the flyer → campaign → store ⟕ item ⟕ product join.
#[derive(Debug, Clone)]
pub struct FlyerRow {
    pub flyer_id: String,
    pub image_data: Vec<u8>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub store_id: String,
    pub store: StoreInfo,
    pub campaign: CampaignInfo,
    /// `None` when the campaign has no items (the left join produced nulls).
    pub item: Option<FlyerItemInfo>,
}

/// Folds rows ordered newest flyer first into a single flyer.
///
/// The first row supplies the header. Every following row of the same flyer
/// that carries an item appends it, in row order. Rows of older flyers are
/// never read. No rows means no flyer.
pub fn fold_rows<I, E>(rows: I) -> Result<Option<StoredFlyer>, E>
where
    I: IntoIterator<Item = Result<FlyerRow, E>>,
{
    let mut rows = rows.into_iter();

    let first = match rows.next() {
        Some(row) => row?,
        None => return Ok(None),
    };

    let FlyerRow {
        flyer_id,
        image_data,
        created_at,
        updated_at,
        store_id,
        store,
        campaign,
        item,
    } = first;

    let mut items: Vec<FlyerItemInfo> = item.into_iter().collect();

    for row in rows {
        let row = row?;
        if row.flyer_id != flyer_id {
            break;
        }
        if let Some(item) = row.item {
            items.push(item);
        }
    }

    Ok(Some(StoredFlyer {
        flyer: Flyer {
            id: flyer_id,
            image_data,
            created_at,
            updated_at,
        },
        store_id,
        data: FlyerAnalysis {
            store,
            campaign,
            items,
        },
    }))
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use super::*;
    use crate::types::ProductInfo;

    fn row(flyer_id: &str, item: Option<(&str, i64)>) -> FlyerRow {
        FlyerRow {
            flyer_id: flyer_id.to_string(),
            image_data: vec![1, 2, 3],
            created_at: Utc::now(),
            updated_at: Utc::now(),
            store_id: "store-1".to_string(),
            store: StoreInfo {
                name: format!("store for {flyer_id}"),
                ..Default::default()
            },
            campaign: CampaignInfo {
                name: format!("campaign for {flyer_id}"),
                start_date: "2024-05-01".to_string(),
                end_date: "2024-05-07".to_string(),
            },
            item: item.map(|(name, price)| FlyerItemInfo {
                product: ProductInfo {
                    name: name.to_string(),
                    category: String::new(),
                },
                price_excluding_tax: price,
                price_including_tax: price + 1,
                unit: "each".to_string(),
                restriction_note: String::new(),
            }),
        }
    }

    fn ok(rows: Vec<FlyerRow>) -> impl Iterator<Item = Result<FlyerRow, Infallible>> {
        rows.into_iter().map(Ok)
    }

    #[test]
    fn test_fold_empty_is_none() {
        let folded = fold_rows(ok(vec![])).unwrap();
        assert!(folded.is_none());
    }

    #[test]
    fn test_fold_collects_items_in_order() {
        let folded = fold_rows(ok(vec![
            row("f1", Some(("A", 10))),
            row("f1", Some(("B", 20))),
            row("f1", Some(("C", 30))),
        ]))
        .unwrap()
        .unwrap();

        assert_eq!(folded.flyer.id, "f1");
        assert_eq!(folded.store_id, "store-1");
        let names: Vec<_> = folded
            .data
            .items
            .iter()
            .map(|i| i.product.name.as_str())
            .collect();
        assert_eq!(names, ["A", "B", "C"]);
    }

    #[test]
    fn test_fold_campaign_without_items() {
        let folded = fold_rows(ok(vec![row("f1", None)])).unwrap().unwrap();
        assert_eq!(folded.data.campaign.name, "campaign for f1");
        assert!(folded.data.items.is_empty());
    }

    #[test]
    fn test_fold_stops_at_older_flyer() {
        let folded = fold_rows(ok(vec![
            row("new", Some(("A", 10))),
            row("old", Some(("B", 20))),
            row("old", Some(("C", 30))),
        ]))
        .unwrap()
        .unwrap();

        assert_eq!(folded.flyer.id, "new");
        assert_eq!(folded.data.campaign.name, "campaign for new");
        assert_eq!(folded.data.items.len(), 1);
        assert_eq!(folded.data.items[0].product.name, "A");
    }

    #[test]
    fn test_fold_propagates_row_error() {
        let rows: Vec<Result<FlyerRow, &str>> = vec![Ok(row("f1", Some(("A", 10)))), Err("boom")];
        assert_eq!(fold_rows(rows).unwrap_err(), "boom");
    }
}
