use std::fmt;

use thiserror::Error;

/// The statement of the flyer write path that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStep {
    InsertFlyer,
    QueryStore,
    InsertStore,
    InsertCampaign,
    LinkCampaignStore,
    QueryProduct,
    InsertProduct,
    InsertFlyerItem,
}

impl WriteStep {
    /// The table the step writes to or reads from.
    #[must_use]
    pub fn table(self) -> &'static str {
        match self {
            Self::InsertFlyer => "flyers",
            Self::QueryStore | Self::InsertStore => "stores",
            Self::InsertCampaign => "campaigns",
            Self::LinkCampaignStore => "campaign_stores",
            Self::QueryProduct | Self::InsertProduct => "products",
            Self::InsertFlyerItem => "flyer_items",
        }
    }
}

impl fmt::Display for WriteStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::InsertFlyer => "insert flyer",
            Self::QueryStore => "query store",
            Self::InsertStore => "insert store",
            Self::InsertCampaign => "insert campaign",
            Self::LinkCampaignStore => "link campaign to store",
            Self::QueryProduct => "query product",
            Self::InsertProduct => "insert product",
            Self::InsertFlyerItem => "insert flyer item",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("failed to begin transaction: {0}")]
    TransactionStart(#[source] rusqlite::Error),

    #[error("failed to {step}: {source}")]
    Write {
        step: WriteStep,
        #[source]
        source: rusqlite::Error,
    },

    #[error("failed to commit transaction: {0}")]
    Commit(#[source] rusqlite::Error),

    #[error("failed to query flyer: {0}")]
    Query(#[source] rusqlite::Error),

    #[error("already exists")]
    AlreadyExists,

    #[error("invalid {field} '{value}', expected YYYY-MM-DD")]
    InvalidDate { field: &'static str, value: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn write(step: WriteStep) -> impl FnOnce(rusqlite::Error) -> Self {
        move |source| Self::Write { step, source }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
