use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const CAMPAIGN_DATE_FORMAT: &str = "%Y-%m-%d";

/// What to do with a campaign date that is not `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatePolicy {
    /// Store the date as absent and keep going.
    #[default]
    Lenient,
    /// Reject the whole upload.
    Strict,
}

impl DatePolicy {
    /// Parses a campaign date under this policy. `Ok(None)` means absent.
    pub fn parse(self, field: &'static str, value: &str) -> Result<Option<NaiveDate>> {
        match parse_campaign_date(value) {
            Some(date) => Ok(Some(date)),
            None => match self {
                Self::Lenient => {
                    tracing::warn!("Unparseable {} '{}', storing as absent", field, value);
                    Ok(None)
                }
                Self::Strict => Err(Error::InvalidDate {
                    field,
                    value: value.to_string(),
                }),
            },
        }
    }
}

pub fn parse_campaign_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), CAMPAIGN_DATE_FORMAT).ok()
}

/// Renders a stored campaign date back to its wire form; absent is `""`.
pub fn format_campaign_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(CAMPAIGN_DATE_FORMAT).to_string())
        .unwrap_or_default()
}
