pub mod inquiry;
pub mod partner;
pub mod portfolio;
pub mod review;
pub mod user;

pub use inquiry::{merge_assignment, Inquiry, NewInquiry};
pub use partner::{NewPartner, Partner, PartnerFilter, PartnerUpdate, VerificationDecision};
pub use portfolio::{NewPortfolioItem, PortfolioItem, PortfolioUpdate};
pub use review::{NewReview, Review, ReviewFilter};
pub use user::{ContactInfo, NewUser, User};

use std::str::FromStr;

use sqlx::{postgres::PgRow, Row};

use crate::types::ParseEnumError;

/// Decode a TEXT column holding one of our string enums
pub(crate) fn decode_enum<T>(row: &PgRow, column: &str) -> Result<T, sqlx::Error>
where
    T: FromStr<Err = ParseEnumError>,
{
    let raw: String = row.try_get(column)?;
    raw.parse().map_err(|e: ParseEnumError| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

/// Decode a TEXT[] column holding string enums
pub(crate) fn decode_enum_list<T>(row: &PgRow, column: &str) -> Result<Vec<T>, sqlx::Error>
where
    T: FromStr<Err = ParseEnumError>,
{
    let raw: Vec<String> = row.try_get(column)?;
    raw.iter()
        .map(|value| {
            value.parse().map_err(|e: ParseEnumError| sqlx::Error::ColumnDecode {
                index: column.to_string(),
                source: Box::new(e),
            })
        })
        .collect()
}
