use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::ServiceError;
use crate::database::models::{NewReview, Review, ReviewFilter};
use crate::database::Store;
use crate::types::InquiryStatus;
use crate::validation::{self, FieldError};

const COMMENT_MAX: usize = 500;

/// Review with the names an admin needs to moderate it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewView {
    #[serde(flatten)]
    pub review: Review,
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub partner_business_name: Option<String>,
}

pub struct ReviewService {
    store: Arc<dyn Store>,
}

impl ReviewService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Client review of the partner that booked one of their inquiries
    pub async fn create(
        &self,
        client_id: Uuid,
        inquiry_id: Uuid,
        rating: Option<i64>,
        comment: &str,
    ) -> Result<Review, ServiceError> {
        let rating = validate_rating(rating)?;
        let comment = validation::required_text("comment", comment, COMMENT_MAX)?;

        let inquiry = self
            .store
            .find_inquiry(inquiry_id)
            .await?
            .ok_or(ServiceError::NotFound("Inquiry"))?;
        if inquiry.client_id != client_id {
            return Err(ServiceError::Forbidden(
                "Not authorized to review this inquiry".to_string(),
            ));
        }

        let partner_id = match (inquiry.status, inquiry.booked_partner) {
            (InquiryStatus::Booked | InquiryStatus::Closed, Some(partner_id)) => partner_id,
            _ => {
                return Err(ServiceError::BadRequest(
                    "Only inquiries booked with a partner can be reviewed".to_string(),
                ))
            }
        };

        let review = self
            .store
            .insert_review(NewReview {
                client_id,
                partner_id,
                inquiry_id: Some(inquiry.id),
                rating,
                comment,
            })
            .await?;
        info!(review_id = %review.id, partner_id = %partner_id, rating, "Review submitted");
        Ok(review)
    }

    /// Admin listing, newest first
    pub async fn list(&self, approved: Option<bool>) -> Result<Vec<ReviewView>, ServiceError> {
        let reviews = self
            .store
            .list_reviews(&ReviewFilter {
                approved,
                partner_id: None,
            })
            .await?;

        let mut client_ids: Vec<Uuid> = reviews.iter().map(|r| r.client_id).collect();
        client_ids.sort();
        client_ids.dedup();
        let clients: HashMap<Uuid, (String, String)> = self
            .store
            .find_users(&client_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, (u.name, u.email)))
            .collect();

        let mut business_names: HashMap<Uuid, String> = HashMap::new();
        for review in &reviews {
            if business_names.contains_key(&review.partner_id) {
                continue;
            }
            if let Some(partner) = self.store.find_partner(review.partner_id).await? {
                business_names.insert(partner.id, partner.business_name);
            }
        }

        Ok(reviews
            .into_iter()
            .map(|review| {
                let client = clients.get(&review.client_id);
                ReviewView {
                    client_name: client.map(|(name, _)| name.clone()),
                    client_email: client.map(|(_, email)| email.clone()),
                    partner_business_name: business_names.get(&review.partner_id).cloned(),
                    review,
                }
            })
            .collect())
    }

    /// Approve or hide a review, optionally replacing its comment
    pub async fn moderate(
        &self,
        review_id: Uuid,
        approved: Option<bool>,
        comment: Option<String>,
    ) -> Result<Review, ServiceError> {
        let approved = approved.ok_or_else(|| {
            ServiceError::BadRequest(
                "Please provide a valid approval value (true or false)".to_string(),
            )
        })?;

        let mut review = self
            .store
            .find_review(review_id)
            .await?
            .ok_or(ServiceError::NotFound("Review"))?;
        review.is_approved = approved;
        if let Some(comment) = comment {
            review.comment = validation::required_text("comment", &comment, COMMENT_MAX)?;
        }

        let saved = self.store.save_review(&review).await?;
        info!(review_id = %saved.id, approved, "Review moderated");
        Ok(saved)
    }

    pub async fn delete(&self, review_id: Uuid) -> Result<(), ServiceError> {
        if !self.store.delete_review(review_id).await? {
            return Err(ServiceError::NotFound("Review"));
        }
        info!(review_id = %review_id, "Review deleted");
        Ok(())
    }
}

fn validate_rating(rating: Option<i64>) -> Result<i16, FieldError> {
    match rating {
        Some(r @ 1..=5) => Ok(r as i16),
        _ => Err(FieldError::new("rating", "Rating must be between 1 and 5")),
    }
}
