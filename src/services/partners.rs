use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::ServiceError;
use crate::database::models::{
    ContactInfo, NewPartner, Partner, PartnerFilter, PartnerUpdate, PortfolioItem, Review,
    ReviewFilter, VerificationDecision,
};
use crate::database::{CreatedOrder, DatabaseError, Store};
use crate::types::{ServiceCategory, VerificationStatus};
use crate::validation::{self, FieldError};

const BUSINESS_NAME_MAX: usize = 100;
const CITY_MAX: usize = 100;
const ABOUT_MAX: usize = 500;
const COMMENT_MAX: usize = 500;

#[derive(Debug, Clone)]
pub struct OnboardInput {
    pub business_name: String,
    pub services: Vec<ServiceCategory>,
    pub city: String,
    pub about: Option<String>,
    pub aadhar_number: String,
    pub portfolio_urls: Vec<String>,
}

/// Partner row plus the owning account's contact details (admin views)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerWithContact {
    #[serde(flatten)]
    pub partner: Partner,
    pub user_details: Option<ContactInfo>,
}

/// The parts of a partner row shown to anonymous visitors. Identity
/// documents and verification bookkeeping stay in the owner/admin views.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicPartner {
    pub id: Uuid,
    pub business_name: String,
    pub services: Vec<ServiceCategory>,
    pub city: String,
    pub about: Option<String>,
    pub portfolio_urls: Vec<String>,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Partner> for PublicPartner {
    fn from(partner: Partner) -> Self {
        Self {
            id: partner.id,
            business_name: partner.business_name,
            services: partner.services,
            city: partner.city,
            about: partner.about,
            portfolio_urls: partner.portfolio_urls,
            is_featured: partner.is_featured,
            created_at: partner.created_at,
        }
    }
}

/// What anyone may see of a verified partner
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    pub partner: PublicPartner,
    pub portfolio: Vec<PortfolioItem>,
    pub reviews: Vec<Review>,
    pub review_count: usize,
    pub average_rating: Option<f64>,
}

pub struct PartnerService {
    store: Arc<dyn Store>,
}

impl PartnerService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Create the caller's partner profile in `pending` state
    pub async fn onboard(&self, user_id: Uuid, input: OnboardInput) -> Result<Partner, ServiceError> {
        if self.store.find_partner_by_user(user_id).await?.is_some() {
            return Err(ServiceError::BadRequest(
                "Partner profile already exists".to_string(),
            ));
        }

        let new_partner = NewPartner {
            user_id,
            business_name: validation::required_text(
                "businessName",
                &input.business_name,
                BUSINESS_NAME_MAX,
            )?,
            services: normalize_services(input.services)?,
            city: validation::required_text("city", &input.city, CITY_MAX)?,
            about: validation::optional_text("about", input.about.as_deref(), ABOUT_MAX)?,
            aadhar_number: validation::aadhar_number(&input.aadhar_number)?,
            portfolio_urls: input
                .portfolio_urls
                .iter()
                .map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty())
                .collect(),
        };

        let partner = self.store.insert_partner(new_partner).await?;
        info!(partner_id = %partner.id, user_id = %user_id, city = %partner.city, "Partner onboarded");
        Ok(partner)
    }

    pub async fn profile(&self, user_id: Uuid) -> Result<Partner, ServiceError> {
        self.store
            .find_partner_by_user(user_id)
            .await?
            .ok_or(ServiceError::NotFound("Partner profile"))
    }

    /// Only business name, services, city and about are editable here
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        update: PartnerUpdate,
    ) -> Result<Partner, ServiceError> {
        let partner = self.profile(user_id).await?;

        let checked = PartnerUpdate {
            business_name: update
                .business_name
                .map(|name| validation::required_text("businessName", &name, BUSINESS_NAME_MAX))
                .transpose()?,
            services: update.services.map(normalize_services).transpose()?,
            city: update
                .city
                .map(|city| validation::required_text("city", &city, CITY_MAX))
                .transpose()?,
            about: update
                .about
                .map(|about| {
                    validation::optional_text("about", Some(&about), ABOUT_MAX)
                        .map(Option::unwrap_or_default)
                })
                .transpose()?,
        };

        let saved = self.store.update_partner_profile(partner.id, &checked).await?;
        info!(partner_id = %saved.id, "Partner profile updated");
        Ok(saved)
    }

    /// Admin decision on a partner: `verified` or `rejected`
    pub async fn verify(
        &self,
        partner_id: Uuid,
        status: Option<&str>,
        comment: Option<String>,
        admin_id: Uuid,
    ) -> Result<Partner, ServiceError> {
        let status = status
            .and_then(|s| s.trim().parse::<VerificationStatus>().ok())
            .filter(|s| *s != VerificationStatus::Pending)
            .ok_or_else(|| {
                ServiceError::BadRequest(
                    "Please provide a valid status (verified or rejected)".to_string(),
                )
            })?;
        let comment = validation::optional_text("comment", comment.as_deref(), COMMENT_MAX)?;

        let decision = VerificationDecision {
            status,
            comment,
            admin_id,
            decided_at: Utc::now(),
        };
        let saved = self
            .store
            .record_verification(partner_id, &decision)
            .await
            .map_err(not_found_as("Partner"))?;
        info!(partner_id = %saved.id, admin_id = %admin_id, status = %status, "Partner verification decided");
        Ok(saved)
    }

    pub async fn set_featured(&self, partner_id: Uuid, featured: bool) -> Result<Partner, ServiceError> {
        let saved = self
            .store
            .set_partner_featured(partner_id, featured)
            .await
            .map_err(not_found_as("Partner"))?;
        info!(partner_id = %saved.id, featured, "Partner featured flag set");
        Ok(saved)
    }

    /// Pending partners, oldest first
    pub async fn pending_verifications(&self) -> Result<Vec<PartnerWithContact>, ServiceError> {
        let filter = PartnerFilter {
            status: Some(VerificationStatus::Pending),
            ..Default::default()
        };
        let partners = self.store.list_partners(&filter, CreatedOrder::OldestFirst).await?;
        self.with_contacts(partners).await
    }

    /// Admin listing, newest first
    pub async fn list(&self, filter: &PartnerFilter) -> Result<Vec<PartnerWithContact>, ServiceError> {
        let partners = self.store.list_partners(filter, CreatedOrder::NewestFirst).await?;
        self.with_contacts(partners).await
    }

    /// Verified partner with portfolio and approved reviews
    pub async fn public_profile(&self, partner_id: Uuid) -> Result<PublicProfile, ServiceError> {
        let partner = self
            .store
            .find_partner(partner_id)
            .await?
            .filter(Partner::is_verified)
            .ok_or(ServiceError::NotFound("Partner"))?;

        let portfolio = self.store.list_portfolio_items(partner.id).await?;
        let reviews = self
            .store
            .list_reviews(&ReviewFilter {
                approved: Some(true),
                partner_id: Some(partner.id),
            })
            .await?;

        Ok(PublicProfile {
            average_rating: average_rating(&reviews),
            review_count: reviews.len(),
            partner: partner.into(),
            portfolio,
            reviews,
        })
    }

    async fn with_contacts(
        &self,
        partners: Vec<Partner>,
    ) -> Result<Vec<PartnerWithContact>, ServiceError> {
        let user_ids: Vec<Uuid> = partners.iter().map(|p| p.user_id).collect();
        let contacts: HashMap<Uuid, ContactInfo> = self
            .store
            .find_users(&user_ids)
            .await?
            .iter()
            .map(|u| (u.id, u.contact()))
            .collect();

        Ok(partners
            .into_iter()
            .map(|partner| PartnerWithContact {
                user_details: contacts.get(&partner.user_id).cloned(),
                partner,
            })
            .collect())
    }
}

fn not_found_as(what: &'static str) -> impl Fn(DatabaseError) -> ServiceError {
    move |e| match e {
        DatabaseError::NotFound(_) => ServiceError::NotFound(what),
        other => other.into(),
    }
}

/// Non-empty, de-duplicated, stable order
fn normalize_services(mut services: Vec<ServiceCategory>) -> Result<Vec<ServiceCategory>, FieldError> {
    services.sort();
    services.dedup();
    if services.is_empty() {
        return Err(FieldError::new("services", "Please provide at least one service"));
    }
    Ok(services)
}

/// Mean rating rounded to one decimal
pub fn average_rating(reviews: &[Review]) -> Option<f64> {
    if reviews.is_empty() {
        return None;
    }
    let total: i64 = reviews.iter().map(|r| i64::from(r.rating)).sum();
    let mean = total as f64 / reviews.len() as f64;
    Some((mean * 10.0).round() / 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{NewReview, NewUser};
    use crate::database::testing::{Race, RacingStore};
    use crate::database::{MemoryStore, ReviewRepository, UserRepository};
    use crate::types::Role;

    async fn partner_user(store: &MemoryStore) -> Uuid {
        store
            .insert_user(NewUser {
                name: "Meera".to_string(),
                email: format!("{}@example.com", Uuid::new_v4()),
                phone: "9111111111".to_string(),
                password_hash: "x".to_string(),
                role: Role::Partner,
            })
            .await
            .unwrap()
            .id
    }

    fn input() -> OnboardInput {
        OnboardInput {
            business_name: " Meera Clicks ".to_string(),
            services: vec![ServiceCategory::Maternity, ServiceCategory::Wedding, ServiceCategory::Maternity],
            city: "Bengaluru".to_string(),
            about: Some("Candid storytelling".to_string()),
            aadhar_number: "1234 5678 9012".to_string(),
            portfolio_urls: vec!["https://example.com/a".to_string(), "  ".to_string()],
        }
    }

    #[tokio::test]
    async fn onboarding_normalizes_and_starts_pending() {
        let store = Arc::new(MemoryStore::new());
        let service = PartnerService::new(store.clone());
        let user_id = partner_user(&store).await;

        let partner = service.onboard(user_id, input()).await.unwrap();
        assert_eq!(partner.business_name, "Meera Clicks");
        assert_eq!(partner.services, vec![ServiceCategory::Wedding, ServiceCategory::Maternity]);
        assert_eq!(partner.aadhar_number, "123456789012");
        assert_eq!(partner.portfolio_urls.len(), 1);
        assert_eq!(partner.verification_status, VerificationStatus::Pending);

        let err = service.onboard(user_id, input()).await.unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(_)));
    }

    #[tokio::test]
    async fn onboarding_rejects_bad_fields() {
        let store = Arc::new(MemoryStore::new());
        let service = PartnerService::new(store.clone());
        let user_id = partner_user(&store).await;

        let no_services = OnboardInput {
            services: vec![],
            ..input()
        };
        assert!(matches!(
            service.onboard(user_id, no_services).await,
            Err(ServiceError::Validation(FieldError { field: "services", .. }))
        ));

        let bad_aadhar = OnboardInput {
            aadhar_number: "1234".to_string(),
            ..input()
        };
        assert!(matches!(
            service.onboard(user_id, bad_aadhar).await,
            Err(ServiceError::Validation(FieldError { field: "aadharNumber", .. }))
        ));
    }

    #[tokio::test]
    async fn verification_sets_and_clears_fields() {
        let store = Arc::new(MemoryStore::new());
        let service = PartnerService::new(store.clone());
        let user_id = partner_user(&store).await;
        let admin_id = Uuid::new_v4();
        let partner = service.onboard(user_id, input()).await.unwrap();

        let rejected = service
            .verify(partner.id, Some("rejected"), Some("Blurry ID".to_string()), admin_id)
            .await
            .unwrap();
        assert_eq!(rejected.verification_status, VerificationStatus::Rejected);
        assert_eq!(rejected.verification_comment.as_deref(), Some("Blurry ID"));

        let verified = service
            .verify(partner.id, Some("verified"), None, admin_id)
            .await
            .unwrap();
        assert!(verified.is_verified());
        assert_eq!(verified.verified_by, Some(admin_id));
        assert!(verified.verified_at.is_some());
        assert!(verified.verification_comment.is_none());

        for bad in [Some("pending"), Some("approved"), None] {
            assert!(matches!(
                service.verify(partner.id, bad, None, admin_id).await,
                Err(ServiceError::BadRequest(_))
            ));
        }
    }

    #[tokio::test]
    async fn public_profile_requires_verification_and_hides_unapproved_reviews() {
        let store = Arc::new(MemoryStore::new());
        let service = PartnerService::new(store.clone());
        let user_id = partner_user(&store).await;
        let partner = service.onboard(user_id, input()).await.unwrap();

        assert!(matches!(
            service.public_profile(partner.id).await,
            Err(ServiceError::NotFound("Partner"))
        ));

        service
            .verify(partner.id, Some("verified"), None, Uuid::new_v4())
            .await
            .unwrap();
        for (rating, approved) in [(5, true), (4, true), (1, false)] {
            let mut review = store
                .insert_review(NewReview {
                    client_id: Uuid::new_v4(),
                    partner_id: partner.id,
                    inquiry_id: None,
                    rating,
                    comment: "ok".to_string(),
                })
                .await
                .unwrap();
            review.is_approved = approved;
            store.save_review(&review).await.unwrap();
        }

        let profile = service.public_profile(partner.id).await.unwrap();
        assert_eq!(profile.review_count, 2);
        assert_eq!(profile.average_rating, Some(4.5));

        let value = serde_json::to_value(&profile).unwrap();
        let public = value["partner"].as_object().unwrap();
        assert_eq!(public["businessName"], "Meera Clicks");
        for private in ["aadharNumber", "verifiedBy", "verificationComment", "user"] {
            assert!(!public.contains_key(private), "{} leaked", private);
        }
    }

    #[tokio::test]
    async fn profile_edit_racing_verification_keeps_the_verdict() {
        let store = Arc::new(RacingStore::new());
        let service = PartnerService::new(store.clone());
        let user_id = partner_user(&store.inner).await;
        service.onboard(user_id, input()).await.unwrap();
        let admin_id = Uuid::new_v4();

        // the admin's decision lands after the partner's profile was read
        store
            .arm(Race::Verification(VerificationDecision {
                status: VerificationStatus::Verified,
                comment: None,
                admin_id,
                decided_at: Utc::now(),
            }))
            .await;
        let updated = service
            .update_profile(
                user_id,
                PartnerUpdate {
                    about: Some("Weekend shoots only".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.about.as_deref(), Some("Weekend shoots only"));
        assert_eq!(updated.verification_status, VerificationStatus::Verified);
        assert_eq!(updated.verified_by, Some(admin_id));
    }

    #[tokio::test]
    async fn deciding_on_a_missing_partner_is_not_found() {
        let service = PartnerService::new(Arc::new(MemoryStore::new()));
        assert!(matches!(
            service.verify(Uuid::new_v4(), Some("verified"), None, Uuid::new_v4()).await,
            Err(ServiceError::NotFound("Partner"))
        ));
        assert!(matches!(
            service.set_featured(Uuid::new_v4(), true).await,
            Err(ServiceError::NotFound("Partner"))
        ));
    }

    #[tokio::test]
    async fn profile_update_keeps_protected_fields() {
        let store = Arc::new(MemoryStore::new());
        let service = PartnerService::new(store.clone());
        let user_id = partner_user(&store).await;
        service.onboard(user_id, input()).await.unwrap();

        let updated = service
            .update_profile(
                user_id,
                PartnerUpdate {
                    city: Some("Mysuru".to_string()),
                    services: Some(vec![ServiceCategory::Event]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.city, "Mysuru");
        assert_eq!(updated.services, vec![ServiceCategory::Event]);
        assert_eq!(updated.verification_status, VerificationStatus::Pending);
        assert_eq!(updated.aadhar_number, "123456789012");
    }
}
