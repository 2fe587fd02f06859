use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    merge_assignment, Inquiry, NewInquiry, NewPartner, NewPortfolioItem, NewReview, NewUser,
    Partner, PartnerFilter, PartnerUpdate, PortfolioItem, Review, ReviewFilter, User,
    VerificationDecision,
};
use crate::database::repository::{
    CreatedOrder, InquiryRepository, PartnerRepository, PortfolioRepository, ReviewRepository,
    UserRepository,
};
use crate::types::{InquiryStatus, Role, VerificationStatus};

/// In-process store used by the development preset and the test suite.
///
/// Mirrors the unique indexes of the Postgres schema so both backends
/// report the same conflicts.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    partners: RwLock<HashMap<Uuid, Partner>>,
    inquiries: RwLock<HashMap<Uuid, Inquiry>>,
    portfolio: RwLock<HashMap<Uuid, PortfolioItem>>,
    reviews: RwLock<HashMap<Uuid, Review>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn modify_partner<F>(&self, id: Uuid, change: F) -> Result<Partner, DatabaseError>
    where
        F: FnOnce(&mut Partner) + Send,
    {
        let mut partners = self.partners.write().await;
        let stored = partners
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::NotFound(format!("partner {}", id)))?;
        change(stored);
        Ok(stored.clone())
    }
}

fn newest_first<T, F>(items: &mut [T], key: F)
where
    F: Fn(&T) -> (DateTime<Utc>, Uuid),
{
    items.sort_by(|a, b| {
        let (a_at, a_id) = key(a);
        let (b_at, b_id) = key(b);
        b_at.cmp(&a_at).then(a_id.cmp(&b_id))
    });
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email.to_lowercase() == user.email.to_lowercase()) {
            return Err(DatabaseError::Conflict("users_email_key".to_string()));
        }
        let record = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            phone: user.phone,
            password_hash: user.password_hash,
            role: user.role,
            otp_hash: None,
            otp_expires_at: None,
            is_verified: false,
            created_at: Utc::now(),
        };
        users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email.to_lowercase() == email.to_lowercase())
            .cloned())
    }

    async fn find_users(&self, ids: &[Uuid]) -> Result<Vec<User>, DatabaseError> {
        let users = self.users.read().await;
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }

    async fn set_user_otp(
        &self,
        id: Uuid,
        otp_hash: String,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::NotFound(format!("user {}", id)))?;
        user.otp_hash = Some(otp_hash);
        user.otp_expires_at = Some(expires_at);
        Ok(())
    }

    async fn mark_user_verified(&self, id: Uuid) -> Result<(), DatabaseError> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::NotFound(format!("user {}", id)))?;
        user.otp_hash = None;
        user.otp_expires_at = None;
        user.is_verified = true;
        Ok(())
    }

    async fn count_users(&self, role: Option<Role>) -> Result<i64, DatabaseError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .filter(|u| role.map_or(true, |r| u.role == r))
            .count() as i64)
    }
}

#[async_trait]
impl PartnerRepository for MemoryStore {
    async fn insert_partner(&self, partner: NewPartner) -> Result<Partner, DatabaseError> {
        let mut partners = self.partners.write().await;
        if partners.values().any(|p| p.user_id == partner.user_id) {
            return Err(DatabaseError::Conflict("partners_user_id_key".to_string()));
        }
        let record = Partner {
            id: Uuid::new_v4(),
            user_id: partner.user_id,
            business_name: partner.business_name,
            services: partner.services,
            city: partner.city,
            about: partner.about,
            aadhar_number: partner.aadhar_number,
            portfolio_urls: partner.portfolio_urls,
            verification_status: VerificationStatus::Pending,
            verification_comment: None,
            verified_at: None,
            verified_by: None,
            is_featured: false,
            created_at: Utc::now(),
        };
        partners.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_partner(&self, id: Uuid) -> Result<Option<Partner>, DatabaseError> {
        Ok(self.partners.read().await.get(&id).cloned())
    }

    async fn find_partner_by_user(&self, user_id: Uuid) -> Result<Option<Partner>, DatabaseError> {
        Ok(self
            .partners
            .read()
            .await
            .values()
            .find(|p| p.user_id == user_id)
            .cloned())
    }

    async fn list_partners(
        &self,
        filter: &PartnerFilter,
        order: CreatedOrder,
    ) -> Result<Vec<Partner>, DatabaseError> {
        let partners = self.partners.read().await;
        let mut matched: Vec<Partner> = partners
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        match order {
            CreatedOrder::NewestFirst => newest_first(&mut matched, |p| (p.created_at, p.id)),
            CreatedOrder::OldestFirst => {
                matched.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)))
            }
        }
        Ok(matched)
    }

    async fn update_partner_profile(
        &self,
        id: Uuid,
        update: &PartnerUpdate,
    ) -> Result<Partner, DatabaseError> {
        self.modify_partner(id, |p| p.apply_profile(update)).await
    }

    async fn record_verification(
        &self,
        id: Uuid,
        decision: &VerificationDecision,
    ) -> Result<Partner, DatabaseError> {
        self.modify_partner(id, |p| p.apply_verification(decision)).await
    }

    async fn set_partner_featured(
        &self,
        id: Uuid,
        featured: bool,
    ) -> Result<Partner, DatabaseError> {
        self.modify_partner(id, |p| p.is_featured = featured).await
    }

    async fn count_partners(
        &self,
        status: Option<VerificationStatus>,
    ) -> Result<i64, DatabaseError> {
        let partners = self.partners.read().await;
        Ok(partners
            .values()
            .filter(|p| status.map_or(true, |s| p.verification_status == s))
            .count() as i64)
    }
}

#[async_trait]
impl InquiryRepository for MemoryStore {
    async fn insert_inquiry(&self, inquiry: NewInquiry) -> Result<Inquiry, DatabaseError> {
        let now = Utc::now();
        let record = Inquiry {
            id: Uuid::new_v4(),
            client_id: inquiry.client_id,
            category: inquiry.category,
            date: inquiry.date,
            budget: inquiry.budget,
            city: inquiry.city,
            description: inquiry.description,
            reference_image_url: inquiry.reference_image_url,
            status: InquiryStatus::New,
            assigned_partners: Vec::new(),
            booked_partner: None,
            created_at: now,
            updated_at: now,
        };
        self.inquiries
            .write()
            .await
            .insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_inquiry(&self, id: Uuid) -> Result<Option<Inquiry>, DatabaseError> {
        Ok(self.inquiries.read().await.get(&id).cloned())
    }

    async fn list_inquiries_for_client(
        &self,
        client_id: Uuid,
    ) -> Result<Vec<Inquiry>, DatabaseError> {
        let inquiries = self.inquiries.read().await;
        let mut owned: Vec<Inquiry> = inquiries
            .values()
            .filter(|i| i.client_id == client_id)
            .cloned()
            .collect();
        newest_first(&mut owned, |i| (i.created_at, i.id));
        Ok(owned)
    }

    async fn list_inquiries_for_partner(
        &self,
        partner_id: Uuid,
    ) -> Result<Vec<Inquiry>, DatabaseError> {
        let inquiries = self.inquiries.read().await;
        let mut leads: Vec<Inquiry> = inquiries
            .values()
            .filter(|i| i.is_assigned_to(partner_id))
            .cloned()
            .collect();
        newest_first(&mut leads, |i| (i.created_at, i.id));
        Ok(leads)
    }

    async fn assign_partners(
        &self,
        id: Uuid,
        candidates: &[Uuid],
        cap: usize,
    ) -> Result<Option<Inquiry>, DatabaseError> {
        let mut inquiries = self.inquiries.write().await;
        match inquiries.get_mut(&id) {
            Some(inquiry) if inquiry.status == InquiryStatus::New => {
                inquiry.assigned_partners =
                    merge_assignment(&inquiry.assigned_partners, candidates, cap);
                inquiry.updated_at = Utc::now();
                Ok(Some(inquiry.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn update_inquiry_status(
        &self,
        id: Uuid,
        expected: InquiryStatus,
        next: InquiryStatus,
        booked_partner: Option<Uuid>,
    ) -> Result<Option<Inquiry>, DatabaseError> {
        let mut inquiries = self.inquiries.write().await;
        match inquiries.get_mut(&id) {
            Some(inquiry) if inquiry.status == expected => {
                inquiry.status = next;
                if booked_partner.is_some() {
                    inquiry.booked_partner = booked_partner;
                }
                inquiry.updated_at = Utc::now();
                Ok(Some(inquiry.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete_inquiry(&self, id: Uuid) -> Result<bool, DatabaseError> {
        Ok(self.inquiries.write().await.remove(&id).is_some())
    }

    async fn count_inquiries(&self, status: Option<InquiryStatus>) -> Result<i64, DatabaseError> {
        let inquiries = self.inquiries.read().await;
        Ok(inquiries
            .values()
            .filter(|i| status.map_or(true, |s| i.status == s))
            .count() as i64)
    }

    async fn count_open_leads(
        &self,
        partner_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, i64>, DatabaseError> {
        let inquiries = self.inquiries.read().await;
        let mut counts = HashMap::new();
        for inquiry in inquiries.values().filter(|i| i.status.is_open()) {
            for partner_id in &inquiry.assigned_partners {
                if partner_ids.contains(partner_id) {
                    *counts.entry(*partner_id).or_insert(0) += 1;
                }
            }
        }
        Ok(counts)
    }
}

#[async_trait]
impl PortfolioRepository for MemoryStore {
    async fn insert_portfolio_item(
        &self,
        item: NewPortfolioItem,
    ) -> Result<PortfolioItem, DatabaseError> {
        let record = PortfolioItem {
            id: Uuid::new_v4(),
            partner_id: item.partner_id,
            title: item.title,
            category: item.category,
            description: item.description,
            image_url: item.image_url,
            display_order: item.display_order,
            created_at: Utc::now(),
        };
        self.portfolio
            .write()
            .await
            .insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_portfolio_item(&self, id: Uuid) -> Result<Option<PortfolioItem>, DatabaseError> {
        Ok(self.portfolio.read().await.get(&id).cloned())
    }

    async fn list_portfolio_items(
        &self,
        partner_id: Uuid,
    ) -> Result<Vec<PortfolioItem>, DatabaseError> {
        let portfolio = self.portfolio.read().await;
        let mut items: Vec<PortfolioItem> = portfolio
            .values()
            .filter(|item| item.partner_id == partner_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            a.display_order
                .cmp(&b.display_order)
                .then(a.created_at.cmp(&b.created_at))
        });
        Ok(items)
    }

    async fn count_portfolio_items(&self, partner_id: Uuid) -> Result<i64, DatabaseError> {
        let portfolio = self.portfolio.read().await;
        Ok(portfolio
            .values()
            .filter(|item| item.partner_id == partner_id)
            .count() as i64)
    }

    async fn save_portfolio_item(
        &self,
        item: &PortfolioItem,
    ) -> Result<PortfolioItem, DatabaseError> {
        let mut portfolio = self.portfolio.write().await;
        let stored = portfolio
            .get_mut(&item.id)
            .ok_or_else(|| DatabaseError::NotFound(format!("portfolio item {}", item.id)))?;
        stored.title = item.title.clone();
        stored.category = item.category;
        stored.description = item.description.clone();
        stored.image_url = item.image_url.clone();
        stored.display_order = item.display_order;
        Ok(stored.clone())
    }

    async fn delete_portfolio_item(&self, id: Uuid) -> Result<bool, DatabaseError> {
        Ok(self.portfolio.write().await.remove(&id).is_some())
    }
}

#[async_trait]
impl ReviewRepository for MemoryStore {
    async fn insert_review(&self, review: NewReview) -> Result<Review, DatabaseError> {
        let mut reviews = self.reviews.write().await;
        if reviews
            .values()
            .any(|r| r.client_id == review.client_id && r.partner_id == review.partner_id)
        {
            return Err(DatabaseError::Conflict("reviews_client_partner_key".to_string()));
        }
        let record = Review {
            id: Uuid::new_v4(),
            client_id: review.client_id,
            partner_id: review.partner_id,
            inquiry_id: review.inquiry_id,
            rating: review.rating,
            comment: review.comment,
            is_approved: false,
            created_at: Utc::now(),
        };
        reviews.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_review(&self, id: Uuid) -> Result<Option<Review>, DatabaseError> {
        Ok(self.reviews.read().await.get(&id).cloned())
    }

    async fn list_reviews(&self, filter: &ReviewFilter) -> Result<Vec<Review>, DatabaseError> {
        let reviews = self.reviews.read().await;
        let mut matched: Vec<Review> = reviews
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        newest_first(&mut matched, |r| (r.created_at, r.id));
        Ok(matched)
    }

    async fn save_review(&self, review: &Review) -> Result<Review, DatabaseError> {
        let mut reviews = self.reviews.write().await;
        let stored = reviews
            .get_mut(&review.id)
            .ok_or_else(|| DatabaseError::NotFound(format!("review {}", review.id)))?;
        stored.rating = review.rating;
        stored.comment = review.comment.clone();
        stored.is_approved = review.is_approved;
        Ok(stored.clone())
    }

    async fn delete_review(&self, id: Uuid) -> Result<bool, DatabaseError> {
        Ok(self.reviews.write().await.remove(&id).is_some())
    }

    async fn count_reviews(&self, approved: Option<bool>) -> Result<i64, DatabaseError> {
        let reviews = self.reviews.read().await;
        Ok(reviews
            .values()
            .filter(|r| approved.map_or(true, |a| r.is_approved == a))
            .count() as i64)
    }
}
