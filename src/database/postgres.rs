use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Inquiry, NewInquiry, NewPartner, NewPortfolioItem, NewReview, NewUser, Partner, PartnerFilter,
    PartnerUpdate, PortfolioItem, Review, ReviewFilter, User, VerificationDecision,
};
use crate::database::repository::{
    CreatedOrder, InquiryRepository, PartnerRepository, PortfolioRepository, ReviewRepository,
    UserRepository,
};
use crate::types::{InquiryStatus, Role, ServiceCategory, VerificationStatus};

const USER_COLUMNS: &str = "id, name, email, phone, password_hash, role, otp_hash, \
otp_expires_at, is_verified, created_at";

const PARTNER_COLUMNS: &str = "id, user_id, business_name, services, city, about, \
aadhar_number, portfolio_urls, verification_status, verification_comment, verified_at, \
verified_by, is_featured, created_at";

const INQUIRY_COLUMNS: &str = "id, client_id, category, date, budget, city, description, \
reference_image_url, status, assigned_partners, booked_partner, created_at, updated_at";

const PORTFOLIO_COLUMNS: &str =
    "id, partner_id, title, category, description, image_url, display_order, created_at";

const REVIEW_COLUMNS: &str =
    "id, client_id, partner_id, inquiry_id, rating, comment, is_approved, created_at";

/// Postgres-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn order_sql(order: CreatedOrder) -> &'static str {
    match order {
        CreatedOrder::NewestFirst => "DESC",
        CreatedOrder::OldestFirst => "ASC",
    }
}

fn service_names(services: &[ServiceCategory]) -> Vec<String> {
    services.iter().map(|s| s.as_str().to_string()).collect()
}

#[async_trait]
impl UserRepository for PgStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        let sql = format!(
            "INSERT INTO users (id, name, email, phone, password_hash, role) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            USER_COLUMNS
        );
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.phone)
            .bind(&user.password_hash)
            .bind(user.role.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE LOWER(email) = LOWER($1)", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_users(&self, ids: &[Uuid]) -> Result<Vec<User>, DatabaseError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let sql = format!("SELECT {} FROM users WHERE id = ANY($1)", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn set_user_otp(
        &self,
        id: Uuid,
        otp_hash: String,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        let result = sqlx::query("UPDATE users SET otp_hash = $2, otp_expires_at = $3 WHERE id = $1")
            .bind(id)
            .bind(otp_hash)
            .bind(expires_at)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("user {}", id)));
        }
        Ok(())
    }

    async fn mark_user_verified(&self, id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "UPDATE users SET otp_hash = NULL, otp_expires_at = NULL, is_verified = TRUE WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("user {}", id)));
        }
        Ok(())
    }

    async fn count_users(&self, role: Option<Role>) -> Result<i64, DatabaseError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE ($1::TEXT IS NULL OR role = $1)")
                .bind(role.map(|r| r.as_str()))
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}

#[async_trait]
impl PartnerRepository for PgStore {
    async fn insert_partner(&self, partner: NewPartner) -> Result<Partner, DatabaseError> {
        let sql = format!(
            "INSERT INTO partners (id, user_id, business_name, services, city, about, \
             aadhar_number, portfolio_urls) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {}",
            PARTNER_COLUMNS
        );
        Ok(sqlx::query_as::<_, Partner>(&sql)
            .bind(Uuid::new_v4())
            .bind(partner.user_id)
            .bind(&partner.business_name)
            .bind(service_names(&partner.services))
            .bind(&partner.city)
            .bind(&partner.about)
            .bind(&partner.aadhar_number)
            .bind(&partner.portfolio_urls)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn find_partner(&self, id: Uuid) -> Result<Option<Partner>, DatabaseError> {
        let sql = format!("SELECT {} FROM partners WHERE id = $1", PARTNER_COLUMNS);
        Ok(sqlx::query_as::<_, Partner>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_partner_by_user(&self, user_id: Uuid) -> Result<Option<Partner>, DatabaseError> {
        let sql = format!("SELECT {} FROM partners WHERE user_id = $1", PARTNER_COLUMNS);
        Ok(sqlx::query_as::<_, Partner>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_partners(
        &self,
        filter: &PartnerFilter,
        order: CreatedOrder,
    ) -> Result<Vec<Partner>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM partners \
             WHERE ($1::TEXT IS NULL OR verification_status = $1) \
             AND ($2::TEXT IS NULL OR LOWER(city) = LOWER(TRIM($2))) \
             AND ($3::TEXT IS NULL OR $3 = ANY(services)) \
             ORDER BY created_at {}, id",
            PARTNER_COLUMNS,
            order_sql(order)
        );
        Ok(sqlx::query_as::<_, Partner>(&sql)
            .bind(filter.status.map(|s| s.as_str()))
            .bind(filter.city.as_deref())
            .bind(filter.service.map(|s| s.as_str()))
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update_partner_profile(
        &self,
        id: Uuid,
        update: &PartnerUpdate,
    ) -> Result<Partner, DatabaseError> {
        let sql = format!(
            "UPDATE partners SET business_name = COALESCE($2, business_name), \
             services = COALESCE($3, services), city = COALESCE($4, city), \
             about = CASE WHEN $5::TEXT IS NULL THEN about ELSE NULLIF($5, '') END \
             WHERE id = $1 RETURNING {}",
            PARTNER_COLUMNS
        );
        sqlx::query_as::<_, Partner>(&sql)
            .bind(id)
            .bind(update.business_name.as_deref())
            .bind(update.services.as_deref().map(service_names))
            .bind(update.city.as_deref())
            .bind(update.about.as_deref())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("partner {}", id)))
    }

    async fn record_verification(
        &self,
        id: Uuid,
        decision: &VerificationDecision,
    ) -> Result<Partner, DatabaseError> {
        let sql = format!(
            "UPDATE partners SET verification_status = $2, verified_at = $3, verified_by = $4, \
             verification_comment = CASE WHEN $2 = 'verified' THEN NULL \
             ELSE COALESCE($5, verification_comment) END \
             WHERE id = $1 RETURNING {}",
            PARTNER_COLUMNS
        );
        sqlx::query_as::<_, Partner>(&sql)
            .bind(id)
            .bind(decision.status.as_str())
            .bind(decision.verified_at())
            .bind(decision.verified_by())
            .bind(decision.comment.as_deref())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("partner {}", id)))
    }

    async fn set_partner_featured(
        &self,
        id: Uuid,
        featured: bool,
    ) -> Result<Partner, DatabaseError> {
        let sql = format!(
            "UPDATE partners SET is_featured = $2 WHERE id = $1 RETURNING {}",
            PARTNER_COLUMNS
        );
        sqlx::query_as::<_, Partner>(&sql)
            .bind(id)
            .bind(featured)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("partner {}", id)))
    }

    async fn count_partners(
        &self,
        status: Option<VerificationStatus>,
    ) -> Result<i64, DatabaseError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM partners WHERE ($1::TEXT IS NULL OR verification_status = $1)",
        )
        .bind(status.map(|s| s.as_str()))
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}

#[async_trait]
impl InquiryRepository for PgStore {
    async fn insert_inquiry(&self, inquiry: NewInquiry) -> Result<Inquiry, DatabaseError> {
        let sql = format!(
            "INSERT INTO inquiries (id, client_id, category, date, budget, city, description, \
             reference_image_url) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {}",
            INQUIRY_COLUMNS
        );
        Ok(sqlx::query_as::<_, Inquiry>(&sql)
            .bind(Uuid::new_v4())
            .bind(inquiry.client_id)
            .bind(inquiry.category.as_str())
            .bind(inquiry.date)
            .bind(inquiry.budget)
            .bind(&inquiry.city)
            .bind(&inquiry.description)
            .bind(&inquiry.reference_image_url)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn find_inquiry(&self, id: Uuid) -> Result<Option<Inquiry>, DatabaseError> {
        let sql = format!("SELECT {} FROM inquiries WHERE id = $1", INQUIRY_COLUMNS);
        Ok(sqlx::query_as::<_, Inquiry>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_inquiries_for_client(
        &self,
        client_id: Uuid,
    ) -> Result<Vec<Inquiry>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM inquiries WHERE client_id = $1 ORDER BY created_at DESC, id",
            INQUIRY_COLUMNS
        );
        Ok(sqlx::query_as::<_, Inquiry>(&sql)
            .bind(client_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn list_inquiries_for_partner(
        &self,
        partner_id: Uuid,
    ) -> Result<Vec<Inquiry>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM inquiries WHERE $1 = ANY(assigned_partners) ORDER BY created_at DESC, id",
            INQUIRY_COLUMNS
        );
        Ok(sqlx::query_as::<_, Inquiry>(&sql)
            .bind(partner_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn assign_partners(
        &self,
        id: Uuid,
        candidates: &[Uuid],
        cap: usize,
    ) -> Result<Option<Inquiry>, DatabaseError> {
        // Merged against the row version this UPDATE locks
        let sql = format!(
            "UPDATE inquiries AS i SET assigned_partners = i.assigned_partners || ARRAY( \
                 SELECT c.pid FROM unnest($2::UUID[]) WITH ORDINALITY AS c(pid, ord) \
                 WHERE NOT (c.pid = ANY(i.assigned_partners)) \
                 ORDER BY c.ord \
                 LIMIT GREATEST($3::BIGINT - cardinality(i.assigned_partners), 0) \
             ), updated_at = NOW() \
             WHERE i.id = $1 AND i.status = 'new' RETURNING {}",
            INQUIRY_COLUMNS
        );
        Ok(sqlx::query_as::<_, Inquiry>(&sql)
            .bind(id)
            .bind(candidates)
            .bind(i64::try_from(cap).unwrap_or(i64::MAX))
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update_inquiry_status(
        &self,
        id: Uuid,
        expected: InquiryStatus,
        next: InquiryStatus,
        booked_partner: Option<Uuid>,
    ) -> Result<Option<Inquiry>, DatabaseError> {
        let sql = format!(
            "UPDATE inquiries SET status = $3, booked_partner = COALESCE($4, booked_partner), \
             updated_at = NOW() WHERE id = $1 AND status = $2 RETURNING {}",
            INQUIRY_COLUMNS
        );
        Ok(sqlx::query_as::<_, Inquiry>(&sql)
            .bind(id)
            .bind(expected.as_str())
            .bind(next.as_str())
            .bind(booked_partner)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_inquiry(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM inquiries WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_inquiries(&self, status: Option<InquiryStatus>) -> Result<i64, DatabaseError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM inquiries WHERE ($1::TEXT IS NULL OR status = $1)")
                .bind(status.map(|s| s.as_str()))
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    async fn count_open_leads(
        &self,
        partner_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, i64>, DatabaseError> {
        if partner_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = sqlx::query(
            "SELECT partner_id, COUNT(*) AS open_leads \
             FROM inquiries, UNNEST(assigned_partners) AS partner_id \
             WHERE status IN ('new', 'responded') AND partner_id = ANY($1) \
             GROUP BY partner_id",
        )
        .bind(partner_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut counts = HashMap::with_capacity(rows.len());
        for row in rows {
            counts.insert(row.try_get("partner_id")?, row.try_get("open_leads")?);
        }
        Ok(counts)
    }
}

#[async_trait]
impl PortfolioRepository for PgStore {
    async fn insert_portfolio_item(
        &self,
        item: NewPortfolioItem,
    ) -> Result<PortfolioItem, DatabaseError> {
        let sql = format!(
            "INSERT INTO portfolio_items (id, partner_id, title, category, description, image_url, \
             display_order) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
            PORTFOLIO_COLUMNS
        );
        Ok(sqlx::query_as::<_, PortfolioItem>(&sql)
            .bind(Uuid::new_v4())
            .bind(item.partner_id)
            .bind(&item.title)
            .bind(item.category.as_str())
            .bind(&item.description)
            .bind(&item.image_url)
            .bind(item.display_order)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn find_portfolio_item(&self, id: Uuid) -> Result<Option<PortfolioItem>, DatabaseError> {
        let sql = format!("SELECT {} FROM portfolio_items WHERE id = $1", PORTFOLIO_COLUMNS);
        Ok(sqlx::query_as::<_, PortfolioItem>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_portfolio_items(
        &self,
        partner_id: Uuid,
    ) -> Result<Vec<PortfolioItem>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM portfolio_items WHERE partner_id = $1 \
             ORDER BY display_order ASC, created_at ASC",
            PORTFOLIO_COLUMNS
        );
        Ok(sqlx::query_as::<_, PortfolioItem>(&sql)
            .bind(partner_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn count_portfolio_items(&self, partner_id: Uuid) -> Result<i64, DatabaseError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM portfolio_items WHERE partner_id = $1")
                .bind(partner_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    async fn save_portfolio_item(
        &self,
        item: &PortfolioItem,
    ) -> Result<PortfolioItem, DatabaseError> {
        let sql = format!(
            "UPDATE portfolio_items SET title = $2, category = $3, description = $4, \
             image_url = $5, display_order = $6 WHERE id = $1 RETURNING {}",
            PORTFOLIO_COLUMNS
        );
        sqlx::query_as::<_, PortfolioItem>(&sql)
            .bind(item.id)
            .bind(&item.title)
            .bind(item.category.as_str())
            .bind(&item.description)
            .bind(&item.image_url)
            .bind(item.display_order)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("portfolio item {}", item.id)))
    }

    async fn delete_portfolio_item(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM portfolio_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ReviewRepository for PgStore {
    async fn insert_review(&self, review: NewReview) -> Result<Review, DatabaseError> {
        let sql = format!(
            "INSERT INTO reviews (id, client_id, partner_id, inquiry_id, rating, comment) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            REVIEW_COLUMNS
        );
        Ok(sqlx::query_as::<_, Review>(&sql)
            .bind(Uuid::new_v4())
            .bind(review.client_id)
            .bind(review.partner_id)
            .bind(review.inquiry_id)
            .bind(review.rating)
            .bind(&review.comment)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn find_review(&self, id: Uuid) -> Result<Option<Review>, DatabaseError> {
        let sql = format!("SELECT {} FROM reviews WHERE id = $1", REVIEW_COLUMNS);
        Ok(sqlx::query_as::<_, Review>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_reviews(&self, filter: &ReviewFilter) -> Result<Vec<Review>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM reviews WHERE ($1::BOOLEAN IS NULL OR is_approved = $1) \
             AND ($2::UUID IS NULL OR partner_id = $2) ORDER BY created_at DESC, id",
            REVIEW_COLUMNS
        );
        Ok(sqlx::query_as::<_, Review>(&sql)
            .bind(filter.approved)
            .bind(filter.partner_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn save_review(&self, review: &Review) -> Result<Review, DatabaseError> {
        let sql = format!(
            "UPDATE reviews SET rating = $2, comment = $3, is_approved = $4 WHERE id = $1 RETURNING {}",
            REVIEW_COLUMNS
        );
        sqlx::query_as::<_, Review>(&sql)
            .bind(review.id)
            .bind(review.rating)
            .bind(&review.comment)
            .bind(review.is_approved)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("review {}", review.id)))
    }

    async fn delete_review(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_reviews(&self, approved: Option<bool>) -> Result<i64, DatabaseError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM reviews WHERE ($1::BOOLEAN IS NULL OR is_approved = $1)",
        )
        .bind(approved)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
