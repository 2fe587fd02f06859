use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use super::ServiceError;
use crate::database::models::{NewPortfolioItem, Partner, PortfolioItem, PortfolioUpdate};
use crate::database::Store;
use crate::types::ServiceCategory;
use crate::validation;

const TITLE_MAX: usize = 100;
const DESCRIPTION_MAX: usize = 200;
const URL_MAX: usize = 2048;

#[derive(Debug, Clone)]
pub struct PortfolioInput {
    pub title: String,
    pub category: ServiceCategory,
    pub description: Option<String>,
    pub image_url: String,
}

/// Partner-owned portfolio entries
pub struct PortfolioService {
    store: Arc<dyn Store>,
}

impl PortfolioService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Append an item; it takes the next display position
    pub async fn add(&self, user_id: Uuid, input: PortfolioInput) -> Result<PortfolioItem, ServiceError> {
        let partner = self.partner(user_id).await?;
        let count = self.store.count_portfolio_items(partner.id).await?;

        let item = NewPortfolioItem {
            partner_id: partner.id,
            title: validation::required_text("title", &input.title, TITLE_MAX)?,
            category: input.category,
            description: validation::optional_text(
                "description",
                input.description.as_deref(),
                DESCRIPTION_MAX,
            )?,
            image_url: validation::required_text("imageUrl", &input.image_url, URL_MAX)?,
            display_order: i32::try_from(count + 1).unwrap_or(i32::MAX),
        };

        let saved = self.store.insert_portfolio_item(item).await?;
        info!(partner_id = %partner.id, item_id = %saved.id, display_order = saved.display_order, "Portfolio item added");
        Ok(saved)
    }

    pub async fn list(&self, user_id: Uuid) -> Result<Vec<PortfolioItem>, ServiceError> {
        let partner = self.partner(user_id).await?;
        Ok(self.store.list_portfolio_items(partner.id).await?)
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        item_id: Uuid,
        update: PortfolioUpdate,
    ) -> Result<PortfolioItem, ServiceError> {
        let mut item = self.owned_item(user_id, item_id, "update").await?;

        let update = PortfolioUpdate {
            title: update
                .title
                .map(|t| validation::required_text("title", &t, TITLE_MAX))
                .transpose()?,
            category: update.category,
            description: match update.description {
                Some(d) => validation::optional_text("description", Some(&d), DESCRIPTION_MAX)?,
                None => None,
            },
            image_url: update
                .image_url
                .map(|u| validation::required_text("imageUrl", &u, URL_MAX))
                .transpose()?,
        };
        update.apply(&mut item);

        Ok(self.store.save_portfolio_item(&item).await?)
    }

    pub async fn delete(&self, user_id: Uuid, item_id: Uuid) -> Result<(), ServiceError> {
        let item = self.owned_item(user_id, item_id, "delete").await?;
        if !self.store.delete_portfolio_item(item.id).await? {
            return Err(ServiceError::NotFound("Portfolio item"));
        }
        info!(item_id = %item.id, partner_id = %item.partner_id, "Portfolio item deleted");
        Ok(())
    }

    async fn partner(&self, user_id: Uuid) -> Result<Partner, ServiceError> {
        self.store
            .find_partner_by_user(user_id)
            .await?
            .ok_or(ServiceError::NotFound("Partner profile"))
    }

    async fn owned_item(
        &self,
        user_id: Uuid,
        item_id: Uuid,
        action: &str,
    ) -> Result<PortfolioItem, ServiceError> {
        let partner = self.partner(user_id).await?;
        let item = self
            .store
            .find_portfolio_item(item_id)
            .await?
            .ok_or(ServiceError::NotFound("Portfolio item"))?;
        if item.partner_id != partner.id {
            return Err(ServiceError::Forbidden(format!(
                "Not authorized to {} this portfolio item",
                action
            )));
        }
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{NewPartner, NewUser};
    use crate::database::{MemoryStore, PartnerRepository, UserRepository};
    use crate::types::Role;

    async fn partner_user(store: &MemoryStore) -> Uuid {
        let user = store
            .insert_user(NewUser {
                name: "Kabir".to_string(),
                email: format!("{}@example.com", Uuid::new_v4()),
                phone: "9222222222".to_string(),
                password_hash: "x".to_string(),
                role: Role::Partner,
            })
            .await
            .unwrap();
        store
            .insert_partner(NewPartner {
                user_id: user.id,
                business_name: "Kabir Frames".to_string(),
                services: vec![ServiceCategory::Product],
                city: "Jaipur".to_string(),
                about: None,
                aadhar_number: "123456789012".to_string(),
                portfolio_urls: vec![],
            })
            .await
            .unwrap();
        user.id
    }

    fn shot(title: &str) -> PortfolioInput {
        PortfolioInput {
            title: title.to_string(),
            category: ServiceCategory::Product,
            description: None,
            image_url: format!("https://img.example.com/{}.jpg", title),
        }
    }

    #[tokio::test]
    async fn items_are_appended_in_order() {
        let store = Arc::new(MemoryStore::new());
        let service = PortfolioService::new(store.clone());
        let user_id = partner_user(&store).await;

        for title in ["first", "second", "third"] {
            service.add(user_id, shot(title)).await.unwrap();
        }

        let items = service.list(user_id).await.unwrap();
        let orders: Vec<i32> = items.iter().map(|i| i.display_order).collect();
        let titles: Vec<&str> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(orders, vec![1, 2, 3]);
        assert_eq!(titles, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn only_the_owner_may_edit() {
        let store = Arc::new(MemoryStore::new());
        let service = PortfolioService::new(store.clone());
        let owner = partner_user(&store).await;
        let other = partner_user(&store).await;
        let item = service.add(owner, shot("bottle")).await.unwrap();

        let err = service
            .update(other, item.id, PortfolioUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
        assert!(matches!(
            service.delete(other, item.id).await,
            Err(ServiceError::Forbidden(_))
        ));

        let updated = service
            .update(
                owner,
                item.id,
                PortfolioUpdate {
                    title: Some("Perfume bottle".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "Perfume bottle");
        assert_eq!(updated.display_order, 1);

        service.delete(owner, item.id).await.unwrap();
        assert!(service.list(owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn description_is_limited() {
        let store = Arc::new(MemoryStore::new());
        let service = PortfolioService::new(store.clone());
        let user_id = partner_user(&store).await;

        let long = PortfolioInput {
            description: Some("d".repeat(201)),
            ..shot("long")
        };
        assert!(matches!(
            service.add(user_id, long).await,
            Err(ServiceError::Validation(_))
        ));
    }
}
