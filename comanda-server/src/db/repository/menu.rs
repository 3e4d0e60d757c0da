//! Menu Repository (categories + items)

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{Category, CategoryCreate, MenuItem, MenuItemCreate, MenuItemUpdate};
use shared::util::now_millis;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const CATEGORY_TABLE: &str = "category";
const ITEM_TABLE: &str = "menu_item";

#[derive(Clone)]
pub struct MenuRepository {
    base: BaseRepository,
}

impl MenuRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    // ========================================================================
    // Categories
    // ========================================================================

    pub async fn find_categories(&self) -> RepoResult<Vec<Category>> {
        let categories: Vec<Category> = self
            .base
            .db()
            .query("SELECT * FROM category WHERE is_active = true ORDER BY display_order, name")
            .await?
            .take(0)?;
        Ok(categories)
    }

    pub async fn find_category(&self, id: &str) -> RepoResult<Option<Category>> {
        let thing = parse_record_id(id, CATEGORY_TABLE)?;
        let category: Option<Category> = self.base.db().select(thing).await?;
        Ok(category)
    }

    pub async fn create_category(&self, data: CategoryCreate) -> RepoResult<Category> {
        let category = Category {
            id: None,
            name: data.name,
            description: data.description,
            display_order: data.display_order.unwrap_or(0),
            is_active: true,
        };
        let created: Option<Category> = self
            .base
            .db()
            .create(CATEGORY_TABLE)
            .content(category)
            .await?;
        created.ok_or_else(|| RepoError::Database("Failed to create category".to_string()))
    }

    // ========================================================================
    // Menu Items
    // ========================================================================

    /// All menu items (admin view)
    pub async fn find_items(&self) -> RepoResult<Vec<MenuItem>> {
        let items: Vec<MenuItem> = self
            .base
            .db()
            .query("SELECT * FROM menu_item ORDER BY category, name")
            .await?
            .take(0)?;
        Ok(items)
    }

    /// Currently orderable items
    pub async fn find_available_items(&self) -> RepoResult<Vec<MenuItem>> {
        let items: Vec<MenuItem> = self
            .base
            .db()
            .query("SELECT * FROM menu_item WHERE is_available = true ORDER BY category, name")
            .await?
            .take(0)?;
        Ok(items)
    }

    pub async fn find_item(&self, id: &str) -> RepoResult<Option<MenuItem>> {
        let thing = parse_record_id(id, ITEM_TABLE)?;
        let item: Option<MenuItem> = self.base.db().select(thing).await?;
        Ok(item)
    }

    pub async fn create_item(&self, data: MenuItemCreate) -> RepoResult<MenuItem> {
        let category = parse_record_id(&data.category_id, CATEGORY_TABLE)?;
        let item = MenuItem {
            id: None,
            name: data.name,
            description: data.description,
            price: data.price,
            category,
            is_available: true,
            created_at: now_millis(),
        };
        let created: Option<MenuItem> =
            self.base.db().create(ITEM_TABLE).content(item).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create menu item".to_string()))
    }

    pub async fn update_item(&self, id: &str, data: MenuItemUpdate) -> RepoResult<MenuItem> {
        let thing = parse_record_id(id, ITEM_TABLE)?;
        let existing = self
            .find_item(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Menu item {} not found", id)))?;

        let category = match data.category_id {
            Some(ref cid) => parse_record_id(cid, CATEGORY_TABLE)?,
            None => existing.category,
        };
        let name = data.name.unwrap_or(existing.name);
        let description = data.description.or(existing.description);
        let price = data.price.unwrap_or(existing.price);
        let is_available = data.is_available.unwrap_or(existing.is_available);

        let mut result = self
            .base
            .db()
            .query("UPDATE $thing SET name = $name, description = $description, price = $price, category = $category, is_available = $is_available RETURN AFTER")
            .bind(("thing", thing))
            .bind(("name", name))
            .bind(("description", description))
            .bind(("price", price))
            .bind(("category", category))
            .bind(("is_available", is_available))
            .await?;
        let updated: Vec<MenuItem> = result.take(0)?;
        updated
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Menu item {} not found", id)))
    }

    pub async fn delete_item(&self, id: &str) -> RepoResult<bool> {
        let thing = parse_record_id(id, ITEM_TABLE)?;
        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", thing))
            .await?;
        Ok(true)
    }
}
