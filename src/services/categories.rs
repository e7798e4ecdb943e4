use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{
        policy::{self, Action},
        AuthUser,
    },
    db::DbPool,
    entities::{
        equipment_category::{
            ActiveModel as CategoryActiveModel, Column, Entity as CategoryEntity,
            Model as CategoryModel,
        },
        equipment::{Column as EquipmentColumn, Entity as EquipmentEntity},
        team::{Column as TeamColumn, Entity as TeamEntity},
    },
    errors::ServiceError,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CategoryInput {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,
    /// Team that handles maintenance for equipment in this category.
    pub responsible_team_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub responsible_team_id: Option<Uuid>,
}

impl From<CategoryModel> for CategoryResponse {
    fn from(model: CategoryModel) -> Self {
        Self {
            id: model.id,
            name: model.name,
            responsible_team_id: model.responsible_team_id,
        }
    }
}

#[derive(Clone)]
pub struct CategoryService {
    db: Arc<DbPool>,
}

impl CategoryService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, input), fields(company_id = %actor.company_id))]
    pub async fn create_category(
        &self,
        actor: &AuthUser,
        input: CategoryInput,
    ) -> Result<CategoryResponse, ServiceError> {
        policy::authorize(actor.role, Action::ManageCategories)?;
        input.validate()?;
        self.check_team(actor, input.responsible_team_id).await?;

        let model = CategoryActiveModel {
            id: Set(Uuid::new_v4()),
            company_id: Set(actor.company_id),
            name: Set(input.name),
            responsible_team_id: Set(input.responsible_team_id),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await?;

        info!(category_id = %model.id, "Equipment category created");
        Ok(model.into())
    }

    pub async fn list_categories(
        &self,
        actor: &AuthUser,
    ) -> Result<Vec<CategoryResponse>, ServiceError> {
        policy::authorize(actor.role, Action::ViewOrganization)?;
        let categories = CategoryEntity::find()
            .filter(Column::CompanyId.eq(actor.company_id))
            .order_by_asc(Column::Name)
            .all(&*self.db)
            .await?
            .into_iter()
            .map(CategoryResponse::from)
            .collect();
        Ok(categories)
    }

    #[instrument(skip(self, input), fields(category_id = %category_id))]
    pub async fn update_category(
        &self,
        actor: &AuthUser,
        category_id: Uuid,
        input: CategoryInput,
    ) -> Result<CategoryResponse, ServiceError> {
        policy::authorize(actor.role, Action::ManageCategories)?;
        input.validate()?;
        self.check_team(actor, input.responsible_team_id).await?;

        let model = CategoryEntity::find_by_id(category_id)
            .filter(Column::CompanyId.eq(actor.company_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Category {} not found", category_id))
            })?;

        let mut active: CategoryActiveModel = model.into();
        active.name = Set(input.name);
        active.responsible_team_id = Set(input.responsible_team_id);
        Ok(active.update(&*self.db).await?.into())
    }

    #[instrument(skip(self), fields(category_id = %category_id))]
    pub async fn delete_category(
        &self,
        actor: &AuthUser,
        category_id: Uuid,
    ) -> Result<(), ServiceError> {
        policy::authorize(actor.role, Action::ManageCategories)?;

        let model = CategoryEntity::find_by_id(category_id)
            .filter(Column::CompanyId.eq(actor.company_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Category {} not found", category_id))
            })?;

        let in_use = EquipmentEntity::find()
            .filter(EquipmentColumn::CategoryId.eq(category_id))
            .count(&*self.db)
            .await?;
        if in_use > 0 {
            return Err(ServiceError::ValidationError(
                "Category still has equipment assigned to it".to_string(),
            ));
        }

        model.delete(&*self.db).await?;
        info!(category_id = %category_id, "Equipment category deleted");
        Ok(())
    }

    async fn check_team(
        &self,
        actor: &AuthUser,
        team_id: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        if let Some(team_id) = team_id {
            TeamEntity::find_by_id(team_id)
                .filter(TeamColumn::CompanyId.eq(actor.company_id))
                .one(&*self.db)
                .await?
                .ok_or_else(|| ServiceError::NotFound(format!("Team {} not found", team_id)))?;
        }
        Ok(())
    }
}
