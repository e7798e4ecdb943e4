use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{
        policy::{self, Action},
        AuthService, AuthUser,
    },
    db::DbPool,
    entities::user::{
        ActiveModel as UserActiveModel, Column, Entity as UserEntity, Model as UserModel, UserRole,
    },
    errors::ServiceError,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserInput {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Valid email is required"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    pub role: UserRole,
    pub department_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUserInput {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub role: Option<UserRole>,
    pub department_id: Option<Uuid>,
    pub active: Option<bool>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UserFilters {
    pub role: Option<UserRole>,
    pub department_id: Option<Uuid>,
    pub active: Option<bool>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

/// User payload without the password hash.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub department_id: Option<Uuid>,
    pub active: bool,
}

impl From<UserModel> for UserResponse {
    fn from(model: UserModel) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            role: model.role,
            department_id: model.department_id,
            active: model.active,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserListResponse {
    pub users: Vec<UserResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

#[derive(Clone)]
pub struct UserService {
    db: Arc<DbPool>,
    auth: Arc<AuthService>,
}

impl UserService {
    pub fn new(db: Arc<DbPool>, auth: Arc<AuthService>) -> Self {
        Self { db, auth }
    }

    #[instrument(skip(self, input), fields(company_id = %actor.company_id))]
    pub async fn create_user(
        &self,
        actor: &AuthUser,
        input: CreateUserInput,
    ) -> Result<UserResponse, ServiceError> {
        policy::authorize(actor.role, Action::ManageUsers)?;
        input.validate()?;

        let existing = UserEntity::find()
            .filter(Column::Email.eq(input.email.clone()))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::ValidationError(
                "Email address is already registered".to_string(),
            ));
        }

        let password_hash = self
            .auth
            .hash_password(&input.password)
            .map_err(|e| ServiceError::InternalError(e.to_string()))?;

        let now = Utc::now();
        let model = UserActiveModel {
            id: Set(Uuid::new_v4()),
            company_id: Set(actor.company_id),
            department_id: Set(input.department_id),
            name: Set(input.name),
            email: Set(input.email),
            password_hash: Set(password_hash),
            role: Set(input.role),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await?;

        info!(user_id = %model.id, role = %model.role, "User created");
        Ok(model.into())
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn get_user(
        &self,
        actor: &AuthUser,
        user_id: Uuid,
    ) -> Result<UserResponse, ServiceError> {
        policy::authorize(actor.role, Action::ManageUsers)?;
        Ok(self.find_scoped(actor, user_id).await?.into())
    }

    #[instrument(skip(self, filters), fields(company_id = %actor.company_id))]
    pub async fn list_users(
        &self,
        actor: &AuthUser,
        filters: UserFilters,
    ) -> Result<UserListResponse, ServiceError> {
        policy::authorize(actor.role, Action::ManageUsers)?;

        let page = filters.page.unwrap_or(1).max(1);
        let per_page = filters.per_page.unwrap_or(20).clamp(1, 100);

        let mut condition = Condition::all().add(Column::CompanyId.eq(actor.company_id));
        if let Some(role) = filters.role {
            condition = condition.add(Column::Role.eq(role));
        }
        if let Some(department_id) = filters.department_id {
            condition = condition.add(Column::DepartmentId.eq(department_id));
        }
        if let Some(active) = filters.active {
            condition = condition.add(Column::Active.eq(active));
        }

        let db = &*self.db;
        let total = UserEntity::find().filter(condition.clone()).count(db).await?;
        let users = UserEntity::find()
            .filter(condition)
            .order_by_asc(Column::Name)
            .offset((page - 1) * per_page)
            .limit(per_page)
            .all(db)
            .await?
            .into_iter()
            .map(UserResponse::from)
            .collect();

        Ok(UserListResponse {
            users,
            total,
            page,
            per_page,
        })
    }

    #[instrument(skip(self, input), fields(user_id = %user_id))]
    pub async fn update_user(
        &self,
        actor: &AuthUser,
        user_id: Uuid,
        input: UpdateUserInput,
    ) -> Result<UserResponse, ServiceError> {
        policy::authorize(actor.role, Action::ManageUsers)?;
        input.validate()?;

        let model = self.find_scoped(actor, user_id).await?;

        // An admin demoting or deactivating themselves could lock the tenant
        // out entirely.
        if user_id == actor.user_id {
            let demoted = matches!(input.role, Some(role) if role != UserRole::Admin);
            if demoted || input.active == Some(false) {
                return Err(ServiceError::ValidationError(
                    "Administrators cannot demote or deactivate themselves".to_string(),
                ));
            }
        }

        let mut active_model: UserActiveModel = model.into();
        if let Some(name) = input.name {
            active_model.name = Set(name);
        }
        if let Some(role) = input.role {
            active_model.role = Set(role);
        }
        if let Some(department_id) = input.department_id {
            active_model.department_id = Set(Some(department_id));
        }
        if let Some(active) = input.active {
            active_model.active = Set(active);
        }
        active_model.updated_at = Set(Utc::now());

        let updated = active_model.update(&*self.db).await?;
        Ok(updated.into())
    }

    async fn find_scoped(
        &self,
        actor: &AuthUser,
        user_id: Uuid,
    ) -> Result<UserModel, ServiceError> {
        UserEntity::find_by_id(user_id)
            .filter(Column::CompanyId.eq(actor.company_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", user_id)))
    }
}
