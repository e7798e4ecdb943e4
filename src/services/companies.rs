use std::sync::Arc;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::AuthService,
    db::DbPool,
    entities::{
        company::{ActiveModel as CompanyActiveModel, Entity as CompanyEntity},
        user::{
            ActiveModel as UserActiveModel, Column as UserColumn, Entity as UserEntity, UserRole,
        },
    },
    errors::ServiceError,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterCompanyInput {
    #[validate(length(min = 1, max = 200, message = "Company name is required"))]
    pub company_name: String,
    #[validate(length(min = 1, max = 200, message = "Administrator name is required"))]
    pub admin_name: String,
    #[validate(email(message = "Valid administrator email is required"))]
    pub admin_email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub admin_password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterCompanyResponse {
    pub company_id: Uuid,
    pub company_name: String,
    pub admin_user_id: Uuid,
}

/// Tenant onboarding: creates a company together with its first admin user
/// in one transaction. This is the only unauthenticated write in the API.
#[derive(Clone)]
pub struct CompanyService {
    db: Arc<DbPool>,
    auth: Arc<AuthService>,
}

impl CompanyService {
    pub fn new(db: Arc<DbPool>, auth: Arc<AuthService>) -> Self {
        Self { db, auth }
    }

    #[instrument(skip(self, input))]
    pub async fn register(
        &self,
        input: RegisterCompanyInput,
    ) -> Result<RegisterCompanyResponse, ServiceError> {
        input.validate()?;

        let existing = UserEntity::find()
            .filter(UserColumn::Email.eq(input.admin_email.clone()))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::ValidationError(
                "Email address is already registered".to_string(),
            ));
        }

        let password_hash = self
            .auth
            .hash_password(&input.admin_password)
            .map_err(|e| ServiceError::InternalError(e.to_string()))?;

        let now = Utc::now();
        let company_id = Uuid::new_v4();
        let admin_user_id = Uuid::new_v4();
        let company_name = input.company_name.clone();

        let txn = self.db.begin().await?;

        CompanyActiveModel {
            id: Set(company_id),
            name: Set(input.company_name),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        UserActiveModel {
            id: Set(admin_user_id),
            company_id: Set(company_id),
            department_id: Set(None),
            name: Set(input.admin_name),
            email: Set(input.admin_email),
            password_hash: Set(password_hash),
            role: Set(UserRole::Admin),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        info!(company_id = %company_id, "Company registered");

        Ok(RegisterCompanyResponse {
            company_id,
            company_name,
            admin_user_id,
        })
    }

    pub async fn get_company(
        &self,
        company_id: Uuid,
    ) -> Result<crate::entities::company::Model, ServiceError> {
        CompanyEntity::find_by_id(company_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Company {} not found", company_id)))
    }
}
