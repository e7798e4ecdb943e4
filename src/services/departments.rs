use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set,
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
        department::{
            ActiveModel as DepartmentActiveModel, Column, Entity as DepartmentEntity,
            Model as DepartmentModel,
        },
        user::{Column as UserColumn, Entity as UserEntity},
    },
    errors::ServiceError,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct DepartmentInput {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DepartmentResponse {
    pub id: Uuid,
    pub name: String,
}

impl From<DepartmentModel> for DepartmentResponse {
    fn from(model: DepartmentModel) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

#[derive(Clone)]
pub struct DepartmentService {
    db: Arc<DbPool>,
}

impl DepartmentService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, input), fields(company_id = %actor.company_id))]
    pub async fn create_department(
        &self,
        actor: &AuthUser,
        input: DepartmentInput,
    ) -> Result<DepartmentResponse, ServiceError> {
        policy::authorize(actor.role, Action::ManageDepartments)?;
        input.validate()?;

        let model = DepartmentActiveModel {
            id: Set(Uuid::new_v4()),
            company_id: Set(actor.company_id),
            name: Set(input.name),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await?;

        info!(department_id = %model.id, "Department created");
        Ok(model.into())
    }

    pub async fn list_departments(
        &self,
        actor: &AuthUser,
    ) -> Result<Vec<DepartmentResponse>, ServiceError> {
        policy::authorize(actor.role, Action::ViewOrganization)?;
        let departments = DepartmentEntity::find()
            .filter(Column::CompanyId.eq(actor.company_id))
            .order_by_asc(Column::Name)
            .all(&*self.db)
            .await?
            .into_iter()
            .map(DepartmentResponse::from)
            .collect();
        Ok(departments)
    }

    #[instrument(skip(self), fields(department_id = %department_id))]
    pub async fn rename_department(
        &self,
        actor: &AuthUser,
        department_id: Uuid,
        input: DepartmentInput,
    ) -> Result<DepartmentResponse, ServiceError> {
        policy::authorize(actor.role, Action::ManageDepartments)?;
        input.validate()?;

        let model = self.find_scoped(actor, department_id).await?;
        let mut active: DepartmentActiveModel = model.into();
        active.name = Set(input.name);
        Ok(active.update(&*self.db).await?.into())
    }

    /// Deletes a department. Refused while users still belong to it.
    #[instrument(skip(self), fields(department_id = %department_id))]
    pub async fn delete_department(
        &self,
        actor: &AuthUser,
        department_id: Uuid,
    ) -> Result<(), ServiceError> {
        policy::authorize(actor.role, Action::ManageDepartments)?;

        let model = self.find_scoped(actor, department_id).await?;
        let member = UserEntity::find()
            .filter(UserColumn::DepartmentId.eq(department_id))
            .one(&*self.db)
            .await?;
        if member.is_some() {
            return Err(ServiceError::ValidationError(
                "Department still has users assigned".to_string(),
            ));
        }

        model.delete(&*self.db).await?;
        Ok(())
    }

    async fn find_scoped(
        &self,
        actor: &AuthUser,
        department_id: Uuid,
    ) -> Result<DepartmentModel, ServiceError> {
        DepartmentEntity::find_by_id(department_id)
            .filter(Column::CompanyId.eq(actor.company_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Department {} not found", department_id))
            })
    }
}
