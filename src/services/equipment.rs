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
        AuthUser,
    },
    db::DbPool,
    entities::equipment::{
        ActiveModel as EquipmentActiveModel, Column, Entity as EquipmentEntity, EquipmentStatus,
        Model as EquipmentModel, CRITICAL_HEALTH_THRESHOLD,
    },
    entities::{department, equipment_category, team, user},
    errors::ServiceError,
    events::{Event, EventSender},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateEquipmentInput {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,
    pub serial_number: Option<String>,
    /// Health percentage, defaults to 100.
    #[validate(range(min = 0, max = 100))]
    pub health: Option<i32>,
    pub owner_id: Option<Uuid>,
    pub technician_id: Option<Uuid>,
    pub maintenance_team_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateEquipmentInput {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub serial_number: Option<String>,
    #[validate(range(min = 0, max = 100))]
    pub health: Option<i32>,
    /// Only `active` and `under_maintenance` are accepted here; scrapping is
    /// a separate explicit action.
    pub status: Option<EquipmentStatus>,
    pub owner_id: Option<Uuid>,
    pub technician_id: Option<Uuid>,
    pub maintenance_team_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct EquipmentFilters {
    pub status: Option<EquipmentStatus>,
    pub category_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    #[serde(default)]
    pub critical_only: bool,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EquipmentResponse {
    pub id: Uuid,
    pub name: String,
    pub serial_number: Option<String>,
    pub health: i32,
    pub status: EquipmentStatus,
    pub owner_id: Option<Uuid>,
    pub technician_id: Option<Uuid>,
    pub maintenance_team_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub is_critical: bool,
    pub scrapped_at: Option<chrono::DateTime<Utc>>,
}

impl From<EquipmentModel> for EquipmentResponse {
    fn from(model: EquipmentModel) -> Self {
        let is_critical = model.is_critical();
        Self {
            id: model.id,
            name: model.name,
            serial_number: model.serial_number,
            health: model.health,
            status: model.status,
            owner_id: model.owner_id,
            technician_id: model.technician_id,
            maintenance_team_id: model.maintenance_team_id,
            category_id: model.category_id,
            department_id: model.department_id,
            is_critical,
            scrapped_at: model.scrapped_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EquipmentListResponse {
    pub equipment: Vec<EquipmentResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Equipment catalog: CRUD, health tracking and the explicit scrap action.
#[derive(Clone)]
pub struct EquipmentService {
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl EquipmentService {
    pub fn new(db: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, input), fields(company_id = %actor.company_id))]
    pub async fn create_equipment(
        &self,
        actor: &AuthUser,
        input: CreateEquipmentInput,
    ) -> Result<EquipmentResponse, ServiceError> {
        policy::authorize(actor.role, Action::ManageEquipment)?;
        input.validate()?;
        self.check_references(
            actor,
            [input.owner_id, input.technician_id],
            input.maintenance_team_id,
            input.category_id,
            input.department_id,
        )
        .await?;

        let now = Utc::now();
        let active = EquipmentActiveModel {
            id: Set(Uuid::new_v4()),
            company_id: Set(actor.company_id),
            name: Set(input.name),
            serial_number: Set(input.serial_number),
            health: Set(input.health.unwrap_or(100)),
            status: Set(EquipmentStatus::Active),
            owner_id: Set(input.owner_id),
            technician_id: Set(input.technician_id),
            maintenance_team_id: Set(input.maintenance_team_id),
            category_id: Set(input.category_id),
            department_id: Set(input.department_id),
            scrapped_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active.insert(&*self.db).await?;
        info!(equipment_id = %model.id, "Equipment created");
        Ok(model.into())
    }

    #[instrument(skip(self), fields(equipment_id = %equipment_id))]
    pub async fn get_equipment(
        &self,
        actor: &AuthUser,
        equipment_id: Uuid,
    ) -> Result<EquipmentResponse, ServiceError> {
        policy::authorize(actor.role, Action::ViewEquipment)?;
        Ok(self.find_scoped(actor, equipment_id).await?.into())
    }

    #[instrument(skip(self, filters), fields(company_id = %actor.company_id))]
    pub async fn list_equipment(
        &self,
        actor: &AuthUser,
        filters: EquipmentFilters,
    ) -> Result<EquipmentListResponse, ServiceError> {
        policy::authorize(actor.role, Action::ViewEquipment)?;

        let page = filters.page.unwrap_or(1).max(1);
        let per_page = filters.per_page.unwrap_or(20).clamp(1, 100);

        let mut condition = Condition::all().add(Column::CompanyId.eq(actor.company_id));
        if let Some(status) = filters.status {
            condition = condition.add(Column::Status.eq(status));
        }
        if let Some(category_id) = filters.category_id {
            condition = condition.add(Column::CategoryId.eq(category_id));
        }
        if let Some(department_id) = filters.department_id {
            condition = condition.add(Column::DepartmentId.eq(department_id));
        }
        if filters.critical_only {
            condition = condition
                .add(Column::Health.lt(CRITICAL_HEALTH_THRESHOLD))
                .add(Column::Status.ne(EquipmentStatus::Scrapped));
        }

        let db = &*self.db;
        let total = EquipmentEntity::find()
            .filter(condition.clone())
            .count(db)
            .await?;

        let equipment = EquipmentEntity::find()
            .filter(condition)
            .order_by_asc(Column::Name)
            .offset((page - 1) * per_page)
            .limit(per_page)
            .all(db)
            .await?
            .into_iter()
            .map(EquipmentResponse::from)
            .collect();

        Ok(EquipmentListResponse {
            equipment,
            total,
            page,
            per_page,
        })
    }

    #[instrument(skip(self, input), fields(equipment_id = %equipment_id))]
    pub async fn update_equipment(
        &self,
        actor: &AuthUser,
        equipment_id: Uuid,
        input: UpdateEquipmentInput,
    ) -> Result<EquipmentResponse, ServiceError> {
        policy::authorize(actor.role, Action::ManageEquipment)?;
        input.validate()?;
        self.check_references(
            actor,
            [input.owner_id, input.technician_id],
            input.maintenance_team_id,
            input.category_id,
            input.department_id,
        )
        .await?;

        if input.status == Some(EquipmentStatus::Scrapped) {
            return Err(ServiceError::ValidationError(
                "Scrapping equipment is a separate explicit action".to_string(),
            ));
        }

        let model = self.find_scoped(actor, equipment_id).await?;
        if model.status == EquipmentStatus::Scrapped {
            return Err(ServiceError::ValidationError(
                "Scrapped equipment cannot be updated".to_string(),
            ));
        }

        let mut active: EquipmentActiveModel = model.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(serial_number) = input.serial_number {
            active.serial_number = Set(Some(serial_number));
        }
        if let Some(health) = input.health {
            active.health = Set(health);
        }
        if let Some(status) = input.status {
            active.status = Set(status);
        }
        if let Some(owner_id) = input.owner_id {
            active.owner_id = Set(Some(owner_id));
        }
        if let Some(technician_id) = input.technician_id {
            active.technician_id = Set(Some(technician_id));
        }
        if let Some(maintenance_team_id) = input.maintenance_team_id {
            active.maintenance_team_id = Set(Some(maintenance_team_id));
        }
        if let Some(category_id) = input.category_id {
            active.category_id = Set(Some(category_id));
        }
        if let Some(department_id) = input.department_id {
            active.department_id = Set(Some(department_id));
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(&*self.db).await?;
        Ok(updated.into())
    }

    /// Marks equipment as scrapped. Terminal for maintenance purposes; the
    /// row is never deleted. Scrapping twice is a no-op.
    #[instrument(skip(self), fields(equipment_id = %equipment_id))]
    pub async fn scrap_equipment(
        &self,
        actor: &AuthUser,
        equipment_id: Uuid,
    ) -> Result<EquipmentResponse, ServiceError> {
        policy::authorize(actor.role, Action::ScrapEquipment)?;

        let model = self.find_scoped(actor, equipment_id).await?;
        if model.status == EquipmentStatus::Scrapped {
            return Ok(model.into());
        }

        let now = Utc::now();
        let mut active: EquipmentActiveModel = model.into();
        active.status = Set(EquipmentStatus::Scrapped);
        active.scrapped_at = Set(Some(now));
        active.updated_at = Set(now);

        let updated = active.update(&*self.db).await?;
        info!(equipment_id = %equipment_id, "Equipment scrapped");

        self.event_sender
            .send(Event::EquipmentScrapped {
                equipment_id,
                scrapped_at: now,
            })
            .await;

        Ok(updated.into())
    }

    /// Verifies that every supplied reference resolves inside the actor's
    /// company; a foreign or unknown id surfaces as `NotFound`.
    async fn check_references(
        &self,
        actor: &AuthUser,
        user_ids: [Option<Uuid>; 2],
        maintenance_team_id: Option<Uuid>,
        category_id: Option<Uuid>,
        department_id: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        let db = &*self.db;
        for user_id in user_ids.into_iter().flatten() {
            user::Entity::find_by_id(user_id)
                .filter(user::Column::CompanyId.eq(actor.company_id))
                .one(db)
                .await?
                .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", user_id)))?;
        }
        if let Some(team_id) = maintenance_team_id {
            team::Entity::find_by_id(team_id)
                .filter(team::Column::CompanyId.eq(actor.company_id))
                .one(db)
                .await?
                .ok_or_else(|| ServiceError::NotFound(format!("Team {} not found", team_id)))?;
        }
        if let Some(category_id) = category_id {
            equipment_category::Entity::find_by_id(category_id)
                .filter(equipment_category::Column::CompanyId.eq(actor.company_id))
                .one(db)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Category {} not found", category_id))
                })?;
        }
        if let Some(department_id) = department_id {
            department::Entity::find_by_id(department_id)
                .filter(department::Column::CompanyId.eq(actor.company_id))
                .one(db)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Department {} not found", department_id))
                })?;
        }
        Ok(())
    }

    async fn find_scoped(
        &self,
        actor: &AuthUser,
        equipment_id: Uuid,
    ) -> Result<EquipmentModel, ServiceError> {
        EquipmentEntity::find_by_id(equipment_id)
            .filter(Column::CompanyId.eq(actor.company_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Equipment {} not found", equipment_id)))
    }
}
