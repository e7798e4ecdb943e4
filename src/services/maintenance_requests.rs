use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{
        policy::{self, Action},
        AuthUser,
    },
    db::DbPool,
    entities::equipment::{self, EquipmentStatus},
    entities::equipment_category,
    entities::maintenance_request::{
        ActiveModel as RequestActiveModel, Column, Entity as RequestEntity,
        Model as RequestModel, RequestPriority, RequestStage, RequestType,
    },
    entities::team,
    entities::user::{self, UserRole},
    errors::ServiceError,
    events::{Event, EventSender},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRequestInput {
    #[validate(length(min = 1, max = 200, message = "Subject is required"))]
    pub subject: String,
    pub description: Option<String>,
    pub request_type: RequestType,
    pub priority: RequestPriority,
    pub equipment_id: Uuid,
    /// Mandatory for preventive requests.
    pub scheduled_date: Option<DateTime<Utc>>,
    /// Defaults to the equipment's category when omitted.
    pub category_id: Option<Uuid>,
    /// Defaults to the equipment's maintenance team when omitted.
    pub team_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct TransitionPayload {
    /// Hours spent; required when moving to `repaired`.
    pub duration_hours: Option<f64>,
    pub notes: Option<String>,
    /// Optimistic concurrency guard: when set, the transition is rejected
    /// with `Conflict` if the request has moved past this version.
    pub expected_version: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignTechnicianInput {
    /// `None` clears the assignment (managers only).
    pub technician_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RequestFilters {
    pub stage: Option<RequestStage>,
    pub request_type: Option<RequestType>,
    pub priority: Option<RequestPriority>,
    pub technician_id: Option<Uuid>,
    pub equipment_id: Option<Uuid>,
    #[serde(default)]
    pub overdue_only: bool,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

/// Request as surfaced to clients; `is_overdue` is derived at read time.
#[derive(Debug, Serialize, ToSchema)]
pub struct RequestResponse {
    pub id: Uuid,
    pub subject: String,
    pub description: Option<String>,
    pub request_type: RequestType,
    pub stage: RequestStage,
    pub priority: RequestPriority,
    pub request_date: DateTime<Utc>,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub start_date: Option<DateTime<Utc>>,
    pub completion_date: Option<DateTime<Utc>>,
    pub duration_hours: Option<f64>,
    pub notes: Option<String>,
    pub equipment_id: Uuid,
    pub category_id: Option<Uuid>,
    pub team_id: Option<Uuid>,
    pub technician_id: Option<Uuid>,
    pub created_by: Uuid,
    pub is_overdue: bool,
    pub version: i32,
}

impl RequestResponse {
    pub fn from_model(model: RequestModel, now: DateTime<Utc>) -> Self {
        let is_overdue = model.is_overdue(now);
        Self {
            id: model.id,
            subject: model.subject,
            description: model.description,
            request_type: model.request_type,
            stage: model.stage,
            priority: model.priority,
            request_date: model.request_date,
            scheduled_date: model.scheduled_date,
            start_date: model.start_date,
            completion_date: model.completion_date,
            duration_hours: model.duration_hours,
            notes: model.notes,
            equipment_id: model.equipment_id,
            category_id: model.category_id,
            team_id: model.team_id,
            technician_id: model.technician_id,
            created_by: model.created_by,
            is_overdue,
            version: model.version,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RequestListResponse {
    pub requests: Vec<RequestResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Kanban board grouping: requests bucketed by lifecycle stage.
#[derive(Debug, Serialize, ToSchema)]
pub struct BoardResponse {
    pub new: Vec<RequestResponse>,
    pub in_progress: Vec<RequestResponse>,
    pub repaired: Vec<RequestResponse>,
    pub scrap: Vec<RequestResponse>,
}

/// Manages the maintenance request lifecycle: creation, stage transitions,
/// technician assignment and filtered listing. All operations are scoped to
/// the acting user's company.
#[derive(Clone)]
pub struct MaintenanceRequestService {
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl MaintenanceRequestService {
    pub fn new(db: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Creates a new request in stage `new`, auto-filling category and team
    /// from the linked equipment when not supplied.
    #[instrument(skip(self, input), fields(company_id = %actor.company_id))]
    pub async fn create_request(
        &self,
        actor: &AuthUser,
        input: CreateRequestInput,
    ) -> Result<RequestResponse, ServiceError> {
        policy::authorize(actor.role, Action::CreateRequest)?;
        input.validate()?;

        if input.request_type == RequestType::Preventive && input.scheduled_date.is_none() {
            return Err(ServiceError::ValidationError(
                "Preventive requests require a scheduled date".to_string(),
            ));
        }

        let db = &*self.db;
        let equipment = equipment::Entity::find_by_id(input.equipment_id)
            .filter(equipment::Column::CompanyId.eq(actor.company_id))
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Equipment {} not found", input.equipment_id))
            })?;

        if equipment.status == EquipmentStatus::Scrapped {
            return Err(ServiceError::ValidationError(
                "Cannot raise a maintenance request for scrapped equipment".to_string(),
            ));
        }

        // Caller-supplied overrides must resolve inside the actor's company.
        if let Some(category_id) = input.category_id {
            equipment_category::Entity::find_by_id(category_id)
                .filter(equipment_category::Column::CompanyId.eq(actor.company_id))
                .one(db)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Category {} not found", category_id))
                })?;
        }
        if let Some(team_id) = input.team_id {
            team::Entity::find_by_id(team_id)
                .filter(team::Column::CompanyId.eq(actor.company_id))
                .one(db)
                .await?
                .ok_or_else(|| ServiceError::NotFound(format!("Team {} not found", team_id)))?;
        }

        let now = Utc::now();
        let request_id = Uuid::new_v4();

        let active = RequestActiveModel {
            id: Set(request_id),
            company_id: Set(actor.company_id),
            subject: Set(input.subject),
            description: Set(input.description),
            request_type: Set(input.request_type),
            stage: Set(RequestStage::New),
            priority: Set(input.priority),
            request_date: Set(now),
            scheduled_date: Set(input.scheduled_date),
            start_date: Set(None),
            completion_date: Set(None),
            duration_hours: Set(None),
            notes: Set(None),
            equipment_id: Set(equipment.id),
            category_id: Set(input.category_id.or(equipment.category_id)),
            team_id: Set(input.team_id.or(equipment.maintenance_team_id)),
            technician_id: Set(None),
            created_by: Set(actor.user_id),
            created_at: Set(now),
            updated_at: Set(now),
            version: Set(1),
        };

        let model = active.insert(db).await?;
        info!(request_id = %model.id, "Maintenance request created");

        self.event_sender
            .send(Event::RequestCreated {
                request_id: model.id,
                company_id: actor.company_id,
            })
            .await;

        Ok(RequestResponse::from_model(model, now))
    }

    /// Fetches a single request within the actor's company.
    #[instrument(skip(self), fields(request_id = %request_id))]
    pub async fn get_request(
        &self,
        actor: &AuthUser,
        request_id: Uuid,
    ) -> Result<RequestResponse, ServiceError> {
        policy::authorize(actor.role, Action::ViewRequests)?;
        let model = self.find_scoped(actor, request_id).await?;
        Ok(RequestResponse::from_model(model, Utc::now()))
    }

    /// Filtered, paginated listing.
    #[instrument(skip(self, filters), fields(company_id = %actor.company_id))]
    pub async fn list_requests(
        &self,
        actor: &AuthUser,
        filters: RequestFilters,
    ) -> Result<RequestListResponse, ServiceError> {
        policy::authorize(actor.role, Action::ViewRequests)?;

        let page = filters.page.unwrap_or(1).max(1);
        let per_page = filters.per_page.unwrap_or(20).clamp(1, 100);
        let now = Utc::now();

        let mut condition = Condition::all().add(Column::CompanyId.eq(actor.company_id));
        if let Some(stage) = filters.stage {
            condition = condition.add(Column::Stage.eq(stage));
        }
        if let Some(request_type) = filters.request_type {
            condition = condition.add(Column::RequestType.eq(request_type));
        }
        if let Some(priority) = filters.priority {
            condition = condition.add(Column::Priority.eq(priority));
        }
        if let Some(technician_id) = filters.technician_id {
            condition = condition.add(Column::TechnicianId.eq(technician_id));
        }
        if let Some(equipment_id) = filters.equipment_id {
            condition = condition.add(Column::EquipmentId.eq(equipment_id));
        }
        if filters.overdue_only {
            condition = condition
                .add(Column::ScheduledDate.lt(now))
                .add(Column::Stage.is_in([RequestStage::New, RequestStage::InProgress]));
        }

        let db = &*self.db;
        let total = RequestEntity::find()
            .filter(condition.clone())
            .count(db)
            .await?;

        let requests = RequestEntity::find()
            .filter(condition)
            .order_by_desc(Column::RequestDate)
            .offset((page - 1) * per_page)
            .limit(per_page)
            .all(db)
            .await?
            .into_iter()
            .map(|m| RequestResponse::from_model(m, now))
            .collect();

        Ok(RequestListResponse {
            requests,
            total,
            page,
            per_page,
        })
    }

    /// Groups the company's requests by stage for the Kanban board.
    #[instrument(skip(self), fields(company_id = %actor.company_id))]
    pub async fn board(&self, actor: &AuthUser) -> Result<BoardResponse, ServiceError> {
        policy::authorize(actor.role, Action::ViewRequests)?;

        let now = Utc::now();
        let models = RequestEntity::find()
            .filter(Column::CompanyId.eq(actor.company_id))
            .order_by_desc(Column::RequestDate)
            .all(&*self.db)
            .await?;

        let mut board = BoardResponse {
            new: Vec::new(),
            in_progress: Vec::new(),
            repaired: Vec::new(),
            scrap: Vec::new(),
        };
        for model in models {
            let bucket = match model.stage {
                RequestStage::New => &mut board.new,
                RequestStage::InProgress => &mut board.in_progress,
                RequestStage::Repaired => &mut board.repaired,
                RequestStage::Scrap => &mut board.scrap,
            };
            bucket.push(RequestResponse::from_model(model, now));
        }

        Ok(board)
    }

    /// Moves a request to `target` if the lifecycle permits it.
    ///
    /// A same-stage transition is a no-op returning the unchanged request.
    /// The stage write is conditioned on the version read within the same
    /// transaction (or the caller's `expected_version` when supplied);
    /// losing a race surfaces as `Conflict` with zero rows written.
    #[instrument(skip(self, payload), fields(request_id = %request_id, target = %target))]
    pub async fn transition_stage(
        &self,
        actor: &AuthUser,
        request_id: Uuid,
        target: RequestStage,
        payload: TransitionPayload,
    ) -> Result<RequestResponse, ServiceError> {
        policy::authorize(actor.role, Action::TransitionRequest)?;

        let now = Utc::now();
        let txn = self.db.begin().await?;

        let request = RequestEntity::find_by_id(request_id)
            .filter(Column::CompanyId.eq(actor.company_id))
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Maintenance request {} not found", request_id))
            })?;

        // An explicit If-Match version takes part in the conditional write
        // below; the same-stage no-op checks it directly since nothing is
        // written in that case.
        let guard_version = payload.expected_version.unwrap_or(request.version);

        let current = request.stage;
        if current == target {
            if guard_version != request.version {
                return Err(ServiceError::Conflict(format!(
                    "Request {} changed concurrently (expected version {}, found {})",
                    request_id, guard_version, request.version
                )));
            }
            txn.commit().await?;
            return Ok(RequestResponse::from_model(request, now));
        }

        if !current.can_transition_to(target) {
            return Err(ServiceError::InvalidTransition(format!(
                "{} -> {}",
                current, target
            )));
        }

        let mut update = RequestActiveModel {
            stage: Set(target),
            updated_at: Set(now),
            version: Set(request.version + 1),
            ..Default::default()
        };

        match target {
            RequestStage::InProgress => {
                if request.start_date.is_none() {
                    update.start_date = Set(Some(now));
                }
            }
            RequestStage::Repaired => {
                let duration = payload.duration_hours.ok_or_else(|| {
                    ServiceError::ValidationError(
                        "Completing a request requires the duration in hours".to_string(),
                    )
                })?;
                if !duration.is_finite() || duration <= 0.0 {
                    return Err(ServiceError::ValidationError(
                        "Duration must be a positive number of hours".to_string(),
                    ));
                }
                update.duration_hours = Set(Some(duration));
                update.completion_date = Set(Some(now));
                if let Some(notes) = payload.notes.clone() {
                    update.notes = Set(Some(notes));
                }
            }
            RequestStage::Scrap => {
                if let Some(notes) = payload.notes.clone() {
                    update.notes = Set(Some(notes));
                }
            }
            RequestStage::New => unreachable!("guard rejects transitions back to new"),
        }

        let result = RequestEntity::update_many()
            .set(update)
            .filter(Column::Id.eq(request_id))
            .filter(Column::Version.eq(guard_version))
            .exec(&txn)
            .await?;

        if result.rows_affected == 0 {
            warn!(request_id = %request_id, "Stage transition lost a concurrent write race");
            return Err(ServiceError::Conflict(format!(
                "Request {} was modified concurrently; re-read and retry",
                request_id
            )));
        }

        let updated = RequestEntity::find_by_id(request_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::InternalError("Request vanished mid-transaction".to_string())
            })?;

        txn.commit().await?;

        info!(
            request_id = %request_id,
            "Request stage changed: {} -> {}", current, target
        );

        self.event_sender
            .send(Event::RequestStageChanged {
                request_id,
                old_stage: current,
                new_stage: target,
            })
            .await;

        match target {
            RequestStage::Repaired => {
                self.event_sender
                    .send(Event::RequestCompleted {
                        request_id,
                        duration_hours: updated.duration_hours.unwrap_or_default(),
                        completed_at: now,
                    })
                    .await;
            }
            RequestStage::Scrap => {
                self.event_sender
                    .send(Event::EquipmentReviewSuggested {
                        request_id,
                        equipment_id: updated.equipment_id,
                    })
                    .await;
            }
            _ => {}
        }

        Ok(RequestResponse::from_model(updated, now))
    }

    /// Sets or clears the technician on a request.
    ///
    /// Managers may assign anyone; technicians may only self-assign, and not
    /// over an existing assignment to someone else. Assigning a technician
    /// to a `new` request advances it to `in_progress`.
    #[instrument(skip(self, input), fields(request_id = %request_id))]
    pub async fn assign_technician(
        &self,
        actor: &AuthUser,
        request_id: Uuid,
        input: AssignTechnicianInput,
    ) -> Result<RequestResponse, ServiceError> {
        policy::authorize(actor.role, Action::AssignTechnician)?;

        let now = Utc::now();
        let txn = self.db.begin().await?;

        let request = RequestEntity::find_by_id(request_id)
            .filter(Column::CompanyId.eq(actor.company_id))
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Maintenance request {} not found", request_id))
            })?;

        if request.stage.is_terminal() {
            return Err(ServiceError::ValidationError(
                "Cannot change assignment on a completed or scrapped request".to_string(),
            ));
        }

        if actor.role == UserRole::Technician {
            match input.technician_id {
                Some(id) if id == actor.user_id => {}
                Some(_) => {
                    return Err(ServiceError::Forbidden(
                        "Technicians may only assign themselves".to_string(),
                    ));
                }
                None => {
                    return Err(ServiceError::Forbidden(
                        "Technicians may not clear assignments".to_string(),
                    ));
                }
            }
            if let Some(existing) = request.technician_id {
                if existing != actor.user_id {
                    return Err(ServiceError::Forbidden(
                        "Request is already assigned to another technician".to_string(),
                    ));
                }
            }
        }

        if let Some(technician_id) = input.technician_id {
            let technician = user::Entity::find_by_id(technician_id)
                .filter(user::Column::CompanyId.eq(actor.company_id))
                .one(&txn)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Technician {} not found", technician_id))
                })?;
            if technician.role != UserRole::Technician {
                return Err(ServiceError::ValidationError(format!(
                    "User {} does not hold the technician role",
                    technician_id
                )));
            }
        }

        let old_stage = request.stage;
        let advances = old_stage == RequestStage::New && input.technician_id.is_some();

        let mut update = RequestActiveModel {
            technician_id: Set(input.technician_id),
            updated_at: Set(now),
            version: Set(request.version + 1),
            ..Default::default()
        };
        if advances {
            update.stage = Set(RequestStage::InProgress);
            if request.start_date.is_none() {
                update.start_date = Set(Some(now));
            }
        }

        let result = RequestEntity::update_many()
            .set(update)
            .filter(Column::Id.eq(request_id))
            .filter(Column::Version.eq(request.version))
            .exec(&txn)
            .await?;

        if result.rows_affected == 0 {
            return Err(ServiceError::Conflict(format!(
                "Request {} was modified concurrently; re-read and retry",
                request_id
            )));
        }

        let updated = RequestEntity::find_by_id(request_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::InternalError("Request vanished mid-transaction".to_string())
            })?;

        txn.commit().await?;

        self.event_sender
            .send(Event::RequestAssigned {
                request_id,
                technician_id: input.technician_id,
                assigned_by: actor.user_id,
            })
            .await;

        if advances {
            self.event_sender
                .send(Event::RequestStageChanged {
                    request_id,
                    old_stage,
                    new_stage: RequestStage::InProgress,
                })
                .await;
        }

        Ok(RequestResponse::from_model(updated, now))
    }

    async fn find_scoped(
        &self,
        actor: &AuthUser,
        request_id: Uuid,
    ) -> Result<RequestModel, ServiceError> {
        RequestEntity::find_by_id(request_id)
            .filter(Column::CompanyId.eq(actor.company_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Maintenance request {} not found", request_id))
            })
    }
}
