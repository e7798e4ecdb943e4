use std::sync::Arc;

use chrono::Utc;
use sea_orm::{ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter};
use serde::Serialize;
use tracing::instrument;
use utoipa::ToSchema;

use crate::{
    auth::{
        policy::{self, Action},
        AuthUser,
    },
    db::DbPool,
    entities::{
        equipment::{
            Column as EquipmentColumn, Entity as EquipmentEntity, EquipmentStatus,
            CRITICAL_HEALTH_THRESHOLD,
        },
        maintenance_request::{
            Column as RequestColumn, Entity as RequestEntity, RequestStage, RequestType,
        },
    },
    errors::ServiceError,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct StageCounts {
    pub new: u64,
    pub in_progress: u64,
    pub repaired: u64,
    pub scrap: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TypeCounts {
    pub corrective: u64,
    pub preventive: u64,
}

/// Company-wide maintenance posture in one payload. Overdue and critical
/// counts are computed at read time, never stored.
#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardResponse {
    pub requests_by_stage: StageCounts,
    pub requests_by_type: TypeCounts,
    pub open_requests: u64,
    pub overdue_requests: u64,
    pub critical_equipment: u64,
    pub scrapped_equipment: u64,
}

#[derive(Clone)]
pub struct DashboardService {
    db: Arc<DbPool>,
}

impl DashboardService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self), fields(company_id = %actor.company_id))]
    pub async fn summary(&self, actor: &AuthUser) -> Result<DashboardResponse, ServiceError> {
        policy::authorize(actor.role, Action::ViewDashboard)?;

        let db = &*self.db;
        let company = actor.company_id;
        let now = Utc::now();

        let stage_count = |stage: RequestStage| {
            RequestEntity::find()
                .filter(RequestColumn::CompanyId.eq(company))
                .filter(RequestColumn::Stage.eq(stage))
                .count(db)
        };
        let new = stage_count(RequestStage::New).await?;
        let in_progress = stage_count(RequestStage::InProgress).await?;
        let repaired = stage_count(RequestStage::Repaired).await?;
        let scrap = stage_count(RequestStage::Scrap).await?;

        let type_count = |request_type: RequestType| {
            RequestEntity::find()
                .filter(RequestColumn::CompanyId.eq(company))
                .filter(RequestColumn::RequestType.eq(request_type))
                .count(db)
        };
        let corrective = type_count(RequestType::Corrective).await?;
        let preventive = type_count(RequestType::Preventive).await?;

        let overdue_requests = RequestEntity::find()
            .filter(
                Condition::all()
                    .add(RequestColumn::CompanyId.eq(company))
                    .add(RequestColumn::ScheduledDate.lt(now))
                    .add(
                        RequestColumn::Stage
                            .is_in([RequestStage::New, RequestStage::InProgress]),
                    ),
            )
            .count(db)
            .await?;

        let critical_equipment = EquipmentEntity::find()
            .filter(
                Condition::all()
                    .add(EquipmentColumn::CompanyId.eq(company))
                    .add(EquipmentColumn::Health.lt(CRITICAL_HEALTH_THRESHOLD))
                    .add(EquipmentColumn::Status.ne(EquipmentStatus::Scrapped)),
            )
            .count(db)
            .await?;

        let scrapped_equipment = EquipmentEntity::find()
            .filter(EquipmentColumn::CompanyId.eq(company))
            .filter(EquipmentColumn::Status.eq(EquipmentStatus::Scrapped))
            .count(db)
            .await?;

        Ok(DashboardResponse {
            open_requests: new + in_progress,
            requests_by_stage: StageCounts {
                new,
                in_progress,
                repaired,
                scrap,
            },
            requests_by_type: TypeCounts {
                corrective,
                preventive,
            },
            overdue_requests,
            critical_equipment,
            scrapped_equipment,
        })
    }
}
