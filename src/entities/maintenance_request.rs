use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::Display;
use utoipa::ToSchema;
use uuid::Uuid;

/// Position of a maintenance request in its fixed lifecycle.
///
/// Stages only move forward: `NEW -> IN_PROGRESS -> REPAIRED`, with a side
/// exit to `SCRAP` from either non-terminal stage. `REPAIRED` and `SCRAP`
/// are terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, Display,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "request_stage")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RequestStage {
    #[sea_orm(string_value = "new")]
    New,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "repaired")]
    Repaired,
    #[sea_orm(string_value = "scrap")]
    Scrap,
}

impl RequestStage {
    /// No transition ever leaves a terminal stage.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Repaired | Self::Scrap)
    }

    /// Whether the lifecycle permits moving from `self` to `target`.
    ///
    /// Same-stage "transitions" are not an edge; the service treats them as
    /// a no-op before consulting this guard.
    pub fn can_transition_to(self, target: RequestStage) -> bool {
        matches!(
            (self, target),
            (Self::New, Self::InProgress)
                | (Self::InProgress, Self::Repaired)
                | (Self::New, Self::Scrap)
                | (Self::InProgress, Self::Scrap)
        )
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, Display,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "request_type")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RequestType {
    /// Reactive/breakdown maintenance.
    #[sea_orm(string_value = "corrective")]
    Corrective,
    /// Scheduled routine maintenance; requires a scheduled date at creation.
    #[sea_orm(string_value = "preventive")]
    Preventive,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, Display,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "request_priority")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RequestPriority {
    #[sea_orm(string_value = "low")]
    Low,
    #[sea_orm(string_value = "medium")]
    Medium,
    #[sea_orm(string_value = "high")]
    High,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "maintenance_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub subject: String,
    pub description: Option<String>,
    pub request_type: RequestType,
    pub stage: RequestStage,
    pub priority: RequestPriority,
    pub request_date: DateTime<Utc>,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub start_date: Option<DateTime<Utc>>,
    pub completion_date: Option<DateTime<Utc>>,
    /// Hours spent, recorded when the request is completed.
    pub duration_hours: Option<f64>,
    pub notes: Option<String>,
    pub equipment_id: Uuid,
    pub category_id: Option<Uuid>,
    pub team_id: Option<Uuid>,
    pub technician_id: Option<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Optimistic concurrency guard; stage writes are conditioned on it.
    pub version: i32,
}

impl Model {
    /// A request is overdue when its scheduled date has passed and it has
    /// not reached a terminal stage. Derived, never stored.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        match self.scheduled_date {
            Some(scheduled) => scheduled < now && !self.stage.is_terminal(),
            None => false,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::company::Entity",
        from = "Column::CompanyId",
        to = "super::company::Column::Id"
    )]
    Company,
    #[sea_orm(
        belongs_to = "super::equipment::Entity",
        from = "Column::EquipmentId",
        to = "super::equipment::Column::Id"
    )]
    Equipment,
}

impl Related<super::company::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Company.def()
    }
}

impl Related<super::equipment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Equipment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use test_case::test_case;

    #[test_case(RequestStage::New, RequestStage::InProgress => true)]
    #[test_case(RequestStage::InProgress, RequestStage::Repaired => true)]
    #[test_case(RequestStage::New, RequestStage::Scrap => true)]
    #[test_case(RequestStage::InProgress, RequestStage::Scrap => true)]
    #[test_case(RequestStage::New, RequestStage::Repaired => false; "skipping a stage is denied")]
    #[test_case(RequestStage::InProgress, RequestStage::New => false; "no backward moves")]
    #[test_case(RequestStage::Repaired, RequestStage::Scrap => false; "repaired is terminal")]
    #[test_case(RequestStage::Scrap, RequestStage::InProgress => false; "scrap is terminal")]
    fn transition_guard(from: RequestStage, to: RequestStage) -> bool {
        from.can_transition_to(to)
    }

    #[test]
    fn terminal_stages() {
        assert!(!RequestStage::New.is_terminal());
        assert!(!RequestStage::InProgress.is_terminal());
        assert!(RequestStage::Repaired.is_terminal());
        assert!(RequestStage::Scrap.is_terminal());
    }

    fn request(stage: RequestStage, scheduled: Option<DateTime<Utc>>) -> Model {
        let now = Utc::now();
        Model {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            subject: "Hydraulic leak".into(),
            description: None,
            request_type: RequestType::Corrective,
            stage,
            priority: RequestPriority::Medium,
            request_date: now,
            scheduled_date: scheduled,
            start_date: None,
            completion_date: None,
            duration_hours: None,
            notes: None,
            equipment_id: Uuid::new_v4(),
            category_id: None,
            team_id: None,
            technician_id: None,
            created_by: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            version: 1,
        }
    }

    #[test]
    fn overdue_requires_past_scheduled_date() {
        let now = Utc::now();
        let yesterday = now - Duration::days(1);
        let tomorrow = now + Duration::days(1);

        assert!(request(RequestStage::New, Some(yesterday)).is_overdue(now));
        assert!(!request(RequestStage::New, Some(tomorrow)).is_overdue(now));
        assert!(!request(RequestStage::New, None).is_overdue(now));
    }

    #[test]
    fn terminal_requests_are_never_overdue() {
        let now = Utc::now();
        let yesterday = now - Duration::days(1);

        assert!(!request(RequestStage::Repaired, Some(yesterday)).is_overdue(now));
        assert!(!request(RequestStage::Scrap, Some(yesterday)).is_overdue(now));
        assert!(request(RequestStage::InProgress, Some(yesterday)).is_overdue(now));
    }
}
