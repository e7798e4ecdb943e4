use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::Display;
use utoipa::ToSchema;
use uuid::Uuid;

/// Equipment health below this percentage flags the record as critical.
pub const CRITICAL_HEALTH_THRESHOLD: i32 = 30;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, Display,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "equipment_status")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EquipmentStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "under_maintenance")]
    UnderMaintenance,
    #[sea_orm(string_value = "scrapped")]
    Scrapped,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "equipment")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub serial_number: Option<String>,
    /// Health percentage, 0-100.
    pub health: i32,
    pub status: EquipmentStatus,
    pub owner_id: Option<Uuid>,
    pub technician_id: Option<Uuid>,
    pub maintenance_team_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    /// Scrapping is terminal for maintenance purposes but the row is kept.
    pub scrapped_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    /// Equipment whose health has dropped below the threshold needs attention
    /// on the dashboard.
    pub fn is_critical(&self) -> bool {
        self.health < CRITICAL_HEALTH_THRESHOLD && self.status != EquipmentStatus::Scrapped
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
        belongs_to = "super::equipment_category::Entity",
        from = "Column::CategoryId",
        to = "super::equipment_category::Column::Id"
    )]
    Category,
    #[sea_orm(has_many = "super::maintenance_request::Entity")]
    MaintenanceRequests,
}

impl Related<super::company::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Company.def()
    }
}

impl Related<super::equipment_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::maintenance_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MaintenanceRequests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
