use std::collections::HashMap;
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
        equipment_category::{Column as CategoryColumn, Entity as CategoryEntity},
        team::{ActiveModel as TeamActiveModel, Column, Entity as TeamEntity, Model as TeamModel},
        team_member::{
            ActiveModel as TeamMemberActiveModel, Column as MemberColumn,
            Entity as TeamMemberEntity,
        },
        user::{Column as UserColumn, Entity as UserEntity},
    },
    errors::ServiceError,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TeamInput {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddMemberInput {
    pub user_id: Uuid,
    #[serde(default)]
    pub is_lead: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TeamMemberResponse {
    pub user_id: Uuid,
    pub name: String,
    pub is_lead: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TeamResponse {
    pub id: Uuid,
    pub name: String,
    pub members: Vec<TeamMemberResponse>,
}

/// Maintenance teams and their membership rosters.
#[derive(Clone)]
pub struct TeamService {
    db: Arc<DbPool>,
}

impl TeamService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, input), fields(company_id = %actor.company_id))]
    pub async fn create_team(
        &self,
        actor: &AuthUser,
        input: TeamInput,
    ) -> Result<TeamResponse, ServiceError> {
        policy::authorize(actor.role, Action::ManageTeams)?;
        input.validate()?;

        let model = TeamActiveModel {
            id: Set(Uuid::new_v4()),
            company_id: Set(actor.company_id),
            name: Set(input.name),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await?;

        info!(team_id = %model.id, "Team created");
        Ok(TeamResponse {
            id: model.id,
            name: model.name,
            members: Vec::new(),
        })
    }

    pub async fn list_teams(&self, actor: &AuthUser) -> Result<Vec<TeamResponse>, ServiceError> {
        policy::authorize(actor.role, Action::ViewOrganization)?;
        let teams = TeamEntity::find()
            .filter(Column::CompanyId.eq(actor.company_id))
            .order_by_asc(Column::Name)
            .all(&*self.db)
            .await?;

        let mut out = Vec::with_capacity(teams.len());
        for team in teams {
            let members = self.members_of(&team).await?;
            out.push(TeamResponse {
                id: team.id,
                name: team.name,
                members,
            });
        }
        Ok(out)
    }

    #[instrument(skip(self), fields(team_id = %team_id))]
    pub async fn get_team(
        &self,
        actor: &AuthUser,
        team_id: Uuid,
    ) -> Result<TeamResponse, ServiceError> {
        policy::authorize(actor.role, Action::ViewOrganization)?;
        let team = self.find_scoped(actor, team_id).await?;
        let members = self.members_of(&team).await?;
        Ok(TeamResponse {
            id: team.id,
            name: team.name,
            members,
        })
    }

    #[instrument(skip(self, input), fields(team_id = %team_id))]
    pub async fn rename_team(
        &self,
        actor: &AuthUser,
        team_id: Uuid,
        input: TeamInput,
    ) -> Result<TeamResponse, ServiceError> {
        policy::authorize(actor.role, Action::ManageTeams)?;
        input.validate()?;

        let team = self.find_scoped(actor, team_id).await?;
        let mut active: TeamActiveModel = team.into();
        active.name = Set(input.name);
        let team = active.update(&*self.db).await?;

        let members = self.members_of(&team).await?;
        Ok(TeamResponse {
            id: team.id,
            name: team.name,
            members,
        })
    }

    #[instrument(skip(self), fields(team_id = %team_id))]
    pub async fn delete_team(&self, actor: &AuthUser, team_id: Uuid) -> Result<(), ServiceError> {
        policy::authorize(actor.role, Action::ManageTeams)?;

        let team = self.find_scoped(actor, team_id).await?;
        let in_use = CategoryEntity::find()
            .filter(CategoryColumn::ResponsibleTeamId.eq(team_id))
            .count(&*self.db)
            .await?;
        if in_use > 0 {
            return Err(ServiceError::ValidationError(
                "Team is the responsible team for one or more equipment categories".to_string(),
            ));
        }

        TeamMemberEntity::delete_many()
            .filter(MemberColumn::TeamId.eq(team_id))
            .exec(&*self.db)
            .await?;
        team.delete(&*self.db).await?;
        info!(team_id = %team_id, "Team deleted");
        Ok(())
    }

    #[instrument(skip(self, input), fields(team_id = %team_id))]
    pub async fn add_member(
        &self,
        actor: &AuthUser,
        team_id: Uuid,
        input: AddMemberInput,
    ) -> Result<TeamResponse, ServiceError> {
        policy::authorize(actor.role, Action::ManageTeams)?;

        let team = self.find_scoped(actor, team_id).await?;
        let user = UserEntity::find_by_id(input.user_id)
            .filter(UserColumn::CompanyId.eq(actor.company_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", input.user_id)))?;

        let existing = TeamMemberEntity::find()
            .filter(MemberColumn::TeamId.eq(team_id))
            .filter(MemberColumn::UserId.eq(user.id))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::ValidationError(
                "User is already a member of this team".to_string(),
            ));
        }

        TeamMemberActiveModel {
            id: Set(Uuid::new_v4()),
            team_id: Set(team_id),
            user_id: Set(user.id),
            is_lead: Set(input.is_lead),
        }
        .insert(&*self.db)
        .await?;

        let members = self.members_of(&team).await?;
        Ok(TeamResponse {
            id: team.id,
            name: team.name,
            members,
        })
    }

    #[instrument(skip(self), fields(team_id = %team_id, user_id = %user_id))]
    pub async fn remove_member(
        &self,
        actor: &AuthUser,
        team_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), ServiceError> {
        policy::authorize(actor.role, Action::ManageTeams)?;

        self.find_scoped(actor, team_id).await?;
        let membership = TeamMemberEntity::find()
            .filter(MemberColumn::TeamId.eq(team_id))
            .filter(MemberColumn::UserId.eq(user_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("User {} is not on this team", user_id))
            })?;

        membership.delete(&*self.db).await?;
        Ok(())
    }

    async fn members_of(&self, team: &TeamModel) -> Result<Vec<TeamMemberResponse>, ServiceError> {
        let rows = TeamMemberEntity::find()
            .filter(MemberColumn::TeamId.eq(team.id))
            .all(&*self.db)
            .await?;

        let user_ids: Vec<Uuid> = rows.iter().map(|row| row.user_id).collect();
        let names: HashMap<Uuid, String> = UserEntity::find()
            .filter(UserColumn::Id.is_in(user_ids))
            .all(&*self.db)
            .await?
            .into_iter()
            .map(|user| (user.id, user.name))
            .collect();

        let members = rows
            .into_iter()
            .filter_map(|row| {
                names.get(&row.user_id).map(|name| TeamMemberResponse {
                    user_id: row.user_id,
                    name: name.clone(),
                    is_lead: row.is_lead,
                })
            })
            .collect();
        Ok(members)
    }

    async fn find_scoped(
        &self,
        actor: &AuthUser,
        team_id: Uuid,
    ) -> Result<TeamModel, ServiceError> {
        TeamEntity::find_by_id(team_id)
            .filter(Column::CompanyId.eq(actor.company_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Team {} not found", team_id)))
    }
}
