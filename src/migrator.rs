use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_company_tables::Migration),
            Box::new(m20240101_000002_create_team_tables::Migration),
            Box::new(m20240101_000003_create_equipment_tables::Migration),
            Box::new(m20240101_000004_create_maintenance_requests_table::Migration),
        ]
    }
}

mod m20240101_000001_create_company_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_company_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Companies::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Companies::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Companies::Name).string().not_null())
                        .col(ColumnDef::new(Companies::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Companies::UpdatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Departments::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Departments::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Departments::CompanyId).uuid().not_null())
                        .col(ColumnDef::new(Departments::Name).string().not_null())
                        .col(ColumnDef::new(Departments::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Users::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Users::CompanyId).uuid().not_null())
                        .col(ColumnDef::new(Users::DepartmentId).uuid().null())
                        .col(ColumnDef::new(Users::Name).string().not_null())
                        .col(
                            ColumnDef::new(Users::Email)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                        .col(ColumnDef::new(Users::Role).string().not_null())
                        .col(
                            ColumnDef::new(Users::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Users::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Users::UpdatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_users_company")
                        .table(Users::Table)
                        .col(Users::CompanyId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Departments::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Companies::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Companies {
        Table,
        Id,
        Name,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(Iden)]
    enum Departments {
        Table,
        Id,
        CompanyId,
        Name,
        CreatedAt,
    }

    #[derive(Iden)]
    enum Users {
        Table,
        Id,
        CompanyId,
        DepartmentId,
        Name,
        Email,
        PasswordHash,
        Role,
        Active,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000002_create_team_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_team_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Teams::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Teams::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Teams::CompanyId).uuid().not_null())
                        .col(ColumnDef::new(Teams::Name).string().not_null())
                        .col(ColumnDef::new(Teams::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(TeamMembers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(TeamMembers::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(TeamMembers::TeamId).uuid().not_null())
                        .col(ColumnDef::new(TeamMembers::UserId).uuid().not_null())
                        .col(
                            ColumnDef::new(TeamMembers::IsLead)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_team_members_team")
                        .table(TeamMembers::Table)
                        .col(TeamMembers::TeamId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(TeamMembers::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Teams::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Teams {
        Table,
        Id,
        CompanyId,
        Name,
        CreatedAt,
    }

    #[derive(Iden)]
    enum TeamMembers {
        Table,
        Id,
        TeamId,
        UserId,
        IsLead,
    }
}

mod m20240101_000003_create_equipment_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_equipment_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(EquipmentCategories::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(EquipmentCategories::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(EquipmentCategories::CompanyId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(EquipmentCategories::Name).string().not_null())
                        .col(
                            ColumnDef::new(EquipmentCategories::ResponsibleTeamId)
                                .uuid()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(EquipmentCategories::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Equipment::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Equipment::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Equipment::CompanyId).uuid().not_null())
                        .col(ColumnDef::new(Equipment::Name).string().not_null())
                        .col(ColumnDef::new(Equipment::SerialNumber).string().null())
                        .col(
                            ColumnDef::new(Equipment::Health)
                                .integer()
                                .not_null()
                                .default(100),
                        )
                        .col(ColumnDef::new(Equipment::Status).string().not_null())
                        .col(ColumnDef::new(Equipment::OwnerId).uuid().null())
                        .col(ColumnDef::new(Equipment::TechnicianId).uuid().null())
                        .col(ColumnDef::new(Equipment::MaintenanceTeamId).uuid().null())
                        .col(ColumnDef::new(Equipment::CategoryId).uuid().null())
                        .col(ColumnDef::new(Equipment::DepartmentId).uuid().null())
                        .col(ColumnDef::new(Equipment::ScrappedAt).timestamp().null())
                        .col(ColumnDef::new(Equipment::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Equipment::UpdatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_equipment_company")
                        .table(Equipment::Table)
                        .col(Equipment::CompanyId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Equipment::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(EquipmentCategories::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum EquipmentCategories {
        Table,
        Id,
        CompanyId,
        Name,
        ResponsibleTeamId,
        CreatedAt,
    }

    #[derive(Iden)]
    enum Equipment {
        Table,
        Id,
        CompanyId,
        Name,
        SerialNumber,
        Health,
        Status,
        OwnerId,
        TechnicianId,
        MaintenanceTeamId,
        CategoryId,
        DepartmentId,
        ScrappedAt,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000004_create_maintenance_requests_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_maintenance_requests_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(MaintenanceRequests::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(MaintenanceRequests::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaintenanceRequests::CompanyId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaintenanceRequests::Subject)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaintenanceRequests::Description)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(MaintenanceRequests::RequestType)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaintenanceRequests::Stage)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaintenanceRequests::Priority)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaintenanceRequests::RequestDate)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaintenanceRequests::ScheduledDate)
                                .timestamp()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(MaintenanceRequests::StartDate)
                                .timestamp()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(MaintenanceRequests::CompletionDate)
                                .timestamp()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(MaintenanceRequests::DurationHours)
                                .double()
                                .null(),
                        )
                        .col(ColumnDef::new(MaintenanceRequests::Notes).string().null())
                        .col(
                            ColumnDef::new(MaintenanceRequests::EquipmentId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(MaintenanceRequests::CategoryId).uuid().null())
                        .col(ColumnDef::new(MaintenanceRequests::TeamId).uuid().null())
                        .col(
                            ColumnDef::new(MaintenanceRequests::TechnicianId)
                                .uuid()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(MaintenanceRequests::CreatedBy)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaintenanceRequests::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaintenanceRequests::UpdatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaintenanceRequests::Version)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_requests_company_stage")
                        .table(MaintenanceRequests::Table)
                        .col(MaintenanceRequests::CompanyId)
                        .col(MaintenanceRequests::Stage)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_requests_equipment")
                        .table(MaintenanceRequests::Table)
                        .col(MaintenanceRequests::EquipmentId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(MaintenanceRequests::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum MaintenanceRequests {
        Table,
        Id,
        CompanyId,
        Subject,
        Description,
        RequestType,
        Stage,
        Priority,
        RequestDate,
        ScheduledDate,
        StartDate,
        CompletionDate,
        DurationHours,
        Notes,
        EquipmentId,
        CategoryId,
        TeamId,
        TechnicianId,
        CreatedBy,
        CreatedAt,
        UpdatedAt,
        Version,
    }
}
