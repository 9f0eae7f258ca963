use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Tenant {
    Table,
    Id,
    Name,
    Domain,
    Settings,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Profile {
    Table,
    Id,
    TenantId,
    TeamId,
    Email,
    DisplayName,
    Role,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ProfileSecret {
    Table,
    ProfileId,
    PasswordHash,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Team {
    Table,
    Id,
    TenantId,
    Name,
    ManagerId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Checkin {
    Table,
    Id,
    UserId,
    MoodScore,
    Question,
    Response,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Alert {
    Table,
    Id,
    UserId,
    AlertType,
    Severity,
    Message,
    Resolved,
    ResolvedBy,
    ResolvedAt,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Extensions (safe if already present)
        manager
            .get_connection()
            .execute_unprepared(r#"CREATE EXTENSION IF NOT EXISTS "pgcrypto";"#)
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Tenant::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tenant::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .default(Expr::cust("gen_random_uuid()")),
                    )
                    .col(ColumnDef::new(Tenant::Name).string_len(256).not_null())
                    .col(ColumnDef::new(Tenant::Domain).string_len(256))
                    .col(
                        ColumnDef::new(Tenant::Settings)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'{}'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(Tenant::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("now()")),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Profile::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Profile::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .default(Expr::cust("gen_random_uuid()")),
                    )
                    .col(ColumnDef::new(Profile::TenantId).uuid().not_null())
                    // No FK on purpose: team removal clears this column from
                    // the application, the store does not cascade it.
                    .col(ColumnDef::new(Profile::TeamId).uuid())
                    .col(
                        ColumnDef::new(Profile::Email)
                            .string_len(320)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Profile::DisplayName).string_len(128).not_null())
                    .col(
                        ColumnDef::new(Profile::Role)
                            .string_len(16)
                            .not_null()
                            .default("EMPLOYEE"),
                    )
                    .col(
                        ColumnDef::new(Profile::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Profile::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("now()")),
                    )
                    .col(
                        ColumnDef::new(Profile::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("now()")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_profile_tenant")
                            .from(Profile::Table, Profile::TenantId)
                            .to(Tenant::Table, Tenant::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_profile_tenant")
                    .table(Profile::Table)
                    .col(Profile::TenantId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_profile_team")
                    .table(Profile::Table)
                    .col(Profile::TeamId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProfileSecret::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProfileSecret::ProfileId)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ProfileSecret::PasswordHash)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProfileSecret::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("now()")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_profile_secret_profile")
                            .from(ProfileSecret::Table, ProfileSecret::ProfileId)
                            .to(Profile::Table, Profile::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Team::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Team::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .default(Expr::cust("gen_random_uuid()")),
                    )
                    .col(ColumnDef::new(Team::TenantId).uuid().not_null())
                    .col(ColumnDef::new(Team::Name).string_len(128).not_null())
                    .col(ColumnDef::new(Team::ManagerId).uuid())
                    .col(
                        ColumnDef::new(Team::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("now()")),
                    )
                    .col(
                        ColumnDef::new(Team::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("now()")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_team_tenant")
                            .from(Team::Table, Team::TenantId)
                            .to(Tenant::Table, Tenant::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_team_tenant")
                    .table(Team::Table)
                    .col(Team::TenantId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Checkin::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Checkin::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .default(Expr::cust("gen_random_uuid()")),
                    )
                    .col(ColumnDef::new(Checkin::UserId).uuid().not_null())
                    .col(ColumnDef::new(Checkin::MoodScore).small_integer().not_null())
                    .col(ColumnDef::new(Checkin::Question).string_len(128))
                    .col(ColumnDef::new(Checkin::Response).text())
                    .col(
                        ColumnDef::new(Checkin::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("now()")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_checkin_profile")
                            .from(Checkin::Table, Checkin::UserId)
                            .to(Profile::Table, Profile::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_checkin_user_created")
                    .table(Checkin::Table)
                    .col(Checkin::UserId)
                    .col(Checkin::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Alert::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alert::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .default(Expr::cust("gen_random_uuid()")),
                    )
                    .col(ColumnDef::new(Alert::UserId).uuid().not_null())
                    .col(ColumnDef::new(Alert::AlertType).string_len(64).not_null())
                    .col(ColumnDef::new(Alert::Severity).string_len(16).not_null())
                    .col(ColumnDef::new(Alert::Message).text().not_null())
                    .col(
                        ColumnDef::new(Alert::Resolved)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Alert::ResolvedBy).uuid())
                    .col(ColumnDef::new(Alert::ResolvedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Alert::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("now()")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_alert_profile")
                            .from(Alert::Table, Alert::UserId)
                            .to(Profile::Table, Profile::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_alert_user")
                    .table(Alert::Table)
                    .col(Alert::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alert::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Checkin::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Team::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProfileSecret::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Profile::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tenant::Table).to_owned())
            .await?;
        Ok(())
    }
}
