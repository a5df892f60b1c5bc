use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Parents before children so every foreign key has a target.
        for statement in create_statements() {
            manager.create_table(statement).await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            Sales::Table.into_iden(),
            HealthRecords::Table.into_iden(),
            Feed::Table.into_iden(),
            EggProduction::Table.into_iden(),
            Chickens::Table.into_iden(),
            Coops::Table.into_iden(),
            Profiles::Table.into_iden(),
        ] {
            manager
                .drop_table(Table::drop().table(table).if_exists().to_owned())
                .await?;
        }
        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum Profiles {
    Table,
    Id,
    Email,
    FarmName,
    Location,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum Coops {
    Table,
    Id,
    UserId,
    Name,
    Capacity,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum Chickens {
    Table,
    Id,
    UserId,
    CoopId,
    BatchNumber,
    Breed,
    InitialCount,
    CurrentCount,
    BirthDate,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum EggProduction {
    Table,
    Id,
    ChickenId,
    Date,
    Count,
    Weight,
    Quality,
    Notes,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum Feed {
    Table,
    Id,
    CoopId,
    Date,
    Type,
    QuantityKg,
    Cost,
    Notes,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum HealthRecords {
    Table,
    Id,
    ChickenId,
    Date,
    Type,
    Description,
    Cost,
    VetName,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum Sales {
    Table,
    Id,
    UserId,
    Date,
    EggCount,
    PricePerUnit,
    Total,
    Customer,
    Status,
    CreatedAt,
}

fn uuid_pk<T: IntoIden>(column: T) -> ColumnDef {
    ColumnDef::new(column)
        .uuid()
        .not_null()
        .primary_key()
        .default(Expr::cust("gen_random_uuid()"))
        .to_owned()
}

/// Owner column filled from the caller's JWT when the client omits it.
fn owner<T: IntoIden>(column: T) -> ColumnDef {
    ColumnDef::new(column)
        .uuid()
        .not_null()
        .default(Expr::cust("auth.uid()"))
        .to_owned()
}

fn timestamp<T: IntoIden>(column: T) -> ColumnDef {
    ColumnDef::new(column)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

fn money<T: IntoIden>(column: T) -> ColumnDef {
    let column = column.into_iden();
    ColumnDef::new(column.clone())
        .decimal_len(14, 2)
        .not_null()
        .check(Expr::col(column).gte(0))
        .to_owned()
}

pub fn create_profiles() -> TableCreateStatement {
    Table::create()
        .table(Profiles::Table)
        .if_not_exists()
        .col(ColumnDef::new(Profiles::Id).uuid().not_null().primary_key())
        .col(ColumnDef::new(Profiles::Email).text().not_null())
        .col(ColumnDef::new(Profiles::FarmName).text())
        .col(ColumnDef::new(Profiles::Location).text())
        .col(timestamp(Profiles::CreatedAt))
        .col(timestamp(Profiles::UpdatedAt))
        .foreign_key(
            ForeignKey::create()
                .name("fk_profiles_auth_user")
                .from(Profiles::Table, Profiles::Id)
                .to((Alias::new("auth"), Alias::new("users")), Alias::new("id"))
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

pub fn create_coops() -> TableCreateStatement {
    Table::create()
        .table(Coops::Table)
        .if_not_exists()
        .col(uuid_pk(Coops::Id))
        .col(owner(Coops::UserId))
        .col(ColumnDef::new(Coops::Name).text().not_null())
        .col(
            ColumnDef::new(Coops::Capacity)
                .integer()
                .not_null()
                .check(Expr::col(Coops::Capacity).gt(0)),
        )
        .col(timestamp(Coops::CreatedAt))
        .col(timestamp(Coops::UpdatedAt))
        .foreign_key(
            ForeignKey::create()
                .name("fk_coops_user_id")
                .from(Coops::Table, Coops::UserId)
                .to(Profiles::Table, Profiles::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

pub fn create_chickens() -> TableCreateStatement {
    Table::create()
        .table(Chickens::Table)
        .if_not_exists()
        .col(uuid_pk(Chickens::Id))
        .col(owner(Chickens::UserId))
        .col(ColumnDef::new(Chickens::CoopId).uuid())
        .col(ColumnDef::new(Chickens::BatchNumber).text().not_null())
        .col(ColumnDef::new(Chickens::Breed).text().not_null())
        .col(
            ColumnDef::new(Chickens::InitialCount)
                .integer()
                .not_null()
                .check(Expr::col(Chickens::InitialCount).gte(0)),
        )
        .col(
            ColumnDef::new(Chickens::CurrentCount)
                .integer()
                .not_null()
                .check(Expr::col(Chickens::CurrentCount).gte(0)),
        )
        .col(ColumnDef::new(Chickens::BirthDate).date().not_null())
        .col(
            ColumnDef::new(Chickens::Status)
                .text()
                .not_null()
                .default("active")
                .check(Expr::col(Chickens::Status).is_in(["active", "sold", "dead"])),
        )
        .col(timestamp(Chickens::CreatedAt))
        .col(timestamp(Chickens::UpdatedAt))
        .foreign_key(
            ForeignKey::create()
                .name("fk_chickens_user_id")
                .from(Chickens::Table, Chickens::UserId)
                .to(Profiles::Table, Profiles::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_chickens_coop_id")
                .from(Chickens::Table, Chickens::CoopId)
                .to(Coops::Table, Coops::Id)
                .on_delete(ForeignKeyAction::SetNull),
        )
        .to_owned()
}

pub fn create_egg_production() -> TableCreateStatement {
    Table::create()
        .table(EggProduction::Table)
        .if_not_exists()
        .col(uuid_pk(EggProduction::Id))
        .col(ColumnDef::new(EggProduction::ChickenId).uuid().not_null())
        .col(ColumnDef::new(EggProduction::Date).date().not_null())
        .col(
            ColumnDef::new(EggProduction::Count)
                .integer()
                .not_null()
                .check(Expr::col(EggProduction::Count).gte(0)),
        )
        .col(ColumnDef::new(EggProduction::Weight).decimal_len(8, 2))
        .col(
            ColumnDef::new(EggProduction::Quality)
                .text()
                .not_null()
                .default("A")
                .check(Expr::col(EggProduction::Quality).is_in(["A", "B", "C"])),
        )
        .col(ColumnDef::new(EggProduction::Notes).text())
        .col(timestamp(EggProduction::CreatedAt))
        .foreign_key(
            ForeignKey::create()
                .name("fk_egg_production_chicken_id")
                .from(EggProduction::Table, EggProduction::ChickenId)
                .to(Chickens::Table, Chickens::Id)
                .on_delete(ForeignKeyAction::Restrict),
        )
        .to_owned()
}

pub fn create_feed() -> TableCreateStatement {
    Table::create()
        .table(Feed::Table)
        .if_not_exists()
        .col(uuid_pk(Feed::Id))
        .col(ColumnDef::new(Feed::CoopId).uuid().not_null())
        .col(ColumnDef::new(Feed::Date).date().not_null())
        .col(ColumnDef::new(Feed::Type).text().not_null())
        .col(
            ColumnDef::new(Feed::QuantityKg)
                .decimal_len(10, 2)
                .not_null()
                .check(Expr::col(Feed::QuantityKg).gte(0)),
        )
        .col(money(Feed::Cost))
        .col(ColumnDef::new(Feed::Notes).text())
        .col(timestamp(Feed::CreatedAt))
        .foreign_key(
            ForeignKey::create()
                .name("fk_feed_coop_id")
                .from(Feed::Table, Feed::CoopId)
                .to(Coops::Table, Coops::Id)
                .on_delete(ForeignKeyAction::Restrict),
        )
        .to_owned()
}

pub fn create_health_records() -> TableCreateStatement {
    Table::create()
        .table(HealthRecords::Table)
        .if_not_exists()
        .col(uuid_pk(HealthRecords::Id))
        .col(ColumnDef::new(HealthRecords::ChickenId).uuid().not_null())
        .col(ColumnDef::new(HealthRecords::Date).date().not_null())
        .col(
            ColumnDef::new(HealthRecords::Type)
                .text()
                .not_null()
                .check(Expr::col(HealthRecords::Type).is_in([
                    "vaccination",
                    "treatment",
                    "checkup",
                ])),
        )
        .col(ColumnDef::new(HealthRecords::Description).text().not_null())
        .col(money(HealthRecords::Cost))
        .col(ColumnDef::new(HealthRecords::VetName).text())
        .col(timestamp(HealthRecords::CreatedAt))
        .foreign_key(
            ForeignKey::create()
                .name("fk_health_records_chicken_id")
                .from(HealthRecords::Table, HealthRecords::ChickenId)
                .to(Chickens::Table, Chickens::Id)
                .on_delete(ForeignKeyAction::Restrict),
        )
        .to_owned()
}

pub fn create_sales() -> TableCreateStatement {
    Table::create()
        .table(Sales::Table)
        .if_not_exists()
        .col(uuid_pk(Sales::Id))
        .col(owner(Sales::UserId))
        .col(ColumnDef::new(Sales::Date).date().not_null())
        .col(
            ColumnDef::new(Sales::EggCount)
                .integer()
                .not_null()
                .check(Expr::col(Sales::EggCount).gte(0)),
        )
        .col(money(Sales::PricePerUnit))
        .col(money(Sales::Total))
        .col(ColumnDef::new(Sales::Customer).text())
        .col(
            ColumnDef::new(Sales::Status)
                .text()
                .not_null()
                .default("completed")
                .check(Expr::col(Sales::Status).is_in(["pending", "completed"])),
        )
        .col(timestamp(Sales::CreatedAt))
        .foreign_key(
            ForeignKey::create()
                .name("fk_sales_user_id")
                .from(Sales::Table, Sales::UserId)
                .to(Profiles::Table, Profiles::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

pub fn create_statements() -> Vec<TableCreateStatement> {
    vec![
        create_profiles(),
        create_coops(),
        create_chickens(),
        create_egg_production(),
        create_feed(),
        create_health_records(),
        create_sales(),
    ]
}
