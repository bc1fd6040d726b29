use sea_orm_migration::prelude::*;

use crate::m20250301_000001_create_tenancy::{Branches, Companies, Users};
use crate::m20250301_000002_create_academics::{Groups, Students};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ==================== 课时卡类型 ====================
        manager
            .create_table(
                Table::create()
                    .table(SubscriptionTypes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SubscriptionTypes::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionTypes::CompanyId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SubscriptionTypes::Name).string().not_null())
                    .col(
                        ColumnDef::new(SubscriptionTypes::LessonsCount)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SubscriptionTypes::Price).double().not_null())
                    .col(
                        ColumnDef::new(SubscriptionTypes::DurationDays)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionTypes::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(SubscriptionTypes::Description).text().null())
                    .col(
                        ColumnDef::new(SubscriptionTypes::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SubscriptionTypes::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(SubscriptionTypes::Table, SubscriptionTypes::CompanyId)
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ==================== 学生课时卡 ====================
        manager
            .create_table(
                Table::create()
                    .table(StudentSubscriptions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StudentSubscriptions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(StudentSubscriptions::CompanyId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentSubscriptions::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentSubscriptions::SubscriptionTypeId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentSubscriptions::GroupId)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(StudentSubscriptions::LessonsTotal)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentSubscriptions::LessonsUsed)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(StudentSubscriptions::PricePaid)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentSubscriptions::StartDate)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentSubscriptions::EndDate)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentSubscriptions::Status)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentSubscriptions::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentSubscriptions::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(StudentSubscriptions::Table, StudentSubscriptions::CompanyId)
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(StudentSubscriptions::Table, StudentSubscriptions::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(
                                StudentSubscriptions::Table,
                                StudentSubscriptions::SubscriptionTypeId,
                            )
                            .to(SubscriptionTypes::Table, SubscriptionTypes::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(StudentSubscriptions::Table, StudentSubscriptions::GroupId)
                            .to(Groups::Table, Groups::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // ==================== 收支流水 ====================
        manager
            .create_table(
                Table::create()
                    .table(PaymentTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PaymentTransactions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PaymentTransactions::CompanyId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PaymentTransactions::BranchId)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(PaymentTransactions::StudentId)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(PaymentTransactions::SubscriptionId)
                            .big_integer()
                            .null(),
                    )
                    .col(ColumnDef::new(PaymentTransactions::Amount).double().not_null())
                    .col(ColumnDef::new(PaymentTransactions::Kind).string().not_null())
                    .col(ColumnDef::new(PaymentTransactions::Method).string().not_null())
                    .col(ColumnDef::new(PaymentTransactions::Category).string().null())
                    .col(ColumnDef::new(PaymentTransactions::Description).text().null())
                    .col(
                        ColumnDef::new(PaymentTransactions::OccurredAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PaymentTransactions::CreatedBy)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(PaymentTransactions::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(PaymentTransactions::Table, PaymentTransactions::CompanyId)
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(PaymentTransactions::Table, PaymentTransactions::BranchId)
                            .to(Branches::Table, Branches::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(PaymentTransactions::Table, PaymentTransactions::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(
                                PaymentTransactions::Table,
                                PaymentTransactions::SubscriptionId,
                            )
                            .to(StudentSubscriptions::Table, StudentSubscriptions::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // ==================== 线索 ====================
        manager
            .create_table(
                Table::create()
                    .table(Leads::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Leads::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Leads::CompanyId).big_integer().not_null())
                    .col(ColumnDef::new(Leads::BranchId).big_integer().null())
                    .col(ColumnDef::new(Leads::Name).string().not_null())
                    .col(ColumnDef::new(Leads::Phone).string().null())
                    .col(ColumnDef::new(Leads::Email).string().null())
                    .col(ColumnDef::new(Leads::Source).string().null())
                    .col(ColumnDef::new(Leads::Status).string().not_null())
                    .col(ColumnDef::new(Leads::AssignedTo).big_integer().null())
                    .col(ColumnDef::new(Leads::StudentId).big_integer().null())
                    .col(ColumnDef::new(Leads::Notes).text().null())
                    .col(ColumnDef::new(Leads::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Leads::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Leads::Table, Leads::CompanyId)
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Leads::Table, Leads::BranchId)
                            .to(Branches::Table, Branches::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Leads::Table, Leads::AssignedTo)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Leads::Table, Leads::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LeadActivities::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LeadActivities::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LeadActivities::LeadId).big_integer().not_null())
                    .col(ColumnDef::new(LeadActivities::Kind).string().not_null())
                    .col(ColumnDef::new(LeadActivities::Content).text().not_null())
                    .col(ColumnDef::new(LeadActivities::CreatedBy).big_integer().null())
                    .col(
                        ColumnDef::new(LeadActivities::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(LeadActivities::Table, LeadActivities::LeadId)
                            .to(Leads::Table, Leads::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LeadTasks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LeadTasks::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LeadTasks::LeadId).big_integer().not_null())
                    .col(ColumnDef::new(LeadTasks::Title).string().not_null())
                    .col(ColumnDef::new(LeadTasks::DueAt).big_integer().null())
                    .col(
                        ColumnDef::new(LeadTasks::IsDone)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(LeadTasks::AssignedTo).big_integer().null())
                    .col(ColumnDef::new(LeadTasks::CompletedAt).big_integer().null())
                    .col(ColumnDef::new(LeadTasks::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(LeadTasks::Table, LeadTasks::LeadId)
                            .to(Leads::Table, Leads::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ==================== 机构设置 ====================
        manager
            .create_table(
                Table::create()
                    .table(CompanySettings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CompanySettings::CompanyId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CompanySettings::Key).string().not_null())
                    .col(ColumnDef::new(CompanySettings::Value).text().not_null())
                    .col(ColumnDef::new(CompanySettings::ValueType).string().not_null())
                    .col(
                        ColumnDef::new(CompanySettings::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CompanySettings::UpdatedBy).big_integer().null())
                    .primary_key(
                        Index::create()
                            .col(CompanySettings::CompanyId)
                            .col(CompanySettings::Key),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(CompanySettings::Table, CompanySettings::CompanyId)
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_subscriptions_student_id")
                    .table(StudentSubscriptions::Table)
                    .col(StudentSubscriptions::StudentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_transactions_company_occurred")
                    .table(PaymentTransactions::Table)
                    .col(PaymentTransactions::CompanyId)
                    .col(PaymentTransactions::OccurredAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_leads_company_status")
                    .table(Leads::Table)
                    .col(Leads::CompanyId)
                    .col(Leads::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CompanySettings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LeadTasks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LeadActivities::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Leads::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PaymentTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(StudentSubscriptions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SubscriptionTypes::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum SubscriptionTypes {
    #[sea_orm(iden = "subscription_types")]
    Table,
    Id,
    CompanyId,
    Name,
    LessonsCount,
    Price,
    DurationDays,
    IsActive,
    Description,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum StudentSubscriptions {
    #[sea_orm(iden = "student_subscriptions")]
    Table,
    Id,
    CompanyId,
    StudentId,
    SubscriptionTypeId,
    GroupId,
    LessonsTotal,
    LessonsUsed,
    PricePaid,
    StartDate,
    EndDate,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PaymentTransactions {
    #[sea_orm(iden = "payment_transactions")]
    Table,
    Id,
    CompanyId,
    BranchId,
    StudentId,
    SubscriptionId,
    Amount,
    Kind,
    Method,
    Category,
    Description,
    OccurredAt,
    CreatedBy,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Leads {
    #[sea_orm(iden = "leads")]
    Table,
    Id,
    CompanyId,
    BranchId,
    Name,
    Phone,
    Email,
    Source,
    Status,
    AssignedTo,
    StudentId,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum LeadActivities {
    #[sea_orm(iden = "lead_activities")]
    Table,
    Id,
    LeadId,
    Kind,
    Content,
    CreatedBy,
    CreatedAt,
}

#[derive(DeriveIden)]
enum LeadTasks {
    #[sea_orm(iden = "lead_tasks")]
    Table,
    Id,
    LeadId,
    Title,
    DueAt,
    IsDone,
    AssignedTo,
    CompletedAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum CompanySettings {
    #[sea_orm(iden = "company_settings")]
    Table,
    CompanyId,
    Key,
    Value,
    ValueType,
    UpdatedAt,
    UpdatedBy,
}
