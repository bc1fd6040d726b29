use sea_orm_migration::prelude::*;

use crate::m20250301_000001_create_tenancy::{Branches, Companies, Users};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 教师表
        manager
            .create_table(
                Table::create()
                    .table(Teachers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Teachers::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Teachers::CompanyId).big_integer().not_null())
                    .col(ColumnDef::new(Teachers::BranchId).big_integer().null())
                    .col(ColumnDef::new(Teachers::UserId).big_integer().null())
                    .col(ColumnDef::new(Teachers::FirstName).string().not_null())
                    .col(ColumnDef::new(Teachers::LastName).string().not_null())
                    .col(ColumnDef::new(Teachers::Phone).string().null())
                    .col(ColumnDef::new(Teachers::Email).string().null())
                    .col(ColumnDef::new(Teachers::Subjects).text().not_null())
                    .col(
                        ColumnDef::new(Teachers::HourlyRate)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(Teachers::Status).string().not_null())
                    .col(ColumnDef::new(Teachers::HiredAt).string().null())
                    .col(ColumnDef::new(Teachers::Notes).text().null())
                    .col(ColumnDef::new(Teachers::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Teachers::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Teachers::Table, Teachers::CompanyId)
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Teachers::Table, Teachers::BranchId)
                            .to(Branches::Table, Branches::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Teachers::Table, Teachers::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // 学生表
        manager
            .create_table(
                Table::create()
                    .table(Students::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Students::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Students::CompanyId).big_integer().not_null())
                    .col(ColumnDef::new(Students::BranchId).big_integer().null())
                    .col(ColumnDef::new(Students::FirstName).string().not_null())
                    .col(ColumnDef::new(Students::LastName).string().not_null())
                    .col(ColumnDef::new(Students::Phone).string().null())
                    .col(ColumnDef::new(Students::Email).string().null())
                    .col(ColumnDef::new(Students::BirthDate).string().null())
                    .col(ColumnDef::new(Students::ParentName).string().null())
                    .col(ColumnDef::new(Students::ParentPhone).string().null())
                    .col(ColumnDef::new(Students::Status).string().not_null())
                    .col(ColumnDef::new(Students::Notes).text().null())
                    .col(ColumnDef::new(Students::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Students::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Students::Table, Students::CompanyId)
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Students::Table, Students::BranchId)
                            .to(Branches::Table, Branches::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // 教室表
        manager
            .create_table(
                Table::create()
                    .table(Rooms::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Rooms::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Rooms::CompanyId).big_integer().not_null())
                    .col(ColumnDef::new(Rooms::BranchId).big_integer().null())
                    .col(ColumnDef::new(Rooms::Name).string().not_null())
                    .col(ColumnDef::new(Rooms::Capacity).integer().not_null())
                    .col(
                        ColumnDef::new(Rooms::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Rooms::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Rooms::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Rooms::Table, Rooms::CompanyId)
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Rooms::Table, Rooms::BranchId)
                            .to(Branches::Table, Branches::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // 班组表
        manager
            .create_table(
                Table::create()
                    .table(Groups::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Groups::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Groups::CompanyId).big_integer().not_null())
                    .col(ColumnDef::new(Groups::BranchId).big_integer().null())
                    .col(ColumnDef::new(Groups::Name).string().not_null())
                    .col(ColumnDef::new(Groups::Subject).string().null())
                    .col(ColumnDef::new(Groups::Level).string().null())
                    .col(ColumnDef::new(Groups::TeacherId).big_integer().null())
                    .col(ColumnDef::new(Groups::RoomId).big_integer().null())
                    .col(ColumnDef::new(Groups::MaxStudents).integer().not_null())
                    .col(ColumnDef::new(Groups::Status).string().not_null())
                    .col(ColumnDef::new(Groups::StartDate).string().null())
                    .col(ColumnDef::new(Groups::EndDate).string().null())
                    .col(ColumnDef::new(Groups::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Groups::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Groups::Table, Groups::CompanyId)
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Groups::Table, Groups::BranchId)
                            .to(Branches::Table, Branches::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Groups::Table, Groups::TeacherId)
                            .to(Teachers::Table, Teachers::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Groups::Table, Groups::RoomId)
                            .to(Rooms::Table, Rooms::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // 班组成员表
        manager
            .create_table(
                Table::create()
                    .table(GroupStudents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GroupStudents::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GroupStudents::GroupId).big_integer().not_null())
                    .col(
                        ColumnDef::new(GroupStudents::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(GroupStudents::JoinedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(GroupStudents::Table, GroupStudents::GroupId)
                            .to(Groups::Table, Groups::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(GroupStudents::Table, GroupStudents::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 课程表
        manager
            .create_table(
                Table::create()
                    .table(Lessons::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Lessons::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Lessons::CompanyId).big_integer().not_null())
                    .col(ColumnDef::new(Lessons::BranchId).big_integer().null())
                    .col(ColumnDef::new(Lessons::GroupId).big_integer().null())
                    .col(ColumnDef::new(Lessons::StudentId).big_integer().null())
                    .col(ColumnDef::new(Lessons::TeacherId).big_integer().not_null())
                    .col(ColumnDef::new(Lessons::RoomId).big_integer().null())
                    .col(ColumnDef::new(Lessons::Subject).string().null())
                    .col(ColumnDef::new(Lessons::StartTime).big_integer().not_null())
                    .col(ColumnDef::new(Lessons::EndTime).big_integer().not_null())
                    .col(ColumnDef::new(Lessons::Status).string().not_null())
                    .col(ColumnDef::new(Lessons::Notes).text().null())
                    .col(ColumnDef::new(Lessons::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Lessons::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Lessons::Table, Lessons::CompanyId)
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Lessons::Table, Lessons::BranchId)
                            .to(Branches::Table, Branches::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Lessons::Table, Lessons::GroupId)
                            .to(Groups::Table, Groups::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Lessons::Table, Lessons::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Lessons::Table, Lessons::TeacherId)
                            .to(Teachers::Table, Teachers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Lessons::Table, Lessons::RoomId)
                            .to(Rooms::Table, Rooms::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // 出勤表
        manager
            .create_table(
                Table::create()
                    .table(LessonAttendance::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LessonAttendance::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LessonAttendance::LessonId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LessonAttendance::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LessonAttendance::Status).string().not_null())
                    .col(
                        ColumnDef::new(LessonAttendance::SubscriptionId)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(LessonAttendance::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(LessonAttendance::Table, LessonAttendance::LessonId)
                            .to(Lessons::Table, Lessons::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(LessonAttendance::Table, LessonAttendance::StudentId)
                            .to(Students::Table, Students::Id)
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
                    .name("idx_teachers_company_id")
                    .table(Teachers::Table)
                    .col(Teachers::CompanyId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_students_company_id")
                    .table(Students::Table)
                    .col(Students::CompanyId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_groups_company_id")
                    .table(Groups::Table)
                    .col(Groups::CompanyId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_group_students_unique")
                    .table(GroupStudents::Table)
                    .col(GroupStudents::GroupId)
                    .col(GroupStudents::StudentId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_lessons_company_start")
                    .table(Lessons::Table)
                    .col(Lessons::CompanyId)
                    .col(Lessons::StartTime)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_lesson_attendance_unique")
                    .table(LessonAttendance::Table)
                    .col(LessonAttendance::LessonId)
                    .col(LessonAttendance::StudentId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 按照创建的相反顺序删除
        manager
            .drop_table(Table::drop().table(LessonAttendance::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Lessons::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GroupStudents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Groups::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Rooms::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Students::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Teachers::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
pub(crate) enum Teachers {
    #[sea_orm(iden = "teachers")]
    Table,
    Id,
    CompanyId,
    BranchId,
    UserId,
    FirstName,
    LastName,
    Phone,
    Email,
    Subjects,
    HourlyRate,
    Status,
    HiredAt,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum Students {
    #[sea_orm(iden = "students")]
    Table,
    Id,
    CompanyId,
    BranchId,
    FirstName,
    LastName,
    Phone,
    Email,
    BirthDate,
    ParentName,
    ParentPhone,
    Status,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum Rooms {
    #[sea_orm(iden = "rooms")]
    Table,
    Id,
    CompanyId,
    BranchId,
    Name,
    Capacity,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum Groups {
    #[sea_orm(iden = "groups")]
    Table,
    Id,
    CompanyId,
    BranchId,
    Name,
    Subject,
    Level,
    TeacherId,
    RoomId,
    MaxStudents,
    Status,
    StartDate,
    EndDate,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum GroupStudents {
    #[sea_orm(iden = "group_students")]
    Table,
    Id,
    GroupId,
    StudentId,
    JoinedAt,
}

#[derive(DeriveIden)]
pub(crate) enum Lessons {
    #[sea_orm(iden = "lessons")]
    Table,
    Id,
    CompanyId,
    BranchId,
    GroupId,
    StudentId,
    TeacherId,
    RoomId,
    Subject,
    StartTime,
    EndTime,
    Status,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum LessonAttendance {
    #[sea_orm(iden = "lesson_attendance")]
    Table,
    Id,
    LessonId,
    StudentId,
    Status,
    SubscriptionId,
    CreatedAt,
}
