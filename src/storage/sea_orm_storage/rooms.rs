use super::{SeaOrmStorage, fetch_page, now_ts, search_condition};
use crate::entity::rooms::{ActiveModel, Column, Entity as Rooms};
use crate::errors::{CrmError, Result};
use crate::models::{
    PaginatedResponse, PaginationInfo, TenantScope,
    rooms::{CreateRoomRequest, Room, RoomQueryParams, UpdateRoomRequest},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

impl SeaOrmStorage {
    pub async fn list_rooms_impl(
        &self,
        scope: &TenantScope,
        query: RoomQueryParams,
    ) -> Result<PaginatedResponse<Room>> {
        let (page, size) = query.pagination.normalized();

        let mut select = Rooms::find().filter(Column::CompanyId.eq(scope.company_id));
        if let Some(branch_id) = scope.branch_filter(query.branch_id) {
            select = select.filter(Column::BranchId.eq(branch_id));
        }
        if let Some(is_active) = query.is_active {
            select = select.filter(Column::IsActive.eq(is_active));
        }
        if let Some(cond) = search_condition(&[Column::Name], query.search.as_deref()) {
            select = select.filter(cond);
        }

        let (rows, total) =
            fetch_page(&self.db, select.order_by_asc(Column::Name), page, size, "list rooms")
                .await?;
        Ok(PaginatedResponse {
            items: rows.into_iter().map(|m| m.into_room()).collect(),
            pagination: PaginationInfo::new(page, size, total),
        })
    }

    pub async fn get_room_impl(&self, company_id: i64, id: i64) -> Result<Option<Room>> {
        let row = Rooms::find_by_id(id)
            .filter(Column::CompanyId.eq(company_id))
            .one(&self.db)
            .await
            .map_err(|e| CrmError::from_db("get room", e))?;
        Ok(row.map(|m| m.into_room()))
    }

    pub async fn create_room_impl(&self, company_id: i64, req: CreateRoomRequest) -> Result<Room> {
        let now = now_ts();
        let model = ActiveModel {
            company_id: Set(company_id),
            branch_id: Set(req.branch_id),
            name: Set(req.name),
            capacity: Set(req.capacity),
            is_active: Set(req.is_active.unwrap_or(true)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| CrmError::from_db("create room", e))?;
        Ok(model.into_room())
    }

    pub async fn update_room_impl(
        &self,
        company_id: i64,
        id: i64,
        update: UpdateRoomRequest,
    ) -> Result<Option<Room>> {
        if self.get_room_impl(company_id, id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(now_ts()),
            ..Default::default()
        };
        if let Some(name) = update.name {
            model.name = Set(name);
        }
        if let Some(capacity) = update.capacity {
            model.capacity = Set(capacity);
        }
        if let Some(branch_id) = update.branch_id {
            model.branch_id = Set(Some(branch_id));
        }
        if let Some(is_active) = update.is_active {
            model.is_active = Set(is_active);
        }

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| CrmError::from_db("update room", e))?;
        Ok(Some(updated.into_room()))
    }

    pub async fn delete_room_impl(&self, company_id: i64, id: i64) -> Result<bool> {
        let result = Rooms::delete_many()
            .filter(Column::Id.eq(id))
            .filter(Column::CompanyId.eq(company_id))
            .exec(&self.db)
            .await
            .map_err(|e| CrmError::from_db("delete room", e))?;
        Ok(result.rows_affected > 0)
    }
}
