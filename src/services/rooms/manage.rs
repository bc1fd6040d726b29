use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::RoomService;
use crate::models::rooms::{CreateRoomRequest, RoomQueryParams, UpdateRoomRequest};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{checked_branch, not_found, storage_error, tenant_scope};
use crate::utils::validate::required_text;
use crate::{try_respond, try_validate};

const MAX_CAPACITY: i32 = 1000;

fn validate_capacity(capacity: i32) -> Result<i32, String> {
    if !(1..=MAX_CAPACITY).contains(&capacity) {
        return Err(format!("capacity must be between 1 and {MAX_CAPACITY}"));
    }
    Ok(capacity)
}

pub async fn list_rooms(
    service: &RoomService,
    query: RoomQueryParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));

    match storage.list_rooms(&scope, query).await {
        Ok(rooms) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            rooms,
            "Rooms retrieved successfully",
        ))),
        Err(e) => Ok(storage_error("Failed to list rooms", e)),
    }
}

pub async fn get_room(
    service: &RoomService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));

    match storage.get_room(scope.company_id, id).await {
        Ok(Some(room)) if scope.can_access_branch(room.branch_id) => Ok(HttpResponse::Ok()
            .json(ApiResponse::success(room, "Room retrieved successfully"))),
        Ok(_) => Ok(not_found(ErrorCode::RoomNotFound, "Room not found")),
        Err(e) => Ok(storage_error("Failed to get room", e)),
    }
}

pub async fn create_room(
    service: &RoomService,
    mut req: CreateRoomRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));

    req.name = try_validate!(
        required_text("name", &req.name, 64),
        ErrorCode::ValidationFailed
    );
    req.capacity = try_validate!(validate_capacity(req.capacity), ErrorCode::ValidationFailed);
    req.branch_id = try_respond!(checked_branch(storage.as_ref(), &scope, req.branch_id).await);

    match storage.create_room(scope.company_id, req).await {
        Ok(room) => {
            info!("Room {} created in company {}", room.id, scope.company_id);
            Ok(HttpResponse::Created().json(ApiResponse::success(room, "Room created successfully")))
        }
        Err(e) => Ok(storage_error("Failed to create room", e)),
    }
}

pub async fn update_room(
    service: &RoomService,
    id: i64,
    mut update: UpdateRoomRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));

    match storage.get_room(scope.company_id, id).await {
        Ok(Some(room)) if scope.can_access_branch(room.branch_id) => {}
        Ok(_) => return Ok(not_found(ErrorCode::RoomNotFound, "Room not found")),
        Err(e) => return Ok(storage_error("Failed to get room", e)),
    }

    if let Some(name) = update.name.take() {
        update.name = Some(try_validate!(
            required_text("name", &name, 64),
            ErrorCode::ValidationFailed
        ));
    }
    if let Some(capacity) = update.capacity {
        try_validate!(validate_capacity(capacity), ErrorCode::ValidationFailed);
    }
    if update.branch_id.is_some() {
        update.branch_id =
            try_respond!(checked_branch(storage.as_ref(), &scope, update.branch_id).await);
    }

    match storage.update_room(scope.company_id, id, update).await {
        Ok(Some(room)) => {
            info!("Room {} updated", room.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(room, "Room updated successfully")))
        }
        Ok(None) => Ok(not_found(ErrorCode::RoomNotFound, "Room not found")),
        Err(e) => Ok(storage_error("Failed to update room", e)),
    }
}

pub async fn delete_room(
    service: &RoomService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));

    match storage.get_room(scope.company_id, id).await {
        Ok(Some(room)) if scope.can_access_branch(room.branch_id) => {}
        Ok(_) => return Ok(not_found(ErrorCode::RoomNotFound, "Room not found")),
        Err(e) => return Ok(storage_error("Failed to get room", e)),
    }

    match storage.delete_room(scope.company_id, id).await {
        Ok(true) => {
            info!("Room {} deleted from company {}", id, scope.company_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Room deleted successfully")))
        }
        Ok(false) => Ok(not_found(ErrorCode::RoomNotFound, "Room not found")),
        Err(e) => Ok(storage_error("Failed to delete room", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::validate_capacity;

    #[test]
    fn test_capacity_bounds() {
        assert_eq!(validate_capacity(12), Ok(12));
        assert!(validate_capacity(0).is_err());
        assert!(validate_capacity(1001).is_err());
    }
}
