use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{LeadService, check_assignee, visible_lead};
use crate::models::leads::{CreateTaskRequest, UpdateTaskRequest};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{not_found, storage_error, tenant_scope};
use crate::utils::validate::required_text;
use crate::{try_respond, try_validate};

pub async fn list_tasks(
    service: &LeadService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));
    try_respond!(visible_lead(storage.as_ref(), &scope, id).await);

    match storage.list_lead_tasks(id).await {
        Ok(tasks) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            tasks,
            "Tasks retrieved successfully",
        ))),
        Err(e) => Ok(storage_error("Failed to list tasks", e)),
    }
}

pub async fn create_task(
    service: &LeadService,
    id: i64,
    mut req: CreateTaskRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));
    let lead = try_respond!(visible_lead(storage.as_ref(), &scope, id).await);

    req.title = try_validate!(
        required_text("title", &req.title, 255),
        ErrorCode::ValidationFailed
    );
    // 未指定时沿用线索负责人
    if req.assigned_to.is_none() {
        req.assigned_to = lead.assigned_to;
    } else {
        try_respond!(check_assignee(storage.as_ref(), &scope, req.assigned_to).await);
    }

    match storage.create_lead_task(id, req).await {
        Ok(task) => {
            info!("Task {} created for lead {}", task.id, id);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                task,
                "Task created successfully",
            )))
        }
        Err(e) => Ok(storage_error("Failed to create task", e)),
    }
}

pub async fn update_task(
    service: &LeadService,
    id: i64,
    task_id: i64,
    mut update: UpdateTaskRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));
    try_respond!(visible_lead(storage.as_ref(), &scope, id).await);

    if let Some(title) = update.title.take() {
        update.title = Some(try_validate!(
            required_text("title", &title, 255),
            ErrorCode::ValidationFailed
        ));
    }
    try_respond!(check_assignee(storage.as_ref(), &scope, update.assigned_to).await);

    match storage.update_lead_task(id, task_id, update).await {
        Ok(Some(task)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            task,
            "Task updated successfully",
        ))),
        Ok(None) => Ok(not_found(ErrorCode::LeadTaskNotFound, "Task not found")),
        Err(e) => Ok(storage_error("Failed to update task", e)),
    }
}

pub async fn delete_task(
    service: &LeadService,
    id: i64,
    task_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));
    try_respond!(visible_lead(storage.as_ref(), &scope, id).await);

    match storage.delete_lead_task(id, task_id).await {
        Ok(true) => Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Task deleted successfully"))),
        Ok(false) => Ok(not_found(ErrorCode::LeadTaskNotFound, "Task not found")),
        Err(e) => Ok(storage_error("Failed to delete task", e)),
    }
}
