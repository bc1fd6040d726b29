pub mod manage;
pub mod query;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::teachers::{CreateTeacherRequest, TeacherQueryParams, UpdateTeacherRequest};
use crate::services::common::lazy_service;

lazy_service!(TeacherService);

impl TeacherService {
    // 教师列表，支持姓名、电话、邮箱搜索
    pub async fn list_teachers(
        &self,
        query: TeacherQueryParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        query::list_teachers(self, query, request).await
    }

    pub async fn get_teacher(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        query::get_teacher(self, id, request).await
    }

    pub async fn create_teacher(
        &self,
        req: CreateTeacherRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        manage::create_teacher(self, req, request).await
    }

    pub async fn update_teacher(
        &self,
        id: i64,
        update: UpdateTeacherRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        manage::update_teacher(self, id, update, request).await
    }

    pub async fn delete_teacher(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        manage::delete_teacher(self, id, request).await
    }
}
