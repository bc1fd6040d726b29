pub mod manage;
pub mod query;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::students::{CreateStudentRequest, StudentQueryParams, UpdateStudentRequest};
use crate::services::common::lazy_service;

lazy_service!(StudentService);

impl StudentService {
    // 学员列表，可按班组过滤
    pub async fn list_students(
        &self,
        query: StudentQueryParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        query::list_students(self, query, request).await
    }

    pub async fn get_student(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        query::get_student(self, id, request).await
    }

    pub async fn create_student(
        &self,
        req: CreateStudentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        manage::create_student(self, req, request).await
    }

    pub async fn update_student(
        &self,
        id: i64,
        update: UpdateStudentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        manage::update_student(self, id, update, request).await
    }

    pub async fn delete_student(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        manage::delete_student(self, id, request).await
    }
}
