pub mod manage;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::rooms::{CreateRoomRequest, RoomQueryParams, UpdateRoomRequest};
use crate::services::common::lazy_service;

lazy_service!(RoomService);

impl RoomService {
    pub async fn list_rooms(
        &self,
        query: RoomQueryParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        manage::list_rooms(self, query, request).await
    }

    pub async fn get_room(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        manage::get_room(self, id, request).await
    }

    pub async fn create_room(
        &self,
        req: CreateRoomRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        manage::create_room(self, req, request).await
    }

    pub async fn update_room(
        &self,
        id: i64,
        update: UpdateRoomRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        manage::update_room(self, id, update, request).await
    }

    pub async fn delete_room(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        manage::delete_room(self, id, request).await
    }
}
