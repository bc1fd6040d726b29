use crate::models::common::PaginationQuery;
use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/room.ts")]
pub struct RoomQueryParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub search: Option<String>,
    #[serde(default, deserialize_with = "crate::models::common::de::optional_i64")]
    pub branch_id: Option<i64>,
    #[serde(default, deserialize_with = "crate::models::common::de::optional_bool")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/room.ts")]
pub struct CreateRoomRequest {
    pub name: String,
    pub capacity: i32,
    pub branch_id: Option<i64>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/room.ts")]
pub struct UpdateRoomRequest {
    pub name: Option<String>,
    pub capacity: Option<i32>,
    pub branch_id: Option<i64>,
    pub is_active: Option<bool>,
}
