use super::entities::Lead;
use crate::models::students::Student;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/lead.ts")]
pub struct ConvertLeadResponse {
    pub lead: Lead,
    pub student: Student,
}
