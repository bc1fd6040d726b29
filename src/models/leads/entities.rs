use serde::{Deserialize, Serialize};
use ts_rs::TS;

crate::string_enum! {
    #[ts(export, export_to = "../frontend/src/types/generated/lead.ts")]
    pub enum LeadStatus {
        New => "new",
        InProgress => "in_progress",
        Enrolled => "enrolled",
        Rejected => "rejected",
    }
}

impl LeadStatus {
    /// 线索漏斗允许的状态流转，enrolled 为终态
    pub fn can_transition_to(&self, next: LeadStatus) -> bool {
        use LeadStatus::*;
        matches!(
            (self, next),
            (New, InProgress)
                | (New, Rejected)
                | (InProgress, Enrolled)
                | (InProgress, Rejected)
                | (InProgress, New)
                | (Rejected, New)
        )
    }
}

crate::string_enum! {
    #[ts(export, export_to = "../frontend/src/types/generated/lead.ts")]
    pub enum ActivityKind {
        Call => "call",
        Email => "email",
        Meeting => "meeting",
        Note => "note",
        StatusChange => "status_change",
    }
}

// 招生线索
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/lead.ts")]
pub struct Lead {
    pub id: i64,
    pub company_id: i64,
    pub branch_id: Option<i64>,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub source: Option<String>,
    pub status: LeadStatus,
    pub assigned_to: Option<i64>,
    /// 转化后的学员
    pub student_id: Option<i64>,
    pub notes: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/lead.ts")]
pub struct LeadActivity {
    pub id: i64,
    pub lead_id: i64,
    pub kind: ActivityKind,
    pub content: String,
    pub created_by: Option<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/lead.ts")]
pub struct LeadTask {
    pub id: i64,
    pub lead_id: i64,
    pub title: String,
    pub due_at: Option<chrono::DateTime<chrono::Utc>>,
    pub is_done: bool,
    pub assigned_to: Option<i64>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::LeadStatus::*;

    #[test]
    fn test_funnel_transitions() {
        assert!(New.can_transition_to(InProgress));
        assert!(New.can_transition_to(Rejected));
        assert!(InProgress.can_transition_to(Enrolled));
        assert!(InProgress.can_transition_to(New));
        assert!(Rejected.can_transition_to(New));
    }

    #[test]
    fn test_forbidden_transitions() {
        assert!(!New.can_transition_to(Enrolled));
        assert!(!Rejected.can_transition_to(InProgress));
        assert!(!New.can_transition_to(New));
        for next in super::LeadStatus::ALL {
            assert!(!Enrolled.can_transition_to(*next));
        }
    }
}
