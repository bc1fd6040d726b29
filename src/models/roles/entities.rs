use serde::{Deserialize, Serialize};
use ts_rs::TS;

crate::string_enum! {
    // 权限目录
    #[ts(export, export_to = "../frontend/src/types/generated/role.ts")]
    pub enum Permission {
        DashboardView => "dashboard.view",
        BranchesManage => "branches.manage",
        UsersManage => "users.manage",
        RolesManage => "roles.manage",
        SettingsManage => "settings.manage",
        TeachersView => "teachers.view",
        TeachersManage => "teachers.manage",
        StudentsView => "students.view",
        StudentsManage => "students.manage",
        RoomsManage => "rooms.manage",
        GroupsView => "groups.view",
        GroupsManage => "groups.manage",
        LessonsView => "lessons.view",
        LessonsManage => "lessons.manage",
        SubscriptionsView => "subscriptions.view",
        SubscriptionsManage => "subscriptions.manage",
        FinanceView => "finance.view",
        FinanceManage => "finance.manage",
        LeadsView => "leads.view",
        LeadsManage => "leads.manage",
    }
}

impl Permission {
    /// 权限所属模块，即点号前的部分
    pub fn module(&self) -> &'static str {
        let text = self.as_str();
        text.split_once('.').map_or(text, |(module, _)| module)
    }

    /// `*.manage` 隐含同模块的 `*.view`
    pub fn implied_by(&self) -> Option<Permission> {
        match self {
            Permission::TeachersView => Some(Permission::TeachersManage),
            Permission::StudentsView => Some(Permission::StudentsManage),
            Permission::GroupsView => Some(Permission::GroupsManage),
            Permission::LessonsView => Some(Permission::LessonsManage),
            Permission::SubscriptionsView => Some(Permission::SubscriptionsManage),
            Permission::FinanceView => Some(Permission::FinanceManage),
            Permission::LeadsView => Some(Permission::LeadsManage),
            _ => None,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Permission::DashboardView => "View dashboard statistics",
            Permission::BranchesManage => "Create, edit and delete branches",
            Permission::UsersManage => "Manage staff accounts",
            Permission::RolesManage => "Manage roles and their permissions",
            Permission::SettingsManage => "Edit center settings",
            Permission::TeachersView => "View teachers",
            Permission::TeachersManage => "Create, edit and delete teachers",
            Permission::StudentsView => "View students",
            Permission::StudentsManage => "Create, edit and delete students",
            Permission::RoomsManage => "Create, edit and delete rooms",
            Permission::GroupsView => "View groups and members",
            Permission::GroupsManage => "Manage groups and members",
            Permission::LessonsView => "View the schedule",
            Permission::LessonsManage => "Schedule, complete and cancel lessons",
            Permission::SubscriptionsView => "View subscriptions",
            Permission::SubscriptionsManage => "Sell and edit subscriptions",
            Permission::FinanceView => "View transactions and reports",
            Permission::FinanceManage => "Record and delete transactions",
            Permission::LeadsView => "View leads",
            Permission::LeadsManage => "Manage leads, activities and tasks",
        }
    }
}

/// 检查权限集合是否满足要求
pub fn grants(held: &[Permission], required: Permission) -> bool {
    held.contains(&required)
        || required
            .implied_by()
            .is_some_and(|manage| held.contains(&manage))
}

/// 解析权限字符串列表，遇到未知权限时返回该字符串；结果去重并保持顺序
pub fn parse_permissions(raw: &[String]) -> Result<Vec<Permission>, String> {
    let mut parsed = Vec::with_capacity(raw.len());
    for item in raw {
        let permission = item.trim().parse::<Permission>().map_err(|_| item.clone())?;
        if !parsed.contains(&permission) {
            parsed.push(permission);
        }
    }
    Ok(parsed)
}

// 角色
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/role.ts")]
pub struct Role {
    pub id: i64,
    pub company_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub permissions: Vec<Permission>,
    pub is_system: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// 注册机构时自动创建的系统角色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemRole {
    Administrator,
    Manager,
    Teacher,
}

impl SystemRole {
    pub const ALL: [SystemRole; 3] = [
        SystemRole::Administrator,
        SystemRole::Manager,
        SystemRole::Teacher,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SystemRole::Administrator => "Administrator",
            SystemRole::Manager => "Manager",
            SystemRole::Teacher => "Teacher",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SystemRole::Administrator => "Full access to the center",
            SystemRole::Manager => "Day-to-day operations without account administration",
            SystemRole::Teacher => "Read access to the schedule and students",
        }
    }

    pub fn permissions(&self) -> Vec<Permission> {
        match self {
            SystemRole::Administrator => Permission::ALL.to_vec(),
            SystemRole::Manager => Permission::ALL
                .iter()
                .copied()
                .filter(|p| {
                    !matches!(
                        p,
                        Permission::UsersManage
                            | Permission::RolesManage
                            | Permission::SettingsManage
                            | Permission::BranchesManage
                    )
                })
                .collect(),
            SystemRole::Teacher => vec![
                Permission::DashboardView,
                Permission::TeachersView,
                Permission::StudentsView,
                Permission::GroupsView,
                Permission::LessonsView,
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manage_implies_view() {
        let held = [Permission::StudentsManage];
        assert!(grants(&held, Permission::StudentsView));
        assert!(grants(&held, Permission::StudentsManage));
        assert!(!grants(&held, Permission::TeachersView));
    }

    #[test]
    fn test_view_does_not_imply_manage() {
        let held = [Permission::LeadsView];
        assert!(!grants(&held, Permission::LeadsManage));
    }

    #[test]
    fn test_parse_permissions_rejects_unknown() {
        let raw = vec!["lessons.view".to_string(), "lessons.fly".to_string()];
        assert_eq!(parse_permissions(&raw), Err("lessons.fly".to_string()));
    }

    #[test]
    fn test_parse_permissions_deduplicates() {
        let raw = vec![
            "finance.view".to_string(),
            " finance.view ".to_string(),
            "finance.manage".to_string(),
        ];
        assert_eq!(
            parse_permissions(&raw),
            Ok(vec![Permission::FinanceView, Permission::FinanceManage])
        );
    }

    #[test]
    fn test_manager_role_excludes_administration() {
        let perms = SystemRole::Manager.permissions();
        assert!(perms.contains(&Permission::LessonsManage));
        assert!(!perms.contains(&Permission::RolesManage));
        assert_eq!(
            SystemRole::Administrator.permissions().len(),
            Permission::ALL.len()
        );
    }

    #[test]
    fn test_module_prefix() {
        assert_eq!(Permission::SubscriptionsManage.module(), "subscriptions");
    }
}
