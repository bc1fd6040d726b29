/// 当前请求可访问的数据范围
///
/// `company_id` 总是取自已认证用户。绑定分校的用户只能访问本分校的数据，
/// 未绑定的用户可以通过查询参数自行选择分校。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantScope {
    pub company_id: i64,
    pub branch_id: Option<i64>,
}

impl TenantScope {
    pub fn new(company_id: i64, branch_id: Option<i64>) -> Self {
        Self {
            company_id,
            branch_id,
        }
    }

    /// 列表查询时实际使用的分校过滤条件
    pub fn branch_filter(&self, requested: Option<i64>) -> Option<i64> {
        self.branch_id.or(requested)
    }

    /// 是否可以访问属于 `branch_id` 的数据
    pub fn can_access_branch(&self, branch_id: Option<i64>) -> bool {
        match self.branch_id {
            None => true,
            Some(own) => branch_id.is_none() || branch_id == Some(own),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bound_user_is_pinned_to_branch() {
        let scope = TenantScope::new(1, Some(3));
        assert_eq!(scope.branch_filter(Some(4)), Some(3));
        assert!(scope.can_access_branch(Some(3)));
        assert!(scope.can_access_branch(None));
        assert!(!scope.can_access_branch(Some(4)));
    }

    #[test]
    fn test_unbound_user_chooses_branch() {
        let scope = TenantScope::new(1, None);
        assert_eq!(scope.branch_filter(Some(4)), Some(4));
        assert_eq!(scope.branch_filter(None), None);
        assert!(scope.can_access_branch(Some(9)));
    }
}
