//! User Queries

/// 获取用户详情查询
#[derive(Debug, Clone)]
pub struct GetUserQuery {
    pub user_id: i64,
}
