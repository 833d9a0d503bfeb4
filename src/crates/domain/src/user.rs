use crate::value::CatalogUserId;

/// 曲库中当前登录的用户
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogUser {
    pub id: CatalogUserId,
    pub display_name: Option<String>,
}

impl CatalogUser {
    pub fn new(id: CatalogUserId, display_name: Option<&str>) -> Self {
        Self {
            id,
            display_name: display_name.map(|s| s.to_string()),
        }
    }
}
