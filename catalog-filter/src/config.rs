use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// 会话配置，所有字段都有默认值
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionConfig {
    /// 每页条数
    pub page_size: usize,
    /// 搜索输入的防抖时间（毫秒）
    pub search_debounce_ms: f64,
    /// 页码窗口最多显示的页数
    pub max_visible_pages: usize,
    /// 提示自动消失的时间（毫秒）
    pub notice_duration_ms: f64,
    /// 清除筛选后的最少公司数量
    pub default_min_company_count: i64,
    /// 清除筛选后的最低频率
    pub default_min_frequency: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            search_debounce_ms: 300.0,
            max_visible_pages: 7,
            notice_duration_ms: 3000.0,
            default_min_company_count: 1,
            default_min_frequency: 0.0,
        }
    }
}

impl SessionConfig {
    /// 解析JSON配置，缺省字段使用默认值
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let config: SessionConfig =
            serde_json::from_str(json).map_err(|e| CatalogError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.page_size == 0 {
            return Err(CatalogError::InvalidConfig("pageSize 必须大于 0".to_string()));
        }
        if self.max_visible_pages == 0 {
            return Err(CatalogError::InvalidConfig("maxVisiblePages 必须大于 0".to_string()));
        }
        if !self.search_debounce_ms.is_finite() || self.search_debounce_ms < 0.0 {
            return Err(CatalogError::InvalidConfig("searchDebounceMs 必须是非负数".to_string()));
        }
        Ok(())
    }
}
