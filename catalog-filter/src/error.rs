use catalog_common::SnapshotError;
use thiserror::Error;

/// 题库会话中可能出现的错误
#[derive(Debug, Error)]
pub enum CatalogError {
    /// 数据集加载或解析失败
    #[error("加载题库数据失败: {0}")]
    LoadFailure(String),

    /// 排序列不在可排序字段之内
    #[error("未知的排序列: {0}")]
    UnknownSortColumn(String),

    /// 请求的页码超出范围
    #[error("页码必须介于 1 和 {total_pages} 之间，收到 {requested}")]
    PageOutOfRange { requested: usize, total_pages: usize },

    /// 持久化存储不可用
    #[error("持久化存储失败: {0}")]
    Persistence(String),

    #[error("快照处理失败: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("序列化失败: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("配置无效: {0}")]
    InvalidConfig(String),
}
