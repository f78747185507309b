use catalog_common::ProblemRecord;
use chrono::NaiveDate;
use serde::Serialize;

use crate::error::CatalogError;

/// 导出文件名前缀
pub const EXPORT_PREFIX: &str = "filtered_leetcode_problems_";

/// 待下载的导出文档
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub file_name: String,
    pub content: String,
    pub count: usize,
}

/// 以日期命名的导出文件名
pub fn export_file_name(date: NaiveDate) -> String {
    format!("{}{}.json", EXPORT_PREFIX, date.format("%Y-%m-%d"))
}

/// 将当前筛选结果序列化为格式化的JSON数组
pub fn export_records(records: &[&ProblemRecord], date: NaiveDate) -> Result<ExportDocument, CatalogError> {
    Ok(ExportDocument {
        file_name: export_file_name(date),
        content: serde_json::to_string_pretty(records)?,
        count: records.len(),
    })
}
