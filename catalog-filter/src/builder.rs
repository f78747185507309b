use catalog_common::{parse_record, ProblemRecord, RecordIssue};
use log::{info, warn};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

use crate::catalog::Catalog;
use crate::error::CatalogError;

/// 数据校验警告
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationWarning {
    /// 记录在数据集中的位置
    pub position: usize,
    /// 记录的题目ID（如果能读到）
    pub problem_id: Option<String>,
    /// 问题描述
    #[serde(serialize_with = "serialize_issue")]
    pub issue: RecordIssue,
}

impl ValidationWarning {
    /// 该记录是否被丢弃
    pub fn rejected(&self) -> bool {
        self.issue.is_rejection()
    }
}

fn serialize_issue<S: serde::Serializer>(issue: &RecordIssue, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(issue)
}

/// 加载结果：题库及校验过程中产生的警告
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub catalog: Catalog,
    pub warnings: Vec<ValidationWarning>,
}

impl LoadReport {
    pub fn rejected_count(&self) -> usize {
        self.warnings.iter().filter(|w| w.rejected()).count()
    }
}

/// 题库构建器 - 校验记录并建立标签、公司索引
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    records: Vec<ProblemRecord>,
    seen: HashSet<String>,
    warnings: Vec<ValidationWarning>,
}

impl CatalogBuilder {
    /// 创建新的题库构建器
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加一条未经校验的JSON记录
    pub fn add_value(&mut self, position: usize, value: serde_json::Value) {
        let problem_id = value
            .get("problem_id")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string);

        match parse_record(value) {
            Ok(record) => self.add_record(position, record),
            Err(issue) => self.warn(position, problem_id, issue),
        }
    }

    /// 添加一条已解析的记录，重复ID会被丢弃
    pub fn add_record(&mut self, position: usize, record: ProblemRecord) {
        if self.seen.contains(&record.problem_id) {
            let id = record.problem_id.clone();
            self.warn(position, Some(id.clone()), RecordIssue::DuplicateId(id));
            return;
        }

        if let Some(issue) = record.company_count_mismatch() {
            self.warn(position, Some(record.problem_id.clone()), issue);
        }

        self.seen.insert(record.problem_id.clone());
        self.records.push(record);
    }

    fn warn(&mut self, position: usize, problem_id: Option<String>, issue: RecordIssue) {
        let id = problem_id.as_deref().unwrap_or("?");
        if issue.is_rejection() {
            warn!("丢弃第 {} 条记录 ({}): {}", position, id, issue);
        } else {
            warn!("第 {} 条记录 ({}) 数据不一致: {}", position, id, issue);
        }
        self.warnings.push(ValidationWarning {
            position,
            problem_id,
            issue,
        });
    }

    /// 构建题库
    pub fn build(self) -> LoadReport {
        let mut tag_index: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        let mut company_index: BTreeMap<String, Vec<usize>> = BTreeMap::new();

        for (i, record) in self.records.iter().enumerate() {
            for tag in &record.tags {
                let ids = tag_index.entry(tag.clone()).or_default();
                if ids.last() != Some(&i) {
                    ids.push(i);
                }
            }
            for company in &record.companies {
                let ids = company_index.entry(company.clone()).or_default();
                if ids.last() != Some(&i) {
                    ids.push(i);
                }
            }
        }

        info!(
            "题库构建完成，题目数量: {}, 标签数量: {}, 公司数量: {}, 警告: {}",
            self.records.len(),
            tag_index.len(),
            company_index.len(),
            self.warnings.len()
        );

        LoadReport {
            catalog: Catalog::from_parts(self.records, tag_index, company_index),
            warnings: self.warnings,
        }
    }
}

/// 解析JSON数组形式的数据集
pub fn parse_dataset(json: &str) -> Result<LoadReport, CatalogError> {
    let values: Vec<serde_json::Value> =
        serde_json::from_str(json).map_err(|e| CatalogError::LoadFailure(e.to_string()))?;

    let mut builder = CatalogBuilder::new();
    for (position, value) in values.into_iter().enumerate() {
        builder.add_value(position, value);
    }
    Ok(builder.build())
}
