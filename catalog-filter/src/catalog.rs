use catalog_common::compression::{from_compressed, to_compressed, SNAPSHOT_VERSION};
use catalog_common::ProblemRecord;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::builder::{CatalogBuilder, LoadReport};
use crate::error::CatalogError;

/// 筛选项及其对应的题目数量
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct FacetOption {
    pub value: String,
    pub count: usize,
}

/// 全部可选的标签和公司，按名称升序
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Facets {
    pub tags: Vec<FacetOption>,
    pub companies: Vec<FacetOption>,
}

/// 题库 - 加载后不再变化的全部题目
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<ProblemRecord>,
    positions: HashMap<String, usize>,
    /// 标签 -> 题目下标
    tag_index: BTreeMap<String, Vec<usize>>,
    /// 公司 -> 题目下标
    company_index: BTreeMap<String, Vec<usize>>,
}

impl Catalog {
    pub(crate) fn from_parts(
        records: Vec<ProblemRecord>,
        tag_index: BTreeMap<String, Vec<usize>>,
        company_index: BTreeMap<String, Vec<usize>>,
    ) -> Self {
        let positions = records
            .iter()
            .enumerate()
            .map(|(i, record)| (record.problem_id.clone(), i))
            .collect();

        Self {
            records,
            positions,
            tag_index,
            company_index,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// 从已解析的记录构建，重复ID会被丢弃
    pub fn from_records(records: Vec<ProblemRecord>) -> LoadReport {
        let mut builder = CatalogBuilder::new();
        for (position, record) in records.into_iter().enumerate() {
            builder.add_record(position, record);
        }
        builder.build()
    }

    /// 从压缩快照恢复
    pub fn from_snapshot(data: &[u8]) -> Result<LoadReport, CatalogError> {
        let records: Vec<ProblemRecord> = from_compressed(data)?;
        Ok(Self::from_records(records))
    }

    /// 写成压缩快照
    pub fn to_snapshot(&self) -> Result<Vec<u8>, CatalogError> {
        Ok(to_compressed(&self.records, SNAPSHOT_VERSION)?)
    }

    pub fn records(&self) -> &[ProblemRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, problem_id: &str) -> Option<&ProblemRecord> {
        self.positions.get(problem_id).map(|&i| &self.records[i])
    }

    pub fn contains(&self, problem_id: &str) -> bool {
        self.positions.contains_key(problem_id)
    }

    /// 未筛选数据集中不同公司的数量
    pub fn unique_company_count(&self) -> usize {
        self.company_index.len()
    }

    pub fn facets(&self) -> Facets {
        Facets {
            tags: facet_options(&self.tag_index),
            companies: facet_options(&self.company_index),
        }
    }
}

fn facet_options(index: &BTreeMap<String, Vec<usize>>) -> Vec<FacetOption> {
    index
        .iter()
        .map(|(value, ids)| FacetOption {
            value: value.clone(),
            count: ids.len(),
        })
        .collect()
}
