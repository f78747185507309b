use catalog_common::{Difficulty, ProblemRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::CatalogError;

/// 完成状态筛选
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    Any,
    Solved,
    Unsolved,
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "any" => Ok(StatusFilter::Any),
            "solved" => Ok(StatusFilter::Solved),
            "unsolved" => Ok(StatusFilter::Unsolved),
            other => Err(format!("未知的状态筛选: {}", other)),
        }
    }
}

/// 筛选条件 - 每次交互后根据当前输入重建
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterCriteria {
    /// 搜索文本（空表示不限制）
    pub search_text: String,
    /// 完成状态
    pub status: StatusFilter,
    /// 选中的难度（空表示不限制）
    pub difficulties: BTreeSet<Difficulty>,
    /// 选中的标签，命中任意一个即可
    pub tags: BTreeSet<String>,
    /// 选中的公司，命中任意一个即可
    pub companies: BTreeSet<String>,
    /// 最少公司数量
    pub min_company_count: i64,
    /// 最低加权频率
    pub min_frequency: f64,
}

/// 可排序的字段
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    ProblemId,
    Title,
    Difficulty,
    CompanyCount,
    WeightedFrequency,
}

impl SortColumn {
    pub const ALL: [SortColumn; 5] = [
        SortColumn::ProblemId,
        SortColumn::Title,
        SortColumn::Difficulty,
        SortColumn::CompanyCount,
        SortColumn::WeightedFrequency,
    ];

    /// 与数据集字段名一致的列名
    pub fn as_str(&self) -> &'static str {
        match self {
            SortColumn::ProblemId => "problem_id",
            SortColumn::Title => "title",
            SortColumn::Difficulty => "difficulty",
            SortColumn::CompanyCount => "company_count",
            SortColumn::WeightedFrequency => "weighted_frequency",
        }
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortColumn {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortColumn::ALL
            .into_iter()
            .find(|column| column.as_str() == s)
            .ok_or_else(|| CatalogError::UnknownSortColumn(s.to_string()))
    }
}

/// 排序方向
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// 当前排序状态
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct SortState {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            column: SortColumn::WeightedFrequency,
            direction: SortDirection::Descending,
        }
    }
}

impl SortState {
    /// 点击列头：同一列翻转方向，新列一律从降序开始
    pub fn toggled(self, column: SortColumn) -> Self {
        if self.column == column {
            Self {
                column,
                direction: self.direction.flipped(),
            }
        } else {
            Self {
                column,
                direction: SortDirection::Descending,
            }
        }
    }
}

/// 页码按钮
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PageButton {
    Page { number: usize, active: bool },
    Ellipsis,
}

/// 分页结果
#[derive(Clone, Debug, PartialEq)]
pub struct Page<T> {
    /// 当前页的条目
    pub items: Vec<T>,
    /// 总页数
    pub total_pages: usize,
}

/// 界面主题
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("未知的主题: {}", other)),
        }
    }
}

/// 提示类型
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Info,
    Error,
}

/// 会自动消失的提示消息
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub dismiss_after_ms: f64,
}

/// 带完成状态的题目视图
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ProblemView<'a> {
    #[serde(flatten)]
    pub record: &'a ProblemRecord,
    pub solved: bool,
}

/// 提供给渲染层的当前页快照
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PageView<'a> {
    pub items: Vec<ProblemView<'a>>,
    pub current_page: usize,
    pub total_pages: usize,
    pub page_size: usize,
    pub filtered_count: usize,
    pub buttons: Vec<PageButton>,
    pub sort: SortState,
    pub criteria: &'a FilterCriteria,
    pub search_pending: bool,
    pub theme: Theme,
}
