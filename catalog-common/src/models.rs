use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 题目难度
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// 按自然顺序排列的全部难度
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("未知的难度: {}", other)),
        }
    }
}

/// 题目记录 - 加载后在整个会话内保持不变
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ProblemRecord {
    /// 题目唯一标识符
    pub problem_id: String,
    /// 题目标题
    pub title: String,
    /// 难度
    pub difficulty: Difficulty,
    /// 标签列表（保留展示顺序）
    pub tags: Vec<String>,
    /// 考察过该题的公司
    pub companies: Vec<String>,
    /// 公司数量
    pub company_count: u32,
    /// 加权出现频率
    pub weighted_frequency: f64,
    /// 题目链接（加载时已去除首尾空白）
    pub url: String,
}

impl ProblemRecord {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn has_company(&self, company: &str) -> bool {
        self.companies.iter().any(|c| c == company)
    }

    /// company_count 与公司列表长度不一致时返回对应的问题
    pub fn company_count_mismatch(&self) -> Option<RecordIssue> {
        if self.company_count as usize != self.companies.len() {
            Some(RecordIssue::CompanyCountMismatch {
                declared: self.company_count,
                actual: self.companies.len(),
            })
        } else {
            None
        }
    }
}

/// 记录校验时发现的问题
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordIssue {
    #[error("缺少字段 `{0}`")]
    MissingField(&'static str),

    #[error("字段 `{field}` 无效: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("无法解析记录: {0}")]
    Malformed(String),

    #[error("重复的题目ID `{0}`")]
    DuplicateId(String),

    #[error("company_count 为 {declared}，但公司列表包含 {actual} 项")]
    CompanyCountMismatch { declared: u32, actual: usize },
}

impl RecordIssue {
    /// 该问题是否导致记录被丢弃
    pub fn is_rejection(&self) -> bool {
        !matches!(self, RecordIssue::CompanyCountMismatch { .. })
    }
}

/// 未经校验的原始记录 - 所有字段均可能缺失
#[derive(Deserialize, Debug, Default)]
pub struct RawProblemRecord {
    pub problem_id: Option<String>,
    pub title: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub tags: Option<Vec<String>>,
    pub companies: Option<Vec<String>>,
    pub company_count: Option<i64>,
    pub weighted_frequency: Option<f64>,
    pub url: Option<String>,
}

impl RawProblemRecord {
    /// 校验并转换为题目记录
    pub fn into_record(self) -> Result<ProblemRecord, RecordIssue> {
        let problem_id = self.problem_id.ok_or(RecordIssue::MissingField("problem_id"))?;
        if problem_id.trim().is_empty() {
            return Err(RecordIssue::InvalidField {
                field: "problem_id",
                reason: "不能为空".to_string(),
            });
        }

        let title = self.title.ok_or(RecordIssue::MissingField("title"))?;
        let difficulty = self.difficulty.ok_or(RecordIssue::MissingField("difficulty"))?;
        let tags = self.tags.ok_or(RecordIssue::MissingField("tags"))?;
        let companies = self.companies.ok_or(RecordIssue::MissingField("companies"))?;

        let company_count = self.company_count.ok_or(RecordIssue::MissingField("company_count"))?;
        let company_count = u32::try_from(company_count).map_err(|_| RecordIssue::InvalidField {
            field: "company_count",
            reason: format!("{} 不是非负整数", company_count),
        })?;

        let weighted_frequency = self
            .weighted_frequency
            .ok_or(RecordIssue::MissingField("weighted_frequency"))?;
        if !weighted_frequency.is_finite() || weighted_frequency < 0.0 {
            return Err(RecordIssue::InvalidField {
                field: "weighted_frequency",
                reason: format!("{} 不是非负数", weighted_frequency),
            });
        }

        let url = self.url.ok_or(RecordIssue::MissingField("url"))?;

        Ok(ProblemRecord {
            problem_id,
            title,
            difficulty,
            tags,
            companies,
            company_count,
            weighted_frequency,
            url: url.trim().to_string(),
        })
    }
}

/// 从单个JSON值解析并校验记录
pub fn parse_record(value: serde_json::Value) -> Result<ProblemRecord, RecordIssue> {
    let raw: RawProblemRecord =
        serde_json::from_value(value).map_err(|e| RecordIssue::Malformed(e.to_string()))?;
    raw.into_record()
}
