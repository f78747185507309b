use catalog_common::Difficulty;
use serde::Serialize;

use crate::catalog::{Catalog, FacetOption};
use crate::solved::SolvedSet;

/// 洞察页展示的热门标签数量
pub const TOP_TAGS: usize = 15;
/// 洞察页展示的热门公司数量
pub const TOP_COMPANIES: usize = 12;

/// 统计信息 - 每次筛选或完成状态变化后重新计算
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_problems: usize,
    pub solved_problems: usize,
    pub solved_easy: usize,
    pub solved_medium: usize,
    pub solved_hard: usize,
    /// 未筛选数据集中的公司数
    pub unique_companies: usize,
    pub filtered_problems: usize,
    /// 完成百分比，保留一位小数
    pub completion_rate: f64,
}

/// 按难度统计的题目数量
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct DifficultyCount {
    pub difficulty: Difficulty,
    pub count: usize,
}

/// 洞察数据：难度分布、热门标签和热门公司
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Insights {
    pub difficulty_distribution: Vec<DifficultyCount>,
    pub top_tags: Vec<FacetOption>,
    pub top_companies: Vec<FacetOption>,
}

/// 完成率；总数为 0 时为 0
pub fn completion_rate(solved: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (solved as f64 / total as f64 * 1000.0).round() / 10.0
}

/// 计算统计信息，已完成数只统计题库中存在的题目
pub fn compute(catalog: &Catalog, solved: &SolvedSet, filtered_count: usize) -> Statistics {
    let mut by_difficulty = [0usize; 3];
    for record in catalog.records() {
        if solved.is_solved(&record.problem_id) {
            by_difficulty[record.difficulty as usize] += 1;
        }
    }
    let solved_problems = by_difficulty.iter().sum();

    Statistics {
        total_problems: catalog.len(),
        solved_problems,
        solved_easy: by_difficulty[Difficulty::Easy as usize],
        solved_medium: by_difficulty[Difficulty::Medium as usize],
        solved_hard: by_difficulty[Difficulty::Hard as usize],
        unique_companies: catalog.unique_company_count(),
        filtered_problems: filtered_count,
        completion_rate: completion_rate(solved_problems, catalog.len()),
    }
}

/// 计算洞察数据
pub fn insights(catalog: &Catalog) -> Insights {
    let difficulty_distribution = Difficulty::ALL
        .iter()
        .map(|&difficulty| DifficultyCount {
            difficulty,
            count: catalog
                .records()
                .iter()
                .filter(|record| record.difficulty == difficulty)
                .count(),
        })
        .collect();

    let facets = catalog.facets();
    Insights {
        difficulty_distribution,
        top_tags: top(facets.tags, TOP_TAGS),
        top_companies: top(facets.companies, TOP_COMPANIES),
    }
}

// 按数量降序，数量相同按名称升序
fn top(mut options: Vec<FacetOption>, limit: usize) -> Vec<FacetOption> {
    options.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
    options.truncate(limit);
    options
}
