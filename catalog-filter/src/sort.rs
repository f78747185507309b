use catalog_common::ProblemRecord;
use std::cmp::Ordering;

use crate::models::{SortColumn, SortDirection, SortState};

/// 按给定列和方向排序，返回新的视图
pub fn sort<'a>(mut records: Vec<&'a ProblemRecord>, state: SortState) -> Vec<&'a ProblemRecord> {
    records.sort_by(|a, b| compare(a, b, state));
    records
}

/// 比较两条记录；主键相同时按题目ID升序决出先后，与方向无关
pub fn compare(a: &ProblemRecord, b: &ProblemRecord, state: SortState) -> Ordering {
    let primary = compare_column(a, b, state.column);
    let primary = match state.direction {
        SortDirection::Ascending => primary,
        SortDirection::Descending => primary.reverse(),
    };
    primary.then_with(|| a.problem_id.cmp(&b.problem_id))
}

fn compare_column(a: &ProblemRecord, b: &ProblemRecord, column: SortColumn) -> Ordering {
    match column {
        SortColumn::ProblemId => compare_text(&a.problem_id, &b.problem_id),
        SortColumn::Title => compare_text(&a.title, &b.title),
        SortColumn::Difficulty => a.difficulty.cmp(&b.difficulty),
        SortColumn::CompanyCount => a.company_count.cmp(&b.company_count),
        SortColumn::WeightedFrequency => a.weighted_frequency.total_cmp(&b.weighted_frequency),
    }
}

// 文本字段不区分大小写
fn compare_text(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}
