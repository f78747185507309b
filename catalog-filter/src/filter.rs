use catalog_common::ProblemRecord;

use crate::models::{FilterCriteria, StatusFilter};
use crate::solved::SolvedSet;

/// 筛选题目，保持输入的相对顺序
pub fn apply<'a, I>(records: I, solved: &SolvedSet, criteria: &FilterCriteria) -> Vec<&'a ProblemRecord>
where
    I: IntoIterator<Item = &'a ProblemRecord>,
{
    let needle = criteria.search_text.to_lowercase();
    records
        .into_iter()
        .filter(|record| matches_with_needle(record, solved, criteria, &needle))
        .collect()
}

/// 筛选题目，返回满足条件的记录下标
pub fn apply_indices(records: &[ProblemRecord], solved: &SolvedSet, criteria: &FilterCriteria) -> Vec<usize> {
    let needle = criteria.search_text.to_lowercase();
    records
        .iter()
        .enumerate()
        .filter(|(_, record)| matches_with_needle(record, solved, criteria, &needle))
        .map(|(i, _)| i)
        .collect()
}

/// 判断单条记录是否满足全部筛选条件
pub fn matches(record: &ProblemRecord, solved: &SolvedSet, criteria: &FilterCriteria) -> bool {
    matches_with_needle(record, solved, criteria, &criteria.search_text.to_lowercase())
}

fn matches_with_needle(
    record: &ProblemRecord,
    solved: &SolvedSet,
    criteria: &FilterCriteria,
    needle: &str,
) -> bool {
    matches_search(record, &criteria.search_text, needle)
        && matches_status(record, solved, criteria.status)
        && (criteria.difficulties.is_empty() || criteria.difficulties.contains(&record.difficulty))
        && i64::from(record.company_count) >= criteria.min_company_count
        && record.weighted_frequency >= criteria.min_frequency
        && (criteria.tags.is_empty() || criteria.tags.iter().any(|tag| record.has_tag(tag)))
        && (criteria.companies.is_empty()
            || criteria.companies.iter().any(|company| record.has_company(company)))
}

// 标题不区分大小写，题目ID按原样匹配
fn matches_search(record: &ProblemRecord, search_text: &str, needle: &str) -> bool {
    search_text.is_empty()
        || record.title.to_lowercase().contains(needle)
        || record.problem_id.contains(search_text)
}

fn matches_status(record: &ProblemRecord, solved: &SolvedSet, status: StatusFilter) -> bool {
    match status {
        StatusFilter::Any => true,
        StatusFilter::Solved => solved.is_solved(&record.problem_id),
        StatusFilter::Unsolved => !solved.is_solved(&record.problem_id),
    }
}
