use catalog_common::{Difficulty, ProblemRecord};
use catalog_filter::filter;
use catalog_filter::pagination::paginate;
use catalog_filter::sort;
use catalog_filter::storage::SOLVED_KEY;
use catalog_filter::{
    Action, Catalog, FilterCriteria, MemoryStorage, Session, SessionConfig, SolvedSet, SortColumn, SortState,
    StatusFilter,
};

fn record(id: &str, difficulty: Difficulty, company_count: u32, frequency: f64, tag: &str, company: &str) -> ProblemRecord {
    ProblemRecord {
        problem_id: id.to_string(),
        title: format!("Problem {}", id),
        difficulty,
        tags: vec![tag.to_string()],
        companies: vec![company.to_string()],
        company_count,
        weighted_frequency: frequency,
        url: format!("https://leetcode.com/problems/{}/", id),
    }
}

fn two_records() -> Vec<ProblemRecord> {
    vec![
        record("1", Difficulty::Easy, 2, 1.0, "dp", "google"),
        record("2", Difficulty::Hard, 5, 3.0, "graph", "meta"),
    ]
}

fn ids(records: &[&ProblemRecord]) -> Vec<String> {
    records.iter().map(|r| r.problem_id.clone()).collect()
}

#[test]
fn min_frequency_keeps_only_frequent_record() {
    let records = two_records();
    let criteria = FilterCriteria {
        min_frequency: 2.0,
        ..FilterCriteria::default()
    };
    let filtered = filter::apply(&records, &SolvedSet::default(), &criteria);
    assert_eq!(ids(&filtered), vec!["2"]);
}

#[test]
fn frequency_sort_toggles_direction() {
    let records = two_records();
    let descending = SortState::default().toggled(SortColumn::Title).toggled(SortColumn::WeightedFrequency);
    let sorted = sort::sort(records.iter().collect(), descending);
    assert_eq!(ids(&sorted), vec!["2", "1"]);

    let ascending = descending.toggled(SortColumn::WeightedFrequency);
    let sorted = sort::sort(records.iter().collect(), ascending);
    assert_eq!(ids(&sorted), vec!["1", "2"]);
}

#[test]
fn second_page_of_size_one_holds_second_record() {
    let records = two_records();
    let refs: Vec<&ProblemRecord> = records.iter().collect();
    let page = paginate(&refs, 1, 2);
    assert_eq!(ids(&page.items), vec!["2"]);
    assert_eq!(page.total_pages, 2);
}

#[test]
fn status_filter_splits_solved_and_unsolved() {
    let records = two_records();
    let mut solved = SolvedSet::default();
    solved.toggle("1");

    let criteria = FilterCriteria {
        status: StatusFilter::Solved,
        ..FilterCriteria::default()
    };
    assert_eq!(ids(&filter::apply(&records, &solved, &criteria)), vec!["1"]);

    let criteria = FilterCriteria {
        status: StatusFilter::Unsolved,
        ..FilterCriteria::default()
    };
    assert_eq!(ids(&filter::apply(&records, &solved, &criteria)), vec!["2"]);
}

#[test]
fn session_runs_the_same_scenarios_through_actions() {
    let report = Catalog::from_records(two_records());
    let config = SessionConfig {
        page_size: 1,
        ..SessionConfig::default()
    };
    let mut session = Session::new(report, MemoryStorage::new(), config).unwrap();

    let visible = |session: &Session<MemoryStorage>| ids(&session.visible_records());
    assert_eq!(visible(&session), vec!["2"]);
    session.dispatch(Action::NextPage).unwrap();
    assert_eq!(visible(&session), vec!["1"]);

    session.dispatch(Action::ToggleSolved { problem_id: "1".to_string() }).unwrap();
    assert_eq!(session.storage().raw(SOLVED_KEY), Some(r#"["1"]"#));
    session.dispatch(Action::SetStatus { status: StatusFilter::Solved }).unwrap();
    assert_eq!(ids(&session.filtered_records()), vec!["1"]);
    session.dispatch(Action::SetStatus { status: StatusFilter::Unsolved }).unwrap();
    assert_eq!(ids(&session.filtered_records()), vec!["2"]);

    let stats = session.statistics();
    assert_eq!(stats.total_problems, 2);
    assert_eq!(stats.solved_easy, 1);
    assert_eq!(stats.filtered_problems, 1);
    assert_eq!(stats.completion_rate, 50.0);
}

#[test]
fn snapshot_round_trip_restores_the_catalog() {
    let report = Catalog::from_records(two_records());
    let bytes = report.catalog.to_snapshot().unwrap();
    let session = Session::from_snapshot(&bytes, MemoryStorage::new(), SessionConfig::default()).unwrap();
    assert_eq!(session.catalog().len(), 2);
    assert_eq!(session.facets().tags.len(), 2);

    let mut broken = Session::from_snapshot(b"nope", MemoryStorage::new(), SessionConfig::default()).unwrap();
    assert!(broken.catalog().is_empty());
    assert_eq!(broken.take_notices().len(), 1);
}
