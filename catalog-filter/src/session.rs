use catalog_common::{Difficulty, ProblemRecord};
use chrono::NaiveDate;
use log::{debug, error, warn};
use serde::Deserialize;
use std::collections::BTreeSet;

use crate::builder::{parse_dataset, LoadReport, ValidationWarning};
use crate::catalog::{Catalog, Facets};
use crate::config::SessionConfig;
use crate::debounce::Debouncer;
use crate::error::CatalogError;
use crate::export::{export_records, ExportDocument};
use crate::filter;
use crate::models::{
    FilterCriteria, Notice, NoticeKind, PageView, ProblemView, SortColumn, SortState, StatusFilter, Theme,
};
use crate::pagination::{clamp_page, page_buttons, paginate, total_pages};
use crate::solved::{self, SolvedSet};
use crate::sort;
use crate::stats::{self, Insights, Statistics};
use crate::storage::KeyValueStorage;

/// 用户操作 - 渲染层将点击和按键翻译为这些操作
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Action {
    SetSearchText { text: String },
    SetStatus { status: StatusFilter },
    ToggleDifficulty { difficulty: Difficulty },
    ToggleTag { tag: String },
    ToggleCompany { company: String },
    SetMinCompanyCount { value: i64 },
    SetMinFrequency { value: f64 },
    SortBy { column: String },
    GoToPage { page: usize },
    NextPage,
    PreviousPage,
    ToggleSolved { problem_id: String },
    SetVisibleSolved { solved: bool },
    ClearFilters,
    ToggleTheme,
}

/// 浏览会话 - 持有题库、已完成集合以及当前筛选、排序、分页状态
pub struct Session<S: KeyValueStorage> {
    config: SessionConfig,
    catalog: Catalog,
    warnings: Vec<ValidationWarning>,
    storage: S,
    solved: SolvedSet,
    theme: Theme,
    criteria: FilterCriteria,
    sort: SortState,
    current_page: usize,
    /// 筛选并排序后的题目下标
    filtered: Vec<usize>,
    search: Debouncer<String>,
    notices: Vec<Notice>,
}

fn default_criteria(config: &SessionConfig) -> FilterCriteria {
    FilterCriteria {
        min_company_count: config.default_min_company_count,
        min_frequency: config.default_min_frequency,
        ..FilterCriteria::default()
    }
}

fn toggle_member<T: Ord>(set: &mut BTreeSet<T>, value: T) {
    if !set.remove(&value) {
        set.insert(value);
    }
}

impl<S: KeyValueStorage> Session<S> {
    pub fn new(report: LoadReport, storage: S, config: SessionConfig) -> Result<Self, CatalogError> {
        config.validate()?;

        let solved = solved::load_all(&storage);
        let theme = solved::load_theme(&storage);

        let mut session = Self {
            search: Debouncer::new(config.search_debounce_ms),
            criteria: default_criteria(&config),
            config,
            catalog: report.catalog,
            warnings: report.warnings,
            storage,
            solved,
            theme,
            sort: SortState::default(),
            current_page: 1,
            filtered: Vec::new(),
            notices: Vec::new(),
        };
        session.recompute();
        Ok(session)
    }

    /// 从JSON数据集创建会话；数据集无法解析时以空题库继续并给出提示
    pub fn from_json(json: &str, storage: S, config: SessionConfig) -> Result<Self, CatalogError> {
        match parse_dataset(json) {
            Ok(report) => Self::new(report, storage, config),
            Err(e) => Self::after_load_failure(e, storage, config),
        }
    }

    /// 从压缩快照创建会话
    pub fn from_snapshot(data: &[u8], storage: S, config: SessionConfig) -> Result<Self, CatalogError> {
        match Catalog::from_snapshot(data) {
            Ok(report) => Self::new(report, storage, config),
            Err(e) => Self::after_load_failure(e, storage, config),
        }
    }

    fn after_load_failure(err: CatalogError, storage: S, config: SessionConfig) -> Result<Self, CatalogError> {
        error!("加载题库失败，使用空题库: {}", err);
        let empty = LoadReport {
            catalog: Catalog::empty(),
            warnings: Vec::new(),
        };
        let mut session = Self::new(empty, storage, config)?;
        session.notify(NoticeKind::Error, err.to_string());
        Ok(session)
    }

    /// 执行一个用户操作；只有越界页码会返回错误
    pub fn dispatch(&mut self, action: Action) -> Result<(), CatalogError> {
        match action {
            Action::SetSearchText { text } => self.set_search_text(text),
            Action::SetStatus { status } => self.update_criteria(|c| c.status = status),
            Action::ToggleDifficulty { difficulty } => {
                self.update_criteria(|c| toggle_member(&mut c.difficulties, difficulty))
            }
            Action::ToggleTag { tag } => self.update_criteria(|c| toggle_member(&mut c.tags, tag)),
            Action::ToggleCompany { company } => {
                self.update_criteria(|c| toggle_member(&mut c.companies, company))
            }
            Action::SetMinCompanyCount { value } => self.update_criteria(|c| c.min_company_count = value),
            Action::SetMinFrequency { value } => self.update_criteria(|c| c.min_frequency = value),
            Action::SortBy { column } => self.sort_by(column.parse()?),
            Action::GoToPage { page } => self.go_to_page(page)?,
            Action::NextPage => {
                self.next_page();
            }
            Action::PreviousPage => {
                self.previous_page();
            }
            Action::ToggleSolved { problem_id } => {
                self.toggle_solved(&problem_id);
            }
            Action::SetVisibleSolved { solved } => self.set_visible_solved(solved),
            Action::ClearFilters => self.clear_filters(),
            Action::ToggleTheme => {
                self.toggle_theme();
            }
        }
        Ok(())
    }

    /// 替换全部筛选条件
    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.update_criteria(|c| *c = criteria);
    }

    /// 立即应用搜索文本，并取消尚未生效的防抖输入
    pub fn set_search_text(&mut self, text: String) {
        self.search.cancel();
        self.update_criteria(|c| c.search_text = text);
    }

    /// 记录一次搜索输入，静默期结束后才生效；返回生效时间
    pub fn input_search(&mut self, text: String, now_ms: f64) -> f64 {
        self.search.schedule(text, now_ms)
    }

    /// 检查防抖搜索是否到期，到期则应用
    pub fn poll_search(&mut self, now_ms: f64) -> bool {
        match self.search.poll(now_ms) {
            Some(text) => {
                self.update_criteria(|c| c.search_text = text);
                true
            }
            None => false,
        }
    }

    /// 立即应用尚未生效的搜索输入
    pub fn flush_search(&mut self) -> bool {
        match self.search.flush() {
            Some(text) => {
                self.update_criteria(|c| c.search_text = text);
                true
            }
            None => false,
        }
    }

    fn update_criteria(&mut self, update: impl FnOnce(&mut FilterCriteria)) {
        update(&mut self.criteria);
        self.current_page = 1;
        self.recompute();
    }

    pub fn clear_filters(&mut self) {
        self.search.cancel();
        self.criteria = default_criteria(&self.config);
        self.current_page = 1;
        self.recompute();
    }

    /// 点击列头排序
    pub fn sort_by(&mut self, column: SortColumn) {
        self.sort = self.sort.toggled(column);
        self.recompute();
    }

    /// 直接设置排序列和方向
    pub fn set_sort(&mut self, state: SortState) {
        self.sort = state;
        self.recompute();
    }

    pub fn go_to_page(&mut self, page: usize) -> Result<(), CatalogError> {
        let total_pages = self.total_pages();
        if page < 1 || page > total_pages {
            let err = CatalogError::PageOutOfRange {
                requested: page,
                total_pages,
            };
            self.notify(NoticeKind::Error, err.to_string());
            return Err(err);
        }
        self.current_page = page;
        Ok(())
    }

    /// 下一页；已是最后一页时不变
    pub fn next_page(&mut self) -> bool {
        if self.current_page < self.total_pages() {
            self.current_page += 1;
            true
        } else {
            false
        }
    }

    /// 上一页；已是第一页时不变
    pub fn previous_page(&mut self) -> bool {
        if self.current_page > 1 {
            self.current_page -= 1;
            true
        } else {
            false
        }
    }

    /// 切换完成状态并立即保存；返回切换后的状态
    pub fn toggle_solved(&mut self, problem_id: &str) -> bool {
        let now_solved = self.solved.toggle(problem_id);
        self.persist_solved();
        self.recompute();
        now_solved
    }

    /// 将当前页全部题目设为同一完成状态，只保存一次
    pub fn set_visible_solved(&mut self, solved: bool) {
        let records = self.catalog.records();
        let ids: Vec<&str> = self
            .visible_indices()
            .into_iter()
            .map(|i| records[i].problem_id.as_str())
            .collect();
        self.solved.set_all(ids, solved);
        self.persist_solved();
        self.recompute();
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        if let Err(e) = solved::save_theme(&mut self.storage, self.theme) {
            warn!("保存主题失败: {}", e);
        }
        self.theme
    }

    // 存储失败时只记录日志，内存中的状态照常生效
    fn persist_solved(&mut self) {
        if let Err(e) = solved::persist(&mut self.storage, &self.solved) {
            warn!("保存已完成题目失败，仅在本次会话内生效: {}", e);
        }
    }

    fn notify(&mut self, kind: NoticeKind, message: String) {
        self.notices.push(Notice {
            kind,
            message,
            dismiss_after_ms: self.config.notice_duration_ms,
        });
    }

    fn recompute(&mut self) {
        let records = self.catalog.records();
        let state = self.sort;

        let mut filtered = filter::apply_indices(records, &self.solved, &self.criteria);
        filtered.sort_by(|&a, &b| sort::compare(&records[a], &records[b], state));

        debug!(
            "筛选完成: {} / {} 条，排序 {} {:?}",
            filtered.len(),
            records.len(),
            state.column,
            state.direction
        );

        self.filtered = filtered;
        self.current_page = clamp_page(self.current_page, self.total_pages());
    }

    fn visible_indices(&self) -> Vec<usize> {
        paginate(&self.filtered, self.config.page_size, self.current_page).items
    }

    /// 当前页的题目
    pub fn visible_records(&self) -> Vec<&ProblemRecord> {
        let records = self.catalog.records();
        self.visible_indices().into_iter().map(|i| &records[i]).collect()
    }

    /// 筛选并排序后的全部题目
    pub fn filtered_records(&self) -> Vec<&ProblemRecord> {
        let records = self.catalog.records();
        self.filtered.iter().map(|&i| &records[i]).collect()
    }

    pub fn view(&self) -> PageView<'_> {
        let records = self.catalog.records();
        let items = self
            .visible_indices()
            .into_iter()
            .map(|i| {
                let record = &records[i];
                ProblemView {
                    solved: self.solved.is_solved(&record.problem_id),
                    record,
                }
            })
            .collect();
        let total_pages = self.total_pages();

        PageView {
            items,
            current_page: self.current_page,
            total_pages,
            page_size: self.config.page_size,
            filtered_count: self.filtered.len(),
            buttons: page_buttons(self.current_page, total_pages, self.config.max_visible_pages),
            sort: self.sort,
            criteria: &self.criteria,
            search_pending: self.search.is_pending(),
            theme: self.theme,
        }
    }

    pub fn statistics(&self) -> Statistics {
        stats::compute(&self.catalog, &self.solved, self.filtered.len())
    }

    pub fn insights(&self) -> Insights {
        stats::insights(&self.catalog)
    }

    pub fn facets(&self) -> Facets {
        self.catalog.facets()
    }

    /// 导出当前筛选结果
    pub fn export(&self, date: NaiveDate) -> Result<ExportDocument, CatalogError> {
        export_records(&self.filtered_records(), date)
    }

    /// 取出并清空待显示的提示
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.filtered.len(), self.config.page_size)
    }

    pub fn is_solved(&self, problem_id: &str) -> bool {
        self.solved.is_solved(problem_id)
    }

    pub fn solved(&self) -> &SolvedSet {
        &self.solved
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn sort_state(&self) -> SortState {
        self.sort
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn warnings(&self) -> &[ValidationWarning] {
        &self.warnings
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PageButton, SortDirection};
    use crate::storage::{MemoryStorage, SOLVED_KEY, THEME_KEY};

    fn dataset(count: usize) -> String {
        let records: Vec<serde_json::Value> = (1..=count)
            .map(|i| {
                let difficulty = ["Easy", "Medium", "Hard"][i % 3];
                let tag = if i % 2 == 0 { "Array" } else { "Graph" };
                serde_json::json!({
                    "problem_id": i.to_string(),
                    "title": format!("Problem {}", i),
                    "difficulty": difficulty,
                    "tags": [tag],
                    "companies": ["google"],
                    "company_count": 1,
                    "weighted_frequency": i as f64,
                    "url": format!("https://leetcode.com/problems/p{}/", i)
                })
            })
            .collect();
        serde_json::to_string(&records).unwrap()
    }

    fn session(count: usize, page_size: usize) -> Session<MemoryStorage> {
        let config = SessionConfig {
            page_size,
            ..SessionConfig::default()
        };
        Session::from_json(&dataset(count), MemoryStorage::new(), config).unwrap()
    }

    fn visible_ids(session: &Session<MemoryStorage>) -> Vec<String> {
        session.visible_records().iter().map(|r| r.problem_id.clone()).collect()
    }

    #[test]
    fn starts_sorted_by_frequency_descending() {
        let session = session(5, 20);
        assert_eq!(visible_ids(&session), vec!["5", "4", "3", "2", "1"]);
        assert_eq!(session.sort_state(), SortState::default());
        assert_eq!(session.current_page(), 1);
    }

    #[test]
    fn load_failure_yields_empty_session_with_notice() {
        let mut session = Session::from_json("<html>", MemoryStorage::new(), SessionConfig::default()).unwrap();
        assert!(session.catalog().is_empty());
        assert_eq!(session.total_pages(), 0);
        assert_eq!(session.current_page(), 1);
        let notices = session.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].kind, NoticeKind::Error);
        assert_eq!(notices[0].dismiss_after_ms, 3000.0);
        assert!(session.take_notices().is_empty());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = SessionConfig {
            page_size: 0,
            ..SessionConfig::default()
        };
        assert!(matches!(
            Session::from_json("[]", MemoryStorage::new(), config),
            Err(CatalogError::InvalidConfig(_))
        ));
    }

    #[test]
    fn filter_change_resets_to_first_page() {
        let mut session = session(10, 3);
        session.go_to_page(3).unwrap();
        assert_eq!(session.current_page(), 3);

        session.dispatch(Action::ToggleTag { tag: "Array".to_string() }).unwrap();
        assert_eq!(session.current_page(), 1);
        assert_eq!(visible_ids(&session), vec!["10", "8", "6"]);

        session.dispatch(Action::ToggleTag { tag: "Array".to_string() }).unwrap();
        assert!(session.criteria().tags.is_empty());
    }

    #[test]
    fn out_of_range_page_is_rejected_without_mutation() {
        let mut session = session(10, 3);
        session.go_to_page(2).unwrap();
        let err = session.dispatch(Action::GoToPage { page: 9 }).unwrap_err();
        assert!(matches!(err, CatalogError::PageOutOfRange { requested: 9, total_pages: 4 }));
        assert_eq!(session.current_page(), 2);
        assert_eq!(session.take_notices().len(), 1);
        assert!(session.go_to_page(0).is_err());
    }

    #[test]
    fn next_and_previous_stop_at_boundaries() {
        let mut session = session(4, 2);
        assert!(!session.previous_page());
        assert!(session.next_page());
        assert!(!session.next_page());
        assert_eq!(session.current_page(), 2);
        assert!(session.take_notices().is_empty());
    }

    #[test]
    fn sort_by_toggles_direction_and_keeps_page() {
        let mut session = session(6, 2);
        session.go_to_page(2).unwrap();
        session.dispatch(Action::SortBy { column: "weighted_frequency".to_string() }).unwrap();
        assert_eq!(session.sort_state().direction, SortDirection::Ascending);
        assert_eq!(session.current_page(), 2);
        assert_eq!(visible_ids(&session), vec!["3", "4"]);

        session.dispatch(Action::SortBy { column: "title".to_string() }).unwrap();
        assert_eq!(session.sort_state().direction, SortDirection::Descending);

        let err = session.dispatch(Action::SortBy { column: "likes".to_string() }).unwrap_err();
        assert!(matches!(err, CatalogError::UnknownSortColumn(_)));
    }

    #[test]
    fn toggle_solved_persists_every_change() {
        let mut session = session(3, 20);
        assert!(session.toggle_solved("2"));
        assert_eq!(session.storage().raw(SOLVED_KEY), Some(r#"["2"]"#));
        assert!(!session.toggle_solved("2"));
        assert_eq!(session.storage().raw(SOLVED_KEY), Some("[]"));
    }

    #[test]
    fn unavailable_storage_keeps_toggles_in_memory() {
        let mut session =
            Session::from_json(&dataset(3), MemoryStorage::unavailable(), SessionConfig::default()).unwrap();
        assert!(session.toggle_solved("1"));
        assert!(session.is_solved("1"));
        assert_eq!(session.statistics().solved_problems, 1);
        assert_eq!(session.toggle_theme(), Theme::Dark);
        assert!(session.take_notices().is_empty());
    }

    #[test]
    fn restores_solved_and_theme_from_storage() {
        let storage = MemoryStorage::new()
            .with_item(SOLVED_KEY, r#"["1","3"]"#)
            .with_item(THEME_KEY, "dark");
        let session = Session::from_json(&dataset(3), storage, SessionConfig::default()).unwrap();
        assert!(session.is_solved("3"));
        assert_eq!(session.theme(), Theme::Dark);
        assert_eq!(session.statistics().completion_rate, 66.7);
    }

    #[test]
    fn set_visible_solved_only_touches_current_page() {
        let mut session = session(5, 2);
        session.go_to_page(2).unwrap();
        session.dispatch(Action::SetVisibleSolved { solved: true }).unwrap();
        let solved: Vec<&str> = session.solved().iter().collect();
        assert_eq!(solved, vec!["2", "3"]);
        assert_eq!(session.storage().raw(SOLVED_KEY), Some(r#"["2","3"]"#));

        session.dispatch(Action::SetVisibleSolved { solved: false }).unwrap();
        assert!(session.solved().is_empty());
    }

    #[test]
    fn solved_filter_reclamps_page_after_toggle() {
        let mut session = session(4, 1);
        for id in ["1", "2", "3"] {
            session.toggle_solved(id);
        }
        session.dispatch(Action::SetStatus { status: StatusFilter::Solved }).unwrap();
        session.go_to_page(3).unwrap();

        session.toggle_solved("1");
        assert_eq!(session.total_pages(), 2);
        assert_eq!(session.current_page(), 2);
    }

    #[test]
    fn debounced_search_applies_after_quiet_period() {
        let mut session = session(12, 20);
        session.input_search("1".to_string(), 0.0);
        session.input_search("11".to_string(), 100.0);
        assert!(session.view().search_pending);
        assert!(!session.poll_search(399.0));
        assert_eq!(session.criteria().search_text, "");

        assert!(session.poll_search(400.0));
        assert_eq!(session.criteria().search_text, "11");
        assert_eq!(visible_ids(&session), vec!["11"]);
    }

    #[test]
    fn flush_applies_pending_search_immediately() {
        let mut session = session(12, 20);
        assert!(!session.flush_search());
        session.input_search("12".to_string(), 0.0);
        assert!(session.flush_search());
        assert_eq!(session.criteria().search_text, "12");
        assert_eq!(visible_ids(&session), vec!["12"]);
        assert!(!session.view().search_pending);
        assert!(!session.poll_search(1000.0));
    }

    #[test]
    fn negative_min_company_count_is_accepted() {
        let mut session = session(4, 20);
        let action: Action = serde_json::from_str(r#"{"type": "setMinCompanyCount", "value": -1}"#).unwrap();
        session.dispatch(action).unwrap();
        assert_eq!(session.criteria().min_company_count, -1);
        assert_eq!(session.view().filtered_count, 4);
    }

    #[test]
    fn huge_page_window_renders_all_buttons() {
        let config = SessionConfig::from_json(r#"{"maxVisiblePages": 18446744073709551615, "pageSize": 2}"#).unwrap();
        let session = Session::from_json(&dataset(10), MemoryStorage::new(), config).unwrap();
        assert_eq!(session.view().buttons.len(), 5);
    }

    #[test]
    fn direct_search_cancels_pending_input() {
        let mut session = session(12, 20);
        session.input_search("5".to_string(), 0.0);
        session.dispatch(Action::SetSearchText { text: "12".to_string() }).unwrap();
        assert!(!session.poll_search(1000.0));
        assert_eq!(visible_ids(&session), vec!["12"]);
    }

    #[test]
    fn clear_filters_restores_configured_defaults() {
        let mut session = session(6, 20);
        session.dispatch(Action::SetSearchText { text: "Problem 1".to_string() }).unwrap();
        session.dispatch(Action::ToggleDifficulty { difficulty: Difficulty::Hard }).unwrap();
        session.dispatch(Action::SetMinFrequency { value: 3.0 }).unwrap();
        session.dispatch(Action::ClearFilters).unwrap();

        let criteria = session.criteria();
        assert!(criteria.search_text.is_empty());
        assert!(criteria.difficulties.is_empty());
        assert_eq!(criteria.min_company_count, 1);
        assert_eq!(criteria.min_frequency, 0.0);
        assert_eq!(session.view().filtered_count, 6);
    }

    #[test]
    fn view_marks_solved_items_and_active_page() {
        let mut session = session(30, 5);
        session.toggle_solved("30");
        session.go_to_page(2).unwrap();

        let view = session.view();
        assert_eq!(view.total_pages, 6);
        assert_eq!(view.items.len(), 5);
        assert!(view.buttons.contains(&PageButton::Page { number: 2, active: true }));

        session.go_to_page(1).unwrap();
        let view = session.view();
        assert!(view.items[0].solved);
        assert!(!view.items[1].solved);
    }

    #[test]
    fn actions_deserialize_from_tagged_json() {
        let action: Action = serde_json::from_str(r#"{"type": "toggleSolved", "problemId": "42"}"#).unwrap();
        assert_eq!(action, Action::ToggleSolved { problem_id: "42".to_string() });

        let action: Action = serde_json::from_str(r#"{"type": "setStatus", "status": "unsolved"}"#).unwrap();
        assert_eq!(action, Action::SetStatus { status: StatusFilter::Unsolved });

        let action: Action = serde_json::from_str(r#"{"type": "nextPage"}"#).unwrap();
        assert_eq!(action, Action::NextPage);
    }

    #[test]
    fn export_contains_filtered_records_in_order() {
        let mut session = session(4, 1);
        session.dispatch(Action::SetMinFrequency { value: 3.0 }).unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let document = session.export(date).unwrap();
        assert_eq!(document.file_name, "filtered_leetcode_problems_2025-06-01.json");
        let records: Vec<ProblemRecord> = serde_json::from_str(&document.content).unwrap();
        let ids: Vec<&str> = records.iter().map(|r| r.problem_id.as_str()).collect();
        assert_eq!(ids, vec!["4", "3"]);
    }
}
