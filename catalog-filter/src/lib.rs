use wasm_bindgen::prelude::*;
use chrono::Utc;
use serde::Serialize;

// 导出模块
pub mod builder;
pub mod catalog;
pub mod config;
pub mod debounce;
pub mod error;
pub mod export;
pub mod filter;
pub mod models;
pub mod pagination;
pub mod session;
pub mod solved;
pub mod sort;
pub mod stats;
pub mod storage;

pub use builder::{parse_dataset, CatalogBuilder, LoadReport, ValidationWarning};
pub use catalog::{Catalog, FacetOption, Facets};
pub use config::SessionConfig;
pub use error::CatalogError;
pub use models::{FilterCriteria, SortColumn, SortDirection, SortState, StatusFilter, Theme};
pub use session::{Action, Session};
pub use solved::SolvedSet;
pub use storage::{BrowserStorage, KeyValueStorage, MemoryStorage};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// 初始化函数 - 设置错误处理和控制台日志
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::new(log::Level::Info));
}

/// 版本信息
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn to_js(e: CatalogError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

// 映射序列化为普通对象，便于渲染层直接读取字段
fn serialize<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&format!("序列化结果失败: {}", e)))
}

fn parse_config(config_json: Option<String>) -> Result<SessionConfig, JsValue> {
    match config_json {
        Some(json) if !json.trim().is_empty() => SessionConfig::from_json(&json).map_err(to_js),
        _ => Ok(SessionConfig::default()),
    }
}

/// 题库会话JS接口 - 提供给JavaScript使用的筛选、排序、分页API
#[wasm_bindgen]
pub struct CatalogSessionJS {
    session: Session<BrowserStorage>,
}

#[wasm_bindgen]
impl CatalogSessionJS {
    /// 从JSON数据集创建会话；数据集无法解析时以空题库继续，并产生一条提示
    #[wasm_bindgen(constructor)]
    pub fn new(dataset_json: &str, config_json: Option<String>) -> Result<CatalogSessionJS, JsValue> {
        let config = parse_config(config_json)?;
        let session = Session::from_json(dataset_json, BrowserStorage::local(), config).map_err(to_js)?;
        Ok(CatalogSessionJS { session })
    }

    /// 从压缩快照创建会话
    #[wasm_bindgen(js_name = fromSnapshot)]
    pub fn from_snapshot(data: &[u8], config_json: Option<String>) -> Result<CatalogSessionJS, JsValue> {
        let config = parse_config(config_json)?;
        let session = Session::from_snapshot(data, BrowserStorage::local(), config).map_err(to_js)?;
        Ok(CatalogSessionJS { session })
    }

    /// 执行一个操作；页码越界时返回 false 并产生提示
    #[wasm_bindgen]
    pub fn dispatch(&mut self, action_json: &str) -> Result<bool, JsValue> {
        let action: Action = serde_json::from_str(action_json)
            .map_err(|e| JsValue::from_str(&format!("解析操作失败: {}", e)))?;

        match self.session.dispatch(action) {
            Ok(()) => Ok(true),
            Err(CatalogError::PageOutOfRange { .. }) => Ok(false),
            Err(e) => Err(to_js(e)),
        }
    }

    /// 记录搜索输入，返回生效时间（毫秒时间戳）
    #[wasm_bindgen(js_name = inputSearch)]
    pub fn input_search(&mut self, text: String) -> f64 {
        self.session.input_search(text, js_sys::Date::now())
    }

    /// 到期则应用搜索输入
    #[wasm_bindgen(js_name = pollSearch)]
    pub fn poll_search(&mut self) -> bool {
        self.session.poll_search(js_sys::Date::now())
    }

    /// 立即应用尚未生效的搜索输入（回车时调用）
    #[wasm_bindgen(js_name = flushSearch)]
    pub fn flush_search(&mut self) -> bool {
        self.session.flush_search()
    }

    /// 当前页视图
    #[wasm_bindgen]
    pub fn view(&self) -> Result<JsValue, JsValue> {
        serialize(&self.session.view())
    }

    #[wasm_bindgen]
    pub fn statistics(&self) -> Result<JsValue, JsValue> {
        serialize(&self.session.statistics())
    }

    #[wasm_bindgen]
    pub fn insights(&self) -> Result<JsValue, JsValue> {
        serialize(&self.session.insights())
    }

    /// 全部标签和公司选项
    #[wasm_bindgen]
    pub fn facets(&self) -> Result<JsValue, JsValue> {
        serialize(&self.session.facets())
    }

    /// 数据校验警告
    #[wasm_bindgen]
    pub fn warnings(&self) -> Result<JsValue, JsValue> {
        serialize(&self.session.warnings())
    }

    /// 取出待显示的提示
    #[wasm_bindgen(js_name = takeNotices)]
    pub fn take_notices(&mut self) -> Result<JsValue, JsValue> {
        serialize(&self.session.take_notices())
    }

    /// 导出当前筛选结果，返回 { fileName, content, count }
    #[wasm_bindgen(js_name = exportFiltered)]
    pub fn export_filtered(&self) -> Result<JsValue, JsValue> {
        let document = self.session.export(Utc::now().date_naive()).map_err(to_js)?;
        serialize(&document)
    }

    #[wasm_bindgen]
    pub fn theme(&self) -> String {
        self.session.theme().as_str().to_string()
    }

    #[wasm_bindgen(js_name = isSolved)]
    pub fn is_solved(&self, problem_id: &str) -> bool {
        self.session.is_solved(problem_id)
    }
}
