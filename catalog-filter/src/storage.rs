use std::collections::HashMap;

use crate::error::CatalogError;

/// 已完成题目列表的存储键
pub const SOLVED_KEY: &str = "solvedProblems";
/// 主题的存储键
pub const THEME_KEY: &str = "theme";

/// 字符串键值存储，浏览器中对应 localStorage
pub trait KeyValueStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, CatalogError>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), CatalogError>;
}

/// 内存存储，用于测试和无持久化环境
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
    unavailable: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// 模拟不可用的存储：读取为空，写入失败
    pub fn unavailable() -> Self {
        Self {
            items: HashMap::new(),
            unavailable: true,
        }
    }

    pub fn with_item(mut self, key: &str, value: &str) -> Self {
        self.items.insert(key.to_string(), value.to_string());
        self
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        self.items.get(key).map(String::as_str)
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, CatalogError> {
        if self.unavailable {
            return Err(CatalogError::Persistence("存储不可用".to_string()));
        }
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), CatalogError> {
        if self.unavailable {
            return Err(CatalogError::Persistence(format!("无法写入 {}", key)));
        }
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// 浏览器 localStorage；不可用时读取为空、写入失败
pub struct BrowserStorage {
    inner: Option<web_sys::Storage>,
}

impl BrowserStorage {
    pub fn local() -> Self {
        let inner = web_sys::window().and_then(|window| window.local_storage().ok().flatten());
        if inner.is_none() {
            log::warn!("localStorage 不可用，已完成状态仅保存在内存中");
        }
        Self { inner }
    }
}

impl KeyValueStorage for BrowserStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, CatalogError> {
        match &self.inner {
            Some(storage) => storage
                .get_item(key)
                .map_err(|e| CatalogError::Persistence(format!("读取 {} 失败: {:?}", key, e))),
            None => Ok(None),
        }
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), CatalogError> {
        match &self.inner {
            Some(storage) => storage
                .set_item(key, value)
                .map_err(|e| CatalogError::Persistence(format!("写入 {} 失败: {:?}", key, e))),
            None => Err(CatalogError::Persistence("localStorage 不可用".to_string())),
        }
    }
}
