use log::warn;
use std::collections::BTreeSet;

use crate::error::CatalogError;
use crate::models::Theme;
use crate::storage::{KeyValueStorage, SOLVED_KEY, THEME_KEY};

/// 已完成题目集合
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SolvedSet {
    ids: BTreeSet<String>,
}

impl SolvedSet {
    pub fn is_solved(&self, problem_id: &str) -> bool {
        self.ids.contains(problem_id)
    }

    /// 不存在则加入，存在则移除；返回切换后的状态
    pub fn toggle(&mut self, problem_id: &str) -> bool {
        if self.ids.remove(problem_id) {
            false
        } else {
            self.ids.insert(problem_id.to_string());
            true
        }
    }

    /// 将给定题目统一设置为目标状态
    pub fn set_all<'a, I>(&mut self, problem_ids: I, solved: bool)
    where
        I: IntoIterator<Item = &'a str>,
    {
        for id in problem_ids {
            if solved {
                self.ids.insert(id.to_string());
            } else {
                self.ids.remove(id);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn to_json(&self) -> Result<String, CatalogError> {
        Ok(serde_json::to_string(&self.ids)?)
    }
}

impl FromIterator<String> for SolvedSet {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

/// 从存储中恢复已完成集合，没有记录或记录损坏时返回空集合
pub fn load_all<S: KeyValueStorage + ?Sized>(storage: &S) -> SolvedSet {
    let saved = match storage.get_item(SOLVED_KEY) {
        Ok(Some(saved)) => saved,
        Ok(None) => return SolvedSet::default(),
        Err(e) => {
            warn!("读取已完成题目失败，使用空集合: {}", e);
            return SolvedSet::default();
        }
    };

    match serde_json::from_str::<Vec<String>>(&saved) {
        Ok(ids) => ids.into_iter().collect(),
        Err(e) => {
            warn!("已完成题目记录无法解析，使用空集合: {}", e);
            SolvedSet::default()
        }
    }
}

/// 将已完成集合写回存储
pub fn persist<S: KeyValueStorage + ?Sized>(storage: &mut S, solved: &SolvedSet) -> Result<(), CatalogError> {
    let json = solved.to_json()?;
    storage.set_item(SOLVED_KEY, &json)
}

/// 读取主题设置，默认浅色
pub fn load_theme<S: KeyValueStorage + ?Sized>(storage: &S) -> Theme {
    match storage.get_item(THEME_KEY) {
        Ok(Some(name)) => name.parse().unwrap_or_else(|e| {
            warn!("{}，使用默认主题", e);
            Theme::default()
        }),
        Ok(None) => Theme::default(),
        Err(e) => {
            warn!("读取主题失败: {}", e);
            Theme::default()
        }
    }
}

pub fn save_theme<S: KeyValueStorage + ?Sized>(storage: &mut S, theme: Theme) -> Result<(), CatalogError> {
    storage.set_item(THEME_KEY, theme.as_str())
}
