use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use catalog_filter::{CatalogError, KeyValueStorage};

/// 文件存储：每个键保存为状态目录下的 `<key>.json`
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, CatalogError> {
        let path = self.path(key);
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CatalogError::Persistence(format!("无法读取 {}: {}", path.display(), e))),
        }
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), CatalogError> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            CatalogError::Persistence(format!("无法创建状态目录 {}: {}", self.dir.display(), e))
        })?;
        let path = self.path(key);
        fs::write(&path, value)
            .map_err(|e| CatalogError::Persistence(format!("无法写入 {}: {}", path.display(), e)))
    }
}
