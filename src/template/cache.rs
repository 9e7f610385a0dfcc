//! 模板缓存
//! 以文件路径为键缓存编译后的模板，多线程只读共享

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use log::debug;
use rstextfsm_engine::Template;
use rustc_hash::FxHashMap;

use super::loader::TemplateLoader;
use crate::error::RstResult;

/// 模板缓存管理器
#[derive(Debug, Default)]
pub struct TemplateCache {
    entries: RwLock<FxHashMap<PathBuf, Arc<Template>>>,
}

impl TemplateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 命中则直接返回，否则加载编译后写入缓存
    pub fn get_or_load(&self, path: &Path) -> RstResult<Arc<Template>> {
        // 1. 读锁查询
        if let Some(template) = self.get(path) {
            return Ok(template);
        }

        // 2. 锁外编译，避免长时间持有写锁
        let template = Arc::new(TemplateLoader::load_file(path)?);

        // 3. 写锁插入（并发加载时保留先写入者）
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let cached = entries
            .entry(path.to_path_buf())
            .or_insert(template)
            .clone();
        debug!("模板缓存写入 {}，当前缓存{}个模板", path.display(), entries.len());
        Ok(cached)
    }

    pub fn get(&self, path: &Path) -> Option<Arc<Template>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
    }

    /// 手动放入已编译模板
    pub fn insert(&self, path: impl Into<PathBuf>, template: Template) -> Arc<Template> {
        let template = Arc::new(template);
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.into(), template.clone());
        template
    }

    pub fn remove(&self, path: &Path) -> Option<Arc<Template>> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(path)
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
