//! 执行模块：状态机驱动与记录组装
mod assembler;
pub mod runner;

use std::sync::Arc;

use crate::core::Record;
use crate::error::RuntimeError;

pub use self::runner::RunContext;

/// 一次运行的结果
/// 出现 RuntimeError 时，错误之前已输出的记录依然保留
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutput {
    /// 列名（Value 声明顺序）
    pub header: Arc<[String]>,
    pub records: Vec<Record>,
    pub error: Option<RuntimeError>,
}

impl RunOutput {
    #[inline]
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 转为快速失败风格：有错误时丢弃部分结果
    pub fn into_result(self) -> Result<Vec<Record>, RuntimeError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.records),
        }
    }
}
