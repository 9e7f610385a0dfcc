//! 全局错误类型定义

use std::io::Error as IoError;

use rstextfsm_engine::{CompileError, CoreError, RuntimeError};
use serde_json::Error as SerdeJsonError;
use serde_yaml::Error as SerdeYamlError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RstextfsmError {
    // 模板相关错误
    #[error("模板加载失败：{0}")]
    TemplateLoadError(String),
    #[error("模板编译失败 [{path}]：{source}")]
    TemplateCompileError {
        path: String,
        #[source]
        source: CompileError,
    },
    #[error("模板编译失败：{0}")]
    CompileError(#[from] CompileError),

    // 解析相关错误
    #[error("解析失败：{0}")]
    RuntimeError(#[from] RuntimeError),
    #[error("解析器未初始化")]
    ParserNotInitialized,

    #[error(transparent)]
    CoreError(#[from] CoreError),

    // 序列化/反序列化错误
    #[error("JSON序列化失败：{0}")]
    JsonError(#[from] SerdeJsonError),
    #[error("YAML序列化失败：{0}")]
    YamlError(#[from] SerdeYamlError),

    // 基础错误
    #[error("IO操作失败：{0}")]
    IoError(#[from] IoError),
    #[error("无效输入：{0}")]
    InvalidInput(String),
}

// 全局Result类型
pub type RstResult<T> = Result<T, RstextfsmError>;
