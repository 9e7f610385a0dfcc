//! 全局解析器单例管理
use once_cell::sync::OnceCell;
use serde_json::{Map, Value};

use super::text_parser::TextParser;
use crate::config::{ConfigManager, GlobalConfig};
use crate::error::{RstResult, RstextfsmError};

/// 全局解析器实例
static GLOBAL_PARSER: OnceCell<TextParser> = OnceCell::new();

/// 初始化全局解析器（默认配置）
pub fn init_global_parser() -> RstResult<()> {
    init_global_parser_with_config(ConfigManager::get_default())
}

/// 带自定义配置初始化全局解析器，重复初始化时保留第一次的配置
pub fn init_global_parser_with_config(config: GlobalConfig) -> RstResult<()> {
    GLOBAL_PARSER.get_or_init(|| TextParser::new(config));
    Ok(())
}

/// 获取全局解析器
pub(crate) fn get_global_parser() -> RstResult<&'static TextParser> {
    GLOBAL_PARSER
        .get()
        .ok_or(RstextfsmError::ParserNotInitialized)
}

/// 使用全局解析器解析文本
pub fn parse_text(platform: &str, command: &str, raw: &str) -> RstResult<Vec<Map<String, Value>>> {
    get_global_parser()?.parse(platform, command, raw)
}
