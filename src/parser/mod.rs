//! 解析模块：整合模板加载、缓存与内核执行
pub mod global;
pub mod text_parser;

pub use self::global::{init_global_parser, init_global_parser_with_config, parse_text};
pub use self::text_parser::TextParser;
