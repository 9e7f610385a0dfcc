//! rstextfsm - 基于 TextFSM 模板的半结构化文本解析工具

// 导出内核
pub use rstextfsm_engine as engine;
pub use rstextfsm_engine::{
    compile, run, CompileError, CompileIssue, CompileIssueKind, FieldValue, Record, RunOutput,
    RuntimeError, Template, ValueDescriptor, ValueOption,
};

// 导出全局错误类型
pub use self::error::{RstResult, RstextfsmError};

// 导出配置模块
pub use self::config::{ConfigManager, CustomConfigBuilder, GlobalConfig};

// 导出模板模块核心接口
pub use self::template::{TemplateCache, TemplateLoader};

// 导出工具模块核心接口
pub use self::utils::{
    abbreviate_command, index_entry, normalize_rule_whitespace, ParsedSample, RecordConverter,
    SampleLayout,
};

// 导出解析模块核心接口
pub use self::parser::{init_global_parser, init_global_parser_with_config, parse_text, TextParser};

// 声明所有子模块
pub mod config;
pub mod error;
pub mod parser;
pub mod template;
pub mod utils;
