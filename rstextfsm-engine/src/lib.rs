//! rstextfsm-engine 内核
//! 模板编译器 + 取值模型 + 逐行匹配状态机，不涉及任何文件/网络/序列化格式

// 核心公共结构体+枚举
pub mod core;
// 模板文本解析+编译
pub mod compiler;
// 逐行匹配状态机+记录组装
pub mod engine;
// 内核错误定义
pub mod error;
// 编译后的模板
pub mod template;
// 日志辅助
pub mod utils;

// 顶层导出常用类型
pub use crate::core::{
    Action, FieldValue, LineOp, Record, RecordOp, Rule, State, StateId, Target, ValueDescriptor,
    ValueOption,
};
pub use compiler::TemplateCompiler;
pub use engine::RunOutput;
pub use error::{
    CompileError, CompileIssue, CompileIssueKind, CoreError, CoreResult, RuntimeError,
};
pub use template::Template;

/// 编译模板文本
pub fn compile(template_text: &str) -> Result<Template, CompileError> {
    Template::compile(template_text)
}

/// 用编译后的模板解析整段输入文本
pub fn run(template: &Template, input: &str) -> RunOutput {
    template.run(input)
}

/// 编译并运行，任一阶段出错即返回
pub fn parse(template_text: &str, input: &str) -> CoreResult<Vec<Record>> {
    let template = compile(template_text)?;
    Ok(template.run(input).into_result()?)
}
