//! 编译模块：将模板文本编译为可执行的状态机
pub mod compiler;
pub mod parser;

pub use self::compiler::{TemplateCompiler, END_STATE, EOF_STATE, START_STATE};
