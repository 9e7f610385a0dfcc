//! 编译后的规则与状态

use regex::{Captures, Regex};

use super::action::Action;

/// 状态表索引
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateId(pub usize);

/// 解析后的跳转目标
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// 留在当前状态
    Stay,
    /// 跳转到模板中声明的状态
    State(StateId),
    /// 保留状态 End：立即停止，不做结尾隐式输出
    End,
    /// 保留状态 EOF：立即停止，按结尾规则处理
    Eof,
}

/// 单条规则
#[derive(Debug, Clone)]
pub struct Rule {
    /// 规则所在模板行号
    pub line_number: usize,
    /// 模板中的原始规则文本（去除缩进）
    pub source: String,
    /// 占位符展开后的完整正则
    pub pattern: String,
    pub regex: Regex,
    pub action: Action,
    pub target: Target,
    /// 捕获分组名 -> Value 槽位索引
    pub bindings: Vec<(String, usize)>,
}

impl Rule {
    #[inline]
    pub fn captures<'a>(&self, line: &'a str) -> Option<Captures<'a>> {
        self.regex.captures(line)
    }

    #[inline]
    pub fn is_match(&self, line: &str) -> bool {
        self.regex.is_match(line)
    }
}

/// 命名状态：按优先级排列的规则列表
#[derive(Debug, Clone)]
pub struct State {
    pub name: String,
    pub line_number: usize,
    pub rules: Vec<Rule>,
}
