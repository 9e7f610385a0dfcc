//! rstextfsm-engine 内核错误定义
//! 编译期错误（模板结构/语法问题）与运行期错误（Error 指令）分离，基于thiserror实现
use std::fmt;

use thiserror::Error;

/// 单条编译问题的类别
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileIssueKind {
    // ===================== Value 声明 =====================
    /// Value 名称不是合法标识符
    #[error("invalid value name '{0}'")]
    InvalidValueName(String),

    /// 名称超过长度上限
    #[error("name '{name}' exceeds {max} characters")]
    NameTooLong { name: String, max: usize },

    /// 未知的 Value 选项
    #[error("unknown value option '{0}'")]
    UnknownOption(String),

    /// 同一声明中选项重复
    #[error("duplicate value option '{0}'")]
    DuplicateOption(String),

    /// Value 名称与之前的声明冲突
    #[error("duplicate value name '{0}'")]
    DuplicateValue(String),

    /// 正则片段不是单个捕获分组
    #[error("malformed value regex '{fragment}': {reason}")]
    MalformedFragment { fragment: String, reason: String },

    /// 正则编译失败（Value 片段或展开后的规则）
    #[error("invalid regex '{pattern}': {reason}")]
    InvalidRegex { pattern: String, reason: String },

    /// 声明出现在状态段之后
    #[error("value declaration '{0}' appears after the state sections")]
    MisplacedValue(String),

    // ===================== 状态/规则 =====================
    /// 规则引用了未声明的 Value
    #[error("undefined value '{0}'")]
    UndefinedValue(String),

    /// 状态跳转目标不存在
    #[error("transition to undefined state '{0}'")]
    UnresolvedState(String),

    /// 状态名重复
    #[error("duplicate state '{0}'")]
    DuplicateState(String),

    /// 状态名不是合法标识符
    #[error("invalid state name '{0}'")]
    InvalidStateName(String),

    /// 缺少 Start 状态
    #[error("missing 'Start' state")]
    MissingStart,

    /// 在任何 Value 声明之前出现了状态段
    #[error("state section '{0}' appears before any value declaration")]
    StateBeforeValues(String),

    /// 规则行格式错误
    #[error("malformed rule '{0}'")]
    MalformedRule(String),

    /// `->` 之后的动作子句格式错误
    #[error("malformed action '{0}'")]
    MalformedAction(String),

    /// Continue 不能与状态跳转同时使用
    #[error("'Continue' cannot be combined with a state transition to '{0}'")]
    ContinueWithTransition(String),

    /// End/EOF 保留状态不允许带规则
    #[error("reserved state '{0}' must not contain rules")]
    NonEmptyReservedState(String),
}

/// 带行号的编译问题
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileIssue {
    /// 模板中的行号（从1开始，0表示与具体行无关）
    pub line_number: usize,
    pub kind: CompileIssueKind,
}

impl CompileIssue {
    pub fn new(line_number: usize, kind: CompileIssueKind) -> Self {
        Self { line_number, kind }
    }
}

impl fmt::Display for CompileIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line_number == 0 {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "line {}: {}", self.line_number, self.kind)
        }
    }
}

/// 模板编译错误
/// 汇总整份模板中发现的全部问题，便于一次性修复
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    pub issues: Vec<CompileIssue>,
}

impl CompileError {
    pub fn new(issues: Vec<CompileIssue>) -> Self {
        Self { issues }
    }

    pub fn single(line_number: usize, kind: CompileIssueKind) -> Self {
        Self::new(vec![CompileIssue::new(line_number, kind)])
    }

    /// 是否包含指定类别的问题
    pub fn contains(&self, predicate: impl Fn(&CompileIssueKind) -> bool) -> bool {
        self.issues.iter().any(|issue| predicate(&issue.kind))
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "template compilation failed with {} issue(s)", self.issues.len())?;
        for issue in &self.issues {
            write!(f, "\n  {}", issue)?;
        }
        Ok(())
    }
}

impl std::error::Error for CompileError {}

/// 运行期错误：仅由规则中的 `Error` 指令触发
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeError {
    /// 输入文本中的行号（从1开始）
    pub line_number: usize,
    /// 触发时所在的状态名
    pub state: String,
    /// 触发错误的输入行
    pub line: String,
    /// 模板中 `Error "..."` 携带的提示信息
    pub message: Option<String>,
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "state error raised in state '{}' at input line {}",
            self.state, self.line_number
        )?;
        if let Some(message) = &self.message {
            write!(f, " ({})", message)?;
        }
        write!(f, ": {:?}", self.line)
    }
}

impl std::error::Error for RuntimeError {}

/// 内核核心错误枚举
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    /// 无效输入参数
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// 内核层全局Result类型别名
pub type CoreResult<T> = Result<T, CoreError>;
