//! Value 声明模型
//! 解析 `Value [Options] NAME (regex)` 行，得到命名捕获槽位

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use regex_syntax::ast::{self, Ast, GroupKind};
use serde::{Deserialize, Serialize};

use crate::error::{CompileIssue, CompileIssueKind};

/// Value/State 名称长度上限
pub const MAX_NAME_LEN: usize = 48;

/// 合法标识符（Value 名与状态名共用）
pub(crate) static IDENTIFIER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// Value 选项
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueOption {
    /// 记录输出时必须非空，否则整条记录被丢弃
    Required,
    /// 跨记录保留，直到被覆盖或 Clearall
    Filldown,
    /// 取值后向上回填之前记录中的空位
    Fillup,
    /// 累积为有序列表
    List,
    /// 标记为记录的键列（仅用于调用方）
    Key,
}

impl FromStr for ValueOption {
    type Err = CompileIssueKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Required" => Ok(ValueOption::Required),
            "Filldown" => Ok(ValueOption::Filldown),
            "Fillup" => Ok(ValueOption::Fillup),
            "List" => Ok(ValueOption::List),
            "Key" => Ok(ValueOption::Key),
            other => Err(CompileIssueKind::UnknownOption(other.to_string())),
        }
    }
}

impl Display for ValueOption {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueOption::Required => write!(f, "Required"),
            ValueOption::Filldown => write!(f, "Filldown"),
            ValueOption::Fillup => write!(f, "Fillup"),
            ValueOption::List => write!(f, "List"),
            ValueOption::Key => write!(f, "Key"),
        }
    }
}

/// 单个 Value 声明
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueDescriptor {
    pub name: String,
    /// 按声明顺序保存的选项
    pub options: Vec<ValueOption>,
    /// 原始正则片段，如 `(\d+)`
    pub fragment: String,
    /// 声明所在的模板行号
    pub line_number: usize,
}

impl ValueDescriptor {
    /// 解析一行 Value 声明
    ///
    /// 选项既可以空格分隔（`Value Required Filldown NAME (...)`），
    /// 也可以逗号分隔（`Value Required,Filldown NAME (...)`）。
    /// 名称唯一性由编译器在整份模板范围内检查。
    pub fn parse(line: &str, line_number: usize) -> Result<Self, CompileIssue> {
        let issue = |kind| CompileIssue::new(line_number, kind);

        let rest = line
            .trim()
            .strip_prefix("Value")
            .filter(|rest| rest.starts_with(char::is_whitespace))
            .ok_or_else(|| issue(CompileIssueKind::MalformedRule(line.trim().to_string())))?;

        // 第一个以 '(' 开头的 token 起即为正则片段（片段内部允许空格）
        let mut head_tokens = Vec::new();
        let mut fragment = None;
        let mut offset = 0;
        for token in rest.split_whitespace() {
            let start = offset + rest[offset..].find(token).unwrap_or(0);
            offset = start + token.len();
            if token.starts_with('(') {
                fragment = Some(rest[start..].trim_end());
                break;
            }
            head_tokens.push(token);
        }

        let fragment = fragment.ok_or_else(|| {
            issue(CompileIssueKind::MalformedFragment {
                fragment: rest.trim().to_string(),
                reason: "missing parenthesised regex".to_string(),
            })
        })?;
        let (name, option_tokens) = head_tokens
            .split_last()
            .ok_or_else(|| issue(CompileIssueKind::InvalidValueName(String::new())))?;

        Self::validate_name(name).map_err(issue)?;

        let mut options = Vec::new();
        for raw in option_tokens.iter().flat_map(|token| token.split(',')) {
            if raw.is_empty() {
                continue;
            }
            let option = raw.parse::<ValueOption>().map_err(issue)?;
            if options.contains(&option) {
                return Err(issue(CompileIssueKind::DuplicateOption(raw.to_string())));
            }
            options.push(option);
        }

        Self::validate_fragment(fragment).map_err(issue)?;

        Ok(Self {
            name: name.to_string(),
            options,
            fragment: fragment.to_string(),
            line_number,
        })
    }

    /// 名称必须是不超过上限的标识符
    pub(crate) fn validate_name(name: &str) -> Result<(), CompileIssueKind> {
        if !IDENTIFIER_REGEX.is_match(name) {
            return Err(CompileIssueKind::InvalidValueName(name.to_string()));
        }
        if name.len() > MAX_NAME_LEN {
            return Err(CompileIssueKind::NameTooLong {
                name: name.to_string(),
                max: MAX_NAME_LEN,
            });
        }
        Ok(())
    }

    /// 片段必须整体是一个匿名捕获分组，且能独立编译
    fn validate_fragment(fragment: &str) -> Result<(), CompileIssueKind> {
        let malformed = |reason: &str| CompileIssueKind::MalformedFragment {
            fragment: fragment.to_string(),
            reason: reason.to_string(),
        };

        let parsed = ast::parse::Parser::new()
            .parse(fragment)
            .map_err(|e| malformed(&e.kind().to_string()))?;
        match &parsed {
            Ast::Group(group) if matches!(group.kind, GroupKind::CaptureIndex(_)) => {}
            _ => return Err(malformed("must be a single capturing group")),
        }

        Regex::new(fragment).map_err(|e| CompileIssueKind::InvalidRegex {
            pattern: fragment.to_string(),
            reason: e.to_string(),
        })?;
        Ok(())
    }

    #[inline]
    pub fn has_option(&self, option: ValueOption) -> bool {
        self.options.contains(&option)
    }

    #[inline]
    pub fn is_required(&self) -> bool {
        self.has_option(ValueOption::Required)
    }

    #[inline]
    pub fn is_filldown(&self) -> bool {
        self.has_option(ValueOption::Filldown)
    }

    #[inline]
    pub fn is_fillup(&self) -> bool {
        self.has_option(ValueOption::Fillup)
    }

    #[inline]
    pub fn is_list(&self) -> bool {
        self.has_option(ValueOption::List)
    }

    #[inline]
    pub fn is_key(&self) -> bool {
        self.has_option(ValueOption::Key)
    }

    /// 将 `(regex)` 改写为 `(?P<NAME>regex)`，供规则展开时替换占位符
    pub fn named_group(&self) -> String {
        format!("(?P<{}>{}", self.name, &self.fragment[1..])
    }
}
