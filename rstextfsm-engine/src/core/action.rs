//! 规则动作模型
//! `-> [LineOp][.RecordOp] [NewState]` 子句的解析结果

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use super::value::IDENTIFIER_REGEX;
use crate::error::CompileIssueKind;

/// 行操作：匹配后如何推进输入
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LineOp {
    /// 读取下一行，从新状态的第一条规则开始匹配
    #[default]
    Next,
    /// 保持当前行，继续尝试当前状态的后续规则
    Continue,
    /// 终止本次运行，产生 RuntimeError
    Error,
}

/// 记录操作：匹配后如何处理进行中的记录
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RecordOp {
    #[default]
    NoRecord,
    /// 输出当前记录，然后清空非 Filldown 槽位
    Record,
    /// 清空非 Filldown 槽位，不输出
    Clear,
    /// 清空全部槽位（包括 Filldown）
    Clearall,
}

impl LineOp {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "Next" => Some(LineOp::Next),
            "Continue" => Some(LineOp::Continue),
            "Error" => Some(LineOp::Error),
            _ => None,
        }
    }
}

impl RecordOp {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "NoRecord" => Some(RecordOp::NoRecord),
            "Record" => Some(RecordOp::Record),
            "Clear" => Some(RecordOp::Clear),
            "Clearall" => Some(RecordOp::Clearall),
            _ => None,
        }
    }
}

impl Display for LineOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LineOp::Next => write!(f, "Next"),
            LineOp::Continue => write!(f, "Continue"),
            LineOp::Error => write!(f, "Error"),
        }
    }
}

impl Display for RecordOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordOp::NoRecord => write!(f, "NoRecord"),
            RecordOp::Record => write!(f, "Record"),
            RecordOp::Clear => write!(f, "Clear"),
            RecordOp::Clearall => write!(f, "Clearall"),
        }
    }
}

/// 解析后的规则动作（状态名尚未解析为索引）
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Action {
    pub line_op: LineOp,
    pub record_op: RecordOp,
    /// 跳转目标状态名，None 表示留在当前状态
    pub new_state: Option<String>,
    /// `Error` 携带的提示信息
    pub message: Option<String>,
}

impl Action {
    /// 解析 `->` 之后的动作子句
    ///
    /// 支持的写法：
    /// - `Record` / `Clear` / `Clearall` / `NoRecord`
    /// - `Next` / `Continue` / `Error`
    /// - `LineOp.RecordOp`，如 `Next.Record`、`Continue.Clear`
    /// - 以上任一形式后接状态名，或单独一个状态名
    /// - `Error "message"` / `Error StateLikeMessage`
    pub fn parse(clause: &str) -> Result<Self, CompileIssueKind> {
        let clause = clause.trim();
        let malformed = || CompileIssueKind::MalformedAction(clause.to_string());
        if clause.is_empty() {
            return Err(malformed());
        }

        // 带引号的错误信息可以包含空格，单独处理
        if let Some(quoted_at) = clause.find('"') {
            let (head, quoted) = clause.split_at(quoted_at);
            let message = quoted
                .strip_prefix('"')
                .and_then(|q| q.strip_suffix('"'))
                .filter(|m| !m.contains('"'))
                .ok_or_else(malformed)?;
            let mut action = Self::parse_operations(head.trim()).ok_or_else(malformed)?;
            if action.line_op != LineOp::Error {
                return Err(malformed());
            }
            action.message = Some(message.to_string());
            return Ok(action);
        }

        let tokens: Vec<&str> = clause.split_whitespace().collect();
        match tokens.as_slice() {
            [single] => {
                if let Some(action) = Self::parse_operations(single) {
                    return Ok(action);
                }
                // 单独的状态名
                if IDENTIFIER_REGEX.is_match(single) {
                    return Ok(Self {
                        new_state: Some(single.to_string()),
                        ..Self::default()
                    });
                }
                Err(malformed())
            }
            [operations, state] => {
                let mut action = Self::parse_operations(operations).ok_or_else(malformed)?;
                if action.line_op == LineOp::Error {
                    action.message = Some(state.to_string());
                    return Ok(action);
                }
                if !IDENTIFIER_REGEX.is_match(state) {
                    return Err(malformed());
                }
                if action.line_op == LineOp::Continue {
                    return Err(CompileIssueKind::ContinueWithTransition(state.to_string()));
                }
                action.new_state = Some(state.to_string());
                Ok(action)
            }
            _ => Err(malformed()),
        }
    }

    /// 解析 `LineOp`、`RecordOp` 或 `LineOp.RecordOp`
    fn parse_operations(token: &str) -> Option<Self> {
        if let Some((line, record)) = token.split_once('.') {
            return Some(Self {
                line_op: LineOp::from_token(line)?,
                record_op: RecordOp::from_token(record)?,
                ..Self::default()
            });
        }
        if let Some(line_op) = LineOp::from_token(token) {
            return Some(Self {
                line_op,
                ..Self::default()
            });
        }
        RecordOp::from_token(token).map(|record_op| Self {
            record_op,
            ..Self::default()
        })
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.line_op, self.record_op)?;
        if let Some(state) = &self.new_state {
            write!(f, " {}", state)?;
        }
        if let Some(message) = &self.message {
            write!(f, " \"{}\"", message)?;
        }
        Ok(())
    }
}
