//! 模板文本分段
//! 将原始模板拆分为 Value 段与若干状态段，只做结构切分，不编译正则

use crate::core::value::{IDENTIFIER_REGEX, MAX_NAME_LEN};
use crate::error::{CompileIssue, CompileIssueKind};

/// 模板中的一行（行号从1开始）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLine<'a> {
    pub line_number: usize,
    pub text: &'a str,
}

/// 一个状态段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateBlock<'a> {
    pub name: &'a str,
    pub line_number: usize,
    /// 规则行（已去除缩进）
    pub rules: Vec<SourceLine<'a>>,
}

/// 分段结果
#[derive(Debug, Default)]
pub struct TemplateSource<'a> {
    pub values: Vec<SourceLine<'a>>,
    pub states: Vec<StateBlock<'a>>,
}

/// 注释行：首个非空白字符为 '#'
#[inline]
fn is_comment(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

#[inline]
fn is_value_line(line: &str) -> bool {
    line.starts_with("Value ") || line.starts_with("Value\t")
}

/// 拆分模板文本，结构问题追加到 `issues`
pub fn split_sections<'a>(text: &'a str, issues: &mut Vec<CompileIssue>) -> TemplateSource<'a> {
    let mut source = TemplateSource::default();
    let mut in_values = true;
    // 当前是否处于一个未被空行结束的状态段
    let mut block_open = false;

    for (idx, raw) in text.lines().enumerate() {
        let line_number = idx + 1;
        let line = raw.trim_end();

        if is_comment(line) {
            continue;
        }
        if line.is_empty() {
            block_open = false;
            continue;
        }

        if is_value_line(line) {
            if in_values {
                source.values.push(SourceLine { line_number, text: line });
            } else {
                issues.push(CompileIssue::new(
                    line_number,
                    CompileIssueKind::MisplacedValue(line.to_string()),
                ));
            }
            continue;
        }

        if !line.starts_with(char::is_whitespace) {
            // 状态段标题
            if in_values && source.values.is_empty() {
                issues.push(CompileIssue::new(
                    line_number,
                    CompileIssueKind::StateBeforeValues(line.to_string()),
                ));
            }
            in_values = false;
            block_open = true;

            if !IDENTIFIER_REGEX.is_match(line) {
                issues.push(CompileIssue::new(
                    line_number,
                    CompileIssueKind::InvalidStateName(line.to_string()),
                ));
            } else if line.len() > MAX_NAME_LEN {
                issues.push(CompileIssue::new(
                    line_number,
                    CompileIssueKind::NameTooLong {
                        name: line.to_string(),
                        max: MAX_NAME_LEN,
                    },
                ));
            }
            // 名称非法时仍然收集规则，以便继续报告规则中的问题
            source.states.push(StateBlock {
                name: line,
                line_number,
                rules: Vec::new(),
            });
            continue;
        }

        // 缩进行：规则
        let rule = line.trim_start();
        match source.states.last_mut() {
            Some(block) if block_open && rule.starts_with('^') => {
                block.rules.push(SourceLine { line_number, text: rule });
            }
            _ => issues.push(CompileIssue::new(
                line_number,
                CompileIssueKind::MalformedRule(rule.to_string()),
            )),
        }
        in_values = false;
    }

    source
}
