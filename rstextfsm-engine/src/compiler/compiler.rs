//! 模板编译器核心
//! 两阶段编译：先建立 Value 名 -> 命名分组 的替换表，再展开每条规则并编译正则

use std::sync::Arc;
use std::time::Instant;

use log::debug;
use regex::Regex;
use rustc_hash::{FxHashMap, FxHashSet};

use super::parser::{split_sections, SourceLine, StateBlock};
use crate::core::{Action, Rule, State, StateId, Target, ValueDescriptor};
use crate::error::{CompileError, CompileIssue, CompileIssueKind};
use crate::template::Template;

/// 保留状态名
pub const START_STATE: &str = "Start";
pub const END_STATE: &str = "End";
pub const EOF_STATE: &str = "EOF";

/// 模板编译器
pub struct TemplateCompiler;

impl TemplateCompiler {
    /// 编译模板文本
    /// 所有结构问题汇总到一个 CompileError 中返回
    pub fn compile(text: &str) -> Result<Template, CompileError> {
        let start = Instant::now();
        let mut issues = Vec::new();

        // 1. 分段
        let source = split_sections(text, &mut issues);

        // 2. 解析 Value 声明
        let values = Self::compile_values(&source.values, &mut issues);
        let groups: FxHashMap<&str, (usize, String)> = values
            .iter()
            .enumerate()
            .map(|(idx, value)| (value.name.as_str(), (idx, value.named_group())))
            .collect();

        // 3. 状态名 -> 索引
        let mut state_ids: FxHashMap<&str, StateId> = FxHashMap::default();
        for block in &source.states {
            if state_ids.contains_key(block.name) {
                issues.push(CompileIssue::new(
                    block.line_number,
                    CompileIssueKind::DuplicateState(block.name.to_string()),
                ));
                continue;
            }
            let id = StateId(state_ids.len());
            state_ids.insert(block.name, id);
        }

        // 4. 编译各状态的规则（重复的状态段只参与报错，不进入状态表）
        let mut states = Vec::with_capacity(state_ids.len());
        let mut seen = FxHashSet::default();
        for block in &source.states {
            let rules = Self::compile_state(block, &groups, &state_ids, &mut issues);
            if seen.insert(block.name) {
                states.push(State {
                    name: block.name.to_string(),
                    line_number: block.line_number,
                    rules,
                });
            }
        }

        // 5. 结构校验
        let start_state = match state_ids.get(START_STATE) {
            Some(id) => *id,
            None => {
                issues.push(CompileIssue::new(0, CompileIssueKind::MissingStart));
                StateId(0)
            }
        };
        for state in &states {
            if (state.name == END_STATE || state.name == EOF_STATE) && !state.rules.is_empty() {
                issues.push(CompileIssue::new(
                    state.line_number,
                    CompileIssueKind::NonEmptyReservedState(state.name.clone()),
                ));
            }
        }

        if !issues.is_empty() {
            issues.sort_by_key(|issue| issue.line_number);
            debug!("模板编译失败，共{}个问题", issues.len());
            return Err(CompileError::new(issues));
        }

        let has_eof_state = state_ids.contains_key(EOF_STATE);
        let header: Arc<[String]> = values.iter().map(|v| v.name.clone()).collect();
        let rule_count: usize = states.iter().map(|s| s.rules.len()).sum();

        debug!("✅ 模板编译完成，总耗时{:?}", start.elapsed());
        debug!(
            "📊 编译统计：Value{}个、状态{}个、规则{}条",
            values.len(),
            states.len(),
            rule_count
        );

        Ok(Template::new(values, states, start_state, has_eof_state, header))
    }

    /// 解析 Value 段，检查名称唯一性
    fn compile_values(
        lines: &[SourceLine<'_>],
        issues: &mut Vec<CompileIssue>,
    ) -> Vec<ValueDescriptor> {
        let mut values: Vec<ValueDescriptor> = Vec::with_capacity(lines.len());
        for line in lines {
            match ValueDescriptor::parse(line.text, line.line_number) {
                Ok(value) => {
                    if values.iter().any(|v| v.name == value.name) {
                        issues.push(CompileIssue::new(
                            line.line_number,
                            CompileIssueKind::DuplicateValue(value.name),
                        ));
                    } else {
                        values.push(value);
                    }
                }
                Err(issue) => issues.push(issue),
            }
        }
        values
    }

    /// 编译单个状态段中的全部规则
    fn compile_state(
        block: &StateBlock<'_>,
        groups: &FxHashMap<&str, (usize, String)>,
        state_ids: &FxHashMap<&str, StateId>,
        issues: &mut Vec<CompileIssue>,
    ) -> Vec<Rule> {
        let mut rules = Vec::with_capacity(block.rules.len());
        for line in &block.rules {
            match Self::compile_rule(line, groups, state_ids) {
                Ok(rule) => rules.push(rule),
                Err(mut rule_issues) => issues.append(&mut rule_issues),
            }
        }
        rules
    }

    /// 编译单条规则：拆分动作子句 -> 展开占位符 -> 编译正则 -> 解析跳转目标
    fn compile_rule(
        line: &SourceLine<'_>,
        groups: &FxHashMap<&str, (usize, String)>,
        state_ids: &FxHashMap<&str, StateId>,
    ) -> Result<Rule, Vec<CompileIssue>> {
        let issue = |kind| CompileIssue::new(line.line_number, kind);
        let mut issues = Vec::new();

        let (pattern_text, action_text) = split_action(line.text);
        let action = match action_text.map(Action::parse).transpose() {
            Ok(action) => action.unwrap_or_default(),
            Err(kind) => {
                issues.push(issue(kind));
                Action::default()
            }
        };

        // 占位符未声明时跳过正则编译，但继续检查跳转目标
        let expanded = match expand_placeholders(pattern_text, groups) {
            Ok(expanded) => Some(expanded),
            Err(undefined) => {
                issues.extend(
                    undefined
                        .into_iter()
                        .map(|name| issue(CompileIssueKind::UndefinedValue(name))),
                );
                None
            }
        };

        // 规则整体锚定在行首，顶层 `|` 的每个分支都不能从行中间开始匹配
        let compiled = expanded.and_then(|(pattern, referenced)| {
            match Regex::new(&format!("^(?:{})", pattern)) {
                Ok(regex) => Some((pattern, regex, referenced)),
                Err(e) => {
                    issues.push(issue(CompileIssueKind::InvalidRegex {
                        pattern,
                        reason: e.to_string(),
                    }));
                    None
                }
            }
        });

        let target = match action.new_state.as_deref() {
            None => Target::Stay,
            Some(END_STATE) => Target::End,
            Some(EOF_STATE) => Target::Eof,
            Some(name) => match state_ids.get(name) {
                Some(id) => Target::State(*id),
                None => {
                    issues.push(issue(CompileIssueKind::UnresolvedState(name.to_string())));
                    Target::Stay
                }
            },
        };

        match compiled {
            Some((pattern, regex, bindings)) if issues.is_empty() => Ok(Rule {
                line_number: line.line_number,
                source: line.text.to_string(),
                pattern,
                regex,
                action,
                target,
                bindings,
            }),
            _ => Err(issues),
        }
    }
}

/// 按最后一个 ` ->` 拆分规则正则与动作子句
fn split_action(rule: &str) -> (&str, Option<&str>) {
    let bytes = rule.as_bytes();
    let mut search_end = rule.len();
    while let Some(pos) = rule[..search_end].rfind("->") {
        if pos > 0 && bytes[pos - 1].is_ascii_whitespace() {
            return (rule[..pos].trim_end(), Some(&rule[pos + 2..]));
        }
        search_end = pos;
    }
    (rule, None)
}

/// 展开 `${NAME}` / `$NAME` 占位符，`$$` 转义为 `$`
///
/// 返回展开后的正则与引用到的 (分组名, 槽位索引)；未声明的名称全部收集后报错。
/// 后面不跟标识符或 `{` 的单个 `$` 原样保留（正则行尾锚点）。
fn expand_placeholders(
    pattern: &str,
    groups: &FxHashMap<&str, (usize, String)>,
) -> Result<(String, Vec<(String, usize)>), Vec<String>> {
    let mut expanded = String::with_capacity(pattern.len() * 2);
    let mut referenced: Vec<(String, usize)> = Vec::new();
    let mut undefined = Vec::new();
    let mut rest = pattern;

    while let Some(pos) = rest.find('$') {
        expanded.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        let (name, consumed) = if after.starts_with('$') {
            expanded.push('$');
            rest = &after[1..];
            continue;
        } else if let Some(braced) = after.strip_prefix('{') {
            match braced.find('}') {
                Some(end) => (&braced[..end], end + 2),
                None => {
                    expanded.push('$');
                    rest = after;
                    continue;
                }
            }
        } else {
            let len = after
                .char_indices()
                .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_'))
                .map(|(i, _)| i)
                .unwrap_or(after.len());
            let starts_ok = after
                .chars()
                .next()
                .map_or(false, |c| c.is_ascii_alphabetic() || c == '_');
            if len == 0 || !starts_ok {
                expanded.push('$');
                rest = after;
                continue;
            }
            (&after[..len], len)
        };

        match groups.get(name) {
            Some((idx, group)) => {
                expanded.push_str(group);
                if !referenced.iter().any(|(n, _)| n == name) {
                    referenced.push((name.to_string(), *idx));
                }
            }
            None => undefined.push(name.to_string()),
        }
        rest = &after[consumed..];
    }
    expanded.push_str(rest);

    if undefined.is_empty() {
        Ok((expanded, referenced))
    } else {
        Err(undefined)
    }
}
