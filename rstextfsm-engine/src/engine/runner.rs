//! 逐行匹配状态机
//! 每次运行独立持有 RunContext（当前状态、槽位、输出），模板本身只读共享

use log::{trace, warn};

use super::assembler::RecordAssembler;
use super::RunOutput;
use crate::core::{LineOp, RecordOp, StateId, Target};
use crate::error::RuntimeError;
use crate::template::Template;
use crate::utils::preview::preview_compact;

const PREVIEW_LEN: usize = 80;

/// 单次运行的可变上下文
pub struct RunContext<'t> {
    template: &'t Template,
    state: StateId,
    line_number: usize,
    assembler: RecordAssembler<'t>,
    /// 通过 End/EOF 提前停止时记录停止目标
    stopped_at: Option<Target>,
    /// 已触发 Error，之后的行一律忽略
    failed: bool,
}

impl<'t> RunContext<'t> {
    pub fn new(template: &'t Template) -> Self {
        Self {
            template,
            state: template.start_state(),
            line_number: 0,
            assembler: RecordAssembler::new(template.values(), template.shared_header()),
            stopped_at: None,
            failed: false,
        }
    }

    /// 当前状态名
    pub fn state_name(&self) -> &'t str {
        &self.template.states()[self.state.0].name
    }

    /// 已处理的行数
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// 是否已通过 End/EOF 或 Error 停止
    pub fn is_stopped(&self) -> bool {
        self.failed || self.stopped_at.is_some()
    }

    /// 处理一行输入
    /// 返回 Ok(false) 表示状态机已停止，后续行无需再送入
    pub fn process_line(&mut self, line: &str) -> Result<bool, RuntimeError> {
        if self.is_stopped() {
            return Ok(false);
        }
        self.line_number += 1;

        let template = self.template;
        let state = &template.states()[self.state.0];

        for rule in &state.rules {
            let Some(captures) = rule.captures(line) else {
                continue;
            };

            for (group, slot) in &rule.bindings {
                if let Some(matched) = captures.name(group) {
                    self.assembler.assign(*slot, matched.as_str());
                }
            }
            trace!(
                "[{}] 第{}行命中规则(模板第{}行) {}: {}",
                state.name,
                self.line_number,
                rule.line_number,
                rule.action,
                preview_compact(line, PREVIEW_LEN)
            );

            match rule.action.record_op {
                RecordOp::Record => {
                    self.assembler.record();
                }
                RecordOp::Clear => self.assembler.clear(),
                RecordOp::Clearall => self.assembler.clear_all(),
                RecordOp::NoRecord => {}
            }

            if rule.action.line_op == LineOp::Error {
                warn!(
                    "State error in '{}' at line {}: {}",
                    state.name,
                    self.line_number,
                    preview_compact(line, PREVIEW_LEN)
                );
                self.failed = true;
                return Err(RuntimeError {
                    line_number: self.line_number,
                    state: state.name.clone(),
                    line: line.to_string(),
                    message: rule.action.message.clone(),
                });
            }

            match rule.target {
                Target::Stay => {}
                Target::State(next) => self.state = next,
                Target::End | Target::Eof => {
                    self.stopped_at = Some(rule.target);
                    return Ok(false);
                }
            }

            if rule.action.line_op == LineOp::Continue {
                continue;
            }
            return Ok(true);
        }

        Ok(true)
    }

    /// 结束本次运行
    /// 未因 End 停止、模板也未声明 EOF 状态时，结尾隐式执行一次 Record
    pub fn finish(mut self, error: Option<RuntimeError>) -> RunOutput {
        if error.is_none()
            && !self.failed
            && self.stopped_at != Some(Target::End)
            && !self.template.has_eof_state()
        {
            self.assembler.record();
        }
        trace!(
            "运行结束：处理{}行，输出{}条记录",
            self.line_number,
            self.assembler.records_len()
        );
        RunOutput {
            header: self.template.shared_header(),
            records: self.assembler.into_records(),
            error,
        }
    }
}

/// 驱动完整的一次运行
pub(crate) fn run_lines<I, S>(template: &Template, lines: I) -> RunOutput
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut context = RunContext::new(template);
    let mut error = None;
    for line in lines {
        match context.process_line(line.as_ref()) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => {
                error = Some(e);
                break;
            }
        }
    }
    context.finish(error)
}
