//! 编译后的模板
//! 不可变，可在多个线程间只读共享；每次运行各自持有独立的 RunContext

use std::sync::Arc;

use crate::compiler::TemplateCompiler;
use crate::core::{State, StateId, ValueDescriptor};
use crate::engine::runner;
use crate::engine::RunOutput;
use crate::error::CompileError;

#[derive(Debug, Clone)]
pub struct Template {
    values: Vec<ValueDescriptor>,
    states: Vec<State>,
    start: StateId,
    has_eof_state: bool,
    header: Arc<[String]>,
}

impl Template {
    pub(crate) fn new(
        values: Vec<ValueDescriptor>,
        states: Vec<State>,
        start: StateId,
        has_eof_state: bool,
        header: Arc<[String]>,
    ) -> Self {
        Self {
            values,
            states,
            start,
            has_eof_state,
            header,
        }
    }

    /// 编译模板文本
    pub fn compile(text: &str) -> Result<Self, CompileError> {
        TemplateCompiler::compile(text)
    }

    /// 解析整段文本
    pub fn run(&self, input: &str) -> RunOutput {
        runner::run_lines(self, input.lines())
    }

    /// 解析逐行提供的输入
    pub fn run_lines<I, S>(&self, lines: I) -> RunOutput
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        runner::run_lines(self, lines)
    }

    /// 列名（Value 声明顺序）
    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub(crate) fn shared_header(&self) -> Arc<[String]> {
        self.header.clone()
    }

    pub fn values(&self) -> &[ValueDescriptor] {
        &self.values
    }

    pub fn value(&self, name: &str) -> Option<&ValueDescriptor> {
        self.values.iter().find(|v| v.name == name)
    }

    /// 带 Key 选项的列名
    pub fn key_names(&self) -> Vec<&str> {
        self.values
            .iter()
            .filter(|v| v.is_key())
            .map(|v| v.name.as_str())
            .collect()
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn state(&self, name: &str) -> Option<&State> {
        self.states.iter().find(|s| s.name == name)
    }

    pub fn start_state(&self) -> StateId {
        self.start
    }

    /// 是否显式声明了 EOF 状态（声明后结尾不再隐式输出记录）
    pub fn has_eof_state(&self) -> bool {
        self.has_eof_state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FieldValue, Record};
    use crate::engine::RunContext;
    use crate::error::CompileIssueKind;

    fn compile(text: &str) -> Template {
        Template::compile(text).unwrap_or_else(|e| panic!("{}", e))
    }

    fn column<'a>(records: &'a [Record], name: &str) -> Vec<&'a str> {
        records
            .iter()
            .map(|r| r.get(name).and_then(FieldValue::as_str).unwrap())
            .collect()
    }

    const SINGLE_ID: &str = "\
Value Required ID (\\d+)

Start
  ^ID: ${ID} -> Record
";

    #[test]
    fn test_single_required_value_emits_one_record() {
        let output = compile(SINGLE_ID).run("ID: 7\n");
        assert!(output.is_success());
        assert_eq!(output.records.len(), 1);
        assert_eq!(output.records[0].get("ID"), Some(&FieldValue::from("7")));
    }

    #[test]
    fn test_unmatched_input_yields_nothing() {
        let output = compile(SINGLE_ID).run("nothing here\n");
        assert!(output.is_success());
        assert!(output.records.is_empty());
    }

    #[test]
    fn test_list_accumulates_across_continue() {
        let template = compile(
            "\
Value List ITEM (\\S+)

Start
  ^- ${ITEM} -> Continue
  ^END -> Record
",
        );
        let output = template.run("- a\n- b\n- c\nEND\n");
        assert_eq!(output.records.len(), 1);
        assert_eq!(
            output.records[0].get("ITEM"),
            Some(&FieldValue::from(vec!["a", "b", "c"]))
        );
    }

    #[test]
    fn test_list_resets_between_records() {
        let template = compile(
            "\
Value List ITEM (\\S+)

Start
  ^- ${ITEM}
  ^END -> Record
",
        );
        let records = template.run("- a\n- b\nEND\n- c\nEND\n").records;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("ITEM"), Some(&FieldValue::from(vec!["a", "b"])));
        assert_eq!(records[1].get("ITEM"), Some(&FieldValue::from(vec!["c"])));
    }

    const SITES: &str = "\
Value Filldown SITE (\\S+)
Value Required HOST (\\S+)

Start
  ^Site: ${SITE}
  ^Host: ${HOST} -> Record
  ^Soft -> Clear
  ^Hard -> Clearall
";

    #[test]
    fn test_filldown_persists_across_records() {
        let records = compile(SITES).run("Site: nyc\nHost: a\nHost: b\n").records;
        assert_eq!(column(&records, "SITE"), vec!["nyc", "nyc"]);
        assert_eq!(column(&records, "HOST"), vec!["a", "b"]);
    }

    #[test]
    fn test_clear_keeps_filldown_and_clearall_erases_it() {
        let records = compile(SITES)
            .run("Site: x\nHost: a\nSoft\nHost: b\nHard\nHost: c\n")
            .records;
        assert_eq!(column(&records, "SITE"), vec!["x", "x", ""]);
        assert_eq!(column(&records, "HOST"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_undefined_value_fails_compilation() {
        let err = Template::compile(
            "\
Value ID (\\d+)

Start
  ^ID: ${UNDECLARED} -> Record
",
        )
        .unwrap_err();
        assert_eq!(err.issues.len(), 1);
        assert_eq!(err.issues[0].line_number, 4);
        assert_eq!(
            err.issues[0].kind,
            CompileIssueKind::UndefinedValue("UNDECLARED".into())
        );
        assert!(err.to_string().contains("UNDECLARED"));
    }

    #[test]
    fn test_undefined_value_and_unresolved_state_reported_together() {
        let err = Template::compile("Value ID (\\d+)\n\nStart\n  ^${NOPE} -> Missing\n")
            .unwrap_err();
        assert_eq!(err.issues.len(), 2);
        assert!(err.contains(|k| *k == CompileIssueKind::UndefinedValue("NOPE".into())));
        assert!(err.contains(|k| *k == CompileIssueKind::UnresolvedState("Missing".into())));
    }

    #[test]
    fn test_alternation_branches_anchor_at_line_start() {
        let template = compile("Value Required X (\\S+)\n\nStart\n  ^foo|bar ${X} -> Record\n");
        assert!(template.run("xx bar 7\n").records.is_empty());

        let output = template.run("bar 7\n");
        assert_eq!(column(&output.records, "X"), vec!["7"]);
    }

    #[test]
    fn test_compile_errors_are_aggregated() {
        let err = Template::compile(
            "\
Value ID (\\d+)
Value ID (\\w+)
Value Bogus NAME (\\w+)

Start
  ^${ID} -> Missing
  ^x -> Continue Start
  ^( -> Record

EOF
  ^y
",
        )
        .unwrap_err();
        let kinds: Vec<&CompileIssueKind> = err.issues.iter().map(|i| &i.kind).collect();
        assert!(kinds.contains(&&CompileIssueKind::DuplicateValue("ID".into())));
        assert!(kinds.contains(&&CompileIssueKind::UnknownOption("Bogus".into())));
        assert!(kinds.contains(&&CompileIssueKind::UnresolvedState("Missing".into())));
        assert!(kinds.contains(&&CompileIssueKind::ContinueWithTransition("Start".into())));
        assert!(err.contains(|k| matches!(k, CompileIssueKind::InvalidRegex { .. })));
        assert!(kinds.contains(&&CompileIssueKind::NonEmptyReservedState("EOF".into())));
        // 按行号排序
        let lines: Vec<usize> = err.issues.iter().map(|i| i.line_number).collect();
        let mut sorted = lines.clone();
        sorted.sort();
        assert_eq!(lines, sorted);
    }

    #[test]
    fn test_missing_start_state() {
        let err = Template::compile("Value A (a)\n\nMain\n  ^a\n").unwrap_err();
        assert_eq!(err.issues[0].kind, CompileIssueKind::MissingStart);
    }

    #[test]
    fn test_duplicate_state() {
        let err = Template::compile("Value A (a)\n\nStart\n  ^a\n\nStart\n  ^b\n").unwrap_err();
        assert_eq!(
            err.issues[0].kind,
            CompileIssueKind::DuplicateState("Start".into())
        );
        assert_eq!(err.issues[0].line_number, 6);
    }

    #[test]
    fn test_state_transitions() {
        let template = compile(
            "\
Value Filldown CHASSIS (\\S+)
Value Required SLOT (\\d+)

Start
  ^Chassis ${CHASSIS} -> Slots

Slots
  ^\\s+slot ${SLOT} -> Record
  ^Chassis ${CHASSIS}
",
        );
        let input = "\
slot 9 ignored before chassis
Chassis A
  slot 1
  slot 2
Chassis B
  slot 3
";
        let records = template.run(input).records;
        assert_eq!(column(&records, "CHASSIS"), vec!["A", "A", "B"]);
        assert_eq!(column(&records, "SLOT"), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let template = compile(
            "\
Value KIND (\\w+)

Start
  ^error ${KIND} -> Record
  ^\\w+ ${KIND} -> Record
",
        );
        let records = template.run("error disk\nwarn fan\n").records;
        assert_eq!(column(&records, "KIND"), vec!["disk", "fan"]);
    }

    #[test]
    fn test_implicit_record_at_end_of_input() {
        let template = compile(
            "\
Value HOSTNAME (\\S+)
Value VERSION (\\S+)

Start
  ^hostname ${HOSTNAME}
  ^version ${VERSION}
",
        );
        let records = template.run("hostname r1\nversion 15.2\n").records;
        assert_eq!(records.len(), 1);
        assert_eq!(column(&records, "HOSTNAME"), vec!["r1"]);
        assert_eq!(column(&records, "VERSION"), vec!["15.2"]);
    }

    #[test]
    fn test_end_state_stops_without_final_record() {
        let template = compile(
            "\
Value NAME (\\S+)

Start
  ^name ${NAME}
  ^STOP -> End
",
        );
        assert!(template.run("name a\nSTOP\nname b\n").records.is_empty());
        assert_eq!(column(&template.run("name a\nname b\n").records, "NAME"), vec!["b"]);
    }

    #[test]
    fn test_declared_eof_state_disables_final_record() {
        let template = compile(
            "\
Value NAME (\\S+)

Start
  ^name ${NAME}

EOF
",
        );
        assert!(template.has_eof_state());
        assert!(template.run("name a\n").records.is_empty());
    }

    #[test]
    fn test_transition_to_eof_stops_but_flushes() {
        let template = compile(
            "\
Value NAME (\\S+)

Start
  ^name ${NAME}
  ^--- -> EOF
",
        );
        let records = template.run("name a\n---\nname b\n").records;
        assert_eq!(column(&records, "NAME"), vec!["a"]);
    }

    #[test]
    fn test_error_directive_keeps_partial_results() {
        let template = compile(
            "\
Value Required ID (\\d+)

Start
  ^ID: ${ID} -> Record
  ^BAD -> Error \"bad line\"
",
        );
        let output = template.run("ID: 1\nBAD\nID: 2\n");
        assert!(!output.is_success());
        assert_eq!(column(&output.records, "ID"), vec!["1"]);

        let error = output.clone().error.unwrap();
        assert_eq!(error.line_number, 2);
        assert_eq!(error.state, "Start");
        assert_eq!(error.line, "BAD");
        assert_eq!(error.message.as_deref(), Some("bad line"));
        assert!(output.into_result().is_err());
    }

    #[test]
    fn test_fillup_backfills_earlier_records() {
        let template = compile(
            "\
Value Fillup DEVICE (\\S+)
Value PORT (\\S+)

Start
  ^Port ${PORT} -> Record
  ^Device ${DEVICE}
",
        );
        let records = template.run("Port 1\nPort 2\nDevice sw1\nPort 3\n").records;
        assert_eq!(column(&records, "DEVICE"), vec!["sw1", "sw1", "sw1"]);
        assert_eq!(column(&records, "PORT"), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_fillup_window_starts_at_clearall() {
        let template = compile(
            "\
Value Fillup DEVICE (\\S+)
Value Required PORT (\\S+)

Start
  ^Port ${PORT} -> Record
  ^Reset -> Clearall
  ^Device ${DEVICE}
",
        );
        let records = template.run("Port 1\nReset\nPort 2\nDevice sw1\n").records;
        assert_eq!(column(&records, "DEVICE"), vec!["", "sw1"]);
        assert_eq!(column(&records, "PORT"), vec!["1", "2"]);
    }

    #[test]
    fn test_fillup_stops_at_filled_record() {
        let template = compile(
            "\
Value Fillup DEVICE (\\S+)
Value Required PORT (\\S+)

Start
  ^Port ${PORT} -> Record
  ^Device ${DEVICE}
",
        );
        let records = template.run("Device a\nPort 1\nPort 2\nDevice b\n").records;
        assert_eq!(column(&records, "DEVICE"), vec!["a", "b"]);
    }

    #[test]
    fn test_unmatched_lines_are_noops() {
        let template = compile(SITES);
        let clean = template.run("Site: x\nHost: a\nHost: b\n");
        let noisy = template.run("!!\nSite: x\n\n  junk\nHost: a\nrandom\nHost: b\n---\n");
        assert_eq!(clean.records, noisy.records);
    }

    #[test]
    fn test_runs_are_deterministic() {
        let template = compile(SITES);
        let input = "Site: x\nHost: a\nSoft\nHost: b\n";
        assert_eq!(template.run(input), template.run(input));
    }

    #[test]
    fn test_optional_group_does_not_overwrite() {
        let template = compile(
            "\
Value NAME (\\S+)
Value Required DESC (.*)

Start
  ^name ${NAME}(?: desc ${DESC})?$$ -> Continue
  ^name \\S+ desc -> Record
",
        );
        let records = template.run("name a desc uplink\nname b\n").records;
        assert_eq!(column(&records, "NAME"), vec!["a"]);
        assert_eq!(column(&records, "DESC"), vec!["uplink"]);
    }

    #[test]
    fn test_run_lines_and_context() {
        let template = compile(SITES);
        let output = template.run_lines(vec!["Site: x", "Host: a"]);
        assert_eq!(output.records.len(), 1);
        assert_eq!(&*output.header, &["SITE".to_string(), "HOST".to_string()]);

        let mut context = RunContext::new(&template);
        assert_eq!(context.state_name(), "Start");
        assert!(context.process_line("Site: y").unwrap());
        assert_eq!(context.line_number(), 1);
        let output = context.finish(None);
        // 只有 Filldown 值，Required 未满足
        assert!(output.records.is_empty());
    }

    #[test]
    fn test_context_stays_halted_after_error() {
        let template = compile(
            "Value Required ID (\\d+)\n\nStart\n  ^ID: ${ID}\n  ^BAD -> Error\n",
        );
        let mut context = RunContext::new(&template);
        assert!(context.process_line("ID: 1").unwrap());
        assert!(context.process_line("BAD").is_err());
        assert!(context.is_stopped());

        // 错误之后送入的行不再生效
        assert!(!context.process_line("ID: 2").unwrap());
        assert_eq!(context.line_number(), 2);
        let output = context.finish(None);
        assert!(output.records.is_empty());
    }

    #[test]
    fn test_introspection() {
        let template = compile(
            "\
Value Key,Required IFACE (\\S+)
Value Key VLAN (\\d+)
Value DESC (.*)

Start
  ^${IFACE} ${VLAN} ${DESC} -> Record
",
        );
        assert_eq!(template.header(), &["IFACE", "VLAN", "DESC"]);
        assert_eq!(template.key_names(), vec!["IFACE", "VLAN"]);
        assert!(template.value("IFACE").unwrap().is_required());
        assert_eq!(template.state("Start").unwrap().rules.len(), 1);
        assert_eq!(template.start_state(), StateId(0));
    }

    #[test]
    fn test_template_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Template>();

        let template = Arc::new(compile(SINGLE_ID));
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let template = Arc::clone(&template);
                std::thread::spawn(move || template.run(&format!("ID: {}\n", i)).records.len())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), 1);
        }
    }
}
