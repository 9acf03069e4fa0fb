use std::io::Write;

use flagx::{
    ErrorPolicy, FlagDeclaration, FlagKind, FlagxError, HELP_FLAG, Parser, ParserConfig,
    PolicyOption, RecordingTerminator, Registry, SharedBuffer, TERMINATION_EXIT_CODE, TokenError,
};

/// Parser wired to an in-memory sink and a recording terminator.
fn harness(name: &str, policy: ErrorPolicy) -> (Parser, SharedBuffer, RecordingTerminator) {
    let out = SharedBuffer::new();
    let exits = RecordingTerminator::new();
    let mut parser = Parser::named(name, "");
    parser.set_output(out.clone());
    parser.set_terminator(exits.clone());
    parser.set_error_policy(policy);
    (parser, out, exits)
}

// ---------------------------------------------------------------------------
// Valid input
// ---------------------------------------------------------------------------

#[test]
fn valid_tokens_are_all_consumed_without_termination() {
    let (mut parser, out, exits) = harness("ok", ErrorPolicy::new());
    let host = parser.string("host", "localhost", "", false).unwrap();
    let port = parser.uint("port", 80, "", false).unwrap();
    let ratio = parser.float("ratio", 0.5, "", false).unwrap();
    let debug = parser.bool("debug", false, "", false).unwrap();

    parser
        .parse(["--host=example.org", "-port", "0x1F90", "-ratio=1e-3", "-debug=false", "--"])
        .unwrap();

    assert_eq!(host.get(), "example.org");
    assert_eq!(port.get(), 8080);
    assert_eq!(ratio.get(), 1e-3);
    assert!(!debug.get());
    assert_eq!(parser.n_flag(), 4);
    assert!(parser.remaining().is_empty());
    assert!(!exits.was_called());
    assert!(out.is_empty());
}

#[test]
fn parsing_stops_at_first_positional() {
    let (mut parser, _, exits) = harness("pos", ErrorPolicy::new());
    let v = parser.bool("v", false, "", false).unwrap();

    parser.parse(["-v", "-", "-v=false"]).unwrap();
    assert!(v.get());
    assert_eq!(parser.remaining(), ["-", "-v=false"]);
    assert!(!exits.was_called());
}

// ---------------------------------------------------------------------------
// Error policy
// ---------------------------------------------------------------------------

#[test]
fn skip_undeclared_keeps_parsing_after_unknown_flag() {
    let (mut parser, out, exits) = harness("skip", ErrorPolicy::from(PolicyOption::SkipUndeclared));
    let before = parser.int("before", 0, "", false).unwrap();
    let after = parser.string("after", "", "", false).unwrap();

    parser
        .parse(["-before=1", "--unknown", "-after", "yes", "tail"])
        .unwrap();

    assert_eq!(before.get(), 1);
    assert_eq!(after.get(), "yes");
    assert_eq!(parser.remaining(), ["tail"]);
    assert!(!exits.was_called());
    assert!(out.is_empty());
}

#[test]
fn malformed_value_terminates_once_and_names_the_flag() {
    let (mut parser, out, exits) = harness("bad", ErrorPolicy::new());
    let count = parser.int("count", 7, "", false).unwrap();

    let err = parser.parse(["-count=abc"]).unwrap_err();

    assert!(matches!(
        err,
        FlagxError::Token(TokenError::InvalidValue { ref name, .. }) if name == "count"
    ));
    assert_eq!(exits.codes(), vec![TERMINATION_EXIT_CODE]);
    assert_eq!(out.contents(), "invalid value \"abc\" for flag -count: parse error\n");
    assert_eq!(count.get(), 7);
}

#[test]
fn invalid_boolean_value_is_reported() {
    let (mut parser, out, exits) = harness("bool", ErrorPolicy::new());
    parser.bool("v", false, "", false).unwrap();

    let err = parser.parse(["-v=maybe"]).unwrap_err();
    assert!(matches!(err, FlagxError::Token(TokenError::InvalidBool { .. })));
    assert_eq!(exits.count(), 1);
    assert!(out.contents().contains("-v"));
}

#[test]
fn continue_on_error_suppresses_every_error_class() {
    let policy = ErrorPolicy::from_options([PolicyOption::ContinueOnError, PolicyOption::SkipUndeclared]);
    let (mut parser, out, exits) = harness("cont", policy);
    let n = parser.int("n", 0, "", false).unwrap();

    parser.parse(["-n=x", "-nope", "-n", "5", "-n"]).unwrap();
    assert_eq!(n.get(), 5);
    assert!(!exits.was_called());
    assert!(out.is_empty());
}

// ---------------------------------------------------------------------------
// Required flags
// ---------------------------------------------------------------------------

#[test]
fn missing_required_flag_is_reported_by_name() {
    let (mut parser, out, exits) = harness("req", ErrorPolicy::new());
    let name = parser.string("name", "", "who to greet", true).unwrap();
    let verbose = parser.bool("verbose", false, "chatty output", false).unwrap();

    let err = parser.parse(["-verbose"]).unwrap_err();

    assert!(matches!(err, FlagxError::MissingRequired(ref names) if names == &["name"]));
    assert_eq!(exits.count(), 1);
    let text = out.contents();
    assert!(text.contains("flag is required"));
    assert!(text.contains("name"));
    assert!(verbose.get());
    assert_eq!(name.get(), "");
}

#[test]
fn required_flag_given_with_default_value_still_counts() {
    let (mut parser, _, exits) = harness("req-default", ErrorPolicy::new());
    parser.int("level", 0, "", true).unwrap();

    parser.parse(["-level", "0"]).unwrap();
    assert!(parser.lookup("level").unwrap().is_parsed());
    assert!(!exits.was_called());
}

// ---------------------------------------------------------------------------
// Clear-after-parse
// ---------------------------------------------------------------------------

#[test]
fn clear_after_parse_leaves_only_a_working_help_flag() {
    let (mut parser, out, exits) = harness("clear", ErrorPolicy::new().with_clear_after_parse());
    let port = parser.uint("port", 1, "", false).unwrap();

    parser.parse(["-port", "2"]).unwrap();
    assert_eq!(parser.flag_count(), 0);
    assert!(parser.lookup(HELP_FLAG).is_some());
    assert_eq!(port.get(), 2);

    // The old flag is gone for the next pass.
    let err = parser.parse(["-port", "3"]).unwrap_err();
    assert!(matches!(err, FlagxError::Token(ref t) if t.is_undeclared()));
    assert_eq!(port.get(), 2);

    exits.reset();
    out.clear();
    assert!(parser.parse(["-help"]).unwrap_err().is_help());
    assert_eq!(exits.count(), 1);
    assert_eq!(
        out.contents(),
        "Usage of clear:\n  -help\n    \tshow this help message\n"
    );
}

#[test]
fn clear_after_parse_allows_subcommand_style_reuse() {
    let (mut parser, _, exits) = harness("multi", ErrorPolicy::new().with_clear_after_parse());

    let first = parser.bool("first", false, "", false).unwrap();
    parser.parse(["-first"]).unwrap();

    let second = parser.string("second", "", "", true).unwrap();
    parser.parse(["-second", "x"]).unwrap();

    assert!(first.get());
    assert_eq!(second.get(), "x");
    assert!(!exits.was_called());
    assert_eq!(parser.flag_count(), 0);
}

// ---------------------------------------------------------------------------
// Help and usage
// ---------------------------------------------------------------------------

#[test]
fn help_flag_renders_usage_then_reports_missing_required() {
    let (mut parser, out, exits) = harness("greet", ErrorPolicy::new());
    parser.string("name", "", "who to greet", true).unwrap();
    parser.int("count", 1, "how many times", false).unwrap();

    let err = parser.parse(["--help"]).unwrap_err();
    assert!(err.is_help());
    assert_eq!(exits.codes(), vec![TERMINATION_EXIT_CODE, TERMINATION_EXIT_CODE]);
    assert_eq!(
        out.contents(),
        "Usage of greet:\n  -help\n    \tshow this help message\n  -name string\n    \twho to greet (required)\n  -count int\n    \thow many times (default 1)\nflag is required: -name\n"
    );
}

#[test]
fn help_with_required_flag_given_terminates_once() {
    let (mut parser, out, exits) = harness("greet", ErrorPolicy::new());
    parser.string("name", "", "who to greet", true).unwrap();

    assert!(parser.parse(["-name", "ada", "-h"]).unwrap_err().is_help());
    assert_eq!(exits.count(), 1);
    assert!(!out.contents().contains("flag is required"));
}

#[test]
fn must_parse_returns_normally_on_help() {
    let (mut parser, out, exits) = harness("greet", ErrorPolicy::new());
    parser.bool("v", false, "", false).unwrap();

    parser.must_parse(["-help"]);
    assert_eq!(exits.count(), 1);
    assert!(out.contents().contains("-v\n"));
}

#[test]
fn custom_usage_function_is_a_total_override() {
    let (mut parser, out, _) = harness("custom", ErrorPolicy::new());
    parser.bool("x", false, "", false).unwrap();
    parser.set_usage(|registry: &Registry, w: &mut dyn Write| {
        for flag in registry.iter() {
            write!(w, "[{}]", flag.name())?;
        }
        writeln!(w)
    });

    assert!(parser.parse(["-h"]).unwrap_err().is_help());
    assert_eq!(out.contents(), "[help][x]\n");
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[test]
fn parser_built_from_config_file_enforces_declarations() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flags.yaml");
    std::fs::write(
        &path,
        r#"
name: deploy
policy:
  skip_undeclared: true
flags:
  - name: target
    kind: string
    required: true
  - name: timeout
    kind: duration
    default: 30s
"#,
    )
    .unwrap();

    let config = ParserConfig::load(&path).unwrap();
    assert!(config.validate().is_empty());
    assert_eq!(
        config.flags[1],
        FlagDeclaration::new("timeout", FlagKind::Duration).with_default("30s")
    );

    let mut parser = config.build().unwrap();
    let out = SharedBuffer::new();
    let exits = RecordingTerminator::new();
    parser.set_output(out.clone());
    parser.set_terminator(exits.clone());

    let err = parser.parse(["-legacy", "-timeout=1m"]).unwrap_err();
    assert!(matches!(err, FlagxError::MissingRequired(_)));
    assert_eq!(exits.count(), 1);
    assert_eq!(out.contents(), "flag is required: -target\n");

    let summary = parser.snapshot();
    assert_eq!(summary.flag("timeout").unwrap().value, "1m");
    assert_eq!(summary.parsed_names(), vec!["timeout"]);
}
