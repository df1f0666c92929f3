// Allow-list validation, tokenizer, and streaming session tests

use hostconsole::commands::{
    CommandError, DiagCommand, StreamEvent, build_argv, split_args, stream_command,
};

// --- Tokenizer ---

#[test]
fn test_split_args_plain_words() {
    assert_eq!(split_args("-c 10 -i 0.5"), vec!["-c", "10", "-i", "0.5"]);
}

#[test]
fn test_split_args_quoted_segments_stay_single_tokens() {
    assert_eq!(
        split_args("-p 'hello world' --tag \"a b\""),
        vec!["-p", "hello world", "--tag", "a b"]
    );
}

#[test]
fn test_split_args_quotes_join_adjacent_text() {
    assert_eq!(split_args("a'b c'd"), vec!["ab cd"]);
}

#[test]
fn test_split_args_empty_and_whitespace() {
    assert!(split_args("").is_empty());
    assert!(split_args("   \t  ").is_empty());
}

#[test]
fn test_split_args_unterminated_quote_keeps_remainder() {
    assert_eq!(split_args("'a b"), vec!["a b"]);
}

// --- Allow-list and argv assembly ---

#[test]
fn test_parse_known_commands() {
    assert_eq!(DiagCommand::parse("ping"), Some(DiagCommand::Ping));
    assert_eq!(DiagCommand::parse("mtr"), Some(DiagCommand::Mtr));
    assert_eq!(DiagCommand::parse("rm"), None);
    assert_eq!(DiagCommand::parse(""), None);
}

#[test]
fn test_build_argv_ping_with_target() {
    let (program, args) = build_argv("ping", Some("example.com"), None).expect("valid");
    assert_eq!(program, "ping");
    assert_eq!(args, vec!["-c", "4", "example.com"]);
}

#[test]
fn test_build_argv_extra_args_between_defaults_and_target() {
    let (_, args) = build_argv("ping", Some("example.com"), Some("-i '0.5'")).expect("valid");
    assert_eq!(args, vec!["-c", "4", "-i", "0.5", "example.com"]);
}

#[test]
fn test_build_argv_no_target_command() {
    let (program, args) = build_argv("ip", None, None).expect("valid");
    assert_eq!(program, "ip");
    assert_eq!(args, vec!["addr"]);
}

#[test]
fn test_build_argv_rejects_unknown_command() {
    let err = build_argv("rm", Some("-rf"), None).unwrap_err();
    assert!(matches!(err, CommandError::Unknown(_)));
}

#[test]
fn test_build_argv_rejects_missing_target() {
    let err = build_argv("ping", None, None).unwrap_err();
    assert!(matches!(err, CommandError::MissingTarget("ping")));
    let err = build_argv("mtr", Some("   "), None).unwrap_err();
    assert!(matches!(err, CommandError::MissingTarget("mtr")));
}

#[test]
fn test_build_argv_rejects_option_like_target() {
    let err = build_argv("ping", Some("-f"), None).unwrap_err();
    assert!(matches!(err, CommandError::InvalidTarget(_)));
    let err = build_argv("dig", Some("a b"), None).unwrap_err();
    assert!(matches!(err, CommandError::InvalidTarget(_)));
}

// --- Streaming sessions ---

async fn collect_events(mut session: hostconsole::commands::CommandStream) -> Vec<StreamEvent> {
    let mut events = Vec::new();
    while let Some(event) = session.events.recv().await {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn test_stream_emits_lines_then_exit_zero() {
    let session = stream_command("printf", &["one\\ntwo\\n".to_string()]);
    let events = collect_events(session).await;
    assert_eq!(
        events,
        vec![
            StreamEvent::Line("one".into()),
            StreamEvent::Line("two".into()),
            StreamEvent::Exit(0),
        ]
    );
}

#[tokio::test]
async fn test_stream_reports_nonzero_exit_code() {
    let session = stream_command("false", &[]);
    let events = collect_events(session).await;
    assert_eq!(events, vec![StreamEvent::Exit(1)]);
}

#[tokio::test]
async fn test_spawn_failure_emits_error_line_then_synthetic_exit() {
    let session = stream_command("definitely-not-a-real-binary-1a2b3c", &[]);
    assert!(session.pid.is_none());
    let events = collect_events(session).await;
    assert_eq!(events.len(), 2);
    match &events[0] {
        StreamEvent::Line(line) => assert!(line.starts_with("error:"), "got: {line}"),
        other => panic!("expected error line, got {:?}", other),
    }
    match events[1] {
        StreamEvent::Exit(code) => assert_ne!(code, 0),
        ref other => panic!("expected exit event, got {:?}", other),
    }
}

#[tokio::test]
async fn test_final_event_is_always_the_exit_sentinel() {
    let session = stream_command("printf", &["a\\nb\\nc\\n".to_string()]);
    let events = collect_events(session).await;
    assert!(matches!(events.last(), Some(StreamEvent::Exit(_))));
    assert!(
        events[..events.len() - 1]
            .iter()
            .all(|e| matches!(e, StreamEvent::Line(_)))
    );
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_dropping_receiver_terminates_subprocess() {
    let session = stream_command("sleep", &["30".to_string()]);
    let pid = session.pid.expect("spawned");
    let proc_path = format!("/proc/{}", pid);
    assert!(std::path::Path::new(&proc_path).exists());

    drop(session);

    // Kill-and-reap must happen within a bounded grace period.
    let deadline = tokio::time::Instant::now() + tokio::time::Duration::from_secs(3);
    loop {
        if !std::path::Path::new(&proc_path).exists() {
            break;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "subprocess still alive after receiver drop"
        );
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
    }
}
