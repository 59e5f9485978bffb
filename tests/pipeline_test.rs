// End-to-end runs through a visualization session

use algovis::samples::Example;
use algovis::snapshot::{FrameRecorder, Playback};
use algovis::visual::session::SUCCESS_MESSAGE;
use algovis::visual::state::NO_ARRAY_MESSAGE;
use algovis::visual::{ConsolePacer, NoPause, Phase, RunOutcome, RunSettings, Session};

fn run(source: &str) -> (Session<NoPause>, RunOutcome) {
    let mut session = Session::new(NoPause::default(), RunSettings::default());
    session.set_source(source);
    let outcome = session.run();
    (session, outcome)
}

#[test]
fn test_bubble_sort_example() {
    let (session, outcome) = run(Example::BubbleSort.source());

    assert_eq!(outcome, RunOutcome::Completed);
    let expected: Vec<f64> = (0..10).map(f64::from).collect();
    assert_eq!(session.state().array(), expected.as_slice());
    assert_eq!(session.state().log().last().unwrap(), SUCCESS_MESSAGE);
    assert_eq!(
        session.state().log()[0],
        "Initialized array: [9,7,5,3,1,8,6,4,2,0]"
    );
}

#[test]
fn test_initialization_sets_exact_values() {
    let (session, outcome) = run("const data = [3, -1.5, 2e2];");

    assert_eq!(outcome, RunOutcome::Completed);
    assert_eq!(session.state().array(), &[3.0, -1.5, 200.0]);
    assert!(session.state().log()[0].contains("[3,-1.5,200]"));
}

#[test]
fn test_initialization_logs_large_values_exactly() {
    let (session, outcome) = run("const a = [1e20, -1e19];");

    assert_eq!(outcome, RunOutcome::Completed);
    assert_eq!(session.state().array(), &[1e20, -1e19]);
    assert_eq!(
        session.state().log()[0],
        "Initialized array: [100000000000000000000,-10000000000000000000]"
    );
}

#[test]
fn test_no_literal_keeps_buffer() {
    let mut session = Session::new(NoPause::default(), RunSettings::default());
    session.set_source("const a = [4, 2];");
    session.run();
    assert_eq!(session.state().array(), &[4.0, 2.0]);

    session.set_source("log('no array here');");
    assert_eq!(session.run(), RunOutcome::Completed);
    assert_eq!(session.state().array(), &[4.0, 2.0]);
    assert_eq!(session.state().log()[0], NO_ARRAY_MESSAGE);
}

#[test]
fn test_trailing_comma_literal_fails() {
    let (session, outcome) = run("const x = [1,2,]");

    let RunOutcome::Failed(message) = outcome else {
        panic!("expected failure, got {:?}", outcome);
    };
    assert!(!message.is_empty());
    assert_eq!(session.phase(), Phase::Failed);
    assert!(!session.state().log().iter().any(|l| l == SUCCESS_MESSAGE));
}

#[test]
fn test_thrown_error_logged_once() {
    let (session, outcome) = run("const a = [1];\nthrow new Error(\"boom\");");

    assert_eq!(outcome, RunOutcome::Failed("boom".to_string()));
    let mentions: Vec<_> = session
        .state()
        .log()
        .iter()
        .filter(|l| l.contains("boom"))
        .collect();
    assert_eq!(mentions, vec!["Error: boom"]);
    assert!(!session.state().log().iter().any(|l| l == SUCCESS_MESSAGE));
}

#[test]
fn test_syntax_error_is_reported() {
    let (session, outcome) = run("const a = [1];\nlet = ;");

    assert!(matches!(outcome, RunOutcome::Failed(_)));
    assert!(session.state().log().last().unwrap().starts_with("Error: "));
}

#[test]
fn test_instrumented_loop_visits_every_element() {
    let source = "const arr = [5, 6, 7];\nfor (let i = 0; i < arr.length; i++) {\n    log(arr[i]);\n}";
    let (session, outcome) = run(source);

    assert_eq!(outcome, RunOutcome::Completed);
    let log = session.state().log();
    assert_eq!(log[1], "Highlighting element at index 0: 5");
    assert_eq!(log[2], "5");
    assert_eq!(log[3], "Highlighting element at index 1: 6");
    assert_eq!(log[6], "7");
    assert_eq!(log.last().unwrap(), SUCCESS_MESSAGE);
    assert_eq!(session.state().highlighted(), Some(2));
}

#[test]
fn test_intercepted_array_writes_publish() {
    let source = "const a = [1, 2, 3];\narrayData[0] = 10;\ndynamicArray.push(4);";
    let (session, outcome) = run(source);

    assert_eq!(outcome, RunOutcome::Completed);
    assert_eq!(session.state().array(), &[10.0, 2.0, 3.0, 4.0]);
}

#[test]
fn test_infinite_loop_hits_step_limit() {
    let mut session = Session::new(
        NoPause::default(),
        RunSettings {
            step_limit: 1_000,
            ..RunSettings::default()
        },
    );
    session.set_source("while (true) {}");

    let RunOutcome::Failed(message) = session.run() else {
        panic!("expected step limit failure");
    };
    assert!(message.contains("step limit"));
}

#[test]
fn test_recorded_frames_replay_run() {
    let mut session = Session::new(FrameRecorder::new(10_000), RunSettings::default());
    session.set_source(Example::BubbleSort.source());
    assert_eq!(session.run(), RunOutcome::Completed);

    let recording = session.pacer_mut().take_recording();
    let mut playback = Playback::new(recording);
    assert_eq!(playback.current().unwrap().array[0], 9.0);
    assert_eq!(playback.current_log().len(), 1);

    playback.jump_to_end();
    assert_eq!(playback.current().unwrap().array[0], 0.0);
    assert_eq!(playback.current_log().last().unwrap(), SUCCESS_MESSAGE);
}

#[test]
fn test_frame_limit_fails_run() {
    let mut session = Session::new(FrameRecorder::new(5), RunSettings::default());
    session.set_source(Example::BubbleSort.source());

    assert!(matches!(session.run(), RunOutcome::Failed(_)));
    let recording = session.pacer_mut().take_recording();
    // The final error frame is kept past the limit
    assert_eq!(recording.len(), 6);
    assert!(recording.log.last().unwrap().starts_with("Error: "));
}

#[test]
fn test_headless_output() {
    let mut session = Session::new(ConsolePacer::new(Vec::new(), false), RunSettings::default());
    session.set_source("const a = [2, 1];\nhighlightElement(1);");
    assert_eq!(session.run(), RunOutcome::Completed);

    let out = String::from_utf8(session.into_pacer().into_inner()).unwrap();
    assert_eq!(
        out,
        "log   | Initialized array: [2,1]\n\
         array | 2 1\n\
         log   | Highlighting element at index 1: 1\n\
         array | 2 [1]\n\
         log   | Code executed successfully\n"
    );
}
