// Integration tests for the script interpreter

use algovis::interpreter::{self, Host, RuntimeError};
use algovis::memory::value::Value;

/// Records every host call as a line of text
#[derive(Default)]
struct Recorder {
    calls: Vec<String>,
}

impl Host for Recorder {
    fn highlight(&mut self, index: &Value) -> Result<(), RuntimeError> {
        self.calls.push(format!("highlight {}", index));
        Ok(())
    }

    fn update(&mut self, values: &[Value]) -> Result<(), RuntimeError> {
        let text: Vec<String> = values.iter().map(Value::to_string).collect();
        self.calls.push(format!("update [{}]", text.join(",")));
        Ok(())
    }

    fn log(&mut self, message: &str) -> Result<(), RuntimeError> {
        self.calls.push(message.to_string());
        Ok(())
    }

    fn delay(&mut self, ms: f64) -> Result<(), RuntimeError> {
        self.calls.push(format!("delay {}", ms));
        Ok(())
    }
}

fn run(source: &str) -> Result<Vec<String>, RuntimeError> {
    run_with(source, &[])
}

fn run_with(source: &str, buffer: &[f64]) -> Result<Vec<String>, RuntimeError> {
    let mut host = Recorder::default();
    interpreter::execute(source, &mut host, buffer, 10_000)?;
    Ok(host.calls)
}

fn logs(source: &str) -> Vec<String> {
    run(source).unwrap_or_else(|e| panic!("execution failed: {}", e))
}

#[test]
fn test_arithmetic_and_strings() {
    let out = logs(
        r#"
        log(1 + 2 * 3);
        log(7 % 3);
        log(2 ** 10);
        log(1 / 0);
        log("a" + 1 + 2);
        log(1 + 2 + "a");
        log(0.1 + 0.2 === 0.3);
        log(`sum: ${1 + 1}`);
    "#,
    );
    assert_eq!(
        out,
        vec!["7", "1", "1024", "Infinity", "a12", "3a", "false", "sum: 2"]
    );
}

#[test]
fn test_equality_and_typeof() {
    let out = logs(
        r#"
        log(1 == "1");
        log(1 === "1");
        log(null == undefined);
        log(null === undefined);
        log(typeof 1);
        log(typeof "s");
        log(typeof missing);
        log(typeof log);
        log(typeof [1]);
    "#,
    );
    assert_eq!(
        out,
        vec!["true", "false", "true", "false", "number", "string", "undefined", "function", "object"]
    );
}

#[test]
fn test_closures_capture_scope() {
    let out = logs(
        r#"
        function counter() {
            let count = 0;
            function next() {
                count = count + 1;
                return count;
            }
            return next;
        }
        const a = counter();
        const b = counter();
        a();
        a();
        log(a());
        log(b());
    "#,
    );
    assert_eq!(out, vec!["3", "1"]);
}

#[test]
fn test_hoisting_and_var_scope() {
    let out = logs(
        r#"
        log(twice(4));
        function twice(x) { return x * 2; }

        function f() {
            if (true) {
                var inner = 5;
            }
            return inner;
        }
        log(f());
    "#,
    );
    assert_eq!(out, vec!["8", "5"]);
}

#[test]
fn test_block_scoping_of_let() {
    let err = run("{ let hidden = 1; }\nlog(hidden);").unwrap_err();
    assert_eq!(err.message(), "hidden is not defined");
}

#[test]
fn test_const_assignment_fails() {
    let err = run("const x = 1;\nx = 2;").unwrap_err();
    assert_eq!(err.message(), "Assignment to constant variable.");
}

#[test]
fn test_loops_break_continue() {
    let out = logs(
        r#"
        let total = 0;
        for (let i = 0; i < 10; i++) {
            if (i % 2 === 0) continue;
            if (i > 7) break;
            total += i;
        }
        log(total);

        let n = 0;
        do { n++; } while (n < 3);
        log(n);

        let k = 5;
        while (k > 0) { k -= 2; }
        log(k);
    "#,
    );
    assert_eq!(out, vec!["16", "3", "-1"]);
}

#[test]
fn test_array_methods() {
    let out = logs(
        r#"
        const xs = [3, 1, 2];
        log(xs.push(9));
        log(xs.join("-"));
        log(xs.pop());
        log(xs.indexOf(2));
        log(xs.includes(7));
        log(xs.slice(1).join(","));
        log(xs.length);
        log(Math.max(4, 8, 2) + Math.floor(2.7));
    "#,
    );
    assert_eq!(out, vec!["4", "3-1-2-9", "9", "2", "false", "1,2", "3", "10"]);
}

#[test]
fn test_intercepted_reads_and_writes() {
    let out = run_with(
        r#"
        const first = arrayData[0];
        dynamicArray[1] = first * 10;
        log(dynamicArray.length);
    "#,
        &[4.0, 5.0],
    )
    .unwrap();
    assert_eq!(out, vec!["highlight 0", "update [4,40]", "2"]);
}

#[test]
fn test_array_bindings_share_storage() {
    let out = run_with("arrayData.push(3);\nlog(dynamicArray.join(' '));", &[1.0, 2.0]).unwrap();
    assert_eq!(out, vec!["update [1,2,3]", "1 2 3"]);
}

#[test]
fn test_host_calls_through_await() {
    let out = logs(
        r#"
        async function step(i) {
            await highlightElement(i);
            await delay(25);
        }
        await step(2);
        updateArrayData([1, 2]);
    "#,
    );
    assert_eq!(out, vec!["highlight 2", "delay 25", "update [1,2]"]);
}

#[test]
fn test_update_requires_array() {
    let err = run("updateArrayData(5);").unwrap_err();
    assert_eq!(err.message(), "5 is not iterable");
}

#[test]
fn test_thrown_values() {
    let err = run("throw new RangeError('too far');").unwrap_err();
    assert_eq!(err.message(), "too far");

    let err = run("throw 'plain';").unwrap_err();
    assert_eq!(err.message(), "plain");
}

#[test]
fn test_calling_non_function() {
    let err = run("const x = 1;\nx();").unwrap_err();
    assert_eq!(err.message(), "x is not a function");
}

#[test]
fn test_undefined_property_access() {
    let err = run("let u;\nlog(u.length);").unwrap_err();
    assert!(err.message().starts_with("Cannot read properties of undefined"));
}

#[test]
fn test_no_ambient_capabilities() {
    for name in ["console", "window", "document", "require", "process", "fetch"] {
        let err = run(&format!("{}.x;", name)).unwrap_err();
        assert_eq!(err.message(), format!("{} is not defined", name));
    }
}

#[test]
fn test_huge_array_growth_is_range_error() {
    let err = run("let b = [];\nb[4294967294] = 1;").unwrap_err();
    assert!(matches!(err, RuntimeError::RangeError { .. }));
    assert_eq!(err.message(), "Invalid array length");

    let err = run_with("arrayData.length = 4294967294;", &[1.0]).unwrap_err();
    assert_eq!(err.message(), "Invalid array length");

    let out = logs("let c = [];\nc[3] = 1;\nc.length = 2;\nlog(c.length);");
    assert_eq!(out, vec!["2"]);
}

#[test]
fn test_large_integers_print_in_full() {
    let out = logs("log(1e20);\nlog(-1e19);\nlog('' + 123456789012345680000);");
    assert_eq!(
        out,
        vec!["100000000000000000000", "-10000000000000000000", "123456789012345680000"]
    );
}

#[test]
fn test_deeply_nested_expression_is_syntax_error() {
    let source = format!("let x = {}1{};", "(".repeat(500), ")".repeat(500));
    let err = run(&source).unwrap_err();
    assert!(matches!(err, RuntimeError::Syntax(_)));
    assert!(err.message().contains("nested too deeply"));
}

#[test]
fn test_step_limit() {
    let mut host = Recorder::default();
    let err = interpreter::execute("while (true) {}", &mut host, &[], 500).unwrap_err();
    assert!(matches!(err, RuntimeError::StepLimitExceeded { limit: 500, .. }));
}

#[test]
fn test_unbounded_recursion() {
    // Debug builds use large frames; give the walk room to reach the depth limit
    let overflowed = std::thread::Builder::new()
        .stack_size(64 * 1024 * 1024)
        .spawn(|| {
            let err = run("function f() { return f(); }\nf();").unwrap_err();
            matches!(err, RuntimeError::CallStackOverflow { .. })
        })
        .unwrap()
        .join()
        .unwrap();
    assert!(overflowed);
}

#[test]
fn test_syntax_errors_have_locations() {
    let err = run("log(1);\nlet = 3;").unwrap_err();
    let location = err.location().expect("syntax errors carry a location");
    assert_eq!(location.line, 2);
}
