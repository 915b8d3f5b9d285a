use std::rc::Rc;

use pretty_assertions::assert_eq;
use wtcd_core::error::CODE_RUNTIME;
use wtcd_parser::{parse, ParseOptions};

use crate::canvas::{CanvasSnapshot, DrawCommand};
use crate::content::{ChoiceOutput, ContentNode, ContentOutput};
use crate::error::{InvalidChoiceError, StepError};
use crate::interpreter::{Interpreter, InterpreterOptions, Step};

fn paragraphs(markdown: &str) -> String {
    markdown
        .split("\n\n")
        .map(str::trim)
        .filter(|paragraph| !paragraph.is_empty())
        .map(|paragraph| {
            format!(
                "<p>{}</p>",
                paragraph.replace('<', "&lt;").replace('>', "&gt;")
            )
        })
        .collect()
}

fn interpreter_with_seed(source: &str, seed: &str) -> Interpreter {
    let root = parse(&ParseOptions::new(source, paragraphs))
        .into_result()
        .expect("source should parse");
    Interpreter::new(Rc::new(root), InterpreterOptions::new(seed))
}

fn interpreter(source: &str) -> Interpreter {
    interpreter_with_seed(source, "seed")
}

fn html(nodes: &[&str]) -> Vec<ContentNode> {
    nodes
        .iter()
        .map(|node| ContentNode::Html(node.to_string()))
        .collect()
}

fn runtime_error(result: Result<Step, StepError>) -> wtcd_core::WtcdError {
    match result {
        Err(StepError::Runtime(error)) => error,
        other => panic!("expected runtime error, got {other:?}"),
    }
}

/// Runs until the story ends and returns the final output.
fn run_to_end(source: &str) -> ContentOutput {
    match interpreter(source).resume(None).expect("story should run") {
        Step::Finished(output) => output,
        Step::Yielded(output) => panic!("unexpected selection: {output:?}"),
    }
}

#[test]
fn single_exit_section_finishes_in_one_step() {
    let mut interpreter = interpreter("WTCD 1.3\ndeclare number a = 1\nsection s then exit");
    let step = interpreter.resume(None).expect("step");
    assert_eq!(step, Step::Finished(ContentOutput::default()));
    assert!(interpreter.is_finished());
    assert!(matches!(interpreter.resume(None), Err(StepError::Finished)));
}

#[test]
fn goto_runs_targets_in_order_and_filters_by_enter_count() {
    let output = run_to_end(
        "WTCD 1.3
declare number gold = 3
section start then goto [middle middle end]
section middle then null
section end then exit
---<<< start >>>---
You have <$ gold $> gold.
---<<< middle@1 >>>---
First visit.
---<<< middle@2- >>>---
Back again.
---<<< end >>>---
Bye.
",
    );
    assert_eq!(
        output.content,
        html(&[
            "<p>You have <span class=\"wtcd-variable-a\">3</span> gold.</p>",
            "<p>First visit.</p>",
            "<p>Back again.</p>",
            "<p>Bye.</p>",
        ])
    );
    assert!(output.choices.is_empty());
}

#[test]
fn interpolated_strings_are_escaped() {
    let output = run_to_end(
        "WTCD 1.3
declare string name = \"Tom & <Jerry>\"
section s then exit
---<<< s >>>---
Hi <$ name $>
",
    );
    assert_eq!(
        output.content,
        html(&["<p>Hi <span class=\"wtcd-variable-a\">Tom &amp; &lt;Jerry&gt;</span></p>"])
    );
}

#[test]
fn adding_number_and_string_reports_both_operands() {
    let error = runtime_error(
        interpreter("WTCD 1.3\ndeclare a = 3 + \"x\"\nsection s then exit").resume(None),
    );
    assert_eq!(error.code, CODE_RUNTIME);
    assert!(error.message.starts_with(
        "Binary operator \"+\" can only be applied to two strings or two numbers, received: number (value = 3) (left) and string (value = \"x\") (right)"
    ));
    assert_eq!(
        error.wtcd_stack.last().map(String::as_str),
        Some("    at initialization")
    );
}

#[test]
fn selection_loops_and_rejects_invalid_choices_without_moving() {
    let mut interpreter = interpreter(
        "WTCD 1.3
section main then selection [choice \"go\" goto main]
---<<< main >>>---
Again?
",
    );
    let expected = Step::Yielded(ContentOutput {
        content: html(&["<p>Again?</p>"]),
        choices: vec![ChoiceOutput {
            content: "go".to_string(),
            disabled: false,
        }],
    });
    assert_eq!(interpreter.resume(None).expect("start"), expected);
    assert!(matches!(
        interpreter.resume(Some(1)),
        Err(StepError::InvalidChoice(InvalidChoiceError { choice: 1 }))
    ));
    assert!(matches!(
        interpreter.resume(None),
        Err(StepError::ChoiceRequired)
    ));
    assert_eq!(interpreter.resume(Some(0)).expect("loop"), expected);
    assert_eq!(interpreter.resume(Some(0)).expect("loop again"), expected);
}

#[test]
fn choosing_before_start_is_invalid() {
    let mut interpreter = interpreter("WTCD 1.3\nsection s then exit");
    assert!(matches!(
        interpreter.resume(Some(0)),
        Err(StepError::InvalidChoice(_))
    ));
    assert!(interpreter.resume(None).expect("start").is_finished());
}

#[test]
fn disabled_choices_reject_selection_and_pinned_content_updates() {
    let mut interpreter = interpreter(
        "WTCD 1.3
declare function pin [] contentAddParagraph::[\"Pinned\"]
section s {
  readerSetPinned::[pin]
  readerSetStateDesc::[\"HP 3\"]
} then selection [choice \"a\" exit choice \"b\" null]
---<<< s >>>---
Hello
",
    );
    let step = interpreter.resume(None).expect("start");
    assert_eq!(
        step,
        Step::Yielded(ContentOutput {
            content: html(&["<p>Hello</p>"]),
            choices: vec![
                ChoiceOutput {
                    content: "a".to_string(),
                    disabled: false,
                },
                ChoiceOutput {
                    content: "b".to_string(),
                    disabled: true,
                },
            ],
        })
    );
    assert_eq!(interpreter.pinned(), html(&["<p>Pinned</p>"]).as_slice());
    assert_eq!(interpreter.state_desc(), Some("HP 3"));
    assert!(matches!(
        interpreter.resume(Some(1)),
        Err(StepError::InvalidChoice(InvalidChoiceError { choice: 1 }))
    ));
    let end = interpreter.resume(Some(0)).expect("exit");
    assert_eq!(end, Step::Finished(ContentOutput::default()));
    assert_eq!(interpreter.pinned(), html(&["<p>Pinned</p>"]).as_slice());
}

#[test]
fn function_choices_run_when_chosen() {
    let mut interpreter = interpreter(
        "WTCD 1.3
section a then selection [choice \"go\" function [] goto b]
section b then exit
---<<< b >>>---
Arrived
",
    );
    assert!(!interpreter.resume(None).expect("start").is_finished());
    let end = interpreter.resume(Some(0)).expect("choose");
    assert_eq!(
        end,
        Step::Finished(ContentOutput {
            content: html(&["<p>Arrived</p>"]),
            choices: Vec::new(),
        })
    );
}

#[test]
fn list_functions_fill_and_check_bounds() {
    let output = run_to_end(
        "WTCD 1.3
declare list l = listCreateFilled::[3 0]
section s then exit
---<<< s >>>---
<$ l $>
",
    );
    assert_eq!(
        output.content,
        html(&["<p><span class=\"wtcd-variable-a\">list (elements = [number (value = 0), number (value = 0), number (value = 0)])</span></p>"])
    );

    let error = runtime_error(
        interpreter("WTCD 1.3\ndeclare l = listSet::[[0 0 0] 5 1]\nsection s then exit")
            .resume(None),
    );
    assert!(error.message.starts_with(
        "Failed to call native function \"listSet\". Reason: Index (5) out of bounds. List length is 3"
    ));
}

#[test]
fn callback_errors_name_the_element_index() {
    let error = runtime_error(
        interpreter(
            "WTCD 1.3
declare l = listMap::[[1 \"x\"] function [number n] n * 2]
section s then exit",
        )
        .resume(None),
    );
    assert!(error.message.starts_with(
        "Failed to call native function \"listMap\". Reason: Failed to apply function to the element with index = 1 of list: The argument with index = 0 of invocation has wrong type. Expected: number, received: string (value = \"x\")"
    ));
}

#[test]
fn partial_application_follows_argument_order() {
    let output = run_to_end(
        "WTCD 1.3
declare function minus [number a number b] a - b
declare number left = (minus .: [10])::[3]
declare number right = (minus :. [10])::[3]
section s then exit
---<<< s >>>---
<$ left $> <$ right $>
",
    );
    assert_eq!(
        output.content,
        html(&["<p><span class=\"wtcd-variable-a\">7</span> <span class=\"wtcd-variable-b\">-7</span></p>"])
    );
}

#[test]
fn closures_share_captured_cells() {
    let output = run_to_end(
        "WTCD 1.3
declare function makeCounter [] {
  declare number n = 0
  return function [] {
    n += 1
    return n
  }
}
declare counter = makeCounter::[]
declare number first = counter::[]
declare number second = counter::[]
section s then exit
---<<< s >>>---
<$ first $>,<$ second $>
",
    );
    assert_eq!(
        output.content,
        html(&["<p><span class=\"wtcd-variable-a\">1</span>,<span class=\"wtcd-variable-b\">2</span></p>"])
    );
}

#[test]
fn loops_honor_continue_and_break_values() {
    let output = run_to_end(
        "WTCD 1.3
declare number total = 0
declare number i = 0
declare number result = while true {
  i += 1
  if i % 2 == 0 { continue }
  if i > 7 { break total }
  total += i
}
declare string word = switch 2 [[1] \"one\" [2 3] \"two\" \"other\"]
section s then exit
---<<< s >>>---
<$ result $> <$ word $>
",
    );
    assert_eq!(
        output.content,
        html(&["<p><span class=\"wtcd-variable-a\">16</span> <span class=\"wtcd-variable-b\">two</span></p>"])
    );
}

#[test]
fn non_action_then_value_is_rejected_with_section_stack() {
    let error = runtime_error(interpreter("WTCD 1.3\nsection s then 5").resume(None));
    assert!(error.message.starts_with(
        "Expression after then is expected to return an action, or null, received: number (value = 5)"
    ));
    assert!(error
        .wtcd_stack
        .last()
        .is_some_and(|entry| entry.starts_with("    at section \"s\"")));
}

#[test]
fn escaped_continue_is_an_uncaught_signal() {
    let error = runtime_error(
        interpreter("WTCD 1.3\ndeclare a = { continue }\nsection s then exit").resume(None),
    );
    assert!(error
        .message
        .starts_with("Uncaught BubbleSignal with type \"continue\"."));
}

#[test]
fn same_seed_replays_identical_output() {
    let source = "WTCD 1.3
declare number roll = randomInt::[0 1000000]
section s then exit
---<<< s >>>---
<$ roll $>
";
    let run = |seed: &str| interpreter_with_seed(source, seed).resume(None).expect("run");
    assert_eq!(run("alpha"), run("alpha"));
    assert_ne!(run("alpha"), run("beta"));
}

#[test]
fn runtime_errors_end_the_run() {
    let mut interpreter = interpreter("WTCD 1.3\ndeclare a = assert::[false]\nsection s then exit");
    let error = runtime_error(interpreter.resume(None));
    assert!(error
        .message
        .starts_with("Failed to call native function \"assert\". Reason: Assertion failed"));
    assert!(matches!(interpreter.resume(None), Err(StepError::Finished)));
}

#[test]
fn logical_operators_skip_the_right_side_when_short_circuiting() {
    let output = run_to_end(
        "WTCD 1.3
declare number calls = 0
declare function touch [] {
  calls += 1
  return true
}
declare boolean a = false && touch::[]
declare boolean b = true || touch::[]
declare number c = 1 ?? touch::[]
declare boolean d = true && touch::[]
section s then exit
---<<< s >>>---
<$ calls $> <$ a $> <$ b $> <$ c $> <$ d $>
",
    );
    assert_eq!(
        output.content,
        html(&["<p><span class=\"wtcd-variable-a\">1</span> <span class=\"wtcd-variable-b\">false</span> <span class=\"wtcd-variable-c\">true</span> <span class=\"wtcd-variable-d\">1</span> <span class=\"wtcd-variable-e\">true</span></p>"])
    );
}

#[test]
fn null_propagating_operators_skip_the_right_side_on_null() {
    let output = run_to_end(
        "WTCD 1.3
declare number calls = 0
declare function zero [] {
  calls += 1
  return 0
}
declare function noArgs [] {
  calls += 1
  return []
}
declare nothing = null
declare a = nothing ?. zero::[]
declare b = nothing ?.? zero::[]
declare c = nothing ?:: (noArgs::[])
declare boolean allNull = a == null && b == null && c == null
declare number d = [7] ?. zero::[]
section s then exit
---<<< s >>>---
<$ calls $> <$ allNull $> <$ d $>
",
    );
    assert_eq!(
        output.content,
        html(&["<p><span class=\"wtcd-variable-a\">1</span> <span class=\"wtcd-variable-b\">true</span> <span class=\"wtcd-variable-c\">7</span></p>"])
    );
}

#[test]
fn strict_nullish_rejects_null_on_both_sides() {
    let output = run_to_end(
        "WTCD 1.3
declare number picked = null ?! 3
section s then exit
---<<< s >>>---
<$ picked $>
",
    );
    assert_eq!(
        output.content,
        html(&["<p><span class=\"wtcd-variable-a\">3</span></p>"])
    );

    let error = runtime_error(
        interpreter("WTCD 1.3\ndeclare a = null ?! null\nsection s then exit").resume(None),
    );
    assert!(error
        .message
        .starts_with("Right side of binary operator \"?!\" cannot be null."));
}

#[test]
fn compound_assignments_update_the_variable() {
    let output = run_to_end(
        "WTCD 1.3
declare number n = 7
declare number added = n += 3
declare number subtracted = n -= 4
declare number multiplied = n *= 5
declare number divided = n /= 4
declare number truncated = n ~/= 2
declare number remainder = n %= 2
declare string word = \"ab\"
declare string joined = word += \"c\"
section s then exit
---<<< s >>>---
<$ added $>,<$ subtracted $>,<$ multiplied $>,<$ divided $>,<$ truncated $>,<$ remainder $>,<$ n $>,<$ word $>
",
    );
    let values = ["10", "6", "30", "7.5", "3", "1", "1", "abc"];
    let ids = ["a", "b", "c", "d", "e", "f", "g", "h"];
    let spans = ids
        .iter()
        .zip(values)
        .map(|(id, value)| format!("<span class=\"wtcd-variable-{id}\">{value}</span>"))
        .collect::<Vec<_>>()
        .join(",");
    assert_eq!(output.content, vec![ContentNode::Html(format!("<p>{spans}</p>"))]);
}

#[test]
fn compound_assignments_reject_mismatched_left_values() {
    let error = runtime_error(
        interpreter("WTCD 1.3\ndeclare string t = \"x\"\ndeclare u = t -= 1\nsection s then exit")
            .resume(None),
    );
    assert!(error.message.starts_with(
        "Left side of binary operator \"-=\" has to be a variable of type number, actual type: string"
    ));

    let error = runtime_error(
        interpreter("WTCD 1.3\ndeclare list l = []\ndeclare v = l += 1\nsection s then exit")
            .resume(None),
    );
    assert!(error.message.starts_with(
        "Left side of binary operator \"+=\" has to be a variable of type number or string, actual type: list"
    ));
}

#[test]
fn switch_matches_functions_by_identity() {
    let output = run_to_end(
        "WTCD 1.3
declare function f [] 1
declare function g [] 2
declare function make [] {
  declare number n = 0
  return function [] n
}
declare first = make::[]
declare second = make::[]
declare string picked = switch g [[f] \"f\" [g] \"g\" \"none\"]
declare string fresh = switch second [[first] \"first\" \"none\"]
declare string same = switch first [[first] \"first\" \"none\"]
section s then exit
---<<< s >>>---
<$ picked $> <$ fresh $> <$ same $>
",
    );
    assert_eq!(
        output.content,
        html(&["<p><span class=\"wtcd-variable-a\">g</span> <span class=\"wtcd-variable-b\">none</span> <span class=\"wtcd-variable-c\">first</span></p>"])
    );
}

#[test]
fn canvas_output_records_resolved_commands() {
    let output = run_to_end(
        "WTCD 1.3
section s {
  canvasCreate::[\"map\" 10 20]
  canvasSetFillStyle::[\"map\" \"red\"]
  canvasPutImage::[\"map\" \"tree.png\" 0 0]
  canvasFillRect::[\"map\" 1 2 3 4]
  canvasOutput::[\"map\"]
} then exit
",
    );
    assert_eq!(
        output.content,
        vec![ContentNode::Canvas(CanvasSnapshot {
            id: "map".to_string(),
            width: 10,
            height: 20,
            loading: Vec::new(),
            commands: vec![
                DrawCommand::SetFillStyle {
                    color: "red".to_string(),
                },
                DrawCommand::FillRect {
                    x: 1.0,
                    y: 2.0,
                    width: 3.0,
                    height: 4.0,
                },
            ],
        })]
    );

    let source = "WTCD 1.3\ndeclare a = canvasFillRect::[\"missing\" 1 2 3 4]\nsection s then exit";
    let error = runtime_error(interpreter(source).resume(None));
    assert!(error.message.starts_with(
        "Failed to call native function \"canvasFillRect\". Reason: Canvas with id=\"missing\" does not exist."
    ));
}

#[test]
fn random_functions_stay_in_range() {
    let output = run_to_end(
        "WTCD 1.3
declare number i = 0
declare boolean ok = true
declare drawn = while i < 200 {
  i += 1
  declare number n = randomInt::[3 6]
  if n < 3 || n >= 6 || n % 1 != 0 { ok = false }
  declare number r = random::[5 6]
  if r < 5 || r >= 6 { ok = false }
  declare number biased = randomBiased::[0 10 2]
  if biased < 0 || biased >= 10 { ok = false }
}
section s then exit
---<<< s >>>---
<$ ok $>
",
    );
    assert_eq!(
        output.content,
        html(&["<p><span class=\"wtcd-variable-a\">true</span></p>"])
    );
}

#[test]
fn random_functions_validate_arguments() {
    let cases = [
        (
            "randomInt::[1]",
            "Failed to call native function \"randomInt\". Reason: Too few arguments are provided. Minimum number of arguments: 2, received: 1",
        ),
        (
            "random::[\"x\"]",
            "Failed to call native function \"random\". Reason: The argument with index = 0 of invocation has wrong type. Expected: number, received: string (value = \"x\")",
        ),
        (
            "randomBiased::[5 5]",
            "Failed to call native function \"randomBiased\". Reason: Low cannot be larger than or equal to high.",
        ),
        (
            "randomBiased::[0 1 2]",
            "Failed to call native function \"randomBiased\". Reason: Bias has to be between low and high.",
        ),
    ];
    for (call, expected) in cases {
        let source = format!("WTCD 1.3\ndeclare a = {call}\nsection s then exit");
        let error = runtime_error(interpreter(&source).resume(None));
        assert!(
            error.message.starts_with(expected),
            "{call}: {}",
            error.message
        );
    }
}

#[test]
fn random_functions_replay_under_a_fixed_seed() {
    let source = "WTCD 1.3
declare list draws = [random::[] randomInt::[0 100] randomBoolean::[] randomBiased::[0 1]]
section s then exit
---<<< s >>>---
<$ draws $>
";
    let run = |seed: &str| interpreter_with_seed(source, seed).resume(None).expect("run");
    assert_eq!(run("fixed"), run("fixed"));
    assert_ne!(run("fixed"), run("other"));
}

#[test]
fn oversized_filled_list_is_a_runtime_error() {
    let mut interpreter = interpreter(
        "WTCD 1.3\ndeclare list l = listCreateFilled::[1000000000000000 0]\nsection s then exit",
    );
    let error = runtime_error(interpreter.resume(None));
    assert!(error.message.starts_with(
        "Failed to call native function \"listCreateFilled\". Reason: Length (1000000000000000) is too large."
    ));
    assert!(interpreter.is_finished());
    assert!(matches!(interpreter.resume(None), Err(StepError::Finished)));
}
