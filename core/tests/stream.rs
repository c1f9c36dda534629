//! Stream navigation: shadows at both ends, bounded history with eviction,
//! lookahead predicates, snippets, and close semantics.

use lexkit_core::{TokenKey, Tokenizer};

fn digits() -> Tokenizer {
    Tokenizer::new()
}

#[test]
fn walks_forward_and_inspects_neighbors() {
    let mut tokenizer = Tokenizer::new();
    tokenizer.allow_keyword_underscore();
    tokenizer.define_tokens(10, &[">=", "<=", "==", ">", "<"]);
    tokenizer.define_tokens(12, &["{{"]);
    tokenizer.define_tokens(13, &["}}"]);
    tokenizer
        .define_framed(14, "\"", "\"")
        .escape(b'\\')
        .add_injection(12, 13);

    let mut stream =
        tokenizer.parse_str(r#"field_a > 10 "value1" 12.3 "value2 {{ value3 }} value4""#);

    assert!(stream.is_valid());
    assert!(stream.peek_next().is_valid());
    assert!(stream.current().is_keyword());
    assert_eq!(stream.current().value(), b"field_a");
    assert_eq!(stream.current().value_i64(), 0);
    assert_eq!(stream.current().indent(), b"");

    assert!(stream.peek_next().is(10));
    assert_eq!(stream.peek_next().value(), b">");

    stream.go_next();
    assert!(stream.is_valid());
    assert!(stream.current().is(10));
    assert_eq!(stream.current().value(), b">");
    assert_eq!(stream.current().value_f64(), 0.0);
    assert_eq!(stream.current().indent(), b" ");

    assert!(stream.peek_prev().is_keyword());
    assert_eq!(stream.peek_prev().value(), b"field_a");

    assert!(!stream.go_next_if_next_is(&[TokenKey::KEYWORD]));
    assert!(stream.go_next_if_next_is(&[TokenKey::INTEGER]));
    assert_eq!(stream.current().value_i64(), 10);
    assert_eq!(stream.current().value_f64(), 10.0);

    stream.go_next();
    assert_eq!(stream.current().key(), TokenKey::STRING);
    assert_eq!(stream.current().value_i64(), 0);
    assert_eq!(stream.current().value_unescaped_str(), "value1");
}

#[test]
fn falling_off_either_end_parks_on_the_sentinel() {
    let tokenizer = digits();
    let mut stream = tokenizer.parse_str("a b");

    stream.go_prev();
    assert!(!stream.is_valid());
    assert_eq!(stream.current().id(), -1);
    assert_eq!(stream.current().key(), TokenKey::UNDEF);
    assert_eq!(stream.current().value(), b"");

    // A step in the opposite direction returns to the remembered token.
    stream.go_next();
    assert!(stream.is_valid());
    assert_eq!(stream.current().value(), b"a");

    stream.go_next();
    stream.go_next();
    assert!(!stream.is_valid());
    stream.go_prev();
    assert_eq!(stream.current().value(), b"b");
}

#[test]
fn go_to_walks_in_both_directions() {
    let tokenizer = digits();
    let mut stream = tokenizer.parse_str("0 1 2 3 4");

    stream.go_to(3);
    assert_eq!(stream.current().id(), 3);
    assert_eq!(stream.current().value(), b"3");

    stream.go_to(1);
    assert_eq!(stream.current().id(), 1);

    stream.go_to(1);
    assert_eq!(stream.current().id(), 1);

    // Unknown ids park the cursor instead of looping.
    stream.go_to(99);
    assert!(!stream.is_valid());
    stream.go_to(2);
    assert_eq!(stream.current().id(), 2);
}

#[test]
fn history_bound_evicts_behind_the_cursor() {
    let tokenizer = digits();
    let mut stream = tokenizer.parse_str("0 1 2 3 4 5 6 7 8 9");
    stream.set_history_size(3);

    assert_eq!(stream.current().id(), 0);
    assert_eq!(stream.head().id(), 0);
    assert_eq!(stream.len(), 10);

    stream.go_next();
    stream.go_next();
    assert_eq!(stream.current().id(), 2);
    assert_eq!(stream.head().id(), 0);
    assert_eq!(stream.len(), 10);

    stream.go_next();
    stream.go_next();
    assert_eq!(stream.current().id(), 4);
    assert_eq!(stream.head().id(), 1);
    assert_eq!(stream.len(), 9);

    stream.go_prev();
    stream.go_prev();
    stream.go_prev();
    assert_eq!(stream.current().id(), 1);
    assert_eq!(stream.head().id(), 1);
    assert_eq!(stream.len(), 9);

    // History is exhausted: the step before the head hits the sentinel.
    stream.go_prev();
    assert_eq!(stream.current().id(), -1);
    assert_eq!(stream.current().value_i64(), 0);
    assert_eq!(stream.head().id(), 1);
    assert_eq!(stream.len(), 9);
}

#[test]
fn history_invariant_holds_while_draining() {
    let tokenizer = digits();
    let input = (0..50).map(|i| i.to_string()).collect::<Vec<_>>().join(" ");
    let mut stream = tokenizer.parse_str(&input);
    let history = 7usize;
    stream.set_history_size(history);

    while stream.is_valid() {
        let current = stream.current().id();
        let head = stream.head().id();
        assert_eq!(head, (current - history as i64).max(0));
        assert!(stream.len() <= 50);
        stream.go_next();
    }
}

#[test]
fn is_next_sequence_checks_and_restores() {
    let mut tokenizer = Tokenizer::new();
    tokenizer.define_tokens(10, &["="]);
    let mut stream = tokenizer.parse_str("name = 42 rest");

    assert!(stream.is_next_sequence(&[TokenKey(10), TokenKey::INTEGER]));
    assert_eq!(stream.current().value(), b"name");

    assert!(!stream.is_next_sequence(&[TokenKey(10), TokenKey::FLOAT]));
    assert_eq!(stream.current().value(), b"name");

    // Deeper than the remaining stream.
    assert!(!stream.is_next_sequence(&[
        TokenKey(10),
        TokenKey::INTEGER,
        TokenKey::KEYWORD,
        TokenKey::KEYWORD,
    ]));
    assert_eq!(stream.current().value(), b"name");
}

#[test]
fn is_next_sequence_respects_a_small_history() {
    let tokenizer = digits();
    let mut stream = tokenizer.parse_str("0 1 2 3 4 5 6 7 8 9");
    stream.set_history_size(1);

    let keys = [TokenKey::INTEGER; 6];
    assert!(stream.is_next_sequence(&keys));
    // The cursor is back where it started and the bound is back in force.
    assert_eq!(stream.current().id(), 0);
    stream.go_next();
    stream.go_next();
    assert_eq!(stream.head().id(), 1);
}

#[test]
fn is_any_next_sequence_matches_groups() {
    let mut tokenizer = Tokenizer::new();
    tokenizer.define_tokens(10, &["="]);
    let mut stream = tokenizer.parse_str("name = 42");

    assert!(stream.is_any_next_sequence(&[
        &[TokenKey(10), TokenKey::KEYWORD],
        &[TokenKey::INTEGER, TokenKey::FLOAT],
    ]));
    assert!(!stream.is_any_next_sequence(&[&[TokenKey(10)], &[TokenKey::STRING]]));
    assert_eq!(stream.current().value(), b"name");
}

#[test]
fn snippet_windows_clamp_to_the_list() {
    let tokenizer = digits();
    let mut stream = tokenizer.parse_str("0 1 2 3 4");

    let all = stream.snippet(10, 10);
    assert_eq!(all.len(), 5);
    assert_eq!(all[0].id, 0);
    assert_eq!(all[4].id, 4);

    stream.go_to(2);
    let window = stream.snippet(1, 1);
    let ids: Vec<i64> = window.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);

    // Parked past the end, the window anchors on the last real token.
    stream.go_to(4);
    stream.go_next();
    assert!(!stream.is_valid());
    let tail = stream.snippet(1, 1);
    let ids: Vec<i64> = tail.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![3, 4]);
}

#[test]
fn snippet_string_shortens_long_values() {
    let mut tokenizer = Tokenizer::new();
    tokenizer.define_framed(14, "\"", "\"");
    let stream = tokenizer.parse_str("\"abcdefghijklmnopqrstuvwxyz\"");
    let rendered = stream.snippet_string(0, 0, 8);
    assert!(rendered.contains("..."));
    assert!(rendered.len() < 28);

    let full = stream.snippet_string(0, 0, 0);
    assert_eq!(full, "\"abcdefghijklmnopqrstuvwxyz\"");
}

#[test]
fn close_releases_everything() {
    let tokenizer = digits();
    let mut stream = tokenizer.parse_str("0 1 2 3 4");
    stream.go_to(2);
    stream.close();

    assert!(!stream.is_valid());
    assert_eq!(stream.len(), 0);
    assert!(stream.is_empty());
    assert_eq!(stream.current().id(), -1);
    assert!(stream.snippet(10, 10).is_empty());

    // Navigation on a closed stream stays parked.
    stream.go_next();
    assert!(!stream.is_valid());
    stream.go_prev();
    assert!(!stream.is_valid());
}

#[test]
fn display_renders_one_token_per_line() {
    let tokenizer = digits();
    let stream = tokenizer.parse_str("a 1");
    let rendered = format!("{stream}");
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("0:"));
    assert!(lines[1].starts_with("1:"));
}

#[test]
fn empty_input_yields_an_invalid_stream() {
    let tokenizer = digits();
    let mut stream = tokenizer.parse_str("");
    assert!(!stream.is_valid());
    assert_eq!(stream.len(), 0);
    assert_eq!(stream.parsed_length(), 0);
    stream.go_next();
    assert!(!stream.is_valid());
}

#[test]
fn whitespace_only_input_is_kept_as_trailing() {
    let tokenizer = digits();
    let stream = tokenizer.parse_str(" \t\n ");
    assert!(!stream.is_valid());
    assert_eq!(stream.trailing_whitespace(), b" \t\n ");
}
