//! Reader-backed lexing: lazy chunked parsing, tokens straddling chunk
//! boundaries, bounded history over an unbounded source, reader failures,
//! and NUL termination.

use std::io::{self, Read};

use lexkit_core::{TokenKey, Tokenizer};

fn json_ish() -> Tokenizer {
    let mut tokenizer = Tokenizer::new();
    tokenizer.define_tokens(10, &[","]);
    tokenizer.define_tokens(11, &[":"]);
    tokenizer.define_tokens(12, &["{"]);
    tokenizer.define_tokens(13, &["}"]);
    tokenizer.define_framed(14, "\"", "\"").escape(b'\\');
    tokenizer
}

#[test]
fn hundred_records_over_a_tiny_chunk() {
    let mut body = Vec::new();
    for i in 0..100 {
        body.extend_from_slice(format!("{{id: {i}, key: \"object number {i}\"}}").as_bytes());
    }

    let tokenizer = json_ish();
    let mut stream = tokenizer.parse_stream(io::Cursor::new(body), 100);
    stream.set_history_size(100);

    let mut records = 0;
    while stream.is_valid() {
        assert!(stream.current().is(12), "record {records}: {stream:?}");
        stream.go_next();

        assert!(stream.current().is_keyword());
        assert_eq!(stream.current().value(), b"id");
        stream.go_next();

        assert!(stream.current().is(11));
        stream.go_next();

        assert!(stream.current().is_integer());
        let id = stream.current().value_i64();
        assert_eq!(id, records);
        stream.go_next();

        assert!(stream.current().is(10));
        stream.go_next();

        assert!(stream.current().is_keyword());
        assert_eq!(stream.current().value(), b"key");
        stream.go_next();

        assert!(stream.current().is(11));
        stream.go_next();

        assert!(stream.current().is(TokenKey::STRING));
        assert_eq!(
            stream.current().value_unescaped_str(),
            format!("object number {id}")
        );
        stream.go_next();

        assert!(stream.current().is(13));
        stream.go_next();

        records += 1;
    }
    assert_eq!(records, 100);
    assert!(stream.error().is_none());
}

#[test]
fn tokens_straddle_chunk_boundaries() {
    let tokenizer = json_ish();
    let input = "alongkeyword \"a string that spans many tiny chunks\" 123456";
    for chunk_size in [1, 2, 3, 7] {
        let mut stream = tokenizer.parse_stream(io::Cursor::new(input.as_bytes().to_vec()), chunk_size);
        let mut values = Vec::new();
        while stream.is_valid() {
            values.push(stream.current().value_str().into_owned());
            stream.go_next();
        }
        assert_eq!(
            values,
            vec![
                "alongkeyword".to_string(),
                "\"a string that spans many tiny chunks\"".to_string(),
                "123456".to_string(),
            ],
            "chunk size {chunk_size}"
        );
        assert_eq!(stream.parsed_length(), input.len());
    }
}

#[test]
fn streaming_matches_slice_lexing() {
    let tokenizer = json_ish();
    let input = "{a: 1.5, b: \"two {{ x }} three\", c: nope}\n";

    let slice_stream = tokenizer.parse_str(input);
    let expected = slice_stream.snippet(0, 10_000);

    let mut stream = tokenizer.parse_stream(io::Cursor::new(input.as_bytes().to_vec()), 5);
    let mut actual = Vec::new();
    while stream.is_valid() {
        actual.push(stream.current().to_snapshot());
        stream.go_next();
    }
    assert_eq!(actual, expected);
}

#[test]
fn round_trip_over_a_stream_with_history() {
    let tokenizer = json_ish();
    let input = "{id: 0, key: \"object \\\"zero\\\"\"}\n\t{id: 1} trailing  ";
    let mut stream = tokenizer.parse_stream(io::Cursor::new(input.as_bytes().to_vec()), 8);
    stream.set_history_size(2);

    let mut rebuilt = Vec::new();
    while stream.is_valid() {
        rebuilt.extend_from_slice(stream.current().indent());
        rebuilt.extend_from_slice(stream.current().value());
        stream.go_next();
    }
    rebuilt.extend_from_slice(stream.trailing_whitespace());
    assert_eq!(rebuilt, input.as_bytes());
}

/// Yields a fixed prefix, then fails.
struct BrokenPipe {
    data: io::Cursor<Vec<u8>>,
}

impl Read for BrokenPipe {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.data.read(buf)?;
        if n > 0 {
            Ok(n)
        } else {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))
        }
    }
}

#[test]
fn reader_failure_surfaces_after_the_parsed_prefix() {
    let tokenizer = json_ish();
    let reader = BrokenPipe {
        data: io::Cursor::new(b"{id: 7} ".to_vec()),
    };
    let mut stream = tokenizer.parse_stream(reader, 4);

    let mut values = Vec::new();
    while stream.is_valid() {
        values.push(stream.current().value_str().into_owned());
        stream.go_next();
    }
    assert_eq!(values, vec!["{", "id", ":", "7", "}"]);
    assert_eq!(stream.parsed_length(), 8);

    let error = stream.error();
    assert!(matches!(
        error,
        Some(lexkit_core::Error::Read { .. })
    ));
}

#[test]
fn nul_terminates_the_stream_and_drops_the_rest() {
    let tokenizer = json_ish();
    let mut stream =
        tokenizer.parse_stream(io::Cursor::new(b"kept\x00lost lost lost".to_vec()), 6);
    let mut values = Vec::new();
    while stream.is_valid() {
        values.push(stream.current().value_str().into_owned());
        stream.go_next();
    }
    assert_eq!(values, vec!["kept"]);
    assert_eq!(stream.parsed_length(), 4);
    assert!(stream.error().is_none());
}

#[test]
fn zero_chunk_size_falls_back_to_the_default() {
    let tokenizer = json_ish();
    let mut stream = tokenizer.parse_stream(io::Cursor::new(b"a b c".to_vec()), 0);
    let mut count = 0;
    while stream.is_valid() {
        count += 1;
        stream.go_next();
    }
    assert_eq!(count, 3);
}

#[test]
fn empty_reader_yields_an_invalid_stream() {
    let tokenizer = json_ish();
    let mut stream = tokenizer.parse_stream(io::Cursor::new(Vec::new()), 16);
    assert!(!stream.is_valid());
    assert_eq!(stream.len(), 0);
    assert_eq!(stream.parsed_length(), 0);
    stream.go_next();
    assert!(!stream.is_valid());
}

#[test]
fn injection_spanning_chunks_lexes_completely() {
    let mut tokenizer = Tokenizer::new();
    tokenizer.define_tokens(10, &["{{"]);
    tokenizer.define_tokens(11, &["}}"]);
    tokenizer
        .define_framed(14, "\"", "\"")
        .escape(b'\\')
        .add_injection(10, 11);

    let input = b"\"one {{ two }} three\"".to_vec();
    let mut stream = tokenizer.parse_stream(io::Cursor::new(input), 3);
    let mut keys = Vec::new();
    while stream.is_valid() {
        keys.push(stream.current().key());
        stream.go_next();
    }
    assert_eq!(
        keys,
        vec![
            TokenKey::STRING_FRAGMENT,
            TokenKey(10),
            TokenKey::KEYWORD,
            TokenKey(11),
            TokenKey::STRING_FRAGMENT,
        ]
    );
}
