#![no_main]

//! Random walk over stream navigation with a bounded history: no panics,
//! dense ids, and adjacent tokens tiling the input.

use libfuzzer_sys::fuzz_target;
use lexkit_core::{TokenKey, Tokenizer};

fuzz_target!(|data: &[u8]| {
    let Some((&history, rest)) = data.split_first() else {
        return;
    };
    let (ops, input) = rest.split_at(rest.len() / 2);

    let mut tokenizer = Tokenizer::new();
    tokenizer.allow_keyword_underscore();
    tokenizer.define_tokens(10, &["{{"]);
    tokenizer.define_tokens(11, &["}}"]);
    tokenizer
        .define_framed(14, "\"", "\"")
        .escape(b'\\')
        .add_injection(10, 11);

    let mut stream = tokenizer.parse_bytes(input);
    stream.set_history_size(history as usize % 8);

    for &op in ops {
        match op % 6 {
            0 | 1 => {
                stream.go_next();
            }
            2 => {
                stream.go_prev();
            }
            3 => {
                stream.go_to(op as i64 % 16);
            }
            4 => {
                let _ = stream.is_next_sequence(&[TokenKey::KEYWORD, TokenKey::INTEGER]);
            }
            _ => {
                let _ = stream.snippet(3, 3);
            }
        }

        // Adjacent tokens tile the input byte-for-byte.
        if stream.is_valid() && stream.peek_next().is_valid() {
            let current = stream.current();
            let next = stream.peek_next();
            assert_eq!(next.id(), current.id() + 1);
            assert_eq!(
                current.offset() + current.value().len() + next.indent().len(),
                next.offset()
            );
        }
    }

    stream.close();
    assert!(!stream.is_valid());
});
