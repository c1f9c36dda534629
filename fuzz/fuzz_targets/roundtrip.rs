#![no_main]

//! Oracle: concatenating `indent ++ value` over every emitted token, then
//! appending the stream's trailing whitespace, reconstructs the input.

use libfuzzer_sys::fuzz_target;
use lexkit_core::Tokenizer;

fuzz_target!(|data: &[u8]| {
    // Everything after a NUL byte is dropped by design; the oracle covers
    // the prefix before the first NUL.
    let input = match data.iter().position(|&b| b == 0) {
        Some(i) => &data[..i],
        None => data,
    };

    let mut tokenizer = Tokenizer::new();
    tokenizer.define_tokens(10, &[","]);
    tokenizer.define_tokens(11, &[":"]);
    tokenizer.define_tokens(12, &["{"]);
    tokenizer.define_tokens(13, &["}"]);
    tokenizer.define_framed(14, "\"", "\"").escape(b'\\');

    let mut stream = tokenizer.parse_stream(std::io::Cursor::new(input.to_vec()), 100);

    let mut rebuilt = Vec::with_capacity(input.len());
    while stream.is_valid() {
        rebuilt.extend_from_slice(stream.current().indent());
        rebuilt.extend_from_slice(stream.current().value());
        stream.go_next();
    }
    rebuilt.extend_from_slice(stream.trailing_whitespace());

    assert_eq!(
        rebuilt, input,
        "token concatenation must reconstruct the input"
    );
    assert_eq!(stream.parsed_length(), input.len());
});
