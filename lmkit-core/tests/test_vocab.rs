use std::io::Write;

use lmkit_core::vocab::{END_TOKEN, PADDING_TOKEN, START_TOKEN, UNKNOWN_TOKEN};
use lmkit_core::{LmError, Vocabulary};

#[test]
fn test_reserved_tokens_first() {
    let vocab = Vocabulary::new(["a", "b"]);
    assert_eq!(vocab.vocab_size(), 6);
    assert_eq!(vocab.index_to_token(vocab.padding_index()), Some(PADDING_TOKEN));
    assert_eq!(vocab.index_to_token(vocab.unknown_index()), Some(UNKNOWN_TOKEN));
    assert_eq!(vocab.index_to_token(vocab.start_index()), Some(START_TOKEN));
    assert_eq!(vocab.index_to_token(vocab.end_index()), Some(END_TOKEN));
    assert_eq!(vocab.token_to_index("a"), 4);
    assert_eq!(vocab.token_to_index("b"), 5);
}

#[test]
fn test_duplicates_and_sentinels_ignored() {
    let vocab = Vocabulary::new(["a", "a", "</s>", "b"]);
    assert_eq!(vocab.vocab_size(), 6);
    assert_eq!(vocab.token_to_index("</s>"), vocab.end_index());
    assert_eq!(vocab.tokens().collect::<Vec<_>>(), vec!["<pad>", "<unk>", "<s>", "</s>", "a", "b"]);
}

#[test]
fn test_unknown_fallback() {
    let vocab = Vocabulary::new(["a"]);
    assert_eq!(vocab.get("missing"), None);
    assert_eq!(vocab.token_to_index("missing"), vocab.unknown_index());
    assert_eq!(vocab.index_to_token(42), None);
}

#[test]
fn test_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "hello\n\n  world  \nhello").unwrap();
    let vocab = Vocabulary::from_file(file.path()).unwrap();
    assert_eq!(vocab.vocab_size(), 6);
    assert_eq!(vocab.token_to_index("world"), 5);
}

#[test]
fn test_from_missing_file() {
    let err = Vocabulary::from_file(std::path::Path::new("/nonexistent/vocab.txt")).unwrap_err();
    assert!(matches!(err, LmError::FileNotFound(_)));
}
