//! Crude token estimate used in request diagnostics. Counts
//! whitespace/punctuation-delimited segments, delimiters included. Not a
//! tokenizer; never feeds into the request sent to the provider.

use once_cell::sync::Lazy;
use regex::Regex;

static TOKEN_SPLIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\s+|[.,!?;:'"()\[\]{}]"#).expect("invalid token split pattern"));

pub fn count_tokens(text: &str) -> usize {
    let text = text.to_lowercase();
    let mut count = 0;
    let mut last = 0;

    for delim in TOKEN_SPLIT.find_iter(&text) {
        if delim.start() > last {
            count += 1;
        }
        count += 1;
        last = delim.end();
    }

    if last < text.len() {
        count += 1;
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_plain_words() {
        assert_eq!(count_tokens("hello"), 1);
        assert_eq!(count_tokens("hello world"), 3);
    }

    #[test]
    fn counts_punctuation_as_segments() {
        assert_eq!(count_tokens("Hello, world!"), 5);
        assert_eq!(count_tokens("a.b"), 3);
        assert_eq!(count_tokens("(hi)"), 3);
    }

    #[test]
    fn whitespace_runs_collapse_to_one_segment() {
        assert_eq!(count_tokens("foo  bar"), 3);
    }

    #[test]
    fn empty_input_counts_zero() {
        assert_eq!(count_tokens(""), 0);
    }

    #[test]
    fn case_does_not_change_the_count() {
        assert_eq!(count_tokens("Hello World"), count_tokens("hello world"));
    }
}
