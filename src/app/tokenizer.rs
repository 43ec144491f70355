/// 入力行から切り出した1引数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub text: String,
    /// 入力行中の開始バイト位置
    pub offset: usize,
}

/// 空白区切りのトークンと開始位置
fn words(line: &str) -> impl Iterator<Item = (usize, &str)> {
    let mut rest = line;
    let mut base = 0;
    std::iter::from_fn(move || {
        let start = rest.find(|c: char| !c.is_whitespace())?;
        let tail = &rest[start..];
        let end = tail.find(char::is_whitespace).unwrap_or(tail.len());
        let word = &tail[..end];
        let offset = base + start;
        base = offset + end;
        rest = &tail[end..];
        Some((offset, word))
    })
}

fn odd_quotes(token: &str) -> bool {
    token.matches('"').count() % 2 == 1
}

/// 閉じた引用スパンの両端の `"` を1つずつ外す
fn unquote(span: &str) -> String {
    let span = span.strip_prefix('"').unwrap_or(span);
    let span = span.strip_suffix('"').unwrap_or(span);
    span.to_string()
}

/// 入力行を引数に分割する
///
/// `"` を奇数個含むトークンが引用スパンを開き、次に `"` を奇数個含むトークンで閉じる。
/// スパン内のトークンは空白1つで連結される。偶数個 (0以外) のトークンはスパンを開閉しない。
/// 空行は空文字列1つになる。
pub fn tokenize_with_offsets(line: &str) -> Vec<Argument> {
    let mut output: Vec<Argument> = Vec::new();
    let mut open_span = false;

    for (offset, word) in words(line) {
        let odd = odd_quotes(word);
        if open_span {
            if let Some(last) = output.last_mut() {
                last.text.push(' ');
                last.text.push_str(word);
                if odd {
                    open_span = false;
                    last.text = unquote(&last.text);
                }
                continue;
            }
        }
        output.push(Argument {
            text: word.to_string(),
            offset,
        });
        open_span = odd;
    }

    if output.is_empty() {
        output.push(Argument {
            text: String::new(),
            offset: 0,
        });
    }
    output
}

pub fn tokenize(line: &str) -> Vec<String> {
    tokenize_with_offsets(line)
        .into_iter()
        .map(|arg| arg.text)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_words() {
        assert_eq!(tokenize("put hello"), vec!["put", "hello"]);
        assert_eq!(tokenize("  goto   1A  "), vec!["goto", "1A"]);
    }

    #[test]
    fn test_quoted_span() {
        assert_eq!(tokenize(r#"put "hello world""#), vec!["put", "hello world"]);
        assert_eq!(
            tokenize(r#"find "a  b c" n"#),
            vec!["find", "a b c", "n"]
        );
    }

    #[test]
    fn test_even_quotes_do_not_open_span() {
        assert_eq!(
            tokenize(r#"put "x" world"#),
            vec!["put", r#""x""#, "world"]
        );
    }

    #[test]
    fn test_even_quotes_inside_span_do_not_close_it() {
        assert_eq!(
            tokenize(r#"find "a ""b"" c" d"#),
            vec!["find", r#"a ""b"" c"#, "d"]
        );
    }

    #[test]
    fn test_unclosed_span_swallows_rest() {
        assert_eq!(tokenize(r#"find "abc def ghi"#), vec!["find", r#""abc def ghi"#]);
    }

    #[test]
    fn test_empty_line() {
        assert_eq!(tokenize(""), vec![""]);
        assert_eq!(tokenize(" \t "), vec![""]);
    }

    #[test]
    fn test_offsets() {
        let args = tokenize_with_offsets("goto 1A  write hi there");
        let offsets: Vec<usize> = args.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 5, 9, 15, 18]);
    }
}
