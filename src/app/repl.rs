use std::io::{BufRead, Write};

use super::{is_quit, Session};
use crate::buffer::{BufferError, ByteStore};

const PROMPT: &str = "> ";

/// 終了時に変更を残すか確認する
///
/// `n` / `N` で始まる応答のみ「残さない」。入力が尽きた場合は残す。
fn confirm_keep<I, W>(lines: &mut I, out: &mut W) -> Result<bool, BufferError>
where
    I: Iterator<Item = std::io::Result<String>>,
    W: Write,
{
    write!(
        out,
        "You've modified the file. Are you sure you want to keep the changes? [Y/N] "
    )?;
    out.flush()?;
    let answer = match lines.next() {
        Some(line) => line?,
        None => return Ok(true),
    };
    Ok(!matches!(answer.trim_start().chars().next(), Some('n' | 'N')))
}

/// 対話ループ
///
/// 起動時に先頭256バイトを表示し、`q` / `quit` / `exit`（または入力終端）まで
/// 1行ずつコマンドを実行する。
pub fn run_session<S, R, W>(
    session: &mut Session<S>,
    input: R,
    out: &mut W,
) -> Result<(), BufferError>
where
    S: ByteStore,
    R: BufRead,
    W: Write,
{
    session.render_at(0, out)?;
    let mut lines = input.lines();

    loop {
        write!(out, "{}", PROMPT)?;
        out.flush()?;

        let line = match lines.next() {
            Some(line) => line?,
            None => "quit".to_string(),
        };

        if is_quit(&line) {
            if session.is_modified() && !confirm_keep(&mut lines, out)? {
                writeln!(out, "Type undoall to undo all changes")?;
                continue;
            }
            return Ok(());
        }

        session.execute(&line, out)?;
    }
}
