mod repl;
mod search;
mod state;
mod tokenizer;

pub use repl::run_session;
pub use search::find_text;
pub use state::Session;
pub use tokenizer::{tokenize, tokenize_with_offsets, Argument};

/// ダンプ1ページ分のアドレス移動量
pub const PAGE_SIZE: u64 = 256;

/// 1行のコマンド入力から得られる操作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// 空入力: 現在位置をダンプ
    Refresh,
    Help,
    /// 出力先をファイルに切り替える（この行のみ）
    Redirect { path: String, dump: bool },

    // カーソル移動
    PageUp,
    PageDown,
    Next,
    Prev,
    Goto(u64),

    // 表示
    DumpAll,
    Find(String),
    ShowEndianness,
    Little,
    Big,

    // 編集
    PutHex(u8),
    PutChar(u8),
    Write(String),
    Undo,
    Redo,
    UndoAll,
    RedoAll,
}

impl Command {
    /// 入力行をコマンド列に変換
    ///
    /// 認識できないトークンは無視する。`write` は行の残りをそのまま書き込み文字列とし、
    /// それ以降のトークンは解釈しない。
    pub fn parse_line(line: &str) -> Vec<Command> {
        let args = tokenize_with_offsets(line);
        let argc = args.len();
        let mut commands = Vec::new();

        let mut i = 0;
        while i < argc {
            let arg = args[i].text.as_str();
            let next = args.get(i + 1).map(|a| a.text.as_str());

            match (arg, next) {
                ("", _) if argc == 1 => commands.push(Command::Refresh),
                ("-?" | "?" | "help", _) => commands.push(Command::Help),
                (">>", Some(path)) => {
                    commands.push(Command::Redirect {
                        path: path.to_string(),
                        dump: argc == 2,
                    });
                    i += 1;
                }
                (redirect, _) if redirect.starts_with(">>") => {
                    commands.push(Command::Redirect {
                        path: redirect[2..].to_string(),
                        dump: argc == 1,
                    });
                }
                ("goto", Some(addr)) => {
                    commands.push(Command::Goto(parse_hex(addr)));
                    i += 1;
                }
                ("find", Some(target)) => {
                    commands.push(Command::Find(target.to_string()));
                    i += 1;
                }
                ("u", _) => commands.push(Command::PageUp),
                ("d", _) => commands.push(Command::PageDown),
                ("n", _) => commands.push(Command::Next),
                ("p", _) => commands.push(Command::Prev),
                ("dump", _) => commands.push(Command::DumpAll),
                ("puthex", Some(hex)) => {
                    // 下位8ビットのみ使用
                    commands.push(Command::PutHex(parse_hex(hex) as u8));
                    i += 1;
                }
                ("put" | "putchar", Some(ch)) => {
                    if let Some(&byte) = ch.as_bytes().first() {
                        commands.push(Command::PutChar(byte));
                    }
                    i += 1;
                }
                ("write", Some(_)) => {
                    let rest = &line[args[i].offset + "write".len()..];
                    let mut chars = rest.chars();
                    chars.next();
                    commands.push(Command::Write(chars.as_str().to_string()));
                    break;
                }
                ("undo", _) => commands.push(Command::Undo),
                ("redo", _) => commands.push(Command::Redo),
                ("undoall", _) => commands.push(Command::UndoAll),
                ("redoall", _) => commands.push(Command::RedoAll),
                ("endianness", _) => commands.push(Command::ShowEndianness),
                ("little", _) => commands.push(Command::Little),
                ("big", _) => commands.push(Command::Big),
                _ => {}
            }
            i += 1;
        }

        commands
    }
}

/// 終了コマンドかどうか (`q` / `quit` / `exit`)
pub fn is_quit(line: &str) -> bool {
    matches!(tokenize(line).as_slice(), [cmd] if cmd == "q" || cmd == "quit" || cmd == "exit")
}

/// 16進数をパース（`0x` プレフィックス可）
///
/// 先頭から続く16進数字だけを読む。数字がなければ0、桁あふれは飽和する。
pub fn parse_hex(s: &str) -> u64 {
    let s = s.trim_start();
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    digits
        .chars()
        .map_while(|c| c.to_digit(16))
        .fold(0u64, |acc, d| acc.saturating_mul(16).saturating_add(u64::from(d)))
}
