use std::fs::File;
use std::io::{BufWriter, Write};

use tracing::{debug, warn};

use super::{find_text, Command, PAGE_SIZE};
use crate::buffer::{BufferError, ByteOrder, ByteStore, ByteTransform, History, RedoPolicy};
use crate::ui::{dump_all, dump_block, HELP_TEXT};

/// 1行の処理中に溜める出力要求
///
/// 出力はすべてのトークンを処理した後、最終的なカーソル位置で1回だけ行う。
#[derive(Debug, Default)]
struct Pending {
    dump: bool,
    full_dump: bool,
    find: Option<String>,
    show_endianness: bool,
    help: bool,
    redirect: Option<String>,
}

/// 編集セッションの状態
///
/// 開いているファイル、カーソル、ビット反転の設定、Undo/Redo 履歴を持つ。
pub struct Session<S: ByteStore> {
    /// 編集中のファイル
    store: S,
    /// Undo/Redo 履歴
    history: History,
    /// カーソル位置
    cursor: u64,
    /// 読み書き時のバイト変換
    transform: ByteTransform,
}

impl<S: ByteStore> Session<S> {
    /// 新しいセッションを作成
    pub fn new(store: S) -> Self {
        Self {
            store,
            history: History::default(),
            cursor: 0,
            transform: ByteTransform::host_default(),
        }
    }

    pub fn with_redo_policy(mut self, policy: RedoPolicy) -> Self {
        self.history = History::new(policy);
        self
    }

    pub fn with_transform(mut self, transform: ByteTransform) -> Self {
        self.transform = transform;
        self
    }

    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    pub fn transform(&self) -> ByteTransform {
        self.transform
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// 変更されているかどうか
    pub fn is_modified(&self) -> bool {
        self.history.is_modified()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn flush(&mut self) -> Result<(), BufferError> {
        self.store.flush()
    }

    /// `pos` から256バイトをダンプする（起動直後の表示用）
    pub fn render_at<W: Write>(&mut self, pos: u64, out: &mut W) -> Result<(), BufferError> {
        let result = dump_block(&mut self.store, pos, self.transform, out).map(|_| ());
        let recovered = self.store.recover_eof_state(self.cursor);
        result.and(recovered)
    }

    /// 1行分のコマンドを実行する
    ///
    /// 出力は `console`、またはリダイレクト指定があればそのファイルに書く。
    /// 成否にかかわらず最後にストアの終端状態を解除する。
    pub fn execute<W: Write>(&mut self, line: &str, console: &mut W) -> Result<(), BufferError> {
        let result = self.run(line, console);
        let recovered = self.store.recover_eof_state(self.cursor);
        result.and(recovered)
    }

    fn run<W: Write>(&mut self, line: &str, console: &mut W) -> Result<(), BufferError> {
        let commands = Command::parse_line(line);
        debug!("commands: {:?}", commands);

        let mut pending = Pending::default();
        for command in commands {
            self.apply(command, &mut pending)?;
        }

        let redirected = match pending.redirect.as_deref() {
            Some(path) => match File::create(path) {
                Ok(file) => {
                    debug!("redirecting output to {}", path);
                    Some(BufWriter::new(file))
                }
                Err(e) => {
                    warn!("cannot open {} for output, using console: {}", path, e);
                    None
                }
            },
            None => None,
        };

        match redirected {
            Some(mut file) => {
                self.emit(&pending, &mut file)?;
                file.flush()?;
            }
            None => self.emit(&pending, console)?,
        }
        Ok(())
    }

    /// コマンドを適用（カーソル・ファイル・履歴を更新）
    fn apply(&mut self, command: Command, pending: &mut Pending) -> Result<(), BufferError> {
        match command {
            Command::Refresh => pending.dump = true,
            Command::Help => pending.help = true,
            Command::Redirect { path, dump } => {
                pending.redirect = Some(path);
                pending.dump |= dump;
            }
            Command::PageUp => {
                self.cursor = self.cursor.saturating_sub(PAGE_SIZE);
                pending.dump = true;
            }
            Command::PageDown => {
                self.cursor = self.cursor.saturating_add(PAGE_SIZE);
                pending.dump = true;
            }
            Command::Next => {
                self.cursor = self.cursor.saturating_add(1);
                pending.dump = true;
            }
            Command::Prev => {
                self.cursor = self.cursor.saturating_sub(1);
                pending.dump = true;
            }
            Command::Goto(addr) => {
                self.cursor = addr;
                pending.dump = true;
            }
            Command::DumpAll => pending.full_dump = true,
            Command::Find(target) => pending.find = Some(target),
            Command::ShowEndianness => pending.show_endianness = true,
            Command::Little => {
                self.transform = ByteTransform::for_file_order(ByteOrder::Little);
                pending.dump = true;
            }
            Command::Big => {
                self.transform = ByteTransform::for_file_order(ByteOrder::Big);
                pending.dump = true;
            }
            Command::PutHex(byte) | Command::PutChar(byte) => {
                match self.history.put(&mut self.store, self.cursor, byte, self.transform) {
                    Ok(()) => {}
                    Err(BufferError::RejectedWrite(pos)) => {
                        warn!("put rejected at {:08X}: past end of file", pos);
                    }
                    Err(e) => return Err(e),
                }
                pending.dump = true;
            }
            Command::Write(text) => {
                let written =
                    self.history
                        .write(&mut self.store, self.cursor, text.as_bytes(), self.transform)?;
                debug!("wrote {} of {} byte(s) at {:08X}", written, text.len(), self.cursor);
                pending.dump = true;
            }
            Command::Undo => {
                self.cursor = self.history.undo(&mut self.store, self.cursor)?;
                pending.dump = true;
            }
            Command::Redo => {
                self.cursor = self.history.redo(&mut self.store, self.cursor)?;
                pending.dump = true;
            }
            Command::UndoAll => {
                self.cursor = self.history.undo_all(&mut self.store, self.cursor)?;
                pending.dump = true;
            }
            Command::RedoAll => {
                self.cursor = self.history.redo_all(&mut self.store, self.cursor)?;
                pending.dump = true;
            }
        }
        Ok(())
    }

    /// 溜めた出力要求を決まった順序で書き出す
    fn emit<W: Write>(&mut self, pending: &Pending, out: &mut W) -> Result<(), BufferError> {
        if pending.dump {
            dump_block(&mut self.store, self.cursor, self.transform, out)?;
        }

        if pending.full_dump {
            dump_all(&mut self.store, self.transform, out)?;
        }

        if let Some(target) = &pending.find {
            match find_text(&mut self.store, self.cursor, target.as_bytes())? {
                Some(pos) => {
                    self.cursor = pos;
                    dump_block(&mut self.store, self.cursor, self.transform, out)?;
                }
                None => {
                    writeln!(out, "Could not find {}", target)?;
                    writeln!(out, "Try again to search from the top.")?;
                    self.cursor = 0;
                }
            }
        }

        if pending.show_endianness {
            writeln!(out, "I detected {}", ByteOrder::host().name())?;
        }

        if pending.help {
            out.write_all(HELP_TEXT.as_bytes())?;
        }

        Ok(())
    }
}
