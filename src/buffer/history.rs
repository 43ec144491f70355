use tracing::{debug, warn};

use super::{BufferError, ByteStore, ByteTransform};

/// 1バイト分の編集記録 (位置, 旧値, 新値)
///
/// 旧値・新値ともディスク上の値（変換後）を保持する。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditRecord {
    pub pos: u64,
    pub original: u8,
    pub new: u8,
}

/// 1回のユーザー操作で生じた編集の塊
///
/// Undo/Redo は常にトランザクション単位で行う。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transaction {
    records: Vec<EditRecord>,
}

impl Transaction {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 先頭レコードの位置（Undo/Redo 後のカーソル位置）
    pub fn first_pos(&self) -> Option<u64> {
        self.records.first().map(|r| r.pos)
    }
}

/// 新しい編集を積んだときの Redo 履歴の扱い
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RedoPolicy {
    /// Redo 履歴を残す（古い編集を後から再適用できる）
    #[default]
    Keep,
    /// 新しい編集で Redo 履歴を破棄する
    ClearOnEdit,
}

/// Undo/Redo スタックを持つトランザクションエンジン
#[derive(Debug, Default)]
pub struct History {
    undo_stack: Vec<Transaction>,
    redo_stack: Vec<Transaction>,
    policy: RedoPolicy,
}

impl History {
    pub fn new(policy: RedoPolicy) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            policy,
        }
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// 未確定の変更があるかどうか
    pub fn is_modified(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// 1バイト書き換えて記録を返す
    ///
    /// 元の値が読めない位置は `RejectedWrite` になり、何も書き込まない。
    pub fn put_byte<S: ByteStore>(
        store: &mut S,
        pos: u64,
        byte: u8,
        transform: ByteTransform,
    ) -> Result<EditRecord, BufferError> {
        let original = match store.read_byte(pos) {
            Ok(b) => b,
            Err(BufferError::EndOfFile(_)) => return Err(BufferError::RejectedWrite(pos)),
            Err(e) => return Err(e),
        };
        let new = transform.apply(byte);
        store.write_byte(pos, new)?;
        Ok(EditRecord { pos, original, new })
    }

    /// `put` 1回分のトランザクションを積む
    pub fn put<S: ByteStore>(
        &mut self,
        store: &mut S,
        pos: u64,
        byte: u8,
        transform: ByteTransform,
    ) -> Result<(), BufferError> {
        let record = Self::put_byte(store, pos, byte, transform)?;
        self.push(Transaction {
            records: vec![record],
        });
        Ok(())
    }

    /// `bytes` を `pos` から連続して書き込み、1トランザクションとして積む
    ///
    /// 書き込めなかったバイトは記録から除かれる。戻り値は記録されたバイト数。
    /// I/O エラーで中断した場合も、それまでに書いた分は積んでから返す。
    pub fn write<S: ByteStore>(
        &mut self,
        store: &mut S,
        pos: u64,
        bytes: &[u8],
        transform: ByteTransform,
    ) -> Result<usize, BufferError> {
        let mut records = Vec::with_capacity(bytes.len());
        for (i, &byte) in bytes.iter().enumerate() {
            let addr = pos.saturating_add(i as u64);
            match Self::put_byte(store, addr, byte, transform) {
                Ok(record) => records.push(record),
                Err(BufferError::RejectedWrite(at)) => {
                    warn!("write rejected at {:08X}", at);
                }
                Err(e) => {
                    self.push(Transaction { records });
                    return Err(e);
                }
            }
        }
        let count = records.len();
        self.push(Transaction { records });
        Ok(count)
    }

    fn push(&mut self, transaction: Transaction) {
        if transaction.is_empty() {
            return;
        }
        if self.policy == RedoPolicy::ClearOnEdit {
            self.redo_stack.clear();
        }
        self.undo_stack.push(transaction);
    }

    /// Undo: 直前のトランザクションを取り消す
    /// 戻り値: 新しいカーソル位置（履歴が空なら `cursor` のまま）
    ///
    /// 書き戻しに失敗したトランザクションは Undo スタックに残る。
    pub fn undo<S: ByteStore>(&mut self, store: &mut S, cursor: u64) -> Result<u64, BufferError> {
        let Some(transaction) = self.undo_stack.pop() else {
            return Ok(cursor);
        };
        if let Err(e) = Self::replay(store, &transaction, |r| r.original) {
            self.undo_stack.push(transaction);
            return Err(e);
        }
        let pos = transaction.first_pos().unwrap_or(cursor);
        debug!("undo {} byte(s) at {:08X}", transaction.len(), pos);
        self.redo_stack.push(transaction);
        Ok(pos)
    }

    /// Redo: 取り消したトランザクションをやり直す
    pub fn redo<S: ByteStore>(&mut self, store: &mut S, cursor: u64) -> Result<u64, BufferError> {
        let Some(transaction) = self.redo_stack.pop() else {
            return Ok(cursor);
        };
        if let Err(e) = Self::replay(store, &transaction, |r| r.new) {
            self.redo_stack.push(transaction);
            return Err(e);
        }
        let pos = transaction.first_pos().unwrap_or(cursor);
        debug!("redo {} byte(s) at {:08X}", transaction.len(), pos);
        self.undo_stack.push(transaction);
        Ok(pos)
    }

    /// 各レコードの位置に `value` が選んだ値を書く（再実行しても同じ結果になる）
    fn replay<S: ByteStore>(
        store: &mut S,
        transaction: &Transaction,
        value: impl Fn(&EditRecord) -> u8,
    ) -> Result<(), BufferError> {
        for record in &transaction.records {
            store.write_byte(record.pos, value(record))?;
        }
        Ok(())
    }

    pub fn undo_all<S: ByteStore>(
        &mut self,
        store: &mut S,
        cursor: u64,
    ) -> Result<u64, BufferError> {
        let mut pos = cursor;
        while !self.undo_stack.is_empty() {
            pos = self.undo(store, pos)?;
        }
        Ok(pos)
    }

    pub fn redo_all<S: ByteStore>(
        &mut self,
        store: &mut S,
        cursor: u64,
    ) -> Result<u64, BufferError> {
        let mut pos = cursor;
        while !self.redo_stack.is_empty() {
            pos = self.redo(store, pos)?;
        }
        Ok(pos)
    }
}
