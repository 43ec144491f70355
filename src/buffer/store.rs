use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use super::BufferError;

/// ランダムアクセス可能なバイト列
///
/// 位置は常に引数で明示する。終端に達した読み込みは `at_eof` を立て、
/// コマンドごとに `recover_eof_state` で解除・再位置決めする。
/// 長さは開いた時点で固定され、書き込みで伸びることはない。
pub trait ByteStore {
    /// バイト数
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 現在の読み書き位置
    fn position(&self) -> u64;

    fn seek(&mut self, pos: u64) -> Result<(), BufferError>;

    /// 1バイト読み込む（終端以降は `EndOfFile`）
    fn read_byte(&mut self, pos: u64) -> Result<u8, BufferError>;

    /// `buf` に読めるだけ読み込み、読んだバイト数を返す（終端なら0）
    fn read_block(&mut self, pos: u64, buf: &mut [u8]) -> Result<usize, BufferError>;

    /// 既存バイトを上書きする（終端以降は `RejectedWrite`）
    fn write_byte(&mut self, pos: u64, byte: u8) -> Result<(), BufferError>;

    /// 直前の操作で終端に達したかどうか
    fn at_eof(&self) -> bool;

    /// 終端状態を解除して `pos` に戻す
    fn recover_eof_state(&mut self, pos: u64) -> Result<(), BufferError>;

    fn flush(&mut self) -> Result<(), BufferError>;
}

/// ディスク上のファイルをその場で編集するストア
pub struct FileStore {
    file: File,
    path: PathBuf,
    len: u64,
    pos: u64,
    at_eof: bool,
}

impl FileStore {
    /// 既存ファイルを読み書きモードで開く（作成・切り詰めはしない）
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, BufferError> {
        let path = path.into();
        let file = OpenOptions::new().read(true).write(true).open(&path)?;
        let len = file.metadata()?.len();
        Ok(Self {
            file,
            path,
            len,
            pos: 0,
            at_eof: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteStore for FileStore {
    fn len(&self) -> u64 {
        self.len
    }

    fn position(&self) -> u64 {
        self.pos
    }

    fn seek(&mut self, pos: u64) -> Result<(), BufferError> {
        self.file.seek(SeekFrom::Start(pos))?;
        self.pos = pos;
        Ok(())
    }

    fn read_byte(&mut self, pos: u64) -> Result<u8, BufferError> {
        if pos >= self.len {
            self.at_eof = true;
            return Err(BufferError::EndOfFile(pos));
        }
        self.seek(pos)?;
        let mut byte = [0u8; 1];
        self.file.read_exact(&mut byte)?;
        self.pos += 1;
        Ok(byte[0])
    }

    fn read_block(&mut self, pos: u64, buf: &mut [u8]) -> Result<usize, BufferError> {
        let available = self.len.saturating_sub(pos);
        let count = (buf.len() as u64).min(available) as usize;
        if count < buf.len() {
            self.at_eof = true;
        }
        if count == 0 {
            return Ok(0);
        }
        self.seek(pos)?;
        self.file.read_exact(&mut buf[..count])?;
        self.pos += count as u64;
        Ok(count)
    }

    fn write_byte(&mut self, pos: u64, byte: u8) -> Result<(), BufferError> {
        if pos >= self.len {
            return Err(BufferError::RejectedWrite(pos));
        }
        self.seek(pos)?;
        self.file.write_all(&[byte])?;
        self.pos += 1;
        Ok(())
    }

    fn at_eof(&self) -> bool {
        self.at_eof
    }

    fn recover_eof_state(&mut self, pos: u64) -> Result<(), BufferError> {
        if self.at_eof {
            self.at_eof = false;
            self.seek(pos)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), BufferError> {
        self.file.flush()?;
        Ok(())
    }
}

/// メモリ上のバイト列をファイルと同じ規則で扱うストア
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Vec<u8>,
    pos: u64,
    at_eof: bool,
}

impl MemoryStore {
    /// バイト列から作成
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self {
            data,
            pos: 0,
            at_eof: false,
        }
    }

    /// 生データへの参照を取得
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    fn index(&self, pos: u64) -> Option<usize> {
        usize::try_from(pos).ok().filter(|&i| i < self.data.len())
    }
}

impl ByteStore for MemoryStore {
    fn len(&self) -> u64 {
        self.data.len() as u64
    }

    fn position(&self) -> u64 {
        self.pos
    }

    fn seek(&mut self, pos: u64) -> Result<(), BufferError> {
        self.pos = pos;
        Ok(())
    }

    fn read_byte(&mut self, pos: u64) -> Result<u8, BufferError> {
        let Some(i) = self.index(pos) else {
            self.at_eof = true;
            return Err(BufferError::EndOfFile(pos));
        };
        self.pos = pos + 1;
        Ok(self.data[i])
    }

    fn read_block(&mut self, pos: u64, buf: &mut [u8]) -> Result<usize, BufferError> {
        let Some(start) = self.index(pos) else {
            self.at_eof = true;
            return Ok(0);
        };
        let count = buf.len().min(self.data.len() - start);
        if count < buf.len() {
            self.at_eof = true;
        }
        buf[..count].copy_from_slice(&self.data[start..start + count]);
        self.pos = pos + count as u64;
        Ok(count)
    }

    fn write_byte(&mut self, pos: u64, byte: u8) -> Result<(), BufferError> {
        let i = self.index(pos).ok_or(BufferError::RejectedWrite(pos))?;
        self.data[i] = byte;
        self.pos = pos + 1;
        Ok(())
    }

    fn at_eof(&self) -> bool {
        self.at_eof
    }

    fn recover_eof_state(&mut self, pos: u64) -> Result<(), BufferError> {
        if self.at_eof {
            self.at_eof = false;
            self.pos = pos;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), BufferError> {
        Ok(())
    }
}
