mod history;
mod store;
mod transform;

pub use history::{EditRecord, History, RedoPolicy, Transaction};
pub use store::{ByteStore, FileStore, MemoryStore};
pub use transform::{host_is_little_endian, ByteOrder, ByteTransform};

use thiserror::Error;

/// バッファ操作のエラー
#[derive(Debug, Error)]
pub enum BufferError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// ファイル終端以降の読み込み
    #[error("end of file at {0:08X}")]
    EndOfFile(u64),

    /// 元の値が読めない位置への書き込み
    #[error("write rejected at {0:08X}: position is past end of file")]
    RejectedWrite(u64),
}
