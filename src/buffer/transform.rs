/// ファイルのバイトオーダー指定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    /// 実行中のホストのバイトオーダー
    pub fn host() -> Self {
        if host_is_little_endian() {
            ByteOrder::Little
        } else {
            ByteOrder::Big
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ByteOrder::Little => "little-endian",
            ByteOrder::Big => "big-endian",
        }
    }
}

/// ホストがリトルエンディアンかどうか
pub fn host_is_little_endian() -> bool {
    cfg!(target_endian = "little")
}

/// 読み書きされる全バイトに掛けるビット反転変換
///
/// 有効時は各バイトのビット順 (bit7 <-> bit0 ...) を反転する。
/// 自己逆変換なので、書き込み側と読み出し側で同じ `apply` を使う。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ByteTransform {
    reverse_bits: bool,
}

impl ByteTransform {
    pub const fn new(reverse_bits: bool) -> Self {
        Self { reverse_bits }
    }

    /// ファイルを `order` として扱う変換を作成
    ///
    /// ホストと異なるバイトオーダーの場合のみ反転が有効になる。
    pub fn for_file_order(order: ByteOrder) -> Self {
        Self::new(order != ByteOrder::host())
    }

    /// 起動時の既定値: ファイルはリトルエンディアンとみなす
    pub fn host_default() -> Self {
        Self::for_file_order(ByteOrder::Little)
    }

    pub fn is_enabled(self) -> bool {
        self.reverse_bits
    }

    pub fn apply(self, byte: u8) -> u8 {
        if self.reverse_bits {
            byte.reverse_bits()
        } else {
            byte
        }
    }

    pub fn apply_slice(self, bytes: &mut [u8]) {
        if self.reverse_bits {
            for b in bytes.iter_mut() {
                *b = b.reverse_bits();
            }
        }
    }
}
