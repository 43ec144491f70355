use std::io::Write;

use crate::buffer::{BufferError, ByteStore, ByteTransform};

/// 1回のダンプで読み込む最大バイト数
pub const BLOCK_SIZE: usize = 256;

/// 1行あたりのバイト数
pub const BYTES_PER_ROW: usize = 16;

/// HEX/ASCII ダンプの描画
///
/// 各行は `AAAAAAAA: XX XX ... | ascii` の固定幅。
/// 最終行が16バイトに満たない場合は HEX 列を空白で埋めて ASCII 列を揃える。
pub struct HexView<'a> {
    /// 表示するデータ
    data: &'a [u8],
    /// 先頭バイトのアドレス
    offset: u64,
}

impl<'a> HexView<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    /// ASCII 列に出す1バイト
    ///
    /// 印字可能 ASCII はそのまま、上位ビットが立ったバイトは生のまま、その他は `.`。
    fn display_byte(byte: u8) -> u8 {
        match byte {
            0x20..=0x7E => byte,
            0x80..=0xFF => byte,
            _ => b'.',
        }
    }

    fn render_row<W: Write>(&self, addr: u64, row: &[u8], out: &mut W) -> std::io::Result<()> {
        write!(out, "{:08X}: ", addr)?;
        for byte in row {
            write!(out, "{:02X} ", byte)?;
        }
        for _ in row.len()..BYTES_PER_ROW {
            out.write_all(b"   ")?;
        }
        out.write_all(b"| ")?;
        let ascii: Vec<u8> = row.iter().map(|&b| Self::display_byte(b)).collect();
        out.write_all(&ascii)?;
        out.write_all(b"\n")
    }

    /// 全行を書き出す（データが空なら何も出力しない）
    pub fn render<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        for (i, row) in self.data.chunks(BYTES_PER_ROW).enumerate() {
            let addr = self.offset + (i * BYTES_PER_ROW) as u64;
            self.render_row(addr, row, out)?;
        }
        Ok(())
    }
}

/// `pos` から最大256バイトを読み込んでダンプする
///
/// 戻り値: 読み込んだバイト数（0なら出力なし）
pub fn dump_block<S: ByteStore, W: Write>(
    store: &mut S,
    pos: u64,
    transform: ByteTransform,
    out: &mut W,
) -> Result<usize, BufferError> {
    let mut buf = [0u8; BLOCK_SIZE];
    let count = store.read_block(pos, &mut buf)?;
    if count == 0 {
        return Ok(0);
    }
    let bytes = &mut buf[..count];
    transform.apply_slice(bytes);
    HexView::new(bytes).offset(pos).render(out)?;
    Ok(count)
}

/// ファイル全体を先頭から256バイトずつダンプする
pub fn dump_all<S: ByteStore, W: Write>(
    store: &mut S,
    transform: ByteTransform,
    out: &mut W,
) -> Result<(), BufferError> {
    let mut pos = 0u64;
    loop {
        let count = dump_block(store, pos, transform, out)?;
        if count < BLOCK_SIZE {
            return Ok(());
        }
        pos += count as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::MemoryStore;

    fn render(data: &[u8], offset: u64) -> Vec<u8> {
        let mut out = Vec::new();
        HexView::new(data).offset(offset).render(&mut out).unwrap();
        out
    }

    #[test]
    fn test_zero_filled_rows() {
        let out = String::from_utf8(render(&[0u8; 32], 0)).unwrap();
        let hex = ["00"; 16].join(" ");
        let expected = format!(
            "00000000: {hex} | ................\n00000010: {hex} | ................\n"
        );
        assert_eq!(out, expected);
    }

    #[test]
    fn test_partial_row_is_padded() {
        let out = String::from_utf8(render(b"Hi!\x00\x7f", 0x20)).unwrap();
        let expected = format!("00000020: 48 69 21 00 7F {}| Hi!..\n", "   ".repeat(11));
        assert_eq!(out, expected);
    }

    #[test]
    fn test_high_bytes_are_raw() {
        let out = render(&[0x41, 0xE9, 0x0A], 0);
        assert!(out.ends_with(&[b'|', b' ', 0x41, 0xE9, b'.', b'\n']));
    }

    #[test]
    fn test_empty_data_renders_nothing() {
        assert!(render(&[], 0).is_empty());
    }

    #[test]
    fn test_dump_block_applies_transform() {
        let mut store = MemoryStore::from_bytes(vec![0x80, 0x01]);
        let mut out = Vec::new();
        let count = dump_block(&mut store, 0, ByteTransform::new(true), &mut out).unwrap();
        assert_eq!(count, 2);
        let text = String::from_utf8_lossy(&out);
        assert!(text.starts_with("00000000: 01 80 "));
    }

    #[test]
    fn test_dump_block_past_end_is_silent() {
        let mut store = MemoryStore::from_bytes(vec![1, 2, 3]);
        let mut out = Vec::new();
        assert_eq!(
            dump_block(&mut store, 3, ByteTransform::default(), &mut out).unwrap(),
            0
        );
        assert!(out.is_empty());
        assert!(store.at_eof());
    }

    #[test]
    fn test_dump_block_limits_to_256_bytes() {
        let mut store = MemoryStore::from_bytes(vec![0xAA; 300]);
        let mut out = Vec::new();
        let count = dump_block(&mut store, 0, ByteTransform::default(), &mut out).unwrap();
        assert_eq!(count, BLOCK_SIZE);
        assert_eq!(out.iter().filter(|&&b| b == b'\n').count(), 16);
    }

    #[test]
    fn test_dump_all_covers_whole_file() {
        let mut store = MemoryStore::from_bytes(vec![0x11; 512 + 20]);
        let mut out = Vec::new();
        dump_all(&mut store, ByteTransform::default(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 32 + 2);
        assert!(lines[32].starts_with("00000200: "));
        assert!(lines[33].starts_with("00000210: 11 11 11 11 "));
    }

    #[test]
    fn test_dump_all_exact_multiple() {
        let mut store = MemoryStore::from_bytes(vec![0; 256]);
        let mut out = Vec::new();
        dump_all(&mut store, ByteTransform::default(), &mut out).unwrap();
        assert_eq!(out.iter().filter(|&&b| b == b'\n').count(), 16);
    }
}
