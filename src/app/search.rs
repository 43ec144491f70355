use crate::buffer::{BufferError, ByteStore};

/// 検索時の読み込み単位
const CHUNK_SIZE: usize = 4096;

/// パターンを前方検索
fn find_pattern(data: &[u8], pattern: &[u8]) -> Option<usize> {
    if pattern.is_empty() || pattern.len() > data.len() {
        return None;
    }
    data.windows(pattern.len()).position(|w| w == pattern)
}

/// カーソルの次のバイトから行単位でテキストを検索する
///
/// `\n` で区切った各行の中だけを照合するので、改行をまたぐ一致は見つからない。
/// 比較はディスク上の生バイトで行う。
/// 戻り値: 一致した先頭バイトの絶対位置
pub fn find_text<S: ByteStore>(
    store: &mut S,
    cursor: u64,
    target: &[u8],
) -> Result<Option<u64>, BufferError> {
    let mut pos = cursor.saturating_add(1);
    let mut line_start = pos;
    let mut line = Vec::new();
    let mut buf = vec![0u8; CHUNK_SIZE];

    loop {
        let count = store.read_block(pos, &mut buf)?;
        if count == 0 {
            break;
        }
        for (i, &byte) in buf[..count].iter().enumerate() {
            if byte != b'\n' {
                line.push(byte);
                continue;
            }
            if let Some(at) = find_pattern(&line, target) {
                return Ok(Some(line_start + at as u64));
            }
            line.clear();
            line_start = pos + i as u64 + 1;
        }
        pos += count as u64;
    }

    // 改行で終わらない最終行
    Ok(find_pattern(&line, target).map(|at| line_start + at as u64))
}
