use std::io::Write;

use hexed::app::{run_session, Session};
use hexed::buffer::{ByteTransform, FileStore, RedoPolicy};
use tempfile::{NamedTempFile, TempDir};

fn temp_file(content: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content).unwrap();
    file.flush().unwrap();
    file
}

fn open(file: &NamedTempFile) -> Session<FileStore> {
    Session::new(FileStore::open(file.path()).unwrap()).with_transform(ByteTransform::new(false))
}

fn exec(session: &mut Session<FileStore>, line: &str) -> String {
    let mut out = Vec::new();
    session.execute(line, &mut out).unwrap();
    String::from_utf8_lossy(&out).into_owned()
}

fn disk(file: &NamedTempFile) -> Vec<u8> {
    std::fs::read(file.path()).unwrap()
}

#[test]
fn test_edits_land_on_disk_and_undo_restores() {
    let file = temp_file(b"The quick brown fox");
    let mut session = open(&file);

    exec(&mut session, "goto 4 write slow!");
    exec(&mut session, "goto 10 puthex 42");
    exec(&mut session, "goto 0 put t");
    session.flush().unwrap();
    assert_eq!(disk(&file), b"the slow! Brown fox");

    for _ in 0..3 {
        exec(&mut session, "undo");
    }
    session.flush().unwrap();
    assert_eq!(disk(&file), b"The quick brown fox");

    for _ in 0..3 {
        exec(&mut session, "redo");
    }
    session.flush().unwrap();
    assert_eq!(disk(&file), b"the slow! Brown fox");
}

#[test]
fn test_file_length_never_changes() {
    let file = temp_file(b"abc");
    let mut session = open(&file);
    exec(&mut session, "goto 1 write xyz123");
    session.flush().unwrap();
    assert_eq!(disk(&file), b"axy");
    exec(&mut session, "undo");
    session.flush().unwrap();
    assert_eq!(disk(&file), b"abc");
}

#[test]
fn test_combined_tokens_dump_once_at_final_cursor() {
    let file = temp_file(&[0u8; 64]);
    let mut session = open(&file);
    let out = exec(&mut session, "goto 1A write hi");
    assert_eq!(session.cursor(), 0x1A);
    assert!(out.starts_with("0000001A: 68 69 00 "));
    assert_eq!(out.lines().count(), 3);
}

#[test]
fn test_five_byte_file_dump() {
    let file = temp_file(b"12345");
    let mut session = open(&file);
    let out = exec(&mut session, "");
    assert_eq!(
        out,
        format!("00000000: 31 32 33 34 35 {}| 12345\n", "   ".repeat(11))
    );
}

#[test]
fn test_redirect_writes_to_file_only() {
    let file = temp_file(b"redirected");
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("out.txt");
    let mut session = open(&file);

    let console = exec(&mut session, &format!(">> {}", target.display()));
    assert!(console.is_empty());
    let written = std::fs::read_to_string(&target).unwrap();
    assert!(written.starts_with("00000000: 72 65 64 "));

    // 次の行はコンソールに戻る
    let console = exec(&mut session, "");
    assert!(console.starts_with("00000000: "));
}

#[test]
fn test_redirect_to_unwritable_path_falls_back_to_console() {
    let file = temp_file(b"x");
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("missing").join("out.txt");
    let mut session = open(&file);
    let console = exec(&mut session, &format!("dump >> {}", target.display()));
    assert!(console.starts_with("00000000: 78 "));
}

#[test]
fn test_clear_redo_policy() {
    let file = temp_file(b"0000");
    let mut session = Session::new(FileStore::open(file.path()).unwrap())
        .with_transform(ByteTransform::new(false))
        .with_redo_policy(RedoPolicy::ClearOnEdit);
    exec(&mut session, "put a");
    exec(&mut session, "undo");
    exec(&mut session, "goto 2 put b");
    exec(&mut session, "redo");
    session.flush().unwrap();
    assert_eq!(disk(&file), b"00b0");
}

#[test]
fn test_repl_quit_keeps_changes() {
    let file = temp_file(b"hello");
    let mut session = open(&file);
    let input = b"put j\nq\ny\n";
    let mut out = Vec::new();
    run_session(&mut session, &input[..], &mut out).unwrap();
    session.flush().unwrap();
    assert_eq!(disk(&file), b"jello");

    let transcript = String::from_utf8_lossy(&out);
    assert!(transcript.starts_with("00000000: 68 65 6C 6C 6F "));
    assert!(transcript.contains("Are you sure you want to keep the changes? [Y/N] "));
}

#[test]
fn test_repl_declined_quit_allows_undoall() {
    let file = temp_file(b"hello");
    let mut session = open(&file);
    let input = b"write HE\nquit\nn\nundoall\nexit\n";
    let mut out = Vec::new();
    run_session(&mut session, &input[..], &mut out).unwrap();
    session.flush().unwrap();
    assert_eq!(disk(&file), b"hello");

    let transcript = String::from_utf8_lossy(&out);
    assert!(transcript.contains("Type undoall to undo all changes"));
}

#[test]
fn test_repl_unmodified_quit_does_not_prompt() {
    let file = temp_file(b"abc");
    let mut session = open(&file);
    let mut out = Vec::new();
    run_session(&mut session, &b"n\np\nq\n"[..], &mut out).unwrap();
    assert!(!String::from_utf8_lossy(&out).contains("[Y/N]"));
}

#[test]
fn test_repl_end_of_input_exits() {
    let file = temp_file(b"abc");
    let mut session = open(&file);
    let mut out = Vec::new();
    run_session(&mut session, &b"put z\n"[..], &mut out).unwrap();
    session.flush().unwrap();
    assert_eq!(disk(&file), b"zbc");
}
