mod hex_view;

pub use hex_view::{dump_all, dump_block, HexView, BLOCK_SIZE, BYTES_PER_ROW};

/// コマンド一覧
pub const HELP_TEXT: &str = "\
Available commands:
  ENTER : dump the 256 bytes at the current address
  u : scroll up (address - 256)
  d : scroll down (address + 256)
  n : next address
  p : previous address
  goto <addr> : go to an address given in hexadecimal
  find <string> : find a string from the next address on
  dump : dump the whole file
  puthex <hex> : set the byte at the current address to <hex>
  put, putchar <char> : set the byte at the current address to <char>
  write <string> : overwrite the current and following addresses with <string>
  undo : undo the last write or put
  undoall : undo all changes
  redo : redo the last undone change
  redoall : redo all undone changes
  endianness : show the byte order of this machine
  little : treat the file as little-endian
  big : treat the file as big-endian
  >> <file> : send the output of this command to <file>
  q, quit, exit : leave the editor
";
