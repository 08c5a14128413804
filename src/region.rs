use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// A region of instructions
pub trait Region {
  fn instructions(&self) -> &[u8];
}

/// A `Chunk` is a program image, copied into memory from address zero before
/// the machine starts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chunk {
  instructions: Vec<u8>,
}

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
  #[error("could not read `{}`", .path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("line {line}: `{text}` is not an 8-digit binary byte")]
  InvalidByte { line: usize, text: String },
}

impl Chunk {
  /// Read and parse a program image from disk.
  pub fn open(path: impl AsRef<Path>) -> Result<Self, LoadError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| LoadError::Io {
      path: path.to_path_buf(),
      source,
    })?;
    let chunk: Self = source.parse()?;
    log::debug!("read {} bytes from {}", chunk.len(), path.display());
    Ok(chunk)
  }

  pub fn len(&self) -> usize {
    self.instructions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.instructions.is_empty()
  }
}

/// One byte per line, written as eight binary digits. Everything after a `#`
/// is a comment, and lines left blank once that is stripped are skipped
/// without taking up an address.
///
/// ```text
/// 10000010 # LDI R0,8
/// 00000000
/// 00001000
///
/// 01000111 # PRN R0
/// 00000000
/// 00000001 # HLT
/// ```
impl FromStr for Chunk {
  type Err = LoadError;

  fn from_str(source: &str) -> Result<Self, Self::Err> {
    let mut instructions = Vec::new();
    for (index, line) in source.lines().enumerate() {
      let code = line.split_once('#').map_or(line, |(code, _)| code).trim();
      if code.is_empty() {
        continue;
      }
      let byte = parse_byte(code).ok_or_else(|| LoadError::InvalidByte {
        line: index + 1,
        text: code.to_owned(),
      })?;
      instructions.push(byte);
    }
    Ok(Self { instructions })
  }
}

fn parse_byte(code: &str) -> Option<u8> {
  if code.len() != 8 || !code.bytes().all(|b| b == b'0' || b == b'1') {
    return None;
  }
  u8::from_str_radix(code, 2).ok()
}

impl From<Vec<u8>> for Chunk {
  fn from(instructions: Vec<u8>) -> Self {
    Self { instructions }
  }
}

impl Region for Chunk {
  fn instructions(&self) -> &[u8] {
    &self.instructions
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_program() {
    let source = "\
# print8.ls8
10000010 # LDI R0,8
00000000
00001000

01000111 # PRN R0
00000000
00000001 # HLT
";
    let chunk: Chunk = source.parse().unwrap();
    assert_eq!(
      chunk.instructions(),
      &[0b1000_0010, 0, 8, 0b0100_0111, 0, 1]
    );
  }

  #[test]
  fn surrounding_whitespace() {
    let chunk: Chunk = "   10100010   \n\t00000011\t# three\r\n".parse().unwrap();
    assert_eq!(chunk.instructions(), &[0b1010_0010, 3]);
  }

  #[test]
  fn comment_only_source_is_empty() {
    let chunk: Chunk = "# nothing here\n\n   # still nothing\n".parse().unwrap();
    assert!(chunk.is_empty());
  }

  #[test]
  fn reject_non_binary() {
    let err = "00000001\n1000001x\n".parse::<Chunk>().unwrap_err();
    match err {
      LoadError::InvalidByte { line, text } => {
        assert_eq!(line, 2);
        assert_eq!(text, "1000001x");
      }
      other => panic!("unexpected error: {other:?}"),
    }
  }

  #[test]
  fn reject_wrong_width() {
    assert!("1010".parse::<Chunk>().is_err());
    assert!("000000001".parse::<Chunk>().is_err());
    assert!("+0000001".parse::<Chunk>().is_err());
  }

  #[test]
  fn open_missing_file_names_path() {
    let err = Chunk::open("/definitely/not/here.ls8").unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }));
    assert!(err.to_string().contains("/definitely/not/here.ls8"));
  }
}
