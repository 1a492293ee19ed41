use crate::error::RekeyError;
use serde::Serialize;
use serde_json::ser::{Formatter, PrettyFormatter, Serializer};
use serde_json::{Map, Value};
use std::fs::OpenOptions;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

pub const SOURCE_KEY: &str = "with";
pub const TARGET_KEY: &str = "expected";

const INDENT: &[u8] = b"    ";

/// Moves the value stored under `from` to `to` and removes `from`.
///
/// The new key takes the position of the old one. When `to` already exists
/// its value is replaced where it stands. Returns `false` and leaves the
/// document alone if it is not an object or has no `from` key.
#[must_use]
pub fn rename_key(document: &mut Value, from: &str, to: &str) -> bool {
    let Value::Object(map) = document else {
        return false;
    };

    if !map.contains_key(from) {
        return false;
    }

    let has_target = map.contains_key(to);
    let mut renamed = Map::with_capacity(map.len());
    let mut moved = Value::Null;

    for (key, value) in std::mem::take(map) {
        if key == from {
            moved = value;
            if !has_target {
                renamed.insert(to.to_string(), Value::Null);
            }
        } else {
            renamed.insert(key, value);
        }
    }

    renamed.insert(to.to_string(), moved);
    *map = renamed;

    true
}

/// Pretty printer that writes every non-ASCII character as a `\uXXXX` escape,
/// using a surrogate pair above U+FFFF.
struct AsciiFormatter<'a> {
    inner: PrettyFormatter<'a>,
}

impl<'a> AsciiFormatter<'a> {
    fn with_indent(indent: &'a [u8]) -> Self {
        Self {
            inner: PrettyFormatter::with_indent(indent),
        }
    }
}

impl Formatter for AsciiFormatter<'_> {
    fn begin_array<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_array(writer)
    }

    fn end_array<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        self.inner.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_object(writer)
    }

    fn end_object<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        self.inner.begin_object_key(writer, first)
    }

    fn begin_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object_value(writer)
    }

    fn write_string_fragment<W: ?Sized + Write>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()> {
        let mut start = 0;

        for (index, ch) in fragment.char_indices() {
            if ch.is_ascii() {
                continue;
            }

            writer.write_all(fragment[start..index].as_bytes())?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            start = index + ch.len_utf8();
        }

        writer.write_all(fragment[start..].as_bytes())
    }
}

/// Serializes a document with 4-space indentation, ASCII-only output and no
/// trailing newline.
pub fn render(document: &Value) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, AsciiFormatter::with_indent(INDENT));
    document.serialize(&mut serializer)?;
    Ok(buf)
}

/// Rewrites the file at `path` in place, renaming `with` to `expected`.
///
/// The handle is dropped on every return path, including parse and lookup
/// failures. The file is truncated to the new length after writing.
pub fn rename_key_in_file(path: &Path) -> Result<(), RekeyError> {
    let metadata = std::fs::metadata(path).map_err(|e| RekeyError::io(path, e))?;
    if !metadata.is_file() {
        return Err(RekeyError::NotAFile {
            path: path.to_path_buf(),
        });
    }

    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .map_err(|e| RekeyError::io(path, e))?;

    let mut contents = Vec::new();
    file.read_to_end(&mut contents)
        .map_err(|e| RekeyError::io(path, e))?;

    let mut document: Value =
        serde_json::from_slice(&contents).map_err(|source| RekeyError::InvalidJson {
            path: path.to_path_buf(),
            source,
        })?;

    if !rename_key(&mut document, SOURCE_KEY, TARGET_KEY) {
        return Err(RekeyError::MissingKey {
            path: path.to_path_buf(),
            key: SOURCE_KEY.to_string(),
        });
    }

    let rendered = render(&document).map_err(|e| RekeyError::io(path, e.into()))?;

    file.seek(SeekFrom::Start(0))
        .map_err(|e| RekeyError::io(path, e))?;
    file.write_all(&rendered)
        .map_err(|e| RekeyError::io(path, e))?;
    file.set_len(rendered.len() as u64)
        .map_err(|e| RekeyError::io(path, e))?;
    file.flush().map_err(|e| RekeyError::io(path, e))?;

    Ok(())
}
