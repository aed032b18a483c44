//! Numbered file handles
//!
//! Handles are small positive integers starting at 1. A closed handle's slot
//! is reused by the next open. Every registry operation holds the registry
//! lock, so slot allocation and release are serialised across threads.

use crate::codec::{self, Width};
use parking_lot::{const_mutex, Mutex};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tessera_core::format::render_real_with;
use tessera_core::{config, ModelError, ModelResult};

/// How an open file may be used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    Read,
    ReadWrite,
}

#[derive(Debug)]
struct FileRecord {
    path: PathBuf,
    binary: bool,
    mode: OpenMode,
    stream: BufReader<File>,
}

impl FileRecord {
    /// Underlying file positioned at the logical stream position
    fn writer(&mut self, handle: u32) -> ModelResult<&mut File> {
        if self.mode != OpenMode::ReadWrite {
            let err = io::Error::new(io::ErrorKind::PermissionDenied, "file is open for reading");
            return Err(ModelError::file_write(handle, &err));
        }
        self.stream
            .seek(SeekFrom::Current(0))
            .map_err(|e| ModelError::file_write(handle, &e))?;
        Ok(self.stream.get_mut())
    }

    fn write_all(&mut self, handle: u32, bytes: &[u8]) -> ModelResult<()> {
        self.writer(handle)?
            .write_all(bytes)
            .map_err(|e| ModelError::file_write(handle, &e))
    }

    /// Up to `n` bytes; fewer at end of file
    fn read_up_to(&mut self, handle: u32, n: usize) -> ModelResult<Vec<u8>> {
        let mut buf = Vec::with_capacity(n);
        (&mut self.stream)
            .take(n as u64)
            .read_to_end(&mut buf)
            .map_err(|e| ModelError::file_read(handle, &e))?;
        Ok(buf)
    }

    fn read_exact_bytes(&mut self, handle: u32, n: usize) -> ModelResult<Vec<u8>> {
        let buf = self.read_up_to(handle, n)?;
        if buf.len() < n {
            return Err(ModelError::file_content(
                handle,
                format!("end of file after {} of {} bytes", buf.len(), n),
            ));
        }
        Ok(buf)
    }

    fn peek(&mut self, handle: u32) -> ModelResult<Option<u8>> {
        let available = self
            .stream
            .fill_buf()
            .map_err(|e| ModelError::file_read(handle, &e))?;
        Ok(available.first().copied())
    }

    fn next_byte(&mut self, handle: u32) -> ModelResult<Option<u8>> {
        let byte = self.peek(handle)?;
        if byte.is_some() {
            self.stream.consume(1);
        }
        Ok(byte)
    }

    /// Whitespace-delimited token, skipping leading whitespace
    fn read_token(&mut self, handle: u32) -> ModelResult<String> {
        while self.peek(handle)?.is_some_and(|b| b.is_ascii_whitespace()) {
            self.stream.consume(1);
        }
        let mut token = Vec::new();
        while let Some(b) = self.peek(handle)? {
            if b.is_ascii_whitespace() {
                break;
            }
            token.push(b);
            self.stream.consume(1);
        }
        if token.is_empty() {
            return Err(ModelError::file_content(handle, "end of file before a number"));
        }
        String::from_utf8(token).map_err(|_| ModelError::file_content(handle, "number is not valid UTF-8"))
    }

    /// Bytes up to the line terminator; `\n`, `\r\n` and `\r` are consumed
    fn read_line_bytes(&mut self, handle: u32) -> ModelResult<Vec<u8>> {
        let mut line = Vec::new();
        while let Some(b) = self.next_byte(handle)? {
            match b {
                b'\n' => break,
                b'\r' => {
                    if self.peek(handle)? == Some(b'\n') {
                        self.stream.consume(1);
                    }
                    break;
                }
                _ => line.push(b),
            }
        }
        Ok(line)
    }

    /// Up to `count` UTF-8 scalars
    fn read_chars(&mut self, handle: u32, count: usize) -> ModelResult<String> {
        let mut out = String::new();
        for _ in 0..count {
            let Some(lead) = self.next_byte(handle)? else { break };
            let width = match lead {
                0x00..=0x7F => 1,
                0xC0..=0xDF => 2,
                0xE0..=0xEF => 3,
                0xF0..=0xF7 => 4,
                _ => return Err(ModelError::file_content(handle, "invalid UTF-8 lead byte")),
            };
            let mut bytes = vec![lead];
            bytes.extend(self.read_exact_bytes(handle, width - 1)?);
            let text = std::str::from_utf8(&bytes)
                .map_err(|_| ModelError::file_content(handle, "invalid UTF-8 sequence"))?;
            out.push_str(text);
        }
        Ok(out)
    }
}

fn utf8(handle: u32, bytes: Vec<u8>) -> ModelResult<String> {
    String::from_utf8(bytes).map_err(|_| ModelError::file_content(handle, "text is not valid UTF-8"))
}

fn latin1(bytes: Vec<u8>) -> String {
    bytes.into_iter().map(char::from).collect()
}

/// Registry of open files keyed by 1-based handle
#[derive(Debug)]
pub struct FileRegistry {
    slots: Mutex<Vec<Option<FileRecord>>>,
}

static GLOBAL: FileRegistry = FileRegistry::new();

impl Default for FileRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FileRegistry {
    pub const fn new() -> Self {
        Self {
            slots: const_mutex(Vec::new()),
        }
    }

    /// The process-wide registry
    pub fn global() -> &'static FileRegistry {
        &GLOBAL
    }

    // ========================================================================
    // Opening and closing
    // ========================================================================

    fn register(&self, path: &Path, binary: bool, mode: OpenMode, file: File) -> u32 {
        let record = FileRecord {
            path: path.to_path_buf(),
            binary,
            mode,
            stream: BufReader::new(file),
        };
        let mut slots = self.slots.lock();
        let index = match slots.iter().position(Option::is_none) {
            Some(free) => {
                slots[free] = Some(record);
                free
            }
            None => {
                slots.push(Some(record));
                slots.len() - 1
            }
        };
        let handle = index as u32 + 1;
        tracing::debug!(handle, path = %path.display(), ?mode, binary, "allocated file slot");
        handle
    }

    fn open_with(&self, path: &Path, binary: bool, mode: OpenMode, options: &OpenOptions) -> ModelResult<u32> {
        let file = options.open(path).map_err(|e| ModelError::file_open(path, &e))?;
        Ok(self.register(path, binary, mode, file))
    }

    pub fn try_open_read(&self, path: impl AsRef<Path>, binary: bool) -> ModelResult<u32> {
        self.open_with(path.as_ref(), binary, OpenMode::Read, OpenOptions::new().read(true))
    }

    pub fn try_open_write_truncate(&self, path: impl AsRef<Path>, binary: bool) -> ModelResult<u32> {
        let mut options = OpenOptions::new();
        options.read(true).write(true).create(true).truncate(true);
        self.open_with(path.as_ref(), binary, OpenMode::ReadWrite, &options)
    }

    pub fn try_open_write_append(&self, path: impl AsRef<Path>, binary: bool) -> ModelResult<u32> {
        let mut options = OpenOptions::new();
        options.read(true).append(true).create(true);
        self.open_with(path.as_ref(), binary, OpenMode::ReadWrite, &options)
    }

    fn handle_or_zero(result: ModelResult<u32>) -> u32 {
        result.unwrap_or_else(|err| {
            tracing::debug!(error = %err, "open failed");
            0
        })
    }

    /// Open for reading; 0 when the file cannot be opened
    pub fn open_read(&self, path: impl AsRef<Path>, binary: bool) -> u32 {
        Self::handle_or_zero(self.try_open_read(path, binary))
    }

    /// Create or truncate for writing; 0 on failure
    pub fn open_write_truncate(&self, path: impl AsRef<Path>, binary: bool) -> u32 {
        Self::handle_or_zero(self.try_open_write_truncate(path, binary))
    }

    /// Create or open for appending; 0 on failure
    pub fn open_write_append(&self, path: impl AsRef<Path>, binary: bool) -> u32 {
        Self::handle_or_zero(self.try_open_write_append(path, binary))
    }

    pub fn exists(path: impl AsRef<Path>) -> bool {
        path.as_ref().exists()
    }

    fn take(&self, handle: u32) -> ModelResult<FileRecord> {
        let mut slots = self.slots.lock();
        let slot = handle
            .checked_sub(1)
            .and_then(|i| slots.get_mut(i as usize))
            .ok_or(ModelError::InvalidFileNumber { handle })?;
        let record = slot.take().ok_or(ModelError::InvalidFileNumber { handle })?;
        while slots.last().is_some_and(Option::is_none) {
            slots.pop();
        }
        tracing::debug!(handle, path = %record.path.display(), "released file slot");
        Ok(record)
    }

    pub fn close(&self, handle: u32) -> ModelResult<()> {
        let mut record = self.take(handle)?;
        if record.mode == OpenMode::ReadWrite {
            record
                .stream
                .get_mut()
                .flush()
                .map_err(|e| ModelError::file_close(handle, &e))?;
        }
        Ok(())
    }

    /// Remove a file from the filesystem, closing any handle open on it
    pub fn delete(&self, path: impl AsRef<Path>) -> ModelResult<()> {
        let path = path.as_ref();
        let open: Vec<u32> = {
            let slots = self.slots.lock();
            slots
                .iter()
                .enumerate()
                .filter(|(_, slot)| slot.as_ref().is_some_and(|r| r.path == path))
                .map(|(i, _)| i as u32 + 1)
                .collect()
        };
        for handle in open {
            self.close(handle)?;
        }
        fs::remove_file(path).map_err(|e| ModelError::file_write(path, &e))?;
        tracing::debug!(path = %path.display(), "deleted file");
        Ok(())
    }

    /// Close `handle` and remove its file
    pub fn delete_handle(&self, handle: u32) -> ModelResult<()> {
        let path = self.path_of(handle).ok_or(ModelError::InvalidFileNumber { handle })?;
        self.delete(path)
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    pub fn open_handle_count(&self) -> usize {
        self.slots.lock().iter().flatten().count()
    }

    pub fn path_of(&self, handle: u32) -> Option<PathBuf> {
        self.inspect(handle, |r| r.path.clone())
    }

    pub fn is_binary(&self, handle: u32) -> Option<bool> {
        self.inspect(handle, |r| r.binary)
    }

    pub fn open_mode(&self, handle: u32) -> Option<OpenMode> {
        self.inspect(handle, |r| r.mode)
    }

    fn inspect<R>(&self, handle: u32, f: impl FnOnce(&FileRecord) -> R) -> Option<R> {
        let slots = self.slots.lock();
        let index = handle.checked_sub(1)? as usize;
        slots.get(index)?.as_ref().map(f)
    }

    fn with_record<R>(&self, handle: u32, f: impl FnOnce(&mut FileRecord) -> ModelResult<R>) -> ModelResult<R> {
        let mut slots = self.slots.lock();
        let record = handle
            .checked_sub(1)
            .and_then(|i| slots.get_mut(i as usize))
            .and_then(Option::as_mut)
            .ok_or(ModelError::InvalidFileNumber { handle })?;
        f(record)
    }

    // ========================================================================
    // Positioning, bytes and strings
    // ========================================================================

    /// Move to `offset` bytes from the start of the file
    pub fn seek(&self, handle: u32, offset: u64) -> ModelResult<()> {
        self.with_record(handle, |r| {
            r.stream
                .seek(SeekFrom::Start(offset))
                .map(|_| ())
                .map_err(|e| ModelError::file_seek(handle, &e))
        })
    }

    /// Next byte, or `None` at end of file
    pub fn read_byte(&self, handle: u32) -> ModelResult<Option<u8>> {
        self.with_record(handle, |r| r.next_byte(handle))
    }

    pub fn write_byte(&self, handle: u32, value: i64) -> ModelResult<()> {
        let byte = u8::try_from(value)
            .map_err(|_| ModelError::parameter("value", format!("{} is not a byte (0…255)", value)))?;
        self.with_record(handle, |r| r.write_all(handle, &[byte]))
    }

    /// Read text.
    ///
    /// `length == 0` reads one line without its terminator, `length < 0`
    /// reads the rest of the file, and `length > 0` reads that many
    /// characters (UTF-8 scalars when `utf8`, single bytes otherwise).
    /// Fewer characters are returned at end of file.
    pub fn read_string(&self, handle: u32, length: i64, utf8: bool) -> ModelResult<String> {
        self.with_record(handle, |r| {
            let decode = |bytes: Vec<u8>| if utf8 { self::utf8(handle, bytes) } else { Ok(latin1(bytes)) };
            match length {
                0 => decode(r.read_line_bytes(handle)?),
                n if n < 0 => {
                    let mut rest = Vec::new();
                    r.stream
                        .read_to_end(&mut rest)
                        .map_err(|e| ModelError::file_read(handle, &e))?;
                    decode(rest)
                }
                n if utf8 => r.read_chars(handle, n as usize),
                n => Ok(latin1(r.read_up_to(handle, n as usize)?)),
            }
        })
    }

    /// Write text as UTF-8, without a terminator
    pub fn write_string(&self, handle: u32, text: &str) -> ModelResult<()> {
        self.with_record(handle, |r| r.write_all(handle, text.as_bytes()))
    }

    // ========================================================================
    // Typed numbers
    // ========================================================================

    pub fn read_integer(&self, handle: u32, width: i32) -> ModelResult<i64> {
        let width = codec::integer_width(width)?;
        self.with_record(handle, |r| match width {
            Width::Text => {
                let token = r.read_token(handle)?;
                codec::parse_integer_text(&token)
                    .ok_or_else(|| ModelError::file_content(handle, format!("'{}' is not an integer", token)))
            }
            Width::Binary { bytes, little_endian } => {
                let raw = r.read_exact_bytes(handle, bytes)?;
                Ok(codec::decode_integer(&raw, little_endian))
            }
        })
    }

    /// Write an integer; binary widths fail when `value` does not fit
    pub fn write_integer(&self, handle: u32, value: i64, width: i32) -> ModelResult<()> {
        let bytes = match codec::integer_width(width)? {
            Width::Text => value.to_string().into_bytes(),
            Width::Binary { bytes, little_endian } => codec::encode_integer(value, bytes, little_endian)?,
        };
        self.with_record(handle, |r| r.write_all(handle, &bytes))
    }

    pub fn read_real(&self, handle: u32, width: i32) -> ModelResult<f64> {
        let width = codec::real_width(width)?;
        self.with_record(handle, |r| match width {
            Width::Text => {
                let token = r.read_token(handle)?;
                token
                    .parse::<f64>()
                    .map_err(|_| ModelError::file_content(handle, format!("'{}' is not a real", token)))
            }
            Width::Binary { bytes, little_endian } => {
                let raw = r.read_exact_bytes(handle, bytes)?;
                Ok(codec::decode_real(&raw, little_endian))
            }
        })
    }

    pub fn write_real(&self, handle: u32, value: f64, width: i32) -> ModelResult<()> {
        let bytes = match codec::real_width(width)? {
            Width::Text => render_real_with(value, config::current().significant_digits).into_bytes(),
            Width::Binary { bytes, little_endian } => codec::encode_real(value, bytes, little_endian),
        };
        self.with_record(handle, |r| r.write_all(handle, &bytes))
    }
}
