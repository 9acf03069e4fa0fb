//! Output sinks for reports and usage text.

use std::cell::RefCell;
use std::fmt;
use std::io::{self, Write};
use std::rc::Rc;

/// Where a [`Parser`](crate::Parser) writes diagnostics and usage text.
///
/// Defaults to standard error.
#[derive(Default)]
pub enum Output {
    /// Process standard error.
    #[default]
    Stderr,
    /// Process standard output.
    Stdout,
    /// In-memory buffer shared with the caller.
    Buffer(SharedBuffer),
    /// Any other writer.
    Writer(Box<dyn Write>),
    /// Drop everything.
    Discard,
}

impl Output {
    /// Wraps an arbitrary writer.
    pub fn writer(w: impl Write + 'static) -> Self {
        Self::Writer(Box::new(w))
    }
}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stderr => f.write_str("Stderr"),
            Self::Stdout => f.write_str("Stdout"),
            Self::Buffer(buf) => f.debug_tuple("Buffer").field(buf).finish(),
            Self::Writer(_) => f.write_str("Writer(..)"),
            Self::Discard => f.write_str("Discard"),
        }
    }
}

impl From<SharedBuffer> for Output {
    fn from(buf: SharedBuffer) -> Self {
        Self::Buffer(buf)
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Stderr => io::stderr().write(buf),
            Self::Stdout => io::stdout().write(buf),
            Self::Buffer(b) => b.write(buf),
            Self::Writer(w) => w.write(buf),
            Self::Discard => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Stderr => io::stderr().flush(),
            Self::Stdout => io::stdout().flush(),
            Self::Buffer(b) => b.flush(),
            Self::Writer(w) => w.flush(),
            Self::Discard => Ok(()),
        }
    }
}

/// Cloneable in-memory writer; every clone appends to the same bytes.
///
/// # Examples
///
/// ```
/// use std::io::Write;
/// use flagx::SharedBuffer;
///
/// let buf = SharedBuffer::new();
/// let mut writer = buf.clone();
/// writeln!(writer, "hello").unwrap();
/// assert_eq!(buf.contents(), "hello\n");
/// ```
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded as UTF-8.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }

    /// Whether nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Discards everything written so far.
    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

impl io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
