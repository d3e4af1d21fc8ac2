// Random-access byte sources consumed by the differ and the line projector.
//
// - `MemorySource`: any in-memory buffer
// - `ReaderSource`: any `Read + Seek` (files), with a windowed read cache
// - `ForwardOnly`: a sequential reader that reports no seek support

use std::io::{self, Read, Seek, SeekFrom};

/// Size of the read window cached by `ReaderSource`.
pub const WINDOW_SIZE: usize = 64 * 1024; // 64 KiB

// ---------------------------------------------------------------------------
// ByteSource trait
// ---------------------------------------------------------------------------

/// A byte stream with absolute seeking, single-byte reads and a known length.
pub trait ByteSource {
    /// Whether `seek` is supported. The differ rejects sources that return
    /// `false` before scanning.
    fn can_seek(&self) -> bool {
        true
    }

    /// Total length in bytes.
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Move the read cursor to absolute offset `pos`.
    fn seek(&mut self, pos: u64) -> io::Result<()>;

    /// Read the byte under the cursor and advance. `Ok(None)` at end of stream.
    fn read_byte(&mut self) -> io::Result<Option<u8>>;

    /// Read the byte at `pos`, or `None` past the end.
    fn byte_at(&mut self, pos: u64) -> io::Result<Option<u8>> {
        self.seek(pos)?;
        self.read_byte()
    }

    /// Fill `buf` from `pos`, returning the number of bytes read
    /// (short only at end of stream).
    fn read_at(&mut self, pos: u64, buf: &mut [u8]) -> io::Result<usize> {
        self.seek(pos)?;
        let mut n = 0;
        while n < buf.len() {
            match self.read_byte()? {
                Some(b) => {
                    buf[n] = b;
                    n += 1;
                }
                None => break,
            }
        }
        Ok(n)
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn can_seek(&self) -> bool {
        (**self).can_seek()
    }

    fn len(&self) -> u64 {
        (**self).len()
    }

    fn seek(&mut self, pos: u64) -> io::Result<()> {
        (**self).seek(pos)
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        (**self).read_byte()
    }

    fn byte_at(&mut self, pos: u64) -> io::Result<Option<u8>> {
        (**self).byte_at(pos)
    }

    fn read_at(&mut self, pos: u64, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read_at(pos, buf)
    }
}

/// Read the byte at `pos`, treating end of stream as an error.
///
/// Used where the caller has already bounds-checked `pos` against `len()`.
#[inline]
pub(crate) fn byte_in_bounds<S: ByteSource + ?Sized>(src: &mut S, pos: u64) -> io::Result<u8> {
    src.byte_at(pos)?.ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("byte source ended before offset {pos}"),
        )
    })
}

/// Read exactly `len` bytes starting at `pos`.
pub(crate) fn read_range<S: ByteSource + ?Sized>(
    src: &mut S,
    pos: u64,
    len: usize,
) -> io::Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    let n = src.read_at(pos, &mut buf)?;
    if n < len {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("expected {len} bytes at offset {pos}, got {n}"),
        ));
    }
    Ok(buf)
}

// ---------------------------------------------------------------------------
// MemorySource
// ---------------------------------------------------------------------------

/// A byte source over an in-memory buffer (`&[u8]`, `Vec<u8>`, ...).
#[derive(Debug, Clone)]
pub struct MemorySource<T: AsRef<[u8]>> {
    data: T,
    pos: u64,
}

impl<T: AsRef<[u8]>> MemorySource<T> {
    pub fn new(data: T) -> Self {
        Self { data, pos: 0 }
    }

    pub fn into_inner(self) -> T {
        self.data
    }
}

impl<T: AsRef<[u8]>> ByteSource for MemorySource<T> {
    fn len(&self) -> u64 {
        self.data.as_ref().len() as u64
    }

    fn seek(&mut self, pos: u64) -> io::Result<()> {
        self.pos = pos;
        Ok(())
    }

    #[inline]
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let b = usize::try_from(self.pos)
            .ok()
            .and_then(|p| self.data.as_ref().get(p).copied());
        if b.is_some() {
            self.pos += 1;
        }
        Ok(b)
    }

    #[inline]
    fn byte_at(&mut self, pos: u64) -> io::Result<Option<u8>> {
        self.pos = pos;
        self.read_byte()
    }

    fn read_at(&mut self, pos: u64, buf: &mut [u8]) -> io::Result<usize> {
        let data = self.data.as_ref();
        let start = usize::try_from(pos).unwrap_or(usize::MAX).min(data.len());
        let n = buf.len().min(data.len() - start);
        buf[..n].copy_from_slice(&data[start..start + n]);
        self.pos = (start + n) as u64;
        Ok(n)
    }
}

// ---------------------------------------------------------------------------
// ReaderSource
// ---------------------------------------------------------------------------

/// A byte source over any `Read + Seek`, caching one window of data so that
/// the differ's byte-at-a-time access does not turn into a syscall per byte.
pub struct ReaderSource<R: Read + Seek> {
    inner: R,
    len: u64,
    pos: u64,
    window: Vec<u8>,
    window_start: u64,
    window_capacity: usize,
}

impl<R: Read + Seek> ReaderSource<R> {
    /// Wrap `inner`, measuring its length by seeking to the end.
    pub fn new(inner: R) -> io::Result<Self> {
        Self::with_window(inner, WINDOW_SIZE)
    }

    /// Wrap `inner` with a read window of `window_capacity` bytes.
    pub fn with_window(mut inner: R, window_capacity: usize) -> io::Result<Self> {
        let len = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(0))?;
        Ok(Self {
            inner,
            len,
            pos: 0,
            window: Vec::with_capacity(window_capacity.max(1)),
            window_start: 0,
            window_capacity: window_capacity.max(1),
        })
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    fn window_contains(&self, pos: u64) -> bool {
        pos >= self.window_start && pos < self.window_start + self.window.len() as u64
    }

    fn fill_window(&mut self, pos: u64) -> io::Result<()> {
        self.inner.seek(SeekFrom::Start(pos))?;
        let want = (self.len - pos).min(self.window_capacity as u64) as usize;
        self.window.resize(want, 0);
        self.inner.read_exact(&mut self.window)?;
        self.window_start = pos;
        Ok(())
    }
}

impl<R: Read + Seek> ByteSource for ReaderSource<R> {
    fn len(&self) -> u64 {
        self.len
    }

    fn seek(&mut self, pos: u64) -> io::Result<()> {
        self.pos = pos;
        Ok(())
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        if self.pos >= self.len {
            return Ok(None);
        }
        if !self.window_contains(self.pos) {
            self.fill_window(self.pos)?;
        }
        let b = self.window[(self.pos - self.window_start) as usize];
        self.pos += 1;
        Ok(Some(b))
    }
}

// ---------------------------------------------------------------------------
// ForwardOnly
// ---------------------------------------------------------------------------

/// A sequential reader (pipe, socket, stdin) of known length.
///
/// Reports `can_seek() == false`; the differ refuses it up front.
pub struct ForwardOnly<R: Read> {
    inner: R,
    len: u64,
    pos: u64,
}

impl<R: Read> ForwardOnly<R> {
    pub fn new(inner: R, len: u64) -> Self {
        Self { inner, len, pos: 0 }
    }
}

impl<R: Read> ByteSource for ForwardOnly<R> {
    fn can_seek(&self) -> bool {
        false
    }

    fn len(&self) -> u64 {
        self.len
    }

    fn seek(&mut self, pos: u64) -> io::Result<()> {
        if pos == self.pos {
            return Ok(());
        }
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "source does not support seeking",
        ))
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut b = [0u8; 1];
        match self.inner.read(&mut b)? {
            0 => Ok(None),
            _ => {
                self.pos += 1;
                Ok(Some(b[0]))
            }
        }
    }
}
