//! Media sources and container opening.
//!
//! [`MediaSource`] names where the bytes come from: a filesystem path / URL,
//! or an in-memory byte span. [`open`] turns either into an FFmpeg input
//! context with stream info populated, enforcing a protocol allow-list on
//! both paths so untrusted input cannot invoke arbitrary protocol handlers.
//!
//! The in-memory case routes through FFmpeg's custom pull-based I/O: a
//! [`ByteReader`] tracks a cursor over the caller's span, and a C callback
//! hands chunks to the demuxer on demand. The AVIO context and its buffer
//! are freed by a guard after the container closes — with
//! `AVFMT_FLAG_CUSTOM_IO` set, `avformat_close_input` leaves them to us.

use std::{
    ffi::{CStr, CString},
    marker::PhantomData,
    os::raw::{c_int, c_void},
    path::{Path, PathBuf},
    ptr,
    sync::Once,
};

use ffmpeg_next::format::context::Input;
use ffmpeg_sys_next as ffi;

use crate::{
    error::FramegrabError,
    ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level},
};

/// Default size of the intermediate buffer FFmpeg uses to pull from an
/// in-memory source.
pub const DEFAULT_IO_BUFFER_SIZE: usize = 64 * 1024;

/// Protocols the demuxer may open. Anything else (concat, pipe, crypto
/// handlers, ...) is rejected at open time.
const PROTOCOL_ALLOW_LIST: &CStr = c"file,http,https,tcp,tls,subfile";

/// Where the media bytes come from.
///
/// Exactly one source is active per call. A byte span is caller-owned and
/// read-only; `framegrab` never copies or mutates it, only reads through it
/// while the call runs.
///
/// # Example
///
/// ```no_run
/// use framegrab::MediaSource;
///
/// let from_disk = MediaSource::path("clip.mp4");
///
/// let blob = std::fs::read("clip.mp4").unwrap();
/// let from_memory = MediaSource::bytes(&blob);
/// ```
#[derive(Debug, Clone)]
pub enum MediaSource<'a> {
    /// A filesystem path or URL, opened by name.
    Path(PathBuf),
    /// An in-memory media file, demuxed through custom I/O.
    Bytes(&'a [u8]),
}

impl<'a> MediaSource<'a> {
    /// Source backed by a filesystem path or URL.
    pub fn path(path: impl Into<PathBuf>) -> Self {
        MediaSource::Path(path.into())
    }

    /// Source backed by an in-memory byte span.
    pub fn bytes(data: &'a [u8]) -> Self {
        MediaSource::Bytes(data)
    }

    /// Human-readable description used in error messages.
    pub(crate) fn describe(&self) -> String {
        match self {
            MediaSource::Path(path) => path.display().to_string(),
            MediaSource::Bytes(data) => format!("<memory:{} bytes>", data.len()),
        }
    }
}

/// Cursor over an in-memory source span.
///
/// Each read copies `min(requested, remaining)` bytes and advances; once the
/// span is exhausted every further read copies nothing. The raw-pointer form
/// is what the C callback needs; the span it walks is pinned by the lifetime
/// on [`MemoryIo`].
pub(crate) struct ByteReader {
    cursor: *const u8,
    remaining: usize,
}

impl ByteReader {
    pub(crate) fn new(data: &[u8]) -> Self {
        Self {
            cursor: data.as_ptr(),
            remaining: data.len(),
        }
    }

    /// Copy up to `dst.len()` bytes into `dst`, returning how many were
    /// copied. Returns 0 once the source span is exhausted.
    pub(crate) fn read(&mut self, dst: &mut [u8]) -> usize {
        let count = dst.len().min(self.remaining);
        if count > 0 {
            unsafe {
                ptr::copy_nonoverlapping(self.cursor, dst.as_mut_ptr(), count);
                self.cursor = self.cursor.add(count);
            }
            self.remaining -= count;
        }
        count
    }
}

/// Pull callback handed to `avio_alloc_context`.
///
/// `opaque` is the boxed [`ByteReader`] owned by [`MemoryIo`], which outlives
/// the demuxer that calls us.
unsafe extern "C" fn read_source_bytes(opaque: *mut c_void, buf: *mut u8, buf_size: c_int) -> c_int {
    if buf_size <= 0 {
        return 0;
    }
    let reader = unsafe { &mut *opaque.cast::<ByteReader>() };
    let dst = unsafe { std::slice::from_raw_parts_mut(buf, buf_size as usize) };
    match reader.read(dst) {
        0 => ffi::AVERROR_EOF,
        count => count as c_int,
    }
}

/// Owns the custom AVIO context for an in-memory source.
///
/// Dropped after the `Input` it serves: `avformat_close_input` does not free
/// a custom I/O context, so the buffer and context are released here.
struct MemoryIo<'a> {
    avio: *mut ffi::AVIOContext,
    _reader: Box<ByteReader>,
    _span: PhantomData<&'a [u8]>,
}

impl Drop for MemoryIo<'_> {
    fn drop(&mut self) {
        unsafe {
            if !self.avio.is_null() {
                ffi::av_freep(ptr::addr_of_mut!((*self.avio).buffer).cast::<c_void>());
                ffi::avio_context_free(&mut self.avio);
            }
        }
    }
}

/// An opened container plus whatever keeps its I/O alive.
///
/// Field order is load-bearing: `input` must drop (closing the container)
/// before the memory I/O guard frees the AVIO context it points at.
pub(crate) struct OpenedInput<'a> {
    pub(crate) input: Input,
    _io: Option<MemoryIo<'a>>,
}

/// Open a media source and probe its stream structure.
///
/// `io_buffer_size` is only consulted for byte-span sources; 0 selects
/// [`DEFAULT_IO_BUFFER_SIZE`].
pub(crate) fn open<'a>(
    source: &MediaSource<'a>,
    io_buffer_size: usize,
) -> Result<OpenedInput<'a>, FramegrabError> {
    ffmpeg_next::init().map_err(|error| FramegrabError::Open {
        source_name: source.describe(),
        reason: format!("FFmpeg initialisation failed: {error}"),
    })?;
    quiet_ffmpeg_once();

    log::debug!("Opening media source {}", source.describe());

    match source {
        MediaSource::Path(path) => Ok(OpenedInput {
            input: open_path(path)?,
            _io: None,
        }),
        MediaSource::Bytes(data) => open_bytes(data, io_buffer_size),
    }
}

/// FFmpeg's default console verbosity drowns real diagnostics during bulk
/// extraction; quiet it once per process. Callers can re-raise it through
/// [`set_ffmpeg_log_level`](crate::set_ffmpeg_log_level).
fn quiet_ffmpeg_once() {
    static QUIET: Once = Once::new();
    QUIET.call_once(|| set_ffmpeg_log_level(FfmpegLogLevel::Quiet));
}

fn open_path(path: &Path) -> Result<Input, FramegrabError> {
    let source_name = path.display().to_string();
    let name = CString::new(path.as_os_str().as_encoded_bytes())
        .map_err(|_| open_error(&source_name, "path contains an interior NUL byte"))?;

    unsafe {
        let mut format_context: *mut ffi::AVFormatContext = ptr::null_mut();
        let mut options = protocol_options();
        let status =
            ffi::avformat_open_input(&mut format_context, name.as_ptr(), ptr::null(), &mut options);
        ffi::av_dict_free(&mut options);
        if status != 0 {
            return Err(open_error(&source_name, &error_text(status)));
        }

        probe_and_wrap(format_context).map_err(|code| open_error(&source_name, &error_text(code)))
    }
}

fn open_bytes<'a>(
    data: &'a [u8],
    io_buffer_size: usize,
) -> Result<OpenedInput<'a>, FramegrabError> {
    let source_name = format!("<memory:{} bytes>", data.len());
    let io_buffer_size = if io_buffer_size == 0 {
        DEFAULT_IO_BUFFER_SIZE
    } else {
        io_buffer_size
    };
    let mut reader = Box::new(ByteReader::new(data));

    unsafe {
        let io_buffer = ffi::av_malloc(io_buffer_size).cast::<u8>();
        if io_buffer.is_null() {
            return Err(open_error(&source_name, "could not allocate I/O buffer"));
        }

        let avio = ffi::avio_alloc_context(
            io_buffer,
            io_buffer_size as c_int,
            0,
            ptr::from_mut::<ByteReader>(&mut *reader).cast::<c_void>(),
            Some(read_source_bytes),
            None,
            None,
        );
        if avio.is_null() {
            ffi::av_free(io_buffer.cast::<c_void>());
            return Err(open_error(&source_name, "could not allocate I/O context"));
        }

        // From here the guard owns the AVIO context and its buffer on every
        // exit path.
        let io_guard = MemoryIo {
            avio,
            _reader: reader,
            _span: PhantomData,
        };

        let mut format_context = ffi::avformat_alloc_context();
        if format_context.is_null() {
            return Err(open_error(&source_name, "could not allocate format context"));
        }
        (*format_context).pb = io_guard.avio;
        (*format_context).flags |= ffi::AVFMT_FLAG_CUSTOM_IO;

        let mut options = protocol_options();
        let status =
            ffi::avformat_open_input(&mut format_context, ptr::null(), ptr::null(), &mut options);
        ffi::av_dict_free(&mut options);
        if status != 0 {
            return Err(open_error(&source_name, &error_text(status)));
        }

        let input = probe_and_wrap(format_context)
            .map_err(|code| open_error(&source_name, &error_text(code)))?;
        Ok(OpenedInput {
            input,
            _io: Some(io_guard),
        })
    }
}

/// Probe stream info on a freshly-opened context, wrapping it on success and
/// closing it on failure.
unsafe fn probe_and_wrap(mut format_context: *mut ffi::AVFormatContext) -> Result<Input, c_int> {
    unsafe {
        let status = ffi::avformat_find_stream_info(format_context, ptr::null_mut());
        if status < 0 {
            ffi::avformat_close_input(&mut format_context);
            return Err(status);
        }
        Ok(Input::wrap(format_context))
    }
}

fn protocol_options() -> *mut ffi::AVDictionary {
    let mut options: *mut ffi::AVDictionary = ptr::null_mut();
    unsafe {
        ffi::av_dict_set(
            &mut options,
            c"protocol_whitelist".as_ptr(),
            PROTOCOL_ALLOW_LIST.as_ptr(),
            0,
        );
    }
    options
}

fn error_text(status: c_int) -> String {
    ffmpeg_next::Error::from(status).to_string()
}

fn open_error(source_name: &str, reason: &str) -> FramegrabError {
    FramegrabError::Open {
        source_name: source_name.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_reader_copies_in_chunks() {
        let data: Vec<u8> = (0..10).collect();
        let mut reader = ByteReader::new(&data);

        let mut dst = [0u8; 4];
        assert_eq!(reader.read(&mut dst), 4);
        assert_eq!(dst, [0, 1, 2, 3]);

        assert_eq!(reader.read(&mut dst), 4);
        assert_eq!(dst, [4, 5, 6, 7]);
    }

    #[test]
    fn byte_reader_short_final_read_then_zero() {
        let data = [9u8, 8, 7];
        let mut reader = ByteReader::new(&data);

        let mut dst = [0u8; 8];
        assert_eq!(reader.read(&mut dst), 3);
        assert_eq!(&dst[..3], &[9, 8, 7]);

        // Exhausted: every further read copies nothing.
        assert_eq!(reader.read(&mut dst), 0);
        assert_eq!(reader.read(&mut dst), 0);
    }

    #[test]
    fn byte_reader_empty_span() {
        let mut reader = ByteReader::new(&[]);
        let mut dst = [0u8; 16];
        assert_eq!(reader.read(&mut dst), 0);
    }

    #[test]
    fn media_source_descriptions() {
        assert_eq!(MediaSource::path("a/b.mp4").describe(), "a/b.mp4");
        assert_eq!(
            MediaSource::bytes(&[0u8; 42]).describe(),
            "<memory:42 bytes>",
        );
    }
}
