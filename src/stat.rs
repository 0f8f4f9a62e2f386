//! Thin, safe wrappers around the handful of libc calls the directory visit
//! needs: `lstat`, `opendir`/`readdir`/`closedir`. Kept at the libc level
//! (rather than hand-rolled raw syscalls) since raw `getdents64` plumbing
//! buys throughput this tool has no budget to spend on -- the bottleneck
//! here is the thread fan-out, not per-call syscall overhead.

use std::ffi::{CStr, CString, OsString};
use std::io;
use std::os::unix::ffi::{OsStrExt, OsStringExt};
use std::path::Path;

/// The pieces of `struct stat` the visit algorithm actually consults.
#[derive(Clone, Copy, Debug)]
pub struct Status {
    pub is_dir: bool,
    /// Reported allocation, in 512-byte units, per `stat(2)`.
    pub blocks: u64,
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn clear_errno() {
    // SAFETY: __errno_location always returns a valid pointer to thread-local errno.
    unsafe { *libc::__errno_location() = 0 };
}

#[cfg(any(target_os = "macos", target_os = "freebsd"))]
fn clear_errno() {
    // SAFETY: __error always returns a valid pointer to thread-local errno on these platforms.
    unsafe { *libc::__error() = 0 };
}

#[cfg(any(target_os = "linux", target_os = "android"))]
unsafe fn read_dir_entry(handle: *mut libc::DIR) -> *mut libc::dirent64 {
    unsafe { libc::readdir64(handle) }
}

#[cfg(any(target_os = "macos", target_os = "freebsd"))]
unsafe fn read_dir_entry(handle: *mut libc::DIR) -> *mut libc::dirent {
    unsafe { libc::readdir(handle) }
}

fn path_to_cstring(path: &Path) -> io::Result<CString> {
    CString::new(path.as_os_str().as_bytes())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "path contains a NUL byte"))
}

/// A non-dereferencing status check (`lstat`): symlinks are reported as
/// themselves, never as whatever they point to.
///
/// Returns `Ok(None)` if the path could not be statted (permission denied,
/// removed between enumeration and visit, and so on) -- callers treat that
/// as "contribute zero", matching the source's silent-skip behavior.
pub fn lstat(path: &Path) -> io::Result<Option<Status>> {
    let cpath = path_to_cstring(path)?;
    // SAFETY: cpath is a valid NUL-terminated C string for the duration of
    // the call; buf is a valid, fully-initialized-on-success out-param.
    let mut buf: libc::stat = unsafe { std::mem::zeroed() };
    let rc = unsafe { libc::lstat(cpath.as_ptr(), &raw mut buf) };
    if rc != 0 {
        return Ok(None);
    }
    let is_dir = buf.st_mode & libc::S_IFMT == libc::S_IFDIR;
    let blocks = u64::try_from(buf.st_blocks).unwrap_or(0);
    Ok(Some(Status { is_dir, blocks }))
}

/// A handle to an open directory stream, closed exactly once: either
/// explicitly via [`Dir::close`] (the success path, whose failure is fatal
/// per the error taxonomy) or, if the caller returns early without closing,
/// via `Drop` on a best-effort basis so a panic mid-iteration never leaks
/// the file descriptor.
pub struct Dir {
    handle: *mut libc::DIR,
    closed: bool,
}

// The handle is only ever touched by the worker thread that opened it; it is
// never shared, so moving it across the initial construction boundary is
// sound even though raw pointers aren't `Send` by default.
unsafe impl Send for Dir {}

impl Dir {
    /// Opens `path` as a directory. `None` (mapped to an `io::Error`) on
    /// permission failure or if `path` is not a directory.
    pub fn open(path: &Path) -> io::Result<Self> {
        let cpath = path_to_cstring(path)?;
        // SAFETY: cpath is a valid NUL-terminated C string.
        let handle = unsafe { libc::opendir(cpath.as_ptr()) };
        if handle.is_null() {
            return Err(io::Error::last_os_error());
        }
        Ok(Self {
            handle,
            closed: false,
        })
    }

    /// Reads the next entry's name as raw bytes, or `None` at end-of-stream.
    ///
    /// `readdir` signals both EOF and error by returning NULL, distinguished
    /// only via `errno`; we clear `errno` first so a stale value from an
    /// unrelated earlier call can't be misread as an error here. Returning
    /// bytes rather than an `OsString` lets callers compare `.`/`..` against
    /// a byte-string literal directly, with no allocation on that path.
    pub fn read_name(&mut self) -> io::Result<Option<Vec<u8>>> {
        clear_errno();
        // SAFETY: self.handle is a valid, open DIR* for the lifetime of self.
        let entry = unsafe { read_dir_entry(self.handle) };
        if entry.is_null() {
            let errno = io::Error::last_os_error();
            return if errno.raw_os_error() == Some(0) {
                Ok(None)
            } else {
                Err(errno)
            };
        }
        // SAFETY: entry is non-null and valid until the next readdir/closedir call.
        let name_ptr = unsafe { (*entry).d_name.as_ptr() };
        // SAFETY: d_name is NUL-terminated by the kernel.
        let name = unsafe { CStr::from_ptr(name_ptr) };
        Ok(Some(name.to_bytes().to_vec()))
    }

    /// Closes the directory handle. Failure here is fatal to the process
    /// (see error taxonomy): a `closedir` failure indicates the descriptor
    /// invariant has already been violated elsewhere.
    pub fn close(mut self) -> io::Result<()> {
        self.closed = true;
        // SAFETY: handle was opened by opendir and not yet closed.
        let rc = unsafe { libc::closedir(self.handle) };
        if rc == 0 {
            Ok(())
        } else {
            Err(io::Error::last_os_error())
        }
    }
}

impl Drop for Dir {
    fn drop(&mut self) {
        if !self.closed {
            // SAFETY: handle was opened by opendir and not yet closed.
            unsafe {
                libc::closedir(self.handle);
            }
        }
    }
}

/// Joins a parent directory path with an entry name, inserting a separator
/// only when the parent doesn't already end in one.
#[must_use]
pub fn join(parent: &Path, name: &[u8]) -> std::path::PathBuf {
    let parent_bytes = parent.as_os_str().as_bytes();
    let mut out = Vec::with_capacity(parent_bytes.len() + name.len() + 1);
    out.extend_from_slice(parent_bytes);
    if parent_bytes.last() != Some(&b'/') {
        out.push(b'/');
    }
    out.extend_from_slice(name);
    OsString::from_vec(out).into()
}
