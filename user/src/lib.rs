//! Userspace side of `/dev/sir0`: argument handling, cpu pinning and a thin
//! wrapper over the device's read and ioctl interface.

use std::{
    ffi::CString,
    fmt, io,
    mem::size_of,
    os::raw::c_int,
};

use sir::{
    fs::SirIoctlCmd,
    report::DetailedReport,
    session::WIDTH,
};

pub const DEVICE_PATH: &str = "/dev/sir0";
pub const USAGE: &str = "usage: sir_char_reader CPU [CHUNK]\n  \
    CPU    cpu to pin the reading thread to\n  \
    CHUNK  bytes per read() when streaming, 1..=8 (default 8)";

/// Command line of the reader tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Args {
    pub cpu: usize,
    pub chunk: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgError {
    MissingCpu,
    BadCpu(String),
    BadChunk(String),
    TooMany,
}

impl fmt::Display for ArgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCpu => write!(f, "missing CPU argument"),
            Self::BadCpu(arg) => write!(f, "invalid CPU '{}'", arg),
            Self::BadChunk(arg) => write!(f, "invalid CHUNK '{}', expected 1..={}", arg, WIDTH),
            Self::TooMany => write!(f, "too many arguments"),
        }
    }
}

impl std::error::Error for ArgError {}

/// Parse `CPU [CHUNK]`, program name already stripped.
pub fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Args, ArgError> {
    let mut args = args.into_iter();
    let cpu_arg = args.next().ok_or(ArgError::MissingCpu)?;
    let cpu = cpu_arg.parse().map_err(|_| ArgError::BadCpu(cpu_arg.clone()))?;
    let chunk = match args.next() {
        None => WIDTH,
        Some(arg) => match arg.parse::<usize>() {
            Ok(chunk) if (1..=WIDTH).contains(&chunk) => chunk,
            _ => return Err(ArgError::BadChunk(arg)),
        },
    };
    if args.next().is_some() {
        return Err(ArgError::TooMany);
    }
    Ok(Args { cpu, chunk })
}

/// Restrict the calling thread to `cpu`.
pub fn pin_to_cpu(cpu: usize) -> io::Result<()> {
    if cpu >= libc::CPU_SETSIZE as usize {
        return Err(io::Error::from_raw_os_error(libc::EINVAL));
    }
    unsafe {
        let mut set: libc::cpu_set_t = std::mem::zeroed();
        libc::CPU_SET(cpu, &mut set);
        if libc::sched_setaffinity(0, size_of::<libc::cpu_set_t>(), &set) != 0 {
            return Err(io::Error::last_os_error());
        }
    }
    Ok(())
}

/// Assemble one counter from reads of at most `chunk` bytes each.
///
/// The device hands out the rest of the same snapshot until all eight
/// bytes are out, so the pieces always belong together.
pub fn read_counter<R>(chunk: usize, mut read: R) -> io::Result<u64>
where
    R: FnMut(&mut [u8]) -> io::Result<usize>,
{
    let mut bytes = [0u8; WIDTH];
    let mut filled = 0;
    while filled < WIDTH {
        let end = (filled + chunk.max(1)).min(WIDTH);
        match read(&mut bytes[filled..end])? {
            0 => return Err(io::ErrorKind::UnexpectedEof.into()),
            n => filled += n,
        }
    }
    Ok(u64::from_ne_bytes(bytes))
}

/// An open `/dev/sir0`.
pub struct SirReader {
    fd: c_int,
}

impl SirReader {
    pub fn open(path: &str) -> io::Result<Self> {
        let path = CString::new(path).map_err(|_| io::Error::from(io::ErrorKind::InvalidInput))?;
        let fd = unsafe { libc::open(path.as_ptr(), libc::O_RDONLY | libc::O_CLOEXEC) };
        if fd < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(Self { fd })
    }

    fn read_raw(&self, buf: &mut [u8]) -> io::Result<usize> {
        let n = unsafe { libc::read(self.fd, buf.as_mut_ptr().cast(), buf.len()) };
        if n < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(n as usize)
    }

    /// One streamed counter, `chunk` bytes per read.
    pub fn read_streamed(&self, chunk: usize) -> io::Result<u64> {
        read_counter(chunk, |buf| self.read_raw(buf))
    }

    /// # Safety
    ///
    /// `out` must be valid for writes of the size encoded in `cmd`.
    unsafe fn ioctl<T>(&self, cmd: SirIoctlCmd, out: *mut T) -> io::Result<()> {
        if libc::ioctl(self.fd, cmd as usize as _, out) < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    pub fn get(&self) -> io::Result<u64> {
        let mut value = 0u64;
        unsafe { self.ioctl(SirIoctlCmd::Get, &mut value)? };
        Ok(value)
    }

    pub fn get_detailed(&self) -> io::Result<DetailedReport> {
        let mut report = DetailedReport::default();
        unsafe { self.ioctl(SirIoctlCmd::GetDetailed, &mut report)? };
        Ok(report)
    }
}

impl Drop for SirReader {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.fd);
        }
    }
}
