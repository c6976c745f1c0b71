//! # Standard Error Codes (Errno)
//!
//! Códigos de erro devolvidos pelos backends através da camada de vnodes.
//! Segue a numeração POSIX/Linux; o valor de retorno "cru" é negativo
//! (`as_isize`/`as_i32`), com 0 significando sucesso por convenção.

#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Errno {
    EPERM = 1,    // Operation not permitted
    ENOENT = 2,   // No such file or directory
    EIO = 5,      // I/O error
    ENXIO = 6,    // No such device or address
    EBADF = 9,    // Bad file number
    EAGAIN = 11,  // Try again
    ENOMEM = 12,  // Out of memory
    EACCES = 13,  // Permission denied
    EFAULT = 14,  // Bad address
    EBUSY = 16,   // Device or resource busy
    EEXIST = 17,  // File exists
    ENODEV = 19,  // No such device
    ENOTDIR = 20, // Not a directory
    EISDIR = 21,  // Is a directory
    EINVAL = 22,  // Invalid argument
    ENOSPC = 28,  // No space left on device
    ESPIPE = 29,  // Illegal seek
    EROFS = 30,   // Read-only file system
    ENOSYS = 38,  // Function not implemented
}

impl Errno {
    /// Código de retorno negativo (convenção de backend/syscall).
    pub fn as_i32(self) -> i32 {
        -(self as i32)
    }

    pub fn as_isize(self) -> isize {
        self.as_i32() as isize
    }

    /// Converte um código de retorno cru (negativo) de volta para `Errno`.
    pub fn from_code(code: i32) -> Option<Self> {
        let errno = match code.checked_neg()? {
            1 => Self::EPERM,
            2 => Self::ENOENT,
            5 => Self::EIO,
            6 => Self::ENXIO,
            9 => Self::EBADF,
            11 => Self::EAGAIN,
            12 => Self::ENOMEM,
            13 => Self::EACCES,
            14 => Self::EFAULT,
            16 => Self::EBUSY,
            17 => Self::EEXIST,
            19 => Self::ENODEV,
            20 => Self::ENOTDIR,
            21 => Self::EISDIR,
            22 => Self::EINVAL,
            28 => Self::ENOSPC,
            29 => Self::ESPIPE,
            30 => Self::EROFS,
            38 => Self::ENOSYS,
            _ => return None,
        };
        Some(errno)
    }

    /// Converte o resultado de uma operação no código cru de retorno.
    pub fn to_code(result: Result<(), Errno>) -> i32 {
        match result {
            Ok(()) => 0,
            Err(e) => e.as_i32(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EPERM => "Operation not permitted",
            Self::ENOENT => "No such file or directory",
            Self::EIO => "I/O error",
            Self::ENXIO => "No such device or address",
            Self::EBADF => "Bad file number",
            Self::EAGAIN => "Try again",
            Self::ENOMEM => "Out of memory",
            Self::EACCES => "Permission denied",
            Self::EFAULT => "Bad address",
            Self::EBUSY => "Device or resource busy",
            Self::EEXIST => "File exists",
            Self::ENODEV => "No such device",
            Self::ENOTDIR => "Not a directory",
            Self::EISDIR => "Is a directory",
            Self::EINVAL => "Invalid argument",
            Self::ENOSPC => "No space left on device",
            Self::ESPIPE => "Illegal seek",
            Self::EROFS => "Read-only file system",
            Self::ENOSYS => "Function not implemented",
        }
    }
}

impl core::fmt::Display for Errno {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
