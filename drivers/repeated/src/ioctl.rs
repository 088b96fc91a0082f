//! TEAM_472: Control command numbers for the repeated device.
//!
//! Commands use the generic Linux `_IOC` layout:
//!
//! ```text
//!  31 30 29          16 15      8 7       0
//! +-----+--------------+---------+---------+
//! | dir |     size     |  type   |   nr    |
//! +-----+--------------+---------+---------+
//! ```
//!
//! | nr | Command      | Argument                      |
//! |----|--------------|-------------------------------|
//! | 0  | `SET_STRING` | pointer to a NUL-terminated string |
//! | 1  | `RESET`      | none                          |

use crate::config::ioctl::MAGIC;
use crate::error::{RepeatedError, RepeatedResult};

const IOC_NRBITS: u32 = 8;
const IOC_TYPEBITS: u32 = 8;
const IOC_SIZEBITS: u32 = 14;
const IOC_DIRBITS: u32 = 2;

const IOC_NRMASK: u32 = (1 << IOC_NRBITS) - 1;
const IOC_TYPEMASK: u32 = (1 << IOC_TYPEBITS) - 1;
const IOC_SIZEMASK: u32 = (1 << IOC_SIZEBITS) - 1;
const IOC_DIRMASK: u32 = (1 << IOC_DIRBITS) - 1;

const IOC_NRSHIFT: u32 = 0;
const IOC_TYPESHIFT: u32 = IOC_NRSHIFT + IOC_NRBITS;
const IOC_SIZESHIFT: u32 = IOC_TYPESHIFT + IOC_TYPEBITS;
const IOC_DIRSHIFT: u32 = IOC_SIZESHIFT + IOC_SIZEBITS;

/// No data transfer
pub const IOC_NONE: u32 = 0;
/// Caller writes to the device
pub const IOC_WRITE: u32 = 1;

/// Encode an ioctl number (`_IOC`).
pub const fn ioc(dir: u32, ty: u8, nr: u32, size: usize) -> u32 {
    ((dir & IOC_DIRMASK) << IOC_DIRSHIFT)
        | ((ty as u32) << IOC_TYPESHIFT)
        | ((nr & IOC_NRMASK) << IOC_NRSHIFT)
        | (((size as u32) & IOC_SIZEMASK) << IOC_SIZESHIFT)
}

/// `_IO(type, nr)`
pub const fn io(ty: u8, nr: u32) -> u32 {
    ioc(IOC_NONE, ty, nr, 0)
}

/// `_IOW(type, nr, size)`
pub const fn iow(ty: u8, nr: u32, size: usize) -> u32 {
    ioc(IOC_WRITE, ty, nr, size)
}

#[inline]
pub const fn ioc_nr(cmd: u32) -> u32 {
    (cmd >> IOC_NRSHIFT) & IOC_NRMASK
}

#[inline]
pub const fn ioc_type(cmd: u32) -> u8 {
    ((cmd >> IOC_TYPESHIFT) & IOC_TYPEMASK) as u8
}

#[inline]
pub const fn ioc_size(cmd: u32) -> usize {
    ((cmd >> IOC_SIZESHIFT) & IOC_SIZEMASK) as usize
}

#[inline]
pub const fn ioc_dir(cmd: u32) -> u32 {
    (cmd >> IOC_DIRSHIFT) & IOC_DIRMASK
}

/// nr of the SET_STRING command
pub const SET_STRING_NR: u32 = 0;
/// nr of the RESET command
pub const RESET_NR: u32 = 1;

/// `_IOW('r', 0, char *)`
pub const SET_STRING: u32 = iow(MAGIC, SET_STRING_NR, core::mem::size_of::<usize>());
/// `_IO('r', 1)`
pub const RESET: u32 = io(MAGIC, RESET_NR);

/// Decoded control command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    /// Replace the configured string
    SetString,
    /// Drop the string and zero the horizon
    Reset,
}

impl ControlCommand {
    /// Decode a raw command number.
    ///
    /// Commands carrying the `'r'` type byte are matched on their nr field
    /// only, so user space may encode the SET_STRING argument size either as
    /// a pointer or as an `int`. A bare code (no type byte) is taken as the
    /// nr itself.
    pub fn decode(cmd: u32) -> RepeatedResult<Self> {
        let nr = if ioc_type(cmd) == MAGIC {
            ioc_nr(cmd)
        } else if cmd <= IOC_NRMASK {
            cmd
        } else {
            return Err(RepeatedError::UnsupportedOperation(cmd));
        };

        match nr {
            SET_STRING_NR => Ok(Self::SetString),
            RESET_NR => Ok(Self::Reset),
            _ => Err(RepeatedError::UnsupportedOperation(cmd)),
        }
    }

    /// Whether the command reads an argument from the caller
    pub const fn takes_argument(self) -> bool {
        matches!(self, Self::SetString)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_encoding() {
        // _IO('r', 1) = ('r' << 8) | 1
        assert_eq!(RESET, 0x7201);
        assert_eq!(ioc_dir(RESET), IOC_NONE);
        assert_eq!(ioc_size(RESET), 0);
    }

    #[test]
    fn test_set_string_encoding() {
        assert_eq!(ioc_dir(SET_STRING), IOC_WRITE);
        assert_eq!(ioc_type(SET_STRING), b'r');
        assert_eq!(ioc_nr(SET_STRING), 0);
        assert_eq!(ioc_size(SET_STRING), core::mem::size_of::<usize>());
    }

    #[test]
    fn test_decode_encoded_commands() {
        assert_eq!(ControlCommand::decode(SET_STRING), Ok(ControlCommand::SetString));
        assert_eq!(ControlCommand::decode(RESET), Ok(ControlCommand::Reset));
    }

    #[test]
    fn test_decode_int_sized_set_string() {
        // User space may size the argument as an int
        let cmd = iow(b'r', 0, 4);
        assert_eq!(cmd, 0x4004_7200);
        assert_eq!(ControlCommand::decode(cmd), Ok(ControlCommand::SetString));
    }

    #[test]
    fn test_decode_bare_codes() {
        assert_eq!(ControlCommand::decode(0), Ok(ControlCommand::SetString));
        assert_eq!(ControlCommand::decode(1), Ok(ControlCommand::Reset));
        assert_eq!(
            ControlCommand::decode(2),
            Err(RepeatedError::UnsupportedOperation(2))
        );
    }

    #[test]
    fn test_decode_unknown() {
        // TCGETS belongs to another driver
        assert_eq!(
            ControlCommand::decode(0x5401),
            Err(RepeatedError::UnsupportedOperation(0x5401))
        );
        let cmd = io(b'r', 9);
        assert_eq!(
            ControlCommand::decode(cmd),
            Err(RepeatedError::UnsupportedOperation(cmd))
        );
    }

    #[test]
    fn test_only_set_string_takes_argument() {
        assert!(ControlCommand::SetString.takes_argument());
        assert!(!ControlCommand::Reset.takes_argument());
    }
}
