use std::io;
use std::path::PathBuf;

use cpu_m68k::CpuError;
use thiserror::Error;

/// Conditions that stop the workstation.
#[derive(Debug, Error)]
pub enum MachineError {
    #[error("cannot read ROM image {path}")]
    RomRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("ROM image is {found} bytes, expected {expected}")]
    RomSize { found: usize, expected: usize },

    #[error("write to ROM at {address:#08X}")]
    RomWrite { address: u32 },

    #[error("byte access to host CSR at {address:#08X}")]
    CsrByteAccess { address: u32 },

    #[error("word write to I/O page at {address:#08X}")]
    IoWordWrite { address: u32 },

    #[error("cannot connect to host {address}")]
    Connect {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Cpu(#[from] CpuError),
}
