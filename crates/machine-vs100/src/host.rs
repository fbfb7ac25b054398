//! Host interface registers.
//!
//! Eight word-wide CSRs shared with the host, a loopback copy used by the
//! diagnostics, and the fibre control byte:
//!
//! | Bits | Fibre control                                  |
//! |------|------------------------------------------------|
//! | 1-0  | 00 power-up, 01 normal, 10/11 loopback         |
//! | 2    | force CRC error                                |

use crate::fibre::Message;

pub mod control {
    pub const TRANSMIT: u8 = 0x01;
    pub const LOOPBACK: u8 = 0x02;
    pub const FORCE_CRC_ERROR: u8 = 0x04;
}

pub const CSRS: usize = 8;

#[derive(Debug, Clone, Default)]
pub struct HostInterface {
    csr: [u16; CSRS],
    loopback: [u16; CSRS],
    control: u8,
}

fn index(address: u32) -> usize {
    (address as usize >> 1) % CSRS
}

impl HostInterface {
    #[must_use]
    pub fn read_csr(&self, address: u32) -> u16 {
        self.csr[index(address)]
    }

    /// A CPU write. Returns the message announcing it to the host, unless
    /// the interface is looped back.
    pub fn write_csr(&mut self, address: u32, value: u16) -> Option<Message> {
        let r = index(address);
        if self.control & control::LOOPBACK != 0 {
            self.loopback[r] = value;
            None
        } else {
            self.csr[r] = value;
            Some(Message::Csr {
                index: r as u8,
                data: value,
            })
        }
    }

    /// The host changed a CSR.
    pub fn update_csr(&mut self, index: u8, value: u16) {
        self.csr[usize::from(index) % CSRS] = value;
    }

    #[must_use]
    pub fn read_loopback(&self, address: u32) -> u8 {
        let [hi, lo] = self.loopback[index(address)].to_be_bytes();
        if address & 1 == 0 { hi } else { lo }
    }

    #[must_use]
    pub fn control(&self) -> u8 {
        self.control
    }

    #[must_use]
    pub fn force_crc_error(&self) -> bool {
        self.control & control::FORCE_CRC_ERROR != 0
    }

    /// Toggling the transmit bit outside loopback tells the host.
    pub fn write_control(&mut self, value: u8) -> Option<Message> {
        log::debug!("fibre control {value:02X}");
        let toggled = (self.control ^ value) & control::TRANSMIT != 0;
        self.control = value;
        if toggled && value & control::LOOPBACK == 0 {
            Some(if value & control::TRANSMIT != 0 {
                Message::XmitOn
            } else {
                Message::XmitOff
            })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csr_write_is_announced() {
        let mut host = HostInterface::default();
        assert_eq!(
            host.write_csr(0x48_0006, 0x1234),
            Some(Message::Csr {
                index: 3,
                data: 0x1234
            })
        );
        assert_eq!(host.read_csr(0x48_0006), 0x1234);
    }

    #[test]
    fn loopback_diverts_csr_writes() {
        let mut host = HostInterface::default();
        assert_eq!(host.write_control(control::LOOPBACK), None);
        assert_eq!(host.write_csr(0x48_0002, 0xABCD), None);
        assert_eq!(host.read_csr(0x48_0002), 0);
        assert_eq!(host.read_loopback(0x4A_0002), 0xAB);
        assert_eq!(host.read_loopback(0x4A_0003), 0xCD);
    }

    #[test]
    fn transmit_toggle_sends_xmit() {
        let mut host = HostInterface::default();
        assert_eq!(host.write_control(control::TRANSMIT), Some(Message::XmitOn));
        assert_eq!(host.write_control(control::TRANSMIT), None);
        assert_eq!(host.write_control(0), Some(Message::XmitOff));
        assert_eq!(host.write_control(control::TRANSMIT | control::LOOPBACK), None);
    }
}
