//! The workstation bus.
//!
//! Owns every device the 68000 can reach and routes each access through the
//! page table. Word accesses resolve to the device once; devices without
//! native word ports use one of the stock compositions from `emu_core`.
//!
//! Fatal addressing violations cannot unwind through the `Bus` trait, so
//! they are latched here and collected by the step loop after the
//! instruction.

use dec_bba::{Bba, BbaMemory, Control};
use emu_core::{
    ADDRESS_MASK, Bus, Ticks, read_word_as_byte, read_word_as_bytes, write_word_as_byte,
    write_word_as_bytes,
};
use motorola_2661::Mc2661;
use motorola_6845::Mc6845;
use peripheral_lk201::{BYTE_PERIOD, Lk201};

use crate::MachineError;
use crate::events::{Event, EventQueue};
use crate::fibre::{Link, LinkEvent, Message, Reply};
use crate::host::HostInterface;
use crate::interrupts::{BBA_LEVEL, InterruptLines, UART_LEVEL, VSYNC_LEVEL};
use crate::io::{Mouse, StatusRegister, led_pattern, status};
use crate::map::{PageTable, Region};
use crate::memory::{Memory, UNIBUS_BASE};

/// Mask applied to scratchpad addresses before they reach the BBA.
const SCRATCHPAD_MASK: u32 = 0x1FF;

pub struct Vs100Bus {
    pub map: PageTable,
    pub memory: Memory,
    pub bba: Bba,
    pub keyboard: Mc2661,
    pub lk201: Lk201,
    /// Tablet port. Nothing is attached to it.
    pub tablet: Mc2661,
    pub crtc: Mc6845,
    pub status: StatusRegister,
    pub mouse: Mouse,
    pub leds: u8,
    pub host: HostInterface,
    pub link: Link,
    pub interrupts: InterruptLines,
    pub events: EventQueue,
    pub retry_finite: u16,
    pub retry_infinite: u16,
    /// Accesses that reached the bus-error fallback.
    pub bus_errors: u64,
    vsync_period: Ticks,
    fatal: Option<MachineError>,
}

impl Vs100Bus {
    pub fn new(memory: Memory, bba: Bba, link: Link, vsync_period: Ticks) -> Self {
        Self {
            map: PageTable::new(),
            memory,
            bba,
            keyboard: Mc2661::new(),
            lk201: Lk201::new(),
            tablet: Mc2661::new(),
            crtc: Mc6845::new(),
            status: StatusRegister::default(),
            mouse: Mouse::default(),
            leds: 0,
            host: HostInterface::default(),
            link,
            interrupts: InterruptLines::default(),
            events: EventQueue::new(),
            retry_finite: 0,
            retry_infinite: 0,
            bus_errors: 0,
            vsync_period,
            fatal: None,
        }
    }

    /// Start the free-running vertical sync.
    pub fn start_vsync(&mut self) {
        if !self.events.is_scheduled(Event::VerticalSync) {
            self.events.schedule(self.vsync_period, Event::VerticalSync);
        }
    }

    /// The first fatal violation since the last call.
    pub fn take_fatal(&mut self) -> Option<MachineError> {
        self.fatal.take()
    }

    fn violation(&mut self, error: MachineError) {
        log::warn!("{error}");
        if self.fatal.is_none() {
            self.fatal = Some(error);
        }
    }

    fn bus_error(&mut self, address: u32, access: &str) {
        log::warn!("bus error: {access} at {address:06X}");
        self.bus_errors += 1;
        self.retry_finite = self.retry_finite.wrapping_add(1);
        self.retry_infinite = self.retry_infinite.wrapping_add(1);
    }

    fn nxm(&mut self, address: u32) {
        log::warn!("UNIBUS NXM at {address:06X}");
        self.status.set(status::NXM, &mut self.interrupts);
        self.retry_finite = self.retry_finite.wrapping_add(1);
        self.retry_infinite = self.retry_infinite.wrapping_add(1);
    }

    // Host events, timed events

    /// Apply everything the link receiver has delivered.
    pub fn process_link(&mut self) {
        while let Some(event) = self.link.poll() {
            match event {
                LinkEvent::Up => {
                    log::info!("host link up");
                    self.status.set(status::LINK, &mut self.interrupts);
                }
                LinkEvent::Down => {
                    log::info!("host link down");
                    self.status.clear(status::LINK, &mut self.interrupts);
                }
                LinkEvent::Csr { index, data } => self.host.update_csr(index, data),
            }
        }
    }

    /// Advance time by `elapsed` and fire every event that has come due.
    pub fn run_events(&mut self, elapsed: Ticks) {
        self.events.advance(elapsed);
        while let Some(event) = self.events.pop_due() {
            self.fire(event);
        }
    }

    fn fire(&mut self, event: Event) {
        match event {
            Event::BbaGo => {
                let mut bba = std::mem::take(&mut self.bba);
                bba.run(self);
                self.bba = bba;
                self.interrupts.set(BBA_LEVEL, true);
            }
            Event::VerticalSync => {
                self.interrupts.set(VSYNC_LEVEL, true);
                self.events.schedule(self.vsync_period, Event::VerticalSync);
            }
            Event::KeyboardByte => {
                if let Some(byte) = self.lk201.next_byte() {
                    self.keyboard.receive(byte);
                    self.update_uart_irq();
                }
                if self.lk201.pending() > 0 {
                    self.events.schedule(BYTE_PERIOD, Event::KeyboardByte);
                }
            }
        }
    }

    /// Schedule LK201 delivery if a transmission has just started.
    pub fn keyboard_started(&mut self, started: bool) {
        if started && !self.events.is_scheduled(Event::KeyboardByte) {
            self.events.schedule(BYTE_PERIOD, Event::KeyboardByte);
        }
    }

    fn update_uart_irq(&mut self) {
        let asserted = self.keyboard.irq() || self.tablet.irq();
        self.interrupts.set(UART_LEVEL, asserted);
    }

    // UNIBUS window

    fn unibus_read(&mut self, address: u32, word: bool) -> u16 {
        let offset = address - UNIBUS_BASE;
        let request = if word {
            Message::Read16 { address: offset }
        } else {
            Message::Read8 { address: offset }
        };
        match self.link.read(&request) {
            Reply::Data(data) if word => data,
            Reply::Data(data) => data & 0xFF,
            Reply::Nxm => {
                self.nxm(address);
                0
            }
        }
    }

    fn unibus_write(&mut self, message: &Message) {
        if !self.link.send(message) {
            log::warn!("UNIBUS write dropped: {message:?}");
        }
    }

    // Host interface

    fn write_csr(&mut self, address: u32, value: u16) {
        if let Some(message) = self.host.write_csr(address, value) {
            self.link.send(&message);
        }
        if self.host.force_crc_error() {
            self.status.set(status::NXM, &mut self.interrupts);
        }
    }

    // I/O page

    fn io_read(&mut self, address: u32) -> u8 {
        let reg = (address & 7) as u8;
        match address & 0xFE {
            0x00..=0x06 => {
                let value = self.keyboard.read(reg);
                self.update_uart_irq();
                value
            }
            0x20..=0x26 => {
                let value = self.tablet.read(reg);
                self.update_uart_irq();
                value
            }
            0x40 | 0x80 => 0,
            0x60 => self.mouse.read(address),
            0xA0 | 0xA2 => match address & 3 {
                1 => self.crtc.address(),
                3 => self.crtc.read_data(),
                _ => 0,
            },
            0xC0 => self.status.read(address, &mut self.interrupts),
            0xE0 => {
                self.interrupts.set(VSYNC_LEVEL, false);
                0
            }
            _ => {
                self.bus_error(address, "read");
                0
            }
        }
    }

    fn io_write(&mut self, address: u32, value: u8) {
        let reg = (address & 7) as u8;
        match address & 0xFE {
            0x00..=0x06 => {
                if let Some(byte) = self.keyboard.write(reg, value) {
                    let started = self.lk201.receive(byte);
                    self.keyboard_started(started);
                }
                self.update_uart_irq();
            }
            0x20..=0x26 => {
                if let Some(byte) = self.tablet.write(reg, value) {
                    log::trace!("tablet transmit {byte:02X}");
                }
                self.update_uart_irq();
            }
            0x40 => {
                if let Some(message) = self.host.write_control(value) {
                    self.link.send(&message);
                }
            }
            0x80 => {
                self.leds = value;
                log::info!("LEDs {}", led_pattern(value));
            }
            0xA0 | 0xA2 => match address & 3 {
                1 => self.crtc.select(value),
                3 => self.crtc.write_data(value),
                _ => {}
            },
            0xC0 | 0xE0 => {}
            _ => self.bus_error(address, "write"),
        }
    }

    fn io_read_word(&mut self, address: u32) -> u16 {
        if address & 0xFE == 0x60 {
            u16::from_be_bytes([self.mouse.read(0), self.mouse.read(1)])
        } else {
            u16::from(self.io_read(address))
        }
    }
}

impl Bus for Vs100Bus {
    fn read_byte(&mut self, address: u32) -> u8 {
        let address = address & ADDRESS_MASK;
        match self.map.region(address) {
            Region::BusError => {
                self.bus_error(address, "read");
                0
            }
            Region::Ram => self.memory.read_ram(address),
            Region::Unibus => self.unibus_read(address, false) as u8,
            Region::RetryFinite => {
                self.retry_finite = 0;
                0
            }
            Region::RetryInfinite => {
                self.retry_infinite = 0;
                0
            }
            Region::Framebuffer => self.memory.read_framebuffer(address),
            Region::Rom => self.memory.read_rom(address),
            Region::BbaControl => self.bba.read_control(),
            Region::BbaScratchpad => self.bba.read_byte(address & SCRATCHPAD_MASK),
            Region::HostCsr => {
                self.violation(MachineError::CsrByteAccess { address });
                0
            }
            Region::HostLoopback => self.host.read_loopback(address),
            Region::HostInterrupt => {
                log::debug!("host interrupt");
                self.link.send(&Message::Int);
                0
            }
            Region::Io => self.io_read(address),
        }
    }

    fn write_byte(&mut self, address: u32, value: u8) {
        let address = address & ADDRESS_MASK;
        match self.map.region(address) {
            Region::BusError => self.bus_error(address, "write"),
            Region::Ram => self.memory.write_ram(address, value),
            Region::Unibus => self.unibus_write(&Message::Write8 {
                address: address - UNIBUS_BASE,
                data: value,
            }),
            Region::RetryFinite | Region::RetryInfinite | Region::HostInterrupt => {}
            Region::Framebuffer => self.memory.write_framebuffer(address, value),
            Region::Rom => self.violation(MachineError::RomWrite { address }),
            Region::BbaControl => match self.bba.write_control(value) {
                Control::ClearInterrupt => self.interrupts.set(BBA_LEVEL, false),
                Control::Start { latency } => self.events.schedule(latency, Event::BbaGo),
                Control::Ignored => {}
            },
            Region::BbaScratchpad => self.bba.write_byte(address & SCRATCHPAD_MASK, value),
            Region::HostCsr => self.violation(MachineError::CsrByteAccess { address }),
            Region::HostLoopback => {}
            Region::Io => self.io_write(address, value),
        }
    }

    fn read_word(&mut self, address: u32) -> u16 {
        let address = address & ADDRESS_MASK;
        match self.map.region(address) {
            Region::BusError
            | Region::RetryFinite
            | Region::RetryInfinite
            | Region::BbaControl
            | Region::HostInterrupt => read_word_as_byte(self, address),
            Region::Ram | Region::Framebuffer | Region::Rom | Region::HostLoopback => {
                read_word_as_bytes(self, address)
            }
            Region::Unibus => self.unibus_read(address, true),
            Region::BbaScratchpad => self.bba.read_word(address & SCRATCHPAD_MASK),
            Region::HostCsr => self.host.read_csr(address),
            Region::Io => self.io_read_word(address),
        }
    }

    fn write_word(&mut self, address: u32, value: u16) {
        let address = address & ADDRESS_MASK;
        match self.map.region(address) {
            Region::BusError
            | Region::RetryFinite
            | Region::RetryInfinite
            | Region::BbaControl
            | Region::HostInterrupt
            | Region::Rom => write_word_as_byte(self, address, value),
            Region::Ram | Region::Framebuffer | Region::HostLoopback => {
                write_word_as_bytes(self, address, value);
            }
            Region::Unibus => self.unibus_write(&Message::Write16 {
                address: address - UNIBUS_BASE,
                data: value,
            }),
            Region::BbaScratchpad => self.bba.write_word(address & SCRATCHPAD_MASK, value),
            Region::HostCsr => self.write_csr(address, value),
            Region::Io => self.violation(MachineError::IoWordWrite { address }),
        }
    }
}

/// The BBA masters RAM, the UNIBUS window, the framebuffer and ROM.
impl BbaMemory for Vs100Bus {
    fn read_word(&mut self, address: u32) -> u16 {
        match address >> 16 {
            0x00..=0x01 => u16::from_be_bytes([
                self.memory.read_ram(address),
                self.memory.read_ram(address + 1),
            ]),
            0x08..=0x0B => self.unibus_read(address, true),
            0x10..=0x17 => u16::from_be_bytes([
                self.memory.read_framebuffer(address),
                self.memory.read_framebuffer(address + 1),
            ]),
            0x18 => u16::from_be_bytes([
                self.memory.read_rom(address),
                self.memory.read_rom(address + 1),
            ]),
            _ => 0,
        }
    }

    fn write_word(&mut self, address: u32, value: u16) {
        let [hi, lo] = value.to_be_bytes();
        match address >> 16 {
            0x00..=0x01 => {
                self.memory.write_ram(address, hi);
                self.memory.write_ram(address + 1, lo);
            }
            0x08..=0x0B => self.unibus_write(&Message::Write16 {
                address: address - UNIBUS_BASE,
                data: value,
            }),
            0x10..=0x17 => {
                self.memory.write_framebuffer(address, hi);
                self.memory.write_framebuffer(address + 1, lo);
            }
            0x18 => log::warn!("BBA write to ROM at {address:06X} dropped"),
            _ => {}
        }
    }
}
