//! DEC VAXstation 100.
//!
//! A 68000 with 128 KiB of RAM, a 16 KiB boot ROM, a 1088x864 monochrome
//! framebuffer and the BBA raster engine, tied to a remote host over a
//! fibre link that also exposes a window onto the host's UNIBUS. The
//! keyboard hangs off a 2661 UART; the tablet UART has nothing attached.
//!
//! [`Vs100::step`] runs one instruction and then lets the rest of the
//! machine catch up: link events first, then timed events, then interrupt
//! arbitration.

mod bus;
pub mod config;
mod error;
pub mod events;
pub mod fibre;
pub mod host;
pub mod interrupts;
pub mod io;
pub mod map;
pub mod memory;

use cpu_m68k::Cpu68000;
use dec_bba::Bba;
use emu_core::{ADDRESS_MASK, Cpu, Observable, Ticks, Value};

pub use crate::bus::Vs100Bus;
pub use crate::config::Vs100Config;
pub use crate::error::MachineError;
use crate::fibre::Link;
use crate::io::{MouseButton, led_pattern};
use crate::map::Region;
use crate::memory::Memory;

pub struct Vs100 {
    pub cpu: Cpu68000,
    pub bus: Vs100Bus,
    trace: bool,
    /// CPU cycle count already handed to the event queue.
    accounted: Ticks,
}

impl Vs100 {
    /// Build the machine, connect to the host if one is configured, and
    /// run the reset sequence.
    pub fn new(config: Vs100Config) -> Result<Self, MachineError> {
        let memory = Memory::new(&config.rom)?;
        let link = match &config.host {
            Some(address) => Link::connect(address)?,
            None => Link::disconnected(),
        };
        let bus = Vs100Bus::new(
            memory,
            Bba::new(config.bba_latency),
            link,
            config.vsync_period,
        );
        let mut machine = Self {
            cpu: Cpu68000::new(),
            bus,
            trace: config.trace,
            accounted: Ticks::ZERO,
        };
        machine.reset()?;
        Ok(machine)
    }

    /// Reload SSP and PC from the vectors at address 0 and start the
    /// vertical sync.
    pub fn reset(&mut self) -> Result<(), MachineError> {
        self.cpu.reset(&mut self.bus)?;
        if let Some(error) = self.bus.take_fatal() {
            return Err(error);
        }
        self.accounted = self.cpu.total_cycles();
        self.bus.start_vsync();
        log::info!("reset: pc={:06X}", self.cpu.pc() & ADDRESS_MASK);
        Ok(())
    }

    /// Execute one instruction and service the devices. Returns the ticks
    /// that elapsed.
    pub fn step(&mut self) -> Result<Ticks, MachineError> {
        self.bus.process_link();

        if self.trace {
            let (ir, _) = self.cpu.prefetch();
            log::info!("{:06X}  {ir:04X}", self.cpu.pc() & ADDRESS_MASK);
        }
        self.cpu.execute(&mut self.bus)?;
        if let Some(error) = self.bus.take_fatal() {
            return Err(error);
        }

        let now = self.cpu.total_cycles();
        let elapsed = now - self.accounted;
        self.accounted = now;
        self.bus.run_events(elapsed);

        self.cpu.set_ipl(self.bus.interrupts.level());
        self.cpu.poll_interrupt(&mut self.bus)?;
        if let Some(error) = self.bus.take_fatal() {
            return Err(error);
        }
        Ok(elapsed)
    }

    /// Run up to `steps` instructions, stopping at the first fatal error.
    pub fn run(&mut self, steps: u64) -> Result<(), MachineError> {
        for _ in 0..steps {
            self.step()?;
        }
        Ok(())
    }

    /// Machine time in master clock ticks.
    #[must_use]
    pub fn now(&self) -> Ticks {
        self.bus.events.now()
    }

    pub fn key_down(&mut self, code: u8) {
        let started = self.bus.lk201.key_down(code);
        self.bus.keyboard_started(started);
    }

    pub fn key_up(&mut self, code: u8) {
        let started = self.bus.lk201.key_up(code);
        self.bus.keyboard_started(started);
    }

    /// Relative mouse motion; positive `dy` is towards the user.
    pub fn mouse_motion(&mut self, dx: i32, dy: i32) {
        self.bus.mouse.motion(dx, dy);
    }

    pub fn mouse_button(&mut self, button: MouseButton, pressed: bool) {
        let bit = button.status_bit();
        if pressed {
            self.bus.status.clear(bit, &mut self.bus.interrupts);
        } else {
            self.bus.status.set(bit, &mut self.bus.interrupts);
        }
    }

    #[must_use]
    pub fn framebuffer(&self) -> &[u8] {
        &self.bus.memory.framebuffer
    }

    /// The visible screen as a PBM image.
    #[must_use]
    pub fn screen_pbm(&self) -> Vec<u8> {
        self.bus.memory.screen_pbm()
    }

    /// Side-effect free read of RAM, framebuffer or ROM.
    #[must_use]
    pub fn peek(&self, address: u32) -> Option<u8> {
        let address = address & ADDRESS_MASK;
        let memory = &self.bus.memory;
        match self.bus.map.region(address) {
            Region::Ram => Some(memory.read_ram(address)),
            Region::Framebuffer => Some(memory.read_framebuffer(address)),
            Region::Rom => Some(memory.read_rom(address)),
            _ => None,
        }
    }
}

fn parse_address(text: &str) -> Option<u32> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).ok()
    } else {
        text.parse().ok()
    }
}

const QUERY_PATHS: &[&str] = &[
    "cpu.<reg>",
    "bba.<field>",
    "keyboard.<reg>",
    "tablet.<reg>",
    "crtc.<reg>",
    "memory.<address>",
    "status",
    "ipl",
    "leds",
    "leds.pattern",
    "mouse.x",
    "mouse.y",
    "retry_finite",
    "retry_infinite",
    "bus_errors",
    "link",
    "ticks",
];

impl Observable for Vs100 {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix("cpu.") {
            self.cpu.query(rest)
        } else if let Some(rest) = path.strip_prefix("bba.") {
            self.bus.bba.query(rest)
        } else if let Some(rest) = path.strip_prefix("keyboard.") {
            self.bus.keyboard.query(rest)
        } else if let Some(rest) = path.strip_prefix("tablet.") {
            self.bus.tablet.query(rest)
        } else if let Some(rest) = path.strip_prefix("crtc.") {
            self.bus.crtc.query(rest)
        } else if let Some(rest) = path.strip_prefix("memory.") {
            self.peek(parse_address(rest)?).map(Value::U8)
        } else {
            match path {
                "status" => Some(self.bus.status.bits().into()),
                "ipl" => Some(self.bus.interrupts.level().into()),
                "leds" => Some(self.bus.leds.into()),
                "leds.pattern" => Some(Value::String(led_pattern(self.bus.leds))),
                "mouse.x" => Some(self.bus.mouse.x.into()),
                "mouse.y" => Some(self.bus.mouse.y.into()),
                "retry_finite" => Some(self.bus.retry_finite.into()),
                "retry_infinite" => Some(self.bus.retry_infinite.into()),
                "bus_errors" => Some(self.bus.bus_errors.into()),
                "link" => Some(self.bus.link.is_connected().into()),
                "ticks" => Some(self.now().get().into()),
                _ => None,
            }
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        QUERY_PATHS
    }
}
