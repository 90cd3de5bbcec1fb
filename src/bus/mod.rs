use crate::config::EmuConfig;
use crate::mem::{MemError, Memory};

/// Value returned by loads from the peripheral region. No peripheral has
/// readable state.
pub const IO_READ_SENTINEL: u32 = 0;

/// Access width of a load or store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    Byte,
    Half,
    Word,
}

impl Width {
    pub fn mask(self) -> u32 {
        match self {
            Width::Byte => 0xff,
            Width::Half => 0xffff,
            Width::Word => 0xffff_ffff,
        }
    }
}

/// Receiver for writes to the LED register.
pub trait LedSink {
    fn write(&mut self, value: u32);
}

/// Prints every LED write to stderr as `LEDs: xxxxxxxx`.
#[derive(Default)]
pub struct StderrLeds;

impl LedSink for StderrLeds {
    fn write(&mut self, value: u32) {
        eprintln!("LEDs: {value:08x}");
    }
}

/// Records LED writes in order.
impl LedSink for Vec<u32> {
    fn write(&mut self, value: u32) {
        self.push(value);
    }
}

/// Routes data accesses either to RAM or to the peripheral region.
pub struct Bus<L> {
    pub ram: Memory,
    pub io_base: u32,
    pub led_addr: u32,
    pub leds: L,
}

impl<L: LedSink> Bus<L> {
    pub fn new(cfg: &EmuConfig, leds: L) -> Self {
        Self {
            ram: Memory::new(cfg.ram_words),
            io_base: cfg.io_base,
            led_addr: cfg.led_addr,
            leds,
        }
    }

    fn is_io(&self, addr: u32) -> bool {
        addr >= self.io_base
    }

    /// Instruction fetch. Code always comes from RAM.
    pub fn fetch(&self, addr: u32) -> Result<u32, MemError> {
        self.ram.read_u32(addr)
    }

    /// Reads `width` bytes at `addr`, zero-extended to 32 bits.
    pub fn load(&self, addr: u32, width: Width) -> Result<u32, MemError> {
        if self.is_io(addr) {
            tracing::debug!(addr = format_args!("0x{addr:08x}"), "load from peripheral region");
            return Ok(IO_READ_SENTINEL);
        }
        match width {
            Width::Byte => self.ram.read_u8(addr).map(u32::from),
            Width::Half => self.ram.read_u16(addr).map(u32::from),
            Width::Word => self.ram.read_u32(addr),
        }
    }

    /// Writes the low `width` bytes of `value` at `addr`.
    pub fn store(&mut self, addr: u32, width: Width, value: u32) -> Result<(), MemError> {
        if self.is_io(addr) {
            let value = value & width.mask();
            if addr == self.led_addr {
                self.leds.write(value);
            } else {
                tracing::debug!(
                    addr = format_args!("0x{addr:08x}"),
                    value = format_args!("0x{value:08x}"),
                    "store to unmapped peripheral dropped"
                );
            }
            return Ok(());
        }
        match width {
            Width::Byte => self.ram.write_u8(addr, value as u8),
            Width::Half => self.ram.write_u16(addr, value as u16),
            Width::Word => self.ram.write_u32(addr, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bus() -> Bus<Vec<u32>> {
        Bus::new(&EmuConfig::default(), Vec::new())
    }

    #[test]
    fn led_store_does_not_touch_ram() {
        let mut bus = bus();
        bus.store(0x8000_0000, Width::Word, 0x55).unwrap();
        assert_eq!(bus.leds, vec![0x55]);
        assert!((0..0x10000).step_by(4).all(|a| bus.ram.read_u32(a).unwrap() == 0));
    }

    #[test]
    fn narrow_led_store_is_masked() {
        let mut bus = bus();
        bus.store(0x8000_0000, Width::Byte, 0x1234).unwrap();
        bus.store(0x8000_0000, Width::Half, 0xdead_beef).unwrap();
        assert_eq!(bus.leds, vec![0x34, 0xbeef]);
    }

    #[test]
    fn unmapped_peripheral_store_is_dropped() {
        let mut bus = bus();
        bus.store(0x0001_0000, Width::Word, 7).unwrap();
        bus.store(0x8000_0004, Width::Word, 7).unwrap();
        assert!(bus.leds.is_empty());
    }

    #[test]
    fn peripheral_load_returns_sentinel() {
        let bus = bus();
        assert_eq!(bus.load(0x8000_0000, Width::Word), Ok(IO_READ_SENTINEL));
        assert_eq!(bus.load(0x0002_0001, Width::Byte), Ok(IO_READ_SENTINEL));
    }

    #[test]
    fn ram_loads_zero_extend() {
        let mut bus = bus();
        bus.store(0x100, Width::Word, 0xffff_ff80).unwrap();
        assert_eq!(bus.load(0x100, Width::Byte), Ok(0x80));
        assert_eq!(bus.load(0x100, Width::Half), Ok(0xff80));
        assert_eq!(bus.load(0x100, Width::Word), Ok(0xffff_ff80));
    }
}
