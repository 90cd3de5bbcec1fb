/// 64 KiB of RAM.
pub const DEFAULT_RAM_WORDS: usize = 16384;
/// Addresses at or above this go to peripherals instead of RAM.
pub const DEFAULT_IO_BASE: u32 = 0x0001_0000;
/// The LED output register.
pub const DEFAULT_LED_ADDR: u32 = 0x8000_0000;

/// What the run loop does when it hits an encoding it cannot decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum InvalidPolicy {
    /// Stop the run and report the trap.
    #[default]
    Halt,
    /// Log it and continue at `pc + 4`.
    Skip,
}

#[derive(Debug, Clone)]
pub struct EmuConfig {
    pub ram_words: usize,
    pub io_base: u32,
    pub led_addr: u32,
    /// Stop after N instructions (0 = run forever)
    pub max_insns: u64,
    pub on_invalid: InvalidPolicy,
    pub trace: bool,
}

impl Default for EmuConfig {
    fn default() -> Self {
        Self {
            ram_words: DEFAULT_RAM_WORDS,
            io_base: DEFAULT_IO_BASE,
            led_addr: DEFAULT_LED_ADDR,
            max_insns: 0,
            on_invalid: InvalidPolicy::Halt,
            trace: false,
        }
    }
}

impl EmuConfig {
    /// Largest image that fits in RAM.
    pub fn max_image_bytes(&self) -> usize {
        self.ram_words * 4
    }
}
