use clap::Parser;
use rv32i_emu::bus::StderrLeds;
use rv32i_emu::config::{
    DEFAULT_IO_BASE, DEFAULT_LED_ADDR, DEFAULT_RAM_WORDS, EmuConfig, InvalidPolicy,
};
use rv32i_emu::cpu::Machine;
use rv32i_emu::cpu::trap::CpuStepResult;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(version, about = "RV32I emulator for flat binary images")]
struct Args {
    /// Flat binary image, loaded at address 0
    image: String,

    /// RAM size in 32-bit words
    #[arg(long, default_value_t = DEFAULT_RAM_WORDS)]
    ram_words: usize,

    /// First address routed to peripherals instead of RAM
    #[arg(long, value_parser = parse_u32, default_value_t = DEFAULT_IO_BASE)]
    io_base: u32,

    /// Address of the LED output register
    #[arg(long, value_parser = parse_u32, default_value_t = DEFAULT_LED_ADDR)]
    led_addr: u32,

    /// Stop after N instructions (0 = run forever)
    #[arg(long, default_value_t = 0)]
    max_insns: u64,

    /// What to do with an undecodable instruction
    #[arg(long, value_enum, default_value_t = InvalidPolicy::Halt)]
    on_invalid: InvalidPolicy,

    /// Enable instruction trace
    #[arg(long, default_value_t = false)]
    trace: bool,
}

fn parse_u32(s: &str) -> Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid address {s:?}: {e}"))
}

fn init_logging(trace: bool) {
    let filter = if trace {
        EnvFilter::new("rv32i_emu=trace")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    fmt::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.trace);

    let cfg = EmuConfig {
        ram_words: args.ram_words,
        io_base: args.io_base,
        led_addr: args.led_addr,
        max_insns: args.max_insns,
        on_invalid: args.on_invalid,
        trace: args.trace,
    };
    let mut machine = Machine::new(&cfg, StderrLeds);

    match rv32i_emu::image::load_image_file(&args.image, &mut machine.bus.ram) {
        Ok(bytes) => tracing::info!(bytes, max = cfg.max_image_bytes(), "loaded {}", args.image),
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    }

    match machine.run() {
        CpuStepResult::Halt(reason) => {
            println!("CPU halted: {reason}");
            ExitCode::SUCCESS
        }
        CpuStepResult::Trapped(trap) => {
            eprintln!("CPU error: {trap}");
            eprintln!(
                "At PC: 0x{:08x}, executed {} instructions",
                trap.pc(),
                machine.executed
            );
            ExitCode::FAILURE
        }
    }
}
