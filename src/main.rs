use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use e220_rs::config::file::{load_json, save_json};
use e220_rs::hal::raspberry_pi::{RaspberryPiHalBuilder, RaspberryPiPins, RaspberryPiUart};
use e220_rs::logging::{init_logger_with_default, log_debug, log_error, log_info, log_warn};
use e220_rs::{
    Clock, DriverConfig, E220Driver, ModePins, SerialIo, SerialPortIo, SerialSettings,
    SystemClock,
};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "e220-cli")]
#[command(about = "CLI tool for EBYTE E220 LoRa modules")]
struct Cli {
    /// UART device connected to the module
    #[arg(long, default_value = "/dev/serial0")]
    port: String,

    #[arg(short, long, default_value = "9600")]
    baudrate: u32,

    /// Open the port through the OS serial driver (USB adapters)
    #[arg(long)]
    usb_serial: bool,

    /// BCM GPIO for M0
    #[arg(long, default_value = "23")]
    m0: u8,

    /// BCM GPIO for M1
    #[arg(long, default_value = "24")]
    m1: u8,

    /// BCM GPIO for AUX
    #[arg(long, default_value = "25")]
    aux: u8,

    /// JSON file with driver timing overrides
    #[arg(long)]
    driver_config: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the module configuration
    ReadConfig {
        #[arg(long)]
        json: bool,
        /// Also store it as JSON
        #[arg(long)]
        save: Option<PathBuf>,
    },
    /// Write a configuration from a JSON file
    WriteConfig {
        #[arg(long)]
        file: PathBuf,
        /// Read back and compare after writing
        #[arg(long)]
        verify: bool,
    },
    /// Send one line
    Send { text: String },
    /// Print received lines
    Listen {
        /// Stop after this many lines
        #[arg(long)]
        count: Option<usize>,
        #[arg(long, default_value = "50")]
        poll_ms: u64,
    },
}

fn load_driver_config(path: Option<&PathBuf>) -> Result<DriverConfig> {
    let Some(path) = path else {
        return Ok(DriverConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let config: DriverConfig =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    log_debug(&format!("Driver config from {}: {config:?}", path.display()));
    Ok(config)
}

fn run<P: ModePins, S: SerialIo>(
    pins: P,
    io: S,
    config: DriverConfig,
    command: Commands,
) -> Result<()> {
    let clock = SystemClock::new();
    let mut driver = E220Driver::new(pins, io, clock, config)?;
    if !driver.last_readiness().is_ready() {
        log_warn("Module did not report ready after start-up; continuing");
    }

    match command {
        Commands::ReadConfig { json, save } => {
            let cfg = driver.read_configuration()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&cfg)?);
            } else {
                println!("{cfg}");
            }
            if let Some(path) = save {
                save_json(&path, &cfg)?;
                log_info(&format!("Saved configuration to {}", path.display()));
            }
        }
        Commands::WriteConfig { file, verify } => {
            let cfg = load_json(&file)?;
            if verify {
                let actual = driver.apply_configuration(&cfg)?;
                log_info("Configuration written and verified");
                println!("{actual}");
            } else {
                driver.write_configuration(&cfg)?;
                log_info("Configuration written");
            }
        }
        Commands::Send { text } => {
            driver.send_line(&text)?;
            log_info(&format!("Sent [{text}]"));
        }
        Commands::Listen { count, poll_ms } => {
            let poll = Duration::from_millis(poll_ms);
            let mut received = 0usize;
            loop {
                if let Some(line) = driver.receive_line()? {
                    println!("{line}");
                    received += 1;
                    if count.is_some_and(|limit| received >= limit) {
                        break;
                    }
                    continue;
                }
                clock.sleep(poll);
            }
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger_with_default(if cli.verbose { "debug" } else { "info" });

    let config = load_driver_config(cli.driver_config.as_ref())?;
    let builder = RaspberryPiHalBuilder::new()
        .uart_path(&cli.port)
        .baudrate(cli.baudrate)
        .m0_pin(cli.m0)
        .m1_pin(cli.m1)
        .aux_pin(cli.aux);

    let result = if cli.usb_serial {
        builder.validate()?;
        let pins = RaspberryPiPins::new(builder.pins())?;
        let settings = SerialSettings {
            port: cli.port.clone(),
            baudrate: cli.baudrate,
            ..SerialSettings::default()
        };
        let io = SerialPortIo::open(&settings)?;
        run(pins, io, config, cli.command)
    } else {
        let (pins, uart): (RaspberryPiPins, RaspberryPiUart) = builder.build()?;
        run(pins, uart, config, cli.command)
    };

    if let Err(e) = &result {
        log_error(&format!("Command failed: {e:#}"));
    }
    result
}
