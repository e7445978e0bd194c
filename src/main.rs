use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use nvme_access::config::{AccessConfig, LogFormat};
use nvme_access::{
    BlockSize, DeviceAccess, DeviceBackend, DeviceError, Lba, SmartInfo, SystemBackend,
};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nvme-access")]
#[command(about = "Read NVMe SMART/health data and raw logical blocks")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true, env = "NVME_ACCESS_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the SMART/Health log of a controller
    Smart {
        /// Controller or namespace path (e.g., /dev/nvme0)
        device: String,

        /// Print the raw record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Read one logical block
    Read {
        /// Namespace block device (e.g., /dev/nvme0n1)
        device: String,

        /// Logical block address
        #[arg(long)]
        lba: u64,

        /// Block size in bytes (defaults to the configured block size)
        #[arg(short, long)]
        block_size: Option<usize>,

        /// Write the block to this file instead of a hex dump on stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write one logical block (DESTROYS the data at that block)
    Write {
        /// Namespace block device (e.g., /dev/nvme0n1)
        device: String,

        /// Logical block address
        #[arg(long)]
        lba: u64,

        /// Block size in bytes (defaults to the configured block size)
        #[arg(short, long)]
        block_size: Option<usize>,

        /// File holding at least one block of data; only the first block is written
        #[arg(short, long)]
        input: PathBuf,

        /// Required: confirm overwriting the block
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!("Error: {:#}", err);
        // Device errors exit with their errno so scripts can tell causes apart
        let code = err
            .downcast_ref::<DeviceError>()
            .map(|e| -e.errno())
            .unwrap_or(1);
        std::process::exit(code);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => AccessConfig::load_from(Some(path), true)?,
        None => AccessConfig::load()?,
    };

    init_logging(&config, cli.debug);

    let access = DeviceAccess::<SystemBackend>::new();
    tracing::debug!(platform = access.backend().platform_name(), "Starting");

    match cli.command {
        Commands::Smart { device, json } => {
            let info = access.read_smart_log(&device)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                print_smart(&device, &info);
            }
        }
        Commands::Read {
            device,
            lba,
            block_size,
            output,
        } => {
            let block_size = resolve_block_size(block_size, &config)?;
            let mut buffer = vec![0u8; block_size.get()];
            access.read_block(&device, lba, &mut buffer, block_size.get())?;

            match output {
                Some(path) => {
                    std::fs::write(&path, &buffer)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!(
                        "Read LBA {} ({} bytes) from {} into {}",
                        lba,
                        block_size,
                        device,
                        path.display()
                    );
                }
                None => {
                    let offset = Lba(lba).byte_offset(block_size)?;
                    hex_dump(&mut io::stdout().lock(), &buffer, offset)?;
                }
            }
        }
        Commands::Write {
            device,
            lba,
            block_size,
            input,
            force,
        } => {
            if !force {
                bail!(
                    "Refusing to overwrite LBA {} on {} without --force",
                    lba,
                    device
                );
            }

            let block_size = resolve_block_size(block_size, &config)?;
            let data = std::fs::read(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            if data.len() < block_size.get() {
                bail!(
                    "{} holds {} bytes, need at least one block of {}",
                    input.display(),
                    data.len(),
                    block_size
                );
            }

            access.write_block(&device, lba, &data, block_size.get())?;
            println!("Wrote LBA {} ({} bytes) to {}", lba, block_size, device);
        }
    }

    Ok(())
}

fn init_logging(config: &AccessConfig, debug: bool) {
    let filter = if debug {
        EnvFilter::new("nvme_access=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter))
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);

    match config.log_format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

fn resolve_block_size(arg: Option<usize>, config: &AccessConfig) -> Result<BlockSize> {
    match arg {
        Some(bytes) => Ok(BlockSize::new(bytes)?),
        None => config.block_size(),
    }
}

fn print_smart(device: &str, info: &SmartInfo) {
    println!("SMART/Health Information for {}", device);
    println!("{}", "=".repeat(48));
    println!("Critical warning:        {:#04x}", info.critical_warning);
    println!(
        "Composite temperature:   {} K ({} °C)",
        info.composite_temperature,
        info.temperature_celsius()
    );
    println!("Available spare:         {}%", info.available_spare);
    println!("Spare threshold:         {}%", info.available_spare_threshold);
    println!("Percentage used:         {}%", info.percentage_used);
    println!(
        "Data units read:         {} ({} bytes)",
        info.data_units_read,
        info.bytes_read()
    );
    println!(
        "Data units written:      {} ({} bytes)",
        info.data_units_written,
        info.bytes_written()
    );
    println!("Power-on hours:          {}", info.power_on_hours);
    println!("Unsafe shutdowns:        {}", info.unsafe_shutdowns);
    println!("Media errors:            {}", info.media_errors);
}

fn hex_dump(out: &mut impl Write, data: &[u8], base_offset: u64) -> io::Result<()> {
    for (i, chunk) in data.chunks(16).enumerate() {
        write!(out, "{:012x}  ", base_offset + (i * 16) as u64)?;
        for byte in chunk {
            write!(out, "{:02x} ", byte)?;
        }
        for _ in chunk.len()..16 {
            write!(out, "   ")?;
        }
        let ascii: String = chunk
            .iter()
            .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
            .collect();
        writeln!(out, " |{}|", ascii)?;
    }
    Ok(())
}
