// demos/identify.rs

use clap::Parser;
use nvme_ident::{identify_controller_at, IdentifyController, PassthruConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Print the Identify Controller data of an NVMe device.
#[derive(Parser, Debug)]
struct Args {
    /// Controller device, e.g. /dev/nvme0 or \\.\PhysicalDrive0
    device: PathBuf,

    /// Timeout handed to the driver, in milliseconds
    #[arg(long, default_value_t = nvme_ident::DEFAULT_ADMIN_TIMEOUT_MS)]
    timeout_ms: u32,

    /// Also list every reported power state
    #[arg(long)]
    power_states: bool,
}

fn main() {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    println!("--- nvme-ident: Identify Controller ---");
    println!("NOTE: This requires administrator or root privileges to run!\n");

    let config = PassthruConfig { timeout_ms: args.timeout_ms };
    match identify_controller_at(&args.device, &config) {
        Ok(id) => print_controller(&args, &id),
        Err(e) => {
            eprintln!("[ERROR] Failed to identify {}: {}", args.device.display(), e);
            if let Some(errno) = e.raw_os_error() {
                eprintln!("        (os error {})", errno);
            }
            std::process::exit(1);
        }
    }
}

fn print_controller(args: &Args, id: &IdentifyController) {
    let (major, minor, tertiary) = id.spec_version();
    println!("----------------------------------------");
    println!("  Device Path:       {}", args.device.display());
    println!("  Vendor ID:         {:#06x}", id.vendor_id);
    println!("  Model number:      {}", id.model());
    println!("  Serial number:     {}", id.serial());
    println!("  Firmware version:  {}", id.firmware());
    println!("  IEEE OUI:          {:#08x}", id.ieee_oui());
    println!("  NVMe version:      {}.{}.{}", major, minor, tertiary);
    println!("  Namespaces:        {}", id.namespace_count);
    println!("  Total capacity:    {} bytes", id.total_capacity);
    if let Some(t) = id.warning_temp_celsius() {
        println!("  Warning temp:      {} C", t);
    }
    println!("  Power states:      {}", id.power_state_count());
    println!("----------------------------------------");

    if args.power_states {
        for (i, ps) in id.reported_power_states().iter().enumerate() {
            println!(
                "    ps {:<2} {:>7.2} W  enlat {:>8} us  exlat {:>8} us{}",
                i,
                ps.max_power_watts(),
                ps.entry_latency_us,
                ps.exit_latency_us,
                if ps.is_non_operational() { "  (non-operational)" } else { "" }
            );
        }
    }
}
