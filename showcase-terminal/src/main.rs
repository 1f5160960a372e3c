/// Drill Showcase - Terminal Demo
///
/// Scroll through the product page while the camera flies around the drill.
/// Controls:
///   - j/k, Arrow Keys, PageUp/PageDown: Scroll
///   - h / f: Jump to the second section / back to top
///   - c / x: Enter / leave the customizer
///   - 1/2/3: Pick a finish, WASD orbits while customizing
///   - r: Retry a failed load
///   - Q/ESC: Quit

use clap::Parser;
use showcase_core::{ConfiguratorConfig, DeviceProfile};
use showcase_terminal::{to_io_error, TerminalApp};
use std::io;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "showcase-terminal", about = "Scroll-driven drill showcase in the terminal")]
struct Args {
    /// JSON configurator settings; built-in drill showcase when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Use the mobile camera poses and field of view
    #[arg(long)]
    mobile: bool,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    print_config: bool,
}

fn load_config(path: Option<&PathBuf>) -> io::Result<ConfiguratorConfig> {
    let Some(path) = path else {
        return Ok(ConfiguratorConfig::default());
    };
    let json = std::fs::read_to_string(path)?;
    ConfiguratorConfig::from_json_str(&json).map_err(|err| to_io_error(err.into()))
}

fn main() -> io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let config = load_config(args.config.as_ref())?;
    if args.print_config {
        let json = config.to_json_pretty().map_err(|err| to_io_error(err.into()))?;
        println!("{json}");
        return Ok(());
    }

    let profile = if args.mobile {
        DeviceProfile::Mobile
    } else {
        DeviceProfile::Desktop
    };

    println!("Drill Showcase - Loading...");
    log::info!("starting with {:?} profile", profile);

    let mut app = TerminalApp::new(config, profile)?;
    app.run()?;

    println!("Thank you for visiting the Drill Showcase!");
    Ok(())
}
