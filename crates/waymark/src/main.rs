//! `waymark` - CLI for the location ledger
//!
//! This binary provides the command-line interface for capturing, naming,
//! and managing saved GPS locations.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::Write;

use anyhow::Context;
use clap::Parser;
use clipboard_rs::{Clipboard, ClipboardContext};

use waymark::cli::{
    AddCommand, Cli, ClearCommand, Command, ConfigCommand, CopyCommand, ListCommand,
    OutputFormat, RemoveCommand, RenameCommand,
};
use waymark::record::Fix;
use waymark::{
    init_logging, BusySignal, CaptureFlow, Config, Error, FixedProvider, GpsdProvider,
    Ledger, LocationProvider, PrefStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    // Execute the command
    match cli.command {
        Command::Add(add_cmd) => handle_add(&config, &add_cmd).await,
        Command::List(list_cmd) => handle_list(&config, &list_cmd),
        Command::Rename(rename_cmd) => handle_rename(&config, &rename_cmd),
        Command::Remove(remove_cmd) => handle_remove(&config, &remove_cmd),
        Command::Clear(clear_cmd) => handle_clear(&config, &clear_cmd),
        Command::Copy(copy_cmd) => handle_copy(&config, &copy_cmd),
        Command::Status(status_cmd) => handle_status(&config, status_cmd.json),
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

/// Open the ledger, pointing the user at `waymark clear` if the saved list
/// is unreadable.
fn open_ledger(config: &Config) -> anyhow::Result<Ledger> {
    let store = PrefStore::open(config.database_path())?;
    Ledger::open(store).map_err(|e| {
        if e.is_decode_error() {
            anyhow::anyhow!("{e}\nRun 'waymark clear --yes' to discard the saved list.")
        } else {
            e.into()
        }
    })
}

async fn handle_add(config: &Config, cmd: &AddCommand) -> anyhow::Result<()> {
    // An empty name is a cancel, not a failure
    if cmd.name.is_empty() {
        println!("Nothing to save.");
        return Ok(());
    }

    let mut ledger = open_ledger(config)?;

    // Manual coordinates bypass the sensor entirely
    let provider: Box<dyn LocationProvider> = match (cmd.lat, cmd.lon) {
        (Some(lat), Some(lon)) => Box::new(FixedProvider::new(Fix::new(lat, lon))),
        _ => Box::new(GpsdProvider::new(
            config.sensor_addr(),
            config.sensor_timeout(),
        )),
    };

    let mut flow = CaptureFlow::new(&mut ledger, provider.as_ref(), BusySignal::new());
    match flow.capture(&cmd.name).await? {
        Some(record) => {
            println!("Saved '{}' at {}", record.name, record.coordinates());
            Ok(())
        }
        None => {
            eprintln!("Could not obtain a location fix; nothing was saved.");
            std::process::exit(1);
        }
    }
}

fn handle_list(config: &Config, cmd: &ListCommand) -> anyhow::Result<()> {
    let ledger = open_ledger(config)?;
    let records = ledger.snapshot();

    match cmd.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(records)?);
        }
        OutputFormat::Plain => {
            if records.is_empty() {
                println!("No saved locations.");
                return Ok(());
            }

            let name_width = records.iter().map(|r| r.name.len()).max().unwrap_or(0);
            for record in records {
                println!(
                    "{:name_width$}  Latitude: {}  Longitude: {}",
                    record.name, record.latitude, record.longitude
                );
            }
        }
    }
    Ok(())
}

fn handle_rename(config: &Config, cmd: &RenameCommand) -> anyhow::Result<()> {
    if cmd.new_name.is_empty() || cmd.new_name == cmd.old_name {
        println!("Nothing to rename.");
        return Ok(());
    }

    let mut ledger = open_ledger(config)?;
    ledger.rename(&cmd.old_name, &cmd.new_name)?;
    println!("Renamed '{}' to '{}'", cmd.old_name, cmd.new_name);
    Ok(())
}

fn handle_remove(config: &Config, cmd: &RemoveCommand) -> anyhow::Result<()> {
    let mut ledger = open_ledger(config)?;

    if !ledger.contains(&cmd.name) {
        return Err(Error::not_found(&cmd.name).into());
    }

    if !cmd.yes && !confirm(&format!("Delete '{}'? [y/N] ", cmd.name))? {
        println!("Cancelled.");
        return Ok(());
    }

    ledger.remove(&cmd.name)?;
    println!("Removed '{}'", cmd.name);
    Ok(())
}

fn handle_clear(config: &Config, cmd: &ClearCommand) -> anyhow::Result<()> {
    let mut ledger = open_ledger(config)?;

    // An empty list may still be stored as "[]"; clear without prompting
    // so the key itself is erased.
    if ledger.is_empty() {
        ledger.clear()?;
        println!("No saved locations.");
        return Ok(());
    }

    let prompt = format!("Delete all {} saved locations? [y/N] ", ledger.len());
    if !cmd.yes && !confirm(&prompt)? {
        println!("Cancelled.");
        return Ok(());
    }

    ledger.clear()?;
    println!("Cleared all saved locations.");
    Ok(())
}

fn handle_copy(config: &Config, cmd: &CopyCommand) -> anyhow::Result<()> {
    let ledger = open_ledger(config)?;
    let record = ledger
        .find(&cmd.name)
        .ok_or_else(|| Error::not_found(&cmd.name))?;

    let coordinates = record.coordinates();
    let ctx =
        ClipboardContext::new().map_err(|e| Error::clipboard(e.to_string()))?;
    ctx.set_text(coordinates.clone())
        .map_err(|e| Error::clipboard(e.to_string()))?;

    println!("Copied '{}' to clipboard: {}", record.name, coordinates);
    Ok(())
}

fn handle_status(config: &Config, json: bool) -> anyhow::Result<()> {
    let ledger = open_ledger(config)?;

    if json {
        let status = serde_json::json!({
            "saved_locations": ledger.len(),
            "database_path": config.database_path(),
            "sensor_endpoint": config.sensor_addr(),
            "sensor_timeout_secs": config.sensor.timeout_secs,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("waymark status");
        println!("--------------");
        println!("Saved locations: {}", ledger.len());
        println!("Database:        {}", config.database_path().display());
        println!("Sensor:          gpsd at {}", config.sensor_addr());
        println!("Fetch deadline:  {}s", config.sensor.timeout_secs);
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:   {}", config.database_path().display());
                println!();
                println!("[Sensor]");
                println!("  Endpoint:        {}", config.sensor_addr());
                println!("  Timeout (secs):  {}", config.sensor.timeout_secs);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}

/// Ask a yes/no question on stdin. Anything but an explicit yes declines.
fn confirm(prompt: &str) -> anyhow::Result<bool> {
    print!("{prompt}");
    std::io::stdout().flush().context("failed to flush stdout")?;

    let mut answer = String::new();
    std::io::stdin()
        .read_line(&mut answer)
        .context("failed to read confirmation")?;

    let answer = answer.trim();
    Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
}
