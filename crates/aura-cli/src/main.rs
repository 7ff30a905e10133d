#![deny(unsafe_code)]

//! aura CLI — command-line control plane.

mod setup;

use std::time::Duration;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use aura_config::{AuraConfig, DEFAULT_PORT, paths};
use aura_core::control::ControlClient;
use aura_core::hue::HueClient;
use aura_core::hue::color::hex_to_xy;
use aura_core::pidfile::{PidFile, StopOutcome};
use aura_core::state::AuraState;
use aura_core::{Daemon, hooks};

/// aura — your desk light mirrors your coding agent's state.
#[derive(Parser)]
#[command(name = "aura", version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pair your Hue bridge, pick a light, choose colors, install hooks.
    Setup,

    /// Start the daemon.
    Start,

    /// Stop a running daemon.
    Stop,

    /// Show daemon state and configuration.
    Status,

    /// Cycle through all three states to verify your light.
    Demo,

    /// Update colors without re-running full setup.
    Colors {
        /// Idle state color.
        #[arg(long)]
        idle: Option<String>,

        /// Thinking state color.
        #[arg(long)]
        thinking: Option<String>,

        /// Needs-input state color.
        #[arg(long = "needs-input")]
        needs_input: Option<String>,
    },

    /// Manage agent hooks.
    Hooks {
        #[command(subcommand)]
        action: HooksAction,
    },

    /// Notify the daemon of a state change (called by installed hooks).
    #[command(hide = true)]
    Notify {
        /// State name: idle, thinking, needs_input.
        state: String,
    },
}

#[derive(Subcommand)]
enum HooksAction {
    /// Install agent hooks.
    Install,
    /// Remove agent hooks.
    Uninstall,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up tracing subscriber with verbosity level
    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    match cli.command {
        Commands::Setup => setup::run_setup().await?,
        Commands::Start => cmd_start().await?,
        Commands::Stop => cmd_stop()?,
        Commands::Status => cmd_status().await?,
        Commands::Demo => cmd_demo().await?,
        Commands::Colors {
            idle,
            thinking,
            needs_input,
        } => cmd_colors(idle, thinking, needs_input).await?,
        Commands::Hooks { action } => cmd_hooks(action)?,
        Commands::Notify { state } => cmd_notify(&state).await,
    }

    Ok(())
}

/// Load the persisted config, or fail with the missing prerequisite.
async fn load_config() -> Result<AuraConfig> {
    let path = paths::config_path()?;
    if !path.exists() {
        bail!("no configuration found. Run \"aura setup\" first");
    }
    Ok(AuraConfig::load(&path).await?)
}

/// The invocation installed hooks use to reach the notifier.
fn notify_program() -> String {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.to_str().map(String::from))
        .unwrap_or_else(|| "aura".to_string())
}

async fn cmd_start() -> Result<()> {
    let config = load_config().await?;
    let pidfile = PidFile::at_default_path()?;
    let daemon = Daemon::new(config);
    daemon.run(&pidfile).await?;
    Ok(())
}

fn cmd_stop() -> Result<()> {
    let pidfile = PidFile::at_default_path()?;
    match pidfile.signal_stop() {
        StopOutcome::Signaled(pid) => println!("Daemon (PID {pid}) stopped."),
        StopOutcome::NotRunning => println!("No daemon is running."),
    }
    Ok(())
}

async fn cmd_status() -> Result<()> {
    let config = load_config().await?;
    let pidfile = PidFile::at_default_path()?;
    let running = pidfile.is_running();

    println!("aura status\n");
    match pidfile.read() {
        Some(pid) if running => println!("  Daemon:  running (PID {pid})"),
        _ => println!("  Daemon:  stopped"),
    }
    println!("  Bridge:  {}", config.bridge.ip);
    println!("  Light:   {} (ID: {})", config.light.name, config.light.id);
    println!("  Port:    {}", config.port);
    println!("  Colors:");
    println!("    idle:        {}", config.colors.idle);
    println!("    thinking:    {}", config.colors.thinking);
    println!("    needs_input: {}", config.colors.needs_input);

    if running {
        match ControlClient::new(config.port)?.status().await {
            Ok(status) => println!("\n  Current state: {}", status.state),
            Err(_) => println!("\n  Could not reach daemon."),
        }
    }
    Ok(())
}

async fn cmd_demo() -> Result<()> {
    let config = load_config().await?;
    let client = HueClient::new(&config.bridge.ip, &config.bridge.username)?;

    println!("\nDemo: cycling through states. Press Ctrl+C to stop.\n");
    for state in AuraState::ALL.iter().cycle() {
        let mut target = aura_core::state::resolve(&config, *state)?;
        // Fixed 2 s fade so each step is clearly visible.
        target.transition_time = 20;
        client.set_light_state(config.light.id, &target).await?;
        println!("  {} ({})", state, state.configured_hex(&config));
        tokio::time::sleep(Duration::from_secs(4)).await;
    }
    Ok(())
}

async fn cmd_colors(
    idle: Option<String>,
    thinking: Option<String>,
    needs_input: Option<String>,
) -> Result<()> {
    let path = paths::config_path()?;
    if !path.exists() {
        bail!("no configuration found. Run \"aura setup\" first");
    }
    let mut config = AuraConfig::load(&path).await?;
    let mut changed = false;

    for (name, slot, value) in [
        ("idle", &mut config.colors.idle, idle),
        ("thinking", &mut config.colors.thinking, thinking),
        ("needs_input", &mut config.colors.needs_input, needs_input),
    ] {
        if let Some(hex) = value {
            if hex_to_xy(&hex).is_none() {
                bail!("invalid hex for {name}: {hex}");
            }
            *slot = hex;
            changed = true;
            println!("  {name}: {slot}");
        }
    }

    if changed {
        config.save(&path).await?;
        println!("\nColors updated. Restart the daemon to apply.");
    } else {
        println!("No colors specified. Usage:");
        println!("  aura colors --idle \"#E8DCC8\" --thinking \"#DA7756\" --needs-input \"#E3A869\"");
    }
    Ok(())
}

fn cmd_hooks(action: HooksAction) -> Result<()> {
    let path = hooks::default_settings_path()?;
    match action {
        HooksAction::Install => {
            hooks::install_hooks(&path, &notify_program())?;
            println!("Agent hooks installed:");
            println!("  UserPromptSubmit -> thinking");
            println!("  Notification (permission_prompt) -> needs_input");
            println!("  Notification (idle_prompt) -> needs_input");
            println!("  Stop -> needs_input");
            println!("\n  Settings: {}", path.display());
        }
        HooksAction::Uninstall => {
            let removed = hooks::uninstall_hooks(&path)?;
            println!("Removed {removed} aura hook(s).");
        }
    }
    Ok(())
}

/// Best-effort state notification. Exits 0 regardless of outcome: a hook
/// invocation must never fail its caller because the light is down.
async fn cmd_notify(state: &str) {
    let port = match paths::config_path() {
        Ok(path) if path.exists() => AuraConfig::load(&path)
            .await
            .map(|c| c.port)
            .unwrap_or(DEFAULT_PORT),
        _ => DEFAULT_PORT,
    };
    if let Ok(client) = ControlClient::new(port) {
        client.notify(state).await;
    }
}
