//! Interactive setup wizard: discover, pair, pick a light, choose colors.
//!
//! Line-oriented prompts on stdin/stdout; every network step degrades to
//! manual entry or a bounded retry.

use std::io::{self, Write};

use anyhow::{Context, Result, bail};

use aura_config::{
    AuraConfig, BridgeConfig, ColorsConfig, DEFAULT_BRIGHTNESS, DEFAULT_PORT,
    DEFAULT_TRANSITION_MS, LightConfig, paths,
};
use aura_core::hooks;
use aura_core::hue::HueClient;
use aura_core::hue::bridge::{self, BridgeLight};
use aura_core::hue::color::hex_to_xy;

/// Pairing gives the user this many chances to press the link button.
const PAIR_ATTEMPTS: u32 = 3;

pub async fn run_setup() -> Result<()> {
    println!("\naura setup\n");

    println!("Searching for Hue bridges on your network...");
    let bridge_ip = pick_bridge().await?;

    println!("\nPress the link button on your Hue bridge, then press Enter.");
    prompt("Press Enter when ready...")?;
    let username = pair(&bridge_ip).await?;

    println!("\nFetching lights...");
    let lights = bridge::get_lights(&bridge_ip, &username).await?;
    if lights.is_empty() {
        bail!("no lights found on this bridge");
    }
    let light = pick_light(&lights)?;

    println!("Flashing \"{}\" to confirm...", light.name);
    let client = HueClient::new(&bridge_ip, &username)?;
    client.flash(light.id).await.context("could not flash the light")?;

    let colors = pick_colors()?;

    let config = AuraConfig {
        bridge: BridgeConfig {
            ip: bridge_ip,
            username,
        },
        light: LightConfig {
            id: light.id,
            name: light.name.clone(),
        },
        colors,
        brightness: DEFAULT_BRIGHTNESS,
        transition_ms: DEFAULT_TRANSITION_MS,
        port: DEFAULT_PORT,
    };
    let config_path = paths::config_path()?;
    config.save(&config_path).await?;
    println!("\nConfiguration saved to {}", config_path.display());

    println!();
    let settings_path = hooks::default_settings_path()?;
    hooks::install_hooks(&settings_path, &super::notify_program())?;
    println!("Agent hooks installed ({}).", settings_path.display());

    println!("\nSetup complete! Run \"aura start\" to begin.");
    Ok(())
}

/// Discover bridges, degrading to manual IP entry.
async fn pick_bridge() -> Result<String> {
    let bridges = match bridge::discover_bridges().await {
        Ok(bridges) => bridges,
        Err(_) => {
            return prompt_nonempty("Bridge discovery failed. Enter your bridge IP: ");
        }
    };
    match bridges.len() {
        0 => prompt_nonempty("No bridges found. Enter your bridge IP: "),
        1 => {
            println!("Found bridge at {}", bridges[0].internal_ip);
            Ok(bridges[0].internal_ip.clone())
        }
        _ => {
            println!("Multiple bridges found. Select one:");
            for (i, b) in bridges.iter().enumerate() {
                println!("  {}. {} ({})", i + 1, b.internal_ip, b.id);
            }
            let index = select_index(bridges.len())?;
            Ok(bridges[index].internal_ip.clone())
        }
    }
}

/// Ask the bridge for a credential, retrying while the user finds the
/// link button.
async fn pair(bridge_ip: &str) -> Result<String> {
    let mut attempts = 0;
    loop {
        match bridge::create_user(bridge_ip).await {
            Ok(username) => {
                println!("Paired successfully!");
                return Ok(username);
            }
            Err(e) => {
                attempts += 1;
                if attempts >= PAIR_ATTEMPTS {
                    bail!("failed to pair with {bridge_ip} after {PAIR_ATTEMPTS} attempts: {e}");
                }
                println!("Pairing failed ({e}). Try again...");
                prompt("Press Enter after pressing the link button...")?;
            }
        }
    }
}

fn pick_light(lights: &[BridgeLight]) -> Result<&BridgeLight> {
    println!("Select the light to use:");
    for (i, light) in lights.iter().enumerate() {
        let reachable = if light.reachable { "" } else { ", unreachable" };
        println!("  {}. {} ({}{})", i + 1, light.name, light.kind, reachable);
    }
    let index = select_index(lights.len())?;
    Ok(&lights[index])
}

fn pick_colors() -> Result<ColorsConfig> {
    let defaults = ColorsConfig::default();
    println!(
        "\nUse default colors? (idle={}, thinking={}, needs_input={})",
        defaults.idle, defaults.thinking, defaults.needs_input
    );
    let answer = prompt("[Y/n]: ")?;
    if answer.is_empty() || answer.eq_ignore_ascii_case("y") {
        return Ok(defaults);
    }
    Ok(ColorsConfig {
        idle: prompt_hex("Idle color (ambient, low-key)", &defaults.idle)?,
        thinking: prompt_hex("Thinking color (agent is working)", &defaults.thinking)?,
        needs_input: prompt_hex("Needs-input color (your turn)", &defaults.needs_input)?,
    })
}

fn prompt(message: &str) -> Result<String> {
    print!("{message}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn prompt_nonempty(message: &str) -> Result<String> {
    loop {
        let line = prompt(message)?;
        if !line.is_empty() {
            return Ok(line);
        }
    }
}

/// Read a 1-based selection, returning the 0-based index.
fn select_index(count: usize) -> Result<usize> {
    loop {
        let line = prompt("Choice: ")?;
        if let Ok(n) = line.parse::<usize>()
            && (1..=count).contains(&n)
        {
            return Ok(n - 1);
        }
        println!("Enter a number between 1 and {count}.");
    }
}

fn prompt_hex(message: &str, default: &str) -> Result<String> {
    loop {
        let line = prompt(&format!("{message} [{default}]: "))?;
        if line.is_empty() {
            return Ok(default.to_string());
        }
        if hex_to_xy(&line).is_some() {
            return Ok(line);
        }
        println!("Invalid hex (use e.g. #DA7756).");
    }
}
