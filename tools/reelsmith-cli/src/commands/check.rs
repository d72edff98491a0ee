//! Check external tool availability.

use reelsmith_common::config::{config_file_path, AppConfig};
use reelsmith_render_engine::tool::command_exists;

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    println!("Reelsmith System Check");
    println!("{}", "=".repeat(50));

    let tools = [
        ("ffmpeg", &config.tools.ffmpeg_path),
        ("ffprobe", &config.tools.ffprobe_path),
    ];

    let mut all_ok = true;
    for (name, path) in tools {
        if command_exists(path) {
            println!("[OK] {name}: {}", path.display());
        } else {
            println!("[MISSING] {name}: {} not found", path.display());
            all_ok = false;
        }
    }

    println!(
        "[OK] Timeouts: probe {}s, encode {}s",
        config.tools.probe_timeout().as_secs(),
        config.tools.encode_timeout().as_secs()
    );
    println!("     Config file: {}", config_file_path().display());

    println!();
    if all_ok {
        println!("All required tools are available. Reelsmith is ready.");
        Ok(())
    } else {
        anyhow::bail!("Install ffmpeg (which provides ffprobe) or set tools paths in the config file.")
    }
}
