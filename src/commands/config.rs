use colored::Colorize;

use crate::cli::{Cli, ConfigCommands};
use crate::config::Config;
use crate::error::{HiderError, Result};

pub async fn run(cli: &Cli, command: &ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            let config = Config::load()?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                let content = toml::to_string_pretty(&config)
                    .map_err(|e| HiderError::ConfigError(e.to_string()))?;
                println!("{}", content);
            }
        }

        ConfigCommands::Get { key } => {
            let config = Config::load()?;
            let value = get_key(&config, key)?;
            println!("{}", value);
        }

        ConfigCommands::Set { key, value } => {
            let mut config = Config::load()?;
            set_key(&mut config, key, value)?;
            config.save()?;

            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({ "success": true }))?
                );
            } else {
                println!("{} {} = {}", "✓".green(), key, value);
            }
        }

        ConfigCommands::Path => {
            println!("{}", Config::config_path().display());
        }
    }

    Ok(())
}

fn get_key(config: &Config, key: &str) -> Result<String> {
    let value = match key {
        "storage.file" => config.storage.file.clone().unwrap_or_default(),
        "browser.executable" => config.browser.executable.clone().unwrap_or_default(),
        "browser.cdp_port" => config.browser.cdp_port.to_string(),
        "browser.headless" => config.browser.headless.to_string(),
        "browser.user_data_dir" => config.browser.user_data_dir.clone().unwrap_or_default(),
        "reapply.delays_ms" => config
            .reapply
            .delays_ms
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(","),
        _ => return Err(HiderError::ConfigError(format!("unknown key: {}", key))),
    };

    Ok(value)
}

fn set_key(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "storage.file" => config.storage.file = Some(value.to_string()),
        "browser.executable" => config.browser.executable = Some(value.to_string()),
        "browser.cdp_port" => {
            config.browser.cdp_port = value
                .parse()
                .map_err(|_| HiderError::ConfigError(format!("invalid port: {}", value)))?;
        }
        "browser.headless" => {
            config.browser.headless = value
                .parse()
                .map_err(|_| HiderError::ConfigError(format!("expected true/false: {}", value)))?;
        }
        "browser.user_data_dir" => config.browser.user_data_dir = Some(value.to_string()),
        "reapply.delays_ms" => {
            let delays: std::result::Result<Vec<u64>, _> =
                value.split(',').map(|s| s.trim().parse()).collect();
            config.reapply.delays_ms = delays
                .map_err(|_| HiderError::ConfigError(format!("invalid delay list: {}", value)))?;
        }
        _ => return Err(HiderError::ConfigError(format!("unknown key: {}", key))),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_and_set_round_trip() {
        let mut config = Config::default();

        set_key(&mut config, "browser.cdp_port", "9333").unwrap();
        assert_eq!(get_key(&config, "browser.cdp_port").unwrap(), "9333");

        set_key(&mut config, "browser.headless", "true").unwrap();
        assert_eq!(get_key(&config, "browser.headless").unwrap(), "true");

        set_key(&mut config, "reapply.delays_ms", "500, 1500").unwrap();
        assert_eq!(config.reapply.delays_ms, vec![500, 1500]);
    }

    #[test]
    fn unknown_key_is_an_error() {
        let mut config = Config::default();
        assert!(get_key(&config, "nope").is_err());
        assert!(set_key(&mut config, "nope", "x").is_err());
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut config = Config::default();
        assert!(set_key(&mut config, "browser.cdp_port", "not-a-port").is_err());
        assert!(set_key(&mut config, "browser.headless", "maybe").is_err());
        assert!(set_key(&mut config, "reapply.delays_ms", "1,zz").is_err());
    }
}
