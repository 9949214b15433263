/* This file is part of DarkFi (https://dark.fi)
 *
 * Copyright (C) 2020-2026 Dyne.org foundation
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as
 * published by the Free Software Foundation, either version 3 of the
 * License, or (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

use std::{
    env,
    fs::{self, OpenOptions},
    io::Write,
    path::Path,
};

use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, SharedLogger, TermLogger,
    TerminalMode, WriteLogger,
};

use crate::{util::path::expand_path, Result};

pub use structopt_toml::StructOptToml;

/// Environment variable holding a log file path, used when `--log` is not given.
pub const LOG_FILE_ENV: &str = "DAO_LOG";

/// Environment variable holding a comma-separated list of log targets.
/// Targets prefixed with `!` are ignored, the rest are allowed.
pub const LOG_TARGETS_ENV: &str = "LOG_TARGETS";

/// Description string for `--help` output.
#[macro_export]
macro_rules! cli_desc {
    () => {
        concat!(env!("CARGO_PKG_DESCRIPTION"), " (", env!("CARGO_PKG_VERSION"), ")")
    };
}

/// Generates `main()` for a command-line tool. The binary must define an
/// `Args` struct deriving `StructOptToml` with `config`, `log` and `verbose`
/// fields, plus `CONFIG_FILE` and `CONFIG_FILE_CONTENTS` constants.
///
/// The generated main spawns the default config if missing and exits with
/// status 2 so it can be reviewed. Otherwise it merges the config with the
/// command line, sets up logging, and runs `$realmain(args)` on a tokio
/// runtime. Errors are logged and the process exits with status 1.
#[macro_export]
macro_rules! async_cli_main {
    ($realmain:ident) => {
        fn main() {
            if let Err(e) = cli_main() {
                log::error!("{}", e);
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }

        fn cli_main() -> $crate::Result<()> {
            let args = <Args as $crate::util::cli::StructOptToml>::from_args_with_toml("")
                .map_err(|e| $crate::Error::ConfigError(e.to_string()))?;
            let cfg_path = $crate::util::path::get_config_path(args.config.clone(), CONFIG_FILE)?;

            if $crate::util::cli::spawn_config(&cfg_path, CONFIG_FILE_CONTENTS.as_bytes())? {
                println!("Config file created in {:?}. Please review it and try again.", cfg_path);
                std::process::exit(2);
            }

            let cfg = std::fs::read_to_string(&cfg_path)?;
            let args = <Args as $crate::util::cli::StructOptToml>::from_args_with_toml(&cfg)
                .map_err(|e| $crate::Error::ConfigError(e.to_string()))?;

            $crate::util::cli::init_logger(args.verbose, args.log.clone())?;

            let rt = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
            rt.block_on($realmain(args))
        }
    };
}

/// Map `-v` occurrences to a log level.
pub fn get_log_level(verbosity_level: u8) -> LevelFilter {
    match verbosity_level {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Build the logger config, honouring target filters from `LOG_TARGETS`.
pub fn get_log_config(verbosity_level: u8) -> simplelog::Config {
    let mut cfg = ConfigBuilder::new();

    if verbosity_level < 2 {
        cfg.set_location_level(LevelFilter::Off);
    }

    if let Ok(targets) = env::var(LOG_TARGETS_ENV) {
        for target in targets.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            match target.strip_prefix('!') {
                Some(ignored) => cfg.add_filter_ignore(ignored.to_string()),
                None => cfg.add_filter_allow(target.to_string()),
            };
        }
    }

    cfg.build()
}

/// Initialize terminal logging, and file logging when a log path is given
/// either explicitly or through `DAO_LOG`.
pub fn init_logger(verbosity_level: u8, log_file: Option<String>) -> Result<()> {
    let level = get_log_level(verbosity_level);
    let config = get_log_config(verbosity_level);

    let mut loggers: Vec<Box<dyn SharedLogger>> =
        vec![TermLogger::new(level, config.clone(), TerminalMode::Mixed, ColorChoice::Auto)];

    if let Some(path) = log_file.or_else(|| env::var(LOG_FILE_ENV).ok()) {
        let path = expand_path(&path)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        loggers.push(WriteLogger::new(level, config, file));
    }

    CombinedLogger::init(loggers)?;
    Ok(())
}

/// Write the default config file to `path` if nothing is there yet.
/// Returns `true` when a new file was created.
pub fn spawn_config(path: &Path, contents: &[u8]) -> Result<bool> {
    if path.exists() {
        return Ok(false)
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut file = fs::File::create(path)?;
    file.write_all(contents)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        assert_eq!(get_log_level(0), LevelFilter::Info);
        assert_eq!(get_log_level(1), LevelFilter::Debug);
        assert_eq!(get_log_level(5), LevelFilter::Trace);
    }

    #[test]
    fn spawn_config_only_once() {
        let dir = env::temp_dir().join(format!("cryptodevs-spawn-{}", std::process::id()));
        let path = dir.join("nested/test.toml");
        let _ = fs::remove_dir_all(&dir);

        assert!(spawn_config(&path, b"a = 1\n").unwrap());
        assert!(!spawn_config(&path, b"a = 2\n").unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "a = 1\n");

        fs::remove_dir_all(&dir).unwrap();
    }
}
