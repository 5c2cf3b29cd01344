use clap::{CommandFactory, Parser};
use std::ffi::OsString;
use std::path::PathBuf;

use crate::error::{EtlError, Result};
use crate::warehouse::{CreateDisposition, WriteDisposition};

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Clean daily food-order exports and load them into the warehouse
#[derive(Parser, Debug, Clone)]
#[command(
    name = "food-orders",
    about = "Clean daily food-order exports and load them into the warehouse",
    version
)]
pub struct Settings {
    /// Input file, directory, or file-name pattern to process
    #[arg(long)]
    pub input: String,

    /// Warehouse project
    #[arg(long, env = "FOOD_ORDERS_PROJECT", default_value = "food-orders-local")]
    pub project: String,

    /// Dataset holding the destination tables
    #[arg(long, env = "FOOD_ORDERS_DATASET", default_value = "food_orders")]
    pub dataset: String,

    /// Table receiving delivered orders
    #[arg(
        long,
        env = "FOOD_ORDERS_DELIVERED_TABLE",
        default_value = "delivered_orders"
    )]
    pub delivered_table: String,

    /// Table receiving orders with any other status
    #[arg(
        long,
        env = "FOOD_ORDERS_OTHER_TABLE",
        default_value = "other_status_orders"
    )]
    pub other_table: String,

    /// Location assigned to the dataset when it is created
    #[arg(long, env = "FOOD_ORDERS_LOCATION", default_value = "US")]
    pub location: String,

    /// Root directory of the local warehouse
    #[arg(long, env = "FOOD_ORDERS_WAREHOUSE_DIR")]
    pub warehouse_dir: Option<PathBuf>,

    /// What to do when a destination table is missing
    #[arg(
        long,
        env = "FOOD_ORDERS_CREATE_DISPOSITION",
        default_value = "create_if_needed",
        value_parser = ["create_if_needed", "create_never"]
    )]
    pub create_disposition: String,

    /// What to do with rows already in a destination table
    #[arg(
        long,
        env = "FOOD_ORDERS_WRITE_DISPOSITION",
        default_value = "append",
        value_parser = ["append", "write_empty"]
    )]
    pub write_disposition: String,

    /// Logging level
    #[arg(
        long,
        env = "FOOD_ORDERS_LOG_LEVEL",
        default_value = "INFO",
        value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"]
    )]
    pub log_level: String,

    /// Log file path
    #[arg(long, env = "FOOD_ORDERS_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, env = "FOOD_ORDERS_DEBUG")]
    pub debug: bool,

    /// Unrecognised flags, kept verbatim for the runtime.
    #[arg(skip)]
    pub runtime_args: Vec<String>,
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse the process arguments, exiting with usage on error.
    pub fn load() -> Self {
        Self::load_from_args(std::env::args_os().collect())
    }

    /// Same as [`Settings::load`] with an explicit argument list.
    pub fn load_from_args(args: Vec<OsString>) -> Self {
        match Self::try_load_from_args(args) {
            Ok(settings) => settings,
            Err(e) => e.exit(),
        }
    }

    /// Split off unrecognised flags, parse the rest, and apply `--debug`.
    pub fn try_load_from_args(args: Vec<OsString>) -> std::result::Result<Self, clap::Error> {
        let (known, passthrough) = split_known_args(&Settings::command(), args);
        let mut settings = Settings::try_parse_from(known)?;
        settings.runtime_args = passthrough;

        // --debug overrides log level.
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }

        Ok(settings)
    }

    /// Warehouse root, defaulting to `~/.food-orders/warehouse`.
    pub fn warehouse_root(&self) -> PathBuf {
        self.warehouse_dir
            .clone()
            .unwrap_or_else(|| app_dir().join("warehouse"))
    }

    pub fn create_disposition(&self) -> Result<CreateDisposition> {
        match self.create_disposition.as_str() {
            "create_if_needed" => Ok(CreateDisposition::CreateIfNeeded),
            "create_never" => Ok(CreateDisposition::CreateNever),
            other => Err(EtlError::Config(format!(
                "unknown create disposition: {other}"
            ))),
        }
    }

    pub fn write_disposition(&self) -> Result<WriteDisposition> {
        match self.write_disposition.as_str() {
            "append" => Ok(WriteDisposition::Append),
            "write_empty" => Ok(WriteDisposition::WriteEmpty),
            other => Err(EtlError::Config(format!(
                "unknown write disposition: {other}"
            ))),
        }
    }
}

/// Per-user application directory, `~/.food-orders`.
pub fn app_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".food-orders")
}

// ── Helper: separate known flags from runtime pass-through ─────────────────────

/// Partition `args` into those `command` understands and the rest.
///
/// The first element (the binary name) is always kept. An unknown `--flag`
/// carries the following token with it unless that token is itself a flag
/// or the value was given inline as `--flag=value`.
pub fn split_known_args(
    command: &clap::Command,
    args: Vec<OsString>,
) -> (Vec<OsString>, Vec<String>) {
    let mut known = Vec::new();
    let mut passthrough = Vec::new();
    let mut iter = args.into_iter().peekable();

    if let Some(bin) = iter.next() {
        known.push(bin);
    }

    while let Some(arg) = iter.next() {
        let text = arg.to_string_lossy().into_owned();

        let Some(flag) = text.strip_prefix("--") else {
            if matches!(text.as_str(), "-h" | "-V") {
                known.push(arg);
            } else {
                passthrough.push(text);
            }
            continue;
        };

        let (name, inline_value) = match flag.split_once('=') {
            Some((name, _)) => (name, true),
            None => (flag, false),
        };

        if matches!(name, "help" | "version") {
            known.push(arg);
            continue;
        }

        let takes_value = command
            .get_arguments()
            .find(|a| a.get_long() == Some(name))
            .map(|a| a.get_action().takes_values());

        match takes_value {
            Some(takes_value) => {
                known.push(arg);
                if takes_value && !inline_value {
                    if let Some(value) = iter.next() {
                        known.push(value);
                    }
                }
            }
            None => {
                passthrough.push(text.clone());
                if !inline_value {
                    let next_is_value = iter
                        .peek()
                        .map(|next| !next.to_string_lossy().starts_with("--"))
                        .unwrap_or(false);
                    if next_is_value {
                        if let Some(value) = iter.next() {
                            passthrough.push(value.to_string_lossy().into_owned());
                        }
                    }
                }
            }
        }
    }

    (known, passthrough)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<OsString> {
        list.iter().map(OsString::from).collect()
    }

    // ── defaults ──────────────────────────────────────────────────────────────

    #[test]
    fn test_settings_default_values() {
        let settings =
            Settings::try_load_from_args(args(&["food-orders", "--input", "orders.csv"]))
                .expect("parse");

        assert_eq!(settings.input, "orders.csv");
        assert_eq!(settings.dataset, "food_orders");
        assert_eq!(settings.delivered_table, "delivered_orders");
        assert_eq!(settings.other_table, "other_status_orders");
        assert_eq!(settings.location, "US");
        assert_eq!(settings.create_disposition, "create_if_needed");
        assert_eq!(settings.write_disposition, "append");
        assert_eq!(settings.log_level, "INFO");
        assert!(settings.log_file.is_none());
        assert!(!settings.debug);
        assert!(settings.runtime_args.is_empty());
    }

    #[test]
    fn test_settings_input_is_required() {
        let result = Settings::try_load_from_args(args(&["food-orders"]));
        assert!(result.is_err());
    }

    #[test]
    fn test_settings_debug_overrides_log_level() {
        let settings = Settings::try_load_from_args(args(&[
            "food-orders",
            "--input",
            "x.csv",
            "--debug",
        ]))
        .expect("parse");
        assert_eq!(settings.log_level, "DEBUG");
    }

    #[test]
    fn test_every_option_but_input_has_env_var() {
        let command = Settings::command();
        for arg in command.get_arguments() {
            let id = arg.get_id().as_str();
            if matches!(id, "input" | "help" | "version") {
                continue;
            }
            let env = arg.get_env().map(|e| e.to_string_lossy().into_owned());
            assert!(
                env.as_deref().is_some_and(|e| e.starts_with("FOOD_ORDERS_")),
                "--{id} has no FOOD_ORDERS_ env var"
            );
        }
        let debug = command
            .get_arguments()
            .find(|arg| arg.get_id().as_str() == "debug")
            .unwrap();
        assert_eq!(debug.get_env(), Some(std::ffi::OsStr::new("FOOD_ORDERS_DEBUG")));
    }

    #[test]
    fn test_settings_explicit_tables() {
        let settings = Settings::try_load_from_args(args(&[
            "food-orders",
            "--input=x.csv",
            "--delivered-table",
            "done",
            "--other-table=rest",
        ]))
        .expect("parse");
        assert_eq!(settings.input, "x.csv");
        assert_eq!(settings.delivered_table, "done");
        assert_eq!(settings.other_table, "rest");
    }

    // ── pass-through ──────────────────────────────────────────────────────────

    #[test]
    fn test_unknown_flags_are_passed_through() {
        let settings = Settings::try_load_from_args(args(&[
            "food-orders",
            "--input",
            "gs-free.csv",
            "--temp_location",
            "gs://bucket/temp",
            "--runner=DirectRunner",
            "--streaming",
        ]))
        .expect("parse");

        assert_eq!(settings.input, "gs-free.csv");
        assert_eq!(
            settings.runtime_args,
            vec![
                "--temp_location".to_string(),
                "gs://bucket/temp".to_string(),
                "--runner=DirectRunner".to_string(),
                "--streaming".to_string(),
            ]
        );
    }

    #[test]
    fn test_split_known_args_keeps_flag_values_together() {
        let (known, passthrough) = split_known_args(
            &Settings::command(),
            args(&["bin", "--zone", "eu", "--input", "a.csv", "--debug"]),
        );
        assert_eq!(known, args(&["bin", "--input", "a.csv", "--debug"]));
        assert_eq!(passthrough, vec!["--zone".to_string(), "eu".to_string()]);
    }

    #[test]
    fn test_split_known_args_unknown_flag_before_known_flag() {
        let (known, passthrough) = split_known_args(
            &Settings::command(),
            args(&["bin", "--save_main_session", "--input", "a.csv"]),
        );
        assert_eq!(known, args(&["bin", "--input", "a.csv"]));
        assert_eq!(passthrough, vec!["--save_main_session".to_string()]);
    }

    // ── conversions ───────────────────────────────────────────────────────────

    #[test]
    fn test_dispositions_parse() {
        let settings = Settings::try_load_from_args(args(&[
            "food-orders",
            "--input",
            "x.csv",
            "--create-disposition",
            "create_never",
            "--write-disposition",
            "write_empty",
        ]))
        .expect("parse");
        assert_eq!(
            settings.create_disposition().unwrap(),
            CreateDisposition::CreateNever
        );
        assert_eq!(
            settings.write_disposition().unwrap(),
            WriteDisposition::WriteEmpty
        );
    }

    #[test]
    fn test_invalid_disposition_is_rejected_by_parser() {
        let result = Settings::try_load_from_args(args(&[
            "food-orders",
            "--input",
            "x.csv",
            "--write-disposition",
            "truncate",
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_warehouse_root_explicit() {
        let settings = Settings::try_load_from_args(args(&[
            "food-orders",
            "--input",
            "x.csv",
            "--warehouse-dir",
            "/tmp/wh",
        ]))
        .expect("parse");
        assert_eq!(settings.warehouse_root(), PathBuf::from("/tmp/wh"));
    }
}
