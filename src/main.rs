use anyhow::{Context, Result};
use log::{error, info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::env;
use std::io::Write;
use std::path::PathBuf;
use std::process;

mod app_config;
mod app_controller;
mod catalogs;
mod decoder;
mod encoding_tables;
mod errors;
mod fetch;
mod file_utils;
mod lang_verifier;
mod language_utils;
mod merger;
mod subtitle_processor;

use app_config::{Config, LogLevel};
use crate::file_utils::FileManager;

/// A simple custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => "ℹ️ ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let emoji = Self::get_emoji_for_level(record.level());
            let color = Self::get_color_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", color, now, emoji, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first, to properly set up the logger with the right level
    let config_path = "conf.json";
    let example_config_path = "conf.example.json";

    // Load or create configuration
    let config = if FileManager::file_exists(config_path) {
        println!("Loading configuration from {}", config_path);
        Config::from_file(config_path).with_context(|| "Failed to load configuration")?
    } else {
        if FileManager::file_exists(example_config_path) {
            println!("Configuration file not found, but example configuration exists.");
            println!("You can copy it using: cp {} {}", example_config_path, config_path);
            println!("Creating default configuration at {}", config_path);
        } else {
            println!("Configuration file not found, creating default at {}", config_path);
        }
        app_config::create_default_config_file(config_path)?
    };

    // Convert LogLevel enum to LevelFilter
    let log_level = match config.log_level {
        LogLevel::Error => LevelFilter::Error,
        LogLevel::Warn => LevelFilter::Warn,
        LogLevel::Info => LevelFilter::Info,
        LogLevel::Debug => LevelFilter::Debug,
        LogLevel::Trace => LevelFilter::Trace,
    };

    // Parse CLI arguments
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Missing required content id argument");
        print_usage(&args[0]);
        process::exit(1);
    }

    if args.len() > 3 {
        eprintln!("Too many arguments provided. Only the first 1-2 arguments will be used.");
    }

    // Initialize logging with the appropriate level
    if let Err(e) = CustomLogger::init(log_level) {
        eprintln!("Logger init failed: {}", e);
        process::exit(1);
    }

    info!("dualsub started");
    info!("Log level: {}", log_level);

    // Content id, e.g. tt0111161 or tt0903747:1:2
    let content_id = &args[1];

    // Optional output directory override
    let output_dir = if args.len() >= 3 {
        let output_path_str = &args[2];

        // Sanitize the output path - basic security check
        if output_path_str.contains("..") || output_path_str.contains('|') || output_path_str.contains(';') {
            error!(" Output path contains potentially unsafe characters");
            process::exit(1);
        }

        Some(PathBuf::from(output_path_str))
    } else {
        None
    };

    info!(
        "Requesting {} + {} subtitles for {}",
        config.main_language, config.translation_language, content_id
    );

    // Create and run the controller
    let controller = match app_controller::Controller::with_config(config) {
        Ok(c) => c,
        Err(e) => {
            error!(" Failed to initialize controller: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = controller.run(content_id, output_dir).await {
        error!(" Error: {}", e);
        process::exit(1);
    }

    Ok(())
}

/// Print usage instructions for the application
fn print_usage(program_name: &str) {
    eprintln!("Usage:");
    eprintln!("   {} <content_id> [output_directory]", program_name);
    eprintln!();
    eprintln!("Examples:");
    eprintln!("   {} tt0111161", program_name);
    eprintln!("   {} tt0903747:1:2 /path/to/output", program_name);
    eprintln!();
    eprintln!("Description:");
    eprintln!("   Fetches subtitles for the configured language pair and writes");
    eprintln!("   merged dual-language SRT files to the output directory.");
}
