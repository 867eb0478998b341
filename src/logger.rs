use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use env_logger::{Builder, Env};

/// Initialise the global logger. Records go to `<log_dir>/default.log` when a
/// directory is given, otherwise to stderr. `RUST_LOG` overrides the `info` default.
pub fn init_logger(log_dir: Option<&Path>) -> Result<()> {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
    builder.format(|buf, record| {
        writeln!(
            buf,
            "{} [{:<5}] {} - {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            record.level(),
            record.target(),
            record.args()
        )
    });

    if let Some(log_dir) = log_dir {
        std::fs::create_dir_all(log_dir)
            .with_context(|| format!("failed to create log dir {}", log_dir.display()))?;
        let log_file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_dir.join("default.log"))
            .context("failed to open log file")?;
        builder.target(env_logger::Target::Pipe(Box::new(log_file)));
    }

    builder.try_init().context("logger already initialised")?;
    Ok(())
}
