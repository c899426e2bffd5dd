use clap::Parser;
use std::path::PathBuf;

/// Academic records reporting service.
#[derive(Debug, Clone, Parser)]
#[command(name = "escolard")]
#[command(version)]
#[command(about = "Serves student grade reports and runs the averages/indicators/billing passes")]
pub struct Config {
    /// SQLite database holding students, subjects and grades.
    #[arg(long, env = "ESCOLAR_DB", default_value = "escolar.db")]
    pub db: PathBuf,

    /// Address the HTTP server listens on.
    #[arg(long, env = "ESCOLAR_BIND", default_value = "127.0.0.1:5000")]
    pub bind: String,

    /// Log level (trace, debug, info, warn, error). RUST_LOG wins when set.
    #[arg(short, long, default_value = "info")]
    pub log_level: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let cfg = Config::try_parse_from([
            "escolard",
            "--db",
            "/tmp/records.db",
            "--bind",
            "0.0.0.0:8080",
            "-l",
            "debug",
        ])
        .expect("parse flags");
        assert_eq!(cfg.db, PathBuf::from("/tmp/records.db"));
        assert_eq!(cfg.bind, "0.0.0.0:8080");
        assert_eq!(cfg.log_level, "debug");
    }
}
