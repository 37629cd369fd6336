use chrono::{Local, SecondsFormat};
use tracing_subscriber::{
    filter::Targets,
    fmt::{self, time},
    prelude::*,
};
use yansi::Paint;

use crate::config::Log;

pub fn init(log: &Log) {
    let is_color = log.style.is_color();
    if !is_color {
        yansi::disable();
    }
    let format = fmt::layer().with_timer(LocalTime).with_ansi(is_color);
    let filter = match parse_filter(&log.level) {
        Ok(filter) => filter,
        Err(err) => panic!("{}", err.red().bold()),
    };

    tracing_subscriber::registry()
        .with(format)
        .with(filter)
        .init();
}

fn parse_filter(level: &str) -> Result<Targets, String> {
    level
        .parse()
        .map_err(|e| format!("log level {:?} did not parse successfully: {}", level, e))
}

struct LocalTime;

impl time::FormatTime for LocalTime {
    fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            Local::now().to_rfc3339_opts(SecondsFormat::Millis, false)
        )
    }
}

#[cfg(test)]
mod tests {
    use tracing::Level;

    use super::*;

    #[test]
    fn default_filter_enables_crate_info() {
        let filter = parse_filter(&Log::default().level).unwrap();
        assert!(filter.would_enable("scan_relay", &Level::INFO));
        assert!(!filter.would_enable("scan_relay", &Level::DEBUG));
        assert!(!filter.would_enable("tower_http", &Level::INFO));
    }

    #[test]
    fn garbage_filter_is_rejected() {
        assert!(parse_filter("scan_relay=loud").is_err());
    }
}
