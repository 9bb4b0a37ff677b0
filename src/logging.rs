use chrono::Local;
use std::path::PathBuf;
use std::sync::Once;

static INIT: Once = Once::new();

const LEVEL_VAR: &str = "PROFILING_LOG_LEVEL";
const DIR_VAR: &str = "PROFILING_LOG_DIR";
const DEFAULT_LOG_DIR: &str = "logs";

#[derive(Debug, Clone, PartialEq, Eq)]
struct LogSettings {
    level: log::LevelFilter,
    dir: Option<PathBuf>,
}

impl LogSettings {
    fn from_env() -> Self {
        let level = std::env::var(LEVEL_VAR)
            .or_else(|_| std::env::var("RUST_LOG"))
            .ok();
        let dir = std::env::var(DIR_VAR).ok();
        Self {
            level: parse_level(level.as_deref()),
            dir: parse_log_dir(dir.as_deref()),
        }
    }
}

pub fn init_logging(app_name: &str) -> Result<(), String> {
    let mut init_result: Result<(), String> = Ok(());
    INIT.call_once(|| {
        init_result = apply(app_name, LogSettings::from_env());
    });
    init_result
}

fn apply(app_name: &str, settings: LogSettings) -> Result<(), String> {
    let mut dispatch = fern::Dispatch::new()
        .level(settings.level)
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} | {:<5} | {} | {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                message
            ))
        })
        .chain(std::io::stdout());

    if let Some(dir) = settings.dir {
        std::fs::create_dir_all(&dir).map_err(|err| err.to_string())?;
        let file_path = dir.join(format!("{app_name}-{}.log", Local::now().format("%Y_%m_%d")));
        dispatch = dispatch.chain(fern::log_file(file_path).map_err(|err| err.to_string())?);
    }

    dispatch.apply().map_err(|err| err.to_string())
}

fn parse_level(value: Option<&str>) -> log::LevelFilter {
    value
        .and_then(|value| value.trim().parse::<log::LevelFilter>().ok())
        .unwrap_or(log::LevelFilter::Info)
}

fn parse_log_dir(value: Option<&str>) -> Option<PathBuf> {
    match value.map(str::trim) {
        Some("off") | Some("none") | Some("") => None,
        Some(path) => Some(PathBuf::from(path)),
        None => Some(PathBuf::from(DEFAULT_LOG_DIR)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_defaults_to_info() {
        assert_eq!(parse_level(None), log::LevelFilter::Info);
        assert_eq!(parse_level(Some("nonsense")), log::LevelFilter::Info);
        assert_eq!(parse_level(Some("debug")), log::LevelFilter::Debug);
        assert_eq!(parse_level(Some(" WARN ")), log::LevelFilter::Warn);
    }

    #[test]
    fn log_dir_can_be_disabled() {
        assert_eq!(parse_log_dir(None), Some(PathBuf::from("logs")));
        assert_eq!(parse_log_dir(Some("off")), None);
        assert_eq!(parse_log_dir(Some("")), None);
        assert_eq!(
            parse_log_dir(Some("/tmp/profiling")),
            Some(PathBuf::from("/tmp/profiling"))
        );
    }
}
