use std::fmt::Display;

use colored::Colorize;
use log::{Level, LevelFilter};

/// Dependencies only get to speak up about problems.
const EXTERNAL_LEVEL: LevelFilter = LevelFilter::Warn;

/// Installs the global logger. `level` applies to this crate only.
pub fn init_logger(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            let target = Target::from_path(record.target());
            let now = chrono::Local::now();

            out.finish(format_args!(
                "{:^5} {} {:^7} {}",
                level_to_string(&record.level()),
                now.format("%H:%M:%S").to_string().bright_black(),
                target,
                message
            ))
        })
        .filter(move |meta| {
            let max = if Target::from_path(meta.target()).is_local() {
                level
            } else {
                EXTERNAL_LEVEL
            };
            meta.level() <= max
        })
        .chain(std::io::stdout())
        .apply()
}

#[derive(Debug, PartialEq)]
enum Target {
    External(String),
    Api,
    Store,
    Server,
}

impl Target {
    fn from_path(path: &str) -> Self {
        let mut split = path.split("::");

        match (split.next(), split.next()) {
            (Some("club_hub"), Some("api")) => Self::Api,
            (Some("club_hub"), Some("store")) => Self::Store,
            (Some("club_hub"), _) => Self::Server,
            (Some(other), _) => Self::External(other.to_string()),
            (None, _) => Self::External(String::new()),
        }
    }

    fn is_local(&self) -> bool {
        !matches!(self, Self::External(_))
    }
}

impl Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let result = match self {
            Target::External(x) => x.as_str().clear(),
            Target::Api => "API".bright_green(),
            Target::Store => "STORE".bright_purple(),
            Target::Server => "SERVER".blue(),
        };

        Display::fmt(&result, f)
    }
}

fn level_to_string(level: &Level) -> String {
    match level {
        Level::Error => " ERR ".black().on_red().bold().to_string(),
        Level::Warn => " WRN ".black().on_yellow().bold().to_string(),
        Level::Info => " INF ".black().on_blue().bold().to_string(),
        Level::Debug => " DBG ".white().on_black().to_string(),
        Level::Trace => " TRC ".to_string(),
    }
}
