use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::{Mutex, OnceLock};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd)]
enum Channel {
    Admin,
    Error,
    Game,
}

impl Channel {
    const ALL: [Channel; 3] = [Channel::Admin, Channel::Error, Channel::Game];

    fn file_name(self) -> &'static str {
        match self {
            Channel::Admin => "admin.log",
            Channel::Error => "error.log",
            Channel::Game => "game.log",
        }
    }

    // The error channel skips the banner so it stays empty until something
    // actually goes wrong.
    fn wants_banner(self) -> bool {
        !matches!(self, Channel::Error)
    }
}

struct Logger {
    files: Mutex<BTreeMap<Channel, File>>,
}

static LOGGER: OnceLock<Logger> = OnceLock::new();

const BANNER_RULE: &str =
    "-------------------------------------------------------------------------------";
const BANNER_TITLE: &str = "Eldermoor - Realm Server";

pub fn init(root: &Path) -> Result<(), String> {
    if LOGGER.get().is_some() {
        return Ok(());
    }
    let log_dir = root.join("logs");
    std::fs::create_dir_all(&log_dir)
        .map_err(|err| format!("log directory create failed: {}", err))?;

    let mut files = BTreeMap::new();
    for channel in Channel::ALL {
        let path = log_dir.join(channel.file_name());
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|err| format!("open log {} failed: {}", channel.file_name(), err))?;
        let fresh = file.metadata().map(|m| m.len() == 0).unwrap_or(false);
        if fresh && channel.wants_banner() {
            write_banner(&mut file, channel.file_name())?;
        }
        files.insert(channel, file);
    }

    LOGGER
        .set(Logger {
            files: Mutex::new(files),
        })
        .map_err(|_| "log system already initialized".to_string())?;
    Ok(())
}

pub fn log_game(message: &str) {
    log_timestamped(Channel::Game, message);
}

/// The audit channel. One line per successful administrative mutation.
pub fn log_admin(message: &str) {
    log_timestamped(Channel::Admin, message);
}

pub fn log_error(message: &str) {
    log_timestamped(Channel::Error, message);
}

fn log_timestamped(channel: Channel, message: &str) {
    let line = format!("{} {}\n", format_timestamp(), message);
    // Without an initialized logger the line still lands on stderr.
    let Some(logger) = LOGGER.get() else {
        eprint!("{line}");
        return;
    };
    let _ = append_line(logger, channel, &line);
}

fn append_line(logger: &Logger, channel: Channel, line: &str) -> std::io::Result<()> {
    let mut files = logger
        .files
        .lock()
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::Other, "log lock poisoned"))?;
    if let Some(file) = files.get_mut(&channel) {
        file.write_all(line.as_bytes())?;
        file.flush()?;
    }
    Ok(())
}

fn write_banner(file: &mut File, name: &str) -> Result<(), String> {
    writeln!(
        file,
        "{BANNER_RULE}\n{BANNER_TITLE}\n{name} - opened {}",
        format_timestamp()
    )
    .map_err(|err| format!("banner write failed: {}", err))
}

/// UTC wall clock as `YYYY-MM-DD HH:MM:SS`, derived without a time crate.
fn format_timestamp() -> String {
    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let (year, month, day) = date_from_epoch_days(secs / 86_400);
    let tod = secs % 86_400;
    format!(
        "{year:04}-{month:02}-{day:02} {:02}:{:02}:{:02}",
        tod / 3_600,
        (tod / 60) % 60,
        tod % 60
    )
}

// Gregorian conversion over 400-year eras, anchored at 0000-03-01.
fn date_from_epoch_days(days: u64) -> (u64, u64, u64) {
    let shifted = days + 719_468;
    let era = shifted / 146_097;
    let day_of_era = shifted % 146_097;
    let year_of_era =
        (day_of_era - day_of_era / 1_460 + day_of_era / 36_524 - day_of_era / 146_096) / 365;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    let march_month = (5 * day_of_year + 2) / 153;
    let day = day_of_year - (153 * march_month + 2) / 5 + 1;
    let (year_offset, month) = if march_month < 10 {
        (0, march_month + 3)
    } else {
        (1, march_month - 9)
    };
    (era * 400 + year_of_era + year_offset, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_day_zero_is_1970() {
        assert_eq!(date_from_epoch_days(0), (1970, 1, 1));
    }

    #[test]
    fn leap_day_resolves() {
        // 2024-02-29 is 19_782 days after the epoch.
        assert_eq!(date_from_epoch_days(19_782), (2024, 2, 29));
    }
}
