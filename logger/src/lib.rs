use colored::*;
use std::fmt;

/// A leveled log line. Used for REPL/file-mode banners and progress notes,
/// never on the expression-evaluation hot path and never persisted to disk.
#[derive(Debug)]
pub enum LogType<'a> {
  Error(&'a str),
  Warn(&'a str),
  Info(&'a str),
  Debug(&'a str),
}

impl<'a> fmt::Display for LogType<'a> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      LogType::Error(error) => write!(f, "{} {}", "[Error]".red().bold(), error.red().bold()),
      LogType::Warn(warn) => write!(f, "{} {}", "[Warn]".yellow().bold(), warn.yellow().bold()),
      LogType::Info(info) => write!(f, "{} {}", "[Info]".cyan().bold(), info.cyan().bold()),
      LogType::Debug(plain) => write!(f, "{} {}", "[Debug]", plain),
    }
  }
}

pub struct Logger;

impl Logger {
  /// Prints a timestamped log line to stdout and returns the formatted
  /// string, for callers that also want to echo it elsewhere (tests, etc).
  pub fn log(log: LogType) -> String {
    let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let log_str = format!("[{}] {}", now, log);
    println!("{}", log_str);
    log_str
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn log_line_carries_a_timestamp_prefix() {
    let line = Logger::log(LogType::Info("starting"));
    assert!(line.starts_with('['));
    assert!(line.contains("starting"));
  }
}
