//! Line commands for driving a registry without a window.
//!
//! Each line names a cell and a path (`image /img/a.png`), clears a cell
//! with `-` (`histogram -`), prints both values (`show`) or ends input
//! (`quit`).

use std::str::FromStr;

use tracing::debug;

use crate::{
    error::CommandError,
    state::{PathKind, PathSnapshot, PathStateRegistry},
};

/// One parsed driver command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Write a cell; `None` clears it.
    Write(PathKind, Option<String>),
    /// Report both current values.
    Show,
    /// Stop reading input.
    Quit,
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let kind = match word {
            "image" => PathKind::Image,
            "histogram" => PathKind::Histogram,
            "show" => return Ok(Command::Show),
            "quit" | "exit" => return Ok(Command::Quit),
            other => return Err(CommandError::Unknown(other.to_string())),
        };

        match rest {
            "" => Err(CommandError::MissingPath {
                command: word.to_string(),
            }),
            "-" => Ok(Command::Write(kind, None)),
            path => Ok(Command::Write(kind, Some(path.to_string()))),
        }
    }
}

/// Result of applying a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Keep reading.
    Continue,
    /// `show` was requested.
    Report(PathSnapshot),
    /// Input should end.
    Stop,
}

/// Applies one command to the registry.
pub fn apply(registry: &PathStateRegistry, command: Command) -> Outcome {
    debug!(command = ?command, "Driver: Applying command");
    match command {
        Command::Write(kind, path) => {
            registry.write(kind, path);
            Outcome::Continue
        }
        Command::Show => Outcome::Report(registry.snapshot()),
        Command::Quit => Outcome::Stop,
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        driver::{Command, Outcome, apply},
        error::CommandError,
        state::{
            PathKind::{Histogram, Image},
            PathSnapshot, PathStateRegistry,
        },
    };

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            "image /img/a.png".parse::<Command>().unwrap(),
            Command::Write(Image, Some("/img/a.png".to_string()))
        );
        assert_eq!(
            "  histogram   /tmp/my file.bmp ".parse::<Command>().unwrap(),
            Command::Write(Histogram, Some("/tmp/my file.bmp".to_string()))
        );
        assert_eq!(
            "image -".parse::<Command>().unwrap(),
            Command::Write(Image, None)
        );
        assert_eq!("show".parse::<Command>().unwrap(), Command::Show);
        assert_eq!("exit".parse::<Command>().unwrap(), Command::Quit);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            "image".parse::<Command>(),
            Err(CommandError::MissingPath { .. })
        ));
        assert!(matches!(
            "rotate 90".parse::<Command>(),
            Err(CommandError::Unknown(word)) if word == "rotate"
        ));
    }

    #[test]
    fn test_apply_updates_registry() {
        let registry = PathStateRegistry::new();

        let outcome = apply(&registry, Command::Write(Image, Some("/img/a.png".to_string())));
        assert_eq!(outcome, Outcome::Continue);

        assert_eq!(
            apply(&registry, Command::Show),
            Outcome::Report(PathSnapshot {
                image: Some("/img/a.png".to_string()),
                histogram: None,
            })
        );
        assert_eq!(apply(&registry, Command::Quit), Outcome::Stop);
    }
}
