//! Command table and argument parsing

use super::ShellError;
use super::line::CommandLine;

/// A parsed, ready-to-run command. Holds no borrows into the line buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    GetTemperature,
    GetPressure,
    GoTo(i32),
    GetK,
    SetK,
    GetA,
    GetChipId,
    TrackTemperature,
    Help,
}

pub struct CommandInfo {
    pub name: &'static str,
    pub usage: &'static str,
    pub summary: &'static str,
}

pub const COMMANDS: &[CommandInfo] = &[
    CommandInfo {
        name: "GET_T",
        usage: "GET_T",
        summary: "read the temperature",
    },
    CommandInfo {
        name: "GET_P",
        usage: "GET_P",
        summary: "read the pressure",
    },
    CommandInfo {
        name: "GO_TO",
        usage: "GO_TO <deg>",
        summary: "move the motor to -180..180 degrees",
    },
    CommandInfo {
        name: "TRACK_T",
        usage: "TRACK_T",
        summary: "point the motor at the temperature",
    },
    CommandInfo {
        name: "GET_ID",
        usage: "GET_ID",
        summary: "read the sensor chip id",
    },
    CommandInfo {
        name: "GET_K",
        usage: "GET_K",
        summary: "not implemented",
    },
    CommandInfo {
        name: "SET_K",
        usage: "SET_K <k>",
        summary: "not implemented",
    },
    CommandInfo {
        name: "GET_A",
        usage: "GET_A",
        summary: "not implemented",
    },
    CommandInfo {
        name: "HELP",
        usage: "HELP",
        summary: "list commands",
    },
];

impl Command {
    /// Case-sensitive lookup of `line`'s command name.
    pub fn parse(line: &CommandLine<'_>) -> Result<Self, ShellError> {
        let name = line.name().ok_or(ShellError::CommandNotFound)?;
        let command = match name {
            "GET_T" => Self::GetTemperature,
            "GET_P" => Self::GetPressure,
            "GO_TO" => match line.args() {
                [degrees] => Self::GoTo(degrees.parse().map_err(|_| usage_of("GO_TO"))?),
                _ => return Err(usage_of("GO_TO")),
            },
            "TRACK_T" => Self::TrackTemperature,
            "GET_ID" => Self::GetChipId,
            "GET_K" => Self::GetK,
            "SET_K" => Self::SetK,
            "GET_A" => Self::GetA,
            "HELP" => Self::Help,
            _ => return Err(ShellError::CommandNotFound),
        };
        Ok(command)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::GetTemperature => "GET_T",
            Self::GetPressure => "GET_P",
            Self::GoTo(_) => "GO_TO",
            Self::GetK => "GET_K",
            Self::SetK => "SET_K",
            Self::GetA => "GET_A",
            Self::GetChipId => "GET_ID",
            Self::TrackTemperature => "TRACK_T",
            Self::Help => "HELP",
        }
    }
}

fn usage_of(name: &'static str) -> ShellError {
    let usage = COMMANDS
        .iter()
        .find(|info| info.name == name)
        .map_or(name, |info| info.usage);
    ShellError::Usage(usage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::line::{CR, LineEditor};

    fn parse(input: &str) -> Result<Command, ShellError> {
        let mut editor = LineEditor::new();
        for byte in input.bytes() {
            editor.feed(byte);
        }
        editor.feed(CR);
        Command::parse(&editor.take_command()?)
    }

    #[test]
    fn test_every_listed_command_parses() {
        for info in COMMANDS {
            let line = if info.name == "GO_TO" { "GO_TO 0" } else { info.name };
            let command = parse(line).unwrap();
            assert_eq!(command.name(), info.name);
        }
    }

    #[test]
    fn test_go_to_argument() {
        assert_eq!(parse("GO_TO -90"), Ok(Command::GoTo(-90)));
        assert_eq!(parse("GO_TO"), Err(ShellError::Usage("GO_TO <deg>")));
        assert_eq!(parse("GO_TO ninety"), Err(ShellError::Usage("GO_TO <deg>")));
        assert_eq!(parse("GO_TO 1 2"), Err(ShellError::Usage("GO_TO <deg>")));
    }

    #[test]
    fn test_names_are_case_sensitive() {
        assert_eq!(parse("get_t"), Err(ShellError::CommandNotFound));
        assert_eq!(parse("WhereisBrian?"), Err(ShellError::CommandNotFound));
    }
}
