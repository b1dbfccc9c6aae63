//! The closed set of shell programs

use serde::{Deserialize, Serialize};

/// Every program the shell knows. Scenario commands come through `Custom`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    Ls,
    Cd,
    Pwd,
    Cat,
    Grep,
    Mkdir,
    Touch,
    Rm,
    Cp,
    Echo,
    Env,
    Mount,
    Umount,
    Lsblk,
    Help,
    Custom(String),
}

impl Command {
    pub const BUILTIN_NAMES: &'static [&'static str] = &[
        "ls", "cd", "pwd", "cat", "grep", "mkdir", "touch", "rm", "cp", "echo", "env", "mount",
        "umount", "lsblk", "help",
    ];

    /// Builtins win over scenario commands of the same name
    pub fn from_name(name: &str) -> Self {
        match name {
            "ls" => Command::Ls,
            "cd" => Command::Cd,
            "pwd" => Command::Pwd,
            "cat" => Command::Cat,
            "grep" => Command::Grep,
            "mkdir" => Command::Mkdir,
            "touch" => Command::Touch,
            "rm" => Command::Rm,
            "cp" => Command::Cp,
            "echo" => Command::Echo,
            "env" => Command::Env,
            "mount" => Command::Mount,
            "umount" => Command::Umount,
            "lsblk" => Command::Lsblk,
            "help" => Command::Help,
            other => Command::Custom(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Command::Ls => "ls",
            Command::Cd => "cd",
            Command::Pwd => "pwd",
            Command::Cat => "cat",
            Command::Grep => "grep",
            Command::Mkdir => "mkdir",
            Command::Touch => "touch",
            Command::Rm => "rm",
            Command::Cp => "cp",
            Command::Echo => "echo",
            Command::Env => "env",
            Command::Mount => "mount",
            Command::Umount => "umount",
            Command::Lsblk => "lsblk",
            Command::Help => "help",
            Command::Custom(name) => name,
        }
    }

    pub fn usage(&self) -> &'static str {
        match self {
            Command::Ls => "ls [-a|-l|-la] [path]",
            Command::Cd => "cd [path]",
            Command::Pwd => "pwd",
            Command::Cat => "cat <file>...",
            Command::Grep => "grep [-i] <pattern> <file>",
            Command::Mkdir => "mkdir [-p] <dir>...",
            Command::Touch => "touch <file>...",
            Command::Rm => "rm <path>...",
            Command::Cp => "cp [-r] <src> <dest>",
            Command::Echo => "echo [text]...",
            Command::Env => "env",
            Command::Mount => "mount [<device> <mount point>]",
            Command::Umount => "umount <mount point|device>",
            Command::Lsblk => "lsblk",
            Command::Help => "help",
            Command::Custom(_) => "",
        }
    }

    /// Whether output of this command may be sent through `>`/`>>`
    pub fn writes_output(&self) -> bool {
        !matches!(self, Command::Cd)
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for name in Command::BUILTIN_NAMES {
            let command = Command::from_name(name);
            assert!(!matches!(command, Command::Custom(_)), "{name}");
            assert_eq!(command.name(), *name);
        }
        assert_eq!(Command::from_name("volatility"), Command::Custom("volatility".into()));
    }
}
