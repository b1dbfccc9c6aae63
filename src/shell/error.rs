//! Shell-level failures. `Display` is exactly what the learner sees.

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ShellError {
    #[error("{cmd}: {path}: No such file or directory")]
    PathNotFound { cmd: String, path: String },

    #[error("{cmd}: {path}: Not a directory")]
    NotADirectory { cmd: String, path: String },

    #[error("{cmd}: {path}: Is a directory")]
    NotAFile { cmd: String, path: String },

    #[error("{cmd}: cannot create '{path}': File exists")]
    AlreadyExists { cmd: String, path: String },

    #[error("mount: /dev/{device} is already mounted on {mount_point}")]
    AlreadyMounted { device: String, mount_point: String },

    #[error("umount: {0}: not mounted")]
    NotMounted(String),

    #[error("mount: {0}: no such device attached")]
    DeviceNotAttached(String),

    #[error("{0}: command not found")]
    InvalidCommand(String),

    #[error("{cmd}: invalid arguments\nusage: {usage}")]
    MalformedCustomCommandArgs { cmd: String, usage: String },

    #[error("{cmd}: missing operand\nusage: {usage}")]
    MissingOperand { cmd: String, usage: String },

    #[error("cp: -r not specified; omitting directory '{0}'")]
    OmittingDirectory(String),

    #[error("cp: cannot copy a directory, '{src}', into itself, '{dest}'")]
    CopyIntoSelf { src: String, dest: String },

    #[error("cp: cannot overwrite directory '{0}' with non-directory")]
    OverwriteDirectory(String),

    #[error("rm: cannot remove '{0}': Device or resource busy")]
    Busy(String),

    #[error("{0}: destination directory does not exist")]
    RedirectTargetMissing(String),

    #[error("syntax error near unexpected token `newline'")]
    RedirectSyntax,

    /// One failure per operand, in operand order
    #[error("{}", lines(.0))]
    Several(Vec<ShellError>),
}

fn lines(errors: &[ShellError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n")
}

impl ShellError {
    pub fn not_found(cmd: &str, path: &str) -> Self {
        ShellError::PathNotFound { cmd: cmd.to_string(), path: path.to_string() }
    }

    pub fn not_a_directory(cmd: &str, path: &str) -> Self {
        ShellError::NotADirectory { cmd: cmd.to_string(), path: path.to_string() }
    }

    pub fn not_a_file(cmd: &str, path: &str) -> Self {
        ShellError::NotAFile { cmd: cmd.to_string(), path: path.to_string() }
    }

    pub fn missing_operand(cmd: &str, usage: &str) -> Self {
        ShellError::MissingOperand { cmd: cmd.to_string(), usage: usage.to_string() }
    }

    /// Folds per-operand failures: none is `Ok`, one keeps its own message
    pub fn from_all(mut errors: Vec<ShellError>) -> Result<(), ShellError> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(ShellError::Several(errors)),
        }
    }
}
