//! Runs parsed commands against a session
//!
//! Every handler appends to an `Outcome` and may fail with a `ShellError`.
//! Failures are folded into `ExecOutput::error` text and never escape.

use super::command::Command;
use super::custom::{CustomCommand, TemplateContext};
use super::error::ShellError;
use super::parser::{parse, ParsedCommand, Redirect};
use super::session::Session;
use crate::data::Node;
use crate::vfs::{mount, path, FsError, MountError, MountOutcome};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Result of one command line
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecOutput {
    pub text: String,
    pub error: Option<String>,
    pub new_cwd: Option<String>,
    pub vfs_mutated: bool,
}

impl ExecOutput {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Side effects accumulated by a handler
#[derive(Default)]
struct Outcome {
    text: String,
    mutated: bool,
    new_cwd: Option<String>,
}

/// Dispatches commands; holds the scenario's custom command table
pub struct Executor<'a> {
    custom: &'a BTreeMap<String, CustomCommand>,
}

/// Split `-x` style flags from operands. A lone `-` is an operand.
fn split_flags(args: &[String]) -> (String, Vec<&str>) {
    let mut flags = String::new();
    let mut operands = Vec::new();
    for arg in args {
        match arg.strip_prefix('-') {
            Some(f) if !f.is_empty() => flags.push_str(f),
            _ => operands.push(arg.as_str()),
        }
    }
    (flags, operands)
}

/// Operands of `mount`; `-o` and `-t` take the next argument as their value
fn mount_operands(args: &[String]) -> Vec<&str> {
    let mut operands = Vec::new();
    let mut args = args.iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-o" | "-t" => {
                args.next();
            }
            flag if flag.len() > 1 && flag.starts_with('-') => {}
            operand => operands.push(operand),
        }
    }
    operands
}

fn fs_error(cmd: &str, raw: &str, err: FsError) -> ShellError {
    match err {
        FsError::NotFound => ShellError::not_found(cmd, raw),
        FsError::NotADirectory => ShellError::not_a_directory(cmd, raw),
        FsError::IsADirectory => ShellError::not_a_file(cmd, raw),
        FsError::Exists => ShellError::AlreadyExists { cmd: cmd.to_string(), path: raw.to_string() },
    }
}

impl<'a> Executor<'a> {
    pub fn new(custom: &'a BTreeMap<String, CustomCommand>) -> Self {
        Self { custom }
    }

    /// Parse and run a raw line
    pub fn run(&self, session: &mut Session, line: &str) -> ExecOutput {
        self.execute(session, &parse(line))
    }

    pub fn execute(&self, session: &mut Session, parsed: &ParsedCommand) -> ExecOutput {
        if parsed.is_empty() {
            return ExecOutput::default();
        }

        let command = Command::from_name(&parsed.command);
        let mut out = Outcome::default();
        let result = self.dispatch(&command, session, &parsed.args, &mut out);

        let result = result.and_then(|()| match &parsed.redirect {
            Some(redirect) if command.writes_output() => {
                Self::redirect(session, redirect, &mut out)
            }
            _ => Ok(()),
        });

        ExecOutput {
            text: out.text,
            error: result.err().map(|e| e.to_string()),
            new_cwd: out.new_cwd,
            vfs_mutated: out.mutated,
        }
    }

    fn dispatch(
        &self,
        command: &Command,
        session: &mut Session,
        args: &[String],
        out: &mut Outcome,
    ) -> Result<(), ShellError> {
        match command {
            Command::Ls => Self::ls(session, args, out),
            Command::Cd => Self::cd(session, args, out),
            Command::Pwd => {
                out.text = session.cwd.clone();
                Ok(())
            }
            Command::Cat => Self::cat(session, args, out),
            Command::Grep => Self::grep(session, args, out),
            Command::Mkdir => Self::mkdir(session, args, out),
            Command::Touch => Self::touch(session, args, out),
            Command::Rm => Self::rm(session, args, out),
            Command::Cp => Self::cp(session, args, out),
            Command::Echo => {
                let env = session.environment();
                out.text = args.iter().map(|a| expand_vars(a, &env)).collect::<Vec<_>>().join(" ");
                Ok(())
            }
            Command::Env => {
                out.text = session
                    .environment()
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, v))
                    .collect::<Vec<_>>()
                    .join("\n");
                Ok(())
            }
            Command::Mount => Self::mount(session, args, out),
            Command::Umount => Self::umount(session, args),
            Command::Lsblk => {
                out.text = lsblk(session);
                Ok(())
            }
            Command::Help => {
                out.text = self.help();
                Ok(())
            }
            Command::Custom(name) => {
                let custom = self
                    .custom
                    .get(name)
                    .ok_or_else(|| ShellError::InvalidCommand(name.clone()))?;
                let ctx = TemplateContext { args, cwd: &session.cwd, user: &session.user };
                out.text = custom.run(name, &ctx)?;
                Ok(())
            }
        }
    }

    /// Send the output to a file instead of the terminal. Missing parent
    /// directories are an error; they are never created here.
    fn redirect(session: &mut Session, redirect: &Redirect, out: &mut Outcome) -> Result<(), ShellError> {
        if redirect.path.is_empty() {
            return Err(ShellError::RedirectSyntax);
        }
        let target = session.resolve(&redirect.path);
        let mut data = std::mem::take(&mut out.text);
        if !data.is_empty() && !data.ends_with('\n') {
            data.push('\n');
        }
        match session.vfs.write_file(&target, &data, redirect.append) {
            Ok(()) => {
                out.mutated = true;
                Ok(())
            }
            Err(FsError::IsADirectory) => Err(ShellError::not_a_file("bash", &redirect.path)),
            Err(_) => Err(ShellError::RedirectTargetMissing(redirect.path.clone())),
        }
    }

    fn ls(session: &Session, args: &[String], out: &mut Outcome) -> Result<(), ShellError> {
        let (flags, operands) = split_flags(args);
        let show_all = flags.contains('a');
        let long = flags.contains('l');
        let raw = operands.first().copied().unwrap_or(".");
        let target = session.resolve(raw);

        let node = session
            .vfs
            .get_node(&target)
            .ok_or_else(|| ShellError::not_found("ls", raw))?;

        out.text = match node {
            Node::File { .. } => {
                let name = path::basename(&target);
                if long { long_entry(name, node) } else { name.to_string() }
            }
            Node::Directory { children } => {
                let visible = children.iter().filter(|(name, _)| show_all || !name.starts_with('.'));
                if long {
                    visible.map(|(name, child)| long_entry(name, child)).collect::<Vec<_>>().join("\n")
                } else {
                    visible.map(|(name, _)| name.as_str()).collect::<Vec<_>>().join("  ")
                }
            }
        };
        Ok(())
    }

    fn cd(session: &mut Session, args: &[String], out: &mut Outcome) -> Result<(), ShellError> {
        let target = match args.first() {
            None => session.home.clone(),
            Some(raw) => {
                let target = session.resolve(raw);
                match session.vfs.get_node(&target) {
                    Some(node) if node.is_dir() => target,
                    Some(_) => return Err(ShellError::not_a_directory("cd", raw)),
                    None => return Err(ShellError::not_found("cd", raw)),
                }
            }
        };
        session.cwd = target.clone();
        out.new_cwd = Some(target);
        Ok(())
    }

    fn read_file<'s>(session: &'s Session, cmd: &str, raw: &str) -> Result<&'s str, ShellError> {
        match session.vfs.get_node(&session.resolve(raw)) {
            Some(Node::File { content }) => Ok(content),
            Some(Node::Directory { .. }) => Err(ShellError::not_a_file(cmd, raw)),
            None => Err(ShellError::not_found(cmd, raw)),
        }
    }

    fn cat(session: &Session, args: &[String], out: &mut Outcome) -> Result<(), ShellError> {
        if args.is_empty() {
            return Err(ShellError::missing_operand("cat", Command::Cat.usage()));
        }
        for raw in args {
            let content = Self::read_file(session, "cat", raw)?;
            out.text.push_str(content);
        }
        Ok(())
    }

    fn grep(session: &Session, args: &[String], out: &mut Outcome) -> Result<(), ShellError> {
        let (flags, operands) = split_flags(args);
        let [pattern, raw, ..] = operands.as_slice() else {
            return Err(ShellError::missing_operand("grep", Command::Grep.usage()));
        };
        let content = Self::read_file(session, "grep", raw)?;
        let matches: Vec<&str> = if flags.contains('i') {
            let needle = pattern.to_lowercase();
            content.lines().filter(|l| l.to_lowercase().contains(&needle)).collect()
        } else {
            content.lines().filter(|l| l.contains(pattern)).collect()
        };
        out.text = matches.join("\n");
        Ok(())
    }

    fn mkdir(session: &mut Session, args: &[String], out: &mut Outcome) -> Result<(), ShellError> {
        let (flags, operands) = split_flags(args);
        if operands.is_empty() {
            return Err(ShellError::missing_operand("mkdir", Command::Mkdir.usage()));
        }
        let parents = flags.contains('p');
        let mut errors = Vec::new();
        for raw in operands {
            let target = session.resolve(raw);
            let made = if parents {
                if session.vfs.is_dir(&target) {
                    continue;
                }
                session.vfs.create_dir_all(&target)
            } else {
                session.vfs.mkdir(&target)
            };
            match made {
                Ok(()) => out.mutated = true,
                Err(e) => errors.push(fs_error("mkdir", raw, e)),
            }
        }
        ShellError::from_all(errors)
    }

    fn touch(session: &mut Session, args: &[String], out: &mut Outcome) -> Result<(), ShellError> {
        if args.is_empty() {
            return Err(ShellError::missing_operand("touch", Command::Touch.usage()));
        }
        let mut errors = Vec::new();
        for raw in args {
            let target = session.resolve(raw);
            match session.vfs.touch(&target) {
                Ok(created) => out.mutated |= created,
                Err(e) => errors.push(fs_error("touch", raw, e)),
            }
        }
        ShellError::from_all(errors)
    }

    /// Removes one entry per operand, directories included, without recursion flags
    fn rm(session: &mut Session, args: &[String], out: &mut Outcome) -> Result<(), ShellError> {
        let (_, operands) = split_flags(args);
        if operands.is_empty() {
            return Err(ShellError::missing_operand("rm", Command::Rm.usage()));
        }
        let mut errors = Vec::new();
        for raw in operands {
            let target = session.resolve(raw);
            let removed = if !session.vfs.exists(&target) {
                Err(ShellError::not_found("rm", raw))
            } else if path::is_within(&session.cwd, &target) {
                Err(ShellError::Busy(raw.to_string()))
            } else {
                session.vfs.remove(&target).map(|_| ()).map_err(|e| fs_error("rm", raw, e))
            };
            match removed {
                Ok(()) => out.mutated = true,
                Err(e) => errors.push(e),
            }
        }
        ShellError::from_all(errors)
    }

    fn cp(session: &mut Session, args: &[String], out: &mut Outcome) -> Result<(), ShellError> {
        let (flags, operands) = split_flags(args);
        let [src_raw, dest_raw, ..] = operands.as_slice() else {
            return Err(ShellError::missing_operand("cp", Command::Cp.usage()));
        };
        let recursive = flags.contains('r') || flags.contains('R') || flags.contains('a');
        let src = session.resolve(src_raw);
        let dest = session.resolve(dest_raw);

        let source = session
            .vfs
            .get_node(&src)
            .cloned()
            .ok_or_else(|| ShellError::not_found("cp", src_raw))?;
        if source.is_dir() && !recursive {
            return Err(ShellError::OmittingDirectory(src_raw.to_string()));
        }

        let target = if session.vfs.is_dir(&dest) {
            path::join(&dest, path::basename(&src))
        } else {
            dest
        };
        if source.is_dir() && path::is_within(&target, &src) {
            return Err(ShellError::CopyIntoSelf { src: src_raw.to_string(), dest: dest_raw.to_string() });
        }

        match session.vfs.get_node(&target) {
            Some(existing) if existing.is_dir() && !source.is_dir() => {
                return Err(ShellError::OverwriteDirectory(target));
            }
            Some(existing) if !existing.is_dir() && source.is_dir() => {
                return Err(ShellError::not_a_directory("cp", dest_raw));
            }
            Some(_) => {}
            None => {
                if let Some((parent, _)) = path::split_parent(&target) {
                    session
                        .vfs
                        .create_dir_all(&parent)
                        .map_err(|e| fs_error("cp", dest_raw, e))?;
                }
            }
        }

        session.vfs.insert(&target, source).map_err(|e| fs_error("cp", dest_raw, e))?;
        out.mutated = true;
        Ok(())
    }

    fn mount(session: &mut Session, args: &[String], out: &mut Outcome) -> Result<(), ShellError> {
        let operands = mount_operands(args);
        match operands.as_slice() {
            [] => {
                out.text = session
                    .devices
                    .mounted()
                    .map(|d| {
                        format!("{} on {} type {}", d.dev_path(), d.mount_point.as_deref().unwrap_or("?"), d.kind)
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                Ok(())
            }
            [_] => Err(ShellError::missing_operand("mount", Command::Mount.usage())),
            [device, point, ..] => {
                let mount_point = session.resolve(point);
                let Session { vfs, devices, .. } = session;
                let outcome = mount::mount(vfs, devices, device, &mount_point).map_err(mount_error)?;
                if let MountOutcome::Mounted { .. } = outcome {
                    out.mutated = true;
                }
                out.text = outcome.message();
                Ok(())
            }
        }
    }

    fn umount(session: &mut Session, args: &[String]) -> Result<(), ShellError> {
        let (_, operands) = split_flags(args);
        let Some(raw) = operands.first() else {
            return Err(ShellError::missing_operand("umount", Command::Umount.usage()));
        };
        let target = if raw.starts_with("/dev/") { raw.to_string() } else { session.resolve(raw) };
        mount::unmount(&mut session.devices, &target).map_err(|_| ShellError::NotMounted(raw.to_string()))?;
        Ok(())
    }

    fn help(&self) -> String {
        let mut lines: Vec<String> = Command::BUILTIN_NAMES
            .iter()
            .map(|name| format!("  {}", Command::from_name(name).usage()))
            .collect();
        if !self.custom.is_empty() {
            lines.push("scenario tools:".to_string());
            lines.extend(self.custom.keys().map(|name| format!("  {}", name)));
        }
        lines.join("\n")
    }
}

pub(crate) fn mount_error(err: MountError) -> ShellError {
    match err {
        MountError::DeviceNotAttached(path) => ShellError::DeviceNotAttached(path),
        MountError::AlreadyMounted { device, mount_point } => ShellError::AlreadyMounted { device, mount_point },
        MountError::NotMounted(target) => ShellError::NotMounted(target),
        MountError::NotADirectory(point) => ShellError::not_a_directory("mount", &point),
    }
}

fn long_entry(name: &str, node: &Node) -> String {
    let mode = if node.is_dir() { "drwxr-xr-x" } else { "-rw-r--r--" };
    format!("{} {:>8} {}", mode, node.size(), name)
}

fn lsblk(session: &Session) -> String {
    let mut lines = vec![format!("{:<10} {:<7} {:<6} {}", "NAME", "TYPE", "SIZE", "MOUNTPOINT")];
    for device in session.devices.list() {
        lines.push(format!(
            "{:<10} {:<7} {:<6} {}",
            device.name,
            device.kind,
            device.size,
            device.mount_point.as_deref().unwrap_or("")
        ));
    }
    lines.join("\n")
}

/// Replace `$NAME` with its value; unknown variables expand to nothing
fn expand_vars(arg: &str, env: &BTreeMap<String, String>) -> String {
    let mut out = String::new();
    let mut chars = arg.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        let mut name = String::new();
        while let Some(&next) = chars.peek() {
            if next.is_ascii_alphanumeric() || next == '_' {
                name.push(next);
                chars.next();
            } else {
                break;
            }
        }
        if name.is_empty() {
            out.push('$');
        } else if let Some(value) = env.get(&name) {
            out.push_str(value);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Device, DeviceEntry, DeviceKind};

    fn session() -> Session {
        let root = Node::dir_with([(
            "home",
            Node::dir_with([(
                "user",
                Node::dir_with([
                    (".bash_history", Node::file("ls\n")),
                    ("notes.txt", Node::file("meeting at 9\nwire transfer approved\nWire fraud?\n")),
                    ("evidence", Node::dir()),
                ]),
            )]),
        )]);
        Session::new(root, "/home/user", "analyst")
    }

    fn run(session: &mut Session, line: &str) -> ExecOutput {
        let custom = BTreeMap::new();
        Executor::new(&custom).run(session, line)
    }

    #[test]
    fn ls_hides_dotfiles_unless_asked() {
        let mut s = session();
        assert_eq!(run(&mut s, "ls").text, "evidence  notes.txt");
        assert_eq!(run(&mut s, "ls -a").text, ".bash_history  evidence  notes.txt");
        assert_eq!(run(&mut s, "ls -la").text.lines().count(), 3);
        assert_eq!(run(&mut s, "ls notes.txt").text, "notes.txt");
        let missing = run(&mut s, "ls nowhere");
        assert_eq!(missing.error.as_deref(), Some("ls: nowhere: No such file or directory"));
    }

    #[test]
    fn cd_moves_and_reports_errors() {
        let mut s = session();
        let out = run(&mut s, "cd evidence");
        assert_eq!(out.new_cwd.as_deref(), Some("/home/user/evidence"));
        assert_eq!(run(&mut s, "pwd").text, "/home/user/evidence");

        let out = run(&mut s, "cd ../notes.txt");
        assert_eq!(out.error.as_deref(), Some("cd: ../notes.txt: Not a directory"));
        let out = run(&mut s, "cd /nope");
        assert_eq!(out.error.as_deref(), Some("cd: /nope: No such file or directory"));

        run(&mut s, "cd /");
        run(&mut s, "cd");
        assert_eq!(s.cwd, "/home/user");
    }

    #[test]
    fn cat_and_grep() {
        let mut s = session();
        assert!(run(&mut s, "cat notes.txt").text.starts_with("meeting at 9"));
        assert_eq!(run(&mut s, "cat evidence").error.as_deref(), Some("cat: evidence: Is a directory"));
        assert_eq!(run(&mut s, "grep wire notes.txt").text, "wire transfer approved");
        assert_eq!(
            run(&mut s, "grep -i wire notes.txt").text,
            "wire transfer approved\nWire fraud?"
        );
        assert_eq!(run(&mut s, "grep \"at 9\" notes.txt").text, "meeting at 9");
        assert_eq!(run(&mut s, "grep [a-z] notes.txt").text, "");
        assert!(run(&mut s, "grep wire").error.is_some());
    }

    #[test]
    fn mkdir_requires_ancestors_unless_p() {
        let mut s = session();
        let out = run(&mut s, "mkdir a/b");
        assert_eq!(out.error.as_deref(), Some("mkdir: a/b: No such file or directory"));
        assert!(!out.vfs_mutated);

        assert!(run(&mut s, "mkdir a").vfs_mutated);
        assert!(run(&mut s, "mkdir a/b").is_ok());
        assert_eq!(run(&mut s, "ls a").text, "b");
        assert_eq!(run(&mut s, "mkdir a").error.as_deref(), Some("mkdir: cannot create 'a': File exists"));

        assert!(run(&mut s, "mkdir -p x/y/z").is_ok());
        assert!(s.vfs.is_dir("/home/user/x/y/z"));
        assert!(run(&mut s, "mkdir -p x/y").is_ok());
    }

    #[test]
    fn touch_twice_is_a_no_op() {
        let mut s = session();
        assert!(run(&mut s, "touch f").vfs_mutated);
        run(&mut s, "echo data > f");
        let second = run(&mut s, "touch f");
        assert!(second.is_ok());
        assert!(!second.vfs_mutated);
        assert_eq!(s.vfs.get_node("/home/user/f").unwrap().content(), Some("data\n"));
    }

    #[test]
    fn rm_removes_one_entry_and_fails_when_missing() {
        let mut s = session();
        run(&mut s, "touch f");
        assert!(run(&mut s, "rm f").is_ok());
        assert_eq!(run(&mut s, "rm f").error.as_deref(), Some("rm: f: No such file or directory"));
        // directories go without -r
        assert!(run(&mut s, "rm evidence").is_ok());
        assert!(!s.vfs.exists("/home/user/evidence"));
        assert!(run(&mut s, "rm /home").error.unwrap().contains("busy"));
    }

    #[test]
    fn cp_semantics() {
        let mut s = session();
        run(&mut s, "mkdir -p case/docs");
        run(&mut s, "echo secret > case/docs/a.txt");

        assert_eq!(
            run(&mut s, "cp case backup").error.as_deref(),
            Some("cp: -r not specified; omitting directory 'case'")
        );

        // into an existing directory: nested under the source basename
        assert!(run(&mut s, "cp notes.txt evidence").is_ok());
        assert!(s.vfs.exists("/home/user/evidence/notes.txt"));

        // to a missing destination: intermediate dirs are created, subtree cloned
        assert!(run(&mut s, "cp -r case archive/2024/case").is_ok());
        assert_eq!(
            s.vfs.get_node("/home/user/archive/2024/case/docs/a.txt").unwrap().content(),
            Some("secret\n")
        );

        // deep clone: later edits to the source don't leak
        run(&mut s, "echo changed > case/docs/a.txt");
        assert_eq!(
            s.vfs.get_node("/home/user/archive/2024/case/docs/a.txt").unwrap().content(),
            Some("secret\n")
        );

        assert!(run(&mut s, "cp -r case case/docs").error.unwrap().contains("into itself"));
        assert!(run(&mut s, "cp ghost x").error.is_some());
    }

    #[test]
    fn redirection_writes_and_appends() {
        let mut s = session();
        let out = run(&mut s, "echo hi > out.txt");
        assert!(out.is_ok());
        assert!(out.vfs_mutated);
        assert_eq!(out.text, "");
        run(&mut s, "echo bye >> out.txt");
        assert_eq!(s.vfs.get_node("/home/user/out.txt").unwrap().content(), Some("hi\nbye\n"));

        run(&mut s, "cat notes.txt > copy.txt");
        assert_eq!(
            s.vfs.get_node("/home/user/copy.txt").unwrap().content(),
            s.vfs.get_node("/home/user/notes.txt").unwrap().content()
        );
    }

    #[test]
    fn redirection_never_creates_directories() {
        let mut s = session();
        let out = run(&mut s, "echo hi > missing/out.txt");
        assert_eq!(out.error.as_deref(), Some("missing/out.txt: destination directory does not exist"));
        assert!(!out.vfs_mutated);
        assert!(!s.vfs.exists("/home/user/missing"));

        // mkdir -p would have created it
        run(&mut s, "mkdir -p missing");
        assert!(run(&mut s, "echo hi > missing/out.txt").is_ok());
        assert_eq!(run(&mut s, "echo hi >").error.as_deref(), Some("syntax error near unexpected token `newline'"));
    }

    #[test]
    fn echo_expands_variables_and_env_lists_them() {
        let mut s = session();
        assert_eq!(run(&mut s, "echo $USER in $HOME $NOPE$").text, "analyst in /home/user $");
        let env = run(&mut s, "env").text;
        assert!(env.contains("PWD=/home/user"));
        assert!(env.lines().any(|l| l == "USER=analyst"));
    }

    #[test]
    fn rm_and_touch_keep_going_past_a_bad_operand() {
        let mut s = session();
        run(&mut s, "touch a b");

        let out = run(&mut s, "rm a ghost b");
        assert_eq!(out.error.as_deref(), Some("rm: ghost: No such file or directory"));
        assert!(out.vfs_mutated);
        assert!(!s.vfs.exists("/home/user/a"));
        assert!(!s.vfs.exists("/home/user/b"));

        let out = run(&mut s, "touch x nowhere/y other/z w");
        assert_eq!(
            out.error.as_deref(),
            Some("touch: nowhere/y: No such file or directory\ntouch: other/z: No such file or directory")
        );
        assert!(s.vfs.exists("/home/user/x"));
        assert!(s.vfs.exists("/home/user/w"));

        let out = run(&mut s, "mkdir one evidence two");
        assert!(out.error.unwrap().contains("evidence"));
        assert!(s.vfs.is_dir("/home/user/one"));
        assert!(s.vfs.is_dir("/home/user/two"));
    }

    #[test]
    fn empty_output_redirects_to_an_empty_file() {
        let mut s = session();
        assert!(run(&mut s, "grep nomatch notes.txt > hits.txt").is_ok());
        assert_eq!(s.vfs.get_node("/home/user/hits.txt").unwrap().content(), Some(""));
        assert!(run(&mut s, "ls evidence > listing.txt").is_ok());
        assert_eq!(s.vfs.get_node("/home/user/listing.txt").unwrap().content(), Some(""));
        run(&mut s, "echo one > log.txt");
        run(&mut s, "grep nomatch notes.txt >> log.txt");
        assert_eq!(s.vfs.get_node("/home/user/log.txt").unwrap().content(), Some("one\n"));
    }

    #[test]
    fn mount_options_take_a_value() {
        let mut s = session();
        s.devices.attach(
            Device::new("sdc", DeviceKind::Disk).with_entry("mft.csv", DeviceEntry::Text("inode,name".into())),
        );
        let out = run(&mut s, "mount -o loop,ro /evidence/disk.img /mnt/image");
        assert!(out.is_ok(), "{:?}", out.error);
        assert_eq!(run(&mut s, "cat /mnt/image/mft.csv").text, "inode,name");

        run(&mut s, "umount /mnt/image");
        assert!(run(&mut s, "mount -t ext4 -r /dev/sdc /mnt/image").is_ok());
        assert_eq!(
            run(&mut s, "mount -o ro /dev/sdc").error.as_deref(),
            Some("mount: missing operand\nusage: mount [<device> <mount point>]")
        );
    }

    #[test]
    fn mount_lsblk_and_umount() {
        let mut s = session();
        s.devices.attach(
            Device::new("sdb1", DeviceKind::Disk).with_entry("leak.csv", DeviceEntry::Text("ssn,name".into())),
        );
        assert_eq!(
            run(&mut s, "mount /dev/sdz /mnt").error.as_deref(),
            Some("mount: /dev/sdz: no such device attached")
        );
        let out = run(&mut s, "mount /dev/sdb1 /mnt/usb");
        assert!(out.vfs_mutated);
        assert_eq!(run(&mut s, "cat /mnt/usb/leak.csv").text, "ssn,name");
        assert!(run(&mut s, "lsblk").text.contains("/mnt/usb"));
        assert_eq!(run(&mut s, "mount").text, "/dev/sdb1 on /mnt/usb type disk");

        let again = run(&mut s, "mount /dev/sdb1 /mnt/usb");
        assert!(again.is_ok());
        assert!(again.text.contains("already mounted"));
        assert_eq!(
            run(&mut s, "mount /dev/sdb1 /media").error.as_deref(),
            Some("mount: /dev/sdb1 is already mounted on /mnt/usb")
        );

        assert!(run(&mut s, "umount /mnt/usb").is_ok());
        assert_eq!(run(&mut s, "umount /mnt/usb").error.as_deref(), Some("umount: /mnt/usb: not mounted"));
        assert!(s.vfs.exists("/mnt/usb/leak.csv"));
    }

    #[test]
    fn custom_and_unknown_commands() {
        let mut s = session();
        let mut custom = BTreeMap::new();
        custom.insert("sha256sum".to_string(), CustomCommand::Text { template: "e3b0c442  {arg1}".into() });
        let exec = Executor::new(&custom);
        assert_eq!(exec.run(&mut s, "sha256sum disk.img").text, "e3b0c442  disk.img");
        assert_eq!(exec.run(&mut s, "nmap 10.0.0.1").error.as_deref(), Some("nmap: command not found"));
        assert!(exec.run(&mut s, "help").text.contains("sha256sum"));
        assert_eq!(exec.run(&mut s, ""), ExecOutput::default());
    }
}
