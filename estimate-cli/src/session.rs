//! Interactive command loop driving one estimate form.

use std::{
    io::{self, Write},
    path::{Path, PathBuf},
};

use anyhow::Result;
use estimate_core::{
    EstimateFormController, FormEvent, Response, SubmitOutcome,
    models::{AttachmentId, DroppedFile, FieldKind, InputValue, PickedFile},
    staging::StagingReport,
};
use thiserror::Error;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt},
    task::JoinSet,
};
use tracing::{debug, warn};

use crate::{console::ConsoleView, logging};

pub const HELP: &str = "\
commands:
  set <field> <value>        type a value (empty value clears it)
  check <field> [option]     tick a checkbox, a group option or a radio choice
  uncheck <field> [option]   untick a checkbox or a group option
  attach <path>...           add photos from disk
  drop <mime> <path>         add a photo as if dragged in with the given type
  remove <id>                remove a staged photo, e.g. `remove #2`
  next | back                move between steps
  submit                     send the request (final step)
  show                       list the fields of the current step
  log <level>|on|off|file <path>
  help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogCommand {
    Level(String),
    Stdout(bool),
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Set { field: String, value: String },
    Check { field: String, option: Option<String> },
    Uncheck { field: String, option: Option<String> },
    Attach(Vec<PathBuf>),
    Drop { mime_type: String, path: PathBuf },
    Remove(AttachmentId),
    Next,
    Back,
    Submit,
    Show,
    Log(LogCommand),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command '{0}'; type `help` for a list")]
    Unknown(String),
    #[error("`{command}` needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
    #[error("'{0}' is not an attachment id")]
    BadId(String),
}

/// Splits off the first whitespace-delimited word.
fn next_word(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim_start()),
        None => (input, ""),
    }
}

fn required<'a>(
    word: &'a str,
    command: &'static str,
    argument: &'static str,
) -> Result<&'a str, CommandError> {
    if word.is_empty() {
        Err(CommandError::MissingArgument { command, argument })
    } else {
        Ok(word)
    }
}

fn toggle_target(
    rest: &str,
    command: &'static str,
) -> Result<(String, Option<String>), CommandError> {
    let (field, rest) = next_word(rest);
    let field = required(field, command, "a field")?;
    let option = rest.trim();
    Ok((
        field.to_string(),
        (!option.is_empty()).then(|| option.to_string()),
    ))
}

/// Parses one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let (verb, rest) = next_word(line.trim());
    let command = match verb.to_ascii_lowercase().as_str() {
        "" => return Ok(None),
        "set" => {
            let (field, value) = next_word(rest);
            Command::Set {
                field: required(field, "set", "a field")?.to_string(),
                value: value.trim_end().to_string(),
            }
        }
        "check" => {
            let (field, option) = toggle_target(rest, "check")?;
            Command::Check { field, option }
        }
        "uncheck" => {
            let (field, option) = toggle_target(rest, "uncheck")?;
            Command::Uncheck { field, option }
        }
        "attach" => {
            let paths: Vec<PathBuf> = rest.split_whitespace().map(PathBuf::from).collect();
            if paths.is_empty() {
                return Err(CommandError::MissingArgument {
                    command: "attach",
                    argument: "at least one path",
                });
            }
            Command::Attach(paths)
        }
        "drop" => {
            let (mime_type, path) = next_word(rest);
            Command::Drop {
                mime_type: required(mime_type, "drop", "a MIME type")?.to_string(),
                path: PathBuf::from(required(path.trim(), "drop", "a path")?),
            }
        }
        "remove" => {
            let raw = required(rest.trim(), "remove", "an attachment id")?;
            let id = raw
                .trim_start_matches('#')
                .parse()
                .map_err(|_| CommandError::BadId(raw.to_string()))?;
            Command::Remove(AttachmentId(id))
        }
        "next" => Command::Next,
        "back" | "previous" => Command::Back,
        "submit" => Command::Submit,
        "show" => Command::Show,
        "log" => {
            let (arg, path) = next_word(rest);
            Command::Log(match required(arg, "log", "a level, on, off or file")? {
                "on" => LogCommand::Stdout(true),
                "off" => LogCommand::Stdout(false),
                "file" => LogCommand::File(PathBuf::from(required(path.trim(), "log file", "a path")?)),
                level => LogCommand::Level(level.to_string()),
            })
        }
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    Submitted,
    Quit,
    EndOfInput,
}

pub struct Session<W: Write> {
    form: EstimateFormController<ConsoleView<W>>,
}

impl<W: Write> Session<W> {
    pub fn new(form: EstimateFormController<ConsoleView<W>>) -> Self {
        Self { form }
    }

    pub fn form(&self) -> &EstimateFormController<ConsoleView<W>> {
        &self.form
    }

    pub fn into_form(self) -> EstimateFormController<ConsoleView<W>> {
        self.form
    }

    fn emit(
        &mut self,
        line: impl std::fmt::Display,
    ) {
        self.form.view_mut().emit(line);
    }

    /// Reads commands from `input` until the form is submitted, the user
    /// quits, or input ends.
    pub async fn run<R>(
        &mut self,
        input: R,
    ) -> Result<SessionEnd>
    where
        R: AsyncBufRead + Unpin,
    {
        self.emit("type `help` for commands");
        let mut lines = input.lines();

        loop {
            let prompt = match self.form.view().focused() {
                Some(field) => format!("{}:{field}> ", self.form.current_step()),
                None => format!("{}> ", self.form.current_step()),
            };
            self.form.view_mut().prompt(prompt);

            let Some(line) = lines.next_line().await? else {
                return Ok(SessionEnd::EndOfInput);
            };

            match parse_command(&line) {
                Ok(None) => {}
                Ok(Some(command)) => {
                    debug!(?command, "command");
                    if let Some(end) = self.execute(command).await {
                        return Ok(end);
                    }
                }
                Err(err) => self.emit(format_args!("[error] {err}")),
            }
        }
    }

    /// Runs one command; `Some` when the session should end.
    pub async fn execute(
        &mut self,
        command: Command,
    ) -> Option<SessionEnd> {
        match command {
            Command::Set { field, value } => {
                let response = self.form.handle(FormEvent::input(&field, value)).await;
                if matches!(response, Response::Ignored) {
                    self.explain_ignored(&field);
                } else {
                    self.form.handle(FormEvent::blur(field)).await;
                }
            }
            Command::Check { field, option } => self.toggle(field, option, true).await,
            Command::Uncheck { field, option } => self.toggle(field, option, false).await,
            Command::Attach(paths) => {
                let max_size = self.form.attachments().limits().max_file_size;
                let mut files = Vec::with_capacity(paths.len());
                for path in paths {
                    match read_within(&path, max_size).await {
                        Ok((size_bytes, bytes)) => files.push(PickedFile {
                            path,
                            size_bytes,
                            bytes,
                        }),
                        Err(err) => {
                            warn!(path = %path.display(), "cannot read attachment: {err}");
                            self.emit(format_args!("[error] cannot read {}: {err}", path.display()));
                        }
                    }
                }
                if !files.is_empty() {
                    let response = self.form.handle(FormEvent::FilesPicked(files)).await;
                    self.after_staging(response).await;
                }
            }
            Command::Drop { mime_type, path } => {
                let max_size = self.form.attachments().limits().max_file_size;
                match read_within(&path, max_size).await {
                    Ok((size_bytes, bytes)) => {
                        let name = path
                            .file_name()
                            .map(|n| n.to_string_lossy().into_owned())
                            .unwrap_or_default();
                        self.form.handle(FormEvent::DragEnter).await;
                        let response = self
                            .form
                            .handle(FormEvent::FilesDropped(vec![DroppedFile {
                                name,
                                mime_type,
                                size_bytes,
                                bytes,
                            }]))
                            .await;
                        self.after_staging(response).await;
                    }
                    Err(err) => {
                        warn!(path = %path.display(), "cannot read dropped file: {err}");
                        self.emit(format_args!("[error] cannot read {}: {err}", path.display()));
                    }
                }
            }
            Command::Remove(id) => {
                if let Response::Removed(false) = self.form.handle(FormEvent::RemoveFile(id)).await {
                    self.emit(format_args!("[info] no staged photo {id}"));
                }
            }
            Command::Next => {
                self.form.handle(FormEvent::Next).await;
            }
            Command::Back => {
                self.form.handle(FormEvent::Previous).await;
            }
            Command::Submit => {
                if let Response::Submitted(SubmitOutcome::Submitted) =
                    self.form.handle(FormEvent::Submit).await
                {
                    return Some(SessionEnd::Submitted);
                }
            }
            Command::Show => self.show(),
            Command::Log(log) => {
                let result = match &log {
                    LogCommand::Level(level) => logging::set_log_level(level),
                    LogCommand::Stdout(enabled) => logging::set_stdout_enabled(*enabled),
                    LogCommand::File(path) => logging::enable_file_logging(path),
                };
                if let Err(err) = result {
                    self.emit(format_args!("[error] {err:#}"));
                }
            }
            Command::Help => self.emit(HELP),
            Command::Quit => return Some(SessionEnd::Quit),
        }
        None
    }

    async fn toggle(
        &mut self,
        field: String,
        option: Option<String>,
        checked: bool,
    ) {
        let event = FormEvent::Toggle {
            field: field.clone(),
            option,
            checked,
        };
        if matches!(self.form.handle(event).await, Response::Ignored) {
            self.explain_ignored(&field);
        } else {
            self.form.handle(FormEvent::blur(field)).await;
        }
    }

    fn explain_ignored(
        &mut self,
        field: &str,
    ) {
        let hint = match self.form.schema().field(field).map(|f| &f.kind) {
            None => format!("[error] no field named '{field}'"),
            Some(FieldKind::Checkbox) => format!("[error] '{field}' is a checkbox; use check/uncheck"),
            Some(kind) if !kind.options().is_empty() => format!(
                "[error] '{field}' takes one of: {}",
                kind.options().join(", ")
            ),
            Some(_) => format!("[error] '{field}' is a text field; use set"),
        };
        self.emit(hint);
    }

    async fn after_staging(
        &mut self,
        response: Response,
    ) {
        if let Response::Staged(report) = response {
            self.load_previews(report).await;
        }
    }

    /// Encodes previews concurrently and applies them as they finish.
    async fn load_previews(
        &mut self,
        report: StagingReport,
    ) {
        let mut tasks = JoinSet::new();
        for task in report.accepted {
            tasks.spawn(task.load());
        }
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(preview) => {
                    self.form.apply_preview(preview);
                }
                Err(err) => warn!("preview task failed: {err}"),
            }
        }
    }

    fn show(&mut self) {
        let step = self.form.current_step();
        let mut lines = Vec::new();

        if let Some(spec) = self.form.schema().step(step) {
            lines.push(format!("-- {} --", spec.title));
            for field in spec.fields.iter().filter(|f| self.form.is_visible(&f.id)) {
                let value = match self.form.input(&field.id) {
                    Some(InputValue::Text(text)) => text.clone(),
                    Some(InputValue::Checked(true)) => "yes".to_string(),
                    Some(InputValue::Checked(false)) => "no".to_string(),
                    Some(InputValue::Selection(set)) => {
                        set.iter().cloned().collect::<Vec<_>>().join(", ")
                    }
                    None => String::new(),
                };
                let marker = if field.required { "*" } else { " " };
                let mut line = format!("{marker} {:<18} {:<24} = {value}", field.id, field.label);
                if !field.kind.options().is_empty() {
                    line.push_str(&format!("  [{}]", field.kind.options().join("|")));
                }
                if let Some(error) = self.form.field_error(&field.id) {
                    line.push_str(&format!("  ! {error}"));
                }
                lines.push(line);
            }
        }

        let photos: Vec<String> = self
            .form
            .attachments()
            .as_slice()
            .iter()
            .map(|a| format!("{} {}", a.id, a.name))
            .collect();
        if !photos.is_empty() {
            lines.push(format!("photos: {}", photos.join(", ")));
        }

        for line in lines {
            self.emit(line);
        }
    }
}

/// Reads a regular file unless it is larger than `max_size`, in which case
/// only its size is returned and staging rejects it unread.
async fn read_within(
    path: &Path,
    max_size: u64,
) -> io::Result<(u64, Vec<u8>)> {
    let metadata = tokio::fs::metadata(path).await?;
    if !metadata.is_file() {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"));
    }
    let size = metadata.len();
    if size > max_size {
        debug!(path = %path.display(), size, "attachment over size limit, not read");
        return Ok((size, Vec::new()));
    }
    let bytes = tokio::fs::read(path).await?;
    Ok((bytes.len() as u64, bytes))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn set_keeps_spaces_in_value() {
        assert_eq!(
            parse_command("set damageDescription  Dent on the  rear door ").unwrap(),
            Some(Command::Set {
                field: "damageDescription".to_string(),
                value: "Dent on the  rear door".to_string(),
            })
        );
    }

    #[test]
    fn set_without_value_clears() {
        assert_eq!(
            parse_command("set vin").unwrap(),
            Some(Command::Set {
                field: "vin".to_string(),
                value: String::new(),
            })
        );
    }

    #[test]
    fn check_takes_an_optional_option() {
        assert_eq!(
            parse_command("check terms").unwrap(),
            Some(Command::Check {
                field: "terms".to_string(),
                option: None,
            })
        );
        assert_eq!(
            parse_command("UNCHECK serviceType paint").unwrap(),
            Some(Command::Uncheck {
                field: "serviceType".to_string(),
                option: Some("paint".to_string()),
            })
        );
    }

    #[test]
    fn remove_accepts_hash_prefix() {
        assert_eq!(
            parse_command("remove #4").unwrap(),
            Some(Command::Remove(AttachmentId(4)))
        );
        assert_eq!(
            parse_command("remove four"),
            Err(CommandError::BadId("four".to_string()))
        );
    }

    #[test]
    fn blank_line_is_not_a_command() {
        assert_eq!(parse_command("   ").unwrap(), None);
    }

    #[test]
    fn missing_arguments_are_reported() {
        assert_eq!(
            parse_command("attach").unwrap_err().to_string(),
            "`attach` needs at least one path"
        );
        assert!(matches!(
            parse_command("drop image/png"),
            Err(CommandError::MissingArgument { command: "drop", .. })
        ));
    }

    #[test]
    fn log_subcommands() {
        assert_eq!(
            parse_command("log off").unwrap(),
            Some(Command::Log(LogCommand::Stdout(false)))
        );
        assert_eq!(
            parse_command("log debug").unwrap(),
            Some(Command::Log(LogCommand::Level("debug".to_string())))
        );
        assert_eq!(
            parse_command("log file /tmp/form.log").unwrap(),
            Some(Command::Log(LogCommand::File(PathBuf::from("/tmp/form.log"))))
        );
    }

    #[test]
    fn unknown_verb() {
        assert_eq!(
            parse_command("fly away"),
            Err(CommandError::Unknown("fly".to_string()))
        );
    }
}
