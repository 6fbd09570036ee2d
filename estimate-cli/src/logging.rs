//! Layered `tracing` setup for the console front-end.
//!
//! One global, reloadable level filter sits above two layers: stdout (with
//! its own on/off gate) and a file layer that discards records until
//! [`enable_file_logging`] points it at a file.

use std::{
    fs::File,
    io::{self, IsTerminal, Write},
    path::Path,
    sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError},
};

use anyhow::{Context, Result, anyhow};
use chrono::Local;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{
        FmtContext, MakeWriter,
        format::{FormatEvent, FormatFields, Writer},
    },
    layer::SubscriberExt,
    registry::LookupSpan,
    reload,
    util::SubscriberInitExt,
};

/// `HH:MM:SS.mmm LEVEL crate/file.rs:line message fields`
struct ConsoleFmt;

impl<S, N> FormatEvent<S, N> for ConsoleFmt
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();
        let ansi = writer.has_ansi_escapes();
        let stamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");

        if ansi {
            let colour = match *meta.level() {
                Level::ERROR => "1;31",
                Level::WARN => "1;33",
                Level::INFO => "1;32",
                Level::DEBUG => "1;34",
                Level::TRACE => "1;35",
            };
            write!(writer, "\x1b[2m{stamp}\x1b[0m \x1b[{colour}m{:>5}\x1b[0m ", meta.level())?;
        } else {
            write!(writer, "{stamp} {:>5} ", meta.level())?;
        }

        if let (Some(file), Some(line)) = (meta.file().map(short_path), meta.line()) {
            if ansi {
                write!(writer, "\x1b[36m{file}:{line}\x1b[0m ")?;
            } else {
                write!(writer, "{file}:{line} ")?;
            }
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// `estimate-core/src/controller/form.rs` -> `estimate-core/controller/form.rs`
fn short_path(file: &str) -> String {
    file.replacen("/src/", "/", 1)
        .trim_start_matches("src/")
        .to_string()
}

type FileHandle = Arc<Mutex<Option<File>>>;

/// A `MakeWriter` whose target file can be swapped at runtime. With no file
/// set every write is accepted and dropped.
#[derive(Clone)]
struct FileSlot(FileHandle);

struct SlotWriter<'a>(MutexGuard<'a, Option<File>>);

impl Write for SlotWriter<'_> {
    fn write(
        &mut self,
        buf: &[u8],
    ) -> io::Result<usize> {
        match self.0.as_mut() {
            Some(file) => file.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.as_mut().map_or(Ok(()), Write::flush)
    }
}

impl<'a> MakeWriter<'a> for FileSlot {
    type Writer = SlotWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        SlotWriter(self.0.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

type ReloadFn = Box<dyn Fn(EnvFilter) -> Result<()> + Send + Sync>;

/// Runtime controls captured when the subscriber is installed.
struct Controls {
    level: ReloadFn,
    stdout: ReloadFn,
    file: FileHandle,
}

static CONTROLS: OnceLock<Controls> = OnceLock::new();
static APP_NAME: OnceLock<String> = OnceLock::new();

fn controls() -> Result<&'static Controls> {
    CONTROLS
        .get()
        .ok_or_else(|| anyhow!("logging not yet initialized"))
}

fn parse_filter(directive: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(directive.to_lowercase())
        .with_context(|| format!("invalid log level '{directive}'"))
}

/// Installs the global subscriber. Call once, before the first record.
///
/// `RUST_LOG` takes precedence over `level` when it is set and valid. A
/// second call leaves the first subscriber in place.
pub fn init_logging(
    level: &str,
    stdout: bool,
) -> Result<()> {
    let _ = app_name();

    let global = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => parse_filter(level)?,
    };
    let (level_layer, level_handle) = reload::Layer::new(global);
    let (stdout_gate, stdout_handle) = reload::Layer::new(gate(stdout));

    let file: FileHandle = Arc::new(Mutex::new(None));

    let stdout_layer = tracing_subscriber::fmt::layer()
        .event_format(ConsoleFmt)
        .with_ansi(io::stdout().is_terminal())
        .with_filter(stdout_gate);
    let file_layer = tracing_subscriber::fmt::layer()
        .event_format(ConsoleFmt)
        .with_ansi(false)
        .with_writer(FileSlot(Arc::clone(&file)));

    if tracing_subscriber::registry()
        .with(level_layer)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .is_err()
    {
        return Ok(());
    }

    let _ = CONTROLS.set(Controls {
        level: Box::new(move |filter: EnvFilter| {
            level_handle
                .reload(filter)
                .map_err(|e| anyhow!("filter reload failed: {e}"))
        }),
        stdout: Box::new(move |filter: EnvFilter| {
            stdout_handle
                .reload(filter)
                .map_err(|e| anyhow!("stdout reload failed: {e}"))
        }),
        file,
    });
    Ok(())
}

/// Per-layer gate below the global level filter.
fn gate(enabled: bool) -> EnvFilter {
    EnvFilter::new(if enabled { "trace" } else { "off" })
}

/// Replaces the global filter. Accepts a bare level (`debug`) or any
/// `EnvFilter` directive (`info,estimate_core=trace`).
pub fn set_log_level(level: &str) -> Result<()> {
    let filter = parse_filter(level)?;
    (controls()?.level)(filter)
}

/// Shows or hides log records on stdout; file logging is unaffected.
pub fn set_stdout_enabled(enabled: bool) -> Result<()> {
    (controls()?.stdout)(gate(enabled))
}

/// Appends log records to `path`, replacing any file already in use. The
/// parent directory must exist.
pub fn enable_file_logging(path: &Path) -> Result<()> {
    let file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file '{}'", path.display()))?;

    let slot = &controls()?.file;
    *slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(file);
    Ok(())
}

pub fn disable_file_logging() {
    if let Some(controls) = CONTROLS.get() {
        *controls.file.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// Executable stem, or `estimate-form` when it cannot be determined.
pub fn app_name() -> &'static str {
    APP_NAME.get_or_init(|| {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "estimate-form".to_string())
    })
}
