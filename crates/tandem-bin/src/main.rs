//! Tandem entrypoint: open a plain-text file, attach views, replay a session
//! script against the shared document and write the result.
use anyhow::{Context, Result, bail};
use clap::Parser;
use core_config::{HistoryConfig, load_from};
use core_model::{Document, EditRequest, HistoryOptions, SharedDocument, ViewId, ViewObserver};
use script::{Action, Op, Step};
use std::cell::Cell;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Once;
use tracing::{debug, error, info, trace, warn};
use tracing_appender::non_blocking::WorkerGuard;

mod script;

const LOG_FILE: &str = "tandem.log";

#[derive(Parser, Debug)]
#[command(name = "tandem", version, about = "Multi-view plain-text document engine")]
struct Args {
    /// File to open (UTF-8 text). A missing file starts empty; an unreadable one is an error.
    pub path: Option<PathBuf>,
    /// Configuration file path (overrides discovery of `tandem.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Session script to replay; one view gesture per line.
    #[arg(long = "script")]
    pub script: Option<PathBuf>,
    /// Number of views attached before the script runs.
    #[arg(long = "views", default_value_t = 1)]
    pub views: usize,
    /// Write the resulting content here instead of stdout.
    #[arg(long = "output", conflicts_with = "write")]
    pub output: Option<PathBuf>,
    /// Write the resulting content back to PATH.
    #[arg(long = "write", requires = "path")]
    pub write: bool,
}

struct AppStartup {
    log_guard: Option<WorkerGuard>,
}

impl AppStartup {
    fn new() -> Self {
        Self { log_guard: None }
    }

    fn configure_logging(&mut self) -> Result<()> {
        let log_dir = Path::new(".");
        let log_path = log_dir.join(LOG_FILE);
        if log_path.exists() {
            let _ = std::fs::remove_file(&log_path);
        }

        let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
        let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
        match tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_ansi(false)
            .with_writer(nb_writer)
            .try_init()
        {
            Ok(_) => {
                self.log_guard = Some(guard);
            }
            Err(_err) => {
                // Global tracing subscriber already installed; drop guard so writer shuts down.
            }
        }

        Ok(())
    }

    fn install_panic_hook() {
        static HOOK: Once = Once::new();
        HOOK.call_once(|| {
            let default_panic = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| {
                tracing::error!(target: "runtime.panic", ?info, "panic");
                default_panic(info);
            }));
        });
    }
}

fn history_options(cfg: &HistoryConfig) -> HistoryOptions {
    HistoryOptions {
        group_edits: cfg.group_edits,
        max_depth: cfg.max_depth,
    }
}

/// A missing PATH starts an empty document that `--write` will create. Any
/// other read failure (not UTF-8, permissions) aborts so the file is never
/// overwritten with content it did not come from.
fn load_document(path: Option<&Path>, options: HistoryOptions) -> Result<Document> {
    let Some(path) = path else {
        return Ok(Document::load_with_options("untitled", "", options));
    };
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("file");
    match std::fs::read_to_string(path) {
        Ok(content) => {
            debug!(target: "io", file = %path.display(), size_bytes = content.len(), "file_read_ok");
            Ok(Document::load_with_options(name, &content, options))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!(target: "io", file = %path.display(), "file_not_found_new_document");
            Ok(Document::load_with_options(name, "", options))
        }
        Err(e) => {
            error!(target: "io", file = %path.display(), ?e, "file_open_error");
            Err(e).with_context(|| format!("reading {}", path.display()))
        }
    }
}

/// Observer standing in for a rendering surface: records how often its view
/// was told to re-render.
struct ViewLog {
    index: usize,
    notified: Cell<usize>,
}

impl ViewObserver for ViewLog {
    fn content_changed(&self, view: ViewId, doc: &Document) {
        self.notified.set(self.notified.get() + 1);
        let cursor = doc.view(view).map(|v| v.cursor);
        trace!(target: "script", %view, index = self.index, chars = doc.len_chars(), ?cursor, "content_changed");
    }
}

struct Session {
    doc: SharedDocument,
    views: Vec<ViewId>,
    logs: Vec<Rc<ViewLog>>,
}

impl Session {
    fn new(doc: Document) -> Self {
        Self {
            doc: SharedDocument::new(doc),
            views: Vec::new(),
            logs: Vec::new(),
        }
    }

    fn attach(&mut self) -> ViewId {
        let log = Rc::new(ViewLog {
            index: self.views.len(),
            notified: Cell::new(0),
        });
        let weak: std::rc::Weak<ViewLog> = Rc::downgrade(&log);
        let id = self.doc.attach(weak);
        self.views.push(id);
        self.logs.push(log);
        id
    }

    fn view(&self, index: usize) -> Result<ViewId> {
        match self.views.get(index) {
            Some(id) => Ok(*id),
            None => bail!("no view with index {index} ({} attached so far)", self.views.len()),
        }
    }

    fn replay(&mut self, steps: &[Step]) -> Result<()> {
        for step in steps {
            self.step(step)
                .with_context(|| format!("script line {}", step.line))?;
        }
        Ok(())
    }

    fn step(&mut self, step: &Step) -> Result<()> {
        let (index, op) = match &step.action {
            Action::Attach => {
                let id = self.attach();
                debug!(target: "script", line = step.line, view = %id, "attach");
                return Ok(());
            }
            Action::View { index, op } => (*index, op),
        };
        let view = self.view(index)?;
        trace!(target: "script", line = step.line, %view, ?op, "step");
        match op {
            Op::Detach => {
                let outcome = self.doc.detach(view)?;
                if outcome.last_view_closed {
                    info!(target: "script", line = step.line, "last_view_closed");
                }
            }
            Op::Insert { offset, text } => {
                self.doc.apply(view, EditRequest::insert(text.as_str(), *offset))?;
            }
            Op::Delete { start, end } => {
                self.doc.apply(view, EditRequest::delete(*start, *end))?;
            }
            Op::Type(text) => {
                self.doc.type_text(view, text)?;
            }
            Op::Backspace => {
                self.doc.backspace(view)?;
            }
            Op::DeleteForward => {
                self.doc.delete_forward(view)?;
            }
            Op::Move(m) => {
                self.doc.with_mut(|d| d.move_cursor(view, *m))?;
            }
            Op::Click(offset) => {
                self.doc.with_mut(|d| d.click(view, *offset))?;
            }
            Op::Extend(offset) => {
                self.doc.with_mut(|d| d.extend_to(view, *offset))?;
            }
            Op::Select { anchor, head } => {
                self.doc.with_mut(|d| d.select(view, *anchor, *head))?;
            }
            Op::Undo => {
                if self.doc.undo(view)?.is_none() {
                    debug!(target: "script", line = step.line, %view, "undo_empty");
                }
            }
            Op::Redo => {
                if self.doc.redo(view)?.is_none() {
                    debug!(target: "script", line = step.line, %view, "redo_empty");
                }
            }
        }
        Ok(())
    }
}

fn run(args: &Args) -> Result<()> {
    let config = load_from(args.config.clone())?;
    let options = history_options(&config.file.history);
    let doc = load_document(args.path.as_deref(), options)?;
    info!(
        target: "runtime.startup",
        buffer = doc.name(),
        chars = doc.len_chars(),
        line_ending = ?doc.original_line_ending(),
        config_override = args.config.is_some(),
        group_edits = options.group_edits,
        "bootstrap_complete"
    );

    let mut session = Session::new(doc);
    for _ in 0..args.views {
        session.attach();
    }

    if let Some(script_path) = &args.script {
        let source = std::fs::read_to_string(script_path)
            .with_context(|| format!("reading script {}", script_path.display()))?;
        let steps = script::parse(&source)?;
        info!(target: "script", steps = steps.len(), path = %script_path.display(), "replay_start");
        session.replay(&steps)?;
    }

    for log in &session.logs {
        debug!(target: "runtime", index = log.index, notified = log.notified.get(), "view_summary");
    }
    let (content, undo_depth, redo_depth) = session.doc.with_mut(|d| {
        (
            d.save(),
            d.history().undo_depth(),
            d.history().redo_depth(),
        )
    });
    info!(target: "runtime", chars = content.chars().count(), undo_depth, redo_depth, "session_complete");

    let target = match (&args.output, args.write) {
        (Some(out), _) => Some(out.as_path()),
        (None, true) => args.path.as_deref(),
        (None, false) => None,
    };
    match target {
        Some(path) => {
            std::fs::write(path, content.as_bytes())
                .with_context(|| format!("writing {}", path.display()))?;
            debug!(target: "io", file = %path.display(), size_bytes = content.len(), "file_write_ok");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut startup = AppStartup::new();
    startup.configure_logging()?;
    AppStartup::install_panic_hook();
    info!(target: "runtime", "startup");

    let result = run(&args);
    match &result {
        Ok(()) => info!(target: "runtime", "shutdown"),
        Err(e) => error!(target: "runtime", error = %format!("{e:#}"), "session_failed"),
    }
    drop(startup.log_guard.take());
    result
}
