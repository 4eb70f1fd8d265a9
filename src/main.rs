mod events;

use clap::Parser;
use fltk::{app, dialog, enums, prelude::*, window::DoubleWindow};
use hexview::canvas::Canvas;
use hexview::command::Command;
use hexview::disassembly::X86Disassembler;
use hexview::fltk_surface::FltkSurface;
use hexview::options::{self, AppOptions, OptionsStore};
use hexview::options_dialog::{DIALOG_HEIGHT, DIALOG_WIDTH, DialogOutcome, OptionsDialog};
use hexview::source::{ByteSource, HexDocument};
use hexview::viewer::HexViewer;
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::SystemTime;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const RELOAD_INTERVAL: f64 = 1.0;
const LOAD_POLL_INTERVAL: f64 = 0.05;

#[derive(Parser, Debug)]
#[command(name = "hexview")]
#[command(about = "A hex viewer with a custom-drawn interface", long_about = None)]
struct Args {
    /// File to open
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Bytes shown per line (8 or 16); not saved to the options file
    #[arg(short, long, value_parser = clap::builder::PossibleValuesParser::new(["8", "16"]))]
    bytes_per_line: Option<String>,

    /// Use the light theme for this session
    #[arg(long, conflicts_with = "dark")]
    light: bool,

    /// Use the dark theme for this session
    #[arg(long)]
    dark: bool,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn window_title(document: &HexDocument) -> String {
    let name = document.file_name().unwrap_or_else(|| "untitled".to_string());
    let marker = if document.is_modified() { "*" } else { "" };
    format!("{}{} ({} bytes) - hexview", name, marker, document.len())
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

fn persist(store: &mut OptionsStore, current: &AppOptions) {
    match store.commit(current) {
        Ok(true) => info!("options saved"),
        Ok(false) => {}
        Err(err) => warn!("{}", err),
    }
}

/// Run the options dialog modally. Returns the accepted options.
fn run_options_dialog(current: &AppOptions) -> Option<AppOptions> {
    let mut win = DoubleWindow::default()
        .with_size(DIALOG_WIDTH, DIALOG_HEIGHT)
        .with_label("Options");
    win.end();
    win.make_modal(true);
    win.show();

    let dialog = Rc::new(RefCell::new(OptionsDialog::new(current)));
    let outcome = Rc::new(RefCell::new(DialogOutcome::Continue));
    let canvas = Rc::new(RefCell::new(Canvas::new(FltkSurface::new(&win))));

    win.draw({
        let dialog = dialog.clone();
        let canvas = canvas.clone();
        move |w| {
            let mut canvas = canvas.borrow_mut();
            if !canvas.is_initialized() && !canvas.initialize(w.w(), w.h()) {
                return;
            }
            canvas.resize(w.w(), w.h());
            if canvas.begin_frame() {
                let dialog = dialog.borrow();
                let theme = hexview::theme::Theme::for_mode(dialog.options().dark_mode);
                dialog.draw(&mut canvas, &theme);
                canvas.end_frame();
            }
        }
    });

    win.handle({
        let dialog = dialog.clone();
        let outcome = outcome.clone();
        move |w, ev| {
            if matches!(ev, enums::Event::Focus | enums::Event::Enter) {
                return true;
            }
            let Some(input) = events::translate(ev) else {
                return false;
            };
            let result = dialog.borrow_mut().handle_event(&input);
            if result != DialogOutcome::Continue {
                *outcome.borrow_mut() = result;
                w.hide();
            }
            w.redraw();
            true
        }
    });

    // closing the window cancels
    win.set_callback(|w| w.hide());

    while win.shown() {
        app::wait();
    }

    match outcome.replace(DialogOutcome::Continue) {
        DialogOutcome::Accepted(options) => Some(options.normalized()),
        _ => None,
    }
}

fn open_file(viewer: &Rc<RefCell<HexViewer>>, wind: &mut DoubleWindow) {
    let mut chooser = dialog::NativeFileChooser::new(dialog::NativeFileChooserType::BrowseFile);
    chooser.set_title("Open file");
    chooser.show();
    let path = chooser.filename();
    if path.as_os_str().is_empty() {
        return;
    }
    let mut job = HexDocument::load_in_background(path, app::awake);
    let viewer = viewer.clone();
    let mut wind = wind.clone();
    app::add_timeout3(LOAD_POLL_INTERVAL, move |handle| match job.try_take() {
        Some(Ok(document)) => {
            wind.set_label(&window_title(&document));
            viewer.borrow_mut().set_document(document);
            wind.redraw();
        }
        Some(Err(err)) => dialog::alert_default(&err.to_string()),
        None if job.is_pending() => app::repeat_timeout3(LOAD_POLL_INTERVAL, handle),
        None => {}
    });
}

fn handle_command(
    command: Command,
    viewer: &Rc<RefCell<HexViewer>>,
    wind: &mut DoubleWindow,
    store: &mut OptionsStore,
) {
    match command {
        Command::OpenFile => open_file(viewer, wind),
        Command::Save => {
            let mut viewer = viewer.borrow_mut();
            if let Err(err) = viewer.document_mut().save() {
                dialog::alert_default(&err.to_string());
            }
            wind.set_label(&window_title(viewer.document()));
        }
        Command::Exit => app::quit(),
        Command::CopyOffset => {
            let text = viewer.borrow().copy_offset_text();
            app::copy(&text);
        }
        Command::CopyHex => {
            let text = viewer.borrow().copy_hex_text();
            app::copy(&text);
        }
        Command::ToggleDarkMode | Command::SetBytesPerLine(_) => {
            let current = viewer.borrow().options().clone();
            persist(store, &current);
        }
        Command::ShowOptions => {
            let current = viewer.borrow().options().clone();
            if let Some(accepted) = run_options_dialog(&current) {
                persist(store, &accepted);
                viewer.borrow_mut().set_options(accepted);
            }
        }
        Command::About => {
            dialog::message_title("About hexview");
            dialog::message_default(&format!(
                "hexview {}\n{}",
                env!("CARGO_PKG_VERSION"),
                env!("CARGO_PKG_DESCRIPTION")
            ));
        }
        // applied by the viewer itself
        Command::SelectAll | Command::GoToStart | Command::GoToEnd => {}
    }
}

/// Reload the open file when it changes on disk, unless it has unsaved edits.
fn watch_file(viewer: Rc<RefCell<HexViewer>>, mut wind: DoubleWindow) {
    let mut seen: Option<(PathBuf, Option<SystemTime>)> = None;
    app::add_timeout3(RELOAD_INTERVAL, move |handle| {
        {
            let mut viewer = viewer.borrow_mut();
            let path = viewer.document().path().map(Path::to_path_buf);
            if let Some(path) = path {
                let mtime = modified_time(&path);
                if let Some((seen_path, seen_time)) = &seen
                    && *seen_path == path
                    && *seen_time != mtime
                    && viewer.options().auto_reload
                    && !viewer.document().is_modified()
                {
                    match viewer.reload() {
                        Ok(()) => {
                            info!("reloaded {}", path.display());
                            wind.set_label(&window_title(viewer.document()));
                            wind.redraw();
                        }
                        Err(err) => warn!("{}", err),
                    }
                }
                seen = Some((path, mtime));
            }
        }
        app::repeat_timeout3(RELOAD_INTERVAL, handle);
    });
}

fn main() {
    let args = Args::parse();
    init_logging();

    let store = OptionsStore::load(options::options_file_path());
    let mut options = store.saved().clone();
    if let Some(bpl) = args.bytes_per_line.as_deref().and_then(|v| v.parse().ok()) {
        options.bytes_per_line = bpl;
    }
    if args.light {
        options.dark_mode = false;
    } else if args.dark {
        options.dark_mode = true;
    }
    let mut store = store.with_session(options.clone());

    let document = match &args.file {
        Some(path) => match HexDocument::load(path) {
            Ok(document) => document,
            Err(err) => {
                eprintln!("Error: {}", err);
                std::process::exit(1);
            }
        },
        None => HexDocument::new(),
    };

    let app = app::App::default();
    let mut wind = DoubleWindow::default()
        .with_size(1000, 640)
        .with_label(&window_title(&document));
    wind.end();
    wind.make_resizable(true);
    wind.show();

    let viewer = Rc::new(RefCell::new(
        HexViewer::new(document, options).with_disassembler(Box::new(X86Disassembler::new())),
    ));
    let canvas = Rc::new(RefCell::new(Canvas::new(FltkSurface::new(&wind))));
    let (sender, receiver) = app::channel::<Command>();

    wind.draw({
        let viewer = viewer.clone();
        let canvas = canvas.clone();
        move |w| {
            let mut canvas = canvas.borrow_mut();
            if !canvas.is_initialized() && !canvas.initialize(w.w(), w.h()) {
                return;
            }
            // same-size resizes are no-ops
            canvas.resize(w.w(), w.h());
            viewer.borrow_mut().render(&mut canvas);
        }
    });

    wind.handle({
        let viewer = viewer.clone();
        move |w, ev| {
            if matches!(ev, enums::Event::Focus | enums::Event::Enter) {
                return true;
            }
            if ev == enums::Event::Unfocus {
                viewer.borrow_mut().close_overlays();
                w.redraw();
                return true;
            }
            let Some(input) = events::translate(ev) else {
                return false;
            };
            let commands = {
                let mut viewer = viewer.borrow_mut();
                let commands = viewer.handle_event(&input);
                w.set_label(&window_title(viewer.document()));
                commands
            };
            for command in commands {
                sender.send(command);
            }
            w.redraw();
            true
        }
    });

    // closing the window quits
    wind.set_callback(|_| {
        if app::event() == enums::Event::Close {
            app::quit();
        }
    });

    watch_file(viewer.clone(), wind.clone());

    while app.wait() {
        if let Some(command) = receiver.recv() {
            handle_command(command, &viewer, &mut wind, &mut store);
            wind.redraw();
        }
    }
}
