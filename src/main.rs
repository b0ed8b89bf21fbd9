// notebin shell - line-oriented adapter from stdin commands to session intents

use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

use notebin::clock::SystemClock;
use notebin::storage::{self, FileStore, MemoryStore};
use notebin::view::NoteList;
use notebin::{Intent, Notice, Outcome, Session, Settings, SortOrder};

const HELP: &str = "commands: new | delete | select <id> | pin <id> | title <text> | body <html> | \
search <text> | sort date-desc|date-asc|title-az | bin | back | restore <id> | purge <id> yes | \
theme | export | show | help | quit";

#[tokio::main]
async fn main() {
    let settings = storage::config_path()
        .map(|path| storage::load_settings(&path))
        .unwrap_or_default();
    notebin::init_logging(settings.level());

    let session = match open_session(&settings).await {
        Ok(session) => session,
        Err(e) => {
            error!(error = %e, "failed to open notes");
            std::process::exit(1);
        }
    };
    run(session).await;
}

async fn open_session(settings: &Settings) -> notebin::Result<Session> {
    let clock = Arc::new(SystemClock);
    match storage::data_path(settings) {
        Some(path) => {
            info!(path = %path.display(), "using file store");
            Session::open(Arc::new(FileStore::new(path)), settings.clone(), clock).await
        }
        None => {
            info!("no home directory, notes will not outlive this process");
            Session::open(Arc::new(MemoryStore::default()), settings.clone(), clock).await
        }
    }
}

async fn run(mut session: Session) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{HELP}");
    render(&session);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        error!(error = %e, "failed to read input");
                        break;
                    }
                };
                match parse(line.trim(), &session) {
                    Command::Quit => break,
                    Command::Help => println!("{HELP}"),
                    Command::Show => render(&session),
                    Command::Unknown => println!("unrecognised command; try `help`"),
                    Command::Intent(intent) => {
                        let outcome = session.dispatch(intent);
                        report(&outcome);
                        render(&session);
                    }
                }
            }
            Some(event) = session.next_event() => {
                if let Some(notice) = session.handle_event(event) {
                    print_notice(&notice);
                }
            }
        }
    }
    session.shutdown().await;
}

enum Command {
    Intent(Intent),
    Show,
    Help,
    Quit,
    Unknown,
}

fn parse(line: &str, session: &Session) -> Command {
    let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
    let id = || rest.trim().parse().ok();
    let current = || live_fields(session);

    let intent = match word {
        "new" => Intent::CreateNote,
        "delete" => Intent::DeleteCurrent,
        "select" => match id() {
            Some(id) => Intent::SelectNote(id),
            None => return Command::Unknown,
        },
        "pin" => match id() {
            Some(id) => Intent::TogglePin(id),
            None => return Command::Unknown,
        },
        "title" => match current() {
            Some((_, content)) => Intent::Edit { title: rest.to_string(), content },
            None => return Command::Unknown,
        },
        "body" => match current() {
            Some((title, _)) => Intent::Edit { title, content: rest.to_string() },
            None => return Command::Unknown,
        },
        "search" => Intent::Search(rest.to_string()),
        "sort" => Intent::SetSortOrder(SortOrder::parse(rest.trim())),
        "bin" => Intent::OpenRecycleBin,
        "back" => Intent::ShowEditor,
        "restore" => match id() {
            Some(id) => Intent::Restore(id),
            None => return Command::Unknown,
        },
        "purge" => {
            let mut args = rest.split_whitespace();
            match args.next().and_then(|id| id.parse().ok()) {
                Some(id) => {
                    let confirmed = args.next().is_some_and(|a| a.eq_ignore_ascii_case("yes"));
                    if !confirmed {
                        println!("This cannot be undone. Repeat as `purge {id} yes` to confirm.");
                    }
                    Intent::Purge { id, confirmed }
                }
                None => return Command::Unknown,
            }
        }
        "theme" => Intent::CycleTheme,
        "export" => Intent::Export,
        "show" => return Command::Show,
        "help" => return Command::Help,
        "quit" | "exit" => return Command::Quit,
        _ => return Command::Unknown,
    };
    Command::Intent(intent)
}

/// Title and content as the editor currently holds them: an unsaved edit to the
/// selected note wins over what the store has
fn live_fields(session: &Session) -> Option<(String, String)> {
    let note = session.store().current_note()?;
    match session.autosave().pending() {
        Some(edit) if edit.note_id == note.id => Some((edit.title.clone(), edit.content.clone())),
        _ => Some((note.title.clone(), note.content.clone())),
    }
}

fn report(outcome: &Outcome) {
    if let Some(notice) = &outcome.notice {
        print_notice(notice);
    }
    if let Some(counters) = outcome.counters {
        println!("Words: {}  Characters: {}", counters.words, counters.characters);
    }
    if let Some(file) = &outcome.export {
        let dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        match file.save_to(&dir) {
            Ok(path) => println!("wrote {}", path.display()),
            Err(e) => error!(error = %e, "failed to write export"),
        }
    }
}

fn print_notice(notice: &Notice) {
    println!("[{:?}] {}", notice.level, notice.message);
}

fn render(session: &Session) {
    let frame = session.frame();
    println!(
        "-- {:?} | theme {} | sort {} | bin ({}) --",
        frame.view,
        frame.theme.as_str(),
        frame.sort_order.as_str(),
        frame.deleted_count
    );
    match &frame.list {
        NoteList::Items(items) => {
            for item in items {
                let marker = if item.active { '>' } else { ' ' };
                let pin = if item.pinned { "*" } else { " " };
                println!("{marker}{pin} {:>14}  {}", item.id, item.title);
            }
        }
        NoteList::NoMatches => println!("   No matches found."),
        NoteList::Empty => println!("   (no notes)"),
    }
    if let Some(bin) = &frame.recycle_bin {
        if bin.is_empty() {
            println!("   The Recycle Bin is empty.");
        }
        for item in bin {
            println!("   [deleted] {:>14}  {}", item.id, item.title);
        }
    }
    if let Some(editor) = &frame.editor {
        println!("   editing {}: {:?}  ({})", editor.note_id, editor.title, editor.last_saved);
    }
}
