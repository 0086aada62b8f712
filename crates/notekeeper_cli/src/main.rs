//! Command-line front end for the notes client.
//!
//! # Responsibility
//! - Parse arguments and load `notekeeper.toml`.
//! - Drive the core view controllers one command at a time.
//! - Print view messages; exit non-zero when the action failed.

use log::info;
use notekeeper_core::{
    default_log_level, init_logging, open_client, ClientConfig, ClientError, Dashboard, Echo,
    HttpNoteSync, LoginForm, MessageKind, NoteId, RegisterForm, Route, SyncState, ViewOutcome,
};
use std::path::PathBuf;
use std::process::ExitCode;

const USAGE: &str = "usage: notekeeper [--config <path>] <command>

commands:
  status                          show server reachability and session
  register <email> <password>     create an account
  login <email> <password>        log in and store the session
  logout                          clear the stored session
  list                            list your notes
  show <id>                       print one note
  add <title> <content>           create a note
  edit <id> <title> <content>     replace a note's title and content
  rm <id>                         delete a note
  help, -h, --help                print this help";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Help,
    Status,
    Register { email: String, password: String },
    Login { email: String, password: String },
    Logout,
    List,
    Show { id: String },
    Add { title: String, content: String },
    Edit { id: String, title: String, content: String },
    Remove { id: String },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Status => "status",
            Self::Register { .. } => "register",
            Self::Login { .. } => "login",
            Self::Logout => "logout",
            Self::List => "list",
            Self::Show { .. } => "show",
            Self::Add { .. } => "add",
            Self::Edit { .. } => "edit",
            Self::Remove { .. } => "rm",
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
struct Invocation {
    config_path: Option<PathBuf>,
    command: Command,
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let invocation = match parse_args(&args) {
        Ok(invocation) => invocation,
        Err(message) => {
            eprintln!("{message}\n\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    if invocation.command == Command::Help {
        println!("{USAGE}");
        return ExitCode::SUCCESS;
    }

    let result = run(invocation);
    log::logger().flush();
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn parse_args(args: &[String]) -> Result<Invocation, String> {
    let mut config_path = None;
    let mut rest = Vec::new();
    let mut help = false;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter
                    .next()
                    .ok_or_else(|| "--config needs a path".to_string())?;
                config_path = Some(PathBuf::from(path));
            }
            "-h" | "--help" => help = true,
            _ => rest.push(arg.as_str()),
        }
    }

    let command = match rest.as_slice() {
        _ if help => Command::Help,
        ["help"] => Command::Help,
        ["status"] => Command::Status,
        ["register", email, password] => Command::Register {
            email: email.to_string(),
            password: password.to_string(),
        },
        ["login", email, password] => Command::Login {
            email: email.to_string(),
            password: password.to_string(),
        },
        ["logout"] => Command::Logout,
        ["list"] => Command::List,
        ["show", id] => Command::Show { id: id.to_string() },
        ["add", title, content] => Command::Add {
            title: title.to_string(),
            content: content.to_string(),
        },
        ["edit", id, title, content] => Command::Edit {
            id: id.to_string(),
            title: title.to_string(),
            content: content.to_string(),
        },
        ["rm", id] => Command::Remove { id: id.to_string() },
        [] => return Err("missing command".to_string()),
        [name, ..] => return Err(format!("unknown command or wrong arguments: `{name}`")),
    };

    Ok(Invocation {
        config_path,
        command,
    })
}

fn run(invocation: Invocation) -> Result<(), String> {
    let config_path = invocation
        .config_path
        .unwrap_or_else(ClientConfig::default_path);
    let config = ClientConfig::load(&config_path).map_err(|err| err.to_string())?;
    let level = config
        .logging
        .level
        .clone()
        .unwrap_or_else(|| default_log_level().to_string());
    if let Err(err) = init_logging(&level, &config.log_dir(), Echo::StderrWarnings) {
        eprintln!("warning: file logging disabled: {err}");
    }

    info!(
        "event=cli_command module=cli status=start command={}",
        invocation.command.name()
    );
    let mut sync = open_client(&config).map_err(|err| err.to_string())?;
    execute(&mut sync, invocation.command)
}

fn execute(sync: &mut HttpNoteSync, command: Command) -> Result<(), String> {
    match command {
        Command::Help => Ok(()),
        Command::Status => status(sync),
        Command::Register { email, password } => {
            let mut form = RegisterForm::new();
            form.email = email;
            form.password = password;
            let outcome = form.submit(sync);
            print_message(form.message().map(|m| (m.kind, m.text.as_str())))?;
            follow(outcome)
        }
        Command::Login { email, password } => {
            let mut form = LoginForm::new();
            form.email = email;
            form.password = password;
            let outcome = form.submit(sync);
            print_message(form.message().map(|m| (m.kind, m.text.as_str())))?;
            follow(outcome)?;
            sync_banner(sync.state())?;
            print_notes(sync);
            Ok(())
        }
        Command::Logout => {
            let mut dashboard = Dashboard::new();
            let outcome = dashboard.logout(sync);
            println!("Logged out.");
            follow(outcome)
        }
        Command::List => {
            open_dashboard(sync)?;
            print_notes(sync);
            Ok(())
        }
        Command::Show { id } => {
            open_dashboard(sync)?;
            match sync.gateway_mut().get_note(&NoteId::new(id)) {
                Ok(note) => {
                    println!("{}  {}", note.id, note.title);
                    println!("updated {}", note.updated_at.to_rfc3339());
                    println!();
                    println!("{}", note.content);
                    Ok(())
                }
                Err(ClientError::AuthInvalid) => follow(ViewOutcome::session_expired()),
                Err(err) => Err(err.to_string()),
            }
        }
        Command::Add { title, content } => {
            let mut dashboard = open_dashboard(sync)?;
            dashboard.open_editor();
            dashboard.draft_mut().title = title;
            dashboard.draft_mut().content = content;
            settle(&mut dashboard, sync, Dashboard::submit)?;
            println!("Note saved.");
            print_notes(sync);
            Ok(())
        }
        Command::Edit { id, title, content } => {
            let mut dashboard = open_dashboard(sync)?;
            let id = NoteId::new(id);
            match sync.notes().iter().find(|note| note.id == id) {
                Some(note) => dashboard.start_edit(note),
                None => return Err(format!("no note with id `{id}`")),
            }
            dashboard.draft_mut().title = title;
            dashboard.draft_mut().content = content;
            settle(&mut dashboard, sync, Dashboard::submit)?;
            println!("Note saved.");
            print_notes(sync);
            Ok(())
        }
        Command::Remove { id } => {
            let mut dashboard = open_dashboard(sync)?;
            let id = NoteId::new(id);
            settle(&mut dashboard, sync, |dashboard, sync| {
                dashboard.delete(sync, &id)
            })?;
            println!("Note deleted.");
            print_notes(sync);
            Ok(())
        }
    }
}

fn status(sync: &HttpNoteSync) -> Result<(), String> {
    match sync.gateway().ping() {
        Ok(message) => println!("server: {message}"),
        Err(err) => println!("server: unreachable ({err})"),
    }
    match sync.session().user_id() {
        Some(user_id) => println!("session: logged in as {user_id}"),
        None => println!("session: logged out"),
    }
    Ok(())
}

/// Loads the dashboard, failing when the guard sends the user to login.
fn open_dashboard(sync: &mut HttpNoteSync) -> Result<Dashboard, String> {
    let mut dashboard = Dashboard::new();
    let outcome = dashboard.load(sync);
    if let ViewOutcome::Redirect {
        route: Route::Login,
        notice: None,
        ..
    } = outcome
    {
        return Err("Not logged in. Run `notekeeper login <email> <password>`.".to_string());
    }
    follow(outcome)?;
    if let Some(banner) = dashboard.banner() {
        return Err(banner.to_string());
    }
    Ok(dashboard)
}

/// Runs one dashboard action and turns its banner or redirect into an error.
fn settle<F>(dashboard: &mut Dashboard, sync: &mut HttpNoteSync, action: F) -> Result<(), String>
where
    F: FnOnce(&mut Dashboard, &mut HttpNoteSync) -> ViewOutcome,
{
    let outcome = action(dashboard, sync);
    follow(outcome)?;
    match dashboard.banner() {
        Some(banner) => Err(banner.to_string()),
        None => Ok(()),
    }
}

/// Fails with the sync error so an empty list is never shown for a failed fetch.
fn sync_banner(state: &SyncState) -> Result<(), String> {
    match state {
        SyncState::Error(message) => Err(message.clone()),
        SyncState::Idle | SyncState::Loading => Ok(()),
    }
}

fn follow(outcome: ViewOutcome) -> Result<(), String> {
    match outcome {
        ViewOutcome::Stay => Ok(()),
        ViewOutcome::Redirect {
            notice: Some(notice),
            ..
        } => Err(notice),
        ViewOutcome::Redirect { route, .. } => {
            info!(
                "event=cli_redirect module=cli status=ok route={}",
                route.path()
            );
            Ok(())
        }
    }
}

fn print_message(message: Option<(MessageKind, &str)>) -> Result<(), String> {
    match message {
        Some((MessageKind::Success, text)) => {
            println!("{text}");
            Ok(())
        }
        Some((MessageKind::Error, text)) => Err(text.to_string()),
        None => Ok(()),
    }
}

fn print_notes(sync: &HttpNoteSync) {
    if sync.notes().is_empty() {
        println!("{}", notekeeper_core::view::dashboard::EMPTY_LIST_MESSAGE);
        return;
    }
    for note in sync.notes() {
        println!(
            "{}  {}  ({})",
            note.id,
            note.title,
            note.updated_at.format("%Y-%m-%d %H:%M")
        );
    }
}
