//! Non-interactive runner: the same workflows as the TUI, one per invocation.

use anyhow::{bail, Result};
use std::path::PathBuf;

use rollcall::api::{ApiClient, AttendanceApi};
use rollcall::config::Config;
use rollcall::dashboard::UploadController;
use rollcall::export::{self, ExportFormat};
use rollcall::history::HistoryController;
use rollcall::logging;
use rollcall::models::AttendanceSession;
use rollcall::roster::{Feedback, RosterController};
use rollcall::ui::attendance_table::{self, TableView, HEADERS};

#[derive(Debug, PartialEq)]
enum Command {
    Ping,
    Mark { image: PathBuf, export: Option<PathBuf> },
    RosterList,
    RosterAdd { name: String, student_id: String, photo: PathBuf },
    RosterDelete { id: i64 },
    SessionsList,
    SessionsShow { id: i64 },
}

#[derive(Debug, PartialEq)]
struct CliArgs {
    config_path: Option<PathBuf>,
    api_url: Option<String>,
    command: Command,
}

enum Parsed {
    Run(CliArgs),
    Help,
    Version,
}

fn parse_args(args: &[String]) -> Result<Parsed, String> {
    let mut config_path = None;
    let mut api_url = None;
    let mut positional = Vec::new();
    let mut export_path = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => return Ok(Parsed::Help),
            "--version" | "-V" => return Ok(Parsed::Version),
            "--config" | "-c" => {
                let value = args.get(i + 1).ok_or("--config requires a path argument")?;
                config_path = Some(PathBuf::from(value));
                i += 1;
            }
            "--api-url" => {
                let value = args.get(i + 1).ok_or("--api-url requires a URL argument")?;
                api_url = Some(value.clone());
                i += 1;
            }
            "--export" | "-o" => {
                let value = args.get(i + 1).ok_or("--export requires a path argument")?;
                export_path = Some(PathBuf::from(value));
                i += 1;
            }
            flag if flag.starts_with('-') => return Err(format!("Unknown argument: {}", flag)),
            value => positional.push(value.to_string()),
        }
        i += 1;
    }

    let words: Vec<&str> = positional.iter().map(|s| s.as_str()).collect();
    let command = match words.as_slice() {
        ["ping"] => Command::Ping,
        ["mark", image] => Command::Mark {
            image: PathBuf::from(image),
            export: export_path.take(),
        },
        ["roster"] | ["roster", "list"] => Command::RosterList,
        ["roster", "add", name, student_id, photo] => Command::RosterAdd {
            name: name.to_string(),
            student_id: student_id.to_string(),
            photo: PathBuf::from(photo),
        },
        ["roster", "delete", id] => Command::RosterDelete { id: parse_id(id)? },
        ["sessions"] | ["sessions", "list"] => Command::SessionsList,
        ["sessions", "show", id] => Command::SessionsShow { id: parse_id(id)? },
        [] => return Err("No command given".to_string()),
        _ => return Err(format!("Unknown command: {}", positional.join(" "))),
    };

    if export_path.is_some() {
        return Err("--export only applies to the mark command".to_string());
    }

    Ok(Parsed::Run(CliArgs {
        config_path,
        api_url,
        command,
    }))
}

fn parse_id(value: &str) -> Result<i64, String> {
    value
        .parse()
        .map_err(|_| format!("Invalid id: {}", value))
}

fn print_help() {
    println!(
        r#"rollcall-cli - scriptable access to the attendance service

USAGE:
    rollcall-cli [OPTIONS] <COMMAND>

COMMANDS:
    ping                                   Check that the backend is reachable
    mark <IMAGE> [--export PATH]           Mark attendance from a classroom photo
    roster list                            List registered students
    roster add <NAME> <STUDENT_ID> <PHOTO> Register a student with a reference photo
    roster delete <ID>                     Remove a student by record id
    sessions list                          List past attendance sessions
    sessions show <ID>                     Show one session's report

OPTIONS:
    --config, -c PATH   Path to config file
    --api-url URL       Backend address (overrides [api] base_url)
    --export, -o PATH   Write the marked session to PATH (.csv or .json)
    --version, -V       Show version
    --help, -h          Show this help message

ENVIRONMENT:
    ROLLCALL_CONFIG     Path to config file (overrides default location)
    ROLLCALL_LOG        Log level (trace, debug, info, warn, error)"#
    );
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = match parse_args(&args) {
        Ok(Parsed::Run(cli)) => cli,
        Ok(Parsed::Help) => {
            print_help();
            return Ok(());
        }
        Ok(Parsed::Version) => {
            println!("rollcall-cli {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Err(message) => {
            eprintln!("Error: {}", message);
            print_help();
            std::process::exit(2);
        }
    };

    logging::init_stderr()?;

    let mut config = match cli.config_path {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(url) = cli.api_url {
        config.api.base_url = url;
    }

    let api = ApiClient::from_config(&config.api);
    run(cli.command, &api, &config)
}

fn run(command: Command, api: &dyn AttendanceApi, config: &Config) -> Result<()> {
    match command {
        Command::Ping => {
            let message = api.health()?;
            println!("{}", message);
        }
        Command::Mark { image, export } => mark(api, config, image, export)?,
        Command::RosterList => {
            let students = api.list_students()?;
            if students.is_empty() {
                println!("No students registered yet.");
            }
            for student in &students {
                println!("{:>5}  {:<12} {}", student.id, student.student_id, student.name);
            }
            println!("{} Students", students.len());
        }
        Command::RosterAdd { name, student_id, photo } => {
            let mut roster = RosterController::new();
            roster.form.name = name;
            roster.form.student_id = student_id;
            roster.form.photo = Some(photo);
            if !roster.form.is_complete() {
                bail!("Name, student ID and photo are all required");
            }

            roster.add_student(api);
            match roster.feedback() {
                Feedback::Success(msg) => println!("{}", msg),
                Feedback::Error(msg) => bail!("{}", msg),
                Feedback::Idle => bail!("Student was not submitted"),
            }
        }
        Command::RosterDelete { id } => {
            let mut roster = RosterController::new();
            if !roster.delete_student(api, id) {
                bail!("{}", roster.alert().unwrap_or("Failed to delete"));
            }
            println!("Deleted student {} ({} remaining)", id, roster.students().len());
        }
        Command::SessionsList => {
            let mut history = HistoryController::new();
            history.load_sessions(api);
            if let Some(err) = history.error() {
                bail!("{}", err);
            }
            if history.sessions().is_empty() {
                println!("No sessions yet.");
            }
            for session in history.sessions() {
                println!(
                    "#{:<5} {}  {}",
                    session.id,
                    session.created_at.format("%Y-%m-%d %H:%M"),
                    session.classroom_image_path
                );
            }
        }
        Command::SessionsShow { id } => {
            let mut history = HistoryController::new();
            history.open_session(api, id);
            if let Some(err) = history.error() {
                bail!("{}", err);
            }
            if let Some(session) = history.open_session_details() {
                println!("Session #{}  {}", session.id, session.created_at.format("%Y-%m-%d %H:%M:%S"));
                println!("Image: {}", session.classroom_image_path);
                if let Some(report) = session.ai_analysis_report.as_deref().filter(|r| !r.is_empty()) {
                    println!();
                    println!("\"{}\"", report);
                }
            }
        }
    }
    Ok(())
}

fn mark(api: &dyn AttendanceApi, config: &Config, image: PathBuf, export_path: Option<PathBuf>) -> Result<()> {
    if !config.upload.accepts(&image) {
        bail!("{} is not a supported image file", image.display());
    }

    let mut upload = UploadController::new();
    upload.select_file(image);
    if !upload.submit(api) {
        bail!("{}", upload.error().unwrap_or("Error: Upload failed"));
    }

    let Some(session) = upload.session() else {
        bail!("No session returned");
    };
    print_session(session, upload.analysis());

    if let Some(path) = export_path {
        let format = ExportFormat::from_path(&path).unwrap_or(config.export.default_format);
        let count = export::export_session(session, &path, format)?;
        println!("Exported {} records to {}", count, path.display());
    }
    Ok(())
}

fn print_session(session: &AttendanceSession, analysis: &str) {
    let mut summary = format!("Session #{}  {}", session.id, session.attendance_ratio());
    if let Some(badge) = session.unknown_faces_badge() {
        summary.push_str(&format!("  {}", badge));
    }
    println!("{}", summary);

    if !analysis.is_empty() {
        println!();
        println!("Classroom Vibe Analysis: \"{}\"", analysis);
    }
    println!();

    match attendance_table::table_view(session.records()) {
        TableView::Placeholder(text) => println!("{}", text),
        TableView::Rows(rows) => {
            println!("{:<28} {:<12} {}", HEADERS[0], HEADERS[1], HEADERS[2]);
            for row in rows {
                println!("{:<28} {:<12} {}", row.name, row.external_id, row.status);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(String::from).collect()
    }

    fn command(line: &str) -> Command {
        match parse_args(&args(line)) {
            Ok(Parsed::Run(cli)) => cli.command,
            Ok(_) => panic!("expected a command for {:?}", line),
            Err(e) => panic!("parse failed for {:?}: {}", line, e),
        }
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(command("ping"), Command::Ping);
        assert_eq!(command("roster"), Command::RosterList);
        assert_eq!(command("roster delete 7"), Command::RosterDelete { id: 7 });
        assert_eq!(command("sessions show 3"), Command::SessionsShow { id: 3 });
        assert_eq!(
            command("mark class.jpg --export out.json"),
            Command::Mark {
                image: PathBuf::from("class.jpg"),
                export: Some(PathBuf::from("out.json")),
            }
        );
        assert_eq!(
            command("roster add Ada S001 ada.png"),
            Command::RosterAdd {
                name: "Ada".to_string(),
                student_id: "S001".to_string(),
                photo: PathBuf::from("ada.png"),
            }
        );
    }

    #[test]
    fn test_global_options() {
        let Ok(Parsed::Run(cli)) = parse_args(&args("--api-url http://10.0.0.2:8000 -c rc.toml ping")) else {
            panic!("expected a command");
        };
        assert_eq!(cli.api_url.as_deref(), Some("http://10.0.0.2:8000"));
        assert_eq!(cli.config_path, Some(PathBuf::from("rc.toml")));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_args(&args("")).is_err());
        assert!(parse_args(&args("roster delete seven")).is_err());
        assert!(parse_args(&args("ping --export x.csv")).is_err());
        assert!(parse_args(&args("--bogus ping")).is_err());
        assert!(matches!(parse_args(&args("ping --help")), Ok(Parsed::Help)));
    }
}
