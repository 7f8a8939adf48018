use clap::Parser;
use smart_campus::args::{
    Args, AttendanceCommand, Command, GradeCommand, ListArgs, ReportCommand, ScheduleCommand,
    TransactionCommand,
};
use smart_campus::error::{error_type, IntoResult};
use smart_campus::{commands, Config, ErrorType, Result};
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            error_type(&e)
                .map(ErrorType::exit_code)
                .unwrap_or(ExitCode::FAILURE)
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().campus_home().path();

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init => commands::init(home).await?.print(),

        Command::Login(login_args) => commands::login(load(home).await?, login_args.clone())
            .await?
            .print(),

        Command::Logout => commands::logout(load(home).await?).await?.print(),

        Command::Whoami => commands::whoami(load(home).await?).await?.print(),

        Command::Schedule(schedule) => {
            let config = load(home).await?;
            match schedule {
                ScheduleCommand::Add(a) => commands::schedule_add(config, a.clone()).await?.print(),
                ScheduleCommand::List(a) => {
                    commands::schedule_list(config, a.clone()).await?.print()
                }
                ScheduleCommand::Update(a) => {
                    commands::schedule_update(config, a.clone()).await?.print()
                }
                ScheduleCommand::Delete(a) => {
                    commands::schedule_delete(config, a.clone()).await?.print()
                }
            }
        }

        Command::Grade(grade) => {
            let config = load(home).await?;
            match grade {
                GradeCommand::Add(a) => commands::grade_add(config, a.clone()).await?.print(),
                GradeCommand::List(a) => commands::grade_list(config, a.clone()).await?.print(),
                GradeCommand::Update(a) => commands::grade_update(config, a.clone()).await?.print(),
                GradeCommand::Delete(a) => commands::grade_delete(config, a.clone()).await?.print(),
            }
        }

        Command::Attendance(attendance) => {
            let config = load(home).await?;
            match attendance {
                AttendanceCommand::Add(a) => {
                    commands::attendance_add(config, a.clone()).await?.print()
                }
                AttendanceCommand::List(a) => {
                    commands::attendance_list(config, a.clone()).await?.print()
                }
                AttendanceCommand::Delete(a) => {
                    commands::attendance_delete(config, a.clone()).await?.print()
                }
            }
        }

        Command::Transaction(transaction) => {
            let config = load(home).await?;
            match transaction {
                TransactionCommand::Add(a) => {
                    commands::transaction_add(config, a.clone()).await?.print()
                }
                TransactionCommand::List(a) => {
                    commands::transaction_list(config, a.clone()).await?.print()
                }
                TransactionCommand::Update(a) => {
                    commands::transaction_update(config, a.clone())
                        .await?
                        .print()
                }
                TransactionCommand::Delete(a) => {
                    commands::transaction_delete(config, a.clone())
                        .await?
                        .print()
                }
            }
        }

        Command::Report(report) => {
            let config = load(home).await?;
            match report {
                ReportCommand::Ledger(a) => commands::report_ledger(config, a.clone()).await?.print(),
                ReportCommand::Academic(a) => {
                    commands::report_academic(config, a.clone()).await?.print()
                }
            }
        }

        Command::Chat(chat_args) => {
            let config = load(home).await?;
            if chat_args.show_history() {
                commands::chat_history(config, ListArgs::default())
                    .await?
                    .print()
            } else {
                commands::chat(config, chat_args.clone()).await?.print()
            }
        }
    };
    Ok(())
}

/// Loads the config for every command except `init`. A missing or broken home is a config error.
async fn load(home: &Path) -> Result<Config> {
    Config::load(home).await.pub_result(ErrorType::Config)
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                "smart_campus",
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
