use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use timetable::holiday::combine_holidays;
use timetable::upload::{UploadIngestor, UploadState};
use timetable::{ApiClient, NoticeLevel, ScheduleEditor, TimetableConfig, WeekSchedule};

#[derive(Debug, Parser)]
#[command(name = "timetable", version, about = "Manage weekly class timetables")]
struct Args {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the ids of every stored timetable
    Ids,
    /// Print one stored timetable
    Show { id: String },
    /// Extract a timetable from a PDF
    Import {
        pdf: PathBuf,
        /// Write the extracted week as JSON here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List holidays, grouped by name
    Holidays,
    /// Add a holiday spanning one or more consecutive days
    AddHoliday {
        name: String,
        /// First day, as YYYY-MM-DD
        start: NaiveDate,
        #[arg(long, default_value_t = 1)]
        days: u32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match &args.config {
        Some(path) => TimetableConfig::load_from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => TimetableConfig::default(),
    };
    let client = ApiClient::new(config.api.clone())?;
    let mut editor = ScheduleEditor::new(config.days.clone());

    let result = run(args.command, &config, &client, &mut editor).await;
    print_notices(&mut editor);
    result
}

async fn run(
    command: Command,
    config: &TimetableConfig,
    client: &ApiClient,
    editor: &mut ScheduleEditor,
) -> anyhow::Result<()> {
    match command {
        Command::Ids => {
            editor.refresh_ids(client).await?;
            for id in editor.known_ids().iter() {
                println!("{}", id);
            }
        }
        Command::Show { id } => {
            editor.select_record(client, &id).await?;
            println!("{}", id);
            print_week(editor.week());
        }
        Command::Import { pdf, out } => {
            import(config, client, editor, &pdf, out.as_deref()).await?;
        }
        Command::Holidays => {
            for group in combine_holidays(client.holidays().await?) {
                println!("{:<24} {:<28} {}", group.id, group.name, group.date_label());
            }
        }
        Command::AddHoliday { name, start, days } => {
            let added = client.add_holidays(&name, start, days).await?;
            println!("Added {} holiday date(s) for {}", added, name);
        }
    }
    Ok(())
}

async fn import(
    config: &TimetableConfig,
    client: &ApiClient,
    editor: &mut ScheduleEditor,
    pdf: &Path,
    out: Option<&Path>,
) -> anyhow::Result<()> {
    let bytes = tokio::fs::read(pdf)
        .await
        .with_context(|| format!("reading {}", pdf.display()))?;
    let file_name = pdf
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "timetable.pdf".to_string());

    let mut ingestor = UploadIngestor::new(config.upload.settle_delay());
    let mut progress = ingestor.subscribe();
    let printer = tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            let state = progress.borrow_and_update().clone();
            match state {
                UploadState::Uploading { percent, message } => {
                    eprintln!("[{:>3}%] {}", percent, message)
                }
                UploadState::Succeeded { message } => eprintln!("[100%] {}", message),
                UploadState::Failed { reason } => eprintln!("[fail] {}", reason),
                UploadState::Idle => {}
            }
        }
    });

    let outcome = tokio::select! {
        result = editor.import_pdf(client, &file_name, bytes, &mut ingestor) => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };

    let result = match outcome {
        Some(Ok(())) => {
            let json = serde_json::to_string_pretty(editor.week())?;
            match out {
                Some(path) => {
                    tokio::fs::write(path, json)
                        .await
                        .with_context(|| format!("writing {}", path.display()))?;
                    info!(path = %path.display(), "Wrote extracted timetable");
                }
                None => println!("{}", json),
            }
            ingestor.settle().await;
            Ok(())
        }
        Some(Err(e)) => {
            ingestor.settle().await;
            Err(e.into())
        }
        None => {
            info!("Upload cancelled");
            ingestor.reset();
            Ok(())
        }
    };

    drop(ingestor);
    printer.await?;
    result
}

fn print_week(week: &WeekSchedule) {
    for (day, schedule) in week.days() {
        println!("{}", day);
        if schedule.is_empty() {
            println!("  (no classes)");
        }
        for p in schedule.periods() {
            println!(
                "  {}. {}-{}  {:<28} {:<6} {:<8} {} {} {}",
                p.period,
                p.start_time,
                p.end_time,
                p.course_name,
                p.class_type,
                p.group,
                p.instructor,
                p.building,
                p.room
            );
        }
    }
}

/// Prints queued notices. Errors are left to the returned result.
fn print_notices(editor: &mut ScheduleEditor) {
    for notice in editor.drain_notices() {
        if notice.level != NoticeLevel::Error {
            eprintln!("{}: {}", notice.level, notice.message);
        }
    }
}
