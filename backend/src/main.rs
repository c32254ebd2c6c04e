//! Rosterload CLI - turn course activity exports into student rosters
//!
//! # Main Commands
//!
//! ```bash
//! rosterload serve                    # Start HTTP server (port 3000)
//! rosterload roster curso.xlsx        # Print the roster, least time first
//! rosterload submit curso.xlsx        # Upload and parse concurrently
//! ```
//!
//! # Debug Commands (for development)
//!
//! ```bash
//! rosterload rows curso.xml           # Print extracted raw rows as JSON
//! rosterload detect curso.xml         # Show the detected format
//! rosterload duration "1,5 horas"     # Parse duration strings
//! ```

use clap::{Parser, Subcommand};
use rosterload::{
    detect_format, extract_rows, format_duration, load_roster, matching_grammar, parse_duration,
    submit_file, FileFormat, SelectedFile, Settings, SubmissionOutcome, SubmissionState,
    SubmissionTracker, UploadClient,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "rosterload")]
#[command(about = "Extract student rosters from course activity exports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a file and print the roster, least time first
    Roster {
        /// Input file (xlsx, xls, ods, csv, tsv, xml)
        input: PathBuf,

        /// Declared media type (overrides the extension)
        #[arg(short, long)]
        media_type: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the raw rows extracted from a file
    Rows {
        /// Input file
        input: PathBuf,

        /// Declared media type (overrides the extension)
        #[arg(short, long)]
        media_type: Option<String>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the format a file is classified as
    Detect {
        /// Input file
        input: PathBuf,

        /// Declared media type (overrides the extension)
        #[arg(short, long)]
        media_type: Option<String>,
    },

    /// Parse one or more duration strings
    Duration {
        /// Duration texts, e.g. "1:30:00" "01h 30m 00s" "1,5 horas"
        #[arg(required = true)]
        texts: Vec<String>,
    },

    /// Upload a file and build its roster concurrently
    Submit {
        /// Input file
        input: PathBuf,

        /// Declared media type (overrides the extension)
        #[arg(short, long)]
        media_type: Option<String>,

        /// Base URL of the upload service (default: ROSTERLOAD_API_URL)
        #[arg(long)]
        api_url: Option<String>,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on (default: ROSTERLOAD_PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    let mut settings = Settings::from_env();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Roster {
            input,
            media_type,
            json,
            output,
        } => cmd_roster(&input, media_type.as_deref(), json, output.as_deref()),

        Commands::Rows {
            input,
            media_type,
            output,
        } => cmd_rows(&input, media_type.as_deref(), output.as_deref()),

        Commands::Detect { input, media_type } => cmd_detect(&input, media_type.as_deref()),

        Commands::Duration { texts } => cmd_duration(&texts),

        Commands::Submit {
            input,
            media_type,
            api_url,
        } => {
            if let Some(url) = api_url {
                settings.api_url = url;
            }
            cmd_submit(&input, media_type.as_deref(), &settings).await
        }

        Commands::Serve { port } => {
            if let Some(port) = port {
                settings.port = port;
            }
            cmd_serve(settings).await
        }
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_roster(
    input: &Path,
    media_type: Option<&str>,
    json: bool,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = SelectedFile::from_path(input, media_type)?;
    let loaded = load_roster(&file)?;

    if loaded.roster.is_empty() {
        return Err(rosterload::SubmissionError::EmptyRoster.into());
    }

    let content = if json {
        serde_json::to_string_pretty(&loaded.roster)?
    } else {
        roster_table(&loaded.roster)
    };
    write_output(&content, output)?;

    Ok(())
}

fn roster_table(roster: &rosterload::Roster) -> String {
    let width = roster
        .iter()
        .map(|s| s.full_name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Name".len());

    let mut lines = vec![format!("{:<width$}  {:<12}  {}", "Name", "Time", "Email", width = width)];
    for student in roster {
        lines.push(format!(
            "{:<width$}  {:<12}  {}",
            student.full_name,
            student.display_time,
            student.email.as_deref().unwrap_or("-"),
            width = width
        ));
    }
    lines.join("\n")
}

fn cmd_rows(
    input: &Path,
    media_type: Option<&str>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = SelectedFile::from_path(input, media_type)?;
    let format = detect_format(&file.media_type, &file.name);
    eprintln!("📄 Reading {} as {}", file.name, format);

    let rows = extract_rows(&file, format)?;
    eprintln!("✅ Extracted {} rows", rows.len());

    let json = serde_json::to_string_pretty(&rows)?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_detect(input: &Path, media_type: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let format = detect_format(media_type.unwrap_or(""), &name);

    println!("{}", format);
    if format == FileFormat::Unsupported {
        eprintln!("⚠️  {} is neither a spreadsheet nor an XML export", name);
    }
    Ok(())
}

fn cmd_duration(texts: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    for text in texts {
        let seconds = parse_duration(text);
        let display = if seconds > 0 {
            format_duration(seconds)
        } else {
            text.trim().to_string()
        };
        println!(
            "{:<24} {:>8}s  {:<12}  {}",
            text,
            seconds,
            display,
            matching_grammar(text).unwrap_or("none")
        );
    }
    Ok(())
}

async fn cmd_submit(
    input: &Path,
    media_type: Option<&str>,
    settings: &Settings,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = SelectedFile::from_path(input, media_type)?;
    let client = UploadClient::from_settings(settings);
    let tracker = SubmissionTracker::new();

    let state = submit_file(&tracker, &client, Some(&file), settings.max_file_size)
        .await?
        .unwrap_or_else(|| tracker.state());

    if let SubmissionState::Succeeded(SubmissionOutcome::WithRoster { roster, .. }) = &state {
        println!("{}", roster_table(roster));
    }

    match state {
        SubmissionState::Failed(err) => Err(err.into()),
        _ => Ok(()),
    }
}

async fn cmd_serve(settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    Ok(rosterload::server::start_server(settings).await?)
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
