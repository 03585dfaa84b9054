mod db;
mod export;
mod manifest;
mod parser;
mod settings;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use settings::Settings;

#[derive(Parser)]
#[command(name = "contact_scraper", about = "Extract contact fields from saved business pages")]
struct Cli {
    /// SQLite database (overrides CONTACTS_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a JSON manifest of saved pages into the database
    Import { manifest: PathBuf },
    /// Extract contact records from imported pages
    Process {
        /// Max pages to process (default: all unprocessed)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Write all records to CSV
    Export { out: PathBuf },
    /// Import + process + export in one pipeline
    Run {
        manifest: PathBuf,
        out: PathBuf,
        /// Max pages to process
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Extract a single HTML file and print the record
    Inspect {
        path: PathBuf,
        #[arg(long, default_value = "")]
        company: String,
        #[arg(long, default_value = "")]
        url: String,
        #[arg(long, default_value = "")]
        category: String,
    },
    /// Show processing statistics
    Stats,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let mut settings = Settings::load()?;
    if let Some(db) = cli.db {
        settings.db_path = db;
    }
    info!(settings = ?settings, "Starting contact_scraper");

    let result = match cli.command {
        Commands::Import { manifest } => {
            let conn = open_db(&settings)?;
            import(&conn, &manifest)
        }
        Commands::Process { limit } => {
            let conn = open_db(&settings)?;
            let docs = db::fetch_unprocessed(&conn, limit)?;
            if docs.is_empty() {
                println!("No unprocessed pages. Run 'import' first.");
                return Ok(());
            }
            println!("Processing {} pages...", docs.len());
            let counts = process_pages(&conn, &docs, settings.chunk_size)?;
            counts.print();
            Ok(())
        }
        Commands::Export { out } => {
            let conn = open_db(&settings)?;
            export_csv(&conn, &out)
        }
        Commands::Run { manifest, out, limit } => {
            let conn = open_db(&settings)?;

            // Phase 1: Import
            let t_import = Instant::now();
            import(&conn, &manifest)?;
            println!("Imported in {:.1}s", t_import.elapsed().as_secs_f64());

            // Phase 2: Process
            let t_process = Instant::now();
            let docs = db::fetch_unprocessed(&conn, limit)?;
            if docs.is_empty() {
                println!("Nothing new to process.");
            } else {
                println!("Processing {} pages...", docs.len());
                let counts = process_pages(&conn, &docs, settings.chunk_size)?;
                println!("Processed in {:.1}s", t_process.elapsed().as_secs_f64());
                counts.print();
            }

            // Phase 3: Export
            export_csv(&conn, &out)
        }
        Commands::Inspect {
            path,
            company,
            url,
            category,
        } => {
            let html = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {:?}", path))?;
            let doc = db::Document {
                company,
                url: if url.is_empty() {
                    path.display().to_string()
                } else {
                    url
                },
                category,
                html,
            };
            let row = parser::process_document(&doc);
            println!("{}", serde_json::to_string_pretty(&row)?);
            Ok(())
        }
        Commands::Stats => {
            let conn = open_db(&settings)?;
            let s = db::get_stats(&conn)?;
            println!("Documents: {}", s.documents);
            println!("Processed: {}", s.processed);
            println!("Pending:   {}", s.pending);
            if s.processed > 0 {
                println!("\n--- Filled fields ---");
                for (col, n) in &s.filled {
                    println!(
                        "  {:<10} {:>6}  ({:.0}%)",
                        col,
                        n,
                        100.0 * *n as f64 / s.processed as f64
                    );
                }
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn open_db(settings: &Settings) -> anyhow::Result<rusqlite::Connection> {
    let conn = db::connect(&settings.db_path)?;
    db::init_schema(&conn)?;
    Ok(conn)
}

fn import(conn: &rusqlite::Connection, manifest: &Path) -> anyhow::Result<()> {
    let docs = manifest::load(manifest)?;
    let inserted = db::insert_documents(conn, &docs)?;
    println!(
        "Inserted {} new documents ({} loaded from manifest)",
        inserted,
        docs.len()
    );
    Ok(())
}

fn export_csv(conn: &rusqlite::Connection, out: &Path) -> anyhow::Result<()> {
    let rows = db::fetch_contacts(conn)?;
    let written = export::write_csv_file(out, rows)?;
    println!("Wrote {} records to {:?}", written, out);
    Ok(())
}

#[derive(Default)]
struct ProcessCounts {
    records: usize,
    with_phone: usize,
    with_email: usize,
    with_web: usize,
    with_social: usize,
}

impl ProcessCounts {
    fn add(&mut self, row: &db::ContactRow) {
        self.records += 1;
        self.with_phone += usize::from(!row.telefon.is_empty() || !row.mobil.is_empty());
        self.with_email += usize::from(!row.email.is_empty());
        self.with_web += usize::from(!row.web.is_empty());
        self.with_social += usize::from(!row.facebook.is_empty() || !row.instagram.is_empty());
    }

    fn print(&self) {
        println!(
            "Saved {} records: {} with phone, {} with email, {} with web, {} with social.",
            self.records, self.with_phone, self.with_email, self.with_web, self.with_social,
        );
    }
}

fn process_pages(
    conn: &rusqlite::Connection,
    docs: &[db::Document],
    chunk_size: usize,
) -> anyhow::Result<ProcessCounts> {
    use indicatif::{ProgressBar, ProgressStyle};
    use rayon::prelude::*;

    let pb = ProgressBar::new(docs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
            .progress_chars("#>-"),
    );

    let mut counts = ProcessCounts::default();

    for chunk in docs.chunks(chunk_size) {
        let rows: Vec<db::ContactRow> = chunk.par_iter().map(parser::process_document).collect();
        for row in &rows {
            counts.add(row);
        }
        db::save_contacts(conn, &rows)?;
        pb.inc(chunk.len() as u64);
    }

    pb.finish_and_clear();
    Ok(counts)
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
