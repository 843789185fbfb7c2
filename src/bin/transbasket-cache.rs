//! Offline management tool for the translation cache file.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

use transbasket::cache::{CacheEntry, TranslationCache};
use transbasket::translation::languages::LanguageRegistry;
use transbasket::translation::text::truncate_for_log;

#[derive(Parser)]
#[command(name = "transbasket-cache", version)]
#[command(about = "Inspect and maintain the transbasket translation cache", long_about = None)]
struct Cli {
    /// Cache file to operate on.
    #[arg(short, long, default_value = "trans_cache.jsonl")]
    file: PathBuf,

    /// Count at which entries are served from cache (for `stats`).
    #[arg(long, default_value_t = 5)]
    threshold: u64,

    /// Expiry window in days (for `stats`).
    #[arg(long, default_value_t = 30)]
    days: i64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List cache entries, optionally for one language pair
    List { from: Option<String>, to: Option<String> },
    /// Show cache statistics
    Stats,
    /// Look up the translation for an exact text
    Search { from: String, to: String, text: String },
    /// Delete one entry by ID
    Delete { id: u64 },
    /// Remove every entry for a language pair
    Clear { from: String, to: String },
    /// Remove every entry
    ClearAll {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Remove entries unused for more than <days> days
    Cleanup { days: i64 },
    /// Write entries to stdout as JSON lines
    Export { from: Option<String>, to: Option<String> },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let cache = TranslationCache::open(&cli.file)?;
    let languages = LanguageRegistry::default();
    let lang = |code: &str| -> Result<String, String> {
        languages
            .normalize(code)
            .ok_or_else(|| format!("invalid language code '{}' (must be ISO 639-2)", code))
    };

    match cli.command {
        Commands::List { from, to } => {
            let from = from.as_deref().map(lang).transpose()?;
            let to = to.as_deref().map(lang).transpose()?;
            print_table(&cache.entries(from.as_deref(), to.as_deref()));
        }
        Commands::Stats => print_stats(&cache, cli.threshold, cli.days),
        Commands::Search { from, to, text } => match cache.lookup(&lang(&from)?, &lang(&to)?, &text) {
            Some(entry) => print_entry(&entry),
            None => println!("No matching entry found"),
        },
        Commands::Delete { id } => {
            if !cache.delete(id) {
                return Err(format!("no entry with ID {}", id).into());
            }
            println!("Deleted entry {}", id);
            cache.save()?;
        }
        Commands::Clear { from, to } => {
            let (from, to) = (lang(&from)?, lang(&to)?);
            let removed = cache.remove_pair(&from, &to);
            println!("Removed {} entries ({} -> {})", removed, from, to);
            cache.save()?;
        }
        Commands::ClearAll { yes } => {
            if !yes && !confirm("WARNING: This will delete ALL cache entries!\nAre you sure? (yes/no): ")? {
                println!("Operation cancelled");
                return Ok(());
            }
            println!("Removed {} entries", cache.clear());
            cache.save()?;
        }
        Commands::Cleanup { days } => {
            if days <= 0 {
                return Err("days must be a positive number".into());
            }
            let removed = cache.cleanup(days);
            println!("Removed {} entries older than {} days", removed, days);
            cache.save()?;
        }
        Commands::Export { from, to } => {
            let from = from.as_deref().map(lang).transpose()?;
            let to = to.as_deref().map(lang).transpose()?;
            let stdout = io::stdout();
            let mut out = stdout.lock();
            for entry in cache.entries(from.as_deref(), to.as_deref()) {
                serde_json::to_writer(&mut out, &entry)?;
                out.write_all(b"\n")?;
            }
        }
    }
    Ok(())
}

fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("yes"))
}

fn format_time(secs: i64) -> String {
    DateTime::<Utc>::from_timestamp(secs, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn print_table(entries: &[CacheEntry]) {
    println!();
    println!(
        "{:<5} {:<4} {:<4} {:<8} {:<30} {:<30} {:<19}",
        "ID", "From", "To", "Count", "Source", "Translation", "Last Used"
    );
    println!("{}", "─".repeat(106));
    for e in entries {
        println!(
            "{:<5} {:<4} {:<4} {:<8} {:<30} {:<30} {}",
            e.id,
            e.from,
            e.to,
            e.count,
            truncate_for_log(&e.source.replace('\n', " "), 27),
            truncate_for_log(&e.target.replace('\n', " "), 27),
            format_time(e.last_used)
        );
    }
    println!("\nTotal: {} entries\n", entries.len());
}

fn print_stats(cache: &TranslationCache, threshold: u64, days: i64) {
    let entries = cache.entries(None, None);
    let stats = cache.stats(threshold, days);
    let usage: u64 = entries.iter().map(|e| e.count).sum();

    println!("\n=== Cache Statistics ===\n");
    println!("Total entries: {}", stats.total);
    println!("Served from cache (count >= {}): {}", threshold, stats.active);
    println!("Unused for more than {} days: {}", days, stats.expired);
    println!("Total usage count: {}", usage);
    if !entries.is_empty() {
        println!("Average usage per entry: {:.2}", usage as f64 / entries.len() as f64);
        let oldest = entries.iter().map(|e| e.created_at).min().unwrap_or_default();
        let newest = entries.iter().map(|e| e.created_at).max().unwrap_or_default();
        println!("\nOldest entry: {}", format_time(oldest));
        println!("Newest entry: {}", format_time(newest));
    }

    let mut pairs: std::collections::BTreeMap<(&str, &str), (u64, i64)> = Default::default();
    for e in &entries {
        let slot = pairs.entry((e.from.as_str(), e.to.as_str())).or_default();
        slot.0 += 1;
        slot.1 = slot.1.max(e.last_used);
    }
    println!("\nEntries by language pair:");
    println!("  {:<4} → {:<4} : {:<8}  {:<19}", "From", "To", "Count", "Last Used");
    println!("  {}", "─".repeat(48));
    for ((from, to), (count, last_used)) in pairs {
        println!("  {:<4} → {:<4} : {:<8}  {}", from, to, count, format_time(last_used));
    }
    println!();
}

fn print_entry(e: &CacheEntry) {
    println!("\n=== Cache Entry Found ===\n");
    println!("ID:           {}", e.id);
    println!("Hash:         {}", e.hash);
    println!("From:         {}", e.from);
    println!("To:           {}", e.to);
    println!("Source:       {}", e.source);
    println!("Translation:  {}", e.target);
    println!("Count:        {}", e.count);
    println!("Created:      {}", format_time(e.created_at));
    println!("Last used:    {}", format_time(e.last_used));
    println!();
}
