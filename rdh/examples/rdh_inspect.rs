#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
use rdh::{
    config::page_size_from_str, format_byte_count, HeaderFields, InspectConfig, Inspector, PageBuilder, PageFile,
};

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(author, version, long_about = None)]
#[command(about = "RDH inspect - Walk, validate and generate readout page dumps")]
struct Cli {
    /// JSON configuration file (defaults come from RDH_PAGE_SIZE / RDH_MAX_PAGES)
    #[arg(long, global = true)]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Print every header of every page
    Dump {
        /// Page dump file
        path: std::path::PathBuf,

        /// Page size (e.g. 8k, 1M)
        #[arg(long)]
        page_size: Option<String>,

        /// Stop after this many pages
        #[arg(long)]
        max_pages: Option<usize>,

        /// Skip the raw 32-bit words
        #[arg(long)]
        no_raw: bool,

        /// Validate each header and print its errors
        #[arg(long)]
        validate: bool,

        /// Raw words per line
        #[arg(long)]
        words_per_line: Option<usize>,
    },
    /// Validate every header and summarize
    Check {
        /// Page dump file
        path: std::path::PathBuf,

        /// Page size (e.g. 8k, 1M)
        #[arg(long)]
        page_size: Option<String>,

        /// Stop after this many pages
        #[arg(long)]
        max_pages: Option<usize>,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,

        /// Check pages on the calling thread only
        #[arg(long)]
        sequential: bool,
    },
    /// Write a dump of synthetic pages
    Synth {
        /// Output file
        out: std::path::PathBuf,

        /// Number of pages
        #[arg(long, default_value = "16")]
        pages: usize,

        /// Page size (e.g. 8k, 1M)
        #[arg(long, default_value = "8k")]
        page_size: String,

        /// Headers per page
        #[arg(long, default_value = "4")]
        headers_per_page: usize,

        /// FEE id stamped into every header
        #[arg(long, default_value = "0")]
        fee_id: u16,

        /// Link id stamped into every header
        #[arg(long, default_value = "0")]
        link_id: u8,

        /// Point the last header of the last page past the page end
        #[arg(long)]
        corrupt_last: bool,
    },
}

#[cfg(feature = "cli")]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let cli = Cli::parse();
    let start_time = std::time::Instant::now();
    let base = load_config(cli.config.as_deref())?;

    let clean = match &cli.command {
        Commands::Dump {
            path,
            page_size,
            max_pages,
            no_raw,
            validate,
            words_per_line,
        } => {
            let mut walk = base.walk.with_raw_words(!no_raw && base.walk.raw_words);
            if *validate {
                walk = walk.with_validation(true);
            }
            if let Some(per_line) = words_per_line {
                walk = walk.with_words_per_line(*per_line);
            }
            let config = override_paging(base, page_size.as_deref(), *max_pages)?.with_walk(walk);
            handle_dump(path, config)?
        }
        Commands::Check {
            path,
            page_size,
            max_pages,
            json,
            sequential,
        } => {
            let mut config = override_paging(base, page_size.as_deref(), *max_pages)?;
            if *sequential {
                config = config.with_parallel(false);
            }
            handle_check(path, config, *json)?
        }
        Commands::Synth {
            out,
            pages,
            page_size,
            headers_per_page,
            fee_id,
            link_id,
            corrupt_last,
        } => {
            let template = HeaderFields::v3().with_fee_id(*fee_id).with_link_id(*link_id);
            handle_synth(out, *pages, page_size, *headers_per_page, template, *corrupt_last)?;
            true
        }
    };

    let elapsed = start_time.elapsed();
    eprintln!("Completed in {elapsed:.2?}");

    if !clean {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("This example requires the 'cli' feature to be enabled.");
    eprintln!("Run with: cargo run --features cli --example rdh_inspect");
    std::process::exit(1);
}

#[cfg(feature = "cli")]
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(feature = "cli")]
fn load_config(path: Option<&std::path::Path>) -> Result<InspectConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)?;
            Ok(InspectConfig::from_json(&json)?)
        }
        None => Ok(InspectConfig::from_env()?),
    }
}

#[cfg(feature = "cli")]
fn override_paging(
    mut config: InspectConfig,
    page_size: Option<&str>,
    max_pages: Option<usize>,
) -> Result<InspectConfig, Box<dyn std::error::Error>> {
    if let Some(raw) = page_size {
        config = config.with_page_size(page_size_from_str(raw)?);
    }
    if max_pages.is_some() {
        config = config.with_max_pages(max_pages);
    }
    Ok(config)
}

#[cfg(feature = "cli")]
fn handle_dump(path: &std::path::Path, config: InspectConfig) -> Result<bool, Box<dyn std::error::Error>> {
    let dump = PageFile::open(path)?;
    let stdout = std::io::stdout();

    let summaries = Inspector::new(config).dump_file(&dump, stdout.lock())?;
    let headers: usize = summaries.iter().map(|s| s.headers).sum();
    let failed = summaries.iter().filter(|s| !s.is_ok()).count();

    eprintln!(
        "{} pages, {} headers, {} walk errors",
        summaries.len(),
        headers,
        failed
    );
    Ok(failed == 0)
}

#[cfg(feature = "cli")]
fn handle_check(path: &std::path::Path, config: InspectConfig, json: bool) -> Result<bool, Box<dyn std::error::Error>> {
    let dump = PageFile::open(path)?;
    let report = Inspector::new(config).check_file(&dump)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(report.is_clean());
    }

    println!("Dump:            {}", path.display());
    println!("Size:            {}", format_byte_count(dump.len() as f64, "B"));
    println!("Pages:           {}", report.pages.len());
    println!("Headers:         {}", report.total_headers);
    println!("Invalid headers: {}", report.invalid_headers);
    println!("Failed pages:    {}", report.failed_pages);

    if !report.links.is_empty() {
        println!();
        println!("{:>6} {:>5} {:>10} {:>8} {:>14}", "FEE", "Link", "Headers", "Invalid", "Memory");
        for entry in report.links.entries() {
            println!(
                "{:>6} {:>5} {:>10} {:>8} {:>14}",
                entry.fee_id,
                entry.link_id,
                entry.counters.headers,
                entry.counters.invalid,
                format_byte_count(entry.counters.memory_bytes as f64, "B")
            );
        }
    }

    for page in report.pages.iter().filter(|p| !p.is_clean()) {
        if let Some(err) = page.summary.error {
            println!("page {}: {} (code {})", page.page, err, err.code());
        }
        for header in &page.invalid {
            println!(
                "page {} RDH #{} @ 0x{:04X}: {}",
                page.page,
                header.index,
                header.offset,
                header
                    .violations
                    .iter()
                    .map(|v| v.message())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
    }

    Ok(report.is_clean())
}

#[cfg(feature = "cli")]
fn handle_synth(
    out: &std::path::Path,
    pages: usize,
    page_size: &str,
    headers_per_page: usize,
    template: HeaderFields,
    corrupt_last: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    use std::io::Write;

    let page_size = page_size_from_str(page_size)?;
    let builder = PageBuilder::new(page_size)
        .with_headers(headers_per_page)
        .with_template(template);
    let mut writer = std::io::BufWriter::new(std::fs::File::create(out)?);

    for index in 0..pages {
        let page = if corrupt_last && index + 1 == pages {
            builder.clone().with_last_offset(u16::MAX).build(index as u16)?
        } else {
            builder.build(index as u16)?
        };
        writer.write_all(&page)?;
    }
    writer.flush()?;

    println!(
        "Wrote {} pages of {} ({} headers each) to {}",
        pages,
        format_byte_count(page_size as f64, "B"),
        headers_per_page,
        out.display()
    );
    Ok(())
}
