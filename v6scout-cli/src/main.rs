use std::{
    io::{self, IsTerminal, Read},
    path::PathBuf,
    process::ExitCode,
};

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use v6scout::{
    canonicalize_ipv6, find_ipv6,
    harvester::{HarvestOptions, Harvester, Target},
    is_valid_ipv6,
    report::{JsonFormatter, RawFormatter, ReportFormatter, ScanReport, StructuredFormatter},
    sources::{find_ipv6_in_file, find_ipv6_in_url},
    utils::{DesiredType, Sanitize, Terminal},
};

/// Find, validate and canonicalize IPv6 address literals.
///
/// Without a subcommand an interactive menu is started.
#[derive(Parser, Debug)]
#[command(name = "v6scout", version, about, long_about = None)]
struct Cli {
    /// Log filter used when RUST_LOG is not set (e.g. "info", "v6scout=debug").
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check whether ADDR is a single IPv6 literal. Exits with 1 when it is not.
    Check { address: String },

    /// Print the canonical form of ADDR. Exits with 1 when it is not an IPv6 literal.
    Canonical { address: String },

    /// Extract IPv6 literals from texts, files and URLs (stdin when none are given).
    Scan(ScanArgs),
}

#[derive(Args, Debug)]
struct ScanArgs {
    /// Inline text to scan. Repeatable.
    #[arg(long = "text", value_name = "TEXT")]
    texts: Vec<String>,

    /// File to scan. Repeatable.
    #[arg(long = "file", value_name = "PATH")]
    files: Vec<PathBuf>,

    /// Page to fetch and scan; http:// is assumed without a scheme. Repeatable.
    #[arg(long = "url", value_name = "URL")]
    urls: Vec<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Raw)]
    format: OutputFormat,

    /// Drop repeated literals within each source.
    #[arg(long)]
    dedup: bool,

    /// Maximum number of sources scanned at the same time.
    #[arg(long, default_value_t = 16)]
    batch_size: usize,

    /// Timeout for each URL fetch, in milliseconds.
    #[arg(long, default_value_t = 10_000)]
    timeout_ms: u64,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Literals exactly as found, one per line.
    Raw,
    /// Per source: each literal with its canonical form.
    Structured,
    /// One JSON report per line.
    Json,
}

impl ScanArgs {
    fn targets(&self) -> Vec<Target> {
        let texts = self.texts.iter().enumerate().map(|(i, body)| Target::Text {
            label: format!("text #{}", i + 1),
            body: body.clone(),
        });
        let files = self.files.iter().cloned().map(Target::File);
        let urls = self.urls.iter().cloned().map(Target::Url);

        texts.chain(files).chain(urls).collect()
    }

    fn options(&self) -> HarvestOptions {
        HarvestOptions {
            batch_size: self.batch_size,
            timeout_ms: self.timeout_ms,
            dedup: self.dedup,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .with_context(|| format!("invalid log level {:?}", cli.log_level))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    tracing::debug!("v6scout CLI v{} starting", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(Commands::Check { address }) => Ok(exit_code(check(&address))),
        Some(Commands::Canonical { address }) => Ok(exit_code(canonical(&address))),
        Some(Commands::Scan(args)) => scan(args).await,
        None => {
            menu().await;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Prints the verdict; returns whether `address` is valid.
fn check(address: &str) -> bool {
    let valid = is_valid_ipv6(address);
    if valid {
        println!("valid {}", canonicalize_ipv6(address));
    } else {
        println!("invalid");
    }
    valid
}

/// Prints the canonical form (the input itself when invalid).
fn canonical(address: &str) -> bool {
    println!("{}", canonicalize_ipv6(address));
    is_valid_ipv6(address)
}

async fn scan(args: ScanArgs) -> anyhow::Result<ExitCode> {
    let mut targets = args.targets();
    if targets.is_empty() {
        let stdin = io::stdin();
        anyhow::ensure!(
            !stdin.is_terminal(),
            "nothing to scan: pass --text, --file or --url, or pipe text on stdin"
        );
        let mut body = String::new();
        stdin
            .lock()
            .read_to_string(&mut body)
            .context("couldn't read stdin")?;
        targets.push(Target::Text {
            label: "stdin".to_string(),
            body,
        });
    }

    let options = args.options();
    match args.format {
        OutputFormat::Raw => {
            for raw in harvest::<RawFormatter>(targets, options).await {
                if !raw.is_empty() {
                    println!("{}", raw);
                }
            }
        }
        OutputFormat::Structured => {
            for report in harvest::<StructuredFormatter>(targets, options).await {
                print_report(&report);
            }
        }
        OutputFormat::Json => {
            for json in harvest::<JsonFormatter>(targets, options).await {
                println!("{}", json);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn harvest<F>(targets: Vec<Target>, options: HarvestOptions) -> Vec<F::Output>
where
    F: ReportFormatter + Default,
{
    let harvester = Harvester::<F>::new().with_options(options);
    harvester.add_targets(targets);
    harvester.run().collect_all().await
}

fn print_report(report: &ScanReport) {
    println!("{}:", report.source);
    if let Some(failure) = &report.failure {
        println!("  error: {}", failure);
        return;
    }
    if report.is_empty() {
        println!("  (no addresses)");
    }
    for (found, canonical) in report.addresses.iter().zip(&report.canonical) {
        if found == canonical {
            println!("  {}", found);
        } else {
            println!("  {} -> {}", found, canonical);
        }
    }
}

fn print_found(source: &str, addresses: Vec<String>, dedup: bool) {
    let mut report = ScanReport::new(source, addresses);
    if dedup {
        report = report.deduplicated();
    }
    print_report(&report);
}

const RULE: &str =
    "------------------------------------------------------------------------------------";

fn banner_text() -> String {
    [
        RULE.to_string(),
        "            ██    ██  ██████  ███████  ██████  ██████  ██    ██ ████████            ".to_string(),
        "            ██    ██ ██       ██      ██      ██    ██ ██    ██    ██               ".to_string(),
        "            ██    ██ ███████  ███████ ██      ██    ██ ██    ██    ██               ".to_string(),
        "             ██  ██  ██    ██      ██ ██      ██    ██ ██    ██    ██               ".to_string(),
        "              ████    ██████  ███████  ██████  ██████   ██████     ██               ".to_string(),
        "                  FIND, CHECK AND CANONICALIZE IPv6 LITERALS                        ".to_string(),
        format!(
            "                            VERSION:            {:<36}",
            env!("CARGO_PKG_VERSION")
        ),
        RULE.to_string(),
    ]
    .join("\n")
}

fn banner() {
    println!("{}", banner_text());
}

const MENU: &str = "\
1) Check an address
2) Canonicalize an address
3) Scan text
4) Scan a file
5) Scan a URL
6) Quit
Choose an option (1-6):";

async fn menu() {
    banner();

    loop {
        let Some(choice) = Terminal::ask(
            MENU,
            &[Sanitize::IsType(DesiredType::Usize), Sanitize::IsBetween(1, 6)],
        ) else {
            break;
        };

        match choice.answer.as_str() {
            "1" => {
                let Some(input) = Terminal::ask("Address:", &[Sanitize::NotEmpty]) else {
                    break;
                };
                check(&input.answer);
            }
            "2" => {
                let Some(input) = Terminal::ask("Address:", &[Sanitize::IsIpv6]) else {
                    break;
                };
                println!("{}", canonicalize_ipv6(&input.answer));
            }
            "3" => {
                let Some(input) = Terminal::ask("Text:", &[Sanitize::NotEmpty]) else {
                    break;
                };
                let Some(dedup) = ask_dedup() else { break };
                print_found("text", find_ipv6(input.answer.as_str()), dedup);
            }
            "4" => {
                let Some(input) = Terminal::ask("File path:", &[Sanitize::NotEmpty]) else {
                    break;
                };
                let Some(dedup) = ask_dedup() else { break };
                print_found(&input.answer, find_ipv6_in_file(&input.answer), dedup);
            }
            "5" => {
                let Some(input) = Terminal::ask("URL:", &[Sanitize::NotEmpty]) else {
                    break;
                };
                let Some(dedup) = ask_dedup() else { break };
                print_found(&input.answer, find_ipv6_in_url(&input.answer).await, dedup);
            }
            _ => break,
        }
    }
}

fn ask_dedup() -> Option<bool> {
    let options = ["y", "n", "Y", "N"].map(String::from).to_vec();
    Terminal::ask("Drop duplicates? (y/n)", &[Sanitize::MatchStrings(options)])
        .map(|input| input.answer.eq_ignore_ascii_case("y"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_scan_targets() {
        let cli = Cli::try_parse_from([
            "v6scout",
            "scan",
            "--text",
            "a ::1",
            "--file",
            "hosts.txt",
            "--url",
            "example.com",
            "--text",
            "b fe80::1",
            "--format",
            "json",
            "--dedup",
        ])
        .unwrap();

        let Some(Commands::Scan(args)) = cli.command else {
            panic!("expected scan");
        };
        assert_eq!(args.format, OutputFormat::Json);
        assert!(args.options().dedup);
        assert_eq!(
            args.targets(),
            vec![
                Target::Text {
                    label: "text #1".to_string(),
                    body: "a ::1".to_string()
                },
                Target::Text {
                    label: "text #2".to_string(),
                    body: "b fe80::1".to_string()
                },
                Target::File(PathBuf::from("hosts.txt")),
                Target::Url("example.com".to_string()),
            ]
        );
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["v6scout"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.log_level, "warn");

        let cli = Cli::try_parse_from(["v6scout", "scan"]).unwrap();
        let Some(Commands::Scan(args)) = cli.command else {
            panic!("expected scan");
        };
        assert_eq!(args.format, OutputFormat::Raw);
        assert_eq!(args.options().batch_size, 16);
        assert_eq!(args.options().timeout_ms, 10_000);
    }

    #[test]
    fn test_banner_shows_tagline_and_version() {
        let banner = banner_text();
        assert_eq!(banner.lines().count(), 9);
        assert!(banner.contains("FIND, CHECK AND CANONICALIZE IPv6 LITERALS"));
        assert!(banner.contains(env!("CARGO_PKG_VERSION")));
        assert!(!banner.contains("CREATED BY"));
    }

    #[test]
    fn test_check_and_canonical_verdicts() {
        assert!(check("2001:db8::1"));
        assert!(!check("2001:db8:::1"));
        assert!(canonical("::FFFF:192.0.2.128"));
        assert!(!canonical("not-an-address"));
    }
}
