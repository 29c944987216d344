use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use vhotc::report::{self, OutputFormat, Stream};
use vhotc::{Config, DirectivePolicy, Pipeline, SUPPORTED_VERSION, Version};

#[derive(Parser, Debug)]
#[command(
    name = "vhotc",
    about = "Check a VHot source file's version directive and brace balance"
)]
struct Cli {
    /// VHot source file to check
    file: Option<PathBuf>,

    /// Highest language version to accept
    #[arg(long, value_name = "MAJOR.MINOR", default_value_t = SUPPORTED_VERSION)]
    supported_version: Version,

    /// Only accept the #vhot directive on the first line
    #[arg(long)]
    strict_directive: bool,

    /// Output format
    #[arg(long, default_value = "text", value_parser = ["text", "fancy", "json"])]
    format: String,
}

impl Cli {
    fn config(&self) -> Config {
        let policy = if self.strict_directive {
            DirectivePolicy::FirstLine
        } else {
            DirectivePolicy::FirstMatch
        };
        Config::default()
            .with_supported_version(self.supported_version)
            .with_directive_policy(policy)
    }
}

fn read_source(cli: &Cli) -> Result<(String, String)> {
    let Some(path) = &cli.file else {
        bail!(
            "usage: vhotc <file.vhot>\nlanguage version: {}",
            cli.supported_version
        );
    };
    let bytes =
        std::fs::read(path).with_context(|| format!("read source file '{}'", path.display()))?;
    if bytes.is_empty() {
        bail!("source file '{}' is empty", path.display());
    }
    // Only `#vhot`, digits, braces and newlines matter, all ASCII; other bytes
    // may be in any encoding.
    let source = String::from_utf8_lossy(&bytes).into_owned();
    Ok((path.display().to_string(), source))
}

fn main() -> Result<()> {
    // Diagnostics go to stderr so JSON on stdout stays clean (respects RUST_LOG)
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    // Bad arguments exit 1 like a missing file; --help still exits 0.
    let cli = Cli::try_parse().unwrap_or_else(|e| {
        if e.use_stderr() {
            let _ = e.print();
            std::process::exit(1);
        }
        e.exit()
    });
    let format: OutputFormat = cli.format.parse().context("parse --format")?;
    let (name, source) = read_source(&cli)?;
    let config = cli.config();
    tracing::info!(file = %name, supported = %config.supported_version, "validating");

    let outcome = Pipeline::new(config).validate(&source);
    let (stream, text) = report::render(outcome, format, config.supported_version, &name, &source)?;
    match stream {
        Stream::Stdout => println!("{text}"),
        Stream::Stderr => eprintln!("{text}"),
    }
    Ok(())
}
