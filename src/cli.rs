//! Command-line surface
//!
//! Argument parsing is kept out of `main` so that parse failures can be
//! classified and reported like any other failure of a run.

use crate::request::{InputFormat, RequestParams, DEFAULT_MODEL};
use crate::GleanError;
use clap::error::ErrorKind as ClapErrorKind;
use clap::{ArgAction, Parser};
use std::ffi::OsString;
use std::path::PathBuf;

/// Worked invocations shown after `--help` and on argument errors
pub const EXAMPLES: &str = "\
Examples:
  glean --url https://example.com/blog --instruction \"Extract blog posts with title and date\" --temp 0.0
  glean --url https://news.example.org --instruction \"List every headline and its publication date\" --temp 0.2 --format plain-text
  glean --url file:///tmp/page.html --instruction \"Extract events\" --temp 0 --output events.json
  glean --url 'raw:<html><body><h1>Launch</h1></body></html>' --instruction \"Extract titles\" --temp 0";

/// Glean: extract structured records from a web page with a local LLM
///
/// Glean renders the page at `--url`, asks the model to extract
/// `{title, date}` records following `--instruction`, validates them and
/// writes a timestamped JSON artifact.
#[derive(Parser, Debug, Clone)]
#[command(name = "glean")]
#[command(version)]
#[command(about = "Extract structured records from a web page with a local LLM", long_about = None)]
#[command(after_help = EXAMPLES)]
pub struct Cli {
    /// Page to extract from (http://, https://, file:// or raw:)
    #[arg(long)]
    pub url: String,

    /// What to extract, in plain language
    #[arg(long)]
    pub instruction: String,

    /// Sampling temperature (0.0 - 1.0)
    #[arg(long = "temp", value_name = "FLOAT", allow_negative_numbers = true)]
    pub temperature: f64,

    /// Approximate tokens per content chunk
    #[arg(long, value_name = "INT", default_value_t = 1000)]
    pub chunk_size: u32,

    /// Fraction of each chunk repeated in the next one (0.0 - 1.0)
    #[arg(long, value_name = "FLOAT", default_value_t = 0.0, allow_negative_numbers = true)]
    pub overlap: f64,

    /// Maximum tokens per model response
    #[arg(long, value_name = "INT", default_value_t = 800)]
    pub max_tokens: u32,

    /// Render without a visible browser window
    #[arg(long, value_name = "BOOL", default_value_t = true, action = ArgAction::Set)]
    pub headless: bool,

    /// How page content is presented to the model
    #[arg(long, value_enum, default_value_t = InputFormat::StructuredMarkdown)]
    pub format: InputFormat,

    /// Write the artifact here instead of a derived filename
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Model identifier understood by the LLM runtime
    #[arg(long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Optional TOML configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the LLM runtime base URL
    #[arg(long, value_name = "URL")]
    pub engine_url: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    /// Returns the parameters for [`crate::ExtractionRequest::build`]
    pub fn request_params(&self) -> RequestParams {
        RequestParams {
            url: self.url.clone(),
            instruction: self.instruction.clone(),
            model: self.model.clone(),
            temperature: self.temperature,
            chunk_token_threshold: self.chunk_size,
            overlap_rate: self.overlap,
            max_tokens: self.max_tokens,
            input_format: self.format,
            headless: self.headless,
        }
    }
}

/// Outcome of parsing the command line
#[derive(Debug)]
pub enum Invocation {
    /// Arguments are complete; run the pipeline
    Run(Cli),
    /// `--help` or `--version`; print and exit successfully
    Info(clap::Error),
}

/// Parses command-line arguments
///
/// # Returns
///
/// * `Ok(Invocation)` - A runnable command or an informational request
/// * `Err(GleanError::ArgumentParsing)` - Missing or malformed flags
pub fn parse_args<I, T>(args: I) -> Result<Invocation, GleanError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => Ok(Invocation::Run(cli)),
        Err(e) => match e.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => Ok(Invocation::Info(e)),
            _ => Err(GleanError::ArgumentParsing(summarize(&e.to_string()))),
        },
    }
}

/// Usage line plus worked examples
pub fn usage_reminder() -> String {
    format!(
        "Usage: glean --url <URL> --instruction <TEXT> --temp <FLOAT> [OPTIONS]\n\n{}",
        EXAMPLES
    )
}

/// Reduces a rendered clap error to its first paragraph, on one line
fn summarize(rendered: &str) -> String {
    let first_paragraph: Vec<&str> = rendered
        .lines()
        .take_while(|line| !line.trim().is_empty())
        .map(str::trim)
        .collect();

    let summary = first_paragraph.join(" ");
    summary
        .strip_prefix("error: ")
        .unwrap_or(&summary)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    const BASE_ARGS: [&str; 7] = [
        "glean",
        "--url",
        "https://example.com",
        "--instruction",
        "Extract blog posts with title and date",
        "--temp",
        "0.0",
    ];

    fn parse(extra: &[&str]) -> Result<Cli, GleanError> {
        let args = BASE_ARGS.iter().chain(extra.iter()).copied();
        match parse_args(args)? {
            Invocation::Run(cli) => Ok(cli),
            Invocation::Info(info) => panic!("unexpected info request: {}", info),
        }
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&[]).unwrap();

        assert_eq!(cli.url, "https://example.com");
        assert_eq!(cli.temperature, 0.0);
        assert_eq!(cli.chunk_size, 1000);
        assert_eq!(cli.overlap, 0.0);
        assert_eq!(cli.max_tokens, 800);
        assert!(cli.headless);
        assert_eq!(cli.format, InputFormat::StructuredMarkdown);
        assert_eq!(cli.output, None);
        assert_eq!(cli.model, DEFAULT_MODEL);
        assert_eq!(cli.config, None);
        assert_eq!(cli.engine_url, None);
    }

    #[test]
    fn test_all_options() {
        let cli = parse(&[
            "--chunk-size",
            "500",
            "--overlap",
            "0.1",
            "--max-tokens",
            "200",
            "--headless",
            "false",
            "--format",
            "raw-html",
            "--output",
            "out.json",
            "--model",
            "ollama/llama3",
            "--engine-url",
            "http://127.0.0.1:9999",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.chunk_size, 500);
        assert_eq!(cli.overlap, 0.1);
        assert_eq!(cli.max_tokens, 200);
        assert!(!cli.headless);
        assert_eq!(cli.format, InputFormat::RawHtml);
        assert_eq!(cli.output, Some(PathBuf::from("out.json")));
        assert_eq!(cli.model, "ollama/llama3");
        assert_eq!(cli.engine_url.as_deref(), Some("http://127.0.0.1:9999"));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_request_params_mapping() {
        let params = parse(&["--format", "plain-text", "--overlap", "0.25"])
            .unwrap()
            .request_params();

        assert_eq!(params.url, "https://example.com");
        assert_eq!(params.instruction, "Extract blog posts with title and date");
        assert_eq!(params.chunk_token_threshold, 1000);
        assert_eq!(params.overlap_rate, 0.25);
        assert_eq!(params.input_format, InputFormat::PlainText);
        assert!(params.headless);
    }

    #[test]
    fn test_negative_temperature_reaches_range_check() {
        let cli = parse_args([
            "glean",
            "--url",
            "https://example.com",
            "--instruction",
            "x",
            "--temp",
            "-0.5",
        ]);
        match cli {
            Ok(Invocation::Run(cli)) => assert_eq!(cli.temperature, -0.5),
            other => panic!("expected a runnable command, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_url() {
        let err = parse_args(["glean", "--instruction", "x", "--temp", "0"]).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ArgumentParsing);
        let message = err.to_string();
        assert!(message.contains("--url"));
        assert!(!message.starts_with("error:"));
        assert!(!message.contains('\n'));
    }

    #[test]
    fn test_malformed_values() {
        for extra in [
            ["--chunk-size", "many"],
            ["--format", "pdf"],
            ["--headless", "maybe"],
        ] {
            let err = parse(&extra).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ArgumentParsing);
        }
    }

    #[test]
    fn test_help_and_version_are_informational() {
        assert!(matches!(
            parse_args(["glean", "--help"]),
            Ok(Invocation::Info(_))
        ));
        assert!(matches!(
            parse_args(["glean", "--version"]),
            Ok(Invocation::Info(_))
        ));
    }

    #[test]
    fn test_usage_reminder_has_examples() {
        let reminder = usage_reminder();
        assert!(reminder.starts_with("Usage: glean --url"));
        assert!(reminder.contains("Examples:"));
        assert!(reminder.contains("--url https://example.com/blog"));
    }

    #[test]
    fn test_summarize() {
        let rendered = "error: the following required arguments were not provided:\n  --url <URL>\n\nUsage: glean --url <URL>\n\nFor more information, try '--help'.\n";
        assert_eq!(
            summarize(rendered),
            "the following required arguments were not provided: --url <URL>"
        );
    }
}
