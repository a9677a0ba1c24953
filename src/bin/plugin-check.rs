//! plugin-check - validates captured plugin output.
//!
//! Reads the output of one plugin run (from a file or stdin), parses it the
//! same way the agent does and prints the resulting metrics. Exits with a
//! non-zero status on the first invalid line, since the agent would publish
//! nothing for such a plugin.

use tikv_jemallocator::Jemalloc;
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::{Level, debug, error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use hostmetrics::metric::MetricRecord;
use hostmetrics::plugin::{OutputFormat, PluginOutputParser};

/// Plugin output validator.
#[derive(Parser)]
#[command(name = "plugin-check", about = "Validate captured plugin output", version)]
struct Args {
    /// Plugin path as configured in the agent. Paths containing ".prom" are
    /// parsed as exposition format, anything else as tab-separated lines.
    #[arg(short, long)]
    path: String,

    /// Prefix applied to counter and gauge names.
    #[arg(long, default_value = "")]
    prefix: String,

    /// File holding the captured output. Reads stdin when omitted.
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Print metrics as JSON lines.
    #[arg(long)]
    json: bool,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

/// Initializes the tracing subscriber with the appropriate log level.
/// Default level is INFO. Use -q for quiet mode (errors only).
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Reads the captured plugin output from `input`, or stdin.
fn read_input(input: Option<&Path>) -> io::Result<String> {
    match input {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Renders one metric for printing.
fn render(metric: &MetricRecord, json: bool) -> Result<String, serde_json::Error> {
    if json {
        serde_json::to_string(metric)
    } else {
        Ok(format!("{}\t{}", metric.metric_type, metric))
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    let format = OutputFormat::from_path(&args.path);
    debug!(path = %args.path, ?format, prefix = %args.prefix, "checking plugin output");

    let output = match read_input(args.input.as_deref()) {
        Ok(output) => output,
        Err(e) => {
            error!("Failed to read plugin output: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let metrics = match PluginOutputParser::new().parse(format, &args.prefix, &output) {
        Ok(metrics) => metrics,
        Err(e) => {
            error!("Plugin output rejected: {}", e);
            return ExitCode::FAILURE;
        }
    };

    for metric in &metrics {
        match render(metric, args.json) {
            Ok(line) => println!("{}", line),
            Err(e) => {
                error!("Failed to render metric {}: {}", metric.key, e);
                return ExitCode::FAILURE;
            }
        }
    }

    info!("{} metrics OK", metrics.len());
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostmetrics::metric::MetricType;
    use std::io::Write;

    #[test]
    fn read_input_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "a\tgauge\t1").unwrap();

        let output = read_input(Some(file.path())).unwrap();
        assert_eq!(output, "a\tgauge\t1\n");
    }

    #[test]
    fn read_input_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_input(Some(dir.path().join("missing.out").as_path())).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn render_text_and_json() {
        let metric = MetricRecord {
            key: "plugin_link_bytes".to_string(),
            metric_type: MetricType::Counter,
            value: "10".to_string(),
            help: "link_bytes".to_string(),
            label: Some("{nic=\"net0\"}".to_string()),
        };

        assert_eq!(
            render(&metric, false).unwrap(),
            "counter\tplugin_link_bytes{nic=\"net0\"} 10"
        );
        assert_eq!(
            render(&metric, true).unwrap(),
            concat!(
                r#"{"key":"plugin_link_bytes","type":"counter","value":"10","#,
                r#""help":"link_bytes","label":"{nic=\"net0\"}"}"#
            )
        );
    }

    #[test]
    fn args_parse() {
        let args = Args::parse_from([
            "plugin-check",
            "--path",
            "/opt/plugins/app.prom",
            "--prefix",
            "plugin_app_",
            "-vv",
        ]);
        assert_eq!(args.path, "/opt/plugins/app.prom");
        assert_eq!(args.prefix, "plugin_app_");
        assert_eq!(args.verbose, 2);
        assert!(args.input.is_none());
        assert!(!args.json);
    }
}
