use gnss_adjustment::api::{AdjustmentReport, CsvFormatter, JsonFormatter, NetworkFile, OutputFormat, TextFormatter};
use gnss_adjustment::{AdjustmentConfig, NetworkAdjuster};
use tracing::error;
use tracing_subscriber::EnvFilter;

struct CliArgs {
    network_path: String,
    config_path: Option<String>,
    format: OutputFormat,
}

enum Command {
    Run(CliArgs),
    Help,
}

fn usage(program: &str) -> String {
    format!(
        "Usage: {} <network.json> [--config <config.json>] [--format text|json|csv]",
        program
    )
}

fn parse_args(args: &[String]) -> Result<Command, Box<dyn std::error::Error>> {
    let program = args.first().map_or("gnss-adjust", |s| s.as_str());
    let mut network_path = None;
    let mut config_path = None;
    let mut format = OutputFormat::default();

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let value = iter.next().ok_or("--config requires a path")?;
                config_path = Some(value.clone());
            }
            "--format" => {
                let value = iter.next().ok_or("--format requires a value")?;
                format = value.parse()?;
            }
            "-h" | "--help" => return Ok(Command::Help),
            other if other.starts_with("--") => {
                eprintln!("{}", usage(program));
                return Err(format!("unknown option {}", other).into());
            }
            path => {
                if network_path.replace(path.to_string()).is_some() {
                    eprintln!("{}", usage(program));
                    return Err("only one network file may be given".into());
                }
            }
        }
    }

    let network_path = network_path.ok_or_else(|| {
        eprintln!("{}", usage(program));
        "missing network file"
    })?;

    Ok(Command::Run(CliArgs {
        network_path,
        config_path,
        format,
    }))
}

fn run(args: CliArgs) -> Result<String, Box<dyn std::error::Error>> {
    let config = match &args.config_path {
        Some(path) => AdjustmentConfig::from_file(path)?,
        None => AdjustmentConfig::default(),
    };

    let network = NetworkFile::from_file(&args.network_path)?.into_network()?;
    let result = NetworkAdjuster::new(config).adjust(&network)?;
    let report = AdjustmentReport::new(&network, &result);

    let output = match args.format {
        OutputFormat::Text => TextFormatter::new().format_text(&report),
        OutputFormat::Json => JsonFormatter::pretty().format_json(&report)?,
        OutputFormat::Csv => CsvFormatter::new().format_csv(&report),
    };
    Ok(output)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let cli = match parse_args(&args)? {
        Command::Run(cli) => cli,
        Command::Help => {
            println!("{}", usage(args.first().map_or("gnss-adjust", |s| s.as_str())));
            return Ok(());
        }
    };

    match run(cli) {
        Ok(output) => {
            print!("{}", output);
            Ok(())
        }
        Err(e) => {
            error!("adjustment failed: {}", e);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args_with_options() {
        let cli = match parse_args(&args(&["gnss-adjust", "net.json", "--format", "csv", "--config", "c.json"])).unwrap() {
            Command::Run(cli) => cli,
            Command::Help => panic!("expected a run command"),
        };
        assert_eq!(cli.network_path, "net.json");
        assert_eq!(cli.config_path.as_deref(), Some("c.json"));
        assert_eq!(cli.format, OutputFormat::Csv);
    }

    #[test]
    fn test_help_flag_returns_help_without_network_file() {
        assert!(matches!(parse_args(&args(&["gnss-adjust", "--help"])), Ok(Command::Help)));
        assert!(matches!(parse_args(&args(&["gnss-adjust", "net.json", "-h"])), Ok(Command::Help)));
    }

    #[test]
    fn test_parse_args_rejects_missing_file_and_bad_format() {
        assert!(parse_args(&args(&["gnss-adjust"])).is_err());
        assert!(parse_args(&args(&["gnss-adjust", "net.json", "--format", "xml"])).is_err());
        assert!(parse_args(&args(&["gnss-adjust", "net.json", "--config"])).is_err());
    }

    #[test]
    fn test_run_on_network_file() {
        let json = r#"{
            "points": [
                { "name": "A", "x": 0.0, "y": 0.0, "z": 0.0, "role": "fixed" },
                { "name": "P", "x": 300.0, "y": 400.0, "z": 0.0, "role": "free" }
            ],
            "observations": [
                { "from": "A", "to": "P", "distance_m": 500.0, "distance_sigma_m": 0.005,
                  "azimuth_deg": 53.13010235415598, "azimuth_sigma_arcsec": 2.0,
                  "zenith_deg": 90.0, "zenith_sigma_arcsec": 3.0 }
            ]
        }"#;
        let path = std::env::temp_dir().join(format!("gnss_adjust_cli_{}.json", std::process::id()));
        std::fs::write(&path, json).unwrap();

        let output = run(CliArgs {
            network_path: path.to_string_lossy().to_string(),
            config_path: None,
            format: OutputFormat::Csv,
        })
        .unwrap();
        let _ = std::fs::remove_file(&path);

        assert!(output.starts_with("name,role,"));
        assert!(output.contains("P,free,300.0000,400.0000,"));
    }
}
