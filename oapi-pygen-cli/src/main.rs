//! `oapi-pygen`: generate a typed Python API client package from an OpenAPI document.
//!
//! ```bash
//! oapi-pygen -i petstore.yaml -o petstore_client -p PetStore -b https://petstore.example.com/v1
//! ```

use std::{
    env, fs,
    io::{self, Read},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{ArgAction, CommandFactory, Parser, ValueEnum, ValueHint};
use clap_complete::Shell;
use oapi_pygen::{config::CodegenConfig, format::FormatterKind, Generator, GeneratorOptions};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const BIN_NAME: &str = "oapi-pygen";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Formatter {
    /// yapf and isort when installed, unformatted otherwise
    Auto,
    Yapf,
    Black,
    None,
}

impl From<Formatter> for FormatterKind {
    fn from(f: Formatter) -> Self {
        match f {
            Formatter::Auto => FormatterKind::Auto,
            Formatter::Yapf => FormatterKind::Yapf,
            Formatter::Black => FormatterKind::Black,
            Formatter::None => FormatterKind::None,
        }
    }
}

/// Generate a typed Python API client package from an OpenAPI document
#[derive(Debug, Parser)]
#[command(name = BIN_NAME, version, about, long_about = None)]
struct Cli {
    /// OpenAPI document (JSON or YAML), `-` for stdin
    #[arg(
        short,
        long,
        value_hint = ValueHint::FilePath,
        required_unless_present_any = ["show_completion", "install_completion"]
    )]
    input: Option<PathBuf>,

    /// Directory the package is written to, created when missing
    #[arg(
        short,
        long,
        value_hint = ValueHint::DirPath,
        required_unless_present_any = ["show_completion", "install_completion"]
    )]
    output: Option<PathBuf>,

    /// Templates replacing the built-in client, endpoints and `__init__` files
    #[arg(short, long, value_hint = ValueHint::DirPath)]
    template_dir: Option<PathBuf>,

    /// Base URL of the API
    #[arg(short = 'b', long = "base_url", default_value = "")]
    base_url: String,

    /// Client class prefix: "My" names the client MyAPIClient
    #[arg(short, long, default_value = "My")]
    prefix: String,

    /// Base class for the client class
    #[arg(short = 'a', long = "base_api_cls", default_value = "apiclient.APIClient")]
    base_api_cls: String,

    /// Formatter applied to the generated files
    #[arg(long, value_enum, default_value_t = Formatter::Auto)]
    formatter: Formatter,

    /// pyproject.toml with a [tool.datamodel-codegen] section [default: ./pyproject.toml]
    #[arg(long, value_hint = ValueHint::FilePath, env = "OAPI_PYGEN_CONFIG")]
    config: Option<PathBuf>,

    /// Print the completion script for SHELL
    #[arg(long, value_name = "SHELL", conflicts_with = "install_completion")]
    show_completion: Option<Shell>,

    /// Install the completion script for SHELL in the user data directory
    #[arg(long, value_name = "SHELL")]
    install_completion: Option<Shell>,

    /// Log more (-v debug, -vv trace); RUST_LOG is used otherwise
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Some(shell) = cli.show_completion {
        clap_complete::generate(shell, &mut Cli::command(), BIN_NAME, &mut io::stdout());
        return Ok(());
    }
    if let Some(shell) = cli.install_completion {
        let path = install_completion(shell)?;
        println!("Installed {} completion to {}", shell, path.display());
        return Ok(());
    }

    let (Some(input), Some(output)) = (&cli.input, &cli.output) else {
        anyhow::bail!("--input and --output are required");
    };

    let (input_name, text) = read_input(input)?;
    let (config, settings_dir) = load_config(cli.config.as_deref())?;

    let options = GeneratorOptions {
        base_url: cli.base_url.clone(),
        prefix: cli.prefix.clone(),
        base_api_cls: cli.base_api_cls.clone(),
        template_dir: cli.template_dir.clone(),
        config,
    };
    let formatter = FormatterKind::from(cli.formatter)
        .build(&settings_dir)
        .context("Failed to set up the formatter")?;
    debug!("formatting with {}", formatter.name());

    let written = Generator::new(options)
        .with_formatter(formatter)
        .generate(&input_name, &text, output)
        .with_context(|| format!("Failed to generate a client from {}", input_name))?;
    for path in written {
        info!("wrote {}", path.display());
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn read_input(input: &Path) -> Result<(String, String)> {
    if input == Path::new("-") {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read the document from stdin")?;
        return Ok(("<stdin>".to_owned(), text));
    }
    let text = fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string());
    Ok((name, text))
}

/// Loads the explicit config file, or `./pyproject.toml` when present. Returns the
/// directory formatters read their settings from.
fn load_config(path: Option<&Path>) -> Result<(CodegenConfig, PathBuf)> {
    let cwd = env::current_dir().context("Failed to get the working directory")?;
    let path = match path {
        Some(path) => Some(path.to_owned()),
        None => Some(cwd.join("pyproject.toml")).filter(|p| p.is_file()),
    };
    match path {
        Some(path) => {
            let config = CodegenConfig::from_pyproject(&path)?;
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_owned)
                .unwrap_or(cwd);
            Ok((config, dir))
        }
        None => Ok((CodegenConfig::default(), cwd)),
    }
}

fn install_completion(shell: Shell) -> Result<PathBuf> {
    let dir = dirs::data_dir()
        .context("No user data directory on this platform")?
        .join(BIN_NAME)
        .join("completions");
    fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    clap_complete::generate_to(shell, &mut Cli::command(), BIN_NAME, &dir)
        .with_context(|| format!("Failed to write completion to {}", dir.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli_structure() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_underscored_flag_spellings() {
        let cli = Cli::try_parse_from([
            BIN_NAME,
            "-i",
            "api.yaml",
            "-o",
            "out",
            "--base_url",
            "https://api",
            "--base_api_cls",
            "pkg.Base",
            "-p",
            "Pet",
        ])
        .expect("valid arguments");
        assert_eq!(cli.base_url, "https://api");
        assert_eq!(cli.base_api_cls, "pkg.Base");
        assert_eq!(cli.prefix, "Pet");
        assert_eq!(cli.formatter, Formatter::Auto);
    }

    #[test]
    fn completion_needs_no_input() {
        let cli = Cli::try_parse_from([BIN_NAME, "--show-completion", "bash"]).expect("valid");
        assert_eq!(cli.show_completion, Some(Shell::Bash));
        assert!(Cli::try_parse_from([BIN_NAME, "-o", "out"]).is_err());
    }

    #[test]
    fn loads_explicit_config_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("custom.toml");
        fs::write(&path, "[tool.datamodel-codegen]\nsnake-case-field = true\n").expect("write");

        let (config, settings_dir) = load_config(Some(&path)).expect("config");
        assert!(config.snake_case_field);
        assert_eq!(settings_dir, dir.path());
    }
}
