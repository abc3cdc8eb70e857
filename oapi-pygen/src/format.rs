//! Post-processing of generated code with external Python formatters.

use std::{
    ffi::OsString,
    io::Write,
    path::{Path, PathBuf},
    process::{Command, ExitStatus, Stdio},
    thread,
};

use derive_more::{Display, Error};
use log::{debug, warn};

#[derive(Debug, Display, Error)]
pub enum FormatError {
    #[display(fmt = "`{}` not found on PATH: {}", tool, source)]
    Missing {
        tool: &'static str,
        source: which::Error,
    },

    #[display(fmt = "Failed to run `{}`: {}", tool, source)]
    Spawn {
        tool: &'static str,
        source: std::io::Error,
    },

    #[display(fmt = "`{}` exited with {}: {}", tool, status, stderr)]
    Failed {
        tool: &'static str,
        status: ExitStatus,
        stderr: String,
    },

    #[display(fmt = "`{}` produced invalid UTF-8: {}", tool, source)]
    Encoding {
        tool: &'static str,
        source: std::string::FromUtf8Error,
    },
}

pub trait CodeFormatter {
    fn name(&self) -> &'static str;
    fn format_code(&self, code: &str) -> Result<String, FormatError>;
}

/// Which formatter to run over generated files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatterKind {
    /// `yapf` and `isort` when both are installed, otherwise no formatting.
    #[default]
    Auto,
    Yapf,
    Black,
    None,
}

impl FormatterKind {
    /// Builds the formatter, reading tool settings from `settings_dir`.
    pub fn build(self, settings_dir: &Path) -> Result<Box<dyn CodeFormatter>, FormatError> {
        Ok(match self {
            FormatterKind::Auto => match Yapf::locate(settings_dir) {
                Ok(yapf) => Box::new(yapf),
                Err(e) => {
                    warn!("{}, generated code is left unformatted", e);
                    Box::new(Passthrough)
                }
            },
            FormatterKind::Yapf => Box::new(Yapf::locate(settings_dir)?),
            FormatterKind::Black => Box::new(Black::locate(settings_dir)?),
            FormatterKind::None => Box::new(Passthrough),
        })
    }
}

/// Leaves code untouched.
pub struct Passthrough;

impl CodeFormatter for Passthrough {
    fn name(&self) -> &'static str {
        "none"
    }

    fn format_code(&self, code: &str) -> Result<String, FormatError> {
        Ok(code.to_owned())
    }
}

pub struct Yapf {
    yapf: PathBuf,
    isort: Isort,
    style: Option<PathBuf>,
}

impl Yapf {
    pub fn locate(settings_dir: &Path) -> Result<Self, FormatError> {
        let pyproject = settings_dir.join("pyproject.toml");
        Ok(Yapf {
            yapf: locate("yapf")?,
            isort: Isort::locate(settings_dir)?,
            style: pyproject.is_file().then_some(pyproject),
        })
    }
}

impl CodeFormatter for Yapf {
    fn name(&self) -> &'static str {
        "yapf"
    }

    fn format_code(&self, code: &str) -> Result<String, FormatError> {
        let mut args: Vec<OsString> = vec![];
        if let Some(style) = &self.style {
            args.push("--style".into());
            args.push(style.into());
        }
        let code = run_tool("yapf", &self.yapf, &args, code)?;
        self.isort.format_code(&code)
    }
}

pub struct Black {
    black: PathBuf,
    isort: Isort,
}

impl Black {
    pub fn locate(settings_dir: &Path) -> Result<Self, FormatError> {
        Ok(Black {
            black: locate("black")?,
            isort: Isort::locate(settings_dir)?,
        })
    }
}

impl CodeFormatter for Black {
    fn name(&self) -> &'static str {
        "black"
    }

    fn format_code(&self, code: &str) -> Result<String, FormatError> {
        let code = run_tool("black", &self.black, &["-q".into(), "-".into()], code)?;
        self.isort.format_code(&code)
    }
}

struct Isort {
    isort: PathBuf,
    settings_dir: PathBuf,
}

impl Isort {
    fn locate(settings_dir: &Path) -> Result<Self, FormatError> {
        Ok(Isort {
            isort: locate("isort")?,
            settings_dir: settings_dir.to_owned(),
        })
    }

    fn format_code(&self, code: &str) -> Result<String, FormatError> {
        let args: [OsString; 3] = [
            "-".into(),
            "--settings-path".into(),
            self.settings_dir.as_os_str().to_owned(),
        ];
        run_tool("isort", &self.isort, &args, code)
    }
}

fn locate(tool: &'static str) -> Result<PathBuf, FormatError> {
    which::which(tool).map_err(|source| FormatError::Missing { tool, source })
}

/// Pipes `code` through `program` and returns what it prints.
fn run_tool(
    tool: &'static str,
    program: &Path,
    args: &[OsString],
    code: &str,
) -> Result<String, FormatError> {
    debug!("running {} {:?}", program.display(), args);
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| FormatError::Spawn { tool, source })?;

    // written from another thread so a full stdout pipe cannot block us
    let stdin = child.stdin.take();
    let input = code.to_owned();
    let writer = thread::spawn(move || match stdin {
        Some(mut stdin) => stdin.write_all(input.as_bytes()),
        None => Ok(()),
    });

    let output = child
        .wait_with_output()
        .map_err(|source| FormatError::Spawn { tool, source })?;
    if let Ok(Err(e)) = writer.join() {
        debug!("{} closed its input early: {}", tool, e);
    }

    if !output.status.success() {
        return Err(FormatError::Failed {
            tool,
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        });
    }
    String::from_utf8(output.stdout).map_err(|source| FormatError::Encoding { tool, source })
}

/// Trims trailing whitespace down to a single final newline.
pub fn ensure_final_newline(code: &str) -> String {
    format!("{}\n", code.trim_end())
}
