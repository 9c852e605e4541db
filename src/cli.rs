//! Minimal CLI: compile schema documents → type model JSON
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use rayon::prelude::*;

use crate::config::Settings;
use crate::ir::TypeModel;
use crate::Compiler;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// compile JSON schema documents into a resolved type model for code emitters
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// validate, resolve and collect each schema; write one model per schema
    Compile(CompileOut),
    /// print the bundled meta-schema
    MetaSchema,
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// One or more schema files. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,

    /// settings document with type/include map overrides and the formatter command
    #[arg(long, default_value = "settings.json")]
    settings: PathBuf,
}

#[derive(clap::Parser, Debug)]
struct CompileOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output directory ('-' prints to stdout)
    #[arg(short, long, default_value = "out")]
    out: PathBuf,

    /// skip the formatter command from the settings file
    #[arg(long)]
    no_format: bool,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> anyhow::Result<()> {
        match &self.cmd {
            Command::Compile(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(());
                }
                target.run()
            }
            Command::MetaSchema => {
                println!("{}", crate::meta::BUNDLED_META_SCHEMA_SRC);
                Ok(())
            }
        }
    }
}

impl CompileOut {
    fn run(&self) -> anyhow::Result<()> {
        let settings = Settings::load(&self.input_settings.settings)?;
        let compiler = Compiler::new(settings.compile_options());
        let source_paths = resolve_file_path_patterns(&self.input_settings.input)
            .map_err(|error| anyhow!("failed to resolve input file paths: {error}"))?;

        // compiles share nothing, so run them side by side
        let results = source_paths
            .par_iter()
            .map(|path| (path, compile_file(&compiler, path)))
            .collect::<Vec<_>>();

        let mut failures = 0usize;
        for (source_path, result) in results {
            let outcome = result.and_then(|model| self.write_model(&settings, source_path, &model));
            match outcome {
                Ok(()) => eprintln!("{} {}", "✅".green(), source_path.display()),
                Err(error) => {
                    failures += 1;
                    eprintln!("{} {}: {error:#}", "❌ failed".red(), source_path.display());
                }
            }
        }
        if failures > 0 {
            bail!("{failures} of {} schema(s) failed", source_paths.len());
        }
        Ok(())
    }

    fn write_model(&self, settings: &Settings, source_path: &Path, model: &TypeModel) -> anyhow::Result<()> {
        let model_src = serde_json::to_string_pretty(model)?;
        if self.out.as_os_str() == "-" {
            println!("{model_src}");
            return Ok(());
        }
        std::fs::create_dir_all(&self.out)
            .with_context(|| format!("failed to create output directory {}", self.out.display()))?;
        let out_path = settings.output_path_for(source_path, &self.out);
        std::fs::write(&out_path, &model_src)
            .with_context(|| format!("failed to write {}", out_path.display()))?;
        log::info!("wrote {}", out_path.display());

        if !self.no_format {
            run_formatter(&settings.formatter_command_for(&out_path))?;
        }
        Ok(())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn compile_file(compiler: &Compiler, source_path: &Path) -> anyhow::Result<TypeModel> {
    let source_path_str = source_path.to_string_lossy().to_string();
    let source = std::fs::read_to_string(source_path)
        .with_context(|| format!("failed to read source file {source_path_str}"))?;
    let document = serde_json::from_str::<serde_json::Value>(&source)
        .with_context(|| format!("failed to parse JSON source file ({source_path_str})"))?;
    let model = compiler.compile(&document)?;
    Ok(model)
}

fn run_formatter(command: &[String]) -> anyhow::Result<()> {
    let Some((program, args)) = command.split_first() else {
        return Ok(());
    };
    log::debug!("running formatter: {}", command.join(" "));
    let status = std::process::Command::new(program)
        .args(args)
        .status()
        .with_context(|| format!("failed to run formatter `{program}`"))?;
    if !status.success() {
        bail!("formatter `{}` exited with {status}", command.join(" "));
    }
    Ok(())
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{' ))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            // Treat as a glob pattern
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                match entry {
                    Ok(p) => {
                        matched_any = true;
                        out.push(p);
                    }
                    Err(e) => return Err(Box::new(e)),
                }
            }
            if !matched_any {
                // Pattern was explicitly a glob but matched nothing -> surface as an error
                return Err(format!("glob pattern matched no files: {pattern}").into());
            }
        } else {
            // Treat as a literal path
            let path = PathBuf::from(pattern);
            if !path.exists() {
                return Err(format!("file {pattern} does not exist").into());
            }
            out.push(path);
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_missing_path_is_an_error() {
        let err = resolve_file_path_patterns(["no/such/schema.json"]).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn glob_without_matches_is_an_error() {
        let err = resolve_file_path_patterns(["no/such/dir/*.json"]).unwrap_err();
        assert!(err.to_string().contains("matched no files"));
    }

    #[test]
    fn empty_formatter_is_a_no_op() {
        run_formatter(&[]).unwrap();
    }

    #[test]
    fn cli_parses_compile_flags() {
        let cli = CommandLineInterface::try_parse_from([
            "json-typemodel", "compile", "--input", "a.json", "b/*.json", "--out", "-", "--no-format",
        ])
        .unwrap();
        match cli.cmd {
            Command::Compile(target) => {
                assert_eq!(target.input_settings.input, ["a.json", "b/*.json"]);
                assert_eq!(target.out, PathBuf::from("-"));
                assert!(target.no_format);
                assert_eq!(target.input_settings.settings, PathBuf::from("settings.json"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
