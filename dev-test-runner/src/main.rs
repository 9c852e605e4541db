//! Fixture runner: compiles every `fixtures/*/schema.json` and compares the
//! result with `expected.json` (model) or `expected-error.txt` (substring of
//! the error message). A `settings.json` next to the schema is honored.
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use colored::Colorize;
use json_typemodel::{Compiler, Settings};
use serde_json::Value;

fn main() {
    let root = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| Path::new(env!("CARGO_MANIFEST_DIR")).join("../fixtures"));
    let pattern = format!("{}/*/schema.json", root.display());

    let mut failed = 0usize;
    let mut total = 0usize;
    for entry in glob::glob(&pattern).expect("valid glob pattern") {
        let schema_path = match entry {
            Ok(p) => p,
            Err(error) => {
                eprintln!("❌ {error}");
                failed += 1;
                continue;
            }
        };
        total += 1;
        let case_dir = schema_path.parent().unwrap_or(Path::new("."));
        match run_case(case_dir, &schema_path) {
            Ok(()) => eprintln!("{} {}", "✅ success".green(), case_dir.display()),
            Err(error) => {
                failed += 1;
                eprintln!("{} {}: {error:#}", "❌ failed".red(), case_dir.display());
            }
        }
    }

    eprintln!("—— {} case(s), {} failed ——", total, failed);
    if failed > 0 || total == 0 {
        std::process::exit(1);
    }
}

fn run_case(case_dir: &Path, schema_path: &Path) -> anyhow::Result<()> {
    let settings = Settings::load(&case_dir.join("settings.json"))?;
    let compiler = Compiler::new(settings.compile_options());
    let document: Value = read_json(schema_path)?;
    let result = compiler.compile(&document);

    let expected_model = case_dir.join("expected.json");
    let expected_error = case_dir.join("expected-error.txt");
    match result {
        Ok(model) if expected_model.exists() => {
            let expected = read_json(&expected_model)?;
            let actual = serde_json::to_value(&model)?;
            if actual != expected {
                bail!(
                    "model mismatch\n—— expected ——\n{}\n—— actual ——\n{}",
                    serde_json::to_string_pretty(&expected)?,
                    serde_json::to_string_pretty(&actual)?
                );
            }
            Ok(())
        }
        Err(error) if expected_error.exists() => {
            let needle = std::fs::read_to_string(&expected_error)?;
            let message = error.to_string();
            if !message.contains(needle.trim()) {
                bail!("error mismatch: expected `{}` in `{message}`", needle.trim());
            }
            Ok(())
        }
        Ok(_) => bail!("compiled, but the case expects an error"),
        Err(error) => bail!("unexpected error: {error}"),
    }
}

fn read_json(path: &Path) -> anyhow::Result<Value> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&source).with_context(|| format!("failed to parse {}", path.display()))
}
