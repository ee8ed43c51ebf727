use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::ValueEnum;

use crate::error::WriteError;
use crate::testgen::result::GenerationResult;

/// How generated code is spread over files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputLayout {
    /// `test_<module>.py`, one file per source module
    #[default]
    Module,
    /// `test_<function>.py`, one file per function
    Function,
}

#[derive(Debug, Clone)]
pub struct WriteOptions {
    pub output_dir: PathBuf,
    pub layout: OutputLayout,
    pub overwrite: bool,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WriteReport {
    pub written: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    pub failed: Vec<String>,
}

/* ============================================================
   Console mode
   ============================================================ */

pub fn print_results(results: &[GenerationResult], out: &mut impl Write) -> Result<(), WriteError> {
    let mut emit = || -> std::io::Result<()> {
        writeln!(out, "\n--- DRY RUN: Generated Test Cases ---\n")?;
        for r in results {
            writeln!(out, "# For function: {}", r.function.name)?;
            match &r.error {
                Some(err) => writeln!(out, "❌ Error: {err}")?,
                None => writeln!(out, "{}\n", r.test_code.trim())?,
            }
        }
        writeln!(out, "--- END DRY RUN ---\n")
    };

    emit().map_err(WriteError::Console)
}

/* ============================================================
   File mode
   ============================================================ */

/// Write all successful results into `opts.output_dir`.
///
/// Results that share a target file are joined in result order and
/// written once. A target that exists before this call is left alone
/// unless `opts.overwrite` is set, in which case the new tests are
/// appended after its current content.
pub fn write_results(
    results: &[GenerationResult],
    opts: &WriteOptions,
    out: &mut impl Write,
) -> Result<WriteReport, WriteError> {
    fs::create_dir_all(&opts.output_dir).map_err(|source| WriteError::CreateDir {
        path: opts.output_dir.clone(),
        source,
    })?;

    let mut report = WriteReport::default();
    let mut groups: Vec<TargetGroup> = Vec::new();
    let mut index: HashMap<PathBuf, usize> = HashMap::new();

    for r in results {
        let name = &r.function.name;

        if let Some(err) = &r.error {
            say(out, format!("❌ Error generating tests for {name}: {err}"))?;
            report.failed.push(name.clone());
            continue;
        }
        if !r.has_code() {
            say(out, format!("⚠️ No test code returned for {name}"))?;
            continue;
        }

        let path = opts.output_dir.join(target_file_name(r, opts.layout));
        let slot = *index.entry(path.clone()).or_insert_with(|| {
            groups.push(TargetGroup::new(path));
            groups.len() - 1
        });
        groups[slot].push(name, &r.test_code);
    }

    for group in groups {
        let file_name = display_name(&group.path);

        if !opts.overwrite && group.path.exists() {
            say(
                out,
                format!("⚠️ Skipping {file_name} - file exists and --overwrite not specified"),
            )?;
            tracing::debug!(path = %group.path.display(), "kept existing file");
            report.skipped.push(group.path);
            continue;
        }

        let existed = group.path.exists();
        append_or_create(&group.path, &group.contents(), existed).map_err(|source| {
            WriteError::Write {
                path: group.path.clone(),
                source,
            }
        })?;
        if existed {
            tracing::debug!(path = %group.path.display(), "appended to existing file");
        }

        say(
            out,
            format!(
                "✅ Generated tests for {} in {file_name}",
                group.functions.join(", ")
            ),
        )?;
        report.written.push(group.path);
    }

    Ok(report)
}

pub fn target_file_name(r: &GenerationResult, layout: OutputLayout) -> String {
    let stem = match layout {
        OutputLayout::Module => r.function.module_name(),
        OutputLayout::Function => r.function.name.as_str(),
    };
    format!("test_{}.py", sanitize_name(stem))
}

/* ============================================================
   Helpers
   ============================================================ */

struct TargetGroup {
    path: PathBuf,
    functions: Vec<String>,
    chunks: Vec<String>,
}

impl TargetGroup {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            functions: Vec::new(),
            chunks: Vec::new(),
        }
    }

    fn push(&mut self, function: &str, code: &str) {
        self.functions.push(function.to_string());
        self.chunks.push(code.trim().to_string());
    }

    fn contents(&self) -> String {
        let mut body = self.chunks.join("\n\n\n");
        body.push('\n');
        body
    }
}

fn append_or_create(path: &Path, contents: &str, existed: bool) -> std::io::Result<()> {
    if !existed {
        return fs::write(path, contents);
    }

    let mut file = OpenOptions::new().append(true).open(path)?;
    let current = fs::read_to_string(path)?;
    let sep = if current.is_empty() {
        ""
    } else if current.ends_with('\n') {
        "\n\n"
    } else {
        "\n\n\n"
    };
    write!(file, "{sep}{contents}")
}

fn say(out: &mut impl Write, line: String) -> Result<(), WriteError> {
    writeln!(out, "{line}").map_err(WriteError::Console)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn sanitize_name(stem: &str) -> String {
    stem.chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::FunctionRecord;
    use pretty_assertions::assert_eq;

    fn result(file: &str, name: &str, code: &str) -> GenerationResult {
        GenerationResult::success(
            FunctionRecord {
                file: PathBuf::from(file),
                name: name.into(),
                args: Vec::new(),
                docstring: None,
                line: 1,
                is_test: false,
            },
            code.into(),
        )
    }

    fn opts(dir: &Path, layout: OutputLayout, overwrite: bool) -> WriteOptions {
        WriteOptions {
            output_dir: dir.to_path_buf(),
            layout,
            overwrite,
        }
    }

    #[test]
    fn module_layout_groups_by_source_file() {
        let dir = tempfile::tempdir().unwrap();
        let results = vec![
            result("src/calc.py", "add", "def test_add():\n    assert add(1, 2) == 3"),
            result("src/calc.py", "sub", "def test_sub():\n    assert sub(3, 2) == 1"),
            result("src/io.py", "read", "def test_read(): pass"),
        ];

        let mut console = Vec::new();
        let report = write_results(&results, &opts(dir.path(), OutputLayout::Module, false), &mut console).unwrap();

        assert_eq!(report.written.len(), 2);
        let calc = fs::read_to_string(dir.path().join("test_calc.py")).unwrap();
        assert_eq!(
            calc,
            "def test_add():\n    assert add(1, 2) == 3\n\n\ndef test_sub():\n    assert sub(3, 2) == 1\n"
        );
        assert!(dir.path().join("test_io.py").exists());

        let console = String::from_utf8(console).unwrap();
        assert!(console.contains("✅ Generated tests for add, sub in test_calc.py"));
    }

    #[test]
    fn function_layout_names_files_after_functions() {
        let dir = tempfile::tempdir().unwrap();
        let results = vec![result("calc.py", "add", "def test_add(): pass")];

        write_results(&results, &opts(dir.path(), OutputLayout::Function, false), &mut std::io::sink()).unwrap();
        assert!(dir.path().join("test_add.py").exists());
    }

    #[test]
    fn second_invocation_without_overwrite_keeps_content() {
        let dir = tempfile::tempdir().unwrap();
        let o = opts(dir.path(), OutputLayout::Module, false);
        let target = dir.path().join("test_calc.py");

        write_results(&[result("calc.py", "add", "def test_add(): pass")], &o, &mut std::io::sink()).unwrap();
        let before = fs::read_to_string(&target).unwrap();

        let report = write_results(
            &[result("calc.py", "add", "def test_add(): assert False")],
            &o,
            &mut std::io::sink(),
        )
        .unwrap();

        assert_eq!(report.skipped, vec![target.clone()]);
        assert_eq!(fs::read_to_string(&target).unwrap(), before);
    }

    #[test]
    fn overwrite_appends_after_existing_tests() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("test_calc.py");
        fs::write(&target, "def test_handwritten():\n    assert True\n").unwrap();

        let report = write_results(
            &[result("calc.py", "add", "def test_add(): pass")],
            &opts(dir.path(), OutputLayout::Module, true),
            &mut std::io::sink(),
        )
        .unwrap();

        assert_eq!(report.written, vec![target.clone()]);
        assert_eq!(
            fs::read_to_string(&target).unwrap(),
            "def test_handwritten():\n    assert True\n\n\ndef test_add(): pass\n"
        );
    }

    #[test]
    fn overwrite_separates_unterminated_content() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("test_calc.py");
        fs::write(&target, "import pytest").unwrap();

        write_results(
            &[result("calc.py", "add", "def test_add(): pass")],
            &opts(dir.path(), OutputLayout::Module, true),
            &mut std::io::sink(),
        )
        .unwrap();

        assert_eq!(
            fs::read_to_string(&target).unwrap(),
            "import pytest\n\n\ndef test_add(): pass\n"
        );
    }

    #[test]
    fn errors_and_empty_code_are_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let failed = GenerationResult::failure(result("calc.py", "add", "").function, "API error");
        let empty = result("calc.py", "sub", "   ");

        let mut console = Vec::new();
        let report = write_results(&[failed, empty], &opts(dir.path(), OutputLayout::Module, true), &mut console).unwrap();

        assert!(report.written.is_empty());
        assert_eq!(report.failed, vec!["add".to_string()]);
        assert!(!dir.path().join("test_calc.py").exists());
        assert!(String::from_utf8(console).unwrap().contains("❌ Error generating tests for add: API error"));
    }

    #[test]
    fn dry_run_prints_code_and_errors() {
        let ok = result("calc.py", "add", "def test_add():\n    assert add(1, 2) == 3\n");
        let bad = GenerationResult::failure(result("calc.py", "sub", "").function, "boom");

        let mut console = Vec::new();
        print_results(&[ok, bad], &mut console).unwrap();
        let text = String::from_utf8(console).unwrap();

        assert!(text.contains("--- DRY RUN: Generated Test Cases ---"));
        assert!(text.contains("# For function: add\ndef test_add():\n    assert add(1, 2) == 3\n"));
        assert!(text.contains("❌ Error: boom"));
        assert!(text.contains("--- END DRY RUN ---"));
    }

    #[test]
    fn odd_module_names_are_sanitized() {
        let r = result("pkg/my-module.py", "f", "x");
        assert_eq!(target_file_name(&r, OutputLayout::Module), "test_my_module.py");
    }
}
