use crate::discovery::FunctionRecord;

pub const DOCSTRING_PLACEHOLDER: &str = "No docstring available";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmPrompt {
    pub system: String,
    pub user: String,
}

pub fn build_prompt(function: &FunctionRecord) -> LlmPrompt {
    LlmPrompt {
        system: system_prompt(),
        user: user_prompt(function),
    }
}

/* ============================================================
   System prompt (stable, reused)
   ============================================================ */

fn system_prompt() -> String {
    "You are a helpful assistant.".to_string()
}

/* ============================================================
   User prompt (derived from FunctionRecord)
   ============================================================ */

fn user_prompt(f: &FunctionRecord) -> String {
    // docstring text is embedded as-is, quotes included
    let docstring = f
        .docstring
        .as_deref()
        .filter(|d| !d.is_empty())
        .unwrap_or(DOCSTRING_PLACEHOLDER);

    format!(
        r#"Write pytest test cases for the following Python function:

Function signature:
```python
def {name}({args}):
    """{docstring}"""
```

Requirements:
1. Write at least 3 test cases that cover different scenarios
2. Use descriptive test names that indicate what's being tested
3. Include assertions that verify the function's behavior
4. Follow pytest best practices
5. If the function has type hints, use appropriate test data types

Return only the test code, without any additional text or explanations.
"#,
        name = f.name,
        args = format_args_list(f),
    )
}

/// `a: int, b: Any`; unannotated parameters render as `Any`.
pub fn format_args_list(f: &FunctionRecord) -> String {
    f.args
        .iter()
        .map(|a| format!("{}: {}", a.name, a.annotation.as_deref().unwrap_or("Any")))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::ArgSpec;
    use std::path::PathBuf;

    fn add() -> FunctionRecord {
        FunctionRecord {
            file: PathBuf::from("sample.py"),
            name: "add".into(),
            args: vec![ArgSpec::new("a", Some("int")), ArgSpec::new("b", Some("int"))],
            docstring: Some("Add two numbers".into()),
            line: 1,
            is_test: false,
        }
    }

    #[test]
    fn prompt_embeds_signature_and_docstring() {
        let p = build_prompt(&add());
        assert_eq!(p.system, "You are a helpful assistant.");
        assert!(p.user.contains("def add(a: int, b: int)"));
        assert!(p.user.contains("\"\"\"Add two numbers\"\"\""));
        assert!(p.user.contains("Write pytest test cases"));
        assert!(p.user.contains("Return only the test code"));
    }

    #[test]
    fn missing_annotation_and_docstring_use_placeholders() {
        let mut f = add();
        f.args = vec![ArgSpec::new("x", None), ArgSpec::new("y", Some("float"))];
        f.docstring = None;

        let p = build_prompt(&f);
        assert!(p.user.contains("def add(x: Any, y: float):"));
        assert!(p.user.contains(DOCSTRING_PLACEHOLDER));
    }

    #[test]
    fn no_args_renders_empty_parens() {
        let mut f = add();
        f.args.clear();
        assert!(build_prompt(&f).user.contains("def add():"));
    }
}
