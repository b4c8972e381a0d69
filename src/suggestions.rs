//! # Error Suggestions
//!
//! Helpers that turn library errors into messages telling the user what
//! went wrong AND how to fix it.
//!
//! ```rust,ignore
//! use gism::suggestions;
//!
//! return Err(suggestions::manifest_not_found(&path, template.as_deref()));
//! ```

use std::path::Path;

use crate::error::Error;
use crate::orchestrator::RunReport;

/// Generate an error for a missing manifest with no template to seed it.
pub fn manifest_not_found(path: &Path, template: Option<&str>) -> anyhow::Error {
    let template_hint = match template {
        Some(t) => format!("hint: Create {t} to have the manifest seeded from it\n"),
        None => String::new(),
    };
    anyhow::anyhow!(
        "Manifest not found: {path}\n\n\
         hint: Create {path} with lines like `all http://svn.example.com/lib/trunk lib trunk`\n\
         {template_hint}\
         hint: Use --modules to point at another manifest, or --template to seed one",
        path = path.display()
    )
}

/// Generate an error for `--vars` that is not a usable JSON object.
pub fn invalid_variables(raw: &str, error: &Error) -> anyhow::Error {
    anyhow::anyhow!(
        "Invalid --vars value: {raw}\n\
         error: {error}\n\n\
         hint: Pass a JSON object of strings, e.g. --vars '{{\"BRANCH\": \"release-1.2\"}}'"
    )
}

/// Generate the final error for a run that left entries behind.
pub fn run_incomplete(report: &RunReport) -> anyhow::Error {
    let mut message = format!(
        "{} entr{} failed, {} unreachable",
        report.failures.len(),
        if report.failures.len() == 1 { "y" } else { "ies" },
        report.unreachable.len()
    );
    for failure in &report.failures {
        message.push_str(&format!(
            "\n  {} ({}:{}): {}",
            failure.destination,
            failure.manifest.display(),
            failure.line,
            failure.message
        ));
    }
    for url in &report.unreachable {
        message.push_str(&format!("\n  unreachable: {url}"));
    }
    if report
        .failures
        .iter()
        .any(|f| f.message.contains("svn") || f.message.contains("Fallback"))
    {
        message.push_str("\n\nhint: to log in to svn, ask your administrator for credentials");
    }
    message.push_str("\nhint: Rerun with --fail-fast to stop at the first failure");
    anyhow::anyhow!(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::EntryFailure;
    use std::path::PathBuf;

    #[test]
    fn test_manifest_not_found_mentions_template() {
        let err = manifest_not_found(Path::new("modules.txt"), Some("modules.txt.template"));
        let msg = err.to_string();
        assert!(msg.contains("Manifest not found: modules.txt"));
        assert!(msg.contains("Create modules.txt.template"));
        assert!(msg.contains("--template"));
    }

    #[test]
    fn test_invalid_variables_shows_example() {
        let error = Error::Template {
            message: "variables must be a JSON object".to_string(),
            variable: None,
        };
        let msg = invalid_variables("[1]", &error).to_string();
        assert!(msg.contains("Invalid --vars value: [1]"));
        assert!(msg.contains("\"BRANCH\""));
    }

    #[test]
    fn test_run_incomplete_lists_failures() {
        let report = RunReport {
            processed: 1,
            skipped: 0,
            unreachable: vec!["http://down/repo".to_string()],
            failures: vec![EntryFailure {
                manifest: PathBuf::from("modules.txt"),
                line: 4,
                destination: "lib".to_string(),
                message: "Fallback checkout of http://svn/lib into lib failed".to_string(),
            }],
        };
        let msg = run_incomplete(&report).to_string();
        assert!(msg.starts_with("1 entry failed, 1 unreachable"));
        assert!(msg.contains("lib (modules.txt:4)"));
        assert!(msg.contains("unreachable: http://down/repo"));
        assert!(msg.contains("ask your administrator"));
    }
}
