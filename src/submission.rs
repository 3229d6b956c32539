//! Workflow submission bundles.
//!
//! A submission names its primary workflow document either as a remote URL or
//! as a local file. The two are mutually exclusive and resolved from the
//! syntax of the argument alone.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::transport::FormData;

static URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:http|ftp)s?://(?:(?:[A-Z0-9](?:[A-Z0-9-]{0,61}[A-Z0-9])?\.)+(?:[A-Z]{2,6}\.?|[A-Z0-9-]{2,}\.?)|localhost|\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})(?::\d+)?(?:/?|[/?]\S+)$",
    )
    .expect("URL pattern is valid")
});

/// Whether `value` looks like a remote http(s) or ftp(s) URL.
pub fn is_url(value: &str) -> bool {
    URL_PATTERN.is_match(value)
}

/// Primary workflow document of a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowSource {
    /// Sent as `workflowUrl`; the engine fetches it
    Url(String),
    /// Sent as `workflowSource`; the file content is uploaded
    File(PathBuf),
}

impl WorkflowSource {
    pub fn resolve(workflow: &str) -> Self {
        if is_url(workflow) {
            WorkflowSource::Url(workflow.to_string())
        } else {
            WorkflowSource::File(PathBuf::from(workflow))
        }
    }

    /// Add exactly one of `workflowUrl` / `workflowSource` to the form.
    pub fn add_to(&self, form: FormData) -> FormData {
        match self {
            WorkflowSource::Url(url) => form.text("workflowUrl", Some(url.as_str())),
            WorkflowSource::File(path) => form.file("workflowSource", Some(path.as_path())),
        }
    }
}

/// Workflow description language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Language {
    Wdl,
    Cwl,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::Wdl => write!(f, "WDL"),
            Language::Cwl => write!(f, "CWL"),
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "WDL" => Ok(Language::Wdl),
            "CWL" => Ok(Language::Cwl),
            other => Err(format!("unsupported workflow language `{}` (expected WDL or CWL)", other)),
        }
    }
}

/// Language version as the engine expects it.
///
/// CWL versions carry a `v` prefix (`1.0` becomes `v1.0`); other languages
/// are passed through.
pub fn language_version_for(language: Option<Language>, version: &str) -> String {
    match language {
        Some(Language::Cwl) if !version.starts_with('v') => format!("v{}", version),
        _ => version.to_string(),
    }
}

/// Everything sent with a Cromwell submit, describe or batch request.
#[derive(Debug, Clone, Default)]
pub struct Submission {
    /// Workflow URL or local path
    pub workflow: String,
    /// Inputs document (JSON or YAML)
    pub inputs: Option<PathBuf>,
    /// ZIP archive resolving local imports
    pub dependencies: Option<PathBuf>,
    /// Workflow options document
    pub options: Option<PathBuf>,
    /// Labels document
    pub labels: Option<PathBuf>,
    pub language: Option<Language>,
    pub language_version: Option<String>,
    /// Root object to run (CWL documents with several objects)
    pub root: Option<String>,
    /// Submit in "On Hold" state
    pub hold: bool,
}

impl Submission {
    pub fn new(workflow: impl Into<String>) -> Self {
        Self {
            workflow: workflow.into(),
            ..Self::default()
        }
    }

    pub fn with_inputs(mut self, inputs: impl Into<PathBuf>) -> Self {
        self.inputs = Some(inputs.into());
        self
    }

    pub fn with_language(mut self, language: Language, version: Option<&str>) -> Self {
        self.language = Some(language);
        self.language_version = version.map(str::to_string);
        self
    }

    pub fn source(&self) -> WorkflowSource {
        WorkflowSource::resolve(&self.workflow)
    }

    /// Language version after the per-language rewrite.
    pub fn transmitted_language_version(&self) -> Option<String> {
        self.language_version
            .as_deref()
            .map(|version| language_version_for(self.language, version))
    }

    /// Fields shared by submit, batch and describe.
    pub(crate) fn base_form(&self) -> FormData {
        let form = self.source().add_to(FormData::new());
        form.text("workflowType", self.language.map(|l| l.to_string()))
            .text("workflowTypeVersion", self.transmitted_language_version())
    }

    /// Form for a single submission.
    pub(crate) fn submit_form(&self) -> FormData {
        self.base_form()
            .file("workflowInputs", self.inputs.as_deref())
            .file("workflowDependencies", self.dependencies.as_deref())
            .file("workflowOptions", self.options.as_deref())
            .file("labels", self.labels.as_deref())
            .text("workflowRoot", self.root.as_deref())
            .text("workflowOnHold", self.hold.then_some("true"))
    }

    /// Form for a batch; `inputs` is the JSON array of per-run inputs.
    pub(crate) fn batch_form(&self, inputs: Value) -> FormData {
        self.base_form()
            .json("workflowInputs", inputs)
            .file("workflowDependencies", self.dependencies.as_deref())
            .file("workflowOptions", self.options.as_deref())
            .file("labels", self.labels.as_deref())
            .text("workflowOnHold", self.hold.then_some("true"))
    }

    /// Form for describe/validate.
    pub(crate) fn describe_form(&self) -> FormData {
        self.base_form().file("workflowInputs", self.inputs.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_detection() {
        assert!(is_url("https://x.org/y.wdl"));
        assert!(is_url("http://localhost:8000/hello.wdl"));
        assert!(is_url("ftp://10.0.0.1/workflows/main.cwl"));
        assert!(is_url("HTTPS://RAW.GITHUBUSERCONTENT.COM/a/b/main.wdl"));
        assert!(!is_url("./local.wdl"));
        assert!(!is_url("/abs/path/hello.wdl"));
        assert!(!is_url("hello.wdl"));
        assert!(!is_url("file:///tmp/hello.wdl"));
    }

    #[test]
    fn test_source_resolution_is_exclusive() {
        let remote = Submission::new("https://x.org/y.wdl");
        assert_eq!(remote.base_form().names(), vec!["workflowUrl"]);

        let local = Submission::new("./local.wdl");
        assert_eq!(local.source(), WorkflowSource::File(PathBuf::from("./local.wdl")));
        assert_eq!(local.base_form().names(), vec!["workflowSource"]);
    }

    #[test]
    fn test_cwl_version_prefix() {
        assert_eq!(language_version_for(Some(Language::Cwl), "1.0"), "v1.0");
        assert_eq!(language_version_for(Some(Language::Cwl), "v1.0"), "v1.0");
        assert_eq!(language_version_for(Some(Language::Wdl), "1.0"), "1.0");
        assert_eq!(language_version_for(Some(Language::Wdl), "draft-2"), "draft-2");
        assert_eq!(language_version_for(None, "1.0"), "1.0");
    }

    #[test]
    fn test_language_parsing() {
        assert_eq!("cwl".parse::<Language>().unwrap(), Language::Cwl);
        assert_eq!("WDL".parse::<Language>().unwrap(), Language::Wdl);
        assert!("nextflow".parse::<Language>().is_err());
        assert_eq!(Language::Cwl.to_string(), "CWL");
    }

    #[test]
    fn test_submit_form_fields() {
        let mut submission = Submission::new("https://x.org/y.cwl")
            .with_inputs("inputs.json")
            .with_language(Language::Cwl, Some("1.0"));
        submission.hold = true;
        submission.root = Some("main".to_string());

        assert_eq!(submission.transmitted_language_version().as_deref(), Some("v1.0"));
        assert_eq!(
            submission.submit_form().names(),
            vec![
                "workflowUrl",
                "workflowType",
                "workflowTypeVersion",
                "workflowInputs",
                "workflowRoot",
                "workflowOnHold"
            ]
        );
    }

    #[test]
    fn test_hold_false_is_omitted() {
        let submission = Submission::new("hello.wdl");
        assert_eq!(submission.submit_form().names(), vec!["workflowSource"]);
    }
}
