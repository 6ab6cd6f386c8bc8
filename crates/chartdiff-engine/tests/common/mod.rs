//! Scripted stand-in for git and helm
//!
//! `FakeTools` keeps a table of versions, each a set of files. `git checkout`
//! writes that version's files into the working tree, `helm template` echoes
//! the chart's `rendered.yaml`, so real extraction and workspace handling
//! run between the two.

use chartdiff_core::errors::ExError;
use chartdiff_core::ChartDiffError;
use chartdiff_engine::{CancelToken, CommandRunner, CommandSpec, PipelineConfig, ProcessOutput};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tempfile::TempDir;

pub const CHART: &str = "charts/web";

#[derive(Default)]
pub struct FakeTools {
    versions: BTreeMap<String, BTreeMap<String, String>>,
    links: BTreeMap<String, Vec<(String, PathBuf)>>,
    branches: Vec<String>,
    clone_error: Option<String>,
    dependency_failures: Mutex<usize>,
    template_stderr: Option<String>,
    dyff_output: Option<(i32, String)>,
    calls: Mutex<Vec<CommandSpec>>,
}

#[allow(dead_code)]
impl FakeTools {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a version whose chart renders to `rendered`
    pub fn with_chart_version(self, version: &str, rendered: &str) -> Self {
        self.with_files(
            version,
            &[
                (&format!("{CHART}/Chart.yaml"), "apiVersion: v2\nname: web\nversion: 0.1.0\n"),
                (&format!("{CHART}/rendered.yaml"), rendered),
            ],
        )
    }

    pub fn with_files(mut self, version: &str, files: &[(&str, &str)]) -> Self {
        let entry = self.versions.entry(version.to_string()).or_default();
        for (path, content) in files {
            entry.insert(path.to_string(), content.to_string());
        }
        self
    }

    /// Check out `rel` as a symlink to `target` at `version`
    pub fn with_link(mut self, version: &str, rel: &str, target: &Path) -> Self {
        self.versions.entry(version.to_string()).or_default();
        self.links
            .entry(version.to_string())
            .or_default()
            .push((rel.to_string(), target.to_path_buf()));
        self
    }

    pub fn with_branches(mut self, branches: &[&str]) -> Self {
        self.branches = branches.iter().map(|b| b.to_string()).collect();
        self
    }

    pub fn failing_clone(mut self, stderr: &str) -> Self {
        self.clone_error = Some(stderr.to_string());
        self
    }

    pub fn failing_dependency_builds(self, count: usize) -> Self {
        *self.dependency_failures.lock().unwrap() = count;
        self
    }

    pub fn template_stderr(mut self, stderr: &str) -> Self {
        self.template_stderr = Some(stderr.to_string());
        self
    }

    pub fn dyff_output(mut self, status: i32, stdout: &str) -> Self {
        self.dyff_output = Some((status, stdout.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls whose argv starts with `prefix`
    pub fn calls_matching(&self, program: &str, prefix: &[&str]) -> Vec<CommandSpec> {
        self.calls()
            .into_iter()
            .filter(|c| c.program == program && c.args.iter().map(String::as_str).take(prefix.len()).eq(prefix.iter().copied()))
            .collect()
    }

    fn git(&self, spec: &CommandSpec) -> ProcessOutput {
        let args: Vec<&str> = spec.args.iter().map(String::as_str).collect();
        match args.as_slice() {
            ["clone", "--no-single-branch", _url, dest] => match &self.clone_error {
                Some(stderr) => exit(128, "", stderr),
                None => {
                    fs::create_dir_all(dest).unwrap();
                    ok("")
                }
            },
            ["fetch", ..] => ok(""),
            ["checkout", version] => {
                let Some(files) = self.versions.get(*version) else {
                    return exit(1, "", &format!("error: pathspec '{version}' did not match any file(s) known to git"));
                };
                let repo = spec.cwd.clone().unwrap();
                for entry in fs::read_dir(&repo).unwrap() {
                    let path = entry.unwrap().path();
                    if path.is_dir() {
                        fs::remove_dir_all(path).unwrap();
                    } else {
                        fs::remove_file(path).unwrap();
                    }
                }
                for (rel, content) in files {
                    let path = repo.join(rel);
                    fs::create_dir_all(path.parent().unwrap()).unwrap();
                    fs::write(path, content).unwrap();
                }
                #[cfg(unix)]
                for (rel, target) in self.links.get(*version).into_iter().flatten() {
                    let path = repo.join(rel);
                    fs::create_dir_all(path.parent().unwrap()).unwrap();
                    std::os::unix::fs::symlink(target, path).unwrap();
                }
                ok("")
            }
            ["tag", "-l"] => ok(&self.tags().join("\n")),
            ["tag", "--sort=-creatordate"] => {
                let mut tags = self.tags();
                tags.reverse();
                ok(&tags.join("\n"))
            }
            ["branch", "-r", ..] => ok(&self.branches.join("\n")),
            _ => exit(1, "", "unexpected git invocation"),
        }
    }

    fn tags(&self) -> Vec<String> {
        self.versions
            .keys()
            .filter(|v| v.starts_with('v'))
            .cloned()
            .collect()
    }

    fn helm(&self, spec: &CommandSpec, cancel: &CancelToken) -> Result<ProcessOutput, ExError> {
        let args: Vec<&str> = spec.args.iter().map(String::as_str).collect();
        match args.as_slice() {
            ["repo", ..] => Ok(ok("")),
            ["dependency", "build", chart] => {
                let mut remaining = self.dependency_failures.lock().unwrap();
                if *remaining > 0 {
                    *remaining -= 1;
                    return Ok(exit(
                        1,
                        "",
                        "Error: no repository definition for https://charts.example.com",
                    ));
                }
                let vendor = Path::new(chart).join("charts");
                fs::create_dir_all(&vendor).unwrap();
                fs::write(vendor.join("redis-17.0.0.tgz"), "tgz").unwrap();
                Ok(ok(""))
            }
            ["template", "app", chart, ..] => {
                let chart = Path::new(chart);
                if chart.join("fail-render").exists() {
                    return Ok(exit(1, "", "Error: parse error in deployment.yaml"));
                }
                if chart.join("slow-render").exists() {
                    let deadline = Instant::now() + Duration::from_secs(5);
                    while Instant::now() < deadline {
                        if cancel.is_cancelled() {
                            return Err(ChartDiffError::Cancelled { program: "helm".into() }.into());
                        }
                        std::thread::sleep(Duration::from_millis(5));
                    }
                }
                let rendered = fs::read_to_string(chart.join("rendered.yaml")).unwrap_or_default();
                let mut out = ok(&rendered);
                if let Some(stderr) = &self.template_stderr {
                    out.stderr = stderr.clone();
                }
                Ok(out)
            }
            _ => Ok(exit(1, "", "unexpected helm invocation")),
        }
    }
}

impl CommandRunner for FakeTools {
    fn run(&self, spec: &CommandSpec, cancel: &CancelToken) -> Result<ProcessOutput, ExError> {
        self.calls.lock().unwrap().push(spec.clone());
        if cancel.is_cancelled() {
            return Err(ChartDiffError::Cancelled { program: spec.program.clone() }.into());
        }
        match spec.program.as_str() {
            "git" => Ok(self.git(spec)),
            "helm" => self.helm(spec, cancel),
            "dyff" => match &self.dyff_output {
                Some((status, stdout)) => Ok(exit(*status, stdout, "")),
                None => Err(ChartDiffError::ToolUnavailable {
                    program: "dyff".into(),
                    reason: "not installed".into(),
                }
                .into()),
            },
            other => Err(ChartDiffError::ToolUnavailable {
                program: other.to_string(),
                reason: "not scripted".into(),
            }
            .into()),
        }
    }
}

fn ok(stdout: &str) -> ProcessOutput {
    exit(0, stdout, "")
}

fn exit(status: i32, stdout: &str, stderr: &str) -> ProcessOutput {
    ProcessOutput {
        status: Some(status),
        stdout: stdout.to_string(),
        stderr: stderr.to_string(),
    }
}

/// Configuration rooted in a fresh temporary work root
#[allow(dead_code)]
pub fn test_config() -> (TempDir, PipelineConfig) {
    let dir = TempDir::new().unwrap();
    let config = PipelineConfig::default().with_work_root(dir.path().join("work"));
    (dir, config)
}

/// Entries left under the work root
#[allow(dead_code)]
pub fn leftover_workspaces(config: &PipelineConfig) -> Vec<PathBuf> {
    match fs::read_dir(&config.work_root) {
        Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
        Err(_) => Vec::new(),
    }
}

#[allow(dead_code)]
pub fn deployment(name: &str, replicas: u32, image: &str) -> String {
    format!(
        "---
# Source: web/templates/deployment.yaml
apiVersion: apps/v1
kind: Deployment
metadata:
  name: {name}
  namespace: prod
spec:
  replicas: {replicas}
  template:
    spec:
      containers:
        - name: {name}
          image: {image}
"
    )
}

#[allow(dead_code)]
pub fn config_map(name: &str, value: &str) -> String {
    format!(
        "---
# Source: web/templates/configmap.yaml
apiVersion: v1
kind: ConfigMap
metadata:
  name: {name}
  namespace: prod
data:
  setting: \"{value}\"
"
    )
}
