//! [`SystemProbe`] backed by the running machine.

use super::capture::SystemProbe;
use super::macos;
use super::{DevTool, GitIdentity, MacOsPref, ShellProfile};
use crate::error::{Error, Result};
use brewkit::Client;
use regex::Regex;
use std::path::PathBuf;
use std::process::Command;
use std::sync::LazyLock;

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.\d+(?:\.\d+)?").expect("version pattern is valid"));

/// Developer tools reported in snapshots, with the flag that prints their
/// version.
const DEV_TOOLS: &[(&str, &str)] = &[
    ("go", "version"),
    ("node", "--version"),
    ("python3", "--version"),
    ("rustc", "--version"),
    ("java", "-version"),
    ("ruby", "--version"),
];

/// Queries Homebrew and npm through a [`Client`] and everything else
/// through local commands and files under `home`.
pub struct LiveProbe<'a> {
    client: &'a Client,
    home: PathBuf,
}

impl<'a> LiveProbe<'a> {
    pub fn new(client: &'a Client, home: impl Into<PathBuf>) -> Self {
        Self {
            client,
            home: home.into(),
        }
    }
}

impl SystemProbe for LiveProbe<'_> {
    fn hostname(&self) -> String {
        run_capture("hostname", &[])
            .ok()
            .filter(|h| !h.is_empty())
            .or_else(|| std::env::var("HOSTNAME").ok())
            .unwrap_or_default()
    }

    fn formulae(&self) -> Result<Vec<String>> {
        Ok(self.client.list_formulae()?)
    }

    fn casks(&self) -> Result<Vec<String>> {
        Ok(self.client.list_casks()?)
    }

    fn taps(&self) -> Result<Vec<String>> {
        Ok(self.client.list_taps()?)
    }

    fn npm_globals(&self) -> Result<Vec<String>> {
        Ok(self.client.list_npm()?)
    }

    fn macos_prefs(&self) -> Result<Vec<MacOsPref>> {
        let exports = macos::tracked_domains().into_iter().filter_map(|domain| {
            // A domain that was never written is not an error
            match run_capture("defaults", &["export", domain, "-"]) {
                Ok(exported) => Some((domain, exported)),
                Err(_) => {
                    log::debug!("No preferences exported for {domain}");
                    None
                }
            }
        });
        Ok(macos::collect_exports(exports))
    }

    fn shell(&self) -> Result<ShellProfile> {
        let mut profile = ShellProfile {
            default_shell: std::env::var("SHELL").unwrap_or_default(),
            oh_my_zsh: self.home.join(".oh-my-zsh").is_dir(),
            ..ShellProfile::default()
        };

        let zshrc = self.home.join(".zshrc");
        match std::fs::read_to_string(&zshrc) {
            Ok(content) => {
                let (theme, plugins) = parse_zshrc(&content);
                profile.theme = theme.unwrap_or_default();
                profile.plugins = plugins;
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(Error::io(&zshrc, e)),
        }
        Ok(profile)
    }

    fn git(&self) -> Result<GitIdentity> {
        Ok(GitIdentity {
            user_name: git_config("user.name"),
            user_email: git_config("user.email"),
        })
    }

    fn dev_tools(&self) -> Result<Vec<DevTool>> {
        Ok(DEV_TOOLS
            .iter()
            .filter_map(|&(name, flag)| {
                let output = run_combined(name, &[flag])?;
                let version = extract_version(&output)?;
                Some(DevTool {
                    name: name.to_string(),
                    version,
                })
            })
            .collect())
    }
}

/// Run a command and return its trimmed stdout.
fn run_capture(cmd: &str, args: &[&str]) -> Result<String> {
    let command_line = || format!("{} {}", cmd, args.join(" ")).trim_end().to_string();
    let output = Command::new(cmd).args(args).output().map_err(|e| Error::Command {
        command: command_line(),
        message: format!("failed to execute: {e}"),
    })?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    } else {
        Err(Error::Command {
            command: command_line(),
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

/// Run a command and return stdout followed by stderr, or `None` if it
/// could not run or failed. `java -version` prints to stderr.
fn run_combined(cmd: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(cmd).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    Some(text)
}

fn git_config(key: &str) -> String {
    run_capture("git", &["config", "--global", key]).unwrap_or_default()
}

/// First dotted version number in a tool's version banner.
pub fn extract_version(output: &str) -> Option<String> {
    VERSION_RE.find(output).map(|m| m.as_str().to_string())
}

/// Theme and plugin list from a `.zshrc`.
///
/// Commented lines are ignored. `plugins=(...)` may span multiple lines.
pub fn parse_zshrc(content: &str) -> (Option<String>, Vec<String>) {
    let mut theme = None;
    let mut plugins = Vec::new();
    let mut in_plugins = false;

    for line in content.lines() {
        let line = line.trim();
        if line.starts_with('#') {
            continue;
        }

        if in_plugins {
            let (body, done) = match line.split_once(')') {
                Some((body, _)) => (body, true),
                None => (line, false),
            };
            plugins.extend(body.split_whitespace().map(str::to_string));
            in_plugins = !done;
            continue;
        }

        if let Some(value) = line.strip_prefix("ZSH_THEME=") {
            theme = Some(value.trim_matches(|c| c == '"' || c == '\'').to_string());
        } else if let Some(rest) = line.strip_prefix("plugins=(") {
            let (body, done) = match rest.split_once(')') {
                Some((body, _)) => (body, true),
                None => (rest, false),
            };
            plugins = body.split_whitespace().map(str::to_string).collect();
            in_plugins = !done;
        }
    }

    (theme, plugins)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::FakeBackend;
    use brewkit::PackageKind;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_extract_version() {
        assert_eq!(extract_version("go version go1.23.2 darwin/arm64").as_deref(), Some("1.23.2"));
        assert_eq!(extract_version("v20.11.1").as_deref(), Some("20.11.1"));
        assert_eq!(extract_version("Python 3.12.4").as_deref(), Some("3.12.4"));
        assert_eq!(
            extract_version("openjdk version \"21.0.2\" 2024-01-16").as_deref(),
            Some("21.0.2")
        );
        assert_eq!(extract_version("rustc 1.90.0 (abc 2025-09-14)").as_deref(), Some("1.90.0"));
        assert_eq!(extract_version("no version here"), None);
    }

    #[test]
    fn test_parse_zshrc() {
        let content = r#"
export ZSH="$HOME/.oh-my-zsh"
# ZSH_THEME="agnoster"
ZSH_THEME="robbyrussell"
plugins=(git z
  docker)
source $ZSH/oh-my-zsh.sh
"#;
        let (theme, plugins) = parse_zshrc(content);
        assert_eq!(theme.as_deref(), Some("robbyrussell"));
        assert_eq!(plugins, vec!["git", "z", "docker"]);
    }

    #[test]
    fn test_parse_zshrc_empty() {
        let (theme, plugins) = parse_zshrc("alias ll='ls -la'\n");
        assert_eq!(theme, None);
        assert!(plugins.is_empty());
    }

    #[test]
    fn test_shell_reads_home() {
        let home = TempDir::new().unwrap();
        fs::create_dir(home.path().join(".oh-my-zsh")).unwrap();
        fs::write(home.path().join(".zshrc"), "ZSH_THEME='ys'\nplugins=(git)\n").unwrap();

        let backend = FakeBackend::default();
        let client = backend.client();
        let probe = LiveProbe::new(&client, home.path());
        let shell = probe.shell().unwrap();

        assert!(shell.oh_my_zsh);
        assert_eq!(shell.theme, "ys");
        assert_eq!(shell.plugins, vec!["git"]);
    }

    #[test]
    fn test_shell_without_zshrc() {
        let home = TempDir::new().unwrap();
        let client = FakeBackend::default().client();
        let shell = LiveProbe::new(&client, home.path()).shell().unwrap();
        assert!(!shell.oh_my_zsh);
        assert!(shell.theme.is_empty());
        assert!(shell.plugins.is_empty());
    }

    #[test]
    fn test_package_lists_come_from_client() {
        let backend = FakeBackend::with_installed(PackageKind::Formula, &["git", "jq"]);
        backend.add_installed(PackageKind::Cask, &["iterm2"]);
        backend.break_listing(PackageKind::Npm);
        let client = backend.client();
        let probe = LiveProbe::new(&client, "/nonexistent");

        assert_eq!(probe.formulae().unwrap(), vec!["git", "jq"]);
        assert_eq!(probe.casks().unwrap(), vec!["iterm2"]);
        assert!(probe.npm_globals().is_err());
    }
}
