//! Real backend using the `brew` and `npm` command-line tools.

use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::types::{Package, PackageKind};
use std::path::Path;
use std::process::{Command, Output};

/// Global npm packages that ship with node itself and are never reported.
const BUNDLED_NPM_PACKAGES: &[&str] = &["npm", "corepack"];

/// Backend that executes real `brew` and `npm` commands.
pub struct BrewBackend {
    /// Path to the brew executable
    brew_path: String,
    /// Path to the npm executable, if node is installed
    npm_path: Option<String>,
}

impl BrewBackend {
    /// Create a new BrewBackend.
    ///
    /// Returns an error if Homebrew is not installed. A missing npm is not an
    /// error; npm operations then fail individually with [`Error::NpmNotFound`].
    pub fn new() -> Result<Self> {
        let brew_path = find_tool(
            "brew",
            &[
                "/opt/homebrew/bin/brew",
                "/usr/local/bin/brew",
                "/home/linuxbrew/.linuxbrew/bin/brew",
            ],
        )
        .ok_or(Error::BrewNotFound)?;

        let npm_path = find_tool("npm", &["/opt/homebrew/bin/npm", "/usr/local/bin/npm"]);

        Ok(Self {
            brew_path,
            npm_path,
        })
    }

    fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        Command::new(program)
            .args(args)
            .output()
            .map_err(|e| Error::CommandFailed {
                message: format!("failed to execute {program}: {e}"),
                stderr: String::new(),
            })
    }

    /// Run a brew command and return stdout if it succeeded.
    fn run_brew_checked(&self, args: &[&str], package_name: Option<&str>) -> Result<String> {
        let output = self.run(&self.brew_path, args)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::from_output("brew", &stderr, package_name));
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Run an npm command and return stdout if it succeeded.
    fn run_npm_checked(&self, args: &[&str], package_name: Option<&str>) -> Result<String> {
        let npm = self.npm_path.as_deref().ok_or(Error::NpmNotFound)?;
        let output = self.run(npm, args)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::from_output("npm", &stderr, package_name));
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    fn list_npm_globals(&self) -> Result<Vec<String>> {
        let npm = self.npm_path.as_deref().ok_or(Error::NpmNotFound)?;
        // npm exits non-zero for extraneous or invalid trees but still prints the listing
        let output = self.run(npm, &["list", "-g", "--depth=0", "--json"])?;
        if output.stdout.is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::from_output("npm", &stderr, None));
        }
        parse_npm_list(&output.stdout)
    }
}

impl Backend for BrewBackend {
    fn is_available(&self) -> bool {
        self.run(&self.brew_path, &["--version"])
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn install(&self, package: &Package) -> Result<()> {
        let name = package.name.as_str();
        match package.kind {
            PackageKind::Tap => self.run_brew_checked(&["tap", name], Some(name)),
            PackageKind::Formula => {
                self.run_brew_checked(&["install", "--formula", name], Some(name))
            }
            PackageKind::Cask => self.run_brew_checked(&["install", "--cask", name], Some(name)),
            PackageKind::Npm => self.run_npm_checked(&["install", "-g", name], Some(name)),
        }?;
        Ok(())
    }

    fn uninstall(&self, package: &Package) -> Result<()> {
        let name = package.name.as_str();
        match package.kind {
            PackageKind::Tap => self.run_brew_checked(&["untap", name], Some(name)),
            PackageKind::Formula => {
                self.run_brew_checked(&["uninstall", "--formula", name], Some(name))
            }
            PackageKind::Cask => {
                self.run_brew_checked(&["uninstall", "--cask", name], Some(name))
            }
            PackageKind::Npm => self.run_npm_checked(&["uninstall", "-g", name], Some(name)),
        }?;
        Ok(())
    }

    fn list_installed(&self, kind: PackageKind) -> Result<Vec<String>> {
        match kind {
            PackageKind::Tap => Ok(parse_lines(&self.run_brew_checked(&["tap"], None)?)),
            PackageKind::Formula => Ok(parse_lines(&self.run_brew_checked(&["leaves"], None)?)),
            PackageKind::Cask => Ok(parse_lines(
                &self.run_brew_checked(&["list", "--cask", "-1"], None)?,
            )),
            PackageKind::Npm => self.list_npm_globals(),
        }
    }
}

/// Locate an executable, checking well-known paths before `which`.
fn find_tool(name: &str, candidates: &[&str]) -> Option<String> {
    if let Some(path) = candidates.iter().find(|p| Path::new(p).exists()) {
        return Some((*path).to_string());
    }

    let output = Command::new("which").arg(name).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!path.is_empty()).then_some(path)
}

/// Split one-name-per-line output, dropping blanks.
fn parse_lines(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse `npm list -g --depth=0 --json` into package names.
fn parse_npm_list(stdout: &[u8]) -> Result<Vec<String>> {
    let json: serde_json::Value = serde_json::from_slice(stdout)?;
    let Some(deps) = json["dependencies"].as_object() else {
        return Ok(Vec::new());
    };

    Ok(deps
        .keys()
        .filter(|name| !BUNDLED_NPM_PACKAGES.contains(&name.as_str()))
        .cloned()
        .collect())
}
