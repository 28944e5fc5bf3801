//! Shared fixtures for unit tests.

use brewkit::backend::Backend;
use brewkit::{Client, Error, Package, PackageKind};
use catalog::Catalog;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// A small synthetic catalog with three presets.
pub fn test_catalog() -> Catalog {
    Catalog::from_toml_str(
        r#"
[[category]]
name = "CLI"
[[category.package]]
name = "git"
kind = "cli"
[[category.package]]
name = "go"
kind = "cli"
[[category.package]]
name = "node"
kind = "cli"
[[category.package]]
name = "curl"
kind = "cli"
[[category.package]]
name = "jq"
kind = "cli"
[[category.package]]
name = "ripgrep"
kind = "cli"

[[category]]
name = "Apps"
[[category.package]]
name = "docker"
kind = "cask"
[[category.package]]
name = "iterm2"
kind = "cask"
[[category.package]]
name = "slack"
kind = "cask"

[[category]]
name = "npm"
[[category.package]]
name = "typescript"
kind = "npm"
[[category.package]]
name = "eslint"
kind = "npm"

[[preset]]
name = "small"
display_name = "Small"
cli = ["git", "curl"]
cask = ["iterm2"]

[[preset]]
name = "dev"
display_name = "Dev"
cli = ["git", "curl", "go", "node", "jq"]
cask = ["iterm2", "docker"]
npm = ["typescript"]

[[preset]]
name = "huge"
display_name = "Huge"
cli = ["git", "curl", "go", "node", "jq", "ripgrep"]
cask = ["iterm2", "docker", "slack"]
npm = ["typescript", "eslint"]
"#,
    )
    .unwrap()
}

/// Recorded state of a [`FakeBackend`], shared with the test.
#[derive(Default)]
pub struct FakeState {
    pub installed: HashMap<PackageKind, Vec<String>>,
    pub failing: HashSet<String>,
    pub unlistable: HashSet<PackageKind>,
    pub calls: Vec<String>,
}

/// In-memory package manager.
#[derive(Clone, Default)]
pub struct FakeBackend {
    pub state: Arc<Mutex<FakeState>>,
}

impl FakeBackend {
    pub fn with_installed(kind: PackageKind, names: &[&str]) -> Self {
        let backend = Self::default();
        backend.add_installed(kind, names);
        backend
    }

    pub fn add_installed(&self, kind: PackageKind, names: &[&str]) {
        let mut state = self.state.lock().unwrap();
        let list = state.installed.entry(kind).or_default();
        list.extend(names.iter().map(|n| n.to_string()));
    }

    pub fn fail_on(&self, name: &str) {
        self.state.lock().unwrap().failing.insert(name.to_string());
    }

    pub fn break_listing(&self, kind: PackageKind) {
        self.state.lock().unwrap().unlistable.insert(kind);
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn client(&self) -> Client {
        Client::with_backend(Box::new(self.clone()))
    }
}

impl Backend for FakeBackend {
    fn is_available(&self) -> bool {
        true
    }

    fn install(&self, package: &Package) -> brewkit::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("install {}", package.name));
        if state.failing.contains(&package.name) {
            return Err(Error::NotFound {
                name: package.name.clone(),
            });
        }
        state
            .installed
            .entry(package.kind)
            .or_default()
            .push(package.name.clone());
        Ok(())
    }

    fn uninstall(&self, package: &Package) -> brewkit::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("uninstall {}", package.name));
        if state.failing.contains(&package.name) {
            return Err(Error::Conflict {
                message: format!("{} is required by something", package.name),
            });
        }
        if let Some(list) = state.installed.get_mut(&package.kind) {
            list.retain(|n| n != &package.name);
        }
        Ok(())
    }

    fn list_installed(&self, kind: PackageKind) -> brewkit::Result<Vec<String>> {
        let state = self.state.lock().unwrap();
        if state.unlistable.contains(&kind) {
            return Err(Error::NpmNotFound);
        }
        Ok(state.installed.get(&kind).cloned().unwrap_or_default())
    }
}
