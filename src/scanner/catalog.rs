//! Static tables of known cache locations and project layouts.
//!
//! Supporting a new tool means adding one row. Matching is exact path
//! existence; nothing here inspects file contents.

use std::path::{Path, PathBuf};

use super::targets::RiskTier;

/// A known tool-cache location
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub icon_key: &'static str,
    pub tier: RiskTier,
    /// `~/`-relative or absolute path template
    pub path: &'static str,
    /// Report the largest children as a secondary breakdown
    pub breakdown: bool,
}

impl CatalogEntry {
    pub fn resolve(&self, home: &Path) -> PathBuf {
        resolve_template(self.path, home, Path::new("/"))
    }
}

/// A project layout: a marker file next to a rebuildable artifact directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectSignature {
    pub marker_file: &'static str,
    pub artifact_dir: &'static str,
    pub type_label: &'static str,
}

impl ProjectSignature {
    /// Both the marker file and the artifact directory exist inside `dir`
    pub fn matches(&self, dir: &Path) -> bool {
        dir.join(self.marker_file).is_file() && dir.join(self.artifact_dir).is_dir()
    }
}

macro_rules! cache {
    ($name:expr, $icon:expr, $tier:ident, $path:expr) => {
        CatalogEntry {
            name: $name,
            icon_key: $icon,
            tier: RiskTier::$tier,
            path: $path,
            breakdown: false,
        }
    };
    ($name:expr, $icon:expr, $tier:ident, $path:expr, breakdown) => {
        CatalogEntry {
            name: $name,
            icon_key: $icon,
            tier: RiskTier::$tier,
            path: $path,
            breakdown: true,
        }
    };
}

/// Known cache locations, in display priority order
pub const CACHE_CATALOG: &[CatalogEntry] = &[
    // Xcode and Apple tooling
    cache!("Xcode DerivedData", "xmark.bin.fill", Safe, "~/Library/Developer/Xcode/DerivedData", breakdown),
    cache!("Xcode Archives", "archivebox.fill", Caution, "~/Library/Developer/Xcode/Archives"),
    cache!("Xcode Simulators", "iphone", Caution, "~/Library/Developer/CoreSimulator/Devices", breakdown),
    cache!("Xcode Caches", "internaldrive", Safe, "~/Library/Developer/Xcode/Products"),
    cache!("Xcode Device Support", "cpu", Safe, "~/Library/Developer/Xcode/iOS DeviceSupport"),
    cache!("watchOS Device Support", "applewatch", Safe, "~/Library/Developer/Xcode/watchOS DeviceSupport"),
    cache!("Xcode Logs", "doc.text.fill", Safe, "~/Library/Logs/CoreSimulator"),
    cache!("CocoaPods Cache", "shippingbox.fill", Safe, "~/Library/Caches/CocoaPods"),
    cache!("Carthage", "cart.fill", Safe, "~/Library/Caches/org.carthage.CarthageKit"),
    cache!("SwiftPM Cache", "swift", Safe, "~/Library/Caches/org.swift.swiftpm"),
    // Package managers
    cache!("Homebrew Cache", "mug.fill", Safe, "~/Library/Caches/Homebrew"),
    cache!("npm Cache", "shippingbox", Safe, "~/.npm/_cacache"),
    cache!("Yarn Cache", "figure.walk", Safe, "~/Library/Caches/Yarn"),
    cache!("pnpm Store", "square.stack.3d.up", Safe, "~/Library/pnpm/store"),
    cache!("Bun Cache", "hare", Safe, "~/.bun/install/cache"),
    cache!("pip Cache", "cube.fill", Safe, "~/Library/Caches/pip"),
    cache!("Conda Packages", "leaf", Safe, "~/.conda/pkgs"),
    cache!("Composer Cache", "music.note.list", Safe, "~/.composer/cache"),
    cache!("Go Modules", "leaf.fill", Safe, "~/go/pkg/mod/cache"),
    cache!("Go Build Cache", "hammer", Safe, "~/Library/Caches/go-build"),
    cache!("Rust Cargo", "wrench.fill", Safe, "~/.cargo/registry"),
    cache!("Cargo Git Checkouts", "arrow.triangle.branch", Safe, "~/.cargo/git"),
    cache!("Dart Pub Cache", "bird", Caution, "~/.pub-cache"),
    // JVM
    cache!("Gradle Cache", "gearshape.fill", Safe, "~/.gradle/caches", breakdown),
    cache!("Gradle Wrapper", "gearshape", Caution, "~/.gradle/wrapper/dists"),
    cache!("Maven Repository", "building.columns", Caution, "~/.m2/repository"),
    // Browsers for test automation
    cache!("Playwright Browsers", "theatermasks", Caution, "~/Library/Caches/ms-playwright"),
    cache!("Puppeteer Browsers", "globe", Caution, "~/.cache/puppeteer"),
    // Editors
    cache!("JetBrains Caches", "chevron.left.forwardslash.chevron.right", Safe, "~/Library/Caches/JetBrains"),
    cache!("VS Code Cached Data", "curlybraces", Safe, "~/Library/Application Support/Code/CachedData"),
    // Containers and emulators
    cache!("Docker (Data)", "cube.transparent", Risky, "~/Library/Containers/com.docker.docker/Data"),
    cache!("Colima VMs", "shippingbox.circle", Risky, "~/.colima"),
    cache!("Android Emulators", "smartphone", Risky, "~/.android/avd"),
];

/// Known project layouts. The first matching row wins for a directory.
pub const PROJECT_SIGNATURES: &[ProjectSignature] = &[
    ProjectSignature { marker_file: "Cargo.toml", artifact_dir: "target", type_label: "Rust" },
    ProjectSignature { marker_file: "package.json", artifact_dir: "node_modules", type_label: "Node.js" },
    ProjectSignature { marker_file: "package.json", artifact_dir: ".next", type_label: "Next.js" },
    ProjectSignature { marker_file: "pom.xml", artifact_dir: "target", type_label: "Maven" },
    ProjectSignature { marker_file: "build.gradle", artifact_dir: "build", type_label: "Gradle" },
    ProjectSignature { marker_file: "build.gradle.kts", artifact_dir: "build", type_label: "Gradle" },
    ProjectSignature { marker_file: "Package.swift", artifact_dir: ".build", type_label: "Swift" },
    ProjectSignature { marker_file: "Podfile", artifact_dir: "Pods", type_label: "CocoaPods" },
    ProjectSignature { marker_file: "pubspec.yaml", artifact_dir: ".dart_tool", type_label: "Flutter" },
    ProjectSignature { marker_file: "pyproject.toml", artifact_dir: ".venv", type_label: "Python" },
    ProjectSignature { marker_file: "requirements.txt", artifact_dir: "venv", type_label: "Python" },
    ProjectSignature { marker_file: "requirements.txt", artifact_dir: ".venv", type_label: "Python" },
    ProjectSignature { marker_file: "composer.json", artifact_dir: "vendor", type_label: "PHP" },
    ProjectSignature { marker_file: "go.mod", artifact_dir: "vendor", type_label: "Go" },
    ProjectSignature { marker_file: "mix.exs", artifact_dir: "_build", type_label: "Elixir" },
    ProjectSignature { marker_file: "stack.yaml", artifact_dir: ".stack-work", type_label: "Haskell" },
    ProjectSignature { marker_file: "CMakeLists.txt", artifact_dir: "build", type_label: "CMake" },
];

/// Expand `~/` against `home` and absolute templates against `system_root`
pub fn resolve_template(template: &str, home: &Path, system_root: &Path) -> PathBuf {
    if template == "~" {
        home.to_path_buf()
    } else if let Some(rest) = template.strip_prefix("~/") {
        home.join(rest)
    } else if let Some(rest) = template.strip_prefix('/') {
        system_root.join(rest)
    } else {
        home.join(template)
    }
}

/// First project signature satisfied by `dir`, if any
pub fn match_project(dir: &Path) -> Option<&'static ProjectSignature> {
    PROJECT_SIGNATURES.iter().find(|sig| sig.matches(dir))
}
