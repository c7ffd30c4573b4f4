use std::fs;
use std::path::{Path, PathBuf};

use cyldoc_core::config::Config;
use cyldoc_core::{BuildError, DocsBuilder};

const CHANGELOG: &str = "# Changelog

All notable changes to Cyl.

## 0.2.0 (2025-03-01)
### Added
- Added loops
- **Pattern** matching

### Fixed
* Parser crash on empty input

## 0.1.0
Initial preview.
";

const COBERTURA: &str = r#"<?xml version="1.0" ?>
<coverage line-rate="0.75">
    <packages>
        <package name="compiler">
            <classes>
                <class name="lexer" filename="compiler/src/lexer.rs">
                    <lines>
                        <line number="1" hits="4"/>
                        <line number="2" hits="1"/>
                        <line number="3" hits="1"/>
                        <line number="4" hits="0"/>
                    </lines>
                </class>
            </classes>
        </package>
    </packages>
</coverage>
"#;

const SITE_CONFIG: &str = r#"
[[syntax.categories]]
id = "declarations"
name = "Declarations"
description = "Naming things"

[[syntax.rules.declarations]]
name = "Variable Declaration"
syntax = "let name = value;"
examples = ["let answer = 42;"]
"#;

fn repo_theme() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../theme")
}

fn scratch_project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    fs::write(root.join("CHANGELOG.md"), CHANGELOG).unwrap();
    fs::write(root.join("package.json"), r#"{"version": "0.3.0"}"#).unwrap();
    fs::write(root.join("icon.png"), [0x89, b'P', b'N', b'G']).unwrap();
    fs::create_dir(root.join("examples")).unwrap();
    fs::write(root.join("examples/hello_world.cyl"), "print(\"hi\")\n").unwrap();
    fs::write(root.join("examples/math_ops.cyl"), "fn add(a, b) { a + b }\n").unwrap();
    fs::write(root.join("STDLIB.md"), "# Standard Library\n\n## print(value)\n\n## len(list)\n").unwrap();
    fs::write(root.join("cyldoc.toml"), SITE_CONFIG).unwrap();
    fs::create_dir_all(root.join("compiler/src")).unwrap();
    fs::write(
        root.join("compiler/src/parser.rs"),
        "fn parse_variable_declaration() {}\nfn parse_while_loop() {}\n",
    )
    .unwrap();
    fs::create_dir(root.join("coverage")).unwrap();
    fs::write(root.join("coverage/cobertura.xml"), COBERTURA).unwrap();

    dir
}

#[test]
fn builds_every_page_with_repo_theme() {
    let project = scratch_project();
    let out = project.path().join("site");

    let site = DocsBuilder::new()
        .project_root(project.path())
        .output_dir(&out)
        .theme_dir(repo_theme())
        .config_file(project.path().join("cyldoc.toml"))
        .unwrap()
        .build()
        .unwrap();

    assert_eq!(site.changelog().versions.len(), 2);
    assert_eq!(site.examples().len(), 2);
    assert_eq!(site.backends().len(), 3);
    assert_eq!(site.meta().version, "0.3.0");
    assert_eq!(site.stdlib().unwrap().functions, vec!["print(value)", "len(list)"]);
    assert_eq!(site.coverage().rust.as_ref().unwrap().lines.pct, 75.0);
    assert!(site.coverage().typescript.is_none());

    let rules: Vec<&str> = site.syntax().iter().map(|r| r.name.as_str()).collect();
    assert_eq!(rules, vec!["Variable Declaration", "While Loop"]);

    site.render_all().unwrap();

    for page in [
        "index.html",
        "syntax.html",
        "examples.html",
        "coverage.html",
        "changelog.html",
        "backends.html",
    ] {
        assert!(out.join(page).is_file(), "missing {page}");
    }
    assert!(out.join("assets/style.css").is_file());
    assert!(out.join("assets/icon.png").is_file());

    let changelog = fs::read_to_string(out.join("changelog.html")).unwrap();
    assert!(changelog.contains(r#"id="v0-2-0""#));
    assert!(changelog.contains("<li>Added loops</li><li><strong>Pattern</strong> matching</li>"));
    assert!(changelog.contains("3 changes"));
    assert!(changelog.contains("<p>Initial preview.</p>"));

    let examples = fs::read_to_string(out.join("examples.html")).unwrap();
    assert!(examples.contains("Hello World"));
    assert!(examples.contains("math ops - Example of function definition and usage"));

    let index = fs::read_to_string(out.join("index.html")).unwrap();
    assert!(index.contains("changelog.html#v0-2-0"));
    assert!(index.contains("Version 0.3.0"));

    assert!(index.contains("<code>len(list)</code>"));
    assert!(index.contains("Rust: 75"));

    let syntax = fs::read_to_string(out.join("syntax.html")).unwrap();
    assert!(syntax.contains(r#"<section class="syntax-category" id="declarations">"#));
    assert!(syntax.contains("<p>Naming things</p>"));
    assert!(syntax.contains("let answer = 42;"));
    assert!(syntax.contains("Parser Internals"));
    assert!(syntax.contains("Parsed by parse_while_loop()"));

    let coverage = fs::read_to_string(out.join("coverage.html")).unwrap();
    assert!(coverage.contains("lexer.rs"));
    assert!(coverage.contains("(3/4)"));
    assert!(!coverage.contains(r#"id="typescript""#));
    assert_eq!(
        fs::read_to_string(out.join("coverage/cobertura.xml")).unwrap(),
        COBERTURA
    );

    let backends = fs::read_to_string(out.join("backends.html")).unwrap();
    assert!(backends.contains("Cranelift"));
}

#[test]
fn coverage_copy_replaces_stale_reports() {
    let project = scratch_project();
    let out = project.path().join("site");
    fs::create_dir_all(out.join("coverage")).unwrap();
    fs::write(out.join("coverage/stale.html"), "old").unwrap();

    let site = DocsBuilder::new()
        .project_root(project.path())
        .output_dir(&out)
        .theme_dir(repo_theme())
        .build()
        .unwrap();
    site.render_all().unwrap();

    assert!(!out.join("coverage/stale.html").exists());
    assert!(out.join("coverage/cobertura.xml").is_file());
}

#[test]
fn missing_templates_are_skipped() {
    let project = scratch_project();
    let theme = project.path().join("theme");
    fs::create_dir(&theme).unwrap();
    fs::write(
        theme.join("changelog.html"),
        "{% for v in changelog.versions %}{{ v.version }}={{ v.summary }};{% endfor %}",
    )
    .unwrap();

    let site = DocsBuilder::new()
        .project_root(project.path())
        .theme_dir(&theme)
        .build()
        .unwrap();
    site.render_all().unwrap();

    let out = project.path().join("docs/website");
    assert_eq!(site.output_dir(), out.as_path());
    assert_eq!(
        fs::read_to_string(out.join("changelog.html")).unwrap(),
        "0.2.0=3 changes;0.1.0=1 changes;"
    );
    assert!(!out.join("index.html").exists());
    assert!(!out.join("assets/style.css").exists());
    assert!(out.join("assets/icon.png").is_file());
}

#[test]
fn empty_project_still_builds() {
    let project = tempfile::tempdir().unwrap();
    let out = project.path().join("out");

    let mut config = Config::default();
    config.site.title = "Bare".to_string();

    let site = DocsBuilder::new()
        .project_root(project.path())
        .output_dir(&out)
        .theme_dir(repo_theme())
        .config(config)
        .build()
        .unwrap();

    assert!(site.changelog().is_empty());
    assert!(site.examples().is_empty());
    assert!(site.syntax().is_empty());
    assert!(site.stdlib().is_none());
    assert_eq!(site.coverage().last_updated, None);
    assert_eq!(site.meta().version, "1.0.0");

    site.render_all().unwrap();
    assert!(!out.join("coverage").exists());
    let coverage = fs::read_to_string(out.join("coverage.html")).unwrap();
    assert!(coverage.contains("No coverage reports found."));
    let syntax = fs::read_to_string(out.join("syntax.html")).unwrap();
    assert!(syntax.contains("No syntax rules documented yet."));

    let changelog = fs::read_to_string(out.join("changelog.html")).unwrap();
    assert!(changelog.contains("No releases yet."));
    assert!(changelog.contains("<title>Changelog &middot; Bare</title>"));
}

#[test]
fn build_requires_project_root() {
    let result = DocsBuilder::new().theme_dir(repo_theme()).build();
    assert!(matches!(result, Err(BuildError::MissingProjectRoot)));
}
