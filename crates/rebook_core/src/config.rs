use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

const DEFAULT_BOOTSTRAP_SCRIPT: &str = "\
var theme;
try { theme = localStorage.getItem('mdbook-theme'); } catch(e) { }
if (theme === null || theme === undefined) { theme = default_theme; }
const html = document.documentElement;
html.classList.remove('light')
html.classList.add(theme);
html.classList.add(\"js\");";

const DEFAULT_BOOTSTRAP_REPLACEMENT: &str = "\
const html = document.documentElement;
html.classList.add('js');";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrofitConfig {
    pub site: SiteMeta,
    pub highlight: HighlightConfig,
    pub stylesheets: StylesheetConfig,
    pub bootstrap: BootstrapConfig,
    pub bundle: BundleConfig,
    pub hide_theme_toggle: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteMeta {
    pub repository: String,
    pub name: String,
    pub title: String,
    pub image: String,
    pub twitter: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightConfig {
    pub theme: String,
    pub fatal_unsupported: bool,
    pub keep_lines_class: String,
    pub boring_marker: String,
    pub ellipsis_marker: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StylesheetConfig {
    pub source: String,
    pub legacy: Vec<String>,
    pub generate: bool,
    pub disable: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapConfig {
    pub expected: String,
    pub replacement: String,
    pub exempt: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Replacement {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleConfig {
    pub path: String,
    pub replacements: Vec<Replacement>,
}

impl Default for RetrofitConfig {
    fn default() -> Self {
        let legacy = vec![
            "tomorrow-night.css".to_string(),
            "ayu-highlight.css".to_string(),
        ];
        Self {
            site: SiteMeta {
                repository: "https://github.com/dtolnay/cxx".to_string(),
                name: "CXX".to_string(),
                title: "CXX — safe interop between Rust and C++".to_string(),
                image: "https://cxx.rs/cxx.png".to_string(),
                twitter: Some("@davidtolnay".to_string()),
            },
            highlight: HighlightConfig {
                theme: "GitHub".to_string(),
                fatal_unsupported: false,
                keep_lines_class: "focuscomment".to_string(),
                boring_marker: "<span class=\"boring\">".to_string(),
                ellipsis_marker: "// ...".to_string(),
            },
            stylesheets: StylesheetConfig {
                source: "highlight.css".to_string(),
                disable: legacy.clone(),
                legacy,
                generate: true,
            },
            bootstrap: BootstrapConfig {
                expected: DEFAULT_BOOTSTRAP_SCRIPT.to_string(),
                replacement: DEFAULT_BOOTSTRAP_REPLACEMENT.to_string(),
                exempt: vec![
                    "toc.html".to_string(),
                    "build/index.html".to_string(),
                    "binding/index.html".to_string(),
                ],
            },
            bundle: BundleConfig {
                path: "book.js".to_string(),
                replacements: vec![
                    Replacement {
                        from: "set_theme(theme, false);".to_string(),
                        to: String::new(),
                    },
                    Replacement {
                        from: "document.querySelectorAll(\"code.hljs\")".to_string(),
                        to: "document.querySelectorAll(\"code.hidelines\")".to_string(),
                    },
                ],
            },
            hide_theme_toggle: true,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RetrofitConfigRaw {
    site: Option<SiteMetaRaw>,
    highlight: Option<HighlightConfigRaw>,
    stylesheets: Option<StylesheetConfigRaw>,
    bootstrap: Option<BootstrapConfigRaw>,
    bundle: Option<BundleConfigRaw>,
    hide_theme_toggle: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SiteMetaRaw {
    repository: Option<String>,
    name: Option<String>,
    title: Option<String>,
    image: Option<String>,
    twitter: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct HighlightConfigRaw {
    theme: Option<String>,
    fatal_unsupported: Option<bool>,
    keep_lines_class: Option<String>,
    boring_marker: Option<String>,
    ellipsis_marker: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StylesheetConfigRaw {
    source: Option<String>,
    legacy: Option<Vec<String>>,
    generate: Option<bool>,
    disable: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BootstrapConfigRaw {
    expected: Option<String>,
    replacement: Option<String>,
    exempt: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BundleConfigRaw {
    path: Option<String>,
    replacements: Option<Vec<Replacement>>,
}

pub fn load_retrofit_config(path: &Path) -> Result<RetrofitConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    parse_retrofit_config(&raw)
        .with_context(|| format!("failed to parse YAML config {}", path.display()))
}

pub fn parse_retrofit_config(raw: &str) -> Result<RetrofitConfig> {
    let parsed: RetrofitConfigRaw = if raw.trim().is_empty() {
        RetrofitConfigRaw::default()
    } else {
        serde_yaml::from_str(raw)?
    };
    let mut config = RetrofitConfig::default();

    if let Some(site) = parsed.site {
        override_string(&mut config.site.repository, site.repository, "site.repository")?;
        override_string(&mut config.site.name, site.name, "site.name")?;
        override_string(&mut config.site.title, site.title, "site.title")?;
        override_string(&mut config.site.image, site.image, "site.image")?;
        if let Some(twitter) = site.twitter {
            let trimmed = twitter.trim();
            config.site.twitter = if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            };
        }
    }

    if let Some(highlight) = parsed.highlight {
        override_string(&mut config.highlight.theme, highlight.theme, "highlight.theme")?;
        if let Some(value) = highlight.fatal_unsupported {
            config.highlight.fatal_unsupported = value;
        }
        override_string(
            &mut config.highlight.keep_lines_class,
            highlight.keep_lines_class,
            "highlight.keep_lines_class",
        )?;
        override_string(
            &mut config.highlight.boring_marker,
            highlight.boring_marker,
            "highlight.boring_marker",
        )?;
        override_string(
            &mut config.highlight.ellipsis_marker,
            highlight.ellipsis_marker,
            "highlight.ellipsis_marker",
        )?;
        if config.highlight.boring_marker == config.highlight.ellipsis_marker {
            bail!("highlight.boring_marker and highlight.ellipsis_marker must differ");
        }
    }

    if let Some(stylesheets) = parsed.stylesheets {
        override_string(
            &mut config.stylesheets.source,
            stylesheets.source,
            "stylesheets.source",
        )?;
        if let Some(legacy) = stylesheets.legacy {
            config.stylesheets.legacy = legacy;
        }
        if let Some(generate) = stylesheets.generate {
            config.stylesheets.generate = generate;
        }
        if let Some(disable) = stylesheets.disable {
            config.stylesheets.disable = disable;
        }
    }

    if let Some(bootstrap) = parsed.bootstrap {
        override_string(
            &mut config.bootstrap.expected,
            bootstrap.expected,
            "bootstrap.expected",
        )?;
        if let Some(replacement) = bootstrap.replacement {
            config.bootstrap.replacement = replacement;
        }
        if let Some(exempt) = bootstrap.exempt {
            config.bootstrap.exempt = exempt
                .into_iter()
                .map(|path| path.trim_start_matches("./").replace('\\', "/"))
                .collect();
        }
    }

    if let Some(bundle) = parsed.bundle {
        override_string(&mut config.bundle.path, bundle.path, "bundle.path")?;
        if let Some(replacements) = bundle.replacements {
            for (idx, replacement) in replacements.iter().enumerate() {
                if replacement.from.is_empty() {
                    bail!("bundle.replacements[{idx}].from must not be empty");
                }
            }
            config.bundle.replacements = replacements;
        }
    }

    if let Some(hide) = parsed.hide_theme_toggle {
        config.hide_theme_toggle = hide;
    }

    Ok(config)
}

fn override_string(target: &mut String, value: Option<String>, field: &str) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if value.trim().is_empty() {
        bail!("{field} must not be empty");
    }
    *target = value;
    Ok(())
}
