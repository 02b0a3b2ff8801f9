//! Parser configuration: terminators, multiline commands, aliases, and
//! shortcuts, plus the embedded-defaults-and-overlay loading that supplies
//! them to embedding shells.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Embedded default configuration.
const DEFAULT_CONFIG: &str = include_str!("../config.default.toml");

/// A leading-text shortcut: `prefix` is replaced by `expansion` once at
/// the start of the line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortcut {
    pub prefix: String,
    pub expansion: String,
}

/// Configuration consumed by [`StatementParser`].
///
/// Supplied at construction and replaced wholesale by
/// [`StatementParser::set_config`]; the parser never loads or persists it.
///
/// [`StatementParser`]: crate::StatementParser
/// [`StatementParser::set_config`]: crate::StatementParser::set_config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// When true, redirection characters split tokens during lexing.
    pub allow_redirection: bool,
    /// Statement terminators, checked in order.
    pub terminators: Vec<String>,
    /// Commands whose arguments may span lines until a terminator appears.
    pub multiline_commands: Vec<String>,
    /// Full-word command substitutions applied before tokenization.
    pub aliases: HashMap<String, String>,
    /// Leading-text shortcuts, checked in order; the first match wins.
    pub shortcuts: Vec<Shortcut>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            allow_redirection: true,
            terminators: vec![";".to_string()],
            multiline_commands: Vec::new(),
            aliases: HashMap::new(),
            shortcuts: Vec::new(),
        }
    }
}

// ── Overlay types (user config that merges with defaults) ──

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigOverlay {
    allow_redirection: Option<bool>,
    replace_terminators: bool,
    terminators: Vec<String>,
    remove_terminators: Vec<String>,
    multiline_commands: Vec<String>,
    remove_multiline_commands: Vec<String>,
    aliases: HashMap<String, String>,
    remove_aliases: Vec<String>,
    shortcuts: Vec<Shortcut>,
    remove_shortcuts: Vec<String>,
}

/// Merge a user list into a default list.
/// In replace mode: user list replaces default entirely.
/// In merge mode: remove items first, then extend with additions (deduped).
fn merge_list(base: &mut Vec<String>, add: Vec<String>, remove: &[String], replace: bool) {
    if replace {
        *base = add;
    } else {
        base.retain(|item| !remove.contains(item));
        for item in add {
            if !base.contains(&item) {
                base.push(item);
            }
        }
    }
}

impl ParserConfig {
    /// Load the default embedded configuration, including the standard
    /// shortcut table.
    pub fn default_config() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("embedded default config must parse")
    }

    /// Load configuration with resolution order:
    /// 1. Start with embedded defaults
    /// 2. Merge user overlay from ~/.config/replparse/config.toml (if exists)
    ///
    /// User config merges with defaults: lists extend, scalars override,
    /// `remove_*` lists subtract, `replace_terminators` substitutes the
    /// terminator set.
    pub fn load() -> Self {
        let mut config = Self::default_config();
        if let Some(overlay) = Self::load_overlay() {
            config.apply_overlay(overlay);
        }
        config
    }

    /// Load embedded defaults and merge the overlay file at `path`.
    pub fn load_with_overlay(path: &Path) -> Self {
        let mut config = Self::default_config();
        if let Some(overlay) = Self::read_overlay(path) {
            config.apply_overlay(overlay);
        }
        config
    }

    /// Try to load the user overlay from ~/.config/replparse/config.toml.
    fn load_overlay() -> Option<ConfigOverlay> {
        let home = std::env::var_os("HOME")?;
        let path = Path::new(&home).join(".config/replparse/config.toml");
        Self::read_overlay(&path)
    }

    fn read_overlay(path: &Path) -> Option<ConfigOverlay> {
        let content = std::fs::read_to_string(path).ok()?;
        match toml::from_str(&content) {
            Ok(overlay) => Some(overlay),
            Err(e) => {
                log::warn!("config parse error in {}: {e}", path.display());
                None
            }
        }
    }

    /// Apply an overlay on top of this config (merge semantics).
    fn apply_overlay(&mut self, overlay: ConfigOverlay) {
        if let Some(v) = overlay.allow_redirection {
            self.allow_redirection = v;
        }

        merge_list(
            &mut self.terminators,
            overlay.terminators,
            &overlay.remove_terminators,
            overlay.replace_terminators,
        );
        merge_list(
            &mut self.multiline_commands,
            overlay.multiline_commands,
            &overlay.remove_multiline_commands,
            false,
        );

        for name in &overlay.remove_aliases {
            self.aliases.remove(name);
        }
        self.aliases.extend(overlay.aliases);

        // Shortcut order is significant; removals and redefinitions keep
        // their position, new shortcuts append.
        self.shortcuts
            .retain(|s| !overlay.remove_shortcuts.contains(&s.prefix));
        for shortcut in overlay.shortcuts {
            if let Some(existing) = self
                .shortcuts
                .iter_mut()
                .find(|s| s.prefix == shortcut.prefix)
            {
                existing.expansion = shortcut.expansion;
            } else {
                self.shortcuts.push(shortcut);
            }
        }
    }

    /// Apply an overlay from a TOML string. Used for testing.
    #[cfg(test)]
    fn apply_overlay_str(&mut self, toml_str: &str) {
        let overlay: ConfigOverlay = toml::from_str(toml_str).unwrap();
        self.apply_overlay(overlay);
    }
}
