use anyhow::{anyhow, Context, Result};
use std::collections::{HashMap, HashSet};
use std::env;
use std::path::{Path, PathBuf};

const PROJECT_CONFIG_NAME: &str = ".edgespeedrc";
const MAX_ALIAS_DEPTH: usize = 10;

/// Defaults and aliases read from `.edgespeedrc` / `config.ini`
#[derive(Debug, Default)]
pub struct ConfigFile {
    pub defaults: Option<String>,
    pub aliases: HashMap<String, String>,
}

impl ConfigFile {
    /// Find project-level .edgespeedrc by walking up from the current directory
    pub fn find_project_config() -> Option<PathBuf> {
        let current = env::current_dir().ok()?;
        Self::find_project_config_from(&current)
    }

    pub fn find_project_config_from(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(PROJECT_CONFIG_NAME))
            .find(|candidate| candidate.is_file())
    }

    /// User config file locations in order of preference
    pub fn get_user_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if cfg!(windows) {
            if let Ok(appdata) = env::var("APPDATA") {
                paths.push(PathBuf::from(appdata).join("edgespeed").join("config.ini"));
            }
            if let Ok(userprofile) = env::var("USERPROFILE") {
                paths.push(PathBuf::from(userprofile).join(PROJECT_CONFIG_NAME));
            }
        } else {
            let xdg_config = env::var("XDG_CONFIG_HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    env::var("HOME")
                        .map(|h| PathBuf::from(h).join(".config"))
                        .unwrap_or_else(|_| PathBuf::from(".config"))
                });
            paths.push(xdg_config.join("edgespeed").join("config.ini"));

            if let Ok(home) = env::var("HOME") {
                paths.push(PathBuf::from(home).join(PROJECT_CONFIG_NAME));
            }
        }

        paths
    }

    /// Load with precedence project > first existing user config
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = Self::get_user_config_paths()
            .into_iter()
            .find(|p| p.is_file())
        {
            log::debug!("using user config {}", path.display());
            config = Self::merge_configs(config, Self::load_from_path(&path)?);
        }

        if let Some(path) = Self::find_project_config() {
            log::debug!("using project config {}", path.display());
            config = Self::merge_configs(config, Self::load_from_path(&path)?);
        }

        Ok(config)
    }

    /// An explicit path replaces the search entirely
    pub fn load_with_custom_path(custom_path: Option<&str>) -> Result<Self> {
        match custom_path {
            Some(path) => Self::load_from_path(Path::new(path)),
            None => Self::load(),
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Ok(Self::parse_ini_content(&content))
    }

    fn parse_ini_content(content: &str) -> Self {
        let mut config = Self::default();
        let mut current_section = String::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                current_section = line[1..line.len() - 1].trim().to_string();
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let (key, value) = (key.trim(), value.trim());

            match current_section.as_str() {
                "" if key == "defaults" => config.defaults = Some(value.to_string()),
                "aliases" => {
                    config.aliases.insert(key.to_string(), value.to_string());
                }
                // Unknown keys and sections are ignored
                _ => {}
            }
        }

        config
    }

    /// Overlay wins for defaults and for aliases defined in both
    fn merge_configs(base: Self, overlay: Self) -> Self {
        let mut aliases = base.aliases;
        aliases.extend(overlay.aliases);
        Self {
            defaults: overlay.defaults.or(base.defaults),
            aliases,
        }
    }

    /// Expand one alias, following nested `-a NAME` references
    pub fn resolve_alias(
        &self,
        name: &str,
        seen: &mut HashSet<String>,
        depth: usize,
    ) -> Result<Vec<String>> {
        if depth > MAX_ALIAS_DEPTH {
            return Err(anyhow!("Alias chain too deep: {} levels", depth));
        }
        if seen.contains(name) {
            return Err(anyhow!("Circular dependency detected in alias: {}", name));
        }

        let alias_value = self
            .aliases
            .get(name)
            .ok_or_else(|| anyhow!("Unknown alias: {}", name))?;
        let args = shell_words::split(alias_value)
            .with_context(|| format!("Invalid alias '{}': failed to parse arguments", name))?;

        seen.insert(name.to_string());
        let resolved = self.expand_aliases(args, seen, depth + 1);
        seen.remove(name);
        resolved
    }

    fn expand_aliases(
        &self,
        args: Vec<String>,
        seen: &mut HashSet<String>,
        depth: usize,
    ) -> Result<Vec<String>> {
        let mut result = Vec::with_capacity(args.len());
        let mut iter = args.into_iter();

        while let Some(arg) = iter.next() {
            if arg == "-a" || arg == "--alias" {
                match iter.next() {
                    Some(name) => result.extend(self.resolve_alias(&name, seen, depth)?),
                    None => result.push(arg),
                }
            } else if let Some(name) = arg.strip_prefix("--alias=") {
                result.extend(self.resolve_alias(name, seen, depth)?);
            } else {
                result.push(arg);
            }
        }

        Ok(result)
    }

    /// Prepend configured defaults, then expand aliases
    ///
    /// Defaults go right after the program name so that later user arguments
    /// override them.
    pub fn process_args(&self, args: Vec<String>) -> Result<Vec<String>> {
        let mut combined = Vec::with_capacity(args.len());
        let mut args = args.into_iter();
        combined.extend(args.next());

        if let Some(defaults) = &self.defaults {
            let default_args = shell_words::split(defaults)
                .context("Invalid defaults: failed to parse arguments")?;
            combined.extend(default_args);
        }
        combined.extend(args);

        self.expand_aliases(combined, &mut HashSet::new(), 0)
    }
}
