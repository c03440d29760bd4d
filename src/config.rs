use std::collections::HashMap;
use std::fs;

/// Minimal INI-style configuration.
///
/// Consumed sections:
/// - `[Logging]`: `log_filename`, `log_path`.
/// - `[Audio]`: `input_device`, `output_device` (device-name overrides;
///   default devices are used when absent).
/// - `[Session]`: `target_language` (default translation target).
#[derive(Debug)]
pub struct Config {
    pub globals: HashMap<String, String>,
    pub sections: HashMap<String, HashMap<String, String>>,
}

impl Config {
    pub fn load(path: &str) -> Result<Self, String> {
        let content =
            fs::read_to_string(path).map_err(|e| format!("Error reading file {path}: {e}"))?;
        Ok(Self::parse(&content))
    }

    fn parse(content: &str) -> Self {
        let mut globals = HashMap::new();
        let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
        let mut current_section: Option<String> = None;

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                let name = &line[1..line.len() - 1];
                current_section = Some(name.to_string());
                continue;
            }

            if let Some(pos) = line.find('=') {
                let key = line[..pos].trim().to_string();
                let value = line[pos + 1..].trim().trim_matches('"').to_string();

                match &current_section {
                    None => {
                        globals.insert(key, value);
                    }
                    Some(sec) => {
                        sections.entry(sec.clone()).or_default().insert(key, value);
                    }
                }
            }
        }
        Config { globals, sections }
    }

    pub fn empty() -> Self {
        Self {
            globals: HashMap::new(),
            sections: HashMap::new(),
        }
    }

    #[must_use]
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|sec| sec.get(key))
            .map(|s| s.as_str())
    }

    #[must_use]
    pub fn get_non_empty(&self, section: &str, key: &str) -> Option<&str> {
        self.get(section, key).filter(|s| !s.is_empty())
    }

    #[must_use]
    pub fn get_global(&self, key: &str) -> Option<&str> {
        self.globals.get(key).map(|s| s.as_str())
    }

    #[must_use]
    pub fn get_or_default<'a>(&'a self, section: &str, key: &str, default: &'a str) -> &'a str {
        self.get(section, key)
            .or_else(|| self.get_global(key))
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn parses_sections_and_globals() {
        let cfg = Config::parse(
            "lang = \"Sinhala\"\n\
             # comment\n\
             [Audio]\n\
             input_device = USB Mic\n\
             output_device = \"\"\n",
        );
        assert_eq!(cfg.get_global("lang"), Some("Sinhala"));
        assert_eq!(cfg.get("Audio", "input_device"), Some("USB Mic"));
        assert_eq!(cfg.get_non_empty("Audio", "output_device"), None);
        assert_eq!(cfg.get("Audio", "missing"), None);
    }

    #[test]
    fn get_or_default_falls_back_to_global_then_default() {
        let cfg = Config::parse("target_language = Tamil\n[Session]\n");
        assert_eq!(
            cfg.get_or_default("Session", "target_language", "Spanish"),
            "Tamil"
        );
        assert_eq!(cfg.get_or_default("Session", "other", "Spanish"), "Spanish");
    }
}
