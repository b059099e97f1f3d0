//! Runtime configuration.
//!
//! Only two locations concern the engine: where templates live and where
//! filled files go. Everything else (model hosts, OCR languages) configures
//! collaborators and stays out of this crate.

use std::path::PathBuf;

/// Directory settings, read from the environment once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory holding `<form_id>.pdf` templates and `sender_data.json`
    pub template_dir: PathBuf,
    /// Directory receiving filled files
    pub output_dir: PathBuf,
}

impl Settings {
    /// Read `FORM_TEMPLATE_DIR` and `OUTPUT_DIR`, with in-tree defaults.
    pub fn from_env() -> Self {
        Self {
            template_dir: std::env::var_os("FORM_TEMPLATE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data")),
            output_dir: std::env::var_os("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("output")),
        }
    }

    /// Template path for a form.
    pub fn template_path(&self, template_filename: &str) -> PathBuf {
        self.template_dir.join(template_filename)
    }

    /// Sender-data path.
    pub fn sender_data_path(&self) -> PathBuf {
        self.template_dir.join("sender_data.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        let settings = Settings {
            template_dir: PathBuf::from("/srv/forms"),
            output_dir: PathBuf::from("/srv/out"),
        };
        assert_eq!(settings.template_path("S0051.pdf"), PathBuf::from("/srv/forms/S0051.pdf"));
        assert_eq!(
            settings.sender_data_path(),
            PathBuf::from("/srv/forms/sender_data.json")
        );
    }
}
