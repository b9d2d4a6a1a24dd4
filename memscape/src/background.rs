//! Applies the rendered image as the desktop background

use crate::config::BackgroundConfig;
use std::path::Path;
use std::process::Command;
use tracing::{info, warn};

pub trait BackgroundSetter {
    /// Fire-and-forget: failures are logged, never returned.
    fn apply(&self, image: &Path);
}

/// Runs an external command such as `gsettings set ... picture-uri {uri}`.
pub struct CommandBackgroundSetter {
    command: String,
    args: Vec<String>,
}

impl CommandBackgroundSetter {
    pub fn new(config: &BackgroundConfig) -> Self {
        Self {
            command: config.command.clone(),
            args: config.args.clone(),
        }
    }

    pub fn expand_args(&self, image: &Path) -> Vec<String> {
        let absolute = image.canonicalize().unwrap_or_else(|_| image.to_path_buf());
        let path = absolute.to_string_lossy();
        let uri = format!("file://{}", path);
        self.args
            .iter()
            .map(|arg| arg.replace("{path}", &path).replace("{uri}", &uri))
            .collect()
    }
}

impl BackgroundSetter for CommandBackgroundSetter {
    fn apply(&self, image: &Path) {
        let args = self.expand_args(image);
        match Command::new(&self.command).args(&args).status() {
            Ok(status) if status.success() => info!("Background set to {:?}", image),
            Ok(status) => warn!("{} exited with {}", self.command, status),
            Err(e) => warn!("Failed to run {}: {}", self.command, e),
        }
    }
}
