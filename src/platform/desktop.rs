//! Default desktop adapters: `notify-rust` notifications and the platform's
//! "open with default application" command.

use super::{FileOpener, Notifier};
use anyhow::Context;
use std::path::Path;
use std::process::{Command, Stdio};

/// Application name attached to notifications.
const APP_NAME: &str = "btw";

/// Notifier backed by the OS notification service.
#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    app_name: String,
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_owned(),
        }
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, title: &str, body: &str) -> anyhow::Result<()> {
        notify_rust::Notification::new()
            .appname(&self.app_name)
            .summary(title)
            .body(body)
            .show()
            .context("desktop notification failed")?;
        Ok(())
    }
}

/// Opens files with `xdg-open`, `open`, or `cmd /C start` depending on the OS.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemOpener;

impl FileOpener for SystemOpener {
    fn open(&self, path: &Path) -> anyhow::Result<()> {
        let mut cmd = open_command(path);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        cmd.spawn()
            .with_context(|| format!("failed to launch opener for {}", path.display()))?;
        Ok(())
    }
}

#[cfg(target_os = "windows")]
fn open_command(path: &Path) -> Command {
    let mut cmd = Command::new("cmd");
    // Empty title argument so `start` does not treat a quoted path as the window title.
    cmd.args(["/C", "start", ""]).arg(path);
    cmd
}

#[cfg(target_os = "macos")]
fn open_command(path: &Path) -> Command {
    let mut cmd = Command::new("open");
    cmd.arg(path);
    cmd
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn open_command(path: &Path) -> Command {
    let mut cmd = Command::new("xdg-open");
    cmd.arg(path);
    cmd
}
