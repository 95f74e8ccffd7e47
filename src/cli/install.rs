//! `covercrew install`

use super::context::Context;
use covercrew_core::{wait_for_shutdown_signal, AppExit, InstallReport, Installer};
use std::path::Path;
use tracing::warn;

pub async fn run(ctx: &Context, reinstall: bool) -> anyhow::Result<i32> {
    println!("📦 Installing covercrew in {}\n", ctx.layout.root().display());

    let installer = Installer::new(
        ctx.runtime.clone(),
        ctx.python.clone(),
        ctx.layout.clone(),
        ctx.installer_config(reinstall),
    );

    // Dropping the install future on interrupt also kills a runtime it
    // spawned (kill-on-drop)
    let report = tokio::select! {
        result = installer.install() => result?,
        _ = wait_for_shutdown_signal() => {
            warn!("Interrupted, installation aborted");
            return Ok(AppExit::interrupted().code());
        }
    };

    println!();
    for line in summary(&report, &ctx.layout.manifest_path()) {
        println!("{}", line);
    }

    println!("\n🎉 Installation complete. Start the app with `covercrew run`.");
    Ok(0)
}

/// One line per install step outcome
fn summary(report: &InstallReport, manifest: &Path) -> Vec<String> {
    let mut lines = Vec::new();

    if report.runtime_installed {
        lines.push("✅ Ollama installed".to_string());
    } else {
        lines.push("✅ Ollama already installed".to_string());
    }
    for model in &report.models_pulled {
        lines.push(format!("✅ Model {}", model));
    }
    if report.venv_created {
        lines.push("✅ Virtual environment created".to_string());
    } else {
        lines.push("✅ Virtual environment already present".to_string());
    }
    if report.requirements_installed {
        lines.push("✅ Python dependencies installed".to_string());
    } else {
        lines.push(format!(
            "ℹ️  No {}, dependency install skipped",
            manifest.display()
        ));
    }

    lines
}
