//! `covercrew doctor`
//!
//! Read-only: never installs, starts or pulls anything.

use super::context::Context;
use covercrew_core::{Platform, PythonEnv};

pub async fn run(ctx: &Context) -> anyhow::Result<i32> {
    println!("🏥 covercrew Doctor\n");

    let mut all_ok = true;

    all_ok &= check_python(ctx).await;
    all_ok &= check_platform();
    all_ok &= check_runtime_binary(ctx).await;
    check_runtime_server(ctx).await;
    all_ok &= check_venv(ctx);
    check_manifest(ctx);
    all_ok &= check_entry_point(ctx);

    println!();
    if all_ok {
        println!("✅ All checks passed! Ready to run `covercrew run`.");
        Ok(0)
    } else {
        println!("⚠️  Some checks failed. Please fix the issues above.");
        Ok(1)
    }
}

async fn check_python(ctx: &Context) -> bool {
    print!("Checking Python interpreter... ");

    match ctx.python.find_interpreter().await {
        Some(path) => {
            println!("✅ {}", path.display());
            true
        }
        None => {
            println!("❌ `{}` not found on PATH", ctx.python.interpreter());
            println!("  Install Python 3 with the venv module");
            false
        }
    }
}

fn check_platform() -> bool {
    print!("Checking platform... ");

    let platform = Platform::detect();
    if platform.is_supported() {
        println!("✅ {}", platform);
        true
    } else {
        println!("❌ {}", platform);
        println!("  Only Linux and macOS are supported");
        false
    }
}

async fn check_runtime_binary(ctx: &Context) -> bool {
    print!("Checking Ollama binary... ");

    match ctx.runtime.cli().locate().await {
        Some(path) => {
            println!("✅ {}", path.display());
            true
        }
        None => {
            println!("❌ `{}` not found", ctx.runtime.cli().binary());
            println!("  Run `covercrew install`");
            false
        }
    }
}

/// Informational: `run` starts the server itself when needed
async fn check_runtime_server(ctx: &Context) {
    let client = ctx.runtime.client();
    print!("Checking Ollama server at {}... ", client.base_url());

    match client.version().await {
        Ok(version) => println!("✅ running (v{})", version),
        Err(_) => {
            println!("ℹ️  Not running (started automatically by `covercrew run`)");
            return;
        }
    }

    let installed = match client.list_models().await {
        Ok(models) => models,
        Err(e) => {
            println!("  ⚠️  Could not list models: {}", e);
            return;
        }
    };

    for model in ctx.config.model_refs() {
        if model.is_present_in(&installed) {
            println!("  ✅ Model {}", model);
        } else {
            println!("  ℹ️  Model {} missing (pulled by `covercrew run`)", model);
        }
    }
}

fn check_venv(ctx: &Context) -> bool {
    print!("Checking virtual environment... ");

    let venv = ctx.layout.venv_path();
    if ctx.python.exists(&venv) {
        println!("✅ {}", venv.display());
        true
    } else {
        println!("❌ {} not found", venv.display());
        println!("  Run `covercrew install`");
        false
    }
}

fn check_manifest(ctx: &Context) {
    print!("Checking dependency manifest... ");

    match ctx.layout.find_manifest() {
        Some(path) => println!("✅ {}", path.display()),
        None => println!("ℹ️  None (optional)"),
    }
}

fn check_entry_point(ctx: &Context) -> bool {
    print!("Checking entry point... ");

    let entry = ctx.layout.entry_point_path();
    if ctx.layout.has_entry_point() {
        println!("✅ {}", entry.display());
        true
    } else {
        println!("❌ {} not found", entry.display());
        println!("  Run from the project directory or pass --project-dir");
        false
    }
}
