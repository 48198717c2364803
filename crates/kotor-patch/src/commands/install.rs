use crate::errors::CliError;
use crate::println_pad;
use crate::utils::{ensure_game_dir, ensure_mod_dir};
use camino::Utf8PathBuf;
use colored::Colorize;
use ktk_patcher::{
    ExternalCompiler, FailureSeverity, OverridePolicy, PatchConfig, PatchStage, Patcher, RunContext,
};
use miette::{Result, WrapErr};

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OverridePolicyArg {
    Ignore,
    Warn,
    Rename,
}

impl From<OverridePolicyArg> for OverridePolicy {
    fn from(arg: OverridePolicyArg) -> Self {
        match arg {
            OverridePolicyArg::Ignore => OverridePolicy::Ignore,
            OverridePolicyArg::Warn => OverridePolicy::Warn,
            OverridePolicyArg::Rename => OverridePolicy::Rename,
        }
    }
}

#[derive(Debug)]
pub struct InstallModArgs {
    pub mod_dir: Utf8PathBuf,
    pub game_dir: Utf8PathBuf,
    pub override_policy: Option<OverridePolicyArg>,
    pub keep_scripts: bool,
    pub compiler: Option<Utf8PathBuf>,
}

pub fn install_mod(args: InstallModArgs) -> Result<()> {
    ensure_mod_dir(&args.mod_dir)?;
    ensure_game_dir(&args.game_dir)?;

    let mut context = RunContext::new(args.game_dir.clone(), args.mod_dir.clone());
    if PatchConfig::find(&context.staging_dir).is_none() {
        return Err(CliError::config_not_found(context.staging_dir.clone()).into());
    }
    if let Some(policy) = args.override_policy {
        context = context.with_override_policy(policy.into());
    }
    if args.keep_scripts {
        context = context.with_save_processed_scripts(true);
    }

    let mut patcher = Patcher::load(context)
        .map_err(CliError::from)
        .wrap_err("Failed to load the mod's change-list")?
        .with_progress(|progress| {
            if progress.stage == PatchStage::Applying {
                let counter = format!("[{}/{}]", progress.current, progress.total);
                println_pad!(
                    "{} {}",
                    counter.dimmed(),
                    progress.description.unwrap_or_default()
                );
            }
        });
    if let Some(compiler) = &args.compiler {
        if !compiler.is_file() {
            return Err(CliError::Patcher(ktk_patcher::Error::Other(format!(
                "Script compiler not found: {}",
                compiler
            )))
            .into());
        }
        patcher = patcher.with_compiler(ExternalCompiler::new(compiler.clone()));
    }

    let name = patcher
        .config()
        .settings
        .name
        .clone()
        .unwrap_or_else(|| args.mod_dir.file_name().unwrap_or("mod").to_string());
    println_pad!("{} {}", "📦 Installing".bright_blue().bold(), name.bright_cyan().bold());

    let summary = patcher.run().map_err(CliError::from)?;

    println!();
    println_pad!(
        "{} {} succeeded, {} skipped, {} failed",
        "📋 Summary:".bright_magenta().bold(),
        summary.succeeded.to_string().bright_green(),
        summary.skipped.to_string().bright_white(),
        summary.failed().to_string().bright_red()
    );
    for warning in &summary.warnings {
        println_pad!("   {} {}", "⚠".bright_yellow(), warning);
    }
    for failure in &summary.failures {
        let marker = match failure.severity {
            FailureSeverity::Hard => "✖".bright_red().bold(),
            FailureSeverity::Soft => "✖".red(),
        };
        println_pad!("   {} {}: {}", marker, failure.operation, failure.message);
    }
    if !summary.backups.is_empty() {
        println_pad!(
            "{} {} file(s) backed up",
            "💾".bright_blue(),
            summary.backups.len()
        );
    }

    if summary.cancelled {
        return Err(CliError::InstallCancelled.into());
    }
    if summary.failed() > 0 {
        return Err(CliError::InstallIncomplete {
            failed: summary.failed(),
            attempted: summary.attempted,
        }
        .into());
    }

    println_pad!("{}", "✅ Install complete".bright_green().bold());
    Ok(())
}
