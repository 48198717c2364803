use crate::errors::CliError;
use crate::println_pad;
use crate::utils::ensure_mod_dir;
use camino::Utf8PathBuf;
use colored::Colorize;
use ktk_patcher::patcher::STAGING_DIR;
use ktk_patcher::{OperationQueue, PatchConfig};
use miette::{Result, WrapErr};

#[derive(Debug)]
pub struct PlanModArgs {
    pub mod_dir: Utf8PathBuf,
}

pub fn plan_mod(args: PlanModArgs) -> Result<()> {
    ensure_mod_dir(&args.mod_dir)?;

    let staging_dir = args.mod_dir.join(STAGING_DIR);
    let config_path =
        PatchConfig::find(&staging_dir).ok_or_else(|| CliError::config_not_found(staging_dir.clone()))?;
    let config = PatchConfig::load(&config_path)
        .map_err(CliError::from)
        .wrap_err_with(|| format!("Failed to load {}", config_path))?;
    let queue = OperationQueue::build(&config);

    let settings = &config.settings;
    println_pad!(
        "{} {}",
        "📦 Mod:".bright_blue().bold(),
        settings
            .name
            .as_deref()
            .unwrap_or("(unnamed)")
            .bright_cyan()
            .bold()
    );
    println_pad!(
        "{} {}",
        "⚙️  Override policy:".bright_green(),
        settings.override_policy.to_string().bright_white()
    );
    if let Some(game) = settings.game {
        println_pad!("{} {}", "🎮 Written for:".bright_yellow(), game);
    }
    if !settings.required_files.is_empty() {
        println_pad!(
            "{} {}",
            "📎 Requires:".bright_yellow(),
            settings.required_files.join(", ")
        );
    }

    println_pad!("\n{}", "🧾 Operations:".bright_magenta().bold());
    if queue.is_empty() {
        println_pad!("   {}", "(none)".dimmed());
    }
    let mut current = None;
    for (index, modification) in queue.iter().enumerate() {
        let category = modification.category();
        if current != Some(category) {
            println_pad!("   {}", category.to_string().bright_cyan().bold());
            current = Some(category);
        }
        println_pad!(
            "     {} {}",
            format!("{:>3}.", index + 1).dimmed(),
            modification.describe()
        );
    }
    if !config.compile.is_empty() {
        println_pad!(
            "\n{}",
            "A bundled nwscript.nss, if present, is installed before compiling.".dimmed()
        );
    }

    Ok(())
}
