use crate::errors::CliError;
use crate::println_pad;
use crate::utils::{ensure_game_dir, ensure_mod_dir};
use camino::Utf8PathBuf;
use colored::Colorize;
use ktk_patcher::patcher::BACKUP_DIR;
use ktk_patcher::{list_backups, restore_latest};
use miette::{miette, Result};

#[derive(Debug)]
pub struct UninstallModArgs {
    pub mod_dir: Utf8PathBuf,
    pub game_dir: Utf8PathBuf,
}

pub fn uninstall_mod(args: UninstallModArgs) -> Result<()> {
    ensure_mod_dir(&args.mod_dir)?;
    ensure_game_dir(&args.game_dir)?;

    let backup_root = args.mod_dir.join(BACKUP_DIR);
    let backups = list_backups(&backup_root).map_err(CliError::from)?;
    if backups.is_empty() {
        return Err(miette!(
            help = "Backups are created in the mod's backup/ directory during install",
            "No backups found in {}",
            backup_root
        ));
    }

    let summary = restore_latest(&backup_root, &args.game_dir).map_err(CliError::from)?;

    println_pad!(
        "{} {}",
        "♻️  Restored from".bright_blue().bold(),
        summary.backup_dir.as_str().bright_cyan()
    );
    for path in &summary.removed {
        println_pad!("   {} {}", "-".bright_red(), path);
    }
    for path in &summary.restored {
        println_pad!("   {} {}", "+".bright_green(), path);
    }
    println_pad!(
        "{} {} removed, {} restored",
        "✅".bright_green(),
        summary.removed.len(),
        summary.restored.len()
    );
    if backups.len() > 1 {
        println_pad!(
            "{}",
            format!("{} older backup(s) remain", backups.len() - 1).dimmed()
        );
    }
    Ok(())
}
