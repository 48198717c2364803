use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    #[error("Mod directory not found: {path}")]
    #[diagnostic(
        code(mod_dir::not_found),
        help("Point --mod-dir at the folder that contains tslpatchdata/")
    )]
    ModDirNotFound { path: Utf8PathBuf },

    #[error("Game directory not found: {path}")]
    #[diagnostic(
        code(game_dir::not_found),
        help("Point --game-dir at the folder that contains swkotor.exe or swkotor2.exe")
    )]
    GameDirNotFound { path: Utf8PathBuf },

    #[error("Change-list not found in {search_path}")]
    #[diagnostic(
        code(config::not_found),
        help("Create a changes.toml or changes.json file in the mod's tslpatchdata/ directory")
    )]
    ConfigNotFound { search_path: Utf8PathBuf },

    #[error("Install finished with {failed} failed operation(s) out of {attempted}")]
    #[diagnostic(
        code(install::partial),
        help("See installlog.txt in the mod directory for details. Run `kotor-patch uninstall` to roll back")
    )]
    InstallIncomplete { failed: usize, attempted: usize },

    #[error("Install cancelled")]
    #[diagnostic(code(install::cancelled))]
    InstallCancelled,

    #[error(transparent)]
    #[diagnostic(code(patcher::error))]
    Patcher(#[from] ktk_patcher::Error),
}

impl CliError {
    pub fn mod_dir_not_found(path: Utf8PathBuf) -> Self {
        Self::ModDirNotFound { path }
    }

    pub fn game_dir_not_found(path: Utf8PathBuf) -> Self {
        Self::GameDirNotFound { path }
    }

    pub fn config_not_found(search_path: Utf8PathBuf) -> Self {
        Self::ConfigNotFound { search_path }
    }
}
