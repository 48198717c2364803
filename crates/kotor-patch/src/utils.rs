use crate::errors::CliError;
use camino::Utf8Path;
use miette::Result;

#[macro_export]
macro_rules! println_pad {
    ($($arg:tt)*) => {{
        let __s = format!($($arg)*);
        for __line in __s.lines() {
            println!("    {}", __line);
        }
    }};
}

pub fn ensure_mod_dir(path: &Utf8Path) -> Result<()> {
    if !path.is_dir() {
        return Err(CliError::mod_dir_not_found(path.to_path_buf()).into());
    }
    Ok(())
}

pub fn ensure_game_dir(path: &Utf8Path) -> Result<()> {
    if !path.is_dir() {
        return Err(CliError::game_dir_not_found(path.to_path_buf()).into());
    }
    Ok(())
}
