//! Script source compilation.
//!
//! The source is read from the scratch directory, `#StrRefN#` tokens are
//! substituted, and the processed text is written back so that other scripts
//! including it see the same values. Sources without an entry point are
//! include files: they produce nothing to write.

use super::PatchContext;
use crate::codecs::CompileContext;
use crate::error::Result;
use crate::utils::validate_file_name;
use regex::Regex;
use std::sync::OnceLock;

fn comment_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?s)/\*.*?\*/|//[^\n]*").expect("static regex"))
}

fn entry_point_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\b(?:void\s+main|int\s+StartingConditional)\s*\(").expect("static regex")
    })
}

/// `true` if the source defines neither `main` nor `StartingConditional`.
pub fn is_include_only(source: &str) -> bool {
    let code = comment_pattern().replace_all(source, " ");
    !entry_point_pattern().is_match(&code)
}

pub(crate) fn apply(filename: &str, source: &[u8], ctx: &mut PatchContext<'_>) -> Result<Option<Vec<u8>>> {
    let text = String::from_utf8_lossy(source);
    let processed = ctx.memory.substitute(&text)?;

    let source_path = ctx.scratch_dir.join(validate_file_name(filename)?);
    std::fs::write(source_path.as_std_path(), processed.as_bytes())?;

    if is_include_only(&processed) {
        tracing::info!("'{}' has no entry point; treating it as an include file", filename);
        return Ok(None);
    }

    let compiler = ctx.codecs.compiler()?;
    let context = CompileContext {
        source_path,
        include_dir: ctx.scratch_dir.to_path_buf(),
        game: ctx.game,
    };
    compiler.compile(&processed, &context).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_include_detection() {
        assert!(is_include_only("int GetIsPartyLeader(object o) { return 0; }"));
        assert!(is_include_only("// void main() {}\nint x;"));
        assert!(is_include_only("/* void main()\n{ } */ const int X = 1;"));
        assert!(!is_include_only("#include \"k_inc_debug\"\nvoid main()\n{\n}"));
        assert!(!is_include_only("int StartingConditional() { return TRUE; }"));
        assert!(!is_include_only("void   main ( ) {}"));
        assert!(is_include_only("void mainly() {}"));
    }
}
