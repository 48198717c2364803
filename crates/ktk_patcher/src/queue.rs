//! Priority queue construction.
//!
//! Operations run strictly by category, in [`CATEGORY_ORDER`], regardless of
//! the order they were declared in. Within a category, declaration order is kept.

use crate::config::PatchConfig;
use crate::mods::{Modification, ModificationKind};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Install,
    StringTable,
    StructuredRecord,
    ScriptHack,
    Compile,
    SoundSet,
}

/// Execution order of the categories.
///
/// Installs come first so that a whole-file replacement of the string table
/// lands before per-entry edits; the string table comes before everything that
/// may consume its `StrRefN` tokens; compilation follows byte hacks.
pub const CATEGORY_ORDER: [Category; 6] = [
    Category::Install,
    Category::StringTable,
    Category::StructuredRecord,
    Category::ScriptHack,
    Category::Compile,
    Category::SoundSet,
];

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Category::Install => "install",
            Category::StringTable => "string table",
            Category::StructuredRecord => "structured record",
            Category::ScriptHack => "script hack",
            Category::Compile => "compile",
            Category::SoundSet => "sound set",
        })
    }
}

/// The ordered list of operations for one run.
#[derive(Debug, Clone, Default)]
pub struct OperationQueue {
    items: Vec<Modification>,
}

impl OperationQueue {
    pub fn build(config: &PatchConfig) -> Self {
        let mut items = Vec::with_capacity(config.operation_count());
        for category in CATEGORY_ORDER {
            match category {
                Category::Install => items.extend(config.install.iter().map(Modification::from)),
                Category::StringTable => {
                    items.extend(config.string_table.iter().map(Modification::from))
                }
                Category::StructuredRecord => {
                    items.extend(config.records.iter().map(Modification::from))
                }
                Category::ScriptHack => items.extend(config.hacks.iter().map(Modification::from)),
                Category::Compile => items.extend(config.compile.iter().map(Modification::from)),
                Category::SoundSet => {
                    items.extend(config.sound_sets.iter().map(Modification::from))
                }
            }
        }
        Self { items }
    }

    /// Add an install operation at the end of the install block.
    pub fn push_install(&mut self, modification: Modification) {
        debug_assert!(matches!(modification.kind, ModificationKind::Install));
        let position = self
            .items
            .iter()
            .position(|item| item.category() != Category::Install)
            .unwrap_or(self.items.len());
        self.items.insert(position, modification);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Modification> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn categories(&self) -> Vec<Category> {
        self.items.iter().map(Modification::category).collect()
    }
}

impl<'a> IntoIterator for &'a OperationQueue {
    type Item = &'a Modification;
    type IntoIter = std::slice::Iter<'a, Modification>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PatchTarget;
    use crate::mods::SourceRoot;

    #[test]
    fn test_order_ignores_declaration_order() {
        let config: PatchConfig = toml::from_str(
            r#"
[[ssf]]
source = "a.ssf"

[[compile]]
source = "b.nss"

[[hack]]
source = "c.ncs"

[[gff]]
source = "d.utc"

[[gff]]
source = "f.utc"

[[tlk]]
source = "dialog.tlk"

[[install]]
source = "e.tga"
"#,
        )
        .unwrap();

        let queue = OperationQueue::build(&config);
        assert_eq!(
            queue.categories(),
            vec![
                Category::Install,
                Category::StringTable,
                Category::StructuredRecord,
                Category::StructuredRecord,
                Category::ScriptHack,
                Category::Compile,
                Category::SoundSet,
            ]
        );
        let sources: Vec<_> = queue.iter().map(|m| m.source()).collect();
        assert_eq!(sources[2..4], ["d.utc", "f.utc"]);
    }

    #[test]
    fn test_push_install_lands_before_other_categories() {
        let config: PatchConfig = toml::from_str(
            r#"
[[install]]
source = "e.tga"

[[compile]]
source = "k_act.nss"
"#,
        )
        .unwrap();
        let mut queue = OperationQueue::build(&config);

        queue.push_install(
            Modification::new(
                PatchTarget::new("nwscript.nss").with_replace(true),
                ModificationKind::Install,
            )
            .with_source_root(SourceRoot::Scratch),
        );

        let sources: Vec<_> = queue.iter().map(|m| m.source()).collect();
        assert_eq!(sources, ["e.tga", "nwscript.nss", "k_act.nss"]);
    }

    #[test]
    fn test_empty_config() {
        assert!(OperationQueue::build(&PatchConfig::default()).is_empty());
    }
}
