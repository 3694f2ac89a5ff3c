use crate::language::Language;
use std::collections::HashMap;

/// Maps requested language codes to the code they should resolve as.
///
/// Resolution is a single hop: an alias target is never looked up again.
#[derive(Debug, Clone, Default)]
pub struct AliasResolver {
    aliases: HashMap<Language, Language>,
}

impl AliasResolver {
    pub fn new(aliases: HashMap<Language, Language>) -> Self {
        Self { aliases }
    }

    pub fn resolve(&self, language: Language) -> Language {
        self.aliases.get(&language).copied().unwrap_or(language)
    }
}
