//! Verbose C name generation.
//!
//! Every user-defined symbol gets a collision-free C identifier built from a
//! kind tag, the sanitized CO name and a unique counter. Native symbols do
//! not come through here; they map to names registered in the emitter.

/// Generates unique, readable C identifiers.
#[derive(Default)]
pub struct NameGen {
    counter: u32,
}

impl NameGen {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh identifier like `co_f_main_3`.
    pub fn fresh(&mut self, kind: &str, name: &str) -> String {
        let id = self.counter;
        self.counter += 1;
        format!("co_{kind}_{}_{id}", sanitize(name))
    }
}

/// Keeps identifier characters and replaces everything else, so a synthesized
/// or odd CO name still yields a valid C identifier.
fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "anon".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_unique() {
        let mut names = NameGen::new();
        let a = names.fresh("f", "main");
        let b = names.fresh("f", "main");
        assert_ne!(a, b);
    }

    #[test]
    fn odd_names_are_sanitized() {
        let mut names = NameGen::new();
        let name = names.fresh("t", "");
        assert_eq!(name, "co_t_anon_0");
    }
}
