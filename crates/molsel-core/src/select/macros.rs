use phf::{Map, phf_map};
use std::collections::HashMap;

/// Built-in selection macros: a static table of named predicate templates.
///
/// Each body is an ordinary selection expression, expanded by the parser in
/// place of the macro name. Keeping these as data rather than code means no
/// ambient evaluation and a table that is trivial to audit.
static BUILTIN_MACROS: Map<&'static str, &'static str> = phf_map! {
    "protein" => "resname ALA ARG ASN ASP ASH CYS CYX CYM GLN GLU GLH GLY \
                  HIS HID HIE HIP HSD HSE HSP ILE LEU LYS LYN MET PHE PRO \
                  SER THR TRP TYR TYM VAL",
    "water" => "resname HOH H2O WAT TIP3 TIP4 TIP5 SPC SPCE SOL",
    "lipids" => "resname POPC POPE POPS POPG DPPC DMPC DOPC DOPE CHL1 PALM OLEO",
    "ions" => "resname NA CL K SOD CLA POT MG MG2 CAL ZN2",
    "hydrogen" => "element H D",
    "noh" => "not hydrogen",
    "backbone" => "protein and name N CA C O OXT",
    "sidechain" => "protein and not name N CA C O OXT",
};

/// Resolves macro names to selection expression bodies.
///
/// User-defined macros (e.g. from a configuration file) are layered on top
/// of the built-in table and take precedence on a name clash. Expansion
/// depth is bounded by the parser, so a self-referential user macro fails
/// with a parse error instead of recursing.
#[derive(Debug, Clone, Default)]
pub struct MacroRegistry {
    user: HashMap<String, String>,
}

impl MacroRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry with the given user macros layered on top of the
    /// built-in table. Names are matched case-insensitively.
    pub fn with_user(user: HashMap<String, String>) -> Self {
        let user = user
            .into_iter()
            .map(|(name, body)| (name.to_ascii_lowercase(), body))
            .collect();
        Self { user }
    }

    /// Defines or replaces a single user macro.
    pub fn define(&mut self, name: &str, body: &str) {
        self.user
            .insert(name.to_ascii_lowercase(), body.to_string());
    }

    pub(crate) fn lookup(&self, name: &str) -> Option<&str> {
        let key = name.to_ascii_lowercase();
        self.user
            .get(&key)
            .map(|s| s.as_str())
            .or_else(|| BUILTIN_MACROS.get(key.as_str()).copied())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }
}
