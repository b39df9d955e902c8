//! Path-to-module resolution.
//!
//! Maps changed file paths onto the configured module map by prefix match.
//! A path may match zero, one, or many modules; the `root` module (when
//! configured) catches everything that matches nothing else.

use std::collections::BTreeSet;

use janus_core::{ModuleMap, ROOT_MODULE};

/// Resolve a set of changed paths to the modules they belong to.
///
/// A path belongs to a module if it starts with any of the module's
/// prefixes; the empty prefix `""` matches every path. When `paths` is empty
/// (upstream sometimes omits file lists), the whole activity is attributed
/// to `root` if configured. When any path fails to match a configured
/// prefix, `root` is added once for the call as the catch-all.
///
/// This function never errors; the worst case is an empty set, which callers
/// must treat as "no module information".
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use janus_knowledge::resolve::resolve_modules;
///
/// let mut map = BTreeMap::new();
/// map.insert("payments".to_string(), vec!["payments/".to_string()]);
/// map.insert("root".to_string(), vec!["".to_string()]);
///
/// let modules = resolve_modules(&["payments/charge.rs".to_string()], &map);
/// assert!(modules.contains("payments"));
/// assert!(modules.contains("root")); // "" prefix matches everything
/// ```
pub fn resolve_modules(paths: &[String], modules: &ModuleMap) -> BTreeSet<String> {
    let mut matched = BTreeSet::new();

    if paths.is_empty() {
        if modules.contains_key(ROOT_MODULE) {
            matched.insert(ROOT_MODULE.to_string());
        }
        return matched;
    }

    let mut any_unmapped = false;
    for path in paths {
        let mut mapped = false;
        for (module_id, prefixes) in modules {
            for prefix in prefixes {
                if prefix.is_empty() || path.starts_with(prefix.as_str()) {
                    matched.insert(module_id.clone());
                    mapped = true;
                }
            }
        }
        if !mapped {
            any_unmapped = true;
        }
    }

    if any_unmapped && modules.contains_key(ROOT_MODULE) {
        matched.insert(ROOT_MODULE.to_string());
    }

    matched
}
