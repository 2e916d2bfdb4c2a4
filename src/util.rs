//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
/// Used for reasoning strings in scoring profiles (e.g. `{length}`).
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// Length of an answer as the scorer sees it: Unicode code points, not bytes.
pub fn char_len(s: &str) -> usize {
  s.chars().count()
}
