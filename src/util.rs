//! Small utility helpers used across modules.

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request payloads (a WS message can carry a
/// long image URL list). Truncates on a char boundary.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  let cut = (1..=max).rev().find(|i| s.is_char_boundary(*i)).unwrap_or(0);
  format!("{}… ({} bytes total)", &s[..cut], s.len())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn short_strings_pass_through() {
    assert_eq!(trunc_for_log("hello", 10), "hello");
  }

  #[test]
  fn long_strings_are_truncated_with_size() {
    let out = trunc_for_log(&"x".repeat(300), 16);
    assert!(out.starts_with(&"x".repeat(16)));
    assert!(out.contains("300 bytes total"));
  }

  #[test]
  fn truncation_respects_char_boundaries() {
    // 'é' is two bytes; cutting at 1 must not split it.
    let out = trunc_for_log("ééééé", 3);
    assert!(out.starts_with("é"));
  }
}
