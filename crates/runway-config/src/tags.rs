use std::collections::BTreeMap;

/// Run and workflow tags. Ordered so serialized records are stable.
pub type Tags = BTreeMap<String, String>;

/// Tag marking a request as a resume/retry of its parent run.
pub const RESUME_RETRY_TAG: &str = "runway/is_resume_retry";

/// Merge two tag maps. Keys present in both take the value from `overrides`.
pub fn merge_tags(base: &Tags, overrides: &Tags) -> Tags {
  let mut merged = base.clone();
  for (key, value) in overrides {
    merged.insert(key.clone(), value.clone());
  }
  merged
}
