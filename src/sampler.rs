//! Question sampling: draw a fixed-size set of clue images from a qualifying
//! country record.
//!
//! The RNG and the used-image ledger are both explicit parameters so callers
//! (and tests) fully control randomness and repetition state; nothing in this
//! module touches an ambient source.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::{CountryRecord, Question, QuestionImage, QuizFilters, SamplingMode, UsedImageLedger};
use crate::filter::{clue_type_groups, qualifies};

/// Choose one record among the candidates, avoiding the country served in the
/// previous round whenever another choice exists.
pub fn pick_candidate<'a, R: Rng + ?Sized>(
  candidates: &[&'a CountryRecord],
  last_country: Option<&str>,
  rng: &mut R,
) -> Option<&'a CountryRecord> {
  if candidates.is_empty() {
    return None;
  }
  if candidates.len() > 1 {
    if let Some(last) = last_country {
      let others: Vec<&CountryRecord> = candidates
        .iter()
        .copied()
        .filter(|r| r.country != last)
        .collect();
      if !others.is_empty() {
        return others.choose(rng).copied();
      }
    }
  }
  candidates.choose(rng).copied()
}

/// Build a question from `record` under `filters`, or `None` when the record
/// does not actually satisfy the clue-count requirement (defensive re-check;
/// the caller is expected to pre-filter).
pub fn sample_question<R: Rng + ?Sized>(
  record: &CountryRecord,
  filters: &QuizFilters,
  ledger: &mut UsedImageLedger,
  rng: &mut R,
) -> Option<Question> {
  if !qualifies(record, filters) {
    return None;
  }
  let clue_count = filters.clue_count();

  let images = match filters.mode() {
    SamplingMode::PerType => sample_per_type(record, filters, clue_count, ledger, rng),
    SamplingMode::Pooled => sample_pooled(record, filters, clue_count, rng),
  };
  debug_assert_eq!(images.len(), clue_count);

  for img in &images {
    ledger.mark_used(&record.country, &img.clue_type, &img.url);
  }

  Some(Question {
    correct_country: record.country.clone(),
    images,
  })
}

/// One image per clue type: merge the usable items by type, shuffle the
/// distinct types, take the first `clue_count`, then draw one image per type
/// honoring the ledger. Items sharing a type label pool their images.
fn sample_per_type<R: Rng + ?Sized>(
  record: &CountryRecord,
  filters: &QuizFilters,
  clue_count: usize,
  ledger: &mut UsedImageLedger,
  rng: &mut R,
) -> Vec<QuestionImage> {
  let mut groups = clue_type_groups(record, filters);
  groups.shuffle(rng);
  groups.truncate(clue_count);

  groups
    .into_iter()
    .map(|group| QuestionImage {
      url: pick_image(&group.images, group.clue_type, &record.country, ledger, rng),
      clue_type: group.clue_type.to_string(),
    })
    .collect()
}

/// Pooled mode: every image of the requested type across all items, shuffled,
/// first `clue_count` taken. Type repeats are expected here.
fn sample_pooled<R: Rng + ?Sized>(
  record: &CountryRecord,
  filters: &QuizFilters,
  clue_count: usize,
  rng: &mut R,
) -> Vec<QuestionImage> {
  let mut pool: Vec<QuestionImage> = record
    .items
    .iter()
    .filter(|item| item.has_images() && filters.matches_type(&item.clue_type))
    .flat_map(|item| {
      item.images.iter().map(|url| QuestionImage {
        url: url.clone(),
        clue_type: item.clue_type.clone(),
      })
    })
    .collect();
  pool.shuffle(rng);
  pool.truncate(clue_count);
  pool
}

/// Draw one of `images` that has not been shown for this country and type
/// yet. Once every image of the type has been shown, the ledger entry cycles
/// and the whole list becomes eligible again.
fn pick_image<R: Rng + ?Sized>(
  images: &[&str],
  clue_type: &str,
  country: &str,
  ledger: &mut UsedImageLedger,
  rng: &mut R,
) -> String {
  let fresh: Vec<&str> = match ledger.used_for(country, clue_type) {
    Some(used) => images.iter().copied().filter(|u| !used.contains(*u)).collect(),
    None => images.to_vec(),
  };
  if let Some(url) = fresh.choose(rng) {
    return (*url).to_string();
  }
  // Every image of this type has been shown once: cycle the ledger entry and
  // draw from the full list again.
  ledger.reset_type(country, clue_type);
  images.choose(rng).map(|u| u.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
  use std::collections::HashSet;

  use rand::rngs::StdRng;
  use rand::SeedableRng;

  use super::*;
  use crate::domain::ClueItem;

  fn record(country: &str, items: &[(&str, &[&str])]) -> CountryRecord {
    CountryRecord {
      country: country.into(),
      region: String::new(),
      items: items
        .iter()
        .map(|(t, imgs)| ClueItem {
          clue_type: (*t).into(),
          images: imgs.iter().map(|s| s.to_string()).collect(),
        })
        .collect(),
    }
  }

  fn five_types() -> CountryRecord {
    record(
      "France",
      &[
        ("bollard", &["b1", "b2"]),
        ("pole", &["p1"]),
        ("sign", &["s1", "s2", "s3"]),
        ("plate", &["l1"]),
        ("chevron", &["c1"]),
      ],
    )
  }

  #[test]
  fn per_type_returns_exactly_k_images_with_distinct_types() {
    let r = five_types();
    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..50 {
      let mut ledger = UsedImageLedger::new();
      let q = sample_question(&r, &QuizFilters::default(), &mut ledger, &mut rng)
        .expect("record qualifies");
      assert_eq!(q.images.len(), 3);
      let types: HashSet<&str> = q.images.iter().map(|i| i.clue_type.as_str()).collect();
      assert_eq!(types.len(), 3, "types must not repeat in per-type mode");
      assert_eq!(q.correct_country, "France");
    }
  }

  #[test]
  fn pooled_mode_allows_repeated_types() {
    let r = record("France", &[("bollard", &["b1", "b2", "b3", "b4"])]);
    let filters = QuizFilters {
      clue_type: Some("bollard".into()),
      ..Default::default()
    };
    let mut rng = StdRng::seed_from_u64(2);
    let mut ledger = UsedImageLedger::new();
    let q = sample_question(&r, &filters, &mut ledger, &mut rng).expect("qualifies pooled");
    assert_eq!(q.images.len(), 3);
    assert!(q.images.iter().all(|i| i.clue_type == "bollard"));
    // URLs are distinct because the pool is shuffled, not drawn with replacement.
    let urls: HashSet<&str> = q.images.iter().map(|i| i.url.as_str()).collect();
    assert_eq!(urls.len(), 3);
  }

  #[test]
  fn defensive_recheck_returns_none() {
    let r = record("France", &[("bollard", &["b1"])]);
    let mut rng = StdRng::seed_from_u64(3);
    let mut ledger = UsedImageLedger::new();
    assert!(sample_question(&r, &QuizFilters::default(), &mut ledger, &mut rng).is_none());
  }

  #[test]
  fn seeded_rng_makes_sampling_deterministic() {
    let r = five_types();
    let filters = QuizFilters::default();

    let mut ledger_a = UsedImageLedger::new();
    let mut rng_a = StdRng::seed_from_u64(42);
    let a: Vec<Question> = (0..5)
      .map(|_| sample_question(&r, &filters, &mut ledger_a, &mut rng_a).unwrap())
      .collect();

    let mut ledger_b = UsedImageLedger::new();
    let mut rng_b = StdRng::seed_from_u64(42);
    let b: Vec<Question> = (0..5)
      .map(|_| sample_question(&r, &filters, &mut ledger_b, &mut rng_b).unwrap())
      .collect();

    assert_eq!(a, b, "identical seeds must replay identical questions");
  }

  #[test]
  fn ledger_prevents_repeats_until_type_is_exhausted() {
    let r = record(
      "France",
      &[("sign", &["s1", "s2", "s3"]), ("pole", &["p1"]), ("bollard", &["b1"])],
    );
    let mut rng = StdRng::seed_from_u64(7);
    let mut ledger = UsedImageLedger::new();

    // Every question uses all three types; track the sign images drawn.
    let mut seen_signs: Vec<String> = Vec::new();
    for _ in 0..3 {
      let q = sample_question(&r, &QuizFilters::default(), &mut ledger, &mut rng).unwrap();
      let sign = q.images.iter().find(|i| i.clue_type == "sign").unwrap();
      seen_signs.push(sign.url.clone());
    }
    let distinct: HashSet<&String> = seen_signs.iter().collect();
    assert_eq!(distinct.len(), 3, "no sign image may repeat within one cycle");

    // A fourth draw starts a fresh cycle over the full list.
    let q = sample_question(&r, &QuizFilters::default(), &mut ledger, &mut rng).unwrap();
    let sign = q.images.iter().find(|i| i.clue_type == "sign").unwrap();
    assert!(seen_signs.contains(&sign.url));
  }

  #[test]
  fn duplicate_type_items_pool_their_images_instead_of_repeating_the_type() {
    let r = record(
      "France",
      &[("bollard", &["a"]), ("bollard", &["b"]), ("pole", &["c"])],
    );

    // Three items but two distinct types: the default clue count of 3 is
    // out of reach, so the record must not qualify.
    let mut rng = StdRng::seed_from_u64(23);
    let mut ledger = UsedImageLedger::new();
    assert!(sample_question(&r, &QuizFilters::default(), &mut ledger, &mut rng).is_none());

    let filters = QuizFilters {
      clue_count: Some(2),
      ..Default::default()
    };
    let mut seen_bollards: HashSet<String> = HashSet::new();
    for _ in 0..50 {
      let mut ledger = UsedImageLedger::new();
      let q = sample_question(&r, &filters, &mut ledger, &mut rng).expect("two types qualify");
      assert_eq!(q.images.len(), 2);
      let types: HashSet<&str> = q.images.iter().map(|i| i.clue_type.as_str()).collect();
      assert_eq!(types.len(), 2, "types must not repeat in per-type mode");
      let bollard = q.images.iter().find(|i| i.clue_type == "bollard").unwrap();
      seen_bollards.insert(bollard.url.clone());
    }
    // Both same-type items contribute to the merged image pool.
    assert_eq!(seen_bollards, HashSet::from(["a".to_string(), "b".to_string()]));
  }

  #[test]
  fn pick_candidate_avoids_previous_country_when_possible() {
    let fr = record("France", &[("a", &["1"])]);
    let de = record("Germany", &[("a", &["1"])]);
    let all = vec![&fr, &de];
    let mut rng = StdRng::seed_from_u64(11);

    for _ in 0..20 {
      let picked = pick_candidate(&all, Some("France"), &mut rng).unwrap();
      assert_eq!(picked.country, "Germany");
    }

    // With a single candidate the previous country is re-served.
    let only = vec![&fr];
    let picked = pick_candidate(&only, Some("France"), &mut rng).unwrap();
    assert_eq!(picked.country, "France");

    assert!(pick_candidate::<StdRng>(&[], None, &mut rng).is_none());
  }
}
