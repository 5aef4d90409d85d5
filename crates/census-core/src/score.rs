//! Survey scoring — totals over Likert-style answers and threshold-band
//! assessment labels.
//!
//! Screening instruments name their scored questions with a shared
//! "response" prefix; a follow-up question (e.g. perceived difficulty) lives
//! under its own key and only becomes mandatory once any scored answer is
//! non-zero. Bilateral instruments score each side independently.

use std::collections::BTreeMap;

// ─── Answers ─────────────────────────────────────────────────────────────────

/// Accumulated answers for one sheet, keyed by question key.
#[derive(Debug, Clone, Default)]
pub struct AnswerSheet {
  answers: BTreeMap<String, i64>,
}

impl AnswerSheet {
  pub fn new() -> Self { Self::default() }

  /// Record (or overwrite) the answer for a question.
  pub fn record(&mut self, key: impl Into<String>, value: i64) {
    self.answers.insert(key.into(), value);
  }

  pub fn get(&self, key: &str) -> Option<i64> {
    self.answers.get(key).copied()
  }

  /// Sum of all answers whose key starts with `prefix` — the
  /// "response"-tagged naming convention.
  pub fn total_matching(&self, prefix: &str) -> i64 {
    self
      .answers
      .iter()
      .filter(|(key, _)| key.starts_with(prefix))
      .map(|(_, value)| value)
      .sum()
  }
}

// ─── Bands ───────────────────────────────────────────────────────────────────

/// One assessment band: an inclusive upper bound and its label. Bands are
/// ordered; the first band admitting a total wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreBand {
  pub upper: i64,
  pub label: String,
}

impl ScoreBand {
  pub fn new(upper: i64, label: impl Into<String>) -> Self {
    Self { upper, label: label.into() }
  }
}

// ─── Instrument ──────────────────────────────────────────────────────────────

/// A scored screening instrument: the keys that count toward the total, an
/// optional follow-up key, and the ordered band table.
#[derive(Debug, Clone)]
pub struct Instrument {
  pub name:          String,
  pub response_keys: Vec<String>,
  pub follow_up_key: Option<String>,
  pub bands:         Vec<ScoreBand>,
}

impl Instrument {
  pub fn new(
    name: impl Into<String>,
    response_keys: Vec<String>,
    follow_up_key: Option<String>,
    bands: Vec<ScoreBand>,
  ) -> Self {
    Self { name: name.into(), response_keys, follow_up_key, bands }
  }

  /// The PHQ-9 depression screen: nine scored questions, one follow-up, the
  /// standard five severity bands.
  pub fn phq9() -> Self {
    Self::new(
      "PHQ-9",
      (1..=9).map(|n| format!("response_{n}")).collect(),
      Some("difficulty".to_owned()),
      vec![
        ScoreBand::new(4, "Minimal depression"),
        ScoreBand::new(9, "Mild depression"),
        ScoreBand::new(14, "Moderate depression"),
        ScoreBand::new(19, "Moderately severe depression"),
        ScoreBand::new(27, "Severe depression"),
      ],
    )
  }

  /// Total score: the sum of this instrument's response keys. Unanswered
  /// questions contribute nothing.
  pub fn total(&self, sheet: &AnswerSheet) -> i64 {
    self
      .response_keys
      .iter()
      .filter_map(|key| sheet.get(key))
      .sum()
  }

  /// Whether the sheet can be saved: every scored question answered, and the
  /// follow-up answered when it exists and the total is non-zero.
  pub fn is_complete(&self, sheet: &AnswerSheet) -> bool {
    if !self.response_keys.iter().all(|key| sheet.get(key).is_some()) {
      return false;
    }
    match &self.follow_up_key {
      Some(key) if self.total(sheet) != 0 => sheet.get(key).is_some(),
      _ => true,
    }
  }

  /// Map a total to its assessment label: first band whose inclusive upper
  /// bound admits it. `None` when the total exceeds every band.
  pub fn assessment(&self, total: i64) -> Option<&str> {
    self
      .bands
      .iter()
      .find(|band| total <= band.upper)
      .map(|band| band.label.as_str())
  }
}

// ─── Bilateral instruments ───────────────────────────────────────────────────

/// A two-sided instrument (e.g. left/right knee assessments): each side keeps
/// its own key list over a shared band table and completes independently.
#[derive(Debug, Clone)]
pub struct BilateralInstrument {
  pub left:  Instrument,
  pub right: Instrument,
}

impl BilateralInstrument {
  /// Build both sides from a base instrument by prefixing every question key
  /// with `left_` / `right_`.
  pub fn from_base(base: &Instrument) -> Self {
    let side = |prefix: &str| Instrument {
      name:          format!("{} ({prefix})", base.name),
      response_keys: base
        .response_keys
        .iter()
        .map(|key| format!("{prefix}_{key}"))
        .collect(),
      follow_up_key: base
        .follow_up_key
        .as_ref()
        .map(|key| format!("{prefix}_{key}")),
      bands:         base.bands.clone(),
    };
    Self { left: side("left"), right: side("right") }
  }

  pub fn totals(&self, sheet: &AnswerSheet) -> (i64, i64) {
    (self.left.total(sheet), self.right.total(sheet))
  }

  pub fn assessments(
    &self,
    sheet: &AnswerSheet,
  ) -> (Option<&str>, Option<&str>) {
    (
      self.left.assessment(self.left.total(sheet)),
      self.right.assessment(self.right.total(sheet)),
    )
  }

  /// Both sides must be complete before the sheet can be saved.
  pub fn is_complete(&self, sheet: &AnswerSheet) -> bool {
    self.left.is_complete(sheet) && self.right.is_complete(sheet)
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  fn answered_phq9(values: &[i64]) -> AnswerSheet {
    let mut sheet = AnswerSheet::new();
    for (i, v) in values.iter().enumerate() {
      sheet.record(format!("response_{}", i + 1), *v);
    }
    sheet
  }

  #[test]
  fn phq9_total_of_twelve_is_moderate() {
    let phq9 = Instrument::phq9();
    let sheet = answered_phq9(&[2, 2, 2, 2, 2, 2, 0, 0, 0]);
    let total = phq9.total(&sheet);
    assert_eq!(total, 12);
    assert_eq!(phq9.assessment(total), Some("Moderate depression"));
  }

  #[test]
  fn band_edges_are_inclusive() {
    let phq9 = Instrument::phq9();
    assert_eq!(phq9.assessment(0), Some("Minimal depression"));
    assert_eq!(phq9.assessment(4), Some("Minimal depression"));
    assert_eq!(phq9.assessment(5), Some("Mild depression"));
    assert_eq!(phq9.assessment(14), Some("Moderate depression"));
    assert_eq!(phq9.assessment(15), Some("Moderately severe depression"));
    assert_eq!(phq9.assessment(27), Some("Severe depression"));
    assert_eq!(phq9.assessment(28), None);
  }

  #[test]
  fn follow_up_required_only_for_nonzero_totals() {
    let phq9 = Instrument::phq9();

    let all_zero = answered_phq9(&[0; 9]);
    assert!(phq9.is_complete(&all_zero));

    let mut scored = answered_phq9(&[1, 0, 0, 0, 0, 0, 0, 0, 0]);
    assert!(!phq9.is_complete(&scored));
    scored.record("difficulty", 1);
    assert!(phq9.is_complete(&scored));
  }

  #[test]
  fn unanswered_questions_block_completion() {
    let phq9 = Instrument::phq9();
    let sheet = answered_phq9(&[0; 8]);
    assert!(!phq9.is_complete(&sheet));
  }

  #[test]
  fn prefix_total_follows_the_response_convention() {
    let mut sheet = AnswerSheet::new();
    sheet.record("response_1", 3);
    sheet.record("response_2", 2);
    sheet.record("difficulty", 9);
    assert_eq!(sheet.total_matching("response"), 5);
  }

  #[test]
  fn bilateral_sides_score_and_complete_independently() {
    let base = Instrument::new(
      "Knee screen",
      vec!["response_1".to_owned(), "response_2".to_owned()],
      None,
      vec![ScoreBand::new(2, "Low concern"), ScoreBand::new(8, "High concern")],
    );
    let knee = BilateralInstrument::from_base(&base);

    let mut sheet = AnswerSheet::new();
    sheet.record("left_response_1", 1);
    sheet.record("left_response_2", 0);
    assert!(!knee.is_complete(&sheet));

    sheet.record("right_response_1", 3);
    sheet.record("right_response_2", 2);
    assert!(knee.is_complete(&sheet));

    assert_eq!(knee.totals(&sheet), (1, 5));
    assert_eq!(
      knee.assessments(&sheet),
      (Some("Low concern"), Some("High concern"))
    );
  }
}
