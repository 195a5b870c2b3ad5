//! DemoDataset: fixed example cases served when the live store is empty or
//! unreachable.
//!
//! The dataset is built once, on first use, by running every seed through the
//! real state machine, so demo cases always satisfy their schema. It is never
//! merged with live data and never written anywhere.

use std::{
  collections::BTreeMap,
  sync::{Arc, LazyLock},
};

use chrono::{DateTime, Datelike, TimeDelta, Utc};
use strum::IntoEnumIterator;
use uuid::Uuid;

use crate::{
  Result,
  case::{Case, CaseKind, LegalBasisFlags, format_number},
  lifecycle,
  schema::SchemaRegistry,
  subject::SubjectContact,
};

/// Bumped whenever the seed data below changes.
///
/// Seeds are dated from a fixed epoch (2025-01-01) rather than from the
/// clock, so the dataset is identical on every run. Classified against a much
/// later `now`, every open demo case reads as overdue.
pub const DEMO_DATASET_VERSION: &str = "2025.1";

/// `org_id` carried by every demo case.
pub const DEMO_ORG_ID: &str = "demo";

const DEMO_ID_BASE: u128 = 0xdead_beef_0000_4000_8000_0000_0000_0000;

static BUILTIN: LazyLock<Arc<DemoDataset>> = LazyLock::new(|| {
  let dataset = DemoDataset::seed(&SchemaRegistry::builtin()).unwrap_or_else(|e| {
    tracing::error!(error = %e, "demo dataset failed to build; serving none");
    DemoDataset::default()
  });
  Arc::new(dataset)
});

#[derive(Debug, Default)]
pub struct DemoDataset {
  cases: BTreeMap<CaseKind, Vec<Case>>,
}

impl DemoDataset {
  /// The shared built-in dataset.
  pub fn builtin() -> Arc<Self> { Arc::clone(&BUILTIN) }

  /// Build the built-in seeds against `registry`. Kinds missing from the
  /// registry are skipped.
  pub fn seed(registry: &SchemaRegistry) -> Result<Self> {
    let mut dataset = Self::default();
    for kind in CaseKind::iter() {
      if registry.get(kind).is_err() {
        continue;
      }
      let cases = seeds(kind)
        .iter()
        .zip(1..)
        .map(|(seed, seq)| seed.build(registry, kind, seq))
        .collect::<Result<Vec<_>>>()?;
      dataset.cases.insert(kind, cases);
    }
    Ok(dataset)
  }

  /// Replace the cases served for `kind`.
  pub fn with_cases(mut self, kind: CaseKind, cases: Vec<Case>) -> Self {
    self.cases.insert(kind, cases);
    self
  }

  pub fn version(&self) -> &'static str { DEMO_DATASET_VERSION }

  pub fn cases(&self, kind: CaseKind) -> &[Case] {
    self.cases.get(&kind).map_or(&[], Vec::as_slice)
  }

  /// `true` if at least one demo case exists for `kind`.
  pub fn covers(&self, kind: CaseKind) -> bool { !self.cases(kind).is_empty() }
}

// ─── Seeds ───────────────────────────────────────────────────────────────────

fn demo_epoch() -> DateTime<Utc> {
  // 2025-01-01T09:00:00Z
  DateTime::<Utc>::UNIX_EPOCH + TimeDelta::days(20_089) + TimeDelta::hours(9)
}

fn demo_id(kind: CaseKind, seq: u32) -> Uuid {
  let kind_index = CaseKind::iter().position(|k| k == kind).unwrap_or_default() as u128;
  Uuid::from_u128(DEMO_ID_BASE | (kind_index << 16) | u128::from(seq))
}

struct Seed {
  /// Days after the demo epoch the case was submitted.
  day:         i64,
  title:       &'static str,
  category:    Option<&'static str>,
  anonymous:   bool,
  subject:     Option<(&'static str, &'static str)>,
  basis:       &'static [&'static str],
  responsible: Option<&'static str>,
  notes:       Option<&'static str>,
  reason:      Option<&'static str>,
  /// Statuses walked after the initial one, one day apart.
  path:        &'static [&'static str],
}

impl Seed {
  const fn new(day: i64, title: &'static str, category: &'static str) -> Self {
    Self {
      day,
      title,
      category: Some(category),
      anonymous: false,
      subject: None,
      basis: &[],
      responsible: None,
      notes: None,
      reason: None,
      path: &[],
    }
  }

  fn build(&self, registry: &SchemaRegistry, kind: CaseKind, seq: u32) -> Result<Case> {
    let schema = registry.get(kind)?;
    let created_at = demo_epoch() + TimeDelta::days(self.day);

    let mut case = Case {
      id: demo_id(kind, seq),
      kind,
      org_id: DEMO_ORG_ID.to_owned(),
      number: format_number(schema.number_prefix, created_at.year(), seq),
      created_at,
      updated_at: created_at,
      status: String::new(),
      title: self.title.to_owned(),
      description: None,
      category: self.category.map(str::to_owned),
      is_anonymous: self.anonymous,
      subject: self.subject.map(|(name, email)| SubjectContact {
        name: Some(name.to_owned()),
        email: Some(email.to_owned()),
        ..Default::default()
      }),
      legal_basis: self
        .basis
        .iter()
        .map(|id| ((*id).to_owned(), true))
        .collect::<LegalBasisFlags>(),
      confirmation_deadline: None,
      resolution_deadline: None,
      responsible_party: self.responsible.map(str::to_owned),
      resolution_notes: self.notes.map(str::to_owned),
      rejection_reason: self.reason.map(str::to_owned),
      attachments: Vec::new(),
    };

    lifecycle::initialize(schema, &mut case, created_at)?;
    for (to, step) in self.path.iter().zip(1..) {
      case = lifecycle::apply_transition(registry, &case, to, created_at + TimeDelta::days(step))?;
    }
    Ok(case)
  }
}

fn seeds(kind: CaseKind) -> Vec<Seed> {
  match kind {
    CaseKind::SupportTicket => vec![
      Seed { path: &["in_progress"], ..Seed::new(2, "VPN access not working for remote staff", "it") },
      Seed::new(15, "Request for a copy of the data-retention policy", "documents"),
      Seed {
        notes: Some("Driver package deployed through endpoint management"),
        path: &["in_progress", "resolved"],
        ..Seed::new(22, "Printer driver rollout for the accounting floor", "it")
      },
    ],
    CaseKind::GdprRightForgotten => vec![
      Seed {
        subject: Some(("Ana Novak", "ana.novak@example.si")),
        basis: &["17(1)(b)"],
        ..Seed::new(3, "Erasure of newsletter subscriber data", "marketing")
      },
      Seed {
        subject: Some(("Marko Kranjc", "marko.kranjc@example.si")),
        basis: &["17(1)(a)"],
        path: &["verifying"],
        ..Seed::new(10, "Former employee requests erasure of HR records", "hr")
      },
      Seed {
        subject: Some(("Petra Zupan", "petra.zupan@example.si")),
        basis: &["17(1)(a)", "17(1)(b)"],
        path: &["processing"],
        ..Seed::new(18, "Customer account deletion after contract end", "customers")
      },
      Seed {
        subject: Some(("Luka Horvat", "luka.horvat@example.si")),
        basis: &["17(1)(d)"],
        responsible: Some("Data protection officer"),
        notes: Some("Footage deleted from the recorder and from backups"),
        path: &["processing", "executed"],
        ..Seed::new(25, "Erasure of CCTV footage", "security")
      },
      Seed {
        subject: Some(("Maja Kos", "maja.kos@example.si")),
        basis: &["17(1)(c)"],
        path: &["verifying", "processing"],
        ..Seed::new(32, "Deletion of loyalty programme profile", "marketing")
      },
      Seed {
        subject: Some(("Janez Potočnik", "janez.potocnik@example.si")),
        reason: Some("Invoices must be retained under tax legislation (Art. 17(3)(b))"),
        path: &["rejected"],
        ..Seed::new(40, "Erasure request for retained invoices", "finance")
      },
      Seed {
        subject: Some(("Nina Golob", "nina.golob@example.si")),
        basis: &["17(1)(f)"],
        ..Seed::new(47, "Deletion of a child account on the learning platform", "customers")
      },
    ],
    CaseKind::WhistleblowerReport => vec![
      Seed {
        anonymous: true,
        basis: &["2(1)(a)"],
        ..Seed::new(5, "Suspected kickbacks in IT procurement", "korupcija")
      },
      Seed {
        subject: Some(("Tina Vidmar", "tina.vidmar@example.si")),
        path: &["acknowledged"],
        ..Seed::new(12, "Repeated workplace harassment in logistics", "mobing")
      },
      Seed {
        anonymous: true,
        basis: &["2(1)(a)"],
        responsible: Some("Whistle-blowing trustee"),
        path: &["acknowledged", "investigating"],
        ..Seed::new(20, "Manipulated safety inspection records", "varnost")
      },
      Seed {
        anonymous: true,
        basis: &["2(1)(b)"],
        responsible: Some("Whistle-blowing trustee"),
        notes: Some("Findings reported to the management board; funds recovered"),
        path: &["acknowledged", "investigating", "resolved"],
        ..Seed::new(28, "Misuse of EU grant funds", "korupcija")
      },
    ],
    CaseKind::PolicyApproval => vec![
      Seed {
        basis: &["5(2)"],
        path: &["in_review"],
        ..Seed::new(1, "Information security policy v3", "isms")
      },
      Seed {
        basis: &["A.5(1)"],
        responsible: Some("CISO"),
        path: &["in_review", "approved"],
        ..Seed::new(14, "Acceptable use policy", "isms")
      },
      Seed::new(30, "Remote work security guideline", "hr"),
    ],
    CaseKind::DecisionLog => vec![
      Seed {
        basis: &["21(2)(j)", "21(2)(i)"],
        responsible: Some("IT director"),
        path: &["under_review", "decided"],
        ..Seed::new(6, "Adopt MFA for all administrative accounts", "access")
      },
      Seed {
        basis: &["21(2)(d)"],
        path: &["under_review"],
        ..Seed::new(16, "Establish supplier security assessments", "supply chain")
      },
      Seed {
        basis: &["21(2)(b)"],
        ..Seed::new(35, "Annual incident-response exercise", "incidents")
      },
    ],
    CaseKind::ResponsibilityOfficer => vec![
      Seed {
        subject: Some(("Irena Bizjak", "irena.bizjak@example.si")),
        basis: &["37(1)(b)"],
        responsible: Some("Irena Bizjak"),
        path: &["appointed"],
        ..Seed::new(4, "Appointment of the data protection officer", "gdpr")
      },
      Seed {
        subject: Some(("Gregor Zajc", "gregor.zajc@example.si")),
        ..Seed::new(19, "NIS2 security officer nomination", "nis2")
      },
      Seed {
        subject: Some(("Simona Kralj", "simona.kralj@example.si")),
        responsible: Some("Simona Kralj"),
        path: &["appointed", "notified"],
        ..Seed::new(26, "Whistle-blowing trustee appointment", "zzpri")
      },
    ],
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashSet;

  use super::*;
  use crate::{deadline::DeadlineBucket, filter};

  #[test]
  fn every_builtin_kind_has_demo_cases() {
    let demo = DemoDataset::builtin();
    for kind in CaseKind::iter() {
      assert!(demo.covers(kind), "{kind} has no demo cases");
    }
  }

  #[test]
  fn open_demo_cases_age_into_overdue() {
    let registry = SchemaRegistry::builtin();
    let demo = DemoDataset::builtin();
    let later = demo_epoch() + TimeDelta::days(5 * 365);
    for kind in CaseKind::iter() {
      let schema = registry.get(kind).unwrap();
      for case in demo.cases(kind) {
        let bucket = filter::active_classification(&registry, case, later).bucket;
        if schema.is_terminal(&case.status) {
          assert_eq!(bucket, DeadlineBucket::None, "{}", case.number);
        } else if filter::active_deadline(schema, case).is_some() {
          assert_eq!(bucket, DeadlineBucket::Overdue, "{}", case.number);
        }
      }
    }
  }

  #[test]
  fn gdpr_erasure_demo_has_seven_records() {
    let demo = DemoDataset::builtin();
    assert_eq!(demo.cases(CaseKind::GdprRightForgotten).len(), 7);
  }

  #[test]
  fn demo_cases_respect_their_schema() {
    let registry = SchemaRegistry::builtin();
    let demo = DemoDataset::builtin();
    for kind in CaseKind::iter() {
      let schema = registry.get(kind).unwrap();
      for case in demo.cases(kind) {
        assert_eq!(case.kind, kind);
        assert!(schema.has_status(&case.status), "{}: {}", case.number, case.status);
        assert!(lifecycle::check_write_constraints(case).is_ok(), "{}", case.number);
        assert!(case.number.starts_with(schema.number_prefix));
        assert_eq!(case.org_id, DEMO_ORG_ID);
      }
    }
  }

  #[test]
  fn demo_ids_are_unique_and_stable() {
    let demo = DemoDataset::builtin();
    let ids: Vec<Uuid> = CaseKind::iter()
      .flat_map(|k| demo.cases(k).iter().map(|c| c.id))
      .collect();
    let unique: HashSet<_> = ids.iter().collect();
    assert_eq!(ids.len(), unique.len());

    let rebuilt = DemoDataset::seed(&SchemaRegistry::builtin()).unwrap();
    for kind in CaseKind::iter() {
      assert_eq!(rebuilt.cases(kind), demo.cases(kind));
    }
  }

  #[test]
  fn whistleblower_demo_numbers_follow_zzpri_format() {
    let demo = DemoDataset::builtin();
    let first = &demo.cases(CaseKind::WhistleblowerReport)[0];
    assert_eq!(first.number, "ZZPRI-2025-001");
    assert!(first.is_anonymous);
    assert!(first.subject.is_none());
  }

  #[test]
  fn seeding_skips_unregistered_kinds() {
    let registry =
      SchemaRegistry::default().with(&crate::schema::WHISTLEBLOWER_REPORT);
    let demo = DemoDataset::seed(&registry).unwrap();
    assert!(demo.covers(CaseKind::WhistleblowerReport));
    assert!(!demo.covers(CaseKind::GdprRightForgotten));
  }
}
