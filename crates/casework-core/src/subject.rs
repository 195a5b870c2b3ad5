//! Subject contact details: the identity of the person a case is about (or
//! who raised it).
//!
//! Only present on non-anonymous cases. The engine refuses to persist an
//! anonymous case that carries any of these fields.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectContact {
  pub name:    Option<String>,
  pub email:   Option<String>,
  pub phone:   Option<String>,
  pub address: Option<String>,
}

impl SubjectContact {
  /// `true` when no field holds non-blank text.
  pub fn is_empty(&self) -> bool {
    [&self.name, &self.email, &self.phone, &self.address]
      .into_iter()
      .all(|f| f.as_deref().is_none_or(|s| s.trim().is_empty()))
  }
}

/// Collapse an all-blank contact to `None`.
pub fn normalize(subject: Option<SubjectContact>) -> Option<SubjectContact> {
  subject.filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn blank_contact_is_empty() {
    let s = SubjectContact {
      name: Some("  ".into()),
      ..Default::default()
    };
    assert!(s.is_empty());
    assert_eq!(normalize(Some(s)), None);
  }

  #[test]
  fn any_field_makes_contact_non_empty() {
    let s = SubjectContact {
      phone: Some("+386 1 234 5678".into()),
      ..Default::default()
    };
    assert!(!s.is_empty());
    assert!(normalize(Some(s)).is_some());
  }
}
