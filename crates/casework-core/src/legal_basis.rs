//! Legal-basis encoding.
//!
//! Flags are the source of truth; the short code is a display artifact and is
//! never decoded. Flag ids look like `17(1)(a)`: a trailing parenthesised
//! letter is a clause, everything before it is the provision. Selected
//! clauses of one provision collapse into a single group (`17(1)a,d`);
//! several provisions are joined with `"; "`.

use std::{borrow::Borrow, cmp::Ordering, collections::BTreeMap};

use crate::schema::FlagDescriptor;

/// Code and description shown when no basis is selected.
pub const NO_BASIS: &str = "-";

/// Encode the selected flags as a canonical, sorted short code.
///
/// The result does not depend on the iteration order of `flags`.
pub fn encode<I, K, V>(flags: I) -> String
where
  I: IntoIterator<Item = (K, V)>,
  K: AsRef<str>,
  V: Borrow<bool>,
{
  let mut groups: BTreeMap<NaturalKey, Vec<NaturalKey>> = BTreeMap::new();

  for id in selected(flags) {
    let (provision, clause) = split_clause(&id);
    let clauses = groups.entry(NaturalKey::new(provision)).or_default();
    if let Some(c) = clause {
      let key = NaturalKey::new(c);
      if !clauses.contains(&key) {
        clauses.push(key);
      }
    }
  }

  if groups.is_empty() {
    return NO_BASIS.to_owned();
  }

  groups
    .into_iter()
    .map(|(provision, mut clauses)| {
      clauses.sort();
      let joined = clauses
        .iter()
        .map(|c| c.raw.as_str())
        .collect::<Vec<_>>()
        .join(",");
      format!("{}{joined}", provision.raw)
    })
    .collect::<Vec<_>>()
    .join("; ")
}

/// Human-readable description of the selected flags, labelled from
/// `descriptors`. Unknown flag ids are listed by id alone.
pub fn describe<I, K, V>(flags: I, descriptors: &[FlagDescriptor]) -> String
where
  I: IntoIterator<Item = (K, V)>,
  K: AsRef<str>,
  V: Borrow<bool>,
{
  let mut ids: Vec<NaturalKey> = selected(flags).map(|id| NaturalKey::new(&id)).collect();
  ids.sort();
  ids.dedup();

  if ids.is_empty() {
    return NO_BASIS.to_owned();
  }

  ids
    .iter()
    .map(|id| match descriptors.iter().find(|d| d.id == id.raw) {
      Some(d) => format!("{} {}", d.id, d.label),
      None => id.raw.clone(),
    })
    .collect::<Vec<_>>()
    .join("; ")
}

fn selected<I, K, V>(flags: I) -> impl Iterator<Item = String>
where
  I: IntoIterator<Item = (K, V)>,
  K: AsRef<str>,
  V: Borrow<bool>,
{
  flags.into_iter().filter_map(|(k, v)| {
    let id = k.as_ref().trim();
    (*v.borrow() && !id.is_empty()).then(|| id.to_owned())
  })
}

/// Split `17(1)(a)` into `("17(1)", Some("a"))`. Only an alphabetic trailing
/// group counts as a clause: `5(2)` stays whole.
fn split_clause(id: &str) -> (&str, Option<&str>) {
  if let Some(inner) = id.strip_suffix(')')
    && let Some(open) = inner.rfind('(')
  {
    let clause = &inner[open + 1..];
    if open > 0 && !clause.is_empty() && clause.chars().all(char::is_alphabetic) {
      return (&id[..open], Some(clause));
    }
  }
  (id, None)
}

// ─── Natural ordering ────────────────────────────────────────────────────────

/// Orders digit runs numerically, so `2(1)` sorts before `10(1)`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct NaturalKey {
  raw:      String,
  segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Segment {
  Number(u64),
  Text(String),
}

impl NaturalKey {
  fn new(raw: &str) -> Self {
    let mut segments = Vec::new();
    let mut digits = String::new();
    let mut text = String::new();

    for ch in raw.chars() {
      if ch.is_ascii_digit() {
        if !text.is_empty() {
          segments.push(Segment::Text(std::mem::take(&mut text)));
        }
        digits.push(ch);
      } else {
        if !digits.is_empty() {
          segments.push(number_segment(std::mem::take(&mut digits)));
        }
        text.push(ch);
      }
    }
    if !digits.is_empty() {
      segments.push(number_segment(digits));
    }
    if !text.is_empty() {
      segments.push(Segment::Text(text));
    }

    Self {
      raw: raw.to_owned(),
      segments,
    }
  }
}

fn number_segment(digits: String) -> Segment {
  match digits.parse() {
    Ok(n) => Segment::Number(n),
    Err(_) => Segment::Text(digits),
  }
}

impl Ord for NaturalKey {
  fn cmp(&self, other: &Self) -> Ordering {
    self
      .segments
      .cmp(&other.segments)
      .then_with(|| self.raw.cmp(&other.raw))
  }
}

impl PartialOrd for NaturalKey {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}
