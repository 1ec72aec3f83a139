//! Runtime values: pips and mots.
//!
//! A [`Pip`] is a single atomic event: a numeric `step`, a multiplicative
//! `time_scale` (1 = unit duration), and an optional tag. A [`Mot`] is an
//! ordered, immutable sequence of values, where each value is either a pip
//! or a nested mot awaiting flattening. Every pip and every mot carries a
//! process-unique id assigned by the evaluation context; no operator ever
//! mutates an existing value.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tag carried by silent filler pips.
pub const REST_TAG: &str = "rest";

/// Process-unique pip identifier. Never reused within a run.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct PipId(pub u64);

/// Process-unique mot identifier. Id 0 is reserved for detached mots
/// built outside an evaluation context.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct MotId(pub u64);

impl MotId {
    /// Id of mots constructed without an evaluation context.
    pub const DETACHED: MotId = MotId(0);
}

/// A single atomic musical event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pip {
    /// Numeric step value (pitch offset, scale degree, or similar).
    pub step: f64,
    /// Duration multiplier; 1 is the unit duration.
    pub time_scale: f64,
    /// Optional tag such as [`REST_TAG`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    pub id: PipId,
}

impl Pip {
    pub fn new(step: f64, time_scale: f64, id: PipId) -> Self {
        Pip {
            step,
            time_scale,
            tag: None,
            id,
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// A silent filler pip: step 0, unit duration, tagged [`REST_TAG`].
    pub fn rest(id: PipId) -> Self {
        Pip::new(0.0, 1.0, id).with_tag(REST_TAG)
    }

    pub fn is_rest(&self) -> bool {
        self.tag.as_deref() == Some(REST_TAG)
    }

    /// Equality of step, time scale, and tag, ignoring identity.
    pub fn same_content(&self, other: &Pip) -> bool {
        self.step == other.step
            && self.time_scale == other.time_scale
            && self.tag == other.tag
    }
}

/// One entry of a mot: a pip, or a nested mot that flattening will
/// subdivide into the time of a single slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MotValue {
    Pip(Pip),
    Mot(Mot),
}

impl MotValue {
    pub fn as_pip(&self) -> Option<&Pip> {
        match self {
            MotValue::Pip(pip) => Some(pip),
            MotValue::Mot(_) => None,
        }
    }

    pub fn is_nested(&self) -> bool {
        matches!(self, MotValue::Mot(_))
    }
}

/// An ordered, immutable sequence of pips and nested mots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mot {
    pub id: MotId,
    pub values: Vec<MotValue>,
}

impl Mot {
    pub fn new(id: MotId, values: Vec<MotValue>) -> Self {
        Mot { id, values }
    }

    /// A mot with the reserved detached id, for construction outside an
    /// evaluation context.
    pub fn detached(values: Vec<MotValue>) -> Self {
        Mot::new(MotId::DETACHED, values)
    }

    /// A detached mot wrapping plain pips.
    pub fn from_pips(pips: Vec<Pip>) -> Self {
        Mot::detached(pips.into_iter().map(MotValue::Pip).collect())
    }

    /// Number of top-level values (nested mots count as one).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// True when every value is a plain pip.
    pub fn is_flat(&self) -> bool {
        self.values.iter().all(|v| !v.is_nested())
    }

    /// Top-level pips, skipping nested mots.
    pub fn pips(&self) -> impl Iterator<Item = &Pip> {
        self.values.iter().filter_map(MotValue::as_pip)
    }

    /// Step values of the top-level pips, in order.
    pub fn steps(&self) -> Vec<f64> {
        self.pips().map(|p| p.step).collect()
    }

    /// Time scales of the top-level pips, in order.
    pub fn time_scales(&self) -> Vec<f64> {
        self.pips().map(|p| p.time_scale).collect()
    }

    /// Total duration in unit-pip terms. A nested mot of length `k`
    /// occupies the time of one slot, so it contributes its own duration
    /// divided by `k`.
    pub fn duration(&self) -> f64 {
        self.values
            .iter()
            .map(|v| match v {
                MotValue::Pip(pip) => pip.time_scale,
                MotValue::Mot(inner) => {
                    if inner.is_empty() {
                        0.0
                    } else {
                        inner.duration() / inner.len() as f64
                    }
                }
            })
            .sum()
    }
}

/// Writes a number without a trailing `.0` when it is integral.
fn write_number(f: &mut fmt::Formatter<'_>, value: f64) -> fmt::Result {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        write!(f, "{}", value as i64)
    } else {
        write!(f, "{value}")
    }
}

impl fmt::Display for Pip {
    /// Canonical form: `step`, then `:tag0` when tagged, then
    /// `:timeScale` when the time scale is not 1.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_number(f, self.step)?;
        if let Some(tag) = &self.tag {
            write!(f, ":{tag}0")?;
        }
        if self.time_scale != 1.0 {
            f.write_str(":")?;
            write_number(f, self.time_scale)?;
        }
        Ok(())
    }
}

impl fmt::Display for MotValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotValue::Pip(pip) => pip.fmt(f),
            MotValue::Mot(mot) => mot.fmt(f),
        }
    }
}

impl fmt::Display for Mot {
    /// Canonical bracketed form, re-parseable as a mot literal.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            value.fmt(f)?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pip(step: f64, time_scale: f64, id: u64) -> Pip {
        Pip::new(step, time_scale, PipId(id))
    }

    #[test]
    fn test_display_unit_time_scale_omitted() {
        let m = Mot::from_pips(vec![pip(2.0, 1.0, 1), pip(3.0, 1.0, 2)]);
        assert_eq!(m.to_string(), "[2, 3]");
    }

    #[test]
    fn test_display_time_scale_rendered() {
        let m = Mot::from_pips(vec![pip(0.0, 2.0, 1), pip(1.5, 0.5, 2)]);
        assert_eq!(m.to_string(), "[0:2, 1.5:0.5]");
    }

    #[test]
    fn test_display_negative_and_integral() {
        let m = Mot::from_pips(vec![pip(-3.0, 1.0, 1)]);
        assert_eq!(m.to_string(), "[-3]");
    }

    #[test]
    fn test_display_rest_tag() {
        let m = Mot::from_pips(vec![Pip::rest(PipId(1))]);
        assert_eq!(m.to_string(), "[0:rest0]");
    }

    #[test]
    fn test_display_tag_with_time_scale() {
        let m = Mot::from_pips(vec![pip(0.0, 2.0, 1).with_tag(REST_TAG)]);
        assert_eq!(m.to_string(), "[0:rest0:2]");
    }

    #[test]
    fn test_display_nested() {
        let inner = Mot::from_pips(vec![pip(0.0, 1.0, 1), pip(1.0, 1.0, 2)]);
        let m = Mot::detached(vec![
            MotValue::Mot(inner),
            MotValue::Pip(pip(2.0, 1.0, 3)),
        ]);
        assert_eq!(m.to_string(), "[[0, 1], 2]");
    }

    #[test]
    fn test_display_empty() {
        assert_eq!(Mot::detached(vec![]).to_string(), "[]");
    }

    #[test]
    fn test_duration_flat() {
        let m = Mot::from_pips(vec![pip(0.0, 1.0, 1), pip(1.0, 2.5, 2)]);
        assert_eq!(m.duration(), 3.5);
    }

    #[test]
    fn test_duration_nested_subdivides() {
        let inner = Mot::from_pips(vec![pip(0.0, 1.0, 1), pip(1.0, 1.0, 2)]);
        let m = Mot::detached(vec![
            MotValue::Mot(inner),
            MotValue::Pip(pip(2.0, 1.0, 3)),
        ]);
        // The nested pair shares the time of one slot.
        assert_eq!(m.duration(), 2.0);
    }

    #[test]
    fn test_same_content_ignores_id() {
        let a = pip(1.0, 2.0, 1);
        let b = pip(1.0, 2.0, 99);
        assert!(a.same_content(&b));
        assert!(!a.same_content(&pip(1.0, 1.0, 1)));
    }

    #[test]
    fn test_rest_pip() {
        let r = Pip::rest(PipId(7));
        assert!(r.is_rest());
        assert_eq!(r.step, 0.0);
        assert_eq!(r.time_scale, 1.0);
    }

    #[test]
    fn test_detached_id_is_zero() {
        let m = Mot::detached(vec![]);
        assert_eq!(m.id, MotId::DETACHED);
        assert_eq!(m.id, MotId(0));
    }

    #[test]
    fn test_serde_round_trip() {
        let m = Mot::from_pips(vec![pip(1.0, 0.5, 3).with_tag("rest")]);
        let json = serde_json::to_string(&m).unwrap();
        let back: Mot = serde_json::from_str(&json).unwrap();
        assert_eq!(m, back);
    }

    #[test]
    fn test_serde_skips_absent_tag() {
        let m = Mot::from_pips(vec![pip(1.0, 1.0, 1)]);
        let json = serde_json::to_string(&m).unwrap();
        assert!(!json.contains("tag"));
    }
}
