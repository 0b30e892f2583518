use serde::{Deserialize, Serialize};

use crate::model::{PlayerRecord, Position, PositionGroup};

/// Ordered slot requirements. Selection walks the entries in order, so the
/// order decides which position gets first call on the budget.
///
/// Each key appears once; repeated keys are merged into their first entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawQuota<K>", bound(deserialize = "K: Deserialize<'de> + Copy + PartialEq"))]
pub struct QuotaTable<K> {
    slots: Vec<(K, usize)>,
}

pub type PositionQuota = QuotaTable<Position>;
pub type GroupQuota = QuotaTable<PositionGroup>;

#[derive(Deserialize)]
struct RawQuota<K> {
    slots: Vec<(K, usize)>,
}

impl<K: Copy + PartialEq> From<RawQuota<K>> for QuotaTable<K> {
    fn from(raw: RawQuota<K>) -> Self {
        QuotaTable::new(raw.slots)
    }
}

impl<K: Copy + PartialEq> QuotaTable<K> {
    pub fn new(entries: Vec<(K, usize)>) -> Self {
        let mut slots: Vec<(K, usize)> = Vec::with_capacity(entries.len());
        for (key, count) in entries {
            match slots.iter_mut().find(|(k, _)| *k == key) {
                Some((_, n)) => *n += count,
                None => slots.push((key, count)),
            }
        }
        Self { slots }
    }

    pub fn slots(&self) -> &[(K, usize)] {
        &self.slots
    }

    pub fn required(&self, key: K) -> usize {
        self.slots
            .iter()
            .filter(|(k, _)| *k == key)
            .map(|(_, n)| *n)
            .sum()
    }

    pub fn total(&self) -> usize {
        self.slots.iter().map(|(_, n)| n).sum()
    }
}

impl PositionQuota {
    /// 4-3-3 with a holding, a central and an attacking midfielder.
    pub fn starting_eleven() -> Self {
        Self::new(vec![
            (Position::Goalkeeper, 1),
            (Position::RightBack, 1),
            (Position::CenterBack, 2),
            (Position::LeftBack, 1),
            (Position::DefensiveMid, 1),
            (Position::CentralMid, 1),
            (Position::AttackingMid, 1),
            (Position::RightWing, 1),
            (Position::Striker, 1),
            (Position::LeftWing, 1),
        ])
    }
}

impl Default for PositionQuota {
    fn default() -> Self {
        Self::starting_eleven()
    }
}

impl GroupQuota {
    pub fn full_squad() -> Self {
        Self::new(vec![
            (PositionGroup::Goalkeeper, 3),
            (PositionGroup::Defender, 5),
            (PositionGroup::Midfielder, 5),
            (PositionGroup::Forward, 2),
        ])
    }

    pub fn remaining_after(&self, squad: &[PlayerRecord]) -> GroupQuota {
        let slots = self
            .slots
            .iter()
            .map(|&(group, required)| {
                let held = squad
                    .iter()
                    .filter(|p| p.position.group() == group)
                    .count();
                (group, required.saturating_sub(held))
            })
            .collect();
        GroupQuota::new(slots)
    }
}

impl Default for GroupQuota {
    fn default() -> Self {
        Self::full_squad()
    }
}
