//! Optional members of a limit alarm type
//!
//! Each threshold contributes two optional members to an alarm instance: the
//! limit property (`HighLimit`) and the two-state sub-state variable
//! (`HighState`). Types declare which of them they support, instantiation
//! requests the ones a configuration needs.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::threshold::ThresholdName;

/// One optional member, addressed by threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Member {
    Limit(ThresholdName),
    State(ThresholdName),
}

impl Member {
    pub const fn threshold(self) -> ThresholdName {
        match self {
            Member::Limit(name) | Member::State(name) => name,
        }
    }

    const fn bit(self) -> u8 {
        match self {
            Member::Limit(name) => 1 << name.index(),
            Member::State(name) => 1 << (4 + name.index()),
        }
    }

    /// Parse a browse name such as `HighHighLimit` or `LowState`
    pub fn from_browse_name(browse_name: &str) -> Option<Self> {
        ThresholdName::ALL.into_iter().find_map(|name| {
            let rest = browse_name.strip_prefix(name.display_name())?;
            match rest {
                "Limit" => Some(Member::Limit(name)),
                "State" => Some(Member::State(name)),
                _ => None,
            }
        })
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Member::Limit(name) => write!(f, "{}Limit", name.display_name()),
            Member::State(name) => write!(f, "{}State", name.display_name()),
        }
    }
}

impl TryFrom<String> for Member {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Member::from_browse_name(&value).ok_or_else(|| format!("unknown optional member {value}"))
    }
}

impl From<Member> for String {
    fn from(member: Member) -> Self {
        member.to_string()
    }
}

/// Bit set of optional members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct MemberFlags(u8);

impl MemberFlags {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn all() -> Self {
        Self(0xff)
    }

    /// Limit and state member of one threshold
    pub const fn for_threshold(name: ThresholdName) -> Self {
        Self(Member::Limit(name).bit() | Member::State(name).bit())
    }

    pub fn insert(&mut self, member: Member) {
        self.0 |= member.bit();
    }

    pub fn remove(&mut self, member: Member) {
        self.0 &= !member.bit();
    }

    pub fn with(mut self, member: Member) -> Self {
        self.insert(member);
        self
    }

    pub fn without(mut self, member: Member) -> Self {
        self.remove(member);
        self
    }

    pub const fn contains(&self, member: Member) -> bool {
        self.0 & member.bit() != 0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Members in the set, limits first
    pub fn iter(&self) -> impl Iterator<Item = Member> + '_ {
        ThresholdName::ALL
            .into_iter()
            .map(Member::Limit)
            .chain(ThresholdName::ALL.into_iter().map(Member::State))
            .filter(move |member| self.contains(*member))
    }
}

impl FromIterator<Member> for MemberFlags {
    fn from_iter<I: IntoIterator<Item = Member>>(iter: I) -> Self {
        iter.into_iter()
            .fold(MemberFlags::empty(), |flags, member| flags.with(member))
    }
}
