//! Last known member list of each moderated conversation.

use std::collections::{BTreeSet, HashMap};
use vkwarden_common::models::{PeerId, UserId};

#[derive(Debug, Default)]
pub struct MembershipCache {
    snapshots: HashMap<PeerId, BTreeSet<UserId>>,
}

impl MembershipCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the snapshot wholesale. Non-positive ids (communities, bots) are dropped.
    pub fn replace<I>(&mut self, peer_id: PeerId, members: I)
    where
        I: IntoIterator<Item = UserId>,
    {
        let set = members.into_iter().filter(|id| *id > 0).collect();
        self.snapshots.insert(peer_id, set);
    }

    /// Ids in `authoritative` that the snapshot does not know yet, in ascending order.
    /// Without a snapshot every positive id counts as new.
    pub fn new_members(&self, peer_id: PeerId, authoritative: &[UserId]) -> Vec<UserId> {
        let known = self.snapshots.get(&peer_id);
        let fresh: BTreeSet<UserId> = authoritative
            .iter()
            .copied()
            .filter(|id| *id > 0)
            .filter(|id| known.map_or(true, |set| !set.contains(id)))
            .collect();
        fresh.into_iter().collect()
    }

    /// Appends a single id (inline "member added" handling). No-op without a snapshot.
    pub fn add_member(&mut self, peer_id: PeerId, user_id: UserId) -> bool {
        if user_id <= 0 {
            return false;
        }
        match self.snapshots.get_mut(&peer_id) {
            Some(set) => set.insert(user_id),
            None => false,
        }
    }

    pub fn remove_member(&mut self, peer_id: PeerId, user_id: UserId) -> bool {
        self.snapshots
            .get_mut(&peer_id)
            .is_some_and(|set| set.remove(&user_id))
    }

    /// `None` when the conversation has no snapshot.
    pub fn contains(&self, peer_id: PeerId, user_id: UserId) -> Option<bool> {
        self.snapshots.get(&peer_id).map(|set| set.contains(&user_id))
    }

    pub fn members(&self, peer_id: PeerId) -> Option<Vec<UserId>> {
        self.snapshots.get(&peer_id).map(|set| set.iter().copied().collect())
    }

    pub fn has_snapshot(&self, peer_id: PeerId) -> bool {
        self.snapshots.contains_key(&peer_id)
    }

    pub fn forget(&mut self, peer_id: PeerId) -> bool {
        self.snapshots.remove(&peer_id).is_some()
    }
}
