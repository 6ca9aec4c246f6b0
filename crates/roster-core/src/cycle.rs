//! Keyboard channel cycling within the current workspace.

use serde::Serialize;

use roster_shared::{Direction, ResourceId, Result, RosterError, Workspace};

use crate::models::Sources;

/// Where a successful cycle step navigates to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CycleTarget {
    Dm {
        peer: ResourceId,
    },
    Channel {
        resource: ResourceId,
        module: String,
        joined: bool,
        workspace: Workspace,
    },
}

impl CycleTarget {
    pub fn id(&self) -> &ResourceId {
        match self {
            Self::Dm { peer } => peer,
            Self::Channel { resource, .. } => resource,
        }
    }
}

/// Index reached from `index` in `direction`.
///
/// The cycle runs over `len - 1` slots, so the last entry is never reached
/// by cycling. Callers rely on this exact arithmetic; see the open question
/// in DESIGN.md before changing it.
pub fn next_index(len: usize, index: usize, direction: Direction) -> Option<usize> {
    if len < 2 || index >= len {
        return None;
    }
    let modulus = (len - 1) as isize;
    let raw = index as isize + direction.offset();
    Some(raw.rem_euclid(modulus) as usize)
}

/// Compute the entry after (or before) `selected` in `ordered`.
pub fn cycle(
    ordered: &[ResourceId],
    selected: Option<&ResourceId>,
    direction: Direction,
    workspace: &Workspace,
    sources: &Sources,
) -> Result<CycleTarget> {
    let selected = selected
        .ok_or_else(|| RosterError::UnresolvedCycleTarget("nothing selected".to_string()))?;

    let index = ordered
        .iter()
        .position(|id| id == selected)
        .ok_or_else(|| RosterError::UnresolvedCycleTarget(selected.to_string()))?;

    let next = next_index(ordered.len(), index, direction).ok_or_else(|| {
        RosterError::UnresolvedCycleTarget(format!(
            "{selected} in a list of {} entries",
            ordered.len()
        ))
    })?;

    resolve_target(&ordered[next], workspace, sources)
}

/// Turn an identifier into something navigable.
pub fn resolve_target(
    id: &ResourceId,
    workspace: &Workspace,
    sources: &Sources,
) -> Result<CycleTarget> {
    if id.is_dm() {
        return Ok(CycleTarget::Dm { peer: id.clone() });
    }

    let association = sources
        .associations
        .graph
        .get(id)
        .ok_or_else(|| RosterError::MissingChannelConfig(id.clone()))?;

    let module = association
        .channel_module()
        .ok_or_else(|| RosterError::MissingChannelConfig(id.clone()))?;

    Ok(CycleTarget::Channel {
        resource: association.resource.clone(),
        module: module.to_string(),
        joined: sources.is_joined_channel(&association.resource),
        workspace: workspace.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::*;
    use crate::models::MetadataConfig;

    fn ids(raw: &[&str]) -> Vec<ResourceId> {
        raw.iter().map(|s| ResourceId::new(*s)).collect()
    }

    #[test]
    fn forward_from_middle_wraps_over_len_minus_one() {
        assert_eq!(next_index(3, 1, Direction::Forward), Some(0));
        assert_eq!(next_index(3, 0, Direction::Forward), Some(1));
        assert_eq!(next_index(3, 0, Direction::Backward), Some(1));
        assert_eq!(next_index(3, 2, Direction::Forward), Some(1));
    }

    #[test]
    fn short_lists_do_not_cycle() {
        assert_eq!(next_index(0, 0, Direction::Forward), None);
        assert_eq!(next_index(1, 0, Direction::Forward), None);
        assert_eq!(next_index(2, 1, Direction::Forward), Some(0));
        assert_eq!(next_index(2, 0, Direction::Backward), Some(0));
    }

    #[test]
    fn cycling_selects_a_from_b() {
        let ordered = ids(&["~a", "~b", "~c"]);
        let target = cycle(
            &ordered,
            Some(&ResourceId::new("~b")),
            Direction::Forward,
            &Workspace::Messages,
            &Sources::default(),
        )
        .unwrap();
        assert_eq!(target, CycleTarget::Dm { peer: ResourceId::new("~a") });
    }

    #[test]
    fn unknown_selection_is_unresolved() {
        let ordered = ids(&["~a", "~b"]);
        let err = cycle(
            &ordered,
            Some(&ResourceId::new("~z")),
            Direction::Forward,
            &Workspace::Messages,
            &Sources::default(),
        )
        .unwrap_err();
        assert!(matches!(err, RosterError::UnresolvedCycleTarget(_)));

        let err = cycle(&ordered, None, Direction::Forward, &Workspace::Messages, &Sources::default())
            .unwrap_err();
        assert!(matches!(err, RosterError::UnresolvedCycleTarget(_)));
    }

    #[test]
    fn channels_resolve_through_their_association() {
        let mut sources = Sources::default();
        add_channel(&mut sources, "/ship/~zod/a", "/ship/~zod/g", "A");
        add_channel(&mut sources, "/ship/~zod/b", "/ship/~zod/g", "B");
        sources.graph_keys.insert("~zod/a".to_string());
        let workspace = Workspace::Group(ResourceId::new("/ship/~zod/g"));

        let ordered = ids(&["/ship/~zod/b", "/ship/~zod/a", "/ship/~zod/x"]);
        let target = cycle(
            &ordered,
            Some(&ResourceId::new("/ship/~zod/b")),
            Direction::Forward,
            &workspace,
            &sources,
        )
        .unwrap();

        assert_eq!(
            target,
            CycleTarget::Channel {
                resource: ResourceId::new("/ship/~zod/a"),
                module: "chat".to_string(),
                joined: true,
                workspace,
            }
        );
    }

    #[test]
    fn association_without_graph_config_is_not_navigable() {
        let mut sources = Sources::default();
        add_channel(&mut sources, "/ship/~zod/a", "/ship/~zod/g", "A");
        sources
            .associations
            .graph
            .get_mut(&ResourceId::new("/ship/~zod/a"))
            .unwrap()
            .metadata
            .config = MetadataConfig::Unset;

        let err = resolve_target(&ResourceId::new("/ship/~zod/a"), &Workspace::Home, &sources)
            .unwrap_err();
        assert!(matches!(err, RosterError::MissingChannelConfig(_)));

        let err = resolve_target(&ResourceId::new("/ship/~zod/none"), &Workspace::Home, &sources)
            .unwrap_err();
        assert!(matches!(err, RosterError::MissingChannelConfig(_)));
    }
}
