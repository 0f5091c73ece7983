use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use splitledger_core::{Aggregate, AggregateRoot, DomainError, GroupId, UserId};
use splitledger_events::Event;

/// A group participant as seen by derived views (balance sheets).
///
/// Display metadata comes from the user store upstream; within a single
/// computation the roster snapshot is immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub user_id: UserId,
    pub name: String,
}

impl Member {
    pub fn new(user_id: UserId, name: impl Into<String>) -> Self {
        Self {
            user_id,
            name: name.into(),
        }
    }
}

/// Aggregate root: Group (expense-sharing roster).
///
/// The roster is ordered and duplicate-free, and always contains the
/// creator. Only the creator may mutate the group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    id: GroupId,
    created_by: Option<UserId>,
    name: String,
    description: String,
    members: Vec<UserId>,
    version: u64,
    created: bool,
}

impl Group {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: GroupId) -> Self {
        Self {
            id,
            created_by: None,
            name: String::new(),
            description: String::new(),
            members: Vec::new(),
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> GroupId {
        self.id
    }

    pub fn created_by(&self) -> Option<UserId> {
        self.created_by
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Roster in join order (creator first).
    pub fn members(&self) -> &[UserId] {
        &self.members
    }

    pub fn is_member(&self, user_id: UserId) -> bool {
        self.members.contains(&user_id)
    }
}

impl AggregateRoot for Group {
    type Id = GroupId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: CreateGroup.
///
/// The creator always joins the roster; requested members are deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateGroup {
    pub group_id: GroupId,
    pub created_by: UserId,
    pub name: String,
    pub description: Option<String>,
    /// Initial members besides the creator (duplicates are dropped).
    pub members: Vec<UserId>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdateGroup (rename / redescribe).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateGroup {
    pub group_id: GroupId,
    /// Who is issuing the command (must be the creator).
    pub actor: UserId,
    /// Optional new name (if None, keep existing).
    pub name: Option<String>,
    /// Optional new description (if None, keep existing).
    pub description: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AddMember.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddMember {
    pub group_id: GroupId,
    pub actor: UserId,
    pub member_id: UserId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RemoveMember.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveMember {
    pub group_id: GroupId,
    pub actor: UserId,
    pub member_id: UserId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupCommand {
    CreateGroup(CreateGroup),
    UpdateGroup(UpdateGroup),
    AddMember(AddMember),
    RemoveMember(RemoveMember),
}

/// Event: GroupCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCreated {
    pub group_id: GroupId,
    pub created_by: UserId,
    pub name: String,
    pub description: String,
    /// Full initial roster: creator first, then deduplicated members.
    pub members: Vec<UserId>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: GroupUpdated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupUpdated {
    pub group_id: GroupId,
    pub name: String,
    pub description: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: MemberAdded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberAdded {
    pub group_id: GroupId,
    pub member_id: UserId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: MemberRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRemoved {
    pub group_id: GroupId,
    pub member_id: UserId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupEvent {
    GroupCreated(GroupCreated),
    GroupUpdated(GroupUpdated),
    MemberAdded(MemberAdded),
    MemberRemoved(MemberRemoved),
}

impl Event for GroupEvent {
    fn event_type(&self) -> &'static str {
        match self {
            GroupEvent::GroupCreated(_) => "groups.group.created",
            GroupEvent::GroupUpdated(_) => "groups.group.updated",
            GroupEvent::MemberAdded(_) => "groups.group.member_added",
            GroupEvent::MemberRemoved(_) => "groups.group.member_removed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            GroupEvent::GroupCreated(e) => e.occurred_at,
            GroupEvent::GroupUpdated(e) => e.occurred_at,
            GroupEvent::MemberAdded(e) => e.occurred_at,
            GroupEvent::MemberRemoved(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Group {
    type Command = GroupCommand;
    type Event = GroupEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            GroupEvent::GroupCreated(e) => {
                self.id = e.group_id;
                self.created_by = Some(e.created_by);
                self.name = e.name.clone();
                self.description = e.description.clone();
                self.members = e.members.clone();
                self.created = true;
            }
            GroupEvent::GroupUpdated(e) => {
                self.name = e.name.clone();
                self.description = e.description.clone();
            }
            GroupEvent::MemberAdded(e) => {
                self.members.push(e.member_id);
            }
            GroupEvent::MemberRemoved(e) => {
                self.members.retain(|m| *m != e.member_id);
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            GroupCommand::CreateGroup(cmd) => self.handle_create(cmd),
            GroupCommand::UpdateGroup(cmd) => self.handle_update(cmd),
            GroupCommand::AddMember(cmd) => self.handle_add_member(cmd),
            GroupCommand::RemoveMember(cmd) => self.handle_remove_member(cmd),
        }
    }
}

impl Group {
    fn ensure_group_id(&self, group_id: GroupId) -> Result<(), DomainError> {
        if self.id != group_id {
            return Err(DomainError::invariant("group_id mismatch"));
        }
        Ok(())
    }

    fn ensure_creator(&self, actor: UserId) -> Result<(), DomainError> {
        if self.created_by != Some(actor) {
            return Err(DomainError::Unauthorized);
        }
        Ok(())
    }

    fn handle_create(&self, cmd: &CreateGroup) -> Result<Vec<GroupEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("group already exists"));
        }

        if cmd.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }

        // Creator first, then requested members with duplicates dropped.
        let mut members = vec![cmd.created_by];
        for member in &cmd.members {
            if !members.contains(member) {
                members.push(*member);
            }
        }

        Ok(vec![GroupEvent::GroupCreated(GroupCreated {
            group_id: cmd.group_id,
            created_by: cmd.created_by,
            name: cmd.name.clone(),
            description: cmd.description.clone().unwrap_or_default(),
            members,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_update(&self, cmd: &UpdateGroup) -> Result<Vec<GroupEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_group_id(cmd.group_id)?;
        self.ensure_creator(cmd.actor)?;

        let new_name = cmd.name.clone().unwrap_or_else(|| self.name.clone());
        if new_name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }

        let new_description = cmd
            .description
            .clone()
            .unwrap_or_else(|| self.description.clone());

        Ok(vec![GroupEvent::GroupUpdated(GroupUpdated {
            group_id: cmd.group_id,
            name: new_name,
            description: new_description,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_add_member(&self, cmd: &AddMember) -> Result<Vec<GroupEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_group_id(cmd.group_id)?;
        self.ensure_creator(cmd.actor)?;

        if self.is_member(cmd.member_id) {
            return Err(DomainError::conflict("member already in group"));
        }

        Ok(vec![GroupEvent::MemberAdded(MemberAdded {
            group_id: cmd.group_id,
            member_id: cmd.member_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_remove_member(&self, cmd: &RemoveMember) -> Result<Vec<GroupEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_group_id(cmd.group_id)?;
        self.ensure_creator(cmd.actor)?;

        if self.created_by == Some(cmd.member_id) {
            return Err(DomainError::invariant("creator cannot be removed"));
        }

        if !self.is_member(cmd.member_id) {
            return Err(DomainError::not_found());
        }

        Ok(vec![GroupEvent::MemberRemoved(MemberRemoved {
            group_id: cmd.group_id,
            member_id: cmd.member_id,
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_group_id() -> GroupId {
        GroupId::new()
    }

    fn test_user_id() -> UserId {
        UserId::new()
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn created_group(creator: UserId, members: Vec<UserId>) -> Group {
        let group_id = test_group_id();
        let mut group = Group::empty(group_id);
        let cmd = CreateGroup {
            group_id,
            created_by: creator,
            name: "Trip".to_string(),
            description: None,
            members,
            occurred_at: test_time(),
        };
        let events = group.handle(&GroupCommand::CreateGroup(cmd)).unwrap();
        group.apply(&events[0]);
        group
    }

    #[test]
    fn create_group_puts_creator_first_and_dedupes_members() {
        let creator = test_user_id();
        let other = test_user_id();

        let group_id = test_group_id();
        let group = Group::empty(group_id);
        let cmd = CreateGroup {
            group_id,
            created_by: creator,
            name: "Flatmates".to_string(),
            description: Some("Rent and groceries".to_string()),
            members: vec![other, creator, other],
            occurred_at: test_time(),
        };

        let events = group.handle(&GroupCommand::CreateGroup(cmd)).unwrap();
        assert_eq!(events.len(), 1);

        match &events[0] {
            GroupEvent::GroupCreated(e) => {
                assert_eq!(e.members, vec![creator, other]);
                assert_eq!(e.name, "Flatmates");
                assert_eq!(e.description, "Rent and groceries");
            }
            _ => panic!("Expected GroupCreated event"),
        }
    }

    #[test]
    fn create_group_rejects_empty_name() {
        let group_id = test_group_id();
        let group = Group::empty(group_id);
        let cmd = CreateGroup {
            group_id,
            created_by: test_user_id(),
            name: "   ".to_string(),
            description: None,
            members: vec![],
            occurred_at: test_time(),
        };

        let err = group.handle(&GroupCommand::CreateGroup(cmd)).unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for empty name"),
        }
    }

    #[test]
    fn create_group_rejects_duplicate_creation() {
        let creator = test_user_id();
        let group = created_group(creator, vec![]);

        let cmd = CreateGroup {
            group_id: group.id_typed(),
            created_by: creator,
            name: "Again".to_string(),
            description: None,
            members: vec![],
            occurred_at: test_time(),
        };

        let err = group.handle(&GroupCommand::CreateGroup(cmd)).unwrap_err();
        match err {
            DomainError::Conflict(_) => {}
            _ => panic!("Expected Conflict error for duplicate creation"),
        }
    }

    #[test]
    fn update_group_requires_creator() {
        let creator = test_user_id();
        let stranger = test_user_id();
        let group = created_group(creator, vec![]);

        let cmd = UpdateGroup {
            group_id: group.id_typed(),
            actor: stranger,
            name: Some("Hijacked".to_string()),
            description: None,
            occurred_at: test_time(),
        };

        let err = group.handle(&GroupCommand::UpdateGroup(cmd)).unwrap_err();
        match err {
            DomainError::Unauthorized => {}
            _ => panic!("Expected Unauthorized error for non-creator update"),
        }
    }

    #[test]
    fn update_group_keeps_unspecified_fields() {
        let creator = test_user_id();
        let mut group = created_group(creator, vec![]);

        let cmd = UpdateGroup {
            group_id: group.id_typed(),
            actor: creator,
            name: None,
            description: Some("Weekend trip".to_string()),
            occurred_at: test_time(),
        };

        let events = group.handle(&GroupCommand::UpdateGroup(cmd)).unwrap();
        group.apply(&events[0]);

        assert_eq!(group.name(), "Trip");
        assert_eq!(group.description(), "Weekend trip");
    }

    #[test]
    fn add_member_extends_roster() {
        let creator = test_user_id();
        let newcomer = test_user_id();
        let mut group = created_group(creator, vec![]);

        let cmd = AddMember {
            group_id: group.id_typed(),
            actor: creator,
            member_id: newcomer,
            occurred_at: test_time(),
        };

        let events = group.handle(&GroupCommand::AddMember(cmd)).unwrap();
        group.apply(&events[0]);

        assert_eq!(group.members(), &[creator, newcomer]);
        assert!(group.is_member(newcomer));
    }

    #[test]
    fn add_member_rejects_duplicate() {
        let creator = test_user_id();
        let existing = test_user_id();
        let group = created_group(creator, vec![existing]);

        let cmd = AddMember {
            group_id: group.id_typed(),
            actor: creator,
            member_id: existing,
            occurred_at: test_time(),
        };

        let err = group.handle(&GroupCommand::AddMember(cmd)).unwrap_err();
        match err {
            DomainError::Conflict(_) => {}
            _ => panic!("Expected Conflict error for duplicate member"),
        }
    }

    #[test]
    fn remove_member_shrinks_roster() {
        let creator = test_user_id();
        let leaver = test_user_id();
        let mut group = created_group(creator, vec![leaver]);

        let cmd = RemoveMember {
            group_id: group.id_typed(),
            actor: creator,
            member_id: leaver,
            occurred_at: test_time(),
        };

        let events = group.handle(&GroupCommand::RemoveMember(cmd)).unwrap();
        group.apply(&events[0]);

        assert_eq!(group.members(), &[creator]);
        assert!(!group.is_member(leaver));
    }

    #[test]
    fn remove_member_rejects_creator() {
        let creator = test_user_id();
        let group = created_group(creator, vec![]);

        let cmd = RemoveMember {
            group_id: group.id_typed(),
            actor: creator,
            member_id: creator,
            occurred_at: test_time(),
        };

        let err = group.handle(&GroupCommand::RemoveMember(cmd)).unwrap_err();
        match err {
            DomainError::InvariantViolation(msg) if msg.contains("creator") => {}
            _ => panic!("Expected invariant violation for removing creator"),
        }
    }

    #[test]
    fn remove_member_rejects_non_member() {
        let creator = test_user_id();
        let group = created_group(creator, vec![]);

        let cmd = RemoveMember {
            group_id: group.id_typed(),
            actor: creator,
            member_id: test_user_id(),
            occurred_at: test_time(),
        };

        let err = group.handle(&GroupCommand::RemoveMember(cmd)).unwrap_err();
        match err {
            DomainError::NotFound => {}
            _ => panic!("Expected NotFound error for absent member"),
        }
    }

    #[test]
    fn commands_on_missing_group_yield_not_found() {
        let group = Group::empty(test_group_id());
        let cmd = AddMember {
            group_id: group.id_typed(),
            actor: test_user_id(),
            member_id: test_user_id(),
            occurred_at: test_time(),
        };

        let err = group.handle(&GroupCommand::AddMember(cmd)).unwrap_err();
        match err {
            DomainError::NotFound => {}
            _ => panic!("Expected NotFound error for non-existent group"),
        }
    }

    #[test]
    fn version_increments_on_apply() {
        let creator = test_user_id();
        let mut group = Group::empty(test_group_id());
        assert_eq!(group.version(), 0);

        let cmd = CreateGroup {
            group_id: group.id_typed(),
            created_by: creator,
            name: "Trip".to_string(),
            description: None,
            members: vec![],
            occurred_at: test_time(),
        };
        let events = group.handle(&GroupCommand::CreateGroup(cmd)).unwrap();
        group.apply(&events[0]);
        assert_eq!(group.version(), 1);

        let cmd = AddMember {
            group_id: group.id_typed(),
            actor: creator,
            member_id: test_user_id(),
            occurred_at: test_time(),
        };
        let events = group.handle(&GroupCommand::AddMember(cmd)).unwrap();
        group.apply(&events[0]);
        assert_eq!(group.version(), 2);
    }

    #[test]
    fn handle_does_not_mutate_state() {
        let creator = test_user_id();
        let group = created_group(creator, vec![]);
        let version_before = group.version();
        let members_before = group.members().to_vec();

        let cmd = AddMember {
            group_id: group.id_typed(),
            actor: creator,
            member_id: test_user_id(),
            occurred_at: test_time(),
        };

        let events1 = group.handle(&GroupCommand::AddMember(cmd.clone())).unwrap();
        let events2 = group.handle(&GroupCommand::AddMember(cmd)).unwrap();

        assert_eq!(group.version(), version_before);
        assert_eq!(group.members(), members_before.as_slice());
        assert_eq!(events1, events2);
    }
}
