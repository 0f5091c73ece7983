//! Groups module (expense-sharing rosters).
//!
//! Pure domain logic only: no IO, no HTTP, no persistence concerns.

pub mod group;

pub use group::{
    AddMember, CreateGroup, Group, GroupCommand, GroupCreated, GroupEvent, GroupUpdated, Member,
    MemberAdded, MemberRemoved, RemoveMember, UpdateGroup,
};
