use super::candidate::Candidate;
use super::status::RoleKind;

pub enum Role {
    Follower,
    Candidate { candidate: Candidate },
    Leader,
}

impl Role {
    pub fn to_ident(&self) -> &'static str {
        match self {
            Role::Follower => "follower",
            Role::Candidate { .. } => "candidate",
            Role::Leader => "leader",
        }
    }

    pub fn kind(&self) -> RoleKind {
        match self {
            Role::Follower => RoleKind::Follower,
            Role::Candidate { .. } => RoleKind::Candidate,
            Role::Leader => RoleKind::Leader,
        }
    }
}
