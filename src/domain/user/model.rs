//! User domain entity

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRole {
    /// Regular account holder: requests bookings, pays for them
    User,
    /// Reviews and approves bookings for the community
    CommunityManager,
    /// Full console access, including user management and settings
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::CommunityManager => "community_manager",
            Self::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Self::User),
            "community_manager" => Some(Self::CommunityManager),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Roles allowed to act on other people's bookings.
    pub fn is_staff(&self) -> bool {
        matches!(self, Self::CommunityManager | Self::Admin)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Account in the booking system
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    /// Unique login/contact address
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        password_hash: impl Into<String>,
        role: UserRole,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            password_hash: password_hash.into(),
            role,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_string_roundtrip() {
        for role in &[UserRole::User, UserRole::CommunityManager, UserRole::Admin] {
            assert_eq!(UserRole::parse(role.as_str()), Some(*role));
        }
        assert_eq!(UserRole::parse("superuser"), None);
    }

    #[test]
    fn staff_roles() {
        assert!(!UserRole::User.is_staff());
        assert!(UserRole::CommunityManager.is_staff());
        assert!(UserRole::Admin.is_staff());
    }

    #[test]
    fn new_user_is_active() {
        let u = User::new("a@b.c", "Ada", "Byron", "hash", UserRole::User);
        assert!(u.is_active);
        assert_eq!(u.full_name(), "Ada Byron");
    }
}
