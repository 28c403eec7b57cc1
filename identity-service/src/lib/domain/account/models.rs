use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::account::errors::AccountIdError;
use crate::domain::account::errors::EmailError;
use crate::domain::account::errors::RoleError;

/// Account aggregate entity.
///
/// Carries only the fields the auth lifecycle needs; everything else about a
/// user lives behind other services.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: AccountId,
    pub email: EmailAddress,
    pub password_hash: String,
    pub role: Role,
    pub name: String,
    pub verified: bool,
    pub suspended: bool,
    pub created_at: DateTime<Utc>,
}

/// Account unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountId(pub Uuid);

impl AccountId {
    /// Generate a new random account ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an account ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, AccountIdError> {
        Uuid::parse_str(s)
            .map(AccountId)
            .map_err(|e| AccountIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates format using an RFC 5322 compliant parser. Stored and compared
/// exactly as given; uniqueness is case-sensitive at the storage layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Account role, fixed at registration.
///
/// Canonical casing is lowercase; parsing accepts any casing and anything
/// outside this set is rejected at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Member,
    Expert,
    Startup,
    Investor,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::Expert => "expert",
            Role::Startup => "startup",
            Role::Investor => "investor",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "member" => Ok(Role::Member),
            "expert" => Ok(Role::Expert),
            "startup" => Ok(Role::Startup),
            "investor" => Ok(Role::Investor),
            "admin" => Ok(Role::Admin),
            _ => Err(RoleError::UnknownRole(s.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role-specific profile fields, persisted 1:1 with the account.
///
/// Fields outside the account's role stay empty.
#[derive(Debug, Clone, Default)]
pub struct Profile {
    pub company_name: Option<String>,
    pub stage: Option<String>,
    pub expertise: Vec<String>,
    pub hourly_rate: Option<f64>,
}

/// Data for a new account row plus its profile.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub id: AccountId,
    pub email: EmailAddress,
    pub password_hash: String,
    pub role: Role,
    pub name: String,
    pub profile: Profile,
}

/// The account fields safe to hand to clients and request handlers.
///
/// No password hash and nothing role-altering.
#[derive(Debug, Clone)]
pub struct PublicAccount {
    pub id: AccountId,
    pub email: String,
    pub role: Role,
    pub name: String,
    pub verified: bool,
    pub suspended: bool,
}

impl From<&Account> for PublicAccount {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            email: account.email.as_str().to_string(),
            role: account.role,
            name: account.name.clone(),
            verified: account.verified,
            suspended: account.suspended,
        }
    }
}
