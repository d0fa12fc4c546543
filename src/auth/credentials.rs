//! Credential Tables
//! Mission: Build and hold the static role-scoped account tables

use crate::auth::models::{Account, Role};
use anyhow::{Context, Result};
use bcrypt::{hash, verify, DEFAULT_COST};
use std::collections::HashMap;
use tracing::{info, warn};

/// Seeded coordinator accounts, one per branch
const COORDINATOR_BRANCHES: [(&str, &str); 12] = [
    ("cse_coord", "CSE"),
    ("ece_coord", "ECE"),
    ("eee_coord", "EEE"),
    ("mech_coord", "MECH"),
    ("civil_coord", "CIVIL"),
    ("ai_coord", "AI"),
    ("aiml_coord", "AIML"),
    ("ds_coord", "DS"),
    ("cs_coord", "CS"),
    ("it_coord", "IT"),
    ("mba_coord", "MBA"),
    ("mca_coord", "MCA"),
];

/// Static credential tables, one per role. Built once at startup and
/// never mutated afterwards.
pub struct CredentialStore {
    admin: Account,
    coordinators: HashMap<String, Account>,
    bsh: HashMap<String, Account>,
}

impl CredentialStore {
    /// Build the tables from explicit accounts (fixtures, tests)
    pub fn new(admin: Account, coordinators: Vec<Account>, bsh: Vec<Account>) -> Self {
        let coordinators = coordinators
            .into_iter()
            .map(|a| (a.username.clone(), a))
            .collect();
        let bsh = bsh.into_iter().map(|a| (a.username.clone(), a)).collect();

        Self {
            admin,
            coordinators,
            bsh,
        }
    }

    /// Build the tables from the environment-backed admin credentials
    /// plus the seeded coordinator and BSH accounts
    pub fn from_env(admin_username: &str, admin_password: &str) -> Result<Self> {
        // A value already carrying a bcrypt prefix is a pre-computed hash
        let admin_hash = if admin_password.starts_with("$2") {
            admin_password.to_string()
        } else {
            hash(admin_password, DEFAULT_COST).context("Failed to hash admin password")?
        };

        let admin = Account {
            username: admin_username.to_string(),
            password_hash: admin_hash,
            role: Role::Admin,
            branch: None,
        };

        let mut coordinators = HashMap::new();
        for (username, branch) in COORDINATOR_BRANCHES {
            let password = format!("{}@2024", branch.to_lowercase());
            let account = Account {
                username: username.to_string(),
                password_hash: hash(&password, DEFAULT_COST)
                    .context("Failed to hash coordinator password")?,
                role: Role::Coordinator,
                branch: Some(branch.to_string()),
            };
            coordinators.insert(username.to_string(), account);
        }

        let mut bsh = HashMap::new();
        bsh.insert(
            "bsh_coord".to_string(),
            Account {
                username: "bsh_coord".to_string(),
                password_hash: hash("bsh@2024", DEFAULT_COST)
                    .context("Failed to hash bsh password")?,
                role: Role::Bsh,
                branch: None,
            },
        );

        let store = Self {
            admin,
            coordinators,
            bsh,
        };

        info!("🔐 Credential tables ready ({} accounts)", store.account_count());

        if admin_password == "admin123" {
            warn!("⚠️  Default admin password in use - CHANGE IT IN PRODUCTION!");
        }

        Ok(store)
    }

    /// Find an account by claimed role and username
    ///
    /// Lookups are strictly role-scoped: a username is never checked
    /// against another role's table.
    pub fn lookup(&self, role: &Role, username: &str) -> Option<&Account> {
        match role {
            Role::Admin => {
                if self.admin.username == username {
                    Some(&self.admin)
                } else {
                    None
                }
            }
            Role::Coordinator => self.coordinators.get(username),
            Role::Bsh => self.bsh.get(username),
        }
    }

    /// Verify a password against an account's stored hash
    pub fn verify_password(&self, account: &Account, password: &str) -> Result<bool> {
        let valid = verify(password, &account.password_hash)
            .context("Failed to verify password")?;
        Ok(valid)
    }

    pub fn account_count(&self) -> usize {
        1 + self.coordinators.len() + self.bsh.len()
    }
}
