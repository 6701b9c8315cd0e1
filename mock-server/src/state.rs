use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;

use crate::auth::Account;
use crate::cinema::{self, Movie};
use crate::food::Meal;
use crate::languages::{self, VocabWord};
use crate::{DEMO_EMAIL, DEMO_PASSWORD};

#[derive(Debug, Default)]
pub struct Db {
    pub accounts: Vec<Account>,
    /// Bearer token to account id.
    pub tokens: HashMap<String, i64>,
    pub trending: Vec<Movie>,
    pub catalogue: Vec<Movie>,
    pub lists: HashMap<i64, Vec<Movie>>,
    pub meals: HashMap<i64, Vec<Meal>>,
    pub vocabulary: HashMap<i64, Vec<VocabWord>>,
    next_id: i64,
}

impl Db {
    pub fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn account(&self, id: i64) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    pub fn create_account(&mut self, email: &str, password: &str, full_name: Option<String>) -> Account {
        let account = Account::new(self.next_id(), email, password, full_name);
        self.accounts.push(account.clone());
        self.vocabulary.insert(account.id, languages::starter_words());
        account
    }

    pub fn issue_token(&mut self, account_id: i64) -> String {
        let token = uuid::Uuid::new_v4().simple().to_string();
        self.tokens.insert(token.clone(), account_id);
        token
    }
}

#[derive(Clone, Default)]
pub struct AppState {
    pub(crate) db: Arc<RwLock<Db>>,
}

impl AppState {
    /// Empty backend with no accounts and no movies.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Catalogue, trending list, and the demo account.
    pub fn seeded() -> Self {
        let mut db = Db {
            trending: cinema::seed_trending(),
            catalogue: cinema::seed_catalogue(),
            ..Db::default()
        };
        db.create_account(DEMO_EMAIL, DEMO_PASSWORD, Some("Demo User".to_string()));
        Self {
            db: Arc::new(RwLock::new(db)),
        }
    }
}
