//! Typed local preferences.

use std::sync::Arc;

use serde_json::Value;

use crate::store::KeyValueStore;

const LEARNING_LANGUAGE: &str = "learning_language";
const LETTERBOXD_USERNAME: &str = "letterboxd_username";
const KINOPOISK_CONNECTED: &str = "kinopoisk_connected";
const IMDB_CONNECTED: &str = "imdb_connected";
const CALORIE_GOAL_OVERRIDE: &str = "calorie_goal_override";
const ONBOARDING_COMPLETED: &str = "onboarding_completed";
const DISPLAY_NAME: &str = "user_display_name";

#[derive(Clone)]
pub struct Preferences {
    store: Arc<dyn KeyValueStore>,
}

impl Preferences {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn learning_language(&self) -> Option<String> {
        self.store.get_string(LEARNING_LANGUAGE)
    }

    pub fn set_learning_language(&self, code: &str) {
        self.store.set(LEARNING_LANGUAGE, Value::from(code));
    }

    pub fn letterboxd_username(&self) -> Option<String> {
        self.store
            .get_string(LETTERBOXD_USERNAME)
            .filter(|name| !name.is_empty())
    }

    pub fn connect_letterboxd(&self, username: &str) {
        self.store.set(LETTERBOXD_USERNAME, Value::from(username));
    }

    pub fn kinopoisk_connected(&self) -> bool {
        self.store.get_bool(KINOPOISK_CONNECTED)
    }

    pub fn set_kinopoisk_connected(&self, connected: bool) {
        self.store.set(KINOPOISK_CONNECTED, Value::Bool(connected));
    }

    pub fn imdb_connected(&self) -> bool {
        self.store.get_bool(IMDB_CONNECTED)
    }

    pub fn set_imdb_connected(&self, connected: bool) {
        self.store.set(IMDB_CONNECTED, Value::Bool(connected));
    }

    pub fn has_any_platform(&self) -> bool {
        self.letterboxd_username().is_some() || self.kinopoisk_connected() || self.imdb_connected()
    }

    pub fn disconnect_platforms(&self) {
        self.store.remove(LETTERBOXD_USERNAME);
        self.set_kinopoisk_connected(false);
        self.set_imdb_connected(false);
    }

    /// User-chosen daily calorie goal; non-positive values are ignored.
    pub fn calorie_goal_override(&self) -> Option<u32> {
        self.store
            .get_i64(CALORIE_GOAL_OVERRIDE)
            .filter(|goal| *goal > 0)
            .and_then(|goal| u32::try_from(goal).ok())
    }

    pub fn set_calorie_goal_override(&self, goal: Option<u32>) {
        match goal {
            Some(goal) => self.store.set(CALORIE_GOAL_OVERRIDE, Value::from(goal)),
            None => self.store.remove(CALORIE_GOAL_OVERRIDE),
        }
    }

    pub fn onboarding_completed(&self) -> bool {
        self.store.get_bool(ONBOARDING_COMPLETED)
    }

    /// Marks onboarding done and remembers the name the user entered.
    pub fn complete_onboarding(&self, display_name: &str) {
        self.store.set(ONBOARDING_COMPLETED, Value::Bool(true));
        self.store.set(DISPLAY_NAME, Value::from(display_name));
    }

    pub fn display_name(&self) -> Option<String> {
        self.store.get_string(DISPLAY_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn prefs() -> Preferences {
        Preferences::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn platforms_start_disconnected() {
        let p = prefs();
        assert!(!p.has_any_platform());
    }

    #[test]
    fn empty_letterboxd_name_is_not_a_connection() {
        let p = prefs();
        p.connect_letterboxd("");
        assert!(!p.has_any_platform());
        p.connect_letterboxd("cinephile");
        assert!(p.has_any_platform());
    }

    #[test]
    fn disconnect_clears_every_platform() {
        let p = prefs();
        p.connect_letterboxd("cinephile");
        p.set_kinopoisk_connected(true);
        p.set_imdb_connected(true);

        p.disconnect_platforms();
        assert!(!p.has_any_platform());
        assert_eq!(p.letterboxd_username(), None);
    }

    #[test]
    fn calorie_goal_override_round_trip() {
        let p = prefs();
        assert_eq!(p.calorie_goal_override(), None);
        p.set_calorie_goal_override(Some(1800));
        assert_eq!(p.calorie_goal_override(), Some(1800));
        p.set_calorie_goal_override(None);
        assert_eq!(p.calorie_goal_override(), None);
    }

    #[test]
    fn onboarding_records_display_name() {
        let p = prefs();
        assert!(!p.onboarding_completed());
        p.complete_onboarding("Ada");
        assert!(p.onboarding_completed());
        assert_eq!(p.display_name().as_deref(), Some("Ada"));
    }
}
