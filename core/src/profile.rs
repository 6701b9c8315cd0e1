//! Profile screen: account plus counters from the other sections.

use std::thread;

use crate::api::{joined, Api};
use crate::auth::{FetchCurrentUser, User};
use crate::cinema::{FetchMyList, Movie, WatchState};
use crate::error::OrFallback;
use crate::food::{FetchMealHistory, Meal};
use crate::languages::{FetchStreak, Streak};
use crate::transport::Transport;

#[derive(Debug, Clone, Default)]
pub struct ProfileOverview {
    pub user: Option<User>,
    pub streak: Option<Streak>,
    pub movies: Vec<Movie>,
    pub meals: Vec<Meal>,
}

impl ProfileOverview {
    /// Fetch the four sources concurrently. Each one that fails stays empty.
    pub fn load<T: Transport>(api: &Api<T>) -> Self {
        thread::scope(|scope| {
            let user = scope.spawn(|| api.send(&FetchCurrentUser));
            let streak = scope.spawn(|| api.send(&FetchStreak));
            let movies = scope.spawn(|| api.send(&FetchMyList));
            let meals = scope.spawn(|| api.send(&FetchMealHistory));
            Self {
                user: joined(user.join()).map(Some).or_fallback("current-user"),
                streak: joined(streak.join()).map(Some).or_fallback("streak"),
                movies: joined(movies.join()).or_fallback("my-list"),
                meals: joined(meals.join()).or_fallback("meal-history"),
            }
        })
    }

    pub fn watched_count(&self) -> usize {
        self.movies
            .iter()
            .filter(|m| m.watched == WatchState::Watched)
            .count()
    }

    pub fn watchlist_count(&self) -> usize {
        self.movies
            .iter()
            .filter(|m| m.watched == WatchState::InWatchlist)
            .count()
    }

    pub fn words_learned(&self) -> i64 {
        self.streak
            .as_ref()
            .and_then(|s| s.learned_words)
            .unwrap_or(0)
    }

    pub fn meals_logged(&self) -> usize {
        self.meals.len()
    }

    pub fn display_name(&self) -> Option<&str> {
        self.user
            .as_ref()
            .and_then(|u| u.full_name.as_deref().or(u.username.as_deref()))
    }
}
